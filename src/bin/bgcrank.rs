use std::path::{Path, PathBuf};

use anyhow::Context;
use bgcrank::config::{ConfigOverrides, EngineConfig, RankingOverrides, UnifyOverrides};
use bgcrank::{tables, Pipeline};
use tracing::info;

fn parse_arg(flag: &str) -> Option<String> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}

fn parse_path(flag: &str) -> Option<PathBuf> {
    parse_arg(flag).map(PathBuf::from)
}

fn build_overrides() -> anyhow::Result<ConfigOverrides> {
    let overlap_threshold = parse_arg("--overlap-threshold")
        .map(|value| value.parse::<f64>())
        .transpose()
        .context("--overlap-threshold expects a number")?;
    let top_n = parse_arg("--top-n")
        .map(|value| value.parse::<usize>())
        .transpose()
        .context("--top-n expects an integer")?;

    Ok(ConfigOverrides {
        unify: overlap_threshold.map(|value| UnifyOverrides {
            overlap_threshold: Some(value),
        }),
        ranking: top_n.map(|value| RankingOverrides { top_n: Some(value) }),
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = parse_arg("--config");
    let overrides = build_overrides()?;
    let config = EngineConfig::load(config_path.as_deref(), overrides)?;

    // One table per prediction tool; absent flags mean the tool was not run.
    let mut bgc_records = Vec::new();
    for flag in ["--antismash", "--deepbgc", "--prism"] {
        if let Some(path) = parse_path(flag) {
            let mut records = tables::read_bgc_records(&path)
                .with_context(|| format!("reading {flag} table"))?;
            bgc_records.append(&mut records);
        }
    }

    let features = match parse_path("--features") {
        Some(path) => tables::read_ms_features(&path).context("reading feature table")?,
        None => Vec::new(),
    };
    let compounds = match parse_path("--compounds") {
        Some(path) => tables::read_compounds(&path).context("reading compound table")?,
        None => Vec::new(),
    };
    let admet = match parse_path("--admet") {
        Some(path) => tables::read_admet(&path).context("reading ADMET table")?,
        None => Vec::new(),
    };
    let clusters = match parse_path("--clusters") {
        Some(path) => tables::read_chem_clusters(&path).context("reading cluster table")?,
        None => Vec::new(),
    };

    info!(
        bgc_rows = bgc_records.len(),
        features = features.len(),
        compounds = compounds.len(),
        "inputs loaded"
    );

    let pipeline = Pipeline::new(config);
    let output = pipeline.run(bgc_records, &features, &compounds, &admet, &clusters);

    let out_unified = parse_path("--out-unified")
        .unwrap_or_else(|| PathBuf::from("outputs/unified_bgcs.csv"));
    let out_evidence = parse_path("--out-evidence")
        .unwrap_or_else(|| PathBuf::from("outputs/mapping_evidence.csv"));
    let out_ranked =
        parse_path("--out-ranked").unwrap_or_else(|| PathBuf::from("outputs/ranked_leads.csv"));
    let out_topn = parse_path("--out-topn").unwrap_or_else(|| PathBuf::from("outputs/topN.md"));

    tables::write_unified_bgcs(&out_unified, &output.unified)?;
    tables::write_evidence(&out_evidence, &output.evidence)?;
    tables::write_ranked(&out_ranked, &output.ranked)?;
    tables::write_top_candidates_md(
        Path::new(&out_topn),
        &output.ranked,
        pipeline.config().ranking.top_n,
    )?;

    info!(
        unified = output.unified.len(),
        evidence = output.evidence.len(),
        ranked = output.ranked.len(),
        "pipeline complete"
    );
    Ok(())
}
