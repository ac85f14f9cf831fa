//! # Table I/O
//!
//! Delimited-table readers and writers for every contract the engine
//! consumes or produces. Format is chosen by file suffix: `.csv` and `.tsv`
//! are supported, anything else is rejected up front.
//!
//! Set-valued cells are pipe-joined on write. On read, a bracketed
//! list literal (as emitted by upstream dataframe tooling) is also accepted.

use crate::error::{EngineError, Result};
use crate::model::{
    AdmetRecord, BgcRecord, ChemCluster, Compound, EvidenceRecord, EvidenceType, MsFeature,
    RankedCandidate, UnifiedBgc,
};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use rustc_hash::FxHashMap;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use tracing::warn;

fn delimiter_for(path: &Path) -> Result<u8> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => Ok(b','),
        Some("tsv") => Ok(b'\t'),
        other => Err(EngineError::UnsupportedFormat(format!(
            ".{}",
            other.unwrap_or("")
        ))),
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<fs::File>> {
    if !path.exists() {
        return Err(EngineError::MissingFile(path.to_path_buf()));
    }
    let delimiter = delimiter_for(path)?;
    Ok(ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?)
}

fn open_writer(path: &Path) -> Result<csv::Writer<fs::File>> {
    let delimiter = delimiter_for(path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(WriterBuilder::new().delimiter(delimiter).from_path(path)?)
}

/// Header-name to column-index lookup for one table.
struct Columns {
    table: &'static str,
    index: FxHashMap<String, usize>,
}

impl Columns {
    fn new(table: &'static str, headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { table, index }
    }

    fn required(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::Schema {
                table: self.table,
                column: name.to_string(),
            })
    }

    fn optional(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

fn cell<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).map(str::trim).unwrap_or("")
}

fn opt_cell<'r>(record: &'r StringRecord, index: Option<usize>) -> &'r str {
    index.map(|i| cell(record, i)).unwrap_or("")
}

fn parse_f64(value: &str, table: &'static str, column: &str) -> Result<f64> {
    if value.is_empty() {
        return Ok(f64::NAN);
    }
    value.parse().map_err(|_| EngineError::Parse {
        table,
        column: column.to_string(),
    })
}

fn parse_opt_f64(value: &str, table: &'static str, column: &str) -> Result<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_f64(value, table, column)?))
}

fn parse_opt_u64(value: &str, table: &'static str, column: &str) -> Result<Option<u64>> {
    if value.is_empty() {
        return Ok(None);
    }
    // Dataframe tooling writes integer columns with missing values as floats.
    if let Ok(as_float) = value.parse::<f64>() {
        if as_float.is_finite() && as_float >= 0.0 && as_float.fract() == 0.0 {
            return Ok(Some(as_float as u64));
        }
    }
    Err(EngineError::Parse {
        table,
        column: column.to_string(),
    })
}

fn parse_opt_bool(value: &str, table: &'static str, column: &str) -> Result<Option<bool>> {
    match value {
        "" => Ok(None),
        "true" | "True" | "TRUE" | "1" => Ok(Some(true)),
        "false" | "False" | "FALSE" | "0" => Ok(Some(false)),
        _ => Err(EngineError::Parse {
            table,
            column: column.to_string(),
        }),
    }
}

/// Parse a set-valued cell. Accepts an empty cell, a bracketed list literal
/// (`['a', 'b']`), or a pipe-joined string. An unparseable bracketed cell
/// is logged and treated as empty rather than coerced into a fake tag.
pub fn parse_list_cell(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let inner = &trimmed[1..trimmed.len() - 1];
        if inner.trim().is_empty() {
            return Vec::new();
        }
        let items: Vec<String> = inner
            .split(',')
            .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
            .filter(|item| !item.is_empty())
            .collect();
        if items.is_empty() {
            warn!(cell = %trimmed, "dropping unparseable list cell");
        }
        return items;
    }
    trimmed
        .split('|')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn join_list(values: &[String]) -> String {
    values.join("|")
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Read a standardized per-tool BGC prediction table.
pub fn read_bgc_records(path: &Path) -> Result<Vec<BgcRecord>> {
    const TABLE: &str = "bgc";
    let mut reader = open_reader(path)?;
    let columns = Columns::new(TABLE, reader.headers()?);

    let sample_id = columns.required("SampleID")?;
    let tool = columns.required("Tool")?;
    let cluster_index = columns.required("ClusterIndex")?;
    let cluster_type = columns.required("ClusterType")?;
    let start = columns.required("Start")?;
    let end = columns.required("End")?;
    let score = columns.optional("Score");
    let core_enzymes = columns.optional("CoreEnzymes");
    let mibig_hits = columns.optional("MIBiGHits");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let index_value = cell(&row, cluster_index);
        let cluster_index = index_value.parse().map_err(|_| EngineError::Parse {
            table: TABLE,
            column: "ClusterIndex".to_string(),
        })?;
        records.push(BgcRecord {
            sample_id: cell(&row, sample_id).to_string(),
            tool: cell(&row, tool).to_string(),
            cluster_index,
            cluster_type: cell(&row, cluster_type).to_string(),
            start: parse_f64(cell(&row, start), TABLE, "Start")?,
            end: parse_f64(cell(&row, end), TABLE, "End")?,
            score: parse_opt_f64(opt_cell(&row, score), TABLE, "Score")?,
            core_enzymes: parse_list_cell(opt_cell(&row, core_enzymes)),
            mibig_hits: parse_list_cell(opt_cell(&row, mibig_hits)),
        });
    }
    Ok(records)
}

/// Read a normalized MS feature table. The `intensity_normalized` column is
/// optional; the linker derives it when absent.
pub fn read_ms_features(path: &Path) -> Result<Vec<MsFeature>> {
    const TABLE: &str = "ms_features";
    let mut reader = open_reader(path)?;
    let columns = Columns::new(TABLE, reader.headers()?);

    let feature_id = columns.required("FeatureID")?;
    let sample_id = columns.required("SampleID")?;
    let mz = columns.required("mz")?;
    let rt = columns.required("rt")?;
    let intensity = columns.required("intensity")?;
    let normalized = columns.optional("intensity_normalized");

    let mut features = Vec::new();
    for row in reader.records() {
        let row = row?;
        features.push(MsFeature {
            feature_id: cell(&row, feature_id).to_string(),
            sample_id: cell(&row, sample_id).to_string(),
            mz: parse_f64(cell(&row, mz), TABLE, "mz")?,
            rt: parse_f64(cell(&row, rt), TABLE, "rt")?,
            intensity: parse_f64(cell(&row, intensity), TABLE, "intensity")?,
            intensity_normalized: parse_opt_f64(
                opt_cell(&row, normalized),
                TABLE,
                "intensity_normalized",
            )?,
        });
    }
    Ok(features)
}

/// Read a chemical reference table. Structural strings pass through
/// unvalidated.
pub fn read_compounds(path: &Path) -> Result<Vec<Compound>> {
    const TABLE: &str = "compounds";
    let mut reader = open_reader(path)?;
    let columns = Columns::new(TABLE, reader.headers()?);

    let compound_id = columns.required("CompoundID")?;
    let name = columns.optional("Name");
    let source = columns.optional("Source");
    let smiles = columns.optional("SMILES");
    let known_activity = columns.optional("KnownActivity");

    let mut compounds = Vec::new();
    for row in reader.records() {
        let row = row?;
        compounds.push(Compound {
            compound_id: cell(&row, compound_id).to_string(),
            name: opt_cell(&row, name).to_string(),
            source: opt_cell(&row, source).to_string(),
            smiles: opt_cell(&row, smiles).to_string(),
            known_activity: opt_cell(&row, known_activity).to_string(),
        });
    }
    Ok(compounds)
}

/// Read a previously written evidence table.
pub fn read_evidence(path: &Path) -> Result<Vec<EvidenceRecord>> {
    const TABLE: &str = "evidence";
    let mut reader = open_reader(path)?;
    let columns = Columns::new(TABLE, reader.headers()?);

    let bgc_uid = columns.required("BGCUID")?;
    let feature_id = columns.required("FeatureID")?;
    let compound_id = columns.required("CompoundID")?;
    let evidence_type = columns.required("EvidenceType")?;
    let evidence_score = columns.required("EvidenceScore")?;
    let notes = columns.required("Notes")?;

    let mut evidence = Vec::new();
    for row in reader.records() {
        let row = row?;
        let type_value = cell(&row, evidence_type);
        let evidence_type =
            EvidenceType::parse(type_value).ok_or_else(|| EngineError::Parse {
                table: TABLE,
                column: "EvidenceType".to_string(),
            })?;
        evidence.push(EvidenceRecord {
            bgc_uid: cell(&row, bgc_uid).to_string(),
            feature_id: cell(&row, feature_id).to_string(),
            compound_id: cell(&row, compound_id).to_string(),
            evidence_type,
            evidence_score: parse_f64(cell(&row, evidence_score), TABLE, "EvidenceScore")?,
            notes: cell(&row, notes).to_string(),
        });
    }
    Ok(evidence)
}

/// Read an externally computed drug-likeness table.
pub fn read_admet(path: &Path) -> Result<Vec<AdmetRecord>> {
    const TABLE: &str = "admet";
    let mut reader = open_reader(path)?;
    let columns = Columns::new(TABLE, reader.headers()?);

    let compound_id = columns.required("CompoundID")?;
    let mw = columns.optional("MW");
    let logp = columns.optional("logP");
    let tpsa = columns.optional("TPSA");
    let qed = columns.optional("QED");
    let pass = columns.optional("RuleOfFivePass");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(AdmetRecord {
            compound_id: cell(&row, compound_id).to_string(),
            mw: parse_opt_f64(opt_cell(&row, mw), TABLE, "MW")?,
            logp: parse_opt_f64(opt_cell(&row, logp), TABLE, "logP")?,
            tpsa: parse_opt_f64(opt_cell(&row, tpsa), TABLE, "TPSA")?,
            qed: parse_opt_f64(opt_cell(&row, qed), TABLE, "QED")?,
            rule_of_five_pass: parse_opt_bool(opt_cell(&row, pass), TABLE, "RuleOfFivePass")?,
        });
    }
    Ok(records)
}

/// Read an externally computed chemical-similarity cluster table.
pub fn read_chem_clusters(path: &Path) -> Result<Vec<ChemCluster>> {
    const TABLE: &str = "chem_clusters";
    let mut reader = open_reader(path)?;
    let columns = Columns::new(TABLE, reader.headers()?);

    let compound_id = columns.required("CompoundID")?;
    let cluster_id = columns.required("ClusterID")?;
    let cluster_size = columns.optional("ClusterSize");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(ChemCluster {
            compound_id: cell(&row, compound_id).to_string(),
            cluster_id: cell(&row, cluster_id).to_string(),
            cluster_size: parse_opt_u64(opt_cell(&row, cluster_size), TABLE, "ClusterSize")?,
        });
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn format_opt_f64(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write the unified BGC table.
pub fn write_unified_bgcs(path: &Path, bgcs: &[UnifiedBgc]) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer.write_record([
        "BGCUID",
        "SampleID",
        "Tool",
        "ClusterType",
        "Start",
        "End",
        "Score",
        "CoreEnzymes",
        "MIBiGHits",
        "MemberBGCIDs",
    ])?;
    for bgc in bgcs {
        writer.write_record([
            bgc.bgc_uid.clone(),
            bgc.sample_id.clone(),
            bgc.tool.clone(),
            bgc.cluster_type.clone(),
            bgc.start.to_string(),
            bgc.end.to_string(),
            format_opt_f64(bgc.score),
            join_list(&bgc.core_enzymes),
            join_list(&bgc.mibig_hits),
            join_list(&bgc.member_bgc_ids),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the evidence table in its fixed column order.
pub fn write_evidence(path: &Path, evidence: &[EvidenceRecord]) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer.write_record([
        "BGCUID",
        "FeatureID",
        "CompoundID",
        "EvidenceType",
        "EvidenceScore",
        "Notes",
    ])?;
    for row in evidence {
        writer.write_record([
            row.bgc_uid.clone(),
            row.feature_id.clone(),
            row.compound_id.clone(),
            row.evidence_type.as_str().to_string(),
            row.evidence_score.to_string(),
            row.notes.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the terminal ranking.
pub fn write_ranked(path: &Path, candidates: &[RankedCandidate]) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer.write_record([
        "CompoundID",
        "Rank",
        "AggregateScore",
        "EvidenceScore",
        "EvidenceCount",
        "BGCUIDs",
        "FeatureIDs",
        "ADMETScore",
        "Novelty",
        "MW",
        "logP",
        "TPSA",
        "QED",
        "RuleOfFivePass",
        "ClusterID",
        "ClusterSize",
        "EvidenceSummary",
    ])?;
    for row in candidates {
        let pass = row
            .rule_of_five_pass
            .map(|value| value.to_string())
            .unwrap_or_default();
        let cluster_size = row
            .cluster_size
            .map(|value| value.to_string())
            .unwrap_or_default();
        writer.write_record([
            row.compound_id.clone(),
            row.rank.to_string(),
            row.aggregate_score.to_string(),
            row.evidence_score.to_string(),
            row.evidence_count.to_string(),
            join_list(&row.bgc_uids),
            join_list(&row.feature_ids),
            row.admet_score.to_string(),
            row.novelty.to_string(),
            format_opt_f64(row.mw),
            format_opt_f64(row.logp),
            format_opt_f64(row.tpsa),
            format_opt_f64(row.qed),
            pass,
            row.cluster_id.clone().unwrap_or_default(),
            cluster_size,
            format!("{} evidence links", row.evidence_count),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the top-N markdown summary alongside the full ranking.
pub fn write_top_candidates_md(
    path: &Path,
    candidates: &[RankedCandidate],
    top_n: usize,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut lines = vec!["# Top Candidates".to_string(), String::new()];
    for row in candidates.iter().take(top_n) {
        let admet_label = if row.rule_of_five_pass == Some(true) {
            "Pass"
        } else {
            "Fail"
        };
        let cluster_label = row.cluster_id.as_deref().unwrap_or("N/A");
        lines.push(format!(
            "- **Rank {}** - Compound {} | Score: {:.3} | ADMET: {} | Cluster: {}",
            row.rank, row.compound_id, row.aggregate_score, admet_label, cluster_label
        ));
    }
    let mut file = fs::File::create(path)?;
    file.write_all(lines.join("\n").as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn list_cells_accept_brackets_pipes_and_blanks() {
        assert_eq!(parse_list_cell(""), Vec::<String>::new());
        assert_eq!(parse_list_cell("[]"), Vec::<String>::new());
        assert_eq!(
            parse_list_cell("['nrps-pks', 'terpene']"),
            vec!["nrps-pks", "terpene"]
        );
        assert_eq!(parse_list_cell("geneA|geneB"), vec!["geneA", "geneB"]);
        assert_eq!(parse_list_cell("geneA"), vec!["geneA"]);
    }

    #[test]
    fn unsupported_suffix_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bgc.parquet", "x");
        let err = read_bgc_records(&path).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.csv");
        let err = read_bgc_records(&path).unwrap_err();
        match err {
            EngineError::MissingFile(reported) => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bgc_reader_round_trips_core_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "bgc.csv",
            "SampleID,Tool,ClusterIndex,ClusterType,Start,End,Score,CoreEnzymes,MIBiGHits\n\
             S1,antismash,1,NRPS,0,100,80.5,['pksA'],BGC0000001\n\
             S1,deepbgc,2,PKS,200,300,,,\n",
        );
        let records = read_bgc_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].bgc_id(), "S1_antismash_1");
        assert_eq!(records[0].score, Some(80.5));
        assert_eq!(records[0].core_enzymes, vec!["pksA"]);
        assert_eq!(records[0].mibig_hits, vec!["BGC0000001"]);
        assert_eq!(records[1].score, None);
        assert!(records[1].core_enzymes.is_empty());
    }

    #[test]
    fn bgc_reader_flags_the_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bgc.csv", "SampleID,ClusterIndex\nS1,1\n");
        let err = read_bgc_records(&path).unwrap_err();
        match err {
            EngineError::Schema { table, column } => {
                assert_eq!(table, "bgc");
                assert_eq!(column, "Tool");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn feature_reader_handles_optional_normalized_column() {
        let dir = TempDir::new().unwrap();
        let bare = write_file(
            &dir,
            "bare.csv",
            "FeatureID,SampleID,mz,rt,intensity\nF1,S1,455.2,3.1,1000\n",
        );
        let features = read_ms_features(&bare).unwrap();
        assert_eq!(features[0].intensity_normalized, None);

        let full = write_file(
            &dir,
            "full.csv",
            "FeatureID,SampleID,mz,rt,intensity,intensity_normalized\nF1,S1,455.2,3.1,1000,0.25\n",
        );
        let features = read_ms_features(&full).unwrap();
        assert_eq!(features[0].intensity_normalized, Some(0.25));
    }

    #[test]
    fn tsv_delimiter_follows_the_suffix() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "compounds.tsv",
            "CompoundID\tName\tSource\tSMILES\tKnownActivity\nC1\tTestin\tNPAtlas\tCCC\tantibiotic\n",
        );
        let compounds = read_compounds(&path).unwrap();
        assert_eq!(compounds[0].compound_id, "C1");
        assert_eq!(compounds[0].source, "NPAtlas");
        assert_eq!(compounds[0].smiles, "CCC");
    }

    #[test]
    fn admet_reader_parses_flags_and_blanks() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "admet.csv",
            "CompoundID,MW,logP,TPSA,QED,RuleOfFivePass\n\
             C1,300.4,2.1,85.0,0.61,True\n\
             C2,,,,,\n",
        );
        let records = read_admet(&path).unwrap();
        assert_eq!(records[0].rule_of_five_pass, Some(true));
        assert_eq!(records[1].rule_of_five_pass, None);
        assert_eq!(records[1].mw, None);
    }

    #[test]
    fn cluster_reader_accepts_float_formatted_sizes() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "clusters.csv",
            "CompoundID,ClusterID,ClusterSize\nC1,CL1,3.0\nC2,CL2,\n",
        );
        let records = read_chem_clusters(&path).unwrap();
        assert_eq!(records[0].cluster_size, Some(3));
        assert_eq!(records[1].cluster_size, None);
    }

    #[test]
    fn evidence_round_trips_through_write_and_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evidence.csv");
        let rows = vec![EvidenceRecord {
            bgc_uid: "S1_BGCUID_001".into(),
            feature_id: String::new(),
            compound_id: "C1".into(),
            evidence_type: EvidenceType::BgcCompound,
            evidence_score: 0.6,
            notes: "Cluster type vs compound source match".into(),
        }];
        write_evidence(&path, &rows).unwrap();
        let back = read_evidence(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn bad_evidence_type_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "evidence.csv",
            "BGCUID,FeatureID,CompoundID,EvidenceType,EvidenceScore,Notes\nB1,,C1,phylogeny,0.5,\n",
        );
        let err = read_evidence(&path).unwrap_err();
        match err {
            EngineError::Parse { table, column } => {
                assert_eq!(table, "evidence");
                assert_eq!(column, "EvidenceType");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn top_n_markdown_lists_only_the_head() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("topn.md");
        let candidate = |id: &str, rank: u64, score: f64| RankedCandidate {
            compound_id: id.into(),
            rank,
            aggregate_score: score,
            evidence_score: 0.5,
            evidence_count: 1,
            bgc_uids: vec![],
            feature_ids: vec![],
            admet_score: 0.0,
            novelty: 1.0,
            mw: None,
            logp: None,
            tpsa: None,
            qed: None,
            rule_of_five_pass: None,
            cluster_id: None,
            cluster_size: None,
        };
        let ranked = vec![
            candidate("C1", 1, 0.9),
            candidate("C2", 2, 0.5),
            candidate("C3", 3, 0.2),
        ];
        write_top_candidates_md(&path, &ranked, 2).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Top Candidates"));
        assert!(text.contains("Rank 1"));
        assert!(text.contains("Rank 2"));
        assert!(!text.contains("C3"));
        assert!(text.contains("Cluster: N/A"));
    }
}
