//! # Evidence Linker
//!
//! Builds the heuristic evidence table relating unified BGCs, MS features,
//! and reference compounds. Three independent rules are applied as full
//! cross-products; only positive-score pairs are emitted.
//!
//! Scores are clamped to [0,1] and rounded to four decimals. Absent
//! identifiers are empty strings in the emitted rows.

use crate::config::LinkingConfig;
use crate::model::{Compound, EvidenceRecord, EvidenceType, MsFeature, UnifiedBgc};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

/// Fixed cluster-type → reference-source correlation used by the
/// bgc_compound rule. Tokens are matched after uppercasing.
fn type_sources(token: &str) -> &'static [&'static str] {
    match token {
        "NRPS" => &["NPAtlas", "MIBiG"],
        "PKS" => &["MIBiG"],
        "RIPP" => &["NPAtlas", "MIBiG"],
        _ => &[],
    }
}

/// Split a possibly multi-valued cluster-type tag into uppercase tokens.
/// Both '|' and ',' act as separators.
pub fn expand_cluster_types(cluster_type: &str) -> Vec<String> {
    cluster_type
        .split(['|', ','])
        .map(|token| token.trim().to_uppercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Coarse structural-mass heuristic: a proportional count of carbon and
/// heteroatom symbols, not an exact mass. `None` for an empty string.
pub fn estimate_mass(smiles: &str) -> Option<f64> {
    if smiles.is_empty() {
        return None;
    }
    let carbon_count = smiles.bytes().filter(|&b| b == b'C').count();
    let hetero_count = smiles
        .bytes()
        .filter(|b| matches!(b, b'N' | b'O' | b'S' | b'P'))
        .count();
    Some(carbon_count as f64 * 12.0 + hetero_count as f64 * 14.0 + 18.0)
}

/// Type-matching rule: `alpha` when any cluster-type token correlates with
/// the compound's source, plus `beta` when the BGC also carries a MIBiG
/// cross-reference hit; capped at 1.0.
fn score_bgc_compound(bgc: &UnifiedBgc, compound: &Compound, config: &LinkingConfig) -> f64 {
    let source = compound.source.trim();
    let matched = expand_cluster_types(&bgc.cluster_type)
        .iter()
        .any(|token| type_sources(token).contains(&source));
    let mut score = if matched { config.alpha } else { 0.0 };
    if !bgc.mibig_hits.is_empty() && score > 0.0 {
        score += config.beta;
    }
    score.min(1.0)
}

/// Mass-matching rule: `gamma` when the ppm error between the feature's m/z
/// and the compound's estimated mass is within tolerance, else 0.
fn score_feature_compound(
    feature: &MsFeature,
    compound: &Compound,
    config: &LinkingConfig,
) -> f64 {
    if feature.mz.is_nan() {
        return 0.0;
    }
    let mass = match estimate_mass(&compound.smiles) {
        Some(mass) if mass != 0.0 => mass,
        _ => return 0.0,
    };
    let ppm = (feature.mz - mass).abs() / mass * 1e6;
    if ppm <= config.ppm_tolerance {
        config.gamma.min(1.0)
    } else {
        0.0
    }
}

/// Co-occurrence rule: same-sample pairs score `delta` × the feature's
/// normalized intensity, capped at 1.0; below the intensity floor, 0.
fn score_bgc_feature(
    bgc: &UnifiedBgc,
    feature: &MsFeature,
    normalized: f64,
    config: &LinkingConfig,
) -> f64 {
    if bgc.sample_id != feature.sample_id {
        return 0.0;
    }
    if normalized >= config.intensity_floor {
        (config.delta * normalized).min(1.0)
    } else {
        0.0
    }
}

fn round4(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

/// Build the full evidence table. The absence of positive-score pairs for a
/// relation type yields zero rows of that type, not an error.
pub fn link_evidence(
    bgcs: &[UnifiedBgc],
    features: &[MsFeature],
    compounds: &[Compound],
    config: &LinkingConfig,
) -> Vec<EvidenceRecord> {
    for compound in compounds {
        if compound.smiles.is_empty() {
            warn!(
                compound = %compound.compound_id,
                "compound has no structural string; mass matching disabled"
            );
        }
    }

    let normalized = normalized_intensities(features);

    // Each rule is a cross-product over independent rows; rayon keeps the
    // emission order identical to the sequential scan.
    let bgc_compound: Vec<EvidenceRecord> = bgcs
        .par_iter()
        .flat_map_iter(|bgc| {
            compounds.iter().filter_map(|compound| {
                let score = score_bgc_compound(bgc, compound, config);
                (score > 0.0).then(|| EvidenceRecord {
                    bgc_uid: bgc.bgc_uid.clone(),
                    feature_id: String::new(),
                    compound_id: compound.compound_id.clone(),
                    evidence_type: EvidenceType::BgcCompound,
                    evidence_score: round4(score.min(1.0)),
                    notes: "Cluster type vs compound source match".to_string(),
                })
            })
        })
        .collect();

    let feature_compound: Vec<EvidenceRecord> = features
        .par_iter()
        .flat_map_iter(|feature| {
            compounds.iter().filter_map(|compound| {
                let score = score_feature_compound(feature, compound, config);
                (score > 0.0).then(|| EvidenceRecord {
                    bgc_uid: String::new(),
                    feature_id: feature.feature_id.clone(),
                    compound_id: compound.compound_id.clone(),
                    evidence_type: EvidenceType::FeatureCompound,
                    evidence_score: round4(score.min(1.0)),
                    notes: "m/z within ppm window".to_string(),
                })
            })
        })
        .collect();

    let bgc_feature: Vec<EvidenceRecord> = bgcs
        .par_iter()
        .flat_map_iter(|bgc| {
            features
                .iter()
                .zip(normalized.iter())
                .filter_map(|(feature, &intensity)| {
                    let score = score_bgc_feature(bgc, feature, intensity, config);
                    (score > 0.0).then(|| EvidenceRecord {
                        bgc_uid: bgc.bgc_uid.clone(),
                        feature_id: feature.feature_id.clone(),
                        compound_id: String::new(),
                        evidence_type: EvidenceType::BgcFeature,
                        evidence_score: round4(score.min(1.0)),
                        notes: "Co-occurrence in sample with high intensity".to_string(),
                    })
                })
        })
        .collect();

    info!(
        bgc_compound = bgc_compound.len(),
        feature_compound = feature_compound.len(),
        bgc_feature = bgc_feature.len(),
        "evidence linking complete"
    );

    let mut evidence = bgc_compound;
    evidence.extend(feature_compound);
    evidence.extend(bgc_feature);
    evidence
}

/// Per-feature normalized intensity. When the adapter supplied any
/// normalized values, they are authoritative for the whole table and rows
/// with a blank cell normalize to zero; the on-the-fly fallback over sample
/// totals applies only when the column is absent entirely.
fn normalized_intensities(features: &[MsFeature]) -> Vec<f64> {
    let column_present = features
        .iter()
        .any(|feature| feature.intensity_normalized.is_some());
    if column_present {
        return features
            .iter()
            .map(|feature| match feature.intensity_normalized {
                Some(value) if !value.is_nan() => value,
                _ => 0.0,
            })
            .collect();
    }

    let mut totals: FxHashMap<&str, f64> = FxHashMap::default();
    for feature in features {
        *totals.entry(feature.sample_id.as_str()).or_insert(0.0) += feature.intensity;
    }
    for (sample, &total) in &totals {
        if total <= 0.0 {
            warn!(sample = %sample, total, "non-positive intensity total; co-occurrence zeroed");
        }
    }

    features
        .iter()
        .map(|feature| {
            let total = totals.get(feature.sample_id.as_str()).copied().unwrap_or(0.0);
            if total > 0.0 {
                feature.intensity / total
            } else {
                0.0
            }
        })
        .collect()
}
