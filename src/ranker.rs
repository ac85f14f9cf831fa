//! # Candidate Ranker
//!
//! Aggregates per-compound evidence, joins external ADMET and chemical
//! cluster metadata, and produces the terminal ranked candidate list.
//!
//! Only compounds with at least one evidence row appear in the output;
//! the ranker never synthesizes zero-evidence rows from the metadata tables.

use crate::config::RankingConfig;
use crate::model::{AdmetRecord, ChemCluster, EvidenceRecord, EvidenceType, RankedCandidate};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Per-compound evidence rollup, before metadata joins.
#[derive(Debug, Default)]
struct EvidenceRollup {
    score_sum: f64,
    count: u64,
    bgc_uids: BTreeSet<String>,
    feature_ids: BTreeSet<String>,
}

/// Produce the ranked candidate list from evidence plus optional metadata.
pub fn rank_candidates(
    evidence: &[EvidenceRecord],
    admet: &[AdmetRecord],
    clusters: &[ChemCluster],
    config: &RankingConfig,
) -> Vec<RankedCandidate> {
    let mut rollups: BTreeMap<String, EvidenceRollup> = BTreeMap::new();
    for row in evidence {
        let compound_id = row.compound_id.trim();
        if compound_id.is_empty() {
            continue;
        }
        let rollup = rollups.entry(compound_id.to_string()).or_default();
        rollup.score_sum += row.evidence_score;
        rollup.count += 1;
        if !row.bgc_uid.trim().is_empty() {
            rollup.bgc_uids.insert(row.bgc_uid.clone());
        }
        if !row.feature_id.trim().is_empty() {
            rollup.feature_ids.insert(row.feature_id.clone());
        }
    }

    propagate_shared_bgc_features(evidence, &mut rollups);

    // First occurrence wins when a metadata table repeats a compound.
    let mut admet_by_compound: BTreeMap<&str, &AdmetRecord> = BTreeMap::new();
    for record in admet {
        admet_by_compound
            .entry(record.compound_id.as_str())
            .or_insert(record);
    }
    let mut cluster_by_compound: BTreeMap<&str, &ChemCluster> = BTreeMap::new();
    for record in clusters {
        cluster_by_compound
            .entry(record.compound_id.as_str())
            .or_insert(record);
    }

    let mut candidates: Vec<RankedCandidate> = rollups
        .into_iter()
        .map(|(compound_id, rollup)| {
            let evidence_score = if rollup.count > 0 {
                rollup.score_sum / rollup.count as f64
            } else {
                0.0
            };

            let admet_row = admet_by_compound.get(compound_id.as_str()).copied();
            let rule_of_five_pass = admet_row.and_then(|row| row.rule_of_five_pass);
            // Unmatched or missing flags coerce to a fail.
            let admet_score = if rule_of_five_pass == Some(true) {
                1.0
            } else {
                0.0
            };

            let cluster_row = cluster_by_compound.get(compound_id.as_str());
            let cluster_id = cluster_row.map(|row| row.cluster_id.clone());
            let cluster_size = cluster_row.and_then(|row| row.cluster_size);
            let novelty = match cluster_size {
                Some(size) if size > 0 => 1.0 / size as f64,
                _ => 1.0,
            };

            let aggregate_score = config.weight_evidence * evidence_score
                + config.weight_admet * admet_score
                + config.weight_novelty * novelty;

            RankedCandidate {
                compound_id,
                rank: 0,
                aggregate_score,
                evidence_score,
                evidence_count: rollup.count,
                bgc_uids: rollup.bgc_uids.into_iter().collect(),
                feature_ids: rollup.feature_ids.into_iter().collect(),
                admet_score,
                novelty,
                mw: admet_row.and_then(|row| row.mw),
                logp: admet_row.and_then(|row| row.logp),
                tpsa: admet_row.and_then(|row| row.tpsa),
                qed: admet_row.and_then(|row| row.qed),
                rule_of_five_pass,
                cluster_id,
                cluster_size,
            }
        })
        .collect();

    // Stable descending sort; ties keep compound-id order from the rollup map.
    candidates.sort_by(|a, b| b.aggregate_score.total_cmp(&a.aggregate_score));
    for (index, candidate) in candidates.iter_mut().enumerate() {
        candidate.rank = index as u64 + 1;
    }

    info!(candidates = candidates.len(), "candidate ranking complete");
    candidates
}

/// Transitive feature attribution: a feature co-occurring with a BGC is
/// credited to every compound linked to that same BGC, widening FeatureIDs
/// without touching scores or counts.
fn propagate_shared_bgc_features(
    evidence: &[EvidenceRecord],
    rollups: &mut BTreeMap<String, EvidenceRollup>,
) {
    let mut compounds_by_bgc: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut features_by_bgc: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for row in evidence {
        match row.evidence_type {
            EvidenceType::BgcCompound => {
                if !row.bgc_uid.is_empty() && !row.compound_id.is_empty() {
                    compounds_by_bgc
                        .entry(row.bgc_uid.as_str())
                        .or_default()
                        .insert(row.compound_id.as_str());
                }
            }
            EvidenceType::BgcFeature => {
                if !row.bgc_uid.is_empty() && !row.feature_id.is_empty() {
                    features_by_bgc
                        .entry(row.bgc_uid.as_str())
                        .or_default()
                        .insert(row.feature_id.as_str());
                }
            }
            EvidenceType::FeatureCompound => {}
        }
    }

    for (bgc_uid, features) in &features_by_bgc {
        let Some(compounds) = compounds_by_bgc.get(bgc_uid) else {
            continue;
        };
        for compound in compounds {
            if let Some(rollup) = rollups.get_mut(*compound) {
                rollup
                    .feature_ids
                    .extend(features.iter().map(|f| f.to_string()));
            }
        }
    }
}
