//! # BGC Unifier
//!
//! Reconciles duplicate and overlapping genomic predictions from independent
//! callers into unified BGC entities. Within each sample, every pair of loci
//! whose reciprocal overlap meets the threshold is unioned; each resulting
//! group becomes one [`UnifiedBgc`].
//!
//! The pairwise scan is quadratic in per-sample cluster count, which is
//! bounded by caller output sizes, not genome length.

use crate::dsu::UnionFind;
use crate::locus::reciprocal_overlap;
use crate::model::{BgcRecord, UnifiedBgc};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Merge standardized BGC records into unified entities.
///
/// Records are grouped by SampleID; membership partitions each sample's
/// record set. Output rows are sorted by (SampleID, Start, End) and assigned
/// sample-scoped sequential BGCUIDs in that order. Empty input yields an
/// empty output, not an error.
pub fn unify_bgcs(records: Vec<BgcRecord>, overlap_threshold: f64) -> Vec<UnifiedBgc> {
    let mut by_sample: BTreeMap<String, Vec<BgcRecord>> = BTreeMap::new();
    for record in records {
        if record.sample_id.trim().is_empty() {
            warn!(
                bgc_id = %record.bgc_id(),
                "dropping BGC record with missing SampleID"
            );
            continue;
        }
        by_sample
            .entry(record.sample_id.clone())
            .or_default()
            .push(record);
    }

    let mut unified: Vec<UnifiedBgc> = Vec::new();
    for (sample_id, sample_records) in by_sample {
        if sample_records.len() == 1 {
            // Single-row samples pass through verbatim as singleton entities.
            unified.push(passthrough(&sample_records[0]));
            continue;
        }
        let groups = group_sample(&sample_records, overlap_threshold);
        debug!(
            sample = %sample_id,
            records = sample_records.len(),
            groups = groups.len(),
            "unified sample loci"
        );
        for members in groups {
            unified.push(merge_group(&sample_records, &members));
        }
    }

    // Global ordering drives BGCUID assignment; NaN coordinates sort last.
    unified.sort_by(|a, b| {
        a.sample_id
            .cmp(&b.sample_id)
            .then(a.start.total_cmp(&b.start))
            .then(a.end.total_cmp(&b.end))
    });

    let mut sample_counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in &mut unified {
        let seq = sample_counts.entry(row.sample_id.clone()).or_insert(0);
        *seq += 1;
        row.bgc_uid = format!("{}_BGCUID_{:03}", row.sample_id, seq);
    }

    info!(unified = unified.len(), "BGC unification complete");
    unified
}

/// Partition one sample's records into merge groups of row indices.
/// Groups come out ordered by their Union-Find root, members in row order.
fn group_sample(records: &[BgcRecord], overlap_threshold: f64) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(records.len());
    for (idx_a, idx_b) in (0..records.len()).tuple_combinations() {
        let overlap = reciprocal_overlap(&records[idx_a], &records[idx_b]);
        if overlap >= overlap_threshold {
            uf.union(idx_a, idx_b);
        }
    }

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for idx in 0..records.len() {
        groups.entry(uf.find(idx)).or_default().push(idx);
    }
    groups.into_values().collect()
}

/// Wrap a single-row sample as a unified record with attributes verbatim.
fn passthrough(row: &BgcRecord) -> UnifiedBgc {
    UnifiedBgc {
        bgc_uid: String::new(),
        sample_id: row.sample_id.clone(),
        tool: row.tool.clone(),
        cluster_type: row.cluster_type.clone(),
        start: row.start,
        end: row.end,
        score: row.score,
        core_enzymes: row.core_enzymes.clone(),
        mibig_hits: row.mibig_hits.clone(),
        member_bgc_ids: vec![row.bgc_id()],
    }
}

/// Merge one group of member rows into a single unified record. The BGCUID is
/// assigned later, after the global sort.
fn merge_group(records: &[BgcRecord], members: &[usize]) -> UnifiedBgc {
    let rows: Vec<&BgcRecord> = members.iter().map(|&i| &records[i]).collect();

    let tools: BTreeSet<&str> = rows.iter().map(|r| r.tool.as_str()).collect();
    let cluster_types: BTreeSet<&str> = rows
        .iter()
        .map(|r| r.cluster_type.as_str())
        .filter(|ct| !ct.is_empty())
        .collect();
    let core_enzymes: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.core_enzymes.iter().map(String::as_str))
        .collect();
    let mibig_hits: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.mibig_hits.iter().map(String::as_str))
        .collect();

    UnifiedBgc {
        bgc_uid: String::new(),
        sample_id: rows[0].sample_id.clone(),
        tool: tools.into_iter().collect::<Vec<_>>().join("|"),
        cluster_type: cluster_types.into_iter().collect::<Vec<_>>().join("|"),
        start: nan_aware_min(rows.iter().map(|r| r.start)),
        end: nan_aware_max(rows.iter().map(|r| r.end)),
        score: mean_of_present(rows.iter().map(|r| r.score)),
        core_enzymes: core_enzymes.into_iter().map(str::to_owned).collect(),
        mibig_hits: mibig_hits.into_iter().map(str::to_owned).collect(),
        member_bgc_ids: rows.iter().map(|r| r.bgc_id()).collect(),
    }
}

/// Minimum ignoring NaN; NaN when no value is present.
fn nan_aware_min(values: impl Iterator<Item = f64>) -> f64 {
    values
        .filter(|v| !v.is_nan())
        .fold(f64::NAN, |acc, v| if acc.is_nan() { v } else { acc.min(v) })
}

/// Maximum ignoring NaN; NaN when no value is present.
fn nan_aware_max(values: impl Iterator<Item = f64>) -> f64 {
    values
        .filter(|v| !v.is_nan())
        .fold(f64::NAN, |acc, v| if acc.is_nan() { v } else { acc.max(v) })
}

/// Arithmetic mean of present values; `None` when all are missing.
fn mean_of_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.flatten().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        sample: &str,
        tool: &str,
        index: i64,
        cluster_type: &str,
        start: f64,
        end: f64,
        score: Option<f64>,
    ) -> BgcRecord {
        BgcRecord {
            sample_id: sample.into(),
            tool: tool.into(),
            cluster_index: index,
            cluster_type: cluster_type.into(),
            start,
            end,
            score,
            core_enzymes: vec![],
            mibig_hits: vec![],
        }
    }

    #[test]
    fn overlapping_predictions_merge_into_one_entity() {
        let mut a = record("S1", "antismash", 1, "NRPS", 0.0, 100.0, Some(80.0));
        a.core_enzymes = vec!["a".into()];
        let mut b = record("S1", "deepbgc", 1, "NRPS", 10.0, 110.0, Some(0.9));
        b.core_enzymes = vec!["b".into()];
        b.mibig_hits = vec!["X".into()];

        let unified = unify_bgcs(vec![a, b], 0.5);
        assert_eq!(unified.len(), 1);
        let row = &unified[0];
        assert_eq!(row.bgc_uid, "S1_BGCUID_001");
        assert_eq!(row.tool, "antismash|deepbgc");
        assert_eq!(row.start, 0.0);
        assert_eq!(row.end, 110.0);
        assert_eq!(row.core_enzymes, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(row.mibig_hits, vec!["X".to_string()]);
        assert_eq!(
            row.member_bgc_ids,
            vec!["S1_antismash_1".to_string(), "S1_deepbgc_1".to_string()]
        );
        // Mean over both tool scores, scale differences and all.
        assert!((row.score.unwrap() - 40.45).abs() < 1e-9);
    }

    #[test]
    fn disjoint_predictions_stay_separate() {
        let a = record("S1", "antismash", 1, "NRPS", 0.0, 100.0, Some(80.0));
        let b = record("S1", "deepbgc", 2, "PKS", 120.0, 220.0, Some(0.8));
        let unified = unify_bgcs(vec![a, b], 0.5);
        assert_eq!(unified.len(), 2);
        assert_eq!(unified[0].bgc_uid, "S1_BGCUID_001");
        assert_eq!(unified[1].bgc_uid, "S1_BGCUID_002");
        let tools: Vec<&str> = unified.iter().map(|u| u.tool.as_str()).collect();
        assert_eq!(tools, vec!["antismash", "deepbgc"]);
    }

    #[test]
    fn merging_is_threshold_monotonic() {
        // Reciprocal overlap of [0,100] and [60,160] is 0.4.
        let rows = vec![
            record("S1", "antismash", 1, "NRPS", 0.0, 100.0, Some(80.0)),
            record("S1", "prism", 1, "NRPS", 60.0, 160.0, Some(0.7)),
        ];
        assert_eq!(unify_bgcs(rows.clone(), 0.4).len(), 1);
        assert_eq!(unify_bgcs(rows, 0.6).len(), 2);
    }

    #[test]
    fn singleton_sample_passes_through_verbatim() {
        let mut row = record("S2", "prism", 7, "PKS|NRPS", 5.0, 50.0, None);
        row.core_enzymes = vec!["z".into(), "a".into()];
        let unified = unify_bgcs(vec![row], 0.5);
        assert_eq!(unified.len(), 1);
        let out = &unified[0];
        assert_eq!(out.bgc_uid, "S2_BGCUID_001");
        assert_eq!(out.tool, "prism");
        assert_eq!(out.cluster_type, "PKS|NRPS");
        // Pass-through keeps the original tag order.
        assert_eq!(out.core_enzymes, vec!["z".to_string(), "a".to_string()]);
        assert_eq!(out.score, None);
        assert_eq!(out.member_bgc_ids, vec!["S2_prism_7".to_string()]);
    }

    #[test]
    fn membership_partitions_the_sample() {
        let rows = vec![
            record("S1", "antismash", 1, "NRPS", 0.0, 100.0, Some(1.0)),
            record("S1", "deepbgc", 1, "NRPS", 5.0, 105.0, Some(1.0)),
            record("S1", "prism", 1, "PKS", 500.0, 600.0, Some(1.0)),
        ];
        let unified = unify_bgcs(rows, 0.5);
        let mut members: Vec<String> = unified
            .iter()
            .flat_map(|u| u.member_bgc_ids.iter().cloned())
            .collect();
        members.sort();
        assert_eq!(
            members,
            vec!["S1_antismash_1", "S1_deepbgc_1", "S1_prism_1"]
        );
        // Every member interval is covered by its group's span.
        for group in &unified {
            assert!(group.start <= group.end);
        }
    }

    #[test]
    fn uid_sequence_restarts_per_sample_in_sorted_order() {
        let rows = vec![
            record("S2", "antismash", 1, "NRPS", 200.0, 300.0, None),
            record("S1", "antismash", 1, "NRPS", 50.0, 150.0, None),
            record("S1", "antismash", 2, "PKS", 0.0, 40.0, None),
        ];
        let unified = unify_bgcs(rows, 0.5);
        let uids: Vec<&str> = unified.iter().map(|u| u.bgc_uid.as_str()).collect();
        // S1 rows sorted by Start before assignment; S2 restarts at 001.
        assert_eq!(
            uids,
            vec!["S1_BGCUID_001", "S1_BGCUID_002", "S2_BGCUID_001"]
        );
        assert_eq!(unified[0].start, 0.0);
    }

    #[test]
    fn chained_overlaps_merge_transitively() {
        // a-b and b-c overlap above threshold, a-c do not; one group anyway.
        let rows = vec![
            record("S1", "antismash", 1, "NRPS", 0.0, 100.0, Some(1.0)),
            record("S1", "deepbgc", 1, "NRPS", 40.0, 140.0, Some(1.0)),
            record("S1", "prism", 1, "NRPS", 80.0, 180.0, Some(1.0)),
        ];
        let unified = unify_bgcs(rows, 0.5);
        assert_eq!(unified.len(), 1);
        assert_eq!(unified[0].start, 0.0);
        assert_eq!(unified[0].end, 180.0);
        assert_eq!(unified[0].member_bgc_ids.len(), 3);
    }

    #[test]
    fn missing_sample_id_rows_are_dropped() {
        let rows = vec![
            record("", "antismash", 1, "NRPS", 0.0, 100.0, None),
            record("S1", "antismash", 1, "NRPS", 0.0, 100.0, None),
        ];
        let unified = unify_bgcs(rows, 0.5);
        assert_eq!(unified.len(), 1);
        assert_eq!(unified[0].sample_id, "S1");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(unify_bgcs(Vec::new(), 0.5).is_empty());
    }

    #[test]
    fn all_missing_scores_stay_missing_after_merge() {
        let rows = vec![
            record("S1", "antismash", 1, "NRPS", 0.0, 100.0, None),
            record("S1", "deepbgc", 1, "NRPS", 0.0, 100.0, None),
        ];
        let unified = unify_bgcs(rows, 0.5);
        assert_eq!(unified.len(), 1);
        assert_eq!(unified[0].score, None);
    }
}
