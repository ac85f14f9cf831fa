//! # Data Model
//!
//! Core data structures for the integration engine: per-tool BGC records,
//! unified BGC entities, MS features, reference compounds, typed evidence
//! relations, external metadata rows, and the terminal ranked candidate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single BGC prediction row after adapter standardization, before
/// unification. One row per (sample, tool, cluster index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgcRecord {
    pub sample_id: String,
    /// Originating prediction tool (e.g. "antismash", "deepbgc", "prism").
    pub tool: String,
    pub cluster_index: i64,
    /// Free-text cluster type tag; may be multi-valued, joined by '|' or ','.
    pub cluster_type: String,
    /// Genomic coordinates. End >= Start is expected but not enforced
    /// upstream; degenerate intervals score zero overlap.
    pub start: f64,
    pub end: f64,
    /// Tool-native confidence. Scale varies by tool; only averaged, never
    /// compared across tools.
    pub score: Option<f64>,
    pub core_enzymes: Vec<String>,
    pub mibig_hits: Vec<String>,
}

impl BgcRecord {
    /// Derived identifier, unique per input row.
    pub fn bgc_id(&self) -> String {
        format!("{}_{}_{}", self.sample_id, self.tool, self.cluster_index)
    }

    /// Interval length; non-positive for degenerate or reversed coordinates.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// The result of merging one or more reciprocally-overlapping [`BgcRecord`]s
/// within a sample. Produced once by the unifier, read-only afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedBgc {
    /// Sample-scoped sequential identifier, `{SampleID}_BGCUID_{seq:03}`.
    pub bgc_uid: String,
    pub sample_id: String,
    /// Union of contributing tool names, pipe-joined, sorted.
    pub tool: String,
    /// Union of non-empty cluster types, pipe-joined, sorted.
    pub cluster_type: String,
    /// Minimum member start; covers all members' intervals.
    pub start: f64,
    /// Maximum member end.
    pub end: f64,
    /// Mean of members' non-missing scores; `None` when no member has one.
    pub score: Option<f64>,
    pub core_enzymes: Vec<String>,
    pub mibig_hits: Vec<String>,
    /// Contributing BGCIDs in original row order.
    pub member_bgc_ids: Vec<String>,
}

/// A normalized LC-MS/MS feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsFeature {
    pub feature_id: String,
    pub sample_id: String,
    pub mz: f64,
    pub rt: f64,
    pub intensity: f64,
    /// Within-sample TIC-normalized intensity, when the upstream adapter
    /// already computed it. The linker derives it on the fly otherwise.
    pub intensity_normalized: Option<f64>,
}

/// A chemical reference compound. The structural string is accepted verbatim;
/// the engine never validates chemistry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compound {
    pub compound_id: String,
    pub name: String,
    /// Reference source collection (e.g. "NPAtlas", "MIBiG").
    pub source: String,
    pub smiles: String,
    pub known_activity: String,
}

/// The relation class of an evidence record. Each class links exactly two of
/// {BGCUID, FeatureID, CompoundID}; the third identifier is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    BgcCompound,
    FeatureCompound,
    BgcFeature,
}

impl EvidenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::BgcCompound => "bgc_compound",
            EvidenceType::FeatureCompound => "feature_compound",
            EvidenceType::BgcFeature => "bgc_feature",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bgc_compound" => Some(EvidenceType::BgcCompound),
            "feature_compound" => Some(EvidenceType::FeatureCompound),
            "bgc_feature" => Some(EvidenceType::BgcFeature),
            _ => None,
        }
    }
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored, typed relation between two of {BGC, feature, compound}.
///
/// Invariants: the score is clamped to [0,1] and rounded to four decimals;
/// absent identifiers are empty strings, never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub bgc_uid: String,
    pub feature_id: String,
    pub compound_id: String,
    pub evidence_type: EvidenceType,
    pub evidence_score: f64,
    pub notes: String,
}

/// Externally computed drug-likeness row, left-joined by the ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmetRecord {
    pub compound_id: String,
    pub mw: Option<f64>,
    pub logp: Option<f64>,
    pub tpsa: Option<f64>,
    pub qed: Option<f64>,
    pub rule_of_five_pass: Option<bool>,
}

/// Externally computed chemical-similarity cluster membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemCluster {
    pub compound_id: String,
    pub cluster_id: String,
    pub cluster_size: Option<u64>,
}

/// One row of the terminal ranking, regenerated wholesale on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub compound_id: String,
    /// 1-based position after the stable descending sort on AggregateScore.
    pub rank: u64,
    pub aggregate_score: f64,
    /// Arithmetic mean over all evidence rows mentioning the compound.
    pub evidence_score: f64,
    pub evidence_count: u64,
    /// Sorted set of directly linked BGCUIDs.
    pub bgc_uids: Vec<String>,
    /// Sorted set of linked FeatureIDs, including features propagated through
    /// shared-BGC co-occurrence.
    pub feature_ids: Vec<String>,
    /// Drug-likeness pass flag coerced to {0, 1}; 0 when unmatched.
    pub admet_score: f64,
    /// 1/ClusterSize when known and positive, else 1.0.
    pub novelty: f64,
    /// ADMET descriptors joined through from the metadata table.
    pub mw: Option<f64>,
    pub logp: Option<f64>,
    pub tpsa: Option<f64>,
    pub qed: Option<f64>,
    pub rule_of_five_pass: Option<bool>,
    pub cluster_id: Option<String>,
    pub cluster_size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgc_id_concatenates_sample_tool_index() {
        let record = BgcRecord {
            sample_id: "S1".into(),
            tool: "antismash".into(),
            cluster_index: 3,
            cluster_type: "NRPS".into(),
            start: 0.0,
            end: 100.0,
            score: Some(80.0),
            core_enzymes: vec![],
            mibig_hits: vec![],
        };
        assert_eq!(record.bgc_id(), "S1_antismash_3");
        assert_eq!(record.length(), 100.0);
    }

    #[test]
    fn evidence_type_round_trips_through_strings() {
        for ty in [
            EvidenceType::BgcCompound,
            EvidenceType::FeatureCompound,
            EvidenceType::BgcFeature,
        ] {
            assert_eq!(EvidenceType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(EvidenceType::parse("phylogeny"), None);
    }

    #[test]
    fn evidence_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&EvidenceType::FeatureCompound).unwrap();
        assert_eq!(json, "\"feature_compound\"");
    }
}
