//! # Bgcrank
//!
//! An entity-resolution and evidence-fusion engine for natural-product drug
//! discovery. It reconciles overlapping biosynthetic-gene-cluster (BGC)
//! predictions from multiple callers into unified genomic entities, scores
//! heuristic cross-domain links among BGCs, LC-MS/MS features, and chemical
//! reference compounds, and aggregates the evidence with drug-likeness and
//! novelty signals into a ranked candidate list.

pub mod config;
pub mod dsu;
pub mod error;
pub mod linker;
pub mod locus;
pub mod model;
pub mod ranker;
pub mod tables;
pub mod unifier;

// Re-export main types for convenience
pub use config::{ConfigOverrides, EngineConfig, LinkingConfig, RankingConfig, UnifyConfig};
pub use error::{EngineError, Result};
pub use model::{
    AdmetRecord, BgcRecord, ChemCluster, Compound, EvidenceRecord, EvidenceType, MsFeature,
    RankedCandidate, UnifiedBgc,
};

/// Main API: the three-stage integration pipeline.
///
/// Each stage is a pure function of its inputs and the immutable
/// configuration; re-running any stage on the same inputs reproduces its
/// output exactly.
pub struct Pipeline {
    config: EngineConfig,
}

impl Pipeline {
    /// Create a pipeline with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stage 1: merge reciprocally-overlapping per-tool predictions into
    /// unified BGC entities.
    pub fn unify(&self, records: Vec<BgcRecord>) -> Vec<UnifiedBgc> {
        unifier::unify_bgcs(records, self.config.unify.overlap_threshold)
    }

    /// Stage 2: score heuristic cross-domain evidence links.
    pub fn link(
        &self,
        bgcs: &[UnifiedBgc],
        features: &[MsFeature],
        compounds: &[Compound],
    ) -> Vec<EvidenceRecord> {
        linker::link_evidence(bgcs, features, compounds, &self.config.linking)
    }

    /// Stage 3: aggregate evidence per compound and produce the ranking.
    pub fn rank(
        &self,
        evidence: &[EvidenceRecord],
        admet: &[AdmetRecord],
        clusters: &[ChemCluster],
    ) -> Vec<RankedCandidate> {
        ranker::rank_candidates(evidence, admet, clusters, &self.config.ranking)
    }

    /// Run all three stages end to end.
    pub fn run(
        &self,
        records: Vec<BgcRecord>,
        features: &[MsFeature],
        compounds: &[Compound],
        admet: &[AdmetRecord],
        clusters: &[ChemCluster],
    ) -> PipelineOutput {
        let unified = self.unify(records);
        let evidence = self.link(&unified, features, compounds);
        let ranked = self.rank(&evidence, admet, clusters);
        PipelineOutput {
            unified,
            evidence,
            ranked,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// The artifacts of a full pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub unified: Vec<UnifiedBgc>,
    pub evidence: Vec<EvidenceRecord>,
    pub ranked: Vec<RankedCandidate>,
}
