//! Default constants for engine configuration.
//!
//! All tunable magic numbers are centralized here with documentation.

// =============================================================================
// Unification Defaults
// =============================================================================

/// Minimum reciprocal overlap for two loci to be merged into one BGCUID.
/// Raising this never decreases the number of unified groups.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.5;

// =============================================================================
// Evidence Linking Defaults
// =============================================================================

/// Base score awarded when a BGC cluster-type token maps to the compound's
/// reference source (bgc_compound evidence).
pub const DEFAULT_ALPHA: f64 = 0.4;

/// Bonus added on top of alpha when the BGC carries at least one MIBiG
/// cross-reference hit; the sum is capped at 1.0.
pub const DEFAULT_BETA: f64 = 0.2;

/// Fixed score for a feature m/z matching a compound's estimated mass within
/// the ppm tolerance (feature_compound evidence).
pub const DEFAULT_GAMMA: f64 = 0.7;

/// Multiplier on normalized feature intensity for same-sample co-occurrence
/// (bgc_feature evidence); the product is capped at 1.0.
pub const DEFAULT_DELTA: f64 = 0.5;

/// Parts-per-million window for mass matching.
pub const DEFAULT_PPM_TOLERANCE: f64 = 10.0;

/// Normalized-intensity floor below which co-occurrence pairs score zero.
pub const DEFAULT_INTENSITY_FLOOR: f64 = 0.01;

// =============================================================================
// Ranking Defaults
// =============================================================================

/// Weight on the mean evidence score. The three weights are applied as-is;
/// the engine never renormalizes them.
pub const DEFAULT_WEIGHT_EVIDENCE: f64 = 0.6;

/// Weight on the ADMET pass flag.
pub const DEFAULT_WEIGHT_ADMET: f64 = 0.3;

/// Weight on inverse-cluster-size novelty.
pub const DEFAULT_WEIGHT_NOVELTY: f64 = 0.1;

/// Number of top candidates surfaced by summary outputs.
pub const DEFAULT_TOP_N: usize = 5;
