//! Centralized constants for structure detection
//!
//! Numeric thresholds shared by the hypergraph builder, the sub-model builder
//! and the default configuration live here rather than scattered through the
//! pipeline stages.

// ============================================================================
// BOUND HANDLING
// ============================================================================

/// Magnitude above which a column bound is treated as infinite
pub const INFINITE_BOUND: f64 = 1.0e15;

// ============================================================================
// HYPERGRAPH WEIGHTS
// ============================================================================

/// Weight of a vertex or hyperedge under the uniform policy
pub const UNIT_WEIGHT: u32 = 1;

/// Multiplier applied to integer-touching vertices and hyperedges
pub const INTEGER_WEIGHT_FACTOR: u32 = 2;

// ============================================================================
// PARTITIONING DEFAULTS
// ============================================================================

/// Default number of parts requested from the oracle
pub const DEFAULT_NUM_BLOCKS: usize = 2;

/// Default maximum load imbalance, in percent
pub const DEFAULT_IMBALANCE_PERCENT: u32 = 5;

// ============================================================================
// MODEL NAMES
// ============================================================================

/// Name given to the core model
pub const CORE_MODEL_NAME: &str = "core";

/// Prefix for real block sub-models
pub const RELAX_MODEL_PREFIX: &str = "relax";

/// Prefix for synthetic master-only blocks
pub const MASTER_ONLY_PREFIX: &str = "master_only";

/// Returns true if `value` is a finite override in the sense of the bound policy
#[inline]
pub fn is_finite_bound(value: f64) -> bool {
    value.abs() < INFINITE_BOUND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_bound_threshold() {
        assert!(is_finite_bound(1000.0));
        assert!(is_finite_bound(-1.0e14));
        assert!(!is_finite_bound(1.0e15));
        assert!(!is_finite_bound(f64::INFINITY));
        assert!(!is_finite_bound(f64::NAN));
    }
}
