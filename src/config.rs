//! Configuration for structure detection and sub-model construction
//!
//! A [`DecompConfig`] value is passed explicitly into the pipeline entry
//! point; there are no process-wide settings.

use crate::constants::{is_finite_bound, DEFAULT_IMBALANCE_PERCENT, DEFAULT_NUM_BLOCKS};
use crate::error::{DecompError, DecompResult};

/// How vertex and hyperedge weights are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightPolicy {
    /// Every vertex and hyperedge weighs 1
    #[default]
    Uniform,
    /// Vertices on integer columns weigh 2; hyperedges touching an integer
    /// column weigh twice their size
    IntegerBiased,
}

/// Shape of the border the partition is allowed to leave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Coupling rows only (row-net model)
    #[default]
    Singly,
    /// Coupling rows and coupling columns (row and column nets)
    Doubly,
}

/// What a hypergraph vertex stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexModel {
    /// One vertex per nonzero entry
    #[default]
    Nonzero,
    /// One vertex per column (singly-bordered only)
    Column,
}

/// Column space of a sub-model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelMode {
    /// Only the block's active columns, with a local index map
    #[default]
    Sparse,
    /// All original columns, local id == original id
    Dense,
}

/// Optimization direction of the original objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

/// Replacement bounds for columns whose bounds exceed the infinity threshold
///
/// An override only takes effect when it is itself finite.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundOverride {
    /// Used in place of lower bounds below `-1e15`
    pub lower: Option<f64>,
    /// Used in place of upper bounds above `1e15`
    pub upper: Option<f64>,
}

impl BoundOverride {
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    /// The lower override, if configured and finite
    pub fn active_lower(&self) -> Option<f64> {
        self.lower.filter(|&v| is_finite_bound(v))
    }

    /// The upper override, if configured and finite
    pub fn active_upper(&self) -> Option<f64> {
        self.upper.filter(|&v| is_finite_bound(v))
    }
}

/// Configuration for one decomposition attempt
#[derive(Debug, Clone)]
pub struct DecompConfig {
    /// Number of parts requested from the partitioning oracle
    pub num_blocks: usize,

    /// Maximum load imbalance handed to the oracle, in percent
    pub imbalance: u32,

    pub weight_policy: WeightPolicy,

    pub border_mode: BorderMode,

    pub vertex_model: VertexModel,

    /// Column space of real block sub-models
    pub block_mode: ModelMode,

    /// Column space of the core model
    pub core_mode: ModelMode,

    /// Bound replacement for unbounded columns
    pub bounds: BoundOverride,

    /// Whether row and column names are copied into sub-models
    pub use_names: bool,

    pub objective_sense: ObjectiveSense,

    /// Worker threads for per-block construction; 1 runs sequentially
    pub threads: usize,
}

impl Default for DecompConfig {
    fn default() -> Self {
        Self {
            num_blocks: DEFAULT_NUM_BLOCKS,
            imbalance: DEFAULT_IMBALANCE_PERCENT,
            weight_policy: WeightPolicy::default(),
            border_mode: BorderMode::default(),
            vertex_model: VertexModel::default(),
            block_mode: ModelMode::Sparse,
            core_mode: ModelMode::Dense,
            bounds: BoundOverride::default(),
            use_names: true,
            objective_sense: ObjectiveSense::default(),
            threads: num_cpus::get(),
        }
    }
}

impl DecompConfig {
    /// Create a config requesting `num_blocks` parts, defaults elsewhere
    pub fn with_blocks(num_blocks: usize) -> Self {
        Self {
            num_blocks,
            ..Self::default()
        }
    }

    pub fn weight_policy(mut self, policy: WeightPolicy) -> Self {
        self.weight_policy = policy;
        self
    }

    pub fn border_mode(mut self, mode: BorderMode) -> Self {
        self.border_mode = mode;
        self
    }

    pub fn vertex_model(mut self, model: VertexModel) -> Self {
        self.vertex_model = model;
        self
    }

    pub fn block_mode(mut self, mode: ModelMode) -> Self {
        self.block_mode = mode;
        self
    }

    pub fn core_mode(mut self, mode: ModelMode) -> Self {
        self.core_mode = mode;
        self
    }

    pub fn column_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.bounds = BoundOverride::new(lower, upper);
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn objective_sense(mut self, sense: ObjectiveSense) -> Self {
        self.objective_sense = sense;
        self
    }

    /// Rejects settings no stage can honour
    pub fn validate(&self) -> DecompResult<()> {
        if self.num_blocks == 0 {
            return Err(DecompError::InvalidConfig(
                "num_blocks must be at least 1".to_string(),
            ));
        }
        if self.threads == 0 {
            return Err(DecompError::InvalidConfig(
                "threads must be at least 1".to_string(),
            ));
        }
        if self.border_mode == BorderMode::Doubly && self.vertex_model == VertexModel::Column {
            return Err(DecompError::InvalidConfig(
                "doubly-bordered detection needs one vertex per nonzero".to_string(),
            ));
        }
        let nan = |v: Option<f64>| v.map_or(false, f64::is_nan);
        if nan(self.bounds.lower) || nan(self.bounds.upper) {
            return Err(DecompError::InvalidConfig(
                "column bound overrides must not be NaN".to_string(),
            ));
        }
        Ok(())
    }
}
