//! Engine configuration
//!
//! ```toml
//! path_matching = "exact"
//! max_path_depth = 4
//! text_comparison = "ordinal_ignore_case"
//! null_ordering = "nulls_last"
//! max_filter_count = 32
//! max_sort_count = 4
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use serde::{Deserialize, Serialize};

use crate::errors::{QueryError, Result};
use crate::expr::TextComparison;
use crate::model::NullOrdering;
use crate::path::{PathMatching, PathResolver, DEFAULT_MAX_PATH_DEPTH};

pub const DEFAULT_MAX_FILTER_COUNT: usize = 64;
pub const DEFAULT_MAX_SORT_COUNT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Segment lookup mode for the path resolver
    pub path_matching: PathMatching,

    /// Maximum number of segments in a dotted path
    pub max_path_depth: usize,

    /// Comparison used by Contains / StartsWith / EndsWith
    pub text_comparison: TextComparison,

    /// Placement of null keys when ordering in memory.
    /// `nulls_first` treats null as the smallest value, so descending
    /// order puts nulls last.
    pub null_ordering: NullOrdering,

    /// Largest filter descriptor list a builder accepts
    pub max_filter_count: usize,

    /// Largest sort descriptor list a builder accepts
    pub max_sort_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path_matching: PathMatching::default(),
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
            text_comparison: TextComparison::default(),
            null_ordering: NullOrdering::default(),
            max_filter_count: DEFAULT_MAX_FILTER_COUNT,
            max_sort_count: DEFAULT_MAX_SORT_COUNT,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `Config` for malformed TOML, unknown keys, bad enum values or
    /// a zero limit.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `Config` if `max_path_depth`, `max_filter_count` or
    /// `max_sort_count` is zero.
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("max_path_depth", self.max_path_depth),
            ("max_filter_count", self.max_filter_count),
            ("max_sort_count", self.max_sort_count),
        ];
        for (key, limit) in limits {
            if limit == 0 {
                return Err(QueryError::Config {
                    message: format!("{key} must be at least 1"),
                });
            }
        }
        Ok(())
    }

    pub fn path_resolver(&self) -> PathResolver {
        PathResolver::new(self.path_matching, self.max_path_depth)
    }
}
