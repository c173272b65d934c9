//! Configuration for seed selection, scene expansion and local selection.
//!
//! Every struct implements `Default`, so a YAML file
//! only needs to list the values it changes:
//!
//! ```yaml
//! local:
//!   max_views: 6
//! ```

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for seed selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Number of best 3D motions summed into a view's seed score.
    pub max_motions: usize,

    /// Seeds must score above this fraction of the best seed score.
    pub min_score_fraction: f64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            max_motions: 3,
            min_score_fraction: 0.2,
        }
    }
}

/// Configuration for growing the scene from a seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Minimum features shared by the seed and its motions. Below this no
    /// projective estimate is possible.
    pub min_common_features: usize,

    /// Cap on the number of resolved neighbors counted when ranking open views.
    pub max_valid_neighbors: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            min_common_features: 6,
            max_valid_neighbors: 3,
        }
    }
}

/// Configuration for selecting a local neighborhood around a view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSelectConfig {
    /// Maximum number of views in the local graph, target included.
    pub max_views: usize,

    /// A view considered for removal is scored by the N-th best of its
    /// remaining connections.
    pub worst_of_top: usize,

    /// Direct neighbors of the target which are never pruned.
    pub min_neighbors: usize,
}

impl Default for LocalSelectConfig {
    fn default() -> Self {
        Self {
            max_views: 10,
            worst_of_top: 3,
            min_neighbors: 2,
        }
    }
}

/// All settings of the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    pub seed: SeedConfig,
    pub expansion: ExpansionConfig,
    pub local: LocalSelectConfig,
}

impl ReconstructionConfig {
    /// Load a configuration from a YAML file. Missing fields keep their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let config = serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// The configuration as YAML, every field included.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}
