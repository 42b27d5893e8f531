//! Construction-time configuration and its validation.
//!
//! Invalid configuration is rejected up front at construction, rather than
//! discovered partway through a build.

use thiserror::Error;

/// Which family of model a node fits, set index-wide at construction.
///
/// A tagged enum rather than a trait object: model choice doesn't vary
/// per node, so dynamic dispatch would buy nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Interpolation,
    Regression,
}

#[derive(Debug, Clone, Copy)]
pub struct CIConfig {
    pub fanout: usize,
    pub error_bound: u64,
    pub outlier_threshold: f64,
    pub min_node_size: usize,
    pub max_height: usize,
    pub model_kind: ModelKind,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("fanout must be >= 2, got {0}")]
    FanoutTooSmall(usize),
    #[error("error_bound must be >= 1, got {0}")]
    ErrorBoundTooSmall(u64),
    #[error("outlier_threshold must be in (0, 1], got {0}")]
    OutlierThresholdOutOfRange(f64),
    #[error("min_node_size must be >= 1, got {0}")]
    MinNodeSizeTooSmall(usize),
    #[error("max_height must be >= 1, got {0}")]
    MaxHeightTooSmall(usize),
}

impl CIConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fanout < 2 {
            return Err(ConfigError::FanoutTooSmall(self.fanout));
        }
        if self.error_bound < 1 {
            return Err(ConfigError::ErrorBoundTooSmall(self.error_bound));
        }
        if !(self.outlier_threshold > 0.0 && self.outlier_threshold <= 1.0) {
            return Err(ConfigError::OutlierThresholdOutOfRange(self.outlier_threshold));
        }
        if self.min_node_size < 1 {
            return Err(ConfigError::MinNodeSizeTooSmall(self.min_node_size));
        }
        if self.max_height < 1 {
            return Err(ConfigError::MaxHeightTooSmall(self.max_height));
        }
        Ok(())
    }
}
