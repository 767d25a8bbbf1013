//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::DomainError;
use crate::host::EngineError;
use crate::source::SourceError;

/// Any failure the overlay crate reports.
///
/// Unresolvable coordinates and empty inputs are not errors and never show
/// up here.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),
}
