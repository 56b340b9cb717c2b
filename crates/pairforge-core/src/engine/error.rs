use thiserror::Error;

use super::config::ConfigError;
use super::distributor::PoolError;
use crate::core::forcefield::params::ParamLoadError;
use crate::core::geometry::BoxError;
use crate::core::grid::GridError;
use crate::core::models::configuration::ConfigurationError;
use crate::core::models::species::SpeciesError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid simulation box: {source}")]
    Box {
        #[from]
        source: BoxError,
    },

    #[error("Cell grid generation failed: {source}")]
    Grid {
        #[from]
        source: GridError,
    },

    #[error("Failed to load pair parameters: {source}")]
    Params {
        #[from]
        source: ParamLoadError,
    },

    #[error("Invalid species definition: {source}")]
    Species {
        #[from]
        source: SpeciesError,
    },

    #[error("Invalid configuration: {source}")]
    Configuration {
        #[from]
        source: ConfigurationError,
    },

    #[error("Invalid process pool: {source}")]
    Pool {
        #[from]
        source: PoolError,
    },

    #[error("Invalid evaluation settings: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("The configuration has no cell array; generate the cells before evaluating")]
    GridNotGenerated,

    #[error("Cutoff {cutoff} exceeds the cutoff {grid_cutoff} the cell array was built for")]
    CutoffExceedsGrid { cutoff: f64, grid_cutoff: f64 },

    #[error(
        "Cell-based energy {production} disagrees with the reference {reference} beyond relative tolerance {tolerance}"
    )]
    ReferenceMismatch {
        production: f64,
        reference: f64,
        tolerance: f64,
    },
}
