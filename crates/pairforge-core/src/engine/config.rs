use super::distributor::DivisionStrategy;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Parameter '{name}' must be finite and positive, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Settings for one energy evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyConfig {
    /// Interaction cutoff in Angstroms.
    pub cutoff: f64,
    /// Minimum edge length of a grid cell in Angstroms.
    pub cell_size: f64,
    pub strategy: DivisionStrategy,
    /// Relative tolerance for cross-checking against the brute-force reference, if requested.
    pub reference_check: Option<f64>,
}

#[derive(Default)]
pub struct EnergyConfigBuilder {
    cutoff: Option<f64>,
    cell_size: Option<f64>,
    strategy: Option<DivisionStrategy>,
    reference_check: Option<f64>,
}

impl EnergyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }
    pub fn cell_size(mut self, size: f64) -> Self {
        self.cell_size = Some(size);
        self
    }
    pub fn strategy(mut self, strategy: DivisionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
    pub fn reference_check(mut self, relative_tolerance: f64) -> Self {
        self.reference_check = Some(relative_tolerance);
        self
    }

    pub fn build(self) -> Result<EnergyConfig, ConfigError> {
        let config = EnergyConfig {
            cutoff: self
                .cutoff
                .ok_or(ConfigError::MissingParameter("cutoff"))?,
            cell_size: self
                .cell_size
                .ok_or(ConfigError::MissingParameter("cell_size"))?,
            strategy: self.strategy.unwrap_or_default(),
            reference_check: self.reference_check,
        };
        positive("cutoff", config.cutoff)?;
        positive("cell_size", config.cell_size)?;
        if let Some(tolerance) = config.reference_check {
            positive("reference_check", tolerance)?;
        }
        Ok(config)
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}
