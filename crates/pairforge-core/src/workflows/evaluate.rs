use crate::core::forcefield::PotentialMap;
use crate::core::models::configuration::Configuration;
use crate::engine::config::EnergyConfig;
use crate::engine::distributor::ProcessPool;
use crate::engine::error::EngineError;
use crate::engine::kernel::EnergyKernel;
use crate::engine::tasks::{self, EnergyBreakdown};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReport {
    pub breakdown: EnergyBreakdown,
    /// Brute-force pairwise energy, present when a reference check was requested.
    pub reference: Option<f64>,
    pub n_atoms: usize,
    pub n_molecules: usize,
    pub n_cell_pairs: usize,
}

impl EnergyReport {
    pub fn total(&self) -> f64 {
        self.breakdown.total()
    }
}

/// Builds the cell grid of `configuration` for the settings in `config`.
#[instrument(skip_all, name = "prepare_workflow")]
pub fn prepare(
    configuration: &mut Configuration,
    config: &EnergyConfig,
) -> Result<(), EngineError> {
    configuration.generate_cells(config.cell_size, config.cutoff)?;
    Ok(())
}

/// Evaluates the energy of a gridded configuration on the calling worker of `pool`.
///
/// Every worker of the pool must call this together, since the evaluation reduces across the
/// workers selected by `config.strategy`.
#[instrument(skip_all, name = "evaluate_workflow")]
pub fn run<P: ProcessPool>(
    configuration: &Configuration,
    potential_map: &PotentialMap,
    config: &EnergyConfig,
    pool: &P,
) -> Result<EnergyReport, EngineError> {
    let cells = configuration
        .cells()
        .ok_or(EngineError::GridNotGenerated)?;
    if config.cutoff > cells.cutoff() {
        return Err(EngineError::CutoffExceedsGrid {
            cutoff: config.cutoff,
            grid_cutoff: cells.cutoff(),
        });
    }
    if config.cutoff > potential_map.range() {
        warn!(
            cutoff = config.cutoff,
            range = potential_map.range(),
            "Cutoff exceeds the potential range; shifted electrostatics change sign beyond it."
        );
    }

    let kernel = EnergyKernel::new(configuration, potential_map, pool, config.cutoff);
    let breakdown = tasks::total_energy::run(&kernel, config.strategy);

    let reference = match config.reference_check {
        Some(tolerance) => {
            let reference =
                tasks::reference_energy::run(configuration, potential_map, config.cutoff);
            let production = breakdown.interatomic;
            let scale = production.abs().max(reference.abs()).max(1.0);
            if (production - reference).abs() > tolerance * scale {
                return Err(EngineError::ReferenceMismatch {
                    production,
                    reference,
                    tolerance,
                });
            }
            Some(reference)
        }
        None => None,
    };

    let report = EnergyReport {
        breakdown,
        reference,
        n_atoms: configuration.n_atoms(),
        n_molecules: configuration.n_molecules(),
        n_cell_pairs: cells.neighbour_pairs().len(),
    };
    info!(
        total = report.total(),
        interatomic = breakdown.interatomic,
        intramolecular = breakdown.intramolecular.total(),
        atoms = report.n_atoms,
        molecules = report.n_molecules,
        "Energy evaluation finished."
    );
    Ok(report)
}
