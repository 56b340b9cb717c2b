use crate::core::forcefield::IntramolecularEnergy;
use crate::engine::distributor::{DivisionStrategy, ProcessPool};
use crate::engine::kernel::EnergyKernel;
use tracing::{debug, instrument};

/// Energy of a configuration split into its pairwise and bonded parts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyBreakdown {
    /// Pairwise energy with intramolecular scaling applied.
    pub interatomic: f64,
    pub intramolecular: IntramolecularEnergy,
}

impl EnergyBreakdown {
    #[inline]
    pub fn total(&self) -> f64 {
        self.interatomic + self.intramolecular.total()
    }
}

/// Computes the full energy of the kernel's configuration, reduced over `strategy`.
#[instrument(skip_all, name = "total_energy_task")]
pub fn run<P: ProcessPool>(
    kernel: &EnergyKernel<'_, P>,
    strategy: DivisionStrategy,
) -> EnergyBreakdown {
    let interatomic = kernel.total_energy(true, strategy, true);
    let intramolecular = kernel.intramolecular_energy(strategy, true);
    debug!(
        interatomic,
        bond = intramolecular.bond,
        angle = intramolecular.angle,
        torsion = intramolecular.torsion,
        improper = intramolecular.improper,
        "Total energy evaluated."
    );
    EnergyBreakdown {
        interatomic,
        intramolecular,
    }
}
