pub mod molecule_energies;
pub mod reference_energy;
pub mod total_energy;

pub use total_energy::EnergyBreakdown;
