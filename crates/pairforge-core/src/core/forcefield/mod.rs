//! # Forcefield Module
//!
//! Energy functions consumed by the kernel.
//!
//! - [`potentials`] - Pure pair-potential functions (Lennard-Jones, Buckingham, Coulomb)
//! - [`potential_map`] - Per-type-pair lookup table with mixing rules and overrides
//! - [`params`] - TOML parameter files for the potential map
//! - [`intramolecular`] - Bonded terms and their functional forms
//! - [`term`] - Bonded energy aggregated by term kind

pub mod intramolecular;
pub mod params;
pub mod potential_map;
pub mod potentials;
pub mod term;

pub use potential_map::{AtomType, PairPotential, PotentialMap};
pub use term::IntramolecularEnergy;
