//! # Core Models Module
//!
//! Data structures describing an atomistic configuration.
//!
//! ## Key Components
//!
//! - [`atom`] - Point particles with a type, an owning molecule, and a cell back-reference
//! - [`species`] - Molecular templates with bonded terms and intramolecular scaling factors
//! - [`molecule`] - Instances of a species
//! - [`configuration`] - The box, atom arena, molecules, species, and cell array together
//! - [`ids`] - Slot-map keys for molecules and species
//!
//! ```ignore
//! use pairforge::core::models::{configuration::Configuration, species::Species};
//!
//! let mut configuration = Configuration::new(PeriodicBox::cubic(20.0)?);
//! let species = configuration.add_species(water);
//! configuration.add_molecule(species, &positions);
//! configuration.generate_cells(3.0, 9.0)?;
//! ```

pub mod atom;
pub mod configuration;
pub mod ids;
pub mod molecule;
pub mod species;
