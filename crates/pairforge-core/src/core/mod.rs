//! # Core Module
//!
//! Stateless building blocks used by the energy engine.
//!
//! - **Geometry** ([`geometry`]) - Periodic boxes, minimum-image vectors, angles, and dihedrals
//! - **Spatial Grid** ([`grid`]) - Cells, the cell array, and its neighbour cache
//! - **Energy Functions** ([`forcefield`]) - Pair potentials, parameter loading, and bonded forms
//! - **Data Model** ([`models`]) - Atoms, species templates, molecules, and configurations

pub mod forcefield;
pub mod geometry;
pub mod grid;
pub mod models;
