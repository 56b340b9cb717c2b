//! # Spatial Grid Module
//!
//! Divides the simulation box into a regular grid of cells and caches, for every cell, the
//! cells whose atoms may lie within the interaction cutoff of its own atoms.
//!
//! ## Key Components
//!
//! - [`cell`] - A single grid cell and its atom membership list
//! - [`cell_array`] - The full grid, its neighbour lists, and the unique neighbour-pair list
//!
//! Each neighbour relationship carries a precomputed minimum-image flag, so the energy kernel
//! only applies periodic corrections to the cell pairs that can actually need them.

pub mod cell;
pub mod cell_array;

pub use cell::Cell;
pub use cell_array::{CellArray, CellNeighbour, CellNeighbourPair, GridError};
