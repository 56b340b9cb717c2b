//! # pairforge Core Library
//!
//! A cell-list accelerated engine for short-range pairwise and intramolecular energies of
//! periodic atomistic configurations, with work partitioning that lets a pool of workers
//! cooperate on a single evaluation.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Periodic geometry, the cell grid, the pair and bonded
//!   potentials, and the configuration data model (atoms, species, molecules).
//!
//! - **[`engine`]: The Logic Core.** The `EnergyKernel`, the work-distribution protocol
//!   (`ProcessPool`, serial and threaded pools), and instrumented energy tasks.
//!
//! - **[`workflows`]: The Public API.** One-call evaluation of a configuration that returns an
//!   `EnergyReport`, optionally cross-checked against a brute-force reference.

pub mod core;
pub mod engine;
pub mod workflows;
