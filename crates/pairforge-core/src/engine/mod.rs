//! # Engine Module
//!
//! The computational layer: the energy kernel, the work-distribution protocol that lets a pool
//! of workers share one evaluation, and the energy tasks built on top of them.
//!
//! - **Work Distribution** ([`distributor`]) - Division strategies, partitions, and pools
//! - **Energy Kernel** ([`kernel`]) - Pairwise and bonded energies over the cell grid
//! - **Tasks** ([`tasks`]) - Instrumented whole-system, per-molecule, and reference energies
//! - **Configuration** ([`config`]) - Evaluation settings and their builder
//! - **Error Handling** ([`error`]) - Engine-level error taxonomy

pub mod config;
pub mod distributor;
pub mod error;
pub mod kernel;
pub mod tasks;
