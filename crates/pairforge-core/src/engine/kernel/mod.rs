//! # Energy Kernel
//!
//! Pairwise and bonded energies of a [`Configuration`], evaluated over its cell array.
//!
//! An [`EnergyKernel`] borrows everything it needs for one evaluation (configuration, potential
//! map, worker pool) and holds no state between calls. Pairwise queries come in several
//! traversal flavours, distinguished by which atom pairs they skip:
//!
//! - whole-system sums over the cached neighbour-pair list ([`EnergyKernel::total_energy`]),
//!   either with intramolecular scaling applied during traversal or as a full sum that is
//!   fixed up afterwards with [`EnergyKernel::correct`];
//! - single-atom and single-molecule trial energies that only see other molecules;
//! - one atom against one cell under an explicit [`ExclusionPolicy`].
//!
//! The minimum-image correction is applied only to cell pairs flagged by the cell array.

mod intramolecular;
mod pairwise;

#[cfg(test)]
pub(crate) mod test_support;

use crate::core::forcefield::PotentialMap;
use crate::core::geometry::PeriodicBox;
use crate::core::grid::CellArray;
use crate::core::models::atom::Atom;
use crate::core::models::configuration::Configuration;
use crate::engine::distributor::ProcessPool;
use nalgebra::{Point3, Vector3};

/// Same-molecule pairs whose scaling factor does not exceed this value are skipped entirely.
pub const SCALING_THRESHOLD: f64 = 1e-3;

/// Which pairs `atom_cell_energy` skips when walking a cell for atom `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionPolicy {
    /// Skip only `j == i`.
    ExcludeSelf,
    /// Skip every `j <= i`.
    ExcludeIGeJ,
    /// Skip `j == i` and same-molecule `j < i`.
    ExcludeIntraIGeJ,
    /// Skip nothing; molecule scaling still applies and the self pair contributes zero.
    NoExclusion,
}

pub struct EnergyKernel<'a, P: ProcessPool> {
    configuration: &'a Configuration,
    cells: &'a CellArray,
    sim_box: &'a PeriodicBox,
    potential_map: &'a PotentialMap,
    pool: &'a P,
    cutoff_sq: f64,
}

impl<'a, P: ProcessPool> EnergyKernel<'a, P> {
    /// Binds a kernel to one configuration snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the configuration has no cell array, if `cutoff` exceeds the cutoff the cell
    /// array was generated for, or if an atom has a type the potential map does not define.
    pub fn new(
        configuration: &'a Configuration,
        potential_map: &'a PotentialMap,
        pool: &'a P,
        cutoff: f64,
    ) -> Self {
        let cells = match configuration.cells() {
            Some(cells) => cells,
            None => panic!("the configuration has no cell array; call generate_cells first"),
        };
        assert!(
            cutoff <= cells.cutoff() * (1.0 + 1e-12),
            "cutoff {cutoff} exceeds the cell array cutoff {}",
            cells.cutoff()
        );
        let n_types = potential_map.n_types();
        if let Some((i, atom)) = configuration
            .atoms()
            .iter()
            .enumerate()
            .find(|(_, atom)| atom.atom_type >= n_types)
        {
            panic!(
                "atom {i} has type {} but the potential map defines only {n_types} types",
                atom.atom_type
            );
        }
        Self {
            configuration,
            cells,
            sim_box: configuration.sim_box(),
            potential_map,
            pool,
            cutoff_sq: cutoff * cutoff,
        }
    }

    pub fn configuration(&self) -> &'a Configuration {
        self.configuration
    }

    pub fn pool(&self) -> &'a P {
        self.pool
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff_sq.sqrt()
    }

    #[inline]
    fn atom(&self, index: usize) -> &'a Atom {
        self.configuration.atom(index)
    }

    #[inline]
    fn distance_squared(&self, a: &Point3<f64>, b: &Point3<f64>, apply_mim: bool) -> f64 {
        if apply_mim {
            self.sim_box.minimum_distance_squared(a, b)
        } else {
            (b - a).norm_squared()
        }
    }

    /// Separation vector from atom `i` to atom `j`, wrapped only when their cells require it.
    fn separation(&self, i: usize, j: usize) -> Vector3<f64> {
        let (a, b) = (self.atom(i), self.atom(j));
        if self.cells.mim_required(a.expect_cell(i), b.expect_cell(j)) {
            self.sim_box.minimum_vector(&a.position, &b.position)
        } else {
            b.position - a.position
        }
    }
}
