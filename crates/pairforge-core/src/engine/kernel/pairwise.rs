use super::{EnergyKernel, ExclusionPolicy, SCALING_THRESHOLD};
use crate::core::models::ids::MoleculeId;
use crate::engine::distributor::{DivisionStrategy, ProcessPool};
use std::collections::BTreeMap;
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

impl<P: ProcessPool> EnergyKernel<'_, P> {
    /// Interaction of atoms `i` and `j` at separation `r`, with no exclusion or cutoff.
    #[inline]
    pub fn pair_energy(&self, i: usize, j: usize, r: f64) -> f64 {
        self.potential_map.energy(self.atom(i), self.atom(j), r)
    }

    /// Energy of one atom pair within the cutoff.
    ///
    /// Returns zero for `i == j`, for `i >= j` when `exclude_ordered_duplicates` is set, and
    /// beyond the cutoff. Molecule membership is ignored.
    pub fn atom_pair_energy(
        &self,
        i: usize,
        j: usize,
        apply_mim: bool,
        exclude_ordered_duplicates: bool,
    ) -> f64 {
        if i == j || (exclude_ordered_duplicates && i >= j) {
            return 0.0;
        }
        let r_sq = self.distance_squared(&self.atom(i).position, &self.atom(j).position, apply_mim);
        if r_sq > self.cutoff_sq {
            return 0.0;
        }
        self.pair_energy(i, j, r_sq.sqrt())
    }

    /// Contribution of a pair under the intramolecular rules of the cell sums.
    ///
    /// Same-molecule pairs are scaled (and dropped below the threshold) when
    /// `inter_molecular_only` is set, and counted in full otherwise. The self pair is zero.
    #[inline]
    fn scaled_pair_energy(
        &self,
        i: usize,
        j: usize,
        apply_mim: bool,
        inter_molecular_only: bool,
    ) -> f64 {
        if i == j {
            return 0.0;
        }
        let (a, b) = (self.atom(i), self.atom(j));
        let scale = if inter_molecular_only && a.molecule == b.molecule {
            let s = self.configuration.scaling(i, j);
            if s <= SCALING_THRESHOLD {
                return 0.0;
            }
            s
        } else {
            1.0
        };
        let r_sq = self.distance_squared(&a.position, &b.position, apply_mim);
        if r_sq > self.cutoff_sq {
            return 0.0;
        }
        self.pair_energy(i, j, r_sq.sqrt()) * scale
    }

    /// Energy between every atom of cell `cell_a` and every atom of a different cell `cell_b`.
    ///
    /// Delegates to [`EnergyKernel::cell_energy`] when both indices name the same cell.
    pub fn cell_pair_energy(
        &self,
        cell_a: usize,
        cell_b: usize,
        apply_mim: bool,
        inter_molecular_only: bool,
    ) -> f64 {
        if cell_a == cell_b {
            return self.cell_energy(cell_a, apply_mim, inter_molecular_only);
        }
        let atoms_b = self.cells.cell(cell_b).atoms();
        self.cells
            .cell(cell_a)
            .atoms()
            .iter()
            .map(|&i| {
                atoms_b
                    .iter()
                    .map(|&j| self.scaled_pair_energy(i, j, apply_mim, inter_molecular_only))
                    .sum::<f64>()
            })
            .sum()
    }

    /// Energy of the unique atom pairs inside one cell.
    pub fn cell_energy(&self, cell: usize, apply_mim: bool, inter_molecular_only: bool) -> f64 {
        let atoms = self.cells.cell(cell).atoms();
        atoms
            .iter()
            .enumerate()
            .map(|(k, &i)| {
                atoms[k + 1..]
                    .iter()
                    .map(|&j| self.scaled_pair_energy(i, j, apply_mim, inter_molecular_only))
                    .sum::<f64>()
            })
            .sum()
    }

    /// Energy of atom `i` with the atoms of one cell.
    ///
    /// The cell's atom list is shared across the workers of `strategy` with the interleaved
    /// partition. Same-molecule pairs are scaled by their scaling factor.
    pub fn atom_cell_energy(
        &self,
        i: usize,
        cell: usize,
        policy: ExclusionPolicy,
        strategy: DivisionStrategy,
        perform_sum: bool,
    ) -> f64 {
        let atom_i = self.atom(i);
        let apply_mim = self.cells.mim_required(atom_i.expect_cell(i), cell);
        let molecule = atom_i.molecule;

        let local = match policy {
            ExclusionPolicy::ExcludeSelf => {
                self.atom_cell_sum(i, cell, apply_mim, strategy, |j| j == i)
            }
            ExclusionPolicy::NoExclusion => {
                self.atom_cell_sum(i, cell, apply_mim, strategy, |_| false)
            }
            ExclusionPolicy::ExcludeIGeJ => {
                self.atom_cell_sum(i, cell, apply_mim, strategy, |j| j <= i)
            }
            ExclusionPolicy::ExcludeIntraIGeJ => {
                self.atom_cell_sum(i, cell, apply_mim, strategy, |j| {
                    j == i || (j < i && self.atom(j).molecule == molecule)
                })
            }
        };

        if perform_sum {
            self.pool.all_sum_scalar(local, strategy)
        } else {
            local
        }
    }

    #[inline]
    fn atom_cell_sum<F>(
        &self,
        i: usize,
        cell: usize,
        apply_mim: bool,
        strategy: DivisionStrategy,
        skip: F,
    ) -> f64
    where
        F: Fn(usize) -> bool,
    {
        let atoms = self.cells.cell(cell).atoms();
        self.pool
            .interleaved(atoms.len(), strategy)
            .map(|k| atoms[k])
            .filter(|&j| !skip(j))
            .map(|j| self.scaled_pair_energy(i, j, apply_mim, true))
            .sum()
    }

    /// Energy of atom `i` with every atom of other molecules within the cutoff.
    pub fn atom_energy(&self, i: usize) -> f64 {
        let atom_i = self.atom(i);
        let molecule = atom_i.molecule;
        self.cells
            .neighbours(atom_i.expect_cell(i))
            .iter()
            .map(|neighbour| {
                self.cells
                    .cell(neighbour.cell)
                    .atoms()
                    .iter()
                    .filter(|&&j| self.atom(j).molecule != molecule)
                    .map(|&j| self.scaled_pair_energy(i, j, neighbour.mim_required, false))
                    .sum::<f64>()
            })
            .sum()
    }

    /// Energy of a molecule with every atom of other molecules within the cutoff.
    ///
    /// Atoms of the molecule that share a cell are processed together, so each neighbouring
    /// cell is walked once per occupied cell. The neighbour atom lists are split across the
    /// workers of `strategy`.
    ///
    /// # Panics
    ///
    /// Panics if the molecule does not exist.
    pub fn molecule_energy(
        &self,
        molecule: MoleculeId,
        strategy: DivisionStrategy,
        perform_sum: bool,
    ) -> f64 {
        let mut by_cell: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for &i in self.configuration.expect_molecule(molecule).atoms() {
            by_cell
                .entry(self.atom(i).expect_cell(i))
                .or_default()
                .push(i);
        }

        let mut local = 0.0;
        for (&cell, members) in &by_cell {
            for neighbour in self.cells.neighbours(cell) {
                let others = self.cells.cell(neighbour.cell).atoms();
                for k in self.pool.interleaved(others.len(), strategy) {
                    let j = others[k];
                    if self.atom(j).molecule == molecule {
                        continue;
                    }
                    local += members
                        .iter()
                        .map(|&i| self.scaled_pair_energy(i, j, neighbour.mim_required, false))
                        .sum::<f64>();
                }
            }
        }

        if perform_sum {
            self.pool.all_sum_scalar(local, strategy)
        } else {
            local
        }
    }

    /// Intramolecular correction for atom `i`.
    ///
    /// Returns `-Σ pair_energy × (1 - s)` over the other atoms of the molecule within the
    /// cutoff. Adding half the sum of this over all atoms to a full nonbonded sum yields the
    /// scaled sum.
    pub fn correct(&self, i: usize) -> f64 {
        let atom_i = self.atom(i);
        let cell_i = atom_i.expect_cell(i);
        let correction: f64 = self
            .configuration
            .expect_molecule(atom_i.molecule)
            .atoms()
            .iter()
            .filter(|&&j| j != i)
            .map(|&j| {
                let atom_j = self.atom(j);
                let apply_mim = self.cells.mim_required(cell_i, atom_j.expect_cell(j));
                let r_sq = self.distance_squared(&atom_i.position, &atom_j.position, apply_mim);
                if r_sq > self.cutoff_sq {
                    return 0.0;
                }
                self.pair_energy(i, j, r_sq.sqrt()) * (1.0 - self.configuration.scaling(i, j))
            })
            .sum();
        -correction
    }

    /// Pairwise energy of the whole configuration.
    ///
    /// The neighbour-pair list is split into contiguous chunks across the workers of
    /// `strategy`; each worker reduces its chunk locally (with rayon when the `parallel`
    /// feature is enabled).
    pub fn total_energy(
        &self,
        inter_molecular_only: bool,
        strategy: DivisionStrategy,
        perform_sum: bool,
    ) -> f64 {
        let pairs = self.cells.neighbour_pairs();
        let chunk = &pairs[self.pool.chunk(pairs.len(), strategy)];
        trace!(
            "Evaluating {} of {} cell pairs on rank {}",
            chunk.len(),
            pairs.len(),
            self.pool.worker_rank(strategy)
        );

        #[cfg(not(feature = "parallel"))]
        let iterator = chunk.iter();

        #[cfg(feature = "parallel")]
        let iterator = chunk.par_iter();

        let local: f64 = iterator
            .map(|pair| {
                if pair.is_self_pair() {
                    self.cell_energy(pair.cell_a, pair.mim_required, inter_molecular_only)
                } else {
                    self.cell_pair_energy(
                        pair.cell_a,
                        pair.cell_b,
                        pair.mim_required,
                        inter_molecular_only,
                    )
                }
            })
            .sum();

        if perform_sum {
            self.pool.all_sum_scalar(local, strategy)
        } else {
            local
        }
    }
}
