use super::cell::Cell;
use crate::core::geometry::PeriodicBox;
use itertools::iproduct;
use nalgebra::{Point3, Vector3};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("Cell size must be finite and positive, got {0}")]
    InvalidCellSize(f64),
    #[error("Cutoff must be finite and positive, got {0}")]
    InvalidCutoff(f64),
}

/// A neighbouring cell as seen from one cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellNeighbour {
    pub cell: usize,
    /// Whether separations between atoms of the two cells need the minimum-image correction.
    pub mim_required: bool,
}

/// An unordered pair of neighbouring cells (`cell_a <= cell_b`); self pairs are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellNeighbourPair {
    pub cell_a: usize,
    pub cell_b: usize,
    pub mim_required: bool,
}

impl CellNeighbourPair {
    pub fn is_self_pair(&self) -> bool {
        self.cell_a == self.cell_b
    }
}

/// A 3-D grid of cells covering the box, with a cached neighbour structure.
///
/// The grid resolution is chosen so that atoms further apart than the cutoff can never sit in
/// cells that are not listed as neighbours. For each neighbouring pair of cells the array also
/// records, once, whether the direct separation vector between their atoms is guaranteed to be
/// the minimum-image vector. Only pairs flagged `mim_required` pay for the periodic correction
/// during energy evaluation.
#[derive(Debug, Clone)]
pub struct CellArray {
    divisions: Vector3<usize>,
    cell_widths: Vector3<f64>,
    extents: Vector3<i32>,
    cutoff: f64,
    cells: Vec<Cell>,
    neighbours: Vec<Vec<CellNeighbour>>,
    pairs: Vec<CellNeighbourPair>,
}

impl CellArray {
    /// Builds the grid for `sim_box` with cells of (at least) `cell_size` and the given cutoff.
    pub fn generate(sim_box: &PeriodicBox, cell_size: f64, cutoff: f64) -> Result<Self, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err(GridError::InvalidCutoff(cutoff));
        }

        let widths = sim_box.axis_widths();
        let divisions = widths.map(|w| ((w / cell_size).floor() as usize).max(1));
        let cell_widths = widths.component_div(&divisions.cast::<f64>());
        let extents = Vector3::from_fn(|axis, _| {
            let needed = (cutoff / cell_widths[axis]).ceil() as i32;
            needed.clamp(1, divisions[axis] as i32)
        });

        debug!(
            "Cell grid divisions {}x{}x{}, cell widths ({:.3}, {:.3}, {:.3}), extents ({}, {}, {})",
            divisions.x,
            divisions.y,
            divisions.z,
            cell_widths.x,
            cell_widths.y,
            cell_widths.z,
            extents.x,
            extents.y,
            extents.z
        );

        let cells: Vec<Cell> = iproduct!(0..divisions.x, 0..divisions.y, 0..divisions.z)
            .enumerate()
            .map(|(index, (ix, iy, iz))| {
                let grid_reference = Vector3::new(ix as i32, iy as i32, iz as i32);
                let fractional_centre = Vector3::new(
                    (ix as f64 + 0.5) / divisions.x as f64,
                    (iy as f64 + 0.5) / divisions.y as f64,
                    (iz as f64 + 0.5) / divisions.z as f64,
                );
                Cell::new(index, grid_reference, sim_box.real(&fractional_centre))
            })
            .collect();

        let offsets = stencil(sim_box, &cell_widths, &extents, cutoff);
        let neighbours = build_neighbour_lists(sim_box, &cells, &divisions, &cell_widths, &offsets);

        let pairs: Vec<CellNeighbourPair> = neighbours
            .iter()
            .enumerate()
            .flat_map(|(cell_a, list)| {
                list.iter()
                    .filter(move |n| n.cell >= cell_a)
                    .map(move |n| CellNeighbourPair {
                        cell_a,
                        cell_b: n.cell,
                        mim_required: n.mim_required,
                    })
            })
            .collect();

        info!(
            "Generated cell array with {} cells and {} neighbour pairs ({} requiring minimum image)",
            cells.len(),
            pairs.len(),
            pairs.iter().filter(|p| p.mim_required).count()
        );

        Ok(Self {
            divisions,
            cell_widths,
            extents,
            cutoff,
            cells,
            neighbours,
            pairs,
        })
    }

    pub fn divisions(&self) -> Vector3<usize> {
        self.divisions
    }

    /// Perpendicular width of a cell along each axis.
    pub fn cell_widths(&self) -> Vector3<f64> {
        self.cell_widths
    }

    /// Number of cells, along each axis, that the neighbour stencil reaches out to.
    pub fn extents(&self) -> Vector3<i32> {
        self.extents
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// Linear index of the cell with the given (in-range) grid reference.
    pub fn index_of(&self, grid_reference: &Vector3<i32>) -> usize {
        linear_index(grid_reference, &self.divisions)
    }

    /// Returns the cell that contains `point`.
    ///
    /// Points are folded into the box first. Points outside a non-periodic box are assigned
    /// to the nearest edge cell.
    pub fn cell_for(&self, sim_box: &PeriodicBox, point: &Point3<f64>) -> usize {
        let frac = sim_box.fractional(&sim_box.fold(point));
        let grid_reference = Vector3::from_fn(|axis, _| {
            let n = self.divisions[axis] as i32;
            ((frac[axis] * n as f64).floor() as i32).clamp(0, n - 1)
        });
        self.index_of(&grid_reference)
    }

    /// Neighbours of a cell, including the cell itself, sorted by cell index.
    pub fn neighbours(&self, cell: usize) -> &[CellNeighbour] {
        &self.neighbours[cell]
    }

    /// All unique neighbouring cell pairs, including self pairs.
    pub fn neighbour_pairs(&self) -> &[CellNeighbourPair] {
        &self.pairs
    }

    /// Whether separations between atoms of the two cells need the minimum-image correction.
    ///
    /// Cells that are not neighbours always report `true`.
    pub fn mim_required(&self, cell_a: usize, cell_b: usize) -> bool {
        let list = &self.neighbours[cell_a];
        match list.binary_search_by_key(&cell_b, |n| n.cell) {
            Ok(position) => list[position].mim_required,
            Err(_) => true,
        }
    }
}

fn linear_index(grid_reference: &Vector3<i32>, divisions: &Vector3<usize>) -> usize {
    (grid_reference.x as usize * divisions.y + grid_reference.y as usize) * divisions.z
        + grid_reference.z as usize
}

/// Grid offsets whose cells may hold atoms within `cutoff` of an atom in the origin cell.
fn stencil(
    sim_box: &PeriodicBox,
    cell_widths: &Vector3<f64>,
    extents: &Vector3<i32>,
    cutoff: f64,
) -> Vec<Vector3<i32>> {
    let cutoff_sq = cutoff * cutoff;
    iproduct!(
        -extents.x..=extents.x,
        -extents.y..=extents.y,
        -extents.z..=extents.z
    )
    .map(|(x, y, z)| Vector3::new(x, y, z))
    .filter(|offset| {
        // Closest approach of two cell volumes is only exact for orthogonal cells.
        if !sim_box.is_orthogonal() {
            return true;
        }
        let gap_sq: f64 = (0..3)
            .map(|axis| {
                let gap = (offset[axis].abs() - 1).max(0) as f64 * cell_widths[axis];
                gap * gap
            })
            .sum();
        gap_sq <= cutoff_sq
    })
    .collect()
}

fn build_neighbour_lists(
    sim_box: &PeriodicBox,
    cells: &[Cell],
    divisions: &Vector3<usize>,
    cell_widths: &Vector3<f64>,
    offsets: &[Vector3<i32>],
) -> Vec<Vec<CellNeighbour>> {
    let periodic = sim_box.is_periodic();
    let half_widths = sim_box.axis_widths() * 0.5;
    let n_div = divisions.map(|d| d as i32);

    cells
        .iter()
        .map(|cell| {
            let mut found: BTreeMap<usize, bool> = BTreeMap::new();
            for offset in offsets {
                let raw = cell.grid_reference() + offset;
                let wrapped = Vector3::from_fn(|axis, _| raw[axis].rem_euclid(n_div[axis]));
                let crossed = raw != wrapped;
                if crossed && !periodic {
                    continue;
                }
                let mim_required = periodic
                    && (crossed
                        || !sim_box.is_orthogonal()
                        || (0..3).any(|axis| {
                            (offset[axis].abs() + 1) as f64 * cell_widths[axis]
                                > half_widths[axis]
                        }));
                let neighbour = linear_index(&wrapped, divisions);
                *found.entry(neighbour).or_insert(false) |= mim_required;
            }
            found
                .into_iter()
                .map(|(cell, mim_required)| CellNeighbour { cell, mim_required })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn scattered_points(n: usize, length: f64) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                Point3::new(
                    (t * 7.31 + 0.37 * (t * 1.7).sin()).rem_euclid(length),
                    (t * 3.17 + 0.53 * (t * 2.3).cos()).rem_euclid(length),
                    (t * 5.83 + 0.41 * (t * 0.9).sin()).rem_euclid(length),
                )
            })
            .collect()
    }

    #[test]
    fn generate_rejects_invalid_parameters() {
        let sim_box = PeriodicBox::cubic(10.0).unwrap();
        assert_eq!(
            CellArray::generate(&sim_box, 0.0, 3.0).unwrap_err(),
            GridError::InvalidCellSize(0.0)
        );
        assert_eq!(
            CellArray::generate(&sim_box, 2.0, -1.0).unwrap_err(),
            GridError::InvalidCutoff(-1.0)
        );
    }

    #[test]
    fn divisions_and_extents_follow_cell_size_and_cutoff() {
        let sim_box = PeriodicBox::orthorhombic(Vector3::new(20.0, 20.0, 10.0)).unwrap();
        let cells = CellArray::generate(&sim_box, 3.0, 5.0).unwrap();
        assert_eq!(cells.divisions(), Vector3::new(6, 6, 3));
        assert_eq!(cells.n_cells(), 108);
        assert_eq!(cells.extents(), Vector3::new(2, 2, 2));
    }

    #[test]
    fn neighbour_pairs_are_unique_and_ordered() {
        let sim_box = PeriodicBox::cubic(20.0).unwrap();
        let cells = CellArray::generate(&sim_box, 4.0, 4.0).unwrap();
        let mut seen = HashSet::new();
        for pair in cells.neighbour_pairs() {
            assert!(pair.cell_a <= pair.cell_b);
            assert!(seen.insert((pair.cell_a, pair.cell_b)));
        }
        let self_pairs = cells
            .neighbour_pairs()
            .iter()
            .filter(|p| p.is_self_pair())
            .count();
        assert_eq!(self_pairs, cells.n_cells());
    }

    #[test]
    fn neighbour_lists_are_symmetric() {
        let sim_box = PeriodicBox::orthorhombic(Vector3::new(18.0, 24.0, 15.0)).unwrap();
        let cells = CellArray::generate(&sim_box, 3.0, 4.5).unwrap();
        for a in 0..cells.n_cells() {
            for n in cells.neighbours(a) {
                assert_eq!(cells.mim_required(n.cell, a), n.mim_required);
            }
        }
    }

    #[test]
    fn every_pair_within_cutoff_lives_in_neighbouring_cells() {
        let sim_box = PeriodicBox::cubic(16.0).unwrap();
        let cutoff = 3.5;
        let cells = CellArray::generate(&sim_box, 2.5, cutoff).unwrap();
        let points = scattered_points(200, 16.0);
        let assigned: Vec<usize> = points.iter().map(|p| cells.cell_for(&sim_box, p)).collect();

        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                if sim_box.minimum_distance(&points[i], &points[j]) <= cutoff {
                    let (a, b) = (assigned[i], assigned[j]);
                    assert!(
                        cells.neighbours(a).iter().any(|n| n.cell == b),
                        "cells {a} and {b} hold atoms within the cutoff but are not neighbours"
                    );
                }
            }
        }
    }

    #[test]
    fn direct_vector_is_minimum_image_for_unflagged_pairs() {
        let sim_box = PeriodicBox::cubic(20.0).unwrap();
        let cells = CellArray::generate(&sim_box, 2.0, 4.0).unwrap();
        let points = scattered_points(400, 20.0);
        let assigned: Vec<usize> = points.iter().map(|p| cells.cell_for(&sim_box, p)).collect();

        let mut checked = 0;
        for i in 0..points.len() {
            for j in 0..points.len() {
                if i == j || cells.mim_required(assigned[i], assigned[j]) {
                    continue;
                }
                let direct = points[j] - points[i];
                let minimum = sim_box.minimum_vector(&points[i], &points[j]);
                assert!((direct - minimum).norm() < 1e-9);
                checked += 1;
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn tiny_periodic_box_yields_single_self_neighbour() {
        let sim_box = PeriodicBox::cubic(3.0).unwrap();
        let cells = CellArray::generate(&sim_box, 4.0, 5.0).unwrap();
        assert_eq!(cells.n_cells(), 1);
        assert_eq!(
            cells.neighbour_pairs(),
            &[CellNeighbourPair {
                cell_a: 0,
                cell_b: 0,
                mim_required: true
            }]
        );
    }

    #[test]
    fn tiny_non_periodic_box_self_pair_needs_no_minimum_image() {
        let sim_box = PeriodicBox::non_periodic(Vector3::new(3.0, 3.0, 3.0)).unwrap();
        let cells = CellArray::generate(&sim_box, 4.0, 5.0).unwrap();
        assert_eq!(cells.neighbour_pairs().len(), 1);
        assert!(!cells.neighbour_pairs()[0].mim_required);
    }

    #[test]
    fn non_periodic_edges_have_no_wrapped_neighbours() {
        let sim_box = PeriodicBox::non_periodic(Vector3::new(12.0, 12.0, 12.0)).unwrap();
        let cells = CellArray::generate(&sim_box, 3.0, 3.0).unwrap();
        let corner = cells.index_of(&Vector3::new(0, 0, 0));
        assert_eq!(cells.neighbours(corner).len(), 8);
        assert!(cells.neighbours(corner).iter().all(|n| !n.mim_required));
    }

    #[test]
    fn cell_for_folds_and_clamps_points() {
        let sim_box = PeriodicBox::cubic(10.0).unwrap();
        let cells = CellArray::generate(&sim_box, 2.5, 2.5).unwrap();
        let inside = cells.cell_for(&sim_box, &Point3::new(1.0, 1.0, 1.0));
        let wrapped = cells.cell_for(&sim_box, &Point3::new(11.0, -9.0, 21.0));
        assert_eq!(inside, wrapped);
        assert_eq!(cells.cell(inside).grid_reference(), Vector3::zeros());

        let open = PeriodicBox::non_periodic(Vector3::new(10.0, 10.0, 10.0)).unwrap();
        let open_cells = CellArray::generate(&open, 2.5, 2.5).unwrap();
        let outside = open_cells.cell_for(&open, &Point3::new(-3.0, 15.0, 5.0));
        assert_eq!(
            open_cells.cell(outside).grid_reference(),
            Vector3::new(0, 3, 2)
        );
    }

    #[test]
    fn triclinic_pairs_always_require_minimum_image() {
        let axes = nalgebra::Matrix3::from_columns(&[
            Vector3::new(12.0, 0.0, 0.0),
            Vector3::new(3.0, 12.0, 0.0),
            Vector3::new(0.0, 0.0, 12.0),
        ]);
        let sim_box = PeriodicBox::triclinic(axes).unwrap();
        let cells = CellArray::generate(&sim_box, 3.0, 3.0).unwrap();
        assert!(cells.neighbour_pairs().iter().all(|p| p.mim_required));
    }
}
