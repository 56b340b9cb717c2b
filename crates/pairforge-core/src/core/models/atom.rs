use super::ids::MoleculeId;
use nalgebra::Point3;

/// A point particle of a configuration.
///
/// Atoms live in a single arena owned by the `Configuration`; their position in that arena is
/// the *atom index* used everywhere else (cell membership lists, molecule atom lists, and the
/// `i >= j` ordering rules of the energy kernel). Back-references to the owning molecule and to
/// the containing cell are stored as keys/indices rather than references.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Cartesian position in Angstroms.
    pub position: Point3<f64>,
    /// Index of the atom type in the `PotentialMap`.
    pub atom_type: usize,
    /// Index of the atom within its species template.
    pub species_atom: usize,
    /// The molecule this atom belongs to.
    pub molecule: MoleculeId,
    /// The cell currently containing the atom, if the cell grid has been generated.
    cell: Option<usize>,
}

impl Atom {
    /// Creates an atom that is not yet assigned to any cell.
    pub fn new(
        position: Point3<f64>,
        atom_type: usize,
        species_atom: usize,
        molecule: MoleculeId,
    ) -> Self {
        Self {
            position,
            atom_type,
            species_atom,
            molecule,
            cell: None,
        }
    }

    pub fn cell(&self) -> Option<usize> {
        self.cell
    }

    /// Returns the containing cell, panicking if the atom has not been placed in the grid.
    #[inline]
    pub(crate) fn expect_cell(&self, atom_index: usize) -> usize {
        match self.cell {
            Some(cell) => cell,
            None => panic!("atom {atom_index} has no assigned cell; generate the cell array first"),
        }
    }

    pub(crate) fn set_cell(&mut self, cell: Option<usize>) {
        self.cell = cell;
    }
}
