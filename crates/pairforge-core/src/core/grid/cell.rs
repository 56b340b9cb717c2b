use crate::core::models::atom::Atom;
use nalgebra::{Point3, Vector3};

/// A fixed sub-region of the simulation volume.
///
/// The cell index and grid reference are fixed when the cell array is generated. The atom
/// list is a non-owning list of atom indices into the configuration's atom arena and is kept
/// in insertion order so that partitions over it are reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    index: usize,
    grid_reference: Vector3<i32>,
    centre: Point3<f64>,
    atoms: Vec<usize>,
}

impl Cell {
    pub fn new(index: usize, grid_reference: Vector3<i32>, centre: Point3<f64>) -> Self {
        Self {
            index,
            grid_reference,
            centre,
            atoms: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn grid_reference(&self) -> Vector3<i32> {
        self.grid_reference
    }

    /// Real-space centre of the cell.
    pub fn centre(&self) -> Point3<f64> {
        self.centre
    }

    pub fn atoms(&self) -> &[usize] {
        &self.atoms
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Adds an atom to this cell and points the atom back at it.
    ///
    /// # Panics
    ///
    /// Panics if the atom already belongs to a cell.
    pub fn add_atom(&mut self, atom_index: usize, atom: &mut Atom) {
        if let Some(current) = atom.cell() {
            panic!(
                "cannot add atom {atom_index} to cell {}: it already belongs to cell {current}",
                self.index
            );
        }
        self.atoms.push(atom_index);
        atom.set_cell(Some(self.index));
    }

    /// Removes an atom from this cell and clears the atom's back-reference.
    ///
    /// # Panics
    ///
    /// Panics if the atom is not a member of this cell.
    pub fn remove_atom(&mut self, atom_index: usize, atom: &mut Atom) {
        let position = self.atoms.iter().position(|&i| i == atom_index);
        match position {
            Some(position) if atom.cell() == Some(self.index) => {
                self.atoms.remove(position);
                atom.set_cell(None);
            }
            _ => panic!(
                "cannot remove atom {atom_index} from cell {}: it is not a member",
                self.index
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::MoleculeId;

    fn test_atom() -> Atom {
        Atom::new(Point3::origin(), 0, 0, MoleculeId::default())
    }

    #[test]
    fn add_atom_updates_both_sides() {
        let mut cell = Cell::new(3, Vector3::new(0, 1, 2), Point3::new(1.0, 1.0, 1.0));
        let mut atom = test_atom();
        cell.add_atom(5, &mut atom);
        assert_eq!(cell.atoms(), &[5]);
        assert_eq!(atom.cell(), Some(3));
    }

    #[test]
    fn remove_atom_updates_both_sides() {
        let mut cell = Cell::new(0, Vector3::zeros(), Point3::origin());
        let mut a = test_atom();
        let mut b = test_atom();
        cell.add_atom(1, &mut a);
        cell.add_atom(2, &mut b);
        cell.remove_atom(1, &mut a);
        assert_eq!(cell.atoms(), &[2]);
        assert_eq!(a.cell(), None);
        assert_eq!(b.cell(), Some(0));
    }

    #[test]
    #[should_panic(expected = "already belongs to cell")]
    fn adding_an_atom_twice_panics() {
        let mut first = Cell::new(0, Vector3::zeros(), Point3::origin());
        let mut second = Cell::new(1, Vector3::new(1, 0, 0), Point3::origin());
        let mut atom = test_atom();
        first.add_atom(0, &mut atom);
        second.add_atom(0, &mut atom);
    }

    #[test]
    #[should_panic(expected = "is not a member")]
    fn removing_a_non_member_panics() {
        let mut cell = Cell::new(0, Vector3::zeros(), Point3::origin());
        let mut atom = test_atom();
        cell.remove_atom(0, &mut atom);
    }
}
