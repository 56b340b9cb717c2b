use super::atom::Atom;
use super::ids::{MoleculeId, SpeciesId};
use super::molecule::Molecule;
use super::species::Species;
use crate::core::geometry::PeriodicBox;
use crate::core::grid::{CellArray, GridError};
use nalgebra::{Point3, Vector3};
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Species {0:?} does not exist in this configuration")]
    UnknownSpecies(SpeciesId),
    #[error("Molecule {0:?} does not exist in this configuration")]
    UnknownMolecule(MoleculeId),
    #[error("Species '{species}' has {expected} atoms but {found} positions were supplied")]
    PositionCountMismatch {
        species: String,
        expected: usize,
        found: usize,
    },
}

/// A complete atomistic snapshot: box, atoms, molecules, species, and the cell grid.
///
/// Atoms are stored in a single arena indexed by *atom index*, with positions folded into the
/// box. Molecules and species live in slot maps and are referenced by key. The cell array is
/// optional until [`Configuration::generate_cells`] has been called; once it exists, every atom
/// belongs to exactly one cell and all position updates keep the membership lists consistent.
#[derive(Debug, Clone)]
pub struct Configuration {
    sim_box: PeriodicBox,
    atoms: Vec<Atom>,
    molecules: SlotMap<MoleculeId, Molecule>,
    species: SlotMap<SpeciesId, Species>,
    cells: Option<CellArray>,
}

impl Configuration {
    /// Creates an empty configuration inside `sim_box`.
    pub fn new(sim_box: PeriodicBox) -> Self {
        Self {
            sim_box,
            atoms: Vec::new(),
            molecules: SlotMap::with_key(),
            species: SlotMap::with_key(),
            cells: None,
        }
    }

    pub fn sim_box(&self) -> &PeriodicBox {
        &self.sim_box
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[inline]
    pub fn atom(&self, index: usize) -> &Atom {
        &self.atoms[index]
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Registers a species template and returns its key.
    pub fn add_species(&mut self, species: Species) -> SpeciesId {
        self.species.insert(species)
    }

    pub fn species(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(id)
    }

    pub fn species_iter(&self) -> impl Iterator<Item = (SpeciesId, &Species)> {
        self.species.iter()
    }

    pub fn molecule(&self, id: MoleculeId) -> Option<&Molecule> {
        self.molecules.get(id)
    }

    pub fn molecules_iter(&self) -> impl Iterator<Item = (MoleculeId, &Molecule)> {
        self.molecules.iter()
    }

    pub fn n_molecules(&self) -> usize {
        self.molecules.len()
    }

    /// The cell array, if it has been generated.
    pub fn cells(&self) -> Option<&CellArray> {
        self.cells.as_ref()
    }

    /// Instantiates a molecule of `species` with one position per template atom.
    ///
    /// # Arguments
    ///
    /// * `species` - The species template to instantiate.
    /// * `positions` - Cartesian positions in the template's local atom order.
    ///
    /// # Return
    ///
    /// The key of the new molecule. If the cell array already exists, the new atoms are placed
    /// in their cells immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the species is unknown or the number of positions
    /// does not match the template.
    pub fn add_molecule(
        &mut self,
        species: SpeciesId,
        positions: &[Point3<f64>],
    ) -> Result<MoleculeId, ConfigurationError> {
        let template = self
            .species
            .get(species)
            .ok_or(ConfigurationError::UnknownSpecies(species))?;
        if template.n_atoms() != positions.len() {
            return Err(ConfigurationError::PositionCountMismatch {
                species: template.name().to_string(),
                expected: template.n_atoms(),
                found: positions.len(),
            });
        }

        let first = self.atoms.len();
        let atom_types: Vec<usize> = template.atoms().iter().map(|a| a.atom_type).collect();
        let indices: Vec<usize> = (first..first + positions.len()).collect();
        let molecule_id = self
            .molecules
            .insert(Molecule::new(species, indices.clone()));

        for (local, (position, atom_type)) in positions.iter().zip(atom_types).enumerate() {
            let position = self.sim_box.fold(position);
            self.atoms
                .push(Atom::new(position, atom_type, local, molecule_id));
        }
        if let Some(cells) = self.cells.as_mut() {
            for index in indices {
                let cell = cells.cell_for(&self.sim_box, &self.atoms[index].position);
                cells.cell_mut(cell).add_atom(index, &mut self.atoms[index]);
            }
        }
        Ok(molecule_id)
    }

    /// Builds the cell array and assigns every atom to its cell.
    ///
    /// Any previous grid is discarded along with the atoms' cell assignments.
    pub fn generate_cells(&mut self, cell_size: f64, cutoff: f64) -> Result<(), GridError> {
        let mut cells = CellArray::generate(&self.sim_box, cell_size, cutoff)?;
        for (index, atom) in self.atoms.iter_mut().enumerate() {
            atom.set_cell(None);
            let cell = cells.cell_for(&self.sim_box, &atom.position);
            cells.cell_mut(cell).add_atom(index, atom);
        }
        debug!(
            "Assigned {} atoms to {} cells",
            self.atoms.len(),
            cells.n_cells()
        );
        self.cells = Some(cells);
        Ok(())
    }

    /// Moves an atom, transferring it between cells if it crosses a cell boundary.
    ///
    /// The stored position is folded back into a periodic box.
    pub fn set_atom_position(&mut self, index: usize, position: Point3<f64>) {
        let position = self.sim_box.fold(&position);
        let atom = &mut self.atoms[index];
        atom.position = position;
        if let Some(cells) = self.cells.as_mut() {
            let old_cell = atom.expect_cell(index);
            let new_cell = cells.cell_for(&self.sim_box, &position);
            if new_cell != old_cell {
                cells.cell_mut(old_cell).remove_atom(index, atom);
                cells.cell_mut(new_cell).add_atom(index, atom);
            }
        }
    }

    /// Rigidly translates every atom of a molecule.
    pub fn translate_molecule(
        &mut self,
        id: MoleculeId,
        delta: &Vector3<f64>,
    ) -> Result<(), ConfigurationError> {
        let atoms = self
            .molecules
            .get(id)
            .ok_or(ConfigurationError::UnknownMolecule(id))?
            .atoms()
            .to_vec();
        for index in atoms {
            let position = self.atoms[index].position + delta;
            self.set_atom_position(index, position);
        }
        Ok(())
    }

    /// Scaling factor between two atoms.
    ///
    /// Atoms of different molecules always interact fully (1). For atoms of the same molecule
    /// the factor comes from the species template.
    #[inline]
    pub fn scaling(&self, i: usize, j: usize) -> f64 {
        let (a, b) = (&self.atoms[i], &self.atoms[j]);
        if a.molecule != b.molecule {
            return 1.0;
        }
        let molecule = &self.molecules[a.molecule];
        self.species[molecule.species()].scaling(a.species_atom, b.species_atom)
    }

    /// The species template of an existing molecule.
    ///
    /// # Panics
    ///
    /// Panics if the molecule does not exist.
    pub fn species_of(&self, id: MoleculeId) -> &Species {
        let molecule = self.expect_molecule(id);
        &self.species[molecule.species()]
    }

    pub(crate) fn expect_molecule(&self, id: MoleculeId) -> &Molecule {
        match self.molecules.get(id) {
            Some(molecule) => molecule,
            None => panic!("molecule {id:?} does not exist in this configuration"),
        }
    }
}
