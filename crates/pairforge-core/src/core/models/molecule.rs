use super::ids::SpeciesId;

/// An instance of a species placed in a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    species: SpeciesId,
    atoms: Vec<usize>,
}

impl Molecule {
    pub(crate) fn new(species: SpeciesId, atoms: Vec<usize>) -> Self {
        Self { species, atoms }
    }

    pub fn species(&self) -> SpeciesId {
        self.species
    }

    /// Global atom indices, in the local order of the species template.
    pub fn atoms(&self) -> &[usize] {
        &self.atoms
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Global index of the species-local atom `local`.
    #[inline]
    pub fn atom(&self, local: usize) -> usize {
        self.atoms[local]
    }
}
