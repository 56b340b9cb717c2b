use super::EnergyKernel;
use crate::core::forcefield::IntramolecularEnergy;
use crate::core::forcefield::intramolecular::{Angle, Bond, Improper, Torsion};
use crate::core::geometry::{angle_in_degrees, torsion_in_degrees};
use crate::core::models::ids::{MoleculeId, SpeciesId};
use crate::core::models::molecule::Molecule;
use crate::core::models::species::Species;
use crate::engine::distributor::{DivisionStrategy, ProcessPool};

/// Maps the species-local atoms of a term onto global atom indices of `molecule`.
fn global_atoms<const N: usize>(molecule: &Molecule, local: [usize; N]) -> [usize; N] {
    local.map(|l| {
        assert!(
            l < molecule.n_atoms(),
            "term atom {l} is out of range for a molecule with {} atoms",
            molecule.n_atoms()
        );
        molecule.atom(l)
    })
}

impl<P: ProcessPool> EnergyKernel<'_, P> {
    pub fn bond_energy(&self, molecule: &Molecule, bond: &Bond) -> f64 {
        let [i, j] = global_atoms(molecule, bond.atoms);
        bond.form.energy(self.separation(i, j).norm())
    }

    pub fn angle_energy(&self, molecule: &Molecule, angle: &Angle) -> f64 {
        let [i, j, k] = global_atoms(molecule, angle.atoms);
        let theta = angle_in_degrees(&self.separation(j, i), &self.separation(j, k));
        angle.form.energy(theta)
    }

    pub fn torsion_energy(&self, molecule: &Molecule, torsion: &Torsion) -> f64 {
        torsion.form.energy(self.dihedral(molecule, torsion.atoms))
    }

    pub fn improper_energy(&self, molecule: &Molecule, improper: &Improper) -> f64 {
        improper.form.energy(self.dihedral(molecule, improper.atoms))
    }

    fn dihedral(&self, molecule: &Molecule, atoms: [usize; 4]) -> f64 {
        let [i, j, k, l] = global_atoms(molecule, atoms);
        torsion_in_degrees(
            &self.separation(j, i),
            &self.separation(j, k),
            &self.separation(k, l),
        )
    }

    /// Bonded energy of one molecule, optionally restricted to terms involving local atom `only`.
    fn terms_energy(
        &self,
        molecule: &Molecule,
        species: &Species,
        only: Option<usize>,
    ) -> IntramolecularEnergy {
        let involves = |atoms: &[usize]| only.is_none_or(|local| atoms.contains(&local));
        IntramolecularEnergy {
            bond: species
                .bonds()
                .iter()
                .filter(|t| involves(&t.atoms))
                .map(|t| self.bond_energy(molecule, t))
                .sum(),
            angle: species
                .angles()
                .iter()
                .filter(|t| involves(&t.atoms))
                .map(|t| self.angle_energy(molecule, t))
                .sum(),
            torsion: species
                .torsions()
                .iter()
                .filter(|t| involves(&t.atoms))
                .map(|t| self.torsion_energy(molecule, t))
                .sum(),
            improper: species
                .impropers()
                .iter()
                .filter(|t| involves(&t.atoms))
                .map(|t| self.improper_energy(molecule, t))
                .sum(),
        }
    }

    /// All bonded terms of one molecule.
    ///
    /// # Panics
    ///
    /// Panics if the molecule does not exist.
    pub fn molecule_intramolecular_energy(&self, molecule: MoleculeId) -> IntramolecularEnergy {
        let instance = self.configuration.expect_molecule(molecule);
        let species = self.configuration.species_of(molecule);
        self.terms_energy(instance, species, None)
    }

    /// The bonded terms of its molecule that involve atom `i`.
    pub fn atom_intramolecular_energy(&self, i: usize) -> IntramolecularEnergy {
        let atom = self.atom(i);
        let instance = self.configuration.expect_molecule(atom.molecule);
        let species = self.configuration.species_of(atom.molecule);
        self.terms_energy(instance, species, Some(atom.species_atom))
    }

    /// Bonded energy of every molecule, split in contiguous chunks of molecules.
    pub fn intramolecular_energy(
        &self,
        strategy: DivisionStrategy,
        perform_sum: bool,
    ) -> IntramolecularEnergy {
        let molecules: Vec<MoleculeId> = self
            .configuration
            .molecules_iter()
            .map(|(id, _)| id)
            .collect();
        self.molecules_intramolecular_energy(&molecules, strategy, perform_sum)
    }

    /// Bonded energy of every molecule of one species.
    pub fn species_intramolecular_energy(
        &self,
        species: SpeciesId,
        strategy: DivisionStrategy,
        perform_sum: bool,
    ) -> IntramolecularEnergy {
        let molecules: Vec<MoleculeId> = self
            .configuration
            .molecules_iter()
            .filter(|(_, molecule)| molecule.species() == species)
            .map(|(id, _)| id)
            .collect();
        self.molecules_intramolecular_energy(&molecules, strategy, perform_sum)
    }

    fn molecules_intramolecular_energy(
        &self,
        molecules: &[MoleculeId],
        strategy: DivisionStrategy,
        perform_sum: bool,
    ) -> IntramolecularEnergy {
        let local: IntramolecularEnergy = molecules[self.pool.chunk(molecules.len(), strategy)]
            .iter()
            .map(|&id| self.molecule_intramolecular_energy(id))
            .sum();
        if perform_sum {
            let mut buffer = local.to_array();
            self.pool.all_sum(&mut buffer, strategy);
            IntramolecularEnergy::from_array(buffer)
        } else {
            local
        }
    }
}
