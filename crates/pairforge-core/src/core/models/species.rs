use crate::core::forcefield::intramolecular::{
    Angle, AngleForm, Bond, BondForm, Improper, Torsion, TorsionForm,
};
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

/// Scaling applied to 1-4 pairs until changed with [`Species::update_scaling`].
pub const DEFAULT_SCALE_14: f64 = 0.5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpeciesError {
    #[error("Atom index {index} is out of range for species '{species}' with {n_atoms} atoms")]
    AtomOutOfRange {
        species: String,
        index: usize,
        n_atoms: usize,
    },
    #[error("Term {atoms:?} repeats an atom")]
    RepeatedAtom { atoms: Vec<usize> },
    #[error("Duplicate {kind} term {atoms:?} in species '{species}'")]
    DuplicateTerm {
        species: String,
        kind: &'static str,
        atoms: Vec<usize>,
    },
    #[error("Scaling factor must lie in [0, 1], got {0}")]
    InvalidScaling(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesAtom {
    pub name: String,
    pub atom_type: usize,
}

/// A molecular template: atoms, bonded terms, and intramolecular pair scaling.
///
/// Indices used by the terms and by [`Species::scaling`] are local to the species. The scaling
/// matrix always reflects the current bond graph (see [`Species::update_scaling`]) with any
/// explicit [`Species::set_scaling`] overrides applied on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    name: String,
    atoms: Vec<SpeciesAtom>,
    bonds: Vec<Bond>,
    angles: Vec<Angle>,
    torsions: Vec<Torsion>,
    impropers: Vec<Improper>,
    scale_14: f64,
    overrides: BTreeMap<(usize, usize), f64>,
    scaling: Vec<f64>,
}

impl Species {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            atoms: Vec::new(),
            bonds: Vec::new(),
            angles: Vec::new(),
            torsions: Vec::new(),
            impropers: Vec::new(),
            scale_14: DEFAULT_SCALE_14,
            overrides: BTreeMap::new(),
            scaling: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atoms(&self) -> &[SpeciesAtom] {
        &self.atoms
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn angles(&self) -> &[Angle] {
        &self.angles
    }

    pub fn torsions(&self) -> &[Torsion] {
        &self.torsions
    }

    pub fn impropers(&self) -> &[Improper] {
        &self.impropers
    }

    /// Appends an atom; until it is bonded, it interacts fully with every other atom.
    pub fn add_atom(&mut self, name: impl Into<String>, atom_type: usize) -> usize {
        self.atoms.push(SpeciesAtom {
            name: name.into(),
            atom_type,
        });
        self.rebuild_scaling();
        self.atoms.len() - 1
    }

    /// The factor applied to pairs three bonds apart.
    pub fn scale_14(&self) -> f64 {
        self.scale_14
    }

    pub fn add_bond(&mut self, i: usize, j: usize, form: BondForm) -> Result<usize, SpeciesError> {
        let atoms = [i, j];
        self.validate(&atoms)?;
        if self.bonds.iter().any(|b| same_chain(&b.atoms, &atoms)) {
            return Err(self.duplicate("bond", &atoms));
        }
        self.bonds.push(Bond { atoms, form });
        self.rebuild_scaling();
        Ok(self.bonds.len() - 1)
    }

    pub fn add_angle(
        &mut self,
        i: usize,
        j: usize,
        k: usize,
        form: AngleForm,
    ) -> Result<usize, SpeciesError> {
        let atoms = [i, j, k];
        self.validate(&atoms)?;
        if self.angles.iter().any(|a| same_chain(&a.atoms, &atoms)) {
            return Err(self.duplicate("angle", &atoms));
        }
        self.angles.push(Angle { atoms, form });
        Ok(self.angles.len() - 1)
    }

    pub fn add_torsion(
        &mut self,
        atoms: [usize; 4],
        form: TorsionForm,
    ) -> Result<usize, SpeciesError> {
        self.validate(&atoms)?;
        if self.torsions.iter().any(|t| same_chain(&t.atoms, &atoms)) {
            return Err(self.duplicate("torsion", &atoms));
        }
        self.torsions.push(Torsion { atoms, form });
        Ok(self.torsions.len() - 1)
    }

    pub fn add_improper(
        &mut self,
        atoms: [usize; 4],
        form: TorsionForm,
    ) -> Result<usize, SpeciesError> {
        self.validate(&atoms)?;
        if self.impropers.iter().any(|t| t.atoms == atoms) {
            return Err(self.duplicate("improper", &atoms));
        }
        self.impropers.push(Improper { atoms, form });
        Ok(self.impropers.len() - 1)
    }

    /// Regenerates the scaling matrix from the bond graph with a new 1-4 factor.
    ///
    /// Pairs separated by one or two bonds are excluded (0), pairs separated by three bonds get
    /// `scale_14`, and all other pairs interact fully (1). Explicit overrides are discarded.
    /// The matrix is also rebuilt on every `add_atom`/`add_bond`, so calling this is only
    /// needed to change the 1-4 factor or drop overrides.
    pub fn update_scaling(&mut self, scale_14: f64) -> Result<(), SpeciesError> {
        if !(0.0..=1.0).contains(&scale_14) {
            return Err(SpeciesError::InvalidScaling(scale_14));
        }
        self.scale_14 = scale_14;
        self.overrides.clear();
        self.rebuild_scaling();
        Ok(())
    }

    fn rebuild_scaling(&mut self) {
        let n = self.atoms.len();
        let mut adjacency = vec![Vec::new(); n];
        for bond in &self.bonds {
            let [i, j] = bond.atoms;
            adjacency[i].push(j);
            adjacency[j].push(i);
        }

        let mut scaling = vec![1.0; n * n];
        for source in 0..n {
            for (target, hops) in bond_distances(&adjacency, source, 3) {
                scaling[source * n + target] = match hops {
                    0..=2 => 0.0,
                    _ => self.scale_14,
                };
            }
        }
        for (&(i, j), &factor) in &self.overrides {
            scaling[i * n + j] = factor;
            scaling[j * n + i] = factor;
        }
        self.scaling = scaling;
    }

    /// Overrides the scaling factor of one pair (in both orders).
    ///
    /// The override survives later `add_atom`/`add_bond` calls.
    pub fn set_scaling(&mut self, i: usize, j: usize, factor: f64) -> Result<(), SpeciesError> {
        self.validate(&[i, j])?;
        if !(0.0..=1.0).contains(&factor) {
            return Err(SpeciesError::InvalidScaling(factor));
        }
        let n = self.atoms.len();
        self.overrides.insert((i.min(j), i.max(j)), factor);
        self.scaling[i * n + j] = factor;
        self.scaling[j * n + i] = factor;
        Ok(())
    }

    /// Scaling factor in `[0, 1]` applied to the nonbonded interaction of two local atoms.
    #[inline]
    pub fn scaling(&self, i: usize, j: usize) -> f64 {
        self.scaling[i * self.atoms.len() + j]
    }

    fn validate(&self, atoms: &[usize]) -> Result<(), SpeciesError> {
        if let Some(&index) = atoms.iter().find(|&&index| index >= self.atoms.len()) {
            return Err(SpeciesError::AtomOutOfRange {
                species: self.name.clone(),
                index,
                n_atoms: self.atoms.len(),
            });
        }
        let repeated = atoms
            .iter()
            .enumerate()
            .any(|(k, a)| atoms[k + 1..].contains(a));
        if repeated {
            return Err(SpeciesError::RepeatedAtom {
                atoms: atoms.to_vec(),
            });
        }
        Ok(())
    }

    fn duplicate(&self, kind: &'static str, atoms: &[usize]) -> SpeciesError {
        SpeciesError::DuplicateTerm {
            species: self.name.clone(),
            kind,
            atoms: atoms.to_vec(),
        }
    }
}

/// Chains of atoms are the same term when read forwards or backwards.
fn same_chain(a: &[usize], b: &[usize]) -> bool {
    a == b || a.iter().eq(b.iter().rev())
}

/// Breadth-first bond distances from `source` up to `max_hops` (source included at 0).
fn bond_distances(adjacency: &[Vec<usize>], source: usize, max_hops: usize) -> Vec<(usize, usize)> {
    let mut hops = vec![usize::MAX; adjacency.len()];
    let mut queue = VecDeque::from([source]);
    hops[source] = 0;
    let mut reached = vec![(source, 0)];
    while let Some(current) = queue.pop_front() {
        if hops[current] == max_hops {
            continue;
        }
        for &next in &adjacency[current] {
            if hops[next] == usize::MAX {
                hops[next] = hops[current] + 1;
                reached.push((next, hops[next]));
                queue.push_back(next);
            }
        }
    }
    reached
}
