use super::params::{NonBondedParams, ParamLoadError};
use super::potentials::{buckingham_exp_6, lennard_jones_12_6, shifted_coulomb};
use crate::core::models::atom::Atom;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Short-range interaction between a pair of atom types.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "form", rename_all = "kebab-case")]
pub enum PairPotential {
    None,
    LennardJones {
        epsilon: f64,
        sigma: f64,
    },
    Buckingham {
        r_min: f64,
        well_depth: f64,
        gamma: f64,
    },
}

impl PairPotential {
    #[inline]
    pub fn energy(&self, r: f64) -> f64 {
        match *self {
            PairPotential::None => 0.0,
            PairPotential::LennardJones { epsilon, sigma } => lennard_jones_12_6(r, sigma, epsilon),
            PairPotential::Buckingham {
                r_min,
                well_depth,
                gamma,
            } => buckingham_exp_6(r, r_min, well_depth, gamma),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomType {
    pub name: String,
    pub charge: f64,
    /// `(epsilon, sigma)` used for Lorentz-Berthelot mixing.
    pub lennard_jones: Option<(f64, f64)>,
}

impl AtomType {
    pub fn new(name: impl Into<String>, charge: f64, lennard_jones: Option<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            charge,
            lennard_jones,
        }
    }
}

/// Pair-interaction lookup table indexed by atom type.
///
/// Each unordered pair of types has one short-range potential, mixed from the per-type
/// Lennard-Jones parameters unless explicitly overridden. When a dielectric is set, a Coulomb
/// term shifted to zero at the interaction range is added for charged pairs.
#[derive(Debug, Clone)]
pub struct PotentialMap {
    range: f64,
    types: Vec<AtomType>,
    pairs: Vec<PairPotential>,
    dielectric: Option<f64>,
}

impl PotentialMap {
    pub fn new(types: Vec<AtomType>, range: f64) -> Result<Self, ParamLoadError> {
        if !range.is_finite() || range <= 0.0 {
            return Err(ParamLoadError::InvalidRange(range));
        }
        let n = types.len();
        let mut pairs = vec![PairPotential::None; n * n];
        for a in 0..n {
            for b in 0..n {
                pairs[a * n + b] = mix(&types[a], &types[b]);
            }
        }
        Ok(Self {
            range,
            types,
            pairs,
            dielectric: None,
        })
    }

    pub fn with_electrostatics(mut self, dielectric: f64) -> Self {
        self.dielectric = Some(dielectric);
        self
    }

    pub fn from_params(params: &NonBondedParams) -> Result<Self, ParamLoadError> {
        let mut seen = HashMap::new();
        let mut types = Vec::with_capacity(params.types.len());
        for (index, param) in params.types.iter().enumerate() {
            if seen.insert(param.name.clone(), index).is_some() {
                return Err(ParamLoadError::DuplicateType(param.name.clone()));
            }
            let lennard_jones = match (param.epsilon, param.sigma) {
                (Some(epsilon), Some(sigma)) => Some((epsilon, sigma)),
                (None, None) => None,
                _ => return Err(ParamLoadError::IncompleteLennardJones(param.name.clone())),
            };
            types.push(AtomType::new(param.name.clone(), param.charge, lennard_jones));
        }

        let mut map = Self::new(types, params.globals.range)?;
        if let Some(dielectric) = params.globals.dielectric {
            map = map.with_electrostatics(dielectric);
        }
        for pair in &params.pairs {
            let a = map
                .type_index(&pair.a)
                .ok_or_else(|| ParamLoadError::UnknownType(pair.a.clone()))?;
            let b = map
                .type_index(&pair.b)
                .ok_or_else(|| ParamLoadError::UnknownType(pair.b.clone()))?;
            map.set_pair(a, b, pair.potential);
        }

        debug!(
            "Built potential map with {} atom types, {} pair overrides, range {:.3}",
            map.n_types(),
            params.pairs.len(),
            map.range
        );
        Ok(map)
    }

    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        Self::from_params(&NonBondedParams::load(path)?)
    }

    /// Overrides the potential between two types (in both orders).
    pub fn set_pair(&mut self, a: usize, b: usize, potential: PairPotential) {
        let n = self.types.len();
        self.pairs[a * n + b] = potential;
        self.pairs[b * n + a] = potential;
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn dielectric(&self) -> Option<f64> {
        self.dielectric
    }

    pub fn n_types(&self) -> usize {
        self.types.len()
    }

    pub fn atom_type(&self, index: usize) -> &AtomType {
        &self.types[index]
    }

    pub fn type_index(&self, name: &str) -> Option<usize> {
        self.types.iter().position(|t| t.name == name)
    }

    /// # Panics
    ///
    /// Panics if either type index is not defined by this map.
    #[inline]
    pub fn pair(&self, a: usize, b: usize) -> &PairPotential {
        let n = self.types.len();
        assert!(
            a < n && b < n,
            "atom type pair ({a}, {b}) is out of range for a potential map with {n} types"
        );
        &self.pairs[a * n + b]
    }

    #[inline]
    pub fn energy_by_type(&self, a: usize, b: usize, r: f64) -> f64 {
        let short_range = self.pair(a, b).energy(r);
        match self.dielectric {
            Some(dielectric) => {
                let (qa, qb) = (self.types[a].charge, self.types[b].charge);
                if qa == 0.0 || qb == 0.0 {
                    short_range
                } else {
                    short_range + shifted_coulomb(r, qa, qb, dielectric, self.range)
                }
            }
            None => short_range,
        }
    }

    #[inline]
    pub fn energy(&self, a: &Atom, b: &Atom, r: f64) -> f64 {
        self.energy_by_type(a.atom_type, b.atom_type, r)
    }
}

fn mix(a: &AtomType, b: &AtomType) -> PairPotential {
    match (a.lennard_jones, b.lennard_jones) {
        (Some((eps_a, sigma_a)), Some((eps_b, sigma_b))) => PairPotential::LennardJones {
            epsilon: (eps_a * eps_b).sqrt(),
            sigma: 0.5 * (sigma_a + sigma_b),
        },
        _ => PairPotential::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::{GlobalParams, PairParam, TypeParam};
    use crate::core::forcefield::potentials::coulomb;
    use tempfile::tempdir;

    const TOLERANCE: f64 = 1e-9;

    fn two_type_map() -> PotentialMap {
        PotentialMap::new(
            vec![
                AtomType::new("A", 0.0, Some((0.4, 3.0))),
                AtomType::new("B", 0.0, Some((0.1, 2.0))),
            ],
            8.0,
        )
        .unwrap()
    }

    fn type_param(name: &str, epsilon: Option<f64>, sigma: Option<f64>) -> TypeParam {
        TypeParam {
            name: name.to_string(),
            charge: 0.0,
            epsilon,
            sigma,
        }
    }

    #[test]
    fn lorentz_berthelot_mixing_is_applied_by_default() {
        let map = two_type_map();
        match *map.pair(0, 1) {
            PairPotential::LennardJones { epsilon, sigma } => {
                assert!((epsilon - 0.2).abs() < TOLERANCE);
                assert!((sigma - 2.5).abs() < TOLERANCE);
            }
            other => panic!("expected a mixed Lennard-Jones pair, got {other:?}"),
        }
        assert_eq!(map.pair(0, 1), map.pair(1, 0));
    }

    #[test]
    fn lennard_jones_pair_energy_is_zero_at_sigma() {
        let map = two_type_map();
        assert!(map.energy_by_type(0, 0, 3.0).abs() < TOLERANCE);
        assert!(map.energy_by_type(1, 1, 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn set_pair_overrides_both_orders() {
        let mut map = two_type_map();
        map.set_pair(1, 0, PairPotential::None);
        assert_eq!(map.energy_by_type(0, 1, 2.2), 0.0);
        assert_eq!(map.energy_by_type(1, 0, 2.2), 0.0);
    }

    #[test]
    fn electrostatics_add_shifted_coulomb_for_charged_pairs() {
        let map = PotentialMap::new(
            vec![
                AtomType::new("Na", 1.0, None),
                AtomType::new("Cl", -1.0, None),
                AtomType::new("Ar", 0.0, None),
            ],
            10.0,
        )
        .unwrap()
        .with_electrostatics(2.0);
        let expected = coulomb(4.0, 1.0, -1.0, 2.0) - coulomb(10.0, 1.0, -1.0, 2.0);
        assert!((map.energy_by_type(0, 1, 4.0) - expected).abs() < TOLERANCE);
        assert_eq!(map.energy_by_type(0, 2, 4.0), 0.0);
    }

    #[test]
    #[should_panic(expected = "out of range for a potential map with 2 types")]
    fn pair_rejects_an_undefined_second_type() {
        two_type_map().energy_by_type(0, 2, 3.0);
    }

    #[test]
    #[should_panic(expected = "out of range for a potential map with 2 types")]
    fn pair_rejects_an_undefined_first_type() {
        two_type_map().pair(2, 0);
    }

    #[test]
    fn new_rejects_invalid_range() {
        let result = PotentialMap::new(vec![], 0.0);
        assert!(matches!(result, Err(ParamLoadError::InvalidRange(_))));
    }

    #[test]
    fn from_params_rejects_unknown_pair_type() {
        let params = NonBondedParams {
            globals: GlobalParams {
                range: 5.0,
                dielectric: None,
            },
            types: vec![type_param("A", Some(0.1), Some(3.0))],
            pairs: vec![PairParam {
                a: "A".to_string(),
                b: "Z".to_string(),
                potential: PairPotential::None,
            }],
        };
        let result = PotentialMap::from_params(&params);
        assert!(matches!(result, Err(ParamLoadError::UnknownType(name)) if name == "Z"));
    }

    #[test]
    fn from_params_rejects_half_specified_lennard_jones() {
        let params = NonBondedParams {
            globals: GlobalParams {
                range: 5.0,
                dielectric: None,
            },
            types: vec![type_param("A", Some(0.1), None)],
            pairs: vec![],
        };
        let result = PotentialMap::from_params(&params);
        assert!(matches!(result, Err(ParamLoadError::IncompleteLennardJones(_))));
    }

    #[test]
    fn from_params_rejects_duplicate_types() {
        let params = NonBondedParams {
            globals: GlobalParams {
                range: 5.0,
                dielectric: None,
            },
            types: vec![type_param("A", None, None), type_param("A", None, None)],
            pairs: vec![],
        };
        let result = PotentialMap::from_params(&params);
        assert!(matches!(result, Err(ParamLoadError::DuplicateType(_))));
    }

    #[test]
    fn load_builds_map_with_overrides_from_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("params.toml");
        std::fs::write(
            &file_path,
            r#"
[globals]
range = 6.0

[[types]]
name = "C"
epsilon = 0.1
sigma = 3.4

[[types]]
name = "H"
epsilon = 0.02
sigma = 2.5

[[pairs]]
a = "H"
b = "H"
form = "none"
"#,
        )
        .unwrap();

        let map = PotentialMap::load(&file_path).unwrap();
        assert_eq!(map.range(), 6.0);
        assert_eq!(map.dielectric(), None);
        assert_eq!(map.type_index("H"), Some(1));
        assert_eq!(*map.pair(1, 1), PairPotential::None);
        assert!(matches!(
            map.pair(0, 1),
            PairPotential::LennardJones { .. }
        ));
    }
}
