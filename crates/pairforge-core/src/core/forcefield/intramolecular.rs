//! Functional forms of the bonded (intramolecular) terms.
//!
//! Distances are in Angstroms and angles in degrees; force constants carry the matching
//! energy units (kcal/mol per Å² or per rad²).

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "form", rename_all = "kebab-case")]
pub enum BondForm {
    /// `½ k (r - eq)²`
    Harmonic { k: f64, eq: f64 },
    /// `d (1 - exp(-alpha (r - eq)))²`
    Morse { d: f64, alpha: f64, eq: f64 },
}

impl BondForm {
    #[inline]
    pub fn energy(&self, r: f64) -> f64 {
        match *self {
            BondForm::Harmonic { k, eq } => {
                let delta = r - eq;
                0.5 * k * delta * delta
            }
            BondForm::Morse { d, alpha, eq } => {
                let x = 1.0 - (-alpha * (r - eq)).exp();
                d * x * x
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "form", rename_all = "kebab-case")]
pub enum AngleForm {
    /// `½ k (θ - eq)²` with the difference taken in radians.
    Harmonic { k: f64, eq: f64 },
    /// `k (1 + s cos(nθ - eq))`
    Cosine { k: f64, n: f64, eq: f64, s: f64 },
}

impl AngleForm {
    #[inline]
    pub fn energy(&self, theta: f64) -> f64 {
        match *self {
            AngleForm::Harmonic { k, eq } => {
                let delta = (theta - eq).to_radians();
                0.5 * k * delta * delta
            }
            AngleForm::Cosine { k, n, eq, s } => {
                k * (1.0 + s * (n * theta - eq).to_radians().cos())
            }
        }
    }
}

/// Functional forms shared by proper torsions and impropers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "form", rename_all = "kebab-case")]
pub enum TorsionForm {
    /// `k (1 + s cos(nφ - eq))`
    Cosine { k: f64, n: f64, eq: f64, s: f64 },
    /// `½ (k1 (1 + cos φ) + k2 (1 - cos 2φ) + k3 (1 + cos 3φ))`
    Cos3 { k1: f64, k2: f64, k3: f64 },
    /// `½ (k1 (1 + cos φ) + k2 (1 - cos 2φ) + k3 (1 + cos 3φ) + k4 (1 - cos 4φ))`
    Cos4 { k1: f64, k2: f64, k3: f64, k4: f64 },
    None,
}

impl TorsionForm {
    #[inline]
    pub fn energy(&self, phi: f64) -> f64 {
        let phi_rad = phi.to_radians();
        match *self {
            TorsionForm::Cosine { k, n, eq, s } => {
                k * (1.0 + s * (n * phi - eq).to_radians().cos())
            }
            TorsionForm::Cos3 { k1, k2, k3 } => {
                0.5 * (k1 * (1.0 + phi_rad.cos())
                    + k2 * (1.0 - (2.0 * phi_rad).cos())
                    + k3 * (1.0 + (3.0 * phi_rad).cos()))
            }
            TorsionForm::Cos4 { k1, k2, k3, k4 } => {
                0.5 * (k1 * (1.0 + phi_rad.cos())
                    + k2 * (1.0 - (2.0 * phi_rad).cos())
                    + k3 * (1.0 + (3.0 * phi_rad).cos())
                    + k4 * (1.0 - (4.0 * phi_rad).cos()))
            }
            TorsionForm::None => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    pub atoms: [usize; 2],
    pub form: BondForm,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub atoms: [usize; 3],
    pub form: AngleForm,
}

/// A proper torsion `i-j-k-l` about the `j-k` axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torsion {
    pub atoms: [usize; 4],
    pub form: TorsionForm,
}

/// An improper dihedral; the first atom is the central atom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Improper {
    pub atoms: [usize; 4],
    pub form: TorsionForm,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn harmonic_bond_is_zero_at_equilibrium_and_quadratic_around_it() {
        let form = BondForm::Harmonic { k: 100.0, eq: 1.5 };
        assert!(f64_approx_equal(form.energy(1.5), 0.0));
        assert!(f64_approx_equal(form.energy(1.6), 0.5));
        assert!(f64_approx_equal(form.energy(1.4), 0.5));
    }

    #[test]
    fn morse_bond_approaches_well_depth_at_long_range() {
        let form = BondForm::Morse { d: 80.0, alpha: 2.0, eq: 1.0 };
        assert!(f64_approx_equal(form.energy(1.0), 0.0));
        assert!((form.energy(20.0) - 80.0).abs() < 1e-6);
    }

    #[test]
    fn harmonic_angle_uses_radian_difference() {
        let form = AngleForm::Harmonic { k: 2.0, eq: 109.5 };
        assert!(f64_approx_equal(form.energy(109.5), 0.0));
        let delta = 10.0_f64.to_radians();
        assert!(f64_approx_equal(form.energy(119.5), delta * delta));
    }

    #[test]
    fn cosine_angle_matches_closed_form() {
        let form = AngleForm::Cosine { k: 3.0, n: 1.0, eq: 0.0, s: -1.0 };
        assert!(f64_approx_equal(form.energy(0.0), 0.0));
        assert!(f64_approx_equal(form.energy(180.0), 6.0));
    }

    #[test]
    fn cos3_torsion_has_expected_values_at_trans_and_cis() {
        let form = TorsionForm::Cos3 { k1: 1.0, k2: 2.0, k3: 3.0 };
        assert!(f64_approx_equal(form.energy(180.0), 0.0));
        assert!(f64_approx_equal(form.energy(0.0), 0.5 * (2.0 + 0.0 + 6.0)));
    }

    #[test]
    fn cos4_torsion_reduces_to_cos3_when_k4_is_zero() {
        let cos3 = TorsionForm::Cos3 { k1: 1.2, k2: -0.4, k3: 0.7 };
        let cos4 = TorsionForm::Cos4 { k1: 1.2, k2: -0.4, k3: 0.7, k4: 0.0 };
        for phi in [-150.0, -60.0, 0.0, 45.0, 120.0] {
            assert!(f64_approx_equal(cos3.energy(phi), cos4.energy(phi)));
        }
    }

    #[test]
    fn none_torsion_is_always_zero() {
        assert_eq!(TorsionForm::None.energy(37.0), 0.0);
    }

    #[test]
    fn forms_deserialize_from_tagged_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            bond: BondForm,
            torsion: TorsionForm,
        }
        let parsed: Wrapper = toml::from_str(
            r#"
            bond = { form = "harmonic", k = 450.0, eq = 1.0 }
            torsion = { form = "cos3", k1 = 1.0, k2 = 0.5, k3 = 0.25 }
            "#,
        )
        .unwrap();
        assert_eq!(parsed.bond, BondForm::Harmonic { k: 450.0, eq: 1.0 });
        assert_eq!(parsed.torsion, TorsionForm::Cos3 { k1: 1.0, k2: 0.5, k3: 0.25 });
    }
}
