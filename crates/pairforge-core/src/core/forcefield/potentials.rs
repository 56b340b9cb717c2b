pub const COULOMB_CONSTANT: f64 = 332.0637; // In kcal·Å/(mol·e²)

const OVERLAP_ENERGY: f64 = 1e10;

/// Lennard-Jones 12-6 in the `σ`/`ε` form; zero at `dist == sigma`, `-ε` at `2^(1/6) σ`.
#[inline]
pub fn lennard_jones_12_6(dist: f64, sigma: f64, epsilon: f64) -> f64 {
    if dist < 1e-6 {
        return OVERLAP_ENERGY;
    }
    let rho = sigma / dist;
    let rho6 = rho.powi(6);
    let rho12 = rho6 * rho6;
    4.0 * epsilon * (rho12 - rho6)
}

#[inline]
pub fn buckingham_exp_6(dist: f64, r_min: f64, well_depth: f64, gamma: f64) -> f64 {
    if dist < 1e-6 {
        return OVERLAP_ENERGY;
    }
    let rho = dist / r_min;
    if rho < 0.1 {
        return OVERLAP_ENERGY;
    }

    let factor = gamma / (gamma - 6.0);
    well_depth * (6.0 / (gamma - 6.0) * (gamma * (1.0 - rho)).exp() - factor * rho.powi(-6))
}

#[inline]
pub fn coulomb(dist: f64, q1: f64, q2: f64, dielectric: f64) -> f64 {
    if dist < 1e-6 {
        return q1.signum() * q2.signum() * OVERLAP_ENERGY;
    }
    COULOMB_CONSTANT * q1 * q2 / (dielectric * dist)
}

/// Coulomb energy shifted so that it vanishes at `cutoff`.
#[inline]
pub fn shifted_coulomb(dist: f64, q1: f64, q2: f64, dielectric: f64, cutoff: f64) -> f64 {
    if dist < 1e-6 {
        return coulomb(dist, q1, q2, dielectric);
    }
    COULOMB_CONSTANT * q1 * q2 / dielectric * (1.0 / dist - 1.0 / cutoff)
}
