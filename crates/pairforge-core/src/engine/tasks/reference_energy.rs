use crate::core::forcefield::PotentialMap;
use crate::core::models::configuration::Configuration;
use crate::engine::kernel::SCALING_THRESHOLD;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Brute-force pairwise energy over every atom pair under the minimum-image convention.
///
/// Applies the same intramolecular scaling as the scaled cell sum and does not use the cell
/// array, so it serves as an independent check of the cell-based evaluation.
#[instrument(skip_all, name = "reference_energy_task")]
pub fn run(configuration: &Configuration, potential_map: &PotentialMap, cutoff: f64) -> f64 {
    let atoms = configuration.atoms();
    let sim_box = configuration.sim_box();
    let cutoff_sq = cutoff * cutoff;
    let n = atoms.len();

    let row = |i: usize| -> f64 {
        ((i + 1)..n)
            .map(|j| {
                let scale = configuration.scaling(i, j);
                if atoms[i].molecule == atoms[j].molecule && scale <= SCALING_THRESHOLD {
                    return 0.0;
                }
                let r_sq = sim_box.minimum_distance_squared(&atoms[i].position, &atoms[j].position);
                if r_sq > cutoff_sq {
                    return 0.0;
                }
                potential_map.energy(&atoms[i], &atoms[j], r_sq.sqrt()) * scale
            })
            .sum()
    };

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..n;

    #[cfg(feature = "parallel")]
    let iterator = (0..n).into_par_iter();

    let energy: f64 = iterator.map(row).sum();
    debug!(atoms = n, energy, "Reference energy evaluated.");
    energy
}
