use crate::core::models::ids::MoleculeId;
use crate::engine::distributor::{DivisionStrategy, ProcessPool, chunk_range};
use crate::engine::kernel::EnergyKernel;
use tracing::{info, instrument};

/// Intermolecular energy of every molecule, replicated on every worker of `strategy`.
///
/// With [`DivisionStrategy::Pool`] molecules are split between groups and each molecule is
/// evaluated cooperatively by the workers of its group; group leaders then contribute the
/// results to a pool-wide reduction. Narrower strategies split molecules between the workers
/// of the scope directly.
#[instrument(skip_all, name = "molecule_energies_task")]
pub fn run<P: ProcessPool>(
    kernel: &EnergyKernel<'_, P>,
    strategy: DivisionStrategy,
) -> Vec<(MoleculeId, f64)> {
    let pool = kernel.pool();
    let molecules: Vec<MoleculeId> = kernel
        .configuration()
        .molecules_iter()
        .map(|(id, _)| id)
        .collect();
    let inner = pool.sub_division_strategy(strategy);

    let (range, contributes) = match strategy {
        DivisionStrategy::Pool => (
            chunk_range(molecules.len(), pool.n_groups(), pool.group_index()),
            pool.is_group_leader(),
        ),
        DivisionStrategy::Group | DivisionStrategy::Sequential => {
            (pool.chunk(molecules.len(), strategy), true)
        }
    };

    let mut energies = vec![0.0; molecules.len()];
    for k in range {
        let energy = kernel.molecule_energy(molecules[k], inner, true);
        if contributes {
            energies[k] = energy;
        }
    }
    pool.all_sum(&mut energies, strategy);

    info!(
        molecules = molecules.len(),
        "Per-molecule energies evaluated."
    );
    molecules.into_iter().zip(energies).collect()
}
