use crate::core::forcefield::intramolecular::{AngleForm, BondForm, TorsionForm};
use crate::core::forcefield::{AtomType, PotentialMap};
use crate::core::geometry::PeriodicBox;
use crate::core::models::configuration::Configuration;
use crate::core::models::species::{DEFAULT_SCALE_14, Species};
use nalgebra::{Point3, Rotation3, Vector3};

pub(crate) const TOLERANCE: f64 = 1e-9;

pub(crate) fn relative_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
}

pub(crate) fn single_type_map(sigma: f64, range: f64) -> PotentialMap {
    PotentialMap::new(vec![AtomType::new("A", 0.0, Some((0.2, sigma)))], range).unwrap()
}

/// Two single-atom molecules in a cubic box, gridded with cells of half the cutoff.
pub(crate) fn two_atoms(
    box_length: f64,
    a: [f64; 3],
    b: [f64; 3],
    sigma: f64,
    cutoff: f64,
) -> (Configuration, PotentialMap) {
    let mut configuration = Configuration::new(PeriodicBox::cubic(box_length).unwrap());
    let mut monatomic = Species::new("monatomic");
    monatomic.add_atom("A", 0);
    let species = configuration.add_species(monatomic);
    configuration
        .add_molecule(species, &[Point3::from(a)])
        .unwrap();
    configuration
        .add_molecule(species, &[Point3::from(b)])
        .unwrap();
    configuration.generate_cells(cutoff / 2.0, cutoff).unwrap();
    (configuration, single_type_map(sigma, cutoff))
}

/// A bent three-atom molecule A-B-C with the A-C pair scaled by 0.5 and placed at sigma.
pub(crate) fn scenario_b() -> (Configuration, PotentialMap) {
    let mut configuration = Configuration::new(PeriodicBox::cubic(20.0).unwrap());
    let mut triatomic = Species::new("triatomic");
    for name in ["A", "B", "C"] {
        triatomic.add_atom(name, 0);
    }
    let bond = BondForm::Harmonic { k: 300.0, eq: 1.8 };
    triatomic.add_bond(0, 1, bond).unwrap();
    triatomic.add_bond(1, 2, bond).unwrap();
    triatomic.update_scaling(DEFAULT_SCALE_14).unwrap();
    triatomic.set_scaling(0, 2, 0.5).unwrap();
    let species = configuration.add_species(triatomic);
    configuration
        .add_molecule(
            species,
            &[
                Point3::new(5.0, 5.0, 5.0),
                Point3::new(6.5, 6.0, 5.0),
                Point3::new(8.0, 5.0, 5.0),
            ],
        )
        .unwrap();
    configuration.generate_cells(3.0, 6.0).unwrap();
    (configuration, single_type_map(3.0, 6.0))
}

pub(crate) fn butane_like() -> Species {
    let mut species = Species::new("chain4");
    species.add_atom("C1", 0);
    species.add_atom("C2", 1);
    species.add_atom("C3", 1);
    species.add_atom("C4", 0);
    let bond = BondForm::Harmonic { k: 300.0, eq: 1.53 };
    let angle = AngleForm::Harmonic { k: 60.0, eq: 112.0 };
    for i in 0..3 {
        species.add_bond(i, i + 1, bond).unwrap();
    }
    species.add_angle(0, 1, 2, angle).unwrap();
    species.add_angle(1, 2, 3, angle).unwrap();
    species
        .add_torsion(
            [0, 1, 2, 3],
            TorsionForm::Cos3 {
                k1: 1.4,
                k2: -0.3,
                k3: 0.5,
            },
        )
        .unwrap();
    species
        .add_improper(
            [1, 0, 2, 3],
            TorsionForm::Cosine {
                k: 0.5,
                n: 2.0,
                eq: 180.0,
                s: 1.0,
            },
        )
        .unwrap();
    species.update_scaling(DEFAULT_SCALE_14).unwrap();
    species
}

pub(crate) fn chain_potential_map() -> PotentialMap {
    PotentialMap::new(
        vec![
            AtomType::new("CA", 0.25, Some((0.1, 3.0))),
            AtomType::new("CB", -0.25, Some((0.08, 3.2))),
        ],
        5.0,
    )
    .unwrap()
    .with_electrostatics(4.0)
}

/// Local coordinates of a planar zig-zag four-atom chain, centred on the origin.
fn chain_template() -> [Vector3<f64>; 4] {
    let raw = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.5, 0.0, 0.0),
        Vector3::new(2.0, 1.41, 0.0),
        Vector3::new(3.5, 1.41, 0.0),
    ];
    let centroid = raw.iter().sum::<Vector3<f64>>() / 4.0;
    raw.map(|v| v - centroid)
}

/// 64 four-atom chains on a jittered, randomly oriented 4x4x4 lattice in a 24 Å periodic box.
pub(crate) fn chain_fluid() -> (Configuration, PotentialMap) {
    let mut configuration = Configuration::new(PeriodicBox::cubic(24.0).unwrap());
    let species = configuration.add_species(butane_like());
    let template = chain_template();

    for m in 0..64 {
        let t = m as f64;
        let lattice = Vector3::new((m / 16) as f64, ((m / 4) % 4) as f64, (m % 4) as f64);
        let jitter = Vector3::new(
            0.4 * (1.7 * t).sin(),
            0.4 * (2.3 * t + 0.5).cos(),
            0.4 * (0.9 * t + 1.1).sin(),
        );
        let centre = Point3::from(lattice * 6.0 + Vector3::repeat(3.0) + jitter);
        let rotation = Rotation3::from_euler_angles(0.7 * t, 1.3 * t, 0.4 * t);
        let positions: Vec<Point3<f64>> = template.iter().map(|v| centre + rotation * v).collect();
        configuration.add_molecule(species, &positions).unwrap();
    }
    configuration.generate_cells(2.5, 5.0).unwrap();
    (configuration, chain_potential_map())
}
