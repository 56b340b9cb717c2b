use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Bonded energy split by term kind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntramolecularEnergy {
    pub bond: f64,
    pub angle: f64,
    pub torsion: f64,
    pub improper: f64,
}

impl IntramolecularEnergy {
    pub fn new(bond: f64, angle: f64, torsion: f64, improper: f64) -> Self {
        Self {
            bond,
            angle,
            torsion,
            improper,
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.bond + self.angle + self.torsion + self.improper
    }

    /// Components in reduction order, for passing through `all_sum`.
    pub fn to_array(self) -> [f64; 4] {
        [self.bond, self.angle, self.torsion, self.improper]
    }

    pub fn from_array(values: [f64; 4]) -> Self {
        let [bond, angle, torsion, improper] = values;
        Self::new(bond, angle, torsion, improper)
    }
}

impl Add for IntramolecularEnergy {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            bond: self.bond + rhs.bond,
            angle: self.angle + rhs.angle,
            torsion: self.torsion + rhs.torsion,
            improper: self.improper + rhs.improper,
        }
    }
}

impl AddAssign for IntramolecularEnergy {
    fn add_assign(&mut self, rhs: Self) {
        self.bond += rhs.bond;
        self.angle += rhs.angle;
        self.torsion += rhs.torsion;
        self.improper += rhs.improper;
    }
}

impl Sum for IntramolecularEnergy {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
