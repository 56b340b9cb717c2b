use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoxError {
    #[error("Box length must be finite and positive, got {0}")]
    InvalidLength(f64),
    #[error("Box axes are singular or left-handed (determinant {0})")]
    SingularAxes(f64),
}

/// The periodicity class of a simulation box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxType {
    /// No periodic images; the axes only bound the region covered by the cell grid.
    NonPeriodic,
    /// Equal orthogonal axes.
    Cubic,
    /// Orthogonal axes of independent length.
    Orthorhombic,
    /// General (skewed) axes.
    Triclinic,
}

/// Simulation box geometry providing minimum-image primitives.
///
/// The box is described by three axis vectors stored as the columns of a matrix, so that a
/// fractional coordinate `f` maps to the real-space point `axes * f`. For every box type the
/// axes also define the extent of the region that the cell grid partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicBox {
    box_type: BoxType,
    axes: Matrix3<f64>,
    inverse: Matrix3<f64>,
    lengths: Vector3<f64>,
}

fn check_length(length: f64) -> Result<f64, BoxError> {
    if length.is_finite() && length > 0.0 {
        Ok(length)
    } else {
        Err(BoxError::InvalidLength(length))
    }
}

impl PeriodicBox {
    /// Creates a non-periodic region spanning `[0, lengths)` along each Cartesian axis.
    pub fn non_periodic(lengths: Vector3<f64>) -> Result<Self, BoxError> {
        Self::orthogonal(BoxType::NonPeriodic, lengths)
    }

    pub fn cubic(length: f64) -> Result<Self, BoxError> {
        Self::orthogonal(BoxType::Cubic, Vector3::repeat(length))
    }

    pub fn orthorhombic(lengths: Vector3<f64>) -> Result<Self, BoxError> {
        Self::orthogonal(BoxType::Orthorhombic, lengths)
    }

    /// Creates a triclinic box from axis vectors given as matrix columns.
    pub fn triclinic(axes: Matrix3<f64>) -> Result<Self, BoxError> {
        let det = axes.determinant();
        if !det.is_finite() || det <= 1e-12 {
            return Err(BoxError::SingularAxes(det));
        }
        let inverse = axes.try_inverse().ok_or(BoxError::SingularAxes(det))?;
        let lengths = Vector3::new(
            axes.column(0).norm(),
            axes.column(1).norm(),
            axes.column(2).norm(),
        );
        Ok(Self {
            box_type: BoxType::Triclinic,
            axes,
            inverse,
            lengths,
        })
    }

    fn orthogonal(box_type: BoxType, lengths: Vector3<f64>) -> Result<Self, BoxError> {
        for &length in lengths.iter() {
            check_length(length)?;
        }
        let axes = Matrix3::from_diagonal(&lengths);
        let inverse = Matrix3::from_diagonal(&lengths.map(|l| 1.0 / l));
        Ok(Self {
            box_type,
            axes,
            inverse,
            lengths,
        })
    }

    pub fn box_type(&self) -> BoxType {
        self.box_type
    }

    pub fn is_periodic(&self) -> bool {
        self.box_type != BoxType::NonPeriodic
    }

    /// Returns `true` for boxes whose axes are mutually orthogonal.
    pub fn is_orthogonal(&self) -> bool {
        self.box_type != BoxType::Triclinic
    }

    pub fn axes(&self) -> &Matrix3<f64> {
        &self.axes
    }

    pub fn lengths(&self) -> Vector3<f64> {
        self.lengths
    }

    pub fn volume(&self) -> f64 {
        self.axes.determinant().abs()
    }

    /// Perpendicular distance between opposite faces along each axis.
    ///
    /// For orthogonal boxes this equals the axis lengths. For triclinic boxes it is the
    /// volume divided by the area of the face spanned by the other two axes, which is the
    /// quantity that bounds how far apart two points in adjacent grid slabs can be.
    pub fn axis_widths(&self) -> Vector3<f64> {
        if self.is_orthogonal() {
            return self.lengths;
        }
        let volume = self.volume();
        let a = self.axes.column(0).clone_owned();
        let b = self.axes.column(1).clone_owned();
        let c = self.axes.column(2).clone_owned();
        Vector3::new(
            volume / b.cross(&c).norm(),
            volume / c.cross(&a).norm(),
            volume / a.cross(&b).norm(),
        )
    }

    pub fn fractional(&self, point: &Point3<f64>) -> Vector3<f64> {
        self.inverse * point.coords
    }

    pub fn real(&self, fractional: &Vector3<f64>) -> Point3<f64> {
        Point3::from(self.axes * fractional)
    }

    /// Folds a point back into the primary image. Non-periodic boxes return it unchanged.
    pub fn fold(&self, point: &Point3<f64>) -> Point3<f64> {
        if !self.is_periodic() {
            return *point;
        }
        let frac = self.fractional(point).map(|f| f - f.floor());
        self.real(&frac)
    }

    /// Shortest vector pointing from `a` to `b` over all periodic images of `b`.
    pub fn minimum_vector(&self, a: &Point3<f64>, b: &Point3<f64>) -> Vector3<f64> {
        let d = b - a;
        match self.box_type {
            BoxType::NonPeriodic => d,
            BoxType::Cubic | BoxType::Orthorhombic => Vector3::new(
                d.x - self.lengths.x * (d.x / self.lengths.x).round(),
                d.y - self.lengths.y * (d.y / self.lengths.y).round(),
                d.z - self.lengths.z * (d.z / self.lengths.z).round(),
            ),
            BoxType::Triclinic => {
                let frac = self.inverse * d;
                self.axes * frac.map(|f| f - f.round())
            }
        }
    }

    pub fn minimum_distance_squared(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        self.minimum_vector(a, b).norm_squared()
    }

    pub fn minimum_distance(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        self.minimum_vector(a, b).norm()
    }

    /// Returns the image of `point` closest to `reference`.
    pub fn minimum_image(&self, point: &Point3<f64>, reference: &Point3<f64>) -> Point3<f64> {
        reference + self.minimum_vector(reference, point)
    }
}

/// Angle between two vectors, in degrees.
pub fn angle_in_degrees(v1: &Vector3<f64>, v2: &Vector3<f64>) -> f64 {
    v1.angle(v2).to_degrees()
}

/// Dihedral angle in degrees, in the range (-180, 180].
///
/// The arguments are the bond vectors `j->i`, `j->k` and `k->l` of the atom sequence
/// `i-j-k-l`. A planar trans arrangement gives 180 and a planar cis arrangement gives 0.
pub fn torsion_in_degrees(v_ji: &Vector3<f64>, v_jk: &Vector3<f64>, v_kl: &Vector3<f64>) -> f64 {
    let b1 = -v_ji;
    let n1 = b1.cross(v_jk);
    let n2 = v_jk.cross(v_kl);
    let m1 = n1.cross(&v_jk.normalize());
    let x = n1.dot(&n2);
    let y = m1.dot(&n2);
    let phi = y.atan2(x).to_degrees();
    if phi <= -180.0 { phi + 360.0 } else { phi }
}
