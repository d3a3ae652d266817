use crate::constants::SMALL;

pub const X_LAB: Vec3 = Vec3 {
    x: 1.0,
    y: 0.0,
    z: 0.0,
};
pub const Z_LAB: Vec3 = Vec3 {
    x: 0.0,
    y: 0.0,
    z: 1.0,
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn norm2(self) -> f64 {
        self.dot(self)
    }

    pub fn norm(self) -> f64 {
        self.norm2().sqrt()
    }

    pub fn scale(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn normalized(self) -> Self {
        let n = self.norm();
        if n > 0.0 {
            self.scale(1.0 / n)
        } else {
            self
        }
    }
}

/// Unit quaternion (w, x, y, z) encoding a rigid-body orientation.
#[derive(Clone, Copy, Debug)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub fn dot(self, other: Self) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Angular distance between two orientations, 2·acos(|q·q'|) in [0, π].
    pub fn distance(self, other: Self) -> f64 {
        2.0 * self.dot(other).abs().clamp(0.0, 1.0).acos()
    }

    /// Hamilton product self ⊗ other.
    pub fn mul(self, o: Self) -> Self {
        Self {
            w: self.w * o.w - self.x * o.x - self.y * o.y - self.z * o.z,
            x: self.w * o.x + self.x * o.w + self.y * o.z - self.z * o.y,
            y: self.w * o.y - self.x * o.z + self.y * o.w + self.z * o.x,
            z: self.w * o.z + self.x * o.y - self.y * o.x + self.z * o.w,
        }
    }

    /// Applies the transposed rotation matrix of this quaternion to `v`.
    pub fn rotate_vec_passive(self, v: Vec3) -> Vec3 {
        let (w, x, y, z) = (self.w, self.x, self.y, self.z);
        Vec3::new(
            (w * w + x * x - y * y - z * z) * v.x
                + 2.0 * (x * y + w * z) * v.y
                + 2.0 * (x * z - w * y) * v.z,
            2.0 * (x * y - w * z) * v.x
                + (w * w - x * x + y * y - z * z) * v.y
                + 2.0 * (y * z + w * x) * v.z,
            2.0 * (x * z + w * y) * v.x
                + 2.0 * (y * z - w * x) * v.y
                + (w * w - x * x - y * y + z * z) * v.z,
        )
    }

    /// Orientation of a rigid solvent molecule from its head atom and the two
    /// reference atoms. The first rotation carries the normalized O→H1 vector
    /// onto the lab x axis, the second aligns the molecular plane normal with
    /// the lab z axis about x; the product of the two half-angle quaternions
    /// is returned as (w, x, y, z).
    pub fn from_rigid_orientation(o: Vec3, h1: Vec3, h2: Vec3) -> Self {
        let h1v = h1.sub(o).normalized();
        let h2v = h2.sub(o).normalized();

        let sar = h1v.cross(X_LAB);
        let ar1 = if sar.norm() > SMALL {
            sar.normalized()
        } else {
            // O→H1 parallel to the x axis; any perpendicular axis serves.
            Vec3::new(0.0, 1.0, 0.0)
        };
        let dp1 = X_LAB.dot(h1v).clamp(-1.0, 1.0);
        let mut theta = dp1.acos();
        let sign = sar.dot(h1v);
        if sign > SMALL {
            theta /= 2.0;
        } else {
            theta /= -2.0;
        }
        let sin_theta = theta.sin();
        let q1 = Quaternion {
            w: theta.cos(),
            x: ar1.x * sin_theta,
            y: ar1.y * sin_theta,
            z: ar1.z * sin_theta,
        };

        let h1r = q1.rotate_vec_passive(h1v);
        let h2r = q1.rotate_vec_passive(h2v);

        let ar2 = h1r.cross(h2r).normalized();
        let dp2 = ar2.dot(Z_LAB).clamp(-1.0, 1.0);
        let mut theta2 = dp2.acos();
        let sar2 = ar2.cross(Z_LAB);
        let sign2 = sar2.dot(h1r);
        if sign2 < 0.0 {
            theta2 /= 2.0;
        } else {
            theta2 /= -2.0;
        }
        let q2 = Quaternion {
            w: theta2.cos(),
            x: theta2.sin(),
            y: 0.0,
            z: 0.0,
        };

        q1.mul(q2)
    }
}
