use gist_core::error::{GistError, GistResult};

/// Fixed-spacing orthogonal voxel lattice embedded in the simulation box.
#[derive(Clone, Debug)]
pub struct GridGeometry {
    origin: [f64; 3],
    center: [f64; 3],
    dims: [usize; 3],
    spacing: f64,
}

/// Margin around the grid within which a molecule still contributes to the
/// per-atom density accounting.
const GRID_MARGIN: f64 = 1.5;

impl GridGeometry {
    pub fn new(center: [f64; 3], dims: [usize; 3], spacing: f64) -> GistResult<Self> {
        if dims.iter().any(|&d| d < 1) {
            return Err(GistError::Config(format!(
                "grid dimensions must be >= 1, got {},{},{}",
                dims[0], dims[1], dims[2]
            )));
        }
        if spacing <= 0.0 {
            return Err(GistError::Config("grid spacing must be > 0".into()));
        }
        dims[0]
            .checked_mul(dims[1])
            .and_then(|v| v.checked_mul(dims[2]))
            .ok_or_else(|| GistError::Resource("voxel count overflows usize".into()))?;
        let origin = [
            center[0] - 0.5 * spacing * dims[0] as f64,
            center[1] - 0.5 * spacing * dims[1] as f64,
            center[2] - 0.5 * spacing * dims[2] as f64,
        ];
        Ok(Self {
            origin,
            center,
            dims,
            spacing,
        })
    }

    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    pub fn center(&self) -> [f64; 3] {
        self.center
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn n_voxels(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    pub fn voxel_volume(&self) -> f64 {
        self.spacing * self.spacing * self.spacing
    }

    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.dims[1] + j) * self.dims[2] + k
    }

    pub fn reverse_index(&self, flat: usize) -> (usize, usize, usize) {
        let (ny, nz) = (self.dims[1], self.dims[2]);
        (flat / (ny * nz), (flat / nz) % ny, flat % nz)
    }

    /// Cartesian center of voxel (i, j, k).
    pub fn voxel_center(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        [
            self.origin[0] + self.spacing * (i as f64 + 0.5),
            self.origin[1] + self.spacing * (j as f64 + 0.5),
            self.origin[2] + self.spacing * (k as f64 + 0.5),
        ]
    }

    /// Flat voxel index of a point, or None when off-grid. Floor semantics:
    /// a point exactly on a voxel boundary bins with the interval it starts.
    pub fn locate(&self, p: [f64; 3]) -> Option<usize> {
        let fx = (p[0] - self.origin[0]) / self.spacing;
        let fy = (p[1] - self.origin[1]) / self.spacing;
        let fz = (p[2] - self.origin[2]) / self.spacing;
        if fx < 0.0 || fy < 0.0 || fz < 0.0 {
            return None;
        }
        let i = fx.floor() as usize;
        let j = fy.floor() as usize;
        let k = fz.floor() as usize;
        if i >= self.dims[0] || j >= self.dims[1] || k >= self.dims[2] {
            return None;
        }
        Some(self.index(i, j, k))
    }

    /// Whether a molecule center is close enough to the grid to take part in
    /// density-per-atom accounting (inclusive 1.5 A margin on every axis).
    pub fn in_extended_window(&self, p: [f64; 3]) -> bool {
        for axis in 0..3 {
            let g = p[axis] - self.origin[axis];
            let g_max = self.dims[axis] as f64 * self.spacing + GRID_MARGIN;
            if !(-GRID_MARGIN..=g_max).contains(&g) {
                return false;
            }
        }
        true
    }

    /// Voxels on the outer shell of the grid; excluded from translational and
    /// six-dimensional entropy estimates.
    pub fn is_boundary(&self, flat: usize) -> bool {
        let (i, j, k) = self.reverse_index(flat);
        i == 0
            || j == 0
            || k == 0
            || i == self.dims[0] - 1
            || j == self.dims[1] - 1
            || k == self.dims[2] - 1
    }
}
