use crate::error::{GistError, GistResult};
use crate::frame::Box3;

/// Per-frame imaging geometry resolved from the box descriptor.
#[derive(Clone, Copy, Debug)]
pub enum Imaging {
    None,
    Ortho {
        lx: f64,
        ly: f64,
        lz: f64,
    },
    NonOrtho {
        cell: [[f64; 3]; 3],
        inv: [[f64; 3]; 3],
    },
}

impl Imaging {
    pub fn from_box(box_: Box3) -> GistResult<Self> {
        match box_ {
            Box3::None => Ok(Imaging::None),
            Box3::Orthorhombic { lx, ly, lz } => Ok(Imaging::Ortho { lx, ly, lz }),
            Box3::Triclinic { .. } => {
                let (cell, inv) = cell_and_inv_from_box(box_)?;
                Ok(Imaging::NonOrtho { cell, inv })
            }
        }
    }

    /// Minimum-image squared distance between two points.
    pub fn dist2(&self, a: [f64; 3], b: [f64; 3]) -> f64 {
        let mut dx = a[0] - b[0];
        let mut dy = a[1] - b[1];
        let mut dz = a[2] - b[2];
        match *self {
            Imaging::None => {}
            Imaging::Ortho { lx, ly, lz } => apply_pbc(&mut dx, &mut dy, &mut dz, lx, ly, lz),
            Imaging::NonOrtho { cell, inv } => {
                apply_pbc_triclinic(&mut dx, &mut dy, &mut dz, &cell, &inv)
            }
        }
        dx * dx + dy * dy + dz * dz
    }
}

pub fn apply_pbc(dx: &mut f64, dy: &mut f64, dz: &mut f64, lx: f64, ly: f64, lz: f64) {
    if lx > 0.0 {
        *dx -= (*dx / lx).round() * lx;
    }
    if ly > 0.0 {
        *dy -= (*dy / ly).round() * ly;
    }
    if lz > 0.0 {
        *dz -= (*dz / lz).round() * lz;
    }
}

pub fn apply_pbc_triclinic(
    dx: &mut f64,
    dy: &mut f64,
    dz: &mut f64,
    cell: &[[f64; 3]; 3],
    inv: &[[f64; 3]; 3],
) {
    let fx = inv[0][0] * *dx + inv[1][0] * *dy + inv[2][0] * *dz;
    let fy = inv[0][1] * *dx + inv[1][1] * *dy + inv[2][1] * *dz;
    let fz = inv[0][2] * *dx + inv[1][2] * *dy + inv[2][2] * *dz;
    let fx = fx - fx.round();
    let fy = fy - fy.round();
    let fz = fz - fz.round();
    *dx = fx * cell[0][0] + fy * cell[1][0] + fz * cell[2][0];
    *dy = fx * cell[0][1] + fy * cell[1][1] + fz * cell[2][1];
    *dz = fx * cell[0][2] + fy * cell[1][2] + fz * cell[2][2];
}

/// Wraps a point into the primary unit cell of a triclinic box.
pub fn wrap_to_primary(p: [f64; 3], cell: &[[f64; 3]; 3], inv: &[[f64; 3]; 3]) -> [f64; 3] {
    let fx = inv[0][0] * p[0] + inv[1][0] * p[1] + inv[2][0] * p[2];
    let fy = inv[0][1] * p[0] + inv[1][1] * p[1] + inv[2][1] * p[2];
    let fz = inv[0][2] * p[0] + inv[1][2] * p[1] + inv[2][2] * p[2];
    let fx = fx - fx.floor();
    let fy = fy - fy.floor();
    let fz = fz - fz.floor();
    [
        fx * cell[0][0] + fy * cell[1][0] + fz * cell[2][0],
        fx * cell[0][1] + fy * cell[1][1] + fz * cell[2][1],
        fx * cell[0][2] + fy * cell[1][2] + fz * cell[2][2],
    ]
}

/// Squared distance minimized over the 27 lattice images of `a`, both points
/// wrapped to the primary cell first. Reference implementation used to
/// cross-check the canonical triclinic routine.
pub fn dist2_image27(
    a: [f64; 3],
    b: [f64; 3],
    cell: &[[f64; 3]; 3],
    inv: &[[f64; 3]; 3],
) -> f64 {
    let wa = wrap_to_primary(a, cell, inv);
    let b = wrap_to_primary(b, cell, inv);
    let mut best = f64::MAX;
    for ix in -1i32..=1 {
        for iy in -1i32..=1 {
            for iz in -1i32..=1 {
                let (fx, fy, fz) = (ix as f64, iy as f64, iz as f64);
                let img = [
                    wa[0] + fx * cell[0][0] + fy * cell[1][0] + fz * cell[2][0],
                    wa[1] + fx * cell[0][1] + fy * cell[1][1] + fz * cell[2][1],
                    wa[2] + fx * cell[0][2] + fy * cell[1][2] + fz * cell[2][2],
                ];
                let dx = img[0] - b[0];
                let dy = img[1] - b[1];
                let dz = img[2] - b[2];
                best = best.min(dx * dx + dy * dy + dz * dz);
            }
        }
    }
    best
}

pub fn cell_and_inv_from_box(box_: Box3) -> GistResult<([[f64; 3]; 3], [[f64; 3]; 3])> {
    match box_ {
        Box3::Orthorhombic { lx, ly, lz } => {
            if lx == 0.0 || ly == 0.0 || lz == 0.0 {
                return Err(GistError::Mismatch(
                    "image requires nonzero box lengths".into(),
                ));
            }
            let cell = [[lx, 0.0, 0.0], [0.0, ly, 0.0], [0.0, 0.0, lz]];
            let inv = [
                [1.0 / lx, 0.0, 0.0],
                [0.0, 1.0 / ly, 0.0],
                [0.0, 0.0, 1.0 / lz],
            ];
            Ok((cell, inv))
        }
        Box3::Triclinic { m } => {
            let det = m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
                + m[2] * (m[3] * m[7] - m[4] * m[6]);
            if det == 0.0 {
                return Err(GistError::Mismatch("box matrix not invertible".into()));
            }
            let cell = [[m[0], m[1], m[2]], [m[3], m[4], m[5]], [m[6], m[7], m[8]]];
            let inv = [
                [
                    (m[4] * m[8] - m[5] * m[7]) / det,
                    (m[2] * m[7] - m[1] * m[8]) / det,
                    (m[1] * m[5] - m[2] * m[4]) / det,
                ],
                [
                    (m[5] * m[6] - m[3] * m[8]) / det,
                    (m[0] * m[8] - m[2] * m[6]) / det,
                    (m[2] * m[3] - m[0] * m[5]) / det,
                ],
                [
                    (m[3] * m[7] - m[4] * m[6]) / det,
                    (m[1] * m[6] - m[0] * m[7]) / det,
                    (m[0] * m[4] - m[1] * m[3]) / det,
                ],
            ];
            Ok((cell, inv))
        }
        Box3::None => Err(GistError::Mismatch("box vectors required".into())),
    }
}
