use rayon::prelude::*;

use gist_core::constants::{EULER_MASC, GASK_KCAL, GIST_HUGE, GIST_TINY};

use super::accumulate::VoxelAccumulators;
use super::grid::GridGeometry;

/// Sentinel bounds for the orientational nearest-neighbor search.
const ORIENT_SENTINEL: f64 = 1.0e4;
const ORIENT_ACCEPT: f64 = 9.999e3;

/// Raw (unscaled) per-voxel entropy accumulators plus run-level counters.
#[derive(Debug, Default)]
pub struct EntropyFields {
    pub dtsorient_raw: Vec<f64>,
    pub dtstrans_raw: Vec<f64>,
    pub dtssix_raw: Vec<f64>,
    /// Total on-grid water samples over all voxels.
    pub nwtt: u64,
    /// Water samples with a valid translational nearest neighbor.
    pub nwts: u64,
}

#[derive(Clone, Copy)]
pub struct EntropyParams {
    pub temperature: f64,
    pub bulk_density: f64,
    pub n_frames: usize,
    pub exact_nn_volume: bool,
    pub nn_search_layers: usize,
}

/// Quaternion angular distance between two stored (w, x, y, z) samples.
fn quat_distance(q: &[f64], a: usize, b: usize) -> f64 {
    let qa = &q[4 * a..4 * a + 4];
    let qb = &q[4 * b..4 * b + 4];
    let dot = qa[0] * qb[0] + qa[1] * qb[1] + qa[2] * qb[2] + qa[3] * qb[3];
    2.0 * dot.abs().clamp(0.0, 1.0).acos()
}

/// Correction of the 6D nearest-neighbor ball volume relative to the
/// small-radius form r^6*pi/48: the rotational part of the space is bounded,
/// so the exact volume integrates the rotational measure density (1 - cos w)
/// against the shrinking 3-ball cross sections. Tends to 1 as r tends to 0.
fn six_volume_corr(r: f64) -> f64 {
    if r < 1.0e-6 {
        return 1.0;
    }
    let upper = r.min(std::f64::consts::PI);
    let n = 64usize;
    let h = upper / n as f64;
    let f = |w: f64| {
        let cross = (r * r - w * w).max(0.0);
        (1.0 - w.cos()) * cross * cross.sqrt()
    };
    let mut integral = f(0.0) + f(upper);
    for i in 1..n {
        let w = i as f64 * h;
        integral += if i % 2 == 1 { 4.0 * f(w) } else { 2.0 * f(w) };
    }
    integral *= h / 3.0;
    integral * 64.0 / (std::f64::consts::PI * r.powi(6))
}

/// Nearest neighbor of sample `n0` of voxel `v` across voxels within
/// `layers` of `v`: returns (min squared 3D distance, min squared 6D
/// distance) with `GIST_HUGE` sentinels when nothing is found.
fn nearest_neighbors_6d(
    acc: &VoxelAccumulators,
    grid: &GridGeometry,
    v: usize,
    n0: usize,
    layers: isize,
) -> (f64, f64) {
    let xyz = &acc.voxel_xyz[v];
    let c = [xyz[3 * n0], xyz[3 * n0 + 1], xyz[3 * n0 + 2]];
    let q0 = &acc.voxel_q[v][4 * n0..4 * n0 + 4];

    let (ix, iy, iz) = grid.reverse_index(v);
    let dims = grid.dims();
    let mut best_t = GIST_HUGE;
    let mut best_6 = GIST_HUGE;
    for dx in -layers..=layers {
        let jx = ix as isize + dx;
        if jx < 0 || jx >= dims[0] as isize {
            continue;
        }
        for dy in -layers..=layers {
            let jy = iy as isize + dy;
            if jy < 0 || jy >= dims[1] as isize {
                continue;
            }
            for dz in -layers..=layers {
                let jz = iz as isize + dz;
                if jz < 0 || jz >= dims[2] as isize {
                    continue;
                }
                let w = grid.index(jx as usize, jy as usize, jz as usize);
                let w_xyz = &acc.voxel_xyz[w];
                let w_q = &acc.voxel_q[w];
                for m in 0..w_xyz.len() / 3 {
                    if w == v && m == n0 {
                        continue;
                    }
                    let ddx = w_xyz[3 * m] - c[0];
                    let ddy = w_xyz[3 * m + 1] - c[1];
                    let ddz = w_xyz[3 * m + 2] - c[2];
                    let dr2 = ddx * ddx + ddy * ddy + ddz * ddz;
                    if dr2 < best_t {
                        best_t = dr2;
                    }
                    let qm = &w_q[4 * m..4 * m + 4];
                    let dot = q0[0] * qm[0] + q0[1] * qm[1] + q0[2] * qm[2] + q0[3] * qm[3];
                    let dq = 2.0 * dot.abs().clamp(0.0, 1.0).acos();
                    let d6 = dr2 + dq * dq;
                    if d6 < best_6 {
                        best_6 = d6;
                    }
                }
            }
        }
    }
    (best_t, best_6)
}

/// Post-run entropy estimate: k = 1 nearest-neighbor estimator in quaternion
/// space (per voxel), and in 3D / 6D position(+orientation) space across the
/// local voxel neighborhood. Voxels are independent; the loop is parallel.
pub fn estimate(
    acc: &VoxelAccumulators,
    grid: &GridGeometry,
    params: EntropyParams,
) -> EntropyFields {
    let n_voxels = acc.n_voxels();
    let kt = GASK_KCAL * params.temperature;
    let nf = params.n_frames as f64;
    let rho = params.bulk_density;
    let layers = params.nn_search_layers as isize;

    let orient: Vec<(f64, u64)> = (0..n_voxels)
        .into_par_iter()
        .map(|v| {
            let n = acc.samples_in(v);
            if n <= 1 {
                return (0.0, n as u64);
            }
            let q = &acc.voxel_q[v];
            let mut s_orient = 0.0;
            for n0 in 0..n {
                let mut nn_r = ORIENT_SENTINEL;
                for n1 in 0..n {
                    if n0 == n1 {
                        continue;
                    }
                    let r = quat_distance(q, n0, n1);
                    if r > 0.0 && r < nn_r {
                        nn_r = r;
                    }
                }
                if nn_r > 0.0 && nn_r < ORIENT_ACCEPT {
                    s_orient += if params.exact_nn_volume {
                        ((nn_r - nn_r.sin()) * n as f64 / std::f64::consts::PI).ln()
                    } else {
                        (nn_r.powi(3) * n as f64 / (3.0 * std::f64::consts::TAU)).ln()
                    };
                }
            }
            let raw = kt * n as f64 * (s_orient / n as f64 + EULER_MASC);
            (raw, n as u64)
        })
        .collect();

    let trans: Vec<(f64, f64, u64)> = (0..n_voxels)
        .into_par_iter()
        .map(|v| {
            if grid.is_boundary(v) {
                return (0.0, 0.0, 0);
            }
            let n = acc.samples_in(v);
            let mut s_trans = 0.0;
            let mut s_six = 0.0;
            let mut found = 0u64;
            for n0 in 0..n {
                let (d2_t, d2_6) = nearest_neighbors_6d(acc, grid, v, n0, layers);
                if d2_t >= GIST_HUGE {
                    continue;
                }
                found += 1;
                let nn_d = d2_t.sqrt().max(GIST_TINY);
                let nn_s = d2_6.sqrt().max(GIST_TINY);
                s_trans +=
                    (nn_d.powi(3) * nf * 4.0 * std::f64::consts::PI * rho / 3.0).ln();
                let mut six_dens = nn_s.powi(6) * nf * std::f64::consts::PI * rho / 48.0;
                if params.exact_nn_volume {
                    six_dens /= six_volume_corr(nn_s);
                }
                s_six += six_dens.ln();
            }
            if s_trans != 0.0 {
                let raw_t = kt * n as f64 * (s_trans / n as f64 + EULER_MASC);
                let raw_6 = kt * n as f64 * (s_six / n as f64 + EULER_MASC);
                (raw_t, raw_6, found)
            } else {
                (0.0, 0.0, found)
            }
        })
        .collect();

    let mut fields = EntropyFields {
        dtsorient_raw: vec![0.0; n_voxels],
        dtstrans_raw: vec![0.0; n_voxels],
        dtssix_raw: vec![0.0; n_voxels],
        nwtt: 0,
        nwts: 0,
    };
    for (v, (raw, count)) in orient.into_iter().enumerate() {
        fields.dtsorient_raw[v] = raw;
        fields.nwtt += count;
    }
    for (v, (raw_t, raw_6, found)) in trans.into_iter().enumerate() {
        fields.dtstrans_raw[v] = raw_t;
        fields.dtssix_raw[v] = raw_6;
        fields.nwts += found;
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_volume_corr_tends_to_one_for_small_radii() {
        assert!((six_volume_corr(1.0e-8) - 1.0).abs() < 1e-12);
        assert!((six_volume_corr(0.01) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn six_volume_corr_shrinks_for_large_radii() {
        // Past the rotational bound the exact ball volume falls behind the
        // unbounded small-radius form.
        let c = six_volume_corr(4.0);
        assert!(c < 1.0 && c > 0.0);
    }

    #[test]
    fn quat_distance_of_identical_samples_is_zero() {
        let q = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        assert!(quat_distance(&q, 0, 1).abs() < 1e-12);
    }
}
