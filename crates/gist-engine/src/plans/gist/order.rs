use gist_core::geom::Vec3;

use super::accumulate::{OnGridSample, VoxelAccumulators};

/// Tetrahedral order parameter pass of one frame. For every on-grid water,
/// finds the four nearest other solvent head atoms anywhere in the frame
/// (no imaging) and accumulates 1 - 3/8 * sum over the six vertex-pair
/// angles. Runs on the unwrapped geometry, so it must precede the nonbond
/// pass for non-orthogonal cells.
pub fn order_frame(
    coords: &[[f64; 3]],
    sample: &OnGridSample,
    head_idxs: &[usize],
    n_mol_atoms: usize,
    rigid0: usize,
    acc: &mut VoxelAccumulators,
) {
    let mut g = 0;
    while g < sample.idxs.len() {
        let front = sample.idxs[g];
        let head = front + rigid0;
        let center = Vec3::from_array(sample.atom_xyz(g + rigid0));
        let Some(voxel) = sample.atom_voxel[front] else {
            g += n_mol_atoms;
            continue;
        };

        // Running insertion into a length-4 sorted array of nearest heads.
        let mut d = [f64::MAX; 4];
        let mut nearest = [Vec3::default(); 4];
        for &other in head_idxs {
            if other == head {
                continue;
            }
            let p = Vec3::from_array(coords[other]);
            let dist2 = p.sub(center).norm2();
            if dist2 < d[0] {
                d[3] = d[2];
                d[2] = d[1];
                d[1] = d[0];
                d[0] = dist2;
                nearest[3] = nearest[2];
                nearest[2] = nearest[1];
                nearest[1] = nearest[0];
                nearest[0] = p;
            } else if dist2 < d[1] {
                d[3] = d[2];
                d[2] = d[1];
                d[1] = dist2;
                nearest[3] = nearest[2];
                nearest[2] = nearest[1];
                nearest[1] = p;
            } else if dist2 < d[2] {
                d[3] = d[2];
                d[2] = dist2;
                nearest[3] = nearest[2];
                nearest[2] = p;
            } else if dist2 < d[3] {
                d[3] = dist2;
                nearest[3] = p;
            }
        }

        let mut sum = 0.0;
        for i in 0..3 {
            for j in (i + 1)..4 {
                let v1 = nearest[i].sub(center);
                let v2 = nearest[j].sub(center);
                let cos = v1.dot(v2) / (v1.norm2() * v2.norm2()).sqrt();
                sum += (cos + 1.0 / 3.0) * (cos + 1.0 / 3.0);
            }
        }
        acc.order_sum[voxel] += 1.0 - (3.0 / 8.0) * sum;
        acc.order_count[voxel] += 1;

        g += n_mol_atoms;
    }
}
