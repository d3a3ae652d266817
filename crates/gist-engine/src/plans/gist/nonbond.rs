use fxhash::FxHashMap;
use rayon::prelude::*;

use gist_core::constants::QFAC;
use gist_core::pbc::{wrap_to_primary, Imaging};
use gist_core::system::Topology;

use super::accumulate::{OnGridSample, VoxelAccumulators};

pub fn pair_key(a: usize, b: usize) -> u64 {
    let lo = a.min(b) as u64;
    let hi = a.max(b) as u64;
    (lo << 32) | hi
}

/// Thread-private per-voxel accumulators. Reduced by pointwise addition at
/// end of frame; no locks are held in the inner loop.
struct WorkerAcc {
    sw_vdw: Vec<f64>,
    sw_elec: Vec<f64>,
    ww_vdw: Vec<f64>,
    ww_elec: Vec<f64>,
    neighbor: Vec<f64>,
    eij: Vec<(u32, u32, f64)>,
}

impl WorkerAcc {
    fn new(n_voxels: usize) -> Self {
        Self {
            sw_vdw: vec![0.0; n_voxels],
            sw_elec: vec![0.0; n_voxels],
            ww_vdw: vec![0.0; n_voxels],
            ww_elec: vec![0.0; n_voxels],
            neighbor: vec![0.0; n_voxels],
            eij: Vec::new(),
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (dst, src) in self.sw_vdw.iter_mut().zip(other.sw_vdw) {
            *dst += src;
        }
        for (dst, src) in self.sw_elec.iter_mut().zip(other.sw_elec) {
            *dst += src;
        }
        for (dst, src) in self.ww_vdw.iter_mut().zip(other.ww_vdw) {
            *dst += src;
        }
        for (dst, src) in self.ww_elec.iter_mut().zip(other.ww_elec) {
            *dst += src;
        }
        for (dst, src) in self.neighbor.iter_mut().zip(other.neighbor) {
            *dst += src;
        }
        self.eij.extend(other.eij);
        self
    }
}

fn pair_energy(topology: &Topology, a1: usize, a2: usize, r2: f64) -> (f64, f64) {
    let lj = topology.lj_param(a1, a2);
    let r2inv = 1.0 / r2;
    let r6 = r2inv * r2inv * r2inv;
    let r12 = r6 * r6;
    let e_vdw = lj.a * r12 - lj.b * r6;
    let e_elec = QFAC * topology.charge(a1) * topology.charge(a2) / r2.sqrt();
    (e_vdw, e_elec)
}

/// Pairwise nonbonded pass of one frame: every atom against every on-grid
/// solvent atom of a different molecule, contributions routed to the on-grid
/// atom's voxel (and, for solvent-solvent, symmetrically to the partner's).
///
/// For non-orthogonal cells the on-grid coordinates are wrapped into the
/// primary cell in place, once, before the pair loop; callers running the
/// order kernel must do so before this pass.
#[allow(clippy::too_many_arguments)]
pub fn nonbond_frame(
    topology: &Topology,
    coords: &[[f64; 3]],
    imaging: Imaging,
    sample: &mut OnGridSample,
    atom_is_solute: &[bool],
    atom_is_head: &[bool],
    cutoff2: f64,
    do_eij: bool,
    acc: &mut VoxelAccumulators,
    eij: Option<&mut FxHashMap<u64, f64>>,
) {
    if let Imaging::NonOrtho { cell, inv } = imaging {
        for triple in sample.xyz.chunks_exact_mut(3) {
            let w = wrap_to_primary([triple[0], triple[1], triple[2]], &cell, &inv);
            triple.copy_from_slice(&w);
        }
    }

    let n_atoms = coords.len();
    let n_voxels = acc.n_voxels();
    let sample_idxs = &sample.idxs;
    let sample_xyz = &sample.xyz;
    let atom_voxel = &sample.atom_voxel;

    let worker = (0..n_atoms)
        .into_par_iter()
        .fold(
            || WorkerAcc::new(n_voxels),
            |mut w, a1| {
                let a1_voxel = atom_voxel[a1];
                let a1_mol = topology.mol_of(a1);
                let p1 = coords[a1];
                let a1_solute = atom_is_solute[a1];
                let a1_head = atom_is_head[a1];
                for (g, &a2) in sample_idxs.iter().enumerate() {
                    if topology.mol_of(a2) == a1_mol {
                        continue;
                    }
                    let Some(v2) = atom_voxel[a2] else {
                        continue;
                    };
                    let p2 = [sample_xyz[3 * g], sample_xyz[3 * g + 1], sample_xyz[3 * g + 2]];
                    if a1_solute {
                        let r2 = imaging.dist2(p1, p2);
                        let (e_vdw, e_elec) = pair_energy(topology, a1, a2, r2);
                        w.sw_vdw[v2] += e_vdw;
                        w.sw_elec[v2] += e_elec;
                    } else {
                        // Each unordered solvent pair is accounted once: the
                        // lower-index on-grid partner skips it, off-grid atoms
                        // never appear as a2.
                        if a2 <= a1 && a1_voxel.is_some() {
                            continue;
                        }
                        let r2 = imaging.dist2(p1, p2);
                        let (e_vdw, e_elec) = pair_energy(topology, a1, a2, r2);
                        w.ww_vdw[v2] += e_vdw;
                        w.ww_elec[v2] += e_elec;
                        let is_head_pair = a1_head && atom_is_head[a2];
                        if is_head_pair && r2 < cutoff2 {
                            w.neighbor[v2] += 1.0;
                        }
                        if let Some(v1) = a1_voxel {
                            w.ww_vdw[v1] += e_vdw;
                            w.ww_elec[v1] += e_elec;
                            if is_head_pair && r2 < cutoff2 {
                                w.neighbor[v1] += 1.0;
                            }
                            if do_eij && v1 != v2 {
                                let lo = v1.min(v2) as u32;
                                let hi = v1.max(v2) as u32;
                                w.eij.push((lo, hi, e_vdw + e_elec));
                            }
                        }
                    }
                }
                w
            },
        )
        .reduce(|| WorkerAcc::new(n_voxels), WorkerAcc::merge);

    for v in 0..n_voxels {
        acc.e_sw_vdw[v] += worker.sw_vdw[v];
        acc.e_sw_elec[v] += worker.sw_elec[v];
        acc.e_ww_vdw[v] += worker.ww_vdw[v];
        acc.e_ww_elec[v] += worker.ww_elec[v];
        acc.neighbor[v] += worker.neighbor[v];
    }
    if let Some(matrix) = eij {
        for (lo, hi, e) in worker.eij {
            *matrix
                .entry(pair_key(lo as usize, hi as usize))
                .or_insert(0.0) += e;
        }
    }
}
