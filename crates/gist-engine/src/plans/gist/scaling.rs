use fxhash::FxHashMap;

use gist_core::constants::{DEBYE_EA, SMALL};

use super::accumulate::VoxelAccumulators;
use super::entropy::EntropyFields;
use super::grid::GridGeometry;
use super::output::{GistOutput, GistSummary};
use super::solvent::SolventModel;

/// Turns the raw accumulators into density and per-water fields. Applied
/// exactly once, after the last frame.
pub fn normalize(
    grid: &GridGeometry,
    solvent: &SolventModel,
    acc: &VoxelAccumulators,
    entropy: Option<&EntropyFields>,
    eij: Option<&FxHashMap<u64, f64>>,
    n_frames: usize,
    bulk_density: f64,
) -> GistOutput {
    let n_voxels = grid.n_voxels();
    let vvox = grid.voxel_volume();
    let nf = n_frames.max(1) as f64;
    let dens_fac = 1.0 / (nf * vvox);

    let per_water = |raw: f64, n: u32| if n > 0 { raw / n as f64 } else { 0.0 };

    let mut out = GistOutput {
        grid: grid.clone(),
        elements: solvent.unique_elements().to_vec(),
        n_waters: acc.n_waters.clone(),
        n_solute: acc.n_solute.clone(),
        g_element: Vec::new(),
        dtstrans_dens: vec![0.0; n_voxels],
        dtstrans_norm: vec![0.0; n_voxels],
        dtsorient_dens: vec![0.0; n_voxels],
        dtsorient_norm: vec![0.0; n_voxels],
        dtssix_dens: vec![0.0; n_voxels],
        dtssix_norm: vec![0.0; n_voxels],
        esw_dens: vec![0.0; n_voxels],
        esw_norm: vec![0.0; n_voxels],
        eww_dens: vec![0.0; n_voxels],
        eww_norm: vec![0.0; n_voxels],
        dipole_x_dens: vec![0.0; n_voxels],
        dipole_y_dens: vec![0.0; n_voxels],
        dipole_z_dens: vec![0.0; n_voxels],
        dipole_dens: vec![0.0; n_voxels],
        neighbor_dens: vec![0.0; n_voxels],
        neighbor_norm: vec![0.0; n_voxels],
        order_norm: vec![0.0; n_voxels],
        eij: None,
        summary: GistSummary {
            n_frames,
            max_nwat: acc.max_nwat,
            ..GistSummary::default()
        },
    };

    for bucket in 0..solvent.n_elements() {
        let fac = 1.0 / (nf * vvox * bulk_density * solvent.element_count(bucket) as f64);
        out.g_element
            .push(acc.density_elem[bucket].iter().map(|c| c * fac).collect());
    }

    for v in 0..n_voxels {
        let n = acc.n_waters[v];
        let esw_raw = acc.e_sw_vdw[v] + acc.e_sw_elec[v];
        let eww_raw = acc.e_ww_vdw[v] + acc.e_ww_elec[v];
        out.esw_dens[v] = esw_raw * dens_fac;
        out.esw_norm[v] = per_water(esw_raw, n);
        out.eww_dens[v] = eww_raw * dens_fac * 0.5;
        out.eww_norm[v] = 0.5 * per_water(eww_raw, n);

        out.neighbor_dens[v] = acc.neighbor[v] * dens_fac;
        out.neighbor_norm[v] = per_water(acc.neighbor[v], n);

        if acc.order_count[v] > 0 {
            out.order_norm[v] = acc.order_sum[v] / acc.order_count[v] as f64;
        }

        let dip_fac = dens_fac / DEBYE_EA;
        let dx = acc.dipole_x[v] * dip_fac;
        let dy = acc.dipole_y[v] * dip_fac;
        let dz = acc.dipole_z[v] * dip_fac;
        out.dipole_x_dens[v] = dx;
        out.dipole_y_dens[v] = dy;
        out.dipole_z_dens[v] = dz;
        out.dipole_dens[v] = (dx * dx + dy * dy + dz * dz).sqrt();

        if let Some(ent) = entropy {
            out.dtsorient_dens[v] = ent.dtsorient_raw[v] * dens_fac;
            out.dtsorient_norm[v] = per_water(ent.dtsorient_raw[v], n);
            out.dtstrans_dens[v] = ent.dtstrans_raw[v] * dens_fac;
            out.dtstrans_norm[v] = per_water(ent.dtstrans_raw[v], n);
            out.dtssix_dens[v] = ent.dtssix_raw[v] * dens_fac;
            out.dtssix_norm[v] = per_water(ent.dtssix_raw[v], n);
        }
    }

    if let Some(ent) = entropy {
        out.summary.nwtt = ent.nwtt;
        out.summary.nwts = ent.nwts;
        out.summary.dtsorient_total = out.dtsorient_dens.iter().sum::<f64>() * vvox;
        out.summary.dtstrans_total = out.dtstrans_dens.iter().sum::<f64>() * vvox;
        out.summary.dtssix_total = out.dtssix_dens.iter().sum::<f64>() * vvox;
    }
    out.summary.esw_total = out.esw_dens.iter().sum::<f64>() * vvox;
    out.summary.eww_total = out.eww_dens.iter().sum::<f64>() * vvox;

    if let Some(matrix) = eij {
        out.eij = Some(finalize_eij(matrix, n_frames));
    }

    out
}

/// Scales the accumulated pair energies by 1/(2 N_frames), drops entries that
/// collapsed to numerical zero, and sorts by voxel pair.
pub fn finalize_eij(matrix: &FxHashMap<u64, f64>, n_frames: usize) -> Vec<(u32, u32, f64)> {
    let fac = 1.0 / (2.0 * n_frames.max(1) as f64);
    let mut triples: Vec<(u32, u32, f64)> = matrix
        .iter()
        .filter(|(_, &raw)| raw.abs() >= SMALL)
        .map(|(&key, &raw)| ((key >> 32) as u32, (key & 0xFFFF_FFFF) as u32, raw * fac))
        .collect();
    triples.sort_unstable_by_key(|&(i, j, _)| (i, j));
    triples
}
