use std::io::Write;

use gist_core::error::GistResult;

use super::grid::GridGeometry;

pub const REPORT_VERSION: &str = "v4";

/// Run-level statistics reported alongside the grids.
#[derive(Clone, Debug, Default)]
pub struct GistSummary {
    pub n_frames: usize,
    /// Total on-grid water samples.
    pub nwtt: u64,
    /// Water samples with a valid translational nearest neighbor.
    pub nwts: u64,
    /// Largest water count observed in a single voxel.
    pub max_nwat: u32,
    pub esw_total: f64,
    pub eww_total: f64,
    pub dtstrans_total: f64,
    pub dtsorient_total: f64,
    pub dtssix_total: f64,
}

/// Finalized per-voxel fields, one value per voxel per field. External
/// writers (OpenDX, data files) consume these buffers.
#[derive(Clone, Debug)]
pub struct GistOutput {
    pub grid: GridGeometry,
    pub elements: Vec<String>,
    pub n_waters: Vec<u32>,
    pub n_solute: Vec<u32>,
    /// Indexed [element bucket][voxel].
    pub g_element: Vec<Vec<f64>>,
    pub dtstrans_dens: Vec<f64>,
    pub dtstrans_norm: Vec<f64>,
    pub dtsorient_dens: Vec<f64>,
    pub dtsorient_norm: Vec<f64>,
    pub dtssix_dens: Vec<f64>,
    pub dtssix_norm: Vec<f64>,
    pub esw_dens: Vec<f64>,
    pub esw_norm: Vec<f64>,
    pub eww_dens: Vec<f64>,
    pub eww_norm: Vec<f64>,
    pub dipole_x_dens: Vec<f64>,
    pub dipole_y_dens: Vec<f64>,
    pub dipole_z_dens: Vec<f64>,
    pub dipole_dens: Vec<f64>,
    pub neighbor_dens: Vec<f64>,
    pub neighbor_norm: Vec<f64>,
    pub order_norm: Vec<f64>,
    /// Sorted (voxel_i, voxel_j, energy) triples with voxel_i < voxel_j,
    /// present when the water-water matrix was requested.
    pub eij: Option<Vec<(u32, u32, f64)>>,
    pub summary: GistSummary,
}

impl GistOutput {
    /// Writes the per-voxel text report: a header identifying spacing,
    /// center, dimensions and the schema version, a column line, then one
    /// tab-separated row per voxel.
    pub fn write_report<W: Write>(&self, out: &mut W) -> GistResult<()> {
        let center = self.grid.center();
        let dims = self.grid.dims();
        writeln!(
            out,
            "GIST Output {} spacing={:.4} center={:.6},{:.6},{:.6} dims={},{},{}",
            REPORT_VERSION,
            self.grid.spacing(),
            center[0],
            center[1],
            center[2],
            dims[0],
            dims[1],
            dims[2],
        )?;
        write!(out, "voxel\txcoord\tycoord\tzcoord\tpopulation")?;
        for elem in &self.elements {
            write!(out, "\tg_{elem}")?;
        }
        writeln!(
            out,
            "\tdTStrans-dens(kcal/mol/A^3)\tdTStrans-norm(kcal/mol)\
             \tdTSorient-dens(kcal/mol/A^3)\tdTSorient-norm(kcal/mol)\
             \tdTSsix-dens(kcal/mol/A^3)\tdTSsix-norm(kcal/mol)\
             \tEsw-dens(kcal/mol/A^3)\tEsw-norm(kcal/mol)\
             \tEww-dens(kcal/mol/A^3)\tEww-norm-unref(kcal/mol)\
             \tDipole_x-dens(D/A^3)\tDipole_y-dens(D/A^3)\tDipole_z-dens(D/A^3)\
             \tDipole-dens(D/A^3)\tneighbor-dens(1/A^3)\tneighbor-norm\torder-norm"
        )?;
        for v in 0..self.grid.n_voxels() {
            let (i, j, k) = self.grid.reverse_index(v);
            let xyz = self.grid.voxel_center(i, j, k);
            write!(
                out,
                "{v}\t{:.6}\t{:.6}\t{:.6}\t{}",
                xyz[0], xyz[1], xyz[2], self.n_waters[v]
            )?;
            for g in &self.g_element {
                write!(out, "\t{:.6}", g[v])?;
            }
            writeln!(
                out,
                "\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\
                 \t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}",
                self.dtstrans_dens[v],
                self.dtstrans_norm[v],
                self.dtsorient_dens[v],
                self.dtsorient_norm[v],
                self.dtssix_dens[v],
                self.dtssix_norm[v],
                self.esw_dens[v],
                self.esw_norm[v],
                self.eww_dens[v],
                self.eww_norm[v],
                self.dipole_x_dens[v],
                self.dipole_y_dens[v],
                self.dipole_z_dens[v],
                self.dipole_dens[v],
                self.neighbor_dens[v],
                self.neighbor_norm[v],
                self.order_norm[v],
            )?;
        }
        Ok(())
    }
}
