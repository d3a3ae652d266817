use gist_core::geom::{Quaternion, Vec3};
use gist_core::system::Topology;

use super::grid::GridGeometry;
use super::solvent::SolventModel;

/// Raw per-voxel accumulators, zeroed before the first frame and normalized
/// exactly once after the last.
#[derive(Debug, Default)]
pub struct VoxelAccumulators {
    pub n_waters: Vec<u32>,
    pub n_solute: Vec<u32>,
    pub voxel_xyz: Vec<Vec<f64>>,
    pub voxel_q: Vec<Vec<f64>>,
    pub e_sw_vdw: Vec<f64>,
    pub e_sw_elec: Vec<f64>,
    pub e_ww_vdw: Vec<f64>,
    pub e_ww_elec: Vec<f64>,
    pub neighbor: Vec<f64>,
    pub dipole_x: Vec<f64>,
    pub dipole_y: Vec<f64>,
    pub dipole_z: Vec<f64>,
    pub order_sum: Vec<f64>,
    pub order_count: Vec<u32>,
    /// Indexed [element bucket][voxel].
    pub density_elem: Vec<Vec<f64>>,
    pub max_nwat: u32,
}

impl VoxelAccumulators {
    pub fn new(n_voxels: usize, n_elements: usize) -> Self {
        Self {
            n_waters: vec![0; n_voxels],
            n_solute: vec![0; n_voxels],
            voxel_xyz: vec![Vec::new(); n_voxels],
            voxel_q: vec![Vec::new(); n_voxels],
            e_sw_vdw: vec![0.0; n_voxels],
            e_sw_elec: vec![0.0; n_voxels],
            e_ww_vdw: vec![0.0; n_voxels],
            e_ww_elec: vec![0.0; n_voxels],
            neighbor: vec![0.0; n_voxels],
            dipole_x: vec![0.0; n_voxels],
            dipole_y: vec![0.0; n_voxels],
            dipole_z: vec![0.0; n_voxels],
            order_sum: vec![0.0; n_voxels],
            order_count: vec![0; n_voxels],
            density_elem: vec![vec![0.0; n_voxels]; n_elements],
            max_nwat: 0,
        }
    }

    pub fn n_voxels(&self) -> usize {
        self.n_waters.len()
    }

    /// Number of recorded water samples in a voxel.
    pub fn samples_in(&self, voxel: usize) -> usize {
        self.voxel_xyz[voxel].len() / 3
    }
}

/// Per-frame sample of atoms belonging to on-grid solvent molecules. Cleared
/// at the start of every frame and consumed by the nonbond kernel, which may
/// rewrap `xyz` for non-orthogonal cells.
#[derive(Debug, Default)]
pub struct OnGridSample {
    pub idxs: Vec<usize>,
    pub xyz: Vec<f64>,
    pub atom_voxel: Vec<Option<usize>>,
}

impl OnGridSample {
    pub fn clear(&mut self, n_atoms: usize) {
        self.idxs.clear();
        self.xyz.clear();
        self.atom_voxel.clear();
        self.atom_voxel.resize(n_atoms, None);
    }

    pub fn atom_xyz(&self, sample_idx: usize) -> [f64; 3] {
        [
            self.xyz[3 * sample_idx],
            self.xyz[3 * sample_idx + 1],
            self.xyz[3 * sample_idx + 2],
        ]
    }
}

fn center_of_mass(topology: &Topology, coords: &[[f64; 3]], first: usize, n: usize) -> [f64; 3] {
    let mut sum = [0.0f64; 3];
    let mut mass = 0.0;
    for atom in first..first + n {
        let m = topology.mass(atom);
        mass += m;
        for axis in 0..3 {
            sum[axis] += m * coords[atom][axis];
        }
    }
    if mass > 0.0 {
        [sum[0] / mass, sum[1] / mass, sum[2] / mass]
    } else {
        coords[first]
    }
}

/// Voxel assignment pass of one frame: decides on-grid membership per solvent
/// molecule, records the on-grid sample, pushes center/orientation samples,
/// and accumulates dipole, per-element density, and solute occupancy.
#[allow(clippy::too_many_arguments)]
pub fn assign_frame(
    topology: &Topology,
    coords: &[[f64; 3]],
    grid: &GridGeometry,
    solvent: &SolventModel,
    mol_fronts: &[usize],
    rigid: [usize; 3],
    use_com: bool,
    u_idxs: &[usize],
    sample: &mut OnGridSample,
    acc: &mut VoxelAccumulators,
) {
    let n_mol = solvent.n_mol_atoms();
    for &front in mol_fronts {
        let center = if use_com {
            center_of_mass(topology, coords, front, n_mol)
        } else {
            coords[front + rigid[0]]
        };
        if !grid.in_extended_window(center) {
            continue;
        }
        if let Some(voxel) = grid.locate(center) {
            for atom in front..front + n_mol {
                sample.atom_voxel[atom] = Some(voxel);
                sample.idxs.push(atom);
                sample.xyz.extend_from_slice(&coords[atom]);
            }
            acc.n_waters[voxel] += 1;
            acc.max_nwat = acc.max_nwat.max(acc.n_waters[voxel]);
            acc.voxel_xyz[voxel].extend_from_slice(&center);

            let o = Vec3::from_array(coords[front + rigid[0]]);
            let h1 = Vec3::from_array(coords[front + rigid[1]]);
            let h2 = Vec3::from_array(coords[front + rigid[2]]);
            let q = Quaternion::from_rigid_orientation(o, h1, h2);
            acc.voxel_q[voxel].extend_from_slice(&[q.w, q.x, q.y, q.z]);

            let mut dp = [0.0f64; 3];
            for offset in 0..n_mol {
                let xyz = coords[front + offset];
                let q_atom = solvent.charge(offset);
                dp[0] += xyz[0] * q_atom;
                dp[1] += xyz[1] * q_atom;
                dp[2] += xyz[2] * q_atom;
            }
            acc.dipole_x[voxel] += dp[0];
            acc.dipole_y[voxel] += dp[1];
            acc.dipole_z[voxel] += dp[2];
        }
        // The molecule is within the margin, so individual atoms may still be
        // on the grid even when the center is not.
        for offset in 0..n_mol {
            if let Some(voxel) = grid.locate(coords[front + offset]) {
                acc.density_elem[solvent.element_bucket(offset)][voxel] += 1.0;
            }
        }
    }

    for &atom in u_idxs {
        if let Some(voxel) = grid.locate(coords[atom]) {
            acc.n_solute[voxel] += 1;
        }
    }
}
