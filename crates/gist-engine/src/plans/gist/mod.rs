mod accumulate;
mod config;
mod entropy;
mod grid;
mod nonbond;
mod order;
mod output;
mod scaling;
mod solvent;

pub use config::{GistConfig, WATER_BULK_DENSITY};
pub use grid::GridGeometry;
pub use output::{GistOutput, GistSummary, REPORT_VERSION};
pub use solvent::SolventModel;

use fxhash::FxHashMap;

use gist_core::error::{GistError, GistResult};
use gist_core::frame::{Box3, FrameChunk};
use gist_core::pbc::Imaging;
use gist_core::system::Topology;

use crate::executor::Plan;

use accumulate::{OnGridSample, VoxelAccumulators};
use entropy::EntropyParams;

/// Grid inhomogeneous solvation theory analysis. Lifecycle: construct from a
/// validated config, `init` against the topology, accumulate per frame chunk,
/// `finalize` into the per-voxel output fields.
pub struct GistPlan {
    cfg: GistConfig,
    grid: GridGeometry,
    solvent: Option<SolventModel>,
    mol_fronts: Vec<usize>,
    head_idxs: Vec<usize>,
    atom_is_solute: Vec<bool>,
    atom_is_head: Vec<bool>,
    u_idxs: Vec<usize>,
    do_order: bool,
    acc: VoxelAccumulators,
    eij: Option<FxHashMap<u64, f64>>,
    sample: OnGridSample,
    n_frames: usize,
}

impl GistPlan {
    pub fn new(cfg: GistConfig) -> GistResult<Self> {
        cfg.validate()?;
        let grid = GridGeometry::new(cfg.grid_center, cfg.grid_dims, cfg.grid_spacing)?;
        Ok(Self {
            cfg,
            grid,
            solvent: None,
            mol_fronts: Vec::new(),
            head_idxs: Vec::new(),
            atom_is_solute: Vec::new(),
            atom_is_head: Vec::new(),
            u_idxs: Vec::new(),
            do_order: false,
            acc: VoxelAccumulators::default(),
            eij: None,
            sample: OnGridSample::default(),
            n_frames: 0,
        })
    }

    pub fn config(&self) -> &GistConfig {
        &self.cfg
    }

    pub fn grid(&self) -> &GridGeometry {
        &self.grid
    }

    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    fn classify_solute(&self, topology: &Topology) -> GistResult<Vec<bool>> {
        let n_atoms = topology.n_atoms();
        let mut atom_is_solute = vec![false; n_atoms];
        match &self.cfg.solute {
            Some(selection) => {
                for &idx in &selection.indices {
                    let atom = idx as usize;
                    if atom >= n_atoms {
                        return Err(GistError::Mismatch(format!(
                            "solute selection index {atom} out of bounds for {n_atoms} atoms"
                        )));
                    }
                    atom_is_solute[atom] = true;
                }
            }
            None => {
                for mol in topology.mols() {
                    if !mol.is_solvent {
                        for atom in mol.atoms() {
                            atom_is_solute[atom] = true;
                        }
                    }
                }
            }
        }
        Ok(atom_is_solute)
    }
}

impl Plan for GistPlan {
    type Output = GistOutput;

    fn name(&self) -> &'static str {
        "gist"
    }

    fn init(&mut self, topology: &Topology) -> GistResult<()> {
        let n_atoms = topology.n_atoms();
        let rigid = self.cfg.rigid_atom_indices;
        self.atom_is_solute = self.classify_solute(topology)?;

        self.mol_fronts.clear();
        let mut solvent: Option<SolventModel> = None;
        for mol in topology.mols() {
            if self.atom_is_solute[mol.first] {
                continue;
            }
            match &solvent {
                None => {
                    if rigid.iter().any(|&r| r >= mol.n_atoms) {
                        return Err(GistError::Config(format!(
                            "rigid atom indices {rigid:?} exceed the {}-atom solvent molecule",
                            mol.n_atoms
                        )));
                    }
                    solvent = Some(SolventModel::from_first(topology, *mol));
                }
                Some(model) => model.check(topology, *mol)?,
            }
            self.mol_fronts.push(mol.first);
        }
        let solvent = solvent.ok_or_else(|| {
            GistError::Topology("topology contains no solvent molecules".into())
        })?;

        self.head_idxs = self.mol_fronts.iter().map(|&f| f + rigid[0]).collect();
        self.atom_is_head = vec![false; n_atoms];
        for &head in &self.head_idxs {
            self.atom_is_head[head] = true;
        }
        self.u_idxs = (0..n_atoms).filter(|&a| self.atom_is_solute[a]).collect();

        self.do_order = self.cfg.do_order;
        if self.do_order && self.mol_fronts.len() < 5 {
            log::warn!("fewer than 5 solvent molecules; order calculation disabled");
            self.do_order = false;
        }

        self.acc = VoxelAccumulators::new(self.grid.n_voxels(), solvent.n_elements());
        self.eij = self.cfg.do_eij.then(FxHashMap::default);
        self.solvent = Some(solvent);
        self.sample = OnGridSample::default();
        self.n_frames = 0;
        Ok(())
    }

    fn process_chunk(&mut self, chunk: &FrameChunk, topology: &Topology) -> GistResult<()> {
        let solvent = self.solvent.as_ref().ok_or_else(|| {
            GistError::Mismatch("gist plan was not initialized".into())
        })?;
        let rigid = self.cfg.rigid_atom_indices;
        let cutoff2 = self.cfg.neighbor_cutoff2();
        for frame in 0..chunk.n_frames {
            let coords = chunk.frame(frame);
            let box_ = chunk.box_[frame];
            let imaging = if self.cfg.imaging {
                if box_ == Box3::None {
                    return Err(GistError::Topology(
                        "imaging requires a periodic box on every frame".into(),
                    ));
                }
                Imaging::from_box(box_)?
            } else {
                Imaging::None
            };

            self.sample.clear(chunk.n_atoms);
            accumulate::assign_frame(
                topology,
                coords,
                &self.grid,
                solvent,
                &self.mol_fronts,
                rigid,
                self.cfg.use_com,
                &self.u_idxs,
                &mut self.sample,
                &mut self.acc,
            );

            // The order kernel needs the unwrapped geometry; the nonbond pass
            // below may rewrap the on-grid sample for non-orthogonal cells.
            if self.do_order {
                order::order_frame(
                    coords,
                    &self.sample,
                    &self.head_idxs,
                    solvent.n_mol_atoms(),
                    rigid[0],
                    &mut self.acc,
                );
            }

            if !self.cfg.skip_energy {
                nonbond::nonbond_frame(
                    topology,
                    coords,
                    imaging,
                    &mut self.sample,
                    &self.atom_is_solute,
                    &self.atom_is_head,
                    cutoff2,
                    self.cfg.do_eij,
                    &mut self.acc,
                    self.eij.as_mut(),
                );
            }

            self.n_frames += 1;
        }
        Ok(())
    }

    fn finalize(&mut self, _topology: &Topology) -> GistResult<Self::Output> {
        let solvent = self.solvent.as_ref().ok_or_else(|| {
            GistError::Mismatch("gist plan was not initialized".into())
        })?;
        let entropy = (!self.cfg.skip_entropy).then(|| {
            entropy::estimate(
                &self.acc,
                &self.grid,
                EntropyParams {
                    temperature: self.cfg.temperature,
                    bulk_density: self.cfg.bulk_density,
                    n_frames: self.n_frames,
                    exact_nn_volume: self.cfg.exact_nn_volume,
                    nn_search_layers: self.cfg.nn_search_layers,
                },
            )
        });
        Ok(scaling::normalize(
            &self.grid,
            solvent,
            &self.acc,
            entropy.as_ref(),
            self.eij.as_ref(),
            self.n_frames,
            self.cfg.bulk_density,
        ))
    }
}
