use gist_core::error::GistResult;
use gist_core::frame::{Box3, FrameChunkBuilder, ReadTrajectory};
use gist_core::system::{AtomSpec, Topology, TopologyBuilder};

use crate::executor::Executor;
use crate::plans::gist::{GistConfig, GistOutput, GistPlan};

mod part1;
mod part3;

pub(crate) const H1_OFF: [f64; 3] = [0.7570, 0.5859, 0.0];
pub(crate) const H2_OFF: [f64; 3] = [-0.7570, 0.5859, 0.0];
pub(crate) const Q_O: f64 = -0.834;
pub(crate) const Q_H: f64 = 0.417;

struct InMemoryTraj {
    n_atoms: usize,
    frames: Vec<Vec<[f64; 3]>>,
    box_: Box3,
    cursor: usize,
}

impl InMemoryTraj {
    fn new(frames: Vec<Vec<[f64; 3]>>, box_: Box3) -> Self {
        let n_atoms = frames.first().map(|f| f.len()).unwrap_or(0);
        Self {
            n_atoms,
            frames,
            box_,
            cursor: 0,
        }
    }
}

impl ReadTrajectory for InMemoryTraj {
    fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    fn n_frames_hint(&self) -> Option<usize> {
        Some(self.frames.len())
    }

    fn read_chunk(&mut self, max_frames: usize, out: &mut FrameChunkBuilder) -> GistResult<usize> {
        out.reset(self.n_atoms, max_frames.max(1));
        let mut written = 0;
        while written < max_frames && self.cursor < self.frames.len() {
            let dst = out.start_frame(self.box_);
            dst.copy_from_slice(&self.frames[self.cursor]);
            self.cursor += 1;
            written += 1;
        }
        Ok(written)
    }
}

fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Coordinates of one rigid water with the oxygen at `o`.
fn water_coords(o: [f64; 3]) -> Vec<[f64; 3]> {
    vec![o, add(o, H1_OFF), add(o, H2_OFF)]
}

fn water_atoms() -> Vec<AtomSpec> {
    vec![
        AtomSpec::new("O", Q_O, 15.999, 0),
        AtomSpec::new("H", Q_H, 1.008, 0),
        AtomSpec::new("H", Q_H, 1.008, 0),
    ]
}

/// Topology of `n` waters, chargeless Lennard-Jones.
fn water_topology(n: usize) -> Topology {
    let mut builder = TopologyBuilder::new();
    for _ in 0..n {
        builder = builder.add_molecule(true, water_atoms());
    }
    builder.finish().unwrap()
}

/// One single-atom solute (charge +1) followed by `n_waters` waters.
fn solute_and_waters(n_waters: usize) -> Topology {
    let mut builder = TopologyBuilder::new()
        .add_molecule(false, vec![AtomSpec::new("Na", 1.0, 22.99, 0)]);
    for _ in 0..n_waters {
        builder = builder.add_molecule(true, water_atoms());
    }
    builder.finish().unwrap()
}

fn run_gist(
    cfg: GistConfig,
    topology: &Topology,
    frames: Vec<Vec<[f64; 3]>>,
    box_: Box3,
) -> GistOutput {
    let mut plan = GistPlan::new(cfg).unwrap();
    let mut traj = InMemoryTraj::new(frames, box_);
    let mut exec = Executor::new(topology.clone());
    exec.run_plan(&mut plan, &mut traj).unwrap()
}

/// A 2x2x2 grid with unit spacing whose origin sits at the coordinate origin.
fn unit_grid_config() -> GistConfig {
    GistConfig::default()
        .with_grid([1.0, 1.0, 1.0], [2, 2, 2], 1.0)
        .with_use_com(false)
        .with_imaging(false)
}
