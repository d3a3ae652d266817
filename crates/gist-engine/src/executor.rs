use gist_core::error::{GistError, GistResult};
use gist_core::frame::{FrameChunk, FrameChunkBuilder, ReadTrajectory};
use gist_core::system::Topology;

/// A streaming analysis with explicit lifecycle: init against the topology,
/// accumulate over frame chunks, finalize into a typed output.
pub trait Plan {
    type Output;

    fn name(&self) -> &'static str;
    fn init(&mut self, topology: &Topology) -> GistResult<()>;
    fn process_chunk(&mut self, chunk: &FrameChunk, topology: &Topology) -> GistResult<()>;
    fn finalize(&mut self, topology: &Topology) -> GistResult<Self::Output>;
}

pub struct Executor {
    topology: Topology,
    chunk_frames: usize,
}

impl Executor {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            chunk_frames: 128,
        }
    }

    pub fn with_chunk_frames(mut self, chunk_frames: usize) -> Self {
        self.chunk_frames = chunk_frames.max(1);
        self
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn run_plan<P: Plan>(
        &mut self,
        plan: &mut P,
        traj: &mut dyn ReadTrajectory,
    ) -> GistResult<P::Output> {
        if traj.n_atoms() != self.topology.n_atoms() {
            return Err(GistError::Mismatch(
                "trajectory atom count does not match topology".into(),
            ));
        }
        plan.init(&self.topology)?;
        let mut builder = FrameChunkBuilder::new(self.topology.n_atoms(), self.chunk_frames);
        loop {
            let frames = traj.read_chunk(self.chunk_frames, &mut builder)?;
            if frames == 0 {
                break;
            }
            let chunk = builder.finish_take()?;
            plan.process_chunk(&chunk, &self.topology)?;
            builder.reclaim(chunk);
        }
        plan.finalize(&self.topology)
    }
}
