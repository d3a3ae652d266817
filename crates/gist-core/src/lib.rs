#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod frame;
pub mod geom;
pub mod pbc;
pub mod selection;
pub mod system;

pub use error::{GistError, GistResult};
pub use frame::{Box3, FrameChunk, FrameChunkBuilder, ReadTrajectory};
pub use geom::{Quaternion, Vec3};
pub use pbc::Imaging;
pub use selection::Selection;
pub use system::{AtomSpec, LjParam, LjTable, MolRange, Topology, TopologyBuilder};
