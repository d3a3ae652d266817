use crate::error::{GistError, GistResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Box3 {
    None,
    Orthorhombic { lx: f64, ly: f64, lz: f64 },
    Triclinic { m: [f64; 9] },
}

#[derive(Debug, Clone)]
pub struct FrameChunk {
    pub n_atoms: usize,
    pub n_frames: usize,
    pub coords: Vec<[f64; 3]>,
    pub box_: Vec<Box3>,
}

impl FrameChunk {
    /// Coordinates of one frame as a contiguous slice.
    pub fn frame(&self, frame: usize) -> &[[f64; 3]] {
        let start = frame * self.n_atoms;
        &self.coords[start..start + self.n_atoms]
    }
}

#[derive(Debug)]
pub struct FrameChunkBuilder {
    n_atoms: usize,
    n_frames: usize,
    coords_buf: Vec<[f64; 3]>,
    box_buf: Vec<Box3>,
}

impl FrameChunkBuilder {
    pub fn new(n_atoms: usize, max_frames: usize) -> Self {
        Self {
            n_atoms,
            n_frames: 0,
            coords_buf: Vec::with_capacity(n_atoms * max_frames),
            box_buf: Vec::with_capacity(max_frames),
        }
    }

    pub fn reset(&mut self, n_atoms: usize, max_frames: usize) {
        self.n_atoms = n_atoms;
        self.n_frames = 0;
        self.coords_buf.clear();
        self.box_buf.clear();
        self.coords_buf.reserve(n_atoms * max_frames);
        self.box_buf.reserve(max_frames);
    }

    pub fn start_frame(&mut self, box_: Box3) -> &mut [[f64; 3]] {
        let frame_index = self.n_frames;
        self.n_frames += 1;
        self.box_buf.push(box_);
        let start = frame_index * self.n_atoms;
        let end = start + self.n_atoms;
        if self.coords_buf.len() < end {
            self.coords_buf.resize(end, [0.0; 3]);
        }
        &mut self.coords_buf[start..end]
    }

    pub fn finish_take(&mut self) -> GistResult<FrameChunk> {
        let n_frames = self.n_frames;
        if self.coords_buf.len() != n_frames * self.n_atoms {
            return Err(GistError::Mismatch(
                "frame chunk buffer size mismatch".into(),
            ));
        }
        if self.box_buf.len() != n_frames {
            return Err(GistError::Mismatch(
                "frame chunk box buffer size mismatch".into(),
            ));
        }
        let coords = std::mem::take(&mut self.coords_buf);
        let box_ = std::mem::take(&mut self.box_buf);
        self.n_frames = 0;
        Ok(FrameChunk {
            n_atoms: self.n_atoms,
            n_frames,
            coords,
            box_,
        })
    }

    pub fn reclaim(&mut self, chunk: FrameChunk) {
        self.n_atoms = chunk.n_atoms;
        self.coords_buf = chunk.coords;
        self.box_buf = chunk.box_;
        self.n_frames = 0;
        self.coords_buf.clear();
        self.box_buf.clear();
    }
}

/// Streaming source of trajectory frames. Implementations live outside the
/// engine; in-memory readers are provided by the test suites.
pub trait ReadTrajectory {
    fn n_atoms(&self) -> usize;

    fn n_frames_hint(&self) -> Option<usize> {
        None
    }

    /// Reads up to `max_frames` frames into `out`, returning how many were
    /// written. Zero signals end of trajectory.
    fn read_chunk(&mut self, max_frames: usize, out: &mut FrameChunkBuilder) -> GistResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_roundtrip_keeps_frames_and_boxes() {
        let mut builder = FrameChunkBuilder::new(2, 4);
        let dst = builder.start_frame(Box3::None);
        dst[0] = [1.0, 2.0, 3.0];
        dst[1] = [4.0, 5.0, 6.0];
        builder.start_frame(Box3::Orthorhombic {
            lx: 10.0,
            ly: 10.0,
            lz: 10.0,
        });
        let chunk = builder.finish_take().unwrap();
        assert_eq!(chunk.n_frames, 2);
        assert_eq!(chunk.frame(0)[1], [4.0, 5.0, 6.0]);
        assert_eq!(chunk.box_[0], Box3::None);
        builder.reclaim(chunk);
        let chunk = builder.finish_take().unwrap();
        assert_eq!(chunk.n_frames, 0);
    }
}
