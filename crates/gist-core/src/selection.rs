/// A set of atom indices, kept sorted and unique.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    pub indices: Vec<u32>,
}

impl Selection {
    pub fn new(mut indices: Vec<u32>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, atom: u32) -> bool {
        self.indices.binary_search(&atom).is_ok()
    }
}
