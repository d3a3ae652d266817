use gist_core::error::{GistError, GistResult};
use gist_core::selection::Selection;

/// Reference number density of liquid water in molecules per cubic Angstrom.
pub const WATER_BULK_DENSITY: f64 = 0.0334;

/// Engine construction options. Defaults follow the reference keyword set;
/// everything is validated once at plan construction.
#[derive(Clone, Debug)]
pub struct GistConfig {
    pub prefix: String,
    pub grid_center: [f64; 3],
    pub grid_dims: [usize; 3],
    pub grid_spacing: f64,
    pub bulk_density: f64,
    pub temperature: f64,
    pub neighbor_cutoff: f64,
    pub do_order: bool,
    pub do_eij: bool,
    pub skip_energy: bool,
    pub skip_entropy: bool,
    pub rigid_atom_indices: [usize; 3],
    pub use_com: bool,
    pub exact_nn_volume: bool,
    pub nn_search_layers: usize,
    pub solute: Option<Selection>,
    pub imaging: bool,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            prefix: "gist".into(),
            grid_center: [0.0; 3],
            grid_dims: [40, 40, 40],
            grid_spacing: 0.5,
            bulk_density: WATER_BULK_DENSITY,
            temperature: 300.0,
            neighbor_cutoff: 3.5,
            do_order: false,
            do_eij: false,
            skip_energy: false,
            skip_entropy: false,
            rigid_atom_indices: [0, 1, 2],
            use_com: true,
            exact_nn_volume: true,
            nn_search_layers: 1,
            solute: None,
            imaging: true,
        }
    }
}

impl GistConfig {
    pub fn with_grid(mut self, center: [f64; 3], dims: [usize; 3], spacing: f64) -> Self {
        self.grid_center = center;
        self.grid_dims = dims;
        self.grid_spacing = spacing;
        self
    }

    pub fn with_bulk_density(mut self, bulk_density: f64) -> Self {
        self.bulk_density = bulk_density;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_neighbor_cutoff(mut self, cutoff: f64) -> Self {
        self.neighbor_cutoff = cutoff;
        self
    }

    pub fn with_order(mut self, enabled: bool) -> Self {
        self.do_order = enabled;
        self
    }

    pub fn with_eij(mut self, enabled: bool) -> Self {
        self.do_eij = enabled;
        self
    }

    pub fn with_skip_energy(mut self, skip: bool) -> Self {
        self.skip_energy = skip;
        self
    }

    pub fn with_skip_entropy(mut self, skip: bool) -> Self {
        self.skip_entropy = skip;
        self
    }

    pub fn with_rigid_atom_indices(mut self, indices: [usize; 3]) -> Self {
        self.rigid_atom_indices = indices;
        self
    }

    pub fn with_use_com(mut self, use_com: bool) -> Self {
        self.use_com = use_com;
        self
    }

    pub fn with_exact_nn_volume(mut self, exact: bool) -> Self {
        self.exact_nn_volume = exact;
        self
    }

    pub fn with_nn_search_layers(mut self, layers: usize) -> Self {
        self.nn_search_layers = layers;
        self
    }

    pub fn with_solute(mut self, solute: Option<Selection>) -> Self {
        self.solute = solute;
        self
    }

    pub fn with_imaging(mut self, imaging: bool) -> Self {
        self.imaging = imaging;
        self
    }

    pub fn neighbor_cutoff2(&self) -> f64 {
        self.neighbor_cutoff * self.neighbor_cutoff
    }

    pub fn validate(&self) -> GistResult<()> {
        if self.grid_dims.iter().any(|&d| d < 1) {
            return Err(GistError::Config(format!(
                "grid dimensions must be >= 1, got {},{},{}",
                self.grid_dims[0], self.grid_dims[1], self.grid_dims[2]
            )));
        }
        if self.grid_spacing <= 0.0 {
            return Err(GistError::Config("grid spacing must be > 0".into()));
        }
        if self.temperature < 0.0 {
            return Err(GistError::Config("temperature must be non-negative".into()));
        }
        if self.neighbor_cutoff <= 0.0 {
            return Err(GistError::Config("neighbor cutoff must be > 0".into()));
        }
        if self.bulk_density <= 0.0 {
            return Err(GistError::Config("bulk density must be > 0".into()));
        }
        if self.nn_search_layers < 1 {
            return Err(GistError::Config(
                "nn search layers must be at least 1".into(),
            ));
        }
        if self.do_eij && self.skip_energy {
            return Err(GistError::Config(
                "the Eij matrix requires the energy calculation".into(),
            ));
        }
        if self.bulk_density > WATER_BULK_DENSITY * 1.2 {
            log::warn!(
                "water reference density {} is high, consider {WATER_BULK_DENSITY} for 1 g/cc water",
                self.bulk_density
            );
        } else if self.bulk_density < WATER_BULK_DENSITY * 0.8 {
            log::warn!(
                "water reference density {} is low, consider {WATER_BULK_DENSITY} for 1 g/cc water",
                self.bulk_density
            );
        }
        Ok(())
    }
}
