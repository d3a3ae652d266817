#![forbid(unsafe_code)]

pub mod executor;
pub mod plans;

pub use executor::{Executor, Plan};
pub use plans::gist::{
    GistConfig, GistOutput, GistPlan, GistSummary, GridGeometry, SolventModel, REPORT_VERSION,
    WATER_BULK_DENSITY,
};

#[cfg(test)]
mod tests;
