pub mod chart;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod state;
pub mod summary;
pub mod table;

pub use error::{PipelineError, Result};
pub use pipeline::{PipelineConfig, RunReport, run};
