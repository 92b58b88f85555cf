//! CLI command implementations.

mod chunk;
mod config;
mod doctor;
mod excluded;
mod init;
mod moments;
mod run;

pub use chunk::run_chunk;
pub use config::run_config;
pub use doctor::run_doctor;
pub use excluded::run_excluded;
pub use init::run_init;
pub use moments::run_moments;
pub use run::run_pipeline;
