//! Figuring out what to benchmark: which solvers, which model files.

pub mod models;
pub mod solvers;

pub use models::{find_model_files, model_display_name, relative_display};
pub use solvers::{discover_solvers, parse_solver_listing, resolve_solvers};
