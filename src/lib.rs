mod app;
pub mod error;
pub mod init;
mod simulation;

pub use app::*;
pub use error::{Error, Result};
pub use simulation::*;
