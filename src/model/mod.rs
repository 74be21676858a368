pub mod config;
pub mod project;
pub mod session;

pub use config::*;
pub use project::*;
pub use session::*;
