pub mod cli;
pub mod context;
pub mod vote;

pub use cli::*;
pub use context::*;
pub use vote::*;
