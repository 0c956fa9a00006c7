pub mod api_client;
pub mod config;
pub mod error;
pub mod models;
pub mod poller;
pub mod utils;
pub mod view;
pub mod vote;

pub use api_client::*;
pub use config::*;
pub use error::*;
pub use models::*;
pub use poller::*;
pub use view::*;
pub use vote::*;
