pub mod types;
pub mod config;
pub mod error;

pub use types::*;
pub use config::{Config, SaveOrdering};
pub use error::{ListEditError, RemoteError};
