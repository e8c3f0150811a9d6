pub mod codec;
pub mod config;
pub mod repositories;

pub use codec::*;
pub use config::*;
pub use repositories::*;
