pub mod container_handlers;
pub mod export_handlers;
pub mod ops_handlers;
pub mod scan_handlers;

pub use container_handlers::*;
pub use export_handlers::*;
pub use ops_handlers::*;
pub use scan_handlers::*;
