pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod traits;
pub mod version;

pub use config::{AppConfig, ExecutorsConfig, LiveConfig};
pub use errors::*;
pub use logging::init_logging;
pub use models::*;
pub use traits::*;
pub use version::{ClientVersion, WireFormat};
