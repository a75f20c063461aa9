pub mod config;
pub mod log_format;
pub mod path_processing;
pub mod text_processing;

pub use config::*;
pub use log_format::*;
pub use path_processing::*;
pub use text_processing::*;
