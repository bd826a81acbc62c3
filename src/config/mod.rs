//! Engine configuration
//!
//! TOML-backed configuration with defaults for every knob. The split into
//! types, parser, and validation keeps deserialization separate from the
//! range checks serde cannot express.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{CollectorConfig, Config, FetchConfig, ListingConfig, PacingConfig};
pub use validation::validate;
