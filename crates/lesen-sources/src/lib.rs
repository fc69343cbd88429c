//! lesen-sources: content sources and configuration.
//!
//! Implements the `ContentSource` trait for a local file and for the site's
//! HTTP endpoint, and loads the `lesen.toml` configuration that picks one.

pub mod config;
pub mod error;
pub mod file;
pub mod http;
pub mod mock;

pub use config::{create_source, load_config, LesenConfig, SourceConfig};
pub use error::SourceError;
pub use file::FileSource;
pub use http::HttpSource;
