//! CLI library for testing purposes

pub mod config;
pub mod export;
pub mod import;
pub mod merge;
pub mod path_glob;
pub mod report;
pub mod scan;
pub mod strings_file;
pub mod translate;
pub mod validation;

pub use config::{Config, Settings};
