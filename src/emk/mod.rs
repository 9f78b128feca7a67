//! Core EMK container module.

pub mod builder;
pub mod codec;
pub mod format;
pub mod lyrics;
pub mod reader;
pub mod types;

pub use builder::EmkBuilder;
pub use reader::EmkArchive;
pub use types::error::{EmkError, Result};
