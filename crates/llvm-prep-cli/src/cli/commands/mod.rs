//! CLI command handlers, one per file.

mod build;
mod checksum;
mod url;

pub use build::{run_build, BuildOverrides};
pub use checksum::run_checksum;
pub use url::run_url;
