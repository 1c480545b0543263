pub mod config;
pub mod logging;

pub mod checksum;
pub mod driver;
pub mod extract;
pub mod fetch;
pub mod source;
pub mod toolchain;
