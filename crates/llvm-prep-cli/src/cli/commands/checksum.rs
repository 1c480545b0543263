//! `llvm-prep checksum [path]` – print the SHA-256 of a file.

use anyhow::Result;
use llvm_prep_core::checksum;
use std::path::Path;

pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::sha256_path(path)?;
    println!("SHA-256: {}", digest);
    Ok(())
}
