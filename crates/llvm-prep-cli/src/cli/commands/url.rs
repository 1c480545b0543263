//! `llvm-prep url` – print the archive URL.

use llvm_prep_core::config::PrepConfig;
use llvm_prep_core::source;

pub fn run_url(cfg: &PrepConfig, commit: Option<&str>) {
    let url = match commit {
        Some(c) => source::archive_url(c),
        None => cfg.archive_url(),
    };
    println!("{}", url);
}
