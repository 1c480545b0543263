//! Pinned llvm-project source snapshot: commit, archive URL and extracted directory name.

/// Upstream commit fetched by default.
pub const DEFAULT_COMMIT: &str = "3d51010a3350660160981c6b8e624dcc87c208a3";

/// SHA-256 recorded for the GitHub archive of [`DEFAULT_COMMIT`].
pub const DEFAULT_ARCHIVE_SHA256: &str =
    "efbca707a6eb1c714b849de120309070eef282660c0f4be5b68efef62cc95cf5";

const ARCHIVE_URL_PREFIX: &str = "https://github.com/llvm/llvm-project/archive/";

/// GitHub archive URL for `commit`.
///
/// `archive_url("abc")` → `"https://github.com/llvm/llvm-project/archive/abc.tar.gz"`
pub fn archive_url(commit: &str) -> String {
    format!("{}{}.tar.gz", ARCHIVE_URL_PREFIX, commit)
}

/// Top-level directory of the GitHub archive for `commit`.
pub fn extracted_dir_name(commit: &str) -> String {
    format!("llvm-project-{}", commit)
}
