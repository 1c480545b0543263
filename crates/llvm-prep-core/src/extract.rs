//! Unpacking of the `.tar.gz` source archive.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Component, Path};

/// Unpack the gzip-compressed tarball at `archive` into `dest`.
///
/// Entries that would land outside `dest` (absolute paths, `..`) are skipped
/// by `tar`. Returns the distinct top-level names written, sorted.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<Vec<OsString>> {
    let file = File::open(archive).with_context(|| format!("open {}", archive.display()))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);

    let mut top_level = BTreeSet::new();
    let entries = tar
        .entries()
        .with_context(|| format!("read {}", archive.display()))?;
    for entry in entries {
        let mut entry = entry.with_context(|| format!("corrupted entry in {}", archive.display()))?;
        // GitHub archives lead with a pax global header carrying the commit id.
        if entry.header().entry_type().is_pax_global_extensions() {
            continue;
        }
        let path = entry.path()?.into_owned();
        let unpacked = entry
            .unpack_in(dest)
            .with_context(|| format!("unpack {}", path.display()))?;
        if !unpacked {
            tracing::warn!("skipped archive entry outside destination: {}", path.display());
            continue;
        }
        if let Some(Component::Normal(first)) = path.components().next() {
            top_level.insert(first.to_os_string());
        }
    }

    tracing::debug!(
        "extracted {} into {} ({} top-level entries)",
        archive.display(),
        dest.display(),
        top_level.len()
    );
    Ok(top_level.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn write_tar_gz(path: &Path, files: &[(&str, &[u8])]) {
        let gz = GzEncoder::new(File::create(path).unwrap(), Compression::fast());
        let mut builder = tar::Builder::new(gz);
        for (name, body) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *body).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn extracts_files_under_top_level_dir() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("llvm.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("llvm-project-abc/llvm/CMakeLists.txt", b"project(LLVM)\n"),
                ("llvm-project-abc/README.md", b"readme\n"),
            ],
        );

        let top = extract_tar_gz(&archive, dir.path()).unwrap();
        assert_eq!(top, vec![OsString::from("llvm-project-abc")]);
        let cmake = std::fs::read(dir.path().join("llvm-project-abc/llvm/CMakeLists.txt")).unwrap();
        assert_eq!(cmake, b"project(LLVM)\n");
    }

    #[test]
    fn not_gzip_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("llvm.tar.gz");
        std::fs::write(&archive, b"<html>not found</html>").unwrap();
        assert!(extract_tar_gz(&archive, dir.path()).is_err());
    }

    #[test]
    fn missing_archive_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_tar_gz(&dir.path().join("llvm.tar.gz"), dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("llvm.tar.gz"));
    }
}
