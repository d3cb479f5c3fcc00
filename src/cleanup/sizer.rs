//! Directory Sizer
//!
//! Recursively measures the byte size and file count of a directory tree.

use std::fs;
use std::io;
use std::path::Path;

// == Directory Size ==
/// Computes the total byte size and file count of a directory tree.
///
/// A missing path yields `(0, 0)` rather than an error. Directories do not
/// count toward the file count. Entries are stat'ed uniformly with
/// [`fs::metadata`], so symlinks are followed.
///
/// # Arguments
/// * `path` - Root of the tree to measure
pub fn dir_size(path: &Path) -> io::Result<(u64, u64)> {
    if !path.exists() {
        return Ok((0, 0));
    }

    let mut bytes: u64 = 0;
    let mut files: u64 = 0;

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        let metadata = fs::metadata(&entry_path)?;

        if metadata.is_dir() {
            let (sub_bytes, sub_files) = dir_size(&entry_path)?;
            bytes += sub_bytes;
            files += sub_files;
        } else {
            bytes += metadata.len();
            files += 1;
        }
    }

    Ok((bytes, files))
}
