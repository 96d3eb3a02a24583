//! Firmware image discovery

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

/// File extension of the Intel HEX images avrdude is asked to write.
pub const IMAGE_EXTENSION: &str = "hex";

/// A firmware image file found on disk.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct ImageCandidate(PathBuf);

impl ImageCandidate {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ImageCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Returns the firmware images directly inside `dir`, sorted lexicographically.
///
/// Only regular files with the [`IMAGE_EXTENSION`] extension are returned. When `dir` is `.` the
/// returned paths are bare file names.
pub fn find_images<P: AsRef<Path>>(dir: P) -> io::Result<Vec<ImageCandidate>> {
    let dir = dir.as_ref();
    let mut images = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|ext| ext.to_str()) != Some(IMAGE_EXTENSION) {
            continue;
        }

        if !path.is_file() {
            continue;
        }

        images.push(ImageCandidate(match path.strip_prefix(".") {
            Ok(relative) if dir == Path::new(".") => relative.to_path_buf(),
            _ => path,
        }));
    }

    images.sort();

    debug!("Found {} image(s) in {}", images.len(), dir.display());

    Ok(images)
}
