use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs::read_dir;
use std::io;
use std::path::{Path, PathBuf};

use super::error::MosaicError;

/// Extensions (lower case, no dot) of files treated as tile images.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "webp", "tif", "tiff"];

pub fn is_image_extension(ext: &OsStr) -> bool {
    ext.to_str()
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Walk `root` and add every tile image below it to `found`.
fn collect_tile_images(root: &Path, found: &mut BTreeSet<PathBuf>) -> io::Result<()> {
    let mut pending = vec![root.to_owned()];
    while let Some(dir) = pending.pop() {
        for entry in read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() && path.extension().map_or(false, is_image_extension) {
                found.insert(path);
            }
        }
    }
    Ok(())
}

/// Collect every tile image under `dirs`, deduplicated and sorted.
///
/// Directories that do not exist are skipped.
pub fn discover_tiles(dirs: &[PathBuf]) -> Result<Vec<PathBuf>, MosaicError> {
    let mut found = BTreeSet::new();
    for dir in dirs.iter().filter(|dir| dir.exists()) {
        collect_tile_images(dir, &mut found).map_err(|error| MosaicError::TileDiscovery {
            path: dir.clone(),
            error,
        })?;
    }
    Ok(found.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension(OsStr::new("png")));
        assert!(is_image_extension(OsStr::new("JPG")));
        assert!(is_image_extension(OsStr::new("tiff")));
        assert!(!is_image_extension(OsStr::new("gif")));
        assert!(!is_image_extension(OsStr::new("txt")));
    }

    #[test]
    fn test_collect_tile_images_accumulates_across_roots() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::write(a.path().join("x.png"), b"").unwrap();
        fs::write(b.path().join("y.bmp"), b"").unwrap();
        fs::write(b.path().join("z.gif"), b"").unwrap();

        let mut found = BTreeSet::new();
        collect_tile_images(a.path(), &mut found).unwrap();
        collect_tile_images(b.path(), &mut found).unwrap();
        collect_tile_images(a.path(), &mut found).unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.contains(&b.path().join("y.bmp")));
    }

    #[test]
    fn test_discover_tiles_recurses_sorts_and_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        for name in ["b.png", "a.JPG", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::write(nested.join("c.webp"), b"").unwrap();

        let dirs = vec![dir.path().to_owned(), dir.path().to_owned(), dir.path().join("missing")];
        let found = discover_tiles(&dirs).unwrap();

        assert_eq!(
            found,
            vec![
                dir.path().join("a.JPG"),
                dir.path().join("b.png"),
                nested.join("c.webp"),
            ]
        );
    }
}
