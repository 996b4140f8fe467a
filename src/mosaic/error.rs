use std::io;
use std::path::PathBuf;

use derive_more::Display;

/// A tile file that could not be decoded. Skipped during indexing.
#[derive(Debug, Display)]
#[display(fmt = "{:?}: {}", path, error)]
pub(crate) struct ImageError {
    pub(crate) path: PathBuf,
    pub(crate) error: ::image::ImageError,
}

impl std::error::Error for ImageError {}

/// Fatal conditions that abort a mosaic build.
#[derive(Debug, Display)]
pub(crate) enum MosaicError {
    #[display(fmt = "Invalid configuration: {}", _0)]
    Configuration(String),

    #[display(fmt = "Failed to read tile directory {:?}: {}", path, error)]
    TileDiscovery { path: PathBuf, error: io::Error },

    #[display(fmt = "No valid tile images were found in the provided directories")]
    NoTilesFound,

    #[display(fmt = "Failed to open source image {:?}: {}", path, error)]
    SourceImage {
        path: PathBuf,
        error: ::image::ImageError,
    },

    #[display(fmt = "Failed to load tile {}", _0)]
    TileDecode(ImageError),

    #[display(fmt = "Failed to write tile index cache {:?}: {}", path, error)]
    CacheWrite { path: PathBuf, error: String },

    #[display(fmt = "Failed to save output image {:?}: {}", path, error)]
    OutputWrite {
        path: PathBuf,
        error: ::image::ImageError,
    },
}

impl std::error::Error for MosaicError {}

impl From<ImageError> for MosaicError {
    fn from(error: ImageError) -> Self {
        MosaicError::TileDecode(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let error = MosaicError::TileDiscovery {
            path: PathBuf::from("tiles/a"),
            error: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let message = error.to_string();
        assert!(message.contains("tiles/a"));
        assert!(message.contains("gone"));
    }

    #[test]
    fn test_image_error_converts_to_tile_decode() {
        let error = ImageError {
            path: PathBuf::from("x.png"),
            error: ::image::ImageError::IoError(io::Error::new(io::ErrorKind::Other, "bad")),
        };
        assert!(matches!(MosaicError::from(error), MosaicError::TileDecode(_)));
    }
}
