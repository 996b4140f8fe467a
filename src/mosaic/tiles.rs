mod tile;
mod tileset;
mod utils;

pub use tile::Tile;
pub use tileset::{IndexSettings, TileSet};
pub use utils::{fit_image, prepare_tile};
