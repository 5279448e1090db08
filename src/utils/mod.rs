pub mod settings;

pub use settings::{MapSettings, TerrainSettings, WorldSettings, load_settings, save_settings};
