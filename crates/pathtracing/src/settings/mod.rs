use thiserror::Error;

use crate::{renderer::ChunkGrid, scene::test_scenes};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("image size must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
    #[error("chunk grid must be non-zero, got {chunks_x}x{chunks_y}")]
    EmptyChunkGrid { chunks_x: u32, chunks_y: u32 },
    #[error("{chunks_x}x{chunks_y} chunks overflow the chunk counter")]
    TooManyChunks { chunks_x: u32, chunks_y: u32 },
    #[error("{chunks_x}x{chunks_y} chunks do not evenly divide a {width}x{height} image")]
    UnevenChunkGrid { width: u32, height: u32, chunks_x: u32, chunks_y: u32 },
    #[error("no built-in scene named {0:?}")]
    UnknownScene(String),
}

/// Everything that is fixed for the lifetime of a rendering session.
/// There is no command line, the viewer renders with `RenderSettings::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,

    // one pass over the image is spread over chunks_x * chunks_y frames
    pub chunks_x: u32,
    pub chunks_y: u32,

    pub fullscreen: bool,
    pub skybox_active: bool,

    // name of an entry in `test_scenes`
    pub scene: &'static str,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,

            chunks_x: 2,
            chunks_y: 2,

            fullscreen: true,
            skybox_active: true,

            scene: "cornell_box",
        }
    }
}

impl RenderSettings {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Checks the chunk grid against the image size and that the scene exists.
    /// A grid that does not tile the image exactly would leave gaps or overlaps.
    pub fn validate(&self) -> Result<ChunkGrid, SettingsError> {
        if test_scenes::find_test_scene(self.scene).is_none() {
            return Err(SettingsError::UnknownScene(self.scene.to_string()));
        }
        ChunkGrid::new(self.width, self.height, self.chunks_x, self.chunks_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = RenderSettings::default();
        let grid = settings.validate().unwrap();
        assert_eq!(grid.chunk_count(), 4);
        assert_eq!(settings.pixel_count(), 1920 * 1080);
    }

    #[test]
    fn uneven_grid_is_rejected() {
        let settings = RenderSettings { chunks_x: 7, ..Default::default() };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::UnevenChunkGrid { width: 1920, height: 1080, chunks_x: 7, chunks_y: 2 })
        );

        let settings = RenderSettings { chunks_y: 7, ..Default::default() };
        assert!(matches!(settings.validate(), Err(SettingsError::UnevenChunkGrid { .. })));
    }

    #[test]
    fn unknown_scene_is_rejected() {
        let settings = RenderSettings { scene: "teapot", ..Default::default() };
        assert_eq!(settings.validate(), Err(SettingsError::UnknownScene("teapot".to_string())));

        let settings = RenderSettings { scene: "material_spheres", ..Default::default() };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let settings = RenderSettings { width: 0, ..Default::default() };
        assert_eq!(settings.validate(), Err(SettingsError::EmptyImage { width: 0, height: 1080 }));

        let settings = RenderSettings { chunks_x: 0, ..Default::default() };
        assert_eq!(settings.validate(), Err(SettingsError::EmptyChunkGrid { chunks_x: 0, chunks_y: 2 }));
    }
}
