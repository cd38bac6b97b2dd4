use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Decoded sprites keyed by the path the element tree refers to them by.
///
/// A sprite that fails to load is remembered as missing so the failure is
/// logged once rather than every frame.
pub struct SpriteCache {
    root: PathBuf,
    sprites: HashMap<String, Option<RgbaImage>>,
}

impl SpriteCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sprites: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&mut self, path: &str) -> Option<&RgbaImage> {
        let root = &self.root;
        self.sprites
            .entry(path.to_string())
            .or_insert_with(|| match image::open(root.join(path)) {
                Ok(decoded) => {
                    let sprite = decoded.to_rgba8();
                    tracing::debug!(
                        "Loaded sprite {} ({}x{})",
                        path,
                        sprite.width(),
                        sprite.height()
                    );
                    Some(sprite)
                }
                Err(err) => {
                    tracing::warn!("Failed to load sprite {}: {}", path, err);
                    None
                }
            })
            .as_ref()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
