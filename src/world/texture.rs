// Format-agnostic repository of textures handed over by the asset loader.
// The rasterizer and the frame walk refer to textures by name only.

use std::collections::HashMap;

use crate::world::{
    sprites::{self, SpriteInfo},
    surface::{Surface, SurfaceRect},
};

/// Things that can go wrong when using the store.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in store")]
    Duplicate(String),

    /// Nothing is registered under the requested name.
    #[error("missing texture `{0}`")]
    Missing(String),

    /// A sprite rectangle reaches outside its sheet.
    #[error("sprite `{name}` lies outside sheet `{sheet}`")]
    SpriteOutOfSheet { name: String, sheet: String },
}

/// Owner of every texture surface for the lifetime of the process.
///
/// * Stores exactly one surface per name.
/// * Lookups hand out `&mut Surface` as well, because sampling fills each
///   surface's texel cache.
///
/// **Thread-safety:** single-threaded by design; the renderer runs on one
/// game thread.
#[derive(Debug, Default)]
pub struct TextureStore {
    by_name: HashMap<String, Surface>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Surface> {
        self.by_name.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Surface> {
        self.by_name.get_mut(name)
    }

    /// Names from `wanted` that are not registered, in input order.
    pub fn missing<'a, I>(&self, wanted: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        wanted
            .into_iter()
            .filter(|name| !self.contains(name))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Register `surface` under `name`. Fails if the name already exists.
    pub fn insert<S: Into<String>>(&mut self, name: S, surface: Surface) -> Result<(), TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        self.by_name.insert(name, surface);
        Ok(())
    }

    /// Copy `rect` out of the sheet `sheet` and register it as `name`.
    pub fn carve(&mut self, name: &str, sheet: &str, rect: SurfaceRect) -> Result<(), TextureError> {
        let src = self
            .by_name
            .get(sheet)
            .ok_or_else(|| TextureError::Missing(sheet.to_owned()))?;
        if rect.x + rect.w > src.width() || rect.y + rect.h > src.height() {
            return Err(TextureError::SpriteOutOfSheet {
                name: name.to_owned(),
                sheet: sheet.to_owned(),
            });
        }
        let mut sprite = Surface::new(rect.w, rect.h);
        sprite.copy_rect(src, rect, (0, 0));
        self.insert(name, sprite)
    }

    /// Register one surface per sheet-based entry of the sprite catalog.
    ///
    /// Entries whose name is already taken are left alone. Every failure is
    /// collected so the caller can report all of them at start-up.
    pub fn carve_sprites(&mut self) -> Vec<TextureError> {
        let mut errors = Vec::new();
        for (name, info) in sprites::catalog() {
            let SpriteInfo {
                sheet,
                cell: Some(rect),
                ..
            } = info
            else {
                continue;
            };
            if self.contains(name) {
                continue;
            }
            match self.carve(name, sheet, *rect) {
                Ok(()) => log::debug!("carved sprite `{name}` from `{sheet}`"),
                Err(e) => errors.push(e),
            }
        }
        errors
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
