//! Per-surface appearance state.
//!
//! The registry is the only mutable piece of the model after load: the
//! geometry and the segmentation are shared read-only, while the registry
//! tracks what the user assigned to each surface.

pub mod palette;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::segmentation::Segmentation;

/// Linear RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Light blue, the color of untouched surfaces.
    pub const DEFAULT: Self = Self {
        r: 0.6,
        g: 0.8,
        b: 1.0,
    };

    /// Creates a color, clamping each component to `[0, 1]` (NaN becomes 0).
    #[must_use]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: clamp_unit(r),
            g: clamp_unit(g),
            b: clamp_unit(b),
        }
    }

    /// Returns the same color with every component clamped to `[0, 1]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(self.r, self.g, self.b)
    }

    /// 8-bit display components.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clamped();
        [c.r, c.g, c.b].map(|v| (v * 255.0).round() as u8)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Material assigned to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    #[default]
    None,
    Textured,
}

/// What a renderer should show for a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Appearance {
    Flat(Rgb),
    Textured,
}

/// Stored color and material of one surface.
///
/// While the material is [`Material::Textured`] the color is kept but not
/// shown, so clearing the texture brings the previous color back.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SurfaceStyle {
    pub color: Rgb,
    pub material: Material,
}

impl SurfaceStyle {
    /// The visible appearance.
    #[must_use]
    pub fn appearance(&self) -> Appearance {
        match self.material {
            Material::None => Appearance::Flat(self.color),
            Material::Textured => Appearance::Textured,
        }
    }
}

/// Color and material per surface of a segmentation.
#[derive(Debug, Clone)]
pub struct SurfaceRegistry {
    segmentation: Arc<Segmentation>,
    styles: Vec<SurfaceStyle>,
}

impl SurfaceRegistry {
    /// Creates a registry with the default style for every surface.
    #[must_use]
    pub fn new(segmentation: Arc<Segmentation>) -> Self {
        let styles = vec![SurfaceStyle::default(); segmentation.len()];
        Self {
            segmentation,
            styles,
        }
    }

    /// The segmentation this registry describes.
    #[must_use]
    pub fn segmentation(&self) -> &Arc<Segmentation> {
        &self.segmentation
    }

    /// Number of surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Returns `true` if there are no surfaces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Sets the color of a surface and clears its material.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IndexOutOfRange`] for an unknown surface.
    pub fn set_color(&mut self, surface: usize, color: Rgb) -> Result<(), RegistryError> {
        let style = self.style_mut(surface)?;
        style.color = color.clamped();
        style.material = Material::None;
        Ok(())
    }

    /// Sets the material of a surface, leaving the stored color untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IndexOutOfRange`] for an unknown surface.
    pub fn set_material(&mut self, surface: usize, material: Material) -> Result<(), RegistryError> {
        self.style_mut(surface)?.material = material;
        Ok(())
    }

    /// Restores the default color and no material on every surface.
    pub fn reset(&mut self) {
        self.styles.fill(SurfaceStyle::default());
    }

    /// Stored color of a surface (also while it is textured).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IndexOutOfRange`] for an unknown surface.
    pub fn color_of(&self, surface: usize) -> Result<Rgb, RegistryError> {
        Ok(self.style(surface)?.color)
    }

    /// Material of a surface.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IndexOutOfRange`] for an unknown surface.
    pub fn material_of(&self, surface: usize) -> Result<Material, RegistryError> {
        Ok(self.style(surface)?.material)
    }

    /// Visible appearance of a surface.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IndexOutOfRange`] for an unknown surface.
    pub fn appearance(&self, surface: usize) -> Result<Appearance, RegistryError> {
        Ok(self.style(surface)?.appearance())
    }

    /// Surface containing `triangle`, if the triangle exists.
    #[must_use]
    pub fn surface_of_triangle(&self, triangle: usize) -> Option<usize> {
        self.segmentation.surface_of(triangle)
    }

    /// Iterates `(surface index, style)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, SurfaceStyle)> + '_ {
        self.styles.iter().copied().enumerate()
    }

    /// Assigns a surface its palette color from [`palette::distinct_color`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IndexOutOfRange`] for an unknown surface.
    pub fn recolor_distinct(&mut self, surface: usize) -> Result<(), RegistryError> {
        self.set_color(surface, palette::distinct_color(surface))
    }

    /// Gives every surface its palette color.
    pub fn recolor_all_distinct(&mut self) {
        for (index, style) in self.styles.iter_mut().enumerate() {
            *style = SurfaceStyle {
                color: palette::distinct_color(index),
                material: Material::None,
            };
        }
    }

    fn style(&self, surface: usize) -> Result<&SurfaceStyle, RegistryError> {
        let len = self.styles.len();
        self.styles
            .get(surface)
            .ok_or(RegistryError::IndexOutOfRange { index: surface, len })
    }

    fn style_mut(&mut self, surface: usize) -> Result<&mut SurfaceStyle, RegistryError> {
        let len = self.styles.len();
        self.styles
            .get_mut(surface)
            .ok_or(RegistryError::IndexOutOfRange { index: surface, len })
    }
}
