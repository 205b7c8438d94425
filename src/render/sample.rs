use crate::render::texture::Sprite;
use glam::{IVec2, Vec3, Vec4};

/// Per-channel affine colour map `c * scale + bias` on normalised RGB.
///
/// Modes compose transforms instead of rewriting pixels, so a sample stays a
/// borrowed sprite plus a few floats until the compositor evaluates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTransform {
    pub scale: Vec3,
    pub bias: Vec3,
}

impl ColorTransform {
    pub const IDENTITY: Self = Self {
        scale: Vec3::ONE,
        bias: Vec3::ZERO,
    };

    pub fn attenuate(factor: f32) -> Self {
        Self {
            scale: Vec3::splat(factor),
            bias: Vec3::ZERO,
        }
    }

    /// Blends towards `color` by `strength` in `0..=1`.
    pub fn tint(color: Vec3, strength: f32) -> Self {
        Self {
            scale: Vec3::splat(1.0 - strength),
            bias: color * strength,
        }
    }

    /// Applies `self` first, then `next`.
    pub fn then(self, next: ColorTransform) -> Self {
        Self {
            scale: next.scale * self.scale,
            bias: next.scale * self.bias + next.bias,
        }
    }

    #[inline]
    pub fn apply(&self, rgb: Vec3) -> Vec3 {
        (rgb * self.scale + self.bias).clamp(Vec3::ZERO, Vec3::ONE)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// What the mode chain wants painted for one block.
#[derive(Debug, Clone, Copy)]
pub struct VisualSample<'a> {
    pub sprite: &'a Sprite,
    pub transform: ColorTransform,
    /// Multiplier on the sprite's own alpha.
    pub alpha: f32,
    /// Translucent layer painted over the sprite's covered pixels.
    pub overlay: Option<Vec4>,
    /// Pixel shift applied on top of the projected position.
    pub offset: IVec2,
}

impl<'a> VisualSample<'a> {
    pub fn new(sprite: &'a Sprite) -> Self {
        Self {
            sprite,
            transform: ColorTransform::IDENTITY,
            alpha: 1.0,
            overlay: None,
            offset: IVec2::ZERO,
        }
    }

    pub fn with_transform(mut self, next: ColorTransform) -> Self {
        self.transform = self.transform.then(next);
        self
    }

    pub fn with_overlay(mut self, color: Vec4) -> Self {
        self.overlay = Some(color);
        self
    }

    pub fn with_offset(mut self, offset: IVec2) -> Self {
        self.offset += offset;
        self
    }

    /// Swaps the image and drops every colour change made so far.
    pub fn replaced(self, sprite: &'a Sprite) -> Self {
        Self {
            offset: self.offset,
            ..Self::new(sprite)
        }
    }

    /// Nothing of this sample would reach the canvas.
    pub fn is_transparent(&self) -> bool {
        self.alpha <= 0.0 || self.sprite.is_transparent()
    }
}

/// Result of one mode for one block.
#[derive(Debug, Clone, Copy)]
pub enum ModeOutcome<'a> {
    Draw(VisualSample<'a>),
    /// Treat the block as fully transparent and stop the chain.
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_composition_order() {
        let tint = ColorTransform::tint(Vec3::new(1.0, 0.0, 0.0), 0.5);
        let dim = ColorTransform::attenuate(0.5);
        let grey = Vec3::splat(0.5);

        // Tint then dim: (0.5 * 0.5 + 0.5) * 0.5
        let tinted_first = tint.then(dim).apply(grey);
        assert!((tinted_first.x - 0.375).abs() < 1e-6);
        assert!((tinted_first.y - 0.125).abs() < 1e-6);

        // Dim then tint: 0.25 * 0.5 + 0.5
        let dimmed_first = dim.then(tint).apply(grey);
        assert!((dimmed_first.x - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_identity_and_clamp() {
        let rgb = Vec3::new(0.1, 0.2, 0.3);
        assert_eq!(ColorTransform::IDENTITY.apply(rgb), rgb);
        assert!(ColorTransform::IDENTITY
            .then(ColorTransform::IDENTITY)
            .is_identity());

        let bright = ColorTransform {
            scale: Vec3::splat(4.0),
            bias: Vec3::ZERO,
        };
        assert_eq!(bright.apply(rgb), Vec3::new(0.4, 0.8, 1.0));
    }

    #[test]
    fn test_replaced_keeps_offset_only() {
        let base = Sprite::empty();
        let marker = Sprite::flat_cube([255, 0, 0, 255]);
        let sample = VisualSample::new(&base)
            .with_transform(ColorTransform::attenuate(0.2))
            .with_offset(IVec2::new(0, 2))
            .replaced(&marker);
        assert!(sample.transform.is_identity());
        assert_eq!(sample.offset, IVec2::new(0, 2));
        assert!(!sample.is_transparent());
    }
}
