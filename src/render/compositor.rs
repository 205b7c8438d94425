use crate::render::projection::SPRITE_SIZE;
use crate::render::sample::VisualSample;
use glam::{IVec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};

/// Tile-sized accumulation buffer.
///
/// Pixels hold premultiplied colour as floats; rounding to bytes only
/// happens once, in [`Canvas::finalize`].
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Over-composites a straight (non-premultiplied) colour onto one pixel.
    ///
    /// Points outside the canvas are ignored.
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, rgb: Vec3, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 || alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0);
        let dst = &mut self.pixels[(y as u32 * self.width + x as u32) as usize];
        let src = (rgb * alpha).extend(alpha);
        *dst = src + *dst * (1.0 - alpha);
    }

    /// Paints `sample` with its sprite's top-left corner at `origin`.
    ///
    /// Returns false without touching the canvas when the sample is fully
    /// transparent.
    pub fn composite(&mut self, origin: IVec2, sample: &VisualSample<'_>) -> bool {
        if sample.is_transparent() {
            return false;
        }
        let corner = origin + sample.offset;
        if corner.x >= self.width as i32
            || corner.y >= self.height as i32
            || corner.x + SPRITE_SIZE as i32 <= 0
            || corner.y + SPRITE_SIZE as i32 <= 0
        {
            return true;
        }

        let identity = sample.transform.is_identity();
        for sy in 0..SPRITE_SIZE {
            for sx in 0..SPRITE_SIZE {
                let [r, g, b, a] = sample.sprite.pixel(sx, sy);
                if a == 0 {
                    continue;
                }
                let x = corner.x + sx as i32;
                let y = corner.y + sy as i32;
                let mut rgb = Vec3::new(r as f32, g as f32, b as f32) / 255.0;
                if !identity {
                    rgb = sample.transform.apply(rgb);
                }
                self.blend_pixel(x, y, rgb, a as f32 / 255.0 * sample.alpha);

                if let Some(overlay) = sample.overlay {
                    self.blend_pixel(x, y, overlay.truncate(), overlay.w);
                }
            }
        }
        true
    }

    /// Composites every sample in order, returning how many were painted.
    pub fn composite_sequence<'a, I>(&mut self, samples: I) -> usize
    where
        I: IntoIterator<Item = (IVec2, VisualSample<'a>)>,
    {
        samples
            .into_iter()
            .filter(|(origin, sample)| self.composite(*origin, sample))
            .count()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| p.w <= 0.0)
    }

    /// Quantizes the accumulated colour to 8-bit straight RGBA.
    pub fn finalize(&self) -> RgbaImage {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixels[(y * self.width + x) as usize];
            if p.w <= 0.0 {
                return Rgba([0, 0, 0, 0]);
            }
            let rgb = p.truncate() / p.w;
            Rgba([quantize(rgb.x), quantize(rgb.y), quantize(rgb.z), quantize(p.w)])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::texture::Sprite;

    #[test]
    fn test_opaque_sample_copies_sprite() {
        let sprite = Sprite::shaded_cube([90, 140, 200, 255]);
        let mut canvas = Canvas::new(24, 24);
        assert!(canvas.composite(IVec2::ZERO, &VisualSample::new(&sprite)));
        assert_eq!(&canvas.finalize(), sprite.image());
    }

    #[test]
    fn test_transparent_sample_is_skipped() {
        let empty = Sprite::empty();
        let solid = Sprite::flat_cube([255, 255, 255, 255]);
        let mut canvas = Canvas::new(24, 24);
        assert!(!canvas.composite(IVec2::ZERO, &VisualSample::new(&empty)));

        let mut faded = VisualSample::new(&solid);
        faded.alpha = 0.0;
        assert!(!canvas.composite(IVec2::ZERO, &faded));
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_over_operator() {
        let mut canvas = Canvas::new(1, 1);
        canvas.blend_pixel(0, 0, Vec3::new(0.0, 0.0, 1.0), 1.0);
        canvas.blend_pixel(0, 0, Vec3::new(1.0, 0.0, 0.0), 0.25);
        let out = canvas.finalize().get_pixel(0, 0).0;
        assert_eq!(out, [64, 0, 191, 255]);
    }

    #[test]
    fn test_thin_layers_do_not_drift() {
        // 200 layers at 2% each, no per-layer rounding
        let mut canvas = Canvas::new(1, 1);
        canvas.blend_pixel(0, 0, Vec3::ZERO, 1.0);
        for _ in 0..200 {
            canvas.blend_pixel(0, 0, Vec3::splat(0.5), 0.02);
        }
        let out = canvas.finalize().get_pixel(0, 0).0;
        let expected = (0.5 * (1.0 - 0.98f32.powi(200)) * 255.0).round() as u8;
        assert_eq!(out[0], expected);
    }

    #[test]
    fn test_clipping_and_offset() {
        let sprite = Sprite::flat_cube([10, 20, 30, 255]);
        let mut canvas = Canvas::new(30, 30);
        let sample = VisualSample::new(&sprite).with_offset(IVec2::new(0, 2));
        assert!(canvas.composite(IVec2::new(20, -10), &sample));
        let image = canvas.finalize();
        // Sprite pixel (2, 14) lands at (22, 6)
        assert_eq!(image.get_pixel(22, 6).0, [10, 20, 30, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_overlay_tints_covered_pixels_only() {
        let sprite = Sprite::flat_cube([0, 0, 0, 255]);
        let mut canvas = Canvas::new(24, 24);
        let sample = VisualSample::new(&sprite).with_overlay(Vec4::new(1.0, 1.0, 1.0, 0.5));
        canvas.composite(IVec2::ZERO, &sample);
        let image = canvas.finalize();
        assert_eq!(image.get_pixel(12, 12).0, [128, 128, 128, 255]);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_sequence_counts_painted() {
        let solid = Sprite::flat_cube([1, 1, 1, 255]);
        let empty = Sprite::empty();
        let mut canvas = Canvas::new(48, 48);
        let painted = canvas.composite_sequence(vec![
            (IVec2::ZERO, VisualSample::new(&solid)),
            (IVec2::new(12, 6), VisualSample::new(&empty)),
            (IVec2::new(12, 6), VisualSample::new(&solid)),
        ]);
        assert_eq!(painted, 2);
    }
}
