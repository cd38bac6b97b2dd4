//! Software compositing into an RGBA8 frame buffer.

use glam::Vec2;
use image::RgbaImage;

/// Destination frame: tightly packed RGBA8 rows.
pub struct Frame<'a> {
    pub pixels: &'a mut [u8],
    pub width: u32,
    pub height: u32,
}

impl Frame<'_> {
    pub fn clear(&mut self, rgb: u32) {
        let [_, r, g, b] = rgb.to_be_bytes();
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&[r, g, b, 0xff]);
        }
    }

    fn blend(&mut self, x: u32, y: u32, src: [u8; 4]) {
        let index = ((y * self.width + x) * 4) as usize;
        let Some(dst) = self.pixels.get_mut(index..index + 4) else {
            return;
        };
        let alpha = src[3] as u32;
        match alpha {
            0 => {}
            255 => dst.copy_from_slice(&src),
            _ => {
                for channel in 0..3 {
                    let blended = (src[channel] as u32 * alpha + dst[channel] as u32 * (255 - alpha)) / 255;
                    dst[channel] = blended as u8;
                }
                dst[3] = 0xff;
            }
        }
    }

    /// Draws `sprite` scaled to `size` with its unrotated top-left corner at
    /// `position`. Rotation is counter-clockwise on screen, around the centre
    /// of the scaled sprite. Sampling is nearest-neighbour.
    pub fn blit(&mut self, sprite: &RgbaImage, position: Vec2, size: Vec2, rotation_degrees: f32) {
        if size.x < 1.0 || size.y < 1.0 || sprite.width() == 0 || sprite.height() == 0 {
            return;
        }

        let (sin, cos) = rotation_degrees.to_radians().sin_cos();
        let half = size * 0.5;
        let center = position + half;
        let extent = Vec2::new(
            (size.x * cos).abs() + (size.y * sin).abs(),
            (size.x * sin).abs() + (size.y * cos).abs(),
        ) * 0.5;

        let min = (center - extent).floor().max(Vec2::ZERO);
        let max = (center + extent)
            .ceil()
            .min(Vec2::new(self.width as f32, self.height as f32));
        if min.x >= max.x || min.y >= max.y {
            return;
        }

        let texel = Vec2::new(sprite.width() as f32, sprite.height() as f32) / size;
        for y in min.y as u32..max.y as u32 {
            for x in min.x as u32..max.x as u32 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                let local = Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos) + half;
                if local.x < 0.0 || local.y < 0.0 || local.x >= size.x || local.y >= size.y {
                    continue;
                }
                let source = local * texel;
                let sx = (source.x as u32).min(sprite.width() - 1);
                let sy = (source.y as u32).min(sprite.height() - 1);
                self.blend(x, y, sprite.get_pixel(sx, sy).0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn frame_buffer(width: u32, height: u32) -> Vec<u8> {
        vec![0; (width * height * 4) as usize]
    }

    fn pixel(buffer: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [buffer[i], buffer[i + 1], buffer[i + 2], buffer[i + 3]]
    }

    #[test]
    fn test_clear_fills_background() {
        let mut buffer = frame_buffer(2, 2);
        Frame {
            pixels: &mut buffer,
            width: 2,
            height: 2,
        }
        .clear(0x102030);
        assert_eq!(pixel(&buffer, 2, 1, 1), [0x10, 0x20, 0x30, 0xff]);
    }

    #[test]
    fn test_blit_scales_nearest() {
        let mut sprite = RgbaImage::new(2, 1);
        sprite.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        sprite.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let mut buffer = frame_buffer(8, 4);
        let mut frame = Frame {
            pixels: &mut buffer,
            width: 8,
            height: 4,
        };
        frame.blit(&sprite, Vec2::new(2.0, 1.0), Vec2::new(4.0, 2.0), 0.0);

        assert_eq!(pixel(&buffer, 8, 1, 1), [0, 0, 0, 0]);
        assert_eq!(pixel(&buffer, 8, 2, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&buffer, 8, 3, 2), [255, 0, 0, 255]);
        assert_eq!(pixel(&buffer, 8, 4, 1), [0, 0, 255, 255]);
        assert_eq!(pixel(&buffer, 8, 5, 2), [0, 0, 255, 255]);
        assert_eq!(pixel(&buffer, 8, 6, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn test_blit_rotates_counter_clockwise() {
        // Red on the left half, blue on the right half.
        let mut sprite = RgbaImage::new(2, 2);
        for y in 0..2 {
            sprite.put_pixel(0, y, Rgba([255, 0, 0, 255]));
            sprite.put_pixel(1, y, Rgba([0, 0, 255, 255]));
        }

        let mut buffer = frame_buffer(4, 4);
        let mut frame = Frame {
            pixels: &mut buffer,
            width: 4,
            height: 4,
        };
        frame.blit(&sprite, Vec2::ZERO, Vec2::splat(4.0), 90.0);

        // A quarter turn counter-clockwise moves the right half to the top.
        assert_eq!(pixel(&buffer, 4, 1, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(&buffer, 4, 1, 3), [255, 0, 0, 255]);
    }

    #[test]
    fn test_blit_clips_to_frame() {
        let sprite = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let mut buffer = frame_buffer(2, 2);
        let mut frame = Frame {
            pixels: &mut buffer,
            width: 2,
            height: 2,
        };
        frame.blit(&sprite, Vec2::new(-3.0, 1.0), Vec2::splat(4.0), 0.0);

        assert_eq!(pixel(&buffer, 2, 0, 1), [9, 9, 9, 255]);
        assert_eq!(pixel(&buffer, 2, 0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_blit_blends_translucent_pixels() {
        let sprite = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 51]));
        let mut buffer = frame_buffer(1, 1);
        let mut frame = Frame {
            pixels: &mut buffer,
            width: 1,
            height: 1,
        };
        frame.clear(0x000000);
        frame.blit(&sprite, Vec2::ZERO, Vec2::ONE, 0.0);

        assert_eq!(pixel(&buffer, 1, 0, 0), [51, 51, 51, 255]);
    }
}
