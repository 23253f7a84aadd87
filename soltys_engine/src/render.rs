use anyhow::{Result, ensure};
use soltys_formats::font::Font;

/// Row-major pixel buffer in the two framebuffer depths the engine blits to:
/// one byte per pixel (palettized) or two (RGB565-era).
#[derive(Debug, Clone)]
pub struct Surface {
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
    pitch: usize,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: usize, height: usize, bytes_per_pixel: usize) -> Result<Self> {
        ensure!(
            bytes_per_pixel == 1 || bytes_per_pixel == 2,
            "surfaces are 1 or 2 bytes per pixel, not {bytes_per_pixel}"
        );
        let pitch = width * bytes_per_pixel;
        Ok(Surface {
            width,
            height,
            bytes_per_pixel,
            pitch,
            pixels: vec![0; pitch * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        let offset = y * self.pitch + x * self.bytes_per_pixel;
        match self.bytes_per_pixel {
            1 => u32::from(self.pixels[offset]),
            _ => u32::from(u16::from_le_bytes([
                self.pixels[offset],
                self.pixels[offset + 1],
            ])),
        }
    }

    fn put_pixel(&mut self, x: usize, y: usize, color: u32) {
        let offset = y * self.pitch + x * self.bytes_per_pixel;
        match self.bytes_per_pixel {
            1 => self.pixels[offset] = color as u8,
            _ => {
                let bytes = (color as u16).to_le_bytes();
                self.pixels[offset] = bytes[0];
                self.pixels[offset + 1] = bytes[1];
            }
        }
    }
}

/// Blits one glyph. Set bits paint `color`; clear bits leave the surface
/// alone. Glyph parts outside the surface clip away.
pub fn draw_char(surface: &mut Surface, font: &Font<'_>, ch: u8, x: i32, y: i32, color: u32) {
    let rows = font.glyph(ch);
    for (row, bits) in rows.iter().enumerate() {
        let py = y + row as i32;
        if py < 0 || py as usize >= surface.height() {
            continue;
        }
        for col in 0..8 {
            if bits & (0x80 >> col) == 0 {
                continue;
            }
            let px = x + col as i32;
            if px < 0 || px as usize >= surface.width() {
                continue;
            }
            surface.put_pixel(px as usize, py as usize, color);
        }
    }
}

/// Draws a string left to right, advancing by each character's width.
/// Returns the x position one past the final glyph.
pub fn draw_string(
    surface: &mut Surface,
    font: &Font<'_>,
    text: &str,
    x: i32,
    y: i32,
    color: u32,
) -> i32 {
    let mut cursor = x;
    for byte in text.bytes() {
        draw_char(surface, font, byte, cursor, y, color);
        cursor += i32::from(font.char_width(byte));
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use soltys_formats::font::GLYPH_HEIGHT;

    fn lit_pixels(surface: &Surface) -> usize {
        (0..surface.height())
            .flat_map(|y| (0..surface.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| surface.pixel(x, y) != 0)
            .count()
    }

    #[test]
    fn draws_a_known_glyph_into_a_palettized_surface() {
        let font = Font::builtin();
        let mut surface = Surface::new(16, 16, 1).unwrap();
        draw_char(&mut surface, &font, b'A', 0, 0, 7);

        // Row 0 of 'A' is 0b00011000: pixels 3 and 4 are set.
        assert_eq!(surface.pixel(3, 0), 7);
        assert_eq!(surface.pixel(4, 0), 7);
        assert_eq!(surface.pixel(0, 0), 0);

        let expected: usize = font
            .glyph(b'A')
            .iter()
            .map(|bits| bits.count_ones() as usize)
            .sum();
        assert_eq!(lit_pixels(&surface), expected);
    }

    #[test]
    fn two_byte_surfaces_store_full_colors() {
        let font = Font::builtin();
        let mut surface = Surface::new(16, 16, 2).unwrap();
        draw_char(&mut surface, &font, b'A', 0, 0, 0xF81F);

        assert_eq!(surface.pixel(3, 0), 0xF81F);
    }

    #[test]
    fn off_surface_glyphs_clip() {
        let font = Font::builtin();
        let mut surface = Surface::new(8, GLYPH_HEIGHT, 1).unwrap();
        draw_char(&mut surface, &font, b'A', -4, -4, 1);
        draw_char(&mut surface, &font, b'A', 6, 6, 1);
        // Reaching here without a panic is the point; some pixels may land.
        let _ = lit_pixels(&surface);
    }

    #[test]
    fn draw_string_advances_by_char_widths() {
        let font = Font::builtin();
        let mut surface = Surface::new(64, 8, 1).unwrap();
        let end = draw_string(&mut surface, &font, "Hi", 2, 0, 3);
        assert_eq!(
            end,
            2 + i32::from(font.char_width(b'H')) + i32::from(font.char_width(b'i'))
        );
        assert!(lit_pixels(&surface) > 0);
    }

    #[test]
    fn surfaces_reject_unsupported_depths() {
        assert!(Surface::new(8, 8, 3).is_err());
        assert!(Surface::new(8, 8, 4).is_err());
    }
}
