use super::{DrawCmd, Palette, Rgb};

/// Software framebuffer for a display list. Everything outside the buffer is clipped.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb(0, 0, 0); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Packed `RGBRGB...` rows, top to bottom.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|Rgb(r, g, b)| [*r, *g, *b])
            .collect()
    }

    pub fn draw(&mut self, cmds: &[DrawCmd], palette: &Palette) {
        for cmd in cmds {
            match cmd {
                DrawCmd::Clear { color } => self.pixels.fill(palette.resolve(*color)),
                DrawCmd::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => self.fill_rect(*x, *y, *width, *height, palette.resolve(*color)),
                DrawCmd::StrokeRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    let rgb = palette.resolve(*color);
                    self.fill_rect(*x, *y, *width, 1.0, rgb);
                    self.fill_rect(*x, *y + *height - 1.0, *width, 1.0, rgb);
                    self.fill_rect(*x, *y, 1.0, *height, rgb);
                    self.fill_rect(*x + *width - 1.0, *y, 1.0, *height, rgb);
                }
                DrawCmd::Text {
                    x,
                    y,
                    size,
                    text,
                    color,
                } => self.block_text(*x, *y, *size, text, palette.resolve(*color)),
            }
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, rgb: Rgb) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let Some((x0, x1)) = clip_span(x, width, self.width) else {
            return;
        };
        let Some((y0, y1)) = clip_span(y, height, self.height) else {
            return;
        };

        for row in y0..y1 {
            let start = row * self.width;
            self.pixels[start + x0..start + x1].fill(rgb);
        }
    }

    /// No font: each visible glyph becomes a solid cell.
    fn block_text(&mut self, x: f32, y: f32, size: f32, text: &str, rgb: Rgb) {
        let advance = size * 0.6;
        let glyph_width = (advance - 1.0).max(1.0);
        for (index, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            self.fill_rect(x + index as f32 * advance, y, glyph_width, size, rgb);
        }
    }
}

/// Pixel range `[start, end)` covered by `[origin, origin + length)` inside `0..limit`.
fn clip_span(origin: f32, length: f32, limit: usize) -> Option<(usize, usize)> {
    let start = origin.floor().max(0.0);
    let end = (origin + length).ceil().min(limit as f32);
    if start >= end || end.is_nan() {
        return None;
    }
    Some((start as usize, end as usize))
}
