use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::error::PanelError;

/// Fonts tried, in order, when no font path is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// RGB colour used by every drawing primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    pub const RED: Color = Color::new(0xff, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// Horizontal anchoring of a text run relative to its x coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Software raster over an RGBA8 frame.
///
/// Coordinates are display pixels; anything outside the frame is clipped. Text is a
/// no-op until a font is attached with [`Canvas::with_font`].
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
    font: Option<&'a Font<'static>>,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
            font: None,
        }
    }

    pub fn with_font(mut self, font: &'a Font<'static>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    /// Colour currently stored at (x, y), if inside the frame.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let idx = self.index(x, y)?;
        Some(Color::new(
            self.frame[idx],
            self.frame[idx + 1],
            self.frame[idx + 2],
        ))
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        let rows = self.frame.len() / (self.width * 4).max(1);
        if x < self.width && y < self.height.min(rows) {
            Some((y * self.width + x) * 4)
        } else {
            None
        }
    }

    /// Alpha-blends `color` over the pixel at (x, y).
    pub fn blend(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let src = [color.r as f32, color.g as f32, color.b as f32];
        for (channel, value) in src.iter().enumerate() {
            let dst = self.frame[idx + channel] as f32;
            self.frame[idx + channel] = (value * a + dst * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = 0xff;
    }

    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, thickness: f32, color: Color) {
        self.stroke(x0, y0, x1, y1, thickness, color, false);
    }

    /// Line that narrows from full thickness at (x0, y0) to a point at (x1, y1).
    pub fn tapered_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        color: Color,
    ) {
        self.stroke(x0, y0, x1, y1, thickness, color, true);
    }

    #[allow(clippy::too_many_arguments)]
    fn stroke(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        color: Color,
        tapered: bool,
    ) {
        let pad = thickness.ceil() as i32 + 1;
        let dx = (x1 - x0) as f32;
        let dy = (y1 - y0) as f32;
        let len_sq = dx * dx + dy * dy;
        for y in (y0.min(y1) - pad)..=(y0.max(y1) + pad) {
            for x in (x0.min(x1) - pad)..=(x0.max(x1) + pad) {
                let px = (x - x0) as f32;
                let py = (y - y0) as f32;
                let t = if len_sq > 0.0 {
                    ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let lx = x0 as f32 + t * dx;
                let ly = y0 as f32 + t * dy;
                let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
                // 0.05 keeps the tip from vanishing
                let local = if tapered {
                    thickness * (1.0 - t * 0.95)
                } else {
                    thickness
                };
                let aa = (1.0 - (dist - local / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
                if aa > 0.01 {
                    self.blend(x, y, color, aa);
                }
            }
        }
    }

    /// Filled circle with an anti-aliased rim.
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color, alpha: f32) {
        for y in -radius - 1..=radius + 1 {
            for x in -radius - 1..=radius + 1 {
                let dist = ((x * x + y * y) as f64).sqrt();
                let aa = if dist > radius as f64 {
                    1.0 - (dist - radius as f64).min(1.0)
                } else {
                    1.0
                };
                if aa > 0.0 {
                    self.blend(cx + x, cy + y, color, aa as f32 * alpha);
                }
            }
        }
    }

    /// Ring segment of outer radius `r`, starting at `start_angle` and sweeping `span`
    /// radians clockwise (screen coordinates).
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        cx: i32,
        cy: i32,
        r: i32,
        thickness: i32,
        start_angle: f64,
        span: f64,
        color: Color,
    ) {
        let start = start_angle.rem_euclid(2.0 * PI);
        let end = (start_angle + span).rem_euclid(2.0 * PI);
        let full = span >= 2.0 * PI;
        let inner = (r - thickness) as f64;
        for y in (cy - r - 1)..=(cy + r + 1) {
            for x in (cx - r - 1)..=(cx + r + 1) {
                let dx = (x - cx) as f64;
                let dy = (y - cy) as f64;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < inner - 1.0 || dist > r as f64 + 1.0 {
                    continue;
                }
                let angle = dy.atan2(dx).rem_euclid(2.0 * PI);
                let in_arc = full
                    || if start < end {
                        angle >= start && angle <= end
                    } else {
                        angle >= start || angle <= end
                    };
                if !in_arc {
                    continue;
                }
                let aa = if dist > r as f64 {
                    1.0 - (dist - r as f64).min(1.0)
                } else if dist < inner {
                    1.0 - (inner - dist).min(1.0)
                } else {
                    1.0
                };
                if aa > 0.0 {
                    self.blend(x, y, color, aa as f32);
                }
            }
        }
    }

    /// Width in pixels of `text` at `size`, or 0 without a font.
    pub fn text_width(&self, text: &str, size: f32) -> i32 {
        let Some(font) = self.font else {
            return 0;
        };
        let glyphs: Vec<PositionedGlyph> = font
            .layout(text, Scale::uniform(size), point(0.0, 0.0))
            .collect();
        let (min_x, max_x) = glyphs
            .iter()
            .filter_map(|g| g.pixel_bounding_box())
            .fold((i32::MAX, i32::MIN), |(min_x, max_x), bb| {
                (min_x.min(bb.min.x), max_x.max(bb.max.x))
            });
        if min_x < max_x {
            max_x - min_x
        } else {
            0
        }
    }

    /// Draws `text` vertically centred on `y`; `align` decides whether `x` is the left
    /// edge or the centre of the run.
    pub fn text(&mut self, x: i32, y: i32, text: &str, size: f32, color: Color, align: Align) {
        let Some(font) = self.font else {
            return;
        };
        let scale = Scale::uniform(size);
        let v_metrics = font.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> = font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .collect();

        let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
            (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
            |(min_x, max_x, min_y, max_y), bb| {
                (
                    min_x.min(bb.min.x),
                    max_x.max(bb.max.x),
                    min_y.min(bb.min.y),
                    max_y.max(bb.max.y),
                )
            },
        );
        if min_x >= max_x || min_y >= max_y {
            return;
        }
        let offset_x = match align {
            Align::Left => x,
            Align::Center => x - (max_x - min_x) / 2,
        };
        let offset_y = y - (max_y - min_y) / 2;

        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    let px = offset_x + gx as i32 + bb.min.x - min_x;
                    let py = offset_y + gy as i32 + bb.min.y - min_y;
                    self.blend(px, py, color, v);
                });
            }
        }
    }
}

/// Loads the panel font from `path`, or from the first usable system font.
///
/// Only an explicit `path` that cannot be loaded is an error. Without one, a missing system
/// font leaves the panel without text.
pub fn load_font(path: Option<&Path>) -> Result<Option<Font<'static>>, PanelError> {
    if let Some(path) = path {
        return first_loadable(&[path.to_path_buf()])
            .map(Some)
            .ok_or_else(|| PanelError::Font(format!("cannot load {}", path.display())));
    }

    let candidates: Vec<PathBuf> = FONT_CANDIDATES.iter().map(PathBuf::from).collect();
    let font = first_loadable(&candidates);
    if font.is_none() {
        warn!("No usable system font found, labels are not drawn; pass --font");
    }
    Ok(font)
}

fn first_loadable(candidates: &[PathBuf]) -> Option<Font<'static>> {
    for candidate in candidates {
        let Ok(bytes) = std::fs::read(candidate) else {
            continue;
        };
        if let Some(font) = Font::try_from_vec(bytes) {
            debug!("Loaded font {}", candidate.display());
            return Some(font);
        }
        debug!("{} is not a usable font", candidate.display());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: usize, height: usize) -> Vec<u8> {
        vec![0; width * height * 4]
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut buf = frame(4, 3);
        let mut canvas = Canvas::new(&mut buf, 4, 3);
        canvas.clear(Color::new(1, 2, 3));
        assert_eq!(canvas.pixel(0, 0), Some(Color::new(1, 2, 3)));
        assert_eq!(canvas.pixel(3, 2), Some(Color::new(1, 2, 3)));
        assert_eq!(canvas.pixel(4, 0), None);
        assert_eq!(canvas.pixel(-1, 0), None);
    }

    #[test]
    fn blend_mixes_with_background() {
        let mut buf = frame(2, 2);
        let mut canvas = Canvas::new(&mut buf, 2, 2);
        canvas.clear(Color::BLACK);
        canvas.blend(1, 1, Color::new(200, 100, 0), 0.5);
        assert_eq!(canvas.pixel(1, 1), Some(Color::new(100, 50, 0)));
        // clipped writes are ignored
        canvas.blend(5, 5, Color::WHITE, 1.0);
    }

    #[test]
    fn line_covers_its_endpoints() {
        let mut buf = frame(20, 20);
        let mut canvas = Canvas::new(&mut buf, 20, 20);
        canvas.clear(Color::BLACK);
        canvas.line(2, 10, 17, 10, 2.0, Color::WHITE);
        assert_eq!(canvas.pixel(2, 10), Some(Color::WHITE));
        assert_eq!(canvas.pixel(10, 10), Some(Color::WHITE));
        assert_eq!(canvas.pixel(10, 2), Some(Color::BLACK));
    }

    #[test]
    fn degenerate_line_draws_a_dot() {
        let mut buf = frame(10, 10);
        let mut canvas = Canvas::new(&mut buf, 10, 10);
        canvas.clear(Color::BLACK);
        canvas.line(5, 5, 5, 5, 3.0, Color::WHITE);
        assert_eq!(canvas.pixel(5, 5), Some(Color::WHITE));
    }

    #[test]
    fn arc_only_paints_inside_its_sweep() {
        let mut buf = frame(40, 40);
        let mut canvas = Canvas::new(&mut buf, 40, 40);
        canvas.clear(Color::BLACK);
        // right half of the ring: from -90 degrees through 0 to +90 degrees
        canvas.arc(20, 20, 15, 3, -PI / 2.0, PI, Color::WHITE);
        assert_eq!(canvas.pixel(34, 20), Some(Color::WHITE));
        assert_eq!(canvas.pixel(6, 20), Some(Color::BLACK));
        assert_eq!(canvas.pixel(20, 20), Some(Color::BLACK));
    }

    #[test]
    fn text_without_font_is_a_no_op() {
        let mut buf = frame(10, 10);
        let mut canvas = Canvas::new(&mut buf, 10, 10);
        canvas.clear(Color::BLACK);
        canvas.text(5, 5, "hello", 12.0, Color::WHITE, Align::Left);
        assert_eq!(canvas.text_width("hello", 12.0), 0);
        assert_eq!(canvas.pixel(5, 5), Some(Color::BLACK));
    }

    #[test]
    fn unusable_candidates_leave_no_font() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not-a-font.ttf");
        std::fs::write(&bogus, b"plain text").unwrap();
        assert!(first_loadable(&[dir.path().join("missing.ttf"), bogus]).is_none());
    }

    #[test]
    fn system_font_lookup_never_fails() {
        assert!(load_font(None).is_ok());
    }

    #[test]
    fn missing_font_path_is_an_error() {
        let err = load_font(Some(Path::new("/definitely/not/a/font.ttf"))).unwrap_err();
        assert!(matches!(err, PanelError::Font(_)));
    }
}
