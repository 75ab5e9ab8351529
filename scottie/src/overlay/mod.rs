//! Burns the callsign banner and the telemetry line into the top rows of a
//! raster before it is transmitted.
//!
//! The header is two bands of full-width scanlines. Both bands are cleared to
//! white first and glyph bits are then drawn in black, so drawing the same text
//! twice gives the same bytes.

pub mod banner;
pub mod telemetry;

use std::io::{
    Seek,
    SeekFrom,
    Write,
};

use crate::raster::{
    BYTES_PER_PIXEL,
    Raster,
};

pub const BACKGROUND: [u8; 3] = [0xff, 0xff, 0xff];
pub const INK: [u8; 3] = [0x00, 0x00, 0x00];

pub const BANNER_MAX_CHARS: usize = 12;
pub const BANNER_ROWS: usize = 16;
pub const TELEMETRY_MAX_CHARS: usize = 51;
pub const TELEMETRY_ROWS: usize = 11;
pub const HEADER_ROWS: usize = BANNER_ROWS + TELEMETRY_ROWS;

/// Where a line of text goes inside its band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextLayout {
    pub left: usize,
    pub top: usize,
    pub advance: usize,
}

impl TextLayout {
    pub const BANNER: Self = Self {
        left: 8,
        top: (BANNER_ROWS - banner::GLYPH_HEIGHT) / 2,
        advance: banner::GLYPH_WIDTH,
    };

    pub const TELEMETRY: Self = Self {
        left: 4,
        top: (TELEMETRY_ROWS - telemetry::GLYPH_HEIGHT) / 2,
        advance: telemetry::GLYPH_WIDTH + 2,
    };

    /// Leftmost column of the `index`-th character.
    #[inline]
    pub fn column(&self, index: usize) -> usize {
        self.left + index * self.advance
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderRasterizer<'a> {
    banner: &'a str,
    telemetry: &'a str,
}

impl<'a> HeaderRasterizer<'a> {
    /// Text beyond [`BANNER_MAX_CHARS`] and [`TELEMETRY_MAX_CHARS`] is
    /// dropped.
    pub fn new(banner: &'a str, telemetry: &'a str) -> Self {
        let banner = truncate(banner, BANNER_MAX_CHARS);
        let telemetry = truncate(telemetry, TELEMETRY_MAX_CHARS);
        Self { banner, telemetry }
    }

    #[inline]
    pub fn banner(&self) -> &'a str {
        self.banner
    }

    #[inline]
    pub fn telemetry(&self) -> &'a str {
        self.telemetry
    }

    /// Number of bytes the header occupies at the start of a raster `width`
    /// pixels wide.
    #[inline]
    pub fn header_bytes(width: usize) -> usize {
        HEADER_ROWS * width * BYTES_PER_PIXEL
    }

    /// Draws both bands into `rows`, the first [`HEADER_ROWS`] scanlines of a
    /// raster in storage layout.
    pub fn draw(&self, rows: &mut [u8], width: usize) {
        let banner_bytes = BANNER_ROWS * width * BYTES_PER_PIXEL;
        let (banner_band, rest) = rows[..Self::header_bytes(width)].split_at_mut(banner_bytes);

        draw_band(
            bytemuck::cast_slice_mut(banner_band),
            width,
            TextLayout::BANNER,
            self.banner,
            |c| {
                banner::glyph(c)
                    .or_else(|| banner::glyph(' '))
                    .map_or([0; banner::GLYPH_HEIGHT], |glyph| *glyph)
            },
            banner::GLYPH_WIDTH,
        );

        draw_band(
            bytemuck::cast_slice_mut(rest),
            width,
            TextLayout::TELEMETRY,
            self.telemetry,
            |c| telemetry::glyph(c).or_else(|| telemetry::glyph(' ')).unwrap_or_default(),
            telemetry::GLYPH_WIDTH,
        );
    }

    pub fn draw_raster(&self, raster: &mut Raster) {
        assert!(raster.height() >= HEADER_ROWS);
        let width = raster.width();
        self.draw(raster.as_bytes_mut(), width);
    }

    /// Burns the header into a raster file in place. Only the header bands are
    /// written; the rest of the stream is left untouched.
    pub fn draw_stream<S>(&self, mut stream: S, width: usize) -> std::io::Result<()>
    where
        S: Write + Seek,
    {
        let mut rows = vec![0; Self::header_bytes(width)];
        self.draw(&mut rows, width);

        stream.seek(SeekFrom::Start(0))?;
        stream.write_all(&rows)?;
        stream.flush()?;
        tracing::debug!(banner = self.banner, telemetry = self.telemetry, "header written");
        Ok(())
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => {
            tracing::debug!(text, max_chars, "truncating header text");
            &text[..end]
        }
        None => text,
    }
}

/// Clears `band` to the background and draws `text` into it. `glyph` returns
/// the rows of a character with bit `glyph_width - 1` as the leftmost column.
fn draw_band<const H: usize>(
    band: &mut [[u8; 3]],
    width: usize,
    layout: TextLayout,
    text: &str,
    glyph: impl Fn(char) -> [u8; H],
    glyph_width: usize,
) {
    band.fill(BACKGROUND);

    let height = band.len() / width;
    for (index, c) in text.chars().enumerate() {
        let left = layout.column(index);
        let rows = glyph(c);

        for (row, bits) in rows.iter().enumerate() {
            let y = layout.top + row;
            if y >= height {
                break;
            }

            for column in 0..glyph_width {
                let x = left + column;
                if x < width && bits & (1 << (glyph_width - 1 - column)) != 0 {
                    band[y * width + x] = INK;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const WIDTH: usize = 320;

    fn header(banner: &str, telemetry: &str) -> Raster {
        let mut raster = Raster::from_fn(WIDTH, 256, |x, y| [x as u8, y as u8, 0x42]);
        HeaderRasterizer::new(banner, telemetry).draw_raster(&mut raster);
        raster
    }

    #[test]
    fn banner_reproduces_glyph_bitmaps() {
        let text = "N0CALL-11 /X";
        assert_eq!(text.len(), BANNER_MAX_CHARS);
        let raster = header(text, "");

        for (index, c) in text.chars().enumerate() {
            let expected = banner::glyph(c).unwrap();
            let left = TextLayout::BANNER.column(index);

            for row in 0..banner::GLYPH_HEIGHT {
                let mut bits = 0u8;
                for column in 0..banner::GLYPH_WIDTH {
                    let pixel = raster.pixel(left + column, TextLayout::BANNER.top + row);
                    assert!(pixel == INK || pixel == BACKGROUND, "{pixel:?}");
                    if pixel == INK {
                        bits |= 0x80 >> column;
                    }
                }
                assert_eq!(bits, expected[row], "{c:?} row {row}");
            }
        }
    }

    #[test]
    fn telemetry_reproduces_glyph_bitmaps() {
        let text = "LAT: 48.1173N LONG: 11.5167W ALT:545";
        let raster = header("", text);

        for (index, c) in text.chars().enumerate() {
            let expected = telemetry::glyph(c).unwrap();
            let left = TextLayout::TELEMETRY.column(index);

            for row in 0..telemetry::GLYPH_HEIGHT {
                let y = BANNER_ROWS + TextLayout::TELEMETRY.top + row;
                let bits = (0..telemetry::GLYPH_WIDTH)
                    .filter(|column| raster.pixel(left + column, y) == INK)
                    .fold(0u8, |bits, column| bits | (0x08 >> column));
                assert_eq!(bits, expected[row], "{c:?} row {row}");
            }
        }
    }

    #[test]
    fn header_region_is_fully_initialized() {
        let raster = header("", "");
        assert!(
            raster.as_bytes()[..HeaderRasterizer::header_bytes(WIDTH)]
                .iter()
                .all(|byte| *byte == 0xff)
        );
        // the image below the header is untouched
        assert_eq!(raster.pixel(7, HEADER_ROWS), [7, HEADER_ROWS as u8, 0x42]);
    }

    #[test]
    fn band_sizes() {
        assert_eq!(BANNER_ROWS * WIDTH * BYTES_PER_PIXEL, 15360);
        assert_eq!(TELEMETRY_ROWS * WIDTH * BYTES_PER_PIXEL, 10560);
        assert!(TextLayout::TELEMETRY.column(TELEMETRY_MAX_CHARS) <= WIDTH);
        assert!(TextLayout::BANNER.column(BANNER_MAX_CHARS) <= WIDTH);
    }

    #[test]
    fn unmapped_characters_render_as_space() {
        let with_unmapped = header("A~B", "x|y");
        let with_space = header("A B", "     ");
        assert_eq!(
            with_unmapped.as_bytes()[..HeaderRasterizer::header_bytes(WIDTH)],
            with_space.as_bytes()[..HeaderRasterizer::header_bytes(WIDTH)]
        );
    }

    #[test]
    fn drawing_is_idempotent() {
        let mut raster = header("DL0ABC", "ALT:1234");
        let once = raster.clone();
        HeaderRasterizer::new("DL0ABC", "ALT:1234").draw_raster(&mut raster);
        assert_eq!(raster, once);

        // stale text from a longer banner does not survive a redraw
        let mut raster = header("DL0ABCDEFGHI", "");
        HeaderRasterizer::new("DL0ABC", "ALT:1234").draw_raster(&mut raster);
        assert_eq!(raster, once);
    }

    #[test]
    fn long_text_is_truncated() {
        let digits = "9".repeat(60);
        let rasterizer = HeaderRasterizer::new("ABCDEFGHIJKLMNOP", &digits);
        assert_eq!(rasterizer.banner(), "ABCDEFGHIJKL");
        assert_eq!(rasterizer.telemetry().len(), TELEMETRY_MAX_CHARS);
    }

    #[test]
    fn stream_overlay_only_touches_header() {
        let raster = Raster::from_fn(WIDTH, 256, |_, y| [y as u8; 3]);
        let mut stream = Cursor::new(Vec::new());
        raster.write_to(&mut stream).unwrap();

        HeaderRasterizer::new("K1ABC", "LAT: 1N").draw_stream(&mut stream, WIDTH).unwrap();

        let mut expected = raster.clone();
        HeaderRasterizer::new("K1ABC", "LAT: 1N").draw_raster(&mut expected);
        assert_eq!(stream.into_inner(), expected.as_bytes());
    }
}
