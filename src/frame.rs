use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::config::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::error::{BitmapError, StartupError};

/// An RGBA image with premultiplied alpha, row-major, four bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Panics if `pixels` does not hold exactly `width * height` RGBA pixels.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Self {
        assert_eq!(pixels.len(), width * height * 4, "bitmap size mismatch");
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        Self::new(width, height, rgba.repeat(width * height))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels[..]
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * 4;
        let mut pixel = [0; 4];
        pixel.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(pixel)
    }

    /// Decode a PNG into a premultiplied RGBA bitmap.
    pub fn from_png(reader: impl Read) -> Result<Self, BitmapError> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info()?;
        let mut buffer = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buffer)?;
        let data = &buffer[..info.buffer_size()];

        let pixels: Vec<u8> = match info.color_type {
            png::ColorType::Rgba => data
                .chunks_exact(4)
                .flat_map(|p| premultiply(p[0], p[1], p[2], p[3]))
                .collect(),
            png::ColorType::Rgb => data
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 0xFF])
                .collect(),
            png::ColorType::GrayscaleAlpha => data
                .chunks_exact(2)
                .flat_map(|p| premultiply(p[0], p[0], p[0], p[1]))
                .collect(),
            png::ColorType::Grayscale => data.iter().flat_map(|&g| [g, g, g, 0xFF]).collect(),
            color_type => return Err(BitmapError::ColorType(color_type)),
        };

        Ok(Self::new(info.width as usize, info.height as usize, pixels))
    }
}

fn premultiply(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
    [scale(r), scale(g), scale(b), a]
}

/// Background plus every data overlay. Published as a whole and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfoFrame(Bitmap);

impl InfoFrame {
    pub fn bitmap(&self) -> &Bitmap {
        &self.0
    }
}

impl From<Bitmap> for InfoFrame {
    fn from(bitmap: Bitmap) -> Self {
        Self(bitmap)
    }
}

/// An info frame with the clock stamped on. One per tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayFrame(Bitmap);

impl DisplayFrame {
    pub fn bitmap(&self) -> &Bitmap {
        &self.0
    }
}

impl From<Bitmap> for DisplayFrame {
    fn from(bitmap: Bitmap) -> Self {
        Self(bitmap)
    }
}

/// Load the kiosk background. It has to match the display resolution exactly.
pub fn load_background(path: &Path) -> Result<Bitmap, StartupError> {
    let load = || -> Result<Bitmap, BitmapError> {
        let bitmap = Bitmap::from_png(BufReader::new(File::open(path)?))?;
        if (bitmap.width(), bitmap.height()) != (DISPLAY_WIDTH, DISPLAY_HEIGHT) {
            return Err(BitmapError::Size {
                width: bitmap.width(),
                height: bitmap.height(),
                expected_width: DISPLAY_WIDTH,
                expected_height: DISPLAY_HEIGHT,
            });
        }
        Ok(bitmap)
    };

    load().map_err(|source| StartupError::Background {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn encode(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
            writer.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn test_rgb_png_is_opaque() {
        let png = encode(2, 1, png::ColorType::Rgb, &[10, 20, 30, 40, 50, 60]);
        let bitmap = Bitmap::from_png(&png[..]).unwrap();

        assert_eq!((bitmap.width(), bitmap.height()), (2, 1));
        assert_eq!(bitmap.pixel(0, 0), Some([10, 20, 30, 0xFF]));
        assert_eq!(bitmap.pixel(1, 0), Some([40, 50, 60, 0xFF]));
        assert_eq!(bitmap.pixel(2, 0), None);
    }

    #[test]
    fn test_rgba_png_is_premultiplied() {
        let png = encode(1, 1, png::ColorType::Rgba, &[200, 100, 0, 128]);
        let bitmap = Bitmap::from_png(&png[..]).unwrap();

        assert_eq!(bitmap.pixel(0, 0), Some([100, 50, 0, 128]));
    }

    #[test]
    fn test_background_must_match_display() {
        let dir = std::env::temp_dir().join(format!("kiosk-frame-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("small.png");
        std::fs::write(&path, encode(1, 1, png::ColorType::Grayscale, &[0])).unwrap();

        let err = load_background(&path).unwrap_err();
        assert!(matches!(
            err,
            StartupError::Background {
                source: BitmapError::Size { width: 1, height: 1, .. },
                ..
            }
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_background_is_fatal() {
        let err = load_background(Path::new("/nonexistent/news.png")).unwrap_err();
        assert!(matches!(
            err,
            StartupError::Background {
                source: BitmapError::Io(_),
                ..
            }
        ));
    }
}
