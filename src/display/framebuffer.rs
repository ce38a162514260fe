use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::Display;
use crate::error::DisplayError;
use crate::frame::DisplayFrame;

/// A Linux framebuffer device in 32 bits per pixel (BGRX) mode, e.g. `/dev/fb0`.
pub struct Framebuffer {
    path: PathBuf,
    device: Option<File>,
    width: usize,
    height: usize,
    buffer: Vec<u8>,
}

impl Framebuffer {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_dimensions(path, DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }

    pub fn with_dimensions(path: impl AsRef<Path>, width: usize, height: usize) -> Self {
        Self {
            path: path.as_ref().to_owned(),
            device: None,
            width,
            height,
            buffer: Vec::with_capacity(width * height * 4),
        }
    }

    fn write(&mut self) -> Result<(), DisplayError> {
        let device = self.device.as_mut().ok_or(DisplayError::Off)?;
        device.seek(SeekFrom::Start(0))?;
        device.write_all(&self.buffer[..])?;
        device.flush()?;
        Ok(())
    }
}

impl Display for Framebuffer {
    type Err = DisplayError;

    fn on(&mut self) -> Result<(), Self::Err> {
        let device = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|source| DisplayError::Open {
                path: self.path.clone(),
                source,
            })?;
        self.device = Some(device);
        Ok(())
    }

    fn off(&mut self) -> Result<(), Self::Err> {
        if self.device.is_none() {
            return Ok(());
        }

        self.buffer.clear();
        self.buffer.resize(self.width * self.height * 4, 0x00);
        let result = self.write();
        self.device = None;
        result
    }

    fn get_dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn draw(&mut self, frame: &DisplayFrame) -> Result<(), Self::Err> {
        let bitmap = frame.bitmap();
        if (bitmap.width(), bitmap.height()) != (self.width, self.height) {
            return Err(DisplayError::Size {
                width: bitmap.width(),
                height: bitmap.height(),
                display_width: self.width,
                display_height: self.height,
            });
        }

        // Frames are opaque, so premultiplied RGBA only needs its channels swapped.
        self.buffer.clear();
        self.buffer.extend(
            bitmap
                .pixels()
                .chunks_exact(4)
                .flat_map(|pixel| [pixel[2], pixel[1], pixel[0], 0xFF]),
        );
        self.write()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame::Bitmap;

    fn scratch(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("kiosk-fb-{}-{}", name, std::process::id()));
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn test_draw_writes_bgrx() {
        let path = scratch("draw");
        let mut framebuffer = Framebuffer::with_dimensions(&path, 2, 1);
        let frame = DisplayFrame::from(Bitmap::new(
            2,
            1,
            vec![0x10, 0x20, 0x30, 0xFF, 0x40, 0x50, 0x60, 0xFF],
        ));

        framebuffer.on().unwrap();
        framebuffer.draw(&frame).unwrap();
        framebuffer.draw(&frame).unwrap();

        assert_eq!(
            std::fs::read(&path).unwrap(),
            vec![0x30, 0x20, 0x10, 0xFF, 0x60, 0x50, 0x40, 0xFF]
        );

        framebuffer.off().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0x00; 8]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_draw_requires_on() {
        let mut framebuffer = Framebuffer::with_dimensions("/nonexistent/fb", 1, 1);
        let frame = DisplayFrame::from(Bitmap::filled(1, 1, [0, 0, 0, 0xFF]));

        assert!(matches!(framebuffer.draw(&frame), Err(DisplayError::Off)));
        assert!(matches!(
            framebuffer.on(),
            Err(DisplayError::Open { .. })
        ));
    }

    #[test]
    fn test_draw_rejects_wrong_size() {
        let path = scratch("size");
        let mut framebuffer = Framebuffer::with_dimensions(&path, 2, 2);
        framebuffer.on().unwrap();

        let frame = DisplayFrame::from(Bitmap::filled(1, 1, [0, 0, 0, 0xFF]));
        assert!(matches!(
            framebuffer.draw(&frame),
            Err(DisplayError::Size { width: 1, height: 1, .. })
        ));
        std::fs::remove_file(&path).unwrap();
    }
}
