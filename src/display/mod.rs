use std::fmt;

use crate::frame::DisplayFrame;

pub mod framebuffer;

pub trait Display {
    type Err: fmt::Debug + fmt::Display;

    /// Initialize the display.
    fn on(&mut self) -> Result<(), Self::Err>;

    /// Blank the display and release it.
    fn off(&mut self) -> Result<(), Self::Err>;

    /// Get the dimensions of the display in pixels (width, height).
    fn get_dimensions(&self) -> (usize, usize);

    /// Show a frame. The frame must match the display dimensions.
    fn draw(&mut self, frame: &DisplayFrame) -> Result<(), Self::Err>;
}
