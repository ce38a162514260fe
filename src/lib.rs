pub mod config;
pub mod display;
pub mod dust;
pub mod error;
pub mod frame;
pub mod image;
pub mod input;
pub mod kiosk;
pub mod layout;
pub mod logging;
pub mod news;
pub mod render;
pub mod scheduler;
pub mod sources;
pub mod weather;

pub use kiosk::Kiosk;
