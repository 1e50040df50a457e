//! Displays

pub mod font;
pub mod image;
pub mod ssd1306;

pub use font::{Font, FONT_12X16, FONT_6X8};
pub use image::{Image, ImageError};
pub use ssd1306::{Color, Ssd1306};
