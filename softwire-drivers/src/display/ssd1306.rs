//! SSD1306 OLED display driver
//!
//! Driver for 128x32 SSD1306 panels. Drawing happens in a local frame
//! buffer laid out the way the controller's horizontal addressing mode
//! expects it (4 pages of 128 columns, one bit per pixel, LSB at the top),
//! so [`Ssd1306::flush`] is a single data-stream write.
//!
//! The controller has no real registers: the byte after the address
//! selects whether the rest of the write is a command stream or pixel data.

use embedded_hal::delay::DelayNs;
use softwire_core::config::DEFAULT_DISPLAY_ADDRESS;
use softwire_hal::{Address, RegisterAddress, RegisterBus};

use super::font::Font;
use super::image::Image;

/// Display width in pixels
pub const WIDTH: usize = 128;
/// Display height in pixels
pub const HEIGHT: usize = 32;
/// Number of 8-pixel pages
pub const PAGES: usize = HEIGHT / 8;
/// Frame buffer size in bytes
pub const BUFFER_SIZE: usize = WIDTH * PAGES;

/// Time the panel needs after power-up before it accepts commands
pub const POWER_UP_MS: u32 = 500;

/// Control byte: the following bytes are commands
const COMMAND_STREAM: u8 = 0x00;
/// Control byte: the following bytes are display data
const DATA_STREAM: u8 = 0x40;

/// SSD1306 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const RESUME_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
}

/// Power-up command sequence for a 128x32 panel
const INIT_COMMANDS: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_MUX_RATIO,
    (HEIGHT - 1) as u8,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14, // Enable charge pump
    cmd::SET_MEMORY_MODE,
    0x00, // Horizontal addressing
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x02, // Sequential COM, 32 rows
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::DEACTIVATE_SCROLL,
    cmd::RESUME_RAM,
    cmd::SET_NORMAL,
];

/// Pixel color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    /// Pixel off
    Black,
    /// Pixel on
    White,
}

impl Color {
    fn invert(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// SSD1306 client with a local frame buffer
pub struct Ssd1306 {
    address: Address,
    buffer: [u8; BUFFER_SIZE],
    cursor_x: i32,
    cursor_y: i32,
    inverted: bool,
}

impl Default for Ssd1306 {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_ADDRESS)
    }
}

impl Ssd1306 {
    /// Create a client for the display at `address`
    pub const fn new(address: Address) -> Self {
        Self {
            address,
            buffer: [0; BUFFER_SIZE],
            cursor_x: 0,
            cursor_y: 0,
            inverted: false,
        }
    }

    /// Device address
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Frame buffer contents
    pub fn buffer(&self) -> &[u8; BUFFER_SIZE] {
        &self.buffer
    }

    /// Text cursor position
    pub fn cursor(&self) -> (i32, i32) {
        (self.cursor_x, self.cursor_y)
    }

    /// Whether colors are currently inverted
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Wait for the panel to power up, configure it, switch it on and show
    /// a blank screen
    pub fn init<B: RegisterBus>(
        &mut self,
        bus: &mut B,
        delay: &mut impl DelayNs,
    ) -> Result<(), B::Error> {
        delay.delay_ms(POWER_UP_MS);
        for &c in INIT_COMMANDS {
            self.command(bus, c)?;
        }
        self.command(bus, cmd::DISPLAY_ON)?;

        self.fill(Color::Black);
        self.flush(bus)?;
        self.goto(0, 0);
        Ok(())
    }

    /// Send one command byte
    fn command<B: RegisterBus>(&self, bus: &mut B, c: u8) -> Result<(), B::Error> {
        bus.write_register(self.address, RegisterAddress::Byte(COMMAND_STREAM), &[c])
    }

    /// Push the whole frame buffer to the panel
    pub fn flush<B: RegisterBus>(&self, bus: &mut B) -> Result<(), B::Error> {
        bus.write_register(
            self.address,
            RegisterAddress::Byte(DATA_STREAM),
            &self.buffer,
        )
    }

    /// Set every pixel to `color`
    pub fn fill(&mut self, color: Color) {
        let color = self.effective(color);
        let byte = match color {
            Color::Black => 0x00,
            Color::White => 0xFF,
        };
        self.buffer.fill(byte);
    }

    /// Invert the buffer and every later drawing operation
    pub fn toggle_invert(&mut self) {
        self.inverted = !self.inverted;
        for byte in self.buffer.iter_mut() {
            *byte = !*byte;
        }
    }

    fn effective(&self, color: Color) -> Color {
        if self.inverted {
            color.invert()
        } else {
            color
        }
    }

    /// Set one pixel; coordinates off the panel are ignored
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let index = x + (y / 8) * WIDTH;
        let mask = 1u8 << (y % 8);
        match self.effective(color) {
            Color::White => self.buffer[index] |= mask,
            Color::Black => self.buffer[index] &= !mask,
        }
    }

    /// Pixel state as it will appear on the panel
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        Some(self.buffer[x + (y / 8) * WIDTH] & (1 << (y % 8)) != 0)
    }

    /// Move the text cursor (top-left corner of the next glyph)
    pub fn goto(&mut self, x: i32, y: i32) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    /// Draw one character at the cursor and advance it
    ///
    /// The glyph cell is painted in full: set bits in `color`, the rest in
    /// the opposite color.
    pub fn put_char(&mut self, ch: char, font: &Font, color: Color) {
        for col in 0..font.width() {
            for row in 0..font.height() {
                let c = if font.is_set(ch, col, row) {
                    color
                } else {
                    color.invert()
                };
                self.draw_pixel(self.cursor_x + col as i32, self.cursor_y + row as i32, c);
            }
        }
        self.cursor_x += font.width() as i32;
    }

    /// Draw a string at the cursor
    pub fn put_str(&mut self, text: &str, font: &Font, color: Color) {
        for ch in text.chars() {
            self.put_char(ch, font, color);
        }
    }

    /// Draw one frame of `image` with its top-left corner at (`x`, `y`)
    ///
    /// Both set and clear image pixels are drawn. A frame the image does
    /// not have draws nothing.
    pub fn draw_image(&mut self, image: &Image<'_>, frame: u8, x: i32, y: i32) {
        for row in 0..image.height() {
            for col in 0..image.width() {
                let Some(on) = image.pixel(frame, col, row) else {
                    return;
                };
                let color = if on { Color::White } else { Color::Black };
                self.draw_pixel(x + col as i32, y + row as i32, color);
            }
        }
    }

    /// Draw a straight line, clamping both ends to the panel
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let clamp_x = |x: i32| x.clamp(0, WIDTH as i32 - 1);
        let clamp_y = |y: i32| y.clamp(0, HEIGHT as i32 - 1);
        let (mut x, mut y) = (clamp_x(x0), clamp_y(y0));
        let (x1, y1) = (clamp_x(x1), clamp_y(y1));

        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.draw_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw a circle outline centred on (`x0`, `y0`)
    ///
    /// Parts outside the panel are clipped.
    pub fn draw_circle(&mut self, x0: i32, y0: i32, r: i32, color: Color) {
        let mut f = 1 - r;
        let mut ddf_x = 1;
        let mut ddf_y = -2 * r;
        let mut x = 0;
        let mut y = r;

        self.draw_pixel(x0, y0 + r, color);
        self.draw_pixel(x0, y0 - r, color);
        self.draw_pixel(x0 + r, y0, color);
        self.draw_pixel(x0 - r, y0, color);

        while x < y {
            if f >= 0 {
                y -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x += 1;
            ddf_x += 2;
            f += ddf_x;

            for (px, py) in [(x, y), (y, x)] {
                self.draw_pixel(x0 + px, y0 + py, color);
                self.draw_pixel(x0 - px, y0 + py, color);
                self.draw_pixel(x0 + px, y0 - py, color);
                self.draw_pixel(x0 - px, y0 - py, color);
            }
        }
    }

    /// Switch the panel (and its charge pump) on or off
    pub fn set_display_on<B: RegisterBus>(&self, bus: &mut B, on: bool) -> Result<(), B::Error> {
        let (pump, display) = if on {
            (0x14, cmd::DISPLAY_ON)
        } else {
            (0x10, cmd::DISPLAY_OFF)
        };
        self.command(bus, cmd::SET_CHARGE_PUMP)?;
        self.command(bus, pump)?;
        self.command(bus, display)
    }

    /// Let the controller invert the panel output
    ///
    /// Unlike [`toggle_invert`](Self::toggle_invert) the frame buffer is
    /// left untouched.
    pub fn set_hardware_invert<B: RegisterBus>(
        &self,
        bus: &mut B,
        inverted: bool,
    ) -> Result<(), B::Error> {
        let c = if inverted {
            cmd::SET_INVERSE
        } else {
            cmd::SET_NORMAL
        };
        self.command(bus, c)
    }

    /// Set display contrast (0-255)
    pub fn set_contrast<B: RegisterBus>(&self, bus: &mut B, contrast: u8) -> Result<(), B::Error> {
        self.command(bus, cmd::SET_CONTRAST)?;
        self.command(bus, contrast)
    }
}
