//! Bitmap fonts
//!
//! Printable ASCII (0x20..=0x7F) in column-major bitmaps: each glyph
//! column is `ceil(height / 8)` bytes, top page first, with the least
//! significant bit at the top. The last column of every glyph is blank
//! spacing.
//!
//! Two fonts are provided: [`FONT_6X8`] for small text and [`FONT_12X16`]
//! (the same glyphs at twice the size) for the headline readout.

/// First character in every table
const FIRST_CHAR: u32 = 0x20;

/// Glyphs per table (0x20..=0x7F)
const GLYPH_COUNT: usize = 96;

/// Bitmap font descriptor
#[derive(Debug, Clone, Copy)]
pub struct Font {
    width: u8,
    height: u8,
    data: &'static [u8],
}

impl Font {
    /// Glyph cell width in pixels, including spacing
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Glyph cell height in pixels
    pub const fn height(&self) -> u8 {
        self.height
    }

    const fn column_bytes(&self) -> usize {
        (self.height as usize).div_ceil(8)
    }

    /// Whether pixel (`col`, `row`) of the glyph for `ch` is set
    ///
    /// Characters outside printable ASCII render as a space.
    pub fn is_set(&self, ch: char, col: u8, row: u8) -> bool {
        if col >= self.width || row >= self.height {
            return false;
        }
        let stride = self.width as usize * self.column_bytes();
        let offset = glyph_index(ch) * stride
            + col as usize * self.column_bytes()
            + row as usize / 8;
        self.data
            .get(offset)
            .is_some_and(|&bits| bits & (1 << (row % 8)) != 0)
    }
}

/// Table index for `ch`, falling back to space
fn glyph_index(ch: char) -> usize {
    match (ch as u32).checked_sub(FIRST_CHAR) {
        Some(i) if (i as usize) < GLYPH_COUNT => i as usize,
        _ => 0,
    }
}

/// 6x8 glyph bitmaps, one byte per column
const GLYPHS_6X8: [[u8; 6]; GLYPH_COUNT] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x00, 0x00, 0x5F, 0x00, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14, 0x00], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12, 0x00], // $
    [0x23, 0x13, 0x08, 0x64, 0x62, 0x00], // %
    [0x36, 0x49, 0x55, 0x22, 0x50, 0x00], // &
    [0x00, 0x05, 0x03, 0x00, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00, 0x00], // )
    [0x08, 0x2A, 0x1C, 0x2A, 0x08, 0x00], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08, 0x00], // +
    [0x00, 0x50, 0x30, 0x00, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08, 0x00], // -
    [0x00, 0x60, 0x60, 0x00, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02, 0x00], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E, 0x00], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46, 0x00], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31, 0x00], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10, 0x00], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39, 0x00], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30, 0x00], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03, 0x00], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36, 0x00], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E, 0x00], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14, 0x00], // =
    [0x00, 0x41, 0x22, 0x14, 0x08, 0x00], // >
    [0x02, 0x01, 0x51, 0x09, 0x06, 0x00], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E, 0x00], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E, 0x00], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36, 0x00], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22, 0x00], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C, 0x00], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41, 0x00], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01, 0x00], // F
    [0x3E, 0x41, 0x49, 0x49, 0x7A, 0x00], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F, 0x00], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01, 0x00], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41, 0x00], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40, 0x00], // L
    [0x7F, 0x02, 0x0C, 0x02, 0x7F, 0x00], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F, 0x00], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E, 0x00], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06, 0x00], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E, 0x00], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46, 0x00], // R
    [0x46, 0x49, 0x49, 0x49, 0x31, 0x00], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01, 0x00], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F, 0x00], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F, 0x00], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F, 0x00], // W
    [0x63, 0x14, 0x08, 0x14, 0x63, 0x00], // X
    [0x07, 0x08, 0x70, 0x08, 0x07, 0x00], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43, 0x00], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x00, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20, 0x00], // backslash
    [0x00, 0x41, 0x41, 0x7F, 0x00, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04, 0x00], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40, 0x00], // _
    [0x00, 0x01, 0x02, 0x04, 0x00, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78, 0x00], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38, 0x00], // b
    [0x38, 0x44, 0x44, 0x44, 0x20, 0x00], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F, 0x00], // d
    [0x38, 0x54, 0x54, 0x54, 0x18, 0x00], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02, 0x00], // f
    [0x0C, 0x52, 0x52, 0x52, 0x3E, 0x00], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78, 0x00], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00, 0x00], // j
    [0x7F, 0x10, 0x28, 0x44, 0x00, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78, 0x00], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78, 0x00], // n
    [0x38, 0x44, 0x44, 0x44, 0x38, 0x00], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08, 0x00], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C, 0x00], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08, 0x00], // r
    [0x48, 0x54, 0x54, 0x54, 0x20, 0x00], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20, 0x00], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C, 0x00], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C, 0x00], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C, 0x00], // w
    [0x44, 0x28, 0x10, 0x28, 0x44, 0x00], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C, 0x00], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44, 0x00], // z
    [0x00, 0x08, 0x36, 0x41, 0x00, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00, 0x00], // }
    [0x08, 0x04, 0x08, 0x10, 0x08, 0x00], // ~
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // DEL
];

const DATA_6X8_LEN: usize = GLYPH_COUNT * 6;
const DATA_12X16_LEN: usize = GLYPH_COUNT * 12 * 2;

static DATA_6X8: [u8; DATA_6X8_LEN] = flatten_6x8();
static DATA_12X16: [u8; DATA_12X16_LEN] = double_6x8();

const fn flatten_6x8() -> [u8; DATA_6X8_LEN] {
    let mut out = [0u8; DATA_6X8_LEN];
    let mut g = 0;
    while g < GLYPH_COUNT {
        let mut col = 0;
        while col < 6 {
            out[g * 6 + col] = GLYPHS_6X8[g][col];
            col += 1;
        }
        g += 1;
    }
    out
}

/// Spread the 8 bits of a column over 16, each bit twice
const fn stretch(bits: u8) -> u16 {
    let mut out = 0u16;
    let mut i = 0;
    while i < 8 {
        if bits & (1 << i) != 0 {
            out |= 0b11 << (2 * i);
        }
        i += 1;
    }
    out
}

const fn double_6x8() -> [u8; DATA_12X16_LEN] {
    let mut out = [0u8; DATA_12X16_LEN];
    let mut g = 0;
    while g < GLYPH_COUNT {
        let mut col = 0;
        while col < 6 {
            let tall = stretch(GLYPHS_6X8[g][col]);
            let base = g * 24 + col * 4;
            // Two identical columns, two bytes each
            out[base] = tall as u8;
            out[base + 1] = (tall >> 8) as u8;
            out[base + 2] = tall as u8;
            out[base + 3] = (tall >> 8) as u8;
            col += 1;
        }
        g += 1;
    }
    out
}

/// Small 6x8 font
pub static FONT_6X8: Font = Font {
    width: 6,
    height: 8,
    data: &DATA_6X8,
};

/// Large 12x16 font
pub static FONT_12X16: Font = Font {
    width: 12,
    height: 16,
    data: &DATA_12X16,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn column(font: &Font, ch: char, col: u8) -> u32 {
        (0..font.height())
            .filter(|&row| font.is_set(ch, col, row))
            .fold(0, |acc, row| acc | 1 << row)
    }

    #[test]
    fn test_small_glyph_lookup() {
        let a: std::vec::Vec<u32> = (0..6).map(|c| column(&FONT_6X8, 'A', c)).collect();
        assert_eq!(a, [0x7E, 0x11, 0x11, 0x11, 0x7E, 0x00]);
        let dot: std::vec::Vec<u32> = (0..6).map(|c| column(&FONT_6X8, '.', c)).collect();
        assert_eq!(dot, [0x00, 0x60, 0x60, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_unprintable_is_space() {
        for ch in [' ', '\u{e9}', '\n', '\u{1F}'] {
            for col in 0..12 {
                assert_eq!(column(&FONT_6X8, ch, col), 0);
                assert_eq!(column(&FONT_12X16, ch, col), 0);
            }
        }
    }

    #[test]
    fn test_large_font_doubles_small() {
        for ch in ['0', 'W', '.', '~'] {
            for col in 0..12 {
                for row in 0..16 {
                    assert_eq!(
                        FONT_12X16.is_set(ch, col, row),
                        FONT_6X8.is_set(ch, col / 2, row / 2),
                        "{:?} at ({}, {})",
                        ch,
                        col,
                        row
                    );
                }
            }
        }
        // First column of 'A' (0x7E) stretched: rows 2-13
        assert_eq!(column(&FONT_12X16, 'A', 0), 0x3FFC);
    }

    #[test]
    fn test_out_of_cell_is_clear() {
        assert!(!FONT_6X8.is_set('#', 6, 0));
        assert!(!FONT_6X8.is_set('#', 0, 8));
        assert!(!FONT_12X16.is_set('#', 12, 0));
    }

    #[test]
    fn test_spacing_column_blank() {
        assert!(GLYPHS_6X8.iter().all(|g| g[5] == 0));
        for i in 0..GLYPH_COUNT as u32 {
            let ch = char::from_u32(FIRST_CHAR + i).unwrap();
            assert_eq!(column(&FONT_12X16, ch, 10), 0);
            assert_eq!(column(&FONT_12X16, ch, 11), 0);
        }
    }
}
