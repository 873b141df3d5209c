//! The 16x16 pointer sprite.

use unios_abi::Color32;

use crate::surface::{Surface, SurfaceView};

pub const CURSOR_SIZE: u32 = 16;

const OUTLINE: u32 = 0xFF45_2A1B;
const FILL: u32 = 0xFF54_3721;
const HIGHLIGHT: u32 = 0xFFAF_7244;

#[rustfmt::skip]
const ROWS: [&[u8; 16]; 16] = [
    b"AA..............",
    b"ACAA............",
    b"ACCBAA..........",
    b"ABCDCBAA........",
    b"ABCCDDCA........",
    b"ABBCCCA.........",
    b"ABBBBA..........",
    b"ABAABCA.........",
    b"AA..ABBA........",
    b".....AAA........",
    b"................",
    b"................",
    b"................",
    b"................",
    b"................",
    b"................",
];

const fn build_sprite() -> [u32; 256] {
    let mut pixels = [Color32::TRANSPARENT.to_u32(); 256];
    let mut y = 0;
    while y < 16 {
        let row = ROWS[y];
        let mut x = 0;
        while x < 16 {
            pixels[y * 16 + x] = match row[x] {
                b'A' => OUTLINE,
                b'B' | b'C' => FILL,
                b'D' => HIGHLIGHT,
                _ => 0,
            };
            x += 1;
        }
        y += 1;
    }
    pixels
}

static CURSOR_PIXELS: [u32; 256] = build_sprite();

/// The pointer sprite; transparent pixels have a zero alpha byte.
pub fn cursor_sprite() -> SurfaceView<'static> {
    Surface::packed(&CURSOR_PIXELS[..], CURSOR_SIZE, CURSOR_SIZE)
}
