//! Telemetry font: 4 columns × 5 rows, covering ASCII `' '..='_'`.
//!
//! Two neighbouring characters share one table entry. Each row byte holds the
//! even character in its upper nibble and the odd character in its lower
//! nibble, bit 3 of a nibble being the leftmost column.

pub const GLYPH_WIDTH: usize = 4;
pub const GLYPH_HEIGHT: usize = 5;

const FIRST: u8 = b' ';
const LAST: u8 = b'_';

static GLYPH_PAIRS: [[u8; GLYPH_HEIGHT]; 32] = [
    [0x04, 0x04, 0x04, 0x00, 0x04], //   !
    [0xaa, 0xae, 0x0a, 0x0e, 0x0a], // " #
    [0x6a, 0xc2, 0x44, 0x68, 0xca], // $ %
    [0x44, 0xa4, 0x40, 0xa0, 0x60], // & '
    [0x28, 0x44, 0x44, 0x44, 0x28], // ( )
    [0x00, 0xa4, 0x4e, 0xa4, 0x00], // * +
    [0x00, 0x00, 0x0e, 0x40, 0x80], // , -
    [0x02, 0x02, 0x04, 0x08, 0x48], // . /
    [0xe4, 0xac, 0xa4, 0xa4, 0xee], // 0 1
    [0xee, 0x22, 0xe6, 0x82, 0xee], // 2 3
    [0xae, 0xa8, 0xee, 0x22, 0x2e], // 4 5
    [0xee, 0x82, 0xe4, 0xa4, 0xe4], // 6 7
    [0xee, 0xaa, 0xee, 0xa2, 0xee], // 8 9
    [0x00, 0x44, 0x00, 0x44, 0x08], // : ;
    [0x20, 0x4e, 0x80, 0x4e, 0x20], // < =
    [0x8e, 0x42, 0x26, 0x40, 0x84], // > ?
    [0xe4, 0xaa, 0xee, 0x8a, 0xea], // @ A
    [0xc6, 0xa8, 0xc8, 0xa8, 0xc6], // B C
    [0xce, 0xa8, 0xac, 0xa8, 0xce], // D E
    [0xe6, 0x88, 0xca, 0x8a, 0x86], // F G
    [0xae, 0xa4, 0xe4, 0xa4, 0xae], // H I
    [0x2a, 0x2a, 0x2c, 0xaa, 0x4a], // J K
    [0x8a, 0x8e, 0x8e, 0x8a, 0xea], // L M
    [0xc4, 0xaa, 0xaa, 0xaa, 0xa4], // N O
    [0xc4, 0xaa, 0xca, 0x8c, 0x86], // P Q
    [0xc6, 0xa8, 0xc4, 0xa2, 0xac], // R S
    [0xea, 0x4a, 0x4a, 0x4a, 0x46], // T U
    [0xaa, 0xaa, 0xae, 0x4e, 0x4a], // V W
    [0xaa, 0xaa, 0x44, 0xa4, 0xa4], // X Y
    [0xec, 0x28, 0x48, 0x88, 0xec], // Z [
    [0x86, 0x82, 0x42, 0x22, 0x26], // \ ]
    [0x40, 0xa0, 0x00, 0x00, 0x0e], // ^ _
];

/// Rows of the glyph for `c` as 4-bit masks, if the telemetry font has one.
pub fn glyph(c: char) -> Option<[u8; GLYPH_HEIGHT]> {
    let code = u8::try_from(c).ok().filter(|code| (FIRST..=LAST).contains(code))?;
    let pair = &GLYPH_PAIRS[usize::from((code - FIRST) / 2)];
    let shift = if code & 1 == 0 { 4 } else { 0 };
    Some(pair.map(|row| (row >> shift) & 0x0f))
}
