//! Text decoding for archive listings and text files.
//!
//! Directory listings in hash archives and ZIP file names use the legacy
//! IBM code page 437. Text file bodies are usually UTF-8 but fall back to the
//! same code page when they are not.

use std::borrow::Cow;

/// Upper half (0x80..=0xFF) of code page 437
static CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Decode bytes as code page 437, borrowing when the input is plain ASCII.
///
/// ```
/// use scsfs::encoding::decode_cp437;
///
/// assert_eq!(decode_cp437(b"def/city"), "def/city");
/// assert_eq!(decode_cp437(b"stra\xe1e"), "straße");
/// assert_eq!(decode_cp437(b"\x80\xff"), "Ç\u{a0}");
/// ```
pub fn decode_cp437(data: &[u8]) -> Cow<'_, str> {
    // ASCII is identical in code page 437
    if data.is_ascii()
        && let Ok(s) = std::str::from_utf8(data)
    {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        data.iter()
            .map(|&b| {
                if b < 0x80 {
                    b as char
                } else {
                    CP437_HIGH[(b - 0x80) as usize]
                }
            })
            .collect(),
    )
}

/// Decode a text body as UTF-8, falling back to code page 437
pub fn decode_text(data: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(data) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => decode_cp437(data),
    }
}
