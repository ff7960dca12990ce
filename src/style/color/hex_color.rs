use super::Color;
use std::borrow::Cow;

/// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
pub struct HexColor<'a> {
    raw: Cow<'a, str>,
    value: Option<[u8; 4]>,
}

impl<'a> HexColor<'a> {
    pub fn new(hex: impl Into<Cow<'a, str>>) -> Self {
        let hex = hex.into();
        let bytes = hex.as_bytes();
        let value = if Self::validate(bytes) {
            Some(match bytes.len() {
                4 => [
                    hex_1_to_u8(bytes[1]) * 17,
                    hex_1_to_u8(bytes[2]) * 17,
                    hex_1_to_u8(bytes[3]) * 17,
                    255,
                ],
                5 => [
                    hex_1_to_u8(bytes[1]) * 17,
                    hex_1_to_u8(bytes[2]) * 17,
                    hex_1_to_u8(bytes[3]) * 17,
                    hex_1_to_u8(bytes[4]) * 17,
                ],
                7 => [
                    hex_2_to_u8(bytes[1], bytes[2]),
                    hex_2_to_u8(bytes[3], bytes[4]),
                    hex_2_to_u8(bytes[5], bytes[6]),
                    255,
                ],
                _ => [
                    hex_2_to_u8(bytes[1], bytes[2]),
                    hex_2_to_u8(bytes[3], bytes[4]),
                    hex_2_to_u8(bytes[5], bytes[6]),
                    hex_2_to_u8(bytes[7], bytes[8]),
                ],
            })
        } else {
            None
        };

        HexColor { raw: hex, value }
    }

    fn validate(bytes: &[u8]) -> bool {
        let length = bytes.len();

        if length == 0 || bytes[0] != b'#' {
            return false;
        }

        if length != 4 && length != 5 && length != 7 && length != 9 {
            return false;
        }

        bytes[1..].iter().all(u8::is_ascii_hexdigit)
    }

    pub fn get_raw(&self) -> &str {
        &self.raw
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn to_color(&self) -> Option<Color> {
        self.value.map(|[r, g, b, a]| Color::rgba(r, g, b, a))
    }
}

fn hex_1_to_u8(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

fn hex_2_to_u8(c1: u8, c2: u8) -> u8 {
    (hex_1_to_u8(c1) << 4) | hex_1_to_u8(c2)
}

#[cfg(test)]
mod tests {
    use super::HexColor;
    use crate::style::Color;

    #[test]
    fn short_and_long_forms_expand_the_same() {
        assert_eq!(HexColor::new("#f80").to_color(), Some(Color::rgb(255, 136, 0)));
        assert_eq!(HexColor::new("#ff8800").to_color(), Some(Color::rgb(255, 136, 0)));
        assert_eq!(
            HexColor::new("#ff880080").to_color(),
            Some(Color::rgba(255, 136, 0, 128))
        );
    }

    #[test]
    fn rejects_bad_length_and_digits() {
        assert!(HexColor::new("#ff88").is_valid());
        assert!(!HexColor::new("#12345").is_valid());
        assert!(!HexColor::new("#gggggg").is_valid());
        assert!(!HexColor::new("ff8800").is_valid());
    }
}
