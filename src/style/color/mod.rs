use once_cell::sync::Lazy;
use resvg::tiny_skia;
use rustc_hash::FxHashMap;

mod hex_color;

pub use hex_color::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    pub const fn alpha(self) -> u8 {
        self.a
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    pub fn hex(raw: &str) -> Option<Self> {
        HexColor::new(raw).to_color()
    }

    /// Parses `#hex`, `rgb(..)`, `rgba(..)` and the named colors, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.starts_with('#') {
            return Self::hex(value);
        }
        let lower = value.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return parse_rgb_args(args.strip_suffix(')')?);
        }
        NAMED_COLORS.get(lower.as_str()).copied()
    }

    /// Scales alpha by `opacity`, clamped to `0..=1`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c.is_whitespace() || c == '/')
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |part: &str| -> Option<u8> {
        match part.strip_suffix('%') {
            Some(percent) => {
                let v: f32 = percent.parse().ok()?;
                Some((v.clamp(0.0, 100.0) * 2.55).round() as u8)
            }
            None => {
                let v: f32 = part.parse().ok()?;
                Some(v.clamp(0.0, 255.0).round() as u8)
            }
        }
    };
    let alpha = match parts.get(3) {
        Some(part) => match part.strip_suffix('%') {
            Some(percent) => percent.parse::<f32>().ok()? * 0.01,
            None => part.parse::<f32>().ok()?,
        },
        None => 1.0,
    };
    Some(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    ))
}

static NAMED_COLORS: Lazy<FxHashMap<&'static str, Color>> = Lazy::new(|| {
    [
        ("transparent", Color::transparent()),
        ("black", Color::rgb(0, 0, 0)),
        ("white", Color::rgb(255, 255, 255)),
        ("red", Color::rgb(255, 0, 0)),
        ("green", Color::rgb(0, 128, 0)),
        ("lime", Color::rgb(0, 255, 0)),
        ("blue", Color::rgb(0, 0, 255)),
        ("yellow", Color::rgb(255, 255, 0)),
        ("cyan", Color::rgb(0, 255, 255)),
        ("aqua", Color::rgb(0, 255, 255)),
        ("magenta", Color::rgb(255, 0, 255)),
        ("fuchsia", Color::rgb(255, 0, 255)),
        ("gray", Color::rgb(128, 128, 128)),
        ("grey", Color::rgb(128, 128, 128)),
        ("lightgray", Color::rgb(211, 211, 211)),
        ("darkgray", Color::rgb(169, 169, 169)),
        ("silver", Color::rgb(192, 192, 192)),
        ("maroon", Color::rgb(128, 0, 0)),
        ("olive", Color::rgb(128, 128, 0)),
        ("navy", Color::rgb(0, 0, 128)),
        ("purple", Color::rgb(128, 0, 128)),
        ("teal", Color::rgb(0, 128, 128)),
        ("orange", Color::rgb(255, 165, 0)),
        ("pink", Color::rgb(255, 192, 203)),
        ("brown", Color::rgb(165, 42, 42)),
        ("gold", Color::rgb(255, 215, 0)),
        ("steelblue", Color::rgb(70, 130, 180)),
        ("skyblue", Color::rgb(135, 206, 235)),
    ]
    .into_iter()
    .collect()
});

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_named_hex_and_functional_forms() {
        assert_eq!(Color::parse("Red"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse(" #00f "), Some(Color::rgb(0, 0, 255)));
        assert_eq!(Color::parse("rgb(10, 20, 30)"), Some(Color::rgb(10, 20, 30)));
        assert_eq!(
            Color::parse("rgba(255,0,0,0.5)"),
            Some(Color::rgba(255, 0, 0, 128))
        );
        assert_eq!(Color::parse("rgb(100%, 0%, 0%)"), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn unknown_names_do_not_parse() {
        assert_eq!(Color::parse("blurple"), None);
        assert_eq!(Color::parse("rgb(1,2)"), None);
        assert_eq!(Color::parse(""), None);
    }

    #[test]
    fn opacity_scales_alpha() {
        assert_eq!(Color::rgb(1, 2, 3).with_opacity(0.5).alpha(), 128);
        assert_eq!(Color::rgb(1, 2, 3).with_opacity(4.0).alpha(), 255);
    }
}
