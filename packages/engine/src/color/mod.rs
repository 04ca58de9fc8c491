//! Color resolution: CSS color text to packed RGBA, and back to canonical text.

mod named;

use cssparser::{ParseError, Parser, ParserInput, Token};
use named::named_color;

type ColorParseError<'i> = ParseError<'i, ()>;

/// Resolves a color string to a packed `0xRRGGBBAA` integer
pub trait ColorResolver {
    fn resolve(&self, value: &str) -> Option<u32>;
}

/// Default resolver: named colors, hex notations, `rgb()`, `hsl()` and `hwb()`
#[derive(Debug, Default, Clone, Copy)]
pub struct CssColorResolver;

impl ColorResolver for CssColorResolver {
    fn resolve(&self, value: &str) -> Option<u32> {
        let mut input = ParserInput::new(value);
        let mut parser = Parser::new(&mut input);
        parser.parse_entirely(parse_color).ok().map(Rgba::pack)
    }
}

/// Canonical text for a packed color: short or long hex when opaque,
/// `rgba(...)` otherwise
pub fn format_color(packed: u32) -> String {
    let r = (packed >> 24) & 0xff;
    let g = (packed >> 16) & 0xff;
    let b = (packed >> 8) & 0xff;
    let a = packed & 0xff;

    if a == 0xff {
        return to_hex(r, g, b);
    }

    let alpha = if a == 0 {
        "0".to_string()
    } else {
        format!("{:.2}", a as f64 / 255.0)
    };

    format!("rgba({},{},{},{})", r, g, b, alpha)
}

fn to_hex(r: u32, g: u32, b: u32) -> String {
    let shortenable = [r, g, b].iter().all(|c| c >> 4 == c & 0xf);

    if shortenable {
        format!("#{:x}{:x}{:x}", r & 0xf, g & 0xf, b & 0xf)
    } else {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgba {
    red: f32,
    green: f32,
    blue: f32,
    alpha: f32,
}

impl Rgba {
    fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    fn pack(self) -> u32 {
        let channel = |value: f32| value.round().clamp(0.0, 255.0) as u32;

        channel(self.red) << 24
            | channel(self.green) << 16
            | channel(self.blue) << 8
            | channel(self.alpha * 255.0)
    }
}

fn parse_color<'i>(parser: &mut Parser<'i, '_>) -> Result<Rgba, ColorParseError<'i>> {
    let token = parser.next()?.clone();

    match token {
        Token::Hash(ref value) | Token::IDHash(ref value) => {
            parse_hex(value).ok_or_else(|| parser.new_custom_error(()))
        }
        Token::Ident(ref name) => named_color(&name.to_ascii_lowercase())
            .map(unpack)
            .ok_or_else(|| parser.new_custom_error(())),
        Token::Function(ref name) => {
            let name = name.to_ascii_lowercase();
            parser.parse_nested_block(|p| {
                let (channels, alpha) = parse_arguments(p)?;
                let alpha = alpha.map(alpha_value).unwrap_or(1.0);

                let color = match (name.as_str(), channels.as_slice()) {
                    ("rgb" | "rgba", [r, g, b]) => {
                        Rgba::new(rgb_channel(*r), rgb_channel(*g), rgb_channel(*b), alpha)
                    }
                    ("hsl" | "hsla", [h, s, l]) => {
                        let (r, g, b) = hsl_to_rgb(hue(*h), fraction(*s), fraction(*l));
                        Rgba::new(r, g, b, alpha)
                    }
                    ("hwb", [h, w, b]) => {
                        let (r, g, b) = hwb_to_rgb(hue(*h), fraction(*w), fraction(*b));
                        Rgba::new(r, g, b, alpha)
                    }
                    _ => return Err(p.new_custom_error(())),
                };

                Ok(color)
            })
        }
        _ => Err(parser.new_custom_error(())),
    }
}

/// Numeric argument of a color function
#[derive(Debug, Clone, Copy, PartialEq)]
enum Component {
    Number(f32),
    Percentage(f32),
    Degrees(f32),
}

/// Split the arguments of a color function into channels and optional alpha.
/// Accepts both `r, g, b, a` and `r g b / a` forms.
fn parse_arguments<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<(Vec<Component>, Option<Component>), ColorParseError<'i>> {
    let mut channels = Vec::with_capacity(4);
    let mut alpha = None;
    let mut after_slash = false;

    while !parser.is_exhausted() {
        let token = parser.next()?.clone();
        let component = match token {
            Token::Comma => continue,
            Token::Delim('/') if !after_slash => {
                after_slash = true;
                continue;
            }
            Token::Number { value, .. } => Component::Number(value),
            Token::Percentage { unit_value, .. } => Component::Percentage(unit_value),
            Token::Dimension { value, ref unit, .. } => {
                let degrees = match unit.to_ascii_lowercase().as_str() {
                    "deg" => value,
                    "rad" => value.to_degrees(),
                    "grad" => value * 0.9,
                    "turn" => value * 360.0,
                    _ => return Err(parser.new_custom_error(())),
                };
                Component::Degrees(degrees)
            }
            _ => return Err(parser.new_custom_error(())),
        };

        if after_slash {
            if alpha.replace(component).is_some() {
                return Err(parser.new_custom_error(()));
            }
        } else {
            channels.push(component);
        }
    }

    // Legacy comma form carries alpha as a fourth channel
    if channels.len() == 4 && alpha.is_none() {
        alpha = channels.pop();
    }

    if channels.len() != 3 {
        return Err(parser.new_custom_error(()));
    }

    Ok((channels, alpha))
}

fn rgb_channel(component: Component) -> f32 {
    match component {
        Component::Number(value) | Component::Degrees(value) => value,
        Component::Percentage(unit) => unit * 255.0,
    }
}

fn alpha_value(component: Component) -> f32 {
    match component {
        Component::Number(value) | Component::Degrees(value) => value.clamp(0.0, 1.0),
        Component::Percentage(unit) => unit.clamp(0.0, 1.0),
    }
}

fn hue(component: Component) -> f32 {
    let degrees = match component {
        Component::Number(value) | Component::Degrees(value) => value,
        Component::Percentage(unit) => unit * 360.0,
    };
    degrees.rem_euclid(360.0) / 360.0
}

fn fraction(component: Component) -> f32 {
    match component {
        Component::Percentage(unit) => unit.clamp(0.0, 1.0),
        Component::Number(value) | Component::Degrees(value) => (value / 100.0).clamp(0.0, 1.0),
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0) * 255.0,
        hue_to_rgb(p, q, h) * 255.0,
        hue_to_rgb(p, q, h - 1.0 / 3.0) * 255.0,
    )
}

fn hwb_to_rgb(h: f32, white: f32, black: f32) -> (f32, f32, f32) {
    if white + black >= 1.0 {
        let gray = white / (white + black) * 255.0;
        return (gray, gray, gray);
    }

    let (r, g, b) = hsl_to_rgb(h, 1.0, 0.5);
    let scale = 1.0 - white - black;
    let white = white * 255.0;

    (r * scale + white, g * scale + white, b * scale + white)
}

fn parse_hex(value: &str) -> Option<Rgba> {
    if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let digit = |i: usize| u32::from_str_radix(&value[i..i + 1], 16).ok();
    let pair = |i: usize| u32::from_str_radix(&value[i..i + 2], 16).ok();

    let (r, g, b, a) = match value.len() {
        3 => (digit(0)? * 17, digit(1)? * 17, digit(2)? * 17, 255),
        4 => (digit(0)? * 17, digit(1)? * 17, digit(2)? * 17, digit(3)? * 17),
        6 => (pair(0)?, pair(2)?, pair(4)?, 255),
        8 => (pair(0)?, pair(2)?, pair(4)?, pair(6)?),
        _ => return None,
    };

    Some(unpack(r << 24 | g << 16 | b << 8 | a))
}

fn unpack(packed: u32) -> Rgba {
    Rgba::new(
        ((packed >> 24) & 0xff) as f32,
        ((packed >> 16) & 0xff) as f32,
        ((packed >> 8) & 0xff) as f32,
        (packed & 0xff) as f32 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(value: &str) -> Option<u32> {
        CssColorResolver.resolve(value)
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(resolve("red"), Some(0xff0000ff));
        assert_eq!(resolve("rebeccapurple"), Some(0x663399ff));
        assert_eq!(resolve("transparent"), Some(0x00000000));
        assert_eq!(resolve("notacolor"), None);
    }

    #[test]
    fn test_hex_notations() {
        assert_eq!(resolve("#f00"), Some(0xff0000ff));
        assert_eq!(resolve("#ff000080"), Some(0xff000080));
        assert_eq!(resolve("#1234"), Some(0x11223344));
        assert_eq!(resolve("#12345"), None);
    }

    #[test]
    fn test_functional_notations() {
        assert_eq!(resolve("rgb(255, 0, 0)"), Some(0xff0000ff));
        assert_eq!(resolve("rgb(255 0 0 / 50%)"), Some(0xff000080));
        assert_eq!(resolve("rgba(0, 0, 255, 0)"), Some(0x0000ff00));
        assert_eq!(resolve("hsl(120, 100%, 50%)"), Some(0x00ff00ff));
        assert_eq!(resolve("hwb(0 0% 0%)"), Some(0xff0000ff));
        assert_eq!(resolve("rgb(1, 2)"), None);
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        assert_eq!(resolve("red blue"), None);
        assert_eq!(resolve("color: rgb(255, 0, 0)"), None);
    }

    #[test]
    fn test_format_color() {
        assert_eq!(format_color(0xff0000ff), "#f00");
        assert_eq!(format_color(0x663399ff), "#639");
        assert_eq!(format_color(0x123456ff), "#123456");
        assert_eq!(format_color(0xff000080), "rgba(255,0,0,0.50)");
        assert_eq!(format_color(0x00000000), "rgba(0,0,0,0)");
    }
}
