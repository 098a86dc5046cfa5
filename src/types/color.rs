use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGBA color with `r`, `g`, `b` in `[0, 255]` and `a` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color { r, g, b, a }
    }

    pub fn opaque(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b, a: 1.0 }
    }

    /// Parse a CSS color string: named colors, `#rgb`/`#rgba`/`#rrggbb`/
    /// `#rrggbbaa`, `rgb()`/`rgba()` and `hsl()`/`hsla()` forms.
    pub fn from_css(s: &str) -> Option<Color> {
        let s = s.trim();

        if s.starts_with('#') {
            return parse_hex(s);
        }

        if s.starts_with("rgb") {
            return parse_rgb(s);
        }

        if s.starts_with("hsl") {
            return parse_hsl(s);
        }

        named_color(&s.to_lowercase())
    }

    pub fn channels(&self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Blend two colors in LCHuv space. L, C and H are interpolated
    /// independently, alpha directly; the result has its rgb channels
    /// rounded to integers and clamped to [0, 255] while alpha keeps
    /// float precision.
    pub fn lerp(from: Color, to: Color, t: f64) -> Color {
        let [l1, c1, h1] = rgb_to_lchuv(from.r, from.g, from.b);
        let [l2, c2, h2] = rgb_to_lchuv(to.r, to.g, to.b);

        let l = l1 + t * (l2 - l1);
        let c = c1 + t * (c2 - c1);
        let h = h1 + t * (h2 - h1);

        let [r, g, b] = lchuv_to_rgb(l, c, h);

        Color {
            r: r.round().clamp(0.0, 255.0),
            g: g.round().clamp(0.0, 255.0),
            b: b.round().clamp(0.0, 255.0),
            a: from.a + t * (to.a - from.a),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Color::opaque(r as f64, g as f64, b as f64))
        }
        4 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            let a = u8::from_str_radix(&hex[3..4].repeat(2), 16).ok()?;
            Some(Color::new(r as f64, g as f64, b as f64, a as f64 / 255.0))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::opaque(r as f64, g as f64, b as f64))
        }
        8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Color::new(r as f64, g as f64, b as f64, a as f64 / 255.0))
        }
        _ => None,
    }
}

fn parse_rgb(s: &str) -> Option<Color> {
    let inner = s
        .trim_start_matches("rgba(")
        .trim_start_matches("rgb(")
        .trim_end_matches(')');
    let parts: Vec<&str> = inner.split(',').map(|p| p.trim()).collect();

    if parts.len() < 3 {
        return None;
    }

    let r: f64 = parts[0].trim_end_matches('%').parse().ok()?;
    let g: f64 = parts[1].trim_end_matches('%').parse().ok()?;
    let b: f64 = parts[2].trim_end_matches('%').parse().ok()?;

    let (r, g, b) = if parts[0].contains('%') {
        (r * 255.0 / 100.0, g * 255.0 / 100.0, b * 255.0 / 100.0)
    } else {
        (r, g, b)
    };

    let a = if parts.len() >= 4 {
        parts[3].parse().ok()?
    } else {
        1.0
    };

    Some(Color::new(r, g, b, a))
}

fn parse_hsl(s: &str) -> Option<Color> {
    let inner = s
        .trim_start_matches("hsla(")
        .trim_start_matches("hsl(")
        .trim_end_matches(')');
    let parts: Vec<&str> = inner.split(',').map(|p| p.trim()).collect();

    if parts.len() < 3 {
        return None;
    }

    let h: f64 = parts[0].parse().ok()?;
    let sat: f64 = parts[1].trim_end_matches('%').parse::<f64>().ok()? / 100.0;
    let l: f64 = parts[2].trim_end_matches('%').parse::<f64>().ok()? / 100.0;

    let a = if parts.len() >= 4 {
        parts[3].parse().ok()?
    } else {
        1.0
    };

    let (r, g, b) = hsl_to_rgb(h / 360.0, sat, l);
    Some(Color::new(
        (r * 255.0).round(),
        (g * 255.0).round(),
        (b * 255.0).round(),
        a,
    ))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn named_color(name: &str) -> Option<Color> {
    let (r, g, b, a) = match name {
        "black" => (0, 0, 0, 1.0),
        "silver" => (192, 192, 192, 1.0),
        "gray" | "grey" => (128, 128, 128, 1.0),
        "white" => (255, 255, 255, 1.0),
        "maroon" => (128, 0, 0, 1.0),
        "red" => (255, 0, 0, 1.0),
        "purple" => (128, 0, 128, 1.0),
        "fuchsia" | "magenta" => (255, 0, 255, 1.0),
        "green" => (0, 128, 0, 1.0),
        "lime" => (0, 255, 0, 1.0),
        "olive" => (128, 128, 0, 1.0),
        "yellow" => (255, 255, 0, 1.0),
        "navy" => (0, 0, 128, 1.0),
        "blue" => (0, 0, 255, 1.0),
        "teal" => (0, 128, 128, 1.0),
        "aqua" | "cyan" => (0, 255, 255, 1.0),
        "orange" => (255, 165, 0, 1.0),
        "pink" => (255, 192, 203, 1.0),
        "brown" => (165, 42, 42, 1.0),
        "gold" => (255, 215, 0, 1.0),
        "indigo" => (75, 0, 130, 1.0),
        "violet" => (238, 130, 238, 1.0),
        "coral" => (255, 127, 80, 1.0),
        "salmon" => (250, 128, 114, 1.0),
        "khaki" => (240, 230, 140, 1.0),
        "turquoise" => (64, 224, 208, 1.0),
        "transparent" => (0, 0, 0, 0.0),
        _ => return None,
    };
    Some(Color::new(r as f64, g as f64, b as f64, a))
}

// CIE constants, D65 reference white.
const KAPPA: f64 = 903.2962962962963;
const EPSILON: f64 = 0.0088564516790356308;
const XN: f64 = 0.95047;
const YN: f64 = 1.0;
const ZN: f64 = 1.08883;

fn srgb_to_linear(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c > 0.0031308 {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * c
    }
}

fn rgb_to_lchuv(r: f64, g: f64, b: f64) -> [f64; 3] {
    let rl = srgb_to_linear(r / 255.0);
    let gl = srgb_to_linear(g / 255.0);
    let bl = srgb_to_linear(b / 255.0);

    let x = 0.4124564 * rl + 0.3575761 * gl + 0.1804375 * bl;
    let y = 0.2126729 * rl + 0.7151522 * gl + 0.0721750 * bl;
    let z = 0.0193339 * rl + 0.1191920 * gl + 0.9503041 * bl;

    let denom = x + 15.0 * y + 3.0 * z;
    if denom == 0.0 {
        return [0.0, 0.0, 0.0];
    }

    let up = 4.0 * x / denom;
    let vp = 9.0 * y / denom;

    let denom_n = XN + 15.0 * YN + 3.0 * ZN;
    let upn = 4.0 * XN / denom_n;
    let vpn = 9.0 * YN / denom_n;

    let yr = y / YN;
    let l = if yr > EPSILON {
        116.0 * yr.cbrt() - 16.0
    } else {
        KAPPA * yr
    };

    let u = 13.0 * l * (up - upn);
    let v = 13.0 * l * (vp - vpn);

    [l, u.hypot(v), v.atan2(u).to_degrees()]
}

fn lchuv_to_rgb(l: f64, c: f64, h: f64) -> [f64; 3] {
    if l <= 0.0 {
        return [0.0, 0.0, 0.0];
    }

    let hr = h.to_radians();
    let u = c * hr.cos();
    let v = c * hr.sin();

    let denom_n = XN + 15.0 * YN + 3.0 * ZN;
    let upn = 4.0 * XN / denom_n;
    let vpn = 9.0 * YN / denom_n;

    let up = u / (13.0 * l) + upn;
    let vp = v / (13.0 * l) + vpn;

    let y = if l > 8.0 {
        YN * ((l + 16.0) / 116.0).powi(3)
    } else {
        YN * l / KAPPA
    };

    if vp == 0.0 {
        return [0.0, 0.0, 0.0];
    }

    let x = y * 9.0 * up / (4.0 * vp);
    let z = y * (12.0 - 3.0 * up - 20.0 * vp) / (4.0 * vp);

    let rl = 3.2404542 * x - 1.5371385 * y - 0.4985314 * z;
    let gl = -0.9692660 * x + 1.8760108 * y + 0.0415560 * z;
    let bl = 0.0556434 * x - 0.2040259 * y + 1.0572252 * z;

    [
        linear_to_srgb(rl) * 255.0,
        linear_to_srgb(gl) * 255.0,
        linear_to_srgb(bl) * 255.0,
    ]
}
