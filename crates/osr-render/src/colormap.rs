//! ---
//! osr_section: "05-report-rendering"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Heatmap and table rendering for regression reports."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    pub const BLACK: Rgb = Rgb(0x26, 0x26, 0x26);
    /// Non-zero changes below the display threshold.
    pub const BELOW_THRESHOLD: Rgb = Rgb(0xf7, 0xf7, 0xf7);
    /// Exactly zero change.
    pub const ZERO: Rgb = Rgb(0xf0, 0xf7, 0xd9);

    /// Relative luminance in `[0, 1]`.
    pub fn luminance(&self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = f64::from(c) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.0) + 0.7152 * channel(self.1) + 0.0722 * channel(self.2)
    }

    /// Readable annotation colour on top of `self`.
    pub fn text_color(&self) -> Rgb {
        if self.luminance() > 0.408 {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// ColorBrewer YlOrRd, light to dark.
pub const YL_OR_RD: [Rgb; 9] = [
    Rgb(0xff, 0xff, 0xcc),
    Rgb(0xff, 0xed, 0xa0),
    Rgb(0xfe, 0xd9, 0x76),
    Rgb(0xfe, 0xb2, 0x4c),
    Rgb(0xfd, 0x8d, 0x3c),
    Rgb(0xfc, 0x4e, 0x2a),
    Rgb(0xe3, 0x1a, 0x1c),
    Rgb(0xbd, 0x00, 0x26),
    Rgb(0x80, 0x00, 0x26),
];

/// Colour for `t` in `[0, 1]`, linearly interpolated between the stops.
pub fn yl_or_rd(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (YL_OR_RD.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(YL_OR_RD.len() - 1);
    let frac = scaled - lo as f64;
    let (a, b) = (YL_OR_RD[lo], YL_OR_RD[hi]);
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Colour for `value` on a `[0, vmax]` scale.
pub fn scaled(value: f64, vmax: f64) -> Rgb {
    yl_or_rd(value / vmax)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_clamping() {
        assert_eq!(yl_or_rd(0.0), YL_OR_RD[0]);
        assert_eq!(yl_or_rd(1.0), YL_OR_RD[8]);
        assert_eq!(yl_or_rd(7.5), YL_OR_RD[8]);
        assert_eq!(yl_or_rd(-1.0), YL_OR_RD[0]);
        assert_eq!(scaled(0.25, 0.5), YL_OR_RD[4]);
    }

    #[test]
    fn hex_and_contrast() {
        assert_eq!(Rgb::ZERO.to_string(), "#f0f7d9");
        assert_eq!(YL_OR_RD[0].text_color(), Rgb::BLACK);
        assert_eq!(YL_OR_RD[8].text_color(), Rgb::WHITE);
    }
}
