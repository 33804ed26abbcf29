//! Distinct surface colors.

use super::Rgb;

/// Fractional part of the golden ratio; stepping hue by it spreads
/// consecutive indices evenly around the color wheel.
const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

const SATURATION: f64 = 0.7;
const VALUE: f64 = 0.95;

/// Color for surface `index`: hue advances by the golden ratio, saturation
/// and value stay fixed so neighbouring walls remain distinguishable.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn distinct_color(index: usize) -> Rgb {
    let hue = (index as f64 * GOLDEN_RATIO_CONJUGATE).fract();
    hsv_to_rgb(hue, SATURATION, VALUE)
}

/// Converts HSV (all components in `[0, 1]`) to RGB.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names
)]
#[must_use]
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb::new(r as f32, g as f32, b as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_color_is_red_hue() {
        let c = distinct_color(0);
        assert_relative_eq!(c.r, 0.95, epsilon = 1e-6);
        assert_relative_eq!(c.g, 0.285, epsilon = 1e-6);
        assert_relative_eq!(c.b, 0.285, epsilon = 1e-6);
    }

    #[test]
    fn primary_hues() {
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0).to_rgb8(), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0).to_rgb8(), [0, 0, 255]);
        assert_eq!(hsv_to_rgb(0.5, 0.0, 0.5).to_rgb8(), [128, 128, 128]);
    }

    #[test]
    fn consecutive_colors_differ() {
        let colors: Vec<_> = (0..16).map(distinct_color).collect();
        for pair in colors.windows(2) {
            assert_ne!(pair[0].to_rgb8(), pair[1].to_rgb8());
        }
    }
}
