//! Color transfer helpers.

/// RGBA color with linear float channels.
pub type Rgba = [f32; 4];

/// Default value of freshly created color channels.
pub const DEFAULT_COLOR: Rgba = [0.0, 0.0, 0.0, 1.0];

/// Converts a linear channel value to sRGB encoding.
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Converts an sRGB-encoded channel value to linear.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Rounds a linear color to the nearest value storable in an 8-bit sRGB channel.
pub fn quantize_byte_color(color: Rgba) -> Rgba {
    let q = |v: f32| (v * 255.0).round() / 255.0;
    [
        srgb_to_linear(q(linear_to_srgb(color[0]))),
        srgb_to_linear(q(linear_to_srgb(color[1]))),
        srgb_to_linear(q(linear_to_srgb(color[2]))),
        q(color[3].clamp(0.0, 1.0)),
    ]
}

/// Component-wise average; returns [`DEFAULT_COLOR`] for an empty input.
pub fn average(colors: impl IntoIterator<Item = Rgba>) -> Rgba {
    let mut sum = [0.0f32; 4];
    let mut n = 0usize;
    for c in colors {
        for (s, v) in sum.iter_mut().zip(c) {
            *s += v;
        }
        n += 1;
    }
    if n == 0 {
        return DEFAULT_COLOR;
    }
    sum.map(|s| s / n as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_roundtrip() {
        for i in 0..=20 {
            let v = i as f32 / 20.0;
            assert!((srgb_to_linear(linear_to_srgb(v)) - v).abs() < 1e-5);
        }
    }

    #[test]
    fn test_quantize_is_stable() {
        let c = quantize_byte_color([0.2, 0.5, 0.9, 0.33]);
        assert_eq!(quantize_byte_color(c), c);
    }

    #[test]
    fn test_average_empty() {
        assert_eq!(average(std::iter::empty()), DEFAULT_COLOR);
        assert_eq!(average([[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]]), [0.5, 0.5, 0.0, 1.0]);
    }
}
