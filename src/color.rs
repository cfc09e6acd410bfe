use libm::{copysignf, fabsf, powf};

use super::*;

/// Expands one 8-bit sRGB channel into its linear light value.
///
/// Uses the piecewise sRGB transfer function, not the plain 2.2 gamma
/// approximation, so values survive a round trip through
/// [`linear_to_srgb`].
pub fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        powf((v + 0.055) / 1.055, 2.4)
    }
}

/// Compresses one linear channel back into 8-bit sRGB.
///
/// The input is clamped to `0.0..=1.0` first, so any finite value maps to
/// a valid channel.
pub fn linear_to_srgb(value: f32) -> u8 {
    let v = value.clamp(0.0, 1.0);
    if v <= 0.003_130_8 {
        (v * 12.92 * 255.0 + 0.5) as u8
    } else {
        ((1.055 * powf(v, 1.0 / 2.4) - 0.055) * 255.0 + 0.5) as u8
    }
}

/// `|v|^e` with the sign of `v` carried through.
///
/// The quantizer (e = 0.5) and the dequantizers (e = 2.0) must agree on
/// this curve exactly, so both sides call here.
#[inline]
pub(crate) fn sign_pow(value: f32, exp: f32) -> f32 {
    copysignf(powf(fabsf(value), exp), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn round_trip_is_within_one_step() {
        for value in 0..=255u8 {
            let back = linear_to_srgb(srgb_to_linear(value));
            assert!(
                (back as i32 - value as i32).abs() <= 1,
                "{} came back as {}",
                value,
                back
            );
        }
    }

    #[test]
    fn endpoints_are_exact() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert_abs_diff_eq!(srgb_to_linear(255), 1.0, epsilon = 1e-6);
        assert_eq!(linear_to_srgb(0.0), 0);
        assert_eq!(linear_to_srgb(1.0), 255);
    }

    #[test]
    fn out_of_range_linear_values_clamp() {
        assert_eq!(linear_to_srgb(-0.25), 0);
        assert_eq!(linear_to_srgb(1.25), 255);
    }

    #[test]
    fn knee_splits_the_curve() {
        // 0.04045 * 255 is about 10.3, so channel 10 is still linear.
        assert_abs_diff_eq!(srgb_to_linear(10), 10.0 / 255.0 / 12.92, epsilon = 1e-7);
        assert!(srgb_to_linear(11) > 11.0 / 255.0 / 12.92);
    }

    #[test]
    fn sign_pow_is_odd() {
        assert_abs_diff_eq!(sign_pow(0.25, 0.5), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(sign_pow(-0.25, 0.5), -0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(sign_pow(-0.5, 2.0), -0.25, epsilon = 1e-6);
        assert_eq!(sign_pow(0.0, 2.0), 0.0);
    }
}
