//! Scalar-to-RGBA coloring
//!
//! Colors every value of the cached row through the palette's sign and
//! threshold rules. Runs in full on every load and on every palette
//! change; the per-scalar work parallelizes over chunks of the RGBA
//! buffer.

use rayon::prelude::*;

use dconn_core::palette::{
    Palette, PaletteSettings, ThresholdTest, ThresholdType, SMALL_NEGATIVE, SMALL_POSITIVE,
};
use dconn_core::stats::FastStatistics;

/// Fill `rgba` (4 bytes per value) from the data values. Hidden, NaN, and
/// threshold-failed values get a fully transparent pixel.
pub fn color_scalars(
    stats: &FastStatistics,
    settings: &PaletteSettings,
    palette: &Palette,
    values: &[f32],
    rgba: &mut [u8],
) {
    if values.is_empty() {
        return;
    }
    debug_assert_eq!(rgba.len(), values.len() * 4);

    let mut normalized = vec![0.0f32; values.len()];
    settings.normalize_to_palette(stats, values, &mut normalized);

    // extreme values are common; color them once
    let positive_one = palette.color(1.0, settings.interpolate);
    let negative_one = palette.color(-1.0, settings.interpolate);

    rgba.par_chunks_exact_mut(4)
        .zip(values.par_iter())
        .zip(normalized.par_iter())
        .for_each(|((pixel, &value), &normal)| {
            let color = color_one(
                value,
                normal,
                settings,
                palette,
                positive_one,
                negative_one,
            );
            pixel.copy_from_slice(&color);
        });
}

fn color_one(
    value: f32,
    normal: f32,
    settings: &PaletteSettings,
    palette: &Palette,
    positive_one: [f32; 4],
    negative_one: [f32; 4],
) -> [u8; 4] {
    const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

    if value > SMALL_POSITIVE {
        if !settings.display_positive {
            return TRANSPARENT;
        }
    } else if value < SMALL_NEGATIVE {
        if !settings.display_negative {
            return TRANSPARENT;
        }
    } else if value.is_nan() {
        return TRANSPARENT;
    } else if !settings.display_zero {
        return TRANSPARENT;
    }

    let color = if normal >= 1.0 {
        positive_one
    } else if normal <= -1.0 {
        negative_one
    } else {
        palette.color(normal, settings.interpolate)
    };
    if color[3] <= 0.0 {
        return TRANSPARENT;
    }

    // thresholding last, so a failure clears RGB as well as alpha
    let passed = match settings.threshold_type {
        ThresholdType::Off => true,
        ThresholdType::Normal => match settings.threshold_test {
            ThresholdTest::ShowInside => {
                value >= settings.threshold_minimum && value <= settings.threshold_maximum
            }
            ThresholdTest::ShowOutside => {
                value > settings.threshold_maximum || value < settings.threshold_minimum
            }
        },
    };
    if !passed {
        return TRANSPARENT;
    }

    [
        component_to_byte(color[0]),
        component_to_byte(color[1]),
        component_to_byte(color[2]),
        component_to_byte(color[3]),
    ]
}

fn component_to_byte(component: f32) -> u8 {
    (component * 255.0).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use dconn_core::palette::{ScalarColor, ScaleMode};

    fn palette() -> Palette {
        Palette::new(
            "test",
            vec![
                ScalarColor {
                    scalar: 1.0,
                    color: [1.0, 0.0, 0.0, 1.0],
                },
                ScalarColor {
                    scalar: -1.0,
                    color: [0.0, 0.0, 1.0, 1.0],
                },
            ],
        )
    }

    fn user_settings() -> PaletteSettings {
        PaletteSettings {
            scale_mode: ScaleMode::User,
            user_scale_positive_minimum: 0.0,
            user_scale_positive_maximum: 10.0,
            user_scale_negative_minimum: 0.0,
            user_scale_negative_maximum: -10.0,
            ..PaletteSettings::default()
        }
    }

    fn run(settings: &PaletteSettings, values: &[f32]) -> Vec<u8> {
        let mut stats = FastStatistics::new();
        stats.update(values);
        let mut rgba = vec![0u8; values.len() * 4];
        color_scalars(&stats, settings, &palette(), values, &mut rgba);
        rgba
    }

    #[test]
    fn extremes_take_palette_endpoints() {
        let rgba = run(&user_settings(), &[10.0, -10.0]);
        assert_eq!(&rgba[0..4], &[255, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[0, 0, 255, 255]);
    }

    #[test]
    fn zero_is_hidden_by_default() {
        let rgba = run(&user_settings(), &[0.0]);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn hidden_positive_values_stay_transparent() {
        let mut settings = user_settings();
        settings.display_positive = false;
        let rgba = run(&settings, &[5.0, -10.0]);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 0]);
        assert_eq!(&rgba[4..8], &[0, 0, 255, 255]);
    }

    #[test]
    fn nan_is_never_colored() {
        let rgba = run(&user_settings(), &[f32::NAN]);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn inside_threshold_clears_failures() {
        let mut settings = user_settings();
        settings.threshold_type = ThresholdType::Normal;
        settings.threshold_test = ThresholdTest::ShowInside;
        settings.threshold_minimum = -1.0;
        settings.threshold_maximum = 1.0;
        let rgba = run(&settings, &[5.0, 0.5]);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 0]);
        assert_ne!(&rgba[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn outside_threshold_inverts_the_test() {
        let mut settings = user_settings();
        settings.threshold_type = ThresholdType::Normal;
        settings.threshold_test = ThresholdTest::ShowOutside;
        settings.threshold_minimum = -1.0;
        settings.threshold_maximum = 1.0;
        let rgba = run(&settings, &[5.0, 0.5]);
        assert_ne!(&rgba[0..4], &[0, 0, 0, 0]);
        assert_eq!(&rgba[4..8], &[0, 0, 0, 0]);
    }
}
