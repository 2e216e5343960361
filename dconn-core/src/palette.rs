//! Palette model and scalar-to-palette normalization
//!
//! A palette is a named list of scalar/color control points ordered by
//! descending scalar in [-1, 1]. Per-map [`PaletteSettings`] describe how
//! raw data is normalized into that range (auto, percentage, or user
//! scales) and which values are displayed or thresholded away.

use crate::stats::FastStatistics;

/// Values within this band of zero are treated as zero by the coloring
/// pipeline's sign test.
pub const SMALL_POSITIVE: f32 = 0.00001;
pub const SMALL_NEGATIVE: f32 = -0.00001;

/// Hack zone keeping a palette's special zero color out of interpolation.
const PALETTE_ZERO_COLOR_ZONE: f32 = 0.00001;

/// One palette control point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarColor {
    pub scalar: f32,
    pub color: [f32; 4],
}

/// Named color ramp over normalized scalars.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    name: String,
    points: Vec<ScalarColor>,
}

impl Palette {
    /// Build a palette from control points; points are sorted into the
    /// descending scalar order lookups expect.
    pub fn new(name: impl Into<String>, mut points: Vec<ScalarColor>) -> Self {
        points.sort_by(|a, b| b.scalar.total_cmp(&a.scalar));
        Self {
            name: name.into(),
            points,
        }
    }

    /// Black-to-white ramp used when a named palette cannot be resolved.
    pub fn neutral_gray() -> Self {
        Self::new(
            "Gray_Interp",
            vec![
                ScalarColor {
                    scalar: 1.0,
                    color: [1.0, 1.0, 1.0, 1.0],
                },
                ScalarColor {
                    scalar: -1.0,
                    color: [0.0, 0.0, 0.0, 1.0],
                },
            ],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color for a normalized scalar, clamped to [-1, 1]. Control points
    /// are in descending order; with interpolation enabled the bracketing
    /// pair is blended linearly.
    pub fn color(&self, scalar: f32, interpolate: bool) -> [f32; 4] {
        let scalar = scalar.clamp(-1.0, 1.0);
        let points = &self.points;
        match points.len() {
            0 => [0.0, 0.0, 0.0, 0.0],
            1 => points[0].color,
            _ => {
                if scalar >= points[0].scalar {
                    return points[0].color;
                }
                let last = points.len() - 1;
                if scalar <= points[last].scalar {
                    return points[last].color;
                }
                // find high/low bracketing pair
                let mut index = 0;
                while index < last && points[index + 1].scalar >= scalar {
                    index += 1;
                }
                let high = &points[index];
                let low = &points[index + 1];
                if !interpolate {
                    return high.color;
                }
                let span = high.scalar - low.scalar;
                let t = if span > 0.0 {
                    (scalar - low.scalar) / span
                } else {
                    0.0
                };
                let mut color = [0.0f32; 4];
                for (out, (lo, hi)) in color
                    .iter_mut()
                    .zip(low.color.iter().zip(high.color.iter()))
                {
                    *out = lo + t * (hi - lo);
                }
                color
            }
        }
    }
}

/// Lookup-by-name service for palettes.
pub trait PaletteSource {
    fn palette_by_name(&self, name: &str) -> Option<&Palette>;
}

/// How raw data is scaled into the normalized palette range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScaleMode {
    /// Full nonzero data range
    Auto,
    /// Percentiles of the absolute values
    AutoAbsolutePercentage,
    /// Separate positive/negative percentiles
    AutoPercentage,
    /// Fixed user-provided bounds
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThresholdType {
    Off,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThresholdTest {
    ShowInside,
    ShowOutside,
}

/// Per-map palette configuration, re-synced from the header on every load.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteSettings {
    pub selected_palette_name: String,
    pub scale_mode: ScaleMode,
    pub auto_percentage_negative_maximum: f32,
    pub auto_percentage_negative_minimum: f32,
    pub auto_percentage_positive_minimum: f32,
    pub auto_percentage_positive_maximum: f32,
    pub auto_absolute_percentage_minimum: f32,
    pub auto_absolute_percentage_maximum: f32,
    pub user_scale_negative_maximum: f32,
    pub user_scale_negative_minimum: f32,
    pub user_scale_positive_minimum: f32,
    pub user_scale_positive_maximum: f32,
    pub threshold_type: ThresholdType,
    pub threshold_test: ThresholdTest,
    pub threshold_minimum: f32,
    pub threshold_maximum: f32,
    pub display_positive: bool,
    pub display_negative: bool,
    pub display_zero: bool,
    pub interpolate: bool,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            selected_palette_name: "ROY-BIG-BL".to_string(),
            scale_mode: ScaleMode::AutoPercentage,
            auto_percentage_negative_maximum: 98.0,
            auto_percentage_negative_minimum: 2.0,
            auto_percentage_positive_minimum: 2.0,
            auto_percentage_positive_maximum: 98.0,
            auto_absolute_percentage_minimum: 2.0,
            auto_absolute_percentage_maximum: 98.0,
            user_scale_negative_maximum: -100.0,
            user_scale_negative_minimum: 0.0,
            user_scale_positive_minimum: 0.0,
            user_scale_positive_maximum: 100.0,
            threshold_type: ThresholdType::Off,
            threshold_test: ThresholdTest::ShowInside,
            threshold_minimum: -100.0,
            threshold_maximum: 100.0,
            display_positive: true,
            display_negative: true,
            display_zero: false,
            interpolate: true,
        }
    }
}

impl PaletteSettings {
    /// Mapping bounds for the active scale mode:
    /// `(most_negative, least_negative, least_positive, most_positive)`.
    fn mapping_bounds(&self, stats: &FastStatistics) -> (f32, f32, f32, f32) {
        match self.scale_mode {
            ScaleMode::Auto => stats.nonzero_ranges(),
            ScaleMode::AutoAbsolutePercentage => {
                let most = stats.approx_absolute_percentile(self.auto_absolute_percentage_maximum);
                let least = stats.approx_absolute_percentile(self.auto_absolute_percentage_minimum);
                (-most, -least, least, most)
            }
            ScaleMode::AutoPercentage => (
                stats.approx_negative_percentile(self.auto_percentage_negative_maximum),
                stats.approx_negative_percentile(self.auto_percentage_negative_minimum),
                stats.approx_positive_percentile(self.auto_percentage_positive_minimum),
                stats.approx_positive_percentile(self.auto_percentage_positive_maximum),
            ),
            ScaleMode::User => (
                self.user_scale_negative_maximum,
                self.user_scale_negative_minimum,
                self.user_scale_positive_minimum,
                self.user_scale_positive_maximum,
            ),
        }
    }

    /// Normalize data values into the palette range [-1, 1], keeping the
    /// zero-color zone clear on either side of zero.
    pub fn normalize_to_palette(
        &self,
        stats: &FastStatistics,
        data: &[f32],
        normalized: &mut [f32],
    ) {
        debug_assert_eq!(data.len(), normalized.len());
        let (most_neg, least_neg, least_pos, most_pos) = self.mapping_bounds(stats);

        let pos_denominator = (most_pos - least_pos) / (1.0 - PALETTE_ZERO_COLOR_ZONE);
        let pos_valid = pos_denominator != 0.0;
        let neg_denominator = (most_neg - least_neg) / (-1.0 + PALETTE_ZERO_COLOR_ZONE);
        let neg_valid = neg_denominator != 0.0;

        for (out, &value) in normalized.iter_mut().zip(data) {
            *out = if value > 0.0 {
                if pos_valid {
                    ((value - least_pos) / pos_denominator + PALETTE_ZERO_COLOR_ZONE)
                        .clamp(PALETTE_ZERO_COLOR_ZONE, 1.0)
                } else {
                    1.0
                }
            } else if value < 0.0 {
                if neg_valid {
                    ((value - least_neg) / neg_denominator - PALETTE_ZERO_COLOR_ZONE)
                        .clamp(-1.0, -PALETTE_ZERO_COLOR_ZONE)
                } else {
                    -1.0
                }
            } else {
                0.0
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_point_palette() -> Palette {
        Palette::new(
            "test",
            vec![
                ScalarColor {
                    scalar: -1.0,
                    color: [0.0, 0.0, 1.0, 1.0],
                },
                ScalarColor {
                    scalar: 1.0,
                    color: [1.0, 0.0, 0.0, 1.0],
                },
            ],
        )
    }

    #[test]
    fn color_endpoints_and_midpoint() {
        let palette = two_point_palette();
        assert_eq!(palette.color(1.0, true), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(palette.color(-1.0, true), [0.0, 0.0, 1.0, 1.0]);
        let mid = palette.color(0.0, true);
        assert!((mid[0] - 0.5).abs() < 1.0e-6);
        assert!((mid[2] - 0.5).abs() < 1.0e-6);
    }

    #[test]
    fn no_interpolation_uses_upper_point() {
        let palette = two_point_palette();
        assert_eq!(palette.color(0.2, false), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn out_of_range_scalars_clamp() {
        let palette = two_point_palette();
        assert_eq!(palette.color(5.0, true), palette.color(1.0, true));
        assert_eq!(palette.color(-5.0, true), palette.color(-1.0, true));
    }

    #[test]
    fn user_scale_normalization() {
        let settings = PaletteSettings {
            scale_mode: ScaleMode::User,
            user_scale_positive_minimum: 0.0,
            user_scale_positive_maximum: 10.0,
            user_scale_negative_minimum: 0.0,
            user_scale_negative_maximum: -10.0,
            ..PaletteSettings::default()
        };
        let stats = FastStatistics::new();
        let data = [10.0f32, 5.0, 0.0, -10.0];
        let mut normalized = [0.0f32; 4];
        settings.normalize_to_palette(&stats, &data, &mut normalized);
        assert!((normalized[0] - 1.0).abs() < 1.0e-4);
        assert!((normalized[1] - 0.5).abs() < 1.0e-3);
        assert_eq!(normalized[2], 0.0);
        assert!((normalized[3] + 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn degenerate_scale_pins_to_extremes() {
        let settings = PaletteSettings {
            scale_mode: ScaleMode::User,
            user_scale_positive_minimum: 5.0,
            user_scale_positive_maximum: 5.0,
            user_scale_negative_minimum: -5.0,
            user_scale_negative_maximum: -5.0,
            ..PaletteSettings::default()
        };
        let stats = FastStatistics::new();
        let data = [3.0f32, -3.0];
        let mut normalized = [0.0f32; 2];
        settings.normalize_to_palette(&stats, &data, &mut normalized);
        assert_eq!(normalized, [1.0, -1.0]);
    }
}
