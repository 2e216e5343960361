//! Statistics over the cached row buffer
//!
//! [`FastStatistics`] classifies values in a single pass (positive,
//! negative, zero, NaN, infinite), tracks signed and absolute extremes,
//! computes a numerically stable mean and standard deviation, and keeps
//! positive/negative/absolute percentile histograms for the palette
//! auto-scale modes.

mod descriptive;
mod histogram;

pub use descriptive::DescriptiveStatistics;
pub use histogram::Histogram;

/// Bucket cap for the percentile histograms.
const PERCENTILE_HISTOGRAM_BUCKETS: usize = 10_000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FastStatistics {
    pos_count: i64,
    zero_count: i64,
    neg_count: i64,
    inf_count: i64,
    neg_inf_count: i64,
    nan_count: i64,
    mean: f32,
    std_dev_population: f32,
    std_dev_sample: f32,
    most_neg: f32,
    least_neg: f32,
    least_pos: f32,
    most_pos: f32,
    min: f32,
    max: f32,
    neg_percent_hist: Histogram,
    pos_percent_hist: Histogram,
    abs_percent_hist: Histogram,
}

impl FastStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute everything from the given buffer. An empty buffer yields
    /// the all-zero snapshot.
    pub fn update(&mut self, data: &[f32]) {
        *self = Self::default();
        if data.is_empty() {
            return;
        }

        let mut positives = Vec::new();
        let mut negatives = Vec::new();
        let mut absolutes = Vec::new();
        let mut least_neg = f32::MIN;
        let mut least_pos = f32::MAX;
        let mut sum = 0.0f64;
        let mut first = true;

        for &value in data {
            if value.is_nan() {
                self.nan_count += 1;
                continue;
            }
            if value == 0.0 {
                self.zero_count += 1;
            } else if value < 0.0 {
                if value.is_infinite() {
                    self.neg_inf_count += 1;
                    continue;
                }
                negatives.push(value);
                self.neg_count += 1;
                if value > least_neg {
                    least_neg = value;
                }
                if value < self.most_neg {
                    self.most_neg = value;
                }
                absolutes.push(-value);
            } else {
                if value.is_infinite() {
                    self.inf_count += 1;
                    continue;
                }
                positives.push(value);
                self.pos_count += 1;
                if value > self.most_pos {
                    self.most_pos = value;
                }
                if value < least_pos {
                    least_pos = value;
                }
                absolutes.push(value);
            }
            if first || value > self.max {
                self.max = value;
            }
            if first || value < self.min {
                self.min = value;
            }
            sum += value as f64;
            first = false;
        }

        let total_good = self.neg_count + self.zero_count + self.pos_count;
        if total_good > 0 {
            self.mean = (sum / total_good as f64) as f32;

            // second pass for a stable standard deviation
            let mut sum_sq = 0.0f64;
            for &value in data {
                if !value.is_finite() {
                    continue;
                }
                let diff = (value - self.mean) as f64;
                sum_sq += diff * diff;
            }
            self.std_dev_population = (sum_sq / total_good as f64).sqrt() as f32;
            if total_good > 1 {
                self.std_dev_sample = (sum_sq / (total_good - 1) as f64).sqrt() as f32;
            }
        }

        let buckets = PERCENTILE_HISTOGRAM_BUCKETS.min(data.len());
        self.neg_percent_hist.update(buckets, &negatives);
        self.pos_percent_hist.update(buckets, &positives);
        self.abs_percent_hist.update(buckets, &absolutes);

        if self.neg_count > 0 {
            self.least_neg = least_neg;
        } else {
            self.most_neg = 0.0;
        }
        if self.pos_count > 0 {
            self.least_pos = least_pos;
        } else {
            self.most_pos = 0.0;
        }
    }

    pub fn mean(&self) -> f32 {
        self.mean
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn most_negative_value(&self) -> f32 {
        self.most_neg
    }

    pub fn least_negative_value(&self) -> f32 {
        self.least_neg
    }

    pub fn least_positive_value(&self) -> f32 {
        self.least_pos
    }

    pub fn most_positive_value(&self) -> f32 {
        self.most_pos
    }

    pub fn standard_deviation_population(&self) -> f32 {
        self.std_dev_population
    }

    pub fn standard_deviation_sample(&self) -> f32 {
        self.std_dev_sample
    }

    pub fn positive_count(&self) -> i64 {
        self.pos_count
    }

    pub fn negative_count(&self) -> i64 {
        self.neg_count
    }

    pub fn zero_count(&self) -> i64 {
        self.zero_count
    }

    pub fn nan_count(&self) -> i64 {
        self.nan_count
    }

    pub fn total_count(&self) -> i64 {
        self.neg_count + self.zero_count + self.pos_count
    }

    /// Extremes of the nonzero data, used by the palette auto-scale mode:
    /// `(most_negative, least_negative, least_positive, most_positive)`.
    pub fn nonzero_ranges(&self) -> (f32, f32, f32, f32) {
        let least_neg = if self.neg_count > 0 { self.least_neg } else { 0.0 };
        let least_pos = if self.pos_count > 0 { self.least_pos } else { 0.0 };
        (self.most_neg, least_neg, least_pos, self.most_pos)
    }

    /// Approximate value below which `percent` of the positive data falls.
    pub fn approx_positive_percentile(&self, percent: f32) -> f32 {
        let rank = percent / 100.0 * self.pos_count as f32;
        if rank <= 0.0 {
            return self.least_positive_value();
        }
        if rank >= self.pos_count as f32 {
            return self.most_positive_value();
        }
        interpolate_rank(&self.pos_percent_hist, rank)
            .unwrap_or_else(|| self.most_positive_value())
    }

    /// Approximate negative percentile; the histogram runs toward zero, so
    /// the rank is reversed.
    pub fn approx_negative_percentile(&self, percent: f32) -> f32 {
        let rank = self.neg_count as f32 - percent / 100.0 * self.neg_count as f32;
        if rank <= 0.0 {
            return self.most_negative_value();
        }
        if rank >= self.neg_count as f32 {
            return self.least_negative_value();
        }
        interpolate_rank(&self.neg_percent_hist, rank)
            .unwrap_or_else(|| self.least_negative_value())
    }

    /// Approximate percentile of the absolute nonzero values.
    pub fn approx_absolute_percentile(&self, percent: f32) -> f32 {
        let abs_count = (self.pos_count + self.neg_count) as f32;
        let rank = percent / 100.0 * abs_count;
        let (least_abs, most_abs) = self.abs_percent_hist.range();
        if rank <= 0.0 {
            return least_abs;
        }
        if rank >= abs_count {
            return most_abs;
        }
        interpolate_rank(&self.abs_percent_hist, rank).unwrap_or(most_abs)
    }
}

/// Value at a fractional rank of a histogram's cumulative counts, by
/// linear interpolation inside the matching bucket.
fn interpolate_rank(hist: &Histogram, rank: f32) -> Option<f32> {
    let cumulative = hist.cumulative_counts();
    if cumulative.is_empty() {
        return None;
    }
    let bucket = cumulative.partition_point(|&c| (c as f32) < rank);
    if bucket >= cumulative.len() {
        return None;
    }
    let below = if bucket == 0 { 0 } else { cumulative[bucket - 1] };
    let in_bucket = cumulative[bucket] - below;
    let fraction = if in_bucket > 0 {
        (rank - below as f32) / in_bucket as f32
    } else {
        0.0
    };
    let (min, max) = hist.range();
    let bucket_size = (max - min) / cumulative.len() as f32;
    Some(min + (bucket as f32 + fraction) * bucket_size)
}
