//! Bucketed value histogram with cumulative counts

/// Histogram over a data range, with cumulative counts for percentile
/// queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    counts: Vec<i64>,
    cumulative: Vec<i64>,
    min: f32,
    max: f32,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the histogram from the given values. NaN and infinite
    /// values are ignored; an empty input clears the histogram.
    pub fn update(&mut self, number_of_buckets: usize, data: &[f32]) {
        self.counts.clear();
        self.cumulative.clear();
        self.min = 0.0;
        self.max = 0.0;
        if number_of_buckets == 0 {
            return;
        }

        let mut min = f32::MAX;
        let mut max = f32::MIN;
        let mut any = false;
        for &value in data {
            if !value.is_finite() {
                continue;
            }
            if value < min {
                min = value;
            }
            if value > max {
                max = value;
            }
            any = true;
        }
        if !any {
            return;
        }
        self.min = min;
        self.max = max;

        self.counts = vec![0; number_of_buckets];
        let range = max - min;
        for &value in data {
            if !value.is_finite() {
                continue;
            }
            let bucket = if range > 0.0 {
                (((value - min) / range) * number_of_buckets as f32) as usize
            } else {
                0
            };
            let bucket = bucket.min(number_of_buckets - 1);
            self.counts[bucket] += 1;
        }

        let mut running = 0;
        self.cumulative = self
            .counts
            .iter()
            .map(|&count| {
                running += count;
                running
            })
            .collect();
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn counts(&self) -> &[i64] {
        &self.counts
    }

    pub fn cumulative_counts(&self) -> &[i64] {
        &self.cumulative
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
