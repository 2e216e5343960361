//! Descriptive statistics computed on demand

/// Exact summary statistics over a value buffer. Unlike
/// [`FastStatistics`](super::FastStatistics) these sort the data for the
/// median, so map content invalidates and recomputes them lazily.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptiveStatistics {
    valid: bool,
    mean: f32,
    std_dev_population: f32,
    std_dev_sample: f32,
    median: f32,
    min: f32,
    max: f32,
}

impl DescriptiveStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn update(&mut self, data: &[f32]) {
        *self = Self::default();
        self.valid = true;

        let mut sorted: Vec<f32> = data.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        self.min = sorted[0];
        self.max = sorted[count - 1];
        self.median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };

        let sum: f64 = sorted.iter().map(|&v| v as f64).sum();
        let mean = sum / count as f64;
        self.mean = mean as f32;

        let sum_sq: f64 = sorted
            .iter()
            .map(|&v| {
                let diff = v as f64 - mean;
                diff * diff
            })
            .sum();
        self.std_dev_population = (sum_sq / count as f64).sqrt() as f32;
        if count > 1 {
            self.std_dev_sample = (sum_sq / (count - 1) as f64).sqrt() as f32;
        }
    }

    pub fn mean(&self) -> f32 {
        self.mean
    }

    pub fn median(&self) -> f32 {
        self.median
    }

    pub fn standard_deviation_population(&self) -> f32 {
        self.std_dev_population
    }

    pub fn standard_deviation_sample(&self) -> f32 {
        self.std_dev_sample
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_small_buffer() {
        let mut stats = DescriptiveStatistics::new();
        stats.update(&[4.0, 1.0, 3.0, 2.0]);
        assert!(stats.is_valid());
        assert_eq!(stats.min(), 1.0);
        assert_eq!(stats.max(), 4.0);
        assert_eq!(stats.mean(), 2.5);
        assert_eq!(stats.median(), 2.5);
    }

    #[test]
    fn invalidation() {
        let mut stats = DescriptiveStatistics::new();
        stats.update(&[1.0]);
        stats.invalidate();
        assert!(!stats.is_valid());
    }

    #[test]
    fn nan_values_are_skipped() {
        let mut stats = DescriptiveStatistics::new();
        stats.update(&[f32::NAN, 2.0, 4.0]);
        assert_eq!(stats.mean(), 3.0);
        assert_eq!(stats.median(), 3.0);
    }
}
