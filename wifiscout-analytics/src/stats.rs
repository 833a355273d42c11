//! Small descriptive statistics over optional samples.

use wifiscout_core::quality::round_hundredths;

/// Running sum and count of the samples seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Accumulator {
    sum: f64,
    count: f64,
}

impl Accumulator {
    #[expect(
        clippy::float_arithmetic,
        reason = "accumulating a sum of samples"
    )]
    pub(crate) const fn push(&mut self, sample: f64) {
        self.sum += sample;
        self.count += 1.0;
    }

    /// Add `sample` when present; absent samples do not count.
    pub(crate) const fn push_present(&mut self, sample: Option<f64>) {
        if let Some(value) = sample {
            self.push(value);
        }
    }

    /// Mean rounded to hundredths, or `None` with no samples.
    #[expect(
        clippy::float_arithmetic,
        reason = "the mean divides the sum by the count"
    )]
    pub(crate) fn mean(self) -> Option<f64> {
        (self.count > 0.0).then(|| round_hundredths(self.sum / self.count))
    }
}

/// Mean of `samples`, rounded to hundredths.
pub(crate) fn mean(samples: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut acc = Accumulator::default();
    samples.into_iter().for_each(|sample| acc.push(sample));
    acc.mean()
}

/// Sample standard deviation (n - 1 denominator), rounded to hundredths.
///
/// Undefined for fewer than two samples.
#[expect(
    clippy::float_arithmetic,
    reason = "variance is a sum of squared deviations"
)]
pub(crate) fn sample_std_dev(samples: &[f64]) -> Option<f64> {
    let mut acc = Accumulator::default();
    samples.iter().for_each(|sample| acc.push(*sample));
    if acc.count < 2.0 {
        return None;
    }
    let centre = acc.sum / acc.count;
    let squares: f64 = samples.iter().map(|sample| (sample - centre).powi(2)).sum();
    Some(round_hundredths((squares / (acc.count - 1.0)).sqrt()))
}
