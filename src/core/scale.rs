use crate::error::{ChartError, ChartResult};

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Continuous value-to-pixel mapping.
///
/// The pixel range may be inverted (`range_start > range_end`), which is how
/// value axes put larger values higher on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(
        domain_start: f64,
        domain_end: f64,
        range_start: f64,
        range_end: f64,
    ) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start,
            range_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Value to pixel. Values outside the domain extrapolate linearly.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    /// Pixel to value, clamping the pixel into the range first.
    ///
    /// A pixel past either edge resolves to the nearest domain bound and a
    /// non-finite pixel resolves to the domain start.
    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let span = self.range_end - self.range_start;
        if !pixel.is_finite() || span == 0.0 {
            return self.domain_start;
        }
        let low = self.range_start.min(self.range_end);
        let high = self.range_start.max(self.range_end);
        let normalized = (pixel.clamp(low, high) - self.range_start) / span;
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }

    /// Round tick values inside the domain, stepping by 1, 2 or 5 × 10ⁿ.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        let (start, stop) = if self.domain_start <= self.domain_end {
            (self.domain_start, self.domain_end)
        } else {
            (self.domain_end, self.domain_start)
        };
        nice_ticks(start, stop, count)
    }
}

fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let step = (stop - start) / count.max(0.0);
    if !step.is_finite() || step <= 0.0 {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10_f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (first, last, increment) = if power < 0.0 {
        let inverse = 10_f64.powf(-power) / factor;
        let mut first = (start * inverse).round() as i64;
        let mut last = (stop * inverse).round() as i64;
        if (first as f64) / inverse < start {
            first += 1;
        }
        if (last as f64) / inverse > stop {
            last -= 1;
        }
        (first, last, -inverse)
    } else {
        let increment = 10_f64.powf(power) * factor;
        let mut first = (start / increment).round() as i64;
        let mut last = (stop / increment).round() as i64;
        if (first as f64) * increment < start {
            first += 1;
        }
        if (last as f64) * increment > stop {
            last -= 1;
        }
        (first, last, increment)
    };

    if last < first && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((first, last, increment))
}

/// Tick values between `start` and `stop` (inclusive) for about `count` ticks.
#[must_use]
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let Some((first, last, increment)) = tick_spec(start, stop, count as f64) else {
        return Vec::new();
    };
    if last < first {
        return Vec::new();
    }
    (first..=last)
        .map(|index| {
            if increment < 0.0 {
                index as f64 / -increment
            } else {
                index as f64 * increment
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{LinearScale, nice_ticks};

    #[test]
    fn inverted_range_maps_larger_values_higher() {
        let scale = LinearScale::new(0.0, 100.0, 200.0, 0.0).expect("scale");
        assert_relative_eq!(scale.map(0.0), 200.0);
        assert_relative_eq!(scale.map(100.0), 0.0);
        assert_relative_eq!(scale.map(25.0), 150.0);
    }

    #[test]
    fn invert_clamps_to_domain_edges() {
        let scale = LinearScale::new(10.0, 20.0, 100.0, 0.0).expect("scale");
        assert_relative_eq!(scale.invert(50.0), 15.0);
        assert_relative_eq!(scale.invert(-40.0), 20.0);
        assert_relative_eq!(scale.invert(400.0), 10.0);
        assert_relative_eq!(scale.invert(f64::NAN), 10.0);
    }

    #[test]
    fn zero_span_domain_is_rejected() {
        assert!(LinearScale::new(5.0, 5.0, 0.0, 100.0).is_err());
        assert!(LinearScale::new(0.0, 1.0, f64::NAN, 100.0).is_err());
    }

    #[test]
    fn nice_ticks_use_round_steps() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(7.2, 15.8, 5), vec![8.0, 10.0, 12.0, 14.0]);
        let small = nice_ticks(0.0, 1.0, 5);
        assert_eq!(small.len(), 6);
        assert_relative_eq!(small[3], 0.6);
        assert!(nice_ticks(0.0, 1.0, 0).is_empty());
    }
}
