use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::core::PlotValue;

const MAX_PRECISION: usize = 12;

/// Fixed-precision decimal with trailing zeros (and a bare point) removed.
pub(crate) fn format_value(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return "nan".to_owned();
    }
    let precision = precision.min(MAX_PRECISION);
    let mut text = format!("{value:.precision$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}

/// Decimals needed to tell ticks `step` apart.
pub(crate) fn precision_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 {
        return 0;
    }
    let decimals = -step.log10().floor();
    if decimals <= 0.0 {
        0
    } else {
        (decimals as usize).min(MAX_PRECISION)
    }
}

/// Legend text for one cell: `O 10 H 15 L 8 C 12` for candles.
pub(crate) fn format_plot_value(value: PlotValue, precision: usize) -> String {
    match value {
        PlotValue::Scalar(v) => format_value(v, precision),
        PlotValue::Candle(candle) => format!(
            "O {} H {} L {} C {}",
            format_value(candle.open, precision),
            format_value(candle.high, precision),
            format_value(candle.low, precision),
            format_value(candle.close, precision),
        ),
    }
}

/// Formats `time` with a strftime pattern, falling back to RFC 3339.
pub(crate) fn format_time(time: DateTime<Utc>, pattern: &str) -> String {
    let mut text = String::new();
    if write!(text, "{}", time.format(pattern)).is_err() {
        return time.to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    text
}

/// Backend-independent width estimate used to size label boxes.
pub(crate) fn estimate_text_width_px(text: &str, font_size_px: f64) -> f64 {
    let units = text.chars().fold(0.0, |acc, ch| {
        acc + match ch {
            '0'..='9' => 0.62,
            '.' | ',' | ':' => 0.34,
            '-' | '+' | '/' => 0.42,
            ' ' => 0.33,
            _ => 0.58,
        }
    });
    (units * font_size_px).max(font_size_px)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::{format_plot_value, format_time, format_value, precision_for_step};
    use crate::core::{CandleValue, PlotValue};

    #[test]
    fn values_drop_trailing_zeros() {
        assert_eq!(format_value(12.5, 3), "12.5");
        assert_eq!(format_value(12.0, 3), "12");
        assert_eq!(format_value(-0.0001, 2), "0");
        assert_eq!(format_value(1234.5678, 2), "1234.57");
        assert_eq!(format_value(f64::NAN, 2), "nan");
    }

    #[test]
    fn precision_follows_tick_step() {
        assert_eq!(precision_for_step(2.0), 0);
        assert_eq!(precision_for_step(0.5), 1);
        assert_eq!(precision_for_step(0.02), 2);
        assert_eq!(precision_for_step(0.0), 0);
    }

    #[test]
    fn candle_legend_lists_all_four_prices() {
        let text = format_plot_value(PlotValue::Candle(CandleValue::new(10.0, 15.0, 8.0, 12.25)), 3);
        assert_eq!(text, "O 10 H 15 L 8 C 12.25");
    }

    #[test]
    fn bad_pattern_falls_back_to_rfc3339() {
        let time = DateTime::from_timestamp(1_672_531_260, 0).expect("time");
        assert_eq!(format_time(time, "%d/%m, %H:%M"), "01/01, 00:01");
        assert_eq!(format_time(time, "%Q"), "2023-01-01T00:01:00Z");
    }
}
