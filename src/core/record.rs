use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::core::primitives::{decimal_to_f64, millis_to_datetime, parse_iso_timestamp};
use crate::core::{CandleValue, DataSourceId};
use crate::error::{ChartError, ChartResult};

/// `[isoTimestamp, open, high, low, close, volume]` candle record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "OhlcvTuple")]
pub struct OhlcvRecord {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Deserialize)]
struct OhlcvTuple(
    #[serde(deserialize_with = "deserialize_instant")] DateTime<Utc>,
    f64,
    f64,
    f64,
    f64,
    f64,
);

impl From<OhlcvTuple> for OhlcvRecord {
    fn from(tuple: OhlcvTuple) -> Self {
        let OhlcvTuple(timestamp, open, high, low, close, volume) = tuple;
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OhlcvRecord {
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Builds a record from exact decimal prices.
    pub fn from_decimal(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> ChartResult<Self> {
        Ok(Self::new(
            timestamp,
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
            decimal_to_f64(volume, "volume")?,
        ))
    }

    #[must_use]
    pub fn candle(&self) -> CandleValue {
        CandleValue::new(self.open, self.high, self.low, self.close)
    }
}

/// `{timestamp, value}` scalar record (`ts`/`v` accepted as short keys).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValueRecord {
    #[serde(alias = "ts", deserialize_with = "deserialize_instant")]
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "v")]
    pub value: f64,
}

impl ValueRecord {
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// One opaque source record; only plot extractors give it meaning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawRecord {
    Ohlcv(OhlcvRecord),
    Value(ValueRecord),
    Other(serde_json::Value),
}

impl RawRecord {
    /// Timestamp of the built-in shapes. Custom records need their own extractor.
    #[must_use]
    pub fn builtin_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Ohlcv(record) => Some(record.timestamp),
            Self::Value(record) => Some(record.timestamp),
            Self::Other(_) => None,
        }
    }

    #[must_use]
    pub fn builtin_candle(&self) -> Option<CandleValue> {
        match self {
            Self::Ohlcv(record) => Some(record.candle()),
            Self::Value(_) | Self::Other(_) => None,
        }
    }

    /// Scalar view of the built-in shapes; candles contribute their close.
    #[must_use]
    pub fn builtin_scalar(&self) -> Option<f64> {
        match self {
            Self::Ohlcv(record) => Some(record.close),
            Self::Value(record) => Some(record.value),
            Self::Other(_) => None,
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Other(value) => Some(value),
            Self::Ohlcv(_) | Self::Value(_) => None,
        }
    }
}

impl From<OhlcvRecord> for RawRecord {
    fn from(record: OhlcvRecord) -> Self {
        Self::Ohlcv(record)
    }
}

impl From<ValueRecord> for RawRecord {
    fn from(record: ValueRecord) -> Self {
        Self::Value(record)
    }
}

impl From<serde_json::Value> for RawRecord {
    fn from(value: serde_json::Value) -> Self {
        Self::Other(value)
    }
}

/// Raw input keyed by data-source id, each an ordered record sequence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct GraphData {
    series: IndexMap<DataSourceId, Vec<RawRecord>>,
}

impl GraphData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_series<I, T>(mut self, id: impl Into<DataSourceId>, records: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawRecord>,
    {
        self.insert(id, records);
        self
    }

    pub fn insert<I, T>(&mut self, id: impl Into<DataSourceId>, records: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<RawRecord>,
    {
        self.series
            .insert(id.into(), records.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn series(&self, id: &str) -> Option<&[RawRecord]> {
        self.series.get(id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DataSourceId, &[RawRecord])> {
        self.series.iter().map(|(id, records)| (id, records.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.values().all(Vec::is_empty)
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse graph data json: {e}")))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InstantRepr {
    Text(String),
    Millis(i64),
}

fn deserialize_instant<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match InstantRepr::deserialize(deserializer)? {
        InstantRepr::Text(text) => parse_iso_timestamp(&text).map_err(serde::de::Error::custom),
        InstantRepr::Millis(millis) => millis_to_datetime(millis)
            .ok_or_else(|| serde::de::Error::custom("epoch millis out of range")),
    }
}

#[cfg(test)]
mod tests {
    use super::{GraphData, RawRecord};

    #[test]
    fn json_payload_decodes_both_builtin_shapes_and_custom_records() {
        let data = GraphData::from_json_str(
            r#"{
                "nifty": [["2023-01-02T09:15:00Z", 10.0, 15.0, 8.0, 12.0, 1000.0]],
                "rsi": [{"ts": "2023-01-02T09:15:00Z", "v": 55.5}],
                "news": [{"headline": "rates", "at": 1672650900000}]
            }"#,
        )
        .expect("valid json");

        assert!(matches!(data.series("nifty"), Some([RawRecord::Ohlcv(_)])));
        assert!(matches!(data.series("rsi"), Some([RawRecord::Value(v)]) if v.value == 55.5));
        assert!(matches!(data.series("news"), Some([RawRecord::Other(_)])));
        assert_eq!(data.record_count(), 3);
    }

    #[test]
    fn epoch_millis_are_accepted_for_value_records() {
        let data = GraphData::from_json_str(r#"{"px": [{"timestamp": 1672531200000, "value": 1}]}"#)
            .expect("valid json");
        let record = &data.series("px").expect("series")[0];
        assert_eq!(
            record.builtin_timestamp().map(|t| t.timestamp_millis()),
            Some(1_672_531_200_000)
        );
    }

    #[test]
    fn malformed_payload_reports_invalid_data() {
        let err = GraphData::from_json_str("[1, 2").expect_err("must fail");
        assert!(format!("{err}").contains("graph data json"));
    }
}
