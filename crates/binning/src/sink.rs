//! Bin sinks: consumers of output bins.

use crate::error::{BinningError, Result};
use crate::types::BinOutput;
use serde::Serialize;
use std::io::Write;

/// Receives the output records of a run in ascending bin index order.
pub trait BinSink {
    /// Called once before the first bin with the output feature names.
    fn begin(&mut self, _feature_names: &[String]) -> Result<()> {
        Ok(())
    }

    fn consume(&mut self, bin: BinOutput) -> Result<()>;

    /// Called once after the last bin.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps every bin in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub feature_names: Vec<String>,
    pub bins: Vec<BinOutput>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output value of `feature` for the bin at `index`, if both exist.
    pub fn value(&self, index: i64, feature: &str) -> Option<f32> {
        let column = self.feature_names.iter().position(|n| n == feature)?;
        self.bins
            .iter()
            .find(|bin| bin.index == index)
            .map(|bin| bin.features[column])
    }
}

impl BinSink for CollectingSink {
    fn begin(&mut self, feature_names: &[String]) -> Result<()> {
        self.feature_names = feature_names.to_vec();
        Ok(())
    }

    fn consume(&mut self, bin: BinOutput) -> Result<()> {
        self.bins.push(bin);
        Ok(())
    }
}

/// Writes one JSON object per line: a header line with the feature names,
/// then one line per bin. NaN features are written as `null`.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

#[derive(Serialize)]
struct Header<'a> {
    features: &'a [String],
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn bins_written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> BinSink for JsonLinesSink<W> {
    fn begin(&mut self, feature_names: &[String]) -> Result<()> {
        self.write_line(&Header {
            features: feature_names,
        })
    }

    fn consume(&mut self, bin: BinOutput) -> Result<()> {
        self.write_line(&bin)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| BinningError::sink_failed(format!("flush failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(index: i64, features: Vec<f32>) -> BinOutput {
        BinOutput {
            index,
            row: 0,
            center_lat: 1.5,
            center_lon: -2.5,
            num_obs: 3,
            num_passes: 1,
            features,
        }
    }

    #[test]
    fn test_collecting_sink_lookup() {
        let mut sink = CollectingSink::new();
        sink.begin(&["a".to_string(), "b".to_string()]).unwrap();
        sink.consume(bin(4, vec![1.0, 2.0])).unwrap();
        assert_eq!(sink.value(4, "b"), Some(2.0));
        assert_eq!(sink.value(5, "b"), None);
        assert_eq!(sink.value(4, "c"), None);
    }

    #[test]
    fn test_json_lines_output() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.begin(&["x_max".to_string()]).unwrap();
        sink.consume(bin(7, vec![f32::NAN])).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.bins_written(), 1);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], r#"{"features":["x_max"]}"#);
        let record: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(record["index"], 7);
        assert!(record["features"][0].is_null());
    }
}
