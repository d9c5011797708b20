//! Results reporting and formatting.

use binning::{datetime_from_mjd, BinOutput, BinningSummary};
use chrono::{DateTime, Utc};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;

/// Statistics of one output feature over all bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureStats {
    pub name: String,
    /// Bins with a non-NaN value.
    pub valid: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FeatureStats {
    /// Statistics of feature column `column` over `bins`.
    pub fn compute(name: &str, column: usize, bins: &[BinOutput]) -> Self {
        let mut stats = Self {
            name: name.to_string(),
            valid: 0,
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
        };
        let mut sum = 0.0;
        for value in bins.iter().filter_map(|b| b.features.get(column)) {
            if value.is_nan() {
                continue;
            }
            let value = *value as f64;
            stats.min = if stats.valid == 0 { value } else { stats.min.min(value) };
            stats.max = if stats.valid == 0 { value } else { stats.max.max(value) };
            sum += value;
            stats.valid += 1;
        }
        if stats.valid > 0 {
            stats.mean = sum / stats.valid as f64;
        }
        stats
    }
}

/// Everything reported about one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResults {
    pub scenario_name: String,
    pub grid: String,
    pub num_rows: usize,
    pub grid_bins: i64,
    pub summary: BinningSummary,
    /// UTC times of the first and last pass.
    pub first_pass: Option<DateTime<Utc>>,
    pub last_pass: Option<DateTime<Utc>>,
    pub features: Vec<FeatureStats>,
}

impl RunResults {
    pub fn new(
        scenario_name: &str,
        grid: &str,
        num_rows: usize,
        grid_bins: i64,
        summary: BinningSummary,
        feature_names: &[String],
        bins: &[BinOutput],
    ) -> Self {
        let features = feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| FeatureStats::compute(name, i, bins))
            .collect();
        Self {
            scenario_name: scenario_name.to_string(),
            grid: grid.to_string(),
            num_rows,
            grid_bins,
            summary,
            first_pass: None,
            last_pass: None,
            features,
        }
    }

    /// Record the pass times, given as modified Julian days.
    pub fn with_pass_period(mut self, first_mjd: f64, last_mjd: f64) -> Self {
        self.first_pass = datetime_from_mjd(first_mjd);
        self.last_pass = datetime_from_mjd(last_mjd);
        self
    }

    /// Share of grid bins that received data, in percent.
    pub fn coverage_percent(&self) -> f64 {
        if self.grid_bins <= 0 {
            return 0.0;
        }
        self.summary.num_output_bins as f64 / self.grid_bins as f64 * 100.0
    }
}

/// Formats run results for output.
pub struct ResultsReport;

impl ResultsReport {
    /// Format results as a console table.
    pub fn format_table(results: &RunResults) -> String {
        let summary = &results.summary;
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                format!("Binning Results: {}", results.scenario_name),
                String::new(),
            ]);

        table.add_row(vec![
            "Grid:".to_string(),
            format!("{} ({} rows, {} bins)", results.grid, results.num_rows, results.grid_bins),
        ]);
        table.add_row(vec!["Passes:".to_string(), summary.num_passes.to_string()]);
        if let (Some(first), Some(last)) = (results.first_pass, results.last_pass) {
            table.add_row(vec![
                "Period:".to_string(),
                format!("{} .. {}", first.to_rfc3339(), last.to_rfc3339()),
            ]);
        }
        table.add_row(vec![
            "Observations:".to_string(),
            format!("{} read / {} binned", summary.num_observations, summary.num_binned),
        ]);
        table.add_row(vec![
            "Bins:".to_string(),
            format!(
                "{} spatial / {} output ({:.3}% coverage)",
                summary.num_spatial_bins,
                summary.num_output_bins,
                results.coverage_percent()
            ),
        ]);
        table.add_row(vec!["Elapsed:".to_string(), format!("{} ms", summary.elapsed_ms)]);

        table.add_row(vec![String::new(), String::new()]);
        table.add_row(vec!["Feature".to_string(), "valid / min / mean / max".to_string()]);
        for f in &results.features {
            table.add_row(vec![
                f.name.clone(),
                format!("{} / {:.4} / {:.4} / {:.4}", f.valid, f.min, f.mean, f.max),
            ]);
        }

        table.to_string()
    }

    /// Format results as JSON.
    pub fn format_json(results: &RunResults) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(results)?)
    }

    /// Format results as CSV row.
    pub fn format_csv(results: &RunResults) -> String {
        let summary = &results.summary;
        format!(
            "{},{},{},{},{},{},{},{},{:.3},{}",
            chrono::Utc::now().to_rfc3339(),
            results.scenario_name,
            results.grid,
            results.num_rows,
            summary.num_passes,
            summary.num_observations,
            summary.num_binned,
            summary.num_output_bins,
            results.coverage_percent(),
            summary.elapsed_ms
        )
    }

    /// CSV header row.
    pub fn csv_header() -> &'static str {
        "timestamp,scenario,grid,num_rows,passes,observations,binned,output_bins,coverage,elapsed_ms"
    }
}
