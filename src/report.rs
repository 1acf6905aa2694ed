//! This module renders a `Summary` for output, either as the plain text the step
//! calculators have always printed or as a JSON document.

use crate::notation::{wrap_digits, Scientific};
use crate::types::{Summary, SCIENTIFIC_PRECISION};
use serde::Serialize;

/// Controls how a `Summary` is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Characters per line of the exact value; 0 disables wrapping.
    pub width: usize,
    /// Whether to print the recorded sweep diagnostics.
    pub diagnostics: bool,
}

/// The machine-readable form of a `Summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub name: String,
    /// All digits of the step count.
    pub steps: String,
    pub digits: usize,
    pub scientific: String,
    pub sweep_exit: u64,
    pub sweep_len: u64,
    pub iterations: u64,
}

impl From<&Summary> for Report {
    fn from(summary: &Summary) -> Self {
        let steps = summary.steps.to_string();

        Report {
            name: summary.name.clone(),
            digits: steps.len(),
            steps,
            scientific: Scientific::new(&summary.steps, SCIENTIFIC_PRECISION).to_string(),
            sweep_exit: summary.sweep_exit,
            sweep_len: summary.sweep_len,
            iterations: summary.iterations,
        }
    }
}

/// Renders a summary as text.
///
/// Format, one item per line:
/// - with diagnostics, `sweep_len sweep_val` for each recorded sweep followed by
///   the final sweep length
/// - the exact step count, wrapped to `options.width`
/// - the step count in scientific notation
pub fn render_text(summary: &Summary, options: &ReportOptions) -> String {
    let mut lines = Vec::new();

    if options.diagnostics {
        for (sweep_len, sweep_val) in &summary.diagnostics {
            lines.push(format!("{} {}", sweep_len, sweep_val));
        }
        lines.push(summary.sweep_len.to_string());
    }

    lines.push(wrap_digits(&summary.steps.to_string(), options.width));
    lines.push(Scientific::new(&summary.steps, SCIENTIFIC_PRECISION).to_string());

    lines.join("\n")
}

/// Renders a summary as a pretty-printed JSON object.
pub fn render_json(summary: &Summary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Report::from(summary))
}

/// Renders several summaries as a pretty-printed JSON array.
pub fn render_json_all(summaries: &[Summary]) -> Result<String, serde_json::Error> {
    let reports: Vec<Report> = summaries.iter().map(Report::from).collect();
    serde_json::to_string_pretty(&reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn summary() -> Summary {
        Summary {
            name: "Test".to_string(),
            steps: BigUint::parse_bytes(b"123456789012", 10).unwrap(),
            sweep_exit: 8,
            sweep_len: 12,
            iterations: 12,
            diagnostics: vec![(1, BigUint::from(14u32)), (2, BigUint::from(44u32))],
        }
    }

    #[test]
    fn test_render_text() {
        let options = ReportOptions {
            width: 5,
            diagnostics: false,
        };

        assert_eq!(
            render_text(&summary(), &options),
            "12345\n67890\n12\n1.235e+11"
        );
    }

    #[test]
    fn test_render_text_unwrapped() {
        let options = ReportOptions {
            width: 0,
            diagnostics: false,
        };

        assert_eq!(render_text(&summary(), &options), "123456789012\n1.235e+11");
    }

    #[test]
    fn test_render_text_with_diagnostics() {
        let options = ReportOptions {
            width: 70,
            diagnostics: true,
        };

        assert_eq!(
            render_text(&summary(), &options),
            "1 14\n2 44\n12\n123456789012\n1.235e+11"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let options = ReportOptions {
            width: 70,
            diagnostics: true,
        };

        assert_eq!(
            render_text(&summary(), &options),
            render_text(&summary(), &options)
        );
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["name"], "Test");
        assert_eq!(value["steps"], "123456789012");
        assert_eq!(value["digits"], 12);
        assert_eq!(value["scientific"], "1.235e+11");
        assert_eq!(value["sweep_exit"], 8);
        assert_eq!(value["sweep_len"], 12);
    }

    #[test]
    fn test_render_json_all() {
        let json = render_json_all(&[summary(), summary()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[1]["scientific"], "1.235e+11");
    }
}
