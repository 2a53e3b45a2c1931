//! Console output of a finished run: table previews and the key findings,
//! either as text or as a single JSON document (`CHESSLENS_OUTPUT=json`).

pub mod outputformatter;

use serde_json::json;

use crate::config::OutputFormat;
use crate::error::PipelineError;
use crate::pipeline::RunSummary;
use crate::report::KeyFindings;

pub use outputformatter::{print_frame, render_frame};

/// Format an integer with ',' thousands separators.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn findings_lines(f: &KeyFindings) -> Vec<String> {
    let mut lines = vec![
        "Key Findings:".to_string(),
        format!("- Total games analyzed: {}", thousands(f.total_games)),
        format!("- Unique openings: {}", thousands(f.unique_openings)),
        match f.average_rating {
            Some(avg) => format!("- Average player rating: {}", avg),
            None => "- Average player rating: n/a".to_string(),
        },
    ];
    if let (Some(first), Some(last)) = (f.first_game_date, f.last_game_date) {
        lines.push(format!("- Games played between {} and {}", first, last));
    }
    lines
}

/// The single stderr line for a run that failed.
pub fn fatal_message(e: &PipelineError) -> String {
    format!("Error: [{}] {}", e.code_str(), e)
}

/// Print the end-of-run console summary.
pub fn print_summary(summary: &RunSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let doc = json!({
                "findings": summary.findings,
                "tables": summary.tables,
                "charts": summary.charts,
                "warnings": summary.warnings,
            });
            println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_else(|_| doc.to_string()));
        }
        OutputFormat::Text => {
            print_frame("Top openings by games played", &summary.report.opening_analysis);
            print_frame("Time management by strength", &summary.report.time_patterns);
            println!();
            for l in findings_lines(&summary.findings) {
                println!("{}", l);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(6_256_184), "6,256,184");
    }

    #[test]
    fn findings_text() {
        let f = KeyFindings {
            total_games: 12_345,
            unique_openings: 42,
            average_rating: Some(1743),
            first_game_date: NaiveDate::from_ymd_opt(2016, 6, 30),
            last_game_date: NaiveDate::from_ymd_opt(2016, 7, 31),
        };
        let lines = findings_lines(&f);
        assert_eq!(lines[1], "- Total games analyzed: 12,345");
        assert_eq!(lines[3], "- Average player rating: 1743");
        assert_eq!(lines[4], "- Games played between 2016-06-30 and 2016-07-31");
    }

    #[test]
    fn fatal_message_is_one_line_with_code() {
        let e = PipelineError::SchemaMismatch { missing: vec!["WhiteElo".into()] };
        let msg = fatal_message(&e);
        assert_eq!(msg, "Error: [schema_mismatch] schema mismatch: missing required column(s): WhiteElo");
        assert_eq!(msg.lines().count(), 1);
    }

    #[test]
    fn findings_without_games() {
        let f = KeyFindings { total_games: 0, unique_openings: 0, average_rating: None, first_game_date: None, last_game_date: None };
        let lines = findings_lines(&f);
        assert_eq!(lines.len(), 4);
        assert!(lines[3].ends_with("n/a"));
    }
}
