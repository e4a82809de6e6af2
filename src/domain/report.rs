//! Report assembly: records to a rendered tabular dataset.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::metrics::Metric;
use crate::domain::record::{COLUMNS, TickerRecord};

pub const DEFAULT_RATIO_DECIMALS: usize = 3;

/// Rendered dataset: a fixed header and one row per recorded ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn empty() -> Self {
        Self {
            headers: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fixed decimal convention for numeric cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellFormat {
    pub currency_decimals: usize,
    pub ratio_decimals: usize,
}

impl Default for CellFormat {
    fn default() -> Self {
        Self {
            currency_decimals: 0,
            ratio_decimals: DEFAULT_RATIO_DECIMALS,
        }
    }
}

impl CellFormat {
    fn currency(&self, value: Option<f64>) -> String {
        value.map_or_else(String::new, |v| fixed(v, self.currency_decimals))
    }

    fn ratio(&self, metric: Metric) -> String {
        metric
            .value()
            .map_or_else(String::new, |v| fixed(v, self.ratio_decimals))
    }
}

/// Render records in the given order. Undefined cells become empty strings.
pub fn assemble(records: &[TickerRecord], format: &CellFormat) -> Dataset {
    let mut dataset = Dataset::empty();
    dataset.rows = records
        .iter()
        .map(|r| {
            vec![
                r.ticker.clone(),
                format.currency(r.equity),
                format.currency(r.cash),
                format.currency(Some(r.debt)),
                format.currency(r.net_income),
                format.ratio(r.faustmann),
                format.ratio(r.roic),
                format.ratio(r.debt_to_equity),
                format.ratio(r.pe),
            ]
        })
        .collect();
    dataset
}

/// `<prefix>_<YYYY>_<MonthName>.csv`, e.g. `Greenblatt_2026_October.csv`.
pub fn report_file_name(prefix: &str, run_date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, run_date.format("%Y_%B"))
}

pub fn report_destination(dir: &Path, prefix: &str, run_date: NaiveDate) -> PathBuf {
    dir.join(report_file_name(prefix, run_date))
}

fn fixed(value: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, value);
    // "-0.000" reads as a real negative number; print it as zero.
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::Undefined;

    fn record(ticker: &str) -> TickerRecord {
        TickerRecord {
            ticker: ticker.to_string(),
            equity: Some(1_000_000.4),
            cash: Some(250_000.0),
            debt: 125_000.0,
            net_income: Some(-42_000.6),
            faustmann: Metric::Defined(2.34567),
            roic: Metric::Defined(-0.1),
            debt_to_equity: Metric::Defined(0.125),
            pe: Metric::Undefined(Undefined::ZeroDenominator),
        }
    }

    #[test]
    fn empty_input_gives_headers_only() {
        let ds = assemble(&[], &CellFormat::default());
        assert_eq!(
            ds.headers,
            vec![
                "Ticker",
                "Equity",
                "Cash",
                "Debt",
                "NetIncome",
                "Faustmann",
                "ROIC",
                "DebtToEquity",
                "PE"
            ]
        );
        assert!(ds.is_empty());
    }

    #[test]
    fn rows_keep_record_order() {
        let ds = assemble(&[record("B"), record("A"), record("C")], &CellFormat::default());
        let tickers: Vec<_> = ds.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(tickers, vec!["B", "A", "C"]);
    }

    #[test]
    fn cells_use_fixed_decimals() {
        let ds = assemble(&[record("ACME")], &CellFormat::default());
        assert_eq!(
            ds.rows[0],
            vec![
                "ACME", "1000000", "250000", "125000", "-42001", "2.346", "-0.100", "0.125", ""
            ]
        );
    }

    #[test]
    fn undefined_and_missing_cells_are_empty_not_zero() {
        let mut r = record("ZERO");
        r.equity = None;
        r.faustmann = Metric::Undefined(Undefined::ZeroDenominator);
        let ds = assemble(&[r], &CellFormat::default());
        assert_eq!(ds.rows[0][1], "");
        assert_eq!(ds.rows[0][5], "");
        assert_eq!(ds.rows[0][3], "125000");
    }

    #[test]
    fn ratio_decimals_configurable() {
        let format = CellFormat {
            currency_decimals: 0,
            ratio_decimals: 1,
        };
        let ds = assemble(&[record("ACME")], &format);
        assert_eq!(ds.rows[0][5], "2.3");
    }

    #[test]
    fn negative_zero_renders_as_zero() {
        assert_eq!(fixed(-0.0, 3), "0.000");
        assert_eq!(fixed(-0.0001, 3), "0.000");
        assert_eq!(fixed(-1.5, 1), "-1.5");
    }

    #[test]
    fn file_name_includes_year_and_month() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(
            report_file_name("Greenblatt", date),
            "Greenblatt_2026_October.csv"
        );
        assert_eq!(
            report_destination(Path::new("out"), "Greenblatt", date),
            PathBuf::from("out/Greenblatt_2026_October.csv")
        );
    }
}
