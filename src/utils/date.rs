use crate::errors::{AppError, AppResult};
use chrono::{Datelike, Local, NaiveDate};

/// Format used for `orders.created_at`.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Local timestamp in [`STAMP_FORMAT`].
pub fn now_stamp() -> String {
    Local::now().format(STAMP_FORMAT).to_string()
}

/// Inclusive interval of order dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    /// Human label, e.g. `2025-01-01 → 2025-01-31`.
    pub fn label(&self) -> String {
        if self.start == self.end {
            self.start_str()
        } else {
            format!("{} → {}", self.start_str(), self.end_str())
        }
    }
}

/// Parse `--range`.
///
/// Accepted:
/// - YYYY
/// - YYYY-MM
/// - YYYY-MM-DD
/// - A:B where A and B share one of the formats above
pub fn parse_range(r: &str) -> AppResult<DateRange> {
    let r = r.trim();

    let (start, end) = match r.split_once(':') {
        Some((a, b)) => {
            let (a, b) = (a.trim(), b.trim());
            if a.len() != b.len() {
                return Err(AppError::InvalidDate(format!(
                    "{r}: start and end must have the same format"
                )));
            }
            (period_bounds(a)?.0, period_bounds(b)?.1)
        }
        None => period_bounds(r)?,
    };

    if start > end {
        return Err(AppError::InvalidDate(format!("{r}: start is after end")));
    }
    Ok(DateRange { start, end })
}

/// `--range` as given on the command line; absent or `all` means no filter.
pub fn parse_optional_range(r: Option<&str>) -> AppResult<Option<DateRange>> {
    match r.map(str::trim) {
        None => Ok(None),
        Some(r) if r.is_empty() || r.eq_ignore_ascii_case("all") => Ok(None),
        Some(r) => parse_range(r).map(Some),
    }
}

/// First and last day covered by a single period.
fn period_bounds(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let bad = || AppError::InvalidDate(p.to_string());

    match p.len() {
        4 => {
            let y: i32 = p.parse().map_err(|_| bad())?;
            let d1 = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(bad)?;
            let d2 = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(bad)?;
            Ok((d1, d2))
        }
        7 => {
            let d1 = NaiveDate::parse_from_str(&format!("{p}-01"), "%Y-%m-%d").map_err(|_| bad())?;
            Ok((d1, last_day_of_month(d1).ok_or_else(bad)?))
        }
        10 => {
            let d = NaiveDate::parse_from_str(p, "%Y-%m-%d").map_err(|_| bad())?;
            Ok((d, d))
        }
        _ => Err(bad()),
    }
}

fn last_day_of_month(d: NaiveDate) -> Option<NaiveDate> {
    let (y, m) = if d.month() == 12 {
        (d.year() + 1, 1)
    } else {
        (d.year(), d.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}
