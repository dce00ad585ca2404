//! Launch date parsing and due date arithmetic.
//!
//! Launch dates arrive either as Excel serial numbers (spreadsheets exported to
//! CSV keep the raw day count) or as calendar strings. Due dates are always
//! computed on plain calendar days.

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::error::{Result, ToolError};

/// Format expected by Monday.com date columns.
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

const CALENDAR_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Day zero of the spreadsheet serial calendar. Using the 30th instead of the
/// 31st absorbs the phantom 1900-02-29 for every serial after February 1900.
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("1899-12-30 is a valid date")
}

/// Converts an Excel serial day count into a calendar date.
pub fn excel_serial_to_date(serial: u64) -> Option<NaiveDate> {
    excel_epoch().checked_add_days(Days::new(serial))
}

/// Parses a launch date cell.
///
/// All-digit input is treated as an Excel serial number; anything else is
/// tried against ISO, US and European layouts in that order. Blank or
/// unrecognised input yields `None`.
pub fn parse_launch_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return trimmed.parse::<u64>().ok().and_then(excel_serial_to_date);
    }

    CALENDAR_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATETIME_FORMATS.iter().find_map(|format| {
                NaiveDateTime::parse_from_str(trimmed, format)
                    .ok()
                    .map(|value| value.date())
            })
        })
}

/// Subtracts `lead_time_weeks` whole weeks from the launch date.
///
/// The result is not clamped: a due date that already lies in the past is
/// still a valid planning milestone.
pub fn due_date(launch: NaiveDate, lead_time_weeks: u32) -> Result<NaiveDate> {
    let days = u64::from(lead_time_weeks) * 7;
    launch.checked_sub_days(Days::new(days)).ok_or_else(|| {
        ToolError::InvalidDate(format!(
            "{launch} minus {lead_time_weeks} weeks is out of range"
        ))
    })
}

/// Formats a date the way Monday.com date columns expect it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// Convenience wrapper returning the formatted due date.
pub fn due_date_string(launch: NaiveDate, lead_time_weeks: u32) -> Result<String> {
    due_date(launch, lead_time_weeks).map(format_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn eight_weeks_before_june_first() {
        let launch = parse_launch_date("2024-06-01").unwrap();
        assert_eq!(due_date_string(launch, 8).unwrap(), "2024-04-06");
    }

    #[test]
    fn excel_serial_and_iso_agree() {
        let from_serial = parse_launch_date("45930").unwrap();
        let from_iso = parse_launch_date("2025-09-30").unwrap();
        assert_eq!(from_serial, from_iso);

        for weeks in [0, 1, 12, 16, 18, 26, 40] {
            let expected = from_iso - chrono::Duration::days(i64::from(weeks) * 7);
            assert_eq!(due_date(from_serial, weeks).unwrap(), expected);
            assert_eq!(due_date(from_iso, weeks).unwrap(), expected);
        }
    }

    #[test]
    fn serials_count_from_the_spreadsheet_epoch() {
        assert_eq!(excel_serial_to_date(0), Some(ymd(1899, 12, 30)));
        assert_eq!(excel_serial_to_date(45351), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_launch_date("45351"), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn us_format_wins_over_european_when_ambiguous() {
        assert_eq!(parse_launch_date("03/04/2025"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_launch_date("25/12/2025"), Some(ymd(2025, 12, 25)));
    }

    #[test]
    fn datetime_strings_keep_their_date() {
        assert_eq!(
            parse_launch_date(" 2025-01-15 08:30:00 "),
            Some(ymd(2025, 1, 15))
        );
        assert_eq!(
            parse_launch_date("2025-01-15T00:00:00"),
            Some(ymd(2025, 1, 15))
        );
    }

    #[test]
    fn blank_and_garbage_are_rejected() {
        assert_eq!(parse_launch_date(""), None);
        assert_eq!(parse_launch_date("   "), None);
        assert_eq!(parse_launch_date("next spring"), None);
        assert_eq!(parse_launch_date("45930.5"), None);
    }

    #[test]
    fn past_due_dates_are_not_clamped() {
        let launch = ymd(2020, 1, 10);
        assert_eq!(due_date_string(launch, 40).unwrap(), "2019-04-05");
    }

    #[test]
    fn overflow_is_reported() {
        let launch = NaiveDate::MIN;
        assert!(matches!(due_date(launch, 1), Err(ToolError::InvalidDate(_))));
    }
}
