//! Posting-age parsing for the README date column.

use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use tracing::debug;

use crate::models::job::PostingAge;

fn relative_regex(unit: &str) -> Regex {
    Regex::new(&format!(r"(\d+)\s*{unit}")).unwrap()
}

fn leading_number(re: &Regex, s: &str) -> Option<i64> {
    re.captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// The date `days` before `today`, or `None` when it falls outside chrono's range.
pub fn days_before(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    let days = u64::try_from(days).ok()?;
    today.checked_sub_days(Days::new(days))
}

/// Days between the posting date in `raw` and `today`.
///
/// Accepts relative forms (`today`, `yesterday`, `3d`, `2 weeks ago`, `1mo`, `1y`)
/// and absolute dates (`2025-10-21`, `Oct 21`, `Oct 21, 2025`, `10/21/2025`,
/// `21/10/2025`). Absolute dates in the future clamp to 0. Ages that would reach
/// past the representable calendar are unknown.
pub fn parse_date_to_days(raw: &str, today: NaiveDate) -> Option<i64> {
    static DAYS: OnceLock<Regex> = OnceLock::new();
    static WEEKS: OnceLock<Regex> = OnceLock::new();
    static MONTHS: OnceLock<Regex> = OnceLock::new();
    static YEARS: OnceLock<Regex> = OnceLock::new();

    let s = raw.trim().to_lowercase();
    if s.is_empty() || s == "unknown" {
        return None;
    }

    if s.contains("today") || s.contains("just now") {
        return Some(0);
    }
    if s.contains("yesterday") {
        return Some(1);
    }

    let relative = if s.contains("day") || s.ends_with('d') {
        leading_number(DAYS.get_or_init(|| relative_regex("d")), &s)
    } else if s.contains("week") || s.ends_with('w') {
        leading_number(WEEKS.get_or_init(|| relative_regex("w")), &s)
            .and_then(|n| n.checked_mul(7))
    } else if s.contains("month") || s.contains("mo") {
        leading_number(MONTHS.get_or_init(|| relative_regex("mo")), &s)
            .and_then(|n| n.checked_mul(30))
    } else if s.contains("year") || s.ends_with('y') {
        leading_number(YEARS.get_or_init(|| relative_regex("y")), &s)
            .and_then(|n| n.checked_mul(365))
    } else {
        None
    };
    if let Some(days) = relative {
        return days_before(today, days).map(|_| days);
    }

    let since = |date: NaiveDate| (today - date).num_days().max(0);

    if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return Some(since(date));
    }

    // "Oct 21": assume the current year unless that lands in the future.
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{s} {}", today.year()), "%b %d %Y") {
        if date <= today {
            return Some(since(date));
        }
        let last_year = format!("{s} {}", today.year() - 1);
        if let Ok(date) = NaiveDate::parse_from_str(&last_year, "%b %d %Y") {
            return Some(since(date));
        }
    }

    for format in ["%b %d, %Y", "%m/%d/%Y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&s, format) {
            return Some(since(date));
        }
    }

    debug!("Could not parse date format: '{raw}'");
    None
}

/// Keeps jobs posted within `max_days`. Jobs of unknown age are kept.
pub fn filter_jobs_by_date<T: PostingAge>(
    jobs: Vec<T>,
    max_days: Option<i64>,
    today: NaiveDate,
) -> Vec<T> {
    let Some(max_days) = max_days else {
        return jobs;
    };

    let before = jobs.len();
    let kept: Vec<T> = jobs
        .into_iter()
        .filter(|job| job.days_since_posted(today).map_or(true, |d| d <= max_days))
        .collect();

    if kept.len() < before {
        debug!(
            "Date filter removed {} jobs older than {max_days} days",
            before - kept.len()
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::test_support::scraped;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 21).unwrap()
    }

    #[test]
    fn test_relative_formats() {
        assert_eq!(parse_date_to_days("Today", today()), Some(0));
        assert_eq!(parse_date_to_days("just now", today()), Some(0));
        assert_eq!(parse_date_to_days("Yesterday", today()), Some(1));
        assert_eq!(parse_date_to_days("0d", today()), Some(0));
        assert_eq!(parse_date_to_days("12d", today()), Some(12));
        assert_eq!(parse_date_to_days("21 days ago", today()), Some(21));
        assert_eq!(parse_date_to_days("3w", today()), Some(21));
        assert_eq!(parse_date_to_days("2 weeks ago", today()), Some(14));
        assert_eq!(parse_date_to_days("1mo", today()), Some(30));
        assert_eq!(parse_date_to_days("2 months ago", today()), Some(60));
        assert_eq!(parse_date_to_days("1y", today()), Some(365));
    }

    #[test]
    fn test_absolute_formats() {
        assert_eq!(parse_date_to_days("2025-10-11", today()), Some(10));
        assert_eq!(parse_date_to_days("Oct 20", today()), Some(1));
        assert_eq!(parse_date_to_days("Oct 01, 2025", today()), Some(20));
        assert_eq!(parse_date_to_days("10/01/2025", today()), Some(20));
        assert_eq!(parse_date_to_days("21/09/2025", today()), Some(30));
    }

    #[test]
    fn test_month_day_in_future_means_last_year() {
        assert_eq!(parse_date_to_days("Dec 25", today()), Some(300));
    }

    #[test]
    fn test_future_absolute_date_clamps_to_zero() {
        assert_eq!(parse_date_to_days("2025-12-01", today()), Some(0));
    }

    #[test]
    fn test_oversized_relative_age_is_unknown() {
        assert_eq!(parse_date_to_days("99999999999d", today()), None);
        assert_eq!(parse_date_to_days("99999999999999999y", today()), None);
        assert_eq!(parse_date_to_days("9999999999999999999w", today()), None);
        assert_eq!(parse_date_to_days("4000000mo", today()), None);
    }

    #[test]
    fn test_days_before() {
        assert_eq!(days_before(today(), 3), NaiveDate::from_ymd_opt(2025, 10, 18));
        assert_eq!(days_before(today(), -1), None);
        assert_eq!(days_before(today(), i64::MAX), None);
    }

    #[test]
    fn test_unparseable_returns_none() {
        assert_eq!(parse_date_to_days("", today()), None);
        assert_eq!(parse_date_to_days("Unknown", today()), None);
        assert_eq!(parse_date_to_days("soon", today()), None);
    }

    #[test]
    fn test_filter_keeps_unknown_ages() {
        let mut fresh = scraped("Acme", "SWE Intern", "NYC", "https://acme.com");
        fresh.days_since_posted = Some(3);
        let mut stale = scraped("Initech", "SWE Intern", "NYC", "https://initech.com");
        stale.days_since_posted = Some(45);
        let unknown = scraped("Globex", "SWE Intern", "NYC", "https://globex.com");

        let jobs = vec![fresh, stale, unknown];
        assert_eq!(filter_jobs_by_date(jobs.clone(), None, today()).len(), 3);

        let kept = filter_jobs_by_date(jobs, Some(30), today());
        let companies: Vec<_> = kept.iter().map(|j| j.company.as_str()).collect();
        assert_eq!(companies, vec!["Acme", "Globex"]);
    }
}
