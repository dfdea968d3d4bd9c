//! 时间工具函数 - 业务时区转换
//!
//! 队列按业务时区的自然日分区 (`dateKey` = `YYYY-MM-DD`)。

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 业务时区的今天
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 今天的 dateKey (YYYY-MM-DD)
pub fn today_key(tz: Tz) -> String {
    date_key(today(tz))
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 业务时区的当前时刻 (时:分)
pub fn now_time(tz: Tz) -> NaiveTime {
    chrono::Utc::now().with_timezone(&tz).time()
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// `?date=` 参数 → dateKey，缺省为今天
pub fn resolve_date_key(date: Option<&str>, tz: Tz) -> AppResult<String> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => parse_date(d).map(date_key),
        None => Ok(today_key(tz)),
    }
}

/// 解析 HH:MM
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// `now` 是否落在 `[start, end)` 服务时段内
///
/// `end <= start` 表示跨午夜 (e.g. 18:00 → 02:00)。无法解析的时段视为全天开放。
pub fn within_service_window(start: &str, end: &str, now: NaiveTime) -> bool {
    let (Some(start), Some(end)) = (parse_hhmm(start), parse_hhmm(end)) else {
        tracing::warn!(start, end, "Unparseable service window, treating queue as open");
        return true;
    };
    if start == end {
        return true;
    }
    if start < end {
        now >= start && now < end
    } else {
        now >= start || now < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-10-17").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
        );
        assert!(parse_date("17/10/2026").is_err());
        assert!(parse_date("2026-13-01").is_err());
    }

    #[test]
    fn test_resolve_date_key_defaults_to_today() {
        let tz: Tz = "Asia/Kolkata".parse().unwrap();
        assert_eq!(resolve_date_key(None, tz).unwrap(), today_key(tz));
        assert_eq!(resolve_date_key(Some(""), tz).unwrap(), today_key(tz));
        assert_eq!(resolve_date_key(Some("2026-01-05"), tz).unwrap(), "2026-01-05");
        assert!(resolve_date_key(Some("yesterday"), tz).is_err());
    }

    #[test]
    fn test_service_window() {
        assert!(within_service_window("06:00", "23:00", hm(6, 0)));
        assert!(within_service_window("06:00", "23:00", hm(12, 30)));
        assert!(!within_service_window("06:00", "23:00", hm(23, 0)));
        assert!(!within_service_window("06:00", "23:00", hm(5, 59)));
    }

    #[test]
    fn test_service_window_across_midnight() {
        assert!(within_service_window("18:00", "02:00", hm(23, 30)));
        assert!(within_service_window("18:00", "02:00", hm(1, 0)));
        assert!(!within_service_window("18:00", "02:00", hm(12, 0)));
    }

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("07:30"), Some(hm(7, 30)));
        assert_eq!(parse_hhmm("7:30"), Some(hm(7, 30)));
        assert_eq!(parse_hhmm("25:00"), None);
        assert_eq!(parse_hhmm("noon"), None);
    }
}
