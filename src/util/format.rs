use time::{macros::format_description, OffsetDateTime};

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Thousands separators with at most two decimals: `12345.678` → `12,345.68`.
pub fn format_gold(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let fraction = fraction.trim_end_matches('0');
    let sign = if negative { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

/// "just now", "5m ago", "3h ago", "yesterday", "4d ago", then a short date.
pub fn format_relative(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms - timestamp_ms;
    if diff < MINUTE_MS {
        "just now".to_string()
    } else if diff < HOUR_MS {
        format!("{}m ago", diff / MINUTE_MS)
    } else if diff < DAY_MS {
        format!("{}h ago", diff / HOUR_MS)
    } else if diff < 2 * DAY_MS {
        "yesterday".to_string()
    } else if diff < 7 * DAY_MS {
        format!("{}d ago", diff / DAY_MS)
    } else {
        short_date(timestamp_ms)
    }
}

fn short_date(timestamp_ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp_ms) * 1_000_000)
        .ok()
        .and_then(|date| {
            date.format(format_description!("[month repr:short] [day padding:none]"))
                .ok()
        })
        .unwrap_or_else(|| "long ago".to_string())
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gold_groups_and_trims() {
        assert_eq!(format_gold(1040.0), "1,040");
        assert_eq!(format_gold(712.5), "712.5");
        assert_eq!(format_gold(1234567.891), "1,234,567.89");
        assert_eq!(format_gold(-12.0), "-12");
        assert_eq!(format_gold(0.0), "0");
    }

    #[test]
    fn relative_buckets() {
        let now = 100 * DAY_MS;
        assert_eq!(format_relative(now - 1000, now), "just now");
        assert_eq!(format_relative(now - 5 * MINUTE_MS, now), "5m ago");
        assert_eq!(format_relative(now - 3 * HOUR_MS, now), "3h ago");
        assert_eq!(format_relative(now - DAY_MS, now), "yesterday");
        assert_eq!(format_relative(now - 4 * DAY_MS, now), "4d ago");
        // Unix day 0 is Jan 1.
        assert_eq!(format_relative(0, now), "Jan 1");
    }
}
