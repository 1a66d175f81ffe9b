use std::ops::Index;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

pub const TRUNCATION_MARKER: &str = "...";

lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref ENTITY_REGEX: Regex = Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap();
    static ref DATE_TIME_REGEX: Regex = Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})[T ](\d{1,2}):(\d{1,2}):(\d{1,2})(\.\d{0,6})?$"
    ).unwrap();
}

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Parses `YYYY-MM-DD HH:MM:SS[.fff]`, with either a space or a `T` between date and time.
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    let Some(caps) = DATE_TIME_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = to_u32(caps.index(4))?;
    let mn: u32 = to_u32(caps.index(5))?;
    let s: u32 = to_u32(caps.index(6))?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

/// Publish dates come either as RFC 3339 with an offset or as a naive
/// timestamp. Naive timestamps are read as UTC.
pub fn parse_source_date(buf: &str) -> Result<DateTime<Utc>, String> {
    let buf = buf.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(buf) {
        return Ok(date_time.with_timezone(&Utc));
    }
    parse_date_time(buf).map(|naive| naive.and_utc())
}

pub fn strip_html(html: &str) -> String {
    TAG_REGEX.replace_all(html, "").to_string()
}

pub fn decode_entities(text: &str) -> String {
    ENTITY_REGEX.replace_all(text, |caps: &Captures| {
        let entity = &caps[1];
        let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = entity.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                "hellip" => Some('…'),
                "ndash" => Some('–'),
                "mdash" => Some('—'),
                "lsquo" => Some('‘'),
                "rsquo" => Some('’'),
                "ldquo" => Some('“'),
                "rdquo" => Some('”'),
                _ => None,
            }
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    }).to_string()
}

/// Markup removed, entities decoded, surrounding whitespace trimmed.
pub fn plain_text(html: &str) -> String {
    decode_entities(&strip_html(html)).trim().to_string()
}

/// Keeps at most `max_chars` characters and always appends the marker.
pub fn truncate_with_marker(text: &str, max_chars: usize) -> String {
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_date_time() {
        let date_time = parse_date_time("2017-09-10 10:42:32.123").unwrap();
        assert_eq!(date_time.format("%Y-%m-%d %H:%M:%S").to_string(), "2017-09-10 10:42:32");

        let date_time = parse_date_time("2024-05-01T08:15:00").unwrap();
        assert_eq!(date_time.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-05-01 08:15:00");

        assert!(parse_date_time("yesterday").is_err());
        assert!(parse_date_time("2024-13-01T08:15:00").is_err());
    }

    #[test]
    fn test_parse_source_date() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 8, 15, 0).unwrap();
        assert_eq!(parse_source_date("2024-05-01T08:15:00").unwrap(), expected);
        assert_eq!(parse_source_date("2024-05-01T13:45:00+05:30").unwrap(), expected);
        assert_eq!(parse_source_date("2024-05-01T08:15:00Z").unwrap(), expected);
    }

    #[test]
    fn test_offset_is_not_dropped() {
        // Offset without a colon is not RFC 3339; it must not pass as UTC.
        assert!(parse_source_date("2024-05-01T13:45:00+0530").is_err());
        assert!(parse_source_date("2024-05-01T13:45:00 PST").is_err());
        assert!(parse_date_time("on 2024-05-01 13:45:00").is_err());
        assert!(parse_date_time("2024-05-01 13:45:00.1234567").is_err());
    }

    #[test]
    fn test_plain_text() {
        let title = "<strong>RBI</strong> strikes again &#8211; what&#8217;s next?";
        assert_eq!(plain_text(title), "RBI strikes again – what’s next?");

        let excerpt = "<p>Payments in India [&hellip;]</p>\n";
        assert_eq!(plain_text(excerpt), "Payments in India […]");

        assert_eq!(decode_entities("AT&amp;T &unknown; &#x41;"), "AT&T &unknown; A");
    }

    #[test]
    fn test_truncate_with_marker() {
        let long = "a".repeat(350);
        let truncated = truncate_with_marker(&long, 300);
        assert_eq!(truncated.chars().count(), 303);
        assert!(truncated.ends_with(TRUNCATION_MARKER));

        assert_eq!(truncate_with_marker("short", 300), "short...");
        assert_eq!(truncate_with_marker("ñandú", 3), "ñan...");
    }
}
