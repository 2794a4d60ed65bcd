//! Small helpers shared across crates: HTML escaping, relative time
//! formatting, secret masking and lenient deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Escape text for safe interpolation into HTML.
///
/// Replaces `&`, `<`, `>`, `"` and `'` with their entity forms. `&` is
/// replaced first so produced entities are not escaped twice.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Human readable age of a timestamp relative to `now`.
///
/// - under a minute: "just now"
/// - under an hour: "N min ago"
/// - under a day: "N hours ago"
/// - otherwise: "N days ago"
pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds();

    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        format!("{} min ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else {
        format!("{} days ago", seconds / 86400)
    }
}

/// Mask a secret for display: first 10 characters followed by `***`.
pub fn mask_secret(value: &str) -> String {
    if value.chars().count() > 10 {
        let prefix: String = value.chars().take(10).collect();
        format!("{}***", prefix)
    } else {
        "***".to_string()
    }
}

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A spreadsheet cell: text, a number or nothing.
#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Flag(bool),
}

/// Deserialize a string that may arrive as a number or `null`.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Text(s)) => s,
        Some(Cell::Int(n)) => n.to_string(),
        Some(Cell::Float(n)) => n.to_string(),
        Some(Cell::Flag(b)) => b.to_string(),
        None => String::new(),
    })
}

/// Deserialize a count given as a number or numeric text.
///
/// Blank, `null` and unreadable values yield `None`.
pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Text(s)) => s.trim().parse().ok(),
        Some(Cell::Int(n)) => u32::try_from(n).ok(),
        Some(Cell::Float(n)) if n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&n) => {
            Some(n as u32)
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_escape_html_replaces_all_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_output_has_no_raw_markup() {
        let inputs = [
            "",
            "plain text",
            "<<>>",
            "&&&",
            "\"'\"'",
            "<script>alert('x')</script>",
            "&amp; already escaped",
            "émoji 🎬 <b>",
        ];

        for input in inputs {
            let escaped = escape_html(input);
            assert!(!escaped.contains('<'), "{escaped}");
            assert!(!escaped.contains('>'), "{escaped}");
            assert!(!escaped.contains('"'), "{escaped}");
            assert!(!escaped.contains('\''), "{escaped}");

            // Every ampersand starts one of the produced entities.
            for (idx, _) in escaped.match_indices('&') {
                let rest = &escaped[idx..];
                assert!(
                    ["&amp;", "&lt;", "&gt;", "&quot;", "&#039;"]
                        .iter()
                        .any(|entity| rest.starts_with(entity)),
                    "{escaped}"
                );
            }
        }
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::seconds(5), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5 min ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2 days ago");
    }

    #[test]
    fn test_lenient_cells() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "string_or_number")]
            id: String,
            #[serde(default, deserialize_with = "lenient_u32")]
            count: Option<u32>,
        }

        let row = |value| serde_json::from_value::<Row>(value).unwrap();

        let r = row(serde_json::json!({ "id": 12, "count": "24" }));
        assert_eq!(r.id, "12");
        assert_eq!(r.count, Some(24));

        let r = row(serde_json::json!({ "id": null, "count": "" }));
        assert_eq!(r.id, "");
        assert_eq!(r.count, None);

        let r = row(serde_json::json!({ "id": "SCH0001", "count": 16.0 }));
        assert_eq!(r.id, "SCH0001");
        assert_eq!(r.count, Some(16));

        assert_eq!(row(serde_json::json!({ "count": -8 })).count, None);
        assert_eq!(row(serde_json::json!({ "count": "eight" })).count, None);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("xai-1234567890abcdef"), "xai-123456***");
        assert_eq!(mask_secret("short"), "***");
    }
}
