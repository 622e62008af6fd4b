//! Temporal extent of a granule from its `SENSING_TIME` tag.

/// Split a `SENSING_TIME` value into its earliest and latest timestamps.
///
/// The tag holds one or more ISO-8601 `Z` timestamps separated by `+` and/or
/// `;`, with optional surrounding whitespace and empty parts, e.g.
/// `2024-04-29T21:12:59.72Z + 2024-04-29T21:11:59.72Z;`. Timestamps share one
/// format, so lexical order is chronological order. Returns `None` when no
/// timestamp is present.
pub fn parse_sensing_time(sensing_time: &str) -> Option<(String, String)> {
    let mut times: Vec<&str> = sensing_time
        .split(['+', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    times.sort_unstable();
    let first = times.first()?;
    let last = times.last()?;
    Some((first.to_string(), last.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(a: &str, b: &str) -> Option<(String, String)> {
        Some((a.to_string(), b.to_string()))
    }

    #[test]
    fn test_single_value() {
        let t = "2024-04-29T21:11:59.7221750Z";
        assert_eq!(parse_sensing_time(t), range(t, t));
        assert_eq!(parse_sensing_time(&format!(";{t}")), range(t, t));
        assert_eq!(parse_sensing_time(&format!("{t};")), range(t, t));
        assert_eq!(parse_sensing_time(&format!("{t}+")), range(t, t));
    }

    #[test]
    fn test_multiple_values_sorted() {
        assert_eq!(
            parse_sensing_time("2024-04-29T21:12:59.7221750Z ; 2024-04-29T21:11:59.7221750Z"),
            range("2024-04-29T21:11:59.7221750Z", "2024-04-29T21:12:59.7221750Z")
        );
        assert_eq!(
            parse_sensing_time(
                "2024-04-29T21:10:59.7221750Z;\
                 2024-04-29T21:12:59.7221750Z + 2024-04-29T21:11:59.7221750Z;"
            ),
            range("2024-04-29T21:10:59.7221750Z", "2024-04-29T21:12:59.7221750Z")
        );
        assert_eq!(
            parse_sensing_time(
                "2024-04-29T21:12:59.7221750Z+2024-04-29T21:11:59.7221750Z;\
                 2024-04-29T21:10:59.7221750Z + 2024-04-29T21:11:59.7221750Z;"
            ),
            range("2024-04-29T21:10:59.7221750Z", "2024-04-29T21:12:59.7221750Z")
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse_sensing_time(""), None);
        assert_eq!(parse_sensing_time(" ; + "), None);
    }
}
