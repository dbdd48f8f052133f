//! ISO-8601 duration parsing and short-form classification.
//!
//! The Data API reports video lengths as `PT[nH][nM][nS]` strings. Parsing is
//! a small hand-rolled scan rather than a regex dependency, with prefix-match
//! semantics: components must appear in H → M → S order, and scanning stops
//! at the first span that does not conform, keeping whatever already matched.
//! Malformed input yields 0, which callers classify as short-form — a
//! zero-length real video is not a meaningful item to retain.

/// Parses an ISO-8601 `PT[nH][nM][nS]` duration into total seconds.
///
/// Absent components count as zero; input that matches no component at all
/// (including a missing `PT` prefix) returns 0.
#[must_use]
pub fn parse_iso8601_secs(duration: &str) -> u64 {
    let Some(rest) = duration.strip_prefix("PT") else {
        return 0;
    };

    let bytes = rest.as_bytes();
    let mut total: u64 = 0;
    // 0 = H still allowed, 1 = M still allowed, 2 = S still allowed, 3 = done
    let mut stage = 0u8;
    let mut i = 0;

    while i < bytes.len() && stage < 3 {
        let num_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == num_start || i == bytes.len() {
            break;
        }
        let Ok(value) = rest[num_start..i].parse::<u64>() else {
            break;
        };
        match bytes[i] {
            b'H' if stage == 0 => {
                total = total.saturating_add(value.saturating_mul(3600));
                stage = 1;
            }
            b'M' if stage <= 1 => {
                total = total.saturating_add(value.saturating_mul(60));
                stage = 2;
            }
            b'S' if stage <= 2 => {
                total = total.saturating_add(value);
                stage = 3;
            }
            _ => break,
        }
        i += 1;
    }

    total
}

/// A video at or below the threshold is a short-form item and is excluded
/// from discovery.
#[must_use]
pub fn is_short_form(duration_secs: u64, threshold_secs: u64) -> bool {
    duration_secs <= threshold_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hms_is_exact_sum() {
        assert_eq!(parse_iso8601_secs("PT1H2M3S"), 3723);
        assert_eq!(parse_iso8601_secs("PT4M13S"), 253);
        assert_eq!(parse_iso8601_secs("PT2H"), 7200);
        assert_eq!(parse_iso8601_secs("PT59S"), 59);
        assert_eq!(parse_iso8601_secs("PT10M"), 600);
    }

    #[test]
    fn absent_components_count_as_zero() {
        assert_eq!(parse_iso8601_secs("PT1H3S"), 3603);
        assert_eq!(parse_iso8601_secs("PT"), 0);
    }

    #[test]
    fn malformed_input_yields_zero() {
        assert_eq!(parse_iso8601_secs(""), 0);
        assert_eq!(parse_iso8601_secs("4m13s"), 0);
        assert_eq!(parse_iso8601_secs("P1DT2H"), 0);
        assert_eq!(parse_iso8601_secs("garbage"), 0);
    }

    #[test]
    fn scan_stops_at_first_nonconforming_span() {
        // Trailing junk after a valid component keeps the prefix match.
        assert_eq!(parse_iso8601_secs("PT5M30X"), 300);
        // Components out of order: seconds cannot be followed by minutes.
        assert_eq!(parse_iso8601_secs("PT30S5M"), 30);
        // Duplicate component: second hours span is rejected.
        assert_eq!(parse_iso8601_secs("PT1H2H"), 3600);
    }

    #[test]
    fn short_form_threshold_is_inclusive() {
        assert!(is_short_form(60, 60));
        assert!(!is_short_form(61, 60));
        assert!(is_short_form(0, 60), "malformed durations are excluded");
        assert!(is_short_form(160, 160));
    }
}
