//! `Range` header resolution against a known object length.
//!
//! Only a single interval is ever served. For a multi-range header the first
//! range wins and the rest are ignored. A header that can't be parsed (wrong
//! unit, junk, no digits) means "send everything"; a header that parses but
//! cannot be satisfied is reported as [`RangeError::Unsatisfiable`].

use thiserror::Error;

/// How much of an object to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    Full,
    /// Inclusive on both ends, `start <= end < total`
    Partial { start: u64, end: u64 },
}

impl RangeSpec {
    /// Number of body bytes this spec sends for an object of `total` bytes
    pub fn content_length(&self, total: u64) -> u64 {
        match *self {
            RangeSpec::Full => total,
            RangeSpec::Partial { start, end } => end - start + 1,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, RangeSpec::Partial { .. })
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("Requested range not satisfiable for {total} bytes")]
    Unsatisfiable { total: u64 },
}

/// Resolve a raw `Range` header value against an object of `total` bytes.
pub fn resolve(header: Option<&str>, total: u64) -> Result<RangeSpec, RangeError> {
    let Some((start, end)) = header.and_then(parse_first_range) else {
        return Ok(RangeSpec::Full);
    };
    let unsatisfiable = RangeError::Unsatisfiable { total };

    let (start, end) = match (start, end) {
        (Some(start), end) => (start, end.unwrap_or(u64::MAX)),
        // suffix form: the last `n` bytes
        (None, Some(suffix)) => (total.checked_sub(suffix).ok_or(unsatisfiable)?, u64::MAX),
        (None, None) => return Ok(RangeSpec::Full),
    };

    if start >= total {
        return Err(unsatisfiable);
    }
    let end = end.min(total - 1);
    if start > end {
        return Err(unsatisfiable);
    }

    Ok(RangeSpec::Partial { start, end })
}

/// `bytes=a-b[, ...]` → bounds of the first range, `None` when unparsable
fn parse_first_range(header: &str) -> Option<(Option<u64>, Option<u64>)> {
    let (unit, ranges) = header.trim().split_once('=')?;
    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return None;
    }

    let first = ranges.split(',').map(str::trim).find(|r| !r.is_empty())?;
    let (start, end) = first.split_once('-')?;

    let start = parse_bound(start)?;
    let end = parse_bound(end)?;
    if start.is_none() && end.is_none() {
        return None;
    }
    Some((start, end))
}

/// `Some(None)` for an empty bound, `None` for a malformed one
fn parse_bound(raw: &str) -> Option<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(None);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn absent_header_is_full() {
        assert_eq!(resolve(None, 7), Ok(RangeSpec::Full));
    }

    #[test]
    fn closed_range() {
        assert_eq!(
            resolve(Some("bytes=2-4"), 7),
            Ok(RangeSpec::Partial { start: 2, end: 4 })
        );
    }

    #[test]
    fn open_ended_range_runs_to_last_byte() {
        assert_eq!(
            resolve(Some("bytes=3-"), 7),
            Ok(RangeSpec::Partial { start: 3, end: 6 })
        );
    }

    #[test]
    fn suffix_range_counts_from_the_end() {
        assert_eq!(
            resolve(Some("bytes=-2"), 7),
            Ok(RangeSpec::Partial { start: 5, end: 6 })
        );
    }

    #[test]
    fn end_is_clamped_to_length() {
        assert_eq!(
            resolve(Some("bytes=4-100"), 7),
            Ok(RangeSpec::Partial { start: 4, end: 6 })
        );
    }

    #[test]
    fn unparsable_headers_fall_back_to_full() {
        for header in ["", "bytes", "bytes=", "bytes=-", "bytes=a-b", "items=0-1", "bytes=1-2-3", "bytes=+1-2"] {
            assert_eq!(resolve(Some(header), 7), Ok(RangeSpec::Full), "{header}");
        }
    }

    #[test]
    fn unit_is_case_insensitive() {
        assert_eq!(
            resolve(Some("Bytes=0-0"), 7),
            Ok(RangeSpec::Partial { start: 0, end: 0 })
        );
    }

    #[test]
    fn unsatisfiable_ranges() {
        let err = Err(RangeError::Unsatisfiable { total: 7 });
        assert_eq!(resolve(Some("bytes=7-"), 7), err);
        assert_eq!(resolve(Some("bytes=10-20"), 7), err);
        assert_eq!(resolve(Some("bytes=5-2"), 7), err);
        assert_eq!(resolve(Some("bytes=-8"), 7), err);
        assert_eq!(resolve(Some("bytes=-0"), 7), err);
        assert_eq!(
            resolve(Some("bytes=0-"), 0),
            Err(RangeError::Unsatisfiable { total: 0 })
        );
    }

    #[test]
    fn only_first_of_multiple_ranges_is_used() {
        assert_eq!(
            resolve(Some("bytes=0-1, 4-5"), 7),
            Ok(RangeSpec::Partial { start: 0, end: 1 })
        );
    }

    #[test]
    fn content_length_matches_interval() {
        assert_eq!(RangeSpec::Partial { start: 2, end: 4 }.content_length(7), 3);
        assert_eq!(RangeSpec::Full.content_length(7), 7);
    }

    proptest! {
        #[test]
        fn partial_ranges_stay_inside_the_object(start in 0u64..200, len in 0u64..200, total in 0u64..150) {
            let header = format!("bytes={}-{}", start, start + len);
            if let Ok(RangeSpec::Partial { start: s, end: e }) = resolve(Some(&header), total) {
                prop_assert!(s <= e);
                prop_assert!(e < total);
                prop_assert_eq!(RangeSpec::Partial { start: s, end: e }.content_length(total), e - s + 1);
            }
        }
    }
}
