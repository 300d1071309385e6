use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Seconds trimmed off the total duration when building the final boundary.
///
/// ffmpeg fails when asked to cut past the end of the stream, and reported
/// durations are routinely a fraction of a second longer than the audio.
pub const END_GUARD_SECS: f64 = 1.0;

/// A whole-second offset into a video, rendered as `HH:MM:SS`.
///
/// The hours field is zero-padded to two digits but not capped, so a
/// 100-hour stream renders as `100:00:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_secs(secs: u64) -> Self {
        Timestamp(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Parse canonical `HH:MM:SS` text back into a timestamp.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidDuration(format!("not an HH:MM:SS timestamp: {text:?}"));

        let mut fields = text.split(':');
        let (Some(h), Some(m), Some(s), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid());
        };

        let field = |f: &str| -> Result<u64> {
            if f.len() < 2 || !f.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            f.parse().map_err(|_| invalid())
        };

        if m.len() != 2 || s.len() != 2 {
            return Err(invalid());
        }
        let (h, m, s) = (field(h)?, field(m)?, field(s)?);
        if m >= 60 || s >= 60 {
            return Err(invalid());
        }
        Ok(Timestamp(h * 3600 + m * 60 + s))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a textual duration in (possibly fractional) seconds.
pub fn parse_seconds(text: &str) -> Result<f64> {
    let secs: f64 = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidDuration(format!("not a number: {text:?}")))?;
    check_seconds(secs)?;
    Ok(secs)
}

fn check_seconds(secs: f64) -> Result<()> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::InvalidDuration(format!(
            "expected a non-negative number of seconds, got {secs}"
        )));
    }
    Ok(())
}

/// Convert seconds into a whole-second timestamp. Fractions are truncated.
pub fn normalize(secs: f64) -> Result<Timestamp> {
    check_seconds(secs)?;
    Ok(Timestamp(secs.trunc() as u64))
}

/// Build the boundary list for a chapter layout.
///
/// Returns one timestamp per chapter start followed by a synthetic end
/// boundary at `total - END_GUARD_SECS`. No ordering check happens here; run
/// [`check_layout`] on the result before cutting anything.
pub fn compute_boundaries(chapter_starts: &[f64], total_secs: f64) -> Result<Vec<Timestamp>> {
    check_seconds(total_secs)?;

    let mut boundaries = chapter_starts
        .iter()
        .map(|&start| normalize(start))
        .collect::<Result<Vec<_>>>()?;

    boundaries.push(normalize((total_secs - END_GUARD_SECS).max(0.0))?);
    Ok(boundaries)
}

/// Verify that a boundary list describes at least one non-empty range and is
/// strictly increasing.
pub fn check_layout(boundaries: &[Timestamp]) -> Result<()> {
    if boundaries.len() < 2 {
        return Err(Error::InvalidChapterLayout(format!(
            "need at least two boundaries, got {}",
            boundaries.len()
        )));
    }

    for (i, pair) in boundaries.windows(2).enumerate() {
        if pair[0] >= pair[1] {
            return Err(Error::InvalidChapterLayout(format!(
                "range {i} is empty or negative ({} -> {})",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_canonical(text: &str) -> bool {
        let parts: Vec<&str> = text.split(':').collect();
        parts.len() == 3
            && parts[0].len() >= 2
            && parts[1].len() == 2
            && parts[2].len() == 2
            && parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit()))
    }

    #[test]
    fn test_normalize_zero() {
        assert_eq!(normalize(0.0).unwrap().to_string(), "00:00:00");
    }

    #[test]
    fn test_normalize_truncates_fraction() {
        assert_eq!(normalize(10.2).unwrap().to_string(), "00:00:10");
        assert_eq!(normalize(59.999).unwrap().to_string(), "00:00:59");
    }

    #[test]
    fn test_normalize_hours_minutes_seconds() {
        assert_eq!(normalize(3723.0).unwrap().to_string(), "01:02:03");
    }

    #[test]
    fn test_normalize_more_than_99_hours() {
        let ts = normalize(100.0 * 3600.0 + 61.0).unwrap();
        assert_eq!(ts.to_string(), "100:01:01");
        assert!(is_canonical(&ts.to_string()));
    }

    #[test]
    fn test_normalize_rejects_negative() {
        assert!(matches!(normalize(-1.0), Err(Error::InvalidDuration(_))));
    }

    #[test]
    fn test_normalize_rejects_nan_and_infinity() {
        assert!(matches!(normalize(f64::NAN), Err(Error::InvalidDuration(_))));
        assert!(matches!(normalize(f64::INFINITY), Err(Error::InvalidDuration(_))));
    }

    #[test]
    fn test_normalize_value_within_one_second() {
        for d in [0.0, 0.5, 1.0, 59.9, 60.0, 3599.99, 3600.0, 86_399.5, 123_456.789] {
            let text = normalize(d).unwrap().to_string();
            assert!(is_canonical(&text), "{text} not canonical");
            let back = Timestamp::parse(&text).unwrap().as_secs() as f64;
            assert!(back >= d.floor() && back < d.floor() + 1.0, "{d} -> {text}");
        }
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("125.4").unwrap(), 125.4);
        assert_eq!(parse_seconds(" 7\n").unwrap(), 7.0);
        assert!(matches!(parse_seconds("abc"), Err(Error::InvalidDuration(_))));
        assert!(matches!(parse_seconds("-3"), Err(Error::InvalidDuration(_))));
        assert!(matches!(parse_seconds(""), Err(Error::InvalidDuration(_))));
    }

    #[test]
    fn test_timestamp_parse_rejects_garbage() {
        assert!(Timestamp::parse("1:2:3").is_err());
        assert!(Timestamp::parse("00:60:00").is_err());
        assert!(Timestamp::parse("00:00").is_err());
        assert!(Timestamp::parse("00:00:00:00").is_err());
        assert!(Timestamp::parse("aa:bb:cc").is_err());
    }

    #[test]
    fn test_compute_boundaries_scenario() {
        let boundaries = compute_boundaries(&[0.0, 10.2], 125.4).unwrap();
        let text: Vec<String> = boundaries.iter().map(|b| b.to_string()).collect();
        assert_eq!(text, ["00:00:00", "00:00:10", "00:02:04"]);
        assert!(check_layout(&boundaries).is_ok());
    }

    #[test]
    fn test_compute_boundaries_length() {
        let starts = [0.0, 30.0, 90.0, 200.5];
        let boundaries = compute_boundaries(&starts, 400.0).unwrap();
        assert_eq!(boundaries.len(), starts.len() + 1);
        assert_eq!(boundaries.last().unwrap().as_secs(), 399);
    }

    #[test]
    fn test_compute_boundaries_strictly_increasing() {
        let starts = [0.0, 1.5, 60.0, 61.0, 3600.25];
        let boundaries = compute_boundaries(&starts, 7200.0).unwrap();
        assert!(boundaries.windows(2).all(|w| w[0] < w[1]));
        assert!(check_layout(&boundaries).is_ok());
    }

    #[test]
    fn test_compute_boundaries_does_not_validate() {
        // Last chapter starts after the guarded end; caught by check_layout.
        let boundaries = compute_boundaries(&[0.0, 100.0], 100.5).unwrap();
        assert!(matches!(
            check_layout(&boundaries),
            Err(Error::InvalidChapterLayout(_))
        ));
    }

    #[test]
    fn test_compute_boundaries_clamps_short_duration() {
        let boundaries = compute_boundaries(&[0.0], 0.5).unwrap();
        assert_eq!(boundaries[1].as_secs(), 0);
        assert!(check_layout(&boundaries).is_err());
    }

    #[test]
    fn test_compute_boundaries_rejects_negative_start() {
        assert!(matches!(
            compute_boundaries(&[-2.0], 10.0),
            Err(Error::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_check_layout_rejects_duplicates() {
        let b = [Timestamp::from_secs(0), Timestamp::from_secs(5), Timestamp::from_secs(5)];
        assert!(check_layout(&b).is_err());
    }

    #[test]
    fn test_check_layout_rejects_single_boundary() {
        assert!(check_layout(&[Timestamp::from_secs(10)]).is_err());
    }
}
