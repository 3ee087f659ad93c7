//! Permissive scan for photometric files without a usable header.
//!
//! Every line whose tokens are all numeric and number more than
//! [`HEURISTIC_MIN_RUN`] qualifies. The first qualifying line is taken as the
//! angle list, the second as the candela list. Nothing checks that the first
//! run really is an angle table, so unusual files can be mis-read silently;
//! prefer [`super::parse`] whenever the file has a tilt marker.

use super::table::IntensityProfile;
use super::{decode_latin1, numeric_row};
use crate::error::{LightingError, Result};
use tracing::debug;

/// A numeric row must have more than this many values to qualify.
pub const HEURISTIC_MIN_RUN: usize = 10;

/// Recover a single-plane intensity curve from freeform text.
///
/// Both lists are truncated to the shorter of the two.
///
/// # Errors
/// [`LightingError::Format`] when fewer than two qualifying rows exist.
pub fn parse_heuristic(bytes: &[u8]) -> Result<IntensityProfile> {
    let text = decode_latin1(bytes);
    let mut rows = text
        .lines()
        .enumerate()
        .filter_map(|(i, line)| numeric_row(line).map(|row| (i + 1, row)))
        .filter(|(_, row)| row.len() > HEURISTIC_MIN_RUN);

    let (angle_line, mut angles) = rows.next().ok_or_else(|| not_found(0))?;
    let (candela_line, mut candela) = rows.next().ok_or_else(|| not_found(1))?;

    let n = angles.len().min(candela.len());
    angles.truncate(n);
    candela.truncate(n);
    debug!(angle_line, candela_line, n, "heuristic scan picked numeric rows");

    Ok(IntensityProfile { angles, candela })
}

fn not_found(found: usize) -> LightingError {
    LightingError::format(
        "heuristic scan",
        format!("two numeric rows with more than {HEURISTIC_MIN_RUN} values"),
        format!("{found} qualifying rows"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_first_two_long_rows() {
        let text = "Some luminaire\n\
1 2 3\n\
0 5 10 15 20 25 30 35 40 45 50 55\n\
header words 1 2 3 4 5 6 7 8 9 10 11\n\
900 890 870 840 800 750 690 620 540 450 350\n\
1 1 1 1 1 1 1 1 1 1 1 1 1\n";
        let profile = parse_heuristic(text.as_bytes()).unwrap();

        // 12 angles, 11 candela values -> both truncated to 11
        assert_eq!(profile.angles.len(), 11);
        assert_eq!(profile.candela.len(), 11);
        assert_eq!(profile.angles[10], 50.0);
        assert_eq!(profile.candela[0], 900.0);
    }

    #[test]
    fn test_exactly_min_run_does_not_qualify() {
        let ten = "0 1 2 3 4 5 6 7 8 9\n";
        let text = format!("{ten}{ten}");
        assert!(parse_heuristic(text.as_bytes()).is_err());
    }

    #[test]
    fn test_single_row_is_an_error() {
        let err = parse_heuristic(b"0 5 10 15 20 25 30 35 40 45 50\n").unwrap_err();
        assert!(err.to_string().contains("1 qualifying rows"));
    }
}
