//! Photometric file parsing
//!
//! Two entry points with different guarantees:
//! - [`parse`] / [`parse_with`]: structured reader for LM-63 style files. Locates
//!   the `TILT` marker, reads the photometric header, the vertical and
//!   horizontal angle lists and the candela grid, and validates the result.
//! - [`parse_heuristic`]: permissive scan for freeform files. Picks the first
//!   two long numeric rows as angles and candela without checking that they
//!   really are.
//!
//! Files are decoded byte-for-byte (ISO-8859-1), so arbitrary high bytes in
//! manufacturer text never cause a decoding failure.

mod heuristic;
mod ies;
mod table;

pub use heuristic::{parse_heuristic, HEURISTIC_MIN_RUN};
pub use ies::{parse, parse_with, TILT_MARKER};
pub use table::{
    FluxOrigin, IntensityProfile, PhotometricMetadata, PhotometricTable, Resynchronization, Tilt,
};

use serde::{Deserialize, Serialize};

/// How to repair a candela count that disagrees with the declared grid size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResyncPolicy {
    /// Keep the vertical angle count and recompute the plane count; failing
    /// that, keep the plane count and recompute the angle count
    #[default]
    PlanesFirst,
    /// Try recomputing the angle count before the plane count
    AnglesFirst,
    /// Any mismatch is a format error
    Reject,
}

/// Where the declared total flux comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FluxSource {
    /// Lumens field of the photometric header line, as written
    #[default]
    Header,
    /// Header field when positive, otherwise the first `<n> lm` annotation in
    /// the keyword section (absolute-photometry files declare `-1`)
    HeaderOrAnnotation,
}

/// Options for the structured parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseOptions {
    pub resync: ResyncPolicy,
    pub flux_source: FluxSource,
}

/// Decode single-byte text: each byte becomes the code point of equal value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Split a line into value tokens. Commas count as separators.
pub(crate) fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}

/// Parse every token of a line as a number, or `None` if any token isn't one.
pub(crate) fn numeric_row(line: &str) -> Option<Vec<f64>> {
    tokens(line).map(|t| t.parse::<f64>().ok()).collect()
}
