//! Structured LM-63 photometric file reader
//!
//! Layout after decoding:
//!
//! ```text
//! IESNA:LM-63-2002                 optional format identifier
//! [KEYWORD] value                  keyword section
//! TILT=NONE | INCLUDE | <file>     marker; everything below is data
//! <tilt block if INCLUDE>
//! lamps lumens mult Nv Nh type units w l h     photometric line
//! ballast future watts             only after a full (>= 10 field) line
//! Nv vertical angles               may span several lines
//! Nh horizontal angles             may span several lines
//! Nh x Nv candela values           one run of Nv per plane
//! ```

use super::table::{FluxOrigin, PhotometricMetadata, PhotometricTable, Resynchronization, Tilt};
use super::{decode_latin1, tokens, FluxSource, ParseOptions, ResyncPolicy};
use crate::core_types::Lumens;
use crate::error::{LightingError, Result};
use nalgebra::DMatrix;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// Keyword that terminates the header section.
pub const TILT_MARKER: &str = "TILT";

/// Fields of the full LM-63 photometric line.
const FULL_PHOTOMETRIC_FIELDS: usize = 10;

/// Minimum fields: lamps, lumens, multiplier, Nv, Nh.
const MIN_PHOTOMETRIC_FIELDS: usize = 5;

const MAX_PREALLOCATED: usize = 4096;

/// `<n> lm`, where `n` may group thousands with commas or spaces (`1,200 lm`).
static LUMEN_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b((?:\d{1,3}(?:[ ,]\d{3})+|\d+)(?:\.\d+)?)\s*(?:lm|lumens?)\b")
        .expect("lumen annotation pattern is valid")
});

/// Parse a photometric file with default options.
///
/// # Errors
/// [`LightingError::Format`] when the tilt marker is missing, the photometric
/// line is absent or malformed, an angle list is short, there are no candela
/// values, or the candela count can't be reconciled with the header.
pub fn parse(bytes: &[u8]) -> Result<PhotometricTable> {
    parse_with(bytes, ParseOptions::default())
}

/// Parse a photometric file with explicit resynchronization and flux options.
///
/// # Errors
/// Same as [`parse`]; with [`ResyncPolicy::Reject`] any candela count that
/// differs from `Nh × Nv` is also an error.
pub fn parse_with(bytes: &[u8], options: ParseOptions) -> Result<PhotometricTable> {
    let text = decode_latin1(bytes);
    let lines: Vec<&str> = text.lines().collect();

    let mut metadata = PhotometricMetadata::default();
    let marker_index = read_header(&lines, &mut metadata)?;
    metadata.tilt = tilt_kind(lines[marker_index]);

    let mut cursor = DataCursor::new(&lines[marker_index + 1..], marker_index + 2);

    if matches!(metadata.tilt, Tilt::Include { .. }) {
        metadata.tilt = read_tilt_block(&mut cursor)?;
    }

    // Photometric line
    let (fields, line_no) = cursor.next_line().ok_or_else(|| {
        LightingError::format(
            "photometric header",
            format!("a line with at least {MIN_PHOTOMETRIC_FIELDS} numeric fields"),
            "no numeric data after the tilt marker",
        )
    })?;
    let header = parse_fields(&fields, line_no, "photometric header")?;
    if header.len() < MIN_PHOTOMETRIC_FIELDS {
        return Err(LightingError::format(
            "photometric header",
            format!("at least {MIN_PHOTOMETRIC_FIELDS} numeric fields"),
            format!("{} fields on line {line_no}", header.len()),
        ));
    }

    let declared_nv = count_field(header[3], "vertical angle count")?;
    let declared_nh = count_field(header[4], "horizontal plane count")?;
    metadata.lamp_count = Some(header[0]);
    metadata.candela_multiplier = Some(header[2]);

    if header.len() >= FULL_PHOTOMETRIC_FIELDS {
        metadata.photometric_type = Some(header[5] as u8);
        metadata.units_type = Some(header[6] as u8);
        metadata.opening = Some([header[7], header[8], header[9]]);

        let electrical = cursor.take_values(3, "ballast factor / input watts line")?;
        metadata.ballast_factor = Some(electrical[0]);
        metadata.input_watts = Some(electrical[2]);
    }

    let mut vertical = cursor.take_values(declared_nv, "vertical angles")?;
    let mut horizontal = cursor.take_values(declared_nh, "horizontal angles")?;
    let (values, skipped) = cursor.remaining_values();
    if skipped > 0 {
        debug!(skipped, "ignored non-numeric tokens in candela section");
    }
    if values.is_empty() {
        return Err(LightingError::format(
            "candela values",
            format!("{} values", declared_nh.saturating_mul(declared_nv)),
            "none",
        ));
    }

    let (nh, nv) = resolve_dimensions(options.resync, declared_nh, declared_nv, values.len())?;
    let resync = if (nh, nv) == (declared_nh, declared_nv) {
        None
    } else {
        debug!(
            declared_nh,
            declared_nv,
            nh,
            nv,
            candela = values.len(),
            "resynchronized candela grid"
        );
        Some(Resynchronization {
            declared: (declared_nh, declared_nv),
            resolved: (nh, nv),
        })
    };

    if nv > vertical.len() {
        return Err(LightingError::format(
            "candela count mismatch, irreconcilable",
            format!("at most {} vertical angles", vertical.len()),
            format!("{} values implying {nv} angles per plane", values.len()),
        ));
    }
    vertical.truncate(nv);
    fit_planes(&mut horizontal, nh);

    let (flux, flux_origin) = declared_flux(
        header[1],
        options.flux_source,
        &lines[..marker_index],
        &metadata.keywords,
    );
    metadata.flux_origin = flux_origin;

    let candela = DMatrix::from_row_slice(nh, nv, &values);
    debug!(nh, nv, flux = *flux, "parsed photometric table");

    Ok(PhotometricTable::new(vertical, horizontal, candela, flux)?
        .with_metadata(metadata)
        .with_resynchronization(resync))
}

/// Scan the keyword section; returns the index of the tilt marker line.
fn read_header(lines: &[&str], metadata: &mut PhotometricMetadata) -> Result<usize> {
    let mut last_key: Option<String> = None;

    for (index, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.starts_with(TILT_MARKER) {
            return Ok(index);
        }
        if index == 0 && line.starts_with("IESNA") {
            metadata.format_id = Some(line.to_string());
            continue;
        }
        let Some(rest) = line.strip_prefix('[') else {
            continue;
        };
        let Some((key, value)) = rest.split_once(']') else {
            continue;
        };
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();

        let target = if key == "MORE" {
            match &last_key {
                Some(k) => k.clone(),
                None => continue,
            }
        } else {
            key
        };
        metadata
            .keywords
            .entry(target.clone())
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
        last_key = Some(target);
    }

    Err(LightingError::format(
        "missing tilt marker",
        format!("a line starting with {TILT_MARKER}"),
        format!("end of file after {} lines", lines.len()),
    ))
}

fn tilt_kind(marker_line: &str) -> Tilt {
    let value = marker_line
        .trim()
        .split_once('=')
        .map_or("", |(_, v)| v.trim());
    if value.eq_ignore_ascii_case("NONE") || value.is_empty() {
        Tilt::None
    } else if value.eq_ignore_ascii_case("INCLUDE") {
        Tilt::Include {
            geometry: 0,
            angles: Vec::new(),
            multipliers: Vec::new(),
        }
    } else {
        Tilt::External(value.to_string())
    }
}

fn read_tilt_block(cursor: &mut DataCursor<'_>) -> Result<Tilt> {
    let head = cursor.take_values(2, "tilt geometry and angle count")?;
    let count = count_field(head[1], "tilt angle count")?;
    let angles = cursor.take_values(count, "tilt angles")?;
    let multipliers = cursor.take_values(count, "tilt multipliers")?;
    trace!(count, "read embedded tilt block");
    Ok(Tilt::Include {
        geometry: head[0] as u8,
        angles,
        multipliers,
    })
}

/// Interpret a header field as a positive integral count.
fn count_field(value: f64, what: &'static str) -> Result<usize> {
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(LightingError::format(what, "a positive integer", format!("{value}")))
    }
}

fn parse_fields(fields: &[&str], line_no: usize, context: &'static str) -> Result<Vec<f64>> {
    fields
        .iter()
        .map(|t| {
            t.parse::<f64>().map_err(|_| {
                LightingError::format(context, "a numeric field", format!("'{t}' on line {line_no}"))
            })
        })
        .collect()
}

/// Decide the grid shape for `count` candela values.
fn resolve_dimensions(
    policy: ResyncPolicy,
    nh: usize,
    nv: usize,
    count: usize,
) -> Result<(usize, usize)> {
    if nh.checked_mul(nv) == Some(count) {
        return Ok((nh, nv));
    }

    let by_planes = (count % nv == 0).then_some((count / nv, nv));
    let by_angles = (count % nh == 0).then_some((nh, count / nh));
    let resolved = match policy {
        ResyncPolicy::PlanesFirst => by_planes.or(by_angles),
        ResyncPolicy::AnglesFirst => by_angles.or(by_planes),
        ResyncPolicy::Reject => None,
    };

    resolved.ok_or_else(|| {
        LightingError::format(
            "candela count mismatch, irreconcilable",
            format!("{} values ({nh} planes x {nv} angles)", nh.saturating_mul(nv)),
            format!("{count} values"),
        )
    })
}

/// Truncate or extend the plane list to `nh` entries.
///
/// Extension continues the last observed spacing, or spreads the missing
/// planes over a full turn when fewer than two angles were read.
fn fit_planes(horizontal: &mut Vec<f64>, nh: usize) {
    if horizontal.len() >= nh {
        horizontal.truncate(nh);
        return;
    }
    let step = match horizontal.as_slice() {
        [.., a, b] => b - a,
        _ => 360.0 / nh as f64,
    };
    let mut last = horizontal.last().copied().unwrap_or(-step);
    while horizontal.len() < nh {
        last += step;
        horizontal.push(last);
    }
}

fn declared_flux(
    header_lumens: f64,
    source: FluxSource,
    header_lines: &[&str],
    keywords: &FxHashMap<String, String>,
) -> (Lumens, FluxOrigin) {
    if source == FluxSource::Header || header_lumens > 0.0 {
        return (Lumens::new(header_lumens), FluxOrigin::Header);
    }

    // Prefer lamp-related keywords, then any header text
    let preferred = ["LAMP", "LUMINAIRE", "OTHER"]
        .iter()
        .filter_map(|k| keywords.get(*k).map(String::as_str));
    let annotated = preferred
        .chain(header_lines.iter().copied())
        .find_map(|text| {
            LUMEN_ANNOTATION
                .captures(text)
                .and_then(|c| annotated_lumens(&c[1]))
                .filter(|v| *v > 0.0)
        });

    match annotated {
        Some(lumens) => {
            debug!(lumens, "declared flux taken from lumen annotation");
            (Lumens::new(lumens), FluxOrigin::Annotation)
        }
        None => (Lumens::new(header_lumens), FluxOrigin::Header),
    }
}

/// Numeric value of an annotation capture, thousands separators removed.
fn annotated_lumens(capture: &str) -> Option<f64> {
    let digits: String = capture.chars().filter(|c| !matches!(c, ',' | ' ')).collect();
    digits.parse().ok()
}

/// Token reader over the data block, aware of line boundaries.
struct DataCursor<'a> {
    lines: &'a [&'a str],
    /// 1-based line number of `lines[0]` in the original file
    first_line_no: usize,
    line: usize,
    /// Tokens of the current line not yet consumed
    pending: Vec<&'a str>,
}

impl<'a> DataCursor<'a> {
    fn new(lines: &'a [&'a str], first_line_no: usize) -> Self {
        Self {
            lines,
            first_line_no,
            line: 0,
            pending: Vec::new(),
        }
    }

    fn current_line_no(&self) -> usize {
        self.first_line_no + self.line.saturating_sub(1)
    }

    /// Refill `pending` from the next non-blank line. Returns false at EOF.
    fn advance(&mut self) -> bool {
        while self.line < self.lines.len() {
            let toks: Vec<&'a str> = tokens(self.lines[self.line]).collect();
            self.line += 1;
            if !toks.is_empty() {
                // Stored reversed so tokens pop off the end in order
                self.pending = toks.into_iter().rev().collect();
                return true;
            }
        }
        false
    }

    /// Rest of the current line, or the next non-blank line.
    fn next_line(&mut self) -> Option<(Vec<&'a str>, usize)> {
        if self.pending.is_empty() && !self.advance() {
            return None;
        }
        let fields: Vec<&'a str> = self.pending.drain(..).rev().collect();
        Some((fields, self.current_line_no()))
    }

    fn next_token(&mut self) -> Option<&'a str> {
        if self.pending.is_empty() && !self.advance() {
            return None;
        }
        self.pending.pop()
    }

    /// Accumulate exactly `n` numeric values across as many lines as needed.
    fn take_values(&mut self, n: usize, context: &'static str) -> Result<Vec<f64>> {
        // Counts come from the file; don't trust them for preallocation
        let mut values = Vec::with_capacity(n.min(MAX_PREALLOCATED));
        while values.len() < n {
            let Some(token) = self.next_token() else {
                return Err(LightingError::format(
                    context,
                    format!("{n} values"),
                    format!("{} values before end of file", values.len()),
                ));
            };
            let value = token.parse::<f64>().map_err(|_| {
                LightingError::format(
                    context,
                    "a numeric value",
                    format!("'{token}' on line {}", self.current_line_no()),
                )
            })?;
            values.push(value);
        }
        Ok(values)
    }

    /// Every remaining numeric token, plus how many non-numeric ones were skipped.
    fn remaining_values(&mut self) -> (Vec<f64>, usize) {
        let mut values = Vec::new();
        let mut skipped = 0;
        while let Some(token) = self.next_token() {
            match token.parse::<f64>() {
                Ok(v) => values.push(v),
                Err(_) => skipped += 1,
            }
        }
        (values, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "IESNA:LM-63-2002\n\
[TEST] 12345\n\
[MANUFAC] Acme Lighting\n\
[LUMINAIRE] Recessed troffer\n\
[MORE] 2x4 parabolic\n\
TILT=NONE\n\
1 3200 1 5 2 1 2 0.6 1.2 0.0\n\
1.0 1 36\n\
0 22.5 45 67.5 90\n\
0 90\n\
1000 900 700 300 0\n\
1000 850 650 250 0\n";

    #[test]
    fn test_parse_full_header() {
        let table = parse(SAMPLE.as_bytes()).unwrap();

        assert_eq!(table.vertical_angles(), &[0.0, 22.5, 45.0, 67.5, 90.0]);
        assert_eq!(table.horizontal_angles(), &[0.0, 90.0]);
        assert_eq!(table.declared_total_flux(), Lumens::new(3200.0));
        assert_eq!(table.candela()[(1, 1)], 850.0);
        assert!(table.resynchronization().is_none());

        let meta = table.metadata();
        assert_eq!(meta.format_id.as_deref(), Some("IESNA:LM-63-2002"));
        assert_eq!(meta.keywords["MANUFAC"], "Acme Lighting");
        assert_eq!(meta.keywords["LUMINAIRE"], "Recessed troffer\n2x4 parabolic");
        assert_eq!(meta.photometric_type, Some(1));
        assert_eq!(meta.input_watts, Some(36.0));
        assert_eq!(meta.tilt, Tilt::None);
    }

    #[test]
    fn test_candela_multiplier_recorded_not_applied() {
        let table = parse(b"TILT=NONE\n1 1000 2.5 2 1\n0 90\n0\n100 40\n").unwrap();
        assert_eq!(table.metadata().candela_multiplier, Some(2.5));
        assert_eq!(table.candela()[(0, 0)], 100.0);
        assert_eq!(table.candela()[(0, 1)], 40.0);
    }

    #[test]
    fn test_missing_tilt_marker() {
        let err = parse(b"[TEST] nothing here\n1 2 3 4 5\n").unwrap_err();
        assert!(err.to_string().contains("missing tilt marker"));
    }

    #[test]
    fn test_no_numeric_data_after_marker() {
        let err = parse(b"TILT=NONE\n\n   \n").unwrap_err();
        assert!(matches!(err, LightingError::Format { .. }));
    }

    #[test]
    fn test_short_header_line() {
        let err = parse(b"TILT=NONE\n1 1000 1 3\n").unwrap_err();
        assert!(err.to_string().contains("photometric header"));
    }

    #[test]
    fn test_non_numeric_header() {
        let err = parse(b"TILT=NONE\n1 lots 1 3 1\n0 45 90\n0\n1 2 3\n").unwrap_err();
        assert!(err.to_string().contains("'lots'"));
    }

    #[test]
    fn test_zero_and_negative_counts_rejected() {
        assert!(parse(b"TILT=NONE\n1 1000 1 0 1\n0\n").is_err());
        assert!(parse(b"TILT=NONE\n1 1000 1 3 -1\n0 45 90\n").is_err());
        assert!(parse(b"TILT=NONE\n1 1000 1 2.5 1\n0 45 90\n").is_err());
    }

    #[test]
    fn test_compact_header_goes_straight_to_angles() {
        let table = parse(b"TILT=NONE\n1 1000 1 3 1\n0 45 90\n0\n500 300 0\n").unwrap();
        assert_eq!(table.angle_count(), 3);
        assert!(table.metadata().input_watts.is_none());
    }

    #[test]
    fn test_angles_span_lines() {
        let table = parse(b"TILT=NONE\n1 1000 1 4 1\n0 30\n60\n90\n0\n4 3 2 1\n").unwrap();
        assert_eq!(table.vertical_angles(), &[0.0, 30.0, 60.0, 90.0]);
        assert_eq!(table.candela().row(0).iter().copied().collect::<Vec<_>>(), vec![4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_tilt_include_block_consumed() {
        let file = "TILT=INCLUDE\n1\n3\n0 45 90\n1.0 0.95 0.9\n1 1000 1 2 1\n0 90\n0\n100 0\n";
        let table = parse(file.as_bytes()).unwrap();
        match &table.metadata().tilt {
            Tilt::Include { geometry, angles, multipliers } => {
                assert_eq!(*geometry, 1);
                assert_eq!(angles, &vec![0.0, 45.0, 90.0]);
                assert_eq!(multipliers, &vec![1.0, 0.95, 0.9]);
            }
            other => panic!("expected embedded tilt, got {other:?}"),
        }
        assert_eq!(table.angle_count(), 2);
    }

    #[test]
    fn test_tilt_external_file() {
        let table = parse(b"TILT=lamp.tlt\n1 1000 1 2 1\n0 90\n0\n100 0\n").unwrap();
        assert_eq!(table.metadata().tilt, Tilt::External("lamp.tlt".to_string()));
    }

    #[test]
    fn test_resync_recomputes_planes() {
        // Declares 1 plane but carries 3 planes of 3 angles
        let file = "TILT=NONE\n1 1000 1 3 1\n0 45 90\n0\n10 5 0\n12 6 0\n14 7 0\n";
        let table = parse(file.as_bytes()).unwrap();
        assert_eq!(table.plane_count(), 3);
        assert_eq!(table.horizontal_angles(), &[0.0, 120.0, 240.0]);
        assert_eq!(
            table.resynchronization(),
            Some(Resynchronization { declared: (1, 3), resolved: (3, 3) })
        );
    }

    #[test]
    fn test_resync_extends_plane_spacing() {
        let file = "TILT=NONE\n1 1000 1 2 2\n0 90\n0 90\n1 0\n2 0\n3 0\n";
        let table = parse(file.as_bytes()).unwrap();
        assert_eq!(table.horizontal_angles(), &[0.0, 90.0, 180.0]);
    }

    #[test]
    fn test_resync_recomputes_angles_when_planes_fail() {
        // 2 planes declared with 4 angles, 6 values: 6 % 4 != 0, 6 % 2 == 0 -> 3 angles
        let file = "TILT=NONE\n1 1000 1 4 2\n0 30 60 90\n0 90\n3 2 1\n3 2 1\n";
        let table = parse(file.as_bytes()).unwrap();
        assert_eq!(table.vertical_angles(), &[0.0, 30.0, 60.0]);
        assert_eq!(table.plane_count(), 2);
    }

    #[test]
    fn test_resync_irreconcilable() {
        let file = "TILT=NONE\n1 1000 1 3 2\n0 45 90\n0 90\n1 2 3 4 5\n";
        let err = parse(file.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("irreconcilable"));
    }

    #[test]
    fn test_resync_reject_policy() {
        let file = "TILT=NONE\n1 1000 1 3 1\n0 45 90\n0\n10 5 0\n12 6 0\n";
        let options = ParseOptions { resync: ResyncPolicy::Reject, ..ParseOptions::default() };
        assert!(parse_with(file.as_bytes(), options).is_err());
    }

    #[test]
    fn test_flux_annotation_fallback() {
        let file = "[LAMP] LED module 4000 lm\nTILT=NONE\n1 -1 1 2 1\n0 90\n0\n100 0\n";

        let table = parse(file.as_bytes()).unwrap();
        assert_eq!(table.declared_total_flux(), Lumens::new(-1.0));

        let options = ParseOptions { flux_source: FluxSource::HeaderOrAnnotation, ..ParseOptions::default() };
        let table = parse_with(file.as_bytes(), options).unwrap();
        assert_eq!(table.declared_total_flux(), Lumens::new(4000.0));
        assert_eq!(table.metadata().flux_origin, FluxOrigin::Annotation);
    }

    #[test]
    fn test_flux_annotation_with_thousands_separator() {
        let options = ParseOptions { flux_source: FluxSource::HeaderOrAnnotation, ..ParseOptions::default() };
        for (annotation, expected) in [
            ("LED module 1,200 lm", 1200.0),
            ("LED module 12 500 lumens", 12500.0),
            ("T5 2x 1,250.5 lm", 1250.5),
            ("36 W, 3350 lm", 3350.0),
        ] {
            let file = format!("[LAMP] {annotation}\nTILT=NONE\n1 -1 1 2 1\n0 90\n0\n100 0\n");
            let table = parse_with(file.as_bytes(), options).unwrap();
            assert_eq!(
                table.declared_total_flux(),
                Lumens::new(expected),
                "annotation '{annotation}'"
            );
        }
    }

    #[test]
    fn test_resolve_dimensions_policies() {
        assert_eq!(resolve_dimensions(ResyncPolicy::PlanesFirst, 2, 3, 6), Ok((2, 3)));
        assert_eq!(resolve_dimensions(ResyncPolicy::PlanesFirst, 2, 3, 12), Ok((4, 3)));
        assert_eq!(resolve_dimensions(ResyncPolicy::AnglesFirst, 2, 3, 12), Ok((2, 6)));
        assert!(resolve_dimensions(ResyncPolicy::Reject, 2, 3, 12).is_err());
        assert!(resolve_dimensions(ResyncPolicy::PlanesFirst, 2, 3, 7).is_err());
    }

    #[test]
    fn test_crlf_and_latin1_text() {
        let mut bytes = b"[MANUFAC] Iluminaci".to_vec();
        bytes.push(0xF3);
        bytes.extend_from_slice(b"n\r\nTILT=NONE\r\n1 1000 1 2 1\r\n0 90\r\n0\r\n100 0\r\n");
        let table = parse(&bytes).unwrap();
        assert_eq!(table.metadata().keywords["MANUFAC"], "Iluminación");
    }
}
