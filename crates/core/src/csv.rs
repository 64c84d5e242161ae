//! Spot CSV export/import, independent of the store.
//!
//! The column layout is fixed and strictly positional; the header row is
//! written for humans but never consulted on import. Multi-value fields
//! (`tags`, `photoUrls`) are `|`-joined inside a single cell.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::spot::{GeoPoint, SpotCategory};
use crate::types::{DocId, SpotAuthor, Timestamp};

/// Fixed column order. Import maps tokens to fields by position.
pub const CSV_HEADERS: [&str; 11] = [
    "id",
    "name",
    "category",
    "tags",
    "lat",
    "lng",
    "memo",
    "photoUrls",
    "createdAt",
    "createdByUid",
    "createdByDisplayName",
];

/// Byte-order mark prefixed to exported files so spreadsheet tools pick
/// up UTF-8.
pub const UTF8_BOM: char = '\u{feff}';

/// Separator for multi-value cells.
const MULTI_VALUE_SEPARATOR: char = '|';

/// Export filename: `posting-map-spots-<YYYY-MM-DD>.csv`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("posting-map-spots-{date}.csv")
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Combined pointer + content fields, one per CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvSpot {
    pub id: DocId,
    pub name: String,
    pub category: SpotCategory,
    pub tags: Vec<String>,
    pub location: GeoPoint,
    pub memo: String,
    pub photo_urls: Vec<String>,
    pub created_at: Timestamp,
    pub created_by: SpotAuthor,
}

/// A row the importer refused, with the 1-based source line number.
///
/// The importer skips and continues rather than failing the whole file;
/// this report makes the skips visible instead of silent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

/// Result of parsing a CSV file: the accepted records plus the report of
/// every skipped row.
#[derive(Debug, Clone, Default)]
pub struct CsvImport {
    pub records: Vec<CsvSpot>,
    pub skipped: Vec<SkippedRow>,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Render spots to CSV text, BOM included.
///
/// `createdAt` is emitted as ISO-8601 with millisecond precision, so
/// sub-millisecond timestamp detail does not survive a round trip.
pub fn export_spots(spots: &[CsvSpot]) -> String {
    let mut out = String::new();
    out.push(UTF8_BOM);
    out.push_str(&CSV_HEADERS.join(","));

    for spot in spots {
        let fields = [
            escape_field(&spot.id),
            escape_field(&spot.name),
            escape_field(spot.category.as_str()),
            escape_field(&spot.tags.join(&MULTI_VALUE_SEPARATOR.to_string())),
            escape_field(&spot.location.lat.to_string()),
            escape_field(&spot.location.lng.to_string()),
            escape_field(&spot.memo),
            escape_field(&spot.photo_urls.join(&MULTI_VALUE_SEPARATOR.to_string())),
            escape_field(&spot.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            escape_field(&spot.created_by.uid),
            escape_field(&spot.created_by.display_name),
        ];
        out.push('\n');
        out.push_str(&fields.join(","));
    }
    out
}

/// Standard CSV quoting: wrap when the field contains a comma, quote, or
/// newline, doubling internal quotes.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Parse CSV text into spot records.
///
/// Requires a header row plus at least one data row. Rows with too few
/// fields, an unparseable date, or unparseable coordinates are skipped
/// and reported, never fatal.
pub fn parse_spots(text: &str) -> Result<CsvImport, CoreError> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    // Keep original line numbers for the skip report; blank lines are
    // dropped but still counted.
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(CoreError::Format(
            "CSV must contain a header row and at least one data row".into(),
        ));
    }

    let mut import = CsvImport::default();

    for (line_no, line) in &lines[1..] {
        let tokens = split_csv_line(line);
        match parse_row(&tokens) {
            Ok(record) => import.records.push(record),
            Err(reason) => import.skipped.push(SkippedRow {
                line: *line_no,
                reason,
            }),
        }
    }

    Ok(import)
}

fn parse_row(tokens: &[String]) -> Result<CsvSpot, String> {
    if tokens.len() < CSV_HEADERS.len() {
        return Err(format!(
            "expected {} fields, got {}",
            CSV_HEADERS.len(),
            tokens.len()
        ));
    }

    let category = SpotCategory::from_str(&tokens[2])
        .ok_or_else(|| format!("unknown category '{}'", tokens[2]))?;
    let lat = parse_coordinate(&tokens[4], "lat")?;
    let lng = parse_coordinate(&tokens[5], "lng")?;
    let created_at = parse_timestamp(&tokens[8])?;

    Ok(CsvSpot {
        id: tokens[0].clone(),
        name: tokens[1].clone(),
        category,
        tags: split_multi_value(&tokens[3]),
        location: GeoPoint { lat, lng },
        memo: tokens[6].clone(),
        photo_urls: split_multi_value(&tokens[7]),
        created_at,
        created_by: SpotAuthor {
            uid: tokens[9].clone(),
            display_name: tokens[10].clone(),
        },
    })
}

fn parse_coordinate(token: &str, field: &str) -> Result<f64, String> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid {field} '{token}'"))
}

/// Parse a date cell. Accepts ISO-8601 date-times and bare dates
/// (midnight UTC).
fn parse_timestamp(token: &str) -> Result<Timestamp, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(token) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = token.parse::<NaiveDate>() {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(format!("invalid createdAt '{token}'"))
}

fn split_multi_value(cell: &str) -> Vec<String> {
    cell.split(MULTI_VALUE_SEPARATOR)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokenize one CSV line, honoring quoted commas and doubled quotes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}
