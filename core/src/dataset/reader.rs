use std::borrow::Cow;
use std::fs;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use encoding_rs::{Encoding, UTF_8};
use memmap2::Mmap;
use rayon::prelude::*;

use super::{CsvParser, DatasetError, LoadReport, Record, RowIssue};

/// Memory-map a CSV file and parse it into records.
pub fn read_dataset(path: &Path) -> Result<(Vec<Record>, LoadReport), DatasetError> {
    let file = fs::File::open(path).map_err(|source| DatasetError::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    let len = file
        .metadata()
        .map_err(|source| DatasetError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if len == 0 {
        return Err(DatasetError::EmptyInput);
    }

    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| DatasetError::MemoryMap {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(mmap.as_ref())
}

/// Parse CSV bytes. The first non-blank record is the header; line numbers in
/// the report are the 1-based file line where each record starts.
pub fn parse_bytes(bytes: &[u8]) -> Result<(Vec<Record>, LoadReport), DatasetError> {
    let bytes = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) if encoding == UTF_8 => &bytes[bom_len..],
        _ => bytes,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    // Quoted fields may span lines, so records are split sequentially and
    // only the typed conversion runs in parallel
    let mut raw_rows: Vec<(u64, ByteRecord)> = Vec::new();
    let mut row = ByteRecord::new();
    while reader
        .read_byte_record(&mut row)
        .map_err(|source| DatasetError::Csv { source })?
    {
        if row.iter().all(|field| field.trim_ascii().is_empty()) {
            continue;
        }
        let line_number = row.position().map_or(0, |pos| pos.line());
        raw_rows.push((line_number, std::mem::take(&mut row)));
    }

    let ((_, header), body) = raw_rows.split_first().ok_or(DatasetError::EmptyInput)?;
    let parser = CsvParser::from_header(&decode_fields(header))?;

    let parsed: Vec<Result<Record, RowIssue>> = body
        .par_iter()
        .map(|(line_number, raw)| parser.parse_record(*line_number, &decode_fields(raw)))
        .collect();

    let mut records = Vec::with_capacity(parsed.len());
    let mut report = LoadReport::default();
    for row in parsed {
        report.rows += 1;
        match row {
            Ok(record) => records.push(record),
            Err(issue) => {
                tracing::debug!(line = issue.line_number, field = issue.field, "Dropping malformed row");
                report.dropped.push(issue);
            }
        }
    }
    report.loaded = records.len();

    if !report.dropped.is_empty() {
        tracing::warn!(
            dropped = report.dropped.len(),
            rows = report.rows,
            "Rows with missing fields were skipped"
        );
    }
    Ok((records, report))
}

// Lossy UTF-8; invalid bytes become U+FFFD instead of failing the row
fn decode_fields(row: &ByteRecord) -> Vec<Cow<'_, str>> {
    row.iter()
        .map(|field| UTF_8.decode_without_bom_handling(field).0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::resolve;

    #[test]
    fn parses_fixture_and_counts_dropped_rows() {
        let (records, report) =
            read_dataset(Path::new("../integration-tests/fixtures/air_quality.csv")).unwrap();

        assert_eq!(report.rows, 14);
        assert_eq!(report.loaded, 12);
        assert_eq!(records.len(), 12);
        assert_eq!(
            report.dropped,
            vec![
                RowIssue {
                    line_number: 8,
                    field: "value"
                },
                RowIssue {
                    line_number: 12,
                    field: "time"
                },
            ]
        );
        // file order preserved across the parallel parse
        assert_eq!(resolve(records[0].country), "India");
        assert_eq!(resolve(records[11].country), "Korea, Republic of");
    }

    #[test]
    fn strips_bom_and_skips_blank_lines() {
        let bytes = "\u{feff}countryname,continent,pollutant,value,unit,time\n\nPeru,South America,CO,0.4,ppm,2021-02-03\n"
            .as_bytes();
        let (records, report) = parse_bytes(bytes).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.rows, 1);
        assert_eq!(resolve(records[0].country), "Peru");
    }

    #[test]
    fn quoted_field_may_span_lines() {
        let bytes = "countryname,continent,pollutant,value,unit,time\n\"Bonaire,\nSint Eustatius\",North America,PM2.5,10,ug,2020-01-01\nPeru,South America,CO,0.4,ppm,2021-02-03\n"
            .as_bytes();
        let (records, report) = parse_bytes(bytes).unwrap();
        assert!(report.dropped.is_empty());
        assert_eq!(report.rows, 2);
        assert_eq!(resolve(records[0].country), "Bonaire,\nSint Eustatius");
        assert_eq!(resolve(records[1].country), "Peru");
    }

    #[test]
    fn dropped_row_reports_its_starting_line() {
        let bytes = "countryname,continent,pollutant,value,unit,time\n\"Multi\nLine\",Asia,PM2.5,1,ug,2020-01-01\nPeru,South America,CO,inf,ppm,2021-02-03\n"
            .as_bytes();
        let (records, report) = parse_bytes(bytes).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            report.dropped,
            vec![RowIssue {
                line_number: 4,
                field: "value"
            }]
        );
    }

    #[test]
    fn blank_input_is_an_error() {
        assert!(matches!(parse_bytes(b"\n\n"), Err(DatasetError::EmptyInput)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = read_dataset(Path::new("../integration-tests/fixtures/missing.csv"));
        assert!(matches!(result, Err(DatasetError::OpenFile { .. })));
    }
}
