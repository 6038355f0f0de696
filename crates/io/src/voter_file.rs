// County voter extract: optional ZIP wrapper, optional legal notice, CSV body

use std::fmt;
use std::io::{Cursor, Read};
use std::path::Path;

use vrlist_roster::model::columns;
use vrlist_roster::Row;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Lines of legal notice shown to the operator, and lines skipped before the
/// CSV header, when the extract starts with a statutory header.
const NOTICE_LINES: usize = 9;
const HEADER_SKIP_LINES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Io { path: String, message: String },
    Archive(String),
    Csv { line: Option<u64>, message: String },
    MissingColumns(Vec<String>),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Archive(msg) => write!(f, "cannot unpack voter file archive: {msg}"),
            Self::Csv { line: Some(line), message } => {
                write!(f, "malformed voter file at line {line}: {message}")
            }
            Self::Csv { line: None, message } => write!(f, "malformed voter file: {message}"),
            Self::MissingColumns(cols) => {
                write!(f, "voter file is missing required columns: {}", cols.join(", "))
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// A loaded extract. `notice` holds the statutory header if one was present.
#[derive(Debug, Clone, Default)]
pub struct VoterFile {
    pub notice: Option<String>,
    pub rows: Vec<Row>,
}

pub fn load_voter_file(path: &Path) -> Result<VoterFile, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "read voter file");
    parse_voter_bytes(bytes)
}

/// Everything [`load_voter_file`] does after the bytes are in memory.
pub fn parse_voter_bytes(bytes: Vec<u8>) -> Result<VoterFile, LoadError> {
    let bytes = if bytes.starts_with(ZIP_MAGIC) {
        unwrap_sole_member(bytes)?
    } else {
        bytes
    };

    let text = decode_text(bytes);
    let (notice, body) = split_notice(&text);
    let rows = parse_rows(body)?;
    tracing::info!(rows = rows.len(), notice = notice.is_some(), "parsed voter file");

    Ok(VoterFile { notice, rows })
}

/// The county ships the extract as a one-member ZIP; take the first member.
fn unwrap_sole_member(bytes: Vec<u8>) -> Result<Vec<u8>, LoadError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| LoadError::Archive(e.to_string()))?;
    if archive.is_empty() {
        return Err(LoadError::Archive("archive has no members".to_string()));
    }
    if archive.len() > 1 {
        tracing::warn!(members = archive.len(), "archive has several members, using the first");
    }

    let mut member = archive.by_index(0).map_err(|e| LoadError::Archive(e.to_string()))?;
    tracing::debug!(name = member.name(), size = member.size(), "unpacking archive member");
    let mut out = Vec::new();
    member
        .read_to_end(&mut out)
        .map_err(|e| LoadError::Archive(e.to_string()))?;
    Ok(out)
}

/// UTF-8 if it is valid, otherwise Windows-1252 (a superset of Latin-1's
/// printable range, which some addresses in the extract use).
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            tracing::debug!("voter file is not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Split off the statutory header. It is recognized by its leading 'S'
/// (a CSV header row starts with a column name in quotes or `VUIDNO`).
fn split_notice(text: &str) -> (Option<String>, &str) {
    if !text.starts_with('S') {
        return (None, text);
    }

    let mut lines = text.split_inclusive('\n');
    let notice: String = lines.by_ref().take(NOTICE_LINES).collect();
    let skipped: usize = notice.len()
        + lines
            .take(HEADER_SKIP_LINES - NOTICE_LINES)
            .map(str::len)
            .sum::<usize>();
    (Some(notice), &text[skipped..])
}

fn parse_rows(body: &str) -> Result<Vec<Row>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers().map_err(csv_error)?.clone();
    let missing: Vec<String> = columns::REQUIRED
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h, record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn csv_error(e: csv::Error) -> LoadError {
    LoadError::Csv {
        line: e.position().map(|p| p.line()),
        message: e.to_string(),
    }
}
