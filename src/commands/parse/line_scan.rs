use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::model::CanonicalDictionary;

const PROGRESS_INTERVAL: usize = 1000;

/// Outcome of one source file: the populated dictionary plus every
/// recoverable problem met along the way.
#[derive(Debug)]
pub(crate) struct ParsedSource {
    pub(crate) dictionary: CanonicalDictionary,
    pub(crate) diagnostics: Vec<String>,
}

/// A strategy consumes a source file one line at a time, in order.
pub(crate) trait LineParser {
    fn feed(&mut self, line_number: usize, line: &str);

    fn finish(self) -> ParsedSource;
}

pub(crate) fn run_parser<P: LineParser>(
    path: &Path,
    max_line_bytes: usize,
    mut parser: P,
) -> Result<ParsedSource> {
    scan_lines(path, max_line_bytes, |line_number, line| {
        parser.feed(line_number, line)
    })?;
    Ok(parser.finish())
}

/// Calls `visit` with each line (1-based number, line terminator removed).
/// Fails on an unreadable file, invalid UTF-8, or a line longer than
/// `max_line_bytes`.
pub(crate) fn scan_lines(
    path: &Path,
    max_line_bytes: usize,
    mut visit: impl FnMut(usize, &str),
) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let read_limit = max_line_bytes.saturating_add(2) as u64;
    let mut buffer = Vec::<u8>::new();
    let mut line_number = 0usize;

    loop {
        buffer.clear();
        let count = (&mut reader)
            .take(read_limit)
            .read_until(b'\n', &mut buffer)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if count == 0 {
            break;
        }
        line_number += 1;

        let mut content = buffer.as_slice();
        if let Some(stripped) = content.strip_suffix(b"\n") {
            content = stripped;
        }
        if let Some(stripped) = content.strip_suffix(b"\r") {
            content = stripped;
        }

        if content.len() > max_line_bytes {
            bail!(
                "line {} of {} exceeds the {} byte line limit",
                line_number,
                path.display(),
                max_line_bytes
            );
        }

        let line = std::str::from_utf8(content).with_context(|| {
            format!("line {} of {} is not valid UTF-8", line_number, path.display())
        })?;

        visit(line_number, line);

        if line_number % PROGRESS_INTERVAL == 0 {
            debug!(path = %path.display(), line = line_number, "processed lines");
        }
    }

    Ok(line_number)
}

pub(crate) fn invalid_line(line_number: usize, line: &str) -> String {
    format!("invalid line {line_number}: {line}")
}
