//! Event-log trace parsing.
//!
//! Classifies each line of an ASCII trace (for example an ns-3 `.tr` file) as
//! a send event, a receive event, or something else, and tallies the totals
//! into a [`TraceSummary`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::types::*;
use crate::utils::ratio::safe_percentage;

/// Classify a single trace line.
///
/// The sent marker is checked first, so a line containing both markers
/// counts as [`TraceEvent::Sent`] only.
pub fn classify_line(line: &str, markers: &TraceMarkers) -> TraceEvent {
    if line.contains(markers.sent.as_str()) {
        TraceEvent::Sent
    } else if line.contains(markers.received.as_str()) {
        TraceEvent::Received
    } else {
        TraceEvent::Other
    }
}

/// Tally send/receive events over a sequence of trace lines
pub fn parse_trace<I, S>(lines: I, markers: &TraceMarkers) -> TraceSummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sent: u64 = 0;
    let mut received: u64 = 0;
    let mut other: u64 = 0;

    for line in lines {
        match classify_line(line.as_ref(), markers) {
            TraceEvent::Sent => sent += 1,
            TraceEvent::Received => received += 1,
            TraceEvent::Other => other += 1,
        }
    }

    TraceSummary {
        sent,
        received,
        other,
        pdr: safe_percentage(received as f64, sent as f64),
    }
}

/// Parse a trace file from disk.
///
/// Lines that are not valid UTF-8 are decoded lossily; only I/O failures are
/// reported as errors.
pub fn parse_trace_file(path: &Path, markers: &TraceMarkers) -> Result<TraceSummary, ParseError> {
    let io_err = |source: std::io::Error| ParseError::Io {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);

    let mut lines: Vec<String> = Vec::new();
    let mut buf: Vec<u8> = Vec::new();
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(io_err)?;
        if read == 0 {
            break;
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }

    let summary = parse_trace(&lines, markers);
    log::debug!(
        "Parsed trace {}: {} sent, {} received, {} other",
        path.display(),
        summary.sent,
        summary.received,
        summary.other
    );
    Ok(summary)
}
