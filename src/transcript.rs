//! Caption clean-up: VTT de-duplication and paragraph assembly.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

static INLINE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Length of a `[00:00:00.080]` stamp.
const STAMP_LEN: usize = 14;

/// Collapses auto-generated VTT captions into `[start] text` lines.
///
/// Rolling captions repeat each line across cues; only the first occurrence of
/// every distinct text is kept, stamped with the start time of its cue.
///
/// # Errors
///
/// Returns [`Error::EmptyTranscript`] if no caption text survives.
pub fn deduplicate_vtt(input: &str, source_name: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut current_stamp: Option<&str> = None;
    let mut lines = Vec::new();

    for raw in input.lines() {
        let line = raw.trim();

        if line.starts_with("WEBVTT") || line.starts_with("Kind:") || line.starts_with("Language:") {
            continue;
        }

        if let Some((start, _)) = line.split_once("-->") {
            current_stamp = Some(start.trim());
            continue;
        }

        let Some(stamp) = current_stamp else { continue };
        if line.is_empty() {
            continue;
        }

        let clean = INLINE_TAG
            .replace_all(line, "")
            .replace("&amp;", "&")
            .replace("&gt;", ">")
            .replace("&lt;", "<");

        if !clean.is_empty() && seen.insert(clean.clone()) {
            lines.push(format!("[{stamp}] {clean}"));
        }
    }

    if lines.is_empty() {
        return Err(Error::empty_transcript(source_name));
    }
    Ok(lines)
}

/// Parses a break list such as `"15,42,78"` into 1-based line numbers.
///
/// # Errors
///
/// Returns [`Error::InvalidBreaks`] if any entry is not an integer.
pub fn parse_breaks(input: &str) -> Result<BTreeSet<usize>> {
    input
        .split(',')
        .map(|part| {
            part.trim().parse::<usize>().map_err(|e| Error::InvalidBreaks {
                input: input.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Joins timestamped lines into paragraphs, closing one after every break line.
///
/// Each paragraph ends with the stamp of its first timestamped line. Lines
/// without a stamp are folded into the surrounding paragraph; a paragraph that
/// never saw a stamp is not emitted.
///
/// # Errors
///
/// Returns [`Error::EmptyTranscript`] if no paragraph could be built.
pub fn apply_paragraph_breaks(
    input: &str,
    breaks: &BTreeSet<usize>,
    source_name: &str,
) -> Result<Vec<String>> {
    let lines: Vec<(Option<&str>, &str)> = input.lines().map(split_stamp).collect();
    let total = lines.len();

    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start_stamp: Option<&str> = None;

    for (i, (stamp, text)) in lines.into_iter().enumerate() {
        let line_no = i + 1;

        if start_stamp.is_none() {
            start_stamp = stamp;
        }
        if !text.is_empty() {
            current.push(text);
        }

        let closes = breaks.contains(&line_no) || line_no == total;
        if let Some(first) = start_stamp.filter(|_| closes && !current.is_empty()) {
            paragraphs.push(format!("{} {}", current.join(" "), first));
            current.clear();
            start_stamp = None;
        }
    }

    if paragraphs.is_empty() {
        return Err(Error::empty_transcript(source_name));
    }
    Ok(paragraphs)
}

/// Renders paragraphs separated by blank lines.
#[must_use]
pub fn paragraphs_markdown(paragraphs: &[String]) -> String {
    paragraphs.iter().map(|p| format!("{p}\n\n")).collect()
}

/// Splits `[00:00:00.080] text` into stamp and text, counting characters.
fn split_stamp(line: &str) -> (Option<&str>, &str) {
    if !line.starts_with('[') {
        return (None, line);
    }
    let mut boundaries = line.char_indices().map(|(i, _)| i).skip(STAMP_LEN);
    match (boundaries.next(), boundaries.next()) {
        (Some(stamp_end), Some(text_start)) => (Some(&line[..stamp_end]), &line[text_start..]),
        _ => (None, line),
    }
}
