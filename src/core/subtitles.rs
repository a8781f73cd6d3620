//! SRT subtitle processing.
//!
//! Parses the catalog's plain-text subtitle payloads into typed
//! entries, tracks declared time offsets, and re-serializes standard
//! SRT. Parsing never fails: unparsable times fall back to zero and
//! malformed lines are carried through as text.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A subtitle timestamp with millisecond precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SrtTime {
    millis: i64,
}

impl SrtTime {
    pub fn zero() -> Self {
        Self { millis: 0 }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    pub fn millis(self) -> i64 {
        self.millis
    }

    pub fn is_zero(self) -> bool {
        self.millis == 0
    }

    /// Parse `HH:MM:SS,mmm` (or `.` as decimal separator, optional
    /// sign, optional millisecond part).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (sign, s) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };
        let mut it = s.splitn(3, ':');
        let hours: i64 = it.next()?.parse().ok()?;
        let minutes: i64 = it.next()?.parse().ok()?;
        let rest = it.next()?;
        let (secs_str, millis_str) = match rest.split_once([',', '.']) {
            Some((a, b)) => (a, Some(b)),
            None => (rest, None),
        };
        let seconds: i64 = secs_str.parse().ok()?;
        let millis: i64 = match millis_str {
            Some(m) if !m.is_empty() => {
                let digits: String = m.chars().take(3).collect();
                let value: i64 = digits.parse().ok()?;
                value * 10i64.pow(3 - digits.len() as u32)
            }
            _ => 0,
        };
        Some(Self {
            millis: sign * (((hours * 60 + minutes) * 60 + seconds) * 1000 + millis),
        })
    }

    /// Parse, falling back to zero on any malformed input.
    pub fn parse_or_zero(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(Self::zero)
    }

    pub fn plus(self, other: SrtTime) -> SrtTime {
        SrtTime {
            millis: self.millis + other.millis,
        }
    }
}

impl std::fmt::Display for SrtTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let millis = self.millis.max(0);
        let hours = millis / 3_600_000;
        let minutes = millis / 60_000 % 60;
        let seconds = millis / 1000 % 60;
        let ms = millis % 1000;
        write!(f, "{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, ms)
    }
}

/// One subtitle entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SrtEntry {
    /// Entry number as recorded in the source; rewritten on output.
    pub number: u32,
    pub start: SrtTime,
    pub end: SrtTime,
    /// Free-form suffix after the times (position hints etc.),
    /// carried through verbatim.
    pub time_extension: String,
    pub lines: Vec<String>,
    /// Running offset in effect for this entry; applied at write
    /// time, never baked into `start`/`end`.
    pub offset: SrtTime,
}

/// A parsed subtitle file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SrtDocument {
    pub entries: Vec<SrtEntry>,
}

enum State {
    EntryNumber,
    Times,
    Lines,
}

/// Parse subtitle text.
///
/// Line-oriented state machine: entry number, times, subtitle lines
/// until an empty line. The entry-number line may carry an inline
/// `(Offset <timespan>)` annotation that strips itself and overrides
/// the running offset for this and all subsequent entries. Leading
/// blank lines are skipped; a trailing entry without a closing blank
/// line is still flushed.
pub fn parse(text: &str) -> SrtDocument {
    let offset_re = Regex::new(r"\(Offset ([^)]+)\)").unwrap();
    let times_re = Regex::new(r"^\s*(\S+)\s*-->\s*(\S+)\s*(.*)$").unwrap();

    let mut document = SrtDocument::default();
    let mut state = State::EntryNumber;
    let mut offset = SrtTime::zero();
    let mut current = SrtEntry::default();

    for line in text.lines() {
        match state {
            State::EntryNumber => {
                let mut line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if let Some(caps) = offset_re.captures(&line) {
                    offset = SrtTime::parse_or_zero(&caps[1]);
                    line = offset_re.replace(&line, "").trim().to_string();
                }
                current = SrtEntry {
                    number: line.parse().unwrap_or(0),
                    offset,
                    ..Default::default()
                };
                state = State::Times;
            }
            State::Times => {
                if let Some(caps) = times_re.captures(line) {
                    current.start = SrtTime::parse_or_zero(&caps[1]);
                    current.end = SrtTime::parse_or_zero(&caps[2]);
                    current.time_extension = caps[3].trim().to_string();
                }
                state = State::Lines;
            }
            State::Lines => {
                if line.trim().is_empty() {
                    document.entries.push(std::mem::take(&mut current));
                    state = State::EntryNumber;
                } else {
                    current.lines.push(line.to_string());
                }
            }
        }
    }
    if matches!(state, State::Lines) {
        document.entries.push(current);
    }

    document
}

/// Serialize a document to SRT text.
///
/// Entries are renumbered from 1 regardless of their recorded
/// numbers, and each entry's offset is applied to its times.
pub fn serialize(document: &SrtDocument) -> String {
    let mut out = String::new();
    for (index, entry) in document.entries.iter().enumerate() {
        out.push_str(&format!("{}\n", index + 1));
        out.push_str(&format!(
            "{} --> {}",
            entry.start.plus(entry.offset),
            entry.end.plus(entry.offset)
        ));
        if !entry.time_extension.is_empty() {
            out.push(' ');
            out.push_str(&entry.time_extension);
        }
        out.push('\n');
        for line in &entry.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
