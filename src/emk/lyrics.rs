//! The lyric text payload (`.lyr`) structure.
//!
//! A lyric payload is a small cp874 text file: three metadata lines (song
//! title, artist, musical key), one blank separator line, then one line of
//! lyrics per sung line. Transcoding to/from cp874 lives in
//! [`codec::text`](crate::emk::codec::text); this module only deals with the
//! decoded string.

use log::debug;

use crate::emk::format::cursor::{self, LineSegment};
use crate::emk::types::error::Result;

/// Thai combining marks (vowels above/below and tone marks). These render
/// onto the preceding base character and share its cursor tick.
const THAI_COMBINING: [char; 15] = [
    '\u{0E31}', '\u{0E34}', '\u{0E35}', '\u{0E36}', '\u{0E37}', '\u{0E38}', '\u{0E39}',
    '\u{0E47}', '\u{0E48}', '\u{0E49}', '\u{0E4A}', '\u{0E4B}', '\u{0E4C}', '\u{0E4D}',
    '\u{0E4E}',
];

/// A parsed lyric file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LyrFile {
    pub title: String,
    pub artist: String,
    pub key: String,
    /// One entry per sung lyric line.
    pub lines: Vec<String>,
}

impl LyrFile {
    /// Parses decoded lyric text (LF line endings).
    ///
    /// Lenient: missing metadata lines come back empty, trailing blank lines
    /// are dropped.
    pub fn parse(text: &str) -> Self {
        let mut lines: Vec<&str> = text.split('\n').collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let header_line = |i: usize| lines.get(i).copied().unwrap_or_default().to_string();
        let lyr = Self {
            title: header_line(0),
            artist: header_line(1),
            key: header_line(2),
            // Index 3 is the blank separator line.
            lines: lines
                .iter()
                .skip(4)
                .map(|l| l.to_string())
                .collect(),
        };
        debug!(
            "Parsed lyric file: '{}' by '{}', {} lines",
            lyr.title,
            lyr.artist,
            lyr.lines.len()
        );
        lyr
    }

    /// Serializes back to the text layout the format expects (LF endings;
    /// the cp874 encoder turns them into CRLF on the wire).
    pub fn to_text(&self) -> String {
        let mut parts = vec![
            self.title.as_str(),
            self.artist.as_str(),
            self.key.as_str(),
            "",
        ];
        parts.extend(self.lines.iter().map(String::as_str));
        parts.join("\n")
    }

    /// Each lyric line split into its character units, one cursor tick per
    /// unit. This is the unit count the cursor stream is built against:
    /// `ticks == sum(units per line) + line count`.
    pub fn line_units(&self) -> Vec<Vec<String>> {
        self.lines
            .iter()
            .map(|line| line.chars().map(String::from).collect())
            .collect()
    }

    /// Aligns this lyric file's lines against a cursor tick stream.
    pub fn segment(&self, ticks: &[u16]) -> Result<Vec<LineSegment>> {
        cursor::segment_by_words(&self.line_units(), ticks)
    }
}

/// Groups a lyric line into display clusters: a base character plus any
/// trailing combining marks. Useful when one highlight step should cover a
/// whole rendered glyph instead of each code point.
pub fn clusters_from_text(text: &str) -> Vec<String> {
    let mut clusters: Vec<String> = Vec::new();
    for ch in text.chars() {
        match clusters.last_mut() {
            Some(last) if THAI_COMBINING.contains(&ch) => last.push(ch),
            _ => clusters.push(ch.to_string()),
        }
    }
    clusters
}
