//! Captured frames.
//!
//! A [`Frame`] is the plain-text record of one completed draw. Sessions keep
//! every frame they paint so tests can inspect intermediate screens, not just
//! the last one.

use crate::buffer::Buffer;
use crate::result::{HarnessError, HarnessResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Plain-text capture of a drawn buffer
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    content: Vec<String>,
    width: u16,
    height: u16,
    /// Draw sequence number within the session, starting at 0
    index: usize,
    /// Milliseconds since the session started
    timestamp_ms: u64,
}

impl Frame {
    /// Capture a buffer
    #[must_use]
    pub fn from_buffer(buffer: &Buffer, index: usize, timestamp_ms: u64) -> Self {
        Self {
            content: buffer.to_lines(),
            width: buffer.width(),
            height: buffer.height(),
            index,
            timestamp_ms,
        }
    }

    /// Build a frame from raw text lines
    #[must_use]
    pub fn from_lines(lines: &[&str]) -> Self {
        let height = lines.len() as u16;
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
        Self {
            content: lines.iter().map(|s| (*s).to_string()).collect(),
            width,
            height,
            index: 0,
            timestamp_ms: 0,
        }
    }

    /// Frame width
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Frame height
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Draw sequence number
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Capture time
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Rows of text
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.content
    }

    /// Rows joined by newlines
    #[must_use]
    pub fn as_text(&self) -> String {
        self.content.join("\n")
    }

    /// Whether any row contains `text`
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.content.iter().any(|line| line.contains(text))
    }

    /// Whether any row matches a regex
    pub fn matches(&self, pattern: &str) -> HarnessResult<bool> {
        let re = compile(pattern)?;
        Ok(self.content.iter().any(|line| re.is_match(line)))
    }

    /// Rows matching a regex
    pub fn find_matches(&self, pattern: &str) -> HarnessResult<Vec<&str>> {
        let re = compile(pattern)?;
        Ok(self
            .content
            .iter()
            .filter(|line| re.is_match(line))
            .map(String::as_str)
            .collect())
    }

    /// One row
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&str> {
        self.content.get(index).map(String::as_str)
    }

    /// Same text content
    #[must_use]
    pub fn is_identical(&self, other: &Frame) -> bool {
        self.content == other.content
    }

    /// Rows that differ, treating `self` as expected
    #[must_use]
    pub fn diff(&self, other: &Frame) -> FrameDiff {
        let max_lines = self.content.len().max(other.content.len());
        let changed_lines: Vec<LineDiff> = (0..max_lines)
            .filter_map(|i| {
                let expected = self.line(i).unwrap_or("");
                let actual = other.line(i).unwrap_or("");
                (expected != actual).then(|| LineDiff {
                    line_number: i,
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                })
            })
            .collect();

        FrameDiff {
            is_identical: changed_lines.is_empty(),
            changed_lines,
        }
    }
}

fn compile(pattern: &str) -> HarnessResult<regex::Regex> {
    regex::Regex::new(pattern).map_err(|e| HarnessError::AssertionFailed {
        message: format!("Invalid regex pattern: {e}"),
    })
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frame#{} ({}x{}):", self.index, self.width, self.height)?;
        for (i, line) in self.content.iter().enumerate() {
            writeln!(f, "  {i:3}: {line}")?;
        }
        Ok(())
    }
}

/// Difference between two frames
#[derive(Debug, Clone)]
pub struct FrameDiff {
    /// Whether frames are identical
    pub is_identical: bool,
    /// Lines that differ
    pub changed_lines: Vec<LineDiff>,
}

/// A single line difference
#[derive(Debug, Clone)]
pub struct LineDiff {
    /// Line number (0-indexed)
    pub line_number: usize,
    /// Expected content
    pub expected: String,
    /// Actual content
    pub actual: String,
}

impl fmt::Display for FrameDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identical {
            return write!(f, "Frames are identical");
        }
        writeln!(f, "Frame differences:")?;
        for diff in &self.changed_lines {
            writeln!(f, "  Line {}: ", diff.line_number)?;
            writeln!(f, "    Expected: {:?}", diff.expected)?;
            writeln!(f, "    Actual:   {:?}", diff.actual)?;
        }
        Ok(())
    }
}
