//! Text assertions over captured frames.
//!
//! Chainable, with an optional soft mode that collects failures and reports
//! them together from [`FrameAssertion::finalize`].

use crate::frame::Frame;
use crate::result::{HarnessError, HarnessResult};

/// Frame assertion builder
#[derive(Debug)]
pub struct FrameAssertion<'a> {
    frame: &'a Frame,
    soft_mode: bool,
    errors: Vec<String>,
}

impl<'a> FrameAssertion<'a> {
    /// Create a new frame assertion
    #[must_use]
    pub fn new(frame: &'a Frame) -> Self {
        Self {
            frame,
            soft_mode: false,
            errors: Vec::new(),
        }
    }

    /// Collect failures instead of returning on the first one
    #[must_use]
    pub fn soft(mut self) -> Self {
        self.soft_mode = true;
        self
    }

    fn check(&mut self, passed: bool, message: impl FnOnce() -> String) -> HarnessResult<&mut Self> {
        if passed {
            return Ok(self);
        }
        let message = message();
        if self.soft_mode {
            self.errors.push(message);
            Ok(self)
        } else {
            Err(HarnessError::AssertionFailed { message })
        }
    }

    /// Frame contains `text` somewhere
    pub fn to_contain_text(&mut self, text: &str) -> HarnessResult<&mut Self> {
        let frame = self.frame;
        self.check(frame.contains(text), || {
            format!(
                "Expected frame to contain text '{text}'\nFrame content:\n{}",
                frame.as_text()
            )
        })
    }

    /// Frame does not contain `text`
    pub fn not_to_contain_text(&mut self, text: &str) -> HarnessResult<&mut Self> {
        let frame = self.frame;
        self.check(!frame.contains(text), || {
            format!(
                "Expected frame NOT to contain text '{text}'\nFrame content:\n{}",
                frame.as_text()
            )
        })
    }

    /// Some row matches the regex
    pub fn to_match(&mut self, pattern: &str) -> HarnessResult<&mut Self> {
        let frame = self.frame;
        let matched = frame.matches(pattern)?;
        self.check(matched, || {
            format!(
                "Expected frame to match pattern '{pattern}'\nFrame content:\n{}",
                frame.as_text()
            )
        })
    }

    /// Row `line_num` contains `text`
    pub fn line_to_contain(&mut self, line_num: usize, text: &str) -> HarnessResult<&mut Self> {
        let frame = self.frame;
        match frame.line(line_num) {
            Some(content) => self.check(content.contains(text), || {
                format!("Expected line {line_num} to contain '{text}'\nActual: '{content}'")
            }),
            None => self.check(false, || missing_line(frame, line_num)),
        }
    }

    /// Row `line_num` equals `expected` exactly
    pub fn line_to_equal(&mut self, line_num: usize, expected: &str) -> HarnessResult<&mut Self> {
        let frame = self.frame;
        match frame.line(line_num) {
            Some(content) => self.check(content == expected, || {
                format!("Expected line {line_num} to equal '{expected}'\nActual: '{content}'")
            }),
            None => self.check(false, || missing_line(frame, line_num)),
        }
    }

    /// Frame has the given dimensions
    pub fn to_have_size(&mut self, width: u16, height: u16) -> HarnessResult<&mut Self> {
        let (actual_width, actual_height) = (self.frame.width(), self.frame.height());
        self.check(actual_width == width && actual_height == height, || {
            format!("Expected frame size {width}x{height}, got {actual_width}x{actual_height}")
        })
    }

    /// Same text as `other`
    pub fn to_be_identical_to(&mut self, other: &Frame) -> HarnessResult<&mut Self> {
        let frame = self.frame;
        self.check(frame.is_identical(other), || {
            format!("Frames are not identical:\n{}", frame.diff(other))
        })
    }

    /// Report everything collected in soft mode
    pub fn finalize(&self) -> HarnessResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::AssertionFailed {
                message: format!(
                    "{} assertion(s) failed:\n{}",
                    self.errors.len(),
                    self.errors.join("\n\n")
                ),
            })
        }
    }

    /// Failures collected in soft mode
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

fn missing_line(frame: &Frame, line_num: usize) -> String {
    format!(
        "Line {line_num} does not exist (frame has {} lines)",
        frame.height()
    )
}

/// Start an assertion chain on a frame
#[must_use]
pub fn expect_frame(frame: &Frame) -> FrameAssertion<'_> {
    FrameAssertion::new(frame)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_contain_text() {
        let frame = Frame::from_lines(&["Hello World", "Goodbye"]);
        assert!(expect_frame(&frame).to_contain_text("World").is_ok());
        assert!(expect_frame(&frame).to_contain_text("Missing").is_err());
        assert!(expect_frame(&frame).not_to_contain_text("Missing").is_ok());
        assert!(expect_frame(&frame).not_to_contain_text("World").is_err());
    }

    #[test]
    fn test_to_match() {
        let frame = Frame::from_lines(&["Score: 100"]);
        assert!(expect_frame(&frame).to_match(r"Score: \d+").is_ok());
        assert!(expect_frame(&frame).to_match(r"Lives: \d+").is_err());
    }

    #[test]
    fn test_line_assertions() {
        let frame = Frame::from_lines(&["First", "Second"]);
        assert!(expect_frame(&frame).line_to_contain(1, "Sec").is_ok());
        assert!(expect_frame(&frame).line_to_contain(0, "Second").is_err());
        assert!(expect_frame(&frame).line_to_equal(0, "First").is_ok());

        let err = expect_frame(&frame).line_to_equal(5, "x").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_to_have_size() {
        let frame = Frame::from_lines(&["12345", "12345"]);
        assert!(expect_frame(&frame).to_have_size(5, 2).is_ok());
        assert!(expect_frame(&frame).to_have_size(10, 10).is_err());
    }

    #[test]
    fn test_to_be_identical_to() {
        let a = Frame::from_lines(&["Same"]);
        let b = Frame::from_lines(&["Same"]);
        let c = Frame::from_lines(&["Other"]);
        assert!(expect_frame(&a).to_be_identical_to(&b).is_ok());
        assert!(expect_frame(&a).to_be_identical_to(&c).is_err());
    }

    #[test]
    fn test_soft_mode_collects() {
        let frame = Frame::from_lines(&["Hello"]);
        let mut assertion = expect_frame(&frame).soft();
        let _ = assertion.to_contain_text("Missing1");
        let _ = assertion.line_to_equal(3, "nope");
        assert_eq!(assertion.errors().len(), 2);
        let err = assertion.finalize().unwrap_err();
        assert!(err.to_string().contains("2 assertion(s) failed"));
    }

    #[test]
    fn test_chained() {
        let frame = Frame::from_lines(&["Score: 100", "Lives: 3"]);
        let mut assertion = expect_frame(&frame);
        assert!(assertion
            .to_contain_text("Score")
            .and_then(|a| a.to_contain_text("Lives"))
            .and_then(|a| a.to_match(r"\d+"))
            .is_ok());
    }
}
