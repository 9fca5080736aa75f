//! Snapshot baselines.
//!
//! Two independent artifacts can be taken from a buffer:
//!
//! - [`TextSnapshot`]: rows of plain glyphs, compared byte for byte.
//! - [`RichSnapshot`]: rows of [`StyledRun`]s, compared structurally.
//!
//! Baselines live at `<root>/<test>/<name>.snap.yaml` (plain) and
//! `<root>/<test>/<name>.rich.yaml` (rich), with `<test>` and `<name>`
//! escaped so that any two distinct names get distinct files. The first
//! assertion for a given (test, name) writes the baseline and passes.

use crate::buffer::Buffer;
use crate::result::{HarnessError, HarnessResult};
use crate::style::{Color, Modifier, Style};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Behaviour shared by both baseline kinds.
pub trait Baseline: Serialize + DeserializeOwned {
    /// File suffix, including the extension
    const SUFFIX: &'static str;

    /// Snapshot name
    fn name(&self) -> &str;

    /// Content hash
    fn hash(&self) -> &str;

    /// Describe the first difference from `expected`, or `None` if equal
    fn first_difference(&self, expected: &Self) -> Option<String>;
}

/// Plain-text snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSnapshot {
    /// Snapshot name
    pub name: String,
    /// Content hash
    pub hash: String,
    /// Buffer width
    pub width: u16,
    /// Buffer height
    pub height: u16,
    /// Rows of glyphs, wide glyph continuations omitted
    pub rows: Vec<String>,
}

impl TextSnapshot {
    /// Capture a buffer
    #[must_use]
    pub fn from_buffer(name: &str, buffer: &Buffer) -> Self {
        Self::from_rows(name, buffer.width(), buffer.height(), buffer.to_lines())
    }

    /// Build from rows
    #[must_use]
    pub fn from_rows(name: &str, width: u16, height: u16, rows: Vec<String>) -> Self {
        let mut hasher = Sha256::new();
        for row in &rows {
            hasher.update(row.as_bytes());
            hasher.update(b"\n");
        }
        Self {
            name: name.to_string(),
            hash: format!("{:x}", hasher.finalize()),
            width,
            height,
            rows,
        }
    }

    /// Rows joined by newlines
    #[must_use]
    pub fn as_text(&self) -> String {
        self.rows.join("\n")
    }
}

impl Baseline for TextSnapshot {
    const SUFFIX: &'static str = ".snap.yaml";

    fn name(&self) -> &str {
        &self.name
    }

    fn hash(&self) -> &str {
        &self.hash
    }

    fn first_difference(&self, expected: &Self) -> Option<String> {
        if self.hash == expected.hash && self.rows == expected.rows {
            return None;
        }
        let max_rows = self.rows.len().max(expected.rows.len());
        for i in 0..max_rows {
            let want = expected.rows.get(i);
            let got = self.rows.get(i);
            if want != got {
                return Some(format!(
                    "first mismatch at row {i}\n  expected: {}\n  actual:   {}",
                    describe_row(want),
                    describe_row(got)
                ));
            }
        }
        Some(format!(
            "size changed: expected {}x{}, actual {}x{}",
            expected.width, expected.height, self.width, self.height
        ))
    }
}

fn describe_row(row: Option<&String>) -> String {
    row.map_or_else(|| "<missing row>".to_string(), |r| format!("{r:?}"))
}

/// Contiguous cells in one row sharing a style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    /// Concatenated glyphs
    pub text: String,
    /// Foreground
    pub fg: Color,
    /// Background
    pub bg: Color,
    /// Modifiers
    #[serde(default)]
    pub modifiers: Modifier,
}

impl StyledRun {
    /// The run's style
    #[must_use]
    pub const fn style(&self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
            modifiers: self.modifiers,
        }
    }
}

impl fmt::Display for StyledRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} fg={} bg={} modifiers={}",
            self.text, self.fg, self.bg, self.modifiers
        )
    }
}

/// Split one buffer row into maximal runs of identical style.
#[must_use]
pub fn styled_runs(buffer: &Buffer, y: u16) -> Vec<StyledRun> {
    let mut runs: Vec<StyledRun> = Vec::new();
    let Some(row) = buffer.row(y) else {
        return runs;
    };
    for cell in row.iter().filter(|c| !c.is_continuation()) {
        match runs.last_mut() {
            Some(run) if run.style() == cell.style() => run.text.push_str(cell.symbol()),
            _ => runs.push(StyledRun {
                text: cell.symbol().to_string(),
                fg: cell.fg,
                bg: cell.bg,
                modifiers: cell.modifiers,
            }),
        }
    }
    runs
}

/// Style-annotated snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichSnapshot {
    /// Snapshot name
    pub name: String,
    /// Content hash
    pub hash: String,
    /// Buffer width
    pub width: u16,
    /// Buffer height
    pub height: u16,
    /// Styled runs, one list per row
    pub rows: Vec<Vec<StyledRun>>,
}

impl RichSnapshot {
    /// Capture a buffer
    #[must_use]
    pub fn from_buffer(name: &str, buffer: &Buffer) -> Self {
        let rows: Vec<Vec<StyledRun>> = (0..buffer.height())
            .map(|y| styled_runs(buffer, y))
            .collect();
        Self::from_rows(name, buffer.width(), buffer.height(), rows)
    }

    /// Build from styled rows
    #[must_use]
    pub fn from_rows(name: &str, width: u16, height: u16, rows: Vec<Vec<StyledRun>>) -> Self {
        let mut hasher = Sha256::new();
        for row in &rows {
            for run in row {
                hasher.update(run.text.as_bytes());
                hasher.update([0x1f]);
                hasher.update(run.fg.to_string().as_bytes());
                hasher.update([0x1f]);
                hasher.update(run.bg.to_string().as_bytes());
                hasher.update([0x1f]);
                hasher.update(run.modifiers.bits().to_le_bytes());
                hasher.update([0x1e]);
            }
            hasher.update(b"\n");
        }
        Self {
            name: name.to_string(),
            hash: format!("{:x}", hasher.finalize()),
            width,
            height,
            rows,
        }
    }

    /// Plain-text projection of this snapshot
    #[must_use]
    pub fn to_text(&self) -> TextSnapshot {
        let rows = self
            .rows
            .iter()
            .map(|runs| runs.iter().map(|r| r.text.as_str()).collect())
            .collect();
        TextSnapshot::from_rows(&self.name, self.width, self.height, rows)
    }
}

impl Baseline for RichSnapshot {
    const SUFFIX: &'static str = ".rich.yaml";

    fn name(&self) -> &str {
        &self.name
    }

    fn hash(&self) -> &str {
        &self.hash
    }

    fn first_difference(&self, expected: &Self) -> Option<String> {
        if self.hash == expected.hash && self.rows == expected.rows {
            return None;
        }
        let empty = Vec::new();
        let max_rows = self.rows.len().max(expected.rows.len());
        for row in 0..max_rows {
            let want = expected.rows.get(row).unwrap_or(&empty);
            let got = self.rows.get(row).unwrap_or(&empty);
            if want == got {
                continue;
            }
            let max_runs = want.len().max(got.len());
            for run in 0..max_runs {
                let (w, g) = (want.get(run), got.get(run));
                if w != g {
                    return Some(format!(
                        "first mismatch at row {row}, run {run}\n  expected: {}\n  actual:   {}",
                        describe_run(w),
                        describe_run(g)
                    ));
                }
            }
        }
        Some(format!(
            "size changed: expected {}x{}, actual {}x{}",
            expected.width, expected.height, self.width, self.height
        ))
    }
}

fn describe_run(run: Option<&StyledRun>) -> String {
    run.map_or_else(|| "<missing run>".to_string(), ToString::to_string)
}

/// Result of a snapshot assertion that passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// No baseline existed; one was written
    Created,
    /// Baseline matched
    Matched,
    /// Baseline differed and was rewritten (update mode)
    Updated,
}

/// Reads and writes baselines under a root directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
    update_mode: bool,
}

impl SnapshotStore {
    /// Store rooted at `root`
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            update_mode: false,
        }
    }

    /// Rewrite mismatching baselines instead of failing
    #[must_use]
    pub fn with_update_mode(mut self, update: bool) -> Self {
        self.update_mode = update;
        self
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one test's baselines
    #[must_use]
    pub fn test_dir(&self, test: &str) -> PathBuf {
        self.root.join(sanitize(test))
    }

    /// Path of a baseline
    #[must_use]
    pub fn path_for<B: Baseline>(&self, test: &str, name: &str) -> PathBuf {
        self.test_dir(test)
            .join(format!("{}{}", sanitize(name), B::SUFFIX))
    }

    /// Whether a baseline exists
    #[must_use]
    pub fn exists<B: Baseline>(&self, test: &str, name: &str) -> bool {
        self.path_for::<B>(test, name).exists()
    }

    /// Write a baseline
    pub fn save<B: Baseline>(&self, test: &str, snapshot: &B) -> HarnessResult<()> {
        let path = self.path_for::<B>(test, snapshot.name());
        let yaml = serde_yaml_ng::to_string(snapshot).map_err(|e| {
            HarnessError::SnapshotSerialization {
                message: format!("Failed to serialize snapshot: {e}"),
            }
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, yaml)?;
        Ok(())
    }

    /// Read a baseline
    pub fn load<B: Baseline>(&self, test: &str, name: &str) -> HarnessResult<B> {
        let yaml = fs::read_to_string(self.path_for::<B>(test, name))?;
        serde_yaml_ng::from_str(&yaml).map_err(|e| HarnessError::SnapshotSerialization {
            message: format!("Failed to deserialize snapshot: {e}"),
        })
    }

    /// Compare against the stored baseline, creating it on first use
    pub fn assert_matches<B: Baseline>(&self, test: &str, actual: &B) -> HarnessResult<SnapshotOutcome> {
        let name = actual.name();
        if !self.exists::<B>(test, name) {
            self.save(test, actual)?;
            debug!(test, name, hash = actual.hash(), "snapshot baseline created");
            return Ok(SnapshotOutcome::Created);
        }

        let expected: B = self.load(test, name)?;
        match actual.first_difference(&expected) {
            None => Ok(SnapshotOutcome::Matched),
            Some(_) if self.update_mode => {
                self.save(test, actual)?;
                debug!(test, name, hash = actual.hash(), "snapshot baseline updated");
                Ok(SnapshotOutcome::Updated)
            }
            Some(detail) => Err(HarnessError::SnapshotMismatch {
                name: format!("{test}/{name}"),
                detail,
            }),
        }
    }

    /// Plain snapshot assertion
    pub fn assert_text(&self, test: &str, name: &str, buffer: &Buffer) -> HarnessResult<SnapshotOutcome> {
        self.assert_matches(test, &TextSnapshot::from_buffer(name, buffer))
    }

    /// Rich snapshot assertion
    pub fn assert_rich(&self, test: &str, name: &str, buffer: &Buffer) -> HarnessResult<SnapshotOutcome> {
        self.assert_matches(test, &RichSnapshot::from_buffer(name, buffer))
    }

    /// Names of one test's baselines of kind `B`, sorted
    pub fn list<B: Baseline>(&self, test: &str) -> HarnessResult<Vec<String>> {
        let dir = self.test_dir(test);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let file_name = entry?.file_name();
            if let Some(name) = file_name
                .to_str()
                .and_then(|f| f.strip_suffix(B::SUFFIX))
                .and_then(unsanitize)
            {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a baseline if present
    pub fn delete<B: Baseline>(&self, test: &str, name: &str) -> HarnessResult<()> {
        let path = self.path_for::<B>(test, name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Path::new(crate::config::DEFAULT_SNAPSHOT_DIR))
    }
}

/// Make a test or snapshot name safe as a single path component.
///
/// ASCII letters, digits, `_` and `-` pass through; every other byte becomes
/// `%XX`. Distinct names always map to distinct components. The empty name
/// is spelled `%`, which no non-empty name produces.
fn sanitize(name: &str) -> String {
    if name.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Inverse of [`sanitize`]; `None` for components it never produces.
fn unsanitize(component: &str) -> Option<String> {
    if component == "%" {
        return Some(String::new());
    }
    let bytes = component.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = component.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
