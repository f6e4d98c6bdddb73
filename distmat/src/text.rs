//! Human-readable rendering of a distance matrix
//!
//! Renders the full symmetric N×N view, diagonal included, as tab-separated
//! values with one row per line. This is for inspection only; the binary
//! format in [`crate::io`] is the round-trip format.

use crate::config::TextOptions;
use crate::error::{Error, Result};
use crate::matrix::DistanceMatrix;
use distmat_core::DistanceElement;
use std::fmt::{self, Write as _};
use std::io::{self, Write};

/// First cell of the label header row
pub const NAMES_HEADER: &str = "#Names";

impl<T: DistanceElement> DistanceMatrix<T> {
    fn check_labels<S: AsRef<str>>(&self, labels: Option<&[S]>) -> Result<()> {
        match labels {
            Some(labels) if labels.len() != self.size() => Err(Error::LabelCountMismatch {
                expected: self.size(),
                found: labels.len(),
            }),
            _ => Ok(()),
        }
    }

    fn render_header<S: AsRef<str>>(labels: &[S], line: &mut String) -> fmt::Result {
        line.push_str(NAMES_HEADER);
        for label in labels {
            write!(line, "\t{}", label.as_ref())?;
        }
        line.push('\n');
        Ok(())
    }

    fn render_row(
        &self,
        row: usize,
        scientific: bool,
        label: Option<&str>,
        line: &mut String,
    ) -> fmt::Result {
        if let Some(label) = label {
            line.push_str(label);
            line.push('\t');
        }
        for col in 0..self.size() {
            if col > 0 {
                line.push('\t');
            }
            let value = self.get(row, col);
            if scientific {
                write!(line, "{value:e}")?;
            } else {
                write!(line, "{value}")?;
            }
        }
        line.push('\n');
        Ok(())
    }

    fn render<S: AsRef<str>>(
        &self,
        scientific: bool,
        labels: Option<&[S]>,
        mut emit: impl FnMut(&str) -> Result<()>,
    ) -> Result<()> {
        self.check_labels(labels)?;

        let mut line = String::new();
        if let Some(labels) = labels {
            Self::render_header(labels, &mut line).map_err(fmt_error)?;
            emit(&line)?;
        }
        for row in 0..self.size() {
            line.clear();
            let label = labels.map(|l| l[row].as_ref());
            self.render_row(row, scientific, label, &mut line)
                .map_err(fmt_error)?;
            emit(&line)?;
        }
        Ok(())
    }

    /// Stream the text rendering to `writer`
    pub fn write_text<W: Write>(&self, writer: W, options: &TextOptions) -> Result<()> {
        let mut writer = io::BufWriter::new(writer);
        self.render(options.scientific, options.labels.as_deref(), |line| {
            writer.write_all(line.as_bytes())?;
            Ok(())
        })?;
        writer.flush()?;
        Ok(())
    }

    /// Render to a string, optionally in scientific notation and with labels
    pub fn to_text<S: AsRef<str>>(&self, scientific: bool, labels: Option<&[S]>) -> Result<String> {
        let mut text = String::new();
        self.render(scientific, labels, |line| {
            text.push_str(line);
            Ok(())
        })?;
        Ok(text)
    }

    /// Render to a string without labels
    pub fn to_text_plain(&self, scientific: bool) -> Result<String> {
        self.to_text::<&str>(scientific, None)
    }
}

fn fmt_error(_: fmt::Error) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::Other, "formatting failed"))
}

impl<T: DistanceElement> fmt::Display for DistanceMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = String::new();
        for row in 0..self.size() {
            line.clear();
            self.render_row(row, false, None, &mut line)?;
            f.write_str(&line)?;
        }
        Ok(())
    }
}
