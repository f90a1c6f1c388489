//! Output sinks for rendered diagnostics.

use crate::diff::model::Diagnostic;
use crate::errors::CheckError;
use serde::Serialize;
use std::io::Write;

/// Destination for rendered diagnostics
pub trait DiagnosticSink {
    /// Write one diagnostic that survived filtering.
    ///
    /// # Errors
    ///
    /// `ERR_IO` when the underlying writer fails.
    fn emit(&mut self, diagnostic: &Diagnostic) -> Result<(), CheckError>;

    /// Write one diagnostic matched by the known-issue filter.
    ///
    /// Sinks drop these unless configured otherwise.
    ///
    /// # Errors
    ///
    /// `ERR_IO` when the underlying writer fails.
    fn emit_suppressed(&mut self, _diagnostic: &Diagnostic) -> Result<(), CheckError> {
        Ok(())
    }

    /// Flush buffered output.
    ///
    /// # Errors
    ///
    /// `ERR_IO` when the underlying writer fails.
    fn finish(&mut self) -> Result<(), CheckError> {
        Ok(())
    }
}

/// One `"<SEVERITY>: <context>: <message>"` line per diagnostic
pub struct TextSink<W: Write> {
    out: W,
    suppressed: Option<Box<dyn Write>>,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            suppressed: None,
        }
    }

    /// Also render suppressed diagnostics, prefixed `SUPPRESSED `, to `out`
    pub fn with_suppressed_output(mut self, out: Box<dyn Write>) -> Self {
        self.suppressed = Some(out);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DiagnosticSink for TextSink<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) -> Result<(), CheckError> {
        writeln!(self.out, "{}", diagnostic)?;
        Ok(())
    }

    fn emit_suppressed(&mut self, diagnostic: &Diagnostic) -> Result<(), CheckError> {
        if let Some(out) = self.suppressed.as_mut() {
            writeln!(out, "SUPPRESSED {}", diagnostic)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CheckError> {
        self.out.flush()?;
        if let Some(out) = self.suppressed.as_mut() {
            out.flush()?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
    context: String,
    suppressed: bool,
}

/// One JSON object per line
pub struct JsonLinesSink<W: Write> {
    out: W,
    include_suppressed: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            include_suppressed: false,
        }
    }

    /// Write suppressed diagnostics too, marked `"suppressed": true`
    pub fn include_suppressed(mut self, include: bool) -> Self {
        self.include_suppressed = include;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, diagnostic: &Diagnostic, suppressed: bool) -> Result<(), CheckError> {
        let line = JsonLine {
            diagnostic,
            context: diagnostic.context(),
            suppressed,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> DiagnosticSink for JsonLinesSink<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) -> Result<(), CheckError> {
        self.write_line(diagnostic, false)
    }

    fn emit_suppressed(&mut self, diagnostic: &Diagnostic) -> Result<(), CheckError> {
        if self.include_suppressed {
            self.write_line(diagnostic, true)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CheckError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct CollectSink {
    pub emitted: Vec<Diagnostic>,
    pub suppressed: Vec<Diagnostic>,
}

impl DiagnosticSink for CollectSink {
    fn emit(&mut self, diagnostic: &Diagnostic) -> Result<(), CheckError> {
        self.emitted.push(diagnostic.clone());
        Ok(())
    }

    fn emit_suppressed(&mut self, diagnostic: &Diagnostic) -> Result<(), CheckError> {
        self.suppressed.push(diagnostic.clone());
        Ok(())
    }
}
