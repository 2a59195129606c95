//! Color-aware diagnostic formatter
//!
//! Renders the long human form (header, location, snippet with carets,
//! notes) with optional terminal colors. Respects NO_COLOR.

use crate::diagnostic::{Diagnostic, DiagnosticLevel};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Color mode for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Always,
    Never,
    /// Color only when stderr is a terminal
    Auto,
}

impl ColorMode {
    /// Resolve to a termcolor ColorChoice
    pub fn to_color_choice(self) -> ColorChoice {
        // https://no-color.org
        if std::env::var_os("NO_COLOR").is_some() {
            return ColorChoice::Never;
        }
        match self {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto => ColorChoice::Auto,
        }
    }
}

/// Diagnostic formatter with color support
pub struct DiagnosticFormatter {
    color_mode: ColorMode,
}

impl DiagnosticFormatter {
    pub fn new(color_mode: ColorMode) -> Self {
        Self { color_mode }
    }

    pub fn auto() -> Self {
        Self::new(ColorMode::Auto)
    }

    /// A formatter that never emits escape codes
    pub fn plain() -> Self {
        Self::new(ColorMode::Never)
    }

    /// Write a diagnostic to stderr
    ///
    /// A failed write is logged; there is nowhere else to report it.
    pub fn emit(&self, diag: &Diagnostic) {
        let mut stream = StandardStream::stderr(self.color_mode.to_color_choice());
        if let Err(e) = self.write_diagnostic(&mut stream, diag) {
            tracing::warn!(error = %e, code = %diag.code, "failed to write diagnostic");
        }
    }

    /// Write a diagnostic to any color-capable sink
    pub fn write_diagnostic(
        &self,
        w: &mut impl WriteColor,
        diag: &Diagnostic,
    ) -> std::io::Result<()> {
        self.write_header(w, diag)?;
        self.write_location(w, diag)?;

        if !diag.snippet.is_empty() {
            self.write_snippet(w, diag)?;
        }

        for note in &diag.notes {
            self.write_trailer(w, "note", Color::Cyan, note)?;
        }
        if let Some(help) = &diag.help {
            self.write_trailer(w, "help", Color::Green, help)?;
        }

        writeln!(w)?;
        Ok(())
    }

    /// Render without colors into a buffer
    pub fn format_to_buffer(&self, diag: &Diagnostic) -> std::io::Result<Vec<u8>> {
        let mut buf = termcolor::Buffer::no_color();
        self.write_diagnostic(&mut buf, diag)?;
        Ok(buf.into_inner())
    }

    fn level_color(level: DiagnosticLevel) -> Color {
        match level {
            DiagnosticLevel::Error => Color::Red,
        }
    }

    fn write_header(&self, w: &mut impl WriteColor, diag: &Diagnostic) -> std::io::Result<()> {
        w.set_color(
            ColorSpec::new()
                .set_fg(Some(Self::level_color(diag.level)))
                .set_bold(true),
        )?;
        write!(w, "{}[{}]", diag.level, diag.code)?;
        w.reset()?;

        w.set_color(ColorSpec::new().set_bold(true))?;
        write!(w, ": {}", diag.message)?;
        w.reset()?;
        writeln!(w)?;
        Ok(())
    }

    fn write_location(&self, w: &mut impl WriteColor, diag: &Diagnostic) -> std::io::Result<()> {
        w.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        write!(w, "  --> ")?;
        w.reset()?;
        writeln!(w, "{}:{}:{}", diag.file, diag.line, diag.column)?;
        Ok(())
    }

    fn write_snippet(&self, w: &mut impl WriteColor, diag: &Diagnostic) -> std::io::Result<()> {
        let gutter_width = diag.line.to_string().len() + 1;
        let gutter = ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true).clone();

        w.set_color(&gutter)?;
        write!(w, "{:>width$}|", "", width = gutter_width)?;
        w.reset()?;
        writeln!(w)?;

        w.set_color(&gutter)?;
        write!(w, "{:>width$}| ", diag.line, width = gutter_width)?;
        w.reset()?;
        writeln!(w, "{}", diag.snippet)?;

        if diag.length == 0 {
            return Ok(());
        }

        w.set_color(&gutter)?;
        write!(w, "{:>width$}| ", "", width = gutter_width)?;
        w.reset()?;

        let col = diag.column.saturating_sub(1);
        let width = diag.snippet.chars().count();
        write!(w, "{}", " ".repeat(col.min(width)))?;

        let caret_len = diag.length.min(width.saturating_sub(col).max(1));
        w.set_color(
            ColorSpec::new()
                .set_fg(Some(Self::level_color(diag.level)))
                .set_bold(true),
        )?;
        write!(w, "{}", "^".repeat(caret_len))?;
        if !diag.label.is_empty() {
            write!(w, " {}", diag.label)?;
        }
        w.reset()?;
        writeln!(w)?;
        Ok(())
    }

    fn write_trailer(
        &self,
        w: &mut impl WriteColor,
        kind: &str,
        color: Color,
        text: &str,
    ) -> std::io::Result<()> {
        w.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        write!(w, "   = ")?;
        w.reset()?;

        w.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(w, "{}", kind)?;
        w.reset()?;

        writeln!(w, ": {}", text)?;
        Ok(())
    }
}

impl Default for DiagnosticFormatter {
    fn default() -> Self {
        Self::auto()
    }
}
