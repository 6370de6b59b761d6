use std::io::{self, Write};

/// Where cycle outcomes land.
///
/// Each call replaces whatever the surface showed before; the overlay keeps
/// no history.
pub trait Overlay {
    /// Show transformed text.
    fn render(&mut self, text: &str);

    /// Show a categorized error string. The caller composes the category
    /// prefix; the overlay only displays.
    fn render_error(&mut self, message: &str);
}

/// Presentation settings for rendered text.
///
/// Purely cosmetic: typography never feeds back into capture or processing.
#[derive(Clone, Debug, PartialEq)]
pub struct Typography {
    letter_spacing: usize,
    line_height: usize,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            letter_spacing: 0,
            line_height: 1,
        }
    }
}

impl Typography {
    /// Set the number of spaces inserted between glyphs.
    pub fn with_letter_spacing(mut self, letter_spacing: usize) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    /// Set the number of line breaks between text lines (minimum 1).
    pub fn with_line_height(mut self, line_height: usize) -> Self {
        self.line_height = line_height.max(1);
        self
    }

    pub fn letter_spacing(&self) -> usize {
        self.letter_spacing
    }

    pub fn line_height(&self) -> usize {
        self.line_height
    }

    /// Apply spacing and line height to a text block.
    pub fn apply(&self, text: &str) -> String {
        let gap = " ".repeat(self.letter_spacing);
        let line_break = "\n".repeat(self.line_height);

        let lines: Vec<String> = text
            .lines()
            .map(|line| {
                if self.letter_spacing == 0 {
                    line.to_string()
                } else {
                    line.chars()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(&gap)
                }
            })
            .collect();

        lines.join(&line_break)
    }
}

/// Terminal stand-in for an overlay surface.
///
/// Text goes through the typography settings; error strings are printed
/// verbatim so their category prefix stays greppable.
pub struct ConsoleOverlay<W> {
    out: W,
    typography: Typography,
}

impl ConsoleOverlay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleOverlay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            typography: Typography::default(),
        }
    }

    pub fn with_typography(mut self, typography: Typography) -> Self {
        self.typography = typography;
        self
    }

    /// Swap typography settings while the session runs.
    pub fn set_typography(&mut self, typography: Typography) {
        self.typography = typography;
    }

    pub fn typography(&self) -> &Typography {
        &self.typography
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Overlay for ConsoleOverlay<W> {
    fn render(&mut self, text: &str) {
        let styled = self.typography.apply(text);
        if let Err(err) = writeln!(self.out, "{styled}") {
            log::warn!("overlay write failed: {err}");
        }
    }

    fn render_error(&mut self, message: &str) {
        if let Err(err) = writeln!(self.out, "{message}") {
            log::warn!("overlay write failed: {err}");
        }
    }
}
