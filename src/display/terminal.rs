//! Line-oriented terminal rendering with crossterm styling

use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use crossterm::tty::IsTty;
use tracing::{trace, warn};

use super::markup::{Palette, Segment, StyledText};
use super::DisplaySurface;

const PENDING_TEXT: &str = "thinking...";
const PROMPT: &str = "> ";
const BANNER_WIDTH: usize = 40;

/// Renders the session to a terminal (or any writer)
pub struct TerminalDisplay<W: Write> {
    out: W,
    /// Emit ANSI styling; off when the output is not a terminal
    styled: bool,
    angry: bool,
    input_enabled: bool,
}

impl TerminalDisplay<io::Stdout> {
    /// Display on standard output, styled only when it is a terminal
    pub fn stdout() -> Self {
        let out = io::stdout();
        let styled = out.is_tty();
        Self::new(out, styled)
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, styled: bool) -> Self {
        Self {
            out,
            styled,
            angry: false,
            input_enabled: true,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, what: &str, render: impl FnOnce(&mut W, Style) -> io::Result<()>) {
        let style = Style {
            styled: self.styled,
            angry: self.angry,
        };
        let result = render(&mut self.out, style).and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!(?e, what, "terminal write failed");
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Style {
    styled: bool,
    angry: bool,
}

fn palette_color(color: Palette) -> Color {
    match color {
        Palette::Red => Color::Red,
        Palette::Green => Color::Green,
        Palette::Blue => Color::Blue,
        Palette::Yellow => Color::Yellow,
    }
}

fn write_segment<W: Write>(out: &mut W, segment: &Segment, style: Style) -> io::Result<()> {
    match segment {
        Segment::Plain(plain) | Segment::Highlight { text: plain, .. } if !style.styled => {
            write!(out, "{plain}")
        }
        Segment::Plain(plain) if style.angry => write!(out, "{}", plain.as_str().red().bold()),
        Segment::Plain(plain) => write!(out, "{plain}"),
        Segment::Highlight { text, color } => {
            write!(out, "{}", text.as_str().with(palette_color(*color)).bold())
        }
    }
}

impl<W: Write> DisplaySurface for TerminalDisplay<W> {
    fn show_pending(&mut self) {
        self.emit("pending", |out, style| {
            if style.styled {
                writeln!(out, "{}", PENDING_TEXT.dim())
            } else {
                writeln!(out, "{PENDING_TEXT}")
            }
        });
    }

    fn show_text(&mut self, text: &StyledText) {
        self.emit("text", |out, style| {
            for segment in text.segments() {
                write_segment(out, segment, style)?;
            }
            writeln!(out)
        });
    }

    fn set_angry_mode(&mut self, on: bool) {
        if on == self.angry {
            return;
        }
        self.angry = on;
        if on {
            self.emit("angry mode", |out, style| {
                if style.styled {
                    writeln!(out, "{}", " ".repeat(BANNER_WIDTH).on(Color::DarkRed))
                } else {
                    writeln!(out, "{}", "!".repeat(BANNER_WIDTH))
                }
            });
        }
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn clear_input(&mut self) {
        // Line input is consumed by the reader; nothing to erase
        trace!("input cleared");
    }

    fn focus_input(&mut self) {
        if self.input_enabled {
            self.emit("prompt", |out, _| write!(out, "{PROMPT}"));
        }
    }
}
