//! Display sinks that receive presented frames.

use std::io::{self, Write};

use crate::color::Rgb;
use crate::format::{IndexedFrame, Palette};

/// Receives one `(palette, frame)` pair per present.
///
/// A present is atomic from the scheduler's point of view: the pair always
/// belongs to the same frame and is only borrowed for the call.
pub trait DisplaySink {
    fn present(&mut self, palette: &Palette, frame: &IndexedFrame) -> io::Result<()>;
}

/// Keeps every presented pair, for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    presents: Vec<(Palette, IndexedFrame)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presents(&self) -> &[(Palette, IndexedFrame)] {
        &self.presents
    }

    pub fn last(&self) -> Option<&(Palette, IndexedFrame)> {
        self.presents.last()
    }

    pub fn len(&self) -> usize {
        self.presents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presents.is_empty()
    }
}

impl DisplaySink for RecordingSink {
    fn present(&mut self, palette: &Palette, frame: &IndexedFrame) -> io::Result<()> {
        self.presents.push((palette.clone(), frame.clone()));
        Ok(())
    }
}

/// Renders frames to an ANSI true-color terminal, two pixel rows per line.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn present(&mut self, palette: &Palette, frame: &IndexedFrame) -> io::Result<()> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let color = |x, y| frame.color_at(x, y, palette).unwrap_or(Rgb::BLACK);

        // Cursor home so each present overwrites the previous one.
        write!(self.out, "\x1b[H")?;
        for row in (0..height).step_by(2) {
            for x in 0..width {
                let top = color(x, row);
                let bottom = if row + 1 < height {
                    color(x, row + 1)
                } else {
                    Rgb::BLACK
                };
                write!(
                    self.out,
                    "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m\u{2580}",
                    top.r, top.g, top.b, bottom.r, bottom.g, bottom.b
                )?;
            }
            writeln!(self.out, "\x1b[0m")?;
        }
        self.out.flush()
    }
}
