//! Trace output with display/capture fan-out and column tracking

use std::fmt;
use std::io::{self, Write};

use crate::config::TraceFlags;
use crate::constants::{MARGIN, WRAP_MARGIN};

/// Destination for rendered trace text.
///
/// Every chunk goes to the capture sink (if one is attached) and, unless
/// quiet, to the display. The column counter follows the text written so
/// far on the current line.
pub struct TraceOutput<W: Write> {
    display: W,
    capture: Option<Box<dyn Write>>,
    quiet: bool,
    color_to_capture: bool,
    column: usize,
}

impl<W: Write> TraceOutput<W> {
    /// Output to `display`, honouring the quiet and color-to-capture flags
    pub fn new(display: W, flags: TraceFlags) -> Self {
        Self {
            display,
            capture: None,
            quiet: flags.contains(TraceFlags::QUIET),
            color_to_capture: flags.contains(TraceFlags::COLOR_TO_CAPTURE),
            column: 0,
        }
    }

    /// Mirror all trace text into `capture`
    pub fn with_capture(mut self, capture: Box<dyn Write>) -> Self {
        self.capture = Some(capture);
        self
    }

    /// True if a capture sink is attached
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// Current column on the line being written
    pub fn column(&self) -> usize {
        self.column
    }

    /// Start a new frame: the column restarts at 0
    pub fn begin_frame(&mut self) {
        self.column = 0;
    }

    /// Write trace text to both sinks
    pub fn put(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        if let Some(capture) = self.capture.as_mut() {
            capture.write_all(text.as_bytes())?;
        }
        if !self.quiet {
            self.display.write_all(text.as_bytes())?;
        }
        self.advance(text);
        Ok(())
    }

    /// Write formatted trace text to both sinks
    pub fn emit(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        match args.as_str() {
            Some(text) => self.put(text),
            None => self.put(&args.to_string()),
        }
    }

    /// Start an indented continuation line
    pub fn margin(&mut self) -> io::Result<()> {
        self.put(MARGIN)
    }

    /// Break the line if `needed` more columns would reach `width`
    pub fn soft_wrap(&mut self, needed: usize, width: usize) -> io::Result<()> {
        if self.column + needed >= width {
            self.put(WRAP_MARGIN)?;
        }
        Ok(())
    }

    /// Write a color escape. Escapes occupy no columns.
    ///
    /// With color-to-capture the escape is routed like trace text; otherwise
    /// it goes to the display only, quiet or not.
    pub fn color(&mut self, escape: &str) -> io::Result<()> {
        if !self.color_to_capture {
            return self.display.write_all(escape.as_bytes());
        }
        if let Some(capture) = self.capture.as_mut() {
            capture.write_all(escape.as_bytes())?;
        }
        if !self.quiet {
            self.display.write_all(escape.as_bytes())?;
        }
        Ok(())
    }

    /// Write a whole diagnostic line to the display only, quiet or not
    pub fn diagnostic(&mut self, line: &str) -> io::Result<()> {
        self.display.write_all(line.as_bytes())?;
        self.display.write_all(b"\n")?;
        self.column = 0;
        Ok(())
    }

    /// Flush both sinks
    pub fn flush(&mut self) -> io::Result<()> {
        if let Some(capture) = self.capture.as_mut() {
            capture.flush()?;
        }
        self.display.flush()
    }

    /// Flush and detach the capture sink, returning it
    pub fn close_capture(&mut self) -> io::Result<Option<Box<dyn Write>>> {
        if let Some(capture) = self.capture.as_mut() {
            capture.flush()?;
        }
        Ok(self.capture.take())
    }

    /// Borrow the display sink
    pub fn display(&self) -> &W {
        &self.display
    }

    /// Consume the output and return the display sink
    pub fn into_display(self) -> W {
        self.display
    }

    fn advance(&mut self, text: &str) {
        match text.rfind('\n') {
            Some(newline) => self.column = text[newline + 1..].chars().count(),
            None => self.column += text.chars().count(),
        }
    }
}

impl<W: Write> fmt::Debug for TraceOutput<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceOutput")
            .field("capturing", &self.capture.is_some())
            .field("quiet", &self.quiet)
            .field("color_to_capture", &self.color_to_capture)
            .field("column", &self.column)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn display_text(out: TraceOutput<Vec<u8>>) -> String {
        String::from_utf8(out.into_display()).unwrap()
    }

    #[test]
    fn test_column_tracks_current_line() {
        let mut out = TraceOutput::new(Vec::new(), TraceFlags::empty());
        out.put("abc").unwrap();
        assert_eq!(out.column(), 3);
        out.emit(format_args!(" {}={}", "ttl", 7)).unwrap();
        assert_eq!(out.column(), 9);
        out.margin().unwrap();
        assert_eq!(out.column(), 4);
        out.begin_frame();
        assert_eq!(out.column(), 0);
    }

    #[test]
    fn test_soft_wrap() {
        let mut out = TraceOutput::new(Vec::new(), TraceFlags::empty());
        out.put(&"x".repeat(70)).unwrap();
        out.soft_wrap(9, 80).unwrap();
        assert_eq!(out.column(), 70);
        out.soft_wrap(10, 80).unwrap();
        assert_eq!(out.column(), 8);
        assert!(display_text(out).ends_with("\n        "));
    }

    #[test]
    fn test_capture_mirrors_display() {
        let capture = SharedBuf::default();
        let mut out = TraceOutput::new(Vec::new(), TraceFlags::empty())
            .with_capture(Box::new(capture.clone()));
        out.put("hello\n").unwrap();
        assert_eq!(capture.text(), "hello\n");
        assert_eq!(display_text(out), "hello\n");
    }

    #[test]
    fn test_quiet_writes_capture_only() {
        let capture = SharedBuf::default();
        let mut out = TraceOutput::new(Vec::new(), TraceFlags::QUIET)
            .with_capture(Box::new(capture.clone()));
        out.put("hello").unwrap();
        assert_eq!(capture.text(), "hello");
        assert_eq!(display_text(out), "");
    }

    #[test]
    fn test_quiet_keeps_color_and_diagnostics_on_display() {
        let capture = SharedBuf::default();
        let mut out = TraceOutput::new(Vec::new(), TraceFlags::QUIET)
            .with_capture(Box::new(capture.clone()));
        out.color("\x1b[92m").unwrap();
        out.diagnostic("[warn]").unwrap();
        assert_eq!(capture.text(), "");
        assert_eq!(display_text(out), "\x1b[92m[warn]\n");

        let capture = SharedBuf::default();
        let flags = TraceFlags::QUIET.union(TraceFlags::COLOR_TO_CAPTURE);
        let mut out = TraceOutput::new(Vec::new(), flags).with_capture(Box::new(capture.clone()));
        out.color("\x1b[92m").unwrap();
        assert_eq!(capture.text(), "\x1b[92m");
        assert_eq!(display_text(out), "");
    }

    #[test]
    fn test_color_stays_off_capture_by_default() {
        let capture = SharedBuf::default();
        let mut out = TraceOutput::new(Vec::new(), TraceFlags::empty())
            .with_capture(Box::new(capture.clone()));
        out.color("\x1b[92m").unwrap();
        out.put("x").unwrap();
        assert_eq!(out.column(), 1);
        assert_eq!(capture.text(), "x");
        assert_eq!(display_text(out), "\x1b[92mx");
    }

    #[test]
    fn test_color_to_capture() {
        let capture = SharedBuf::default();
        let mut out = TraceOutput::new(Vec::new(), TraceFlags::COLOR_TO_CAPTURE)
            .with_capture(Box::new(capture.clone()));
        out.color("\x1b[92m").unwrap();
        assert_eq!(capture.text(), "\x1b[92m");
    }

    #[test]
    fn test_close_capture_detaches() {
        let capture = SharedBuf::default();
        let mut out = TraceOutput::new(Vec::new(), TraceFlags::empty())
            .with_capture(Box::new(capture.clone()));
        assert!(out.is_capturing());
        assert!(out.close_capture().unwrap().is_some());
        out.put("after").unwrap();
        assert_eq!(capture.text(), "");
        assert!(!out.is_capturing());
    }
}
