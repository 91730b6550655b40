//! The consumer's side of a scan: a stack of levels, pulled one frame at a time.
//!
//! Level 0 scans the input. When a frame comes from a rule with a nested family,
//! the consumer may ask for level 1, which scans just that frame's text with the
//! nested rules; and so on, one level deeper at a time.
//!
//! Nothing is scanned ahead of demand: a level is opened on the first request for
//! it, and each request produces exactly one frame. A nested level is popped
//! once its sentinel is delivered, and pulling from a level drops every level
//! below it, since those were scanning the text of a frame the consumer has
//! now moved past. Each frame's text is scanned by a nested level at most once.
//!
//! Positions of frames in nested levels are relative to the start of the text
//! being re-scanned, not to the original input.

use crate::automaton::Family;
use crate::config::ScanOptions;
use crate::error::StreamError;
use crate::scanner::{Frame, Scanner};
use crate::source::{StrSource, SymbolSource};

/// One open level of the scan stack.
struct Level<T> {
    scanner: Scanner<T>,
    last: Option<Frame>,
    /// Whether `last` has already been opened as a nested level.
    expanded: bool,
    done: bool,
}

impl<T: SymbolSource> Level<T> {
    fn new(scanner: Scanner<T>) -> Self {
        Level {
            scanner,
            last: None,
            expanded: false,
            done: false,
        }
    }

    fn pull(&mut self, level: usize) -> Result<Frame, StreamError> {
        if self.done {
            return Err(StreamError::Exhausted(level));
        }
        let frame = match self.scanner.next() {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                self.done = true;
                return Err(e.into());
            }
            None => {
                self.done = true;
                return Err(StreamError::Exhausted(level));
            }
        };
        self.done = frame.is_sentinel();
        self.expanded = false;
        self.last = Some(frame.clone());
        Ok(frame)
    }

    /// The rules and text to re-scan the most recent frame with.
    fn expand(&mut self, level: usize) -> Result<(Family, StrSource), StreamError> {
        if self.expanded {
            return Err(StreamError::Exhausted(level + 1));
        }
        let no_nested = || StreamError::NoNestedFamily(level);
        let frame = self.last.as_ref().ok_or_else(no_nested)?;
        let rule = frame.rule.ok_or_else(no_nested)?;
        let family = self
            .scanner
            .family()
            .get(rule)
            .map(|a| a.nested())
            .filter(|f| !f.is_empty())
            .ok_or_else(no_nested)?
            .clone();
        let source = StrSource::new(&frame.text);
        self.expanded = true;
        Ok((family, source))
    }
}

/// Pull-based access to a nested scan.
pub struct TokenStream<S> {
    family: Family,
    options: ScanOptions,
    /// Held until level 0 is opened.
    source: Option<S>,

    top: Option<Level<S>>,
    /// Levels 1 and below; `nested[i]` is level `i + 1`.
    nested: Vec<Level<StrSource>>,

    /// The most recently delivered frame, at whichever level.
    current: Option<Frame>,
}

impl TokenStream<StrSource> {
    /// A stream over text already in memory.
    pub fn for_text(family: Family, text: &str) -> Self {
        TokenStream::new(family, StrSource::new(text))
    }
}

impl<S: SymbolSource> TokenStream<S> {
    pub fn new(family: Family, source: S) -> Self {
        Self::with_options(family, source, ScanOptions::default())
    }

    pub fn with_options(family: Family, source: S, options: ScanOptions) -> Self {
        TokenStream {
            family,
            options,
            source: Some(source),
            top: None,
            nested: Vec::new(),
            current: None,
        }
    }

    /// Number of levels currently open.
    pub fn depth(&self) -> usize {
        match self.top {
            Some(_) => 1 + self.nested.len(),
            None => 0,
        }
    }

    /// Get the next frame at `level`.
    ///
    /// `level` may be any open level, or one deeper than the deepest open level;
    /// the latter opens a new level over the text of the last frame above it.
    pub fn next(&mut self, level: usize) -> Result<Frame, StreamError> {
        let depth = self.depth();
        if level > depth {
            return Err(StreamError::Unopened(level));
        }
        if level == depth {
            self.open(level)?;
        } else {
            self.nested.truncate(level);
        }

        let frame = if level == 0 {
            match self.top.as_mut() {
                Some(top) => top.pull(0)?,
                None => return Err(StreamError::Unopened(0)),
            }
        } else {
            self.nested[level - 1].pull(level)?
        };
        if frame.is_sentinel() {
            tracing::debug!("scan level {level} finished at {}:{}", frame.line, frame.column);
            if level > 0 {
                self.nested.truncate(level - 1);
                self.current = self.last_at(level - 1).cloned();
                return Ok(frame);
            }
        }
        self.current = Some(frame.clone());
        Ok(frame)
    }

    /// The most recent frame delivered at an open `level`.
    fn last_at(&self, level: usize) -> Option<&Frame> {
        match level {
            0 => self.top.as_ref().and_then(|top| top.last.as_ref()),
            _ => self.nested.get(level - 1).and_then(|l| l.last.as_ref()),
        }
    }

    fn open(&mut self, level: usize) -> Result<(), StreamError> {
        if level >= self.options.max_depth {
            return Err(StreamError::TooDeep(self.options.max_depth));
        }
        if level == 0 {
            let source = self.source.take().ok_or(StreamError::Exhausted(0))?;
            let scanner = Scanner::with_options(self.family.clone(), source, self.options.clone());
            self.top = Some(Level::new(scanner));
            tracing::debug!("opened scan level 0");
            return Ok(());
        }

        let (family, source) = if level == 1 {
            self.top
                .as_mut()
                .ok_or(StreamError::Unopened(0))?
                .expand(0)?
        } else {
            self.nested[level - 2].expand(level - 1)?
        };
        tracing::debug!(
            "opened scan level {level} with {} rules over {:?}",
            family.len(),
            self.text()
        );
        let scanner = Scanner::with_options(family, source, self.options.clone());
        self.nested.push(Level::new(scanner));
        Ok(())
    }

    /// The most recent frame at the deepest open level.
    pub fn current(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    /// Text of the most recent frame at the deepest open level.
    pub fn text(&self) -> &str {
        self.current.as_ref().map(|f| f.text.as_str()).unwrap_or("")
    }

    pub fn line(&self) -> usize {
        self.current.as_ref().map(|f| f.line).unwrap_or(0)
    }

    pub fn column(&self) -> usize {
        self.current.as_ref().map(|f| f.column).unwrap_or(0)
    }
}
