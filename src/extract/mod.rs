//! XML value extraction
//!
//! Walks the document as a stream of events in a single forward pass and
//! collects the trimmed text of every element whose local name (namespace
//! prefix stripped) is one of the requested tags, in document order.
//!
//! Attribution of text to an element follows the configured
//! [`TagTracking`]:
//! - [`TagTracking::LastElement`] remembers only the most recently opened
//!   element and forgets it on *any* close tag. Text that follows a nested
//!   child's close tag is therefore dropped. This is the behaviour existing
//!   consumers of the output rely on and is exact for leaf targets such as
//!   `<quantity>5929</quantity>`.
//! - [`TagTracking::AncestorStack`] keeps the full stack of open elements
//!   and attributes text to the innermost one.
//!
//! Whitespace-only text never produces a value. Empty input produces no
//! values. Malformed input fails with [`Error::Parse`] and any values
//! collected before the failure are discarded.

use crate::config::TagTracking;
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, trace};

/// Values collected for one tag
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Column {
    /// Local tag name
    pub name: String,
    /// Trimmed text content, one entry per matching occurrence
    pub values: Vec<String>,
}

impl Column {
    /// Create an empty column for `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Number of collected values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing matched
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Single-pass extractor for one or more tags
#[derive(Clone, Debug)]
pub struct Extractor {
    targets: Vec<String>,
    tracking: TagTracking,
}

impl Extractor {
    /// Extractor for the given local tag names
    ///
    /// Repeated names are collapsed, keeping the first occurrence's position.
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for target in targets {
            let target = target.into();
            if !unique.contains(&target) {
                unique.push(target);
            }
        }
        Self {
            targets: unique,
            tracking: TagTracking::default(),
        }
    }

    /// Use a different attribution strategy
    pub fn with_tracking(mut self, tracking: TagTracking) -> Self {
        self.tracking = tracking;
        self
    }

    /// Tags this extractor collects, in column order
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Attribution strategy in use
    pub fn tracking(&self) -> TagTracking {
        self.tracking
    }

    /// Run the extraction over `xml`
    ///
    /// Returns one [`Column`] per target, in the order the targets were
    /// given, whether or not anything matched.
    ///
    /// # Errors
    /// Returns [`Error::Parse`] if the document is not well-formed.
    pub fn extract(&self, xml: &[u8]) -> Result<Vec<Column>> {
        let mut columns: Vec<Column> = self.targets.iter().map(Column::new).collect();
        let mut walker = Walker::new(self.tracking);

        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        loop {
            let event = reader
                .read_event()
                .map_err(|e| parse_error(reader.error_position() as u64, e))?;

            match event {
                Event::Start(start) => {
                    check_attributes(&start, reader.buffer_position() as u64)?;
                    let slot = self.slot_of(start.local_name().as_ref());
                    walker.open(slot);
                }
                Event::Empty(empty) => {
                    check_attributes(&empty, reader.buffer_position() as u64)?;
                    // <tag/> is an open immediately followed by a close
                    let slot = self.slot_of(empty.local_name().as_ref());
                    walker.open(slot);
                    walker.close();
                }
                Event::End(end) => {
                    if walker.depth == 0 {
                        return Err(Error::Parse {
                            position: reader.buffer_position() as u64,
                            message: format!(
                                "close tag </{}> without matching open tag",
                                String::from_utf8_lossy(end.name().as_ref())
                            ),
                        });
                    }
                    walker.close();
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| parse_error(reader.buffer_position() as u64, e))?;
                    check_chars(&text, reader.buffer_position() as u64)?;
                    walker.text(&text, &mut columns);
                }
                Event::CData(cdata) => {
                    let raw = cdata.into_inner();
                    let text = std::str::from_utf8(&raw)
                        .map_err(|e| parse_error(reader.buffer_position() as u64, e))?;
                    check_chars(text, reader.buffer_position() as u64)?;
                    walker.text(text, &mut columns);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if walker.depth > 0 {
            return Err(Error::Parse {
                position: reader.buffer_position() as u64,
                message: format!(
                    "unexpected end of document with {} unclosed element(s)",
                    walker.depth
                ),
            });
        }

        for column in &columns {
            debug!(tag = %column.name, values = column.len(), "extracted tag values");
        }
        Ok(columns)
    }

    fn slot_of(&self, local_name: &[u8]) -> Option<usize> {
        self.targets
            .iter()
            .position(|target| target.as_bytes() == local_name)
    }
}

/// Extract every value of a single tag with the default tracking
///
/// # Errors
/// Returns [`Error::Parse`] if the document is not well-formed.
pub fn extract_values(xml: &[u8], target: &str) -> Result<Vec<String>> {
    let mut columns = Extractor::new([target]).extract(xml)?;
    Ok(columns.pop().map(|column| column.values).unwrap_or_default())
}

/// Element attribution state
///
/// A slot is the index of the target column an element maps to, or `None`
/// for elements that are not extracted.
struct Walker {
    tracking: TagTracking,
    current: Option<usize>,
    stack: Vec<Option<usize>>,
    depth: usize,
}

impl Walker {
    fn new(tracking: TagTracking) -> Self {
        Self {
            tracking,
            current: None,
            stack: Vec::new(),
            depth: 0,
        }
    }

    fn open(&mut self, slot: Option<usize>) {
        self.depth += 1;
        match self.tracking {
            TagTracking::LastElement => self.current = slot,
            TagTracking::AncestorStack => self.stack.push(slot),
        }
    }

    fn close(&mut self) {
        self.depth -= 1;
        match self.tracking {
            TagTracking::LastElement => self.current = None,
            TagTracking::AncestorStack => {
                self.stack.pop();
            }
        }
    }

    fn attributed(&self) -> Option<usize> {
        match self.tracking {
            TagTracking::LastElement => self.current,
            TagTracking::AncestorStack => self.stack.last().copied().flatten(),
        }
    }

    fn text(&self, raw: &str, columns: &mut [Column]) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        if let Some(slot) = self.attributed() {
            trace!(tag = %columns[slot].name, value = trimmed, "matched");
            columns[slot].values.push(trimmed.to_string());
        }
    }
}

/// Attributes are only validated when iterated
fn check_attributes(tag: &BytesStart<'_>, position: u64) -> Result<()> {
    for attribute in tag.attributes() {
        attribute.map_err(|e| parse_error(position, e))?;
    }
    Ok(())
}

/// Reject characters outside the XML 1.0 `Char` production
fn check_chars(text: &str, position: u64) -> Result<()> {
    let illegal = text.chars().find(|&c| {
        !matches!(c,
            '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}')
    });
    match illegal {
        Some(c) => Err(Error::Parse {
            position,
            message: format!("illegal character U+{:04X} in text", c as u32),
        }),
        None => Ok(()),
    }
}

fn parse_error(position: u64, err: impl std::fmt::Display) -> Error {
    Error::Parse {
        position,
        message: err.to_string(),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
