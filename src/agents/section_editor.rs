use crate::error::{ReadmeBoxError, Result};

/// Start/end comment pair delimiting a named section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMarker {
    pub start: String,
    pub end: String,
}

impl SectionMarker {
    pub fn new(name: &str) -> Self {
        Self {
            start: format!("<!--START_SECTION:{name}-->"),
            end: format!("<!--END_SECTION:{name}-->"),
        }
    }

    /// Locate the first start marker and the first end marker following it.
    fn locate(&self, document: &str) -> Option<SectionSpan> {
        let mut state = ScanState::SeekingStart;
        loop {
            state = match state {
                ScanState::SeekingStart => {
                    let start = document.find(&self.start)?;
                    ScanState::SeekingEnd {
                        inner_start: start + self.start.len(),
                    }
                }
                ScanState::SeekingEnd { inner_start } => {
                    let offset = document[inner_start..].find(&self.end)?;
                    ScanState::Done(SectionSpan {
                        inner_start,
                        inner_end: inner_start + offset,
                    })
                }
                ScanState::Done(span) => return Some(span),
            };
        }
    }
}

enum ScanState {
    SeekingStart,
    SeekingEnd { inner_start: usize },
    Done(SectionSpan),
}

/// Byte range strictly between the end of the start marker and the start of the end marker.
#[derive(Debug, Clone, Copy)]
struct SectionSpan {
    inner_start: usize,
    inner_end: usize,
}

/// Arguments for [`SectionEditor::replace_section`].
#[derive(Debug, Clone, Copy)]
pub struct ReplaceSection<'a> {
    pub old_contents: &'a str,
    pub new_contents: &'a str,
    pub section: &'a str,
}

/// SectionEditor extracts and rewrites marker-delimited sections of a document.
pub struct SectionEditor;

impl SectionEditor {
    /// Returns the content of `name`, or `None` when the markers are missing
    /// or nothing but the marker-adjacent newlines sits between them.
    pub fn get_section(name: &str, document: &str) -> Option<String> {
        let span = SectionMarker::new(name).locate(document)?;
        let inner = &document[span.inner_start..span.inner_end];
        let inner = inner.strip_prefix('\n').unwrap_or(inner);
        let inner = inner.strip_suffix('\n').unwrap_or(inner);

        if inner.is_empty() {
            None
        } else {
            Some(inner.to_string())
        }
    }

    /// Replace everything between the section markers with `new_contents`.
    pub fn replace_section(args: ReplaceSection<'_>) -> Result<String> {
        let marker = SectionMarker::new(args.section);
        let span = marker
            .locate(args.old_contents)
            .ok_or_else(|| ReadmeBoxError::SectionNotFound(args.section.to_string()))?;

        let head = &args.old_contents[..span.inner_start];
        let tail = &args.old_contents[span.inner_end..];

        let mut updated =
            String::with_capacity(head.len() + args.new_contents.len() + tail.len() + 2);
        updated.push_str(head);
        updated.push('\n');
        updated.push_str(args.new_contents);
        updated.push('\n');
        updated.push_str(tail);
        Ok(updated)
    }
}
