//! Reference markers inside key descriptions.
//!
//! A paragraph may mention another key as `{{key-id}}` or `{{key-id|label}}`.
//! Anything that does not form a complete, non-empty marker stays plain text.

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A piece of a parsed paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Reference {
        key_id: &'a str,
        label: Option<&'a str>,
    },
}

/// Split a paragraph into text and reference segments, in order.
pub fn parse(paragraph: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(open) = paragraph[cursor..].find(OPEN).map(|i| i + cursor) {
        let inner_start = open + OPEN.len();
        let Some(close) = paragraph[inner_start..].find(CLOSE).map(|i| i + inner_start) else {
            break;
        };

        match parse_marker(&paragraph[inner_start..close]) {
            Some(reference) => {
                if open > text_start {
                    segments.push(Segment::Text(&paragraph[text_start..open]));
                }
                segments.push(reference);
                cursor = close + CLOSE.len();
                text_start = cursor;
            }
            None => cursor = inner_start,
        }
    }

    if text_start < paragraph.len() {
        segments.push(Segment::Text(&paragraph[text_start..]));
    }
    segments
}

fn parse_marker(inner: &str) -> Option<Segment<'_>> {
    let (key_id, label) = match inner.split_once('|') {
        Some((key_id, label)) => (key_id.trim(), Some(label.trim()).filter(|l| !l.is_empty())),
        None => (inner.trim(), None),
    };
    if key_id.is_empty() || key_id.contains(char::is_whitespace) {
        return None;
    }
    Some(Segment::Reference { key_id, label })
}
