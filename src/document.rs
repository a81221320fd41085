//! Structured view of a definition document.
//!
//! Markup from a dictionary is treated as three fixed insertion points: the
//! first `<meta>` tag, the closing `</head>` and the closing `</body>`. The
//! markup is located once on parse; tags are then queued against an anchor
//! and spliced in a single pass when the document is serialized. A document
//! missing any anchor is rejected instead of being patched partially.

use std::fmt;

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    FirstMeta,
    HeadClose,
    BodyClose,
}

impl Anchor {
    fn needle(self) -> &'static str {
        match self {
            Anchor::FirstMeta => "<meta",
            Anchor::HeadClose => "</head>",
            Anchor::BodyClose => "</body>",
        }
    }

    fn locate(self, markup: &str) -> Option<usize> {
        match self {
            Anchor::FirstMeta => find_tag_start(markup, self.needle()),
            Anchor::HeadClose | Anchor::BodyClose => find_ascii_ci(markup, self.needle(), 0),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.needle())
    }
}

#[derive(Debug)]
struct Slot {
    offset: usize,
    tags: Vec<String>,
}

#[derive(Debug)]
pub struct Document {
    markup: String,
    slots: [Slot; 3],
}

impl Document {
    pub fn parse(markup: String) -> Result<Self, RenderError> {
        let locate = |anchor: Anchor| -> Result<Slot, RenderError> {
            let offset = anchor
                .locate(&markup)
                .ok_or(RenderError::MissingAnchor(anchor))?;
            Ok(Slot {
                offset,
                tags: Vec::new(),
            })
        };
        // Indexed by `Anchor` discriminant.
        let slots = [
            locate(Anchor::FirstMeta)?,
            locate(Anchor::HeadClose)?,
            locate(Anchor::BodyClose)?,
        ];
        Ok(Self { markup, slots })
    }

    /// Inserts `tag` ahead of the first meta tag of the source markup.
    pub fn insert_before_meta(&mut self, tag: impl Into<String>) {
        self.slot_mut(Anchor::FirstMeta).tags.push(tag.into());
    }

    /// Appends `tag` to the end of the head.
    pub fn append_to_head(&mut self, tag: impl Into<String>) {
        self.slot_mut(Anchor::HeadClose).tags.push(tag.into());
    }

    /// Appends `tag` to the end of the body.
    pub fn append_to_body(&mut self, tag: impl Into<String>) {
        self.slot_mut(Anchor::BodyClose).tags.push(tag.into());
    }

    pub fn anchor_offset(&self, anchor: Anchor) -> usize {
        self.slot(anchor).offset
    }

    pub fn into_html(self) -> String {
        let extra: usize = self
            .slots
            .iter()
            .flat_map(|slot| slot.tags.iter())
            .map(String::len)
            .sum();
        let mut slots: Vec<&Slot> = self.slots.iter().collect();
        slots.sort_by_key(|slot| slot.offset);

        let mut html = String::with_capacity(self.markup.len() + extra);
        let mut cursor = 0;
        for slot in slots {
            html.push_str(&self.markup[cursor..slot.offset]);
            for tag in &slot.tags {
                html.push_str(tag);
            }
            cursor = slot.offset;
        }
        html.push_str(&self.markup[cursor..]);
        html
    }

    fn slot(&self, anchor: Anchor) -> &Slot {
        &self.slots[anchor as usize]
    }

    fn slot_mut(&mut self, anchor: Anchor) -> &mut Slot {
        &mut self.slots[anchor as usize]
    }
}

/// Escapes a value for a double-quoted attribute.
pub fn escape_attr(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn find_ascii_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack.as_bytes()[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|idx| idx + from)
}

// `<meta` only counts when it opens a tag, so `<metadata>` is skipped.
fn find_tag_start(haystack: &str, needle: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(idx) = find_ascii_ci(haystack, needle, from) {
        let end = idx + needle.len();
        match bytes.get(end) {
            Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => return Some(idx),
            None => return None,
            _ => from = idx + 1,
        }
    }
    None
}
