//! Preedit composition with segments for display.
//!
//! The composition is what the host draws while the user is composing: the
//! rendered buffer text, one segment per input and the cursor. The pending
//! stands in for the selected input, so in-progress keys are visible.

use crate::input::InputId;
use crate::input_buffer::InputBuffer;
use crate::word::InputOption;
use std::ops::Range;

/// A segment in the preedit composition.
///
/// Each non-gap input of the buffer renders as one segment. The segment of
/// the pending is the only unconfirmed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Byte range in the preedit text
    pub range: Range<usize>,
    /// False for the pending under edit
    pub confirmed: bool,
    /// Input rendered by this segment
    pub input: InputId,
}

/// Preedit composition for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// The preedit text to display (e.g., "你好")
    pub preedit: String,
    /// Cursor position in the preedit (byte offset)
    pub cursor: usize,
    /// Segments marking input boundaries
    pub segments: Vec<Segment>,
}

impl Composition {
    /// Create a new empty composition.
    pub fn new() -> Self {
        Self {
            preedit: String::new(),
            cursor: 0,
            segments: Vec::new(),
        }
    }

    /// Render `buffer` with `option`.
    ///
    /// The cursor ends the selected input, or sits on the selected gap after
    /// its pending.
    pub fn from_buffer(buffer: &InputBuffer, option: &InputOption) -> Self {
        let mut composition = Self::new();
        let pending = buffer.pending();

        for (i, input) in buffer.inputs().iter().enumerate() {
            let selected = buffer.is_selected(input.id());
            if buffer.need_gap_space_with(i, option) {
                composition.preedit.push(' ');
            }

            if input.is_gap() {
                if selected {
                    if !pending.is_empty() {
                        composition.push_segment(&pending.text(option), false, pending.id());
                    }
                    composition.cursor = composition.preedit.len();
                }
                continue;
            }

            if selected {
                composition.push_segment(&pending.text(option), false, input.id());
                composition.cursor = composition.preedit.len();
            } else {
                composition.push_segment(&input.text(option), true, input.id());
            }
        }
        composition
    }

    fn push_segment(&mut self, text: &str, confirmed: bool, input: InputId) {
        let start = self.preedit.len();
        self.preedit.push_str(text);
        self.segments.push(Segment {
            range: start..self.preedit.len(),
            confirmed,
            input,
        });
    }

    /// Check if the composition is empty.
    pub fn is_empty(&self) -> bool {
        self.preedit.is_empty()
    }

    /// Clear the composition.
    pub fn clear(&mut self) {
        self.preedit.clear();
        self.cursor = 0;
        self.segments.clear();
    }

    /// Get the length of the preedit text in bytes.
    pub fn len(&self) -> usize {
        self.preedit.len()
    }

    /// Get the segment at the cursor position, if any.
    pub fn segment_at_cursor(&self) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|seg| seg.range.contains(&self.cursor))
    }

    /// Segment rendering the input `id`.
    pub fn segment_of(&self, id: InputId) -> Option<&Segment> {
        self.segments.iter().find(|seg| seg.input == id)
    }

    /// Get text of a specific segment.
    pub fn segment_text(&self, segment: &Segment) -> &str {
        &self.preedit[segment.range.clone()]
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::keys_from;
    use crate::word::InputWord;

    fn buffer_with_word() -> InputBuffer {
        let mut buffer = InputBuffer::new();
        let pending = buffer.char_pending_or_new();
        pending.set_keys(keys_from("ni"));
        pending.set_word(Some(InputWord::pinyin(1, "你", "ni")));
        buffer.confirm_pending_and_select_next();
        buffer
    }

    #[test]
    fn test_new() {
        let comp = Composition::new();
        assert!(comp.is_empty());
        assert_eq!(comp.cursor, 0);
        assert!(comp.segments.is_empty());
    }

    #[test]
    fn test_gap_pending_is_unconfirmed_segment() {
        let mut buffer = buffer_with_word();
        for key in keys_from("ab") {
            buffer.char_pending_or_new().append_key(key);
        }

        let comp = Composition::from_buffer(&buffer, &InputOption::default());
        assert_eq!(comp.preedit, "你 ab");
        assert_eq!(comp.segments.len(), 2);
        assert!(comp.segments[0].confirmed);
        assert_eq!(comp.segment_text(&comp.segments[0]), "你");
        assert!(!comp.segments[1].confirmed);
        assert_eq!(comp.segment_text(&comp.segments[1]), "ab");
        assert_eq!(comp.cursor, comp.len());
    }

    #[test]
    fn test_cursor_ends_selected_input() {
        let mut buffer = buffer_with_word();
        let id = buffer.inputs()[1].id();
        buffer.select(id);

        let comp = Composition::from_buffer(&buffer, &InputOption::default());
        assert_eq!(comp.preedit, "你");
        assert_eq!(comp.cursor, 3); // UTF-8: 3 bytes
        assert_eq!(comp.segment_of(id).map(|s| s.confirmed), Some(false));
        assert!(comp.segment_at_cursor().is_none());
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = InputBuffer::new();
        let comp = Composition::from_buffer(&buffer, &InputOption::default());
        assert!(comp.is_empty());
        assert_eq!(comp.cursor, 0);
    }

    #[test]
    fn test_clear() {
        let buffer = buffer_with_word();
        let mut comp = Composition::from_buffer(&buffer, &InputOption::default());
        assert!(!comp.is_empty());

        comp.clear();
        assert!(comp.is_empty());
        assert_eq!(comp.cursor, 0);
        assert!(comp.segments.is_empty());
    }
}
