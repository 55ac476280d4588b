//! Cursor state shared by every buffer kind.

/// Reader/writer cursors and their mark registers.
///
/// The readable window is `[reader, writer)` and the writable window is
/// `[writer, capacity)`. Capacity itself lives with the storage, not here;
/// the owning buffer enforces `reader <= writer <= capacity` through the
/// checked setters on [`ByteBuf`](crate::ByteBuf).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub(crate) reader: usize,
    pub(crate) writer: usize,
    pub(crate) marked_reader: usize,
    pub(crate) marked_writer: usize,
}

impl Cursor {
    /// Creates a cursor with both indexes and both marks at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cursor positioned at `reader`/`writer`, marks at zero.
    #[must_use]
    pub(crate) fn at(reader: usize, writer: usize) -> Self {
        Self {
            reader,
            writer,
            marked_reader: 0,
            marked_writer: 0,
        }
    }

    /// Current reader index.
    #[inline]
    #[must_use]
    pub fn reader(&self) -> usize {
        self.reader
    }

    /// Current writer index.
    #[inline]
    #[must_use]
    pub fn writer(&self) -> usize {
        self.writer
    }

    /// The saved reader mark.
    #[inline]
    #[must_use]
    pub fn marked_reader(&self) -> usize {
        self.marked_reader
    }

    /// The saved writer mark.
    #[inline]
    #[must_use]
    pub fn marked_writer(&self) -> usize {
        self.marked_writer
    }

    /// Rebases the cursor after `delta` leading bytes were discarded.
    ///
    /// Marks shift by the same amount, clamped at zero.
    pub(crate) fn discard(&mut self, delta: usize) {
        self.reader = 0;
        self.writer -= delta;
        self.marked_reader = self.marked_reader.saturating_sub(delta);
        self.marked_writer = self.marked_writer.saturating_sub(delta);
    }
}
