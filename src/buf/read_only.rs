//! Wrapper that rejects every mutating operation.

use std::cell::{Ref, RefMut};
use std::fmt;

use crate::buf::byte_buf::ByteBuf;
use crate::buf::cursor::Cursor;
use crate::error::{BufError, Result};
use crate::order::ByteOrder;

/// View that exposes another buffer's content while refusing mutation.
///
/// Cursors are independent and start at the wrapped buffer's positions, so
/// a consumer can advance through the content without affecting the
/// original. Every mutating call fails with [`BufError::ReadOnly`].
///
/// Construct through [`factory::read_only`](crate::factory::read_only),
/// which never stacks a second read-only layer on an already read-only
/// buffer.
pub struct ReadOnlyBuf {
    inner: Box<dyn ByteBuf>,
    cursor: Cursor,
}

impl ReadOnlyBuf {
    /// Wraps `inner`, inheriting its cursor positions.
    #[must_use]
    pub fn new(inner: Box<dyn ByteBuf>) -> Self {
        let cursor = Cursor::at(inner.reader_index(), inner.writer_index());
        Self { inner, cursor }
    }

    fn with_cursor(inner: Box<dyn ByteBuf>, cursor: Cursor) -> Self {
        Self { inner, cursor }
    }
}

impl ByteBuf for ReadOnlyBuf {
    fn order(&self) -> ByteOrder {
        self.inner.order()
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn ensure_writable(&mut self, min_writable: usize) -> Result<()> {
        if min_writable == 0 {
            Ok(())
        } else {
            Err(BufError::ReadOnly)
        }
    }

    fn discard_read_bytes(&mut self) -> Result<()> {
        Err(BufError::ReadOnly)
    }

    fn get_u8(&self, index: usize) -> Result<u8> {
        self.inner.get_u8(index)
    }

    fn get_u16(&self, index: usize) -> Result<u16> {
        self.inner.get_u16(index)
    }

    fn get_u24(&self, index: usize) -> Result<u32> {
        self.inner.get_u24(index)
    }

    fn get_u32(&self, index: usize) -> Result<u32> {
        self.inner.get_u32(index)
    }

    fn get_u64(&self, index: usize) -> Result<u64> {
        self.inner.get_u64(index)
    }

    fn set_u8(&mut self, _index: usize, _value: u8) -> Result<()> {
        Err(BufError::ReadOnly)
    }

    fn set_u16(&mut self, _index: usize, _value: u16) -> Result<()> {
        Err(BufError::ReadOnly)
    }

    fn set_u24(&mut self, _index: usize, _value: u32) -> Result<()> {
        Err(BufError::ReadOnly)
    }

    fn set_u32(&mut self, _index: usize, _value: u32) -> Result<()> {
        Err(BufError::ReadOnly)
    }

    fn set_u64(&mut self, _index: usize, _value: u64) -> Result<()> {
        Err(BufError::ReadOnly)
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        self.inner.get_bytes(index, dst)
    }

    fn set_bytes(&mut self, _index: usize, _src: &[u8]) -> Result<()> {
        Err(BufError::ReadOnly)
    }

    fn slice(&self, index: usize, length: usize) -> Result<Box<dyn ByteBuf>> {
        Ok(Box::new(Self::new(self.inner.slice(index, length)?)))
    }

    fn duplicate(&self) -> Box<dyn ByteBuf> {
        Box::new(Self::with_cursor(
            self.inner.duplicate(),
            Cursor::at(self.cursor.reader, self.cursor.writer),
        ))
    }

    fn chunk_at(&self, index: usize) -> Result<Ref<'_, [u8]>> {
        self.inner.chunk_at(index)
    }

    fn chunk_mut_at(&mut self, _index: usize) -> Result<RefMut<'_, [u8]>> {
        Err(BufError::ReadOnly)
    }

    fn array(&self) -> Result<Ref<'_, [u8]>> {
        Err(BufError::ReadOnly)
    }

    fn array_offset(&self) -> Result<usize> {
        Err(BufError::ReadOnly)
    }
}

impl fmt::Debug for ReadOnlyBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyBuf")
            .field("capacity", &self.capacity())
            .field("reader", &self.cursor.reader)
            .field("writer", &self.cursor.writer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buf::heap::HeapBuf;

    fn read_only_of(bytes: Vec<u8>) -> ReadOnlyBuf {
        ReadOnlyBuf::new(Box::new(HeapBuf::wrap(ByteOrder::Big, bytes)))
    }

    #[test]
    fn test_reads_pass_through() {
        let buf = read_only_of(vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(buf.get_u32(0).unwrap(), 0x0102_0304);
        assert_eq!(buf.readable_bytes(), 4);
    }

    #[test]
    fn test_sequential_reads_use_own_cursor() {
        let mut buf = read_only_of(vec![1, 2, 3]);
        assert_eq!(buf.read_u8().unwrap(), 1);
        assert_eq!(buf.reader_index(), 1);
    }

    #[test]
    fn test_every_mutation_is_rejected() {
        let mut buf = read_only_of(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(matches!(buf.set_u8(0, 1), Err(BufError::ReadOnly)));
        assert!(matches!(buf.set_u16(0, 1), Err(BufError::ReadOnly)));
        assert!(matches!(buf.set_u64(0, 1), Err(BufError::ReadOnly)));
        assert!(matches!(buf.set_bytes(0, &[1]), Err(BufError::ReadOnly)));
        assert!(matches!(buf.write_u8(1), Err(BufError::ReadOnly)));
        assert!(matches!(buf.discard_read_bytes(), Err(BufError::ReadOnly)));
        assert!(matches!(buf.array(), Err(BufError::ReadOnly)));
        assert!(matches!(buf.writable_chunk(), Err(BufError::ReadOnly)));
    }

    #[test]
    fn test_slice_stays_read_only() {
        let buf = read_only_of(vec![1, 2, 3, 4]);
        let mut view = buf.slice(1, 2).unwrap();
        assert!(view.is_read_only());
        assert_eq!(view.get_u8(0).unwrap(), 2);
        assert!(matches!(view.set_u8(0, 9), Err(BufError::ReadOnly)));
    }

    #[test]
    fn test_duplicate_stays_read_only() {
        let buf = read_only_of(vec![1, 2]);
        let dup = buf.duplicate();
        assert!(dup.is_read_only());
        assert_eq!(dup.reader_index(), buf.reader_index());
    }

    #[test]
    fn test_ensure_writable_zero_is_allowed() {
        let mut buf = read_only_of(vec![1]);
        assert!(buf.ensure_writable(0).is_ok());
        assert!(matches!(buf.ensure_writable(1), Err(BufError::ReadOnly)));
    }
}
