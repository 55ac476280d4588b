//! Growable buffer that reallocates on demand.

use std::cell::{Ref, RefMut};
use std::fmt;

use tracing::trace;

use crate::buf::byte_buf::ByteBuf;
use crate::buf::cursor::Cursor;
use crate::buf::duplicated::DuplicatedBuf;
use crate::buf::heap::HeapBuf;
use crate::buf::sliced::SlicedBuf;
use crate::buf::truncated::TruncatedBuf;
use crate::error::{check_range, BufError, Result};
use crate::order::ByteOrder;

/// Buffer that wraps a heap buffer and grows it to satisfy writes.
///
/// Growth doubles the capacity (starting from 1 when empty) until the
/// pending write fits, copies the written prefix into the new storage, and
/// swaps it in place. Views taken before a growth keep working: they share
/// the same storage cell and observe the replacement.
///
/// Sequential `write_*` operations reserve space first, so a writer never
/// sees a capacity failure on this buffer.
///
/// # Examples
///
/// ```
/// use netbuf::{ByteBuf, ByteOrder, DynamicBuf};
///
/// let mut buf = DynamicBuf::new(ByteOrder::Big, 2);
/// buf.write_u64(7).unwrap();
/// assert!(buf.capacity() >= 8);
/// assert_eq!(buf.read_u64().unwrap(), 7);
/// ```
pub struct DynamicBuf {
    inner: HeapBuf,
    cursor: Cursor,
}

impl DynamicBuf {
    /// Creates an empty buffer whose initial capacity is
    /// `estimated_length`.
    #[must_use]
    pub fn new(order: ByteOrder, estimated_length: usize) -> Self {
        Self {
            inner: HeapBuf::new(order, estimated_length),
            cursor: Cursor::new(),
        }
    }
}

impl ByteBuf for DynamicBuf {
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

    fn ensure_writable(&mut self, min_writable: usize) -> Result<()> {
        if min_writable <= self.writable_bytes() {
            return Ok(());
        }
        let writer = self.cursor.writer;
        let target = writer.checked_add(min_writable).ok_or_else(|| {
            BufError::InvalidInput(format!(
                "requested capacity overflows: writer {writer} + {min_writable}"
            ))
        })?;
        let old_capacity = self.capacity();
        let mut new_capacity = old_capacity.max(1);
        while new_capacity < target {
            new_capacity = new_capacity.checked_mul(2).ok_or_else(|| {
                BufError::InvalidInput(format!("requested capacity overflows: {target}"))
            })?;
        }
        let mut grown = vec![0u8; new_capacity];
        grown[..writer].copy_from_slice(&self.inner.storage().bytes()[..writer]);
        self.inner.storage().replace(grown);
        trace!(old_capacity, new_capacity, "dynamic buffer grown");
        Ok(())
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

    fn set_u8(&mut self, index: usize, value: u8) -> Result<()> {
        self.inner.set_u8(index, value)
    }

    fn set_u16(&mut self, index: usize, value: u16) -> Result<()> {
        self.inner.set_u16(index, value)
    }

    fn set_u24(&mut self, index: usize, value: u32) -> Result<()> {
        self.inner.set_u24(index, value)
    }

    fn set_u32(&mut self, index: usize, value: u32) -> Result<()> {
        self.inner.set_u32(index, value)
    }

    fn set_u64(&mut self, index: usize, value: u64) -> Result<()> {
        self.inner.set_u64(index, value)
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        self.inner.get_bytes(index, dst)
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()> {
        self.inner.set_bytes(index, src)
    }

    fn slice(&self, index: usize, length: usize) -> Result<Box<dyn ByteBuf>> {
        check_range(index, length, self.capacity())?;
        if length == 0 {
            return Ok(Box::new(HeapBuf::new(self.order(), 0)));
        }
        // Slices are bounded windows; only a duplicate tracks growth.
        if index == 0 {
            return Ok(Box::new(TruncatedBuf::new(
                self.inner.storage().clone(),
                self.order(),
                length,
            )));
        }
        Ok(Box::new(SlicedBuf::new(
            self.inner.storage().clone(),
            self.order(),
            index,
            length,
        )))
    }

    fn duplicate(&self) -> Box<dyn ByteBuf> {
        Box::new(DuplicatedBuf::new(
            self.inner.storage().clone(),
            self.order(),
            Cursor::at(self.cursor.reader, self.cursor.writer),
        ))
    }

    fn chunk_at(&self, index: usize) -> Result<Ref<'_, [u8]>> {
        self.inner.chunk_at(index)
    }

    fn chunk_mut_at(&mut self, index: usize) -> Result<RefMut<'_, [u8]>> {
        self.inner.chunk_mut_at(index)
    }

    fn array(&self) -> Result<Ref<'_, [u8]>> {
        self.inner.array()
    }

    fn array_offset(&self) -> Result<usize> {
        self.inner.array_offset()
    }
}

impl fmt::Debug for DynamicBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicBuf")
            .field("capacity", &self.capacity())
            .field("reader", &self.cursor.reader)
            .field("writer", &self.cursor.writer)
            .finish()
    }
}
