//! Fixed-capacity buffer over one contiguous array.

use std::cell::{Ref, RefMut};
use std::fmt;

use crate::buf::byte_buf::ByteBuf;
use crate::buf::cursor::Cursor;
use crate::buf::duplicated::DuplicatedBuf;
use crate::buf::sliced::SlicedBuf;
use crate::buf::storage::{self, Storage};
use crate::buf::truncated::TruncatedBuf;
use crate::error::{check_range, Result};
use crate::order::ByteOrder;

/// Buffer whose content is a single contiguous heap array of fixed
/// capacity.
///
/// Construction either allocates zero-filled storage
/// ([`HeapBuf::new`]) or takes over a caller-supplied `Vec` without
/// copying ([`HeapBuf::wrap`]). Views created from this buffer share the
/// storage; it is freed when the last handle drops.
///
/// # Examples
///
/// ```
/// use netbuf::{ByteBuf, ByteOrder, HeapBuf};
///
/// let mut buf = HeapBuf::wrap(ByteOrder::Big, vec![0x12, 0x34]);
/// assert_eq!(buf.readable_bytes(), 2);
/// assert_eq!(buf.read_u16().unwrap(), 0x1234);
/// ```
pub struct HeapBuf {
    storage: Storage,
    order: ByteOrder,
    cursor: Cursor,
}

impl HeapBuf {
    /// Allocates a zero-filled buffer of `capacity` bytes with both
    /// cursors at 0.
    #[must_use]
    pub fn new(order: ByteOrder, capacity: usize) -> Self {
        Self {
            storage: Storage::zeroed(capacity),
            order,
            cursor: Cursor::new(),
        }
    }

    /// Takes over `bytes` without copying. The whole content is readable
    /// (`reader = 0, writer = capacity`).
    #[must_use]
    pub fn wrap(order: ByteOrder, bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self {
            storage: Storage::new(bytes),
            order,
            cursor: Cursor::at(0, len),
        }
    }

    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl ByteBuf for HeapBuf {
    fn order(&self) -> ByteOrder {
        self.order
    }

    fn capacity(&self) -> usize {
        self.storage.len()
    }

    fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    fn get_u8(&self, index: usize) -> Result<u8> {
        check_range(index, 1, self.capacity())?;
        Ok(self.storage.bytes()[index])
    }

    fn get_u16(&self, index: usize) -> Result<u16> {
        check_range(index, 2, self.capacity())?;
        Ok(storage::load_u16(&self.storage.bytes(), self.order, index))
    }

    fn get_u24(&self, index: usize) -> Result<u32> {
        check_range(index, 3, self.capacity())?;
        Ok(storage::load_u24(&self.storage.bytes(), self.order, index))
    }

    fn get_u32(&self, index: usize) -> Result<u32> {
        check_range(index, 4, self.capacity())?;
        Ok(storage::load_u32(&self.storage.bytes(), self.order, index))
    }

    fn get_u64(&self, index: usize) -> Result<u64> {
        check_range(index, 8, self.capacity())?;
        Ok(storage::load_u64(&self.storage.bytes(), self.order, index))
    }

    fn set_u8(&mut self, index: usize, value: u8) -> Result<()> {
        check_range(index, 1, self.capacity())?;
        self.storage.bytes_mut()[index] = value;
        Ok(())
    }

    fn set_u16(&mut self, index: usize, value: u16) -> Result<()> {
        check_range(index, 2, self.capacity())?;
        storage::store_u16(&mut self.storage.bytes_mut(), self.order, index, value);
        Ok(())
    }

    fn set_u24(&mut self, index: usize, value: u32) -> Result<()> {
        check_range(index, 3, self.capacity())?;
        storage::store_u24(&mut self.storage.bytes_mut(), self.order, index, value);
        Ok(())
    }

    fn set_u32(&mut self, index: usize, value: u32) -> Result<()> {
        check_range(index, 4, self.capacity())?;
        storage::store_u32(&mut self.storage.bytes_mut(), self.order, index, value);
        Ok(())
    }

    fn set_u64(&mut self, index: usize, value: u64) -> Result<()> {
        check_range(index, 8, self.capacity())?;
        storage::store_u64(&mut self.storage.bytes_mut(), self.order, index, value);
        Ok(())
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        check_range(index, dst.len(), self.capacity())?;
        dst.copy_from_slice(&self.storage.bytes()[index..index + dst.len()]);
        Ok(())
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()> {
        check_range(index, src.len(), self.capacity())?;
        self.storage.bytes_mut()[index..index + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn slice(&self, index: usize, length: usize) -> Result<Box<dyn ByteBuf>> {
        check_range(index, length, self.capacity())?;
        if length == 0 {
            return Ok(Box::new(HeapBuf::new(self.order, 0)));
        }
        if index == 0 {
            if length == self.capacity() {
                return Ok(self.duplicate());
            }
            return Ok(Box::new(TruncatedBuf::new(
                self.storage.clone(),
                self.order,
                length,
            )));
        }
        Ok(Box::new(SlicedBuf::new(
            self.storage.clone(),
            self.order,
            index,
            length,
        )))
    }

    fn duplicate(&self) -> Box<dyn ByteBuf> {
        Box::new(DuplicatedBuf::new(
            self.storage.clone(),
            self.order,
            Cursor::at(self.cursor.reader, self.cursor.writer),
        ))
    }

    fn chunk_at(&self, index: usize) -> Result<Ref<'_, [u8]>> {
        check_range(index, 0, self.capacity())?;
        Ok(Ref::map(self.storage.bytes(), |v| &v[index..]))
    }

    fn chunk_mut_at(&mut self, index: usize) -> Result<RefMut<'_, [u8]>> {
        check_range(index, 0, self.capacity())?;
        Ok(RefMut::map(self.storage.bytes_mut(), |v| &mut v[index..]))
    }

    fn array(&self) -> Result<Ref<'_, [u8]>> {
        Ok(Ref::map(self.storage.bytes(), Vec::as_slice))
    }

    fn array_offset(&self) -> Result<usize> {
        Ok(0)
    }
}

impl fmt::Debug for HeapBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapBuf")
            .field("capacity", &self.capacity())
            .field("reader", &self.cursor.reader)
            .field("writer", &self.cursor.writer)
            .finish()
    }
}
