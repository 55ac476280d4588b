//! View that hides everything beyond a fixed length.

use std::cell::{Ref, RefMut};
use std::fmt;

use crate::buf::byte_buf::ByteBuf;
use crate::buf::cursor::Cursor;
use crate::buf::heap::HeapBuf;
use crate::buf::sliced::SlicedBuf;
use crate::buf::storage::{self, Storage};
use crate::error::{check_range, Result};
use crate::order::ByteOrder;

/// Zero-copy view of the first `length` bytes of a parent buffer whose
/// capacity is larger.
///
/// Every operation is bounds-checked against `length`, not the parent's
/// capacity, before touching storage. Indexes map 1:1 onto the parent.
pub struct TruncatedBuf {
    storage: Storage,
    order: ByteOrder,
    length: usize,
    cursor: Cursor,
}

impl TruncatedBuf {
    pub(crate) fn new(storage: Storage, order: ByteOrder, length: usize) -> Self {
        Self {
            storage,
            order,
            length,
            cursor: Cursor::at(0, length),
        }
    }
}

impl ByteBuf for TruncatedBuf {
    fn order(&self) -> ByteOrder {
        self.order
    }

    fn capacity(&self) -> usize {
        self.length
    }

    fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    fn get_u8(&self, index: usize) -> Result<u8> {
        check_range(index, 1, self.length)?;
        Ok(self.storage.bytes()[index])
    }

    fn get_u16(&self, index: usize) -> Result<u16> {
        check_range(index, 2, self.length)?;
        Ok(storage::load_u16(&self.storage.bytes(), self.order, index))
    }

    fn get_u24(&self, index: usize) -> Result<u32> {
        check_range(index, 3, self.length)?;
        Ok(storage::load_u24(&self.storage.bytes(), self.order, index))
    }

    fn get_u32(&self, index: usize) -> Result<u32> {
        check_range(index, 4, self.length)?;
        Ok(storage::load_u32(&self.storage.bytes(), self.order, index))
    }

    fn get_u64(&self, index: usize) -> Result<u64> {
        check_range(index, 8, self.length)?;
        Ok(storage::load_u64(&self.storage.bytes(), self.order, index))
    }

    fn set_u8(&mut self, index: usize, value: u8) -> Result<()> {
        check_range(index, 1, self.length)?;
        self.storage.bytes_mut()[index] = value;
        Ok(())
    }

    fn set_u16(&mut self, index: usize, value: u16) -> Result<()> {
        check_range(index, 2, self.length)?;
        storage::store_u16(&mut self.storage.bytes_mut(), self.order, index, value);
        Ok(())
    }

    fn set_u24(&mut self, index: usize, value: u32) -> Result<()> {
        check_range(index, 3, self.length)?;
        storage::store_u24(&mut self.storage.bytes_mut(), self.order, index, value);
        Ok(())
    }

    fn set_u32(&mut self, index: usize, value: u32) -> Result<()> {
        check_range(index, 4, self.length)?;
        storage::store_u32(&mut self.storage.bytes_mut(), self.order, index, value);
        Ok(())
    }

    fn set_u64(&mut self, index: usize, value: u64) -> Result<()> {
        check_range(index, 8, self.length)?;
        storage::store_u64(&mut self.storage.bytes_mut(), self.order, index, value);
        Ok(())
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        check_range(index, dst.len(), self.length)?;
        dst.copy_from_slice(&self.storage.bytes()[index..index + dst.len()]);
        Ok(())
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()> {
        check_range(index, src.len(), self.length)?;
        self.storage.bytes_mut()[index..index + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn slice(&self, index: usize, length: usize) -> Result<Box<dyn ByteBuf>> {
        check_range(index, length, self.length)?;
        if length == 0 {
            return Ok(Box::new(HeapBuf::new(self.order, 0)));
        }
        if index == 0 {
            if length == self.length {
                return Ok(self.duplicate());
            }
            return Ok(Box::new(Self::new(self.storage.clone(), self.order, length)));
        }
        Ok(Box::new(SlicedBuf::new(
            self.storage.clone(),
            self.order,
            index,
            length,
        )))
    }

    fn duplicate(&self) -> Box<dyn ByteBuf> {
        Box::new(Self {
            storage: self.storage.clone(),
            order: self.order,
            length: self.length,
            cursor: Cursor::at(self.cursor.reader, self.cursor.writer),
        })
    }

    fn chunk_at(&self, index: usize) -> Result<Ref<'_, [u8]>> {
        check_range(index, 0, self.length)?;
        let end = self.length;
        Ok(Ref::map(self.storage.bytes(), |v| &v[index..end]))
    }

    fn chunk_mut_at(&mut self, index: usize) -> Result<RefMut<'_, [u8]>> {
        check_range(index, 0, self.length)?;
        let end = self.length;
        Ok(RefMut::map(self.storage.bytes_mut(), |v| {
            &mut v[index..end]
        }))
    }

    fn array(&self) -> Result<Ref<'_, [u8]>> {
        Ok(Ref::map(self.storage.bytes(), Vec::as_slice))
    }

    fn array_offset(&self) -> Result<usize> {
        Ok(0)
    }
}

impl fmt::Debug for TruncatedBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TruncatedBuf")
            .field("capacity", &self.length)
            .field("reader", &self.cursor.reader)
            .field("writer", &self.cursor.writer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hides_bytes_past_length() {
        let p = HeapBuf::wrap(ByteOrder::Big, vec![1, 2, 3, 4, 5]);
        let t = p.slice(0, 3).unwrap();
        assert_eq!(t.capacity(), 3);
        assert_eq!(t.get_u8(2).unwrap(), 3);
        assert!(t.get_u8(3).is_err());
        assert!(t.get_u32(0).is_err());
    }

    #[test]
    fn test_indexes_map_one_to_one() {
        let p = HeapBuf::wrap(ByteOrder::Big, vec![1, 2, 3, 4, 5]);
        let mut t = p.slice(0, 4).unwrap();
        t.set_u8(0, 9).unwrap();
        assert_eq!(p.get_u8(0).unwrap(), 9);
    }

    #[test]
    fn test_chunk_stops_at_length() {
        let p = HeapBuf::wrap(ByteOrder::Big, vec![1, 2, 3, 4, 5]);
        let t = p.slice(0, 3).unwrap();
        assert_eq!(&*t.chunk_at(0).unwrap(), &[1, 2, 3]);
    }
}
