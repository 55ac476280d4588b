//! The trait every buffer kind implements.

use std::cell::{Ref, RefMut};
use std::fmt;
use std::io;

use crate::buf::cursor::Cursor;
use crate::buf::heap::HeapBuf;
use crate::error::{check_range, check_readable, BufError, Result};
use crate::order::ByteOrder;

/// Sign-extends a 24-bit value read into the low three bytes of a `u32`.
pub(crate) fn sign_extend_medium(value: u32) -> i32 {
    if value & 0x0080_0000 == 0 {
        value as i32
    } else {
        (value | 0xFF00_0000) as i32
    }
}

/// A random- and sequential-access byte buffer.
///
/// This is the single interface over every buffer kind: heap, growable,
/// composite, and the derived views. Implementors provide absolute-index
/// accessors, the view constructors, and access to the cursor state; the
/// entire sequential, search, and transfer surface is derived from those.
///
/// # Regions
///
/// A buffer of capacity `c` with cursors `r` (reader) and `w` (writer) is
/// partitioned into the discardable region `[0, r)`, the readable region
/// `[r, w)`, and the writable region `[w, c)`. `0 <= r <= w <= c` holds
/// after every operation.
///
/// # Absolute vs sequential access
///
/// `get_*`/`set_*` address bytes by absolute index and never move the
/// cursors. `read_*`/`write_*` operate at the cursors and advance them;
/// they fail with [`BufError::Underflow`] / [`BufError::Overflow`] when the
/// corresponding region is too small, naming the missing byte count.
///
/// # Examples
///
/// ```
/// use netbuf::{factory, ByteBuf, ByteOrder};
///
/// let mut buf = factory::buffer(ByteOrder::Big, 8);
/// buf.write_u16(0xCAFE).unwrap();
/// assert_eq!(buf.get_u8(0).unwrap(), 0xCA);
/// assert_eq!(buf.read_u16().unwrap(), 0xCAFE);
/// assert_eq!(buf.readable_bytes(), 0);
/// ```
pub trait ByteBuf: fmt::Debug {
    // === Required: identity and state ===

    /// The byte order used by multi-byte accessors. Fixed at construction.
    fn order(&self) -> ByteOrder;

    /// Total number of addressable bytes.
    fn capacity(&self) -> usize;

    /// The cursor state backing the index operations.
    fn cursor(&self) -> &Cursor;

    /// Mutable cursor state. Prefer the checked index operations; this is
    /// exposed so that the derived operations can advance cursors after a
    /// successful bounds check.
    fn cursor_mut(&mut self) -> &mut Cursor;

    // === Required: absolute accessors ===

    /// Reads the byte at `index`.
    fn get_u8(&self, index: usize) -> Result<u8>;

    /// Reads a 16-bit integer at `index` in this buffer's byte order.
    fn get_u16(&self, index: usize) -> Result<u16>;

    /// Reads a 24-bit integer at `index` into the low bytes of a `u32`.
    fn get_u24(&self, index: usize) -> Result<u32>;

    /// Reads a 32-bit integer at `index` in this buffer's byte order.
    fn get_u32(&self, index: usize) -> Result<u32>;

    /// Reads a 64-bit integer at `index` in this buffer's byte order.
    fn get_u64(&self, index: usize) -> Result<u64>;

    /// Writes the byte at `index`.
    fn set_u8(&mut self, index: usize, value: u8) -> Result<()>;

    /// Writes a 16-bit integer at `index` in this buffer's byte order.
    fn set_u16(&mut self, index: usize, value: u16) -> Result<()>;

    /// Writes the low 24 bits of `value` at `index`. The high byte is
    /// ignored.
    fn set_u24(&mut self, index: usize, value: u32) -> Result<()>;

    /// Writes a 32-bit integer at `index` in this buffer's byte order.
    fn set_u32(&mut self, index: usize, value: u32) -> Result<()>;

    /// Writes a 64-bit integer at `index` in this buffer's byte order.
    fn set_u64(&mut self, index: usize, value: u64) -> Result<()>;

    /// Copies `dst.len()` bytes starting at `index` into `dst`.
    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()>;

    /// Copies all of `src` into this buffer starting at `index`.
    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()>;

    // === Required: views and spans ===

    /// Returns a zero-copy view of `[index, index + length)` with its own
    /// cursors initialized to `reader = 0, writer = length`.
    ///
    /// Slicing never moves this buffer's cursors. Writes through the view
    /// alias this buffer's storage.
    fn slice(&self, index: usize, length: usize) -> Result<Box<dyn ByteBuf>>;

    /// Returns a zero-copy view of the entire buffer whose independent
    /// cursors start at this buffer's current positions.
    fn duplicate(&self) -> Box<dyn ByteBuf>;

    /// Borrows the longest contiguous run of bytes starting at absolute
    /// `index`, bounded by capacity. `index == capacity` yields an empty
    /// run. For a composite buffer the run ends at a component boundary.
    fn chunk_at(&self, index: usize) -> Result<Ref<'_, [u8]>>;

    /// Mutable counterpart of [`chunk_at`](ByteBuf::chunk_at).
    fn chunk_mut_at(&mut self, index: usize) -> Result<RefMut<'_, [u8]>>;

    /// Borrows the whole backing array, if this buffer has a single
    /// contiguous one. Fails with [`BufError::Unsupported`] on composite
    /// buffers and [`BufError::ReadOnly`] on read-only views.
    fn array(&self) -> Result<Ref<'_, [u8]>>;

    /// Offset of this buffer's first byte within [`array`](ByteBuf::array).
    fn array_offset(&self) -> Result<usize>;

    // === Overridable policy ===

    /// True for read-only views. Mutating operations on such buffers fail
    /// with [`BufError::ReadOnly`].
    fn is_read_only(&self) -> bool {
        false
    }

    /// Makes room for at least `min_writable` bytes after the writer index.
    ///
    /// Fixed-capacity buffers fail with [`BufError::Overflow`]; the
    /// growable backend reallocates instead.
    fn ensure_writable(&mut self, min_writable: usize) -> Result<()> {
        let writable = self.writable_bytes();
        if min_writable <= writable {
            Ok(())
        } else {
            Err(BufError::Overflow {
                requested: min_writable,
                writable,
                capacity: self.capacity(),
            })
        }
    }

    /// Moves the readable region to the front of the buffer, discarding the
    /// bytes before the reader index. Marks shift by the same distance,
    /// clamped at zero. No-op when the reader index is already 0.
    ///
    /// The move tolerates overlapping source and destination ranges.
    fn discard_read_bytes(&mut self) -> Result<()> {
        let reader = self.reader_index();
        if reader == 0 {
            return Ok(());
        }
        let writer = self.writer_index();
        {
            let mut chunk = self.chunk_mut_at(0)?;
            chunk.copy_within(reader..writer, 0);
        }
        self.cursor_mut().discard(reader);
        Ok(())
    }

    /// Splits `[index, index + length)` into the ordered list of zero-copy
    /// views that cover it without crossing storage boundaries.
    ///
    /// Contiguous buffers return a single view (or nothing for an empty
    /// range); a composite returns one view per touched component. Used
    /// for scatter/gather I/O and for splicing buffers into composites.
    fn decompose(&self, index: usize, length: usize) -> Result<Vec<Box<dyn ByteBuf>>> {
        check_range(index, length, self.capacity())?;
        if length == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![self.slice(index, length)?])
    }

    // === Cursor operations ===

    /// Current reader index.
    fn reader_index(&self) -> usize {
        self.cursor().reader
    }

    /// Current writer index.
    fn writer_index(&self) -> usize {
        self.cursor().writer
    }

    /// Moves the reader index. Fails unless `index <= writer_index()`.
    fn set_reader_index(&mut self, index: usize) -> Result<()> {
        let writer = self.writer_index();
        if index > writer {
            return Err(BufError::InvalidIndex {
                reader: index,
                writer,
                capacity: self.capacity(),
            });
        }
        self.cursor_mut().reader = index;
        Ok(())
    }

    /// Moves the writer index. Fails unless
    /// `reader_index() <= index <= capacity()`.
    fn set_writer_index(&mut self, index: usize) -> Result<()> {
        let reader = self.reader_index();
        if index < reader || index > self.capacity() {
            return Err(BufError::InvalidIndex {
                reader,
                writer: index,
                capacity: self.capacity(),
            });
        }
        self.cursor_mut().writer = index;
        Ok(())
    }

    /// Moves both cursors at once. Succeeds iff
    /// `reader <= writer <= capacity()`, regardless of the current cursor
    /// positions.
    fn set_index(&mut self, reader: usize, writer: usize) -> Result<()> {
        if reader > writer || writer > self.capacity() {
            return Err(BufError::InvalidIndex {
                reader,
                writer,
                capacity: self.capacity(),
            });
        }
        let cursor = self.cursor_mut();
        cursor.reader = reader;
        cursor.writer = writer;
        Ok(())
    }

    /// Shifts the reader index by a signed offset.
    fn offset_reader_index(&mut self, delta: isize) -> Result<()> {
        let target = self.reader_index() as isize + delta;
        if target < 0 {
            return Err(BufError::InvalidInput(format!(
                "reader index offset {delta} moves before index 0"
            )));
        }
        self.set_reader_index(target as usize)
    }

    /// Shifts the writer index by a signed offset.
    fn offset_writer_index(&mut self, delta: isize) -> Result<()> {
        let target = self.writer_index() as isize + delta;
        if target < 0 {
            return Err(BufError::InvalidInput(format!(
                "writer index offset {delta} moves before index 0"
            )));
        }
        self.set_writer_index(target as usize)
    }

    /// Advances the reader index past `length` readable bytes.
    fn skip_bytes(&mut self, length: usize) -> Result<()> {
        check_readable(length, self.readable_bytes())?;
        self.cursor_mut().reader += length;
        Ok(())
    }

    /// Number of readable bytes (`writer_index - reader_index`).
    fn readable_bytes(&self) -> usize {
        self.writer_index() - self.reader_index()
    }

    /// Number of writable bytes (`capacity - writer_index`).
    fn writable_bytes(&self) -> usize {
        self.capacity() - self.writer_index()
    }

    /// True if at least one byte is readable.
    fn is_readable(&self) -> bool {
        self.readable_bytes() > 0
    }

    /// True if at least one byte is writable.
    fn is_writable(&self) -> bool {
        self.writable_bytes() > 0
    }

    /// Sets both cursors to 0. Content is untouched.
    fn clear(&mut self) {
        let cursor = self.cursor_mut();
        cursor.reader = 0;
        cursor.writer = 0;
    }

    /// Saves the current reader index to the reader mark.
    fn mark_reader_index(&mut self) {
        let cursor = self.cursor_mut();
        cursor.marked_reader = cursor.reader;
    }

    /// Restores the reader index from the reader mark. Fails if the mark
    /// violates the current cursor invariant.
    fn reset_reader_index(&mut self) -> Result<()> {
        let mark = self.cursor().marked_reader;
        self.set_reader_index(mark)
    }

    /// Saves the current writer index to the writer mark.
    fn mark_writer_index(&mut self) {
        let cursor = self.cursor_mut();
        cursor.marked_writer = cursor.writer;
    }

    /// Restores the writer index from the writer mark. Fails if the mark
    /// violates the current cursor invariant.
    fn reset_writer_index(&mut self) -> Result<()> {
        let mark = self.cursor().marked_writer;
        self.set_writer_index(mark)
    }

    // === Derived absolute accessors ===

    /// Reads the byte at `index` as signed.
    fn get_i8(&self, index: usize) -> Result<i8> {
        Ok(self.get_u8(index)? as i8)
    }

    /// Reads a signed 16-bit integer at `index`.
    fn get_i16(&self, index: usize) -> Result<i16> {
        Ok(self.get_u16(index)? as i16)
    }

    /// Reads a sign-extended 24-bit integer at `index`.
    fn get_i24(&self, index: usize) -> Result<i32> {
        Ok(sign_extend_medium(self.get_u24(index)?))
    }

    /// Reads a signed 32-bit integer at `index`.
    fn get_i32(&self, index: usize) -> Result<i32> {
        Ok(self.get_u32(index)? as i32)
    }

    /// Reads a signed 64-bit integer at `index`.
    fn get_i64(&self, index: usize) -> Result<i64> {
        Ok(self.get_u64(index)? as i64)
    }

    /// Reads a 32-bit IEEE float at `index`.
    fn get_f32(&self, index: usize) -> Result<f32> {
        Ok(f32::from_bits(self.get_u32(index)?))
    }

    /// Reads a 64-bit IEEE float at `index`.
    fn get_f64(&self, index: usize) -> Result<f64> {
        Ok(f64::from_bits(self.get_u64(index)?))
    }

    /// Writes a signed byte at `index`.
    fn set_i8(&mut self, index: usize, value: i8) -> Result<()> {
        self.set_u8(index, value as u8)
    }

    /// Writes a signed 16-bit integer at `index`.
    fn set_i16(&mut self, index: usize, value: i16) -> Result<()> {
        self.set_u16(index, value as u16)
    }

    /// Writes the low 24 bits of a signed integer at `index`.
    fn set_i24(&mut self, index: usize, value: i32) -> Result<()> {
        self.set_u24(index, value as u32 & 0x00FF_FFFF)
    }

    /// Writes a signed 32-bit integer at `index`.
    fn set_i32(&mut self, index: usize, value: i32) -> Result<()> {
        self.set_u32(index, value as u32)
    }

    /// Writes a signed 64-bit integer at `index`.
    fn set_i64(&mut self, index: usize, value: i64) -> Result<()> {
        self.set_u64(index, value as u64)
    }

    /// Writes a 32-bit IEEE float at `index`.
    fn set_f32(&mut self, index: usize, value: f32) -> Result<()> {
        self.set_u32(index, value.to_bits())
    }

    /// Writes a 64-bit IEEE float at `index`.
    fn set_f64(&mut self, index: usize, value: f64) -> Result<()> {
        self.set_u64(index, value.to_bits())
    }

    /// Zero-fills `[index, index + length)`.
    fn set_zeros(&mut self, index: usize, length: usize) -> Result<()> {
        check_range(index, length, self.capacity())?;
        let mut filled = 0;
        while filled < length {
            let mut chunk = self.chunk_mut_at(index + filled)?;
            let n = chunk.len().min(length - filled);
            chunk[..n].fill(0);
            filled += n;
        }
        Ok(())
    }

    // === Sequential reads ===

    /// Reads the next byte, advancing the reader index.
    fn read_u8(&mut self) -> Result<u8> {
        check_readable(1, self.readable_bytes())?;
        let reader = self.reader_index();
        let value = self.get_u8(reader)?;
        self.cursor_mut().reader += 1;
        Ok(value)
    }

    /// Reads the next byte as signed.
    fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Reads the next 16-bit integer.
    fn read_u16(&mut self) -> Result<u16> {
        check_readable(2, self.readable_bytes())?;
        let reader = self.reader_index();
        let value = self.get_u16(reader)?;
        self.cursor_mut().reader += 2;
        Ok(value)
    }

    /// Reads the next signed 16-bit integer.
    fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    /// Reads the next 24-bit integer.
    fn read_u24(&mut self) -> Result<u32> {
        check_readable(3, self.readable_bytes())?;
        let reader = self.reader_index();
        let value = self.get_u24(reader)?;
        self.cursor_mut().reader += 3;
        Ok(value)
    }

    /// Reads the next sign-extended 24-bit integer.
    fn read_i24(&mut self) -> Result<i32> {
        Ok(sign_extend_medium(self.read_u24()?))
    }

    /// Reads the next 32-bit integer.
    fn read_u32(&mut self) -> Result<u32> {
        check_readable(4, self.readable_bytes())?;
        let reader = self.reader_index();
        let value = self.get_u32(reader)?;
        self.cursor_mut().reader += 4;
        Ok(value)
    }

    /// Reads the next signed 32-bit integer.
    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    /// Reads the next 64-bit integer.
    fn read_u64(&mut self) -> Result<u64> {
        check_readable(8, self.readable_bytes())?;
        let reader = self.reader_index();
        let value = self.get_u64(reader)?;
        self.cursor_mut().reader += 8;
        Ok(value)
    }

    /// Reads the next signed 64-bit integer.
    fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_u64()? as i64)
    }

    /// Reads the next 32-bit IEEE float.
    fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Reads the next 64-bit IEEE float.
    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Fills `dst` from the readable region, advancing the reader index.
    fn read_bytes_into(&mut self, dst: &mut [u8]) -> Result<()> {
        check_readable(dst.len(), self.readable_bytes())?;
        let reader = self.reader_index();
        self.get_bytes(reader, dst)?;
        self.cursor_mut().reader += dst.len();
        Ok(())
    }

    /// Detaches the next `length` readable bytes as a newly allocated
    /// buffer, advancing the reader index. `length == 0` returns the
    /// canonical empty buffer without allocating.
    fn read_bytes(&mut self, length: usize) -> Result<Box<dyn ByteBuf>> {
        if length == 0 {
            return Ok(Box::new(crate::factory::empty_buffer()));
        }
        check_readable(length, self.readable_bytes())?;
        let reader = self.reader_index();
        let detached = self.copy(reader, length)?;
        self.cursor_mut().reader += length;
        Ok(detached)
    }

    /// Returns a zero-copy view of the next `length` readable bytes,
    /// advancing the reader index.
    fn read_slice(&mut self, length: usize) -> Result<Box<dyn ByteBuf>> {
        check_readable(length, self.readable_bytes())?;
        let reader = self.reader_index();
        let view = self.slice(reader, length)?;
        self.cursor_mut().reader += length;
        Ok(view)
    }

    /// Hands off the entire readable region as a zero-copy view and resets
    /// both cursors to 0. Used to pass accumulated bytes to an outbound
    /// write without duplicating them.
    fn split_readable(&mut self) -> Result<Box<dyn ByteBuf>> {
        let view = self.slice(self.reader_index(), self.readable_bytes())?;
        self.set_index(0, 0)?;
        Ok(view)
    }

    // === Sequential writes ===

    /// Appends one byte, growing the buffer if it can grow.
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.ensure_writable(1)?;
        let writer = self.writer_index();
        self.set_u8(writer, value)?;
        self.cursor_mut().writer += 1;
        Ok(())
    }

    /// Appends a signed byte.
    fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// Appends a 16-bit integer.
    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.ensure_writable(2)?;
        let writer = self.writer_index();
        self.set_u16(writer, value)?;
        self.cursor_mut().writer += 2;
        Ok(())
    }

    /// Appends a signed 16-bit integer.
    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_u16(value as u16)
    }

    /// Appends the low 24 bits of `value`.
    fn write_u24(&mut self, value: u32) -> Result<()> {
        self.ensure_writable(3)?;
        let writer = self.writer_index();
        self.set_u24(writer, value)?;
        self.cursor_mut().writer += 3;
        Ok(())
    }

    /// Appends the low 24 bits of a signed integer.
    fn write_i24(&mut self, value: i32) -> Result<()> {
        self.write_u24(value as u32 & 0x00FF_FFFF)
    }

    /// Appends a 32-bit integer.
    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.ensure_writable(4)?;
        let writer = self.writer_index();
        self.set_u32(writer, value)?;
        self.cursor_mut().writer += 4;
        Ok(())
    }

    /// Appends a signed 32-bit integer.
    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_u32(value as u32)
    }

    /// Appends a 64-bit integer.
    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.ensure_writable(8)?;
        let writer = self.writer_index();
        self.set_u64(writer, value)?;
        self.cursor_mut().writer += 8;
        Ok(())
    }

    /// Appends a signed 64-bit integer.
    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_u64(value as u64)
    }

    /// Appends a 32-bit IEEE float.
    fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write_u32(value.to_bits())
    }

    /// Appends a 64-bit IEEE float.
    fn write_f64(&mut self, value: f64) -> Result<()> {
        self.write_u64(value.to_bits())
    }

    /// Appends all of `src`.
    fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.ensure_writable(src.len())?;
        let writer = self.writer_index();
        self.set_bytes(writer, src)?;
        self.cursor_mut().writer += src.len();
        Ok(())
    }

    /// Appends `length` zero bytes.
    fn write_zeros(&mut self, length: usize) -> Result<()> {
        self.ensure_writable(length)?;
        let writer = self.writer_index();
        self.set_zeros(writer, length)?;
        self.cursor_mut().writer += length;
        Ok(())
    }

    // === Copies and views over the readable region ===

    /// Deep-copies `[index, index + length)` into a fresh heap buffer with
    /// the same byte order, cursors at `reader = 0, writer = length`.
    fn copy(&self, index: usize, length: usize) -> Result<Box<dyn ByteBuf>> {
        check_range(index, length, self.capacity())?;
        let mut data = vec![0u8; length];
        self.get_bytes(index, &mut data)?;
        Ok(Box::new(HeapBuf::wrap(self.order(), data)))
    }

    /// Deep-copies the readable region.
    fn copy_readable(&self) -> Result<Box<dyn ByteBuf>> {
        self.copy(self.reader_index(), self.readable_bytes())
    }

    /// Returns a zero-copy view of the readable region without moving this
    /// buffer's cursors.
    fn readable_slice(&self) -> Result<Box<dyn ByteBuf>> {
        self.slice(self.reader_index(), self.readable_bytes())
    }

    /// Copies the readable region into a fresh `Vec`.
    fn to_vec(&self) -> Result<Vec<u8>> {
        let mut data = vec![0u8; self.readable_bytes()];
        self.get_bytes(self.reader_index(), &mut data)?;
        Ok(data)
    }

    // === Contiguous spans for scatter/gather I/O ===

    /// Borrows the longest contiguous prefix of the readable region.
    ///
    /// May cover less than [`readable_bytes`](ByteBuf::readable_bytes) when
    /// the region spans a component boundary.
    fn readable_chunk(&self) -> Result<Ref<'_, [u8]>> {
        let readable = self.readable_bytes();
        let chunk = self.chunk_at(self.reader_index())?;
        let n = chunk.len().min(readable);
        Ok(Ref::map(chunk, |c| &c[..n]))
    }

    /// Borrows the longest contiguous prefix of the writable region.
    fn writable_chunk(&mut self) -> Result<RefMut<'_, [u8]>> {
        let writable = self.writable_bytes();
        let writer = self.writer_index();
        let chunk = self.chunk_mut_at(writer)?;
        let n = chunk.len().min(writable);
        Ok(RefMut::map(chunk, |c| &mut c[..n]))
    }

    // === Buffer-to-buffer transfers ===

    /// Copies `[index, index + length)` into `dst` at `dst_index`. Neither
    /// buffer's cursors move.
    fn get_buf(
        &self,
        index: usize,
        dst: &mut dyn ByteBuf,
        dst_index: usize,
        length: usize,
    ) -> Result<()> {
        let mut tmp = vec![0u8; length];
        self.get_bytes(index, &mut tmp)?;
        dst.set_bytes(dst_index, &tmp)
    }

    /// Copies `length` bytes from `src` at `src_index` into this buffer at
    /// `index`. Neither buffer's cursors move.
    fn set_buf(
        &mut self,
        index: usize,
        src: &dyn ByteBuf,
        src_index: usize,
        length: usize,
    ) -> Result<()> {
        let mut tmp = vec![0u8; length];
        src.get_bytes(src_index, &mut tmp)?;
        self.set_bytes(index, &tmp)
    }

    /// Moves `length` readable bytes into `dst`, advancing this buffer's
    /// reader index and `dst`'s writer index.
    fn read_into_buf(&mut self, dst: &mut dyn ByteBuf, length: usize) -> Result<()> {
        check_readable(length, self.readable_bytes())?;
        let mut tmp = vec![0u8; length];
        let reader = self.reader_index();
        self.get_bytes(reader, &mut tmp)?;
        self.cursor_mut().reader += length;
        dst.write_bytes(&tmp)
    }

    /// Moves `length` readable bytes from `src` into this buffer, advancing
    /// `src`'s reader index and this buffer's writer index.
    fn write_buf(&mut self, src: &mut dyn ByteBuf, length: usize) -> Result<()> {
        check_readable(length, src.readable_bytes())?;
        self.ensure_writable(length)?;
        let mut tmp = vec![0u8; length];
        src.read_bytes_into(&mut tmp)?;
        let writer = self.writer_index();
        self.set_bytes(writer, &tmp)?;
        self.cursor_mut().writer += length;
        Ok(())
    }

    // === Stream adapters ===

    /// Writes `[index, index + length)` to `dst`. Cursors do not move.
    fn get_to_writer(
        &self,
        index: usize,
        length: usize,
        dst: &mut dyn io::Write,
    ) -> Result<usize> {
        check_range(index, length, self.capacity())?;
        let mut written = 0;
        while written < length {
            let chunk = self.chunk_at(index + written)?;
            let n = chunk.len().min(length - written);
            dst.write_all(&chunk[..n])?;
            written += n;
        }
        Ok(written)
    }

    /// Fills `[index, index + length)` from `src`. Returns the number of
    /// bytes transferred, or `None` when the stream was already at its end.
    /// Cursors do not move.
    fn set_from_reader(
        &mut self,
        index: usize,
        length: usize,
        src: &mut dyn io::Read,
    ) -> Result<Option<usize>> {
        check_range(index, length, self.capacity())?;
        let mut total = 0;
        while total < length {
            let mut chunk = self.chunk_mut_at(index + total)?;
            let n = chunk.len().min(length - total);
            match src.read(&mut chunk[..n]) {
                Ok(0) => break,
                Ok(read) => total += read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        if total == 0 && length > 0 {
            Ok(None)
        } else {
            Ok(Some(total))
        }
    }

    /// Writes `length` readable bytes to `dst`, advancing the reader index.
    fn read_to_writer(&mut self, length: usize, dst: &mut dyn io::Write) -> Result<usize> {
        check_readable(length, self.readable_bytes())?;
        let reader = self.reader_index();
        let written = self.get_to_writer(reader, length, dst)?;
        self.cursor_mut().reader += written;
        Ok(written)
    }

    /// Appends up to `length` bytes from `src`, advancing the writer index
    /// by the number transferred. Returns `None` when the stream was
    /// already at its end.
    fn write_from_reader(
        &mut self,
        length: usize,
        src: &mut dyn io::Read,
    ) -> Result<Option<usize>> {
        self.ensure_writable(length)?;
        let writer = self.writer_index();
        let transferred = self.set_from_reader(writer, length, src)?;
        if let Some(n) = transferred {
            self.cursor_mut().writer += n;
        }
        Ok(transferred)
    }

    // === Search ===

    /// Finds the first occurrence of `value` in `[from, to)`, scanning
    /// forward when `from <= to` and backward from `min(from, capacity)`
    /// down to `to` otherwise. Returns the absolute index.
    fn index_of(&self, from: usize, to: usize, value: u8) -> Option<usize> {
        if from <= to {
            let end = to.min(self.capacity());
            (from..end).find(|&i| matches!(self.get_u8(i), Ok(b) if b == value))
        } else {
            let start = from.min(self.capacity());
            (to..start)
                .rev()
                .find(|&i| matches!(self.get_u8(i), Ok(b) if b == value))
        }
    }

    /// Number of readable bytes before the first occurrence of `value` in
    /// the readable region.
    fn bytes_before(&self, value: u8) -> Option<usize> {
        let reader = self.reader_index();
        self.index_of(reader, self.writer_index(), value)
            .map(|i| i - reader)
    }

    /// Number of bytes before the first occurrence of `value` within
    /// `[index, index + length)`.
    fn bytes_before_in(&self, index: usize, length: usize, value: u8) -> Result<Option<usize>> {
        check_range(index, length, self.capacity())?;
        Ok(self.index_of(index, index + length, value).map(|i| i - index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;

    fn buf_with(order: ByteOrder, bytes: &[u8]) -> HeapBuf {
        factory::copied_buffer(order, bytes)
    }

    #[test]
    fn test_sign_extend_medium() {
        assert_eq!(sign_extend_medium(0x0000_0001), 1);
        assert_eq!(sign_extend_medium(0x007F_FFFF), 0x007F_FFFF);
        assert_eq!(sign_extend_medium(0x00FF_FFFF), -1);
        assert_eq!(sign_extend_medium(0x0080_0000), -8_388_608);
    }

    #[test]
    fn test_sequential_read_advances_cursor() {
        let mut buf = buf_with(ByteOrder::Big, &[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(buf.read_u16().unwrap(), 0x1234);
        assert_eq!(buf.reader_index(), 2);
        assert_eq!(buf.read_u16().unwrap(), 0x5678);
        assert_eq!(buf.readable_bytes(), 0);
    }

    #[test]
    fn test_sequential_read_underflow_names_shortfall() {
        let mut buf = buf_with(ByteOrder::Big, &[1]);
        let err = buf.read_u32().unwrap_err();
        assert!(matches!(
            err,
            BufError::Underflow {
                requested: 4,
                available: 1
            }
        ));
        // A failed read must not move the cursor.
        assert_eq!(buf.reader_index(), 0);
    }

    #[test]
    fn test_write_overflow_on_fixed_capacity() {
        let mut buf = factory::buffer(ByteOrder::Big, 2);
        let err = buf.write_u32(7).unwrap_err();
        assert!(matches!(err, BufError::Overflow { requested: 4, .. }));
        assert_eq!(buf.writer_index(), 0);
    }

    #[test]
    fn test_set_index_ignores_previous_cursors() {
        let mut buf = buf_with(ByteOrder::Big, &[0; 8]);
        buf.set_index(6, 7).unwrap();
        // reader 2 < current reader 6 would fail through set_reader_index,
        // but set_index validates only against capacity.
        buf.set_index(2, 3).unwrap();
        assert_eq!(buf.reader_index(), 2);
        assert_eq!(buf.writer_index(), 3);
    }

    #[test]
    fn test_cursor_setters_reject_inversions() {
        let mut buf = buf_with(ByteOrder::Big, &[0; 4]);
        buf.set_index(2, 2).unwrap();
        assert!(buf.set_reader_index(3).is_err());
        assert!(buf.set_writer_index(1).is_err());
        assert!(buf.set_index(3, 2).is_err());
        assert!(buf.set_index(0, 5).is_err());
    }

    #[test]
    fn test_mark_and_reset() {
        let mut buf = buf_with(ByteOrder::Big, &[1, 2, 3, 4]);
        buf.skip_bytes(2).unwrap();
        buf.mark_reader_index();
        buf.skip_bytes(2).unwrap();
        buf.reset_reader_index().unwrap();
        assert_eq!(buf.reader_index(), 2);
    }

    #[test]
    fn test_reset_to_invalid_mark_fails() {
        let mut buf = factory::buffer(ByteOrder::Big, 4);
        buf.write_bytes(&[1, 2, 3]).unwrap();
        buf.skip_bytes(2).unwrap();
        // Marks initialize to 0, which is now below the reader index, so
        // restoring the writer from its mark must fail.
        assert!(buf.reset_writer_index().is_err());
        assert_eq!(buf.writer_index(), 3);
    }

    #[test]
    fn test_discard_read_bytes_shifts_and_clamps() {
        let mut buf = factory::buffer(ByteOrder::Big, 10);
        buf.write_bytes(&[0, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        buf.set_reader_index(6).unwrap();
        buf.mark_reader_index();
        buf.discard_read_bytes().unwrap();
        assert_eq!(buf.reader_index(), 0);
        assert_eq!(buf.writer_index(), 2);
        assert_eq!(buf.capacity(), 10);
        assert_eq!(buf.get_u8(0).unwrap(), 6);
        assert_eq!(buf.get_u8(1).unwrap(), 7);
        assert_eq!(buf.cursor().marked_reader(), 0);
    }

    #[test]
    fn test_discard_read_bytes_noop_at_zero() {
        let mut buf = buf_with(ByteOrder::Big, &[9, 8, 7]);
        buf.discard_read_bytes().unwrap();
        assert_eq!(buf.writer_index(), 3);
        assert_eq!(buf.get_u8(0).unwrap(), 9);
    }

    #[test]
    fn test_read_bytes_zero_returns_empty_without_alloc() {
        let mut buf = buf_with(ByteOrder::Big, &[1, 2]);
        let empty = buf.read_bytes(0).unwrap();
        assert_eq!(empty.capacity(), 0);
        assert_eq!(buf.reader_index(), 0);
    }

    #[test]
    fn test_read_slice_aliases_storage() {
        let mut buf = buf_with(ByteOrder::Big, &[1, 2, 3, 4]);
        let mut view = buf.read_slice(2).unwrap();
        assert_eq!(buf.reader_index(), 2);
        view.set_u8(0, 0xAA).unwrap();
        assert_eq!(buf.get_u8(0).unwrap(), 0xAA);
    }

    #[test]
    fn test_split_readable_resets_cursors() {
        let mut buf = buf_with(ByteOrder::Big, &[1, 2, 3, 4]);
        buf.skip_bytes(1).unwrap();
        let view = buf.split_readable().unwrap();
        assert_eq!(view.readable_bytes(), 3);
        assert_eq!(view.get_u8(0).unwrap(), 2);
        assert_eq!(buf.reader_index(), 0);
        assert_eq!(buf.writer_index(), 0);
    }

    #[test]
    fn test_copy_detaches_content() {
        let buf = buf_with(ByteOrder::Little, &[1, 2, 3, 4]);
        let mut copy = buf.copy(1, 2).unwrap();
        copy.set_u8(0, 0xFF).unwrap();
        assert_eq!(buf.get_u8(1).unwrap(), 2);
        assert_eq!(copy.order(), ByteOrder::Little);
        assert_eq!(copy.readable_bytes(), 2);
    }

    #[test]
    fn test_write_buf_moves_both_cursors() {
        let mut src = buf_with(ByteOrder::Big, &[1, 2, 3]);
        let mut dst = factory::buffer(ByteOrder::Big, 8);
        dst.write_buf(&mut src, 2).unwrap();
        assert_eq!(src.reader_index(), 2);
        assert_eq!(dst.writer_index(), 2);
        assert_eq!(dst.get_u8(0).unwrap(), 1);
    }

    #[test]
    fn test_stream_round_trip() {
        let buf = buf_with(ByteOrder::Big, &[1, 2, 3, 4]);
        let mut out = Vec::new();
        buf.get_to_writer(1, 3, &mut out).unwrap();
        assert_eq!(out, vec![2, 3, 4]);

        let mut dst = factory::buffer(ByteOrder::Big, 4);
        let mut input = io::Cursor::new(vec![7u8, 8]);
        let n = dst.write_from_reader(4, &mut input).unwrap();
        assert_eq!(n, Some(2));
        assert_eq!(dst.readable_bytes(), 2);
        assert_eq!(dst.get_u8(0).unwrap(), 7);
    }

    #[test]
    fn test_set_from_reader_signals_eof() {
        let mut buf = factory::buffer(ByteOrder::Big, 4);
        let mut empty = io::Cursor::new(Vec::<u8>::new());
        assert_eq!(buf.set_from_reader(0, 4, &mut empty).unwrap(), None);
    }

    #[test]
    fn test_index_of_forward_and_backward() {
        let buf = buf_with(ByteOrder::Big, &[1, 2, 10, 3, 4]);
        assert_eq!(buf.index_of(0, 5, 0x0A), Some(2));
        assert_eq!(buf.index_of(5, 0, 0x0A), Some(2));
        assert_eq!(buf.index_of(0, 5, 0x7F), None);
        assert_eq!(buf.index_of(3, 5, 0x0A), None);
    }

    #[test]
    fn test_bytes_before_counts_from_reader() {
        let mut buf = buf_with(ByteOrder::Big, &[1, 2, 10, 3]);
        buf.skip_bytes(1).unwrap();
        assert_eq!(buf.bytes_before(0x0A), Some(1));
        assert_eq!(buf.bytes_before_in(0, 4, 0x0A).unwrap(), Some(2));
        assert!(buf.bytes_before_in(0, 9, 0x0A).is_err());
    }

    #[test]
    fn test_zeros() {
        let mut buf = factory::buffer(ByteOrder::Big, 6);
        buf.write_bytes(&[1, 1]).unwrap();
        buf.write_zeros(3).unwrap();
        assert_eq!(buf.to_vec().unwrap(), vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_readable_chunk_matches_region() {
        let mut buf = buf_with(ByteOrder::Big, &[1, 2, 3, 4]);
        buf.skip_bytes(1).unwrap();
        let chunk = buf.readable_chunk().unwrap();
        assert_eq!(&*chunk, &[2, 3, 4]);
    }

    #[test]
    fn test_writable_chunk_is_writable_region() {
        let mut buf = factory::buffer(ByteOrder::Big, 4);
        buf.write_bytes(&[9]).unwrap();
        {
            let mut chunk = buf.writable_chunk().unwrap();
            assert_eq!(chunk.len(), 3);
            chunk[0] = 5;
        }
        buf.offset_writer_index(1).unwrap();
        let mut out = [0u8; 2];
        buf.read_bytes_into(&mut out).unwrap();
        assert_eq!(out, [9, 5]);
    }
}
