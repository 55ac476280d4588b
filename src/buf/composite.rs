//! Buffer that presents several component buffers as one.

use std::cell::{Cell, Ref, RefMut};
use std::fmt;

use smallvec::SmallVec;
use tracing::trace;

use crate::buf::byte_buf::ByteBuf;
use crate::buf::cursor::Cursor;
use crate::buf::heap::HeapBuf;
use crate::error::{check_range, BufError, Result};
use crate::order::ByteOrder;

type ComponentList = SmallVec<[Box<dyn ByteBuf>; 4]>;

/// Buffer that logically concatenates component buffers without copying.
///
/// Every component is held in flattened form (`reader == 0` and
/// `writer == capacity`); composites handed in as components are spliced,
/// so lookup is always one level deep. A cumulative offset table maps
/// absolute indexes to components, and the most recently accessed component
/// is cached to make sequential access O(1).
///
/// Accessors that straddle a component boundary fall back to composing the
/// value from narrower reads on both sides, honoring the byte order.
pub struct CompositeBuf {
    order: ByteOrder,
    components: ComponentList,
    offsets: Vec<usize>,
    last_component: Cell<usize>,
    cursor: Cursor,
}

impl CompositeBuf {
    /// Builds a composite over `components`.
    ///
    /// Each component must share `order` and be flattened; composite
    /// components are spliced in. Fails if no component contributes bytes.
    /// The result is fully readable (`reader = 0, writer = capacity`).
    pub fn new(order: ByteOrder, components: Vec<Box<dyn ByteBuf>>) -> Result<Self> {
        let (components, offsets) = Self::build(order, components)?;
        let capacity = offsets[offsets.len() - 1];
        Ok(Self {
            order,
            components,
            offsets,
            last_component: Cell::new(0),
            cursor: Cursor::at(0, capacity),
        })
    }

    /// Replaces the component list, revalidating and rebuilding the offset
    /// table. Cursors and marks are reset to cover the new content.
    pub fn set_components(&mut self, components: Vec<Box<dyn ByteBuf>>) -> Result<()> {
        let (components, offsets) = Self::build(self.order, components)?;
        let capacity = offsets[offsets.len() - 1];
        self.components = components;
        self.offsets = offsets;
        self.last_component.set(0);
        self.cursor = Cursor::at(0, capacity);
        Ok(())
    }

    /// Number of components currently backing this buffer.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    fn build(
        order: ByteOrder,
        incoming: Vec<Box<dyn ByteBuf>>,
    ) -> Result<(ComponentList, Vec<usize>)> {
        let mut components = ComponentList::new();
        for component in incoming {
            if component.order() != order {
                return Err(BufError::InvalidInput(format!(
                    "component byte order {:?} does not match {order:?}",
                    component.order()
                )));
            }
            if component.reader_index() != 0 || component.writer_index() != component.capacity() {
                return Err(BufError::InvalidInput(format!(
                    "component is not flattened: reader={}, writer={}, capacity={}",
                    component.reader_index(),
                    component.writer_index(),
                    component.capacity()
                )));
            }
            // Splices composites and skips empty components; a contiguous
            // buffer contributes a single full-range view of itself.
            components.extend(component.decompose(0, component.capacity())?);
        }
        if components.is_empty() {
            return Err(BufError::InvalidInput(
                "composite buffer requires at least one non-empty component".into(),
            ));
        }
        let mut offsets = Vec::with_capacity(components.len() + 1);
        offsets.push(0);
        let mut total = 0;
        for component in &components {
            total += component.capacity();
            offsets.push(total);
        }
        Ok((components, offsets))
    }

    /// Locates the component containing absolute `index`, scanning forward
    /// or backward from the last accessed component.
    fn component_id(&self, index: usize) -> Result<usize> {
        if index >= self.capacity() {
            return Err(BufError::IndexOutOfBounds {
                index,
                length: 1,
                capacity: self.capacity(),
            });
        }
        let mut id = self.last_component.get().min(self.components.len() - 1);
        if index >= self.offsets[id + 1] {
            while index >= self.offsets[id + 1] {
                id += 1;
            }
        } else {
            while index < self.offsets[id] {
                id -= 1;
            }
        }
        self.last_component.set(id);
        Ok(id)
    }

    /// True when `[index, index + length)` lies inside component `id`.
    fn fits_in(&self, id: usize, index: usize, length: usize) -> bool {
        index + length <= self.offsets[id + 1]
    }
}

impl ByteBuf for CompositeBuf {
    fn order(&self) -> ByteOrder {
        self.order
    }

    fn capacity(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    fn get_u8(&self, index: usize) -> Result<u8> {
        let id = self.component_id(index)?;
        self.components[id].get_u8(index - self.offsets[id])
    }

    fn get_u16(&self, index: usize) -> Result<u16> {
        check_range(index, 2, self.capacity())?;
        let id = self.component_id(index)?;
        if self.fits_in(id, index, 2) {
            return self.components[id].get_u16(index - self.offsets[id]);
        }
        let (b0, b1) = (
            u16::from(self.get_u8(index)?),
            u16::from(self.get_u8(index + 1)?),
        );
        Ok(match self.order {
            ByteOrder::Big => (b0 << 8) | b1,
            ByteOrder::Little => b0 | (b1 << 8),
        })
    }

    fn get_u24(&self, index: usize) -> Result<u32> {
        check_range(index, 3, self.capacity())?;
        let id = self.component_id(index)?;
        if self.fits_in(id, index, 3) {
            return self.components[id].get_u24(index - self.offsets[id]);
        }
        let (word, byte) = (
            u32::from(self.get_u16(index)?),
            u32::from(self.get_u8(index + 2)?),
        );
        Ok(match self.order {
            ByteOrder::Big => (word << 8) | byte,
            ByteOrder::Little => word | (byte << 16),
        })
    }

    fn get_u32(&self, index: usize) -> Result<u32> {
        check_range(index, 4, self.capacity())?;
        let id = self.component_id(index)?;
        if self.fits_in(id, index, 4) {
            return self.components[id].get_u32(index - self.offsets[id]);
        }
        let (hi, lo) = (
            u32::from(self.get_u16(index)?),
            u32::from(self.get_u16(index + 2)?),
        );
        Ok(match self.order {
            ByteOrder::Big => (hi << 16) | lo,
            ByteOrder::Little => hi | (lo << 16),
        })
    }

    fn get_u64(&self, index: usize) -> Result<u64> {
        check_range(index, 8, self.capacity())?;
        let id = self.component_id(index)?;
        if self.fits_in(id, index, 8) {
            return self.components[id].get_u64(index - self.offsets[id]);
        }
        let (hi, lo) = (
            u64::from(self.get_u32(index)?),
            u64::from(self.get_u32(index + 4)?),
        );
        Ok(match self.order {
            ByteOrder::Big => (hi << 32) | lo,
            ByteOrder::Little => hi | (lo << 32),
        })
    }

    fn set_u8(&mut self, index: usize, value: u8) -> Result<()> {
        let id = self.component_id(index)?;
        let start = index - self.offsets[id];
        self.components[id].set_u8(start, value)
    }

    fn set_u16(&mut self, index: usize, value: u16) -> Result<()> {
        check_range(index, 2, self.capacity())?;
        let id = self.component_id(index)?;
        if self.fits_in(id, index, 2) {
            let start = index - self.offsets[id];
            return self.components[id].set_u16(start, value);
        }
        match self.order {
            ByteOrder::Big => {
                self.set_u8(index, (value >> 8) as u8)?;
                self.set_u8(index + 1, value as u8)
            }
            ByteOrder::Little => {
                self.set_u8(index, value as u8)?;
                self.set_u8(index + 1, (value >> 8) as u8)
            }
        }
    }

    fn set_u24(&mut self, index: usize, value: u32) -> Result<()> {
        check_range(index, 3, self.capacity())?;
        let id = self.component_id(index)?;
        if self.fits_in(id, index, 3) {
            let start = index - self.offsets[id];
            return self.components[id].set_u24(start, value);
        }
        match self.order {
            ByteOrder::Big => {
                self.set_u16(index, (value >> 8) as u16)?;
                self.set_u8(index + 2, value as u8)
            }
            ByteOrder::Little => {
                self.set_u16(index, value as u16)?;
                self.set_u8(index + 2, (value >> 16) as u8)
            }
        }
    }

    fn set_u32(&mut self, index: usize, value: u32) -> Result<()> {
        check_range(index, 4, self.capacity())?;
        let id = self.component_id(index)?;
        if self.fits_in(id, index, 4) {
            let start = index - self.offsets[id];
            return self.components[id].set_u32(start, value);
        }
        match self.order {
            ByteOrder::Big => {
                self.set_u16(index, (value >> 16) as u16)?;
                self.set_u16(index + 2, value as u16)
            }
            ByteOrder::Little => {
                self.set_u16(index, value as u16)?;
                self.set_u16(index + 2, (value >> 16) as u16)
            }
        }
    }

    fn set_u64(&mut self, index: usize, value: u64) -> Result<()> {
        check_range(index, 8, self.capacity())?;
        let id = self.component_id(index)?;
        if self.fits_in(id, index, 8) {
            let start = index - self.offsets[id];
            return self.components[id].set_u64(start, value);
        }
        match self.order {
            ByteOrder::Big => {
                self.set_u32(index, (value >> 32) as u32)?;
                self.set_u32(index + 4, value as u32)
            }
            ByteOrder::Little => {
                self.set_u32(index, value as u32)?;
                self.set_u32(index + 4, (value >> 32) as u32)
            }
        }
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        check_range(index, dst.len(), self.capacity())?;
        if dst.is_empty() {
            return Ok(());
        }
        let mut id = self.component_id(index)?;
        let mut copied = 0;
        while copied < dst.len() {
            let start = index + copied - self.offsets[id];
            let n = (self.components[id].capacity() - start).min(dst.len() - copied);
            self.components[id].get_bytes(start, &mut dst[copied..copied + n])?;
            copied += n;
            id += 1;
        }
        Ok(())
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()> {
        check_range(index, src.len(), self.capacity())?;
        if src.is_empty() {
            return Ok(());
        }
        let mut id = self.component_id(index)?;
        let mut copied = 0;
        while copied < src.len() {
            let start = index + copied - self.offsets[id];
            let n = (self.components[id].capacity() - start).min(src.len() - copied);
            self.components[id].set_bytes(start, &src[copied..copied + n])?;
            copied += n;
            id += 1;
        }
        Ok(())
    }

    fn slice(&self, index: usize, length: usize) -> Result<Box<dyn ByteBuf>> {
        check_range(index, length, self.capacity())?;
        if length == 0 {
            return Ok(Box::new(HeapBuf::new(self.order, 0)));
        }
        if index == 0 && length == self.capacity() {
            return Ok(self.duplicate());
        }
        Ok(Box::new(Self::new(self.order, self.decompose(index, length)?)?))
    }

    fn duplicate(&self) -> Box<dyn ByteBuf> {
        Box::new(Self {
            order: self.order,
            components: self.components.iter().map(|c| c.duplicate()).collect(),
            offsets: self.offsets.clone(),
            last_component: Cell::new(0),
            cursor: Cursor::at(self.cursor.reader, self.cursor.writer),
        })
    }

    fn decompose(&self, index: usize, length: usize) -> Result<Vec<Box<dyn ByteBuf>>> {
        check_range(index, length, self.capacity())?;
        if length == 0 {
            return Ok(Vec::new());
        }
        let mut parts = Vec::new();
        let mut id = self.component_id(index)?;
        let mut taken = 0;
        while taken < length {
            let start = index + taken - self.offsets[id];
            let n = (self.components[id].capacity() - start).min(length - taken);
            parts.push(self.components[id].slice(start, n)?);
            taken += n;
            id += 1;
        }
        Ok(parts)
    }

    fn discard_read_bytes(&mut self) -> Result<()> {
        let reader = self.cursor.reader;
        if reader == 0 {
            return Ok(());
        }
        let capacity = self.capacity();
        // Keep the still-relevant tail zero-copy and pad with fresh zeroed
        // storage so total capacity is preserved.
        let mut parts = self.decompose(reader, capacity - reader)?;
        parts.push(Box::new(HeapBuf::wrap(self.order, vec![0u8; reader])));
        let (components, offsets) = Self::build(self.order, parts)?;
        self.components = components;
        self.offsets = offsets;
        self.last_component.set(0);
        self.cursor.discard(reader);
        trace!(discarded = reader, capacity, "composite buffer compacted");
        Ok(())
    }

    fn chunk_at(&self, index: usize) -> Result<Ref<'_, [u8]>> {
        if index == self.capacity() {
            let last = self.components.len() - 1;
            let end = self.components[last].capacity();
            return self.components[last].chunk_at(end);
        }
        let id = self.component_id(index)?;
        self.components[id].chunk_at(index - self.offsets[id])
    }

    fn chunk_mut_at(&mut self, index: usize) -> Result<RefMut<'_, [u8]>> {
        if index == self.capacity() {
            let last = self.components.len() - 1;
            let end = self.components[last].capacity();
            return self.components[last].chunk_mut_at(end);
        }
        let id = self.component_id(index)?;
        let start = index - self.offsets[id];
        self.components[id].chunk_mut_at(start)
    }

    fn array(&self) -> Result<Ref<'_, [u8]>> {
        Err(BufError::Unsupported(
            "composite buffer has no contiguous backing array",
        ))
    }

    fn array_offset(&self) -> Result<usize> {
        Err(BufError::Unsupported(
            "composite buffer has no contiguous backing array",
        ))
    }
}

impl fmt::Debug for CompositeBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeBuf")
            .field("components", &self.components.len())
            .field("capacity", &self.capacity())
            .field("reader", &self.cursor.reader)
            .field("writer", &self.cursor.writer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(bytes: &[u8]) -> Box<dyn ByteBuf> {
        Box::new(HeapBuf::wrap(ByteOrder::Big, bytes.to_vec()))
    }

    fn sample() -> CompositeBuf {
        CompositeBuf::new(
            ByteOrder::Big,
            vec![component(&[1, 2, 3]), component(&[4, 5])],
        )
        .unwrap()
    }

    #[test]
    fn test_capacity_is_component_sum() {
        let buf = sample();
        assert_eq!(buf.capacity(), 5);
        assert_eq!(buf.component_count(), 2);
        assert_eq!(buf.readable_bytes(), 5);
    }

    #[test]
    fn test_reads_cross_boundary_like_concatenation() {
        let buf = sample();
        for (i, expected) in [1u8, 2, 3, 4, 5].iter().enumerate() {
            assert_eq!(buf.get_u8(i).unwrap(), *expected);
        }
        assert_eq!(buf.get_u8(3).unwrap(), 4);
        // Straddles the 3/2 boundary.
        assert_eq!(buf.get_u16(2).unwrap(), 0x0304);
        assert_eq!(buf.get_u32(1).unwrap(), 0x0203_0405);
    }

    #[test]
    fn test_straddling_read_past_end_is_range_error() {
        let buf = sample();
        assert!(matches!(
            buf.get_u32(2),
            Err(BufError::IndexOutOfBounds {
                index: 2,
                length: 4,
                capacity: 5
            })
        ));
    }

    #[test]
    fn test_straddling_writes_both_orders() {
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let mut buf = CompositeBuf::new(
                order,
                vec![
                    Box::new(HeapBuf::wrap(order, vec![0; 3])) as Box<dyn ByteBuf>,
                    Box::new(HeapBuf::wrap(order, vec![0; 5])) as Box<dyn ByteBuf>,
                ],
            )
            .unwrap();
            buf.set_u16(2, 0x0102).unwrap();
            assert_eq!(buf.get_u16(2).unwrap(), 0x0102);
            buf.set_u24(1, 0x0304_05).unwrap();
            assert_eq!(buf.get_u24(1).unwrap(), 0x0304_05);
            buf.set_u32(1, 0xAABB_CCDD).unwrap();
            assert_eq!(buf.get_u32(1).unwrap(), 0xAABB_CCDD);
            buf.set_u64(0, 0x1122_3344_5566_7788).unwrap();
            assert_eq!(buf.get_u64(0).unwrap(), 0x1122_3344_5566_7788);
        }
    }

    #[test]
    fn test_component_cache_survives_backward_access() {
        let buf = CompositeBuf::new(
            ByteOrder::Big,
            vec![component(&[1]), component(&[2]), component(&[3])],
        )
        .unwrap();
        assert_eq!(buf.get_u8(2).unwrap(), 3);
        assert_eq!(buf.get_u8(0).unwrap(), 1);
        assert_eq!(buf.get_u8(1).unwrap(), 2);
    }

    #[test]
    fn test_bulk_copy_spans_components() {
        let buf = sample();
        let mut dst = [0u8; 5];
        buf.get_bytes(0, &mut dst).unwrap();
        assert_eq!(dst, [1, 2, 3, 4, 5]);

        let mut buf = sample();
        buf.set_bytes(1, &[9, 9, 9]).unwrap();
        let mut dst = [0u8; 5];
        buf.get_bytes(0, &mut dst).unwrap();
        assert_eq!(dst, [1, 9, 9, 9, 5]);
    }

    #[test]
    fn test_nested_composites_are_spliced() {
        let inner = CompositeBuf::new(
            ByteOrder::Big,
            vec![component(&[1, 2]), component(&[3])],
        )
        .unwrap();
        let outer =
            CompositeBuf::new(ByteOrder::Big, vec![Box::new(inner), component(&[4])]).unwrap();
        // Splicing keeps lookup one level deep: 2 + 1 + 1 components.
        assert_eq!(outer.component_count(), 3);
        assert_eq!(outer.get_u32(0).unwrap(), 0x0102_0304);
    }

    #[test]
    fn test_rejects_mixed_orders() {
        let result = CompositeBuf::new(
            ByteOrder::Big,
            vec![
                component(&[1]),
                Box::new(HeapBuf::wrap(ByteOrder::Little, vec![2])),
            ],
        );
        assert!(matches!(result, Err(BufError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_unflattened_component() {
        let mut part = HeapBuf::wrap(ByteOrder::Big, vec![1, 2, 3]);
        part.set_reader_index(1).unwrap();
        let result = CompositeBuf::new(ByteOrder::Big, vec![Box::new(part)]);
        assert!(matches!(result, Err(BufError::InvalidInput(_))));
    }

    #[test]
    fn test_decompose_covers_range_zero_copy() {
        let buf = sample();
        let parts = buf.decompose(1, 3).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].readable_bytes(), 2);
        assert_eq!(parts[1].readable_bytes(), 1);
        assert_eq!(parts[0].get_u8(0).unwrap(), 2);
        assert_eq!(parts[1].get_u8(0).unwrap(), 4);
    }

    #[test]
    fn test_slice_across_boundary_is_composite_view() {
        let buf = sample();
        let mut view = buf.slice(2, 2).unwrap();
        assert_eq!(view.capacity(), 2);
        assert_eq!(view.get_u16(0).unwrap(), 0x0304);
        // Writes through the view land in the original components.
        view.set_u8(0, 0x7E).unwrap();
        assert_eq!(buf.get_u8(2).unwrap(), 0x7E);
    }

    #[test]
    fn test_discard_read_bytes_preserves_capacity() {
        let mut buf = sample();
        buf.set_reader_index(3).unwrap();
        buf.discard_read_bytes().unwrap();
        assert_eq!(buf.reader_index(), 0);
        assert_eq!(buf.writer_index(), 2);
        assert_eq!(buf.capacity(), 5);
        assert_eq!(buf.get_u8(0).unwrap(), 4);
        assert_eq!(buf.get_u8(1).unwrap(), 5);
        // The padding tail reads as zeros.
        assert_eq!(buf.get_u8(4).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_shares_components() {
        let buf = sample();
        let mut dup = buf.duplicate();
        dup.set_u8(0, 0xEE).unwrap();
        assert_eq!(buf.get_u8(0).unwrap(), 0xEE);
        assert_eq!(dup.capacity(), 5);
    }

    #[test]
    fn test_array_access_is_unsupported() {
        let buf = sample();
        assert!(matches!(buf.array(), Err(BufError::Unsupported(_))));
        assert!(matches!(buf.array_offset(), Err(BufError::Unsupported(_))));
    }

    #[test]
    fn test_chunk_at_stops_at_component_boundary() {
        let buf = sample();
        assert_eq!(&*buf.chunk_at(1).unwrap(), &[2, 3]);
        assert_eq!(&*buf.chunk_at(3).unwrap(), &[4, 5]);
    }
}
