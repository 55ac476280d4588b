//! Construction helpers and buffer utilities.
//!
//! The functions here are the front door of the engine: codecs and
//! transports obtain buffers from the constructors and use the equality,
//! ordering, hashing, and hex-dump helpers, all of which are defined
//! purely in terms of the public [`ByteBuf`] contract.

use std::cmp::Ordering;

use crate::buf::{ByteBuf, CompositeBuf, DynamicBuf, HeapBuf, ReadOnlyBuf};
use crate::error::{check_range, BufError, Result};
use crate::order::{swap_u32, swap_u64, ByteOrder};

/// Allocates a zero-filled fixed-capacity buffer with both cursors at 0.
#[must_use]
pub fn buffer(order: ByteOrder, capacity: usize) -> HeapBuf {
    HeapBuf::new(order, capacity)
}

/// Creates a growable buffer whose initial capacity is `estimated_length`.
///
/// A good estimate avoids both reallocation and wasted space; the buffer
/// grows as needed either way.
#[must_use]
pub fn dynamic_buffer(order: ByteOrder, estimated_length: usize) -> DynamicBuf {
    DynamicBuf::new(order, estimated_length)
}

/// Takes over `bytes` as a fully readable buffer without copying.
#[must_use]
pub fn wrapped_buffer(order: ByteOrder, bytes: Vec<u8>) -> HeapBuf {
    HeapBuf::wrap(order, bytes)
}

/// Wraps several arrays as one logically contiguous buffer without
/// copying.
///
/// Empty arrays are skipped. A single remaining array is wrapped directly;
/// more than one produces a composite.
pub fn wrapped_buffers(order: ByteOrder, parts: Vec<Vec<u8>>) -> Result<Box<dyn ByteBuf>> {
    let mut non_empty: Vec<Vec<u8>> = parts.into_iter().filter(|p| !p.is_empty()).collect();
    match non_empty.len() {
        0 => Ok(Box::new(empty_buffer())),
        1 => Ok(Box::new(wrapped_buffer(order, non_empty.swap_remove(0)))),
        _ => composite_buffer(
            order,
            non_empty
                .into_iter()
                .map(|bytes| Box::new(HeapBuf::wrap(order, bytes)) as Box<dyn ByteBuf>)
                .collect(),
        ),
    }
}

/// Deep-copies `bytes` into a fully readable buffer.
#[must_use]
pub fn copied_buffer(order: ByteOrder, bytes: &[u8]) -> HeapBuf {
    HeapBuf::wrap(order, bytes.to_vec())
}

/// Deep-copies several arrays into one contiguous fully readable buffer.
#[must_use]
pub fn copied_buffers(order: ByteOrder, parts: &[&[u8]]) -> HeapBuf {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut data = Vec::with_capacity(total);
    for part in parts {
        data.extend_from_slice(part);
    }
    HeapBuf::wrap(order, data)
}

/// Combines the readable regions of `parts` into one buffer without
/// copying.
///
/// Unreadable parts are skipped, composites are flattened into their
/// components, and a single remaining readable part is returned as a plain
/// view rather than a one-element composite. Every readable part must
/// share `order`.
pub fn composite_buffer(
    order: ByteOrder,
    parts: Vec<Box<dyn ByteBuf>>,
) -> Result<Box<dyn ByteBuf>> {
    let mut slices: Vec<Box<dyn ByteBuf>> = Vec::new();
    for part in parts {
        if !part.is_readable() {
            continue;
        }
        if part.order() != order {
            return Err(BufError::InvalidInput(format!(
                "cannot combine byte order {:?} with {order:?}",
                part.order()
            )));
        }
        slices.extend(part.decompose(part.reader_index(), part.readable_bytes())?);
    }
    match slices.len() {
        0 => Ok(Box::new(empty_buffer())),
        1 => Ok(slices.swap_remove(0)),
        _ => Ok(Box::new(CompositeBuf::new(order, slices)?)),
    }
}

/// The canonical empty buffer: zero capacity, nothing allocated.
#[must_use]
pub fn empty_buffer() -> HeapBuf {
    HeapBuf::new(ByteOrder::Big, 0)
}

/// Wraps `buf` so every mutating operation fails.
///
/// A buffer that is already read-only is returned unchanged; read-only
/// layers never stack.
#[must_use]
pub fn read_only(buf: Box<dyn ByteBuf>) -> Box<dyn ByteBuf> {
    if buf.is_read_only() {
        buf
    } else {
        Box::new(ReadOnlyBuf::new(buf))
    }
}

/// Content equality over the readable regions.
///
/// Two buffers are equal iff their readable byte counts match and every
/// corresponding readable byte matches; cursor positions themselves are
/// not compared. Compares eight bytes at a time, swapping one side's words
/// when the byte orders differ, then finishes byte-wise.
#[must_use]
pub fn equals(a: &dyn ByteBuf, b: &dyn ByteBuf) -> bool {
    let len = a.readable_bytes();
    if len != b.readable_bytes() {
        return false;
    }
    let same_order = a.order() == b.order();
    let mut ai = a.reader_index();
    let mut bi = b.reader_index();
    for _ in 0..len >> 3 {
        let (Ok(va), Ok(vb)) = (a.get_u64(ai), b.get_u64(bi)) else {
            return false;
        };
        let vb = if same_order { vb } else { swap_u64(vb) };
        if va != vb {
            return false;
        }
        ai += 8;
        bi += 8;
    }
    for _ in 0..len & 7 {
        let (Ok(va), Ok(vb)) = (a.get_u8(ai), b.get_u8(bi)) else {
            return false;
        };
        if va != vb {
            return false;
        }
        ai += 1;
        bi += 1;
    }
    true
}

/// Lexicographic comparison over the readable regions.
///
/// Compares 32-bit words at a time while both buffers share a byte order,
/// byte-wise otherwise; when all compared bytes are equal the shorter
/// readable region sorts first.
#[must_use]
pub fn compare(a: &dyn ByteBuf, b: &dyn ByteBuf) -> Ordering {
    let a_len = a.readable_bytes();
    let b_len = b.readable_bytes();
    let min_len = a_len.min(b_len);
    let (word_count, byte_count) = if a.order() == b.order() {
        (min_len >> 2, min_len & 3)
    } else {
        (0, min_len)
    };
    let little = a.order() == ByteOrder::Little;
    let mut ai = a.reader_index();
    let mut bi = b.reader_index();
    for _ in 0..word_count {
        let (Ok(mut va), Ok(mut vb)) = (a.get_u32(ai), b.get_u32(bi)) else {
            return Ordering::Equal;
        };
        if little {
            va = swap_u32(va);
            vb = swap_u32(vb);
        }
        if va != vb {
            return va.cmp(&vb);
        }
        ai += 4;
        bi += 4;
    }
    for _ in 0..byte_count {
        let (Ok(va), Ok(vb)) = (a.get_u8(ai), b.get_u8(bi)) else {
            return Ordering::Equal;
        };
        if va != vb {
            return va.cmp(&vb);
        }
        ai += 1;
        bi += 1;
    }
    a_len.cmp(&b_len)
}

/// Order-independent content hash of the readable region.
///
/// Polynomial hash with multiplier 31 over 32-bit words then trailing
/// bytes, normalized so it never yields 0. Buffers that are [`equals`]
/// hash identically regardless of byte order.
#[must_use]
pub fn hash_code(buf: &dyn ByteBuf) -> u32 {
    let len = buf.readable_bytes();
    let big = buf.order() == ByteOrder::Big;
    let mut hash: u32 = 1;
    let mut index = buf.reader_index();
    for _ in 0..len >> 2 {
        let word = buf.get_u32(index).unwrap_or(0);
        let word = if big { word } else { swap_u32(word) };
        hash = hash.wrapping_mul(31).wrapping_add(word);
        index += 4;
    }
    for _ in 0..len & 3 {
        let byte = buf.get_u8(index).unwrap_or(0);
        hash = hash
            .wrapping_mul(31)
            .wrapping_add(i32::from(byte as i8) as u32);
        index += 1;
    }
    if hash == 0 {
        1
    } else {
        hash
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

const fn build_hex_table() -> [[u8; 2]; 256] {
    let mut table = [[0u8; 2]; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = [HEX_DIGITS[i >> 4], HEX_DIGITS[i & 0xF]];
        i += 1;
    }
    table
}

static HEX_TABLE: [[u8; 2]; 256] = build_hex_table();

/// Renders the readable region as lowercase hex pairs.
#[must_use]
pub fn hex_dump(buf: &dyn ByteBuf) -> String {
    hex_dump_at(buf, buf.reader_index(), buf.readable_bytes()).unwrap_or_default()
}

/// Renders `[index, index + length)` as lowercase hex pairs.
pub fn hex_dump_at(buf: &dyn ByteBuf, index: usize, length: usize) -> Result<String> {
    check_range(index, length, buf.capacity())?;
    let mut out = String::with_capacity(length * 2);
    for i in index..index + length {
        let pair = HEX_TABLE[buf.get_u8(i)? as usize];
        out.push(pair[0] as char);
        out.push(pair[1] as char);
    }
    Ok(out)
}
