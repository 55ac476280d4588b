//! Byte predicates for the search operations.

use crate::buf::ByteBuf;
use crate::error::{check_range, Result};

/// Tests whether the byte at a position satisfies a search criterion.
///
/// Implemented by the canned [`Finder`] criteria; ad-hoc predicates go
/// through the [`FinderFn`] adapter:
///
/// ```
/// use netbuf::finder::{index_of, FinderFn};
/// use netbuf::{factory, ByteBuf, ByteOrder};
///
/// let buf = factory::copied_buffer(ByteOrder::Big, b"ab:cd");
/// let colon = FinderFn(|b: &dyn ByteBuf, i: usize| matches!(b.get_u8(i), Ok(b':')));
/// assert_eq!(index_of(&buf, 0, 5, &colon), Some(2));
/// ```
pub trait IndexFinder {
    /// Returns true when the byte at `guessed_index` matches.
    ///
    /// An index outside the buffer never matches.
    fn find(&self, buf: &dyn ByteBuf, guessed_index: usize) -> bool;
}

/// Adapter that lets a closure act as an [`IndexFinder`].
pub struct FinderFn<F>(pub F);

impl<F> IndexFinder for FinderFn<F>
where
    F: Fn(&dyn ByteBuf, usize) -> bool,
{
    fn find(&self, buf: &dyn ByteBuf, guessed_index: usize) -> bool {
        (self.0)(buf, guessed_index)
    }
}

/// Canned structural criteria used by line- and header-oriented codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finder {
    /// Matches a NUL byte (`0x00`).
    Nul,
    /// Matches anything but a NUL byte.
    NotNul,
    /// Matches a carriage return (`\r`).
    Cr,
    /// Matches anything but a carriage return.
    NotCr,
    /// Matches a line feed (`\n`).
    Lf,
    /// Matches anything but a line feed.
    NotLf,
    /// Matches a carriage return or a line feed.
    CrLf,
    /// Matches anything but a carriage return or a line feed.
    NotCrLf,
    /// Matches a space or a horizontal tab.
    LinearWhitespace,
    /// Matches anything but a space or a horizontal tab.
    NotLinearWhitespace,
}

impl IndexFinder for Finder {
    fn find(&self, buf: &dyn ByteBuf, guessed_index: usize) -> bool {
        let Ok(byte) = buf.get_u8(guessed_index) else {
            return false;
        };
        match self {
            Self::Nul => byte == 0,
            Self::NotNul => byte != 0,
            Self::Cr => byte == b'\r',
            Self::NotCr => byte != b'\r',
            Self::Lf => byte == b'\n',
            Self::NotLf => byte != b'\n',
            Self::CrLf => byte == b'\r' || byte == b'\n',
            Self::NotCrLf => byte != b'\r' && byte != b'\n',
            Self::LinearWhitespace => byte == b' ' || byte == b'\t',
            Self::NotLinearWhitespace => byte != b' ' && byte != b'\t',
        }
    }
}

/// Finds the first index in `[from, to)` accepted by `finder`, scanning
/// forward when `from <= to` and backward from `min(from, capacity)` down
/// to `to` otherwise. Returns the absolute index.
pub fn index_of(
    buf: &dyn ByteBuf,
    from: usize,
    to: usize,
    finder: &dyn IndexFinder,
) -> Option<usize> {
    if from <= to {
        let end = to.min(buf.capacity());
        (from..end).find(|&i| finder.find(buf, i))
    } else {
        let start = from.min(buf.capacity());
        (to..start).rev().find(|&i| finder.find(buf, i))
    }
}

/// Number of readable bytes before the first match of `finder` in the
/// readable region.
pub fn bytes_before(buf: &dyn ByteBuf, finder: &dyn IndexFinder) -> Option<usize> {
    let reader = buf.reader_index();
    index_of(buf, reader, buf.writer_index(), finder).map(|i| i - reader)
}

/// Number of bytes before the first match of `finder` within
/// `[index, index + length)`.
pub fn bytes_before_in(
    buf: &dyn ByteBuf,
    index: usize,
    length: usize,
    finder: &dyn IndexFinder,
) -> Result<Option<usize>> {
    check_range(index, length, buf.capacity())?;
    Ok(index_of(buf, index, index + length, finder).map(|i| i - index))
}
