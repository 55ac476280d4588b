//! Netbuf: zero-copy byte-buffer engine for network I/O.
//!
//! # Overview
//!
//! Netbuf is the buffer layer that a channel/pipeline network stack is built
//! on. Every byte received from or written to a socket, and every
//! intermediate decode/encode step in a protocol codec, flows through one of
//! the buffer kinds defined here. The engine provides cursor-managed access
//! to mutable byte storage, multiple backing strategies, and zero-copy views
//! that let sub-regions be handed between pipeline stages without copying.
//!
//! # Core Guarantees
//!
//! - **Cursor invariant**: `0 <= reader_index <= writer_index <= capacity`
//!   holds after every operation; violations are reported, never applied
//! - **Zero-copy views**: slices, duplicates, and composites alias storage;
//!   no buffer content is copied unless an operation says "copy"
//! - **Explicit errors**: bounds, read-only, and unsupported-operation
//!   failures are synchronous `Result` values, not panics
//! - **Single-owner discipline**: no internal locking; a buffer is mutated
//!   by exactly one logical owner at a time
//!
//! # Module Structure
//!
//! - [`buf`]: The [`ByteBuf`] trait and every buffer kind (heap, dynamic,
//!   composite, and the derived views)
//! - [`factory`]: Construction helpers plus equality, ordering, hashing,
//!   search, and hex-dump utilities
//! - [`finder`]: Byte predicates used by the search operations
//! - [`order`]: Byte-order selection and endian-swap helpers
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```
//! use netbuf::{factory, ByteBuf, ByteOrder};
//!
//! let mut buf = factory::dynamic_buffer(ByteOrder::Big, 16);
//! buf.write_u32(0x0102_0304).unwrap();
//! assert_eq!(buf.readable_bytes(), 4);
//! assert_eq!(buf.read_u32().unwrap(), 0x0102_0304);
//! assert_eq!(buf.readable_bytes(), 0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod buf;
pub mod error;
pub mod factory;
pub mod finder;
pub mod order;
pub mod test_utils;

// Re-exports for convenient access to core types
pub use buf::{
    ByteBuf, CompositeBuf, Cursor, DuplicatedBuf, DynamicBuf, HeapBuf, ReadOnlyBuf, SlicedBuf,
    TruncatedBuf,
};
pub use error::{BufError, Result};
pub use finder::{Finder, IndexFinder};
pub use order::ByteOrder;
