//! Buffer kinds and the trait they share.
//!
//! # Overview
//!
//! This module provides:
//! - [`ByteBuf`]: The single interface over every buffer kind
//! - [`HeapBuf`]: Fixed-capacity contiguous buffer
//! - [`DynamicBuf`]: Growable buffer that reallocates on demand
//! - [`CompositeBuf`]: Zero-copy concatenation of component buffers
//! - [`SlicedBuf`], [`TruncatedBuf`], [`DuplicatedBuf`]: Windowed and
//!   whole-capacity aliasing views
//! - [`ReadOnlyBuf`]: Wrapper that rejects mutation
//!
//! # Design Notes
//!
//! Backing storage is a single-threaded reference-counted cell shared
//! between a buffer and its views, so mutation through any handle is
//! visible through all of them. No unsafe code is involved; aliasing goes
//! through interior mutability, and the single-owner discipline of the
//! engine keeps borrows short-lived.

mod byte_buf;
mod composite;
mod cursor;
mod duplicated;
mod dynamic;
mod heap;
mod read_only;
mod sliced;
mod storage;
mod truncated;

pub use byte_buf::ByteBuf;
pub use composite::CompositeBuf;
pub use cursor::Cursor;
pub use duplicated::DuplicatedBuf;
pub use dynamic::DynamicBuf;
pub use heap::HeapBuf;
pub use read_only::ReadOnlyBuf;
pub use sliced::SlicedBuf;
pub use truncated::TruncatedBuf;
