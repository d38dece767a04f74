//! This module describes the layout of the first page of a tuple file, the header page.
//!
//! Heap tuple-file header pages are laid out as follows:
//!
//! 1. As with all `DBFile`s, the first two bytes are the file type and the encoded page size.
//! 2. Next the table's schema is recorded, starting at
//!    [`OFFSET_SCHEMA_START`](constant.OFFSET_SCHEMA_START.html). See
//!    [`Schema`](../../relations/schema/index.html) for how a table's schema is stored.
//!
//! Usually only a few hundred bytes are required for storing the details of most tables, so
//! the header easily fits in one page.

/// The offset in the header page where the table schema starts. The bytes between the file
/// header and this offset are reserved.
pub const OFFSET_SCHEMA_START: usize = 6;
