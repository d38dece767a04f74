#![deny(missing_docs)]
//! MiniDB is a small relational database engine core, suitable for use in courses about
//! relational database implementation. It provides the two subsystems where most of the real
//! engineering lives: a slotted-page tuple store that lays tuples out inside fixed-size pages
//! of a heap file, and a pull-based query execution core that composes physical relational
//! operators and streams tuples through them.
//!
//! SQL parsing, command dispatch, transactions, and the user-facing shell are deliberately not
//! part of this crate; it consumes pages from a simple paged-file layer and exposes plan nodes
//! to whatever front end drives them.

extern crate byteorder;
#[cfg_attr(test, macro_use)]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate tempdir;

pub mod expressions;
pub mod queries;
pub mod relations;
pub mod storage;

pub use relations::{Schema, SchemaError, ColumnInfo, ColumnName, ColumnType};
