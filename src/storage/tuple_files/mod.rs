//! This module contains utilities and classes for tuple files: files of pages that hold
//! tuples, along with the cursors that iterate over them.

pub mod heap_tuple_file;

pub use self::heap_tuple_file::{HeapFilePageTuple, HeapTupleFile};
