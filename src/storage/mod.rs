//! This module contains the storage layer: paged database files, the slotted-page tuple store,
//! the tuple codec, and the heap tuple file that strings them together.
//!
//! The layering, bottom to top:
//!
//! - [`dbfile`](dbfile/index.html) provides page-level access to a data file.
//! - [`file_manager`](file_manager/index.html) loads and saves individual pages, pinning them
//!   on behalf of the caller. This is the page-cache boundary of the engine; everything above
//!   it sees only in-memory pages.
//! - [`dbpage`](dbpage/index.html) manages the slotted layout inside one page: a slot
//!   directory growing from the low end and a tuple heap packed downward from the high end.
//! - [`page_tuple`](page_tuple/index.html) decodes and encodes typed column values at an
//!   offset within a page.
//! - [`tuple_files`](tuple_files/index.html) implements heap tuple files and the cursor that
//!   plan nodes pull tuples from.

pub mod dbfile;
pub mod dbpage;
pub mod file_manager;
pub mod header_page;
pub mod page_tuple;
pub mod tuple_files;
pub mod tuple_literal;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

pub use self::dbfile::{DBFile, DBFileInfo, DBFileType};
pub use self::dbpage::DBPage;
pub use self::page_tuple::PageTuple;
pub use self::tuple_literal::TupleLiteral;

use std::io;

use ::expressions::Literal;

#[derive(Debug, Copy, Clone, PartialEq)]
/// An error that may occur while pinning or unpinning a page in some file.
pub enum PinError {
    /// A caller attempted to unpin a `Pinnable` object, but the pin count was not positive;
    /// i.e. the page had not been pinned in the first place.
    PinCountNotPositive(u32),
}

impl ::std::fmt::Display for PinError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            PinError::PinCountNotPositive(count) => {
                write!(f, "pinCount is not positive (value is {})", count)
            }
        }
    }
}

/// This interface provides the basic "pin" and "unpin" operations that pinnable objects need
/// to provide. An object's pin-count is simply a reference count, but with a shorter name so
/// it's easier to type!
///
/// Currently, tuples and data pages are pinnable.
pub trait Pinnable {
    /// Increase the pin-count on the object by one. An object with a nonzero pin-count cannot
    /// be released because it is in use.
    fn pin(&mut self);

    /// Decrease the pin-count on the object by one. When the pin-count reaches zero, the
    /// object can be released.
    fn unpin(&mut self) -> Result<(), PinError>;

    /// Returns the total number of times the object has been pinned.
    fn get_pin_count(&self) -> u32;

    /// Returns true if the object is currently pinned, false otherwise.
    fn is_pinned(&self) -> bool {
        self.get_pin_count() > 0
    }
}

/// This interface provides additional writing operations for string values of the various
/// character column types.
pub trait WriteMiniDBExt: WriteBytesExt {
    /// Write a string to the output, assuming that it is a VARCHAR that fits in 255 bytes
    /// (i.e. the length can be represented in one byte).
    ///
    /// # Arguments
    /// * string - The string to write.
    ///
    /// # Errors
    /// This will fail if writing the length or the bytes in the string themselves fail.
    fn write_varchar255<S>(&mut self, string: S) -> io::Result<()>
        where S: Into<String>
    {
        let bytes = string.into().into_bytes();

        try!(self.write_u8(bytes.len() as u8));
        try!(self.write(&bytes));
        Ok(())
    }

    /// Write a string to the output, assuming that it is a VARCHAR that fits in 65535 bytes
    /// (i.e. the length can be represented in a short).
    ///
    /// # Arguments
    /// * string - The string to write.
    ///
    /// # Errors
    /// This will fail if writing the length or the bytes in the string themselves fail.
    fn write_varchar65535<S>(&mut self, string: S) -> io::Result<()>
        where S: Into<String>
    {
        let bytes = string.into().into_bytes();

        try!(self.write_u16::<BigEndian>(bytes.len() as u16));
        try!(self.write(&bytes));
        Ok(())
    }

    /// This method stores a string whose length is fixed at a constant size. The string is
    /// expected to be in US-ASCII encoding, so multibyte characters are not supported.
    ///
    /// The string's characters are stored starting with the specified position. If the string
    /// is shorter than the fixed length then the data is padded with `\\u0000` (i.e. `NUL`)
    /// values. If the string is exactly the given length then no string terminator is stored.
    /// **The implication of this storage format is that embedded `NUL` characters are not
    /// allowed with this storage format.**
    ///
    /// # Arguments
    /// * string - The string to write.
    /// * length - The number of bytes used to store the string field.
    ///
    /// # Errors
    /// This will fail if writing the bytes in the string themselves fails.
    fn write_fixed_size_string<S>(&mut self, string: S, length: u16) -> io::Result<()>
        where S: Into<String>
    {
        let string = string.into();
        let str_len = string.len();
        let bytes = string.into_bytes();

        try!(self.write(&bytes));
        if (str_len as u16) < length {
            let remaining_bytes = length as usize - str_len;
            try!(self.write(&vec![0u8; remaining_bytes]));
        }
        Ok(())
    }
}

impl<W: io::Write + ?Sized> WriteMiniDBExt for W {}

/// This interface provides additional reading operations for string values of the various
/// character column types.
pub trait ReadMiniDBExt: ReadBytesExt {
    /// Read a string from the input, assuming that it is a VARCHAR that fits in 255 bytes
    /// (i.e. the length can be represented in one byte).
    ///
    /// # Errors
    /// This will fail if reading the length or the bytes in the string themselves fail.
    fn read_varchar255(&mut self) -> io::Result<String> {
        let len = try!(self.read_u8()) as usize;
        let mut buf = vec![0u8; len];
        try!(self.read_exact(&mut buf));

        String::from_utf8(buf).map_err(|_| io::ErrorKind::Other.into())
    }

    /// Read a string from the input, assuming that it is a VARCHAR that fits in 65535 bytes
    /// (i.e. the length can be represented in a short).
    ///
    /// # Errors
    /// This will fail if reading the length or the bytes in the string themselves fail.
    fn read_varchar65535(&mut self) -> io::Result<String> {
        let len = try!(self.read_u16::<BigEndian>()) as usize;
        let mut buf = vec![0u8; len];
        try!(self.read_exact(&mut buf));

        String::from_utf8(buf).map_err(|_| io::ErrorKind::Other.into())
    }

    /// This method reads a string whose length is fixed at a constant size. The string is
    /// expected to be in US-ASCII encoding, so multibyte characters are not supported. Any
    /// `NUL` padding is removed from the result.
    ///
    /// # Arguments
    /// * len - The number of bytes used to store the string field.
    ///
    /// # Errors
    /// This will fail if reading the bytes in the string themselves fails.
    fn read_fixed_size_string(&mut self, len: u16) -> io::Result<String> {
        let mut buf = vec![0u8; len as usize];
        try!(self.read_exact(&mut buf));

        let mut actual_length = len as usize;
        for (i, byte) in buf.iter().enumerate() {
            if *byte == 0u8 {
                actual_length = i as usize;
                break;
            }
        }

        String::from_utf8((&buf[0..actual_length]).into()).map_err(|_| io::ErrorKind::Other.into())
    }
}

impl<R: io::Read + ?Sized> ReadMiniDBExt for R {}

/// Errors that can occur while handling a tuple.
#[derive(Clone, Debug, PartialEq)]
pub enum TupleError {
    /// For when an IO error occurs.
    IOError,
    /// For when a pinning error occurs.
    PinError(PinError),
    /// For when a file manager error occurs.
    FileManagerError(file_manager::Error),
    /// For when a DBPage error occurs.
    DBPageError(dbpage::Error),
    /// For when a column type is not supported for storage.
    UnsupportedColumnType,
    /// For when the column index provided is out of range. In the form of (index, column
    /// count).
    InvalidColumnIndex(usize, usize),
    /// The tuple size is too large for the page. In the form of (tuple size, page size).
    TupleTooBig(u16, u32),
}

impl ::std::fmt::Display for TupleError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            TupleError::IOError => write!(f, "an IO error occurred"),
            TupleError::PinError(ref e) => write!(f, "{}", e),
            TupleError::FileManagerError(ref e) => write!(f, "{}", e),
            TupleError::DBPageError(ref e) => write!(f, "{}", e),
            TupleError::UnsupportedColumnType => {
                write!(f, "the column type is not supported for storage")
            }
            TupleError::InvalidColumnIndex(index, count) => {
                write!(f, "valid column indexes are in range [0, {}). Got {}.", count, index)
            }
            TupleError::TupleTooBig(tuple_size, page_size) => {
                write!(f,
                       "the tuple is {} bytes, which does not fit in a page of {} bytes",
                       tuple_size,
                       page_size)
            }
        }
    }
}

impl From<io::Error> for TupleError {
    fn from(_: io::Error) -> Self {
        TupleError::IOError
    }
}

impl From<file_manager::Error> for TupleError {
    fn from(error: file_manager::Error) -> Self {
        TupleError::FileManagerError(error)
    }
}

impl From<dbpage::Error> for TupleError {
    fn from(error: dbpage::Error) -> Self {
        TupleError::DBPageError(error)
    }
}

impl From<PinError> for TupleError {
    fn from(error: PinError) -> Self {
        TupleError::PinError(error)
    }
}

/// This interface provides the operations that can be performed with a tuple. In relational
/// database theory, a tuple is an ordered set of attribute-value pairs, but in this
/// implementation the tuple's data and its schema are kept completely separate. This tuple
/// interface simply provides an index-accessed collection of values; the schema is represented
/// separately using the `Schema` class.
///
/// Different implementations of this interface store their data in different places. Some
/// tuple implementations (e.g. `PageTuple`) load and store values straight out of a tuple
/// file, and thus their data is backed by a buffer page that can be written back to the
/// filesystem. Other tuples may exist entirely in memory, with no corresponding back-end
/// storage.
pub trait Tuple: Pinnable {
    /// Returns true if this tuple is backed by a disk page that must be kept in memory as long
    /// as the tuple is in use. In cases where a plan-node needs to hold onto a tuple for a
    /// long time (e.g. for sorting or grouping), the plan node should make a copy of
    /// disk-backed tuples, or materialize the results.
    fn is_disk_backed(&self) -> bool;

    /// Determine if the column at index `col_index` is `NULL`.
    ///
    /// # Arguments
    /// * col_index - The index of the column to check
    fn is_null_value(&self, col_index: usize) -> Result<bool, TupleError>;

    /// Returns a count of the number of columns in the tuple.
    fn get_column_count(&self) -> usize;

    /// Returns the value of a column.
    ///
    /// # Arguments
    /// * col_index - The index of the column
    fn get_column_value(&mut self, col_index: usize) -> Result<Literal, TupleError>;
}
