//! A module which stores utilities for a basic page tuple: the codec that maps typed column
//! values to and from bytes at an offset within a page.

use byteorder::{BigEndian, ReadBytesExt};

use std::io::{Seek, SeekFrom};
use super::{DBPage, PinError, Pinnable, ReadMiniDBExt, Tuple, TupleError};
use ::relations::{ColumnType, Schema};
use ::expressions::Literal;

/// This value is used for a cached value offset when the column value is set to `NULL`.
pub const NULL_OFFSET: u16 = 0;

/// This helper function takes a tuple (from an arbitrary source) and computes how much space
/// it would require to be stored in a heap table file with the specified schema. This is used
/// to insert new tuples into a table file by computing how much space will be needed, so that
/// an appropriate page can be found.
///
/// # Arguments
/// * schema - the schema of the table the tuple is headed for
/// * tuple - the tuple itself
///
/// # Errors
/// Fails when a column's value cannot be read, or when a column's type is not storeable.
pub fn get_tuple_storage_size<T: Tuple + ?Sized>(schema: &Schema,
                                                 tuple: &mut T)
                                                 -> Result<u16, TupleError> {
    let mut storage_size = get_null_flags_size(schema.num_columns());
    for (col_idx, col_info) in schema.iter().enumerate() {
        let value = try!(tuple.get_column_value(col_idx));
        if value != Literal::Null {
            let data_length = match col_info.column_type {
                ColumnType::VarChar { length: _ } => value.as_string().unwrap().len(),
                _ => 0,
            };
            storage_size += try!(get_storage_size(col_info.column_type, data_length as u16));
        }
    }

    Ok(storage_size)
}

/// This method computes and returns the number of bytes that are used to store the null-flags
/// in each tuple.
///
/// # Arguments
/// * num_cols - the total number of columns in the table.
pub fn get_null_flags_size(num_cols: usize) -> u16 {
    if num_cols > 0 {
        1 + (num_cols as u16 - 1) / 8
    } else {
        0
    }
}

/// Returns the storage size of a particular column's (non-`NULL`) value, in bytes. The length
/// of the value is required in cases where the column value can be variable size, such as if
/// the type is a `VARCHAR`. Note that the data-length is actually *not* required when the type
/// is `CHAR`, since `CHAR` fields always have a specific size.
///
/// # Arguments
/// * col_type - The column's data type.
/// * data_length - for column-types that specify a length, this is the length value.
///
/// # Errors
/// Fails with `UnsupportedColumnType` for types the storage format cannot hold.
pub fn get_storage_size(col_type: ColumnType, data_length: u16) -> Result<u16, TupleError> {
    match col_type {
        ColumnType::Integer | ColumnType::Float => Ok(4),
        ColumnType::SmallInt => Ok(2),
        ColumnType::BigInt | ColumnType::Double => Ok(8),
        ColumnType::TinyInt => Ok(1),
        // CHAR values are of a fixed size, but the size is specified in the length field and
        // there is no other storage required.
        ColumnType::Char { length } => Ok(length),
        // VARCHAR values are of a variable size, but there is always a two byte length
        // specified at the start of the value.
        ColumnType::VarChar { length: _ } => Ok(2 + data_length),
        // Unsupported types have no size.
        _ => Err(TupleError::UnsupportedColumnType),
    }
}

/// This class implements the [`Tuple`](../trait.Tuple.html) interface by reading tuple data
/// out of a [`DBPage`](../dbpage/struct.DBPage.html) object. This can be used to read tuples
/// in a table file, keys in an index file, etc.
///
/// Each tuple is stored in a layout like this:
///
/// * The first one or more bytes are dedicated to a `NULL`-bitmap, which records columns that
///   are currently `NULL`.
/// * The remaining bytes are dedicated to storing the non-`NULL` values for the columns in
///   the tuple, in schema order.
///
/// The tuple caches the offset of each column value when it is constructed, so column reads
/// are cheap; any operation that would change a value's size requires page-level data
/// management above this class.
pub struct PageTuple {
    db_page: DBPage,
    page_offset: u16,
    schema: Schema,
    value_offsets: Vec<u16>,
    pin_count: u32,
}

impl PageTuple {
    /// Construct a new tuple object that is backed by the data in the database page. This
    /// tuple can be read from.
    ///
    /// # Arguments
    /// * db_page - the specific database page that holds the tuple
    /// * page_offset - the offset of the tuple's actual data in the page
    /// * schema - the details of the columns that appear within the tuple
    pub fn new(db_page: DBPage, page_offset: u16, schema: Schema) -> Result<PageTuple, TupleError> {
        let value_offsets = vec![0; schema.num_columns()];
        let mut result = PageTuple {
            db_page: db_page,
            page_offset: page_offset,
            schema: schema,
            value_offsets: value_offsets,
            pin_count: 0,
        };
        try!(result.compute_value_offsets());
        Ok(result)
    }

    /// The number of the page this tuple is stored in.
    pub fn get_page_no(&self) -> u32 {
        self.db_page.page_no
    }

    fn check_column_index(&self, col_index: usize) -> Result<(), TupleError> {
        if col_index < self.schema.num_columns() {
            Ok(())
        } else {
            Err(TupleError::InvalidColumnIndex(col_index, self.schema.num_columns()))
        }
    }

    fn get_column_value_size(&mut self, col_type: ColumnType, offset: u16) -> Result<u16, TupleError> {
        let data_length = match col_type {
            ColumnType::VarChar { length: _ } => {
                // The storage size depends on the size of the data value being stored. In
                // this case, read out the data length.
                try!(self.db_page.seek(SeekFrom::Start(offset as u64)));
                try!(self.db_page.read_u16::<BigEndian>())
            }
            _ => 0,
        };
        get_storage_size(col_type, data_length)
    }

    /// Returns the offset where the tuple's data actually starts. This is past the bytes used
    /// to store NULL-flags.
    fn get_data_start_offset(&self) -> u16 {
        let null_flag_bytes = get_null_flags_size(self.schema.num_columns());
        self.page_offset + null_flag_bytes
    }

    /// This is a helper function to find out the current value of a column's `NULL` flag. It
    /// is not intended to be used to determine if a column's value is `NULL` after
    /// construction; the cached value offsets already record that.
    ///
    /// # Arguments
    /// * col_index - The index of the column to retrieve the null-flag for
    fn check_if_column_null(&mut self, col_index: usize) -> Result<bool, TupleError> {
        try!(self.check_column_index(col_index));

        let col_index = col_index as u16;

        // Skip to the byte that contains the NULL-flag for this specific column.
        let null_flag_offset = self.page_offset + (col_index / 8);

        try!(self.db_page.seek(SeekFrom::Start(null_flag_offset as u64)));
        let mut null_flag = try!(self.db_page.read_u8());
        null_flag = null_flag >> (col_index % 8);

        Ok((null_flag & 0x01) != 0)
    }

    /// This helper function computes and caches the offset of each column value in the tuple.
    /// If a column has a `NULL` value then [`NULL_OFFSET`](constant.NULL_OFFSET.html) is used
    /// for the offset.
    fn compute_value_offsets(&mut self) -> Result<(), TupleError> {
        let mut value_offset = self.get_data_start_offset();

        for i in 0..self.schema.num_columns() {
            if try!(self.check_if_column_null(i)) {
                self.value_offsets[i] = NULL_OFFSET;
            } else {
                self.value_offsets[i] = value_offset;

                let col_type = self.schema[i].column_type;
                value_offset += try!(self.get_column_value_size(col_type, value_offset));
            }
        }

        Ok(())
    }
}

impl Pinnable for PageTuple {
    fn pin(&mut self) {
        self.db_page.pin();
        self.pin_count += 1;
    }

    fn unpin(&mut self) -> Result<(), PinError> {
        if self.pin_count == 0 {
            Err(PinError::PinCountNotPositive(self.pin_count))
        } else {
            self.pin_count -= 1;
            self.db_page.unpin()
        }
    }

    fn get_pin_count(&self) -> u32 {
        self.pin_count
    }
}

impl Tuple for PageTuple {
    fn is_disk_backed(&self) -> bool {
        true
    }

    fn is_null_value(&self, col_index: usize) -> Result<bool, TupleError> {
        try!(self.check_column_index(col_index));

        Ok(self.value_offsets[col_index] == NULL_OFFSET)
    }

    fn get_column_count(&self) -> usize {
        self.schema.num_columns()
    }

    fn get_column_value(&mut self, col_index: usize) -> Result<Literal, TupleError> {
        try!(self.check_column_index(col_index));

        let offset = self.value_offsets[col_index];
        if offset == NULL_OFFSET {
            return Ok(Literal::Null);
        }

        let col_type = self.schema[col_index].column_type;
        try!(self.db_page.seek(SeekFrom::Start(offset as u64)));

        match col_type {
            ColumnType::TinyInt => {
                let value = try!(self.db_page.read_i8());
                Ok(Literal::Int(value as i32))
            }
            ColumnType::SmallInt => {
                let value = try!(self.db_page.read_i16::<BigEndian>());
                Ok(Literal::Int(value as i32))
            }
            ColumnType::Integer => {
                let value = try!(self.db_page.read_i32::<BigEndian>());
                Ok(Literal::Int(value))
            }
            ColumnType::BigInt => {
                let value = try!(self.db_page.read_i64::<BigEndian>());
                Ok(Literal::Long(value))
            }
            ColumnType::Float => {
                let value = try!(self.db_page.read_f32::<BigEndian>());
                Ok(Literal::Float(value))
            }
            ColumnType::Double => {
                let value = try!(self.db_page.read_f64::<BigEndian>());
                Ok(Literal::Double(value))
            }
            ColumnType::Char { length } => {
                let value = try!(self.db_page.read_fixed_size_string(length));
                Ok(Literal::String(value))
            }
            ColumnType::VarChar { length: _ } => {
                let value = try!(self.db_page.read_varchar65535());
                Ok(Literal::String(value))
            }
            _ => Err(TupleError::UnsupportedColumnType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::expressions::Literal;
    use ::relations::{ColumnInfo, ColumnType, Schema};
    use ::storage::{DBFileInfo, DBFileType, DBPage, Tuple, TupleLiteral};

    fn test_schema() -> Schema {
        Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "A", "T"),
            ColumnInfo::with_table_name(ColumnType::VarChar { length: 16 }, "B", "T"),
            ColumnInfo::with_table_name(ColumnType::Double, "C", "T"),
            ColumnInfo::with_table_name(ColumnType::Char { length: 4 }, "D", "T"),
        ])
            .unwrap()
    }

    #[test]
    fn test_null_flags_size() {
        assert_eq!(0, get_null_flags_size(0));
        assert_eq!(1, get_null_flags_size(1));
        assert_eq!(1, get_null_flags_size(8));
        assert_eq!(2, get_null_flags_size(9));
        assert_eq!(2, get_null_flags_size(16));
        assert_eq!(3, get_null_flags_size(17));
    }

    #[test]
    fn test_storage_sizes() {
        assert_eq!(Ok(1), get_storage_size(ColumnType::TinyInt, 0));
        assert_eq!(Ok(2), get_storage_size(ColumnType::SmallInt, 0));
        assert_eq!(Ok(4), get_storage_size(ColumnType::Integer, 0));
        assert_eq!(Ok(8), get_storage_size(ColumnType::BigInt, 0));
        assert_eq!(Ok(4), get_storage_size(ColumnType::Float, 0));
        assert_eq!(Ok(8), get_storage_size(ColumnType::Double, 0));
        assert_eq!(Ok(10), get_storage_size(ColumnType::Char { length: 10 }, 0));
        assert_eq!(Ok(7), get_storage_size(ColumnType::VarChar { length: 16 }, 5));
        assert!(get_storage_size(ColumnType::Null, 0).is_err());
    }

    #[test]
    fn test_tuple_storage_size() {
        let schema = test_schema();
        let mut tuple = TupleLiteral::from_iter(vec![
            Literal::Int(42),
            Literal::String("hello".into()),
            Literal::Double(2.5),
            Literal::String("abc".into()),
        ]);

        // 1 null-flag byte + 4 + (2 + 5) + 8 + 4.
        assert_eq!(Ok(24), get_tuple_storage_size(&schema, &mut tuple));

        // NULL columns occupy no value space.
        let mut with_null = TupleLiteral::from_iter(vec![
            Literal::Int(42),
            Literal::Null,
            Literal::Double(2.5),
            Literal::Null,
        ]);
        assert_eq!(Ok(13), get_tuple_storage_size(&schema, &mut with_null));
    }

    #[test]
    fn test_store_and_read_back() {
        let schema = test_schema();
        let mut source = TupleLiteral::from_iter(vec![
            Literal::Int(-7),
            Literal::String("hello".into()),
            Literal::Double(2.5),
            Literal::String("ab".into()),
        ]);

        let file_info = DBFileInfo {
            file_type: DBFileType::HeapTupleFile,
            page_size: 512,
            path: None,
        };
        let mut page = DBPage::new(&file_info, 1).unwrap();
        page.init_new_page().unwrap();

        let size = get_tuple_storage_size(&schema, &mut source).unwrap();
        let slot = page.alloc_new_tuple(size).unwrap();
        let offset = page.get_slot_value(slot).unwrap();
        page.store_new_tuple(offset, &schema, &mut source).unwrap();

        let mut tuple = PageTuple::new(page, offset, schema).unwrap();
        assert_eq!(4, tuple.get_column_count());
        assert!(tuple.is_disk_backed());
        assert_eq!(Ok(Literal::Int(-7)), tuple.get_column_value(0));
        assert_eq!(Ok(Literal::String("hello".into())), tuple.get_column_value(1));
        assert_eq!(Ok(Literal::Double(2.5)), tuple.get_column_value(2));
        // CHAR padding is stripped on the way out.
        assert_eq!(Ok(Literal::String("ab".into())), tuple.get_column_value(3));

        assert_eq!(Ok(false), tuple.is_null_value(0));
        assert_eq!(Err(TupleError::InvalidColumnIndex(4, 4)), tuple.get_column_value(4));
    }

    #[test]
    fn test_store_and_read_back_nulls() {
        let schema = test_schema();
        let mut source = TupleLiteral::from_iter(vec![
            Literal::Null,
            Literal::String("x".into()),
            Literal::Null,
            Literal::String("cdef".into()),
        ]);

        let file_info = DBFileInfo {
            file_type: DBFileType::HeapTupleFile,
            page_size: 512,
            path: None,
        };
        let mut page = DBPage::new(&file_info, 1).unwrap();
        page.init_new_page().unwrap();

        let size = get_tuple_storage_size(&schema, &mut source).unwrap();
        let slot = page.alloc_new_tuple(size).unwrap();
        let offset = page.get_slot_value(slot).unwrap();
        page.store_new_tuple(offset, &schema, &mut source).unwrap();

        let mut tuple = PageTuple::new(page, offset, schema).unwrap();
        assert_eq!(Ok(true), tuple.is_null_value(0));
        assert_eq!(Ok(false), tuple.is_null_value(1));
        assert_eq!(Ok(true), tuple.is_null_value(2));
        assert_eq!(Ok(Literal::Null), tuple.get_column_value(0));
        assert_eq!(Ok(Literal::String("x".into())), tuple.get_column_value(1));
        assert_eq!(Ok(Literal::Null), tuple.get_column_value(2));
        assert_eq!(Ok(Literal::String("cdef".into())), tuple.get_column_value(3));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let schema = test_schema();
        let mut source = TupleLiteral::from_iter(vec![Literal::Int(1)]);

        let file_info = DBFileInfo {
            file_type: DBFileType::HeapTupleFile,
            page_size: 512,
            path: None,
        };
        let mut page = DBPage::new(&file_info, 1).unwrap();
        page.init_new_page().unwrap();

        assert!(page.store_new_tuple(400, &schema, &mut source).is_err());
    }
}
