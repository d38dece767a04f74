//! This module contains utilities and classes for handling table schemas.

use std::collections::HashMap;
use std::error::Error as ErrorTrait;
use std::io;
use std::io::{Seek, SeekFrom};
use std::iter::IntoIterator;
use std::ops::Index;
use std::slice::Iter;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use ::relations::{ColumnInfo, ColumnName, ColumnType, EMPTY_CHAR, EMPTY_VARCHAR};
use ::storage::{DBPage, ReadMiniDBExt, WriteMiniDBExt};
use ::storage::header_page::OFFSET_SCHEMA_START;

/// The table-index byte stored for a column that is not associated with any table.
const NO_TABLE_INDEX: u8 = 0xFF;

#[derive(Debug, Clone, PartialEq)]
/// An error that occurs when the name of a column results in an invalid schema state.
pub enum NameError {
    /// No columns exist with the requested name.
    NoName(ColumnInfo),
    /// The specified column is a duplicate of an existing one.
    Duplicate(ColumnInfo),
    /// The name of the column is not uniquely identifying.
    Ambiguous(ColumnInfo),
}

impl ::std::fmt::Display for NameError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            NameError::Ambiguous(ref ci) => write!(f, "The column info {} is ambiguous.", ci),
            NameError::NoName(ref ci) => write!(f, "No columns with a name matching {} exist.", ci),
            NameError::Duplicate(ref ci) => {
                write!(f, "The column info {} is a duplicate of an existing one.", ci)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// An error that can occur while handling schemas.
pub enum Error {
    /// An error occurred while performing I/O.
    IOError(String),
    /// An error occurred that had to do with the names of columns passed in.
    Name(NameError),
    /// Tables must have at least one column.
    NoColumns,
    /// The column name at the given index was empty.
    EmptyColumnName(usize),
}

impl ::std::fmt::Display for Error {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            Error::IOError(ref e) => {
                write!(f, "An IO error occurred: {}", e)
            }
            Error::Name(ref e) => write!(f, "{}", e),
            Error::NoColumns => write!(f, "All schemas must have at least one column."),
            Error::EmptyColumnName(idx) => {
                write!(f, "The column name at index {} does not have a name.", idx)
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::IOError(e.description().into())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A schema is an ordered collection of column names and associated types.
///
/// Many different entities in the database code can have schema associated with them. Both
/// tables and tuples have schemas, for obvious reasons. Relational algebra plan nodes also have
/// schemas, which specify the kinds of tuples that they generate.
pub struct Schema {
    column_infos: Vec<ColumnInfo>,
    cols_hashed_by_table: HashMap<Option<String>, HashMap<Option<String>, usize>>,
    cols_hashed_by_column: HashMap<Option<String>, Vec<usize>>,
}

impl Index<usize> for Schema {
    type Output = ColumnInfo;

    fn index(&self, i: usize) -> &Self::Output {
        &self.column_infos[i]
    }
}

impl IntoIterator for Schema {
    type Item = ColumnInfo;
    type IntoIter = ::std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.column_infos.into_iter()
    }
}

impl Schema {
    /// Instantiates a new schema with no columns in it.
    pub fn new() -> Schema {
        Schema {
            column_infos: vec![],
            cols_hashed_by_table: Default::default(),
            cols_hashed_by_column: Default::default(),
        }
    }

    /// Checks if the schema is empty.
    pub fn is_empty(&self) -> bool {
        self.column_infos.is_empty()
    }

    /// Instantiates a schema with the given columns.
    ///
    /// # Arguments
    /// * column_infos - Some collection of column infos.
    ///
    /// # Errors
    /// This constructor will fail if adding a column would fail at any point.
    pub fn with_columns<I: IntoIterator<Item = ColumnInfo>>(column_infos: I) -> Result<Schema, Error> {
        let mut result = Schema::new();
        result.add_columns(column_infos).map(|_| result)
    }

    /// Returns an iterator on the column infos.
    pub fn iter(&self) -> Iter<ColumnInfo> {
        self.column_infos.iter()
    }

    /// Returns the number of columns currently in the schema.
    pub fn num_columns(&self) -> usize {
        self.column_infos.len()
    }

    /// Add one column to the schema.
    ///
    /// # Arguments
    /// * column - The information about the desired column to add.
    ///
    /// # Errors
    /// This will fail if the column cannot be added because one with that name already exists on
    /// the same table.
    pub fn add_column(&mut self, column: ColumnInfo) -> Result<(), Error> {
        if column.name.is_some() {
            // If the column is named, make sure it's not already in the schema with that
            // table name.
            let table_col_names = self.cols_hashed_by_table.get(&column.table_name);
            if let Some(table_map) = table_col_names {
                if table_map.get(&column.name).is_some() {
                    return Err(Error::Name(NameError::Duplicate(column)));
                }
            }
        }

        let index = self.column_infos.len();

        let table_map = self.cols_hashed_by_table
            .entry(column.table_name.clone())
            .or_insert(Default::default());
        table_map.insert(column.name.clone(), index);

        let column_list = self.cols_hashed_by_column
            .entry(column.name.clone())
            .or_insert(Default::default());
        column_list.push(index);

        self.column_infos.push(column);
        Ok(())
    }

    /// Add multiple columns to the schema.
    ///
    /// # Arguments
    /// * schema - Some collection of column info.
    ///
    /// # Errors
    /// This method will fail if adding a column would fail at any point.
    pub fn add_columns<T: IntoIterator<Item = ColumnInfo>>(&mut self, schema: T) -> Result<(), Error> {
        let result: Result<Vec<()>, Error> =
            schema.into_iter().map(|column| self.add_column(column)).collect();
        result.map(|_| ())
    }

    /// Given a (possibly wildcard) column-name, this method returns the collection of all
    /// columns that match the specified column name, as (index, column info) pairs ordered by
    /// their position in the schema.
    ///
    /// Any valid column-name object will work, so all of these options are available:
    ///
    ///   * **No table, only a column name** - to resolve an unqualified column name, e.g. in an
    ///     expression or predicate
    ///   * **A table and column name** - to check whether the schema contains such a column
    ///   * **A wildcard without a table name** - to retrieve all columns in the schema
    ///   * **A wildcard with a table name** - to retrieve all columns associated with a
    ///     particular table name
    pub fn find_columns(&self, col_name: &ColumnName) -> Vec<(usize, ColumnInfo)> {
        let mut found: Vec<(usize, ColumnInfo)> = Vec::new();

        match *col_name {
            (Some(ref table_name), Some(ref column_name)) => {
                // Column name with a table name:  tbl.col
                // Find the table info and see if it has the specified column.
                let table_key = Some(table_name.clone());
                let column_key = Some(column_name.clone());
                if let Some(table_cols) = self.cols_hashed_by_table.get(&table_key) {
                    if let Some(index) = table_cols.get(&column_key) {
                        found.push((*index, self.column_infos[*index].clone()));
                    }
                }
            }
            (Some(ref table_name), None) => {
                // Wildcard with a table name:  tbl.*
                // Find the table info and add its columns to the result.
                let key = Some(table_name.clone());
                if let Some(table_cols) = self.cols_hashed_by_table.get(&key) {
                    found.extend(table_cols.values()
                        .map(|idx| (*idx, self.column_infos[*idx].clone())));
                    // The table hash does not remember declaration order, so restore it.
                    found.sort_by(|a, b| a.0.cmp(&b.0));
                }
            }
            (None, Some(ref column_name)) => {
                // Column name with no table name:  col
                // Look up the list of column-info objects grouped by column name. The index
                // lists are built in declaration order, so no sorting is needed here.
                let key = Some(column_name.clone());
                if let Some(columns) = self.cols_hashed_by_column.get(&key) {
                    for index in columns {
                        found.push((*index, self.column_infos[*index].clone()));
                    }
                }
            }
            (None, None) => {
                // Wildcard with no table name:  *
                // Add all columns in the schema to the result.
                for (idx, val) in self.column_infos.iter().enumerate() {
                    found.push((idx, val.clone()));
                }
            }
        }

        found
    }

    /// Creates a new schema by reading the header page of a tuple file.
    ///
    /// # Arguments
    /// * page - The header page to read the schema from.
    ///
    /// # Errors
    /// This function can fail if the recorded schema is malformed, or if reading the page fails.
    pub fn from_header_page(page: &mut DBPage) -> Result<Schema, Error> {
        let mut result = Schema::new();

        try!(page.seek(SeekFrom::Start(OFFSET_SCHEMA_START as u64)));

        let num_tables = try!(page.read_u8());
        let mut table_names: Vec<String> = Vec::new();

        for _ in 0..num_tables {
            let table_name = try!(page.read_varchar255());
            table_names.push(table_name);
        }

        let num_cols = try!(page.read_u8());
        debug!("Table has {} columns.", num_cols);

        if num_cols < 1 {
            return Err(Error::NoColumns);
        }

        for i in 0..num_cols {
            // Determine the column type here.
            let type_id = try!(page.read_u8());
            let col_type = if type_id == u8::from(EMPTY_CHAR) {
                let length = try!(page.read_u16::<BigEndian>());
                ColumnType::Char { length: length }
            } else if type_id == u8::from(EMPTY_VARCHAR) {
                let length: u16 = try!(page.read_u16::<BigEndian>());
                ColumnType::VarChar { length: length }
            } else {
                type_id.into()
            };

            let table_index = try!(page.read_u8());

            let col_name = try!(page.read_varchar255());

            if col_name.len() == 0 {
                return Err(Error::EmptyColumnName(i as usize));
            }

            let column = if table_index == NO_TABLE_INDEX {
                ColumnInfo::with_name(col_type, col_name)
            } else {
                let ref table_name = table_names[table_index as usize];
                ColumnInfo::with_table_name(col_type, col_name, table_name.clone())
            };

            try!(result.add_column(column));
        }

        Ok(result)
    }

    /// Write the schema to some output, positioned at the schema area of a header page.
    ///
    /// # Arguments
    /// * output - The output to write the schema to.
    ///
    /// # Errors
    /// This function can fail if anything goes wrong trying to write to the given output.
    pub fn write<W: WriteMiniDBExt + Seek>(&self, output: &mut W) -> Result<(), io::Error> {
        info!("Writing table schema: {}", self);

        try!(output.seek(SeekFrom::Start(OFFSET_SCHEMA_START as u64)));

        // Collect the distinct table names in first-appearance order so the recorded table
        // list is deterministic.
        let mut table_mapping: HashMap<String, u8> = Default::default();
        let mut table_names: Vec<String> = Vec::new();
        for column_info in &self.column_infos {
            if let Some(ref table_name) = column_info.table_name {
                if !table_mapping.contains_key(table_name) {
                    table_mapping.insert(table_name.clone(), table_names.len() as u8);
                    table_names.push(table_name.clone());
                }
            }
        }

        debug!("Recording {} table names.", table_names.len());
        try!(output.write_u8(table_names.len() as u8));
        for table_name in &table_names {
            try!(output.write_varchar255(table_name.clone()));
        }

        let num_columns: u8 = self.column_infos.len() as u8;
        debug!("Recording {} columns.", num_columns);
        try!(output.write_u8(num_columns));
        for column_info in &self.column_infos {
            let column_type_byte: u8 = column_info.column_type.into();
            try!(output.write_u8(column_type_byte));

            match column_info.column_type {
                ColumnType::Char { length } |
                ColumnType::VarChar { length } => {
                    try!(output.write_u16::<BigEndian>(length as u16));
                }
                _ => {}
            }

            match column_info.table_name {
                Some(ref table_name) => {
                    try!(output.write_u8(table_mapping[table_name]));
                }
                None => {
                    try!(output.write_u8(NO_TABLE_INDEX));
                }
            }

            if let Some(ref column_name) = column_info.name {
                try!(output.write_varchar255(column_name.clone()));
            }
        }
        Ok(())
    }
}

impl ::std::fmt::Display for Schema {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        let infos: Vec<String> = self.column_infos.iter().map(|f| format!("{}", f)).collect();
        write!(f, "Schema[cols={}]", infos.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use ::relations::{ColumnType, ColumnInfo};

    #[test]
    fn test_index() {
        let info1 = ColumnInfo::with_name(ColumnType::Integer, "foo");
        let info2 = ColumnInfo::with_name(ColumnType::Float, "bar");
        let schema = Schema::with_columns(vec![info1.clone(), info2.clone()]).unwrap();

        assert_eq!(schema[0], info1);
        assert_eq!(schema[1], info2);
    }

    #[test]
    fn test_iter() {
        let info1 = ColumnInfo::with_name(ColumnType::Integer, "foo");
        let info2 = ColumnInfo::with_name(ColumnType::Float, "bar");
        let schema = Schema::with_columns(vec![info1.clone(), info2.clone()]).unwrap();

        assert_eq!(schema.into_iter().collect::<Vec<ColumnInfo>>(),
        vec![info1.clone(), info2.clone()]);
    }

    #[test]
    fn test_duplicate_column() {
        let info = ColumnInfo::with_table_name(ColumnType::Integer, "A", "FOO");
        assert!(Schema::with_columns(vec![info.clone(), info.clone()]).is_err());
    }

    #[test]
    fn test_write() {
        let schema = Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "A", "FOO"),
            ColumnInfo::with_table_name(ColumnType::VarChar { length: 20 }, "B", "FOO"),
            ColumnInfo::with_table_name(ColumnType::Integer, "C", "FOO"),
        ])
            .unwrap();
        let buffer = vec![0x00; 512];
        let mut expected = vec![0x00; 6];
        expected.extend_from_slice(&[0x01, 0x03, 0x46, 0x4F, 0x4F, 0x03, 0x01, 0x00, 0x01, 0x41,
                                     0x16, 0x00, 0x14, 0x00, 0x01, 0x42, 0x01, 0x00, 0x01, 0x43]);
        expected.extend_from_slice(&[0x00; 486]);

        let mut cursor = Cursor::new(buffer);
        schema.write(&mut cursor).unwrap();
        assert_eq!(cursor.into_inner(), expected);
    }

    #[test]
    fn test_find_columns() {
        let foo_a = ColumnInfo::with_table_name(ColumnType::Integer, "A", "FOO");
        let foo_b = ColumnInfo::with_table_name(ColumnType::VarChar { length: 20 }, "B", "FOO");
        let foo_c = ColumnInfo::with_table_name(ColumnType::Integer, "C", "FOO");
        let bar_a = ColumnInfo::with_table_name(ColumnType::Integer, "A", "BAR");
        let bar_b = ColumnInfo::with_table_name(ColumnType::VarChar { length: 20 }, "B", "BAR");
        let bar_c = ColumnInfo::with_table_name(ColumnType::Integer, "C", "BAR");
        let b = ColumnInfo::with_name(ColumnType::BigInt, "B");
        let c = ColumnInfo::with_name(ColumnType::Integer, "C");

        let schema = Schema::with_columns(vec![
            foo_a.clone(),
            foo_b.clone(),
            foo_c.clone(),
            bar_a.clone(),
            bar_b.clone(),
            bar_c.clone(),
            b.clone(),
            c.clone(),
        ])
            .unwrap();

        // Results come back ordered by schema position.
        assert_eq!(vec![
            (0, foo_a.clone()),
            (1, foo_b.clone()),
            (2, foo_c.clone()),
        ],
        schema.find_columns(&(Some("FOO".into()), None)));

        assert_eq!(vec![
            (2, foo_c.clone()),
        ],
        schema.find_columns(&(Some("FOO".into()), Some("C".into()))));

        assert_eq!(vec![
            (2, foo_c.clone()),
            (5, bar_c.clone()),
            (7, c.clone()),
        ],
        schema.find_columns(&(None, Some("C".into()))));

        assert_eq!(vec![
            (0, foo_a.clone()),
            (1, foo_b.clone()),
            (2, foo_c.clone()),
            (3, bar_a.clone()),
            (4, bar_b.clone()),
            (5, bar_c.clone()),
            (6, b.clone()),
            (7, c.clone()),
        ],
        schema.find_columns(&(None, None)));
    }

    #[test]
    fn test_round_trip_through_page() {
        use ::storage::DBFileInfo;
        use ::storage::dbfile::DBFileType;
        use ::storage::dbpage::DBPage;

        let schema = Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "A", "FOO"),
            ColumnInfo::with_table_name(ColumnType::VarChar { length: 9 }, "B", "FOO"),
            ColumnInfo::with_name(ColumnType::Double, "C"),
        ])
            .unwrap();

        let file_info = DBFileInfo {
            file_type: DBFileType::HeapTupleFile,
            page_size: 512,
            path: None,
        };
        let mut page = DBPage::new(&file_info, 0).unwrap();
        schema.write(&mut page).unwrap();

        let read_back = Schema::from_header_page(&mut page).unwrap();
        assert_eq!(schema, read_back);
    }
}
