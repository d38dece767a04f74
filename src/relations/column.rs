//! This module contains classes and enums for column information.

use std::fmt;

/// A shorthand type for storing a column name in (table_name, column_name) form. A `None` in the
/// column position denotes a wildcard; a `None` in the table position denotes an unqualified
/// name.
pub type ColumnName = (Option<String>, Option<String>);

/// Convert a column name to string form, with wildcards.
pub fn column_name_to_string(name: &ColumnName) -> String {
    match *name {
        (Some(ref table_name), Some(ref col_name)) => format!("{}.{}", table_name, col_name),
        (None, Some(ref col_name)) => format!("{}", col_name),
        (Some(ref table_name), None) => format!("{}.*", table_name),
        (None, None) => format!("*"),
    }
}

/// An empty Char column type. Useful for comparing type IDs.
pub const EMPTY_CHAR: ColumnType = ColumnType::Char { length: 0 };

/// An empty VarChar column type. Useful for comparing type IDs.
pub const EMPTY_VARCHAR: ColumnType = ColumnType::VarChar { length: 0 };

/// The type of a single column in a relation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// A placeholder type for `NULL` literals.
    Null,
    /// A 1-byte signed integer.
    TinyInt,
    /// A 2-byte signed integer.
    SmallInt,
    /// A 4-byte signed integer.
    Integer,
    /// An 8-byte signed integer.
    BigInt,
    /// A 4-byte signed floating-point number with 24 bits of precision.
    Float,
    /// An 8-byte signed floating-point number with 53 bits of precision.
    Double,
    /// A fixed-length character-sequence, with a specified length.
    Char {
        /// The length of the string.
        length: u16,
    },
    /// A variable-length character-sequence, with a specified maximum length.
    VarChar {
        /// The maximum length of the string.
        length: u16,
    },
}

impl From<ColumnType> for u8 {
    fn from(col_type: ColumnType) -> u8 {
        match col_type {
            ColumnType::Null => 0,
            ColumnType::Integer => 1,
            ColumnType::SmallInt => 2,
            ColumnType::BigInt => 3,
            ColumnType::TinyInt => 4,
            ColumnType::Float => 5,
            ColumnType::Double => 6,
            ColumnType::Char { length: _ } => 21,
            ColumnType::VarChar { length: _ } => 22,
        }
    }
}

impl From<u8> for ColumnType {
    fn from(byte: u8) -> ColumnType {
        match byte {
            1 => ColumnType::Integer,
            2 => ColumnType::SmallInt,
            3 => ColumnType::BigInt,
            4 => ColumnType::TinyInt,
            5 => ColumnType::Float,
            6 => ColumnType::Double,
            21 => EMPTY_CHAR,
            22 => EMPTY_VARCHAR,
            0 | _ => ColumnType::Null,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ColumnType::Char { length } => write!(f, "CHAR({})", length),
            ColumnType::VarChar { length } => write!(f, "VARCHAR({})", length),
            _ => write!(f, "{}", format!("{:?}", self).to_uppercase()),
        }
    }
}

impl ColumnType {
    /// Whether the column type is numeric.
    pub fn is_numeric(&self) -> bool {
        match *self {
            ColumnType::TinyInt | ColumnType::SmallInt | ColumnType::Integer |
            ColumnType::BigInt | ColumnType::Float | ColumnType::Double => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Basic information about a table column, including its name and SQL type. Constraints, even
/// `NOT NULL` constraints, appear at the table level, since some constraints can involve
/// multiple columns.
pub struct ColumnInfo {
    /// The type information for the column.
    pub column_type: ColumnType,
    /// The name of the attribute. If the name is `None`, that means this is a wildcard.
    pub name: Option<String>,
    /// An optional table-name for the attribute, in cases where a join or Cartesian product
    /// generates a result with duplicate attribute-names. In most cases it is expected that
    /// this table-name will be `None`.
    pub table_name: Option<String>,
}

impl ColumnInfo {
    /// Create a new column-info object with a name, but not associated with a table.
    ///
    /// # Arguments
    /// * column_type - The type information for the column.
    /// * name - The column name.
    pub fn with_name<S: Into<String>>(column_type: ColumnType, name: S) -> ColumnInfo {
        ColumnInfo {
            column_type: column_type,
            name: Some(name.into()),
            table_name: None,
        }
    }

    /// Create a new column-info object with a name that is associated with a table.
    ///
    /// # Arguments
    /// * column_type - The type information for the column.
    /// * name - The column name.
    /// * table_name - The table name.
    pub fn with_table_name<S1: Into<String>, S2: Into<String>>(column_type: ColumnType,
                                                               name: S1,
                                                               table_name: S2)
                                                               -> ColumnInfo {
        ColumnInfo {
            column_type: column_type,
            name: Some(name.into()),
            table_name: Some(table_name.into()),
        }
    }

    /// Returns the column name for a column-info object.
    pub fn get_column_name(&self) -> ColumnName {
        (self.table_name.clone(), self.name.clone())
    }
}

impl fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.table_name.clone(), self.name.clone()) {
            (None, None) => write!(f, "ColumnInfo[*:{}]", self.column_type),
            (None, Some(name)) => write!(f, "ColumnInfo[{}:{}]", name, self.column_type),
            (Some(table_name), None) => write!(f, "ColumnInfo[{}.*:{}]", table_name, self.column_type),
            (Some(table_name), Some(name)) => {
                write!(f,
                       "ColumnInfo[{}.{}:{}]",
                       table_name,
                       name,
                       self.column_type)
            }
        }
    }
}
