//! This module contains classes and utilities for describing relations: column types, column
//! metadata, and table schemas.

pub mod column;
pub mod schema;

pub use self::column::{ColumnInfo, ColumnName, ColumnType, column_name_to_string};
pub use self::column::{EMPTY_CHAR, EMPTY_VARCHAR};
pub use self::schema::{NameError, Schema};
pub use self::schema::Error as SchemaError;
