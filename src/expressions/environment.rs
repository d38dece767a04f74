//! This module contains classes and utilities for storing environment information used when
//! evaluating expressions.

use std::default::Default;

use ::relations::{ColumnName, Schema};
use ::expressions::{ExpressionError, Literal};
use ::storage::{Tuple, TupleLiteral};

/// This class holds the environment for evaluating expressions that include symbols. For
/// example, in the SQL command:
///
/// ```SELECT a, b + 5 FROM t WHERE c < 20;```
///
/// All of the expressions refer to columns in the current tuple being considered from the
/// table `t`, and thus need to be able to access the current tuple. This is the role that the
/// environment class serves.
///
/// An important detail about the environment is that a single tuple's schema can hold values
/// from multiple tables, such as when a tuple is produced as the result of a join operation
/// between two tables.
///
/// # Design
/// An environment is owned by the plan node that evaluates expressions, and is reused from one
/// tuple to the next: the node calls [`clear`](#method.clear) and then re-binds the current
/// tuple(s) with [`add_tuple`](#method.add_tuple). This avoids building a fresh environment
/// for every tuple that flows through the node.
///
/// Matching a symbol name walks the bindings in the order they were added. A reference that
/// matches more than one column, either within one binding or across bindings, is ambiguous.
#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    current_schemas: Vec<Schema>,
    current_tuples: Vec<TupleLiteral>,
}

impl Environment {
    /// Instantiate a new environment.
    pub fn new() -> Environment {
        Default::default()
    }

    /// Reset the environment, removing all bindings.
    pub fn clear(&mut self) {
        self.current_schemas.clear();
        self.current_tuples.clear();
    }

    /// Adds a tuple to the environment with the given schema.
    ///
    /// # Arguments
    /// * schema - the schema for the specified tuple
    /// * tuple - the tuple to be added
    pub fn add_tuple<T: Tuple + ?Sized>(&mut self, schema: Schema, tuple: &mut T) {
        self.current_schemas.push(schema);
        self.current_tuples.push(TupleLiteral::from_tuple(tuple));
    }

    /// Get the actual value at the specified column.
    ///
    /// # Arguments
    /// * col_name - the name of the column.
    ///
    /// # Errors
    /// Fails when the name resolves to no column in any binding, when it resolves to more than
    /// one column, or when the value cannot be read out of the bound tuple.
    pub fn get_column_value(&mut self, col_name: &ColumnName) -> Result<Literal, ExpressionError> {
        let mut found = false;
        let mut result: Option<Literal> = None;

        for i in 0..self.current_tuples.len() {
            let columns = self.current_schemas[i].find_columns(col_name);
            if columns.is_empty() {
                continue;
            }

            if found || columns.len() > 1 {
                return Err(ExpressionError::AmbiguousColumnName(col_name.clone()));
            }

            let ref mut tuple: TupleLiteral = self.current_tuples[i];
            let value = try!(tuple.get_column_value(columns[0].0)
                .map_err(ExpressionError::CouldNotRead));
            result = Some(value);
            found = true;
        }

        match result {
            Some(value) => Ok(value),
            None => Err(ExpressionError::CouldNotResolve(col_name.clone())),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            current_schemas: vec![],
            current_tuples: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::relations::{ColumnInfo, ColumnName, ColumnType, Schema};
    use ::expressions::ExpressionError::*;
    use ::expressions::Literal::*;
    use ::storage::TupleLiteral;

    #[test]
    fn test_get_column_value() {
        let sch1 = Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "A", "FOO"),
            ColumnInfo::with_table_name(ColumnType::Double, "B", "FOO"),
        ])
            .unwrap();
        let sch2 = Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "A", "BAR"),
            ColumnInfo::with_table_name(ColumnType::Double, "C", "BAR"),
        ])
            .unwrap();

        let mut tup1 = TupleLiteral::from_iter(vec![Int(1), Double(1.5)]);
        let mut tup2 = TupleLiteral::from_iter(vec![Int(3), Double(2.5)]);

        let mut env1 = {
            let mut env = Environment::new();
            env.add_tuple(sch1.clone(), &mut tup1);

            env
        };
        let mut env2 = {
            let mut env = Environment::new();
            env.add_tuple(sch1.clone(), &mut tup1);
            env.add_tuple(sch2.clone(), &mut tup2);

            env
        };

        let col_a: ColumnName = (None, Some("A".into()));
        let col_b: ColumnName = (None, Some("B".into()));
        let col_c: ColumnName = (None, Some("C".into()));
        let foo_a: ColumnName = (Some("FOO".into()), Some("A".into()));
        let foo_b: ColumnName = (Some("FOO".into()), Some("B".into()));
        let foo_w: ColumnName = (Some("FOO".into()), None);
        let bar_a: ColumnName = (Some("BAR".into()), Some("A".into()));
        let bar_c: ColumnName = (Some("BAR".into()), Some("C".into()));

        assert_eq!(Ok(Int(1)), env1.get_column_value(&foo_a));
        assert_eq!(Ok(Double(1.5)), env1.get_column_value(&foo_b));
        assert_eq!(Err(CouldNotResolve(bar_a.clone())), env1.get_column_value(&bar_a));
        assert_eq!(Err(CouldNotResolve(bar_c.clone())), env1.get_column_value(&bar_c));
        assert_eq!(Ok(Int(1)), env1.get_column_value(&col_a));
        assert_eq!(Ok(Double(1.5)), env1.get_column_value(&col_b));
        assert_eq!(Err(AmbiguousColumnName(foo_w.clone())), env2.get_column_value(&foo_w));

        assert_eq!(Ok(Int(1)), env2.get_column_value(&foo_a));
        assert_eq!(Ok(Double(1.5)), env2.get_column_value(&foo_b));
        assert_eq!(Ok(Int(3)), env2.get_column_value(&bar_a));
        assert_eq!(Ok(Double(2.5)), env2.get_column_value(&bar_c));
        assert_eq!(Err(AmbiguousColumnName(col_a.clone())), env2.get_column_value(&col_a));
        assert_eq!(Ok(Double(1.5)), env2.get_column_value(&col_b));
        assert_eq!(Ok(Double(2.5)), env2.get_column_value(&col_c));
    }

    #[test]
    fn test_clear_and_reuse() {
        let schema = Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "A", "FOO"),
        ])
            .unwrap();

        let mut tup1 = TupleLiteral::from_iter(vec![Int(1)]);
        let mut tup2 = TupleLiteral::from_iter(vec![Int(2)]);

        let col_a: ColumnName = (None, Some("A".into()));

        let mut env = Environment::new();
        env.add_tuple(schema.clone(), &mut tup1);
        assert_eq!(Ok(Int(1)), env.get_column_value(&col_a));

        env.clear();
        assert_eq!(Err(CouldNotResolve(col_a.clone())), env.get_column_value(&col_a));

        env.add_tuple(schema.clone(), &mut tup2);
        assert_eq!(Ok(Int(2)), env.get_column_value(&col_a));
    }
}
