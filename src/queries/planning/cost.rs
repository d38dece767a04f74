//! This module contains the data types plan nodes use to describe their estimated costs and
//! the statistics of the columns they produce.

use ::relations::Schema;
use ::storage::page_tuple::{get_null_flags_size, get_storage_size};

/// Statistics about the values of one column of a plan node's output. Stats entries are kept
/// in a list aligned one-for-one with the node's schema columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    /// The estimated number of unique values the column takes.
    pub num_unique_values: u32,
}

impl ColumnStats {
    /// A stats entry with the given number of unique values.
    pub fn with_unique_values(num_unique_values: u32) -> ColumnStats {
        ColumnStats { num_unique_values: num_unique_values }
    }
}

/// This class holds a collection of values that represent the cost of a plan-node (and its
/// subplans). The most important value is the estimated number of tuples the node produces,
/// since this strongly influences the costs of the plan nodes above it; the CPU cost and IO
/// cost capture how expensive the node itself is to run to completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanCost {
    /// The estimated number of tuples produced by the node. We use a floating-point value
    /// because the computations frequently involve fractional numbers and it's not very
    /// effective to use integers or longs.
    pub num_tuples: f32,
    /// The average tuple size of tuples produced by the node, in bytes.
    pub tuple_size: f32,
    /// An estimate of the overall computational cost of the plan node, in some imaginary unit
    /// of "CPU work".
    pub cpu_cost: f32,
    /// The estimated number of page reads the plan node will perform.
    pub io_cost: f32,
}

impl PlanCost {
    /// Construct a new plan-cost object from its components.
    ///
    /// # Arguments
    /// * num_tuples - the estimated number of tuples produced
    /// * tuple_size - the average size of the produced tuples, in bytes
    /// * cpu_cost - the estimated amount of computation performed
    /// * io_cost - the estimated number of page reads
    pub fn new(num_tuples: f32, tuple_size: f32, cpu_cost: f32, io_cost: f32) -> PlanCost {
        PlanCost {
            num_tuples: num_tuples,
            tuple_size: tuple_size,
            cpu_cost: cpu_cost,
            io_cost: io_cost,
        }
    }
}

impl ::std::fmt::Display for PlanCost {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(f,
               "PlanCost[tuples={}, tupSize={}, cpuCost={}, ioCost={}]",
               self.num_tuples,
               self.tuple_size,
               self.cpu_cost,
               self.io_cost)
    }
}

/// Estimates the on-disk size in bytes of a tuple matching the given schema. Variable-size
/// columns are counted at their declared maximum, so the estimate is conservative and
/// deterministic.
///
/// # Arguments
/// * schema - the schema to estimate a tuple size for.
pub fn estimate_tuple_size(schema: &Schema) -> f32 {
    let mut size = get_null_flags_size(schema.num_columns()) as f32;
    for col_info in schema.iter() {
        let declared_length = match col_info.column_type {
            ::relations::ColumnType::VarChar { length } => length,
            _ => 0,
        };
        // Columns of unsupported types simply contribute no size.
        if let Ok(col_size) = get_storage_size(col_info.column_type, declared_length) {
            size += col_size as f32;
        }
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::relations::{ColumnInfo, ColumnType, Schema};

    #[test]
    fn test_estimate_tuple_size() {
        let schema = Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "A", "T"),
            ColumnInfo::with_table_name(ColumnType::Double, "B", "T"),
        ])
            .unwrap();
        // 1 null-flag byte + 4 + 8.
        assert_eq!(13.0, estimate_tuple_size(&schema));

        let with_varchar = Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "A", "T"),
            ColumnInfo::with_table_name(ColumnType::VarChar { length: 10 }, "B", "T"),
        ])
            .unwrap();
        // 1 null-flag byte + 4 + (2 + 10): VARCHARs count their declared maximum.
        assert_eq!(17.0, estimate_tuple_size(&with_varchar));
    }

    #[test]
    fn test_display() {
        let cost = PlanCost::new(10.0, 13.0, 10.0, 1.0);
        assert_eq!("PlanCost[tuples=10, tupSize=13, cpuCost=10, ioCost=1]",
                   format!("{}", cost));
    }
}
