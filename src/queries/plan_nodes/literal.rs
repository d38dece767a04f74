//! This module provides the literal plan node. This node is currently only used for testing:
//! it produces a fixed list of tuple literals, tracks how many times it has been pulled, and
//! supports marking, which makes it a convenient bottom for execution tests.

use std::any::Any;

use ::expressions::Literal;
use ::queries::plan_nodes::{PlanNode, hash_plan_parts};
use ::queries::planning::{ColumnStats, PlanCost, PlanError, PlanResult};
use ::queries::planning::cost::estimate_tuple_size;
use ::relations::Schema;
use ::storage::{Tuple, TupleLiteral};

/// A plan node that is created with a set of tuple literals and just generates those.
#[derive(Clone, Debug)]
pub struct LiteralNode {
    data: Vec<TupleLiteral>,
    index: usize,
    marked_index: Option<usize>,
    schema: Schema,
    stats: Vec<ColumnStats>,
    cost: Option<PlanCost>,
    /// How many times `get_next_tuple` has been called on this node. Tests use this to check
    /// that an exhausted parent stops pulling.
    pub pulls: usize,
}

impl LiteralNode {
    /// Create a new literal node from an iterator of TupleLiterals and a given schema.
    ///
    /// # Arguments
    /// * iter - The tuples the node will produce, in order.
    /// * schema - The schema the tuples follow.
    ///
    /// # Errors
    /// Fails if any tuple's arity does not match the schema.
    pub fn from_iter<I: Iterator<Item = TupleLiteral>>(iter: I,
                                                       schema: Schema)
                                                       -> PlanResult<LiteralNode> {
        let data: Vec<TupleLiteral> = iter.collect();

        let schema_size = schema.num_columns();
        for t in data.iter() {
            let tup_size = t.len();
            if tup_size != schema_size {
                return Err(PlanError::WrongArity(tup_size, schema_size));
            }
        }

        Ok(LiteralNode {
            data: data,
            index: 0,
            marked_index: None,
            schema: schema,
            stats: Vec::new(),
            cost: None,
            pulls: 0,
        })
    }

    /// Counts the distinct values in one column of the data. Quadratic, which is fine for
    /// the tiny tuple lists this node is used with.
    fn count_unique(&self, col_index: usize) -> u32 {
        let mut seen: Vec<Literal> = Vec::new();
        for tuple in self.data.iter() {
            let mut tuple = tuple.clone();
            let value = tuple.get_column_value(col_index).unwrap();
            if !seen.contains(&value) {
                seen.push(value);
            }
        }
        seen.len() as u32
    }
}

impl PlanNode for LiteralNode {
    fn get_schema(&self) -> Schema {
        self.schema.clone()
    }

    fn get_stats(&self) -> Vec<ColumnStats> {
        self.stats.clone()
    }

    fn get_cost(&self) -> Option<PlanCost> {
        self.cost
    }

    fn prepare(&mut self) -> PlanResult<()> {
        let num_tuples = self.data.len() as f32;
        self.cost = Some(PlanCost::new(num_tuples,
                                       estimate_tuple_size(&self.schema),
                                       num_tuples,
                                       0.0));
        self.stats = (0..self.schema.num_columns())
            .map(|i| ColumnStats::with_unique_values(self.count_unique(i)))
            .collect();
        self.initialize();

        Ok(())
    }

    fn initialize(&mut self) {
        self.index = 0;
        self.marked_index = None;
    }

    fn get_next_tuple(&mut self) -> PlanResult<Option<&mut Tuple>> {
        self.pulls += 1;
        Ok(if self.index >= self.data.len() {
            None
        } else {
            let result = &mut self.data[self.index];
            self.index += 1;
            Some(result)
        })
    }

    fn supports_marking(&self) -> bool {
        true
    }

    fn mark_current_position(&mut self) -> PlanResult<()> {
        if self.index == 0 {
            return Err(PlanError::NoCurrentTuple);
        }
        self.marked_index = Some(self.index - 1);
        Ok(())
    }

    fn reset_to_last_mark(&mut self) -> PlanResult<()> {
        match self.marked_index {
            Some(marked) => {
                self.index = marked;
                Ok(())
            }
            None => Err(PlanError::NoMarkSet),
        }
    }

    fn duplicate(&self) -> Box<PlanNode> {
        let mut copy = self.clone();
        copy.index = 0;
        copy.marked_index = None;
        copy.pulls = 0;
        Box::new(copy)
    }

    fn describe(&self) -> String {
        format!("Literal[{} tuples, schema: {}]", self.data.len(), self.schema)
    }

    fn as_any(&self) -> &Any {
        self
    }

    fn plan_equals(&self, other: &PlanNode) -> bool {
        match other.as_any().downcast_ref::<LiteralNode>() {
            Some(other) => self.data == other.data && self.schema == other.schema,
            None => false,
        }
    }

    fn plan_hash(&self) -> u64 {
        let mut parts: Vec<String> = self.data.iter().map(|t| format!("{}", t)).collect();
        parts.push(format!("{}", self.schema));
        hash_plan_parts("Literal", &parts, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::expressions::Literal;
    use ::queries::plan_nodes::PlanNode;
    use ::queries::planning::get_plan_results;
    use ::relations::{ColumnInfo, ColumnType, Schema};
    use ::storage::TupleLiteral;

    #[test]
    fn test_wrong_arity() {
        let empty_schema = Schema::new();
        let schema = Schema::with_columns(vec![ColumnInfo::with_name(ColumnType::Integer, "FOO")])
            .unwrap();

        let no_tuples = vec![];
        let right_size = vec![TupleLiteral::from_iter(vec![Literal::Int(3)])];
        let wrong_size = vec![TupleLiteral::from_iter(vec![Literal::Int(3), Literal::Int(4)])];
        let wrong_size2 = vec![TupleLiteral::from_iter(vec![])];

        // An empty set will work with any schema.
        assert!(LiteralNode::from_iter(no_tuples.clone().into_iter(), empty_schema.clone())
            .is_ok());
        assert!(LiteralNode::from_iter(no_tuples.clone().into_iter(), schema.clone()).is_ok());

        assert!(LiteralNode::from_iter(right_size.clone().into_iter(), empty_schema.clone())
            .is_err());
        assert!(LiteralNode::from_iter(right_size.clone().into_iter(), schema.clone()).is_ok());

        assert!(LiteralNode::from_iter(wrong_size.clone().into_iter(), empty_schema.clone())
            .is_err());
        assert!(LiteralNode::from_iter(wrong_size.clone().into_iter(), schema.clone()).is_err());

        assert!(LiteralNode::from_iter(wrong_size2.clone().into_iter(), empty_schema.clone())
            .is_ok());
        assert!(LiteralNode::from_iter(wrong_size2.clone().into_iter(), schema.clone()).is_err());
    }

    #[test]
    fn test_node() {
        let schema = Schema::with_columns(vec![ColumnInfo::with_name(ColumnType::Integer, "FOO"),
                                               ColumnInfo::with_name(ColumnType::Integer, "BAR")])
            .unwrap();
        let tuples = vec![
            TupleLiteral::from_iter(vec![Literal::Int(3), Literal::Int(4)]),
            TupleLiteral::from_iter(vec![Literal::Int(4), Literal::Int(5)])
        ];
        let mut node = LiteralNode::from_iter(tuples.clone().into_iter(), schema).unwrap();
        node.prepare().unwrap();

        assert_eq!(tuples, get_plan_results(&mut node).unwrap());

        // Can run it multiple times.
        assert_eq!(tuples, get_plan_results(&mut node).unwrap());
    }

    #[test]
    fn test_stats_and_cost() {
        let schema = Schema::with_columns(vec![ColumnInfo::with_name(ColumnType::Integer, "FOO"),
                                               ColumnInfo::with_name(ColumnType::Integer, "BAR")])
            .unwrap();
        let tuples = vec![
            TupleLiteral::from_iter(vec![Literal::Int(1), Literal::Int(7)]),
            TupleLiteral::from_iter(vec![Literal::Int(1), Literal::Int(8)]),
            TupleLiteral::from_iter(vec![Literal::Int(2), Literal::Int(7)])
        ];
        let mut node = LiteralNode::from_iter(tuples.into_iter(), schema).unwrap();
        node.prepare().unwrap();

        let cost = node.get_cost().unwrap();
        assert_eq!(3.0, cost.num_tuples);
        assert_eq!(0.0, cost.io_cost);

        let stats = node.get_stats();
        assert_eq!(2, stats[0].num_unique_values);
        assert_eq!(2, stats[1].num_unique_values);
    }

    #[test]
    fn test_marking() {
        let schema = Schema::with_columns(vec![ColumnInfo::with_name(ColumnType::Integer, "FOO")])
            .unwrap();
        let tuples: Vec<TupleLiteral> = (0..3)
            .map(|i| TupleLiteral::from_iter(vec![Literal::Int(i)]))
            .collect();
        let mut node = LiteralNode::from_iter(tuples.clone().into_iter(), schema).unwrap();
        node.prepare().unwrap();

        assert!(node.supports_marking());
        assert!(node.mark_current_position().is_err());

        let first = TupleLiteral::from_tuple(node.get_next_tuple().unwrap().unwrap());
        assert_eq!(tuples[0], first);
        node.mark_current_position().unwrap();

        assert_eq!(tuples[1],
                   TupleLiteral::from_tuple(node.get_next_tuple().unwrap().unwrap()));
        node.reset_to_last_mark().unwrap();

        // The marked tuple is re-delivered after the rewind.
        assert_eq!(tuples[0],
                   TupleLiteral::from_tuple(node.get_next_tuple().unwrap().unwrap()));
        assert_eq!(tuples[1],
                   TupleLiteral::from_tuple(node.get_next_tuple().unwrap().unwrap()));
    }
}
