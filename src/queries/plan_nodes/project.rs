//! This module provides the project plan node.

use std::any::Any;

use ::expressions::{Environment, Expression, ExpressionError, SelectValue};
use ::queries::plan_nodes::{PlanNode, hash_plan_parts};
use ::queries::planning::{ColumnStats, PlanCost, PlanError, PlanResult};
use ::queries::planning::cost::estimate_tuple_size;
use ::relations::{ColumnInfo, ColumnName, NameError, Schema, SchemaError, column_name_to_string};
use ::storage::{Tuple, TupleError, TupleLiteral};

/// An error that could occur during projection.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The specified column does not exist.
    ColumnDoesNotExist(ColumnName),
    /// The specified column is ambiguous.
    ColumnAmbiguous(ColumnName),
    /// Unable to resolve the expression given.
    CouldNotResolve(Expression, Box<ExpressionError>),
    /// Unable to read a column value due to some tuple error.
    CouldNotReadColumnValue(ColumnName, TupleError),
    /// The select list contains a scalar subquery, which the engine does not implement.
    ScalarSubquery,
    /// Some other schema error occurred.
    SchemaError(SchemaError),
}

impl From<SchemaError> for Error {
    fn from(e: SchemaError) -> Error {
        if let SchemaError::Name(ref ne) = e {
            if let NameError::Duplicate(ref col_info) = *ne {
                Error::ColumnAmbiguous(col_info.get_column_name())
            } else if let NameError::NoName(ref col_info) = *ne {
                Error::ColumnDoesNotExist(col_info.get_column_name())
            } else {
                Error::SchemaError(SchemaError::Name(ne.clone()))
            }
        } else {
            Error::SchemaError(e)
        }
    }
}

impl ::std::fmt::Display for Error {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            Error::ColumnDoesNotExist(ref col_name) => {
                write!(f, "the column {} does not exist", column_name_to_string(col_name))
            }
            Error::ColumnAmbiguous(ref col_name) => {
                write!(f, "the column {} is ambiguous", column_name_to_string(col_name))
            }
            Error::CouldNotResolve(ref expr, ref e) => {
                write!(f, "the expression {} could not be resolved: {}", expr, e)
            }
            Error::CouldNotReadColumnValue(ref col_name, ref e) => {
                write!(f,
                       "the column value for column {} could not be read: {}",
                       column_name_to_string(col_name),
                       e)
            }
            Error::ScalarSubquery => {
                write!(f, "scalar subqueries in the select list are not supported")
            }
            Error::SchemaError(ref e) => {
                write!(f, "some schema error occurred: {}", e)
            }
        }
    }
}

/// The stream state of a projection: `Fresh` before the first pull, `Running` while tuples
/// flow, `Done` once the child has been exhausted. `Done` is absorbing until the node is
/// initialized again.
#[derive(Clone, Copy, Debug, PartialEq)]
enum StreamState {
    Fresh,
    Running,
    Done,
}

fn stats_entry(stats: &[ColumnStats], idx: usize) -> ColumnStats {
    stats.get(idx).cloned().unwrap_or(ColumnStats::with_unique_values(0))
}

/// PlanNode representing the `SELECT` clause in a SQL query. This is the relational algebra
/// Project operator: it maps every tuple of its child through the projection spec, preserving
/// the child's tuple order exactly.
pub struct ProjectNode {
    child: Box<PlanNode>,
    values: Vec<SelectValue>,
    state: StreamState,
    current_tuple: Option<Box<Tuple>>,
    input_schema: Schema,
    // This will only be Some(...) if the node has been prepared!
    output_schema: Option<Schema>,
    stats: Vec<ColumnStats>,
    cost: Option<PlanCost>,
    // One entry per Expression select value, built during prepare and consumed in lockstep
    // while projecting, so expression results are labeled without re-inferring their types.
    non_wildcard_infos: Vec<ColumnInfo>,
    env: Environment,
}

impl ProjectNode {
    /// Instantiate a new project node.
    ///
    /// # Arguments
    /// * child - The child of the node.
    /// * values - The select values of the query.
    pub fn new(child: Box<PlanNode>, values: Vec<SelectValue>) -> ProjectNode {
        ProjectNode {
            child: child,
            values: values,
            state: StreamState::Fresh,
            current_tuple: None,
            input_schema: Schema::new(),
            output_schema: None,
            stats: Vec::new(),
            cost: None,
            non_wildcard_infos: Vec::new(),
            env: Environment::new(),
        }
    }

    /// Returns true iff the projection spec is a single unqualified wildcard, making this
    /// node a structural no-op. A trivial projection passes its child's tuples through
    /// untouched, and plan rewriters may elide it entirely.
    pub fn is_trivial(&self) -> bool {
        self.values.len() == 1 && self.values[0].is_unqualified_wildcard()
    }

    fn project_tuple(&mut self, tuple: &mut TupleLiteral) -> PlanResult<TupleLiteral> {
        let values = &self.values;
        let input_schema = &self.input_schema;
        let env = &mut self.env;
        let mut info_iter = self.non_wildcard_infos.iter();

        let mut result = TupleLiteral::new();
        for select_value in values.iter() {
            match *select_value {
                SelectValue::Expression { ref expression, .. } => {
                    // The sidecar entry built at prepare time labels this expression slot.
                    let info = info_iter.next();
                    if let Expression::ColumnValue(ref column_name) = *expression {
                        let matches = input_schema.find_columns(column_name);
                        if matches.is_empty() {
                            return Err(Error::ColumnDoesNotExist(column_name.clone()).into());
                        }
                        if matches.len() > 1 {
                            return Err(Error::ColumnAmbiguous(column_name.clone()).into());
                        }
                        let value = try!(tuple.get_column_value(matches[0].0).map_err(|e| {
                            Error::CouldNotReadColumnValue(column_name.clone(), e)
                        }));
                        if let Some(info) = info {
                            trace!("Projected {} = {}", info, value);
                        }
                        result.add_value(value);
                    } else {
                        // Re-bind the reused environment to the current input tuple, then
                        // evaluate the expression against it.
                        env.clear();
                        env.add_tuple(input_schema.clone(), tuple);
                        let value = try!(expression.evaluate(&mut Some(&mut *env)).map_err(|e| {
                            Error::CouldNotResolve(expression.clone(), Box::new(e))
                        }));
                        if let Some(info) = info {
                            trace!("Computed {} = {}", info, value);
                        }
                        result.add_value(value);
                    }
                }
                SelectValue::WildcardColumn { table: Some(ref name) } => {
                    // This value is a qualified wildcard. Find the columns that match it and
                    // add their values one by one, in input order.
                    let matches = input_schema.find_columns(&(Some(name.clone()), None));
                    for &(idx, _) in matches.iter() {
                        let value = try!(tuple.get_column_value(idx).map_err(|e| {
                            Error::CouldNotReadColumnValue((Some(name.clone()), None), e)
                        }));
                        result.add_value(value);
                    }
                }
                SelectValue::WildcardColumn { table: None } => {
                    // No table is specified, so this is all columns in the child schema.
                    result.append_tuple(tuple);
                }
                SelectValue::ScalarSubquery => {
                    return Err(Error::ScalarSubquery.into());
                }
            }
        }
        Ok(result)
    }
}

impl PlanNode for ProjectNode {
    fn get_schema(&self) -> Schema {
        self.output_schema.clone().unwrap_or(Schema::new())
    }

    fn get_stats(&self) -> Vec<ColumnStats> {
        self.stats.clone()
    }

    fn get_cost(&self) -> Option<PlanCost> {
        self.cost
    }

    fn prepare(&mut self) -> PlanResult<()> {
        try!(self.child.prepare());
        self.input_schema = self.child.get_schema();
        if self.input_schema.is_empty() {
            return Err(PlanError::NodeNotPrepared);
        }
        let input_stats = self.child.get_stats();
        let input_cost = self.child.get_cost();

        let mut output_schema = Schema::new();
        let mut output_stats: Vec<ColumnStats> = Vec::new();
        let mut non_wildcard_infos: Vec<ColumnInfo> = Vec::new();

        for select_value in self.values.iter() {
            match *select_value {
                SelectValue::WildcardColumn { table: Some(ref name) } => {
                    // A qualified wildcard pulls in the matching input columns, in input
                    // order, along with their statistics.
                    let matches = self.input_schema.find_columns(&(Some(name.clone()), None));
                    for &(idx, ref info) in matches.iter() {
                        try!(output_schema.add_column(info.clone()).map_err(Error::from));
                        output_stats.push(stats_entry(&input_stats, idx));
                    }
                }
                SelectValue::WildcardColumn { table: None } => {
                    // An unqualified wildcard pulls in the whole input schema.
                    let infos: Vec<ColumnInfo> = self.input_schema.iter().cloned().collect();
                    try!(output_schema.add_columns(infos).map_err(Error::from));
                    output_stats.extend(input_stats.iter().cloned());
                }
                SelectValue::Expression { ref expression, ref alias } => {
                    // Determining the schema is relatively straightforward. The statistics,
                    // unfortunately, are a different matter: if the expression is a simple
                    // column-reference then we can look up the stats from the subplan, but
                    // if the expression is computed, we need to guess.
                    if let Expression::ColumnValue(ref column_name) = *expression {
                        let matches = self.input_schema.find_columns(column_name);
                        if matches.is_empty() {
                            return Err(Error::ColumnDoesNotExist(column_name.clone()).into());
                        }
                        if matches.len() > 1 {
                            return Err(Error::ColumnAmbiguous(column_name.clone()).into());
                        }
                        let (idx, ref info) = matches[0];
                        let col_info = match *alias {
                            Some(ref name) => ColumnInfo::with_name(info.column_type,
                                                                    name.clone()),
                            None => info.clone(),
                        };
                        output_stats.push(stats_entry(&input_stats, idx));
                        non_wildcard_infos.push(col_info.clone());
                        try!(output_schema.add_column(col_info).map_err(Error::from));
                    } else {
                        let col_type = try!(expression.get_column_type(&self.input_schema)
                            .map_err(|e| {
                                Error::CouldNotResolve(expression.clone(), Box::new(e))
                            }));
                        let col_name = match *alias {
                            Some(ref name) => name.clone(),
                            None => format!("{}", expression),
                        };
                        let col_info = ColumnInfo::with_name(col_type, col_name);
                        // Without analyzing the table there is no way to know how many
                        // distinct values the expression takes; guess that every input row
                        // produces a distinct one.
                        let unique = match input_cost {
                            Some(ref cost) => cost.num_tuples.round() as u32,
                            None => 0,
                        };
                        output_stats.push(ColumnStats::with_unique_values(unique));
                        non_wildcard_infos.push(col_info.clone());
                        try!(output_schema.add_column(col_info).map_err(Error::from));
                    }
                }
                SelectValue::ScalarSubquery => {
                    return Err(Error::ScalarSubquery.into());
                }
            }
        }

        let cost = input_cost.map(|mut cost| {
            // One projection evaluation per input tuple.
            cost.cpu_cost += cost.num_tuples;
            cost.tuple_size = estimate_tuple_size(&output_schema);
            cost
        });

        self.output_schema = Some(output_schema);
        self.stats = output_stats;
        self.cost = cost;
        self.non_wildcard_infos = non_wildcard_infos;
        Ok(())
    }

    fn initialize(&mut self) {
        self.child.initialize();
        self.state = StreamState::Fresh;
        self.current_tuple = None;
    }

    fn get_next_tuple(&mut self) -> PlanResult<Option<&mut Tuple>> {
        if self.output_schema.is_none() {
            return Err(PlanError::NodeNotPrepared);
        }

        match self.state {
            StreamState::Done => return Ok(None),
            StreamState::Fresh | StreamState::Running => {
                self.state = StreamState::Running;
            }
        }

        if self.is_trivial() {
            // A single unqualified wildcard passes the child's tuple through untouched.
            let next = try!(self.child.get_next_tuple());
            if next.is_none() {
                self.state = StreamState::Done;
            }
            return Ok(next);
        }

        let next = match try!(self.child.get_next_tuple()) {
            Some(tuple) => Some(TupleLiteral::from_tuple(tuple)),
            None => None,
        };

        match next {
            Some(mut tuple) => {
                let projected = try!(self.project_tuple(&mut tuple));
                self.current_tuple = Some(Box::new(projected));
            }
            None => {
                self.state = StreamState::Done;
                self.current_tuple = None;
            }
        }

        Ok(match self.current_tuple.as_mut() {
            Some(boxed_tuple) => Some(&mut **boxed_tuple),
            _ => None,
        })
    }

    fn supports_marking(&self) -> bool {
        self.child.supports_marking()
    }

    fn mark_current_position(&mut self) -> PlanResult<()> {
        // The projection holds no rewind state of its own; the position lives in the child.
        self.child.mark_current_position()
    }

    fn reset_to_last_mark(&mut self) -> PlanResult<()> {
        self.child.reset_to_last_mark()
    }

    fn clean_up(&mut self) {
        self.current_tuple = None;
        self.env.clear();
        self.child.clean_up();
    }

    fn duplicate(&self) -> Box<PlanNode> {
        Box::new(ProjectNode {
            child: self.child.duplicate(),
            values: self.values.clone(),
            state: StreamState::Fresh,
            current_tuple: None,
            input_schema: self.input_schema.clone(),
            output_schema: self.output_schema.clone(),
            stats: self.stats.clone(),
            cost: self.cost,
            non_wildcard_infos: self.non_wildcard_infos.clone(),
            env: Environment::new(),
        })
    }

    fn results_ordered_by(&self) -> Option<Vec<ColumnName>> {
        // Tuple order is always preserved, but a non-trivial projection may rename or drop
        // the columns the child's ordering is expressed in.
        if self.is_trivial() {
            self.child.results_ordered_by()
        } else {
            None
        }
    }

    fn describe(&self) -> String {
        let values: Vec<String> = self.values.iter().map(|v| format!("{}", v)).collect();
        format!("Project[values: [{}]]", values.join(", "))
    }

    fn as_any(&self) -> &Any {
        self
    }

    fn plan_equals(&self, other: &PlanNode) -> bool {
        match other.as_any().downcast_ref::<ProjectNode>() {
            Some(other) => {
                self.values == other.values && self.child.plan_equals(&*other.child)
            }
            None => false,
        }
    }

    fn plan_hash(&self) -> u64 {
        let parts: Vec<String> = self.values.iter().map(|v| format!("{}", v)).collect();
        hash_plan_parts("Project", &parts, &[self.child.plan_hash()])
    }
}

#[cfg(test)]
impl ProjectNode {
    /// Test-only view of the child node.
    pub fn get_child(&self) -> &PlanNode {
        &*self.child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::expressions::{ArithmeticType, Expression, Literal, SelectValue};
    use ::queries::plan_nodes::{LiteralNode, PlanNode};
    use ::queries::planning::{PlanError, get_plan_results};
    use ::relations::{ColumnInfo, ColumnType, Schema};
    use ::storage::TupleLiteral;

    fn two_col_schema() -> Schema {
        Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "a", "t"),
            ColumnInfo::with_table_name(ColumnType::Integer, "b", "t"),
        ])
            .unwrap()
    }

    fn row2(a: i32, b: i32) -> TupleLiteral {
        TupleLiteral::from_iter(vec![Literal::Int(a), Literal::Int(b)])
    }

    fn make_child(rows: Vec<TupleLiteral>, schema: Schema) -> Box<PlanNode> {
        Box::new(LiteralNode::from_iter(rows.into_iter(), schema).unwrap())
    }

    fn star() -> SelectValue {
        SelectValue::WildcardColumn { table: None }
    }

    fn col(name: &str) -> SelectValue {
        SelectValue::Expression {
            expression: Expression::ColumnValue((None, Some(name.into()))),
            alias: None,
        }
    }

    fn col_expr(name: &str) -> Expression {
        Expression::ColumnValue((None, Some(name.into())))
    }

    fn sum_with_alias(left: &str, right: &str, alias: &str) -> SelectValue {
        SelectValue::Expression {
            expression: Expression::Arithmetic(Box::new(col_expr(left)),
                                               ArithmeticType::Plus,
                                               Box::new(col_expr(right))),
            alias: Some(alias.into()),
        }
    }

    #[test]
    fn test_trivial_identity() {
        let rows = vec![row2(1, 2), row2(3, 4)];
        let mut node = ProjectNode::new(make_child(rows.clone(), two_col_schema()), vec![star()]);

        assert!(node.is_trivial());
        node.prepare().unwrap();

        // A trivial projection is the identity: same schema, same stats, same tuples.
        assert_eq!(two_col_schema(), node.get_schema());
        assert_eq!(node.get_child().get_stats(), node.get_stats());
        assert_eq!(rows, get_plan_results(&mut node).unwrap());
    }

    #[test]
    fn test_non_trivial_specs() {
        let child = make_child(vec![row2(1, 2)], two_col_schema());
        let qualified = ProjectNode::new(child.duplicate(),
                                         vec![SelectValue::WildcardColumn {
                                             table: Some("t".into()),
                                         }]);
        assert!(!qualified.is_trivial());

        let column = ProjectNode::new(child, vec![col("a")]);
        assert!(!column.is_trivial());
    }

    #[test]
    fn test_expression_and_alias() {
        let rows = vec![row2(1, 2), row2(3, 4)];
        let mut node = ProjectNode::new(make_child(rows, two_col_schema()),
                                        vec![col("a"), sum_with_alias("a", "b", "s")]);

        node.prepare().unwrap();

        // The output schema is (a, s), both integers; `a` keeps its input column info, and
        // `s` is labeled by its alias.
        let schema = node.get_schema();
        assert_eq!(2, schema.num_columns());
        assert_eq!(ColumnInfo::with_table_name(ColumnType::Integer, "a", "t"), schema[0]);
        assert_eq!(ColumnInfo::with_name(ColumnType::Integer, "s"), schema[1]);

        // `a` copies its stats from the child; `s` is synthesized as "every row distinct".
        let stats = node.get_stats();
        assert_eq!(2, stats[0].num_unique_values);
        assert_eq!(2, stats[1].num_unique_values);

        // One projection evaluation per input tuple.
        let child_cost = node.get_child().get_cost().unwrap();
        let cost = node.get_cost().unwrap();
        assert_eq!(child_cost.cpu_cost + child_cost.num_tuples, cost.cpu_cost);
        assert_eq!(child_cost.num_tuples, cost.num_tuples);
        // 1 null-flag byte plus two 4-byte integers.
        assert_eq!(9.0, cost.tuple_size);

        assert_eq!(vec![
            TupleLiteral::from_iter(vec![Literal::Int(1), Literal::Int(3)]),
            TupleLiteral::from_iter(vec![Literal::Int(3), Literal::Int(7)]),
        ],
        get_plan_results(&mut node).unwrap());

        assert_eq!("Project[values: [a, a + b AS s]]", node.describe());
    }

    #[test]
    fn test_synthesized_stats_differ_from_copied() {
        // All three rows hold a = 1, so the copied stats for `a` say 1 distinct value while
        // the synthesized entry for the computed column says 3.
        let rows = vec![row2(1, 2), row2(1, 4), row2(1, 6)];
        let mut node = ProjectNode::new(make_child(rows, two_col_schema()),
                                        vec![col("a"), sum_with_alias("a", "b", "s")]);
        node.prepare().unwrap();

        let stats = node.get_stats();
        assert_eq!(1, stats[0].num_unique_values);
        assert_eq!(3, stats[1].num_unique_values);
    }

    #[test]
    fn test_mixed_wildcard_and_expression() {
        let rows = vec![row2(1, 2), row2(3, 4)];
        let mut node = ProjectNode::new(make_child(rows, two_col_schema()),
                                        vec![star(), sum_with_alias("a", "b", "s")]);
        node.prepare().unwrap();

        // Schema width is the wildcard expansion plus one expression entry.
        assert_eq!(3, node.get_schema().num_columns());
        assert_eq!(vec![
            TupleLiteral::from_iter(vec![Literal::Int(1), Literal::Int(2), Literal::Int(3)]),
            TupleLiteral::from_iter(vec![Literal::Int(3), Literal::Int(4), Literal::Int(7)]),
        ],
        get_plan_results(&mut node).unwrap());
    }

    #[test]
    fn test_qualified_wildcard() {
        let schema = Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "a", "t"),
            ColumnInfo::with_table_name(ColumnType::Integer, "b", "t"),
            ColumnInfo::with_table_name(ColumnType::Integer, "c", "u"),
        ])
            .unwrap();
        let rows = vec![
            TupleLiteral::from_iter(vec![Literal::Int(1), Literal::Int(2), Literal::Int(3)]),
            TupleLiteral::from_iter(vec![Literal::Int(4), Literal::Int(5), Literal::Int(6)]),
        ];
        let mut node = ProjectNode::new(make_child(rows, schema),
                                        vec![SelectValue::WildcardColumn {
                                            table: Some("t".into()),
                                        }]);
        node.prepare().unwrap();

        // Only t's columns survive, in input order.
        let out_schema = node.get_schema();
        assert_eq!(2, out_schema.num_columns());
        assert_eq!(ColumnInfo::with_table_name(ColumnType::Integer, "a", "t"), out_schema[0]);
        assert_eq!(ColumnInfo::with_table_name(ColumnType::Integer, "b", "t"), out_schema[1]);
        assert_eq!(2, node.get_stats().len());

        assert_eq!(vec![row2(1, 2), row2(4, 5)], get_plan_results(&mut node).unwrap());
    }

    #[test]
    fn test_scalar_subquery_rejected_at_prepare() {
        let mut node = ProjectNode::new(make_child(vec![row2(1, 2)], two_col_schema()),
                                        vec![col("a"), SelectValue::ScalarSubquery]);
        assert_eq!(Err(PlanError::ProjectError(Error::ScalarSubquery)), node.prepare());
    }

    #[test]
    fn test_unknown_and_ambiguous_columns() {
        let mut unknown = ProjectNode::new(make_child(vec![row2(1, 2)], two_col_schema()),
                                           vec![col("z")]);
        assert_eq!(Err(PlanError::ProjectError(
                       Error::ColumnDoesNotExist((None, Some("z".into()))))),
                   unknown.prepare());

        let ambiguous_schema = Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "a", "t"),
            ColumnInfo::with_table_name(ColumnType::Integer, "a", "u"),
        ])
            .unwrap();
        let rows = vec![TupleLiteral::from_iter(vec![Literal::Int(1), Literal::Int(2)])];
        let mut ambiguous = ProjectNode::new(make_child(rows, ambiguous_schema), vec![col("a")]);
        assert_eq!(Err(PlanError::ProjectError(
                       Error::ColumnAmbiguous((None, Some("a".into()))))),
                   ambiguous.prepare());
    }

    #[test]
    fn test_requires_prepare() {
        let mut node = ProjectNode::new(make_child(vec![row2(1, 2)], two_col_schema()),
                                        vec![star()]);
        assert_eq!(Err(PlanError::NodeNotPrepared),
                   node.get_next_tuple().map(|t| t.is_some()));
    }

    #[test]
    fn test_restart_after_initialize() {
        let rows = vec![row2(1, 2), row2(3, 4)];
        let mut node = ProjectNode::new(make_child(rows, two_col_schema()),
                                        vec![col("b"), col("a")]);
        node.prepare().unwrap();

        let expected = vec![
            TupleLiteral::from_iter(vec![Literal::Int(2), Literal::Int(1)]),
            TupleLiteral::from_iter(vec![Literal::Int(4), Literal::Int(3)]),
        ];
        // get_plan_results initializes the plan each time, so the stream restarts.
        assert_eq!(expected, get_plan_results(&mut node).unwrap());
        assert_eq!(expected, get_plan_results(&mut node).unwrap());
    }

    #[test]
    fn test_absorbing_end_stops_pulling_child() {
        let rows = vec![row2(1, 2)];
        let mut node = ProjectNode::new(make_child(rows, two_col_schema()), vec![col("a")]);
        node.prepare().unwrap();
        node.initialize();

        assert!(node.get_next_tuple().unwrap().is_some());
        assert!(node.get_next_tuple().unwrap().is_none());

        let pulls_at_end = child_pulls(&node);

        // Once the end has been reached, further pulls return None without touching the
        // child at all.
        assert!(node.get_next_tuple().unwrap().is_none());
        assert!(node.get_next_tuple().unwrap().is_none());
        assert_eq!(pulls_at_end, child_pulls(&node));
    }

    fn child_pulls(node: &ProjectNode) -> usize {
        node.get_child().as_any().downcast_ref::<LiteralNode>().unwrap().pulls
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let make = |values: Vec<SelectValue>| {
            ProjectNode::new(make_child(vec![row2(1, 2)], two_col_schema()), values)
        };

        let node1 = make(vec![col("a"), sum_with_alias("a", "b", "s")]);
        let node2 = make(vec![col("a"), sum_with_alias("a", "b", "s")]);
        let different_spec = make(vec![col("b")]);

        assert!(node1.plan_equals(&node2));
        assert_eq!(node1.plan_hash(), node2.plan_hash());

        assert!(!node1.plan_equals(&different_spec));

        // A different child breaks equality even with an equal spec.
        let other_child = make_child(vec![row2(9, 9)], two_col_schema());
        let different_child = ProjectNode::new(other_child,
                                               vec![col("a"), sum_with_alias("a", "b", "s")]);
        assert!(!node1.plan_equals(&different_child));
    }

    #[test]
    fn test_duplicate_is_independent() {
        let rows = vec![row2(1, 2), row2(3, 4)];
        let mut node = ProjectNode::new(make_child(rows, two_col_schema()),
                                        vec![col("a"), sum_with_alias("a", "b", "s")]);
        node.prepare().unwrap();

        let mut copy = node.duplicate();
        assert!(node.plan_equals(&*copy));
        assert_eq!(node.plan_hash(), copy.plan_hash());

        let expected = vec![
            TupleLiteral::from_iter(vec![Literal::Int(1), Literal::Int(3)]),
            TupleLiteral::from_iter(vec![Literal::Int(3), Literal::Int(7)]),
        ];

        // The duplicate executes without re-preparing, and neither plan disturbs the other.
        assert_eq!(expected, get_plan_results(&mut *copy).unwrap());
        assert_eq!(expected, get_plan_results(&mut node).unwrap());
    }

    #[test]
    fn test_marking_delegates_to_child() {
        let rows = vec![row2(1, 2), row2(3, 4), row2(5, 6)];
        let mut node = ProjectNode::new(make_child(rows, two_col_schema()), vec![col("a")]);
        node.prepare().unwrap();
        node.initialize();

        assert!(node.supports_marking());

        let one = TupleLiteral::from_iter(vec![Literal::Int(1)]);
        let three = TupleLiteral::from_iter(vec![Literal::Int(3)]);

        assert_eq!(one, TupleLiteral::from_tuple(node.get_next_tuple().unwrap().unwrap()));
        node.mark_current_position().unwrap();

        assert_eq!(three, TupleLiteral::from_tuple(node.get_next_tuple().unwrap().unwrap()));

        // Rewinding re-delivers the marked tuple's projection.
        node.reset_to_last_mark().unwrap();
        assert_eq!(one, TupleLiteral::from_tuple(node.get_next_tuple().unwrap().unwrap()));
        assert_eq!(three, TupleLiteral::from_tuple(node.get_next_tuple().unwrap().unwrap()));
    }
}
