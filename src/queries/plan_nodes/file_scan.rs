//! This module provides the file scan plan node.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use ::expressions::{Environment, Expression, Literal};
use ::queries::plan_nodes::{PlanNode, hash_plan_parts};
use ::queries::planning::{ColumnStats, PlanCost, PlanError, PlanResult};
use ::queries::planning::cost::estimate_tuple_size;
use ::relations::Schema;
use ::storage::{Pinnable, Tuple};
use ::storage::tuple_files::{HeapFilePageTuple, HeapTupleFile};

/// Checks whether the tuple fits the predicate.
///
/// # Arguments
/// * predicate - The predicate to check against, if there is one.
/// * schema - The schema the tuple follows.
/// * tuple - The tuple to verify.
fn is_tuple_selected(predicate: Option<&Expression>,
                     schema: &Schema,
                     tuple: &mut HeapFilePageTuple)
                     -> PlanResult<bool> {
    match predicate {
        Some(expr) => {
            let mut env = Environment::new();
            env.add_tuple(schema.clone(), tuple);
            match expr.evaluate(&mut Some(&mut env)) {
                Ok(Literal::True) => Ok(true),
                Ok(Literal::False) => Ok(false),
                Ok(_) => Err(PlanError::InvalidPredicate),
                Err(e) => Err(PlanError::CouldNotApplyPredicate(e)),
            }
        }
        None => Ok(true),
    }
}

/// A leaf plan-node that scans a heap tuple file, checking the optional predicate against
/// each tuple in the file and producing the tuples that satisfy it, in the order the file's
/// cursor delivers them.
///
/// The node holds a shared handle to the tuple file, so duplicating a plan shares the file
/// while each copy keeps its own stream position. The scan supports marking: the current
/// tuple's (page, slot) identity is remembered, and resetting re-fetches it through the
/// cursor.
pub struct FileScanNode {
    table_file: Rc<RefCell<HeapTupleFile>>,
    /// The predicate to filter the scanned tuples with.
    pub predicate: Option<Expression>,
    schema: Schema,
    current_tuple: Option<Box<HeapFilePageTuple>>,
    done: bool,
    jump_to_marked: bool,
    marked: Option<(u32, u16)>,
    stats: Vec<ColumnStats>,
    cost: Option<PlanCost>,
}

impl FileScanNode {
    /// Instantiate a new file scan node.
    ///
    /// # Arguments
    /// * table_file - The heap tuple file to scan.
    /// * predicate - The predicate to filter on if it exists.
    pub fn new(table_file: Rc<RefCell<HeapTupleFile>>,
               predicate: Option<Expression>)
               -> FileScanNode {
        let schema = table_file.borrow().schema.clone();
        FileScanNode {
            table_file: table_file,
            predicate: predicate,
            schema: schema,
            current_tuple: None,
            done: false,
            jump_to_marked: false,
            marked: None,
            stats: Vec::new(),
            cost: None,
        }
    }

    fn advance_current_tuple(&mut self) -> PlanResult<()> {
        let mut table_file = self.table_file.borrow_mut();

        if self.jump_to_marked {
            debug!("Resuming at previously marked tuple.");
            self.jump_to_marked = false;
            match self.marked {
                Some((page_no, slot)) => {
                    let tuple = try!(table_file.get_tuple_at(page_no, slot));
                    self.current_tuple = Some(Box::new(tuple));
                }
                None => {
                    return Err(PlanError::NoMarkSet);
                }
            }
        } else {
            let next = match self.current_tuple {
                Some(ref tuple) => try!(table_file.get_next_tuple(tuple)),
                None => try!(table_file.get_first_tuple()),
            };
            self.current_tuple = next.map(Box::new);
        }
        Ok(())
    }

    fn get_next_tuple_helper(&mut self) -> PlanResult<()> {
        if self.done {
            return Ok(());
        }

        // Continue to advance the current tuple until it is selected by the predicate.
        loop {
            try!(self.advance_current_tuple());

            if self.current_tuple.is_none() {
                self.done = true;
                return Ok(());
            }

            let is_selected = {
                let boxed_tuple = self.current_tuple.as_mut().unwrap();
                try!(is_tuple_selected(self.predicate.as_ref(),
                                       &self.schema,
                                       &mut *boxed_tuple))
            };

            // If we found a tuple that satisfies the predicate, break out of the loop!
            if is_selected {
                return Ok(());
            }

            // Release the rejected tuple before advancing past it.
            if let Some(ref mut boxed_tuple) = self.current_tuple {
                try!(boxed_tuple.unpin()
                    .map_err(|e| PlanError::CouldNotAdvanceTuple(e.into())));
            }
        }
    }
}

impl PlanNode for FileScanNode {
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
        let (num_pages, num_tuples) = try!(self.table_file.borrow_mut()
            .count_pages_and_tuples());
        let num_tuples = num_tuples as f32;

        // One predicate evaluation per tuple, one read per data page.
        self.cost = Some(PlanCost::new(num_tuples,
                                       estimate_tuple_size(&self.schema),
                                       num_tuples,
                                       num_pages as f32));

        // Without per-column analysis the best available guess is that every row holds a
        // distinct value.
        let unique = num_tuples.round() as u32;
        self.stats = self.schema
            .iter()
            .map(|_| ColumnStats::with_unique_values(unique))
            .collect();

        Ok(())
    }

    fn initialize(&mut self) {
        self.current_tuple = None;
        self.done = false;
        self.jump_to_marked = false;
        self.marked = None;
    }

    fn get_next_tuple(&mut self) -> PlanResult<Option<&mut Tuple>> {
        if self.cost.is_none() {
            return Err(PlanError::NodeNotPrepared);
        }

        try!(self.get_next_tuple_helper());

        Ok(match self.current_tuple.as_mut() {
            Some(boxed_tuple) => Some(&mut **boxed_tuple),
            _ => None,
        })
    }

    fn supports_marking(&self) -> bool {
        true
    }

    fn mark_current_position(&mut self) -> PlanResult<()> {
        match self.current_tuple {
            Some(ref tuple) => {
                let position = (tuple.get_page_no(), tuple.slot);
                debug!("Marking scan position at page {}, slot {}.", position.0, position.1);
                self.marked = Some(position);
                Ok(())
            }
            None => Err(PlanError::NoCurrentTuple),
        }
    }

    fn reset_to_last_mark(&mut self) -> PlanResult<()> {
        match self.marked {
            Some(_) => {
                self.jump_to_marked = true;
                self.done = false;
                Ok(())
            }
            None => Err(PlanError::NoMarkSet),
        }
    }

    fn clean_up(&mut self) {
        if let Some(ref mut tuple) = self.current_tuple {
            if tuple.is_pinned() {
                // The pin count is known to be positive, so unpinning cannot fail.
                let _ = tuple.unpin();
            }
        }
        self.current_tuple = None;
    }

    fn duplicate(&self) -> Box<PlanNode> {
        Box::new(FileScanNode {
            table_file: self.table_file.clone(),
            predicate: self.predicate.clone(),
            schema: self.schema.clone(),
            current_tuple: None,
            done: false,
            jump_to_marked: false,
            marked: None,
            stats: self.stats.clone(),
            cost: self.cost,
        })
    }

    fn describe(&self) -> String {
        let path = match self.table_file.borrow().get_path() {
            Some(path) => path.display().to_string(),
            None => "<unknown>".to_string(),
        };
        match self.predicate {
            Some(ref predicate) => {
                format!("FileScan[file: {}, predicate: {}]", path, predicate)
            }
            None => format!("FileScan[file: {}]", path),
        }
    }

    fn as_any(&self) -> &Any {
        self
    }

    fn plan_equals(&self, other: &PlanNode) -> bool {
        match other.as_any().downcast_ref::<FileScanNode>() {
            Some(other) => {
                self.predicate == other.predicate &&
                *self.table_file.borrow() == *other.table_file.borrow()
            }
            None => false,
        }
    }

    fn plan_hash(&self) -> u64 {
        let mut parts = Vec::new();
        if let Some(path) = self.table_file.borrow().get_path() {
            parts.push(path.display().to_string());
        }
        if let Some(ref predicate) = self.predicate {
            parts.push(format!("{}", predicate));
        }
        hash_plan_parts("FileScan", &parts, &[])
    }
}
