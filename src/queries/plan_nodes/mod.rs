//! This module contains all plan nodes: the physical operators a query plan is composed of.
//!
//! Plan nodes form a tree and execute in the pull model: each call to
//! [`get_next_tuple`](trait.PlanNode.html#tymethod.get_next_tuple) produces one tuple, on
//! demand from the node's parent, by pulling whatever it needs from its children. Control
//! flows down the tree at `prepare`/`initialize`/`clean_up` time; tuples flow up, in the
//! exact order the bottom of the plan produces them.

pub mod file_scan;
#[cfg(test)]
pub mod literal;
pub mod project;

pub use self::file_scan::FileScanNode;
#[cfg(test)]
pub use self::literal::LiteralNode;
pub use self::project::ProjectNode;
pub use self::project::Error as ProjectError;

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use ::relations::{ColumnName, Schema};
use ::queries::planning::{ColumnStats, PlanCost, PlanError, PlanResult};
use ::storage::Tuple;

/// Represents a query plan node in its most abstract form: the capability set every physical
/// operator provides.
///
/// The lifecycle of a plan node is:
///
/// 1. [`prepare`](#tymethod.prepare) - computes the node's schema, statistics, and cost,
///    recursively preparing children first. Must be called before tuples are pulled.
/// 2. [`initialize`](#method.initialize) - resets the stream; legal to call any number of
///    times, each call restarting the stream from the beginning.
/// 3. [`get_next_tuple`](#tymethod.get_next_tuple) - pulls tuples one at a time until it
///    returns `None`. Once `None` has been returned it keeps being returned until the node is
///    initialized again.
/// 4. [`clean_up`](#method.clean_up) - releases the subtree's resources. Mandatory on every
///    exit path, including cancellation and errors, and idempotent.
pub trait PlanNode {
    /// Retrieves the current plan node's schema. Only meaningful after
    /// [`prepare`](#tymethod.prepare) has been called.
    fn get_schema(&self) -> Schema;

    /// Retrieves the statistics of the node's output columns, aligned one-for-one with the
    /// schema. Only meaningful after [`prepare`](#tymethod.prepare) has been called.
    fn get_stats(&self) -> Vec<ColumnStats>;

    /// Retrieves the estimated cost of executing this node (and its subplan) to completion,
    /// or `None` if the node has not been prepared yet.
    fn get_cost(&self) -> Option<PlanCost>;

    /// Prepare the plan node for execution: recursively prepare children, then compute this
    /// node's schema, statistics, and cost. Idempotent within a plan lifetime.
    fn prepare(&mut self) -> PlanResult<()>;

    /// Reset the node's stream state, recursively initializing children. Each call restarts
    /// the stream from the beginning.
    fn initialize(&mut self) {
        // Do nothing by default.
    }

    /// Pull the next tuple in the plan, or `None` at the end of the stream. The end of the
    /// stream is absorbing: once `None` is returned, subsequent calls keep returning `None`
    /// (without disturbing the children) until [`initialize`](#method.initialize) is called.
    fn get_next_tuple(&mut self) -> PlanResult<Option<&mut Tuple>>;

    /// Whether this node supports marking its current position and later rewinding to it.
    /// A node with children supports marking only if all of its children do.
    #[inline]
    fn supports_marking(&self) -> bool {
        false
    }

    /// Whether this node requires its left child to support marking. Used while plans are
    /// being prepared.
    #[inline]
    fn requires_left_marking(&self) -> bool {
        false
    }

    /// Whether this node requires its right child to support marking. Used while plans are
    /// being prepared.
    #[inline]
    fn requires_right_marking(&self) -> bool {
        false
    }

    /// Remember the stream's current position. After a later call to
    /// [`reset_to_last_mark`](#method.reset_to_last_mark), the next pull re-delivers the
    /// tuple that was current when the mark was taken.
    ///
    /// # Errors
    /// Fails with `MarkingNotSupported` unless the node (and its children) support marking.
    fn mark_current_position(&mut self) -> PlanResult<()> {
        Err(PlanError::MarkingNotSupported)
    }

    /// Rewind the stream to the last marked position.
    ///
    /// # Errors
    /// Fails with `MarkingNotSupported` unless the node (and its children) support marking.
    fn reset_to_last_mark(&mut self) -> PlanResult<()> {
        Err(PlanError::MarkingNotSupported)
    }

    /// Release any resources held by this subtree. Must be safe to call multiple times, and
    /// on any exit path.
    fn clean_up(&mut self) {
        // Do nothing by default.
    }

    /// Produce an independently executable structural clone of this subtree. Plan-local
    /// state, such as projection lists, is deep-copied; external resources such as tuple-file
    /// handles are shared with the original. Executing the duplicate must not disturb the
    /// original.
    fn duplicate(&self) -> Box<PlanNode>;

    /// The ordering of the node's results, if one is guaranteed; `None` when the ordering is
    /// unknown.
    fn results_ordered_by(&self) -> Option<Vec<ColumnName>> {
        None
    }

    /// A human-readable, single-line description of this node for plan printing, e.g.
    /// `Project[values: [a, b + 5 AS x]]`.
    fn describe(&self) -> String;

    /// This node as a `&Any`, so implementations can downcast in
    /// [`plan_equals`](#tymethod.plan_equals).
    fn as_any(&self) -> &Any;

    /// Structural equality: two plans are equal iff their operator types, operator-local
    /// specs, and children are equal.
    fn plan_equals(&self, other: &PlanNode) -> bool;

    /// Structural hash, consistent with [`plan_equals`](#tymethod.plan_equals): equal plans
    /// hash to equal values.
    fn plan_hash(&self) -> u64;
}

/// Helper for `plan_hash` implementations: hashes an operator tag, the display forms of the
/// operator's local spec, and the hashes of its children.
pub fn hash_plan_parts(tag: &str, parts: &[String], children: &[u64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    tag.hash(&mut hasher);
    for part in parts {
        part.hash(&mut hasher);
    }
    for child in children {
        child.hash(&mut hasher);
    }
    hasher.finish()
}
