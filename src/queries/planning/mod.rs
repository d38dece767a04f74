//! This package contains modules for representing query execution plans, as well as analyzing
//! their costs.

pub mod cost;

pub use self::cost::{ColumnStats, PlanCost};

use ::expressions::ExpressionError;
use ::queries::plan_nodes::PlanNode;
use ::queries::plan_nodes::project::Error as ProjectError;
use ::storage::{TupleError, TupleLiteral};
use ::storage::file_manager;

/// An error that could occur during planning or plan execution.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A file manager error occurred.
    FileManagerError(file_manager::Error),
    /// A projection error occurred.
    ProjectError(ProjectError),
    /// The predicate does not evaluate to a boolean.
    InvalidPredicate,
    /// The predicate could not be evaluated.
    CouldNotApplyPredicate(ExpressionError),
    /// Unable to advance to the next tuple in a node.
    CouldNotAdvanceTuple(TupleError),
    /// The node was not prepared before using.
    NodeNotPrepared,
    /// The node (or one of its children) does not support marking and rewinding.
    MarkingNotSupported,
    /// There is no current tuple whose position could be marked.
    NoCurrentTuple,
    /// The stream has no marked position to reset to.
    NoMarkSet,
    /// A tuple was found in a plan that did not match the schema size. In the form of
    /// `(tuple size, schema size)`.
    WrongArity(usize, usize),
}

impl From<file_manager::Error> for Error {
    fn from(e: file_manager::Error) -> Error {
        Error::FileManagerError(e)
    }
}

impl From<ProjectError> for Error {
    fn from(e: ProjectError) -> Error {
        Error::ProjectError(e)
    }
}

impl ::std::fmt::Display for Error {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            Error::FileManagerError(ref e) => write!(f, "{}", e),
            Error::ProjectError(ref e) => write!(f, "Projection failed because {}.", e),
            Error::InvalidPredicate => write!(f, "The predicate is invalid."),
            Error::CouldNotApplyPredicate(ref e) => {
                write!(f, "The predicate could not be applied: {}", e)
            }
            Error::CouldNotAdvanceTuple(ref e) => {
                write!(f, "Unable to advance to next tuple in node: {}", e)
            }
            Error::NodeNotPrepared => write!(f, "A node was not prepared."),
            Error::MarkingNotSupported => {
                write!(f, "The plan does not support marking and rewinding.")
            }
            Error::NoCurrentTuple => {
                write!(f, "There is no current tuple to mark the position of.")
            }
            Error::NoMarkSet => {
                write!(f, "The stream has no marked position to reset to.")
            }
            Error::WrongArity(tup_size, schema_size) => {
                write!(f,
                       "Tuple has different arity ({} columns) than target schema ({} columns).",
                       tup_size,
                       schema_size)
            }
        }
    }
}

pub use self::Error as PlanError;

/// A result that returns something and has a plan error.
pub type PlanResult<T> = Result<T, Error>;

/// Executes a plan node to completion and returns a vector of tuple literals that came from
/// the plan. The plan is initialized first, so the stream always starts from the beginning,
/// and the plan is cleaned up on every exit path, successful or not.
///
/// # Arguments
/// * plan - the root of the plan to execute.
pub fn get_plan_results(plan: &mut PlanNode) -> PlanResult<Vec<TupleLiteral>> {
    plan.initialize();

    let mut tuples: Vec<TupleLiteral> = Vec::new();
    let result = collect_tuples(plan, &mut tuples);

    // Clean-up is mandatory whether the pull loop succeeded or unwound with an error.
    plan.clean_up();

    result.map(|_| tuples)
}

fn collect_tuples(plan: &mut PlanNode, tuples: &mut Vec<TupleLiteral>) -> PlanResult<()> {
    while let Some(boxed_tuple) = try!(plan.get_next_tuple()) {
        let literal = TupleLiteral::from_tuple(boxed_tuple);
        tuples.push(literal);
    }
    Ok(())
}
