//! This module contains utilities for dealing with expressions, including the `Expression`
//! enum.

use ::relations::{ColumnName, ColumnType, Schema, column_name_to_string};
use super::{ArithmeticType, CompareType, Environment, ExpressionError, Literal};

fn coerce_literals(left: Literal, right: Literal) -> (Literal, Literal) {
    // WE ASSUME THAT BOTH LITERALS ARE ARITHMETIC HERE.
    if left.is_double() || right.is_double() {
        // If either is a double, coerce both to doubles.
        (left.as_double().unwrap(), right.as_double().unwrap())
    } else if left.is_float() || right.is_float() {
        // If either is a float, coerce both to floats.
        (left.as_float().unwrap(), right.as_float().unwrap())
    } else if left.is_long() || right.is_long() {
        // If either is a long, coerce both to longs.
        (left.as_long().unwrap(), right.as_long().unwrap())
    } else {
        (left.as_int().unwrap(), right.as_int().unwrap())
    }
}

/// The static analogue of `coerce_literals`: the result type of a numeric operation over two
/// operand types, following the same DOUBLE > FLOAT > BIGINT > INTEGER ladder.
fn coerce_types(left: ColumnType, right: ColumnType) -> ColumnType {
    if left == ColumnType::Double || right == ColumnType::Double {
        ColumnType::Double
    } else if left == ColumnType::Float || right == ColumnType::Float {
        ColumnType::Float
    } else if left == ColumnType::BigInt || right == ColumnType::BigInt {
        ColumnType::BigInt
    } else {
        ColumnType::Integer
    }
}

/// An expression that can appear in a select value or predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A Boolean OR expression
    OR(Vec<Expression>),
    /// A Boolean AND expression
    AND(Vec<Expression>),
    /// A Boolean NOT expression
    NOT(Box<Expression>),
    /// A comparison expression
    Compare(Box<Expression>, CompareType, Box<Expression>),
    /// An IS NULL operator
    IsNull(Box<Expression>),
    /// An arithmetic expression
    Arithmetic(Box<Expression>, ArithmeticType, Box<Expression>),
    /// A column value for later dynamic evaluation.
    ColumnValue(ColumnName),
    /// NULL
    Null,
    /// TRUE
    True,
    /// FALSE
    False,
    /// An integer
    Int(i32),
    /// A long
    Long(i64),
    /// A float
    Float(f32),
    /// A double
    Double(f64),
    /// A string
    String(String),
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Int(i) => Expression::Int(i),
            Literal::Long(l) => Expression::Long(l),
            Literal::Float(f) => Expression::Float(f),
            Literal::Double(d) => Expression::Double(d),
            Literal::String(s) => Expression::String(s),
            Literal::Null => Expression::Null,
            Literal::True => Expression::True,
            Literal::False => Expression::False,
        }
    }
}

impl From<ColumnName> for Expression {
    fn from(name: ColumnName) -> Self {
        Expression::ColumnValue(name)
    }
}

impl Expression {
    fn try_literal(&self) -> Option<Literal> {
        match *self {
            Expression::Int(i) => Literal::Int(i).into(),
            Expression::Long(l) => Literal::Long(l).into(),
            Expression::Float(f) => Literal::Float(f).into(),
            Expression::Double(d) => Literal::Double(d).into(),
            Expression::String(ref s) => Literal::String(s.clone()).into(),
            Expression::Null => Literal::Null.into(),
            Expression::True => Literal::True.into(),
            Expression::False => Literal::False.into(),
            _ => None,
        }
    }

    /// Evaluates this expression object in the context of the specified environment. The
    /// environment provides any external information necessary to evaluate the expression,
    /// such as the current tuples loaded from tables referenced within the expression.
    ///
    /// # Arguments
    /// * env - the environment to look up symbol-values from, when evaluating the expression
    ///
    /// # Errors
    /// This will return some `ExpressionError` if the expression cannot be evaluated given the
    /// environment.
    pub fn evaluate(&self, env: &mut Option<&mut Environment>) -> Result<Literal, ExpressionError> {
        if let Some(l) = self.try_literal() {
            return Ok(l);
        }
        match *self {
            Expression::Arithmetic(ref left, op, ref right) => {
                evaluate_arithmetic(env, left, right, op)
            }
            Expression::Compare(ref left, op, ref right) => {
                evaluate_compare(env, left, right, op)
            }
            Expression::OR(ref exprs) => {
                if exprs.is_empty() {
                    return Err(ExpressionError::EmptyExpression);
                }
                for expr in exprs {
                    let value = try!(expr.evaluate(env));
                    match value {
                        Literal::True => {
                            // Can short-circuit here.
                            return Ok(Literal::True);
                        }
                        Literal::False => {
                            // Do nothing because we have to check the others.
                        }
                        _ => {
                            return Err(ExpressionError::NotBoolean(value));
                        }
                    }
                }
                Ok(Literal::False)
            }
            Expression::AND(ref exprs) => {
                if exprs.is_empty() {
                    return Err(ExpressionError::EmptyExpression);
                }
                for expr in exprs {
                    let value = try!(expr.evaluate(env));
                    match value {
                        Literal::True => {
                            // Do nothing because we have to check the others.
                        }
                        Literal::False => {
                            // Can short-circuit here.
                            return Ok(Literal::False);
                        }
                        _ => {
                            return Err(ExpressionError::NotBoolean(value));
                        }
                    }
                }
                Ok(Literal::True)
            }
            Expression::NOT(ref inner) => {
                let value = try!(inner.evaluate(env));
                match value {
                    Literal::False => Ok(Literal::True),
                    Literal::True => Ok(Literal::False),
                    _ => Err(ExpressionError::NotBoolean(value)),
                }
            }
            Expression::IsNull(ref inner) => {
                let value = try!(inner.evaluate(env));
                Ok(if value == Literal::Null {
                    Literal::True
                } else {
                    Literal::False
                })
            }
            Expression::ColumnValue(ref name) => {
                if let Some(ref mut inner) = *env {
                    inner.get_column_value(name)
                } else {
                    Err(ExpressionError::CouldNotResolve(name.clone()))
                }
            }
            _ => Err(ExpressionError::Unimplemented),
        }
    }

    /// Statically determines the type this expression would evaluate to over tuples with the
    /// given schema, without actually evaluating it. Column references are resolved against the
    /// schema; arithmetic follows the same coercion ladder as evaluation; boolean operators
    /// produce `TINYINT`.
    ///
    /// # Arguments
    /// * schema - the schema to resolve column references against
    ///
    /// # Errors
    /// Fails when a column reference cannot be resolved or is ambiguous, or when an arithmetic
    /// operand is of a non-numeric type.
    pub fn get_column_type(&self, schema: &Schema) -> Result<ColumnType, ExpressionError> {
        if let Some(l) = self.try_literal() {
            return Ok(l.get_column_type());
        }
        match *self {
            Expression::ColumnValue(ref name) => {
                let matches = schema.find_columns(name);
                if matches.is_empty() {
                    return Err(ExpressionError::CouldNotResolve(name.clone()));
                }
                if matches.len() > 1 {
                    return Err(ExpressionError::AmbiguousColumnName(name.clone()));
                }
                Ok(matches[0].1.column_type)
            }
            Expression::Arithmetic(ref left, _, ref right) => {
                let left_type = try!(left.get_column_type(schema));
                let right_type = try!(right.get_column_type(schema));
                if !left_type.is_numeric() {
                    return Err(ExpressionError::NotNumericType(left_type));
                }
                if !right_type.is_numeric() {
                    return Err(ExpressionError::NotNumericType(right_type));
                }
                Ok(coerce_types(left_type, right_type))
            }
            Expression::Compare(ref left, _, ref right) => {
                let left_type = try!(left.get_column_type(schema));
                let right_type = try!(right.get_column_type(schema));
                if !left_type.is_numeric() {
                    return Err(ExpressionError::NotNumericType(left_type));
                }
                if !right_type.is_numeric() {
                    return Err(ExpressionError::NotNumericType(right_type));
                }
                Ok(ColumnType::TinyInt)
            }
            Expression::OR(ref exprs) |
            Expression::AND(ref exprs) => {
                if exprs.is_empty() {
                    return Err(ExpressionError::EmptyExpression);
                }
                for expr in exprs {
                    try!(expr.get_column_type(schema));
                }
                Ok(ColumnType::TinyInt)
            }
            Expression::NOT(ref inner) |
            Expression::IsNull(ref inner) => {
                try!(inner.get_column_type(schema));
                Ok(ColumnType::TinyInt)
            }
            // Literals were handled up front.
            _ => Err(ExpressionError::Unimplemented),
        }
    }
}

fn evaluate_arithmetic(env: &mut Option<&mut Environment>,
                       left: &Expression,
                       right: &Expression,
                       op: ArithmeticType)
                       -> Result<Literal, ExpressionError> {
    let left_val = try!(left.evaluate(env));
    let right_val = try!(right.evaluate(env));
    if !left_val.is_numeric() {
        return Err(ExpressionError::NotNumeric(left_val));
    }
    if !right_val.is_numeric() {
        return Err(ExpressionError::NotNumeric(right_val));
    }
    let (left_val, right_val) = coerce_literals(left_val, right_val);
    match op {
        ArithmeticType::Plus => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok(Literal::Int(l + r)),
                (Literal::Double(l), Literal::Double(r)) => Ok(Literal::Double(l + r)),
                (Literal::Float(l), Literal::Float(r)) => Ok(Literal::Float(l + r)),
                (Literal::Long(l), Literal::Long(r)) => Ok(Literal::Long(l + r)),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
        ArithmeticType::Minus => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok(Literal::Int(l - r)),
                (Literal::Double(l), Literal::Double(r)) => Ok(Literal::Double(l - r)),
                (Literal::Float(l), Literal::Float(r)) => Ok(Literal::Float(l - r)),
                (Literal::Long(l), Literal::Long(r)) => Ok(Literal::Long(l - r)),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
        ArithmeticType::Multiply => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok(Literal::Int(l * r)),
                (Literal::Double(l), Literal::Double(r)) => Ok(Literal::Double(l * r)),
                (Literal::Float(l), Literal::Float(r)) => Ok(Literal::Float(l * r)),
                (Literal::Long(l), Literal::Long(r)) => Ok(Literal::Long(l * r)),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
        ArithmeticType::Divide => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok(Literal::Int(l / r)),
                (Literal::Double(l), Literal::Double(r)) => Ok(Literal::Double(l / r)),
                (Literal::Float(l), Literal::Float(r)) => Ok(Literal::Float(l / r)),
                (Literal::Long(l), Literal::Long(r)) => Ok(Literal::Long(l / r)),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
        ArithmeticType::Remainder => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok(Literal::Int(l % r)),
                (Literal::Double(l), Literal::Double(r)) => Ok(Literal::Double(l % r)),
                (Literal::Float(l), Literal::Float(r)) => Ok(Literal::Float(l % r)),
                (Literal::Long(l), Literal::Long(r)) => Ok(Literal::Long(l % r)),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
    }
}

fn evaluate_compare(env: &mut Option<&mut Environment>,
                    left: &Expression,
                    right: &Expression,
                    op: CompareType)
                    -> Result<Literal, ExpressionError> {
    let left_val = try!(left.evaluate(env));
    let right_val = try!(right.evaluate(env));
    if !left_val.is_numeric() {
        return Err(ExpressionError::NotNumeric(left_val));
    }
    if !right_val.is_numeric() {
        return Err(ExpressionError::NotNumeric(right_val));
    }
    let (left_val, right_val) = coerce_literals(left_val, right_val);
    match op {
        CompareType::GreaterThan => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok((l > r).into()),
                (Literal::Double(l), Literal::Double(r)) => Ok((l > r).into()),
                (Literal::Float(l), Literal::Float(r)) => Ok((l > r).into()),
                (Literal::Long(l), Literal::Long(r)) => Ok((l > r).into()),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
        CompareType::GreaterThanEqual => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok((l >= r).into()),
                (Literal::Double(l), Literal::Double(r)) => Ok((l >= r).into()),
                (Literal::Float(l), Literal::Float(r)) => Ok((l >= r).into()),
                (Literal::Long(l), Literal::Long(r)) => Ok((l >= r).into()),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
        CompareType::LessThan => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok((l < r).into()),
                (Literal::Double(l), Literal::Double(r)) => Ok((l < r).into()),
                (Literal::Float(l), Literal::Float(r)) => Ok((l < r).into()),
                (Literal::Long(l), Literal::Long(r)) => Ok((l < r).into()),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
        CompareType::LessThanEqual => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok((l <= r).into()),
                (Literal::Double(l), Literal::Double(r)) => Ok((l <= r).into()),
                (Literal::Float(l), Literal::Float(r)) => Ok((l <= r).into()),
                (Literal::Long(l), Literal::Long(r)) => Ok((l <= r).into()),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
        CompareType::Equals => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok((l == r).into()),
                (Literal::Double(l), Literal::Double(r)) => Ok((l == r).into()),
                (Literal::Float(l), Literal::Float(r)) => Ok((l == r).into()),
                (Literal::Long(l), Literal::Long(r)) => Ok((l == r).into()),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
        CompareType::NotEquals => {
            match (left_val, right_val) {
                (Literal::Int(l), Literal::Int(r)) => Ok((l != r).into()),
                (Literal::Double(l), Literal::Double(r)) => Ok((l != r).into()),
                (Literal::Float(l), Literal::Float(r)) => Ok((l != r).into()),
                (Literal::Long(l), Literal::Long(r)) => Ok((l != r).into()),
                _ => Err(ExpressionError::Unimplemented),
            }
        }
    }
}

fn wrap_expr_parens(expr: &Expression) -> String {
    if let Some(_) = expr.try_literal() {
        format!("{}", expr)
    } else {
        format!("({})", expr)
    }
}

impl ::std::fmt::Display for Expression {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            Expression::True => write!(f, "TRUE"),
            Expression::False => write!(f, "FALSE"),
            Expression::Null => write!(f, "NULL"),
            Expression::Int(num) => write!(f, "{}", num),
            Expression::Long(num) => write!(f, "{}", num),
            Expression::Float(num) => write!(f, "{}", num),
            Expression::Double(num) => write!(f, "{}", num),
            Expression::String(ref s) => write!(f, "\'{}\'", s),
            Expression::ColumnValue(ref name) => write!(f, "{}", column_name_to_string(name)),
            Expression::OR(ref exprs) => {
                let r: Vec<_> = exprs.iter().map(|e| wrap_expr_parens(e)).collect();
                write!(f, "{}", r.join(" OR "))
            }
            Expression::AND(ref exprs) => {
                let r: Vec<_> = exprs.iter().map(|e| wrap_expr_parens(e)).collect();
                write!(f, "{}", r.join(" AND "))
            }
            Expression::NOT(ref e) => {
                write!(f, "!{}", e)
            }
            Expression::IsNull(ref e) => {
                write!(f, "{} IS NULL", e)
            }
            Expression::Compare(ref l, op, ref r) => {
                write!(f, "{} {} {}", l, op, r)
            }
            Expression::Arithmetic(ref l, op, ref r) => {
                write!(f, "{} {} {}", l, op, r)
            }
        }
    }
}
