//! This module provides the `Literal` type, the runtime representation of a single column
//! value.

use ::relations::ColumnType;

/// A runtime value produced by evaluating an expression or reading a column out of a tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
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
    /// NULL
    Null,
    /// TRUE
    True,
    /// FALSE
    False,
}

impl From<bool> for Literal {
    fn from(value: bool) -> Literal {
        if value {
            Literal::True
        } else {
            Literal::False
        }
    }
}

impl Literal {
    /// Whether the literal is a numeric value.
    pub fn is_numeric(&self) -> bool {
        match *self {
            Literal::Int(_) | Literal::Long(_) | Literal::Float(_) | Literal::Double(_) => true,
            _ => false,
        }
    }

    /// Whether the literal is a long value.
    pub fn is_long(&self) -> bool {
        match *self {
            Literal::Long(_) => true,
            _ => false,
        }
    }

    /// Whether the literal is a float value.
    pub fn is_float(&self) -> bool {
        match *self {
            Literal::Float(_) => true,
            _ => false,
        }
    }

    /// Whether the literal is a double value.
    pub fn is_double(&self) -> bool {
        match *self {
            Literal::Double(_) => true,
            _ => false,
        }
    }

    /// Coerce the literal to an integer literal, if it is numeric.
    pub fn as_int(&self) -> Option<Literal> {
        match *self {
            Literal::Int(i) => Some(Literal::Int(i)),
            Literal::Long(l) => Some(Literal::Int(l as i32)),
            Literal::Float(f) => Some(Literal::Int(f as i32)),
            Literal::Double(d) => Some(Literal::Int(d as i32)),
            _ => None,
        }
    }

    /// Coerce the literal to a long literal, if it is numeric.
    pub fn as_long(&self) -> Option<Literal> {
        match *self {
            Literal::Int(i) => Some(Literal::Long(i as i64)),
            Literal::Long(l) => Some(Literal::Long(l)),
            Literal::Float(f) => Some(Literal::Long(f as i64)),
            Literal::Double(d) => Some(Literal::Long(d as i64)),
            _ => None,
        }
    }

    /// Coerce the literal to a float literal, if it is numeric.
    pub fn as_float(&self) -> Option<Literal> {
        match *self {
            Literal::Int(i) => Some(Literal::Float(i as f32)),
            Literal::Long(l) => Some(Literal::Float(l as f32)),
            Literal::Float(f) => Some(Literal::Float(f)),
            Literal::Double(d) => Some(Literal::Float(d as f32)),
            _ => None,
        }
    }

    /// Coerce the literal to a double literal, if it is numeric.
    pub fn as_double(&self) -> Option<Literal> {
        match *self {
            Literal::Int(i) => Some(Literal::Double(i as f64)),
            Literal::Long(l) => Some(Literal::Double(l as f64)),
            Literal::Float(f) => Some(Literal::Double(f as f64)),
            Literal::Double(d) => Some(Literal::Double(d)),
            _ => None,
        }
    }

    /// Retrieve the string contents of the literal, if it is a string.
    pub fn as_string(&self) -> Option<String> {
        match *self {
            Literal::String(ref s) => Some(s.clone()),
            _ => None,
        }
    }

    /// The column type a value of this literal's kind would naturally be stored as. String
    /// literals map to a `VARCHAR` sized to the literal itself.
    pub fn get_column_type(&self) -> ColumnType {
        match *self {
            Literal::Int(_) => ColumnType::Integer,
            Literal::Long(_) => ColumnType::BigInt,
            Literal::Float(_) => ColumnType::Float,
            Literal::Double(_) => ColumnType::Double,
            Literal::String(ref s) => ColumnType::VarChar { length: s.len() as u16 },
            Literal::True | Literal::False => ColumnType::TinyInt,
            Literal::Null => ColumnType::Null,
        }
    }
}

impl ::std::fmt::Display for Literal {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Long(l) => write!(f, "{}", l),
            Literal::Float(fl) => write!(f, "{}", fl),
            Literal::Double(d) => write!(f, "{}", d),
            Literal::String(ref s) => write!(f, "'{}'", s),
            Literal::Null => write!(f, "NULL"),
            Literal::True => write!(f, "TRUE"),
            Literal::False => write!(f, "FALSE"),
        }
    }
}
