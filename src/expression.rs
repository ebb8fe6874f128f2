//! Predicate AST produced by compiling a filter.
//!
//! The tree is plain data: it serializes with serde so an external backend can
//! translate it, and [`Expr::evaluate`] runs it against in-memory entities.
//!
//! Comparisons use lifted null semantics. `Eq` holds when both sides are null
//! or both are equal, `Ne` is its negation, and every ordering comparison or
//! `Contains` with a null side is false.

use crate::record::Entity;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Substring test on string operands.
    Contains,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Contains => "contains",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Property(String),
    Constant(Value),
    /// Uppercased string form of the inner operand.
    Upper(Box<Operand>),
    /// Canonical text form of the inner operand.
    Text(Box<Operand>),
}

impl Operand {
    pub fn property(name: impl Into<String>) -> Self {
        Operand::Property(name.into())
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Operand::Constant(value.into())
    }

    pub fn upper(self) -> Self {
        Operand::Upper(Box::new(self))
    }

    pub fn text(self) -> Self {
        Operand::Text(Box::new(self))
    }

    pub fn resolve(&self, entity: &dyn Entity) -> Value {
        match self {
            Operand::Property(name) => entity.property_value(name),
            Operand::Constant(value) => value.clone(),
            Operand::Upper(inner) => inner.resolve(entity).to_upper(),
            Operand::Text(inner) => inner.resolve(entity).to_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Constant(bool),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    /// Runtime type test; `exact` compares the type itself, otherwise any
    /// derived type also passes.
    TypeIs { type_name: String, exact: bool },
}

impl Expr {
    pub fn compare(op: CompareOp, left: Operand, right: Operand) -> Self {
        Expr::Compare { op, left, right }
    }

    /// `property <op> constant`, the shape every value creator emits.
    pub fn property_compare(op: CompareOp, property: &str, value: impl Into<Value>) -> Self {
        Expr::compare(op, Operand::property(property), Operand::constant(value))
    }

    pub fn type_is(type_name: impl Into<String>, exact: bool) -> Self {
        Expr::TypeIs {
            type_name: type_name.into(),
            exact,
        }
    }

    /// Conjunction; no operands is `true`, a single operand is returned as is.
    pub fn and_all(mut operands: Vec<Expr>) -> Self {
        match operands.len() {
            0 => Expr::Constant(true),
            1 => operands.remove(0),
            _ => Expr::And(operands),
        }
    }

    /// Disjunction; no operands is `false`, a single operand is returned as is.
    pub fn or_any(mut operands: Vec<Expr>) -> Self {
        match operands.len() {
            0 => Expr::Constant(false),
            1 => operands.remove(0),
            _ => Expr::Or(operands),
        }
    }

    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// `condition => consequence`, encoded as `!condition || consequence`.
    pub fn implies(condition: Expr, consequence: Expr) -> Self {
        Expr::Or(vec![condition.negate(), consequence])
    }

    pub fn evaluate(&self, entity: &dyn Entity) -> bool {
        match self {
            Expr::Constant(b) => *b,
            Expr::And(operands) => operands.iter().all(|e| e.evaluate(entity)),
            Expr::Or(operands) => operands.iter().any(|e| e.evaluate(entity)),
            Expr::Not(inner) => !inner.evaluate(entity),
            Expr::Compare { op, left, right } => {
                compare_values(*op, &left.resolve(entity), &right.resolve(entity))
            }
            Expr::TypeIs { type_name, exact } => {
                let actual = entity.entity_type();
                if *exact {
                    actual.name() == type_name
                } else {
                    actual.is_assignable_to_name(type_name)
                }
            }
        }
    }
}

fn compare_values(op: CompareOp, left: &Value, right: &Value) -> bool {
    match op {
        CompareOp::Eq => left.equals(right),
        CompareOp::Ne => !left.equals(right),
        CompareOp::Lt => left.compare(right) == Some(Ordering::Less),
        CompareOp::Le => matches!(
            left.compare(right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CompareOp::Gt => left.compare(right) == Some(Ordering::Greater),
        CompareOp::Ge => matches!(
            left.compare(right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CompareOp::Contains => match (left.as_str(), right.as_str()) {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Property(name) => write!(f, "x.{name}"),
            Operand::Constant(Value::String(s)) => write!(f, "{s:?}"),
            Operand::Constant(value) => write!(f, "{value}"),
            Operand::Upper(inner) => write!(f, "upper({inner})"),
            Operand::Text(inner) => write!(f, "text({inner})"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(b) => write!(f, "{b}"),
            Expr::And(operands) => write_joined(f, operands, " && "),
            Expr::Or(operands) => write_joined(f, operands, " || "),
            Expr::Not(inner) => write!(f, "!({inner})"),
            Expr::Compare {
                op: CompareOp::Contains,
                left,
                right,
            } => write!(f, "contains({left}, {right})"),
            Expr::Compare { op, left, right } => write!(f, "{left} {} {right}", op.symbol()),
            Expr::TypeIs { type_name, exact } => {
                if *exact {
                    write!(f, "type(x) == {type_name}")
                } else {
                    write!(f, "x is {type_name}")
                }
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, operands: &[Expr], separator: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{operand}")?;
    }
    write!(f, ")")
}
