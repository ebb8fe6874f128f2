//! Per-type value expression creators.
//!
//! Each creator turns one parsed [`ValueFilter`] into a predicate fragment for
//! a property of the type family it handles. [`creator_for`] picks the first
//! creator accepting a property type, trying string, guid, date/time, boolean,
//! numeric and enum in that order, then falling back to a creator that
//! rejects every operator.

mod boolean;
mod datetime;
mod enumeration;
mod guid;
mod numeric;
mod string;
mod unsupported;

pub use boolean::BoolExpressionCreator;
pub use datetime::DateTimeExpressionCreator;
pub use enumeration::EnumExpressionCreator;
pub use guid::GuidExpressionCreator;
pub use numeric::NumericExpressionCreator;
pub use string::StringExpressionCreator;
pub use unsupported::UnsupportedExpressionCreator;

use super::parser::{FilterOperator, ValueFilter};
use crate::config::FilterConfiguration;
use crate::errors::FilterCreationError;
use crate::expression::{CompareOp, Expr};
use crate::schema::{PropertyDescriptor, PropertyType};
use crate::value::Value;
use lazy_static::lazy_static;
use tracing::{debug, trace};

pub trait ValueExpressionCreator: Send + Sync {
    fn can_create_expression_for(&self, property_type: &PropertyType) -> bool;

    fn supported_filter_operators(&self) -> &'static [FilterOperator];

    /// Builds the fragment for one non-null-test value.
    fn create_expression_for_value(
        &self,
        property: &PropertyDescriptor,
        operator: FilterOperator,
        value: &str,
        configuration: &FilterConfiguration,
    ) -> Result<Expr, FilterCreationError>;

    /// `ISNULL` / `NOTNULL`; only nullable properties accept them.
    fn create_null_test(
        &self,
        property: &PropertyDescriptor,
        operator: FilterOperator,
    ) -> Result<Expr, FilterCreationError> {
        if !property.property_type().is_nullable() {
            return Err(FilterCreationError::unsupported_operator(
                property, operator, None,
            ));
        }
        let op = if operator == FilterOperator::IsNull {
            CompareOp::Eq
        } else {
            CompareOp::Ne
        };
        Ok(Expr::property_compare(op, property.name(), Value::Null))
    }

    /// ORs the fragments of all values. `Ok(None)` means no value constrains
    /// the property, either because there were none or because every value
    /// was dropped as unparsable.
    fn create_expression(
        &self,
        property: &PropertyDescriptor,
        values: &[ValueFilter],
        configuration: &FilterConfiguration,
    ) -> Result<Option<Expr>, FilterCreationError> {
        let mut fragments = Vec::with_capacity(values.len());

        for value_filter in values {
            let operator = value_filter.operator();
            if !self.supported_filter_operators().contains(&operator) {
                return Err(FilterCreationError::unsupported_operator(
                    property,
                    operator,
                    value_filter.value(),
                ));
            }

            let fragment = match value_filter.value() {
                None => self.create_null_test(property, operator),
                Some(value) => {
                    self.create_expression_for_value(property, operator, value, configuration)
                }
            };

            match fragment {
                Ok(expr) => {
                    trace!(property = property.name(), %value_filter, %expr, "created value expression");
                    fragments.push(expr);
                }
                Err(err) if err.is_parse_failure() && configuration.ignore_parse_exceptions() => {
                    debug!(property = property.name(), %value_filter, "dropping unparsable filter value");
                }
                Err(err) => return Err(err),
            }
        }

        if fragments.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Expr::or_any(fragments)))
        }
    }
}

lazy_static! {
    static ref CREATORS: Vec<Box<dyn ValueExpressionCreator>> = vec![
        Box::new(StringExpressionCreator),
        Box::new(GuidExpressionCreator),
        Box::new(DateTimeExpressionCreator),
        Box::new(BoolExpressionCreator),
        Box::new(NumericExpressionCreator),
        Box::new(EnumExpressionCreator),
    ];
}

static UNSUPPORTED: UnsupportedExpressionCreator = UnsupportedExpressionCreator;

pub fn creator_for(property_type: &PropertyType) -> &'static dyn ValueExpressionCreator {
    let creators: &'static Vec<Box<dyn ValueExpressionCreator>> = &CREATORS;
    creators
        .iter()
        .find(|c| c.can_create_expression_for(property_type))
        .map(|c| c.as_ref())
        .unwrap_or(&UNSUPPORTED)
}

/// Maps the equality/ordering operators onto comparisons; `None` for the
/// operators each creator handles itself.
pub(crate) fn comparison_for(operator: FilterOperator) -> Option<CompareOp> {
    match operator {
        FilterOperator::Default
        | FilterOperator::EqualCaseSensitive
        | FilterOperator::EqualCaseInsensitive => Some(CompareOp::Eq),
        FilterOperator::NotEqual => Some(CompareOp::Ne),
        FilterOperator::LessThan => Some(CompareOp::Lt),
        FilterOperator::LessThanOrEqual => Some(CompareOp::Le),
        FilterOperator::GreaterThan => Some(CompareOp::Gt),
        FilterOperator::GreaterThanOrEqual => Some(CompareOp::Ge),
        FilterOperator::Contains | FilterOperator::IsNull | FilterOperator::NotNull => None,
    }
}
