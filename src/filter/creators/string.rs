use super::ValueExpressionCreator;
use crate::config::FilterConfiguration;
use crate::errors::FilterCreationError;
use crate::expression::{CompareOp, Expr, Operand};
use crate::filter::FilterOperator;
use crate::schema::{PropertyDescriptor, PropertyType, ScalarType};
use crate::value::Value;

const OPERATORS: &[FilterOperator] = &[
    FilterOperator::Default,
    FilterOperator::Contains,
    FilterOperator::EqualCaseSensitive,
    FilterOperator::EqualCaseInsensitive,
    FilterOperator::NotEqual,
    FilterOperator::IsNull,
    FilterOperator::NotNull,
];

/// Strings never fail to parse; case-insensitive operators compare uppercased
/// text and an empty string counts as null.
pub struct StringExpressionCreator;

impl ValueExpressionCreator for StringExpressionCreator {
    fn can_create_expression_for(&self, property_type: &PropertyType) -> bool {
        *property_type.scalar() == ScalarType::String
    }

    fn supported_filter_operators(&self) -> &'static [FilterOperator] {
        OPERATORS
    }

    fn create_expression_for_value(
        &self,
        property: &PropertyDescriptor,
        operator: FilterOperator,
        value: &str,
        _configuration: &FilterConfiguration,
    ) -> Result<Expr, FilterCreationError> {
        let name = property.name();
        let upper = || {
            (
                Operand::property(name).upper(),
                Operand::constant(value.to_uppercase()),
            )
        };

        match operator {
            FilterOperator::Default | FilterOperator::EqualCaseSensitive => {
                Ok(Expr::property_compare(CompareOp::Eq, name, value))
            }
            FilterOperator::NotEqual => Ok(Expr::property_compare(CompareOp::Ne, name, value)),
            FilterOperator::EqualCaseInsensitive => {
                let (left, right) = upper();
                Ok(Expr::compare(CompareOp::Eq, left, right))
            }
            FilterOperator::Contains => {
                let (left, right) = upper();
                Ok(Expr::compare(CompareOp::Contains, left, right))
            }
            other => Err(FilterCreationError::unsupported_operator(
                property,
                other,
                Some(value),
            )),
        }
    }

    fn create_null_test(
        &self,
        property: &PropertyDescriptor,
        operator: FilterOperator,
    ) -> Result<Expr, FilterCreationError> {
        let name = property.name();
        Ok(if operator == FilterOperator::IsNull {
            Expr::or_any(vec![
                Expr::property_compare(CompareOp::Eq, name, Value::Null),
                Expr::property_compare(CompareOp::Eq, name, ""),
            ])
        } else {
            Expr::and_all(vec![
                Expr::property_compare(CompareOp::Ne, name, Value::Null),
                Expr::property_compare(CompareOp::Ne, name, ""),
            ])
        })
    }
}
