use super::{ValueExpressionCreator, comparison_for};
use crate::config::FilterConfiguration;
use crate::errors::FilterCreationError;
use crate::expression::{CompareOp, Expr, Operand};
use crate::filter::FilterOperator;
use crate::schema::{PropertyDescriptor, PropertyType, ScalarType};
use uuid::Uuid;

const OPERATORS: &[FilterOperator] = &[
    FilterOperator::Default,
    FilterOperator::Contains,
    FilterOperator::EqualCaseSensitive,
    FilterOperator::EqualCaseInsensitive,
    FilterOperator::NotEqual,
    FilterOperator::IsNull,
    FilterOperator::NotNull,
];

/// Identifiers have no case, so every equality operator is the same test.
/// `~fragment` searches the hyphenated text form and accepts partial input.
pub struct GuidExpressionCreator;

impl ValueExpressionCreator for GuidExpressionCreator {
    fn can_create_expression_for(&self, property_type: &PropertyType) -> bool {
        *property_type.scalar() == ScalarType::Guid
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
        let text = value.trim();
        let parsed = Uuid::parse_str(text).ok();

        if operator == FilterOperator::Contains {
            let fragment = match parsed {
                Some(guid) => guid.hyphenated().to_string(),
                None => text.to_string(),
            };
            return Ok(Expr::compare(
                CompareOp::Contains,
                Operand::property(property.name()).text().upper(),
                Operand::constant(fragment.to_uppercase()),
            ));
        }

        let op = comparison_for(operator)
            .filter(|_| OPERATORS.contains(&operator))
            .ok_or_else(|| {
                FilterCreationError::unsupported_operator(property, operator, Some(value))
            })?;
        let guid =
            parsed.ok_or_else(|| FilterCreationError::unparsable_value(property, operator, value))?;
        Ok(Expr::property_compare(op, property.name(), guid))
    }
}
