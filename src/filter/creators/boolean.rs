use super::{ValueExpressionCreator, comparison_for};
use crate::config::FilterConfiguration;
use crate::errors::FilterCreationError;
use crate::expression::Expr;
use crate::filter::FilterOperator;
use crate::schema::{PropertyDescriptor, PropertyType, ScalarType};

const OPERATORS: &[FilterOperator] = &[
    FilterOperator::Default,
    FilterOperator::EqualCaseSensitive,
    FilterOperator::EqualCaseInsensitive,
    FilterOperator::NotEqual,
    FilterOperator::IsNull,
    FilterOperator::NotNull,
];

pub struct BoolExpressionCreator;

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

impl ValueExpressionCreator for BoolExpressionCreator {
    fn can_create_expression_for(&self, property_type: &PropertyType) -> bool {
        *property_type.scalar() == ScalarType::Bool
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
        let op = comparison_for(operator)
            .filter(|_| OPERATORS.contains(&operator))
            .ok_or_else(|| {
                FilterCreationError::unsupported_operator(property, operator, Some(value))
            })?;
        let parsed = parse_bool(value)
            .ok_or_else(|| FilterCreationError::unparsable_value(property, operator, value))?;
        Ok(Expr::property_compare(op, property.name(), parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_literals() {
        for text in ["true", "TRUE", "1", "Yes"] {
            assert_eq!(parse_bool(text), Some(true), "{text}");
        }
        for text in ["false", "0", "no", " No "] {
            assert_eq!(parse_bool(text), Some(false), "{text}");
        }
        assert_eq!(parse_bool("null"), None);
        assert_eq!(parse_bool(""), None);
    }
}
