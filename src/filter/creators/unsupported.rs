use super::ValueExpressionCreator;
use crate::config::FilterConfiguration;
use crate::errors::FilterCreationError;
use crate::expression::Expr;
use crate::filter::FilterOperator;
use crate::schema::{PropertyDescriptor, PropertyType, ScalarType};

/// Fallback for property types no other creator handles.
pub struct UnsupportedExpressionCreator;

impl ValueExpressionCreator for UnsupportedExpressionCreator {
    fn can_create_expression_for(&self, property_type: &PropertyType) -> bool {
        matches!(property_type.scalar(), ScalarType::Unsupported(_))
    }

    fn supported_filter_operators(&self) -> &'static [FilterOperator] {
        &[]
    }

    fn create_expression_for_value(
        &self,
        property: &PropertyDescriptor,
        operator: FilterOperator,
        value: &str,
        _configuration: &FilterConfiguration,
    ) -> Result<Expr, FilterCreationError> {
        Err(FilterCreationError::unsupported_operator(
            property,
            operator,
            Some(value),
        ))
    }

    fn create_null_test(
        &self,
        property: &PropertyDescriptor,
        operator: FilterOperator,
    ) -> Result<Expr, FilterCreationError> {
        Err(FilterCreationError::unsupported_operator(
            property, operator, None,
        ))
    }
}
