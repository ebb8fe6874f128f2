use super::creators::creator_for;
use super::parser::{FilterOperator, ValueFilter, format_values};
use crate::config::FilterConfiguration;
use crate::errors::FilterCreationError;
use crate::expression::Expr;
use crate::schema::PropertyDescriptor;

/// The parsed values filtering one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFilter {
    property: PropertyDescriptor,
    values: Vec<ValueFilter>,
}

impl PropertyFilter {
    pub fn new(property: PropertyDescriptor, values: Vec<ValueFilter>) -> Self {
        Self { property, values }
    }

    pub fn parse(property: PropertyDescriptor, syntax: &str) -> Self {
        Self::new(property, ValueFilter::parse_all(syntax))
    }

    pub fn property(&self) -> &PropertyDescriptor {
        &self.property
    }

    pub fn name(&self) -> &str {
        self.property.name()
    }

    pub fn values(&self) -> &[ValueFilter] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values written back in filter syntax.
    pub fn syntax(&self) -> String {
        format_values(&self.values)
    }

    /// Appends values; they OR with the existing ones.
    pub fn merge(&mut self, values: impl IntoIterator<Item = ValueFilter>) {
        self.values.extend(values);
    }

    pub fn supported_filter_operators(&self) -> &'static [FilterOperator] {
        creator_for(self.property.property_type()).supported_filter_operators()
    }

    /// `Ok(None)` when no value constrains the property.
    pub fn create_expression(
        &self,
        configuration: &FilterConfiguration,
    ) -> Result<Option<Expr>, FilterCreationError> {
        creator_for(self.property.property_type()).create_expression(
            &self.property,
            &self.values,
            configuration,
        )
    }
}
