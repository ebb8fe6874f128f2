use super::compiled::CompiledFilter;
use super::parser::{FilterOperator, ValueFilter};
use super::property::PropertyFilter;
use crate::config::{FilterConfiguration, default_configuration};
use crate::errors::{FilterCreationError, FilterErrorReason};
use crate::expression::Expr;
use crate::schema::{EntityType, PropertyDescriptor};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// How a sub-filter's runtime type test is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubFilterKind {
    /// Applies to the derived type and everything deriving from it.
    DerivedClass,
    /// `inclusive` also applies to further derived types; otherwise only
    /// instances of exactly this type.
    Subclass { inclusive: bool },
}

/// A filter that only constrains instances of one derived type.
#[derive(Debug, Clone)]
pub struct SubFilter {
    kind: SubFilterKind,
    filter: EntityFilter,
}

impl SubFilter {
    pub fn kind(&self) -> SubFilterKind {
        self.kind
    }

    pub fn filter(&self) -> &EntityFilter {
        &self.filter
    }

    pub fn target_type(&self) -> &Arc<EntityType> {
        self.filter.entity_type()
    }

    pub fn type_test(&self) -> Expr {
        let exact = matches!(self.kind, SubFilterKind::Subclass { inclusive: false });
        Expr::type_is(self.target_type().name(), exact)
    }
}

/// Mutable builder of a filter over one entity type.
///
/// Property filters are validated as they are added, so a builder that
/// accepted every call compiles. Compiling does not change the builder and
/// can be repeated, including from several threads at once.
#[derive(Debug, Clone)]
pub struct EntityFilter {
    entity_type: Arc<EntityType>,
    configuration: Arc<FilterConfiguration>,
    property_filters: BTreeMap<String, PropertyFilter>,
    sub_filters: BTreeMap<String, SubFilter>,
}

impl EntityFilter {
    pub fn new(entity_type: Arc<EntityType>) -> Self {
        Self::with_configuration(entity_type, default_configuration())
    }

    pub fn with_configuration(
        entity_type: Arc<EntityType>,
        configuration: Arc<FilterConfiguration>,
    ) -> Self {
        Self {
            entity_type,
            configuration,
            property_filters: BTreeMap::new(),
            sub_filters: BTreeMap::new(),
        }
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    pub fn configuration(&self) -> &Arc<FilterConfiguration> {
        &self.configuration
    }

    pub fn property_filters(&self) -> impl Iterator<Item = &PropertyFilter> {
        self.property_filters.values()
    }

    pub fn property_filter(&self, property: &str) -> Option<&PropertyFilter> {
        self.property_filters.get(property)
    }

    pub fn sub_filters(&self) -> impl Iterator<Item = &SubFilter> {
        self.sub_filters.values()
    }

    pub fn sub_filter(&self, type_name: &str) -> Option<&SubFilter> {
        self.sub_filters.get(type_name)
    }

    pub fn is_empty(&self) -> bool {
        self.property_filters.is_empty() && self.sub_filters.is_empty()
    }

    /// Adds filter syntax for a property, ORed with any values it already has.
    /// Whitespace-only syntax leaves the filter unchanged.
    pub fn add(&mut self, property: &str, syntax: &str) -> Result<&mut Self, FilterCreationError> {
        self.add_value_filters(property, ValueFilter::parse_all(syntax))
    }

    /// Adds several values sharing one operator.
    pub fn add_values<I, S>(
        &mut self,
        property: &str,
        operator: FilterOperator,
        values: I,
    ) -> Result<&mut Self, FilterCreationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|value| ValueFilter::new(operator, value))
            .collect();
        self.add_value_filters(property, values)
    }

    /// Replaces the filter of a property. Whitespace-only syntax removes it.
    pub fn replace(
        &mut self,
        property: &str,
        syntax: &str,
    ) -> Result<&mut Self, FilterCreationError> {
        let descriptor = self.filterable_property(property)?;
        let values = ValueFilter::parse_all(syntax);
        if values.is_empty() {
            self.property_filters.remove(property);
            return Ok(self);
        }
        self.commit(PropertyFilter::new(descriptor, values))
    }

    pub fn remove(&mut self, property: &str) -> Option<PropertyFilter> {
        self.property_filters.remove(property)
    }

    fn add_value_filters(
        &mut self,
        property: &str,
        values: Vec<ValueFilter>,
    ) -> Result<&mut Self, FilterCreationError> {
        let descriptor = self.filterable_property(property)?;
        if values.is_empty() {
            return Ok(self);
        }
        let mut candidate = self
            .property_filters
            .get(property)
            .cloned()
            .unwrap_or_else(|| PropertyFilter::new(descriptor, Vec::new()));
        candidate.merge(values);
        self.commit(candidate)
    }

    fn commit(&mut self, candidate: PropertyFilter) -> Result<&mut Self, FilterCreationError> {
        candidate.create_expression(&self.configuration)?;
        for sub_filter in self.sub_filters.values() {
            check_conflict(&candidate, sub_filter.filter())?;
        }
        self.property_filters
            .insert(candidate.name().to_string(), candidate);
        Ok(self)
    }

    fn filterable_property(&self, property: &str) -> Result<PropertyDescriptor, FilterCreationError> {
        let descriptor = self.entity_type.property(property).ok_or_else(|| {
            FilterCreationError::new(FilterErrorReason::UnknownProperty {
                property: property.to_string(),
                entity_type: self.entity_type.name().to_string(),
            })
            .with_property(property)
        })?;
        if !descriptor.is_visible() {
            return Err(FilterCreationError::new(
                FilterErrorReason::PropertyNotFilterable {
                    property: property.to_string(),
                    entity_type: self.entity_type.name().to_string(),
                },
            )
            .with_property(property));
        }
        Ok(descriptor.clone())
    }

    /// Inserts a property filter that was already validated elsewhere.
    pub(super) fn insert_property_filter(&mut self, filter: PropertyFilter) {
        self.property_filters.insert(filter.name().to_string(), filter);
    }

    pub fn add_derived_class_filter(
        &mut self,
        filter: EntityFilter,
    ) -> Result<&mut Self, FilterCreationError> {
        self.insert_sub_filter(SubFilterKind::DerivedClass, filter, false)
    }

    pub fn replace_derived_class_filter(
        &mut self,
        filter: EntityFilter,
    ) -> Result<&mut Self, FilterCreationError> {
        self.insert_sub_filter(SubFilterKind::DerivedClass, filter, true)
    }

    pub fn add_subclass_filter(
        &mut self,
        filter: EntityFilter,
        inclusive: bool,
    ) -> Result<&mut Self, FilterCreationError> {
        self.insert_sub_filter(SubFilterKind::Subclass { inclusive }, filter, false)
    }

    pub fn replace_subclass_filter(
        &mut self,
        filter: EntityFilter,
        inclusive: bool,
    ) -> Result<&mut Self, FilterCreationError> {
        self.insert_sub_filter(SubFilterKind::Subclass { inclusive }, filter, true)
    }

    pub fn remove_sub_filter(&mut self, type_name: &str) -> Option<SubFilter> {
        self.sub_filters.remove(type_name)
    }

    fn insert_sub_filter(
        &mut self,
        kind: SubFilterKind,
        filter: EntityFilter,
        replace: bool,
    ) -> Result<&mut Self, FilterCreationError> {
        let sub_type = filter.entity_type().name().to_string();

        if !filter.entity_type().is_strict_subtype_of(&self.entity_type) {
            return Err(FilterCreationError::new(FilterErrorReason::NotASubtype {
                sub_type,
                entity_type: self.entity_type.name().to_string(),
            }));
        }
        match (self.sub_filters.contains_key(&sub_type), replace) {
            (true, false) => {
                return Err(FilterCreationError::new(
                    FilterErrorReason::DuplicateSubFilter(sub_type),
                ));
            }
            (false, true) => {
                return Err(FilterCreationError::new(FilterErrorReason::MissingSubFilter(
                    sub_type,
                )));
            }
            _ => {}
        }
        for own in self.property_filters.values() {
            check_conflict(own, &filter)?;
        }
        filter.create_expression_with(&self.configuration)?;

        debug!(entity_type = self.entity_type.name(), sub_type = %sub_type, ?kind, "adding sub-filter");
        self.sub_filters.insert(sub_type, SubFilter { kind, filter });
        Ok(self)
    }

    /// Builds the predicate without compiling it into a [`CompiledFilter`].
    ///
    /// Sub-filters are compiled with this filter's configuration, not the
    /// one they were built with.
    pub fn create_expression(&self) -> Result<Expr, FilterCreationError> {
        self.create_expression_with(&self.configuration)
    }

    fn create_expression_with(
        &self,
        configuration: &FilterConfiguration,
    ) -> Result<Expr, FilterCreationError> {
        let mut operands = Vec::with_capacity(self.property_filters.len() + self.sub_filters.len());

        for property_filter in self.property_filters.values() {
            if let Some(expr) = property_filter.create_expression(configuration)? {
                operands.push(expr);
            }
        }
        for sub_filter in self.sub_filters.values() {
            let nested = sub_filter.filter.create_expression_with(configuration)?;
            operands.push(Expr::implies(sub_filter.type_test(), nested));
        }

        Ok(Expr::and_all(operands))
    }

    pub fn compile(&self) -> Result<CompiledFilter, FilterCreationError> {
        let expression = self.create_expression()?;
        debug!(
            entity_type = self.entity_type.name(),
            properties = self.property_filters.len(),
            sub_filters = self.sub_filters.len(),
            %expression,
            "compiled entity filter"
        );
        Ok(CompiledFilter::new(self.entity_type.clone(), expression))
    }
}

/// A sub-filter may repeat a constraint of its parent but not change it.
/// Values are ORed, so their order and repetition do not matter.
fn check_conflict(own: &PropertyFilter, nested: &EntityFilter) -> Result<(), FilterCreationError> {
    if let Some(other) = nested.property_filter(own.name()) {
        let own_values: HashSet<&ValueFilter> = own.values().iter().collect();
        let other_values: HashSet<&ValueFilter> = other.values().iter().collect();
        if own_values != other_values {
            return Err(FilterCreationError::new(
                FilterErrorReason::ConflictingSubFilter {
                    sub_type: nested.entity_type().name().to_string(),
                    property: own.name().to_string(),
                },
            )
            .with_property(own.name())
            .with_value(Some(other.syntax().as_str())));
        }
    }
    Ok(())
}
