use super::entity::EntityFilter;
use super::property::PropertyFilter;
use crate::schema::EntityType;
use std::sync::Arc;
use tracing::debug;

impl EntityFilter {
    /// Re-targets the property filters onto another type.
    ///
    /// A filter survives when `target` has a filterable property of the same
    /// name whose type is the same scalar type, with nullability equal or
    /// widened (`i16` onto `i16?`, never `i16?` onto `i16` or `i16` onto
    /// `i32`). Everything else is dropped. Sub-filters are tied to the source
    /// type's hierarchy and are never carried over.
    pub fn cast(&self, target: Arc<EntityType>) -> EntityFilter {
        let mut cast = EntityFilter::with_configuration(target.clone(), self.configuration().clone());

        for property_filter in self.property_filters() {
            let source_type = property_filter.property().property_type();
            match target.property(property_filter.name()) {
                Some(descriptor)
                    if descriptor.is_visible()
                        && source_type.is_assignable_to(descriptor.property_type()) =>
                {
                    cast.insert_property_filter(PropertyFilter::new(
                        descriptor.clone(),
                        property_filter.values().to_vec(),
                    ));
                }
                Some(descriptor) => {
                    debug!(
                        property = property_filter.name(),
                        from = %source_type,
                        to = %descriptor.property_type(),
                        target = target.name(),
                        "dropping property filter with incompatible type on cast"
                    );
                }
                None => {
                    debug!(
                        property = property_filter.name(),
                        target = target.name(),
                        "dropping property filter missing on cast target"
                    );
                }
            }
        }

        if self.sub_filters().next().is_some() {
            debug!(
                source = self.entity_type().name(),
                target = target.name(),
                "sub-filters are not carried over by cast"
            );
        }
        cast
    }
}
