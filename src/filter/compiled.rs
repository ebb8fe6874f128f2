use crate::expression::Expr;
use crate::record::Entity;
use crate::schema::EntityType;
use std::fmt;
use std::sync::Arc;

/// Immutable predicate produced by [`EntityFilter::compile`](super::EntityFilter::compile).
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    entity_type: Arc<EntityType>,
    expression: Arc<Expr>,
}

impl CompiledFilter {
    pub fn new(entity_type: Arc<EntityType>, expression: Expr) -> Self {
        Self {
            entity_type,
            expression: Arc::new(expression),
        }
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    /// The predicate tree, for translation by another backend.
    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn matches(&self, entity: &dyn Entity) -> bool {
        self.expression.evaluate(entity)
    }

    pub fn filter<'a, E, I>(&self, items: I) -> Vec<&'a E>
    where
        E: Entity + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        items.into_iter().filter(|item| self.matches(*item)).collect()
    }
}

impl fmt::Display for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|x: {}| {}", self.entity_type.name(), self.expression)
    }
}
