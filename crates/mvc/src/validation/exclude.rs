use crate::model::ModelType;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Decides whether models of a type skip validation entirely.
pub trait ExcludeTypeValidationFilter: Send + Sync {
    fn is_type_excluded(&self, model_type: &ModelType) -> bool;
}

struct FnExcludeFilter<F: Fn(&ModelType) -> bool>(F);

impl<F: Fn(&ModelType) -> bool + Send + Sync> ExcludeTypeValidationFilter for FnExcludeFilter<F> {
    fn is_type_excluded(&self, model_type: &ModelType) -> bool {
        (self.0)(model_type)
    }
}

pub fn fn_exclude_filter<F>(f: F) -> impl ExcludeTypeValidationFilter
where
    F: Fn(&ModelType) -> bool + Send + Sync,
{
    FnExcludeFilter(f)
}

/// excludes exactly one type
#[derive(Debug, Clone, Copy)]
pub struct TypeExcludeFilter {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeExcludeFilter {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

pub fn exclude_type<T: Any>() -> TypeExcludeFilter {
    TypeExcludeFilter { type_id: TypeId::of::<T>(), type_name: std::any::type_name::<T>() }
}

impl ExcludeTypeValidationFilter for TypeExcludeFilter {
    #[inline]
    fn is_type_excluded(&self, model_type: &ModelType) -> bool {
        self.type_id == model_type.id()
    }
}

/// compose filters with *OR* logic, a type is excluded if any inner filter excludes it
#[derive(Clone, Default)]
pub struct ExcludeFilters {
    filters: Vec<Arc<dyn ExcludeTypeValidationFilter>>,
}

impl fmt::Debug for ExcludeFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeFilters").field("len", &self.filters.len()).finish()
    }
}

impl ExcludeFilters {
    pub fn new() -> Self {
        Self { filters: vec![] }
    }

    /// Raw payload types which carry no validation rules
    pub fn defaults() -> Self {
        let mut filters = Self::new();
        filters
            .or(exclude_type::<String>())
            .or(exclude_type::<bytes::Bytes>())
            .or(exclude_type::<serde_json::Value>());
        filters
    }

    pub fn or<F: ExcludeTypeValidationFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Arc::new(filter));
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn is_excluded(&self, model_type: &ModelType) -> bool {
        self.filters.iter().any(|filter| filter.is_type_excluded(model_type))
    }
}
