use crate::collection::{Document, PotashId};
use crate::common::{Value, DEFAULT_FIELD_SEPARATOR, DOC_ID};
use crate::errors::PotashResult;
use std::any::Any;
use std::fmt::{Display, Formatter};
use std::ops::{Bound, Deref};
use std::sync::Arc;

use super::{AllFilter, AndFilter, EqualsFilter, NotFilter, OrFilter};

/// Settings a filter needs while it is evaluated.
#[derive(Clone, Debug)]
pub struct FilterContext {
    separator: String,
}

impl FilterContext {
    pub fn new(separator: &str) -> Self {
        FilterContext {
            separator: separator.to_string(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Resolves `field` in `document` with the configured separator.
    pub fn resolve(&self, document: &Document, field: &str) -> Value {
        document.get_embedded(field, &self.separator)
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        FilterContext::new(DEFAULT_FIELD_SEPARATOR)
    }
}

/// The part of a field filter an ordered index can answer.
#[derive(Clone, Debug, PartialEq)]
pub enum IndexScan {
    Equals(Value),
    In(Vec<Value>),
    Range { lower: Bound<Value>, upper: Bound<Value> },
}

pub trait FilterProvider: Any + Send + Sync + Display {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool>;

    /// The field this filter tests, if it tests exactly one.
    fn field_name(&self) -> Option<&str> {
        None
    }

    fn index_scan(&self) -> Option<IndexScan> {
        None
    }

    /// The operands of a conjunction.
    fn conjuncts(&self) -> Option<&[Filter]> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter { inner: Arc::new(inner) }
    }

    pub fn and(&self, filter: Filter) -> Self {
        Filter::new(AndFilter::new(vec![self.clone(), filter]))
    }

    pub fn or(&self, filter: Filter) -> Self {
        Filter::new(OrFilter::new(vec![self.clone(), filter]))
    }

    pub fn not(&self) -> Self {
        Filter::new(NotFilter::new(self.clone()))
    }

    pub fn is_all(&self) -> bool {
        self.inner.as_any().is::<AllFilter>()
    }

    /// The id an `_id` equality filter selects.
    pub fn id_lookup(&self) -> Option<PotashId> {
        if self.inner.field_name() != Some(DOC_ID) {
            return None;
        }
        match self.inner.index_scan() {
            Some(IndexScan::Equals(Value::PotashId(id))) => Some(id),
            _ => None,
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter{}", self.inner)
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Matches every document.
pub fn all() -> Filter {
    Filter::new(AllFilter)
}

pub fn by_id(id: PotashId) -> Filter {
    Filter::new(EqualsFilter::new(DOC_ID.to_string(), Value::PotashId(id)))
}

pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}

pub fn not(filter: Filter) -> Filter {
    Filter::new(NotFilter::new(filter))
}
