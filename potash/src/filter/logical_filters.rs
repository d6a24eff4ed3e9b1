use super::{Filter, FilterContext, FilterProvider};
use crate::collection::Document;
use crate::errors::PotashResult;
use itertools::Itertools;
use std::any::Any;
use std::fmt::{Display, Formatter};

pub(crate) struct AndFilter {
    filters: Vec<Filter>,
}

impl AndFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        AndFilter { filters }
    }
}

impl Display for AndFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.filters.iter().join(" && "))
    }
}

impl FilterProvider for AndFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        for filter in &self.filters {
            if !filter.apply(document, context)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn conjuncts(&self) -> Option<&[Filter]> {
        Some(&self.filters)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct OrFilter {
    filters: Vec<Filter>,
}

impl OrFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        OrFilter { filters }
    }
}

impl Display for OrFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.filters.iter().join(" || "))
    }
}

impl FilterProvider for OrFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        for filter in &self.filters {
            if filter.apply(document, context)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct NotFilter {
    filter: Filter,
}

impl NotFilter {
    pub(crate) fn new(filter: Filter) -> Self {
        NotFilter { filter }
    }
}

impl Display for NotFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "!{}", self.filter)
    }
}

impl FilterProvider for NotFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        Ok(!self.filter.apply(document, context)?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
