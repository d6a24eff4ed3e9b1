use super::{FilterContext, FilterProvider, IndexScan};
use crate::collection::Document;
use crate::common::Value;
use crate::errors::PotashResult;
use itertools::Itertools;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::Bound;

pub(crate) struct AllFilter;

impl Display for AllFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(all)")
    }
}

impl FilterProvider for AllFilter {
    fn apply(&self, _document: &Document, _context: &FilterContext) -> PotashResult<bool> {
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct EqualsFilter {
    field_name: String,
    value: Value,
}

impl EqualsFilter {
    pub(crate) fn new(field_name: String, value: Value) -> Self {
        EqualsFilter { field_name, value }
    }
}

impl Display for EqualsFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} == {})", self.field_name, self.value)
    }
}

impl FilterProvider for EqualsFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        Ok(context.resolve(document, &self.field_name) == self.value)
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn index_scan(&self) -> Option<IndexScan> {
        Some(IndexScan::Equals(self.value.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct NotEqualsFilter {
    field_name: String,
    value: Value,
}

impl NotEqualsFilter {
    pub(crate) fn new(field_name: String, value: Value) -> Self {
        NotEqualsFilter { field_name, value }
    }
}

impl Display for NotEqualsFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} != {})", self.field_name, self.value)
    }
}

impl FilterProvider for NotEqualsFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        Ok(context.resolve(document, &self.field_name) != self.value)
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ComparisonMode {
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl Display for ComparisonMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonMode::Greater => write!(f, ">"),
            ComparisonMode::GreaterEqual => write!(f, ">="),
            ComparisonMode::Lesser => write!(f, "<"),
            ComparisonMode::LesserEqual => write!(f, "<="),
        }
    }
}

/// `>`, `>=`, `<` and `<=`. Values of kinds that do not order against the
/// operand (a string against a number, a missing field) never match.
pub(crate) struct ComparisonFilter {
    field_name: String,
    value: Value,
    mode: ComparisonMode,
}

impl ComparisonFilter {
    pub(crate) fn new(field_name: String, value: Value, mode: ComparisonMode) -> Self {
        ComparisonFilter { field_name, value, mode }
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field_name, self.mode, self.value)
    }
}

impl FilterProvider for ComparisonFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        let actual = context.resolve(document, &self.field_name);
        if !actual.is_comparable_with(&self.value) {
            return Ok(false);
        }

        let ordering = actual.cmp(&self.value);
        Ok(match self.mode {
            ComparisonMode::Greater => ordering == Ordering::Greater,
            ComparisonMode::GreaterEqual => ordering != Ordering::Less,
            ComparisonMode::Lesser => ordering == Ordering::Less,
            ComparisonMode::LesserEqual => ordering != Ordering::Greater,
        })
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn index_scan(&self) -> Option<IndexScan> {
        let bound = self.value.clone();
        let (lower, upper) = match self.mode {
            ComparisonMode::Greater => (Bound::Excluded(bound), Bound::Unbounded),
            ComparisonMode::GreaterEqual => (Bound::Included(bound), Bound::Unbounded),
            ComparisonMode::Lesser => (Bound::Unbounded, Bound::Excluded(bound)),
            ComparisonMode::LesserEqual => (Bound::Unbounded, Bound::Included(bound)),
        };
        Some(IndexScan::Range { lower, upper })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct BetweenFilter {
    field_name: String,
    lower: Value,
    upper: Value,
    lower_inclusive: bool,
    upper_inclusive: bool,
}

impl BetweenFilter {
    pub(crate) fn new(
        field_name: String,
        lower: Value,
        upper: Value,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Self {
        BetweenFilter {
            field_name,
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        }
    }
}

impl Display for BetweenFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({} in {}{}, {}{})",
            self.field_name,
            if self.lower_inclusive { "[" } else { "(" },
            self.lower,
            self.upper,
            if self.upper_inclusive { "]" } else { ")" }
        )
    }
}

impl FilterProvider for BetweenFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        let actual = context.resolve(document, &self.field_name);
        if !actual.is_comparable_with(&self.lower) || !actual.is_comparable_with(&self.upper) {
            return Ok(false);
        }

        let above = match actual.cmp(&self.lower) {
            Ordering::Greater => true,
            Ordering::Equal => self.lower_inclusive,
            Ordering::Less => false,
        };
        let below = match actual.cmp(&self.upper) {
            Ordering::Less => true,
            Ordering::Equal => self.upper_inclusive,
            Ordering::Greater => false,
        };
        Ok(above && below)
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn index_scan(&self) -> Option<IndexScan> {
        let lower = if self.lower_inclusive {
            Bound::Included(self.lower.clone())
        } else {
            Bound::Excluded(self.lower.clone())
        };
        let upper = if self.upper_inclusive {
            Bound::Included(self.upper.clone())
        } else {
            Bound::Excluded(self.upper.clone())
        };
        Some(IndexScan::Range { lower, upper })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct InFilter {
    field_name: String,
    values: Vec<Value>,
}

impl InFilter {
    pub(crate) fn new(field_name: String, values: Vec<Value>) -> Self {
        InFilter { field_name, values }
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} in [{}])", self.field_name, self.values.iter().join(", "))
    }
}

impl FilterProvider for InFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        let actual = context.resolve(document, &self.field_name);
        Ok(self.values.contains(&actual))
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn index_scan(&self) -> Option<IndexScan> {
        Some(IndexScan::In(self.values.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct NotInFilter {
    field_name: String,
    values: Vec<Value>,
}

impl NotInFilter {
    pub(crate) fn new(field_name: String, values: Vec<Value>) -> Self {
        NotInFilter { field_name, values }
    }
}

impl Display for NotInFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} not in [{}])", self.field_name, self.values.iter().join(", "))
    }
}

impl FilterProvider for NotInFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        let actual = context.resolve(document, &self.field_name);
        Ok(!self.values.contains(&actual))
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
