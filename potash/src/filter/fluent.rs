use crate::common::Value;

use super::{
    BetweenFilter, ComparisonFilter, ComparisonMode, ElementMatchFilter, EqualsFilter, Filter,
    InFilter, NotEqualsFilter, NotInFilter, RegexFilter, TextFilter,
};

/// Starts a filter on `field_name`. Nested fields are addressed with the
/// database field separator, e.g. `field("address.city")`.
///
/// ```rust
/// use potash::filter::field;
///
/// let adults = field("age").gte(18).and(field("country").eq("NO"));
/// assert_eq!(adults.to_string(), "((age >= 18) && (country == \"NO\"))");
/// ```
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(EqualsFilter::new(self.field_name, value.into()))
    }

    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(NotEqualsFilter::new(self.field_name, value.into()))
    }

    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value.into(), ComparisonMode::Greater))
    }

    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::GreaterEqual,
        ))
    }

    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value.into(), ComparisonMode::Lesser))
    }

    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::LesserEqual,
        ))
    }

    /// Inclusive on both ends.
    pub fn between<T: Into<Value>>(self, lower: T, upper: T) -> Filter {
        Filter::new(BetweenFilter::new(self.field_name, lower.into(), upper.into(), true, true))
    }

    pub fn between_exclusive<T: Into<Value>>(self, lower: T, upper: T) -> Filter {
        Filter::new(BetweenFilter::new(self.field_name, lower.into(), upper.into(), false, false))
    }

    pub fn between_with<T: Into<Value>>(
        self,
        lower: T,
        upper: T,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Filter {
        Filter::new(BetweenFilter::new(
            self.field_name,
            lower.into(),
            upper.into(),
            lower_inclusive,
            upper_inclusive,
        ))
    }

    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        let values = values.into_iter().map(Into::into).collect();
        Filter::new(InFilter::new(self.field_name, values))
    }

    pub fn not_in<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        let values = values.into_iter().map(Into::into).collect();
        Filter::new(NotInFilter::new(self.field_name, values))
    }

    pub fn regex(self, pattern: &str) -> Filter {
        Filter::new(RegexFilter::new(self.field_name, pattern.to_string()))
    }

    /// Full-text search; see the `full-text` index type.
    pub fn text(self, query: &str) -> Filter {
        Filter::new(TextFilter::new(self.field_name, query.to_string()))
    }

    pub fn elem_match(self, filter: Filter) -> Filter {
        Filter::new(ElementMatchFilter::new(self.field_name, filter))
    }
}
