use crate::common::SortOrder;

/// Paging and ordering applied to the result of a find.
///
/// Sorting happens before `skip` and `limit`. Sorting by several fields
/// compares them in the order they were added.
///
/// ```rust
/// use potash::collection::order_by;
/// use potash::common::SortOrder;
///
/// let options = order_by("age", SortOrder::Descending).skip(10).limit(5);
/// assert_eq!(options.skip_count(), Some(10));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    sort_by: Vec<(String, SortOrder)>,
    skip: Option<u64>,
    limit: Option<u64>,
}

pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions::default()
    }

    pub fn skip(mut self, skip: u64) -> FindOptions {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> FindOptions {
        self.sort_by.push((field_name.to_string(), sort_order));
        self
    }

    pub fn sort_order(&self) -> &[(String, SortOrder)] {
        &self.sort_by
    }

    pub fn skip_count(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_compose() {
        let options = order_by("name", SortOrder::Ascending)
            .sort_by("age", SortOrder::Descending)
            .skip(2)
            .limit(3);
        assert_eq!(options.sort_order().len(), 2);
        assert_eq!(options.sort_order()[1], ("age".to_string(), SortOrder::Descending));
        assert_eq!(options.skip_count(), Some(2));
        assert_eq!(options.limit_count(), Some(3));
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(skip_by(4).skip_count(), Some(4));
        assert!(skip_by(4).limit_count().is_none());
        assert_eq!(limit_to(1).limit_count(), Some(1));
        assert!(FindOptions::default().sort_order().is_empty());
    }
}
