use crate::common::{FULL_TEXT_INDEX, NON_UNIQUE_INDEX, UNIQUE_INDEX};

/// Options of `create_index`; selects the indexer by its type name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexOptions {
    index_type: String,
}

impl IndexOptions {
    pub fn new(index_type: &str) -> IndexOptions {
        IndexOptions {
            index_type: index_type.to_string(),
        }
    }

    pub fn index_type(&self) -> &str {
        &self.index_type
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions::new(UNIQUE_INDEX)
    }
}

pub fn unique_index() -> IndexOptions {
    IndexOptions::new(UNIQUE_INDEX)
}

pub fn non_unique_index() -> IndexOptions {
    IndexOptions::new(NON_UNIQUE_INDEX)
}

pub fn full_text_index() -> IndexOptions {
    IndexOptions::new(FULL_TEXT_INDEX)
}
