/// Controls how an update treats missing and multiple matches.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateOptions {
    insert_if_absent: bool,
    just_once: bool,
}

impl UpdateOptions {
    pub fn new(insert_if_absent: bool, just_once: bool) -> Self {
        UpdateOptions {
            insert_if_absent,
            just_once,
        }
    }

    /// Insert the update document when nothing matches the filter.
    pub fn is_insert_if_absent(&self) -> bool {
        self.insert_if_absent
    }

    /// Update only the first match.
    pub fn is_just_once(&self) -> bool {
        self.just_once
    }
}

pub fn insert_if_absent() -> UpdateOptions {
    UpdateOptions::new(true, false)
}

pub fn just_once() -> UpdateOptions {
    UpdateOptions::new(false, true)
}
