use crate::collection::PotashId;

/// The ids of the documents a write inserted, changed or removed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteResult {
    ids: Vec<PotashId>,
}

impl WriteResult {
    pub fn new(ids: Vec<PotashId>) -> Self {
        WriteResult { ids }
    }

    pub fn affected_ids(&self) -> &[PotashId] {
        &self.ids
    }

    pub fn affected_count(&self) -> usize {
        self.ids.len()
    }
}

impl IntoIterator for WriteResult {
    type Item = PotashId;
    type IntoIter = std::vec::IntoIter<PotashId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_result_keeps_order() {
        let ids = vec![PotashId::new(), PotashId::new()];
        let result = WriteResult::new(ids.clone());
        assert_eq!(result.affected_count(), 2);
        assert_eq!(result.affected_ids(), ids.as_slice());
        assert_eq!(result.into_iter().collect::<Vec<_>>(), ids);
    }
}
