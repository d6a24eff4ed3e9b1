use crate::common::{Key, Value};

/// One mutation inside a [WriteBatch].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum BatchOp {
    CreateMap { map: String },
    DropMap { map: String },
    Put { map: String, key: Key, value: Value },
    Remove { map: String, key: Key },
}

impl BatchOp {
    pub fn map_name(&self) -> &str {
        match self {
            BatchOp::CreateMap { map }
            | BatchOp::DropMap { map }
            | BatchOp::Put { map, .. }
            | BatchOp::Remove { map, .. } => map,
        }
    }
}

/// An ordered set of mutations committed atomically by a store.
///
/// Operations apply in order. A `Put` into a map that does not exist creates
/// it; a `Remove` from a missing map is a no-op.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch { ops: Vec::new() }
    }

    pub fn from_ops(ops: Vec<BatchOp>) -> Self {
        WriteBatch { ops }
    }

    pub fn create_map(&mut self, map: &str) {
        self.ops.push(BatchOp::CreateMap { map: map.to_string() });
    }

    pub fn drop_map(&mut self, map: &str) {
        self.ops.push(BatchOp::DropMap { map: map.to_string() });
    }

    pub fn put(&mut self, map: &str, key: Key, value: Value) {
        self.ops.push(BatchOp::Put {
            map: map.to_string(),
            key,
            value,
        });
    }

    pub fn remove(&mut self, map: &str, key: Key) {
        self.ops.push(BatchOp::Remove {
            map: map.to_string(),
            key,
        });
    }

    pub fn extend(&mut self, other: WriteBatch) {
        self.ops.extend(other.ops);
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::val;

    #[test]
    fn test_batch_keeps_order() {
        let mut batch = WriteBatch::new();
        batch.create_map("a");
        batch.put("a", val!(1), val!("x"));
        batch.remove("b", val!(2));
        batch.drop_map("c");

        let names: Vec<&str> = batch.ops().iter().map(|op| op.map_name()).collect();
        assert_eq!(names, vec!["a", "a", "b", "c"]);
        assert_eq!(batch.len(), 4);
    }

    #[test]
    fn test_extend() {
        let mut first = WriteBatch::new();
        first.put("a", val!(1), val!(1));
        let mut second = WriteBatch::new();
        second.remove("a", val!(1));
        first.extend(second);
        assert_eq!(first.len(), 2);
        assert!(matches!(first.ops()[1], BatchOp::Remove { .. }));
    }
}
