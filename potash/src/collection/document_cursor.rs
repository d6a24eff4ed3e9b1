use super::find_plan::PlanSource;
use crate::collection::{Document, FindPlan, PotashId};
use crate::common::{SortOrder, Value};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::filter::FilterContext;
use crate::store::{Table, TableRange};
use std::cmp::Ordering;
use std::sync::Arc;

/// Lazy, restartable result of a find.
///
/// A cursor owns the snapshot of the collection it was created from, so
/// writes that happen while it is being consumed are never observed and
/// [DocumentCursor::reset] replays exactly the same documents.
///
/// Without a sort order documents are produced one at a time. With one,
/// all matches are collected and sorted on first access.
#[derive(Clone)]
pub struct DocumentCursor {
    table: Table,
    plan: FindPlan,
    context: FilterContext,
    state: CursorState,
}

impl std::fmt::Debug for DocumentCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCursor").finish_non_exhaustive()
    }
}

#[derive(Clone)]
enum CursorState {
    Streaming {
        source: Source,
        skipped: u64,
        returned: u64,
    },
    Sorted {
        documents: Arc<Vec<Document>>,
        position: usize,
    },
    Unsorted,
}

#[derive(Clone)]
enum Source {
    Scan(TableRange),
    Ids { ids: Arc<Vec<PotashId>>, position: usize },
}

impl DocumentCursor {
    pub(crate) fn new(table: Table, plan: FindPlan, context: FilterContext) -> Self {
        let state = if plan.sort_order().is_empty() {
            CursorState::Streaming {
                source: Self::source(&table, &plan),
                skipped: 0,
                returned: 0,
            }
        } else {
            CursorState::Unsorted
        };

        DocumentCursor {
            table,
            plan,
            context,
            state,
        }
    }

    pub fn find_plan(&self) -> &FindPlan {
        &self.plan
    }

    /// Restarts the cursor from its first document.
    pub fn reset(&mut self) {
        if let CursorState::Sorted { position, .. } = &mut self.state {
            *position = 0;
        } else if let CursorState::Streaming { .. } = self.state {
            self.state = CursorState::Streaming {
                source: Self::source(&self.table, &self.plan),
                skipped: 0,
                returned: 0,
            };
        }
    }

    /// Counts the matching documents without moving this cursor.
    pub fn size(&self) -> usize {
        let mut fresh = self.clone();
        fresh.reset();
        fresh.filter(|result| result.is_ok()).count()
    }

    pub fn first(&mut self) -> Option<PotashResult<Document>> {
        self.reset();
        self.next()
    }

    fn source(table: &Table, plan: &FindPlan) -> Source {
        match plan.source() {
            PlanSource::ById(id) => Source::Ids {
                ids: Arc::new(vec![*id]),
                position: 0,
            },
            PlanSource::Index(ids) => Source::Ids {
                ids: ids.clone(),
                position: 0,
            },
            PlanSource::FullScan => Source::Scan(TableRange::full(table.clone())),
        }
    }

    fn next_match(
        table: &Table,
        plan: &FindPlan,
        context: &FilterContext,
        source: &mut Source,
    ) -> Option<PotashResult<Document>> {
        loop {
            let candidate = match source {
                Source::Scan(range) => range.next().map(|(_, value)| value),
                Source::Ids { ids, position } => {
                    let id = ids.get(*position)?;
                    *position += 1;
                    match table.get(&Value::PotashId(*id)) {
                        Some(value) => Some(value.clone()),
                        None => continue,
                    }
                }
            }?;

            let document = match candidate {
                Value::Document(document) => document,
                other => {
                    log::error!("Collection record is a {}, expected a document", other.type_name());
                    return Some(Err(PotashError::new(
                        "Collection record is not a document",
                        ErrorKind::Corruption,
                    )));
                }
            };

            match plan.filter().apply(&document, context) {
                Ok(true) => return Some(Ok(document)),
                Ok(false) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    fn sort_documents(&self) -> PotashResult<Vec<Document>> {
        let mut source = Self::source(&self.table, &self.plan);
        let mut documents = Vec::new();
        while let Some(result) = Self::next_match(&self.table, &self.plan, &self.context, &mut source) {
            documents.push(result?);
        }

        let separator = self.context.separator();
        documents.sort_by(|a, b| {
            for (field, order) in self.plan.sort_order() {
                let ordering = a.get_embedded(field, separator).cmp(&b.get_embedded(field, separator));
                let ordering = match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        let skip = self.plan.skip().unwrap_or(0) as usize;
        let limit = self.plan.limit().map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(documents.into_iter().skip(skip).take(limit).collect())
    }
}

impl Iterator for DocumentCursor {
    type Item = PotashResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if let CursorState::Unsorted = self.state {
            match self.sort_documents() {
                Ok(documents) => {
                    self.state = CursorState::Sorted {
                        documents: Arc::new(documents),
                        position: 0,
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }

        match &mut self.state {
            CursorState::Sorted { documents, position } => {
                let document = documents.get(*position)?.clone();
                *position += 1;
                Some(Ok(document))
            }
            CursorState::Streaming {
                source,
                skipped,
                returned,
            } => {
                if let Some(limit) = self.plan.limit() {
                    if *returned >= limit {
                        return None;
                    }
                }

                let skip = self.plan.skip().unwrap_or(0);
                while *skipped < skip {
                    match Self::next_match(&self.table, &self.plan, &self.context, source)? {
                        Ok(_) => *skipped += 1,
                        Err(e) => return Some(Err(e)),
                    }
                }

                let result = Self::next_match(&self.table, &self.plan, &self.context, source)?;
                if result.is_ok() {
                    *returned += 1;
                }
                Some(result)
            }
            CursorState::Unsorted => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::filter::{all, field};

    fn table_of(documents: Vec<Document>) -> Table {
        let mut table = Table::new();
        for mut document in documents {
            let id = PotashId::new();
            document.put_raw("_id", Value::PotashId(id));
            table.insert(Value::PotashId(id), Value::Document(document));
        }
        table
    }

    fn ages(cursor: DocumentCursor) -> Vec<i64> {
        cursor
            .map(|d| d.unwrap().get("age").and_then(|v| v.as_i64()).unwrap())
            .collect()
    }

    #[test]
    fn test_streaming_with_skip_and_limit() {
        let table = table_of((1..=5).map(|age| doc! { "age": age }).collect());
        let plan = FindPlan::new(field("age").gt(1), PlanSource::FullScan).with_paging(
            vec![],
            Some(1),
            Some(2),
        );
        let cursor = DocumentCursor::new(table, plan, FilterContext::default());
        assert_eq!(cursor.size(), 2);
        assert_eq!(ages(cursor), vec![3, 4]);
    }

    #[test]
    fn test_sorted_and_reset() {
        let table = table_of(vec![doc! { "age": 3 }, doc! { "age": 9 }, doc! { "age": 1 }]);
        let plan = FindPlan::new(all(), PlanSource::FullScan).with_paging(
            vec![("age".to_string(), SortOrder::Descending)],
            None,
            None,
        );
        let mut cursor = DocumentCursor::new(table, plan, FilterContext::default());
        assert!(cursor.next().is_some());
        cursor.reset();
        assert_eq!(ages(cursor), vec![9, 3, 1]);
    }

    #[test]
    fn test_ids_source_skips_missing_documents() {
        let table = table_of(vec![doc! { "age": 7 }]);
        let existing = table.keys().next().and_then(|k| k.as_id()).copied().unwrap();
        let plan = FindPlan::new(
            all(),
            PlanSource::Index(Arc::new(vec![PotashId::new(), existing])),
        );
        let cursor = DocumentCursor::new(table, plan, FilterContext::default());
        assert_eq!(ages(cursor), vec![7]);
    }

    #[test]
    fn test_non_document_record_is_corruption() {
        let mut table = Table::new();
        table.insert(Value::PotashId(PotashId::new()), Value::from(1));
        let mut cursor =
            DocumentCursor::new(table, FindPlan::new(all(), PlanSource::FullScan), FilterContext::default());
        let err = cursor.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Corruption);
    }
}
