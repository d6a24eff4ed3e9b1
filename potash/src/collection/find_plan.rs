use crate::collection::PotashId;
use crate::common::SortOrder;
use crate::filter::Filter;
use crate::index::IndexDescriptor;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// How a find reads its candidates.
#[derive(Clone, Debug)]
pub(crate) enum PlanSource {
    ById(PotashId),
    Index(Arc<Vec<PotashId>>),
    FullScan,
}

/// The execution plan of one find, as chosen by the optimizer.
///
/// Candidates come from an `_id` lookup, an index scan or a full scan of
/// the collection; the filter is applied to every candidate in all three
/// cases.
#[derive(Clone)]
pub struct FindPlan {
    filter: Filter,
    source: PlanSource,
    index_descriptor: Option<IndexDescriptor>,
    sort_order: Vec<(String, SortOrder)>,
    skip: Option<u64>,
    limit: Option<u64>,
}

impl FindPlan {
    pub(crate) fn new(filter: Filter, source: PlanSource) -> Self {
        FindPlan {
            filter,
            source,
            index_descriptor: None,
            sort_order: Vec::new(),
            skip: None,
            limit: None,
        }
    }

    pub(crate) fn with_index(mut self, descriptor: IndexDescriptor) -> Self {
        self.index_descriptor = Some(descriptor);
        self
    }

    pub(crate) fn with_paging(
        mut self,
        sort_order: Vec<(String, SortOrder)>,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> Self {
        self.sort_order = sort_order;
        self.skip = skip;
        self.limit = limit;
        self
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn by_id(&self) -> Option<PotashId> {
        match self.source {
            PlanSource::ById(id) => Some(id),
            _ => None,
        }
    }

    /// The index the candidates are read from.
    pub fn index_descriptor(&self) -> Option<&IndexDescriptor> {
        self.index_descriptor.as_ref()
    }

    pub fn is_full_scan(&self) -> bool {
        matches!(self.source, PlanSource::FullScan)
    }

    pub fn sort_order(&self) -> &[(String, SortOrder)] {
        &self.sort_order
    }

    pub fn skip(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub(crate) fn source(&self) -> &PlanSource {
        &self.source
    }
}

impl Display for FindPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.source, &self.index_descriptor) {
            (PlanSource::ById(id), _) => write!(f, "id lookup {}", id)?,
            (PlanSource::Index(ids), Some(descriptor)) => {
                write!(f, "{} ({} candidates)", descriptor, ids.len())?
            }
            _ => write!(f, "full scan")?,
        }
        write!(f, " filter {}", self.filter)
    }
}
