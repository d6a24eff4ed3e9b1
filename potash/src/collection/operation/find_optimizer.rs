use crate::collection::find_plan::PlanSource;
use crate::collection::{FindOptions, FindPlan};
use crate::errors::PotashResult;
use crate::filter::Filter;
use crate::index::IndexDescriptor;
use crate::potash_config::PotashConfig;
use crate::store::StoreSnapshot;
use smallvec::SmallVec;
use std::sync::Arc;

type FilterVec = SmallVec<[Filter; 4]>;

/// Chooses where the candidates of a find come from.
///
/// In order of preference: an `_id` equality, a compound index covered by
/// equalities, a single-field index on one of the conjuncts (unique indexes
/// first), and finally a full scan.
pub(crate) struct FindOptimizer;

impl FindOptimizer {
    pub(crate) fn create_find_plan(
        snapshot: &StoreSnapshot,
        filter: &Filter,
        find_options: Option<&FindOptions>,
        index_descriptors: &[IndexDescriptor],
        config: &PotashConfig,
    ) -> PotashResult<FindPlan> {
        let conjuncts: FilterVec = match filter.conjuncts() {
            Some(filters) => filters.iter().cloned().collect(),
            None => SmallVec::from_elem(filter.clone(), 1),
        };

        let plan = match Self::plan_source(snapshot, filter, &conjuncts, index_descriptors, config)? {
            (source, Some(descriptor)) => FindPlan::new(filter.clone(), source).with_index(descriptor),
            (source, None) => FindPlan::new(filter.clone(), source),
        };

        Ok(match find_options {
            Some(options) => plan.with_paging(
                options.sort_order().to_vec(),
                options.skip_count(),
                options.limit_count(),
            ),
            None => plan,
        })
    }

    fn plan_source(
        snapshot: &StoreSnapshot,
        filter: &Filter,
        conjuncts: &FilterVec,
        index_descriptors: &[IndexDescriptor],
        config: &PotashConfig,
    ) -> PotashResult<(PlanSource, Option<IndexDescriptor>)> {
        if let Some(id) = conjuncts.iter().find_map(|f| f.id_lookup()) {
            return Ok((PlanSource::ById(id), None));
        }

        if filter.is_all() || index_descriptors.is_empty() {
            return Ok((PlanSource::FullScan, None));
        }

        for descriptor in index_descriptors.iter().filter(|d| d.is_compound_index()) {
            let indexer = config.find_indexer(descriptor.index_type())?;
            if let Some(ids) = indexer.find_by_filter(snapshot, descriptor, filter, config)? {
                log::debug!("Using {} for {}", descriptor, filter);
                return Ok((PlanSource::Index(Arc::new(ids)), Some(descriptor.clone())));
            }
        }

        let mut single: Vec<(&IndexDescriptor, bool)> = Vec::new();
        for descriptor in index_descriptors.iter().filter(|d| !d.is_compound_index()) {
            let indexer = config.find_indexer(descriptor.index_type())?;
            single.push((descriptor, indexer.is_unique()));
        }
        single.sort_by_key(|(_, unique)| !*unique);

        for conjunct in conjuncts {
            let field_name = match conjunct.field_name() {
                Some(name) => name,
                None => continue,
            };

            for (descriptor, _) in &single {
                if descriptor.index_fields().first_field() != field_name {
                    continue;
                }
                let indexer = config.find_indexer(descriptor.index_type())?;
                if let Some(ids) = indexer.find_by_filter(snapshot, descriptor, conjunct, config)? {
                    log::debug!("Using {} for {}", descriptor, filter);
                    return Ok((PlanSource::Index(Arc::new(ids)), Some((*descriptor).clone())));
                }
            }
        }

        Ok((PlanSource::FullScan, None))
    }
}
