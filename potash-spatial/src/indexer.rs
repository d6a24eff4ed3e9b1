//! The spatial indexer.
//!
//! Index contents are an ordinary store map from document id to the
//! bounding box of the document's geometry, so they commit, roll back and
//! snapshot with the documents. Queries run against an R-tree built from
//! that map; the tree is cached per map and reused for as long as the map
//! is unchanged.

use crate::bounding_box::{BoundingBox, IndexedBox};
use crate::error::SpatialError;
use crate::filter::{as_spatial_filter, BoxQuery};
use crate::geometry::Geometry;
use parking_lot::Mutex;
use potash::collection::PotashId;
use potash::common::{FieldValues, Fields, PotashPlugin, PotashPluginProvider, Value, SPATIAL_INDEX};
use potash::errors::{ErrorKind, PotashError, PotashResult};
use potash::filter::Filter;
use potash::index::{IndexDescriptor, PotashIndexerProvider};
use potash::potash_config::PotashConfig;
use potash::store::{StagedWrite, StoreSnapshot, Table};
use rstar::RTree;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct SpatialIndexer {
    inner: Arc<SpatialIndexerInner>,
}

#[derive(Default)]
struct SpatialIndexerInner {
    trees: Mutex<HashMap<String, CachedTree>>,
}

struct CachedTree {
    table: Table,
    tree: Arc<RTree<IndexedBox>>,
}

impl SpatialIndexer {
    pub fn new() -> Self {
        SpatialIndexer::default()
    }

    fn tree_for(&self, map_name: &str, table: &Table) -> PotashResult<Arc<RTree<IndexedBox>>> {
        let mut trees = self.inner.trees.lock();
        if let Some(cached) = trees.get(map_name) {
            if cached.table.ptr_eq(table) {
                return Ok(cached.tree.clone());
            }
        }

        let mut boxes = Vec::with_capacity(table.len());
        for (key, value) in table.iter() {
            boxes.push(indexed_box(map_name, key, value)?);
        }
        log::debug!("Built R-tree of {} entries for {}", boxes.len(), map_name);

        let tree = Arc::new(RTree::bulk_load(boxes));
        trees.insert(
            map_name.to_string(),
            CachedTree {
                table: table.clone(),
                tree: tree.clone(),
            },
        );
        Ok(tree)
    }
}

fn indexed_box(map_name: &str, key: &Value, value: &Value) -> PotashResult<IndexedBox> {
    match (key.as_id(), BoundingBox::from_value(value)) {
        (Some(id), Some(bbox)) => Ok(IndexedBox {
            id: *id,
            envelope: bbox.to_aabb(),
        }),
        _ => {
            log::error!("Spatial index {} holds a malformed entry {} => {}", map_name, key, value);
            Err(PotashError::new(
                &format!("Spatial index {} holds a malformed entry", map_name),
                ErrorKind::Corruption,
            ))
        }
    }
}

impl PotashPluginProvider for SpatialIndexer {
    fn initialize(&self, _config: PotashConfig) -> PotashResult<()> {
        Ok(())
    }

    fn close(&self) -> PotashResult<()> {
        self.inner.trees.lock().clear();
        Ok(())
    }

    fn as_plugin(&self) -> PotashPlugin {
        PotashPlugin::new(self.clone())
    }
}

impl PotashIndexerProvider for SpatialIndexer {
    fn index_type(&self) -> String {
        SPATIAL_INDEX.to_string()
    }

    fn is_unique(&self) -> bool {
        false
    }

    fn validate_index(&self, fields: &Fields) -> PotashResult<()> {
        if fields.is_compound() {
            let err = SpatialError::CompoundIndex(fields.field_names().len());
            log::error!("{}", err);
            return Err(err.into());
        }
        Ok(())
    }

    fn drop_index(
        &self,
        staged: &mut StagedWrite,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        let map_name = index_descriptor.index_map_name();
        staged.drop_map(&map_name);
        self.inner.trees.lock().remove(&map_name);
        Ok(())
    }

    fn write_index_entry(
        &self,
        staged: &mut StagedWrite,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        let value = match field_values.values().first() {
            Some(value) if !value.is_null() => value,
            _ => return Ok(()),
        };

        let geometry = Geometry::from_value(value).map_err(|err| {
            log::error!(
                "Cannot index field {} of document {}: {}",
                index_descriptor.index_fields().first_field(),
                field_values.id(),
                err
            );
            PotashError::from(err)
        })?;

        staged.put(
            &index_descriptor.index_map_name(),
            Value::PotashId(field_values.id()),
            geometry.bounding_box().to_value(),
        );
        Ok(())
    }

    fn remove_index_entry(
        &self,
        staged: &mut StagedWrite,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        let map_name = index_descriptor.index_map_name();
        let key = Value::PotashId(field_values.id());
        if staged.get(&map_name, &key).is_some() {
            staged.remove(&map_name, key);
        }
        Ok(())
    }

    fn find_by_filter(
        &self,
        snapshot: &StoreSnapshot,
        index_descriptor: &IndexDescriptor,
        filter: &Filter,
        _config: &PotashConfig,
    ) -> PotashResult<Option<Vec<PotashId>>> {
        let spatial = match as_spatial_filter(filter) {
            Some(spatial) if spatial.field() == index_descriptor.index_fields().first_field() => spatial,
            _ => return Ok(None),
        };

        let map_name = index_descriptor.index_map_name();
        let table = match snapshot.table(&map_name) {
            Some(table) => table,
            None => return Ok(Some(Vec::new())),
        };

        let tree = self.tree_for(&map_name, table)?;
        let search = spatial.search_box().to_aabb();
        let mut ids: Vec<PotashId> = match spatial.box_query() {
            BoxQuery::Intersecting => tree.locate_in_envelope_intersecting(&search).map(|e| e.id).collect(),
            BoxQuery::Contained => tree.locate_in_envelope(&search).map(|e| e.id).collect(),
        };
        ids.sort();
        Ok(Some(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{IntersectsFilter, NearFilter, WithinFilter};
    use crate::geometry::Point;
    use potash::common::Fields;

    fn descriptor() -> IndexDescriptor {
        IndexDescriptor::new(SPATIAL_INDEX, Fields::with_names(vec!["location"]).unwrap(), "places")
    }

    fn entry(descriptor: &IndexDescriptor, id: PotashId, value: Value) -> FieldValues {
        FieldValues::new(id, descriptor.index_fields().clone(), vec![value])
    }

    fn staged_points(indexer: &SpatialIndexer, points: &[(f64, f64)]) -> (StagedWrite, Vec<PotashId>) {
        let descriptor = descriptor();
        let config = PotashConfig::new();
        let mut staged = StagedWrite::new(StoreSnapshot::new());
        let mut ids = Vec::new();
        for &(x, y) in points {
            let id = PotashId::new();
            let value = Value::from(Geometry::point(x, y).unwrap());
            indexer
                .write_index_entry(&mut staged, &entry(&descriptor, id, value), &descriptor, &config)
                .unwrap();
            ids.push(id);
        }
        (staged, ids)
    }

    fn find(indexer: &SpatialIndexer, snapshot: &StoreSnapshot, filter: Filter) -> Option<Vec<PotashId>> {
        indexer
            .find_by_filter(snapshot, &descriptor(), &filter, &PotashConfig::new())
            .unwrap()
    }

    #[test]
    fn test_validate_index() {
        let indexer = SpatialIndexer::new();
        assert!(indexer.validate_index(&Fields::with_names(vec!["location"]).unwrap()).is_ok());
        let err = indexer
            .validate_index(&Fields::with_names(vec!["lat", "lon"]).unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IndexValidationError);
        assert_eq!(indexer.index_type(), SPATIAL_INDEX);
        assert!(!indexer.is_unique());
    }

    #[test]
    fn test_candidates_from_tree() {
        let indexer = SpatialIndexer::new();
        let (staged, ids) = staged_points(&indexer, &[(1.0, 1.0), (5.0, 5.0), (9.0, 9.0), (20.0, 20.0)]);
        let snapshot = staged.view().clone();

        let area = Geometry::envelope(0.0, 0.0, 6.0, 6.0).unwrap();
        let within = find(&indexer, &snapshot, Filter::new(WithinFilter::new("location", area.clone())));
        assert_eq!(within, Some(vec![ids[0], ids[1]]));

        let intersects = find(&indexer, &snapshot, Filter::new(IntersectsFilter::new("location", area)));
        assert_eq!(intersects, Some(vec![ids[0], ids[1]]));

        let near = NearFilter::new("location", Point::new(10.0, 10.0).unwrap(), 2.0).unwrap();
        assert_eq!(find(&indexer, &snapshot, Filter::new(near)), Some(vec![ids[2]]));
    }

    #[test]
    fn test_other_filters_are_not_answered() {
        let indexer = SpatialIndexer::new();
        let (staged, _) = staged_points(&indexer, &[(1.0, 1.0)]);
        let snapshot = staged.view().clone();

        assert_eq!(find(&indexer, &snapshot, potash::filter::field("location").eq(1)), None);
        let other_field = IntersectsFilter::new("area", Geometry::point(1.0, 1.0).unwrap());
        assert_eq!(find(&indexer, &snapshot, Filter::new(other_field)), None);
    }

    #[test]
    fn test_tree_follows_changes() {
        let indexer = SpatialIndexer::new();
        let descriptor = descriptor();
        let config = PotashConfig::new();
        let (mut staged, ids) = staged_points(&indexer, &[(1.0, 1.0), (2.0, 2.0)]);
        let everything = || Filter::new(IntersectsFilter::new("location", Geometry::envelope(0.0, 0.0, 3.0, 3.0).unwrap()));

        let before = staged.view().clone();
        assert_eq!(find(&indexer, &before, everything()), Some(ids.clone()));

        let removed = entry(&descriptor, ids[0], Value::Null);
        indexer.remove_index_entry(&mut staged, &removed, &descriptor, &config).unwrap();
        let after = staged.view().clone();
        assert_eq!(find(&indexer, &after, everything()), Some(vec![ids[1]]));
        assert_eq!(find(&indexer, &before, everything()), Some(ids));

        indexer.drop_index(&mut staged, &descriptor, &config).unwrap();
        assert_eq!(find(&indexer, staged.view(), everything()), Some(Vec::new()));
    }

    #[test]
    fn test_null_is_skipped_and_non_geometry_rejected() {
        let indexer = SpatialIndexer::new();
        let descriptor = descriptor();
        let config = PotashConfig::new();
        let mut staged = StagedWrite::new(StoreSnapshot::new());

        let null = entry(&descriptor, PotashId::new(), Value::Null);
        indexer.write_index_entry(&mut staged, &null, &descriptor, &config).unwrap();
        assert!(staged.is_empty());

        let text = entry(&descriptor, PotashId::new(), Value::from("here"));
        let err = indexer
            .write_index_entry(&mut staged, &text, &descriptor, &config)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Extension("spatial".to_string()));
    }
}
