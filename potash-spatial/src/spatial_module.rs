use crate::indexer::SpatialIndexer;
use potash::common::{PluginRegistrar, PotashModule, SPATIAL_INDEX};
use potash::errors::PotashResult;
use potash::index::{IndexOptions, PotashIndexer};

/// Adds the `spatial` index type to a database.
///
/// The indexer is registered under the spatial indexer capability. A
/// database that loads this module and no mapper gets no default mapper
/// either; load [DocumentMapperModule](potash::common::DocumentMapperModule)
/// as well when repositories are needed.
#[derive(Clone, Copy, Default)]
pub struct SpatialModule;

impl SpatialModule {
    pub fn new() -> Self {
        SpatialModule
    }
}

impl PotashModule for SpatialModule {
    fn load(&self, plugin_registrar: &PluginRegistrar) -> PotashResult<()> {
        plugin_registrar.register_spatial_indexer_plugin(PotashIndexer::new(SpatialIndexer::new()))
    }
}

/// Options creating a spatial index.
pub fn spatial_index() -> IndexOptions {
    IndexOptions::new(SPATIAL_INDEX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluent::spatial_field;
    use crate::geometry::{Geometry, Point};
    use potash::collection::PotashCollectionProvider;
    use potash::common::PersistentCollection;
    use potash::doc;
    use potash::errors::ErrorKind;
    use potash::potash::Potash;
    use rand::Rng;

    fn open() -> Potash {
        Potash::builder()
            .load_module(SpatialModule::new())
            .open_or_create(None, None)
            .unwrap()
    }

    #[test]
    fn test_spatial_index_on_collection() {
        let db = open();
        let places = db.collection("places").unwrap();
        for (name, x, y) in [("a", 1.0, 1.0), ("b", 4.0, 4.0), ("c", 8.0, 1.0)] {
            let mut place = doc! { "name": name };
            place.put("location", Geometry::point(x, y).unwrap()).unwrap();
            places.insert(place).unwrap();
        }
        places.create_index(vec!["location"], &spatial_index()).unwrap();
        assert!(places.has_index(vec!["location"]).unwrap());

        let filter = spatial_field("location").within_envelope(0.0, 0.0, 5.0, 5.0).unwrap();
        let names: Vec<String> = places
            .find(filter)
            .unwrap()
            .map(|doc| doc.unwrap().get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);

        let near = spatial_field("location").near(Point::new(8.0, 0.0).unwrap(), 1.0).unwrap();
        assert_eq!(places.find(near).unwrap().count(), 1);
        db.close().unwrap();
    }

    #[test]
    fn test_indexed_and_scanned_results_agree() {
        let mut rng = rand::thread_rng();
        let db = open();
        let indexed = db.collection("indexed").unwrap();
        let scanned = db.collection("scanned").unwrap();
        indexed.create_index(vec!["shape"], &spatial_index()).unwrap();

        for _ in 0..200 {
            let (x, y): (f64, f64) = (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0));
            let shape = if rng.gen_bool(0.5) {
                Geometry::point(x, y).unwrap()
            } else {
                Geometry::envelope(x, y, x + rng.gen_range(0.1..10.0), y + rng.gen_range(0.1..10.0)).unwrap()
            };
            let mut document = doc! {};
            document.put("shape", shape).unwrap();
            indexed.insert(document.clone()).unwrap();
            scanned.insert(document).unwrap();
        }

        for _ in 0..20 {
            let (x, y): (f64, f64) = (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0));
            let area = Geometry::envelope(x, y, x + 25.0, y + 25.0).unwrap();
            let center = Point::new(x, y).unwrap();
            let filters = || {
                vec![
                    spatial_field("shape").intersects(area.clone()),
                    spatial_field("shape").within(area.clone()),
                    spatial_field("shape").near(center, 15.0).unwrap(),
                ]
            };
            for (a, b) in filters().into_iter().zip(filters()) {
                let label = a.to_string();
                assert_eq!(
                    indexed.find(a).unwrap().count(),
                    scanned.find(b).unwrap().count(),
                    "{}",
                    label
                );
            }
        }
        db.close().unwrap();
    }

    #[test]
    fn test_compound_spatial_index_rejected() {
        let db = open();
        let places = db.collection("places").unwrap();
        let err = places.create_index(vec!["x", "y"], &spatial_index()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IndexValidationError);
        db.close().unwrap();
    }
}
