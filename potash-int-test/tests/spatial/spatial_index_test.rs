use potash::collection::{Document, PotashCollection, PotashCollectionProvider};
use potash::common::{PersistentCollection, DocumentMapperModule};
use potash::doc;
use potash::errors::{ErrorKind, PotashResult};
use potash::filter::field;
use potash::potash::Potash;
use potash_file_adapter::FileStoreModule;
use potash_int_test::test_util::{cleanup, create_spatial_test_context, random_path, run_test, text};
use potash_spatial::{spatial_field, spatial_index, Geometry, Point, SpatialModule};

fn place(name: &str, geometry: Geometry) -> PotashResult<Document> {
    let mut document = doc! { "name": name };
    document.put("location", geometry)?;
    Ok(document)
}

fn fill(places: &PotashCollection) -> PotashResult<()> {
    places.insert_many(vec![
        place("cafe", Geometry::point(1.0, 1.0)?)?,
        place("park", Geometry::polygon(&[(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)])?)?,
        place("river", Geometry::line_string(&[(0.0, 8.0), (10.0, 8.0)])?)?,
        place("tower", Geometry::point(9.0, 1.0)?)?,
    ])?;
    Ok(())
}

fn sorted_names(places: &PotashCollection, filter: potash::filter::Filter) -> PotashResult<Vec<String>> {
    let mut names = places
        .find(filter)?
        .map(|doc| doc.map(|doc| text(&doc, "name")))
        .collect::<PotashResult<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

#[test]
fn test_spatial_queries_with_index() {
    run_test(
        || create_spatial_test_context(),
        |ctx| {
            let places = ctx.db().collection("places")?;
            places.create_index(vec!["location"], &spatial_index())?;
            fill(&places)?;

            let area = spatial_field("location").within_envelope(0.0, 0.0, 7.0, 7.0)?;
            assert_eq!(sorted_names(&places, area)?, vec!["cafe", "park"]);

            let crossing = spatial_field("location").intersects_envelope(5.0, 5.0, 12.0, 9.0)?;
            assert_eq!(sorted_names(&places, crossing)?, vec!["park", "river"]);

            let near = spatial_field("location").near(Point::new(9.0, 0.0)?, 1.5)?;
            assert_eq!(sorted_names(&places, near)?, vec!["tower"]);

            let combined = spatial_field("location")
                .within_envelope(0.0, 0.0, 10.0, 7.0)?
                .and(field("name").eq("tower"));
            assert_eq!(sorted_names(&places, combined)?, vec!["tower"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_spatial_index_follows_writes() {
    run_test(
        || create_spatial_test_context(),
        |ctx| {
            let places = ctx.db().collection("places")?;
            fill(&places)?;
            places.create_index(vec!["location"], &spatial_index())?;

            let area = || spatial_field("location").within_envelope(0.0, 0.0, 3.0, 3.0);
            assert_eq!(sorted_names(&places, area()?)?, vec!["cafe"]);

            let mut moved = doc! {};
            moved.put("location", Geometry::point(2.5, 2.5)?)?;
            places.update(field("name").eq("tower"), &moved)?;
            assert_eq!(sorted_names(&places, area()?)?, vec!["cafe", "tower"]);

            places.remove(field("name").eq("cafe"))?;
            assert_eq!(sorted_names(&places, area()?)?, vec!["tower"]);

            places.rebuild_index(vec!["location"])?;
            assert_eq!(sorted_names(&places, area()?)?, vec!["tower"]);

            places.drop_index(vec!["location"])?;
            assert_eq!(sorted_names(&places, area()?)?, vec!["tower"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_non_geometry_value_is_rejected() {
    run_test(
        || create_spatial_test_context(),
        |ctx| {
            let places = ctx.db().collection("places")?;
            places.create_index(vec!["location"], &spatial_index())?;

            let err = places.insert(doc! { "name": "bad", "location": "here" }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::Extension("spatial".to_string()));
            assert_eq!(places.size()?, 0);

            places.insert(doc! { "name": "unplaced" })?;
            assert_eq!(places.size()?, 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_spatial_index_in_transaction() {
    run_test(
        || create_spatial_test_context(),
        |ctx| {
            let db = ctx.db();
            let places = db.collection("places")?;
            places.create_index(vec!["location"], &spatial_index())?;
            fill(&places)?;

            db.with_session(|session| {
                let transaction = session.begin_transaction()?;
                let tx_places = transaction.collection("places")?;
                tx_places.insert(place("kiosk", Geometry::point(0.5, 0.5)?)?)?;

                let area = spatial_field("location").within_envelope(0.0, 0.0, 1.5, 1.5)?;
                assert_eq!(sorted_names(&tx_places, area.clone())?, vec!["cafe", "kiosk"]);
                assert_eq!(sorted_names(&places, area)?, vec!["cafe"]);
                transaction.rollback()
            })?;

            let area = spatial_field("location").within_envelope(0.0, 0.0, 1.5, 1.5)?;
            assert_eq!(sorted_names(&places, area)?, vec!["cafe"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_spatial_index_survives_reopen() {
    let path = random_path();
    let open = || {
        Potash::builder()
            .load_module(FileStoreModule::with_config().db_path(&path).build())
            .load_module(SpatialModule::new())
            .load_module(DocumentMapperModule)
            .open_or_create(None, None)
    };

    let db = open().unwrap();
    let places = db.collection("places").unwrap();
    places.create_index(vec!["location"], &spatial_index()).unwrap();
    fill(&places).unwrap();
    db.close().unwrap();

    let db = open().unwrap();
    let places = db.collection("places").unwrap();
    assert!(places.has_index(vec!["location"]).unwrap());
    let area = spatial_field("location").within_envelope(0.0, 0.0, 7.0, 7.0).unwrap();
    let cursor = places.find(area).unwrap();
    assert!(cursor.find_plan().index_descriptor().is_some());
    assert_eq!(cursor.count(), 2);
    db.close().unwrap();
    let _ = std::fs::remove_dir_all(&path);
}
