use potash::collection::{PotashCollection, PotashCollectionProvider};
use potash::common::{PersistentCollection, NON_UNIQUE_INDEX, UNIQUE_INDEX};
use potash::doc;
use potash::errors::{ErrorKind, PotashResult};
use potash::filter::{all, field};
use potash::index::{non_unique_index, unique_index, IndexDescriptor};
use potash::potash::Potash;
use potash::store::Table;
use potash_int_test::test_util::{cleanup, create_test_context, run_test, text};
use rand::seq::IndexedRandom;
use rand::{rng, Rng};

/// Current content of every index of `collection`, in descriptor order.
fn index_tables(db: &Potash, collection: &PotashCollection) -> PotashResult<Vec<(IndexDescriptor, Option<Table>)>> {
    let snapshot = db.store().snapshot()?;
    Ok(collection
        .list_indexes()?
        .into_iter()
        .map(|descriptor| {
            let table = snapshot.table(&descriptor.index_map_name()).cloned();
            (descriptor, table)
        })
        .collect())
}

#[test]
fn test_unique_violation_leaves_everything_unchanged() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let users = db.collection("users")?;
            users.create_index(vec!["email"], &unique_index())?;
            users.create_index(vec!["city"], &non_unique_index())?;
            users.insert(doc! { "email": "a@x.io", "city": "oslo" })?;
            users.insert(doc! { "email": "b@x.io", "city": "oslo" })?;

            let before = index_tables(&db, &users)?;

            let err = users.insert(doc! { "email": "a@x.io", "city": "rome" }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UniqueConstraintViolation);
            let err = users
                .insert_many(vec![doc! { "email": "c@x.io", "city": "rome" }, doc! { "email": "c@x.io" }])
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UniqueConstraintViolation);
            let err = users
                .update(field("email").eq("b@x.io"), &doc! { "email": "a@x.io", "city": "rome" })
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UniqueConstraintViolation);

            assert_eq!(users.size()?, 2);
            assert_eq!(users.find(field("city").eq("rome"))?.count(), 0);
            assert_eq!(index_tables(&db, &users)?, before);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_rebuild_index_is_equivalent() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let items = db.collection("items")?;
            items.create_index(vec!["color"], &non_unique_index())?;
            items.create_index(vec!["sku"], &unique_index())?;

            let mut rng = rng();
            let colors = ["red", "green", "blue", "black"];
            for sku in 0..300 {
                let color = colors.choose(&mut rng).copied().unwrap_or("red");
                items.insert(doc! { "sku": sku, "color": color, "weight": (rng.random_range(1..100)) })?;
            }
            items.remove(field("color").eq("black"))?;
            items.update(field("color").eq("green"), &doc! { "color": "red" })?;

            let before = index_tables(&db, &items)?;

            items.rebuild_index(vec!["color"])?;
            items.rebuild_index(vec!["sku"])?;
            assert_eq!(index_tables(&db, &items)?, before);

            items.drop_index(vec!["color"])?;
            items.drop_index(vec!["sku"])?;
            items.create_index(vec!["color"], &non_unique_index())?;
            items.create_index(vec!["sku"], &unique_index())?;
            assert_eq!(index_tables(&db, &items)?, before);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_unique_index_over_duplicates_fails() {
    run_test(
        || create_test_context(),
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.insert(doc! { "email": "a@x.io" })?;
            users.insert(doc! { "email": "a@x.io" })?;

            let err = users.create_index(vec!["email"], &unique_index()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::IndexValidationError);
            assert!(!users.has_index(vec!["email"])?);
            assert_eq!(users.size()?, 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_index_lifecycle() {
    run_test(
        || create_test_context(),
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.create_index(vec!["email"], &unique_index())?;
            users.create_index(vec!["first", "last"], &non_unique_index())?;

            let err = users.create_index(vec!["email"], &non_unique_index()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::IndexAlreadyExists);

            let types: Vec<String> = users
                .list_indexes()?
                .iter()
                .map(|descriptor| descriptor.index_type().to_string())
                .collect();
            assert!(types.contains(&UNIQUE_INDEX.to_string()));
            assert!(types.contains(&NON_UNIQUE_INDEX.to_string()));

            users.drop_index(vec!["email"])?;
            assert!(!users.has_index(vec!["email"])?);
            let err = users.drop_index(vec!["email"]).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::IndexNotFound);
            let err = users.rebuild_index(vec!["email"]).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::IndexNotFound);

            users.drop_all_indexes()?;
            assert!(users.list_indexes()?.is_empty());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_compound_index() {
    run_test(
        || create_test_context(),
        |ctx| {
            let people = ctx.db().collection("people")?;
            people.create_index(vec!["first", "last"], &unique_index())?;
            people.insert(doc! { "first": "ada", "last": "lovelace" })?;
            people.insert(doc! { "first": "ada", "last": "byron" })?;

            let err = people.insert(doc! { "first": "ada", "last": "byron" }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UniqueConstraintViolation);

            let filter = field("first").eq("ada").and(field("last").eq("byron"));
            let mut cursor = people.find(filter)?;
            assert!(cursor.find_plan().index_descriptor().is_some());
            let found = cursor.first().transpose()?.unwrap_or_default();
            assert_eq!(text(&found, "last"), "byron");
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_clear_keeps_indexes() {
    run_test(
        || create_test_context(),
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.create_index(vec!["email"], &unique_index())?;
            users.insert(doc! { "email": "a@x.io" })?;
            users.clear()?;

            assert_eq!(users.find(all())?.count(), 0);
            assert!(users.has_index(vec!["email"])?);
            users.insert(doc! { "email": "a@x.io" })?;
            assert_eq!(users.size()?, 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
