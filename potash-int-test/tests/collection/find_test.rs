use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use potash::collection::{Document, FindOptions, PotashCollection, PotashCollectionProvider};
use potash::common::{PersistentCollection, SortOrder};
use potash::doc;
use potash::errors::PotashResult;
use potash::filter::{all, and, field, not, or};
use potash::index::non_unique_index;
use potash_int_test::test_util::{cleanup, create_test_context, run_test, text};

fn people(collection: &PotashCollection) -> PotashResult<()> {
    collection.insert_many(vec![
        doc! { "name": "ada", "age": 36, "address": { "city": "london" }, "tags": ["math", "code"] },
        doc! { "name": "alan", "age": 41, "address": { "city": "wilmslow" }, "tags": ["code"] },
        doc! { "name": "grace", "age": 85, "address": { "city": "arlington" }, "tags": ["navy", "code"] },
        doc! { "name": "edsger", "age": 72, "address": { "city": "nuenen" }, "tags": [] },
    ])?;
    Ok(())
}

fn names(documents: impl Iterator<Item = PotashResult<Document>>) -> PotashResult<Vec<String>> {
    documents.map(|doc| doc.map(|doc| text(&doc, "name"))).collect()
}

#[test]
fn test_find_with_filters() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("people")?;
            people(&collection)?;

            assert_eq!(collection.find(all())?.size(), 4);
            assert_eq!(collection.find(field("age").gt(40))?.count(), 3);
            assert_eq!(collection.find(field("age").between(36, 41))?.count(), 2);
            assert_eq!(collection.find(field("address.city").eq("london"))?.count(), 1);
            assert_eq!(collection.find(field("name").regex("^a"))?.count(), 2);
            assert_eq!(collection.find(field("name").in_array(vec!["ada", "grace"]))?.count(), 2);
            assert_eq!(collection.find(field("tags").elem_match(field("$").eq("navy")))?.count(), 1);
            assert_eq!(
                collection.find(and(vec![field("age").lt(80), field("tags").elem_match(field("$").eq("code"))]))?.count(),
                2
            );
            assert_eq!(collection.find(or(vec![field("age").lt(40), field("age").gt(80)]))?.count(), 2);
            assert_eq!(collection.find(not(field("name").eq("ada")))?.count(), 3);
            assert_eq!(collection.find(field("missing").eq("x"))?.count(), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_find_with_options() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("people")?;
            people(&collection)?;

            let options = FindOptions::new().sort_by("age", SortOrder::Descending);
            let sorted = names(collection.find_with_options(all(), &options)?)?;
            assert_eq!(sorted, vec!["grace", "edsger", "alan", "ada"]);

            let options = FindOptions::new()
                .sort_by("name", SortOrder::Ascending)
                .skip(1)
                .limit(2);
            let page = names(collection.find_with_options(all(), &options)?)?;
            assert_eq!(page, vec!["alan", "edsger"]);

            let options = FindOptions::new().skip(10);
            assert_eq!(collection.find_with_options(all(), &options)?.count(), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_cursor_reset_and_first() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("people")?;
            people(&collection)?;

            let mut cursor = collection.find(field("age").gte(72))?;
            assert_eq!(cursor.size(), 2);
            assert_eq!(cursor.by_ref().count(), 2);
            cursor.reset();
            assert!(cursor.first().transpose()?.is_some());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_find_uses_index_when_available() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("people")?;
            people(&collection)?;
            collection.create_index(vec!["name"], &non_unique_index())?;

            let cursor = collection.find(field("name").eq("alan"))?;
            assert!(cursor.find_plan().index_descriptor().is_some());
            assert_eq!(cursor.count(), 1);

            let cursor = collection.find(field("age").eq(41))?;
            assert!(cursor.find_plan().is_full_scan());
            assert_eq!(cursor.count(), 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_indexed_and_scanned_finds_agree() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let indexed = db.collection("indexed")?;
            let scanned = db.collection("scanned")?;
            indexed.create_index(vec!["last"], &non_unique_index())?;

            let mut last_names = Vec::new();
            for _ in 0..200 {
                let first: String = FirstName().fake();
                let last: String = LastName().fake();
                indexed.insert(doc! { "first": (first.clone()), "last": (last.clone()) })?;
                scanned.insert(doc! { "first": first, "last": (last.clone()) })?;
                last_names.push(last);
            }

            for last in last_names.iter().take(20) {
                let from_index = indexed.find(field("last").eq(last.as_str()))?.count();
                let from_scan = scanned.find(field("last").eq(last.as_str()))?.count();
                assert_eq!(from_index, from_scan, "{}", last);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
