use potash::collection::{Document, PotashCollectionProvider};
use potash::common::PersistentCollection;
use potash::doc;
use potash::errors::ErrorKind;
use potash::filter::field;
use potash::index::{full_text_index, IndexOptions};
use potash_int_test::test_util::{cleanup, create_test_context, run_test, text};

fn titles(found: Vec<Document>) -> Vec<String> {
    found.iter().map(|d| text(d, "title")).collect()
}

fn seed(collection: &potash::collection::PotashCollection) -> potash::errors::PotashResult<()> {
    collection.insert_many(vec![
        doc! { "title": "a", "body": "Embedded databases written in Rust" },
        doc! { "title": "b", "body": "A database for the browser" },
        doc! { "title": "c", "body": "Rust ownership and borrowing explained" },
        doc! { "title": "d", "body": "Gardening in small spaces" },
    ])?;
    Ok(())
}

#[test]
fn test_text_search_with_index() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("articles")?;
            seed(&collection)?;
            collection.create_index(vec!["body"], &full_text_index())?;
            assert!(collection.has_index(vec!["body"])?);

            let found: Vec<Document> = collection.find(field("body").text("rust"))?.collect::<Result<_, _>>()?;
            let mut matched = titles(found);
            matched.sort();
            assert_eq!(matched, vec!["a", "c"]);

            // most matching words first
            let found: Vec<Document> = collection
                .find(field("body").text("rust databases"))?
                .collect::<Result<_, _>>()?;
            assert_eq!(titles(found).first().map(String::as_str), Some("a"));

            let found: Vec<Document> = collection.find(field("body").text("data*"))?.collect::<Result<_, _>>()?;
            let mut matched = titles(found);
            matched.sort();
            assert_eq!(matched, vec!["a", "b"]);

            assert_eq!(collection.find(field("body").text("the in"))?.count(), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_index_follows_writes() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("articles")?;
            collection.create_index(vec!["body"], &full_text_index())?;
            seed(&collection)?;

            collection.update(field("title").eq("d"), &doc! { "body": "Rust in the garden" })?;
            assert_eq!(collection.find(field("body").text("rust"))?.count(), 3);
            assert_eq!(collection.find(field("body").text("gardening"))?.count(), 0);

            collection.remove(field("title").eq("a"))?;
            assert_eq!(collection.find(field("body").text("rust"))?.count(), 2);
            assert_eq!(collection.find(field("body").text("embedded"))?.count(), 0);

            collection.rebuild_index(vec!["body"])?;
            assert_eq!(collection.find(field("body").text("rust"))?.count(), 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_text_search_without_index_scans() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("articles")?;
            seed(&collection)?;
            assert_eq!(collection.find(field("body").text("RUST"))?.count(), 2);
            assert_eq!(collection.find(field("body").text("*own*"))?.count(), 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_full_text_index_rejections() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("articles")?;
            let err = collection
                .create_index(vec!["title", "body"], &IndexOptions::new("full-text"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::IndexValidationError);

            collection.insert(doc! { "title": "n", "body": 42 })?;
            let err = collection.create_index(vec!["body"], &full_text_index()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::IndexValidationError);
            assert!(!collection.has_index(vec!["body"])?);

            let err = collection.find(field("body").text("*")).and_then(|mut c| c.next().transpose());
            assert_eq!(err.unwrap_err().kind(), &ErrorKind::FilterError);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
