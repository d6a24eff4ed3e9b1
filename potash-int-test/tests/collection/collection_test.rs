use potash::collection::{PotashCollectionProvider, UpdateOptions};
use potash::common::PersistentCollection;
use potash::doc;
use potash::errors::ErrorKind;
use potash::filter::{all, field};
use potash::index::unique_index;
use potash::potash::Potash;
use potash_int_test::test_util::{cleanup, create_test_context, run_test, text};
use std::sync::Barrier;
use std::thread;

#[test]
fn test_users_scenario_in_memory() {
    let db = Potash::builder().open_or_create(None, None).unwrap();
    let users = db.collection("users").unwrap();
    users.create_index(vec!["id"], &unique_index()).unwrap();

    users.insert(doc! { "id": 1, "name": "a" }).unwrap();
    users.insert(doc! { "id": 2, "name": "b" }).unwrap();
    let err = users.insert(doc! { "id": 1, "name": "c" }).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UniqueConstraintViolation);

    assert_eq!(users.size().unwrap(), 2);
    let original = users.find(field("id").eq(1)).unwrap().first().unwrap().unwrap();
    assert_eq!(text(&original, "name"), "a");
    db.close().unwrap();
}

#[test]
fn test_insert_and_get_by_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let books = db.collection("books")?;
            let result = books.insert_many(vec![
                doc! { "title": "Dune", "year": 1965 },
                doc! { "title": "Solaris", "year": 1961 },
            ])?;
            assert_eq!(result.affected_count(), 2);

            let id = result.affected_ids()[1];
            let book = books.get_by_id(&id)?;
            assert!(book.is_some());
            let book = book.unwrap_or_default();
            assert_eq!(text(&book, "title"), "Solaris");
            assert_eq!(book.id(), Some(id));
            assert_eq!(book.revision(), 1);
            assert!(book.last_modified_since_epoch() > 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_update_bumps_revision() {
    run_test(
        || create_test_context(),
        |ctx| {
            let books = ctx.db().collection("books")?;
            books.insert(doc! { "title": "Dune", "year": 1965 })?;

            let result = books.update(field("title").eq("Dune"), &doc! { "year": 1966 })?;
            assert_eq!(result.affected_count(), 1);

            let book = books.find(field("title").eq("Dune"))?.first().transpose()?;
            let book = book.unwrap_or_default();
            assert_eq!(book.get("year").and_then(|v| v.as_i64()), Some(1966));
            assert_eq!(book.revision(), 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_update_options() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tasks = ctx.db().collection("tasks")?;
            tasks.insert_many(vec![doc! { "state": "open" }, doc! { "state": "open" }])?;

            let result = tasks.update_with_options(
                field("state").eq("open"),
                &doc! { "state": "done" },
                &UpdateOptions::new(false, true),
            )?;
            assert_eq!(result.affected_count(), 1);
            assert_eq!(tasks.find(field("state").eq("open"))?.count(), 1);

            let result = tasks.update(field("state").eq("archived"), &doc! { "state": "archived" })?;
            assert_eq!(result.affected_count(), 0);

            let result = tasks.update_with_options(
                field("state").eq("archived"),
                &doc! { "state": "archived" },
                &UpdateOptions::new(true, false),
            )?;
            assert_eq!(result.affected_count(), 1);
            assert_eq!(tasks.size()?, 3);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_remove() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tasks = ctx.db().collection("tasks")?;
            for i in 0..5 {
                tasks.insert(doc! { "n": i, "even": (i % 2 == 0) })?;
            }

            let result = tasks.remove_with_options(field("even").eq(true), true)?;
            assert_eq!(result.affected_count(), 1);
            let result = tasks.remove(field("even").eq(true))?;
            assert_eq!(result.affected_count(), 2);
            assert_eq!(tasks.size()?, 2);

            let last = tasks.find(all())?.first().transpose()?.unwrap_or_default();
            tasks.remove_one(&last)?;
            assert_eq!(tasks.size()?, 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_get_or_create_from_many_threads() {
    run_test(
        || create_test_context(),
        |ctx| {
            let threads = 8;
            let barrier = Barrier::new(threads);
            let handles = thread::scope(|scope| {
                let workers: Vec<_> = (0..threads)
                    .map(|_| {
                        let db = ctx.db();
                        let barrier = &barrier;
                        scope.spawn(move || {
                            barrier.wait();
                            db.collection("shared")
                        })
                    })
                    .collect();
                workers
                    .into_iter()
                    .map(|worker| worker.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                    .collect::<Result<Vec<_>, _>>()
            })?;

            for handle in &handles[1..] {
                assert!(handles[0].same_handle(handle));
            }
            assert_eq!(
                ctx.db().list_collection_names()?.into_iter().collect::<Vec<_>>(),
                vec!["shared".to_string()]
            );
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_destroy_collection() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let notes = db.collection("notes")?;
            notes.insert(doc! { "text": "hello" })?;
            assert!(db.has_collection("notes")?);

            db.destroy_collection("notes")?;
            assert!(!db.has_collection("notes")?);
            assert!(notes.is_dropped()?);
            assert_eq!(notes.size().unwrap_err().kind(), &ErrorKind::InvalidOperation);

            db.destroy_collection("never-created")?;

            let notes = db.collection("notes")?;
            assert_eq!(notes.size()?, 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_reserved_collection_names() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            for name in ["a|b", "a+b", "$catalog", ""] {
                let err = db.collection(name).unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::ValidationError, "{}", name);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_attributes() {
    run_test(
        || create_test_context(),
        |ctx| {
            let notes = ctx.db().collection("notes")?;
            notes.set_attributes(doc! { "owner": "ops" })?;
            assert_eq!(text(&notes.attributes()?, "owner"), "ops");
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_closed_database_rejects_operations() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let notes = db.collection("notes")?;
            db.close()?;
            db.close()?;
            assert!(db.is_closed()?);

            assert_eq!(db.collection("notes").unwrap_err().kind(), &ErrorKind::StoreClosed);
            assert_eq!(
                notes.insert(doc! { "text": "late" }).unwrap_err().kind(),
                &ErrorKind::StoreClosed
            );
            assert_eq!(notes.find(all()).unwrap_err().kind(), &ErrorKind::StoreClosed);
            assert_eq!(db.session().unwrap_err().kind(), &ErrorKind::StoreClosed);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
