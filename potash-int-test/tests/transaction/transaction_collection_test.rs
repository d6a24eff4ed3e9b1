use potash::collection::PotashCollectionProvider;
use potash::common::PersistentCollection;
use potash::doc;
use potash::errors::{ErrorKind, PotashError};
use potash::filter::{all, field};
use potash::index::unique_index;
use potash::transaction::TransactionState;
use potash_int_test::test_util::{cleanup, create_test_context, run_test, text};
use std::sync::Barrier;
use std::thread;

#[test]
fn test_commit_insert() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let collection = db.collection("test")?;

            db.with_session(|session| {
                let transaction = session.begin_transaction()?;
                assert_eq!(transaction.state(), TransactionState::Open);
                let tx_col = transaction.collection("test")?;

                tx_col.insert(doc! { "firstName": "John" })?;
                assert_eq!(transaction.state(), TransactionState::Active);

                // Visible in the transaction only
                assert_eq!(tx_col.find(field("firstName").eq("John"))?.count(), 1);
                assert_eq!(collection.find(field("firstName").eq("John"))?.count(), 0);

                transaction.commit()?;
                assert_eq!(transaction.state(), TransactionState::Committed);
                Ok(())
            })?;

            assert_eq!(collection.find(field("firstName").eq("John"))?.count(), 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_rollback_discards_changes() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let collection = db.collection("test")?;
            collection.insert(doc! { "name": "kept" })?;

            db.with_session(|session| {
                let transaction = session.begin_transaction()?;
                let tx_col = transaction.collection("test")?;
                tx_col.insert(doc! { "name": "dropped" })?;
                tx_col.remove(field("name").eq("kept"))?;
                assert_eq!(tx_col.size()?, 1);

                transaction.rollback()?;
                assert_eq!(transaction.state(), TransactionState::RolledBack);
                Ok(())
            })?;

            assert_eq!(collection.size()?, 1);
            assert_eq!(collection.find(field("name").eq("kept"))?.count(), 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_failed_operation_has_no_net_effect() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let accounts = db.collection("accounts")?;
            accounts.create_index(vec!["number"], &unique_index())?;
            accounts.insert(doc! { "number": 1, "balance": 100 })?;
            accounts.insert(doc! { "number": 2, "balance": 50 })?;

            for finish_with_close in [false, true] {
                db.with_session(|session| {
                    let transaction = session.begin_transaction()?;
                    let tx_accounts = transaction.collection("accounts")?;

                    tx_accounts.insert(doc! { "number": 3, "balance": 10 })?;
                    tx_accounts.update(field("number").eq(1), &doc! { "balance": 0 })?;
                    let err = tx_accounts.insert(doc! { "number": 2, "balance": 1 }).unwrap_err();
                    assert_eq!(err.kind(), &ErrorKind::UniqueConstraintViolation);

                    if finish_with_close {
                        transaction.close();
                        assert_eq!(transaction.state(), TransactionState::Closed);
                    } else {
                        transaction.rollback()?;
                    }
                    Ok(())
                })?;

                assert_eq!(accounts.size()?, 2);
                let first = accounts.find(field("number").eq(1))?.first().transpose()?.unwrap_or_default();
                assert_eq!(first.get("balance").and_then(|v| v.as_i64()), Some(100));
                assert_eq!(accounts.find(field("number").eq(3))?.count(), 0);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_conflicting_commits() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let counters = db.collection("counters")?;
            counters.insert(doc! { "name": "hits", "value": 0 })?;

            let first_session = db.session()?;
            let second_session = db.session()?;
            let first = first_session.begin_transaction()?;
            let second = second_session.begin_transaction()?;

            first.collection("counters")?.update(field("name").eq("hits"), &doc! { "value": 1 })?;
            second.collection("counters")?.update(field("name").eq("hits"), &doc! { "value": 2 })?;

            first.commit()?;
            let err = second.commit().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::TransactionConflict);
            assert_eq!(second.state(), TransactionState::RolledBack);

            let hits = counters.find(field("name").eq("hits"))?.first().transpose()?.unwrap_or_default();
            assert_eq!(hits.get("value").and_then(|v| v.as_i64()), Some(1));

            first_session.close();
            second_session.close();
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_concurrent_transactions_on_one_document() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let counters = db.collection("counters")?;
            counters.insert(doc! { "name": "hits", "value": 0 })?;

            let threads = 2;
            let barrier = Barrier::new(threads);
            let outcomes: Vec<Result<(), PotashError>> = thread::scope(|scope| {
                let workers: Vec<_> = (0..threads)
                    .map(|i| {
                        let db = ctx.db();
                        let barrier = &barrier;
                        scope.spawn(move || {
                            db.with_session(|session| {
                                let transaction = session.begin_transaction()?;
                                let tx_counters = transaction.collection("counters")?;
                                tx_counters.update(field("name").eq("hits"), &doc! { "value": (i + 1) })?;
                                barrier.wait();
                                transaction.commit()
                            })
                        })
                    })
                    .collect();
                workers
                    .into_iter()
                    .map(|worker| worker.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                    .collect()
            });

            let committed = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
            let conflicts = outcomes
                .iter()
                .filter(|outcome| matches!(outcome, Err(e) if e.kind() == &ErrorKind::TransactionConflict))
                .count();
            assert_eq!(committed, 1);
            assert_eq!(conflicts, 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_disjoint_transactions_both_commit() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let first = db.session()?.begin_transaction()?;
            let second = db.session()?.begin_transaction()?;

            first.collection("left")?.insert(doc! { "side": "left" })?;
            second.collection("right")?.insert(doc! { "side": "right" })?;
            first.commit()?;
            second.commit()?;

            assert_eq!(db.collection("left")?.size()?, 1);
            assert_eq!(db.collection("right")?.size()?, 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_with_transaction_helper() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let session = db.session()?;

            let inserted = session.with_transaction(|transaction| {
                let notes = transaction.collection("notes")?;
                Ok(notes.insert(doc! { "text": "saved" })?.affected_count())
            })?;
            assert_eq!(inserted, 1);

            let result: Result<(), PotashError> = session.with_transaction(|transaction| {
                transaction.collection("notes")?.insert(doc! { "text": "lost" })?;
                Err(PotashError::new("abort", ErrorKind::InvalidOperation))
            });
            assert!(result.is_err());

            let notes = db.collection("notes")?;
            assert_eq!(notes.size()?, 1);
            let saved = notes.find(all())?.first().transpose()?.unwrap_or_default();
            assert_eq!(text(&saved, "text"), "saved");
            session.close();
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_finished_transaction_is_unusable() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let session = db.session()?;
            let transaction = session.begin_transaction()?;
            let tx_notes = transaction.collection("notes")?;
            tx_notes.insert(doc! { "text": "a" })?;

            let err = session.begin_transaction().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);

            transaction.commit()?;
            assert_eq!(transaction.commit().unwrap_err().kind(), &ErrorKind::InvalidOperation);
            assert_eq!(transaction.collection("notes").unwrap_err().kind(), &ErrorKind::StoreClosed);
            assert_eq!(tx_notes.insert(doc! { "text": "b" }).unwrap_err().kind(), &ErrorKind::StoreClosed);

            let next = session.begin_transaction()?;
            session.close();
            assert!(!session.is_active());
            assert_eq!(next.state(), TransactionState::Closed);
            assert_eq!(session.begin_transaction().unwrap_err().kind(), &ErrorKind::InvalidOperation);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_index_created_in_transaction() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let users = db.collection("users")?;

            db.with_session(|session| {
                session.with_transaction(|transaction| {
                    let tx_users = transaction.collection("users")?;
                    tx_users.create_index(vec!["email"], &unique_index())?;
                    tx_users.insert(doc! { "email": "a@x.io" })?;
                    assert!(!users.has_index(vec!["email"])?);
                    Ok(())
                })
            })?;

            assert!(users.has_index(vec!["email"])?);
            let err = users.insert(doc! { "email": "a@x.io" }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UniqueConstraintViolation);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_index_created_outside_conflicts_with_commit() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let users = db.collection("users")?;

            db.with_session(|session| {
                let transaction = session.begin_transaction()?;
                let tx_users = transaction.collection("users")?;
                tx_users.insert(doc! { "email": "x@x.io" })?;

                users.create_index(vec!["email"], &unique_index())?;
                users.insert(doc! { "email": "x@x.io" })?;

                let err = transaction.commit().unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::TransactionConflict);
                assert_eq!(transaction.state(), TransactionState::RolledBack);
                Ok(())
            })?;

            assert_eq!(users.size()?, 1);
            assert_eq!(users.find(field("email").eq("x@x.io"))?.count(), 1);
            users.rebuild_index(vec!["email"])?;
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
