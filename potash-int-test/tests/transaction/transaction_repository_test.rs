use crate::repository::{random_employee, Employee};
use potash::common::PersistentCollection;
use potash::errors::ErrorKind;
use potash::filter::field;
use potash::repository::{ObjectRepository, ObjectRepositoryProvider};
use potash_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn test_repository_commit() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let repo: ObjectRepository<Employee> = db.repository()?;

            db.with_session(|session| {
                session.with_transaction(|transaction| {
                    let tx_repo: ObjectRepository<Employee> = transaction.repository()?;
                    tx_repo.insert(&random_employee(1))?;
                    tx_repo.insert(&random_employee(2))?;
                    assert_eq!(tx_repo.size()?, 2);
                    assert_eq!(repo.size()?, 0);
                    Ok(())
                })
            })?;

            assert_eq!(repo.size()?, 2);
            assert!(repo.get_by_id(&2)?.is_some());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_repository_rollback_after_failure() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let repo: ObjectRepository<Employee> = db.repository()?;
            let original = random_employee(1);
            repo.insert(&original)?;

            let result = db.with_session(|session| {
                session.with_transaction(|transaction| {
                    let tx_repo: ObjectRepository<Employee> = transaction.repository()?;
                    let mut changed = original.clone();
                    changed.department = "moved".to_string();
                    tx_repo.update_one(&changed, false)?;
                    tx_repo.insert(&random_employee(2))?;
                    tx_repo.insert(&random_employee(1))?;
                    Ok(())
                })
            });
            assert_eq!(result.err().map(|e| e.kind().clone()), Some(ErrorKind::UniqueConstraintViolation));

            assert_eq!(repo.size()?, 1);
            assert_eq!(repo.get_by_id(&1)?, Some(original));
            assert_eq!(repo.find(field("department").eq("moved"))?.size(), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_keyed_repository_in_transaction() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            db.with_session(|session| {
                session.with_transaction(|transaction| {
                    let archive: ObjectRepository<Employee> = transaction.keyed_repository("archive")?;
                    archive.insert(&random_employee(9))
                })
            })?;

            let archive: ObjectRepository<Employee> = db.keyed_repository("archive")?;
            let current: ObjectRepository<Employee> = db.repository()?;
            assert_eq!(archive.size()?, 1);
            assert_eq!(current.size()?, 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
