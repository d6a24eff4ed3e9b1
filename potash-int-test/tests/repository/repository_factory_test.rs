use super::{random_employee, Employee, Note};
use potash::common::PersistentCollection;
use potash::errors::ErrorKind;
use potash::repository::{ObjectRepository, ObjectRepositoryProvider};
use potash_derive::{Convertible, PotashEntity};
use potash_int_test::test_util::{cleanup, create_test_context, open_file_db, random_path, run_test};
use std::thread;

#[derive(Debug, Default, Convertible, PotashEntity)]
#[entity(name = "notes")]
struct Memo {
    text: String,
}

#[test]
fn test_repository_from_many_threads() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repositories = thread::scope(|scope| {
                let workers: Vec<_> = (0..8)
                    .map(|i| {
                        let db = ctx.db();
                        scope.spawn(move || {
                            let repo: ObjectRepository<Employee> = db.repository()?;
                            repo.insert(&random_employee(i))?;
                            Ok(repo)
                        })
                    })
                    .collect();
                workers
                    .into_iter()
                    .map(|worker| worker.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                    .collect::<Result<Vec<_>, potash::errors::PotashError>>()
            })?;

            let first = repositories[0].document_collection();
            for repo in &repositories[1..] {
                assert!(first.same_handle(&repo.document_collection()));
            }
            assert_eq!(repositories[0].size()?, 8);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_repository_name_bound_to_one_type() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let notes: ObjectRepository<Note> = db.repository()?;
            assert_eq!(notes.size()?, 0);

            let err = db.repository::<Memo>().err().map(|e| e.kind().clone());
            assert_eq!(err, Some(ErrorKind::MappingError));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_stored_entity_type_checked_after_reopen() {
    let path = random_path();
    let db = open_file_db(&path, None, None).unwrap();
    let notes: ObjectRepository<Note> = db.repository().unwrap();
    notes
        .insert(&Note {
            note_id: None,
            text: "kept".to_string(),
        })
        .unwrap();
    db.close().unwrap();

    let db = open_file_db(&path, None, None).unwrap();
    let err = db.repository::<Memo>().err().map(|e| e.kind().clone());
    assert_eq!(err, Some(ErrorKind::MappingError));
    let notes: ObjectRepository<Note> = db.repository().unwrap();
    assert_eq!(notes.size().unwrap(), 1);
    db.close().unwrap();
    let _ = std::fs::remove_dir_all(&path);
}
