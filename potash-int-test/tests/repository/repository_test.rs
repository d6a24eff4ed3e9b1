use super::{random_employee, Address, Employee, Note, Shift};
use potash::collection::{FindOptions, PotashCollectionProvider};
use potash::common::{from_value, Convertible, DocumentMapperModule, PersistentCollection, SortOrder, MAPPER_ID};
use potash::doc;
use potash::errors::ErrorKind;
use potash::filter::{all, field};
use potash::potash::Potash;
use potash::repository::{ObjectRepository, ObjectRepositoryProvider};
use potash_int_test::test_util::{cleanup, create_test_context, run_test};
use potash_spatial::SpatialModule;

#[test]
fn test_insert_find_and_get_by_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: ObjectRepository<Employee> = ctx.db().repository()?;
            let employees: Vec<Employee> = (1..=20).map(random_employee).collect();
            repo.insert_many(&employees)?;
            assert_eq!(repo.size()?, 20);

            let found = repo.get_by_id(&7)?;
            assert_eq!(found.as_ref(), Some(&employees[6]));
            assert_eq!(repo.get_by_id(&99)?, None);

            let sales = employees.iter().filter(|e| e.department == "sales").count();
            assert_eq!(repo.find(field("department").eq("sales"))?.size(), sales);

            let options = FindOptions::new().sort_by("salary", SortOrder::Descending).limit(3);
            let top: Vec<f64> = repo
                .find_with_options(all(), &options)?
                .map(|e| e.map(|e| e.salary))
                .collect::<Result<_, _>>()?;
            let mut salaries: Vec<f64> = employees.iter().map(|e| e.salary).collect();
            salaries.sort_by(|a, b| b.total_cmp(a));
            assert_eq!(top, salaries[..3].to_vec());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_entity_indexes_are_created() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: ObjectRepository<Employee> = ctx.db().repository()?;
            assert!(repo.has_index(vec!["emp_id"])?);
            assert!(repo.has_index(vec!["email"])?);
            assert!(repo.has_index(vec!["department"])?);

            repo.insert(&random_employee(1))?;
            let err = repo.insert(&random_employee(1)).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UniqueConstraintViolation);
            assert_eq!(repo.size()?, 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_update_and_remove() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: ObjectRepository<Employee> = ctx.db().repository()?;
            let mut employee = random_employee(1);
            repo.insert(&employee)?;
            repo.insert(&random_employee(2))?;

            employee.department = "board".to_string();
            employee.shift = Shift::Night { hours: 6 };
            employee.address = Some(Address {
                street: Some("1 Main St".to_string()),
                city: "Bergen".to_string(),
            });
            let result = repo.update_one(&employee, false)?;
            assert_eq!(result.affected_count(), 1);
            assert_eq!(repo.get_by_id(&1)?, Some(employee.clone()));
            assert_eq!(repo.find(field("address.city").eq("Bergen"))?.size(), 1);

            let mut newcomer = random_employee(3);
            newcomer.department = "board".to_string();
            assert_eq!(repo.update_one(&newcomer, false)?.affected_count(), 0);
            assert_eq!(repo.update_one(&newcomer, true)?.affected_count(), 1);

            let result = repo.update_document(field("department").eq("board"), &doc! { "salary": 1.0 }, true)?;
            assert_eq!(result.affected_count(), 1);

            repo.remove_one(&employee)?;
            assert_eq!(repo.get_by_id(&1)?, None);
            assert_eq!(repo.remove(all())?.affected_count(), 2);
            assert_eq!(repo.size()?, 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_mapper_round_trip() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: ObjectRepository<Employee> = ctx.db().repository()?;
            for emp_id in 1..=50 {
                let employee = random_employee(emp_id);
                let mapped = employee.to_value()?;
                let restored = from_value::<Employee>(&mapped)?;
                assert_eq!(restored.to_value()?, mapped);
                assert_eq!(restored, employee);

                repo.insert(&employee)?;
                assert_eq!(repo.get_by_id(&emp_id)?, Some(employee));
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_ignored_field_is_not_stored() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: ObjectRepository<Employee> = ctx.db().repository()?;
            let mut employee = random_employee(1);
            employee.session_token = Some("secret".to_string());
            repo.insert(&employee)?;

            let stored = repo.document_collection().find(all())?.first().transpose()?.unwrap_or_default();
            assert!(!stored.contains_key("session_token"));
            assert_eq!(repo.get_by_id(&1)?.and_then(|e| e.session_token), None);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_mismatched_document_fails_mapping() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: ObjectRepository<Employee> = ctx.db().repository()?;
            repo.document_collection()
                .insert(doc! { "emp_id": "not a number", "email": "x@y.z" })?;

            let mut cursor = repo.find(all())?;
            let err = cursor.next().transpose().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MappingError);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_potash_id_as_entity_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: ObjectRepository<Note> = ctx.db().repository()?;
            let result = repo.insert(&Note {
                note_id: None,
                text: "first".to_string(),
            })?;
            let id = result.affected_ids()[0];

            let note = repo.get_by_id(&id)?;
            assert_eq!(
                note,
                Some(Note {
                    note_id: Some(id),
                    text: "first".to_string(),
                })
            );

            let edited = Note {
                note_id: Some(id),
                text: "edited".to_string(),
            };
            repo.update_one(&edited, false)?;
            assert_eq!(repo.get_by_id(&id)?, Some(edited.clone()));
            assert_eq!(repo.size()?, 1);

            repo.remove_one(&edited)?;
            assert_eq!(repo.size()?, 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_keyed_repositories_are_separate() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let current: ObjectRepository<Employee> = db.repository()?;
            let archive: ObjectRepository<Employee> = db.keyed_repository("archive")?;
            current.insert(&random_employee(1))?;
            archive.insert(&random_employee(1))?;
            archive.insert(&random_employee(2))?;

            assert_eq!(current.size()?, 1);
            assert_eq!(archive.size()?, 2);
            assert!(db.has_repository::<Employee>()?);
            assert!(db.has_keyed_repository::<Employee>("archive")?);
            assert!(db.list_repositories()?.contains("employees"));
            let keyed = db.list_keyed_repositories()?;
            assert!(keyed.get("archive").is_some_and(|names| names.contains("employees")));
            assert!(db.list_collection_names()?.is_empty());

            db.destroy_keyed_repository::<Employee>("archive")?;
            assert!(!db.has_keyed_repository::<Employee>("archive")?);
            assert_eq!(current.size()?, 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_spatial_module_alone_leaves_repositories_without_mapper() {
    let db = Potash::builder()
        .load_module(SpatialModule::new())
        .open_or_create(None, None)
        .unwrap();
    let err = db.repository::<Employee>().err().map(|e| e.kind().clone());
    assert_eq!(err, Some(ErrorKind::MappingError));
    db.collection("plain").unwrap().insert(doc! { "a": 1 }).unwrap();
    db.close().unwrap();

    let db = Potash::builder()
        .load_module(SpatialModule::new())
        .load_module(DocumentMapperModule)
        .open_or_create(None, None)
        .unwrap();
    let repo: ObjectRepository<Employee> = db.repository().unwrap();
    repo.insert(&random_employee(1)).unwrap();
    assert_eq!(repo.size().unwrap(), 1);
    db.close().unwrap();
}

#[test]
fn test_default_mapper_without_modules() {
    let db = Potash::builder().open_or_create(None, None).unwrap();
    let repo: ObjectRepository<Note> = db.repository().unwrap();
    let attributes = repo.attributes().unwrap();
    assert!(attributes.get(MAPPER_ID).and_then(|v| v.as_str()).is_some());
    db.close().unwrap();
}
