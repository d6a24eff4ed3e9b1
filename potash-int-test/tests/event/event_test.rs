use crate::repository::{random_employee, Employee};
use potash::collection::{
    insert_if_absent, CollectionEventInfo, CollectionEventListener, CollectionEvents, PotashCollectionProvider,
};
use potash::common::{EventAware, Value};
use potash::doc;
use potash::filter::field;
use potash::repository::{ObjectRepository, ObjectRepositoryProvider};
use potash_int_test::test_util::{cleanup, create_test_context, run_test};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn wait_for_event<F: Fn() -> bool>(timeout_ms: u64, check: F) {
    awaitility::at_most(Duration::from_millis(timeout_ms)).until(check);
}

type Seen = Arc<Mutex<Vec<CollectionEventInfo>>>;

fn recording_listener() -> (CollectionEventListener, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener = CollectionEventListener::new(move |event: CollectionEventInfo| {
        sink.lock().unwrap().push(event);
        Ok(())
    });
    (listener, seen)
}

fn last_of(seen: &Seen, event_type: CollectionEvents) -> Option<CollectionEventInfo> {
    seen.lock()
        .unwrap()
        .iter()
        .rev()
        .find(|event| event.event_type() == event_type)
        .cloned()
}

fn item_field(event: &CollectionEventInfo, name: &str) -> Option<Value> {
    match event.item() {
        Some(Value::Document(document)) => document.get(name).cloned(),
        _ => None,
    }
}

#[test]
fn test_insert_update_remove_events() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("events")?;
            let (listener, seen) = recording_listener();
            collection.subscribe(listener)?;

            collection.insert(doc! { "name": "a", "age": 1 })?;
            wait_for_event(1000, || last_of(&seen, CollectionEvents::Insert).is_some());
            let inserted = last_of(&seen, CollectionEvents::Insert).unwrap();
            assert_eq!(inserted.originator(), "events");
            assert_eq!(item_field(&inserted, "name"), Some(Value::from("a")));
            assert!(item_field(&inserted, "_id").is_some());

            collection.update(field("name").eq("a"), &doc! { "age": 2 })?;
            wait_for_event(1000, || last_of(&seen, CollectionEvents::Update).is_some());
            let updated = last_of(&seen, CollectionEvents::Update).unwrap();
            assert_eq!(item_field(&updated, "age"), Some(Value::from(2)));

            collection.remove(field("name").eq("a"))?;
            wait_for_event(1000, || last_of(&seen, CollectionEvents::Remove).is_some());
            let removed = last_of(&seen, CollectionEvents::Remove).unwrap();
            assert_eq!(item_field(&removed, "age"), Some(Value::from(2)));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_upsert_reports_insert() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("events")?;
            let (listener, seen) = recording_listener();
            collection.subscribe(listener)?;

            collection.update_with_options(
                field("name").eq("b"),
                &doc! { "name": "b" },
                &insert_if_absent(),
            )?;
            wait_for_event(1000, || last_of(&seen, CollectionEvents::Insert).is_some());
            assert!(last_of(&seen, CollectionEvents::Update).is_none());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_no_event_without_change() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("events")?;
            collection.insert(doc! { "name": "a" })?;

            let (listener, seen) = recording_listener();
            collection.subscribe(listener)?;
            collection.update(field("name").eq("missing"), &doc! { "age": 2 })?;
            collection.remove(field("name").eq("missing"))?;

            thread::sleep(Duration::from_millis(50));
            assert!(seen.lock().unwrap().is_empty());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_unsubscribe_stops_events() {
    run_test(
        || create_test_context(),
        |ctx| {
            let collection = ctx.db().collection("events")?;
            let (listener, seen) = recording_listener();
            let subscriber = collection.subscribe(listener)?;

            collection.insert(doc! { "name": "a" })?;
            wait_for_event(1000, || seen.lock().unwrap().len() == 1);

            collection.unsubscribe(subscriber)?;
            collection.insert(doc! { "name": "b" })?;
            thread::sleep(Duration::from_millis(50));
            assert_eq!(seen.lock().unwrap().len(), 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_repository_events() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: ObjectRepository<Employee> = ctx.db().repository()?;
            let (listener, seen) = recording_listener();
            repo.subscribe(listener)?;

            let employee = random_employee(1);
            repo.insert(&employee)?;
            wait_for_event(1000, || last_of(&seen, CollectionEvents::Insert).is_some());
            let inserted = last_of(&seen, CollectionEvents::Insert).unwrap();
            assert_eq!(inserted.originator(), "employees");
            assert_eq!(item_field(&inserted, "name"), Some(Value::from(employee.name.as_str())));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_transaction_events_follow_commit() {
    run_test(
        || create_test_context(),
        |ctx| {
            let db = ctx.db();
            let collection = db.collection("events")?;
            let (listener, seen) = recording_listener();
            collection.subscribe(listener)?;

            db.with_session(|session| {
                let rolled_back = session.begin_transaction()?;
                rolled_back.collection("events")?.insert(doc! { "name": "gone" })?;
                rolled_back.rollback()?;

                let transaction = session.begin_transaction()?;
                let tx_col = transaction.collection("events")?;
                tx_col.insert(doc! { "name": "kept" })?;
                thread::sleep(Duration::from_millis(50));
                assert!(seen.lock().unwrap().is_empty());

                transaction.commit()?;
                Ok(())
            })?;

            wait_for_event(1000, || seen.lock().unwrap().len() == 1);
            let inserted = last_of(&seen, CollectionEvents::Insert).unwrap();
            assert_eq!(item_field(&inserted, "name"), Some(Value::from("kept")));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
