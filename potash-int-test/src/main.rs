use potash::doc;
use potash::errors::PotashResult;
use potash::filter::{all, field};
use potash::common::PersistentCollection;
use potash::repository::{ObjectRepository, ObjectRepositoryProvider};
use potash_derive::{Convertible, PotashEntity};
use potash_int_test::test_util::{cleanup, create_test_context};
use std::time::Instant;

#[derive(Debug, Convertible, Default, PotashEntity)]
#[entity(index(fields = "key", index_type = "unique"))]
pub struct StressRecord {
    pub key: String,
    pub first_name: Option<String>,
    pub processed: Option<bool>,
    pub failed: Option<bool>,
}

fn main() -> PotashResult<()> {
    colog::init();
    println!("Starting stress test...");
    let ctx = create_test_context()?;

    let count = 100_000;
    let repo: ObjectRepository<StressRecord> = ctx.db().repository()?;

    let start = Instant::now();
    for i in 0..count {
        let record = StressRecord {
            key: format!("record-{}", i),
            first_name: Some(uuid::Uuid::new_v4().to_string()),
            processed: Some(false),
            failed: Some(false),
        };
        repo.insert(&record)?;
    }
    println!("Inserted {} records in {:?}", count, start.elapsed());

    let start = Instant::now();
    let cursor = repo.find(field("key").eq("record-4242"))?;
    println!("Indexed lookup found {} record(s) in {:?}", cursor.size(), start.elapsed());

    let start = Instant::now();
    let result = repo.update_document(all(), &doc! { "processed": true }, false)?;
    println!("Updated {} records in {:?}", result.affected_count(), start.elapsed());

    let start = Instant::now();
    let cursor = repo.find(field("processed").eq(true))?;
    println!("Counted {} processed records in {:?}", cursor.size(), start.elapsed());

    let start = Instant::now();
    let collection = repo.document_collection();
    collection.rebuild_index(vec!["key"])?;
    println!("Rebuilt unique index in {:?}", start.elapsed());

    cleanup(ctx)?;
    println!("Stress test finished");
    Ok(())
}
