use potash::collection::Document;
use potash::common::Value;
use potash::errors::{ErrorKind, PotashError, PotashResult};
use potash::potash::Potash;
use potash_file_adapter::FileStoreModule;
use potash_spatial::SpatialModule;
use std::backtrace::Backtrace;
use std::time::{Duration, Instant};
use std::{env, fs, thread};

/// Runs `test` between `before` and `after`, retrying a failed attempt.
///
/// `after` runs whether the test body failed or not. A panic inside any of
/// the three closures counts as a failed attempt.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> PotashResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> PotashResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> PotashResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error = String::new();

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(()) => after(ctx).map_err(|e| format!("After run failed: {:?}", e)),
                Err(e) => {
                    let _ = after(ctx);
                    Err(format!("Test failed: {:?}", e))
                }
            },
            Err(e) => Err(format!("Before run failed: {:?}", e)),
        });

        last_error = match result {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e,
            Err(panic) => match panic.downcast_ref::<&str>() {
                Some(s) => format!("Panic: {}", s),
                None => match panic.downcast_ref::<String>() {
                    Some(s) => format!("Panic: {}", s),
                    None => "Panic: unknown payload".to_string(),
                },
            },
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt,
                MAX_RETRIES,
                start_time.elapsed()
            );
            eprintln!("{}", last_error);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
    }

    let backtrace = Backtrace::capture().to_string();
    if !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    panic!("Test failed after {} attempts. Last error: {}", MAX_RETRIES, last_error);
}

#[derive(Clone)]
pub struct TestContext {
    path: String,
    db: Potash,
}

impl TestContext {
    pub fn new(path: String, db: Potash) -> Self {
        Self { path, db }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn db(&self) -> Potash {
        self.db.clone()
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    env::temp_dir().join(id.to_string()).to_string_lossy().into_owned()
}

/// Opens a file-backed database in `path`.
pub fn open_file_db(path: &str, username: Option<&str>, password: Option<&str>) -> PotashResult<Potash> {
    let storage_module = FileStoreModule::with_config().db_path(path).build();
    Potash::builder()
        .load_module(storage_module)
        .open_or_create(username, password)
}

#[cfg(not(feature = "memory"))]
pub fn create_test_context() -> PotashResult<TestContext> {
    let path = random_path();
    match open_file_db(&path, None, None) {
        Ok(db) => Ok(TestContext::new(path, db)),
        Err(e) => {
            let _ = fs::remove_dir_all(&path);
            Err(e)
        }
    }
}

#[cfg(feature = "memory")]
pub fn create_test_context() -> PotashResult<TestContext> {
    let db = Potash::builder().open_or_create(None, None)?;
    Ok(TestContext::new(random_path(), db))
}

/// A context whose database also carries the spatial indexer and, since
/// that suppresses the default mapper, the document mapper.
pub fn create_spatial_test_context() -> PotashResult<TestContext> {
    let path = random_path();
    let mut builder = Potash::builder()
        .load_module(SpatialModule::new())
        .load_module(potash::common::DocumentMapperModule);
    if cfg!(not(feature = "memory")) {
        builder = builder.load_module(FileStoreModule::with_config().db_path(&path).build());
    }
    match builder.open_or_create(None, None) {
        Ok(db) => Ok(TestContext::new(path, db)),
        Err(e) => {
            let _ = fs::remove_dir_all(&path);
            Err(e)
        }
    }
}

/// Closes the database and removes its directory.
pub fn cleanup(ctx: TestContext) -> PotashResult<()> {
    if let Err(e) = ctx.db().close() {
        eprintln!("Warning: Failed to close database: {:?}", e);
    }

    let path = ctx.path();
    for retry in 0..5u64 {
        if !std::path::Path::new(path).exists() {
            return Ok(());
        }
        match fs::remove_dir_all(path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(_) => thread::sleep(Duration::from_millis(50 * (retry + 1))),
        }
    }
    Err(PotashError::new(
        &format!("Failed to remove test directory {}", path),
        ErrorKind::IOError,
    ))
}

/// Reads a string field, empty when absent.
pub fn text(document: &Document, field: &str) -> String {
    document
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
