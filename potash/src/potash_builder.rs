use crate::common::PotashModule;
use crate::errors::{PotashError, PotashResult};
use crate::potash::Potash;
use crate::potash_config::PotashConfig;

/// Configures and opens a [Potash] database.
///
/// Configuration errors are remembered and reported by
/// [PotashBuilder::open_or_create], so calls can be chained freely.
///
/// ```rust
/// use potash::potash::Potash;
/// use potash::store::memory::InMemoryStoreModule;
///
/// # fn main() -> potash::errors::PotashResult<()> {
/// let db = Potash::builder()
///     .field_separator("/")
///     .load_module(InMemoryStoreModule::new())
///     .open_or_create(Some("admin"), Some("secret"))?;
/// assert_eq!(db.config().field_separator(), "/");
/// db.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct PotashBuilder {
    error: Option<PotashError>,
    config: PotashConfig,
}

impl PotashBuilder {
    pub fn new() -> Self {
        PotashBuilder {
            error: None,
            config: PotashConfig::new(),
        }
    }

    pub fn field_separator(mut self, field_separator: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_field_separator(field_separator) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn load_module<T: PotashModule + 'static>(mut self, module: T) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.load_module(module) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the database, creating it when the store is empty.
    ///
    /// The first open with credentials secures the store; later opens must
    /// present the same credentials.
    ///
    /// # Errors
    /// The first configuration error recorded by the builder, a store error
    /// when the store cannot be opened, or `SecurityError` when the
    /// credentials do not match.
    pub fn open_or_create(self, username: Option<&str>, password: Option<&str>) -> PotashResult<Potash> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Potash::open_with_config(self.config, username, password)
    }
}
