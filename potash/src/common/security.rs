use crate::collection::Document;
use crate::common::{Value, USER_MAP};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::store::{PotashStore, WriteBatch};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

const HASH_FIELD: &str = "hash";

fn invalid_credentials() -> PotashError {
    PotashError::new("Username or password is invalid", ErrorKind::SecurityError)
}

/// Guards a store with a single set of credentials.
///
/// The first open with credentials stores an argon2 hash of the password;
/// every later open must present the same username and password. A store
/// without credentials stays open to anyone.
pub(crate) struct AuthService {
    store: PotashStore,
}

impl AuthService {
    pub(crate) fn new(store: PotashStore) -> Self {
        AuthService { store }
    }

    pub(crate) fn authenticate(&self, username: Option<&str>, password: Option<&str>) -> PotashResult<()> {
        let secured = self
            .store
            .snapshot()?
            .table(USER_MAP)
            .map(|users| !users.is_empty())
            .unwrap_or(false);

        match (username, password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                if secured {
                    self.validate_user(user, pass)
                } else {
                    self.create_user(user, pass)
                }
            }
            (None, None) if !secured => Ok(()),
            _ => {
                log::error!("Username or password is invalid");
                Err(invalid_credentials())
            }
        }
    }

    fn create_user(&self, username: &str, password: &str) -> PotashResult<()> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                log::error!("Failed to hash password: {:?}", e);
                invalid_credentials()
            })?;

        let mut credential = Document::new();
        credential.put(HASH_FIELD, hash.to_string())?;

        let mut batch = WriteBatch::new();
        batch.put(USER_MAP, Value::from(username), Value::Document(credential));
        self.store.commit(batch)?;
        log::info!("Credentials stored for user {}", username);
        Ok(())
    }

    fn validate_user(&self, username: &str, password: &str) -> PotashResult<()> {
        let snapshot = self.store.snapshot()?;
        let expected_hash = snapshot
            .get(USER_MAP, &Value::from(username))
            .and_then(|credential| credential.as_document())
            .and_then(|credential| credential.get(HASH_FIELD))
            .and_then(|hash| hash.as_str())
            .ok_or_else(|| {
                log::error!("No credentials stored for user {}", username);
                invalid_credentials()
            })?;

        let parsed_hash = PasswordHash::new(expected_hash).map_err(|e| {
            log::error!("Stored password hash is invalid: {:?}", e);
            invalid_credentials()
        })?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|e| {
                log::error!("Username or password is invalid: {:?}", e);
                invalid_credentials()
            })
    }
}
