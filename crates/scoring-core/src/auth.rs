//! Token authentication
//!
//! Regular callers present `hex(sha512(account + login + SALT))`. The admin
//! login presents `hex(sha512(YYYYMMDDHH + ADMIN_SALT))`, so an admin token is
//! only good for the wall-clock hour it was issued in. The clock is read when
//! the check runs.

use chrono::NaiveDateTime;
use sha2::{Digest, Sha512};
use std::sync::Arc;

use crate::requests::{MethodRequest, ADMIN_LOGIN};

/// Shared secret for regular callers
pub const SALT: &str = "Otus";

/// Shared secret for the admin login
pub const ADMIN_SALT: &str = "42";

/// Hour stamp format hashed into admin tokens
pub const ADMIN_HOUR_FORMAT: &str = "%Y%m%d%H";

/// Source of the current local time
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Computes and checks request tokens
#[derive(Clone)]
pub struct Authenticator {
    salt: String,
    admin_salt: String,
    clock: Arc<dyn Clock>,
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("salt", &"<redacted>")
            .field("admin_salt", &"<redacted>")
            .finish()
    }
}

impl Authenticator {
    /// Authenticator with the built-in salts and the system clock
    pub fn new() -> Self {
        Self::with_salts(SALT, ADMIN_SALT)
    }

    pub fn with_salts(salt: impl Into<String>, admin_salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            admin_salt: admin_salt.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for admin tokens
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Token a regular caller must present
    pub fn user_token(&self, account: &str, login: &str) -> String {
        sha512_hex(&format!("{}{}{}", account, login, self.salt))
    }

    /// Admin token valid for the current clock hour
    pub fn admin_token(&self) -> String {
        let hour = self.clock.now().format(ADMIN_HOUR_FORMAT).to_string();
        sha512_hex(&format!("{}{}", hour, self.admin_salt))
    }

    /// Token the given credentials must present right now
    pub fn expected_token(&self, account: &str, login: &str) -> String {
        if login == ADMIN_LOGIN {
            self.admin_token()
        } else {
            self.user_token(account, login)
        }
    }

    /// Whether the envelope's token matches, exactly and case-sensitively
    pub fn check_auth(&self, request: &MethodRequest) -> bool {
        let account = request.account.as_deref().unwrap_or_default();
        self.expected_token(account, &request.login) == request.token
    }
}

/// Lowercase hex SHA-512 digest
pub fn sha512_hex(input: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
