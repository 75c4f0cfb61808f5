//! Broker credentials stored in a small owner-only file.
//!
//! The file holds the username on the first line and the password on the
//! second.

use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::error::MqttError;

/// File name used under `$HOME` when no path is configured.
pub const DEFAULT_FILE_NAME: &str = ".mqtt_auth";

/// Username and password for the broker.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Reads and writes the credentials file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$HOME/.mqtt_auth`, or `None` when `HOME` is unset.
    #[must_use]
    pub fn in_home() -> Option<Self> {
        std::env::var_os("HOME").map(|home| Self::new(PathBuf::from(home).join(DEFAULT_FILE_NAME)))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credentials.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::CredentialsIo`] if the file exists but cannot be
    /// read, or [`MqttError::MalformedCredentials`] if it has no username.
    pub fn load(&self) -> Result<Option<Credentials>, MqttError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(MqttError::CredentialsIo {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        self.warn_if_shared();
        self.parse(&content).map(Some)
    }

    /// Write `credentials`, readable by the owner only.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::CredentialsIo`] if the file cannot be written.
    pub fn persist(&self, credentials: &Credentials) -> Result<(), MqttError> {
        let io_err = |source| MqttError::CredentialsIo {
            path: self.path.clone(),
            source,
        };

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt as _;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(io_err)?;
        writeln!(file, "{}\n{}", credentials.username, credentials.password).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }

        tracing::info!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    fn parse(&self, content: &str) -> Result<Credentials, MqttError> {
        let mut lines = content.lines();
        let username = lines.next().unwrap_or_default();
        if username.is_empty() {
            return Err(MqttError::MalformedCredentials {
                path: self.path.clone(),
            });
        }
        let password = lines.next().unwrap_or_default();
        Ok(Credentials::new(username, password))
    }

    #[cfg(unix)]
    fn warn_if_shared(&self) {
        use std::os::unix::fs::PermissionsExt as _;

        let shared = std::fs::metadata(&self.path)
            .is_ok_and(|meta| meta.permissions().mode() & 0o077 != 0);
        if shared {
            tracing::warn!(
                path = %self.path.display(),
                "credentials file is readable by other users"
            );
        }
    }

    #[cfg(not(unix))]
    fn warn_if_shared(&self) {}
}

/// Pick the credentials to connect with.
///
/// Explicit credentials (from the environment) win and are saved to `store`
/// when it has no file yet, so later runs find them. Otherwise the file is
/// read. With neither, the connection is anonymous.
///
/// # Errors
///
/// Returns an error if the credentials file exists but cannot be read or
/// is malformed.
pub fn resolve(
    explicit: Option<Credentials>,
    store: Option<&CredentialStore>,
) -> Result<Option<Credentials>, MqttError> {
    match (explicit, store) {
        (Some(creds), Some(store)) => {
            if !store.path().exists() {
                if let Err(err) = store.persist(&creds) {
                    tracing::warn!(error = %err, "could not save credentials");
                }
            }
            Ok(Some(creds))
        }
        (Some(creds), None) => Ok(Some(creds)),
        (None, Some(store)) => {
            let loaded = store.load()?;
            if loaded.is_none() {
                tracing::warn!(
                    path = %store.path().display(),
                    "no credentials file, connecting anonymously"
                );
            }
            Ok(loaded)
        }
        (None, None) => {
            tracing::warn!("no credentials configured, connecting anonymously");
            Ok(None)
        }
    }
}
