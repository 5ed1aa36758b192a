//! Device identity handed to the sharing routine.
//!
//! The installation id is a UUID v4 generated once and kept in an
//! `INSTALLATION` file, so it survives restarts.

use std::fs;
use std::io;
use std::path::Path;

use uuid::Uuid;

/// File holding the installation id.
pub const INSTALLATION_FILE: &str = "INSTALLATION";

/// Identity of this device installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    id: String,
    name: String,
}

impl DeviceIdentity {
    /// Identity with explicit values.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Fresh identity that is not persisted.
    pub fn ephemeral(name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), name)
    }

    /// Loads the installation id from `dir`, creating it on first use.
    ///
    /// A blank or unreadable-as-text file is replaced with a new id.
    pub fn load_or_create(dir: &Path, name: impl Into<String>) -> io::Result<Self> {
        let path = dir.join(INSTALLATION_FILE);
        let id = match fs::read_to_string(&path) {
            Ok(existing) if !existing.trim().is_empty() => existing.trim().to_string(),
            Ok(_) => Self::write_new(dir, &path)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::write_new(dir, &path)?,
            Err(e) => return Err(e),
        };
        Ok(Self::new(id, name))
    }

    fn write_new(dir: &Path, path: &Path) -> io::Result<String> {
        fs::create_dir_all(dir)?;
        let id = Uuid::new_v4().to_string();
        fs::write(path, &id)?;
        tracing::debug!(path = %path.display(), "installation id created");
        Ok(id)
    }

    /// Installation id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
