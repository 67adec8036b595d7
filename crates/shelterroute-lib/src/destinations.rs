//! Exits and shelters known for the site.
//!
//! The destination store is owned by whoever edits the site plan; this module
//! only reads it at startup and rewrites it wholesale on save. Like the door
//! registry, the in-memory copy is replaced by swapping an `Arc`, never
//! mutated in place.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::geometry::Point;

/// Destination category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    Exit,
    Shelter,
}

impl DestinationKind {
    /// The other kind, used for fallback routing.
    pub fn other(self) -> Self {
        match self {
            DestinationKind::Exit => DestinationKind::Shelter,
            DestinationKind::Shelter => DestinationKind::Exit,
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DestinationKind::Exit => "exit",
            DestinationKind::Shelter => "shelter",
        };
        f.write_str(value)
    }
}

/// A named exit or shelter location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl Destination {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Full destination store contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationSet {
    #[serde(default)]
    pub exits: Vec<Destination>,
    #[serde(default)]
    pub shelters: Vec<Destination>,
}

impl DestinationSet {
    pub fn of_kind(&self, kind: DestinationKind) -> &[Destination] {
        match kind {
            DestinationKind::Exit => &self.exits,
            DestinationKind::Shelter => &self.shelters,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exits.is_empty() && self.shelters.is_empty()
    }

    /// Reject records with empty ids or non-finite coordinates.
    pub fn validate(&self) -> Result<()> {
        for (field, records) in [("exits", &self.exits), ("shelters", &self.shelters)] {
            for record in records {
                if record.id.trim().is_empty() {
                    return Err(Error::validation(field, "destination id must not be empty"));
                }
                if !record.position().is_finite() {
                    return Err(Error::validation(
                        field,
                        format!("destination {} has non-finite coordinates", record.id),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Counts reported after a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DestinationCounts {
    pub exits: usize,
    pub shelters: usize,
}

/// Process-wide destination registry with snapshot-then-swap updates.
#[derive(Debug)]
pub struct DestinationRegistry {
    path: Option<PathBuf>,
    current: RwLock<Arc<DestinationSet>>,
}

impl DestinationRegistry {
    /// Load the store at `path`. A missing file yields an empty registry.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let set = read_destinations(&path)?;
        Ok(Self {
            path: Some(path),
            current: RwLock::new(Arc::new(set)),
        })
    }

    /// In-memory registry without a backing file.
    pub fn from_set(set: DestinationSet) -> Self {
        Self {
            path: None,
            current: RwLock::new(Arc::new(set)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> Arc<DestinationSet> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validate, persist (when file-backed) and swap in a new destination set.
    pub fn save(&self, set: DestinationSet) -> Result<DestinationCounts> {
        set.validate()?;
        if let Some(path) = &self.path {
            write_destinations(path, &set)?;
        }
        let counts = DestinationCounts {
            exits: set.exits.len(),
            shelters: set.shelters.len(),
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(set);
        info!(
            exits = counts.exits,
            shelters = counts.shelters,
            "destinations replaced"
        );
        Ok(counts)
    }
}

impl Default for DestinationRegistry {
    fn default() -> Self {
        Self::from_set(DestinationSet::default())
    }
}

/// Read a destination store, treating a missing file as empty.
pub fn read_destinations(path: &Path) -> Result<DestinationSet> {
    if !path.exists() {
        info!(path = %path.display(), "no destination file present, starting empty");
        return Ok(DestinationSet::default());
    }
    let contents = fs::read_to_string(path)?;
    let set: DestinationSet = serde_json::from_str(&contents)?;
    info!(
        exits = set.exits.len(),
        shelters = set.shelters.len(),
        "loaded destinations"
    );
    Ok(set)
}

/// Write the whole store to a sibling temp file, then rename it over `path`.
fn write_destinations(path: &Path, set: &DestinationSet) -> Result<()> {
    let write_err = |message: String| Error::DestinationsWrite {
        path: path.to_path_buf(),
        message,
    };

    let json = serde_json::to_string_pretty(set)?;
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, json).map_err(|e| write_err(format!("failed to write temp file: {}", e)))?;
    fs::rename(&temp, path).map_err(|e| write_err(format!("failed to replace file: {}", e)))?;
    Ok(())
}
