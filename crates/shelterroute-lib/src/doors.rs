//! Registry of detected doorway positions.
//!
//! Door positions come from an offline detector that writes
//! `{ "doors": [{ "pos": [x, y], ... }] }`. The registry keeps the current set
//! as an immutable [`DoorSnapshot`] (records plus a KD-tree over their
//! positions) behind a lock. A reload builds a complete new snapshot first and
//! only then swaps the `Arc`, so a search that already holds a snapshot keeps
//! seeing one consistent door set for its whole lifetime.
//!
//! A missing or unreadable door file is never fatal: the registry becomes
//! empty, door-constrained routing degrades, and a warning is logged.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::geometry::Point;
use crate::spatial::PointIndex;

/// A detected doorway. Detector-specific fields (score, class, ...) are kept
/// verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub pos: [f64; 2],
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Door {
    pub fn at(point: Point) -> Self {
        Self {
            pos: point.into(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn position(&self) -> Point {
        Point::from(self.pos)
    }
}

#[derive(Debug, Default, Deserialize)]
struct DoorFile {
    #[serde(default)]
    doors: Vec<Door>,
}

/// Immutable door set with its spatial index.
#[derive(Debug, Default)]
pub struct DoorSnapshot {
    doors: Vec<Door>,
    index: PointIndex,
}

impl DoorSnapshot {
    pub fn new(doors: Vec<Door>) -> Self {
        let index = PointIndex::build(doors.iter().map(Door::position));
        Self { doors, index }
    }

    pub fn len(&self) -> usize {
        self.doors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// Closest door to `point` and its distance.
    pub fn nearest_door(&self, point: Point) -> Option<(&Door, f64)> {
        self.index
            .nearest(point)
            .map(|(item, distance)| (&self.doors[item], distance))
    }

    /// True iff the nearest door lies within `threshold` meters of `point`.
    /// Always false for an empty snapshot.
    pub fn is_near_door(&self, point: Point, threshold: f64) -> bool {
        self.nearest_door(point)
            .is_some_and(|(_, distance)| distance <= threshold)
    }

    /// Doors within `radius` of `point`, nearest first.
    pub fn doors_within(&self, point: Point, radius: f64) -> Vec<(&Door, f64)> {
        self.index
            .within_radius(point, radius)
            .into_iter()
            .map(|(item, distance)| (&self.doors[item], distance))
            .collect()
    }
}

/// Process-wide door registry with atomic snapshot replacement.
#[derive(Debug)]
pub struct DoorRegistry {
    source: Option<PathBuf>,
    current: RwLock<Arc<DoorSnapshot>>,
}

impl DoorRegistry {
    /// Registry bound to a door file. The file is read immediately.
    pub fn load(source: impl Into<PathBuf>) -> Self {
        let registry = Self {
            source: Some(source.into()),
            current: RwLock::new(Arc::new(DoorSnapshot::default())),
        };
        registry.reload();
        registry
    }

    /// Registry with a fixed door set and no backing file.
    pub fn from_doors(doors: Vec<Door>) -> Self {
        Self {
            source: None,
            current: RwLock::new(Arc::new(DoorSnapshot::new(doors))),
        }
    }

    /// Empty registry with no backing file.
    pub fn empty() -> Self {
        Self::from_doors(Vec::new())
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Current snapshot. Holders keep it alive across later reloads.
    pub fn snapshot(&self) -> Arc<DoorSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-read the backing file (if any) and swap in the result.
    /// Returns the number of doors now registered.
    pub fn reload(&self) -> usize {
        match self.source.clone() {
            Some(path) => self.reload_from(&path),
            None => self.snapshot().len(),
        }
    }

    /// Read doors from `path`, build a new snapshot and swap it in.
    /// Unreadable files yield an empty registry.
    pub fn reload_from(&self, path: &Path) -> usize {
        let doors = match read_doors(path) {
            Ok(doors) => doors,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "door load failed, registry is now empty");
                Vec::new()
            }
        };
        self.replace(doors)
    }

    /// Swap in an explicit door set. Returns the number of doors.
    pub fn replace(&self, doors: Vec<Door>) -> usize {
        let snapshot = Arc::new(DoorSnapshot::new(doors));
        let count = snapshot.len();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        count
    }

    pub fn is_near_door(&self, point: Point, threshold: f64) -> bool {
        self.snapshot().is_near_door(point, threshold)
    }
}

impl Default for DoorRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

/// Read door records from a detector output file. A missing file is an
/// empty door set, not an error.
pub fn read_doors(path: &Path) -> Result<Vec<Door>> {
    if !path.exists() {
        info!(path = %path.display(), "no door file present, door registry empty");
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(path)?;
    let file: DoorFile = serde_json::from_str(&contents)?;
    info!(count = file.doors.len(), "loaded auto-detected doors");
    Ok(file.doors)
}
