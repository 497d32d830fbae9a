use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ids::CourseName;

//
// ─── INTENT ────────────────────────────────────────────────────────────────────
//

/// What the user asked for when toggling a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveIntent {
    Save,
    Unsave,
}

impl SaveIntent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SaveIntent::Save => "save",
            SaveIntent::Unsave => "unsave",
        }
    }
}

impl fmt::Display for SaveIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── SAVED SET ─────────────────────────────────────────────────────────────────
//

/// Course names a user has bookmarked.
///
/// Unique by construction; iteration is alphabetical so listings stay stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedCourseSet {
    names: BTreeSet<CourseName>,
}

impl SavedCourseSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &CourseName) -> bool {
        self.names.contains(name)
    }

    /// The intent that flips the current membership of `name`.
    #[must_use]
    pub fn toggle_intent(&self, name: &CourseName) -> SaveIntent {
        if self.contains(name) {
            SaveIntent::Unsave
        } else {
            SaveIntent::Save
        }
    }

    /// Applies an intent. Returns `true` if membership changed.
    pub fn apply(&mut self, name: CourseName, intent: SaveIntent) -> bool {
        match intent {
            SaveIntent::Save => self.names.insert(name),
            SaveIntent::Unsave => self.names.remove(&name),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CourseName> {
        self.names.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<CourseName> for SavedCourseSet {
    fn from_iter<T: IntoIterator<Item = CourseName>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SavedCourseSet {
    type Item = CourseName;
    type IntoIter = std::collections::btree_set::IntoIter<CourseName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}
