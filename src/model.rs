use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl NoteType {
    pub const ALL: [NoteType; 5] = [
        NoteType::Daily,
        NoteType::Weekly,
        NoteType::Monthly,
        NoteType::Quarterly,
        NoteType::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NoteType::Daily => "daily",
            NoteType::Weekly => "weekly",
            NoteType::Monthly => "monthly",
            NoteType::Quarterly => "quarterly",
            NoteType::Yearly => "yearly",
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Canonical start date identifying the note of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodAnchor(NaiveDate);

impl PeriodAnchor {
    pub(crate) fn new(date: NaiveDate) -> Self {
        PeriodAnchor(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl fmt::Display for PeriodAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Storage key of a periodic note: the period identity plus the vault-relative
/// path the current settings map it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteKey {
    pub note_type: NoteType,
    pub anchor: PeriodAnchor,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHandle {
    pub note_type: NoteType,
    pub anchor: PeriodAnchor,
    pub path: PathBuf,
}

impl NoteHandle {
    pub fn from_key(key: &NoteKey, root: &Path) -> Self {
        NoteHandle {
            note_type: key.note_type,
            anchor: key.anchor,
            path: root.join(&key.path),
        }
    }
}

/// Result of a create request against a note store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    New(NoteHandle),
    /// Another invocation created the note between lookup and create.
    AlreadyExisted(NoteHandle),
}

impl Created {
    pub fn handle(&self) -> &NoteHandle {
        match self {
            Created::New(handle) | Created::AlreadyExisted(handle) => handle,
        }
    }

    pub fn into_handle(self) -> NoteHandle {
        match self {
            Created::New(handle) | Created::AlreadyExisted(handle) => handle,
        }
    }
}
