use crate::error::NoteCreationError;
use crate::model::{Created, NoteHandle, NoteKey, NoteType, PeriodAnchor};
use crate::period::quarter_of;
use crate::settings::{Settings, SettingsStore, YamlSettingsStore, QUARTER_TOKEN};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".dustcal";
const NOTE_EXTENSION: &str = "md";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultScope {
    Project,
    Global,
}

#[derive(Debug, Clone)]
pub struct VaultLocation {
    pub root: PathBuf,
    pub scope: VaultScope,
}

impl VaultLocation {
    pub fn settings_path(&self) -> PathBuf {
        self.root.join(CONFIG_DIR).join("settings.yml")
    }

    pub fn workspace_path(&self) -> PathBuf {
        self.root.join(CONFIG_DIR).join("workspace.yml")
    }
}

pub fn init_vault(dir: &Path) -> Result<VaultLocation> {
    let config_dir = dir.join(CONFIG_DIR);
    fs::create_dir_all(&config_dir).context("failed to create .dustcal directory")?;
    let location = VaultLocation {
        root: dir.to_path_buf(),
        scope: VaultScope::Project,
    };
    let store = YamlSettingsStore::new(location.settings_path());
    if !store.path().exists() {
        store
            .save(&Settings::default())
            .context("writing default settings")?;
    }
    Ok(location)
}

/// Picks the vault for this invocation: an explicit directory, else the
/// nearest ancestor of `start` holding `.dustcal`, else the per-user vault.
pub fn locate_vault(explicit: Option<&Path>, start: &Path) -> Result<VaultLocation> {
    if let Some(root) = explicit {
        return Ok(VaultLocation {
            root: root.to_path_buf(),
            scope: VaultScope::Project,
        });
    }
    if let Some(root) = find_project_vault(start) {
        return Ok(VaultLocation {
            root,
            scope: VaultScope::Project,
        });
    }
    Ok(VaultLocation {
        root: global_vault_dir()?,
        scope: VaultScope::Global,
    })
}

fn find_project_vault(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        if current.join(CONFIG_DIR).is_dir() {
            return Some(current.to_path_buf());
        }
        dir = current.parent();
    }
    None
}

fn global_vault_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "dustcal").context("locating data directory")?;
    Ok(dirs.data_dir().join("vault"))
}

/// Maps a period to its vault-relative note path under the current settings.
pub fn note_key(
    settings: &Settings,
    note_type: NoteType,
    anchor: PeriodAnchor,
) -> Result<NoteKey, NoteCreationError> {
    let note = settings.note(note_type);
    let format = note
        .format
        .replace(QUARTER_TOKEN, &quarter_of(anchor.date()).to_string());
    let mut name = String::new();
    write!(name, "{}", anchor.date().format(&format)).map_err(|_| {
        NoteCreationError::InvalidFormat {
            note_type: note_type.to_string(),
            format: note.format.clone(),
        }
    })?;
    Ok(NoteKey {
        note_type,
        anchor,
        path: Path::new(&note.folder).join(format!("{name}.{NOTE_EXTENSION}")),
    })
}

/// Host note storage. `create` never overwrites: when the note already exists
/// it reports the existing one instead.
pub trait NoteStore {
    fn find(&self, key: &NoteKey) -> Option<NoteHandle>;
    fn create(&self, key: &NoteKey, content: &str) -> Result<Created, NoteCreationError>;
}

#[derive(Debug, Clone)]
pub struct VaultNoteStore {
    root: PathBuf,
}

impl VaultNoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        VaultNoteStore { root: root.into() }
    }
}

impl NoteStore for VaultNoteStore {
    fn find(&self, key: &NoteKey) -> Option<NoteHandle> {
        let handle = NoteHandle::from_key(key, &self.root);
        handle.path.is_file().then_some(handle)
    }

    fn create(&self, key: &NoteKey, content: &str) -> Result<Created, NoteCreationError> {
        let handle = NoteHandle::from_key(key, &self.root);
        let path = handle.path.clone();
        let io_err = |source: io::Error| NoteCreationError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = handle.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&handle.path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                log::info!("{:?} appeared before create, reusing it", handle.path);
                return Ok(Created::AlreadyExisted(handle));
            }
            Err(source) => return Err(io_err(source)),
        };
        if let Err(source) = file
            .write_all(content.as_bytes())
            .and_then(|_| file.sync_all())
        {
            drop(file);
            if let Err(err) = fs::remove_file(&handle.path) {
                log::error!("failed to remove partial note {:?}: {}", handle.path, err);
            }
            return Err(io_err(source));
        }
        Ok(Created::New(handle))
    }
}
