//! Workspace and panel host.
//!
//! `FileWorkspace` keeps the panel layout in `.dustcal/workspace.yml` so that
//! separate invocations see the same panels. Panels keep registration order;
//! "first" always means the earliest registered survivor.

use crate::error::HostCapabilityError;
use crate::model::NoteHandle;
use anyhow::Context;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub type PanelId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub view_type: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub id: PanelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewState>,
}

impl Panel {
    pub fn shows(&self, view_type: &str) -> bool {
        self.view.as_ref().is_some_and(|v| v.view_type == view_type)
    }
}

pub trait Workspace {
    /// Panels currently showing `view_type`, in registration order.
    fn find_panels(&self, view_type: &str) -> Vec<Panel>;
    /// A fresh panel in the right split, or `None` when that split is unavailable.
    fn allocate_panel(&mut self) -> Result<Option<Panel>, HostCapabilityError>;
    fn set_view_state(&mut self, id: &str, state: ViewState) -> Result<(), HostCapabilityError>;
    fn focus(&mut self, id: &str) -> Result<(), HostCapabilityError>;
    fn detach(&mut self, id: &str) -> Result<(), HostCapabilityError>;
    fn is_layout_ready(&self) -> bool;
    fn open_note(&mut self, note: &NoteHandle) -> Result<(), HostCapabilityError>;
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default = "default_true")]
    pub right_split: bool,
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused: Option<PanelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_note: Option<PathBuf>,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            right_split: true,
            panels: Vec::new(),
            focused: None,
            open_note: None,
        }
    }
}

#[derive(Debug)]
pub struct FileWorkspace {
    path: PathBuf,
    layout: Layout,
}

impl FileWorkspace {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let layout = if path.exists() {
            let data =
                fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
            serde_yaml::from_str(&data).context("parsing workspace file")?
        } else {
            Layout::default()
        };
        Ok(FileWorkspace { path, layout })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), HostCapabilityError> {
        let write = || -> anyhow::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
            }
            let serialized = serde_yaml::to_string(&self.layout).context("serializing layout")?;
            fs::write(&self.path, serialized)
                .with_context(|| format!("writing {:?}", self.path))?;
            Ok(())
        };
        write().map_err(|source| HostCapabilityError::Persist {
            path: self.path.clone(),
            source,
        })
    }

    fn panel_mut(&mut self, id: &str) -> Result<&mut Panel, HostCapabilityError> {
        self.layout
            .panels
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| HostCapabilityError::UnknownPanel(id.to_string()))
    }
}

impl Workspace for FileWorkspace {
    fn find_panels(&self, view_type: &str) -> Vec<Panel> {
        self.layout
            .panels
            .iter()
            .filter(|p| p.shows(view_type))
            .cloned()
            .collect()
    }

    fn allocate_panel(&mut self) -> Result<Option<Panel>, HostCapabilityError> {
        if !self.layout.right_split {
            return Ok(None);
        }
        let panel = Panel {
            id: generate_id(),
            view: None,
        };
        self.layout.panels.push(panel.clone());
        self.persist()?;
        Ok(Some(panel))
    }

    fn set_view_state(&mut self, id: &str, state: ViewState) -> Result<(), HostCapabilityError> {
        self.panel_mut(id)?.view = Some(state);
        self.persist()
    }

    fn focus(&mut self, id: &str) -> Result<(), HostCapabilityError> {
        self.panel_mut(id)?;
        self.layout.focused = Some(id.to_string());
        self.persist()
    }

    fn detach(&mut self, id: &str) -> Result<(), HostCapabilityError> {
        let before = self.layout.panels.len();
        self.layout.panels.retain(|p| p.id != id);
        if self.layout.panels.len() == before {
            return Err(HostCapabilityError::UnknownPanel(id.to_string()));
        }
        if self.layout.focused.as_deref() == Some(id) {
            self.layout.focused = None;
        }
        self.persist()
    }

    fn is_layout_ready(&self) -> bool {
        true
    }

    fn open_note(&mut self, note: &NoteHandle) -> Result<(), HostCapabilityError> {
        self.layout.open_note = Some(note.path.clone());
        self.persist()
    }
}

fn generate_id() -> PanelId {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}
