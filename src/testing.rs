//! In-memory collaborators for unit tests.

use crate::error::{HostCapabilityError, NoteCreationError, SettingsError, TemplateRenderError};
use crate::model::{Created, NoteHandle, NoteKey};
use crate::settings::{Settings, SettingsStore};
use crate::template::{RenderRequest, TemplateEngine, TemplatePlugin};
use crate::view::CALENDAR_VIEW;
use crate::workspace::{Panel, PanelId, ViewState, Workspace};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug)]
pub struct MemoryWorkspace {
    pub panels: Vec<Panel>,
    pub focus_events: Vec<PanelId>,
    pub opened: Vec<PathBuf>,
    pub allocatable: bool,
    pub layout_ready: bool,
    pub view_state_fails: bool,
    next_id: usize,
}

impl Default for MemoryWorkspace {
    fn default() -> Self {
        MemoryWorkspace {
            panels: Vec::new(),
            focus_events: Vec::new(),
            opened: Vec::new(),
            allocatable: true,
            layout_ready: true,
            view_state_fails: false,
            next_id: 0,
        }
    }
}

impl MemoryWorkspace {
    pub fn add_calendar_panel(&mut self) -> PanelId {
        let id = self.next_panel_id();
        self.panels.push(Panel {
            id: id.clone(),
            view: Some(ViewState {
                view_type: CALENDAR_VIEW.into(),
                active: false,
            }),
        });
        id
    }

    fn next_panel_id(&mut self) -> PanelId {
        self.next_id += 1;
        format!("panel-{}", self.next_id)
    }

    fn panel_mut(&mut self, id: &str) -> Result<&mut Panel, HostCapabilityError> {
        self.panels
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| HostCapabilityError::UnknownPanel(id.to_string()))
    }
}

impl Workspace for MemoryWorkspace {
    fn find_panels(&self, view_type: &str) -> Vec<Panel> {
        self.panels
            .iter()
            .filter(|p| p.shows(view_type))
            .cloned()
            .collect()
    }

    fn allocate_panel(&mut self) -> Result<Option<Panel>, HostCapabilityError> {
        if !self.allocatable {
            return Ok(None);
        }
        let panel = Panel {
            id: self.next_panel_id(),
            view: None,
        };
        self.panels.push(panel.clone());
        Ok(Some(panel))
    }

    fn set_view_state(&mut self, id: &str, state: ViewState) -> Result<(), HostCapabilityError> {
        if self.view_state_fails {
            return Err(HostCapabilityError::UnknownPanel(id.to_string()));
        }
        self.panel_mut(id)?.view = Some(state);
        Ok(())
    }

    fn focus(&mut self, id: &str) -> Result<(), HostCapabilityError> {
        self.panel_mut(id)?;
        self.focus_events.push(id.to_string());
        Ok(())
    }

    fn detach(&mut self, id: &str) -> Result<(), HostCapabilityError> {
        self.panel_mut(id)?;
        self.panels.retain(|p| p.id != id);
        Ok(())
    }

    fn is_layout_ready(&self) -> bool {
        self.layout_ready
    }

    fn open_note(&mut self, note: &NoteHandle) -> Result<(), HostCapabilityError> {
        self.opened.push(note.path.clone());
        Ok(())
    }
}

/// Lets a test keep inspecting a workspace after handing it to a plugin.
impl Workspace for Rc<RefCell<MemoryWorkspace>> {
    fn find_panels(&self, view_type: &str) -> Vec<Panel> {
        self.borrow().find_panels(view_type)
    }

    fn allocate_panel(&mut self) -> Result<Option<Panel>, HostCapabilityError> {
        self.borrow_mut().allocate_panel()
    }

    fn set_view_state(&mut self, id: &str, state: ViewState) -> Result<(), HostCapabilityError> {
        self.borrow_mut().set_view_state(id, state)
    }

    fn focus(&mut self, id: &str) -> Result<(), HostCapabilityError> {
        self.borrow_mut().focus(id)
    }

    fn detach(&mut self, id: &str) -> Result<(), HostCapabilityError> {
        self.borrow_mut().detach(id)
    }

    fn is_layout_ready(&self) -> bool {
        self.borrow().is_layout_ready()
    }

    fn open_note(&mut self, note: &NoteHandle) -> Result<(), HostCapabilityError> {
        self.borrow_mut().open_note(note)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreMode {
    Normal,
    /// Every create finds the note already written by someone else.
    Racing,
    ReadOnly,
}

#[derive(Debug, Clone)]
pub struct MemoryNoteStore {
    notes: Rc<RefCell<BTreeMap<PathBuf, String>>>,
    mode: StoreMode,
}

impl Default for MemoryNoteStore {
    fn default() -> Self {
        MemoryNoteStore {
            notes: Rc::default(),
            mode: StoreMode::Normal,
        }
    }
}

impl MemoryNoteStore {
    pub fn racing() -> Self {
        MemoryNoteStore {
            mode: StoreMode::Racing,
            ..Self::default()
        }
    }

    pub fn read_only() -> Self {
        MemoryNoteStore {
            mode: StoreMode::ReadOnly,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.notes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.borrow().is_empty()
    }

    pub fn content(&self, path: &Path) -> Option<String> {
        self.notes.borrow().get(path).cloned()
    }
}

impl crate::storage::NoteStore for MemoryNoteStore {
    fn find(&self, key: &NoteKey) -> Option<NoteHandle> {
        if self.mode == StoreMode::Racing {
            return None;
        }
        self.notes
            .borrow()
            .contains_key(&key.path)
            .then(|| NoteHandle::from_key(key, Path::new("")))
    }

    fn create(&self, key: &NoteKey, content: &str) -> Result<Created, NoteCreationError> {
        let handle = NoteHandle::from_key(key, Path::new(""));
        let mut notes = self.notes.borrow_mut();
        match self.mode {
            StoreMode::ReadOnly => Err(NoteCreationError::Io {
                path: handle.path,
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only vault"),
            }),
            StoreMode::Racing => {
                notes.entry(key.path.clone()).or_default();
                Ok(Created::AlreadyExisted(handle))
            }
            StoreMode::Normal if notes.contains_key(&key.path) => {
                Ok(Created::AlreadyExisted(handle))
            }
            StoreMode::Normal => {
                notes.insert(key.path.clone(), content.to_string());
                Ok(Created::New(handle))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaticTemplates {
    content: Option<String>,
    renders: Rc<Cell<usize>>,
    plugin: Rc<Cell<TemplatePlugin>>,
}

impl StaticTemplates {
    pub fn content(content: &str) -> Self {
        StaticTemplates {
            content: Some(content.to_string()),
            renders: Rc::default(),
            plugin: Rc::default(),
        }
    }

    /// Renders fail as if the configured template were missing.
    pub fn failing() -> Self {
        StaticTemplates {
            content: None,
            renders: Rc::default(),
            plugin: Rc::default(),
        }
    }

    pub fn renders(&self) -> usize {
        self.renders.get()
    }

    pub fn plugin(&self) -> TemplatePlugin {
        self.plugin.get()
    }
}

impl TemplateEngine for StaticTemplates {
    fn use_plugin(&mut self, plugin: TemplatePlugin) {
        self.plugin.set(plugin);
    }

    fn render(&self, _request: &RenderRequest<'_>) -> Result<String, TemplateRenderError> {
        self.renders.set(self.renders.get() + 1);
        self.content
            .clone()
            .ok_or_else(|| TemplateRenderError::Missing(PathBuf::from("missing.md")))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    pub stored: Rc<RefCell<Option<Settings>>>,
    pub saves: Rc<Cell<usize>>,
    pub fail_load: bool,
    pub fail_save: bool,
}

impl MemorySettingsStore {
    pub fn with(settings: Settings) -> Self {
        MemorySettingsStore {
            stored: Rc::new(RefCell::new(Some(settings))),
            ..Self::default()
        }
    }
}

fn unavailable() -> SettingsError {
    SettingsError::Io {
        path: PathBuf::from("settings.yml"),
        source: io::Error::new(io::ErrorKind::Other, "storage unavailable"),
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        if self.fail_load {
            return Err(unavailable());
        }
        Ok(self.stored.borrow().clone().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        self.saves.set(self.saves.get() + 1);
        if self.fail_save {
            return Err(unavailable());
        }
        *self.stored.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}
