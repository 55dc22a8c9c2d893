//! Plugin lifecycle and command dispatch.
//!
//! The plugin is driven through `load`, any number of `execute` calls and
//! `unload`, strictly one at a time. Components are built during `load` from
//! the settings snapshot and dropped again by `unload`, so a plugin can be
//! loaded again afterwards.

use crate::controller::{NoteController, OpenedNote};
use crate::error::{CommandError, LifecycleError};
use crate::model::NoteType;
use crate::settings::{Settings, SettingsStore};
use crate::storage::NoteStore;
use crate::template::TemplateEngine;
use crate::view::ViewActivationPolicy;
use crate::workspace::{PanelId, Workspace};
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unloaded,
    Loading,
    Active,
    Unloading,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Unloaded => "unloaded",
            LifecycleState::Loading => "loading",
            LifecycleState::Active => "active",
            LifecycleState::Unloading => "unloading",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    ActiveCalendarView,
    OpenNote(NoteType),
}

impl CommandId {
    pub const ALL: [CommandId; 6] = [
        CommandId::ActiveCalendarView,
        CommandId::OpenNote(NoteType::Daily),
        CommandId::OpenNote(NoteType::Weekly),
        CommandId::OpenNote(NoteType::Monthly),
        CommandId::OpenNote(NoteType::Quarterly),
        CommandId::OpenNote(NoteType::Yearly),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandId::ActiveCalendarView => "active-calendar-view",
            CommandId::OpenNote(NoteType::Daily) => "open-daily-note",
            CommandId::OpenNote(NoteType::Weekly) => "open-weekly-note",
            CommandId::OpenNote(NoteType::Monthly) => "open-monthly-note",
            CommandId::OpenNote(NoteType::Quarterly) => "open-quarterly-note",
            CommandId::OpenNote(NoteType::Yearly) => "open-yearly-note",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandId::ActiveCalendarView => "Open calendar view",
            CommandId::OpenNote(NoteType::Daily) => "Open/create daily note",
            CommandId::OpenNote(NoteType::Weekly) => "Open/create weekly note",
            CommandId::OpenNote(NoteType::Monthly) => "Open/create monthly note",
            CommandId::OpenNote(NoteType::Quarterly) => "Open/create quarterly note",
            CommandId::OpenNote(NoteType::Yearly) => "Open/create yearly note",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandId {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| LifecycleError::UnknownCommand(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    CalendarFocused(PanelId),
    NoteOpened(OpenedNote),
}

/// Capabilities the plugin borrows from its host application.
pub struct Host {
    pub settings: Box<dyn SettingsStore>,
    pub notes: Box<dyn NoteStore>,
    pub templates: Box<dyn TemplateEngine>,
    pub workspace: Box<dyn Workspace>,
}

struct Components {
    settings: Settings,
    notes: NoteController,
    view: ViewActivationPolicy,
    commands: Vec<CommandId>,
}

pub struct Plugin {
    host: Host,
    state: LifecycleState,
    components: Option<Components>,
}

impl Plugin {
    pub fn new(host: Host) -> Self {
        Plugin {
            host,
            state: LifecycleState::Unloaded,
            components: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.components.as_ref().map(|c| &c.settings)
    }

    /// Commands registered by the last `load`; empty while unloaded.
    pub fn commands(&self) -> &[CommandId] {
        self.components
            .as_ref()
            .map(|c| c.commands.as_slice())
            .unwrap_or(&[])
    }

    pub fn load(&mut self) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::Unloaded {
            return Err(LifecycleError::WrongState(self.state.as_str(), "unloaded"));
        }
        self.state = LifecycleState::Loading;
        log::info!("loading plugin");

        let settings = match self.host.settings.load().and_then(|settings| {
            settings.validate()?;
            Ok(settings)
        }) {
            Ok(settings) => settings,
            Err(err) => {
                self.state = LifecycleState::Unloaded;
                return Err(err.into());
            }
        };

        let notes = NoteController::new(&settings);
        self.host.templates.use_plugin(settings.template_plugin);
        let view = ViewActivationPolicy::default();
        let commands = CommandId::ALL.to_vec();
        for command in &commands {
            log::debug!("registered command {} ({})", command, command.name());
        }
        self.components = Some(Components {
            settings,
            notes,
            view,
            commands,
        });

        if self.host.workspace.is_layout_ready() {
            if let Err(err) = view.activate_calendar_view(self.host.workspace.as_mut()) {
                log::error!("failed to open calendar view on load: {}", err);
            }
        }

        self.state = LifecycleState::Active;
        log::info!("plugin active");
        Ok(())
    }

    /// Runs one registered command. `now` stands in for the current moment.
    pub fn execute(
        &mut self,
        id: CommandId,
        now: NaiveDateTime,
    ) -> Result<CommandOutcome, CommandError> {
        let components = match (&self.components, self.state) {
            (Some(components), LifecycleState::Active) => components,
            _ => {
                return Err(LifecycleError::WrongState(self.state.as_str(), "active").into());
            }
        };
        if !components.commands.contains(&id) {
            return Err(LifecycleError::UnknownCommand(id.to_string()).into());
        }
        log::debug!("executing {}", id);
        match id {
            CommandId::ActiveCalendarView => {
                let panel = components
                    .view
                    .activate_calendar_view(self.host.workspace.as_mut())?;
                Ok(CommandOutcome::CalendarFocused(panel))
            }
            CommandId::OpenNote(note_type) => {
                let anchor = components
                    .notes
                    .resolver()
                    .resolve_anchor(now.date(), note_type);
                let opened = components.notes.open_note_by_note_type(
                    anchor,
                    note_type,
                    now,
                    self.host.notes.as_ref(),
                    self.host.templates.as_ref(),
                    self.host.workspace.as_mut(),
                )?;
                Ok(CommandOutcome::NoteOpened(opened))
            }
        }
    }

    /// Applies a settings change the way the settings tab would: the snapshot
    /// is replaced only when the edited settings validate.
    pub fn update_settings<F>(&mut self, edit: F) -> Result<(), LifecycleError>
    where
        F: FnOnce(&mut Settings),
    {
        let components = match (&mut self.components, self.state) {
            (Some(components), LifecycleState::Active) => components,
            _ => return Err(LifecycleError::WrongState(self.state.as_str(), "active")),
        };
        let mut settings = components.settings.clone();
        edit(&mut settings);
        settings.validate()?;
        self.host.templates.use_plugin(settings.template_plugin);
        components.notes.configure(&settings);
        components.settings = settings;
        log::info!("settings updated");
        Ok(())
    }

    /// Tears the plugin down. Never fails: persistence and detach problems
    /// are logged.
    pub fn unload(&mut self) {
        if self.state == LifecycleState::Unloaded {
            log::debug!("unload requested while already unloaded");
            return;
        }
        self.state = LifecycleState::Unloading;
        log::info!("unloading plugin");
        if let Some(components) = self.components.take() {
            if let Err(err) = self.host.settings.save(&components.settings) {
                log::error!("failed to persist settings: {}", err);
            }
            let detached = components
                .view
                .detach_calendar_views(self.host.workspace.as_mut());
            log::debug!("detached {} calendar panel(s)", detached);
        }
        self.state = LifecycleState::Unloaded;
        log::info!("plugin unloaded");
    }
}
