//! Periodic notes over a plain-file vault.
//!
//! A request for the daily, weekly, monthly, quarterly or yearly note is
//! resolved to the period's anchor date, the note for that anchor is opened
//! or created from a template, and a single calendar panel is kept alive in
//! the host workspace. Host facilities sit behind the traits in [`settings`],
//! [`storage`], [`template`] and [`workspace`]; each module also ships the
//! file-backed implementation used by the `dustcal` binary.

pub mod controller;
pub mod error;
pub mod model;
pub mod period;
pub mod plugin;
pub mod settings;
pub mod storage;
pub mod template;
pub mod view;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use controller::{NoteController, OpenedNote};
pub use error::{
    CommandError, HostCapabilityError, LifecycleError, NoteCreationError, SettingsError,
    TemplateRenderError,
};
pub use model::{Created, NoteHandle, NoteKey, NoteType, PeriodAnchor};
pub use period::{period_bounds, quarter_of, resolve_anchor, PeriodResolver, QuarterNameMode};
pub use plugin::{CommandId, CommandOutcome, Host, LifecycleState, Plugin};
pub use settings::{Settings, SettingsStore, YamlSettingsStore};
pub use storage::{NoteStore, VaultNoteStore};
pub use template::{TemplateEngine, TemplatePlugin, VaultTemplates};
pub use view::{ViewActivationPolicy, CALENDAR_VIEW};
pub use workspace::{FileWorkspace, Workspace};
