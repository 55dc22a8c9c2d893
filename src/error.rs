use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum TemplateRenderError {
    #[error("template not found: {0:?}")]
    Missing(PathBuf),
    #[error("reading template {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid date format in template placeholder: {0}")]
    InvalidFormat(String),
}

#[derive(thiserror::Error, Debug)]
pub enum NoteCreationError {
    #[error("creating {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid file name format for {note_type} notes: {format}")]
    InvalidFormat { note_type: String, format: String },
}

#[derive(thiserror::Error, Debug)]
pub enum HostCapabilityError {
    #[error("workspace has no pane available for a new panel")]
    NoPanelAvailable,
    #[error("panel not found: {0}")]
    UnknownPanel(String),
    #[error("persisting workspace {path:?}")]
    Persist {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("reading settings {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing settings {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid {note_type} settings: {reason}")]
    Invalid { note_type: String, reason: String },
}

#[derive(thiserror::Error, Debug)]
pub enum LifecycleError {
    #[error("plugin is {0}, expected {1}")]
    WrongState(&'static str, &'static str),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Failure of one command invocation, reported to the user as-is.
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Template(#[from] TemplateRenderError),
    #[error(transparent)]
    NoteCreation(#[from] NoteCreationError),
    #[error(transparent)]
    Host(#[from] HostCapabilityError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}
