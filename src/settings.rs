use crate::error::SettingsError;
use crate::model::NoteType;
use crate::period::QuarterNameMode;
use crate::template::TemplatePlugin;
use chrono::format::StrftimeItems;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Placeholder substituted with the quarter number before a file name format
/// is handed to chrono.
pub const QUARTER_TOKEN: &str = "{quarter}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SettingsFile")]
pub struct Settings {
    pub template_plugin: TemplatePlugin,
    pub quarter_name_mode: QuarterNameMode,
    pub daily: NoteTypeSettings,
    pub weekly: NoteTypeSettings,
    pub monthly: NoteTypeSettings,
    pub quarterly: NoteTypeSettings,
    pub yearly: NoteTypeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteTypeSettings {
    /// Vault-relative folder holding notes of this type.
    pub folder: String,
    /// chrono strftime format of the file name, without extension.
    pub format: String,
    /// Vault-relative template path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// On-disk shape of the settings file. Anything left out falls back to the
/// default of its own note type.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    template_plugin: Option<TemplatePlugin>,
    quarter_name_mode: Option<QuarterNameMode>,
    daily: NoteTypeFile,
    weekly: NoteTypeFile,
    monthly: NoteTypeFile,
    quarterly: NoteTypeFile,
    yearly: NoteTypeFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NoteTypeFile {
    folder: Option<String>,
    format: Option<String>,
    template: Option<String>,
}

impl NoteTypeFile {
    fn apply(self, note: &mut NoteTypeSettings) {
        if let Some(folder) = self.folder {
            note.folder = folder;
        }
        if let Some(format) = self.format {
            note.format = format;
        }
        if self.template.is_some() {
            note.template = self.template;
        }
    }
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        let mut settings = Settings::default();
        if let Some(plugin) = file.template_plugin {
            settings.template_plugin = plugin;
        }
        if let Some(mode) = file.quarter_name_mode {
            settings.quarter_name_mode = mode;
        }
        file.daily.apply(&mut settings.daily);
        file.weekly.apply(&mut settings.weekly);
        file.monthly.apply(&mut settings.monthly);
        file.quarterly.apply(&mut settings.quarterly);
        file.yearly.apply(&mut settings.yearly);
        settings
    }
}

impl NoteTypeSettings {
    fn new(folder: &str, format: &str) -> Self {
        NoteTypeSettings {
            folder: folder.into(),
            format: format.into(),
            template: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            template_plugin: TemplatePlugin::default(),
            quarter_name_mode: QuarterNameMode::default(),
            daily: NoteTypeSettings::new("Daily", "%Y-%m-%d"),
            weekly: NoteTypeSettings::new("Weekly", "%G-W%V"),
            monthly: NoteTypeSettings::new("Monthly", "%Y-%m"),
            quarterly: NoteTypeSettings::new("Quarterly", "%Y-Q{quarter}"),
            yearly: NoteTypeSettings::new("Yearly", "%Y"),
        }
    }
}

impl Settings {
    pub fn note(&self, note_type: NoteType) -> &NoteTypeSettings {
        match note_type {
            NoteType::Daily => &self.daily,
            NoteType::Weekly => &self.weekly,
            NoteType::Monthly => &self.monthly,
            NoteType::Quarterly => &self.quarterly,
            NoteType::Yearly => &self.yearly,
        }
    }

    pub fn note_mut(&mut self, note_type: NoteType) -> &mut NoteTypeSettings {
        match note_type {
            NoteType::Daily => &mut self.daily,
            NoteType::Weekly => &mut self.weekly,
            NoteType::Monthly => &mut self.monthly,
            NoteType::Quarterly => &mut self.quarterly,
            NoteType::Yearly => &mut self.yearly,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for note_type in NoteType::ALL {
            let note = self.note(note_type);
            let invalid = |reason: String| SettingsError::Invalid {
                note_type: note_type.to_string(),
                reason,
            };
            if note.format.trim().is_empty() {
                return Err(invalid("file name format is empty".into()));
            }
            if !formats_dates(&note.format) {
                return Err(invalid(format!("invalid file name format {:?}", note.format)));
            }
            if !is_vault_relative(Path::new(&note.folder)) {
                return Err(invalid(format!("folder {:?} leaves the vault", note.folder)));
            }
            if !is_vault_relative(Path::new(&note.format)) {
                return Err(invalid(format!("format {:?} leaves the vault", note.format)));
            }
            if let Some(template) = &note.template {
                if !is_vault_relative(Path::new(template)) {
                    return Err(invalid(format!("template {:?} leaves the vault", template)));
                }
            }
        }
        Ok(())
    }
}

/// Whether `format` renders a plain date. Time fields count as errors since
/// note names are derived from dates alone.
fn formats_dates(format: &str) -> bool {
    let format = format.replace(QUARTER_TOKEN, "1");
    let sample = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or(NaiveDate::MIN);
    let mut rendered = String::new();
    write!(
        rendered,
        "{}",
        sample.format_with_items(StrftimeItems::new(&format))
    )
    .is_ok()
}

fn is_vault_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

pub trait SettingsStore {
    fn load(&self) -> Result<Settings, SettingsError>;
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Settings persisted as YAML inside the vault's `.dustcal` directory.
#[derive(Debug, Clone)]
pub struct YamlSettingsStore {
    path: PathBuf,
}

impl YamlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        YamlSettingsStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for YamlSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no settings at {:?}, using defaults", self.path);
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_yaml::from_str(&data).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let io_err = |source: io::Error| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let serialized = serde_yaml::to_string(settings).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, serialized).map_err(io_err)
    }
}
