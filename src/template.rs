//! Template rendering for newly created notes.
//!
//! Supported placeholders: `{{title}}`, `{{date}}`, `{{time}}` and the
//! formatted forms `{{date:FMT}}` / `{{time:FMT}}` taking chrono strftime
//! strings. Anything else between braces is copied through untouched.

use crate::error::TemplateRenderError;
use crate::model::{NoteType, PeriodAnchor};
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Write as _};
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TemplatePlugin {
    /// New notes start empty.
    #[default]
    None,
    /// Placeholder substitution over a template file in the vault.
    CoreTemplates,
}

#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub note_type: NoteType,
    pub anchor: PeriodAnchor,
    pub title: &'a str,
    /// Vault-relative template path configured for the note type.
    pub template: Option<&'a str>,
    pub now: NaiveDateTime,
}

pub trait TemplateEngine {
    fn use_plugin(&mut self, plugin: TemplatePlugin);
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, TemplateRenderError>;
}

#[derive(Debug, Clone)]
pub struct VaultTemplates {
    root: PathBuf,
    plugin: TemplatePlugin,
}

impl VaultTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        VaultTemplates {
            root: root.into(),
            plugin: TemplatePlugin::None,
        }
    }
}

impl TemplateEngine for VaultTemplates {
    fn use_plugin(&mut self, plugin: TemplatePlugin) {
        if self.plugin != plugin {
            log::info!("template plugin switched to {:?}", plugin);
        }
        self.plugin = plugin;
    }

    fn render(&self, request: &RenderRequest<'_>) -> Result<String, TemplateRenderError> {
        let template = match (self.plugin, request.template) {
            (TemplatePlugin::CoreTemplates, Some(template)) => template,
            _ => return Ok(String::new()),
        };
        let path = self.root.join(template);
        let text = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                TemplateRenderError::Missing(path.clone())
            } else {
                TemplateRenderError::Read {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        log::debug!("rendering {} note from {:?}", request.note_type, path);
        expand(&text, request)
    }
}

pub fn expand(text: &str, request: &RenderRequest<'_>) -> Result<String, TemplateRenderError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let inner = &rest[start + 2..];
        let Some(end) = inner.find("}}") else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        match substitute(inner[..end].trim(), request)? {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &inner[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

fn substitute(
    token: &str,
    request: &RenderRequest<'_>,
) -> Result<Option<String>, TemplateRenderError> {
    let (name, format) = match token.split_once(':') {
        Some((name, format)) => (name.trim(), Some(format.trim())),
        None => (token, None),
    };
    let date: NaiveDate = request.anchor.date();
    let value = match (name, format) {
        ("title", None) => request.title.to_string(),
        ("date", None) => date.format("%Y-%m-%d").to_string(),
        ("time", None) => request.now.format("%H:%M").to_string(),
        ("date", Some(format)) => render_checked(format, |items| date.format_with_items(items))?,
        ("time", Some(format)) => {
            render_checked(format, |items| request.now.format_with_items(items))?
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn render_checked<'a, D, F>(format: &'a str, render: F) -> Result<String, TemplateRenderError>
where
    D: Display,
    F: FnOnce(StrftimeItems<'a>) -> D,
{
    let invalid = || TemplateRenderError::InvalidFormat(format.to_string());
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }
    let mut out = String::new();
    // A date has no time fields; chrono reports that as a formatting error.
    write!(out, "{}", render(StrftimeItems::new(format))).map_err(|_| invalid())?;
    Ok(out)
}
