use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use dustcal::storage::{init_vault, locate_vault, note_key, VaultLocation, VaultScope};
use dustcal::{
    period_bounds, CommandId, CommandOutcome, FileWorkspace, Host, NoteType, PeriodResolver,
    Plugin, QuarterNameMode, SettingsStore, TemplatePlugin, VaultNoteStore, VaultTemplates,
    YamlSettingsStore,
};
use std::env;
use std::io::{self, BufRead};
use std::path::Path;

pub fn init(vault: Option<&Path>) -> Result<()> {
    let dir = match vault {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir()?,
    };
    let location = init_vault(&dir)?;
    println!("Initialized vault at {}", location.root.display());
    Ok(())
}

pub fn run(vault: Option<&Path>, id: CommandId, date: Option<String>) -> Result<()> {
    let now = parse_now(date.as_deref())?;
    with_plugin(vault, |plugin| {
        let outcome = plugin
            .execute(id, now)
            .with_context(|| format!("running {}", id))?;
        print_outcome(&outcome);
        Ok(())
    })
}

pub fn resolve(vault: Option<&Path>, date: Option<String>) -> Result<()> {
    let now = parse_now(date.as_deref())?;
    let location = current_vault(vault)?;
    let settings = YamlSettingsStore::new(location.settings_path()).load()?;
    settings.validate()?;
    let resolver = PeriodResolver::new(settings.quarter_name_mode);
    for note_type in NoteType::ALL {
        let anchor = resolver.resolve_anchor(now.date(), note_type);
        let (start, end) = period_bounds(anchor, note_type);
        let key = note_key(&settings, note_type, anchor)?;
        println!(
            "{:<10} {}..{}  {:<18} {}",
            note_type,
            start,
            end,
            resolver.title(anchor, note_type),
            key.path.display()
        );
    }
    Ok(())
}

pub fn settings(
    vault: Option<&Path>,
    template_plugin: Option<TemplatePlugin>,
    quarter_names: Option<QuarterNameMode>,
) -> Result<()> {
    with_plugin(vault, |plugin| {
        if template_plugin.is_some() || quarter_names.is_some() {
            plugin.update_settings(|settings| {
                if let Some(value) = template_plugin {
                    settings.template_plugin = value;
                }
                if let Some(value) = quarter_names {
                    settings.quarter_name_mode = value;
                }
            })?;
        }
        let current = plugin
            .settings()
            .ok_or_else(|| anyhow!("plugin has no settings loaded"))?;
        print!("{}", serde_yaml::to_string(current).context("serializing settings")?);
        Ok(())
    })
}

/// Dispatches command ids from stdin one after another until EOF or `quit`.
/// A failing command is reported and the session carries on.
pub fn session(vault: Option<&Path>) -> Result<()> {
    with_plugin(vault, |plugin| {
        for line in io::stdin().lock().lines() {
            let line = line.context("reading stdin")?;
            let input = line.trim();
            if input.is_empty() || input.starts_with('#') {
                continue;
            }
            if input == "quit" || input == "exit" {
                break;
            }
            let result = input
                .parse::<CommandId>()
                .map_err(anyhow::Error::from)
                .and_then(|id| {
                    plugin
                        .execute(id, Local::now().naive_local())
                        .map_err(anyhow::Error::from)
                });
            match result {
                Ok(outcome) => print_outcome(&outcome),
                Err(err) => eprintln!("{}: {:#}", input, err),
            }
        }
        Ok(())
    })
}

/// Runs `f` between a plugin load and unload on the current vault.
fn with_plugin<F>(vault: Option<&Path>, f: F) -> Result<()>
where
    F: FnOnce(&mut Plugin) -> Result<()>,
{
    let location = current_vault(vault)?;
    log::debug!(
        "using {} vault at {}",
        match location.scope {
            VaultScope::Project => "project",
            VaultScope::Global => "global",
        },
        location.root.display()
    );
    let mut plugin = Plugin::new(vault_host(&location)?);
    plugin
        .load()
        .with_context(|| format!("loading vault {}", location.root.display()))?;
    let result = f(&mut plugin);
    plugin.unload();
    result
}

fn current_vault(vault: Option<&Path>) -> Result<VaultLocation> {
    let cwd = env::current_dir()?;
    locate_vault(vault, &cwd)
}

fn vault_host(location: &VaultLocation) -> Result<Host> {
    Ok(Host {
        settings: Box::new(YamlSettingsStore::new(location.settings_path())),
        notes: Box::new(VaultNoteStore::new(&location.root)),
        templates: Box::new(VaultTemplates::new(&location.root)),
        workspace: Box::new(FileWorkspace::open(location.workspace_path())?),
    })
}

fn parse_now(input: Option<&str>) -> Result<NaiveDateTime> {
    let now = Local::now().naive_local();
    let raw = match input {
        Some(r) => r.trim(),
        None => return Ok(now),
    };
    if raw.is_empty() {
        return Ok(now);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid date format (use YYYY-MM-DD): {}", raw))?;
    Ok(date.and_time(now.time()))
}

fn print_outcome(outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::CalendarFocused(panel) => {
            println!("Calendar view focused in panel {}", panel)
        }
        CommandOutcome::NoteOpened(opened) => println!(
            "{} {} note {}",
            if opened.created { "Created" } else { "Opened" },
            opened.handle.note_type,
            opened.handle.path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_now_accepts_iso_dates() {
        let now = parse_now(Some(" 2024-03-07 ")).unwrap();
        assert_eq!(now.date(), NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert!(parse_now(Some("07.03.2024")).is_err());
        assert!(parse_now(Some("")).is_ok());
    }
}
