use crate::error::CommandError;
use crate::model::{Created, NoteHandle, NoteType, PeriodAnchor};
use crate::period::PeriodResolver;
use crate::settings::Settings;
use crate::storage::{note_key, NoteStore};
use crate::template::{RenderRequest, TemplateEngine};
use crate::workspace::Workspace;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedNote {
    pub handle: NoteHandle,
    /// Whether this invocation wrote the note.
    pub created: bool,
}

/// Open-or-create for periodic notes, working on the settings snapshot it was
/// last configured with.
#[derive(Debug, Clone)]
pub struct NoteController {
    resolver: PeriodResolver,
    settings: Settings,
}

impl NoteController {
    pub fn new(settings: &Settings) -> Self {
        NoteController {
            resolver: PeriodResolver::new(settings.quarter_name_mode),
            settings: settings.clone(),
        }
    }

    pub fn configure(&mut self, settings: &Settings) {
        self.resolver.set_quarter_name_mode(settings.quarter_name_mode);
        self.settings = settings.clone();
    }

    pub fn resolver(&self) -> &PeriodResolver {
        &self.resolver
    }

    pub fn open_note_by_note_type(
        &self,
        anchor: PeriodAnchor,
        note_type: NoteType,
        now: NaiveDateTime,
        notes: &dyn NoteStore,
        templates: &dyn TemplateEngine,
        workspace: &mut dyn Workspace,
    ) -> Result<OpenedNote, CommandError> {
        let key = note_key(&self.settings, note_type, anchor)?;
        let opened = match notes.find(&key) {
            Some(handle) => {
                log::debug!("found {} note {:?}", note_type, handle.path);
                OpenedNote {
                    handle,
                    created: false,
                }
            }
            None => {
                let title = self.resolver.title(anchor, note_type);
                let content = templates.render(&RenderRequest {
                    note_type,
                    anchor,
                    title: &title,
                    template: self.settings.note(note_type).template.as_deref(),
                    now,
                })?;
                match notes.create(&key, &content)? {
                    Created::New(handle) => {
                        log::info!("created {} note {:?}", note_type, handle.path);
                        OpenedNote {
                            handle,
                            created: true,
                        }
                    }
                    Created::AlreadyExisted(handle) => OpenedNote {
                        handle,
                        created: false,
                    },
                }
            }
        };
        workspace.open_note(&opened.handle)?;
        Ok(opened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NoteCreationError, TemplateRenderError};
    use crate::testing::{MemoryNoteStore, MemoryWorkspace, StaticTemplates};
    use chrono::{NaiveDate, NaiveTime};
    use std::path::PathBuf;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap())
    }

    fn weekly_anchor(controller: &NoteController) -> PeriodAnchor {
        controller
            .resolver()
            .resolve_anchor(now().date(), NoteType::Weekly)
    }

    #[test]
    fn creates_once_then_reuses() {
        let controller = NoteController::new(&Settings::default());
        let notes = MemoryNoteStore::default();
        let templates = StaticTemplates::content("# week");
        let mut workspace = MemoryWorkspace::default();
        let anchor = weekly_anchor(&controller);

        let first = controller
            .open_note_by_note_type(anchor, NoteType::Weekly, now(), &notes, &templates, &mut workspace)
            .unwrap();
        let second = controller
            .open_note_by_note_type(anchor, NoteType::Weekly, now(), &notes, &templates, &mut workspace)
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.handle, second.handle);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes.content(&PathBuf::from("Weekly/2024-W10.md")).as_deref(), Some("# week"));
        assert_eq!(templates.renders(), 1);
        assert_eq!(workspace.opened.len(), 2);
    }

    #[test]
    fn create_conflict_counts_as_success() {
        let controller = NoteController::new(&Settings::default());
        let notes = MemoryNoteStore::racing();
        let templates = StaticTemplates::content("");
        let mut workspace = MemoryWorkspace::default();
        let anchor = weekly_anchor(&controller);

        let opened = controller
            .open_note_by_note_type(anchor, NoteType::Weekly, now(), &notes, &templates, &mut workspace)
            .unwrap();
        assert!(!opened.created);
        assert_eq!(workspace.opened, vec![opened.handle.path]);
    }

    #[test]
    fn template_failure_creates_nothing() {
        let controller = NoteController::new(&Settings::default());
        let notes = MemoryNoteStore::default();
        let templates = StaticTemplates::failing();
        let mut workspace = MemoryWorkspace::default();
        let anchor = weekly_anchor(&controller);

        let err = controller
            .open_note_by_note_type(anchor, NoteType::Weekly, now(), &notes, &templates, &mut workspace)
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Template(TemplateRenderError::Missing(_))
        ));
        assert!(notes.is_empty());
        assert!(workspace.opened.is_empty());
    }

    #[test]
    fn storage_failure_is_reported() {
        let controller = NoteController::new(&Settings::default());
        let notes = MemoryNoteStore::read_only();
        let templates = StaticTemplates::content("");
        let mut workspace = MemoryWorkspace::default();
        let anchor = weekly_anchor(&controller);

        let err = controller
            .open_note_by_note_type(anchor, NoteType::Weekly, now(), &notes, &templates, &mut workspace)
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::NoteCreation(NoteCreationError::Io { .. })
        ));
        assert!(workspace.opened.is_empty());
    }

    #[test]
    fn reconfigured_layout_changes_paths() {
        let mut controller = NoteController::new(&Settings::default());
        let mut settings = Settings::default();
        settings.daily.folder = "Journal".into();
        controller.configure(&settings);

        let notes = MemoryNoteStore::default();
        let mut workspace = MemoryWorkspace::default();
        let anchor = controller.resolver().resolve_anchor(now().date(), NoteType::Daily);
        let opened = controller
            .open_note_by_note_type(
                anchor,
                NoteType::Daily,
                now(),
                &notes,
                &StaticTemplates::content(""),
                &mut workspace,
            )
            .unwrap();
        assert_eq!(opened.handle.path, PathBuf::from("Journal/2024-03-07.md"));
    }
}
