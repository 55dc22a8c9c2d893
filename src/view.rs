use crate::error::HostCapabilityError;
use crate::workspace::{PanelId, ViewState, Workspace};

pub const CALENDAR_VIEW: &str = "dustcal-calendar";

/// Keeps at most one calendar panel alive and brings it to the front.
#[derive(Debug, Clone, Copy)]
pub struct ViewActivationPolicy {
    view_type: &'static str,
}

impl Default for ViewActivationPolicy {
    fn default() -> Self {
        ViewActivationPolicy {
            view_type: CALENDAR_VIEW,
        }
    }
}

impl ViewActivationPolicy {
    pub fn activate_calendar_view(
        &self,
        workspace: &mut dyn Workspace,
    ) -> Result<PanelId, HostCapabilityError> {
        let id = match workspace.find_panels(self.view_type).into_iter().next() {
            Some(panel) => {
                log::debug!("reusing calendar panel {}", panel.id);
                panel.id
            }
            None => {
                let panel = workspace
                    .allocate_panel()?
                    .ok_or(HostCapabilityError::NoPanelAvailable)?;
                let state = ViewState {
                    view_type: self.view_type.to_string(),
                    active: true,
                };
                if let Err(err) = workspace.set_view_state(&panel.id, state) {
                    // A panel without view state is invisible to detach.
                    if let Err(detach_err) = workspace.detach(&panel.id) {
                        log::warn!("failed to release panel {}: {}", panel.id, detach_err);
                    }
                    return Err(err);
                }
                log::info!("opened calendar view in panel {}", panel.id);
                panel.id
            }
        };
        workspace.focus(&id)?;
        Ok(id)
    }

    /// Detaches every live calendar panel, returning how many went away.
    /// Failures are logged and skipped so teardown always finishes.
    pub fn detach_calendar_views(&self, workspace: &mut dyn Workspace) -> usize {
        let mut detached = 0;
        for panel in workspace.find_panels(self.view_type) {
            match workspace.detach(&panel.id) {
                Ok(()) => detached += 1,
                Err(err) => log::warn!("failed to detach panel {}: {}", panel.id, err),
            }
        }
        detached
    }
}
