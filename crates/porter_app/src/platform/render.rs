use porter_core::AppViewModel;
use porter_core::SessionState;

/// Append-only terminal rendering of the view model. Remembers what was
/// last printed so repeated redraws do not repeat themselves.
pub(crate) struct Renderer {
    last_status: String,
    last_server_detail: Option<String>,
    last_notice: Option<String>,
    summary_printed: bool,
}

impl Renderer {
    pub(crate) fn new() -> Self {
        Self {
            last_status: String::new(),
            last_server_detail: None,
            last_notice: None,
            summary_printed: false,
        }
    }

    pub(crate) fn draw(&mut self, view: &AppViewModel) {
        if let Some(server) = &view.server {
            if self.last_server_detail.as_deref() != Some(server.detail.as_str()) {
                println!("server: {}", server.detail);
                self.last_server_detail = Some(server.detail.clone());
            }
        }

        if let Some(notice) = &view.notice {
            if self.last_notice.as_deref() != Some(notice.as_str()) {
                println!("!! {notice}");
                self.last_notice = Some(notice.clone());
            }
        } else {
            self.last_notice = None;
        }

        if let Some(intake) = view.intake {
            if intake.rejected > 0 && view.session == SessionState::Idle {
                let line = format!(
                    "selection: {} file(s) added, {} rejected",
                    intake.added, intake.rejected
                );
                if line != self.last_status {
                    println!("{line}");
                    self.last_status = line;
                }
            }
        }

        match view.session {
            SessionState::Running => {
                let progress = &view.progress;
                let line = match &progress.current_file {
                    Some(current) => format!(
                        "[{}/{}] {:>3}% {}",
                        progress.completed_files,
                        progress.total_files,
                        progress.overall_percent,
                        current
                    ),
                    None => format!(
                        "[{}/{}] {:>3}%",
                        progress.completed_files, progress.total_files, progress.overall_percent
                    ),
                };
                if line != self.last_status {
                    println!("{line}");
                    self.last_status = line;
                }
            }
            SessionState::Settling => {
                if !self.summary_printed {
                    println!("{}", view.progress.status_text);
                    print_history(view);
                    self.summary_printed = true;
                }
            }
            SessionState::Idle => {}
        }
    }
}

fn print_history(view: &AppViewModel) {
    if view.history.is_empty() {
        return;
    }
    println!("recent conversions:");
    for outcome in &view.history {
        let status = if outcome.succeeded { "ok" } else { "failed" };
        match &outcome.error_message {
            Some(err) => println!(
                "  {} {} -> {} [{status}: {err}]",
                outcome.completed_at, outcome.file_name, outcome.target
            ),
            None => println!(
                "  {} {} -> {} [{status}]",
                outcome.completed_at, outcome.file_name, outcome.target
            ),
        }
    }
}
