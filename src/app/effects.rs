use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::app::{App, Message, Model, ToastLevel};
use crate::coordinator::RenderCoordinator;
use crate::export::{self, DirectorySink, ExportFormat};
use crate::view_state::RenderInputs;
use crate::watcher::SourceWatcher;

/// Result of a background export, fed back into `update`.
#[derive(Debug)]
pub(super) struct ExportOutcome {
    pub(super) format: ExportFormat,
    pub(super) result: Result<PathBuf, String>,
}

impl From<ExportOutcome> for Message {
    fn from(outcome: ExportOutcome) -> Self {
        Self::ExportFinished {
            format: outcome.format,
            outcome: outcome.result,
        }
    }
}

/// Everything the event loop owns besides the model: the render
/// coordinator, the file watcher and the export channel.
pub(super) struct Services {
    pub(super) coordinator: RenderCoordinator,
    pub(super) watcher: Option<SourceWatcher>,
    pub(super) export_tx: Sender<ExportOutcome>,
    pub(super) export_rx: Receiver<ExportOutcome>,
    rendered_inputs: Option<RenderInputs>,
}

impl Services {
    pub(super) fn new(coordinator: RenderCoordinator) -> Self {
        let (export_tx, export_rx) = mpsc::channel();
        Self {
            coordinator,
            watcher: None,
            export_tx,
            export_rx,
            rendered_inputs: None,
        }
    }

    /// Schedule a render when anything that feeds the renderer changed
    /// since the last scheduled render. The first call always schedules.
    pub(super) fn sync_render_inputs(&mut self, model: &Model) -> bool {
        let inputs = model.view.render_inputs();
        if self.rendered_inputs.as_ref() == Some(&inputs) {
            return false;
        }
        self.rendered_inputs = Some(inputs);
        self.coordinator.schedule();
        true
    }
}

impl App {
    pub(super) fn make_watcher(path: &std::path::Path) -> notify::Result<SourceWatcher> {
        SourceWatcher::new(path, Duration::from_millis(200))
    }

    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        services: &mut Services,
        msg: &Message,
    ) {
        match msg {
            Message::ToggleWatch => Self::sync_watcher(model, services),
            Message::FileChanged => match model.reload_from_disk() {
                Ok(true) => {}
                Ok(false) => model.show_toast(
                    ToastLevel::Warning,
                    "File changed on disk; keeping unsaved edits",
                ),
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err}"));
                    crate::perf::log_event("reload.error", err.to_string());
                }
            },
            Message::SaveSource => match model.save_to_disk() {
                Ok(path) => model.show_toast(ToastLevel::Info, format!("Saved {}", path.display())),
                Err(err) => model.show_toast(ToastLevel::Error, format!("{err:#}")),
            },
            Message::ForceRerender | Message::Resize(..) => services.coordinator.notify_resize(),
            Message::Export(format) => Self::start_export(model, services, *format),
            _ => {}
        }
    }

    pub(super) fn sync_watcher(model: &mut Model, services: &mut Services) {
        if !model.watch_enabled {
            if services.watcher.take().is_some() {
                model.show_toast(ToastLevel::Info, "Watch disabled");
            }
            return;
        }
        let Some(path) = model.file_path.clone() else {
            model.watch_enabled = false;
            return;
        };
        match Self::make_watcher(&path) {
            Ok(watcher) => {
                services.watcher = Some(watcher);
                model.show_toast(ToastLevel::Info, "Watching file changes");
            }
            Err(err) => {
                model.watch_enabled = false;
                services.watcher = None;
                model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                crate::perf::log_event(
                    "watcher.error",
                    format!("path={} err={err}", path.display()),
                );
            }
        }
    }

    /// Check the surface now; encode and write on a worker thread.
    fn start_export(model: &mut Model, services: &Services, format: ExportFormat) {
        if let Some(running) = model.export_pending {
            model.show_toast(ToastLevel::Info, format!("{running} export already running"));
            return;
        }
        let job = match export::prepare(&model.surface, format) {
            Ok(job) => job,
            Err(err) => {
                model
                    .view
                    .set_error(format!("Error downloading diagram: {err}"));
                model.show_toast(ToastLevel::Error, format!("{format} export failed"));
                return;
            }
        };

        let sink = DirectorySink::new(model.out_dir.clone());
        let tx = services.export_tx.clone();
        let spawned = std::thread::Builder::new()
            .name("export".to_string())
            .spawn(move || {
                let result = job
                    .run()
                    .and_then(|file| file.deliver(&sink))
                    .map_err(|err| err.to_string());
                let _ = tx.send(ExportOutcome { format, result });
            });
        match spawned {
            Ok(_) => model.export_pending = Some(format),
            Err(err) => {
                model
                    .view
                    .set_error(format!("Error downloading diagram: {err}"));
                model.show_toast(ToastLevel::Error, format!("{format} export failed"));
            }
        }
    }
}
