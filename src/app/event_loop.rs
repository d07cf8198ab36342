use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::effects::Services;
use crate::app::{App, Message, Model, update};
use crate::coordinator::{RenderCommit, RenderCoordinator};
use crate::watcher::SourceWatcher;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the interactive terminal UI until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized or an I/O
    /// error occurs while drawing or reading events.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        // The picker queries stdio, so it must run before raw mode.
        let picker = crate::preview::create_picker(self.force_half_cell);

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; conceptcraft requires an interactive terminal")?;
        let size = terminal.size()?;
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;

        let mut model = Model::new(
            self.view.clone(),
            self.file_path.clone(),
            (size.width, size.height),
        )
        .with_picker(picker);
        model.out_dir.clone_from(&self.out_dir);
        model.watch_enabled = self.watch_enabled && model.file_path.is_some();
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        let mut services = Services::new(RenderCoordinator::new(self.renderer.clone()));
        if model.watch_enabled {
            Self::sync_watcher(&mut model, &mut services);
        }

        let result = Self::event_loop(&mut terminal, &mut model, &mut services);

        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn apply_message(model: &mut Model, services: &mut Services, msg: Message) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, services, &side_msg);
        services.sync_render_inputs(model);
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        services: &mut Services,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        // First render of the initial source.
        services.sync_render_inputs(model);

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                crate::perf::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                Self::apply_message(model, services, Message::Resize(width, height));
                needs_render = true;
            }

            if model.watch_enabled
                && services
                    .watcher
                    .as_mut()
                    .is_some_and(SourceWatcher::poll_changed)
            {
                Self::apply_message(model, services, Message::FileChanged);
                needs_render = true;
            }

            // Idle tick: dispatch the scheduled render, then commit any
            // completions that arrived.
            if let Some(ticket) = services.coordinator.tick(&model.view) {
                crate::perf::log_event(
                    "render.tick",
                    format!("frame={frame_idx} seq={}", ticket.sequence),
                );
            }
            for commit in services.coordinator.poll(&mut model.view, &mut model.surface) {
                if !matches!(commit, RenderCommit::Stale(_)) {
                    needs_render = true;
                }
            }

            while let Ok(outcome) = services.export_rx.try_recv() {
                Self::apply_message(model, services, outcome.into());
                needs_render = true;
            }

            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending()
                || services.coordinator.in_flight() > 0
                || model.export_pending.is_some()
            {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Coalesce bursts (key repeat, paste) into one frame.
                loop {
                    let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let event = event::read()?;
                    if let Some(msg) =
                        Self::handle_event(&event, model, event_ms, &mut resize_debouncer)
                    {
                        crate::perf::log_event(
                            "event.message",
                            format!("frame={frame_idx} msg={msg:?}"),
                        );
                        Self::apply_message(model, services, msg);
                        needs_render = true;
                    }
                    if !event::poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }

            if needs_render {
                frame_idx += 1;
                let (width, height) = model.terminal_size;
                let preview_area =
                    crate::ui::preview_area(ratatui::layout::Rect::new(0, 0, width, height), &model.view);
                model.refresh_preview(preview_area.width);

                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={frame_idx} draw_ms={:.3}",
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_debouncer_waits_for_delay() {
        let mut debouncer = ResizeDebouncer::new(100);
        debouncer.queue(120, 40, 1_000);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.take_ready(1_050), None);
        assert_eq!(debouncer.take_ready(1_100), Some((120, 40)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_resize_debouncer_keeps_latest_size() {
        let mut debouncer = ResizeDebouncer::new(100);
        debouncer.queue(100, 30, 0);
        debouncer.queue(140, 50, 80);
        assert_eq!(debouncer.take_ready(150), None);
        assert_eq!(debouncer.take_ready(180), Some((140, 50)));
    }
}
