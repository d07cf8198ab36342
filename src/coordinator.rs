//! Keeps the display surface in step with the view state.
//!
//! Renders run on short-lived worker threads and report back over a
//! channel that the event loop drains with [`RenderCoordinator::poll`].
//! Every dispatch takes the next sequence number and only a completion
//! carrying the latest one is committed, so a slow render can never
//! overwrite the result of a newer request.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::renderer::{DiagramRenderer, RenderError, RenderRequest};
use crate::surface::DisplaySurface;
use crate::view_state::ViewState;

/// Identifies one dispatched render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    pub sequence: u64,
    pub generation: u64,
}

/// What happened when a completion was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommit {
    /// Markup written to the surface, error cleared.
    Rendered(RenderTicket),
    /// Fallback written to the surface, error recorded.
    Failed { ticket: RenderTicket, message: String },
    /// A newer render was issued; this result was dropped.
    Stale(RenderTicket),
}

impl RenderCommit {
    pub const fn ticket(&self) -> RenderTicket {
        match self {
            Self::Rendered(ticket) | Self::Failed { ticket, .. } | Self::Stale(ticket) => *ticket,
        }
    }

    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

#[derive(Debug)]
struct RenderCompletion {
    ticket: RenderTicket,
    source: String,
    result: Result<String, RenderError>,
}

pub struct RenderCoordinator {
    renderer: Arc<dyn DiagramRenderer>,
    tx: Sender<RenderCompletion>,
    rx: Receiver<RenderCompletion>,
    latest_sequence: u64,
    generation: u64,
    scheduled: bool,
    in_flight: usize,
}

impl std::fmt::Debug for RenderCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCoordinator")
            .field("latest_sequence", &self.latest_sequence)
            .field("generation", &self.generation)
            .field("scheduled", &self.scheduled)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl RenderCoordinator {
    pub fn new(renderer: Arc<dyn DiagramRenderer>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            renderer,
            tx,
            rx,
            latest_sequence: 0,
            generation: 0,
            scheduled: false,
            in_flight: 0,
        }
    }

    pub const fn latest_sequence(&self) -> u64 {
        self.latest_sequence
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub const fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Request a render on the next [`tick`](Self::tick).
    pub const fn schedule(&mut self) {
        self.scheduled = true;
    }

    /// The environment changed size: force a fresh render of the same input.
    pub const fn notify_resize(&mut self) {
        self.generation += 1;
        self.scheduled = true;
    }

    /// Idle tick: dispatch the scheduled render, if any.
    pub fn tick(&mut self, state: &ViewState) -> Option<RenderTicket> {
        if !self.scheduled {
            return None;
        }
        self.scheduled = false;
        Some(self.dispatch(state))
    }

    /// Start rendering the current state on a worker thread.
    pub fn dispatch(&mut self, state: &ViewState) -> RenderTicket {
        self.latest_sequence += 1;
        let ticket = RenderTicket {
            sequence: self.latest_sequence,
            generation: self.generation,
        };
        let request = RenderRequest {
            sequence: ticket.sequence,
            render_id: format!("mermaid-{}", ticket.generation),
            source: state.diagram_source().to_string(),
            options: state.render_options(),
        };
        crate::perf::log_event(
            "render.dispatch",
            format!(
                "seq={} gen={} bytes={}",
                ticket.sequence,
                ticket.generation,
                request.source.len()
            ),
        );

        let renderer = Arc::clone(&self.renderer);
        let tx = self.tx.clone();
        self.in_flight += 1;
        let spawned = std::thread::Builder::new()
            .name(format!("render-{}", ticket.sequence))
            .spawn(move || {
                let result = run_renderer(renderer.as_ref(), &request);
                let _ = tx.send(RenderCompletion {
                    ticket,
                    source: request.source,
                    result,
                });
            });
        if let Err(err) = spawned {
            tracing::warn!("failed to spawn render worker: {err}");
            let _ = self.tx.send(RenderCompletion {
                ticket,
                source: state.diagram_source().to_string(),
                result: Err(RenderError::Spawn(err.to_string())),
            });
        }
        ticket
    }

    /// Apply every completion that has arrived, without blocking.
    pub fn poll(&mut self, state: &mut ViewState, surface: &mut DisplaySurface) -> Vec<RenderCommit> {
        let mut commits = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            commits.push(self.commit(completion, state, surface));
        }
        commits
    }

    /// Block until the latest dispatched render is committed.
    ///
    /// Stale completions that arrive first are dropped as usual.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TimedOut`] if nothing current arrives in time.
    pub fn wait_for_latest(
        &mut self,
        state: &mut ViewState,
        surface: &mut DisplaySurface,
        timeout: Duration,
    ) -> Result<RenderCommit, RenderError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(completion) => {
                    let commit = self.commit(completion, state, surface);
                    if !commit.is_stale() {
                        return Ok(commit);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                    return Err(RenderError::TimedOut(timeout));
                }
            }
        }
    }

    /// Dispatch a render and wait for it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TimedOut`] if the renderer does not finish in time.
    pub fn render_blocking(
        &mut self,
        state: &mut ViewState,
        surface: &mut DisplaySurface,
        timeout: Duration,
    ) -> Result<RenderCommit, RenderError> {
        self.scheduled = false;
        self.dispatch(state);
        self.wait_for_latest(state, surface, timeout)
    }

    fn commit(
        &mut self,
        completion: RenderCompletion,
        state: &mut ViewState,
        surface: &mut DisplaySurface,
    ) -> RenderCommit {
        self.in_flight = self.in_flight.saturating_sub(1);
        let ticket = completion.ticket;
        if ticket.sequence != self.latest_sequence {
            tracing::debug!(
                sequence = ticket.sequence,
                latest = self.latest_sequence,
                "dropping stale render"
            );
            crate::perf::log_event(
                "render.stale",
                format!("seq={} latest={}", ticket.sequence, self.latest_sequence),
            );
            return RenderCommit::Stale(ticket);
        }

        match completion.result {
            Ok(markup) => {
                crate::perf::log_event(
                    "render.commit",
                    format!("seq={} bytes={}", ticket.sequence, markup.len()),
                );
                surface.show_markup(markup);
                state.clear_error();
                RenderCommit::Rendered(ticket)
            }
            Err(err) => {
                let message = format!("Error rendering diagram: {err}");
                tracing::warn!("{message}");
                crate::perf::log_event("render.error", format!("seq={} {err}", ticket.sequence));
                state.set_error(message.clone());
                surface.show_fallback(completion.source);
                RenderCommit::Failed { ticket, message }
            }
        }
    }
}

fn run_renderer(
    renderer: &dyn DiagramRenderer,
    request: &RenderRequest,
) -> Result<String, RenderError> {
    catch_unwind(AssertUnwindSafe(|| renderer.render(request))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(RenderError::Panicked(message))
    })
}
