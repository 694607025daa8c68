//! Single-slot decode scheduling
//!
//! At most one decode pass is in flight. The idle slot holds the workspace;
//! `submit` swaps the collector's filled window into it and moves the whole
//! workspace onto a worker thread, which hands it back when the pass ends.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use crate::capture::CaptureWriter;
use crate::config::WindowConfig;
use crate::error::{Result, SlotBusySnafu};
use crate::spot::SpotSink;

use super::collector::Window;
use super::pass::Workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Idle,
    Busy,
}

/// Where the collector hands off captured windows
pub trait DecodeSlot {
    /// Non-blocking check for a running pass
    fn poll(&mut self) -> SlotStatus;

    /// Start a pass on `window`, leaving a spare buffer of the same size in its
    /// place, or fail with `Error::SlotBusy`
    fn submit(&mut self, window: &mut Window) -> Result<()>;

    /// Block until any running pass finishes
    fn wait(&mut self);
}

enum SlotState {
    Idle(Box<Workspace>),
    Busy(JoinHandle<Box<Workspace>>),
    /// Only observed while switching states
    Vacant,
}

/// Runs each pass on its own thread
pub struct WorkSlot {
    state: SlotState,
    config: WindowConfig,
    sink: Arc<dyn SpotSink>,
    capture: Arc<dyn CaptureWriter>,
    passes: usize,
}

impl WorkSlot {
    pub fn new(config: WindowConfig, sink: Arc<dyn SpotSink>, capture: Arc<dyn CaptureWriter>) -> Self {
        let workspace = Workspace::new(config.clone(), sink.clone(), capture.clone());
        Self::with_workspace(workspace, config, sink, capture)
    }

    pub fn with_workspace(
        workspace: Workspace,
        config: WindowConfig,
        sink: Arc<dyn SpotSink>,
        capture: Arc<dyn CaptureWriter>,
    ) -> Self {
        Self { state: SlotState::Idle(Box::new(workspace)), config, sink, capture, passes: 0 }
    }

    /// Passes started so far
    pub fn passes(&self) -> usize {
        self.passes
    }

    fn rebuild(&self) -> Box<Workspace> {
        Box::new(Workspace::new(self.config.clone(), self.sink.clone(), self.capture.clone()))
    }

    fn join(&mut self, handle: JoinHandle<Box<Workspace>>) {
        let workspace = match handle.join() {
            Ok(workspace) => {
                info!("decode pass complete");
                workspace
            }
            Err(_) => {
                error!("decode worker panicked, rebuilding workspace");
                self.rebuild()
            }
        };
        self.state = SlotState::Idle(workspace);
    }

    /// Collect a finished worker without blocking
    fn reap(&mut self) {
        let finished = matches!(&self.state, SlotState::Busy(handle) if handle.is_finished());
        if finished {
            if let SlotState::Busy(handle) = std::mem::replace(&mut self.state, SlotState::Vacant) {
                self.join(handle);
            }
        }
    }
}

impl DecodeSlot for WorkSlot {
    fn poll(&mut self) -> SlotStatus {
        self.reap();
        match self.state {
            SlotState::Busy(_) => SlotStatus::Busy,
            _ => SlotStatus::Idle,
        }
    }

    fn submit(&mut self, window: &mut Window) -> Result<()> {
        self.reap();
        let mut workspace = match std::mem::replace(&mut self.state, SlotState::Vacant) {
            SlotState::Idle(workspace) => workspace,
            SlotState::Vacant => self.rebuild(),
            busy @ SlotState::Busy(_) => {
                self.state = busy;
                return SlotBusySnafu.fail();
            }
        };

        std::mem::swap(workspace.window_mut(), window);
        self.passes += 1;
        let pass = self.passes;

        let handle = thread::spawn(move || {
            info!(pass, "decode pass started");
            workspace.decode_pass();
            workspace
        });
        self.state = SlotState::Busy(handle);
        Ok(())
    }

    fn wait(&mut self) {
        if !matches!(self.state, SlotState::Busy(_)) {
            return;
        }
        if let SlotState::Busy(handle) = std::mem::replace(&mut self.state, SlotState::Vacant) {
            self.join(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::NullCaptureWriter;
    use crate::spot::MemorySink;

    fn config() -> WindowConfig {
        WindowConfig {
            size: 8,
            number: 1,
            sample_rate: 8,
            processing_seconds: 162,
            period_seconds: 170,
            shifts: 1,
            ..Default::default()
        }
    }

    fn slot() -> WorkSlot {
        WorkSlot::new(config(), Arc::new(MemorySink::new()), Arc::new(NullCaptureWriter))
    }

    #[test]
    fn test_submit_swaps_in_spare_buffer() {
        let mut slot = slot();
        let mut window = Window::new(&config());
        window.samples[0] = 7.0;
        window.elapsed = 42;

        slot.submit(&mut window).unwrap();
        assert_eq!(window.samples.len(), config().sample_buffer_size());
        assert_eq!(window.samples[0], 0.0);

        slot.wait();
        assert_eq!(slot.poll(), SlotStatus::Idle);
        assert_eq!(slot.passes(), 1);
    }

    #[test]
    fn test_submit_never_overlaps_passes() {
        let mut slot = slot();
        let mut window = Window::new(&config());
        slot.submit(&mut window).unwrap();

        match slot.submit(&mut window) {
            Err(crate::error::Error::SlotBusy) => assert_eq!(slot.passes(), 1),
            Ok(()) => assert_eq!(slot.passes(), 2),
            Err(e) => panic!("unexpected error: {}", e),
        }
        slot.wait();
        assert_eq!(slot.poll(), SlotStatus::Idle);
    }

    #[test]
    fn test_wait_on_idle_slot_returns() {
        let mut slot = slot();
        slot.wait();
        assert_eq!(slot.poll(), SlotStatus::Idle);
        assert_eq!(slot.passes(), 0);
    }
}
