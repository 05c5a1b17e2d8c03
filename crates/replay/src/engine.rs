use std::{collections::HashSet, path::PathBuf};

use crossbeam_channel::{Receiver, Sender};
use session::{DebugEngine, EngineError, Notification};

use crate::{Breakpoint, Frame, Trace};

/// Replays a [`Trace`] as if it were a live debuggee.
///
/// - `start` suspends at the first frame and publishes `DebuggingStarted`
/// - `step_into` moves to the next frame
/// - `step_over` moves to the next frame at the same or a shallower depth
/// - `step_out` moves to the next frame at a shallower depth
/// - `run` moves to the next frame on a breakpoint
///
/// A step that finds its frame publishes `StepCompleted`; one that runs off the
/// end of the trace publishes `SessionEnded`. `stop` ends the replay silently.
pub struct ReplayEngine {
    trace: Trace,
    breakpoints: HashSet<(PathBuf, usize)>,
    cursor: Option<usize>,
    tx: Sender<Notification>,
    rx: Receiver<Notification>,
}

impl ReplayEngine {
    pub fn new(trace: Trace) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            trace,
            breakpoints: HashSet::new(),
            cursor: None,
            tx,
            rx,
        }
    }

    pub fn with_breakpoints(mut self, breakpoints: impl IntoIterator<Item = Breakpoint>) -> Self {
        for breakpoint in breakpoints {
            self.add_breakpoint(breakpoint);
        }
        self
    }

    pub fn add_breakpoint(&mut self, breakpoint: Breakpoint) {
        tracing::debug!(?breakpoint, "adding breakpoint");
        self.breakpoints.insert((breakpoint.path, breakpoint.line));
    }

    /// Frame the replay is suspended at
    pub fn current_frame(&self) -> Option<&Frame> {
        self.cursor.map(|idx| &self.trace.frames()[idx])
    }

    fn suspended(&self) -> Result<(usize, &Frame), EngineError> {
        let idx = self.cursor.ok_or(EngineError::NotSuspended)?;
        Ok((idx, &self.trace.frames()[idx]))
    }

    fn next_matching(&self, pred: impl Fn(&Frame) -> bool) -> Result<Option<usize>, EngineError> {
        let (idx, _) = self.suspended()?;
        Ok(self
            .trace
            .frames()
            .iter()
            .enumerate()
            .skip(idx + 1)
            .find(|(_, frame)| pred(frame))
            .map(|(idx, _)| idx))
    }

    fn advance(&mut self, next: Option<usize>) -> Result<(), EngineError> {
        self.cursor = next;
        let notification = match next {
            Some(idx) => {
                tracing::debug!(frame = %idx, "suspended");
                Notification::StepCompleted
            }
            None => {
                tracing::debug!("reached end of trace");
                Notification::SessionEnded
            }
        };
        self.publish(notification)
    }

    fn publish(&self, notification: Notification) -> Result<(), EngineError> {
        self.tx
            .send(notification)
            .map_err(|_| EngineError::Disconnected)
    }
}

impl DebugEngine for ReplayEngine {
    fn subscribe(&mut self) -> Receiver<Notification> {
        self.rx.clone()
    }

    #[tracing::instrument(skip(self))]
    fn start(&mut self) -> Result<(), EngineError> {
        self.cursor = Some(0);
        self.publish(Notification::DebuggingStarted)
    }

    #[tracing::instrument(skip(self))]
    fn stop(&mut self) -> Result<(), EngineError> {
        self.cursor = None;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn run(&mut self) -> Result<(), EngineError> {
        let next = self.next_matching(|frame| {
            self.breakpoints
                .contains(&(frame.file.clone(), frame.line))
        })?;
        self.advance(next)
    }

    #[tracing::instrument(skip(self))]
    fn step_over(&mut self) -> Result<(), EngineError> {
        let (_, current) = self.suspended()?;
        let depth = current.depth;
        let next = self.next_matching(|frame| frame.depth <= depth)?;
        self.advance(next)
    }

    #[tracing::instrument(skip(self))]
    fn step_into(&mut self) -> Result<(), EngineError> {
        let next = self.next_matching(|_| true)?;
        self.advance(next)
    }

    #[tracing::instrument(skip(self))]
    fn step_out(&mut self) -> Result<(), EngineError> {
        let (_, current) = self.suspended()?;
        let depth = current.depth;
        let next = self.next_matching(|frame| frame.depth < depth)?;
        self.advance(next)
    }

    fn current_file(&self) -> Result<PathBuf, EngineError> {
        let (_, frame) = self.suspended()?;
        Ok(frame.file.clone())
    }

    fn current_line(&self) -> Result<usize, EngineError> {
        let (_, frame) = self.suspended()?;
        Ok(frame.line)
    }
}
