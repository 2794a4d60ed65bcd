//! Progress reporting.
//!
//! Workflows report a percentage and a status line through
//! [`ProgressSink`]. While the script request is in flight the service gives
//! no feedback, so [`ProgressSimulator`] plays a timed sequence of updates
//! and cancels it once the real answer arrives.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Receiver of progress updates.
pub trait ProgressSink: Send + Sync {
    fn set_percent(&self, percent: u8);

    fn set_message(&self, message: &str);

    /// The progress display is no longer needed.
    fn finish(&self) {}
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn set_percent(&self, _percent: u8) {}

    fn set_message(&self, _message: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Percent(u8),
    Message(String),
    Finished,
}

/// Sink that records updates in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Percent(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn last_percent(&self) -> Option<u8> {
        self.percents().last().copied()
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages().pop()
    }

    fn push(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ProgressSink for MemorySink {
    fn set_percent(&self, percent: u8) {
        self.push(ProgressEvent::Percent(percent));
    }

    fn set_message(&self, message: &str) {
        self.push(ProgressEvent::Message(message.to_string()));
    }

    fn finish(&self) {
        self.push(ProgressEvent::Finished);
    }
}

/// One update played after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedStep {
    pub after: Duration,
    pub percent: u8,
    pub message: Option<&'static str>,
}

const fn step(after_ms: u64, percent: u8, message: Option<&'static str>) -> TimedStep {
    TimedStep {
        after: Duration::from_millis(after_ms),
        percent,
        message,
    }
}

pub const SCRIPT_START_MESSAGE: &str = "Initializing...";
pub const SCRIPT_DONE_MESSAGE: &str = "Script generated successfully!";
pub const SCHEDULE_SCRIPT_DONE_MESSAGE: &str = "Script ready!";

/// Updates shown while the script is being written.
pub const SCRIPT_STEPS: &[TimedStep] = &[
    step(300, 10, Some("Generating script with Grok...")),
    step(1000, 30, None),
    step(2000, 50, None),
    step(3000, 70, Some("Analyzing content...")),
    step(4000, 85, None),
];

/// Same cadence as [`SCRIPT_STEPS`], worded for a scheduled generation.
pub const SCHEDULE_SCRIPT_STEPS: &[TimedStep] = &[
    step(300, 10, Some("Generating script preview with Grok...")),
    step(1000, 30, None),
    step(2000, 50, None),
    step(3000, 70, Some("Analyzing content...")),
    step(4000, 85, None),
];

pub const SUBMIT_START_PERCENT: u8 = 25;
pub const SUBMIT_START_MESSAGE: &str = "Preparing video generation...";

/// Updates shown while a render job is being submitted.
pub const SUBMIT_STEPS: &[TimedStep] = &[step(500, 35, Some("Creating video with Veo 3..."))];

/// Plays timed progress updates on spawned tasks.
///
/// Starting a new sequence cancels the pending one, and so does dropping
/// the simulator.
pub struct ProgressSimulator {
    sink: Arc<dyn ProgressSink>,
    timers: Vec<JoinHandle<()>>,
}

impl ProgressSimulator {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            timers: Vec::new(),
        }
    }

    pub fn sink(&self) -> &Arc<dyn ProgressSink> {
        &self.sink
    }

    /// Report 0% "Initializing..." and schedule the script steps.
    pub fn start_script_generation(&mut self) {
        self.play(0, SCRIPT_START_MESSAGE, SCRIPT_STEPS);
    }

    /// Report 25% "Preparing video generation..." and schedule the rest.
    pub fn start_submission(&mut self) {
        self.play(SUBMIT_START_PERCENT, SUBMIT_START_MESSAGE, SUBMIT_STEPS);
    }

    /// Report the script as done, dropping any pending steps.
    pub fn complete_script(&mut self) {
        self.complete(SCRIPT_DONE_MESSAGE);
    }

    /// Cancel pending steps and report 100% with `message`.
    pub fn complete(&mut self, message: &str) {
        self.cancel();
        self.sink.set_message(message);
        self.sink.set_percent(100);
    }

    /// Report `percent` and `message` now, then play `steps`.
    pub fn play(&mut self, percent: u8, message: &str, steps: &[TimedStep]) {
        self.cancel();
        self.sink.set_message(message);
        self.sink.set_percent(percent);

        for step in steps.iter().copied() {
            let sink = Arc::clone(&self.sink);
            self.timers.push(tokio::spawn(async move {
                tokio::time::sleep(step.after).await;
                if let Some(message) = step.message {
                    sink.set_message(message);
                }
                sink.set_percent(step.percent);
            }));
        }
    }

    /// Abort every pending update.
    pub fn cancel(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }

    /// Updates scheduled but not played yet.
    pub fn pending(&self) -> usize {
        self.timers.iter().filter(|t| !t.is_finished()).count()
    }
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        self.cancel();
    }
}
