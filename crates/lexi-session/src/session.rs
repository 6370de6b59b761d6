use crate::{CycleError, Overlay, Phase};
use lexi_camera::{CameraError, FrameSource};
use lexi_client::Processor;
use lexi_image::encode_jpeg;
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};

/// Prefix for camera-initialization failures, which keep the session Idle.
pub const CAMERA_ERROR_PREFIX: &str = "Camera access is required. ";

/// Prefix for failures inside a cycle, which do not stop the session.
pub const PROCESSING_ERROR_PREFIX: &str = "Processing error: ";

/// Shown when a cycle succeeds but the endpoint found no text.
pub const NO_TEXT_PLACEHOLDER: &str = "No text detected yet...";

/// Tuning knobs for the poll loop.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    poll_delay: Duration,
    jpeg_quality: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_delay: Duration::from_millis(900),
            jpeg_quality: 80,
        }
    }
}

impl SessionConfig {
    /// Set the fixed wait between the end of one cycle and the start of the
    /// next.
    pub fn with_poll_delay(mut self, poll_delay: Duration) -> Self {
        self.poll_delay = poll_delay;
        self
    }

    /// Set the JPEG quality factor (1-100) used when encoding frames.
    pub fn with_jpeg_quality(mut self, jpeg_quality: u8) -> Self {
        self.jpeg_quality = jpeg_quality;
        self
    }

    pub fn poll_delay(&self) -> Duration {
        self.poll_delay
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

/// The session task is gone and can no longer be controlled.
#[derive(Debug)]
pub struct SessionClosed;

impl fmt::Display for SessionClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session task is no longer running")
    }
}

impl std::error::Error for SessionClosed {}

#[derive(Debug)]
enum Command {
    Toggle,
    Shutdown,
}

/// What woke the loop while Running.
enum Wakeup {
    Command(Option<Command>),
    CycleDue,
}

/// Control surface handed to the UI.
///
/// Toggles are queued to the session task and applied one at a time, in
/// order; a toggle sent before the previous one settled simply observes the
/// settled state when its turn comes. The current phase is published on a
/// watch channel.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    phase: watch::Receiver<Phase>,
}

impl SessionHandle {
    /// Flip between Idle and Running.
    pub async fn toggle(&self) -> Result<(), SessionClosed> {
        self.commands
            .send(Command::Toggle)
            .await
            .map_err(|_| SessionClosed)
    }

    /// End the session task. An in-flight cycle still completes first.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    /// Latest published phase.
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Label for the start/stop control, per the latest phase.
    pub fn label(&self) -> &'static str {
        self.phase().label()
    }

    /// Wait for the phase to change and return the new value.
    pub async fn phase_changed(&mut self) -> Result<Phase, SessionClosed> {
        self.phase.changed().await.map_err(|_| SessionClosed)?;
        Ok(*self.phase.borrow())
    }
}

/// One capture-and-dispatch session.
///
/// The session task exclusively owns the camera handle, the processor, the
/// overlay, and the phase; control arrives over the command channel. That
/// makes the poll loop the only scheduler of cycles, so exactly one polling
/// chain can exist and cycles are strictly serialized.
///
/// Stopping is advisory: it flips the phase, and a cycle already underway
/// runs to completion (network round trip included) and renders its outcome
/// before the loop observes Idle.
pub struct Session<A, S, P, O> {
    acquire: A,
    source: Option<S>,
    processor: P,
    overlay: O,
    config: SessionConfig,
    phase: Phase,
    commands: mpsc::Receiver<Command>,
    phase_tx: watch::Sender<Phase>,
    deadline: Instant,
}

impl<A, S, P, O> Session<A, S, P, O>
where
    A: FnMut() -> Result<S, CameraError>,
    S: FrameSource,
    P: Processor,
    O: Overlay,
{
    /// Create a session and its control handle.
    ///
    /// `acquire` is invoked at most once, on the first Idle-to-Running
    /// toggle; the handle it yields is reused for every later cycle.
    pub fn new(acquire: A, processor: P, overlay: O, config: SessionConfig) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(8);
        let (phase_tx, phase_rx) = watch::channel(Phase::Idle);

        let session = Self {
            acquire,
            source: None,
            processor,
            overlay,
            config,
            phase: Phase::Idle,
            commands: command_rx,
            phase_tx,
            deadline: Instant::now(),
        };
        let handle = SessionHandle {
            commands: command_tx,
            phase: phase_rx,
        };

        (session, handle)
    }

    /// Drive the session until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        loop {
            match self.phase {
                Phase::Idle => match self.commands.recv().await {
                    Some(Command::Toggle) => self.handle_toggle().await,
                    Some(Command::Shutdown) | None => break,
                },
                Phase::Running => {
                    // Biased: a stop queued during the delay must win over
                    // an expired timer, so the next cycle is never armed
                    // past a stop request.
                    let wakeup = tokio::select! {
                        biased;
                        command = self.commands.recv() => Wakeup::Command(command),
                        _ = time::sleep_until(self.deadline) => Wakeup::CycleDue,
                    };

                    match wakeup {
                        Wakeup::Command(Some(Command::Toggle)) => self.handle_toggle().await,
                        Wakeup::Command(Some(Command::Shutdown) | None) => break,
                        Wakeup::CycleDue => {
                            self.cycle().await;
                            self.arm_next_cycle();
                        }
                    }
                }
            }
        }

        self.set_phase(Phase::Idle);
        self.release();
    }

    async fn handle_toggle(&mut self) {
        match self.phase {
            Phase::Running => {
                log::info!("stop requested");
                self.set_phase(Phase::Idle);
            }
            Phase::Idle => {
                if self.source.is_none() {
                    match (self.acquire)() {
                        Ok(source) => {
                            log::info!("camera acquired");
                            self.source = Some(source);
                        }
                        Err(err) => {
                            log::warn!("camera acquisition failed: {err}");
                            self.overlay
                                .render_error(&format!("{CAMERA_ERROR_PREFIX}{err}"));
                            return;
                        }
                    }
                }

                self.set_phase(Phase::Running);
                // The first cycle runs immediately; the delay applies
                // between cycles, not before them.
                self.cycle().await;
                self.arm_next_cycle();
            }
        }
    }

    async fn cycle(&mut self) {
        match self.run_cycle().await {
            Ok(Some(text)) => self.overlay.render(&text),
            Ok(None) => self.overlay.render(NO_TEXT_PLACEHOLDER),
            Err(err) => {
                log::warn!("cycle failed: {err}");
                self.overlay
                    .render_error(&format!("{PROCESSING_ERROR_PREFIX}{err}"));
            }
        }
    }

    async fn run_cycle(&mut self) -> Result<Option<String>, CycleError> {
        let source = match self.source.as_mut() {
            Some(source) => source,
            // Running is only entered after acquisition, so a missing handle
            // means the device went away underneath us.
            None => {
                return Err(CycleError::Capture(CameraError::DeviceUnavailable(
                    "no acquired camera handle".to_string(),
                )));
            }
        };

        let frame = source.current_frame().await?;
        let payload = encode_jpeg(&frame, self.config.jpeg_quality())?;
        let processed = self.processor.submit(payload).await?;

        Ok(processed.text)
    }

    fn arm_next_cycle(&mut self) {
        self.deadline = Instant::now() + self.config.poll_delay();
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!("session phase: {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
        self.phase_tx.send_if_modified(|current| {
            if *current == phase {
                false
            } else {
                *current = phase;
                true
            }
        });
    }

    /// Safe to call whether or not acquisition ever happened.
    fn release(&mut self) {
        if self.source.take().is_some() {
            log::info!("camera released");
        }
    }
}
