use lexi_base::Frame;
use lexi_camera::{CameraError, FrameSource};
use lexi_client::{ClientError, Processed, Processor};
use lexi_image::EncodedFrame;
use lexi_session::{
    CAMERA_ERROR_PREFIX, NO_TEXT_PLACEHOLDER, Overlay, PROCESSING_ERROR_PREFIX, Phase, Session,
    SessionConfig,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Camera stand-in that always serves a tiny valid frame.
struct StubSource {
    captures: Arc<AtomicUsize>,
}

impl FrameSource for StubSource {
    async fn current_frame(&mut self) -> Result<Frame, CameraError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        Frame::new(2, 2, vec![0x40; 12]).map_err(|err| CameraError::Stream(err.to_string()))
    }
}

fn working_acquire(
    captures: Arc<AtomicUsize>,
    acquisitions: Arc<AtomicUsize>,
) -> impl FnMut() -> Result<StubSource, CameraError> {
    move || {
        acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(StubSource {
            captures: captures.clone(),
        })
    }
}

/// Camera stand-in whose frames cannot be encoded.
struct ZeroDimensionSource;

impl FrameSource for ZeroDimensionSource {
    async fn current_frame(&mut self) -> Result<Frame, CameraError> {
        Frame::new(0, 0, vec![]).map_err(|err| CameraError::Stream(err.to_string()))
    }
}

#[derive(Clone)]
enum Script {
    Text(&'static str),
    NoText,
    NetworkFailure,
}

/// Endpoint stand-in. Panics if two submissions ever overlap; the panic
/// surfaces through the session task's join handle.
#[derive(Clone)]
struct StubProcessor {
    script: Script,
    delay: Duration,
    started: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
    in_flight: Arc<AtomicBool>,
}

impl StubProcessor {
    fn new(script: Script) -> Self {
        Self::with_delay(script, Duration::ZERO)
    }

    fn with_delay(script: Script, delay: Duration) -> Self {
        Self {
            script,
            delay,
            started: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl Processor for StubProcessor {
    async fn submit(&self, _payload: EncodedFrame) -> Result<Processed, ClientError> {
        assert!(
            !self.in_flight.swap(true, Ordering::SeqCst),
            "two submissions in flight at once"
        );
        self.started.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.completed.fetch_add(1, Ordering::SeqCst);
        self.in_flight.store(false, Ordering::SeqCst);

        match &self.script {
            Script::Text(text) => Ok(Processed {
                text: Some(text.to_string()),
            }),
            Script::NoText => Ok(Processed { text: None }),
            Script::NetworkFailure => Err(ClientError::Network("connection reset".to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Shown {
    Text(String),
    Error(String),
}

#[derive(Clone, Default)]
struct RecordingOverlay {
    shown: Arc<Mutex<Vec<Shown>>>,
}

impl RecordingOverlay {
    fn snapshot(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }

    fn has_error_with_prefix(&self, prefix: &str) -> bool {
        self.snapshot()
            .iter()
            .any(|shown| matches!(shown, Shown::Error(msg) if msg.starts_with(prefix)))
    }
}

impl Overlay for RecordingOverlay {
    fn render(&mut self, text: &str) {
        self.shown.lock().unwrap().push(Shown::Text(text.to_string()));
    }

    fn render_error(&mut self, message: &str) {
        self.shown
            .lock()
            .unwrap()
            .push(Shown::Error(message.to_string()));
    }
}

fn fast_config() -> SessionConfig {
    SessionConfig::default().with_poll_delay(Duration::from_millis(30))
}

async fn wait_until(what: &str, mut check: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if check() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {what}");
}

#[tokio::test]
async fn test_transformed_text_is_rendered() {
    let overlay = RecordingOverlay::default();
    let processor = StubProcessor::new(Script::Text("HELLO"));
    let (session, handle) = Session::new(
        working_acquire(Arc::default(), Arc::default()),
        processor.clone(),
        overlay.clone(),
        fast_config(),
    );
    let worker = tokio::spawn(session.run());

    handle.toggle().await.unwrap();
    wait_until("text render", || {
        overlay.snapshot().contains(&Shown::Text("HELLO".to_string()))
    })
    .await;

    handle.shutdown().await;
    worker.await.unwrap();
}

#[tokio::test]
async fn test_absent_text_renders_placeholder() {
    let overlay = RecordingOverlay::default();
    let processor = StubProcessor::new(Script::NoText);
    let (session, handle) = Session::new(
        working_acquire(Arc::default(), Arc::default()),
        processor.clone(),
        overlay.clone(),
        fast_config(),
    );
    let worker = tokio::spawn(session.run());

    handle.toggle().await.unwrap();
    wait_until("placeholder render", || {
        overlay
            .snapshot()
            .contains(&Shown::Text(NO_TEXT_PLACEHOLDER.to_string()))
    })
    .await;

    handle.shutdown().await;
    worker.await.unwrap();
}

#[tokio::test]
async fn test_network_failure_renders_processing_error() {
    let overlay = RecordingOverlay::default();
    let processor = StubProcessor::new(Script::NetworkFailure);
    let (session, handle) = Session::new(
        working_acquire(Arc::default(), Arc::default()),
        processor.clone(),
        overlay.clone(),
        fast_config(),
    );
    let worker = tokio::spawn(session.run());

    handle.toggle().await.unwrap();
    wait_until("processing error render", || {
        overlay.has_error_with_prefix(PROCESSING_ERROR_PREFIX)
    })
    .await;

    // A failed cycle is not fatal; the session keeps polling.
    wait_until("further attempts", || processor.completed() >= 2).await;
    assert_eq!(handle.phase(), Phase::Running);

    handle.shutdown().await;
    worker.await.unwrap();
}

#[tokio::test]
async fn test_denied_camera_keeps_session_idle() {
    let overlay = RecordingOverlay::default();
    let processor = StubProcessor::new(Script::Text("NEVER"));
    let acquire = || -> Result<StubSource, CameraError> {
        Err(CameraError::PermissionDenied("denied by platform".to_string()))
    };
    let (session, handle) = Session::new(acquire, processor.clone(), overlay.clone(), fast_config());
    let worker = tokio::spawn(session.run());

    handle.toggle().await.unwrap();
    wait_until("camera error render", || {
        overlay.has_error_with_prefix(CAMERA_ERROR_PREFIX)
    })
    .await;

    assert_eq!(handle.phase(), Phase::Idle, "Running must never be entered");
    assert_eq!(processor.started(), 0, "no cycle without a camera");

    handle.shutdown().await;
    worker.await.unwrap();
}

#[tokio::test]
async fn test_stop_lets_in_flight_cycle_finish() {
    let overlay = RecordingOverlay::default();
    let processor = StubProcessor::with_delay(Script::Text("SLOW"), Duration::from_millis(150));
    let (session, handle) = Session::new(
        working_acquire(Arc::default(), Arc::default()),
        processor.clone(),
        overlay.clone(),
        fast_config(),
    );
    let worker = tokio::spawn(session.run());

    handle.toggle().await.unwrap();
    wait_until("submission in flight", || processor.started() == 1).await;

    // Stop while the round trip is still out.
    handle.toggle().await.unwrap();

    wait_until("in-flight cycle completes", || processor.completed() == 1).await;
    wait_until("outcome still rendered", || {
        overlay.snapshot().contains(&Shown::Text("SLOW".to_string()))
    })
    .await;
    wait_until("session idles", || handle.phase() == Phase::Idle).await;

    // Long enough for several would-be cycles.
    sleep(Duration::from_millis(200)).await;
    assert_eq!(processor.started(), 1, "no cycle scheduled past the stop");

    handle.shutdown().await;
    worker.await.unwrap();
}

#[tokio::test]
async fn test_camera_acquired_once_across_restarts() {
    let overlay = RecordingOverlay::default();
    let processor = StubProcessor::new(Script::Text("AGAIN"));
    let acquisitions = Arc::new(AtomicUsize::new(0));
    let (session, handle) = Session::new(
        working_acquire(Arc::default(), acquisitions.clone()),
        processor.clone(),
        overlay.clone(),
        fast_config(),
    );
    let worker = tokio::spawn(session.run());

    handle.toggle().await.unwrap();
    wait_until("cycles underway", || processor.completed() >= 2).await;

    handle.toggle().await.unwrap();
    wait_until("session idles", || handle.phase() == Phase::Idle).await;
    let completed_while_stopped = processor.completed();

    handle.toggle().await.unwrap();
    wait_until("polling resumes", || {
        processor.completed() > completed_while_stopped + 1
    })
    .await;

    assert_eq!(acquisitions.load(Ordering::SeqCst), 1, "handle is reused");

    handle.shutdown().await;
    worker.await.unwrap();
}

#[tokio::test]
async fn test_rapid_toggles_never_run_two_chains() {
    let overlay = RecordingOverlay::default();
    let processor = StubProcessor::with_delay(Script::Text("OK"), Duration::from_millis(20));
    let (session, handle) = Session::new(
        working_acquire(Arc::default(), Arc::default()),
        processor.clone(),
        overlay.clone(),
        fast_config(),
    );
    let worker = tokio::spawn(session.run());

    // Odd count: the net effect is Running.
    for _ in 0..5 {
        handle.toggle().await.unwrap();
    }

    wait_until("settles Running", || handle.phase() == Phase::Running).await;
    wait_until("cycles underway", || processor.completed() >= 2).await;

    handle.shutdown().await;
    // Overlapping submissions would have panicked the session task.
    worker.await.unwrap();
}

#[tokio::test]
async fn test_unencodable_frame_renders_processing_error() {
    let overlay = RecordingOverlay::default();
    let processor = StubProcessor::new(Script::Text("NEVER"));
    let acquire = || -> Result<ZeroDimensionSource, CameraError> { Ok(ZeroDimensionSource) };
    let (session, handle) = Session::new(acquire, processor.clone(), overlay.clone(), fast_config());
    let worker = tokio::spawn(session.run());

    handle.toggle().await.unwrap();
    wait_until("encode error render", || {
        overlay.snapshot().iter().any(|shown| {
            matches!(shown, Shown::Error(msg)
                if msg.starts_with(PROCESSING_ERROR_PREFIX) && msg.contains("encoding"))
        })
    })
    .await;

    assert_eq!(processor.started(), 0, "nothing was submitted");

    handle.shutdown().await;
    worker.await.unwrap();
}

#[tokio::test]
async fn test_labels_follow_phase() {
    let overlay = RecordingOverlay::default();
    let processor = StubProcessor::new(Script::NoText);
    let (session, mut handle) = Session::new(
        working_acquire(Arc::default(), Arc::default()),
        processor.clone(),
        overlay.clone(),
        fast_config(),
    );
    let worker = tokio::spawn(session.run());

    assert_eq!(handle.label(), "Start Analysis");

    handle.toggle().await.unwrap();
    assert_eq!(handle.phase_changed().await.unwrap(), Phase::Running);
    assert_eq!(handle.label(), "Stop Analysis");

    handle.toggle().await.unwrap();
    assert_eq!(handle.phase_changed().await.unwrap(), Phase::Idle);
    assert_eq!(handle.label(), "Start Analysis");

    handle.shutdown().await;
    worker.await.unwrap();
}
