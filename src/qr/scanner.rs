//! Camera scan controller
//!
//! Owns the camera while a session is live and runs one rate-limited decode
//! loop per session. States: `Idle -> Scanning -> Idle`, where the way back is
//! either `stop()` or the first successful decode.

use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::AppError;
use crate::models::ScanResult;
use crate::qr::camera::{CameraDevice, CameraStream};
use crate::qr::decoder::{decode_image_bytes, FrameDecoder};

type SharedStream = Arc<Mutex<Option<Box<dyn CameraStream>>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Scanning,
}

/// Reported by the decode loop, tagged with the session that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    Detected { session: u64, text: String },
    Lost { session: u64, reason: String },
}

impl LoopEvent {
    fn session(&self) -> u64 {
        match self {
            LoopEvent::Detected { session, .. } | LoopEvent::Lost { session, .. } => *session,
        }
    }
}

struct ScanSession {
    id: u64,
    stream: SharedStream,
    /// Set on stop; a frame grab still in flight releases the stream itself
    stopped: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

pub struct ScanController {
    camera: Box<dyn CameraDevice>,
    decoder: Arc<dyn FrameDecoder>,
    interval: Duration,
    event_tx: mpsc::UnboundedSender<LoopEvent>,
    session: Option<ScanSession>,
    next_session: u64,
    has_flash: bool,
    flash_on: bool,
}

impl ScanController {
    /// Returns the controller and the receiver its decode loops report to
    pub fn new(
        camera: Box<dyn CameraDevice>,
        decoder: Arc<dyn FrameDecoder>,
        interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<LoopEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let controller = ScanController {
            camera,
            decoder,
            interval,
            event_tx,
            session: None,
            next_session: 1,
            has_flash: false,
            flash_on: false,
        };
        (controller, event_rx)
    }

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Scanning
        } else {
            SessionState::Idle
        }
    }

    pub fn has_flash(&self) -> bool {
        self.has_flash
    }

    pub fn flash_on(&self) -> bool {
        self.flash_on
    }

    /// Acquire the camera and start the decode loop.
    ///
    /// Returns `Ok(false)` without touching anything when already scanning.
    /// On failure the controller stays idle. Must run inside a tokio runtime.
    pub fn start(&mut self) -> Result<bool, AppError> {
        if self.session.is_some() {
            tracing::debug!("Start ignored, already scanning");
            return Ok(false);
        }

        let stream = self.camera.open()?;
        let has_flash = stream.has_flash();

        let id = self.next_session;
        self.next_session += 1;

        let stream: SharedStream = Arc::new(Mutex::new(Some(stream)));
        let stopped = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(decode_loop(
            id,
            stream.clone(),
            stopped.clone(),
            self.decoder.clone(),
            self.interval,
            self.event_tx.clone(),
        ));

        self.session = Some(ScanSession {
            id,
            stream,
            stopped,
            task,
        });
        self.has_flash = has_flash;
        self.flash_on = false;
        tracing::info!(session = id, has_flash, "Scanning started");
        Ok(true)
    }

    /// Halt the loop and release the camera. No-op when idle.
    ///
    /// Never waits on the camera: if a frame grab is in flight, the stream is
    /// released by the grab as soon as it returns and yields no more frames.
    pub fn stop(&mut self) {
        self.flash_on = false;
        let Some(session) = self.session.take() else {
            return;
        };

        session.stopped.store(true, Ordering::SeqCst);
        session.task.abort();
        let taken = match session.stream.try_lock() {
            Ok(mut guard) => guard.take(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().take(),
            Err(TryLockError::WouldBlock) => {
                tracing::debug!(session = session.id, "Frame grab in flight, deferring release");
                None
            }
        };
        if let Some(mut stream) = taken {
            stream.release();
        }
        self.has_flash = false;
        tracing::info!(session = session.id, "Scanning stopped");
    }

    /// Flip the torch. Ignored unless scanning on a device with a flash.
    pub fn toggle_flash(&mut self) -> Result<bool, AppError> {
        let Some(session) = &self.session else {
            return Ok(self.flash_on);
        };
        if !self.has_flash {
            return Ok(self.flash_on);
        }

        let wanted = !self.flash_on;
        {
            let mut guard = session
                .stream
                .lock()
                .map_err(|_| AppError::FlashControl("camera stream unavailable".to_string()))?;
            let stream = guard
                .as_mut()
                .ok_or_else(|| AppError::FlashControl("camera stream released".to_string()))?;
            stream.set_flash(wanted).map_err(|e| match e {
                AppError::FlashControl(_) => e,
                other => AppError::FlashControl(other.to_string()),
            })?;
        }

        self.flash_on = wanted;
        Ok(self.flash_on)
    }

    /// Read and decode an image file; independent of any live session.
    ///
    /// The returned future owns what it needs, so it can run on its own task.
    pub fn scan_image_file(
        &self,
        path: PathBuf,
    ) -> impl Future<Output = Result<ScanResult, AppError>> + Send + 'static {
        let decoder = self.decoder.clone();
        async move {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| AppError::Decode(format!("{}: {}", path.display(), e)))?;
            scan_static_image(decoder, bytes).await
        }
    }

    /// Handle a report from a decode loop.
    ///
    /// A detection from the live session ends it and yields the result.
    /// Reports from sessions that are already over are dropped.
    pub fn on_loop_event(&mut self, event: LoopEvent) -> Option<Result<ScanResult, AppError>> {
        let current = self.session.as_ref().map(|s| s.id);
        if current != Some(event.session()) {
            tracing::debug!(session = event.session(), ?current, "Dropping stale scan event");
            return None;
        }

        self.stop();
        match event {
            LoopEvent::Detected { text, .. } => Some(Ok(ScanResult::new(text))),
            LoopEvent::Lost { reason, .. } => Some(Err(AppError::CameraAccess(reason))),
        }
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Decode a still image given as encoded bytes, off the async workers
pub async fn scan_static_image(
    decoder: Arc<dyn FrameDecoder>,
    bytes: Vec<u8>,
) -> Result<ScanResult, AppError> {
    let text = tokio::task::spawn_blocking(move || decode_image_bytes(decoder.as_ref(), &bytes))
        .await
        .map_err(|e| AppError::Decode(format!("decoder task failed: {}", e)))??;
    tracing::info!(len = text.len(), "QR code decoded from image");
    Ok(ScanResult::new(text))
}

enum FrameStep {
    Nothing,
    Detected(String),
    Lost(AppError),
    Stopped,
}

fn release_shared(stream: &SharedStream) {
    let taken = match stream.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    if let Some(mut s) = taken {
        s.release();
    }
}

/// One grab + decode; runs on the blocking pool
fn grab_and_decode(
    stream: &SharedStream,
    stopped: &AtomicBool,
    decoder: &dyn FrameDecoder,
) -> FrameStep {
    let grabbed = {
        let Ok(mut guard) = stream.lock() else {
            return FrameStep::Stopped;
        };
        match guard.as_mut() {
            Some(s) => s.grab_frame(),
            None => return FrameStep::Stopped,
        }
    };

    // `stop()` may have found the stream locked by this grab
    if stopped.load(Ordering::SeqCst) {
        release_shared(stream);
        return FrameStep::Stopped;
    }

    match grabbed {
        Ok(Some(frame)) => match decoder.decode(&frame) {
            Some(text) => FrameStep::Detected(text),
            None => FrameStep::Nothing,
        },
        Ok(None) => FrameStep::Nothing,
        Err(e) => FrameStep::Lost(e),
    }
}

async fn decode_loop(
    session: u64,
    stream: SharedStream,
    stopped: Arc<AtomicBool>,
    decoder: Arc<dyn FrameDecoder>,
    interval: Duration,
    event_tx: mpsc::UnboundedSender<LoopEvent>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let (stream, stopped, decoder) = (stream.clone(), stopped.clone(), decoder.clone());
        let step = tokio::task::spawn_blocking(move || {
            grab_and_decode(&stream, &stopped, decoder.as_ref())
        })
        .await
        .unwrap_or(FrameStep::Stopped);

        match step {
            FrameStep::Nothing => continue,
            FrameStep::Stopped => break,
            FrameStep::Detected(text) => {
                tracing::info!(session, len = text.len(), "QR code detected");
                let _ = event_tx.send(LoopEvent::Detected { session, text });
                break;
            }
            FrameStep::Lost(e) => {
                tracing::warn!(session, error = %e, "Camera feed lost");
                let _ = event_tx.send(LoopEvent::Lost {
                    session,
                    reason: e.to_string(),
                });
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QrSize;
    use crate::qr::decoder::GridDecoder;
    use crate::qr::encoder::{EncodeOptions, MatrixEncoder, QrEncoder};
    use image::{GrayImage, Luma};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default, Clone)]
    struct Counters {
        opens: Arc<AtomicUsize>,
        releases: Arc<AtomicUsize>,
        flash_fails: Arc<AtomicBool>,
    }

    struct FakeCamera {
        counters: Counters,
        available: bool,
        flash: bool,
    }

    struct FakeStream {
        counters: Counters,
        flash: bool,
    }

    impl CameraDevice for FakeCamera {
        fn open(&mut self) -> Result<Box<dyn CameraStream>, AppError> {
            if !self.available {
                return Err(AppError::CameraAccess("permission denied".into()));
            }
            self.counters.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                counters: self.counters.clone(),
                flash: self.flash,
            }))
        }
    }

    impl CameraStream for FakeStream {
        fn grab_frame(&mut self) -> Result<Option<GrayImage>, AppError> {
            Ok(Some(GrayImage::from_pixel(4, 4, Luma([0]))))
        }

        fn has_flash(&self) -> bool {
            self.flash
        }

        fn set_flash(&mut self, _on: bool) -> Result<(), AppError> {
            if self.counters.flash_fails.load(Ordering::SeqCst) {
                Err(AppError::FlashControl("torch busy".into()))
            } else {
                Ok(())
            }
        }

        fn release(&mut self) {
            self.counters.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Never finds anything
    struct BlindDecoder;

    impl FrameDecoder for BlindDecoder {
        fn decode(&self, _frame: &GrayImage) -> Option<String> {
            None
        }
    }

    /// Finds the same text in every frame
    struct FixedDecoder(&'static str);

    impl FrameDecoder for FixedDecoder {
        fn decode(&self, _frame: &GrayImage) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn controller(
        counters: &Counters,
        flash: bool,
        decoder: Arc<dyn FrameDecoder>,
    ) -> (ScanController, mpsc::UnboundedReceiver<LoopEvent>) {
        let camera = FakeCamera {
            counters: counters.clone(),
            available: true,
            flash,
        };
        ScanController::new(Box::new(camera), decoder, Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_start_twice_opens_camera_once() {
        let counters = Counters::default();
        let (mut ctl, _rx) = controller(&counters, false, Arc::new(BlindDecoder));

        assert!(ctl.start().unwrap());
        assert!(!ctl.start().unwrap());
        assert_eq!(ctl.state(), SessionState::Scanning);
        assert_eq!(counters.opens.load(Ordering::SeqCst), 1);

        ctl.stop();
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_start_stays_idle() {
        let counters = Counters::default();
        let camera = FakeCamera {
            counters: counters.clone(),
            available: false,
            flash: true,
        };
        let (mut ctl, _rx) =
            ScanController::new(Box::new(camera), Arc::new(BlindDecoder), Duration::from_millis(5));

        assert!(matches!(ctl.start(), Err(AppError::CameraAccess(_))));
        assert_eq!(ctl.state(), SessionState::Idle);
        assert!(!ctl.has_flash());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_releases_immediately() {
        let counters = Counters::default();
        let (mut ctl, _rx) = controller(&counters, true, Arc::new(BlindDecoder));

        ctl.stop();
        assert_eq!(counters.releases.load(Ordering::SeqCst), 0);

        ctl.start().unwrap();
        ctl.toggle_flash().unwrap();
        assert!(ctl.flash_on());

        ctl.stop();
        ctl.stop();
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
        assert!(!ctl.flash_on());
        assert_eq!(ctl.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_detection_auto_stops_session() {
        let counters = Counters::default();
        let (mut ctl, mut rx) = controller(&counters, false, Arc::new(FixedDecoder("hello")));
        ctl.start().unwrap();

        let event = rx.recv().await.unwrap();
        let result = ctl.on_loop_event(event).unwrap().unwrap();

        assert_eq!(result.text, "hello");
        assert_eq!(ctl.state(), SessionState::Idle);
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_detection_is_dropped() {
        let counters = Counters::default();
        let (mut ctl, _rx) = controller(&counters, false, Arc::new(BlindDecoder));
        ctl.start().unwrap();
        ctl.stop();
        ctl.start().unwrap();

        let stale = LoopEvent::Detected {
            session: 1,
            text: "old".into(),
        };
        assert!(ctl.on_loop_event(stale).is_none());
        assert_eq!(ctl.state(), SessionState::Scanning);
    }

    #[tokio::test]
    async fn test_flash_requires_support() {
        let counters = Counters::default();
        let (mut ctl, _rx) = controller(&counters, false, Arc::new(BlindDecoder));

        // Idle: nothing happens
        assert!(!ctl.toggle_flash().unwrap());

        ctl.start().unwrap();
        assert!(!ctl.has_flash());
        assert!(!ctl.toggle_flash().unwrap());
    }

    #[tokio::test]
    async fn test_flash_failure_keeps_scanning() {
        let counters = Counters::default();
        let (mut ctl, _rx) = controller(&counters, true, Arc::new(BlindDecoder));
        ctl.start().unwrap();
        counters.flash_fails.store(true, Ordering::SeqCst);

        assert!(matches!(ctl.toggle_flash(), Err(AppError::FlashControl(_))));
        assert_eq!(ctl.state(), SessionState::Scanning);
        assert!(!ctl.flash_on());
    }

    #[tokio::test]
    async fn test_lost_feed_ends_session_with_error() {
        let counters = Counters::default();
        let (mut ctl, _rx) = controller(&counters, false, Arc::new(BlindDecoder));
        ctl.start().unwrap();

        let lost = LoopEvent::Lost {
            session: 1,
            reason: "unplugged".into(),
        };
        let outcome = ctl.on_loop_event(lost).unwrap();
        assert!(matches!(outcome, Err(AppError::CameraAccess(_))));
        assert_eq!(ctl.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_static_image_without_session() {
        let counters = Counters::default();
        let (ctl, _rx) = controller(&counters, false, Arc::new(GridDecoder));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code.png");
        MatrixEncoder
            .encode("https://example.com", &EncodeOptions::with_size(QrSize::Px300))
            .unwrap()
            .save_png(&path)
            .unwrap();

        let result = ctl.scan_image_file(path).await.unwrap();
        assert_eq!(result.text, "https://example.com");
        assert_eq!(ctl.state(), SessionState::Idle);
        assert_eq!(counters.opens.load(Ordering::SeqCst), 0);

        let missing = ctl.scan_image_file(dir.path().join("missing.png")).await;
        assert!(matches!(missing, Err(AppError::Decode(_))));
    }

    /// Camera whose every grab takes a while
    struct SlowCamera(Counters);

    struct SlowStream(Counters);

    impl CameraDevice for SlowCamera {
        fn open(&mut self) -> Result<Box<dyn CameraStream>, AppError> {
            self.0.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(SlowStream(self.0.clone())))
        }
    }

    impl CameraStream for SlowStream {
        fn grab_frame(&mut self) -> Result<Option<GrayImage>, AppError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(Some(GrayImage::from_pixel(4, 4, Luma([0]))))
        }

        fn has_flash(&self) -> bool {
            false
        }

        fn set_flash(&mut self, _on: bool) -> Result<(), AppError> {
            Ok(())
        }

        fn release(&mut self) {
            self.0.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_stop_does_not_wait_for_slow_frame() {
        let counters = Counters::default();
        let (mut ctl, mut rx) = ScanController::new(
            Box::new(SlowCamera(counters.clone())),
            Arc::new(FixedDecoder("late")),
            Duration::from_millis(5),
        );
        ctl.start().unwrap();

        // Let the first grab get going
        tokio::time::sleep(Duration::from_millis(50)).await;
        let started = std::time::Instant::now();
        ctl.stop();
        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(ctl.state(), SessionState::Idle);

        // The in-flight grab hands the stream back once it returns
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
        assert!(rx.try_recv().is_err());
    }
}
