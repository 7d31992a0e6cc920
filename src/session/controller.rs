//! Scanner controller
//!
//! Wires the start/stop buttons and the session events to [`ScannerState`].
//! At most one session runs at a time: starting stops the previous one, and
//! events tagged with any other session id are dropped.
//!
//! Camera work blocks (device enumeration, pipeline start-up, releasing a
//! pipeline), so the controller never does it on the caller's thread. It
//! queues [`Work`] items; the caller runs each one with [`run_work`] on a
//! blocking thread and hands the [`Done`] result back to
//! [`Scanner::complete`].

use crossbeam_channel::Sender;
use std::fmt;
use std::sync::{Arc, Mutex};

use super::state::ScannerState;
use crate::camera::{CameraDevice, CameraTarget};
use crate::capture::ScannedCode;
use crate::config::ScanOptions;
use crate::error::ScanError;
use crate::scanner::{CameraBackend, ScanEvent, ScanEventKind, ScanHandle, ScanRequest, SessionId};

/// Blocking camera work queued by the controller
pub enum Work<S> {
    /// Probe the media layer and list the cameras
    CheckCameras,
    /// Release `prior`, re-check the cameras and the decoder, then open `session`
    Start {
        session: SessionId,
        prior: Option<S>,
        options: ScanOptions,
        preferred: Option<String>,
    },
    /// Release a session's camera
    Release(S),
}

impl<S> Work<S> {
    /// Result to report when the work never finishes
    pub fn lost(&self, reason: &str) -> Done<S> {
        match self {
            Work::CheckCameras => Done::Checked(Err(ScanError::CameraCheck(reason.to_string()))),
            Work::Start { session, .. } => Done::Started {
                session: *session,
                cameras: None,
                opened: Err(ScanError::StartFailed(reason.to_string())),
            },
            Work::Release(_) => Done::Released(Err(ScanError::StopFailed(reason.to_string()))),
        }
    }
}

/// Outcome of a [`Work`] item
pub enum Done<S> {
    Checked(Result<Vec<CameraDevice>, ScanError>),
    Started {
        session: SessionId,
        /// Cameras found while starting, if enumeration got that far
        cameras: Option<Vec<CameraDevice>>,
        opened: Result<S, ScanError>,
    },
    Released(Result<(), ScanError>),
}

/// Run one work item; blocks on the camera
pub fn run_work<B: CameraBackend>(
    backend: &B,
    work: Work<B::Session>,
    events: &Sender<ScanEvent>,
) -> Done<B::Session> {
    match work {
        Work::CheckCameras => Done::Checked(list_cameras(backend)),
        Work::Start {
            session,
            prior,
            options,
            preferred,
        } => {
            let mut cameras = None;
            let opened = open_session(
                backend,
                session,
                prior,
                options,
                preferred,
                events,
                &mut cameras,
            );
            Done::Started {
                session,
                cameras,
                opened,
            }
        }
        Work::Release(mut session) => {
            log::debug!("Releasing session {}", session.id());
            Done::Released(session.stop())
        }
    }
}

fn list_cameras<B: CameraBackend>(backend: &B) -> Result<Vec<CameraDevice>, ScanError> {
    backend.probe()?;
    backend.enumerate()
}

fn open_session<B: CameraBackend>(
    backend: &B,
    session: SessionId,
    prior: Option<B::Session>,
    options: ScanOptions,
    preferred: Option<String>,
    events: &Sender<ScanEvent>,
    cameras: &mut Option<Vec<CameraDevice>>,
) -> Result<B::Session, ScanError> {
    // Never two sessions on the camera at once
    if let Some(mut prior) = prior {
        prior.stop()?;
    }

    let found = list_cameras(backend)?;
    let camera = CameraTarget::choose(&found, preferred.as_deref());
    let empty = found.is_empty();
    *cameras = Some(found);
    if empty {
        return Err(ScanError::NoCameras);
    }

    if !backend.decoder_available(options.decoder) {
        return Err(ScanError::DecoderUnavailable(options.decoder.library_name()));
    }

    let request = ScanRequest {
        session,
        camera,
        options,
    };
    backend.open(request, events.clone())
}

/// Moves a value through the message queue, whose messages must be `Clone`
///
/// The first `take` gets the value; clones share it.
pub struct Handoff<T>(Arc<Mutex<Option<T>>>);

impl<T> Handoff<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(Mutex::new(Some(value))))
    }

    pub fn take(&self) -> Option<T> {
        self.0.lock().ok()?.take()
    }
}

impl<T> Clone for Handoff<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> fmt::Debug for Handoff<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handoff(..)")
    }
}

pub struct Scanner<B: CameraBackend> {
    backend: B,
    state: ScannerState,
    options: ScanOptions,
    session: Option<B::Session>,
    /// Session a queued or running start is opening
    pending: Option<SessionId>,
    last_session: u64,
    work: Vec<Work<B::Session>>,
}

impl<B: CameraBackend> Scanner<B> {
    pub fn new(backend: B, options: ScanOptions) -> Self {
        Self {
            backend,
            state: ScannerState::default(),
            options,
            session: None,
            pending: None,
            last_session: 0,
            work: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Replace the options; a running session keeps the ones it started with
    pub fn set_options(&mut self, options: ScanOptions) {
        self.options = options;
    }

    /// Id of the running session, if any
    pub fn active_session(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id())
    }

    /// Work queued since the last call
    pub fn take_work(&mut self) -> Vec<Work<B::Session>> {
        std::mem::take(&mut self.work)
    }

    /// Re-enumerate the cameras
    pub fn check_cameras(&mut self) {
        self.work.push(Work::CheckCameras);
    }

    /// Start a new scan session, stopping the running one first
    pub fn start(&mut self) {
        if let Some(id) = self.pending {
            log::debug!("Session {} is still starting", id);
            return;
        }

        let prior = self.take_session();
        self.last_session += 1;
        let id = SessionId(self.last_session);
        self.pending = Some(id);
        self.state.starting = true;

        let preferred = self
            .state
            .selected_camera_id()
            .map(str::to_string)
            .or_else(|| self.options.preferred_camera.clone());
        log::info!("Starting session {}", id);
        self.work.push(Work::Start {
            session: id,
            prior,
            options: self.options.clone(),
            preferred,
        });
    }

    /// Stop the running session, or abandon the one being opened
    pub fn stop(&mut self) {
        if let Some(id) = self.pending.take() {
            log::info!("Abandoning session {} before it started", id);
        }
        self.state.starting = false;
        if let Some(session) = self.take_session() {
            self.work.push(Work::Release(session));
        }
    }

    fn take_session(&mut self) -> Option<B::Session> {
        self.state.scanning = false;
        self.state.preview = None;
        self.session.take()
    }

    /// Apply the result of a [`Work`] item
    pub fn complete(&mut self, done: Done<B::Session>) {
        match done {
            Done::Checked(result) => {
                if let Err(e) = self.apply_cameras(result) {
                    self.fail(e);
                }
            }
            Done::Started {
                session,
                cameras,
                opened,
            } => {
                if let Some(cameras) = cameras {
                    self.set_cameras(cameras);
                }

                if self.pending != Some(session) {
                    // Stopped or decoded while it was opening
                    match opened {
                        Ok(handle) => {
                            log::info!("Session {} opened after it was stopped", session);
                            self.work.push(Work::Release(handle));
                        }
                        Err(e) => log::debug!("Abandoned session {} failed: {}", session, e),
                    }
                    return;
                }

                self.pending = None;
                self.state.starting = false;
                match opened {
                    Ok(handle) => {
                        log::info!("Scanning with session {}", session);
                        self.session = Some(handle);
                        self.state.scanning = true;
                        self.state.error = None;
                    }
                    Err(e) => self.fail(e),
                }
            }
            Done::Released(result) => {
                if let Err(e) = result {
                    self.fail(e);
                }
            }
        }
    }

    fn apply_cameras(
        &mut self,
        result: Result<Vec<CameraDevice>, ScanError>,
    ) -> Result<(), ScanError> {
        self.set_cameras(result?);
        if self.state.cameras.is_empty() {
            return Err(ScanError::NoCameras);
        }
        Ok(())
    }

    fn set_cameras(&mut self, cameras: Vec<CameraDevice>) {
        let preferred = self
            .state
            .selected_camera_id()
            .map(str::to_string)
            .or_else(|| self.options.preferred_camera.clone());
        self.state.set_cameras(cameras, preferred.as_deref());
    }

    /// Apply a session event; returns the code when one was decoded
    pub fn handle_event(&mut self, event: ScanEvent) -> Option<ScannedCode> {
        let active = self.active_session() == Some(event.session);
        // Events can overtake the completion of the start that opened them
        let opening = self.pending == Some(event.session);
        if !active && !opening {
            log::trace!("Ignoring event from inactive session {}", event.session);
            return None;
        }

        match event.kind {
            ScanEventKind::Preview(frame) => {
                if active {
                    self.state.preview = Some(frame);
                }
                None
            }
            ScanEventKind::Decoded(code) => {
                log::info!("Scan result ({}): {} bytes", code.format, code.text.len());
                self.state.result = Some(code.clone());
                self.stop();
                Some(code)
            }
            ScanEventKind::Failed(reason) => {
                self.fail(ScanError::Scan(reason));
                None
            }
            ScanEventKind::Ended => {
                log::info!("Session {} ended", event.session);
                self.stop();
                None
            }
        }
    }

    /// Choose the camera for the next session; returns its device id
    pub fn select_camera(&mut self, index: usize) -> Option<String> {
        let id = self.state.cameras.get(index)?.id.clone();
        self.state.selected_camera = Some(index);
        self.options.preferred_camera = Some(id.clone());
        Some(id)
    }

    /// Dismiss the result card
    pub fn clear_result(&mut self) {
        self.state.result = None;
    }

    fn fail(&mut self, err: ScanError) {
        log::error!("{}", err);
        self.state.error = Some(err);
    }
}

impl<B: CameraBackend> Drop for Scanner<B> {
    fn drop(&mut self) {
        let mut sessions: Vec<B::Session> = self.session.take().into_iter().collect();
        for work in self.work.drain(..) {
            match work {
                Work::Release(session)
                | Work::Start {
                    prior: Some(session),
                    ..
                } => sessions.push(session),
                _ => {}
            }
        }

        for mut session in sessions {
            log::info!("Scanner closed, releasing session {}", session.id());
            if let Err(e) = session.stop() {
                log::error!("{}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::BarcodeFormat;
    use crate::config::DecoderBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// What the mock camera layer was asked to do, in order
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Open(SessionId, CameraTarget),
        Stop(SessionId),
    }

    #[derive(Default)]
    struct MockBackend {
        cameras: Vec<CameraDevice>,
        probe_error: Option<ScanError>,
        enumerate_error: Option<ScanError>,
        open_error: Option<ScanError>,
        stop_error: Option<ScanError>,
        zbar_missing: bool,
        calls: Rc<RefCell<Vec<Call>>>,
    }

    struct MockSession {
        id: SessionId,
        stop_error: Option<ScanError>,
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl ScanHandle for MockSession {
        fn id(&self) -> SessionId {
            self.id
        }

        fn stop(&mut self) -> Result<(), ScanError> {
            self.calls.borrow_mut().push(Call::Stop(self.id));
            match self.stop_error.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    impl CameraBackend for MockBackend {
        type Session = MockSession;

        fn probe(&self) -> Result<(), ScanError> {
            match &self.probe_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        fn enumerate(&self) -> Result<Vec<CameraDevice>, ScanError> {
            match &self.enumerate_error {
                Some(e) => Err(e.clone()),
                None => Ok(self.cameras.clone()),
            }
        }

        fn decoder_available(&self, decoder: DecoderBackend) -> bool {
            !(decoder == DecoderBackend::Stream && self.zbar_missing)
        }

        fn open(
            &self,
            request: ScanRequest,
            _events: Sender<ScanEvent>,
        ) -> Result<MockSession, ScanError> {
            if let Some(e) = &self.open_error {
                return Err(e.clone());
            }
            self.calls
                .borrow_mut()
                .push(Call::Open(request.session, request.camera));
            Ok(MockSession {
                id: request.session,
                stop_error: self.stop_error.clone(),
                calls: self.calls.clone(),
            })
        }
    }

    fn with_cameras() -> MockBackend {
        MockBackend {
            cameras: vec![
                CameraDevice::new("/dev/video0", "Integrated Webcam"),
                CameraDevice::new("/dev/video2", "USB Camera"),
            ],
            ..Default::default()
        }
    }

    fn scanner(backend: MockBackend) -> (Scanner<MockBackend>, Rc<RefCell<Vec<Call>>>) {
        let calls = backend.calls.clone();
        (Scanner::new(backend, ScanOptions::default()), calls)
    }

    /// Run queued work inline until the queue is empty
    fn drive(scanner: &mut Scanner<MockBackend>) {
        let events = crossbeam_channel::unbounded().0;
        loop {
            let work = scanner.take_work();
            if work.is_empty() {
                break;
            }
            for item in work {
                let done = run_work(scanner.backend(), item, &events);
                scanner.complete(done);
            }
        }
    }

    fn start(scanner: &mut Scanner<MockBackend>) -> bool {
        scanner.start();
        drive(scanner);
        scanner.state().scanning
    }

    fn check(scanner: &mut Scanner<MockBackend>) {
        scanner.check_cameras();
        drive(scanner);
    }

    fn stop(scanner: &mut Scanner<MockBackend>) {
        scanner.stop();
        drive(scanner);
    }

    fn decoded(session: SessionId, text: &str, format: BarcodeFormat) -> ScanEvent {
        ScanEvent::new(
            session,
            ScanEventKind::Decoded(ScannedCode::new(text, format)),
        )
    }

    #[test]
    fn test_no_cameras_shows_message() {
        let (mut scanner, calls) = scanner(MockBackend::default());

        assert!(!start(&mut scanner));
        assert!(!scanner.state().starting);
        assert_eq!(
            scanner.state().error_message().as_deref(),
            Some("No cameras found on this device")
        );
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_media_unavailable_shows_message() {
        let backend = MockBackend {
            probe_error: Some(ScanError::MediaUnavailable("no gstreamer".into())),
            ..with_cameras()
        };
        let (mut scanner, _) = scanner(backend);

        check(&mut scanner);
        assert_eq!(
            scanner.state().error_message().as_deref(),
            Some("Media devices not supported on this system: no gstreamer")
        );
        assert!(scanner.state().cameras.is_empty());
    }

    #[test]
    fn test_enumeration_failure_shows_message() {
        let backend = MockBackend {
            enumerate_error: Some(ScanError::CameraCheck("monitor failed".into())),
            ..Default::default()
        };
        let (mut scanner, _) = scanner(backend);

        assert!(!start(&mut scanner));
        assert_eq!(
            scanner.state().error_message().as_deref(),
            Some("Camera check error: monitor failed")
        );
    }

    #[test]
    fn test_check_cameras_lists_devices() {
        let (mut scanner, _) = scanner(with_cameras());

        check(&mut scanner);
        assert_eq!(scanner.state().cameras.len(), 2);
        assert_eq!(scanner.state().camera_labels[1], "Camera 2: USB Camera");
        assert_eq!(scanner.state().error, None);
    }

    #[test]
    fn test_start_only_queues_work() {
        let (mut scanner, calls) = scanner(with_cameras());

        scanner.start();

        assert!(scanner.state().starting);
        assert!(!scanner.state().scanning);
        assert!(calls.borrow().is_empty());
        assert_eq!(scanner.take_work().len(), 1);
    }

    #[test]
    fn test_start_while_starting_is_ignored() {
        let (mut scanner, _) = scanner(with_cameras());

        scanner.start();
        scanner.start();

        assert_eq!(scanner.take_work().len(), 1);
    }

    #[test]
    fn test_start_uses_first_camera_and_clears_error() {
        let (mut scanner, calls) = scanner(with_cameras());
        scanner.state.error = Some(ScanError::Scan("old".into()));

        assert!(start(&mut scanner));
        assert!(!scanner.state().starting);
        assert_eq!(scanner.state().error, None);
        assert_eq!(
            *calls.borrow(),
            vec![Call::Open(
                SessionId(1),
                CameraTarget::Device("/dev/video0".into())
            )]
        );
    }

    #[test]
    fn test_start_twice_stops_prior_session_first() {
        let (mut scanner, calls) = scanner(with_cameras());

        assert!(start(&mut scanner));
        assert!(start(&mut scanner));

        assert_eq!(
            *calls.borrow(),
            vec![
                Call::Open(SessionId(1), CameraTarget::Device("/dev/video0".into())),
                Call::Stop(SessionId(1)),
                Call::Open(SessionId(2), CameraTarget::Device("/dev/video0".into())),
            ]
        );
        assert_eq!(scanner.active_session(), Some(SessionId(2)));
    }

    #[test]
    fn test_prior_stop_failure_aborts_start() {
        let backend = MockBackend {
            stop_error: Some(ScanError::StopFailed("device busy".into())),
            ..with_cameras()
        };
        let (mut scanner, calls) = scanner(backend);

        assert!(start(&mut scanner));
        assert!(!start(&mut scanner));

        assert_eq!(calls.borrow().last(), Some(&Call::Stop(SessionId(1))));
        assert_eq!(scanner.active_session(), None);
        assert_eq!(
            scanner.state().error_message().as_deref(),
            Some("Stop scanning error: device busy")
        );
    }

    #[test]
    fn test_decode_stops_scanning_and_shows_result() {
        let (mut scanner, calls) = scanner(with_cameras());
        start(&mut scanner);

        let code = scanner.handle_event(decoded(
            SessionId(1),
            "https://example.com",
            BarcodeFormat::QrCode,
        ));
        drive(&mut scanner);

        assert_eq!(code.map(|c| c.text), Some("https://example.com".to_string()));
        let state = scanner.state();
        assert!(!state.scanning);
        let result = state.result.as_ref().unwrap();
        assert_eq!(result.text, "https://example.com");
        assert_eq!(result.format.label(), "QR_CODE");
        assert_eq!(scanner.active_session(), None);
        assert_eq!(calls.borrow().last(), Some(&Call::Stop(SessionId(1))));
    }

    #[test]
    fn test_decode_before_start_completes_releases_camera() {
        let (mut scanner, calls) = scanner(with_cameras());
        let events = crossbeam_channel::unbounded().0;
        scanner.start();
        let mut work = scanner.take_work();
        let done = run_work(scanner.backend(), work.remove(0), &events);

        // The first frame decodes before the UI learns the session is open
        assert!(scanner
            .handle_event(decoded(SessionId(1), "early", BarcodeFormat::QrCode))
            .is_some());
        scanner.complete(done);
        drive(&mut scanner);

        assert!(!scanner.state().scanning);
        assert!(!scanner.state().starting);
        assert_eq!(scanner.state().result.as_ref().unwrap().text, "early");
        assert_eq!(scanner.active_session(), None);
        assert_eq!(calls.borrow().last(), Some(&Call::Stop(SessionId(1))));
    }

    #[test]
    fn test_stop_while_starting_releases_opened_camera() {
        let (mut scanner, calls) = scanner(with_cameras());
        let events = crossbeam_channel::unbounded().0;
        scanner.start();
        let mut work = scanner.take_work();

        scanner.stop();
        let done = run_work(scanner.backend(), work.remove(0), &events);
        scanner.complete(done);
        drive(&mut scanner);

        assert!(!scanner.state().scanning);
        assert_eq!(scanner.active_session(), None);
        assert_eq!(
            *calls.borrow(),
            vec![
                Call::Open(SessionId(1), CameraTarget::Device("/dev/video0".into())),
                Call::Stop(SessionId(1)),
            ]
        );
    }

    #[test]
    fn test_unknown_format_label() {
        let (mut scanner, _) = scanner(with_cameras());
        start(&mut scanner);
        scanner.handle_event(decoded(SessionId(1), "123", BarcodeFormat::Unknown));
        assert_eq!(scanner.state().result.as_ref().unwrap().format.label(), "Unknown");
    }

    #[test]
    fn test_events_from_stale_session_are_ignored() {
        let (mut scanner, _) = scanner(with_cameras());
        start(&mut scanner);
        start(&mut scanner);

        assert!(scanner
            .handle_event(decoded(SessionId(1), "stale", BarcodeFormat::QrCode))
            .is_none());
        assert!(scanner.state().scanning);
        assert!(scanner.state().result.is_none());
    }

    #[test]
    fn test_failure_is_shown_without_stopping() {
        let (mut scanner, _) = scanner(with_cameras());
        start(&mut scanner);

        scanner.handle_event(ScanEvent::new(
            SessionId(1),
            ScanEventKind::Failed("Internal data stream error.".into()),
        ));

        assert!(scanner.state().scanning);
        assert_eq!(
            scanner.state().error_message().as_deref(),
            Some("Scanning error: Internal data stream error.")
        );
    }

    #[test]
    fn test_stream_end_releases_session() {
        let (mut scanner, calls) = scanner(with_cameras());
        start(&mut scanner);

        scanner.handle_event(ScanEvent::new(SessionId(1), ScanEventKind::Ended));
        drive(&mut scanner);

        assert!(!scanner.state().scanning);
        assert_eq!(scanner.active_session(), None);
        assert_eq!(calls.borrow().last(), Some(&Call::Stop(SessionId(1))));
    }

    #[test]
    fn test_stop_error_is_shown() {
        let backend = MockBackend {
            stop_error: Some(ScanError::StopFailed("device busy".into())),
            ..with_cameras()
        };
        let (mut scanner, _) = scanner(backend);
        start(&mut scanner);

        stop(&mut scanner);

        assert!(!scanner.state().scanning);
        assert_eq!(
            scanner.state().error_message().as_deref(),
            Some("Stop scanning error: device busy")
        );
    }

    #[test]
    fn test_open_failure_shows_message() {
        let backend = MockBackend {
            open_error: Some(ScanError::StartFailed("Camera did not start".into())),
            ..with_cameras()
        };
        let (mut scanner, _) = scanner(backend);

        assert!(!start(&mut scanner));
        assert!(!scanner.state().starting);
        assert_eq!(
            scanner.state().error_message().as_deref(),
            Some("Scanning failed: Camera did not start")
        );
    }

    #[test]
    fn test_lost_start_can_be_retried() {
        let (mut scanner, _) = scanner(with_cameras());
        scanner.start();
        let work = scanner.take_work();

        scanner.complete(work[0].lost("camera task panicked"));

        assert!(!scanner.state().starting);
        assert_eq!(
            scanner.state().error_message().as_deref(),
            Some("Scanning failed: camera task panicked")
        );
        assert!(start(&mut scanner));
        assert_eq!(scanner.active_session(), Some(SessionId(2)));
    }

    #[test]
    fn test_missing_decoder_reported_before_opening_camera() {
        let backend = MockBackend {
            zbar_missing: true,
            ..with_cameras()
        };
        let calls = backend.calls.clone();
        let options = ScanOptions {
            decoder: DecoderBackend::Stream,
            ..Default::default()
        };
        let mut scanner = Scanner::new(backend, options);

        scanner.start();
        drive(&mut scanner);

        assert!(!scanner.state().scanning);
        assert_eq!(
            scanner.state().error_message().as_deref(),
            Some("zbar decoder not properly loaded")
        );
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_selected_camera_is_opened() {
        let (mut scanner, calls) = scanner(with_cameras());
        check(&mut scanner);

        assert_eq!(scanner.select_camera(1).as_deref(), Some("/dev/video2"));
        assert_eq!(scanner.options().preferred_camera.as_deref(), Some("/dev/video2"));
        start(&mut scanner);

        assert_eq!(
            *calls.borrow(),
            vec![Call::Open(
                SessionId(1),
                CameraTarget::Device("/dev/video2".into())
            )]
        );
        assert_eq!(scanner.state().selected_camera, Some(1));
    }

    #[test]
    fn test_select_camera_out_of_range() {
        let (mut scanner, _) = scanner(with_cameras());
        check(&mut scanner);
        assert_eq!(scanner.select_camera(5), None);
        assert_eq!(scanner.state().selected_camera, Some(0));
    }

    #[test]
    fn test_drop_releases_camera() {
        let (mut scanner, calls) = scanner(with_cameras());
        start(&mut scanner);

        drop(scanner);

        assert_eq!(calls.borrow().last(), Some(&Call::Stop(SessionId(1))));
    }

    #[test]
    fn test_drop_releases_queued_sessions() {
        let (mut scanner, calls) = scanner(with_cameras());
        start(&mut scanner);
        // Restart queues the running session for release
        scanner.start();

        drop(scanner);

        assert_eq!(calls.borrow().last(), Some(&Call::Stop(SessionId(1))));
    }

    #[test]
    fn test_drop_without_session_does_nothing() {
        let (scanner, calls) = scanner(with_cameras());
        drop(scanner);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_clear_result() {
        let (mut scanner, _) = scanner(with_cameras());
        start(&mut scanner);
        scanner.handle_event(decoded(SessionId(1), "abc", BarcodeFormat::QrCode));
        scanner.clear_result();
        assert!(scanner.state().result.is_none());
    }
}
