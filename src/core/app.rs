use crate::config::{DecoderBackend, ScannerConfig};
use crate::fl;
use crate::scanner::{DecoderInfo, GstBackend, ScanEvent, ScanEventKind, detect_decoders};
use crate::session::controller::{Handoff, Scanner, run_work};
use crate::session::messages;
use crate::session::shortcuts;
use crate::widget::scanner_view::{self, DecoderSettings};
use cosmic::iced_runtime::clipboard;
use cosmic::{
    app,
    iced::Size,
    iced_futures::{Subscription, event::listen_with},
};
use crossbeam_channel::{Receiver as CbReceiver, Sender as CbSender};
use futures::SinkExt;
use futures::channel::mpsc;
use std::any::TypeId;

pub(crate) fn run() -> cosmic::iced::Result {
    let settings = cosmic::app::Settings::default().size(Size::new(440.0, 760.0));
    cosmic::app::run::<App>(settings, ())
}

pub struct App {
    pub core: app::Core,
    pub config: ScannerConfig,
    pub scanner: Scanner<GstBackend>,
    /// Handed to every scan session
    pub events_tx: CbSender<ScanEvent>,
    /// Drained by the scan event subscription
    pub events_rx: CbReceiver<ScanEvent>,
    /// Decoder selector entries, in [`DecoderBackend::ALL`] order
    pub decoder_labels: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Msg {
    Scanner(messages::Msg),
    Keyboard(cosmic::iced::keyboard::Event),
}

impl cosmic::Application for App {
    type Executor = cosmic::executor::Default;

    type Flags = ();

    type Message = Msg;

    const APP_ID: &'static str = "io.github.hojjatabdollahi.snapscan";

    fn core(&self) -> &app::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut app::Core {
        &mut self.core
    }

    fn init(
        core: app::Core,
        _flags: Self::Flags,
    ) -> (Self, cosmic::iced::Task<cosmic::Action<Self::Message>>) {
        let config = ScannerConfig::load();
        let (events_tx, events_rx) = crossbeam_channel::unbounded::<ScanEvent>();

        let mut scanner = Scanner::new(GstBackend::default(), config.scan_options());
        // Populate the camera list before the first scan
        scanner.check_cameras();

        let decoder_labels = DecoderBackend::ALL.iter().map(|d| d.label()).collect();

        let mut app = Self {
            core,
            config,
            scanner,
            events_tx,
            events_rx,
            decoder_labels,
        };

        // Plugin registry scans can take a while on first run
        let detect = cosmic::Task::perform(
            async move {
                tokio::task::spawn_blocking(|| match detect_decoders() {
                    Ok(decoders) => decoders,
                    Err(e) => {
                        log::warn!("Could not detect decoders: {:#}", e);
                        Vec::new()
                    }
                })
                .await
                .unwrap_or_default()
            },
            |decoders| Msg::Scanner(messages::Msg::DecodersDetected(decoders)),
        );

        let task = cosmic::Task::batch([detect, app.dispatch_work()]);
        (app, task.map(cosmic::Action::App))
    }

    fn view(&self) -> cosmic::Element<'_, Self::Message> {
        let theme = self.core.system_theme().cosmic();
        let settings = DecoderSettings {
            labels: &self.decoder_labels,
            selected: self.config.decoder.index(),
            copy_on_scan: self.config.copy_on_scan,
        };
        scanner_view::view(self.scanner.state(), settings, theme.spacing).map(Msg::Scanner)
    }

    fn update(
        &mut self,
        message: Self::Message,
    ) -> cosmic::iced::Task<cosmic::Action<Self::Message>> {
        match message {
            Msg::Keyboard(cosmic::iced::keyboard::Event::KeyPressed {
                key, modifiers, ..
            }) => match shortcuts::handle_key_event(self.scanner.state(), key, modifiers) {
                Some(m) => self.update_scanner(m).map(cosmic::Action::App),
                None => cosmic::iced::Task::none(),
            },
            Msg::Keyboard(_) => cosmic::iced::Task::none(),
            Msg::Scanner(m) => self.update_scanner(m).map(cosmic::Action::App),
        }
    }

    fn subscription(&self) -> cosmic::iced_futures::Subscription<Self::Message> {
        Subscription::batch(vec![
            listen_with(|e, _, _| match e {
                cosmic::iced_core::Event::Keyboard(keyboard_event) => {
                    Some(Msg::Keyboard(keyboard_event))
                }
                _ => None,
            }),
            scan_subscription(self.events_rx.clone()),
        ])
    }
}

impl App {
    fn update_scanner(&mut self, message: messages::Msg) -> cosmic::Task<Msg> {
        use messages::Msg as M;

        let task = match message {
            M::Start => {
                self.scanner.start();
                cosmic::Task::none()
            }
            M::Stop => {
                self.scanner.stop();
                cosmic::Task::none()
            }
            M::Scan(event) => match self.scanner.handle_event(event) {
                Some(code) if self.config.copy_on_scan => clipboard::write(code.text),
                _ => cosmic::Task::none(),
            },
            M::WorkDone(done) => {
                if let Some(done) = done.take() {
                    self.scanner.complete(done);
                }
                cosmic::Task::none()
            }
            M::DecodersDetected(decoders) => {
                self.apply_decoders(&decoders);
                cosmic::Task::none()
            }
            M::RefreshCameras => {
                self.scanner.check_cameras();
                cosmic::Task::none()
            }
            M::SelectCamera(index) => {
                if let Some(id) = self.scanner.select_camera(index) {
                    log::debug!("Selected camera {}", id);
                    self.config.preferred_camera = Some(id);
                    self.config.save();
                }
                cosmic::Task::none()
            }
            M::SelectDecoder(index) => {
                if let Some(&decoder) = DecoderBackend::ALL.get(index) {
                    if decoder != self.config.decoder {
                        log::info!("Switching decoder to {}", decoder.library_name());
                        self.config.decoder = decoder;
                        self.config.save();
                        self.apply_config();
                    }
                }
                cosmic::Task::none()
            }
            M::CopyOnScan(enabled) => {
                self.config.copy_on_scan = enabled;
                self.config.save();
                cosmic::Task::none()
            }
            M::CopyResult => match &self.scanner.state().result {
                Some(result) => clipboard::write(result.text.clone()),
                None => cosmic::Task::none(),
            },
            M::ClearResult => {
                self.scanner.clear_result();
                cosmic::Task::none()
            }
        };

        cosmic::Task::batch([task, self.dispatch_work()])
    }

    /// Run the controller's queued camera work off the UI thread
    fn dispatch_work(&mut self) -> cosmic::Task<Msg> {
        let tasks: Vec<cosmic::Task<Msg>> = self
            .scanner
            .take_work()
            .into_iter()
            .map(|work| {
                let backend = self.scanner.backend().clone();
                let events = self.events_tx.clone();
                let lost = work.lost("camera task panicked");
                cosmic::Task::perform(
                    async move {
                        tokio::task::spawn_blocking(move || run_work(&backend, work, &events))
                            .await
                            .unwrap_or(lost)
                    },
                    |done| Msg::Scanner(messages::Msg::WorkDone(Handoff::new(done))),
                )
            })
            .collect();
        cosmic::Task::batch(tasks)
    }

    /// Mark decoders whose plugins are missing in the selector
    fn apply_decoders(&mut self, decoders: &[DecoderInfo]) {
        for d in decoders {
            match &d.gst_element {
                Some(element) => log::info!("Decoder: {} [{}]", d.display_name(), element),
                None => log::info!("Decoder: {}", d.display_name()),
            }
        }

        self.decoder_labels = DecoderBackend::ALL
            .iter()
            .map(|&backend| {
                let missing = decoders
                    .iter()
                    .any(|d| d.backend == backend && !d.available);
                if missing {
                    format!("{} {}", backend.label(), fl!("decoder-not-installed"))
                } else {
                    backend.label()
                }
            })
            .collect();
    }

    /// Push the persisted settings into the controller for the next session
    fn apply_config(&mut self) {
        let mut options = self.config.scan_options();
        // Keep the camera picked in this window even if it was never saved
        if options.preferred_camera.is_none() {
            options.preferred_camera = self.scanner.options().preferred_camera.clone();
        }
        self.scanner.set_options(options);
    }
}

/// Pass one session event to the UI side of the bridge
///
/// Previews are dropped while the UI is behind; everything else waits for
/// room. Returns false once the UI side is gone.
fn forward_event(tx: &mut mpsc::Sender<ScanEvent>, event: ScanEvent) -> bool {
    match event.kind {
        ScanEventKind::Preview(_) => match tx.try_send(event) {
            Ok(()) => true,
            Err(e) => !e.is_disconnected(),
        },
        _ => futures::executor::block_on(tx.send(event)).is_ok(),
    }
}

/// Subscription forwarding scan session events into the update loop
fn scan_subscription(rx: CbReceiver<ScanEvent>) -> Subscription<Msg> {
    struct ScanSub;

    Subscription::run_with_id(
        TypeId::of::<ScanSub>(),
        cosmic::iced::stream::channel(10, move |mut output| async move {
            use cosmic::iced_futures::futures::StreamExt;

            // Bridge the blocking crossbeam receiver into an async stream
            let (mut tx, mut async_rx) = mpsc::channel::<ScanEvent>(10);

            std::thread::spawn(move || {
                for event in rx.iter() {
                    if !forward_event(&mut tx, event) {
                        break;
                    }
                }
            });

            while let Some(event) = async_rx.next().await {
                if output
                    .send(Msg::Scanner(messages::Msg::Scan(event)))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        }),
    )
}
