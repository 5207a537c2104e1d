//! In-memory collaborators for session tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use satb_audio::{AudioElement, AudioOutput, ElementId, PlaybackError};
use satb_domain::{ArtifactMap, RecordingDuration, RecordingOutcome, Severity, TrackRow, UploadFile};
use satb_notation::{NotationRenderer, OutlineRenderer, RenderError, RenderOptions, RendererHandle};
use satb_services::{RecordResponse, TranscriptionBackend, TransportError, UploadResponse};

use crate::{Download, NotationView, NotificationSink, Studio, StudioConfig, Trigger, View};

pub const SCORE_XML: &str = r#"<score-partwise>
  <work><work-title>Test Song</work-title></work>
  <part-list><score-part id="P1"><part-name>Soprano</part-name></score-part></part-list>
  <part id="P1"><measure number="1"/></part>
</score-partwise>"#;

pub fn artifacts(entries: &[(&str, &str)]) -> ArtifactMap {
    entries.iter().copied().collect()
}

#[derive(Default)]
pub struct FakeView {
    pub tabs: RefCell<Vec<String>>,
    pub notation: RefCell<Vec<NotationView>>,
    pub progress: RefCell<Vec<Option<String>>>,
    pub triggers: RefCell<Vec<(Trigger, bool)>>,
    pub selected: RefCell<Vec<Option<String>>>,
    pub playing: RefCell<Vec<bool>>,
    pub countdown: RefCell<Vec<Option<u32>>>,
    pub recording: RefCell<Option<(String, Vec<TrackRow>)>>,
    pub downloads: RefCell<Vec<Download>>,
    pub revealed: Cell<bool>,
}

impl FakeView {
    pub fn last_notation(&self) -> Option<NotationView> {
        self.notation.borrow().last().cloned()
    }
}

impl View for FakeView {
    fn set_active_tab(&self, part: &str) {
        self.tabs.borrow_mut().push(part.to_string());
    }

    fn set_notation(&self, content: NotationView) {
        self.notation.borrow_mut().push(content);
    }

    fn set_progress(&self, status: Option<&str>) {
        self.progress.borrow_mut().push(status.map(str::to_owned));
    }

    fn reveal_results(&self) {
        self.revealed.set(true);
    }

    fn set_trigger_enabled(&self, trigger: Trigger, enabled: bool) {
        self.triggers.borrow_mut().push((trigger, enabled));
    }

    fn set_selected_file(&self, name: Option<&str>) {
        self.selected.borrow_mut().push(name.map(str::to_owned));
    }

    fn set_playing(&self, playing: bool) {
        self.playing.borrow_mut().push(playing);
    }

    fn set_countdown(&self, remaining: Option<u32>) {
        self.countdown.borrow_mut().push(remaining);
    }

    fn show_recording(&self, transcription: &str, rows: &[TrackRow]) {
        *self.recording.borrow_mut() = Some((transcription.to_string(), rows.to_vec()));
    }

    fn offer_download(&self, download: &Download) {
        self.downloads.borrow_mut().push(download.clone());
    }
}

#[derive(Default)]
pub struct FakeNotes {
    pub messages: RefCell<Vec<(String, Severity)>>,
}

impl FakeNotes {
    pub fn last(&self) -> Option<(String, Severity)> {
        self.messages.borrow().last().cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl NotificationSink for FakeNotes {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages.borrow_mut().push((message.to_string(), severity));
    }
}

/// Scripted backend. Every request is logged in `calls`.
pub struct FakeBackend {
    pub calls: Mutex<Vec<String>>,
    upload: Mutex<Result<UploadResponse, TransportError>>,
    record: Mutex<Result<RecordResponse, TransportError>>,
    record_delay: Mutex<Duration>,
    notation: Mutex<HashMap<String, String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        let unscripted = || TransportError::Status {
            status: 500,
            detail: Some("unscripted".into()),
        };
        Self {
            calls: Mutex::new(Vec::new()),
            upload: Mutex::new(Err(unscripted())),
            record: Mutex::new(Err(unscripted())),
            record_delay: Mutex::new(Duration::ZERO),
            notation: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn respond_upload(&self, result: Result<ArtifactMap, TransportError>) {
        *self.upload.lock().unwrap() = result.map(|files| UploadResponse {
            files,
            message: None,
            basename: None,
        });
    }

    pub fn respond_record(&self, result: Result<RecordingOutcome, TransportError>, delay: Duration) {
        *self.record.lock().unwrap() = result.map(|outcome| RecordResponse {
            outcome,
            message: None,
        });
        *self.record_delay.lock().unwrap() = delay;
    }

    pub fn serve_notation(&self, file_name: &str, text: &str) {
        self.notation
            .lock()
            .unwrap()
            .insert(file_name.to_string(), text.to_string());
    }

    /// Holds requests for `key` (a notation file name, or `"upload"`) until
    /// the returned gate is notified.
    pub fn gate(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), gate.clone());
        gate
    }

    async fn wait_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl TranscriptionBackend for FakeBackend {
    async fn upload(&self, file: &UploadFile) -> Result<UploadResponse, TransportError> {
        self.calls.lock().unwrap().push(format!("upload {}", file.name));
        self.wait_gate("upload").await;
        self.upload.lock().unwrap().clone()
    }

    async fn record(&self, duration: RecordingDuration) -> Result<RecordResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("record {}", duration.seconds()));
        let delay = *self.record_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        self.record.lock().unwrap().clone()
    }

    async fn fetch_notation(&self, file_name: &str) -> Result<String, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("results {file_name}"));
        self.wait_gate(file_name).await;
        self.notation
            .lock()
            .unwrap()
            .get(file_name)
            .cloned()
            .ok_or(TransportError::Status {
                status: 404,
                detail: None,
            })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.calls.lock().unwrap().push(format!("get {url}"));
        Ok(Vec::new())
    }

    fn results_url(&self, file_name: &str) -> String {
        format!("http://test/results/{file_name}")
    }

    fn audio_url(&self, reference: &str) -> String {
        format!("http://test/audio/{reference}")
    }
}

pub struct FakeElement {
    id: ElementId,
    source: String,
    live: Arc<AtomicUsize>,
    reject_with: Arc<Mutex<Option<String>>>,
    play_gate: Option<Arc<Notify>>,
    pub playing: AtomicBool,
    pub rewinds: AtomicUsize,
    pub released: AtomicBool,
}

#[async_trait]
impl AudioElement for FakeElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn source(&self) -> &str {
        &self.source
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        if let Some(gate) = &self.play_gate {
            gate.notified().await;
        }
        let rejection = self.reject_with.lock().unwrap().clone();
        if let Some(message) = rejection {
            return Err(PlaybackError::Rejected(message));
        }
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn rewind(&self) {
        self.rewinds.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[derive(Default)]
pub struct FakeOutput {
    pub live: Arc<AtomicUsize>,
    pub elements: Mutex<Vec<Arc<FakeElement>>>,
    reject_with: Arc<Mutex<Option<String>>>,
    play_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeOutput {
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> usize {
        self.elements.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Arc<FakeElement>> {
        self.elements.lock().unwrap().last().cloned()
    }

    pub fn reject_play(&self, message: &str) {
        *self.reject_with.lock().unwrap() = Some(message.to_string());
    }

    /// Elements created from now on wait for the gate before playing.
    pub fn gate_play(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.play_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

impl AudioOutput for FakeOutput {
    fn create(&self, id: ElementId, source: &str) -> Arc<dyn AudioElement> {
        self.live.fetch_add(1, Ordering::SeqCst);
        let element = Arc::new(FakeElement {
            id,
            source: source.to_string(),
            live: self.live.clone(),
            reject_with: self.reject_with.clone(),
            play_gate: self.play_gate.lock().unwrap().clone(),
            playing: AtomicBool::new(false),
            rewinds: AtomicUsize::new(0),
            released: AtomicBool::new(false),
        });
        self.elements.lock().unwrap().push(element.clone());
        element
    }
}

/// Renderer whose load step always fails.
pub struct BrokenRenderer(pub &'static str);

#[async_trait]
impl NotationRenderer for BrokenRenderer {
    async fn load_markup(&self, _text: &str) -> Result<RendererHandle, RenderError> {
        Err(RenderError::Load(self.0.to_string()))
    }

    fn render(
        &self,
        handle: &RendererHandle,
        _page: u32,
        _options: &RenderOptions,
    ) -> Result<String, RenderError> {
        Err(RenderError::UnknownHandle(handle.id))
    }

    fn release(&self, _handle: &RendererHandle) {}
}

pub fn test_config() -> StudioConfig {
    StudioConfig {
        reveal_delay_ms: 0,
        ..StudioConfig::default()
    }
}

/// A studio wired to fakes, with handles to inspect them.
pub struct Harness {
    pub studio: Studio,
    pub backend: Arc<FakeBackend>,
    pub output: Arc<FakeOutput>,
    pub view: Rc<FakeView>,
    pub notes: Rc<FakeNotes>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_renderer(Some(Arc::new(OutlineRenderer::new())))
    }

    pub fn with_renderer(renderer: Option<Arc<dyn NotationRenderer>>) -> Self {
        let backend = Arc::new(FakeBackend::default());
        let output = Arc::new(FakeOutput::default());
        let view = Rc::new(FakeView::default());
        let notes = Rc::new(FakeNotes::default());
        let studio = Studio::new(
            &test_config(),
            backend.clone(),
            renderer,
            output.clone(),
            view.clone(),
            notes.clone(),
        );
        Self {
            studio,
            backend,
            output,
            view,
            notes,
        }
    }
}
