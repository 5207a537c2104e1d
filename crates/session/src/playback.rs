use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, error, info};

use satb_audio::{AudioElement, AudioOutput, ElementId, PlaybackError};
use satb_domain::{ArtifactMap, Severity};
use satb_services::TranscriptionBackend;

use crate::{NotificationSink, View};

pub const MIDI_FALLBACK_WARNING: &str =
    "Audio conversion not available. Using MIDI playback which may not work in all environments.";

/// Result of preparing playback for a part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackSetup {
    Ready(ElementId),
    /// Only a MIDI rendering exists; nothing playable was attached.
    MidiOnly,
    Unavailable,
}

/// Sole owner of the audio element. At most one element is attached at a
/// time and every call site goes through here.
pub struct PlaybackController {
    output: Arc<dyn AudioOutput>,
    view: Rc<dyn View>,
    notifier: Rc<dyn NotificationSink>,
    element: RefCell<Option<Arc<dyn AudioElement>>>,
    playing: Cell<bool>,
    /// Bumped by every stop, pause and setup. A play that resolves under an
    /// older epoch has been overtaken and must not mark the controller playing.
    epoch: Cell<u64>,
    next_id: Cell<u64>,
    released: Cell<usize>,
}

impl PlaybackController {
    pub fn new(
        output: Arc<dyn AudioOutput>,
        view: Rc<dyn View>,
        notifier: Rc<dyn NotificationSink>,
    ) -> Self {
        Self {
            output,
            view,
            notifier,
            element: RefCell::new(None),
            playing: Cell::new(false),
            epoch: Cell::new(0),
            next_id: Cell::new(1),
            released: Cell::new(0),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.get()
    }

    pub fn current_element(&self) -> Option<ElementId> {
        self.element.borrow().as_ref().map(|element| element.id())
    }

    pub fn current_source(&self) -> Option<String> {
        self.element
            .borrow()
            .as_ref()
            .map(|element| element.source().to_string())
    }

    /// Number of elements released so far.
    pub fn released_count(&self) -> usize {
        self.released.get()
    }

    /// Replaces the attached element with one for `part`'s audio rendering.
    /// The previous element is always released, even when `part` has no audio.
    pub fn setup(
        &self,
        part: &str,
        artifacts: &ArtifactMap,
        backend: &dyn TranscriptionBackend,
    ) -> PlaybackSetup {
        self.release_current();

        if let Some(reference) = artifacts.audio(part) {
            let id = ElementId(self.next_id.get());
            self.next_id.set(id.0 + 1);
            let source = backend.audio_url(reference);
            info!(part, %id, %source, "attaching audio element");
            let element = self.output.create(id, &source);
            *self.element.borrow_mut() = Some(element);
            return PlaybackSetup::Ready(id);
        }

        if artifacts.midi(part).is_some() {
            self.notifier
                .notify(MIDI_FALLBACK_WARNING, Severity::Warning);
            return PlaybackSetup::MidiOnly;
        }

        debug!(part, "no audio for part");
        PlaybackSetup::Unavailable
    }

    /// Pauses when playing, plays otherwise. Returns whether audio is now playing.
    pub async fn toggle(&self) -> Result<bool, PlaybackError> {
        let element = self.element.borrow().clone();
        let Some(element) = element else {
            self.notifier
                .notify(&PlaybackError::NoAudio.to_string(), Severity::Warning);
            return Err(PlaybackError::NoAudio);
        };

        if self.playing.get() {
            element.pause();
            self.bump_epoch();
            self.set_playing(false);
            return Ok(false);
        }

        let epoch = self.epoch.get();
        match element.play().await {
            Ok(()) if self.epoch.get() == epoch => {
                self.set_playing(true);
                Ok(true)
            }
            Ok(()) => {
                debug!(id = %element.id(), "play resolved after playback was stopped");
                element.pause();
                Ok(false)
            }
            Err(err) => {
                error!(id = %element.id(), %err, "error playing audio");
                self.notifier
                    .notify(&format!("Error playing audio: {err}"), Severity::Error);
                if self.epoch.get() == epoch {
                    self.set_playing(false);
                }
                Err(err)
            }
        }
    }

    /// Pauses and rewinds. Safe to call at any time.
    pub fn stop(&self) {
        if let Some(element) = self.element.borrow().as_ref() {
            element.pause();
            element.rewind();
        }
        self.bump_epoch();
        self.set_playing(false);
    }

    /// The host reports that element `id` reached its end on its own.
    pub fn track_ended(&self, id: ElementId) {
        if self.current_element() == Some(id) {
            self.set_playing(false);
        } else {
            debug!(%id, "ignoring end of released element");
        }
    }

    fn release_current(&self) {
        let previous = self.element.borrow_mut().take();
        if let Some(previous) = previous {
            previous.pause();
            previous.release();
            self.released.set(self.released.get() + 1);
            debug!(id = %previous.id(), "released audio element");
        }
        self.bump_epoch();
        self.set_playing(false);
    }

    fn bump_epoch(&self) {
        self.epoch.set(self.epoch.get() + 1);
    }

    fn set_playing(&self, playing: bool) {
        self.playing.set(playing);
        self.view.set_playing(playing);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{artifacts, FakeBackend, FakeNotes, FakeOutput, FakeView};

    struct Fixture {
        controller: PlaybackController,
        backend: FakeBackend,
        output: Arc<FakeOutput>,
        view: Rc<FakeView>,
        notes: Rc<FakeNotes>,
    }

    fn fixture() -> Fixture {
        let output = Arc::new(FakeOutput::default());
        let view = Rc::new(FakeView::default());
        let notes = Rc::new(FakeNotes::default());
        Fixture {
            controller: PlaybackController::new(output.clone(), view.clone(), notes.clone()),
            backend: FakeBackend::default(),
            output,
            view,
            notes,
        }
    }

    #[test]
    fn setup_attaches_paused_element_for_audio() {
        let f = fixture();
        let map = artifacts(&[("score", "a.musicxml"), ("score_audio", "a.mp3")]);
        let setup = f.controller.setup("score", &map, &f.backend);
        assert_eq!(setup, PlaybackSetup::Ready(ElementId(1)));
        assert_eq!(
            f.controller.current_source().as_deref(),
            Some("http://test/audio/a.mp3")
        );
        let element = f.output.last().unwrap();
        assert!(!element.playing.load(Ordering::SeqCst));
        assert!(!f.controller.is_playing());
    }

    #[test]
    fn midi_only_part_warns_without_element() {
        let f = fixture();
        let map = artifacts(&[("bass", "bass.musicxml"), ("bass_midi", "bass.mid")]);
        assert_eq!(
            f.controller.setup("bass", &map, &f.backend),
            PlaybackSetup::MidiOnly
        );
        assert_eq!(f.output.created(), 0);
        assert_eq!(
            f.notes.last(),
            Some((MIDI_FALLBACK_WARNING.to_string(), Severity::Warning))
        );
    }

    #[test]
    fn part_without_audio_is_silent() {
        let f = fixture();
        let map = artifacts(&[("tenor", "tenor.musicxml")]);
        assert_eq!(
            f.controller.setup("tenor", &map, &f.backend),
            PlaybackSetup::Unavailable
        );
        assert_eq!(f.controller.current_element(), None);
        assert!(f.notes.is_empty());
    }

    #[test]
    fn only_one_element_survives_repeated_setups() {
        let f = fixture();
        let map = artifacts(&[
            ("score_audio", "s.mp3"),
            ("alto_audio", "a.mp3"),
            ("bass_audio", "b.mp3"),
        ]);
        let parts = ["score", "alto", "bass", "score", "alto"];
        for part in parts {
            f.controller.setup(part, &map, &f.backend);
        }
        assert_eq!(f.output.created(), parts.len());
        assert_eq!(f.output.live(), 1);
        assert_eq!(f.controller.released_count(), parts.len() - 1);
        assert_eq!(f.controller.current_element(), Some(ElementId(5)));
    }

    #[test]
    fn setup_for_part_without_audio_still_releases_previous() {
        let f = fixture();
        let map = artifacts(&[("score_audio", "s.mp3")]);
        f.controller.setup("score", &map, &f.backend);
        f.controller.setup("alto", &map, &f.backend);
        assert_eq!(f.output.live(), 0);
        assert_eq!(f.controller.current_element(), None);
    }

    #[tokio::test]
    async fn toggle_without_element_reports_no_audio() {
        let f = fixture();
        assert_eq!(f.controller.toggle().await, Err(PlaybackError::NoAudio));
        assert_eq!(
            f.notes.last(),
            Some(("No audio available for this part".to_string(), Severity::Warning))
        );
    }

    #[tokio::test]
    async fn toggle_plays_then_pauses() {
        let f = fixture();
        let map = artifacts(&[("score_audio", "s.mp3")]);
        f.controller.setup("score", &map, &f.backend);
        assert_eq!(f.controller.toggle().await, Ok(true));
        assert!(f.controller.is_playing());
        assert!(f.output.last().unwrap().playing.load(Ordering::SeqCst));
        assert_eq!(f.controller.toggle().await, Ok(false));
        assert!(!f.controller.is_playing());
        assert_eq!(f.view.playing.borrow().last(), Some(&false));
    }

    #[tokio::test]
    async fn rejected_play_is_reported_and_rolled_back() {
        let f = fixture();
        let map = artifacts(&[("score_audio", "s.mp3")]);
        f.controller.setup("score", &map, &f.backend);
        f.output.reject_play("autoplay blocked");
        assert_eq!(
            f.controller.toggle().await,
            Err(PlaybackError::Rejected("autoplay blocked".into()))
        );
        assert!(!f.controller.is_playing());
        assert_eq!(
            f.notes.last(),
            Some((
                "Error playing audio: autoplay blocked".to_string(),
                Severity::Error
            ))
        );
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_rewinds() {
        let f = fixture();
        f.controller.stop();
        assert!(!f.controller.is_playing());

        let map = artifacts(&[("score_audio", "s.mp3")]);
        f.controller.setup("score", &map, &f.backend);
        f.controller.toggle().await.unwrap();
        f.controller.stop();
        f.controller.stop();
        let element = f.output.last().unwrap();
        assert!(!f.controller.is_playing());
        assert!(!element.playing.load(Ordering::SeqCst));
        assert_eq!(element.rewinds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stop_during_pending_play_wins() {
        let f = fixture();
        let gate = f.output.gate_play();
        let map = artifacts(&[("score_audio", "s.mp3")]);
        f.controller.setup("score", &map, &f.backend);

        let stop_then_release = async {
            tokio::task::yield_now().await;
            f.controller.stop();
            gate.notify_one();
        };
        let (played, ()) = tokio::join!(f.controller.toggle(), stop_then_release);
        assert_eq!(played, Ok(false));
        assert!(!f.controller.is_playing());
        assert!(!f.output.last().unwrap().playing.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn natural_end_clears_playing_for_current_element_only() {
        let f = fixture();
        let map = artifacts(&[("score_audio", "s.mp3"), ("alto_audio", "a.mp3")]);
        f.controller.setup("score", &map, &f.backend);
        f.controller.setup("alto", &map, &f.backend);
        f.controller.toggle().await.unwrap();

        f.controller.track_ended(ElementId(1));
        assert!(f.controller.is_playing());
        f.controller.track_ended(ElementId(2));
        assert!(!f.controller.is_playing());
    }
}
