use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use satb_domain::{file_name, ArtifactMap, NotationFormat};
use satb_notation::{render_responsive, NotationRenderer, RenderOptions};
use satb_services::TranscriptionBackend;

use crate::{NotationView, NotificationSink, PlaybackController, View};

/// How a tab switch ended for the notation area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotationOutcome {
    Shown(NotationView),
    /// A later switch took over before this one's notation arrived.
    Superseded,
}

enum NotationPlan {
    Show(NotationView),
    Fetch { file_name: String },
}

struct TabState {
    current_part: String,
    artifacts: ArtifactMap,
    /// Bumped on every switch; in-flight loads compare against it on arrival.
    generation: u64,
}

/// Keeps the active part, the notation area and playback consistent.
pub struct TabOrchestrator {
    pub(crate) backend: Arc<dyn TranscriptionBackend>,
    renderer: Option<Arc<dyn NotationRenderer>>,
    pub(crate) view: Rc<dyn View>,
    pub(crate) notifier: Rc<dyn NotificationSink>,
    playback: PlaybackController,
    options: RenderOptions,
    state: RefCell<TabState>,
}

impl TabOrchestrator {
    /// Enters `initial_part` right away. Nothing has been uploaded yet, so
    /// the notation area starts out empty.
    pub fn new(
        initial_part: &str,
        backend: Arc<dyn TranscriptionBackend>,
        renderer: Option<Arc<dyn NotationRenderer>>,
        playback: PlaybackController,
        view: Rc<dyn View>,
        notifier: Rc<dyn NotificationSink>,
    ) -> Self {
        view.set_active_tab(initial_part);
        view.set_notation(NotationView::Empty);
        Self {
            backend,
            renderer,
            view,
            notifier,
            playback,
            options: RenderOptions::score_view(),
            state: RefCell::new(TabState {
                current_part: initial_part.to_string(),
                artifacts: ArtifactMap::new(),
                generation: 0,
            }),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn current_part(&self) -> String {
        self.state.borrow().current_part.clone()
    }

    pub fn artifacts(&self) -> ArtifactMap {
        self.state.borrow().artifacts.clone()
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// Swaps in a new artifact map as a whole.
    pub(crate) fn replace_artifacts(&self, artifacts: ArtifactMap) {
        self.state.borrow_mut().artifacts = artifacts;
    }

    /// Makes `part` active: marks the tab, stops playback, loads the part's
    /// notation and prepares its audio.
    #[instrument(skip(self))]
    pub async fn switch_tab(&self, part: &str) -> NotationOutcome {
        let generation = {
            let mut state = self.state.borrow_mut();
            state.current_part = part.to_string();
            state.generation += 1;
            state.generation
        };
        self.view.set_active_tab(part);
        self.playback.stop();

        let plan = self.plan_notation(part);
        if let NotationPlan::Show(view) = &plan {
            self.view.set_notation(view.clone());
        } else {
            self.view.set_notation(NotationView::Loading {
                part: part.to_string(),
            });
        }
        {
            let state = self.state.borrow();
            self.playback
                .setup(part, &state.artifacts, self.backend.as_ref());
        }

        match plan {
            NotationPlan::Show(view) => NotationOutcome::Shown(view),
            NotationPlan::Fetch { file_name } => {
                self.load_notation(part, &file_name, generation).await
            }
        }
    }

    fn plan_notation(&self, part: &str) -> NotationPlan {
        let state = self.state.borrow();
        let Some(reference) = state.artifacts.notation(part) else {
            return NotationPlan::Show(NotationView::Unavailable {
                part: part.to_string(),
            });
        };
        let name = file_name(reference).to_string();
        if NotationFormat::detect(reference).is_none() {
            return NotationPlan::Show(NotationView::Unsupported {
                part: part.to_string(),
                file_name: name,
            });
        }
        if self.renderer.is_none() {
            return NotationPlan::Show(NotationView::ViewerMissing);
        }
        NotationPlan::Fetch { file_name: name }
    }

    async fn load_notation(&self, part: &str, file_name: &str, generation: u64) -> NotationOutcome {
        let Some(renderer) = self.renderer.clone() else {
            return self.show(NotationView::ViewerMissing);
        };

        let source = self.backend.fetch_notation(file_name).await;
        if self.is_stale(generation) {
            debug!(part, file_name, "discarding stale notation fetch");
            return NotationOutcome::Superseded;
        }
        let source = match source {
            Ok(source) => source,
            Err(err) => {
                warn!(part, file_name, %err, "error loading notation");
                return self.failed(part, err.to_string());
            }
        };

        let handle = renderer.load_markup(&source).await;
        if self.is_stale(generation) {
            debug!(part, file_name, "discarding stale notation render");
            if let Ok(handle) = &handle {
                renderer.release(handle);
            }
            return NotationOutcome::Superseded;
        }
        let markup = handle.and_then(|handle| {
            let markup = render_responsive(renderer.as_ref(), &handle, 1, &self.options);
            renderer.release(&handle);
            markup
        });
        match markup {
            Ok(markup) => self.show(NotationView::Rendered {
                part: part.to_string(),
                markup,
            }),
            Err(err) => {
                warn!(part, file_name, %err, "error rendering notation");
                self.failed(part, err.to_string())
            }
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.state.borrow().generation != generation
    }

    fn failed(&self, part: &str, message: String) -> NotationOutcome {
        self.show(NotationView::Failed {
            part: part.to_string(),
            message,
        })
    }

    fn show(&self, view: NotationView) -> NotationOutcome {
        self.view.set_notation(view.clone());
        NotationOutcome::Shown(view)
    }
}
