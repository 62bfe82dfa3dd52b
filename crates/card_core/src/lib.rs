use shared::{
    domain::{CardConfig, CardStatus, CupState},
    error::PunchCardError,
    protocol::{CardEvent, CardView},
};
use storage::KeyValueStore;
use tracing::{debug, warn};

pub mod config;
mod store;

pub use store::{decode_punches, encode_punches, CardStore};

/// Visual surface a controller pushes its state to.
pub trait CardRenderer {
    fn render(&mut self, view: &CardView);
}

impl<R: CardRenderer + ?Sized> CardRenderer for &mut R {
    fn render(&mut self, view: &CardView) {
        (**self).render(view)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl CardRenderer for NullRenderer {
    fn render(&mut self, _view: &CardView) {}
}

/// Keeps the most recent view; immediate-mode surfaces draw from it.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    last: Option<CardView>,
    renders: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_view(&self) -> Option<&CardView> {
        self.last.as_ref()
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }
}

impl CardRenderer for RecordingRenderer {
    fn render(&mut self, view: &CardView) {
        self.last = Some(view.clone());
        self.renders += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampOutcome {
    Stamped,
    AlreadyStamped,
}

pub struct PunchCardController<S: KeyValueStore, R: CardRenderer> {
    config: CardConfig,
    punches: Vec<bool>,
    store: CardStore<S>,
    renderer: R,
    persistent: bool,
}

impl<S: KeyValueStore, R: CardRenderer> PunchCardController<S, R> {
    /// Builds the card from persisted state when it is usable, otherwise
    /// starts from an empty card. Renders once before returning.
    pub fn initialize(config: CardConfig, store: S, renderer: R) -> Self {
        let store = CardStore::new(store, config.storage_key(), config.total_punches());
        let punches = match store.load() {
            Ok(Some(punches)) => {
                debug!(
                    key = store.key(),
                    stamped = punches.iter().filter(|p| **p).count(),
                    "restored punch card"
                );
                punches
            }
            Ok(None) => vec![false; config.total_punches()],
            Err(err) => {
                warn!(
                    key = store.key(),
                    code = ?err.code(),
                    "discarding stored punch card: {err}"
                );
                vec![false; config.total_punches()]
            }
        };

        let mut controller = Self {
            config,
            punches,
            store,
            renderer,
            persistent: true,
        };
        controller.render();
        controller
    }

    pub fn stamp(&mut self, index: usize) -> Result<StampOutcome, PunchCardError> {
        let total = self.config.total_punches();
        let Some(slot) = self.punches.get_mut(index) else {
            return Err(PunchCardError::InvalidIndex { index, total });
        };

        if *slot {
            debug!(index, "cup already stamped");
            return Ok(StampOutcome::AlreadyStamped);
        }

        *slot = true;
        debug!(index, "stamped cup");
        self.persist();
        self.render();
        Ok(StampOutcome::Stamped)
    }

    pub fn reset(&mut self) {
        self.punches = vec![false; self.config.total_punches()];
        debug!(key = self.config.storage_key(), "reset punch card");
        self.persist();
        self.render();
    }

    pub fn handle_event(&mut self, event: CardEvent) -> Result<(), PunchCardError> {
        match event {
            CardEvent::CupClicked { index } => self.stamp(index).map(|_| ()),
            CardEvent::ResetRequested => {
                self.reset();
                Ok(())
            }
        }
    }

    pub fn compute_status(&self) -> CardStatus {
        CardStatus::compute(&self.punches, &self.config)
    }

    pub fn view(&self) -> CardView {
        CardView::from_punches(&self.punches, self.compute_status())
    }

    pub fn render(&mut self) {
        let view = self.view();
        self.renderer.render(&view);
    }

    pub fn punches(&self) -> &[bool] {
        &self.punches
    }

    pub fn cup_state(&self, index: usize) -> Option<CupState> {
        self.punches.get(index).copied().map(CupState::from_flag)
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    /// False while the latest write to the store has failed.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn store(&self) -> &S {
        self.store.inner()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.store.inner_mut()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_parts(self) -> (S, R) {
        (self.store.into_inner(), self.renderer)
    }

    fn persist(&mut self) {
        match self.store.save(&self.punches) {
            Ok(()) => {
                if !self.persistent {
                    debug!(key = self.store.key(), "punch card persistence restored");
                }
                self.persistent = true;
            }
            Err(err) => {
                warn!(
                    key = self.store.key(),
                    code = ?err.code(),
                    "continuing with in-memory punch card: {err}"
                );
                self.persistent = false;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
