//! The room card
//!
//! [`RoomCard`] owns the loaded configuration, the latest host state and
//! the change tracker, and decides when a new view model is worth
//! producing. The host drives it:
//!
//! 1. [`RoomCard::set_config`] once per configuration (re)load
//! 2. [`RoomCard::set_hass`] on every state push
//! 3. [`RoomCard::render`] whenever [`RoomCard::should_update`] says so

use async_trait::async_trait;
use futures::future::join_all;
use room_card_config::{collect_child_card_types, prepare_config, RoomCardConfig};
use room_card_core::Hass;
use room_card_template::TemplateEngine;
use tracing::{debug, info, instrument};

use crate::error::{RoomCardError, RoomCardResult};
use crate::render::{card_size, render_card};
use crate::tracker::Tracker;
use crate::view::CardView;

/// Host registry of externally provided card components
#[async_trait]
pub trait ComponentRegistry: Send + Sync {
    /// Resolve once `component` can be instantiated
    ///
    /// There is no timeout; a component that never registers stalls setup.
    async fn when_defined(&self, component: &str);
}

/// Room card state machine
#[derive(Default)]
pub struct RoomCard {
    config: Option<RoomCardConfig>,
    hass: Option<Hass>,
    tracker: Tracker,
    engine: TemplateEngine,
    /// Every `custom:` child component is available
    ready: bool,
    /// Something changed since the last render
    pending: bool,
}

impl RoomCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration and wait for its child card components
    ///
    /// Validation failures are returned before anything changes. The
    /// tracker starts over, so the next state push is a first evaluation.
    #[instrument(skip_all)]
    pub async fn set_config(
        &mut self,
        config: RoomCardConfig,
        registry: &dyn ComponentRegistry,
    ) -> RoomCardResult<()> {
        let config = prepare_config(config)?;
        let components = collect_child_card_types(config.cards.as_deref().unwrap_or_default());

        self.ready = false;
        self.tracker.reset();
        self.config = Some(config);

        debug!(count = components.len(), "Waiting for child card components");
        join_all(components.iter().map(|c| registry.when_defined(c))).await;
        self.ready = true;
        self.pending = true;

        // Catch up with the states we already hold
        if let Some(hass) = self.hass.take() {
            self.set_hass(hass);
        }

        info!(
            entities = self.config.as_ref().map_or(0, |c| c.entity_ids.len()),
            "Room card configured"
        );
        Ok(())
    }

    /// Accept a state push, returning whether any tracked entity changed
    #[instrument(skip_all)]
    pub fn set_hass(&mut self, hass: Hass) -> bool {
        let changed = match &self.config {
            Some(config) => self.tracker.update(&hass.states, &config.entity_ids),
            None => false,
        };
        if changed {
            self.pending = true;
        }
        self.hass = Some(hass);
        changed
    }

    /// Whether a render would show anything new
    ///
    /// Requires a configuration, a first snapshot of tracked entities, all
    /// child components, and a change since the last render.
    pub fn should_update(&self) -> bool {
        self.config.is_some() && self.tracker.snapshot().is_some() && self.ready && self.pending
    }

    /// Produce the view model for the current states
    #[instrument(skip_all)]
    pub fn render(&mut self) -> RoomCardResult<CardView> {
        let (Some(config), Some(hass)) = (&self.config, &self.hass) else {
            return Err(RoomCardError::NotReady);
        };

        let view = render_card(config, hass, &self.engine)?;
        self.pending = false;
        Ok(view)
    }

    /// Layout height in rows, once configured
    pub fn card_size(&self) -> Option<usize> {
        self.config.as_ref().map(card_size)
    }

    pub fn config(&self) -> Option<&RoomCardConfig> {
        self.config.as_ref()
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }
}
