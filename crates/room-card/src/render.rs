//! View-model assembly
//!
//! Walks the configuration once per render, resolving every visible
//! entity, row and nested card against the current states.

use indexmap::IndexMap;
use room_card_config::{
    has_action, ActionConfig, Alignment, CardConfig, Classes, EntityRef, RoomCardConfig,
};
use room_card_core::{EntityState, Hass};
use room_card_template::{EvalContext, TemplateEngine};
use std::sync::Arc;
use tracing::{trace, warn};

use crate::display::{render_value, state_display};
use crate::error::{RoomCardError, RoomCardResult};
use crate::icon::resolve_icon;
use crate::mapper::{map_state_object, resolve_presentation, ResolvedEntity};
use crate::view::{
    ActionFlags, CardView, ChildCardView, EntityItem, EntityView, HeaderContent, HeaderView,
    MainView, RowView,
};
use crate::visibility::{hide_if_card, hide_if_entity, hide_if_row};

/// Class list of an entities row: `entities-row content-<alignment>`
pub fn row_classes(alignment: Option<Alignment>, extra: Option<&Classes>) -> String {
    let mut classes = format!("entities-row content-{}", alignment.unwrap_or_default());
    if let Some(extra) = extra {
        classes.push(' ');
        classes.push_str(&extra.joined());
    }
    classes
}

/// Layout height of the card in rows
pub fn card_size(config: &RoomCardConfig) -> usize {
    let cards = config.cards.as_ref().map_or(0, Vec::len);
    let rows = config.rows.as_ref().map_or(0, Vec::len);
    let entities = config.entities.as_ref().map_or(0, |e| usize::from(!e.is_empty()));
    // A present `info_entities`, even an empty one, keeps the full header
    let main = if config.info_entities.is_none() && config.hide_title {
        1
    } else {
        2
    };
    cards + rows + entities + main
}

fn action_flags(
    tap: Option<&ActionConfig>,
    hold: Option<&ActionConfig>,
    double_tap: Option<&ActionConfig>,
) -> ActionFlags {
    ActionFlags {
        clickable: tap.is_some() || double_tap.is_some(),
        has_hold: has_action(hold),
        has_double_tap: has_action(double_tap),
    }
}

fn error_view(err: RoomCardError) -> EntityView {
    warn!(error = %err, "Entity failed to render");
    EntityView::Error {
        message: err.to_string(),
    }
}

/// Build the full view model for one evaluation
///
/// Card-level styles are the only part whose failure fails the whole card;
/// everything else reports errors in place.
pub fn render_card(
    config: &RoomCardConfig,
    hass: &Hass,
    engine: &TemplateEngine,
) -> RoomCardResult<CardView> {
    let primary = config.entity.as_deref().and_then(|id| hass.states.get(id));

    let card_styles = match &config.card_styles {
        Some(styles) => engine.render_styles(styles, EvalContext::new(hass, primary))?,
        None => IndexMap::new(),
    };

    let header = primary.and_then(|state| render_header(config, state, hass, engine));

    let info_entities = config
        .info_entities
        .iter()
        .flatten()
        .filter_map(|e| render_entity(e, config, hass, engine, info_entity_item))
        .collect();

    let entities = config.entities.as_ref().map(|list| RowView {
        classes: row_classes(config.content_alignment, None),
        entities: list
            .iter()
            .filter_map(|e| render_entity(e, config, hass, engine, row_entity_item))
            .collect(),
    });

    let rows = config
        .rows
        .iter()
        .flatten()
        .filter(|row| !hide_if_row(row, &hass.states))
        .map(|row| RowView {
            classes: row_classes(row.content_alignment, None),
            entities: row
                .entities
                .iter()
                .filter_map(|e| render_entity(e, config, hass, engine, row_entity_item))
                .collect(),
        })
        .collect();

    let cards = config
        .cards
        .iter()
        .flatten()
        .filter_map(|card| render_child_card(card, hass))
        .collect();

    Ok(CardView {
        card_styles,
        header,
        info_entities,
        entities,
        rows,
        cards,
    })
}

fn render_header(
    config: &RoomCardConfig,
    state: &Arc<EntityState>,
    hass: &Hass,
    engine: &TemplateEngine,
) -> Option<HeaderView> {
    if config.hide_title {
        return None;
    }

    Some(match header_content(config, state, hass, engine) {
        Ok(content) => HeaderView::Header(content),
        Err(err) => {
            warn!(error = %err, "Header failed to render");
            HeaderView::Error {
                message: err.to_string(),
            }
        }
    })
}

fn header_content(
    config: &RoomCardConfig,
    state: &Arc<EntityState>,
    hass: &Hass,
    engine: &TemplateEngine,
) -> RoomCardResult<HeaderContent> {
    let ctx = EvalContext::new(hass, Some(state));

    let title = match &config.title {
        Some(title) => engine.render_text(title, ctx)?,
        None => String::new(),
    };

    let styles = match &config.styles {
        Some(styles) => engine.render_styles(styles, ctx)?,
        None => IndexMap::new(),
    };

    let icon_slot = config.entities.as_ref().map_or(false, Vec::is_empty) || config.icon.is_some();
    let main = if icon_slot {
        match config.show_icon {
            Some(false) => None,
            _ => Some(MainView::Icon {
                icon: resolve_icon(config.icon.as_ref(), Some(state), hass, engine)?,
                classes: header_icon_classes(config.classes.as_ref()),
                state_color: config.state_color,
            }),
        }
    } else {
        let entity = map_state_object(&EntityRef::from(state.entity_id.as_str()), hass, config)?;
        if entity.config.show_state == Some(false) {
            None
        } else {
            let presentation = resolve_presentation(&entity, hass, engine)?;
            Some(MainView::Value {
                value: render_value(&entity, &presentation.icon)?,
            })
        }
    };

    Ok(HeaderContent {
        title,
        styles,
        main,
        actions: action_flags(
            config.tap_action.as_ref(),
            config.hold_action.as_ref(),
            config.double_tap_action.as_ref(),
        ),
    })
}

fn header_icon_classes(extra: Option<&Classes>) -> String {
    match extra {
        Some(extra) => format!("icon-small {}", extra.joined()),
        None => "icon-small".to_string(),
    }
}

type ItemBuilder = fn(&ResolvedEntity, &Hass, &TemplateEngine) -> RoomCardResult<EntityItem>;

/// Resolve one entity reference, skipping it when unloaded or hidden
fn render_entity(
    entity: &EntityRef,
    config: &RoomCardConfig,
    hass: &Hass,
    engine: &TemplateEngine,
    build: ItemBuilder,
) -> Option<EntityView> {
    let resolved = match map_state_object(entity, hass, config) {
        Ok(resolved) => resolved,
        Err(err) => return Some(error_view(err)),
    };

    if !resolved.is_loaded() {
        trace!(entity_id = ?resolved.entity_id(), "Skipping entity that is not loaded");
        return None;
    }
    if hide_if_entity(&resolved.config, &hass.states) {
        return None;
    }

    Some(build(&resolved, hass, engine).map_or_else(error_view, EntityView::Entity))
}

fn entity_actions(entity: &ResolvedEntity) -> ActionFlags {
    action_flags(
        entity.config.tap_action.as_ref(),
        entity.config.hold_action.as_ref(),
        entity.config.double_tap_action.as_ref(),
    )
}

fn row_entity_item(
    entity: &ResolvedEntity,
    hass: &Hass,
    engine: &TemplateEngine,
) -> RoomCardResult<EntityItem> {
    let presentation = resolve_presentation(entity, hass, engine)?;
    let config = &entity.config;

    let value = match config.show_state {
        Some(true) => Some(state_display(entity)?),
        _ => None,
    };

    Ok(EntityItem {
        entity_id: entity.entity_id().unwrap_or_default().to_string(),
        name: (config.show_name != Some(false)).then_some(presentation.name),
        icon: Some(presentation.icon),
        value,
        styles: presentation.styles,
        actions: entity_actions(entity),
    })
}

fn info_entity_item(
    entity: &ResolvedEntity,
    hass: &Hass,
    engine: &TemplateEngine,
) -> RoomCardResult<EntityItem> {
    let presentation = resolve_presentation(entity, hass, engine)?;

    Ok(EntityItem {
        entity_id: entity.entity_id().unwrap_or_default().to_string(),
        name: None,
        icon: None,
        value: Some(render_value(entity, &presentation.icon)?),
        styles: presentation.styles,
        actions: entity_actions(entity),
    })
}

fn render_child_card(card: &CardConfig, hass: &Hass) -> Option<ChildCardView> {
    match hide_if_card(card, &hass.states) {
        Ok(true) => None,
        Ok(false) => Some(ChildCardView::Card {
            config: card.clone(),
        }),
        Err(err) => {
            warn!(card_type = %card.card_type, error = %err, "Nested card failed to render");
            Some(ChildCardView::Error {
                message: err.to_string(),
            })
        }
    }
}
