//! End-to-end tests for the room card
//!
//! Load a configuration, push states through the card and check the view
//! model it produces.

use std::collections::{BTreeSet, HashMap};
use std::io::Write;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use room_card::{
    load_config_file, ChildCardView, ComponentRegistry, EntityState, EntityView, Hass, HeaderView,
    MainView, RoomCard, RoomCardConfig, States, ValueDisplay,
};
use serde_json::json;
use tokio::sync::watch;

const LIVING_ROOM: &str = r#"
type: custom:room-card
title:
  template: "{{ entity.attributes.friendly_name }} {{ entity.state }}°"
entity: sensor.living_temperature
info_entities:
  - sensor.living_humidity
  - entity: sensor.living_co2
    attribute: battery
entities:
  - entity: light.ceiling
    show_state: true
  - entity: light.lamp
    hide_unavailable: true
  - light.not_yet_loaded
  - entity: media_player.tv
    name:
      template: "states('media_player.tv'"
rows:
  - entities:
      - switch.fan
    content_alignment: center
  - entities:
      - switch.heater
    hide_if:
      conditions:
        - condition: equals
          value: "off"
          entity: climate.living
cards:
  - type: custom:mini-graph-card
    entity: sensor.living_temperature
  - type: entities
    entity: light.ceiling
    show_states: ["off"]
  - type: custom:button-card
    entity: light.missing
    show_states: ["on"]
"#;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn make_state(entity_id: &str, state: &str, attributes: serde_json::Value, secs: i64) -> EntityState {
    let attributes: HashMap<String, serde_json::Value> = serde_json::from_value(attributes).unwrap();
    EntityState::new(entity_id, state, attributes).with_timestamps(at(secs), at(secs))
}

fn make_living_room_states() -> States {
    [
        make_state(
            "sensor.living_temperature",
            "21.5",
            json!({"friendly_name": "Living room", "unit_of_measurement": "°C"}),
            0,
        ),
        make_state("sensor.living_humidity", "48", json!({"unit_of_measurement": "%"}), 0),
        make_state("sensor.living_co2", "610", json!({}), 0),
        make_state("light.ceiling", "on", json!({"friendly_name": "Ceiling"}), 0),
        make_state("light.lamp", "unavailable", json!({}), 0),
        make_state("media_player.tv", "playing", json!({}), 0),
        make_state("switch.fan", "off", json!({}), 0),
        make_state("switch.heater", "on", json!({}), 0),
        make_state("climate.living", "off", json!({}), 0),
    ]
    .into_iter()
    .collect()
}

fn load_living_room() -> RoomCardConfig {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("living_room.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(LIVING_ROOM.as_bytes()).unwrap();
    load_config_file(&path).unwrap()
}

/// Components become available when their names are published
struct WatchRegistry {
    defined: watch::Receiver<BTreeSet<String>>,
}

#[async_trait]
impl ComponentRegistry for WatchRegistry {
    async fn when_defined(&self, component: &str) {
        let mut defined = self.defined.clone();
        // A closed channel means nothing else will be defined
        let _ = defined.wait_for(|set| set.contains(component)).await;
    }
}

fn ready_registry(components: &[&str]) -> WatchRegistry {
    let set = components.iter().map(|c| c.to_string()).collect();
    let (_tx, rx) = watch::channel(set);
    WatchRegistry { defined: rx }
}

async fn configured_card() -> RoomCard {
    let mut card = RoomCard::new();
    card.set_config(load_living_room(), &ready_registry(&["mini-graph-card", "button-card"]))
        .await
        .unwrap();
    card
}

#[test]
fn test_loaded_config_tracks_every_entity() {
    let config = load_living_room();
    let tracked: BTreeSet<&str> = config.entity_ids.iter().map(String::as_str).collect();

    for id in [
        "sensor.living_temperature",
        "sensor.living_humidity",
        "sensor.living_co2",
        "light.ceiling",
        "light.lamp",
        "light.not_yet_loaded",
        "media_player.tv",
        "switch.fan",
        "switch.heater",
        "climate.living",
        "light.missing",
    ] {
        assert!(tracked.contains(id), "{} is not tracked", id);
    }
}

#[tokio::test]
async fn test_full_render() {
    let mut card = configured_card().await;
    assert!(card.set_hass(Hass::new(make_living_room_states())));
    assert!(card.should_update());

    let view = card.render().unwrap();

    // Header: templated title, primary value with unit
    match view.header.as_ref().unwrap() {
        HeaderView::Header(header) => {
            assert_eq!(header.title, "Living room 21.5°");
            assert_eq!(
                header.main,
                Some(MainView::Value {
                    value: ValueDisplay::Text {
                        value: "21.5".to_string(),
                        unit: Some("°C".to_string())
                    }
                })
            );
        }
        other => panic!("Expected header, got {:?}", other),
    }

    // Info entities: value display, missing attribute reported in place
    assert_eq!(view.info_entities.len(), 2);
    let humidity = view.info_entities[0].as_entity().unwrap();
    assert_eq!(
        humidity.value,
        Some(ValueDisplay::Text {
            value: "48".to_string(),
            unit: Some("%".to_string())
        })
    );
    match &view.info_entities[1] {
        EntityView::Error { message } => {
            assert_eq!(message, "Entity: 'sensor.living_co2' has no attribute named 'battery'")
        }
        other => panic!("Expected error node, got {:?}", other),
    }

    // Entities row: unavailable lamp hidden, unloaded light skipped,
    // broken name template reported in place
    let entities = view.entities.as_ref().unwrap();
    assert_eq!(entities.classes, "entities-row content-left");
    assert_eq!(entities.entities.len(), 2);
    let ceiling = entities.entities[0].as_entity().unwrap();
    assert_eq!(ceiling.entity_id, "light.ceiling");
    assert_eq!(ceiling.name.as_deref(), Some("Ceiling"));
    assert!(ceiling.value.is_some());
    match &entities.entities[1] {
        EntityView::Error { message } => assert!(message.starts_with("RoomCardTemplateError: ")),
        other => panic!("Expected error node, got {:?}", other),
    }

    // Rows: the heater row is hidden by the climate condition
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].classes, "entities-row content-center");
    assert_eq!(view.rows[0].entities[0].as_entity().unwrap().entity_id, "switch.fan");

    // Cards: graph shown, show_states hides the entities card, missing
    // show_states entity is an error
    assert_eq!(view.cards.len(), 2);
    assert!(matches!(
        &view.cards[0],
        ChildCardView::Card { config } if config.card_type == "custom:mini-graph-card"
    ));
    assert!(matches!(&view.cards[1], ChildCardView::Error { .. }));
}

#[tokio::test]
async fn test_only_tracked_changes_trigger_updates() {
    let mut card = configured_card().await;
    let mut states = make_living_room_states();
    assert!(card.set_hass(Hass::new(states.clone())));
    card.render().unwrap();

    // Same states again
    assert!(!card.set_hass(Hass::new(states.clone())));
    assert!(!card.should_update());

    // Somewhere else in the house
    states.insert(make_state("light.kitchen", "on", json!({}), 30));
    assert!(!card.set_hass(Hass::new(states.clone())));
    assert!(!card.should_update());

    // Heater row condition flips
    states.insert(make_state("climate.living", "heat", json!({}), 60));
    assert!(card.set_hass(Hass::new(states)));
    assert!(card.should_update());
    let view = card.render().unwrap();
    assert_eq!(view.rows.len(), 2);
}

#[tokio::test]
async fn test_set_config_waits_for_components() {
    let (tx, rx) = watch::channel(BTreeSet::new());
    let registry = WatchRegistry { defined: rx };
    let mut card = RoomCard::new();

    let define = async {
        tokio::task::yield_now().await;
        tx.send_modify(|set| {
            set.insert("mini-graph-card".to_string());
        });
        tokio::task::yield_now().await;
        tx.send_modify(|set| {
            set.insert("button-card".to_string());
        });
    };

    let (result, ()) = tokio::join!(card.set_config(load_living_room(), &registry), define);
    result.unwrap();

    assert!(card.set_hass(Hass::new(make_living_room_states())));
    assert!(card.should_update());
}

#[tokio::test]
async fn test_reconfiguring_resets_change_detection() {
    let mut card = configured_card().await;
    let states = make_living_room_states();
    assert!(card.set_hass(Hass::new(states.clone())));
    assert!(!card.set_hass(Hass::new(states.clone())));

    card.set_config(load_living_room(), &ready_registry(&["mini-graph-card", "button-card"]))
        .await
        .unwrap();
    // The held states are replayed as a first evaluation
    assert!(card.tracker().snapshot().is_some());
    assert!(card.should_update());
}

#[tokio::test]
async fn test_header_icon_slot() {
    let config: RoomCardConfig = serde_json::from_value(json!({
        "entity": "light.ceiling",
        "entities": [],
        "classes": ["big", "bold"],
        "icon": {"state_on": "mdi:lightbulb-on", "state_off": "mdi:lightbulb"},
        "tap_action": {"action": "toggle"}
    }))
    .unwrap();

    let mut card = RoomCard::new();
    card.set_config(config, &ready_registry(&[])).await.unwrap();
    card.set_hass(Hass::new(make_living_room_states()));
    let view = card.render().unwrap();

    match view.header.unwrap() {
        HeaderView::Header(header) => {
            assert!(header.actions.clickable);
            match header.main.unwrap() {
                MainView::Icon { icon, classes, .. } => {
                    assert_eq!(icon.icon.as_deref(), Some("mdi:lightbulb-on"));
                    assert_eq!(classes, "icon-small big bold");
                }
                other => panic!("Expected icon, got {:?}", other),
            }
        }
        other => panic!("Expected header, got {:?}", other),
    }
    assert_eq!(view.entities.map(|row| row.entities.len()), Some(0));
}

#[tokio::test]
async fn test_view_serializes() {
    let mut card = configured_card().await;
    card.set_hass(Hass::new(make_living_room_states()));
    let view = card.render().unwrap();

    let value = serde_json::to_value(&view).unwrap();
    assert_eq!(value["header"]["kind"], json!("header"));
    assert_eq!(value["cards"][0]["kind"], json!("card"));
    assert_eq!(value["cards"][0]["config"]["type"], json!("custom:mini-graph-card"));
    assert_eq!(value["info_entities"][1]["kind"], json!("error"));
}
