//! Card-tree discovery
//!
//! Nested cards may contain their own `cards`, to any depth. The walks here
//! are iterative with an explicit depth bound so a deeply nested (or
//! hand-crafted) configuration cannot exhaust the call stack.

use std::collections::BTreeSet;
use tracing::warn;

use crate::card::CardConfig;

/// Deepest nesting level visited; deeper subtrees are skipped
pub const MAX_CARD_DEPTH: usize = 32;

/// Visit every card in the tree, parents before children
///
/// Cards at depth `MAX_CARD_DEPTH` or deeper are not visited.
pub fn walk_cards<'a>(cards: &'a [CardConfig], mut visit: impl FnMut(&'a CardConfig)) {
    let mut stack: Vec<(&'a CardConfig, usize)> = cards.iter().rev().map(|c| (c, 0)).collect();

    while let Some((card, depth)) = stack.pop() {
        if depth >= MAX_CARD_DEPTH {
            warn!(card_type = %card.card_type, depth, "Card nesting too deep, skipping subtree");
            continue;
        }

        visit(card);

        stack.extend(card.cards.iter().rev().map(|c| (c, depth + 1)));
    }
}

/// Collect the component names of every `custom:` card in the tree
///
/// These are the externally registered types that must be available
/// before the card can render its children.
pub fn collect_child_card_types(cards: &[CardConfig]) -> BTreeSet<String> {
    let mut types = BTreeSet::new();
    walk_cards(cards, |card| {
        if let Some(custom) = card.custom_type() {
            types.insert(custom.to_string());
        }
    });
    types
}

/// Collect every entity a card (and its nested cards) is bound to
///
/// Includes each card's `entity`, each entry of its `entities` (bare
/// identifiers or `{entity: ...}` descriptors), and the explicit entities
/// of its `hide_if` conditions.
pub fn card_entities(card: &CardConfig) -> Vec<String> {
    let mut entities = Vec::new();
    walk_cards(std::slice::from_ref(card), |c| {
        entities.extend(c.entity.iter().cloned());
        entities.extend(c.listed_entities().map(String::from));
        if let Some(hide_if) = &c.hide_if {
            entities.extend(hide_if.condition_entities().map(String::from));
        }
    });
    entities
}
