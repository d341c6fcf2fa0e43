//! Pure rendering of the monitor list.
//!
//! DESIGN
//! ======
//! `render` maps the client's [`ListState`] to the desired [`ListView`];
//! `diff` turns two views into the [`ViewPatch`]es an adapter applies. Cards
//! are addressed by a deterministic element id so removal is targeted and
//! never needs a full re-render. Applying `diff(prev, next)` to `prev` always
//! yields `next`.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use crate::api::{Monitor, MonitorId};

pub const LOADING_MESSAGE: &str = "Loading monitors...";
pub const EMPTY_MESSAGE: &str = "No monitors added yet. Add one using the form!";
pub const LOAD_ERROR_MESSAGE: &str = "Error: Could not load monitors.";

pub const SUBMIT_IDLE_LABEL: &str = "Start Monitoring";
pub const SUBMIT_PENDING_LABEL: &str = "Adding...";

/// Element id of the card for monitor `id`.
#[must_use]
pub fn card_element_id(id: &MonitorId) -> String {
    format!("monitor-{id}")
}

/// Monitor targeted by a card's delete button, read from its `data-id`
/// attribute. A missing or blank attribute targets nothing.
#[must_use]
pub fn delete_target(data_id: Option<&str>) -> Option<MonitorId> {
    data_id.map(str::trim).filter(|id| !id.is_empty()).map(MonitorId::from)
}

/// Rendered projection of one monitor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub element_id: String,
    /// Target of the card's delete control.
    pub monitor_id: MonitorId,
    pub url: String,
    pub css_selector: String,
    pub user_email: String,
}

impl From<&Monitor> for Card {
    fn from(monitor: &Monitor) -> Self {
        Self {
            element_id: card_element_id(&monitor.id),
            monitor_id: monitor.id.clone(),
            url: monitor.url.clone(),
            css_selector: monitor.css_selector.clone(),
            user_email: monitor.user_email.clone(),
        }
    }
}

/// What the list region shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ListView {
    #[default]
    Loading,
    Empty,
    Error(String),
    Cards(Vec<Card>),
}

impl ListView {
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        match self {
            Self::Cards(cards) => cards,
            _ => &[],
        }
    }

    /// Placeholder text, when the list shows one instead of cards.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Loading => Some(LOADING_MESSAGE),
            Self::Empty => Some(EMPTY_MESSAGE),
            Self::Error(message) => Some(message),
            Self::Cards(_) => None,
        }
    }

    /// Apply one patch, the way a DOM adapter would.
    pub fn apply(&mut self, patch: &ViewPatch) {
        match patch {
            ViewPatch::ShowLoading => *self = Self::Loading,
            ViewPatch::ShowEmpty => *self = Self::Empty,
            ViewPatch::ShowError(message) => *self = Self::Error(message.clone()),
            ViewPatch::ClearPlaceholder => *self = Self::Cards(Vec::new()),
            ViewPatch::AppendCard(card) => match self {
                Self::Cards(cards) => cards.push(card.clone()),
                _ => *self = Self::Cards(vec![card.clone()]),
            },
            ViewPatch::RemoveCard(element_id) => {
                if let Self::Cards(cards) = self {
                    cards.retain(|card| &card.element_id != element_id);
                }
            }
            ViewPatch::ReplaceCards(cards) => *self = Self::Cards(cards.clone()),
        }
    }

    pub fn apply_all(&mut self, patches: &[ViewPatch]) {
        for patch in patches {
            self.apply(patch);
        }
    }
}

/// One mutation of the rendered list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewPatch {
    ShowLoading,
    ShowEmpty,
    ShowError(String),
    /// Drop any placeholder and leave an empty card container.
    ClearPlaceholder,
    AppendCard(Card),
    /// Remove the card with this element id, if present.
    RemoveCard(String),
    ReplaceCards(Vec<Card>),
}

/// Client-side knowledge of the monitor set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ListState {
    /// No list response yet.
    #[default]
    Loading,
    /// The last list request failed and nothing has been applied since.
    Failed,
    /// Monitors last fetched or locally applied, in display order.
    Loaded(Vec<Monitor>),
}

impl ListState {
    #[must_use]
    pub fn monitors(&self) -> &[Monitor] {
        match self {
            Self::Loaded(monitors) => monitors,
            _ => &[],
        }
    }
}

/// Desired view for `state`.
#[must_use]
pub fn render(state: &ListState) -> ListView {
    match state {
        ListState::Loading => ListView::Loading,
        ListState::Failed => ListView::Error(LOAD_ERROR_MESSAGE.to_owned()),
        ListState::Loaded(monitors) if monitors.is_empty() => ListView::Empty,
        ListState::Loaded(monitors) => ListView::Cards(monitors.iter().map(Card::from).collect()),
    }
}

/// Patches turning `prev` into `next`.
///
/// Card lists are updated in place (removals, then appends) when that
/// reproduces `next` exactly; otherwise the cards are replaced wholesale.
#[must_use]
pub fn diff(prev: &ListView, next: &ListView) -> Vec<ViewPatch> {
    if prev == next {
        return Vec::new();
    }

    let next_cards = match next {
        ListView::Loading => return vec![ViewPatch::ShowLoading],
        ListView::Empty => return vec![ViewPatch::ShowEmpty],
        ListView::Error(message) => return vec![ViewPatch::ShowError(message.clone())],
        ListView::Cards(cards) => cards,
    };

    let ListView::Cards(prev_cards) = prev else {
        let mut patches = Vec::with_capacity(next_cards.len() + 1);
        patches.push(ViewPatch::ClearPlaceholder);
        patches.extend(next_cards.iter().cloned().map(ViewPatch::AppendCard));
        return patches;
    };

    let removed: Vec<&Card> = prev_cards.iter().filter(|card| !next_cards.contains(card)).collect();
    let added: Vec<&Card> = next_cards.iter().filter(|card| !prev_cards.contains(card)).collect();

    // RemoveCard works by element id, so a removed card must not share its id
    // with a card that stays.
    let removal_is_targeted = removed.iter().all(|gone| {
        prev_cards
            .iter()
            .filter(|card| card.element_id == gone.element_id)
            .all(|card| !next_cards.contains(card))
    });
    let in_place_order = prev_cards
        .iter()
        .filter(|card| next_cards.contains(card))
        .chain(added.iter().copied());

    if !removal_is_targeted || !in_place_order.eq(next_cards.iter()) {
        return vec![ViewPatch::ReplaceCards(next_cards.clone())];
    }

    let mut removed_ids: Vec<&str> = Vec::new();
    for card in &removed {
        if !removed_ids.contains(&card.element_id.as_str()) {
            removed_ids.push(&card.element_id);
        }
    }

    removed_ids
        .into_iter()
        .map(|id| ViewPatch::RemoveCard(id.to_owned()))
        .chain(added.into_iter().cloned().map(ViewPatch::AppendCard))
        .collect()
}

// =============================================================================
// SINK
// =============================================================================

/// Submit control state while a create request is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitState {
    #[default]
    Idle,
    Pending,
}

impl SubmitState {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => SUBMIT_IDLE_LABEL,
            Self::Pending => SUBMIT_PENDING_LABEL,
        }
    }

    #[must_use]
    pub fn disabled(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Presentation adapter driven by the client.
pub trait ViewSink {
    /// Apply list patches in order.
    fn apply(&mut self, patches: &[ViewPatch]);

    /// Reflect the submit control state (label + enabled).
    fn set_submit_state(&mut self, state: SubmitState);

    /// Clear the create form's fields.
    fn reset_form(&mut self);
}
