use wasm_bindgen::prelude::*;

use crate::card::{FlipCard, RevertTimer};
use crate::types::WordPair;

/// The cards currently on screen. Replacing the words drops the old cards
/// and with them every armed revert.
///
/// Timer ids keep counting across replacements: a host timer still running
/// for a dropped card must not match a timer on the card that took its slot.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct FlipDeck {
    cards: Vec<FlipCard>,
    last_timer_id: u32,
}

#[wasm_bindgen]
impl FlipDeck {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    #[wasm_bindgen]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[wasm_bindgen]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[wasm_bindgen]
    pub fn label(&self, index: usize) -> Option<String> {
        self.cards.get(index).map(FlipCard::label)
    }

    #[wasm_bindgen]
    pub fn click(&mut self, index: usize, now: f64) -> Option<RevertTimer> {
        let timer = self.cards.get_mut(index)?.click(now);
        self.track(timer)
    }

    #[wasm_bindgen]
    pub fn hover_enter(&mut self, index: usize, now: f64, touch_capable: bool) -> Option<RevertTimer> {
        let timer = self.cards.get_mut(index)?.hover_enter(now, touch_capable);
        self.track(timer)
    }

    #[wasm_bindgen]
    pub fn hover_leave(&mut self, index: usize, now: f64, touch_capable: bool) -> Option<RevertTimer> {
        let timer = self.cards.get_mut(index)?.hover_leave(now, touch_capable);
        self.track(timer)
    }

    #[wasm_bindgen]
    pub fn fire(&mut self, index: usize, timer_id: u32) -> bool {
        self.cards
            .get_mut(index)
            .is_some_and(|card| card.fire(timer_id))
    }

    /// Reverts every card whose timer is due; returns the indices that changed.
    #[wasm_bindgen]
    pub fn poll(&mut self, now: f64) -> Vec<u32> {
        self.cards
            .iter_mut()
            .enumerate()
            .filter_map(|(index, card)| card.poll(now).then_some(index as u32))
            .collect()
    }

    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

impl FlipDeck {
    pub fn replace(&mut self, words: &[WordPair]) {
        let last = self.last_timer_id;
        self.cards = words
            .iter()
            .map(|pair| FlipCard::numbered_after(pair.native.clone(), pair.target.clone(), last))
            .collect();
    }

    pub fn cards(&self) -> &[FlipCard] {
        &self.cards
    }

    fn track(&mut self, timer: Option<RevertTimer>) -> Option<RevertTimer> {
        if let Some(armed) = timer {
            self.last_timer_id = self.last_timer_id.max(armed.id);
        }
        timer
    }
}
