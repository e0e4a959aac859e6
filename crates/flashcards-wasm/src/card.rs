use wasm_bindgen::prelude::*;

/// How long the translation stays visible after a flip.
pub const AUTO_REVERT_MS: f64 = 3000.0;
/// Revert delay once the pointer leaves a flipped card.
pub const HOVER_EXIT_REVERT_MS: f64 = 300.0;

const UNKNOWN_WORD: &str = "Unknown word";
const MISSING_TRANSLATION: &str = "Translation unavailable";

#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipFace {
    Front,
    Back,
}

/// A scheduled revert. The host arms a timer for `due_at` and reports back
/// with `id`; a report carrying a superseded id is ignored.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevertTimer {
    pub id: u32,
    pub due_at: f64,
}

#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct FlipCard {
    native: String,
    target: String,
    face: FlipFace,
    pending: Option<RevertTimer>,
    next_timer_id: u32,
}

#[wasm_bindgen]
impl FlipCard {
    #[wasm_bindgen(constructor)]
    pub fn new(native: String, target: String) -> Self {
        Self {
            native,
            target,
            face: FlipFace::Front,
            pending: None,
            next_timer_id: 0,
        }
    }

    #[wasm_bindgen]
    pub fn label(&self) -> String {
        let (text, fallback) = match self.face {
            FlipFace::Front => (&self.target, UNKNOWN_WORD),
            FlipFace::Back => (&self.native, MISSING_TRANSLATION),
        };
        if text.trim().is_empty() {
            fallback.to_string()
        } else {
            text.clone()
        }
    }

    #[wasm_bindgen]
    pub fn face(&self) -> FlipFace {
        self.face
    }

    #[wasm_bindgen]
    pub fn is_flipped(&self) -> bool {
        self.face == FlipFace::Back
    }

    #[wasm_bindgen]
    pub fn pending_revert(&self) -> Option<RevertTimer> {
        self.pending
    }

    /// Click or tap. Returns the timer to arm, if any.
    #[wasm_bindgen]
    pub fn click(&mut self, now: f64) -> Option<RevertTimer> {
        self.toggle(now)
    }

    /// Pointer entered. Touch devices synthesize hover events around taps,
    /// so hover only flips on pointer-capable, non-touch hosts.
    #[wasm_bindgen]
    pub fn hover_enter(&mut self, now: f64, touch_capable: bool) -> Option<RevertTimer> {
        if touch_capable {
            return None;
        }
        self.toggle(now)
    }

    /// Pointer left. A flipped card with an armed revert reverts soon
    /// instead of snapping back.
    #[wasm_bindgen]
    pub fn hover_leave(&mut self, now: f64, touch_capable: bool) -> Option<RevertTimer> {
        if touch_capable || self.face == FlipFace::Front || self.pending.is_none() {
            return None;
        }
        Some(self.arm(now + HOVER_EXIT_REVERT_MS))
    }

    /// The host timer for `timer_id` elapsed. Returns true if the card changed.
    #[wasm_bindgen]
    pub fn fire(&mut self, timer_id: u32) -> bool {
        match self.pending {
            Some(timer) if timer.id == timer_id => {
                self.pending = None;
                self.show_front()
            }
            _ => false,
        }
    }

    /// Clock-driven alternative to `fire`: reverts if the armed timer is due.
    #[wasm_bindgen]
    pub fn poll(&mut self, now: f64) -> bool {
        match self.pending {
            Some(timer) if timer.due_at <= now => self.fire(timer.id),
            _ => false,
        }
    }

    /// Drops any armed revert without changing the face.
    #[wasm_bindgen]
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl FlipCard {
    /// A card whose timer ids start after `last_timer_id`, so a host timer
    /// armed for an earlier card can never match one of its own.
    pub fn numbered_after(native: String, target: String, last_timer_id: u32) -> Self {
        Self {
            next_timer_id: last_timer_id,
            ..Self::new(native, target)
        }
    }

    pub fn native(&self) -> &str {
        &self.native
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn toggle(&mut self, now: f64) -> Option<RevertTimer> {
        self.pending = None;
        match self.face {
            FlipFace::Front => {
                self.face = FlipFace::Back;
                Some(self.arm(now + AUTO_REVERT_MS))
            }
            FlipFace::Back => {
                self.face = FlipFace::Front;
                None
            }
        }
    }

    fn arm(&mut self, due_at: f64) -> RevertTimer {
        self.next_timer_id = self.next_timer_id.wrapping_add(1);
        let timer = RevertTimer { id: self.next_timer_id, due_at };
        self.pending = Some(timer);
        timer
    }

    fn show_front(&mut self) -> bool {
        let changed = self.face == FlipFace::Back;
        self.face = FlipFace::Front;
        changed
    }
}
