use wasm_bindgen::prelude::*;

use crate::api::{interpret_response, FetchError, WordsApi};
use crate::card::RevertTimer;
use crate::deck::FlipDeck;
use crate::form::{FormValidation, LanguageForm, SAME_LANGUAGE_ERROR};
use crate::types::{GenerateRequest, GenerateResponse, WordPair};

pub const DEFAULT_WORD_COUNT: u32 = 6;

/// Form, request lifecycle and displayed cards for the word generator.
///
/// A fetch is `begin_fetch` followed by exactly one `finish_fetch`; the
/// host may run the HTTP call itself in between, or hand a [`WordsApi`] to
/// [`WordsController::fetch_words`].
#[wasm_bindgen]
#[derive(Debug)]
pub struct WordsController {
    form: LanguageForm,
    requested_count: u32,
    enabled: bool,
    loading: bool,
    error: Option<String>,
    words: Vec<WordPair>,
    deck: FlipDeck,
}

#[wasm_bindgen]
impl WordsController {
    #[wasm_bindgen(constructor)]
    pub fn new(requested_count: Option<u32>) -> Self {
        Self {
            form: LanguageForm::default(),
            requested_count: requested_count.filter(|c| *c > 0).unwrap_or(DEFAULT_WORD_COUNT),
            enabled: false,
            loading: false,
            error: None,
            words: Vec::new(),
            deck: FlipDeck::new(),
        }
    }

    #[wasm_bindgen]
    pub fn set_native_language(&mut self, code: &str) {
        self.form.native = code.to_string();
        self.validate_form();
    }

    #[wasm_bindgen]
    pub fn set_target_language(&mut self, code: &str) {
        self.form.target = code.to_string();
        self.validate_form();
    }

    #[wasm_bindgen]
    pub fn set_theme(&mut self, theme: &str) {
        self.form.theme = theme.to_string();
        self.validate_form();
    }

    #[wasm_bindgen]
    pub fn native_language(&self) -> String {
        self.form.native.clone()
    }

    #[wasm_bindgen]
    pub fn target_language(&self) -> String {
        self.form.target.clone()
    }

    /// Recomputes whether generation is allowed and shows or clears the
    /// same-language message.
    #[wasm_bindgen]
    pub fn validate_form(&mut self) -> bool {
        let validation = self.form.validate();
        self.enabled = validation == FormValidation::Valid;
        if validation == FormValidation::SameLanguages {
            tracing::debug!(language = %self.form.native, "same language selected twice");
            self.error = Some(SAME_LANGUAGE_ERROR.to_string());
        } else {
            self.error = None;
        }
        self.enabled
    }

    #[wasm_bindgen]
    pub fn swap_languages(&mut self) {
        self.form.swap();
        self.validate_form();
    }

    /// Whether the generate action is clickable right now.
    #[wasm_bindgen]
    pub fn is_generate_enabled(&self) -> bool {
        self.enabled && !self.loading
    }

    #[wasm_bindgen]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[wasm_bindgen]
    pub fn error_message(&self) -> Option<String> {
        self.error.clone()
    }

    #[wasm_bindgen]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Starts a fetch and returns the JSON request body, or `null` when the
    /// action is disabled or a request is already in flight.
    #[wasm_bindgen(js_name = beginFetch)]
    pub fn begin_fetch_js(&mut self) -> Result<JsValue, JsValue> {
        match self.begin_fetch() {
            Some(request) => serde_wasm_bindgen::to_value(&request).map_err(JsValue::from),
            None => Ok(JsValue::NULL),
        }
    }

    /// Completes a fetch from the raw HTTP status and body.
    #[wasm_bindgen(js_name = finishFetch)]
    pub fn finish_fetch_js(&mut self, status: u16, body: &str) {
        self.finish_fetch(interpret_response(status, body));
    }

    /// Completes a fetch that never got a response.
    #[wasm_bindgen(js_name = failFetch)]
    pub fn fail_fetch_js(&mut self, message: &str) {
        self.finish_fetch(Err(FetchError::Transport(message.to_string())));
    }

    #[wasm_bindgen(js_name = words)]
    pub fn words_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.words).map_err(JsValue::from)
    }

    #[wasm_bindgen]
    pub fn card_label(&self, index: usize) -> Option<String> {
        self.deck.label(index)
    }

    #[wasm_bindgen]
    pub fn click_card(&mut self, index: usize, now: f64) -> Option<RevertTimer> {
        self.deck.click(index, now)
    }

    #[wasm_bindgen]
    pub fn hover_enter_card(&mut self, index: usize, now: f64, touch_capable: bool) -> Option<RevertTimer> {
        self.deck.hover_enter(index, now, touch_capable)
    }

    #[wasm_bindgen]
    pub fn hover_leave_card(&mut self, index: usize, now: f64, touch_capable: bool) -> Option<RevertTimer> {
        self.deck.hover_leave(index, now, touch_capable)
    }

    #[wasm_bindgen]
    pub fn fire_card_timer(&mut self, index: usize, timer_id: u32) -> bool {
        self.deck.fire(index, timer_id)
    }
}

impl WordsController {
    pub fn form(&self) -> &LanguageForm {
        &self.form
    }

    pub fn words(&self) -> &[WordPair] {
        &self.words
    }

    pub fn deck(&self) -> &FlipDeck {
        &self.deck
    }

    pub fn begin_fetch(&mut self) -> Option<GenerateRequest> {
        if !self.is_generate_enabled() {
            tracing::debug!(loading = self.loading, "generate ignored");
            return None;
        }

        self.loading = true;
        self.error = None;

        let request = GenerateRequest {
            l1: self.form.native.trim().to_string(),
            tl: self.form.target.trim().to_string(),
            theme: self.form.theme_or_fallback(),
            count: self.requested_count,
        };
        tracing::debug!(?request, "fetching words");
        Some(request)
    }

    /// Always leaves the controller out of the loading state. Failures keep
    /// the previously displayed words.
    pub fn finish_fetch(&mut self, outcome: Result<GenerateResponse, FetchError>) {
        self.loading = false;
        self.enabled = self.form.validate() == FormValidation::Valid;

        match outcome {
            Ok(response) if response.words.is_empty() => {
                self.show_failure(&FetchError::NoWords);
            }
            Ok(mut response) => {
                let limit = self.requested_count as usize;
                if response.words.len() < limit {
                    tracing::warn!(
                        received = response.words.len(),
                        requested = limit,
                        "fewer words than requested"
                    );
                }
                response.words.truncate(limit);
                self.deck.replace(&response.words);
                self.words = response.words;
            }
            Err(err) => self.show_failure(&err),
        }
    }

    /// Runs one full fetch through `api`. Returns false if nothing was sent.
    pub async fn fetch_words<A: WordsApi + ?Sized>(&mut self, api: &A) -> bool {
        let Some(request) = self.begin_fetch() else {
            return false;
        };
        let outcome = api.generate(&request).await;
        self.finish_fetch(outcome);
        true
    }

    fn show_failure(&mut self, err: &FetchError) {
        tracing::warn!(error = %err, "fetch failed");
        self.error = Some(format!("Failed to get words: {err}"));
    }
}

impl Default for WordsController {
    fn default() -> Self {
        Self::new(None)
    }
}
