pub const SAME_LANGUAGE_ERROR: &str = "Please select different languages for source and target.";

/// Sent when the theme box is left empty.
pub const FALLBACK_THEME: &str = "basic vocabulary";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormValidation {
    /// At least one language is still unselected. No message is shown.
    Incomplete,
    SameLanguages,
    Valid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageForm {
    pub native: String,
    pub target: String,
    pub theme: String,
}

impl LanguageForm {
    pub fn validate(&self) -> FormValidation {
        let native = self.native.trim();
        let target = self.target.trim();
        if native.is_empty() || target.is_empty() {
            FormValidation::Incomplete
        } else if native == target {
            FormValidation::SameLanguages
        } else {
            FormValidation::Valid
        }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.native, &mut self.target);
    }

    pub fn theme_or_fallback(&self) -> String {
        let theme = self.theme.trim();
        if theme.is_empty() {
            FALLBACK_THEME.to_string()
        } else {
            theme.to_string()
        }
    }
}
