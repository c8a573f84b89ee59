//! Message area shown under the form

/// Which kind of message is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    None,
    Error,
    Success,
}

/// Message text plus its border and background tint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

impl Feedback {
    /// Generic message for any failed constraint
    pub const ERROR_MESSAGE: &'static str = "Confira os campos destacados e tente novamente.";

    /// Empty area, inline tints removed
    pub fn none() -> Self {
        Self {
            kind: FeedbackKind::None,
            message: String::new(),
        }
    }

    pub fn error() -> Self {
        Self {
            kind: FeedbackKind::Error,
            message: Self::ERROR_MESSAGE.to_string(),
        }
    }

    /// Personalized greeting after a valid submit
    pub fn success(display_name: &str) -> Self {
        Self {
            kind: FeedbackKind::Success,
            message: format!(
                "Acesso concedido, {}. Um operador entrará em contato por e\u{2011}mail.",
                display_name
            ),
        }
    }

    pub fn border_color(&self) -> Option<&'static str> {
        match self.kind {
            FeedbackKind::None => None,
            FeedbackKind::Error => Some("rgba(255,64,96,0.6)"),
            FeedbackKind::Success => Some("rgba(0,255,65,0.35)"),
        }
    }

    pub fn background(&self) -> Option<&'static str> {
        match self.kind {
            FeedbackKind::None => None,
            FeedbackKind::Error => Some("rgba(255,64,96,0.08)"),
            FeedbackKind::Success => Some("rgba(0,255,65,0.07)"),
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == FeedbackKind::None
    }
}

impl Default for Feedback {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_message_text() {
        assert_eq!(
            Feedback::success("Ada").message,
            "Acesso concedido, Ada. Um operador entrará em contato por e‑mail."
        );
    }

    #[test]
    fn test_styles_per_kind() {
        assert_eq!(Feedback::none().border_color(), None);
        assert_eq!(Feedback::none().background(), None);
        assert_eq!(Feedback::error().border_color(), Some("rgba(255,64,96,0.6)"));
        assert_eq!(Feedback::error().background(), Some("rgba(255,64,96,0.08)"));
        assert_eq!(Feedback::success("x").border_color(), Some("rgba(0,255,65,0.35)"));
        assert_eq!(Feedback::success("x").background(), Some("rgba(0,255,65,0.07)"));
    }
}
