use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HardBlockChoice {
    GoBack,
    ProceedAnyway,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardBlockDecision {
    pub target: String,
    /// Skip checks for the next navigation to `target`.
    pub bypass: bool,
}

/// Warning page for a URL the oracle flagged. No timer; the user decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardBlockPage {
    original_url: String,
}

impl HardBlockPage {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
        }
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn choose(&self, choice: HardBlockChoice, safe_default_url: &str) -> HardBlockDecision {
        match choice {
            HardBlockChoice::GoBack => HardBlockDecision {
                target: safe_default_url.to_string(),
                bypass: false,
            },
            HardBlockChoice::ProceedAnyway => HardBlockDecision {
                target: self.original_url.clone(),
                bypass: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proceed_anyway_keeps_exact_url() {
        let original = "http://Example-Bank-Login.test/path?q=a%20b&x=1#top";
        let page = HardBlockPage::new(original);
        let decision = page.choose(HardBlockChoice::ProceedAnyway, "https://www.google.com");
        assert_eq!(decision.target, original);
        assert!(decision.bypass);
    }

    #[test]
    fn test_go_back_uses_safe_default() {
        let page = HardBlockPage::new("http://example-bank-login.test");
        let decision = page.choose(HardBlockChoice::GoBack, "https://www.google.com");
        assert_eq!(decision.target, "https://www.google.com");
        assert!(!decision.bypass);
    }
}
