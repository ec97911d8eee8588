//! Keyword routing for free-form text

/// What a free-text message is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Catalog,
    Fallback,
}

/// Matches when the lower-cased text contains any of its keywords
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub intent: Intent,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(intent: Intent, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Plain substring test, no tokenisation: "hi" also matches "this"
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Ordered rules; the first matching rule decides the intent
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<KeywordRule>,
}

impl KeywordClassifier {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    pub fn classify(&self, text: &str) -> Intent {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::Fallback)
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(vec![
            KeywordRule::new(Intent::Greeting, &["привет", "hello", "hi"]),
            KeywordRule::new(Intent::Catalog, &["каталог", "модели", "машинки"]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_wins_over_catalog() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("привет каталог"), Intent::Greeting);
    }

    #[test]
    fn test_case_insensitive_substrings() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("ПРИВЕТСТВУЮ"), Intent::Greeting);
        assert_eq!(classifier.classify("Hello there"), Intent::Greeting);
        assert_eq!(classifier.classify("Покажите КАТАЛОГ"), Intent::Catalog);
        assert_eq!(classifier.classify("какие машинки есть?"), Intent::Catalog);
        assert_eq!(classifier.classify("this one"), Intent::Greeting);
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("сколько стоит доставка?"), Intent::Fallback);
        assert_eq!(classifier.classify(""), Intent::Fallback);
    }

    #[test]
    fn test_rule_order_decides() {
        let classifier = KeywordClassifier::new(vec![
            KeywordRule::new(Intent::Catalog, &["каталог"]),
            KeywordRule::new(Intent::Greeting, &["привет"]),
        ]);
        assert_eq!(classifier.classify("привет каталог"), Intent::Catalog);
    }
}
