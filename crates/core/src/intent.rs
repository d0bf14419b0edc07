//! Keyword-based intent classification for user text.

use crate::persona::Intent;

const GREET_WORDS: &[&str] = &["hello", "hi", "hey"];
const LIGHT_WORDS: &[&str] = &["light", "bright", "see", "glow"];
const WARMTH_WORDS: &[&str] = &["warm", "heat", "hot", "cold", "chill"];

/// Classifies `text` by whole-word keyword match.
///
/// Warmth outranks light, light outranks a greeting. Text that matches nothing,
/// or whose intent is not in `allowed`, falls back to [`Intent::Reflect`].
pub fn classify(text: &str, allowed: &[Intent]) -> Intent {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .collect();
    let mentions = |keywords: &[&str]| words.iter().any(|w| keywords.contains(w));

    let intent = if mentions(WARMTH_WORDS) {
        Intent::AskWarmth
    } else if mentions(LIGHT_WORDS) {
        Intent::AskLight
    } else if mentions(GREET_WORDS) {
        Intent::Greet
    } else {
        Intent::Reflect
    };

    if allowed.contains(&intent) {
        intent
    } else {
        Intent::Reflect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        assert_eq!(classify("Hello there", &Intent::ALL), Intent::Greet);
        assert_eq!(classify("can you SEE me?", &Intent::ALL), Intent::AskLight);
        assert_eq!(classify("it's cold here", &Intent::ALL), Intent::AskWarmth);
        assert_eq!(classify("what are you?", &Intent::ALL), Intent::Reflect);
        assert_eq!(classify("", &Intent::ALL), Intent::Reflect);
    }

    #[test]
    fn test_classify_whole_words_only() {
        // "this" contains "hi", "shot" contains "hot"
        assert_eq!(classify("this shot", &Intent::ALL), Intent::Reflect);
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify("hey, is the light warm?", &Intent::ALL), Intent::AskWarmth);
        assert_eq!(classify("hi, I see a glow", &Intent::ALL), Intent::AskLight);
    }

    #[test]
    fn test_classify_respects_allow_list() {
        let allowed = [Intent::Greet, Intent::Reflect];
        assert_eq!(classify("is it warm?", &allowed), Intent::Reflect);
        assert_eq!(classify("hello", &allowed), Intent::Greet);
    }
}
