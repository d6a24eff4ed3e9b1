use once_cell::sync::Lazy;
use std::collections::HashSet;

static ENGLISH_STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "because", "been",
        "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he", "her",
        "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "me", "my", "no", "not", "of",
        "on", "or", "our", "she", "so", "than", "that", "the", "their", "them", "then", "there", "these",
        "they", "this", "to", "too", "us", "was", "we", "were", "what", "when", "which", "who", "will",
        "with", "would", "you", "your",
    ]
    .into_iter()
    .collect()
});

/// Splits text into lower-case words for the full-text index.
///
/// Any character that is not alphanumeric separates words. English stop
/// words are dropped. The same text always yields the same words, in order
/// of appearance, duplicates included.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .filter(|word| !ENGLISH_STOP_WORDS.contains(word.as_str()))
        .collect()
}

pub fn is_stop_word(word: &str) -> bool {
    ENGLISH_STOP_WORDS.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_are_lowered_and_split() {
        assert_eq!(
            tokenize("The quick-brown Fox, jumped!"),
            vec!["quick", "brown", "fox", "jumped"]
        );
        assert_eq!(tokenize("Ørret i Bodø 2024"), vec!["ørret", "bodø", "2024"]);
    }

    #[test]
    fn test_blank_and_stop_word_only_text() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
        assert!(tokenize("!@#$%^&*()").is_empty());
        assert!(tokenize("to be or not to be").is_empty());
        assert!(is_stop_word("the"));
        assert!(!is_stop_word("fox"));
    }
}
