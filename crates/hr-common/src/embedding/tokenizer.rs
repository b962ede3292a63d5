use crate::skill_normalizer::lookup_alias;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedToken {
    pub token: String,
    pub weight: f32,
}

impl WeightedToken {
    pub fn new(token: impl Into<String>, weight: f32) -> Self {
        Self {
            token: token.into(),
            weight,
        }
    }
}

/// Function words and the field labels of the canonical record text. They occur in
/// every record, so hashing them only adds a shared offset to all vectors.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "any", "are", "as", "at", "be", "both", "but", "by", "can", "do",
    "find", "for", "from", "get", "has", "have", "i", "in", "is", "it", "know", "knows",
    "looking", "me", "need", "of", "on", "or", "our", "please", "show", "some", "someone",
    "that", "the", "their", "them", "to", "us", "want", "we", "who", "with", "within",
    "name", "role", "department", "experience", "years", "year", "skills", "projects",
    "availability",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '-' | '/')
}

/// Split into lowercase words, keeping `c++`, `c#`, `node.js` and `ci/cd` intact.
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !is_word_char(c))
        .map(|word| word.trim_matches(|c: char| matches!(c, '.' | '-' | '/')))
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Free text → weighted tokens for feature hashing.
///
/// Token forms:
/// - `term:<canonical>`  known skill spelling, folded to its canonical form (weight 2.0);
///   two-word skills ("machine learning") are detected before single words
/// - `word:<word>`       any other non-stopword (weight 1.0)
pub fn tokenize_text(text: &str) -> Vec<WeightedToken> {
    let words = words(text);
    let mut tokens = Vec::with_capacity(words.len());

    let mut i = 0;
    while i < words.len() {
        if i + 1 < words.len() {
            let pair = format!("{} {}", words[i], words[i + 1]);
            if let Some(canonical) = lookup_alias(&pair) {
                tokens.push(WeightedToken::new(format!("term:{canonical}"), 2.0));
                i += 2;
                continue;
            }
        }

        let word = words[i].as_str();
        if let Some(canonical) = lookup_alias(word) {
            tokens.push(WeightedToken::new(format!("term:{canonical}"), 2.0));
        } else if !STOPWORDS.contains(&word) {
            tokens.push(WeightedToken::new(format!("word:{word}"), 1.0));
        }
        i += 1;
    }

    tokens
}
