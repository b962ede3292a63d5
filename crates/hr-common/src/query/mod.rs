pub mod constraint;
pub mod patterns;
pub mod vocabulary;

use std::collections::BTreeSet;
use std::ops::Range;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

pub use constraint::{Constraint, push_unique};
pub use patterns::ExperienceBound;
pub use vocabulary::QueryVocabulary;

use crate::skill_normalizer::is_common_word;

/// Longest skill phrase, in words, tried against the vocabulary ("react native", "amazon web services").
pub const MAX_PHRASE_WORDS: usize = 3;

/// Which recognized phrases are cut out of `semantic_text`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StripPolicy {
    /// Embed the raw text unchanged.
    None,
    /// Strip experience, availability and department phrases; skill words stay.
    #[default]
    Structural,
    /// Strip every recognized phrase, skills included.
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    pub raw_text: String,
    pub semantic_text: String,
    pub constraints: Vec<Constraint>,
}

impl ParsedQuery {
    pub fn has_constraints(&self) -> bool {
        !self.constraints.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhraseKind {
    Skill,
    Structural,
}

#[derive(Debug, Clone)]
struct Token {
    text: String,
    span: Range<usize>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '-' | '/')
}

fn trim_token(raw: &str, start: usize) -> Option<Token> {
    let lead = raw.len() - raw.trim_start_matches(['.', '-', '/']).len();
    let body = raw[lead..].trim_end_matches(['.', '-', '/']);
    if body.is_empty() {
        return None;
    }
    let start = start + lead;
    Some(Token {
        text: body.to_lowercase(),
        span: start..start + body.len(),
    })
}

/// Word tokens with byte spans. "ci/cd" stays whole when the vocabulary knows it,
/// otherwise "python/django" splits into its parts.
fn tokens(text: &str, vocabulary: &QueryVocabulary) -> Vec<Token> {
    let mut raw = Vec::new();
    let mut start = None;
    for (idx, c) in text.char_indices() {
        match (is_word_char(c), start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                raw.push((s, &text[s..idx]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        raw.push((s, &text[s..]));
    }

    let mut out = Vec::new();
    for (offset, word) in raw {
        let Some(token) = trim_token(word, offset) else {
            continue;
        };
        if !token.text.contains('/') || vocabulary.resolve_skill(&token.text).is_some() {
            out.push(token);
            continue;
        }
        let mut part_start = token.span.start;
        for part in text[token.span.clone()].split('/') {
            if let Some(piece) = trim_token(part, part_start) {
                out.push(piece);
            }
            part_start += part.len() + 1;
        }
    }
    out
}

/// Neighbouring words that mark an ambiguous word as a skill name.
const SKILL_CUES: &[&str] = &[
    "developer", "developers", "dev", "devs", "engineer", "engineers", "programmer",
    "programmers", "experience", "skills", "skill", "framework", "language", "lang",
    "backend", "stack", "code", "coding",
];

/// A skill spelling that is also an ordinary word ("go", "spring") only counts when
/// written as a name after the first word ("Who knows Go") or next to a cue word
/// ("go developers").
fn reads_as_skill(text: &str, tokens: &[Token], i: usize) -> bool {
    let token = &tokens[i];
    let mid_sentence = text[..token.span.start].chars().any(char::is_alphanumeric);
    let capitalized = text[token.span.clone()].chars().any(char::is_uppercase);
    let cued = [i.checked_sub(1), i.checked_add(1)]
        .into_iter()
        .flatten()
        .filter_map(|j| tokens.get(j))
        .any(|neighbour| SKILL_CUES.contains(&neighbour.text.as_str()));
    (mid_sentence && capitalized) || cued
}

fn overlaps(span: &Range<usize>, claimed: &[(Range<usize>, PhraseKind)]) -> bool {
    claimed
        .iter()
        .any(|(taken, _)| span.start < taken.end && taken.start < span.end)
}

/// Greedy longest-phrase scan over tokens not already claimed by a structural phrase.
fn find_skills(
    text: &str,
    vocabulary: &QueryVocabulary,
    claimed: &[(Range<usize>, PhraseKind)],
) -> Vec<(String, Range<usize>)> {
    let tokens: Vec<Token> = tokens(text, vocabulary)
        .into_iter()
        .filter(|token| !overlaps(&token.span, claimed))
        .collect();

    let mut found = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let mut advanced = 1;
        for n in (1..=MAX_PHRASE_WORDS.min(tokens.len() - i)).rev() {
            let window = &tokens[i..i + n];
            let span = window[0].span.start..window[n - 1].span.end;
            // a claimed phrase between the words breaks the phrase
            if n > 1 && overlaps(&span, claimed) {
                continue;
            }
            let phrase = window
                .iter()
                .map(|token| token.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if n == 1 && is_common_word(&phrase) && !reads_as_skill(text, &tokens, i) {
                continue;
            }
            if let Some(skill) = vocabulary.resolve_skill(&phrase) {
                found.push((skill, span));
                advanced = n;
                break;
            }
        }
        i += advanced;
    }
    found
}

fn strip_spans(text: &str, spans: &[Range<usize>]) -> String {
    let mut spans = spans.to_vec();
    spans.sort_by_key(|span| span.start);

    let mut kept = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in spans {
        if span.start > cursor {
            kept.push_str(&text[cursor..span.start]);
            kept.push(' ');
        }
        cursor = cursor.max(span.end);
    }
    if cursor < text.len() {
        kept.push_str(&text[cursor..]);
    }

    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| !c.is_alphanumeric() && !matches!(c, '+' | '#'))
        .trim()
        .to_string()
}

/// Turns raw query text into constraints plus the text to embed.
///
/// Recognition order is experience, availability, department, then skills; later
/// passes skip text already claimed. Output constraint order is fixed: skills,
/// experience, availability, department. Never fails; unrecognized text simply stays
/// in `semantic_text`.
pub fn interpret(raw_text: &str, vocabulary: &QueryVocabulary, strip: StripPolicy) -> ParsedQuery {
    let mut claimed: Vec<(Range<usize>, PhraseKind)> = Vec::new();

    let experience = patterns::find_experience(raw_text).map(|(bound, span)| {
        claimed.push((span, PhraseKind::Structural));
        bound
    });

    let availability = patterns::find_availability(raw_text)
        .filter(|(_, span)| !overlaps(span, &claimed))
        .map(|(state, span)| {
            claimed.push((span, PhraseKind::Structural));
            state
        });

    let department = vocabulary
        .find_department(raw_text)
        .filter(|(_, span)| !overlaps(span, &claimed))
        .map(|(name, span)| {
            claimed.push((span, PhraseKind::Structural));
            name
        });

    let mut skills = BTreeSet::new();
    for (skill, span) in find_skills(raw_text, vocabulary, &claimed) {
        skills.insert(skill);
        claimed.push((span, PhraseKind::Skill));
    }

    let mut constraints = Vec::new();
    if !skills.is_empty() {
        push_unique(&mut constraints, Constraint::SkillIn { skills });
    }
    match experience {
        Some(ExperienceBound::AtLeast(years)) => {
            push_unique(&mut constraints, Constraint::MinExperience { years });
        }
        Some(ExperienceBound::AtMost(years)) => {
            push_unique(&mut constraints, Constraint::MaxExperience { years });
        }
        None => {}
    }
    if let Some(availability) = availability {
        push_unique(&mut constraints, Constraint::AvailabilityEquals { availability });
    }
    if let Some(department) = department {
        push_unique(&mut constraints, Constraint::DepartmentEquals { department });
    }

    let removed: Vec<Range<usize>> = claimed
        .into_iter()
        .filter(|(_, kind)| match strip {
            StripPolicy::None => false,
            StripPolicy::Structural => *kind == PhraseKind::Structural,
            StripPolicy::All => true,
        })
        .map(|(span, _)| span)
        .collect();

    let semantic_text = if removed.is_empty() {
        raw_text.trim().to_string()
    } else {
        strip_spans(raw_text, &removed)
    };
    let semantic_text = if semantic_text.chars().any(char::is_alphanumeric) {
        semantic_text
    } else {
        raw_text.to_string()
    };

    ParsedQuery {
        raw_text: raw_text.to_string(),
        semantic_text,
        constraints,
    }
}

/// `interpret` bound to a strip policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryInterpreter {
    strip: StripPolicy,
}

impl QueryInterpreter {
    pub fn new(strip: StripPolicy) -> Self {
        Self { strip }
    }

    pub fn strip_policy(&self) -> StripPolicy {
        self.strip
    }

    pub fn interpret(&self, raw_text: &str, vocabulary: &QueryVocabulary) -> ParsedQuery {
        interpret(raw_text, vocabulary, self.strip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Availability;

    fn vocabulary() -> QueryVocabulary {
        let skills = [
            "python",
            "react",
            "aws",
            "docker",
            "postgresql",
            "java",
            "react native",
            "machine learning",
            "cicd",
            "django",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        QueryVocabulary::new(skills, ["Engineering".to_string(), "Design".into()])
    }

    fn skills(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn parse(text: &str) -> ParsedQuery {
        interpret(text, &vocabulary(), StripPolicy::default())
    }

    #[test]
    fn everyday_words_need_skill_context() {
        let vocab = QueryVocabulary::new(skills(&["golang", "spring", "swift"]), Vec::<String>::new());
        let constraints = |text: &str| interpret(text, &vocab, StripPolicy::default()).constraints;
        let skill_in = |items: &[&str]| vec![Constraint::SkillIn { skills: skills(items) }];

        assert!(constraints("people who can go onsite").is_empty());
        assert!(constraints("anyone starting this spring").is_empty());
        assert!(constraints("Go find me a designer").is_empty());
        assert_eq!(constraints("Who knows Go?"), skill_in(&["golang"]));
        assert_eq!(constraints("go developers"), skill_in(&["golang"]));
        assert_eq!(constraints("Swift engineers"), skill_in(&["swift"]));
        assert_eq!(constraints("spring boot experience"), skill_in(&["spring"]));
    }

    #[test]
    fn python_with_experience() {
        let parsed = parse("Find Python developers with 3+ years experience");
        assert_eq!(
            parsed.constraints,
            vec![
                Constraint::SkillIn { skills: skills(&["python"]) },
                Constraint::MinExperience { years: 3.0 },
            ]
        );
        assert_eq!(parsed.semantic_text, "Find Python developers");
        assert_eq!(parsed.raw_text, "Find Python developers with 3+ years experience");
    }

    #[test]
    fn upper_bound_experience_caps_years() {
        let parsed = parse("Python developers with less than 2 years");
        assert_eq!(
            parsed.constraints,
            vec![
                Constraint::SkillIn { skills: skills(&["python"]) },
                Constraint::MaxExperience { years: 2.0 },
            ]
        );
        assert_eq!(parsed.semantic_text, "Python developers");

        let parsed = parse("someone with under 3 years of experience");
        assert_eq!(parsed.constraints, vec![Constraint::MaxExperience { years: 3.0 }]);
    }

    #[test]
    fn both_skills_are_required() {
        let parsed = parse("Find developers who know both AWS and Docker");
        assert_eq!(
            parsed.constraints,
            vec![Constraint::SkillIn { skills: skills(&["aws", "docker"]) }]
        );
        assert_eq!(parsed.semantic_text, "Find developers who know both AWS and Docker");
    }

    #[test]
    fn aliases_and_multi_word_skills() {
        let parsed = parse("postgres and React Native people, ML a plus");
        assert_eq!(
            parsed.constraints,
            vec![Constraint::SkillIn {
                skills: skills(&["machine learning", "postgresql", "react native"])
            }]
        );
    }

    #[test]
    fn slash_tokens_split_unless_known() {
        let parsed = parse("python/django engineers with CI/CD");
        assert_eq!(
            parsed.constraints,
            vec![Constraint::SkillIn { skills: skills(&["cicd", "django", "python"]) }]
        );
    }

    #[test]
    fn availability_and_department() {
        let parsed = parse("Who is available in the Design team?");
        assert_eq!(
            parsed.constraints,
            vec![
                Constraint::AvailabilityEquals { availability: Availability::Available },
                Constraint::DepartmentEquals { department: "Design".into() },
            ]
        );
        assert_eq!(parsed.semantic_text, "Who is");
    }

    #[test]
    fn negated_availability() {
        let parsed = parse("Java engineers not available this month");
        assert!(parsed.constraints.contains(&Constraint::AvailabilityEquals {
            availability: Availability::Unavailable
        }));
    }

    #[test]
    fn falls_back_to_raw_text_when_everything_is_stripped() {
        let parsed = interpret("Python, 5 years", &vocabulary(), StripPolicy::All);
        assert_eq!(parsed.semantic_text, "Python, 5 years");
        assert_eq!(parsed.constraints.len(), 2);
    }

    #[test]
    fn strip_policy_controls_semantic_text() {
        let text = "React developers with at least 4 years";
        assert_eq!(interpret(text, &vocabulary(), StripPolicy::None).semantic_text, text);
        assert_eq!(
            interpret(text, &vocabulary(), StripPolicy::Structural).semantic_text,
            "React developers"
        );
        assert_eq!(interpret(text, &vocabulary(), StripPolicy::All).semantic_text, "developers");
    }

    #[test]
    fn unrecognized_text_yields_no_constraints() {
        let parsed = parse("someone good with people");
        assert!(!parsed.has_constraints());
        assert_eq!(parsed.semantic_text, "someone good with people");
        assert!(!parse("").has_constraints());
        assert_eq!(parse("  ").semantic_text, "  ");
    }

    #[test]
    fn department_without_cue_is_not_a_constraint() {
        let parsed = parse("design minded engineers");
        assert!(!parsed.has_constraints());
    }

    #[test]
    fn interpretation_is_deterministic() {
        let text = "available Python and AWS folks from Engineering, 2 yrs";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn strip_policy_parses_from_config_strings() {
        assert_eq!("ALL".parse::<StripPolicy>().ok(), Some(StripPolicy::All));
        assert_eq!(StripPolicy::default().as_ref(), "structural");
    }
}
