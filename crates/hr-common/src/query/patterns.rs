use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::Availability;

// "3+ years", "5 yrs of experience", "with 3 years", "at least 2.5 years", "minimum of 4 years",
// and the upper-bound forms "less than 2 years", "under 3 years", "4 years or less"
static EXPERIENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:with\s+)?(?:(?:(?P<upper>less\s+than|fewer\s+than|under|below|at\s+most|up\s+to|no\s+more\s+than|(?:a\s+)?maximum\s+of|max\.?)|at\s+least|(?:a\s+)?minimum\s+of|minimum|min\.?)\s+)?(?P<years>\d{1,2}(?:\.\d+)?)\s*\+?\s*-?\s*(?:years?|yrs?)\b(?:\s+of)?(?:\s+(?:experience|exp)\b)?(?:\s+or\s+(?:more\b|(?P<upper_tail>less|fewer)\b))?",
    )
    .expect("experience pattern compiles")
});

/// Experience bound stated in a query. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExperienceBound {
    AtLeast(f64),
    AtMost(f64),
}

static UNAVAILABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:currently\s+)?(?:unavailable|not\s+available|on\s+leave)\b")
        .expect("unavailable pattern compiles")
});

static AVAILABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:currently\s+|immediately\s+)?(?:available(?:\s+(?:now|immediately|right\s+now))?|free\s+(?:now|to\s+start)|not\s+busy|on\s+the\s+bench)\b",
    )
    .expect("available pattern compiles")
});

static BUSY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:currently\s+)?busy\b").expect("busy pattern compiles")
});

/// First experience phrase in `text` and its byte span. "less than", "under" and
/// "or less" forms give an upper bound; everything else is a minimum.
pub fn find_experience(text: &str) -> Option<(ExperienceBound, Range<usize>)> {
    EXPERIENCE_RE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let years: f64 = caps.name("years")?.as_str().parse().ok()?;
        let bound = if caps.name("upper").is_some() || caps.name("upper_tail").is_some() {
            ExperienceBound::AtMost(years)
        } else {
            ExperienceBound::AtLeast(years)
        };
        Some((bound, whole.range()))
    })
}

/// Availability phrase in `text`. Negated forms are checked before the bare word so
/// "not available" never reads as available.
pub fn find_availability(text: &str) -> Option<(Availability, Range<usize>)> {
    [
        (&*UNAVAILABLE_RE, Availability::Unavailable),
        (&*AVAILABLE_RE, Availability::Available),
        (&*BUSY_RE, Availability::Busy),
    ]
    .into_iter()
    .find_map(|(pattern, state)| pattern.find(text).map(|m| (state, m.range())))
}

/// Cue pattern for one department name: "in the Data Science team", "Design department".
pub fn department_pattern(name: &str) -> Option<Regex> {
    let words: Vec<String> = name.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }
    let name = words.join(r"\s+");
    let suffix = r"(?:department|dept|team|group|org)";
    Regex::new(&format!(
        r"(?i)\b(?:(?:in|from|within)\s+(?:the\s+)?{name}(?:\s+{suffix})?|{name}\s+{suffix})\b"
    ))
    .ok()
}
