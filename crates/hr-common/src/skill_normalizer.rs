use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;
use strsim::damerau_levenshtein;
use unicode_normalization::UnicodeNormalization;

/// Canonical skill → accepted spellings. Record skills and query phrases both resolve
/// through this table, so a query for "JS" matches an employee listed with "JavaScript".
const SKILL_ALIASES: &[(&str, &[&str])] = &[
    // JavaScript ecosystem
    (
        "javascript",
        &["js", "java script", "ecmascript", "es6", "es2015"],
    ),
    ("typescript", &["type script"]),
    ("nodejs", &["node.js", "node js", "node"]),
    // Frontend
    ("react", &["reactjs", "react.js", "react js"]),
    ("vue", &["vue.js", "vuejs", "vue js", "vue3"]),
    ("angular", &["angularjs", "angular.js"]),
    ("nextjs", &["next.js", "next js"]),
    ("html", &["html5"]),
    ("css", &["css3"]),
    ("tailwind", &["tailwindcss", "tailwind css"]),
    // Backend frameworks
    ("spring", &["spring boot", "springboot", "spring framework"]),
    ("django", &["django rest framework", "drf"]),
    ("flask", &["python flask"]),
    ("express", &["express.js", "expressjs"]),
    ("fastapi", &["fast api"]),
    ("graphql", &["graph ql"]),
    ("microservices", &["microservice", "micro services"]),
    // Databases
    ("postgresql", &["postgres", "postgre sql"]),
    ("mysql", &["my sql", "mariadb"]),
    ("mongodb", &["mongo", "mongo db"]),
    ("redis", &["redis cache"]),
    ("elasticsearch", &["elastic search"]),
    ("sql", &["structured query language"]),
    // Cloud platforms
    ("aws", &["amazon web services", "amazon aws"]),
    ("gcp", &["google cloud platform", "google cloud"]),
    ("azure", &["microsoft azure", "ms azure"]),
    ("firebase", &["google firebase"]),
    // Programming languages
    ("python", &["python3", "python 3", "py"]),
    ("java", &["java8", "java11", "java17", "openjdk"]),
    ("csharp", &["c#", "c sharp", ".net", "dotnet"]),
    ("cplusplus", &["c++", "cpp", "c plus plus"]),
    ("golang", &["go", "go lang"]),
    ("rust", &["rust lang", "rustlang"]),
    ("php", &["php7", "php8"]),
    ("ruby", &["ruby on rails", "rails"]),
    ("swift", &["swiftui"]),
    ("kotlin", &["kotlin jvm"]),
    ("scala", &["scala lang"]),
    // DevOps and tooling
    ("docker", &["docker container", "docker compose"]),
    ("kubernetes", &["k8s", "kube"]),
    ("terraform", &["hashicorp terraform"]),
    ("ansible", &["ansible playbooks"]),
    ("jenkins", &["jenkins ci"]),
    ("cicd", &["ci/cd", "ci cd", "continuous integration"]),
    ("devops", &["dev ops"]),
    ("git", &["github", "gitlab"]),
    // Machine learning and data
    ("machine learning", &["ml"]),
    ("deep learning", &["deep neural networks"]),
    ("ai", &["artificial intelligence"]),
    ("nlp", &["natural language processing"]),
    ("computer vision", &["image recognition"]),
    ("tensorflow", &["tensor flow"]),
    ("pytorch", &["torch", "py torch"]),
    ("scikit-learn", &["sklearn", "scikit learn"]),
    ("pandas", &["python pandas"]),
    ("numpy", &["numerical python"]),
    ("spark", &["apache spark", "pyspark"]),
    ("kafka", &["apache kafka"]),
    // Mobile
    ("react native", &["react-native", "reactnative"]),
    ("flutter", &["dart flutter"]),
    ("ios", &["iphone"]),
    ("android", &["android sdk"]),
    ("mobile", &["mobile development"]),
    // Design
    ("figma", &["figma design"]),
    ("ui/ux", &["ux", "ui", "ux design", "ui design"]),
];

static ALIAS_TO_CANONICAL: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (canonical, alias_list) in SKILL_ALIASES {
        map.insert(*canonical, *canonical);
        for alias in *alias_list {
            map.insert(*alias, *canonical);
        }
    }
    map
});

/// Same table keyed by separator-free spelling, to absorb "React JS" vs "react.js".
static COMPACT_ALIAS_TO_CANONICAL: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (alias, canonical) in ALIAS_TO_CANONICAL.iter() {
        map.entry(compact_key(alias)).or_insert(*canonical);
    }
    map
});

fn nfkc_lower_trim(input: &str) -> String {
    input
        .nfkc()
        .collect::<String>()
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn compact_key(input: &str) -> String {
    input
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-' | '_' | '/' | ','))
        .collect()
}

/// Shortest spelling considered for typo correction. Shorter names (nestjs, mssql,
/// preact) are often distinct technologies one edit away from a listed one.
const FUZZY_MIN_LEN: usize = 8;

/// One Damerau-Levenshtein edit against long spellings only, same first letter, and a
/// unique nearest canonical form.
fn fuzzy_match_canonical(compact: &str) -> Option<&'static str> {
    if compact.chars().count() < FUZZY_MIN_LEN {
        return None;
    }

    let mut candidates = BTreeSet::new();
    for (alias, &canonical) in COMPACT_ALIAS_TO_CANONICAL.iter() {
        if alias.chars().count() < FUZZY_MIN_LEN || alias.chars().next() != compact.chars().next() {
            continue;
        }
        if damerau_levenshtein(compact, alias) == 1 {
            candidates.insert(canonical);
        }
    }

    match candidates.len() {
        1 => candidates.pop_first(),
        _ => None,
    }
}

/// Skill spellings that are also everyday English words.
const COMMON_WORD_SPELLINGS: &[&str] = &[
    "go", "spring", "swift", "rust", "express", "spark", "rails", "flask", "torch", "ruby",
];

/// Whether `word` is a skill spelling that also reads as ordinary English ("go onsite").
pub fn is_common_word(word: &str) -> bool {
    COMMON_WORD_SPELLINGS.contains(&nfkc_lower_trim(word).as_str())
}

/// Exact alias lookup (verbatim or separator-insensitive). No typo tolerance, which keeps
/// free-text query scanning from inventing skills out of ordinary words.
pub fn lookup_alias(phrase: &str) -> Option<&'static str> {
    let normalized = nfkc_lower_trim(phrase);
    if normalized.is_empty() {
        return None;
    }
    if let Some(canonical) = ALIAS_TO_CANONICAL.get(normalized.as_str()) {
        return Some(*canonical);
    }
    COMPACT_ALIAS_TO_CANONICAL
        .get(&compact_key(&normalized))
        .copied()
}

/// Every known spelling of `canonical`, canonical form first. Unknown skills map to
/// themselves only.
pub fn spellings_of(canonical: &str) -> Vec<String> {
    let mut spellings = vec![canonical.to_string()];
    if let Some((_, aliases)) = SKILL_ALIASES.iter().find(|(c, _)| *c == canonical) {
        spellings.extend(aliases.iter().map(|alias| (*alias).to_string()));
    }
    spellings
}

/// Resolve a skill label to its canonical token.
pub fn normalize_skill(skill: &str) -> String {
    let normalized = nfkc_lower_trim(skill);
    if normalized.is_empty() {
        return normalized;
    }
    if let Some(canonical) = lookup_alias(&normalized) {
        return canonical.to_string();
    }
    if let Some(canonical) = fuzzy_match_canonical(&compact_key(&normalized)) {
        return canonical.to_string();
    }
    normalized
}

/// Normalized, deduplicated skill set. Ordered so iteration is deterministic.
pub fn normalize_skill_set<S: AsRef<str>>(skills: &[S]) -> BTreeSet<String> {
    skills
        .iter()
        .map(|s| normalize_skill(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_form() {
        assert_eq!(normalize_skill("JavaScript"), "javascript");
        assert_eq!(normalize_skill("js"), "javascript");
        assert_eq!(normalize_skill("K8s"), "kubernetes");
        assert_eq!(normalize_skill("C#"), "csharp");
        assert_eq!(normalize_skill("Postgres"), "postgresql");
        assert_eq!(normalize_skill("Node.js"), "nodejs");
    }

    #[test]
    fn normalizes_fullwidth_and_separators() {
        assert_eq!(normalize_skill("ＡＷＳ"), "aws");
        assert_eq!(normalize_skill("React JS"), "react");
        assert_eq!(normalize_skill("  Machine   Learning "), "machine learning");
    }

    #[test]
    fn tolerates_small_typos_for_long_skills() {
        assert_eq!(normalize_skill("javascirpt"), "javascript");
        assert_eq!(normalize_skill("kuberntes"), "kubernetes");
    }

    #[test]
    fn short_tokens_never_fuzzy_match() {
        assert_eq!(normalize_skill("jav"), "jav");
        assert_eq!(lookup_alias("good"), None);
    }

    #[test]
    fn neighbouring_technologies_stay_distinct() {
        assert_eq!(normalize_skill("NestJS"), "nestjs");
        assert_eq!(normalize_skill("MSSQL"), "mssql");
        assert_eq!(normalize_skill("Preact"), "preact");
        assert_eq!(normalize_skill("Swifty"), "swifty");
        assert_eq!(normalize_skill("Next.js"), "nextjs");
        assert_eq!(normalize_skill("MySQL"), "mysql");
    }

    #[test]
    fn fuzzy_match_needs_a_single_nearest_skill() {
        assert_eq!(fuzzy_match_canonical("kubernets"), Some("kubernetes"));
        assert_eq!(fuzzy_match_canonical("tensorflw"), Some("tensorflow"));
        assert_eq!(fuzzy_match_canonical("xubernetes"), None);
    }

    #[test]
    fn flags_skills_that_double_as_words() {
        assert!(is_common_word("go"));
        assert!(is_common_word("Spring"));
        assert!(!is_common_word("spring boot"));
        assert!(!is_common_word("kubernetes"));
    }

    #[test]
    fn unknown_skills_pass_through_lowercased() {
        assert_eq!(normalize_skill("Haskell"), "haskell");
        assert_eq!(spellings_of("haskell"), vec!["haskell".to_string()]);
    }

    #[test]
    fn skill_set_is_deduplicated_and_sorted() {
        let set = normalize_skill_set(&["Python", "py", "AWS", "", "docker"]);
        let items: Vec<_> = set.into_iter().collect();
        assert_eq!(items, vec!["aws", "docker", "python"]);
    }

    #[test]
    fn spellings_include_aliases() {
        let spellings = spellings_of("kubernetes");
        assert_eq!(spellings[0], "kubernetes");
        assert!(spellings.contains(&"k8s".to_string()));
    }
}
