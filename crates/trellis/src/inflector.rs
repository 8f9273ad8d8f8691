//! English singular/plural inflection for resource and parameter names.
//!
//! Only the last `_`-separated word of a name is inflected, so
//! `blog_posts` singularizes to `blog_post`.

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "fish",
    "information",
    "jeans",
    "money",
    "news",
    "police",
    "rice",
    "series",
    "sheep",
    "species",
];

/// (singular, plural)
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("man", "men"),
    ("mouse", "mice"),
    ("move", "moves"),
    ("ox", "oxen"),
    ("person", "people"),
    ("quiz", "quizzes"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

/// Returns the singular form of `word`.
///
/// ```
/// use trellis::inflector::singularize;
///
/// assert_eq!(singularize("posts"), "post");
/// assert_eq!(singularize("categories"), "category");
/// assert_eq!(singularize("people"), "person");
/// assert_eq!(singularize("blog_posts"), "blog_post");
/// ```
#[must_use]
pub fn singularize(word: &str) -> String {
    inflect_last_word(word, singular_of)
}

/// Returns the plural form of `word`.
///
/// ```
/// use trellis::inflector::pluralize;
///
/// assert_eq!(pluralize("post"), "posts");
/// assert_eq!(pluralize("address"), "addresses");
/// assert_eq!(pluralize("person"), "people");
/// ```
#[must_use]
pub fn pluralize(word: &str) -> String {
    inflect_last_word(word, plural_of)
}

fn inflect_last_word(word: &str, inflect: fn(&str) -> String) -> String {
    match word.rsplit_once('_') {
        Some((head, last)) if !last.is_empty() => format!("{head}_{}", inflect(last)),
        _ => inflect(word),
    }
}

fn singular_of(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == word) {
        return (*singular).to_string();
    }
    if IRREGULAR.iter().any(|(singular, _)| *singular == word) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ovies") {
        return format!("{stem}ovie");
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    if word.ends_with("hives") {
        return word[..word.len() - 1].to_string();
    }
    if let Some(stem) = word.strip_suffix("ives") {
        return format!("{stem}ife");
    }
    if let Some(stem) = word.strip_suffix("lves") {
        return format!("{stem}lf");
    }
    for suffix in ["sses", "xes", "zzes", "ches", "shes", "statuses", "aliases", "buses"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

fn plural_of(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return (*plural).to_string();
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }
    if let Some(stem) = word.strip_suffix("ife") {
        return format!("{stem}ives");
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| word.ends_with(s)) {
        return format!("{word}es");
    }
    format!("{word}s")
}
