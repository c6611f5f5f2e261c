//! Dictionary-free part-of-speech tagging and lemmatization.
//!
//! Tagging looks only at the word itself (suffix shape plus a table of
//! irregular verb forms); anything not recognized is tagged as a noun.
//! Lemmatization applies per-tag suffix rules in the style of WordNet's
//! morphological analyzer, with exception tables standing in for the
//! dictionary lookup.

use lazy_static::lazy_static;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pos {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

lazy_static! {
    static ref NOUN_EXCEPTIONS: HashMap<&'static str, &'static str> = [
        ("analyses", "analysis"), ("metastases", "metastasis"), ("diagnoses", "diagnosis"),
        ("prognoses", "prognosis"), ("hypotheses", "hypothesis"), ("syntheses", "synthesis"),
        ("criteria", "criterion"), ("phenomena", "phenomenon"), ("bacteria", "bacterium"),
        ("indices", "index"), ("matrices", "matrix"), ("appendices", "appendix"),
        ("mice", "mouse"), ("women", "woman"), ("men", "man"), ("children", "child"),
        ("feet", "foot"), ("teeth", "tooth"), ("lives", "life"), ("halves", "half"),
        ("series", "series"), ("species", "species"),
    ]
    .into_iter()
    .collect();

    static ref VERB_EXCEPTIONS: HashMap<&'static str, &'static str> = [
        ("was", "be"), ("were", "be"), ("been", "be"), ("is", "be"), ("are", "be"), ("am", "be"),
        ("had", "have"), ("has", "have"), ("did", "do"), ("does", "do"), ("done", "do"),
        ("made", "make"), ("given", "give"), ("gave", "give"), ("shown", "show"), ("seen", "see"),
        ("saw", "see"), ("taken", "take"), ("took", "take"), ("found", "find"), ("led", "lead"),
        ("began", "begin"), ("begun", "begin"), ("chosen", "choose"), ("known", "know"),
        ("written", "write"), ("wrote", "write"), ("went", "go"), ("gone", "go"), ("got", "get"),
        ("kept", "keep"), ("held", "hold"), ("told", "tell"), ("thought", "think"),
        ("brought", "bring"), ("met", "meet"), ("paid", "pay"), ("said", "say"), ("ran", "run"),
        ("fell", "fall"), ("fallen", "fall"), ("grew", "grow"), ("grown", "grow"),
        ("drew", "draw"), ("drawn", "draw"), ("lying", "lie"), ("dying", "die"),
        ("controlled", "control"), ("controlling", "control"), ("labelled", "label"),
        ("modelled", "model"), ("enrolled", "enroll"), ("compelled", "compel"),
    ]
    .into_iter()
    .collect();

    static ref ADJECTIVE_EXCEPTIONS: HashMap<&'static str, &'static str> = [
        ("better", "good"), ("best", "good"), ("worse", "bad"), ("worst", "bad"),
        ("more", "much"), ("less", "little"), ("least", "little"),
    ]
    .into_iter()
    .collect();
}

/// Words ending in `-ly` that are nouns, not adverbs.
const LY_NOUNS: &[&str] = &["family", "supply", "assembly", "anomaly", "monopoly", "rally", "italy", "reply", "apply"];

/// Words ending in `-ing` that are nouns, not verb forms.
const ING_NOUNS: &[&str] = &[
    "something", "nothing", "anything", "everything", "morning", "evening",
    "ceiling", "sibling", "offspring", "wedding", "pudding", "lightning",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "ical", "less"];

/// Stem endings after which a dropped final `e` is restored (`relat` -> `relate`).
/// The flag marks endings that only qualify when preceded by a consonant.
const RESTORE_E: &[(&str, bool)] = &[
    ("iz", false), ("yz", false), ("iv", false), ("ov", false), ("lv", false), ("rv", false),
    ("bl", false), ("pl", false), ("gl", false), ("tl", false), ("cl", false), ("dl", false),
    ("kl", false), ("uc", false), ("rc", false), ("nc", false), ("ac", false), ("ic", false),
    ("rg", false), ("dg", false), ("ang", false), ("ur", false), ("os", false), ("is", false),
    ("as", false), ("ut", false), ("ak", false), ("ik", false), ("ok", false), ("uir", false),
    ("sir", false), ("ud", false), ("od", false), ("id", true), ("in", true), ("ar", true),
    ("at", true),
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(|c| is_vowel(c) || c == 'y')
}

/// Tag a single lowercase token.
pub fn tag(word: &str) -> Pos {
    if word.chars().any(|c| c.is_ascii_digit()) {
        return Pos::Noun;
    }
    if VERB_EXCEPTIONS.contains_key(word) {
        return Pos::Verb;
    }
    if ADJECTIVE_EXCEPTIONS.contains_key(word) {
        return Pos::Adjective;
    }
    let len = word.chars().count();
    if word.ends_with("ly") && len > 4 && !LY_NOUNS.contains(&word) {
        return Pos::Adverb;
    }
    if (word.ends_with("ing") && len >= 6 && !ING_NOUNS.contains(&word)) || (word.ends_with("ed") && len >= 5 && !word.ends_with("eed")) {
        return Pos::Verb;
    }
    if ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) && len > 5 {
        return Pos::Adjective;
    }
    Pos::Noun
}

/// Reduce `word` to its base form for the given part of speech.
pub fn lemmatize(word: &str, pos: Pos) -> String {
    match pos {
        Pos::Noun => lemmatize_noun(word),
        Pos::Verb => lemmatize_verb(word),
        Pos::Adjective => ADJECTIVE_EXCEPTIONS.get(word).map(|s| s.to_string()).unwrap_or_else(|| word.to_string()),
        Pos::Adverb => word.to_string(),
    }
}

/// Tag then lemmatize.
pub fn lemma(word: &str) -> String {
    lemmatize(word, tag(word))
}

fn lemmatize_noun(word: &str) -> String {
    if let Some(base) = NOUN_EXCEPTIONS.get(word) {
        return base.to_string();
    }
    if word.len() <= 3 || !word.is_ascii() || word.chars().any(|c| c.is_ascii_digit()) {
        return word.to_string();
    }
    if ["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
        return word.to_string();
    }
    let strip = |n: usize| word[..word.len() - n].to_string();
    if word.ends_with("ies") && word.len() > 4 {
        return format!("{}y", strip(3));
    }
    if word.ends_with("sses") {
        return strip(2);
    }
    if ["xes", "zes", "ches", "shes"].iter().any(|s| word.ends_with(s)) {
        return strip(2);
    }
    if word.ends_with('s') {
        return strip(1);
    }
    word.to_string()
}

fn lemmatize_verb(word: &str) -> String {
    if let Some(base) = VERB_EXCEPTIONS.get(word) {
        return base.to_string();
    }
    if !word.is_ascii() {
        return word.to_string();
    }
    let stem = if let Some(s) = word.strip_suffix("ing") {
        s
    } else if let Some(s) = word.strip_suffix("ied") {
        return format!("{s}y");
    } else if let Some(s) = word.strip_suffix("ed") {
        s
    } else {
        return word.to_string();
    };
    if stem.len() < 3 || !has_vowel(stem) {
        return word.to_string();
    }
    let bytes = stem.as_bytes();
    let (last, prev) = (bytes[bytes.len() - 1] as char, bytes[bytes.len() - 2] as char);
    if last == prev && !is_vowel(last) && !matches!(last, 'l' | 's' | 'z' | 'f') {
        return stem[..stem.len() - 1].to_string();
    }
    if needs_final_e(stem) {
        return format!("{stem}e");
    }
    stem.to_string()
}

fn needs_final_e(stem: &str) -> bool {
    if stem.ends_with("us") {
        return stem.len() <= 4;
    }
    if stem.ends_with("eat") || stem.ends_with("oat") {
        return false;
    }
    RESTORE_E.iter().any(|&(ending, after_consonant)| {
        if !stem.ends_with(ending) {
            return false;
        }
        if !after_consonant {
            return true;
        }
        stem[..stem.len() - ending.len()]
            .chars()
            .last()
            .map(|c| !is_vowel(c))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_nouns_reduce() {
        assert_eq!(lemma("inhibitors"), "inhibitor");
        assert_eq!(lemma("therapies"), "therapy");
        assert_eq!(lemma("responses"), "response");
        assert_eq!(lemma("approaches"), "approach");
        assert_eq!(lemma("metastases"), "metastasis");
        assert_eq!(lemma("analysis"), "analysis");
        assert_eq!(lemma("pik3ca"), "pik3ca");
    }

    #[test]
    fn verb_forms_reduce() {
        assert_eq!(lemma("treated"), "treat");
        assert_eq!(lemma("mutated"), "mutate");
        assert_eq!(lemma("stopped"), "stop");
        assert_eq!(lemma("increased"), "increase");
        assert_eq!(lemma("received"), "receive");
        assert_eq!(lemma("studied"), "study");
        assert_eq!(lemma("signaling"), "signal");
        assert_eq!(lemma("shown"), "show");
    }

    #[test]
    fn nouns_that_look_inflected_are_kept() {
        assert_eq!(tag("something"), Pos::Noun);
        assert_eq!(lemma("something"), "something");
        assert_eq!(lemma("morning"), "morning");
        assert_eq!(lemma("siblings"), "sibling");
        assert_eq!(lemma("series"), "series");
        assert_eq!(lemma("species"), "species");
        assert_eq!(lemma("signaling"), "signal");
    }

    #[test]
    fn short_or_vowelless_stems_are_kept() {
        assert_eq!(lemma("string"), "string");
        assert_eq!(lemma("breed"), "breed");
    }

    #[test]
    fn tagging_defaults_to_noun() {
        assert_eq!(tag("alpelisib"), Pos::Noun);
        assert_eq!(tag("her2"), Pos::Noun);
        assert_eq!(tag("rapidly"), Pos::Adverb);
        assert_eq!(tag("family"), Pos::Noun);
        assert_eq!(tag("endocrine"), Pos::Noun);
        assert_eq!(tag("aggressive"), Pos::Adjective);
    }
}
