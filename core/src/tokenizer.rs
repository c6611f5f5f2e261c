use crate::config::Normalizer;
use crate::lemmatizer;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    // Words may carry internal hyphens or dots ("her2-negative", "3.5"); such compounds
    // come out as one token and are then rejected as non-alphanumeric. Apostrophes split,
    // so "patient's" yields "patient" plus the stopword "s".
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}]+(?:[-.][\p{L}\p{N}]+)*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","couldn",
            "d","did","didn","do","does","doesn","doing","don","down","during",
            "each","few","for","from","further",
            "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","it","its","itself",
            "just","ll","m","ma","me","mightn","more","most","mustn","my","myself",
            "needn","no","nor","not","now",
            "o","of","off","on","once","only","or","other","our","ours","ourselves","out","over","own",
            "re","s","same","shan","she","should","shouldn","so","some","such",
            "t","than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","will","with","won","wouldn",
            "y","you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

fn is_alphanumeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphanumeric)
}

fn normalize(token: &str, normalizer: Normalizer) -> String {
    match normalizer {
        Normalizer::Lemma => lemmatizer::lemma(token),
        Normalizer::Stem => STEMMER.stem(token).to_string(),
    }
}

/// Tokenize text into lemmatized terms.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with(text, Normalizer::Lemma)
}

/// Tokenize text with NFKC normalization, lowercasing, alphanumeric and stopword
/// filtering, then the given term normalization. Repeated terms are preserved.
pub fn tokenize_with(text: &str, normalizer: Normalizer) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|t| is_alphanumeric(t))
        .filter(|t| !is_stopword(t))
        .map(|t| normalize(t, normalizer))
        .collect()
}
