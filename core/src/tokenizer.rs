use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)[\p{L}\p{N}_]+").expect("valid regex");
    static ref DIGITS: Regex = Regex::new(r"\p{N}+").expect("valid regex");
    static ref PUNCT: Regex = Regex::new(r"[\p{P}\p{S}]").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref ENGLISH_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
    static ref INDONESIAN_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "ada","adalah","agar","akan","aku","anda","antara","apa","apakah","atas","atau",
            "bagai","bagaimana","bagi","bahkan","bahwa","banyak","baru","beberapa","begitu","belum","benar","berada","berbagai","bisa","boleh","bukan",
            "cukup","dalam","dan","dapat","dari","daripada","demikian","dengan","di","dia","dilakukan","dimana","disini","diri",
            "hal","hampir","hanya","harus","hingga","ia","ini","itu",
            "jadi","jika","juga","jumlah","kalau","kami","kamu","karena","kata","ke","kecuali","kembali","kemudian","kepada","ketika","kita",
            "lagi","lain","lalu","lebih","maka","masih","mau","melalui","mereka","merupakan","meski","mungkin",
            "namun","nya","oleh","pada","para","pernah","perlu","pula","punya",
            "saat","saja","sampai","sangat","satu","saya","seakan","sebagai","sebelum","sedang","sehingga","sejak","sekali","selalu","semua","sendiri","seperti","serta","sesuatu","setelah","siapa","sudah",
            "tanpa","tapi","telah","tempat","tentang","tersebut","tetapi","tidak",
            "untuk","waktu","yaitu","yakni","yang"
        ];
        words.iter().copied().collect()
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwordSet {
    #[default]
    Indonesian,
    English,
    None,
}

impl StopwordSet {
    fn contains(&self, token: &str) -> bool {
        match self {
            StopwordSet::Indonesian => INDONESIAN_STOPWORDS.contains(token),
            StopwordSet::English => ENGLISH_STOPWORDS.contains(token),
            StopwordSet::None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub stopwords: StopwordSet,
    pub stem: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { stopwords: StopwordSet::Indonesian, stem: true }
    }
}

/// Preprocessing pipeline turning raw text into index terms: NFKC, case folding,
/// digit and punctuation removal, whitespace split, stopword removal, stemming.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn clean(&self, text: &str) -> String {
        let folded = text.nfkc().collect::<String>().to_lowercase();
        let no_digits = DIGITS.replace_all(&folded, "");
        PUNCT.replace_all(&no_digits, "").trim().to_string()
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        let cleaned = self.clean(text);
        cleaned
            .split_whitespace()
            .filter(|t| !self.config.stopwords.contains(t))
            .map(|t| if self.config.stem { STEMMER.stem(t).to_string() } else { t.to_string() })
            .collect()
    }
}

/// Plain word splitter: lowercase, split on anything that is not a letter,
/// digit or underscore. No stopwords, no stemming. Single-character words
/// are kept.
pub fn simple_terms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    words(&lowered).into_iter().map(str::to_string).collect()
}

/// Runs of letters, digits and underscores, case preserved.
pub fn words(text: &str) -> Vec<&str> {
    WORD.find_iter(text).map(|m| m.as_str()).collect()
}

/// Undo a serialized token list (`['a', 'b']`) so the file reads as plain
/// space-separated text. Other content is only trimmed.
pub fn normalize_document(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        trimmed.chars().filter(|c| !matches!(c, '[' | ']' | '\'' | ',')).collect()
    } else {
        trimmed.to_string()
    }
}

/// The `n` most frequent tokens, ties broken by first occurrence.
pub fn top_terms(tokens: &[String], n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, tok) in tokens.iter().enumerate() {
        counts.entry(tok.as_str()).or_insert((0, pos)).0 += 1;
    }
    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().take(n).map(|(t, (c, _))| (t.to_string(), c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_digits_and_punctuation() {
        let a = Analyzer::default();
        assert_eq!(a.clean("Bab 12: Pedang, Hutan!"), "bab  pedang hutan");
    }

    #[test]
    fn simple_terms_lowercases() {
        assert_eq!(simple_terms("Pedang  HUTAN."), vec!["pedang", "hutan"]);
    }

    #[test]
    fn simple_terms_keeps_single_letters() {
        assert_eq!(simple_terms("bab 1 a-z"), vec!["bab", "1", "a", "z"]);
    }

    #[test]
    fn words_preserve_case() {
        assert_eq!(words("Pedang, AND hutan."), vec!["Pedang", "AND", "hutan"]);
    }

    #[test]
    fn normalize_list_literal() {
        assert_eq!(normalize_document("['pedang', 'hutan']"), "pedang hutan");
        assert_eq!(normalize_document("  pedang hutan \n"), "pedang hutan");
    }
}
