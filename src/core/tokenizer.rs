/// Corpus cleaning and tokenization.
///
/// Turns raw text into the word tokens the Markov trainer consumes. Every
/// step is total: any input, including the empty string, yields a (possibly
/// empty) token list.
use regex::Regex;
use std::sync::OnceLock;

/// Tokens dropped outright as noise (retweet markers, ellipses, HTML residue).
const NOISE_TOKENS: &[&str] = &["RT", "...", "amp"];

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn disallowed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z.?!' ]+").expect("static regex"))
}

/// Clean raw text into a single-spaced string of letters, `. ? ! '` and spaces.
pub fn clean(text: &str) -> String {
    let ascii: String = text.chars().filter(char::is_ascii).collect();
    let collapsed = whitespace_re().replace_all(&ascii, " ");

    // Runs after the ASCII drop, so curly quotes never reach it here.
    let quoted = normalize_quotes(&collapsed);
    disallowed_re().replace_all(&quoted, "").into_owned()
}

/// Map curly single quotes to `'` and strip curly double quotes.
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{2018}' | '\u{2019}' => Some('\''),
            '\u{201c}' | '\u{201d}' => None,
            other => Some(other),
        })
        .collect()
}

/// Whether a whitespace-delimited word survives the noise filter.
pub fn is_kept(word: &str) -> bool {
    !(word.starts_with("http")
        || word.starts_with('@')
        || (word.starts_with('&') && word.len() > 1)
        || NOISE_TOKENS.contains(&word))
}

/// Clean `text` and split it into word tokens, dropping noise.
pub fn tokenize(text: &str) -> Vec<String> {
    clean(text)
        .split_whitespace()
        .filter(|word| is_kept(word))
        .map(str::to_string)
        .collect()
}
