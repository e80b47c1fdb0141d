/// Sentence-boundary heuristic for single tokens.
use regex::Regex;
use std::sync::OnceLock;

/// Lowercased abbreviations that end in a period but rarely end a sentence.
/// Single-letter initials (`a.` .. `z.`) are handled separately.
pub const NON_ENDINGS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "phd.", "d.c.", "u.s.", "a.m.", "p.m.", ".", ".net", "no.",
    "i.e.", "e.g.", "st.", "lt.", "n.c.", "adm.", "u.n.", "jr.", "rep.", "u.a.e.", "u.k.",
    "s.m.a.r.t.", "sen.", "inc.", "u.i.", "u.x.", "sr.", "s.m.", "ph.",
];

/// Punctuation that terminates a sentence.
pub const TERMINATORS: &[char] = &['.', '?', '!', ';'];

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+").expect("static regex"))
}

fn is_initial(lowered: &str) -> bool {
    matches!(lowered.as_bytes(), [c, b'.'] if c.is_ascii_lowercase())
}

/// Decide whether `word` plausibly ends a sentence.
///
/// Decimal numbers and known abbreviations never do; anything else does when
/// it ends in `.`, `?`, `!` or `;`.
pub fn is_ending(word: &str) -> bool {
    if decimal_re().is_match(word) {
        return false;
    }

    let lowered = word.trim().to_lowercase();
    if NON_ENDINGS.contains(&lowered.as_str()) || is_initial(&lowered) {
        return false;
    }

    word.ends_with(TERMINATORS)
}
