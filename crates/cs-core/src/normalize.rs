//! Comment text normalization
//!
//! Every raw comment goes through [`normalize`] before either classifier sees
//! it. The steps run in a fixed order:
//!
//! 1. lowercase
//! 2. URLs (`http(s)://...`, `www....`) replaced by a space
//! 3. `@mentions` replaced by a space
//! 4. `#hashtags` replaced by a space
//! 5. emoji removed outright
//! 6. characters outside `[a-z0-9'!?.,$%()+-:; ]` replaced by a space
//! 7. whitespace collapsed and trimmed
//!
//! Removing an emoji can glue two fragments together (`w😀ww.site` becomes
//! `www.site`), so steps 2-4 are repeated whenever step 5 removed anything.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("valid URL pattern"));
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").expect("valid mention pattern"));
static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("valid hashtag pattern"));
static MULTISPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space pattern"));

/// Punctuation kept by step 6, besides `a-z`, `0-9` and space
pub const ALLOWED_PUNCTUATION: &str = "'!?.,$%()+-:;";

/// Whether a character survives step 6
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ' || ALLOWED_PUNCTUATION.contains(c)
}

/// Clean a raw comment. Total: never fails, any input yields a string.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut text = strip_tokens(&lowered);

    let without_emoji = strip_emoji(&text);
    if without_emoji.len() != text.len() {
        text = strip_tokens(&without_emoji);
    }

    let filtered: String = text
        .chars()
        .map(|c| if is_allowed_char(c) { c } else { ' ' })
        .collect();

    MULTISPACE_RE.replace_all(&filtered, " ").trim().to_string()
}

/// [`normalize`] for input that may be missing
pub fn normalize_opt(raw: Option<&str>) -> String {
    normalize(raw.unwrap_or_default())
}

fn strip_tokens(text: &str) -> String {
    let text = URL_RE.replace_all(text, " ");
    let text = MENTION_RE.replace_all(&text, " ");
    HASHTAG_RE.replace_all(&text, " ").into_owned()
}

/// Remove emoji glyphs together with the joiners, variation selectors and
/// modifiers that belong to them.
pub fn strip_emoji(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_sequence = false;

    while let Some(c) = chars.next() {
        // VS16 asks for emoji presentation of the preceding symbol
        if is_emoji(c) || (!c.is_ascii() && chars.peek() == Some(&'\u{FE0F}')) {
            in_sequence = true;
            continue;
        }
        if in_sequence && is_emoji_component(c) {
            continue;
        }
        // keycap: [0-9#*] FE0F? 20E3
        if matches!(c, '0'..='9' | '#' | '*') {
            let mut lookahead = chars.clone();
            let mut next = lookahead.next();
            if next == Some('\u{FE0F}') {
                next = lookahead.next();
            }
            if next == Some('\u{20E3}') {
                chars = lookahead;
                in_sequence = true;
                continue;
            }
        }
        in_sequence = false;
        out.push(c);
    }

    out
}

/// Whether `c` on its own is an emoji. Symbols that merely share a Unicode
/// block with emoji (`♪`, `✓`, `☐`, `🄰`) are not, and fall through to step 6.
fn is_emoji(c: char) -> bool {
    let mut buf = [0u8; 4];
    emojis::get(c.encode_utf8(&mut buf)).is_some() || is_emoji_part(c)
}

/// Code points that only occur as pieces of emoji sequences
fn is_emoji_part(c: char) -> bool {
    matches!(
        c as u32,
        // regional indicators, skin tones, hair styles
        0x1F1E6..=0x1F1FF | 0x1F3FB..=0x1F3FF | 0x1F9B0..=0x1F9B3
    )
}

fn is_emoji_component(c: char) -> bool {
    matches!(
        c as u32,
        0x200D | 0xFE0E | 0xFE0F | 0x20E3 | 0xE0020..=0xE007F
    )
}
