use unicode_normalization::UnicodeNormalization;

/// Punctuation stripped from word edges before comparison. Covers ASCII
/// punctuation plus the smart quotes and dashes the manuscript generator
/// emits.
const EDGE_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '(', ')', '[', ']', '{', '}', '—', '–', '-', '…', '\'',
    '„', '“', '”', '‘', '’', '«', '»',
];

/// Canonicalize a word for comparison: decode markup entities, Unicode NFC,
/// case-fold, strip edge punctuation, and drop internal dashes so a word
/// split by punctuation ("literature—advection") can still match two
/// separately recognized transcript tokens.
///
/// Total and idempotent; may return an empty string.
pub fn normalize(word: &str) -> String {
    let decoded = decode_entities(word);
    let composed: String = decoded.nfc().collect();
    let lowered = composed.to_lowercase();
    lowered
        .trim_matches(|c| EDGE_PUNCTUATION.contains(&c))
        .chars()
        .filter(|c| !matches!(c, '—' | '–' | '-'))
        .collect()
}

/// Decode the entity references that appear in rendered reading pages.
/// Unknown named entities pass through verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';') {
            // Entity bodies are short; anything longer is a bare ampersand.
            Some(semi) if semi <= 10 => {
                let body = &tail[1..semi];
                match decode_entity_body(body) {
                    Some(c) => out.push(c),
                    None => out.push_str(&tail[..=semi]),
                }
                rest = &tail[semi + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity_body(body: &str) -> Option<char> {
    match body {
        "amp" => return Some('&'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "quot" => return Some('"'),
        "apos" => return Some('\''),
        "nbsp" => return Some('\u{a0}'),
        _ => {}
    }
    let digits = body.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix(|c| c == 'x' || c == 'X') {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code)
}
