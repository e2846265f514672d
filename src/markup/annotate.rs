use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

use crate::align::{AlignerTuning, AlignmentLog, StreamAligner};
use crate::markup::scanner::{Event, Scanner, TagKind};
use crate::types::{AlignmentResult, ManuscriptToken, Outcome, TranscriptWord};

/// Class on every word marker span.
const MARKER_CLASS: &str = "w";
/// Class token on the container whose text gets annotated.
const CONTENT_CLASS: &str = "content";
/// Elements whose text is never annotated. `span` is included so existing
/// markers (and any inline spans) are left alone.
const SKIP_TAGS: &[&str] = &["script", "style", "code", "pre", "span"];

/// Result of annotating one page in memory.
#[derive(Debug)]
pub struct AnnotatedMarkup {
    pub html: String,
    /// Words wrapped with a transcript index.
    pub wrapped: usize,
    pub result: AlignmentResult,
    pub log: AlignmentLog,
}

/// Whether markup already carries word markers.
pub fn is_annotated(html: &str) -> bool {
    html.contains(r#"class="w""#)
}

/// Strip word markers, keeping the wrapped text. Inverse of `annotate` up
/// to the markers themselves.
pub fn unwrap_markers(html: &str) -> String {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    let marker = MARKER.get_or_init(|| {
        Regex::new(r#"<span class="w"(?: data-i="\d+")?>([^<]*)</span>"#)
            .expect("marker regex is valid")
    });
    marker.replace_all(html, "$1").into_owned()
}

/// Re-serialize markup with every content word wrapped in an index-bearing
/// marker. Structure, non-content regions, and the raw bytes of each word
/// (entity references included) are untouched; unmatched words get an
/// indexless marker so the page renders uniformly.
pub fn annotate(
    html: &str,
    transcript: &[TranscriptWord],
    tuning: AlignerTuning,
) -> AnnotatedMarkup {
    let mut aligner = StreamAligner::with_tuning(transcript, tuning);
    let mut out = String::with_capacity(html.len() + html.len() / 2);
    let mut outcomes = Vec::new();
    let mut wrapped = 0usize;
    let mut position = 0usize;

    // Depth tracking for the content container and skip regions.
    let mut depth = 0usize;
    let mut in_content = false;
    let mut content_depth = 0usize;
    let mut skip_depth = 0usize;

    for event in Scanner::new(html) {
        match event {
            Event::Text(text) => {
                if in_content && skip_depth == 0 {
                    wrap_text(text, &mut aligner, &mut out, &mut outcomes, &mut wrapped, &mut position);
                } else {
                    out.push_str(text);
                }
            }
            Event::Tag(tag) => {
                match tag.kind {
                    TagKind::Open if !tag.is_void() => {
                        if tag.name.eq_ignore_ascii_case("div")
                            && tag.attr_contains("class", CONTENT_CLASS)
                            && !in_content
                        {
                            in_content = true;
                            content_depth = depth + 1;
                        }
                        depth += 1;
                        if is_skip_tag(tag.name) {
                            skip_depth += 1;
                        }
                    }
                    TagKind::Close => {
                        depth = depth.saturating_sub(1);
                        if is_skip_tag(tag.name) {
                            skip_depth = skip_depth.saturating_sub(1);
                        }
                        if in_content && depth < content_depth {
                            in_content = false;
                            content_depth = 0;
                        }
                    }
                    _ => {}
                }
                out.push_str(tag.raw);
            }
        }
    }

    AnnotatedMarkup {
        html: out,
        wrapped,
        result: AlignmentResult { outcomes },
        log: aligner.into_log(),
    }
}

fn is_skip_tag(name: &str) -> bool {
    SKIP_TAGS.iter().any(|t| name.eq_ignore_ascii_case(t))
}

/// Split a text run into whitespace and word spans (byte-preserving) and
/// wrap each word with its aligned index.
fn wrap_text(
    text: &str,
    aligner: &mut StreamAligner,
    out: &mut String,
    outcomes: &mut Vec<Outcome>,
    wrapped: &mut usize,
    position: &mut usize,
) {
    if text.trim().is_empty() {
        out.push_str(text);
        return;
    }

    for (word, is_word) in split_runs(text) {
        if !is_word {
            out.push_str(word);
            continue;
        }

        let token = ManuscriptToken {
            text: word.to_string(),
            position: *position,
        };
        *position += 1;
        let outcome = aligner.align_token(&token);
        match outcome {
            Outcome::Matched { index, .. } => {
                let _ = write!(out, r#"<span class="{MARKER_CLASS}" data-i="{index}">{word}</span>"#);
                *wrapped += 1;
            }
            Outcome::Unmatched | Outcome::NonLexical => {
                let _ = write!(out, r#"<span class="{MARKER_CLASS}">{word}</span>"#);
            }
        }
        outcomes.push(outcome);
    }
}

/// Alternating runs of whitespace and non-whitespace, preserving all bytes.
fn split_runs(text: &str) -> impl Iterator<Item = (&str, bool)> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let first_is_word = !rest.starts_with(char::is_whitespace);
        let end = rest
            .find(|c: char| c.is_whitespace() == first_is_word)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some((run, first_is_word))
    })
}
