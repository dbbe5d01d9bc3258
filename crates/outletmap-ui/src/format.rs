//! Text-to-markup formatting for streamed chat answers.
//!
//! [`format_response`] is re-run on the whole accumulated answer after every
//! chunk, so it only ever sees raw text and must never be fed its own output.

use std::sync::LazyLock;

use regex::Regex;

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+\.\s+)([^\n]+)").expect("valid numbered-list regex"));

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\*\s+|•\s+|−\s+)([^\n]+)").expect("valid bullet regex"));

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mR)^([^:\n]+):$").expect("valid header regex"));

const NUMBERED_MARKUP: &str = r#"<div style="margin:5px 0;"><strong>${1}</strong>${2}</div>"#;
const BULLET_MARKUP: &str = r#"<div style="margin:5px 0; padding-left:15px;">• ${2}</div>"#;
const HEADER_MARKUP: &str =
    r#"<div style="font-weight:bold; margin:10px 0 5px 0; color:#333;">${1}:</div>"#;

/// Converts raw answer text into display markup.
///
/// Substitutions run in a fixed order: numbered items, bullets, `Title:`
/// headers, then newlines. Markup emitted by the first two always contains a
/// colon (`style="margin:..."`), so the header rule cannot match it.
#[must_use]
pub fn format_response(text: &str) -> String {
    let text = NUMBERED.replace_all(text, NUMBERED_MARKUP);
    let text = BULLET.replace_all(&text, BULLET_MARKUP);
    let text = HEADER.replace_all(&text, HEADER_MARKUP);
    text.replace("\n\n", "<br><br>").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(format_response("Hello world"), "Hello world");
        assert_eq!(format_response(""), "");
    }

    #[test]
    fn numbered_items_keep_order_and_bold_numeral() {
        let out = format_response("1. first\n2. second");
        assert_eq!(
            out,
            concat!(
                r#"<div style="margin:5px 0;"><strong>1. </strong>first</div>"#,
                "<br>",
                r#"<div style="margin:5px 0;"><strong>2. </strong>second</div>"#,
            )
        );
        let first = out.find("first").unwrap();
        let second = out.find("second").unwrap();
        assert!(first < second);
        assert_eq!(out.matches("<strong>").count(), 2);
    }

    #[test]
    fn bullets_of_each_kind() {
        for marker in ["* ", "• ", "− "] {
            let out = format_response(&format!("{marker}Drive-Thru"));
            assert_eq!(
                out,
                r#"<div style="margin:5px 0; padding-left:15px;">• Drive-Thru</div>"#,
                "marker {marker:?}"
            );
        }
    }

    #[test]
    fn trailing_colon_line_becomes_header() {
        assert_eq!(
            format_response("Notes:"),
            r#"<div style="font-weight:bold; margin:10px 0 5px 0; color:#333;">Notes:</div>"#
        );
    }

    #[test]
    fn header_requires_single_trailing_colon() {
        assert_eq!(format_response("Time: 10:00"), "Time: 10:00");
        assert_eq!(format_response("a: b:"), "a: b:");
    }

    #[test]
    fn numbered_and_bullet_markup_is_not_taken_for_a_header() {
        let out = format_response("Outlets:\n1. KLCC\n* WiFi");
        assert_eq!(out.matches("font-weight:bold").count(), 1);
        assert!(out.starts_with(
            r#"<div style="font-weight:bold; margin:10px 0 5px 0; color:#333;">Outlets:</div><br>"#
        ));
        assert!(out.contains(r#"<strong>1. </strong>KLCC</div>"#));
        assert!(out.ends_with(r#"padding-left:15px;">• WiFi</div>"#));
    }

    #[test]
    fn header_before_crlf_line_ending() {
        assert_eq!(
            format_response("Notes:\r\nabc"),
            concat!(
                r#"<div style="font-weight:bold; margin:10px 0 5px 0; color:#333;">Notes:</div>"#,
                "\r<br>abc"
            )
        );
    }

    #[test]
    fn paragraph_and_line_breaks() {
        assert_eq!(format_response("a\n\nb\nc"), "a<br><br>b<br>c");
        assert_eq!(format_response("a\n\n\nb"), "a<br><br><br>b");
    }

    #[test]
    fn same_raw_input_formats_identically() {
        let raw = "Menu:\n1. Burger\n\n* Fries";
        assert_eq!(format_response(raw), format_response(raw));
    }

    #[test]
    fn growing_prefix_formats_without_panicking_on_partial_items() {
        let full = "Top picks:\n1. Big Mac\n2. McFlurry\n\n• open late";
        let mut boundaries: Vec<usize> = full.char_indices().map(|(i, _)| i).collect();
        boundaries.push(full.len());
        for end in boundaries {
            let _ = format_response(&full[..end]);
        }
        assert!(format_response(full).contains("open late</div>"));
    }
}
