//! Text cleanup for the PDF exporter.
//!
//! The PDF writer uses the built-in Helvetica faces, which only cover a
//! Latin-1 sized character set. Anything outside printable ASCII and the
//! printable Latin-1 block is either transliterated to a close ASCII form or
//! dropped.

/// True for characters every PDF text run can encode.
pub fn is_print_safe(c: char) -> bool {
    matches!(c, '\n' | ' '..='~' | '\u{A1}'..='\u{FF}')
}

/// Maps `text` onto the print-safe character set. Never fails.
///
/// Line breaks are kept; runs of spaces left behind by dropped glyphs are
/// collapsed and each line is trimmed.
pub fn sanitize_for_print(text: &str) -> String {
    let mut mapped = String::with_capacity(text.len());
    for c in text.chars() {
        if is_print_safe(c) {
            mapped.push(c);
        } else if let Some(replacement) = transliterate(c) {
            mapped.push_str(replacement);
        }
    }

    mapped
        .split('\n')
        .map(collapse_spaces)
        .collect::<Vec<_>>()
        .join("\n")
}

fn transliterate(c: char) -> Option<&'static str> {
    let replacement = match c {
        '\t' | '\u{A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' | '\u{202F}' => " ",
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => "-",
        '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{25CF}' | '\u{25E6}' => "-",
        '\u{2026}' => "...",
        '\u{2192}' | '\u{27A1}' | '\u{279C}' => "->",
        '\u{2190}' | '\u{2B05}' => "<-",
        '\u{2194}' => "<->",
        '\u{21D2}' => "=>",
        '\u{20AC}' => "EUR",
        '\u{2122}' => "(TM)",
        _ => return None,
    };
    Some(replacement)
}

fn collapse_spaces(line: &str) -> String {
    line.split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
