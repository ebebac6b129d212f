// Text Processing Service
// Normalization and sentence segmentation for the drift pipeline

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Normalize punctuation and whitespace before analysis
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut s = text.to_string();

    // Replace smart quotes
    s = s.replace('\u{201c}', "\"")  // "
         .replace('\u{201d}', "\"")  // "
         .replace('\u{2018}', "'")   // '
         .replace('\u{2019}', "'");  // '

    // Replace em dash
    s = s.replace('\u{2014}', "-");

    // Replace non-breaking space
    s = s.replace('\u{00A0}', " ");

    // Normalize line endings
    s = s.replace("\r\n", "\n").replace('\r', "\n");

    // Collapse horizontal whitespace
    let ws_re = Regex::new(r"[ \t\x0C\x0B]+").unwrap();
    s = ws_re.replace_all(&s, " ").to_string();

    // Strip each line
    s = s.lines()
         .map(|ln| ln.trim())
         .collect::<Vec<_>>()
         .join("\n");

    s.trim().to_string()
}

/// Simple sentence splitting
/// Splits on `.`, `!`, `?` followed by whitespace; the terminal punctuation
/// stays attached to the preceding sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    // Rust regex doesn't support lookbehind, use a marker character instead
    let re = Regex::new(r"([.!?])\s+").unwrap();
    let result = re.replace_all(text, "$1\x00");
    result.split('\x00')
          .map(|p| p.trim())
          .filter(|p| !p.is_empty())
          .map(|s| s.to_string())
          .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceOffset {
    pub text: String,
    /// UTF-8 byte offset (0-based) into the analyzed text.
    pub start: i32,
    /// UTF-8 byte offset (0-based, end-exclusive) into the analyzed text.
    pub end: i32,
}

/// Sentence splitting with offset tracking
/// Same boundary rule as `split_sentences`, plus two guards: boundaries are
/// suppressed inside double quotes and inside decimal numbers.
pub fn split_sentences_advanced(text: &str) -> Vec<SentenceOffset> {
    if text.is_empty() {
        return vec![];
    }

    let chars: Vec<char> = text.chars().collect();

    let mut sentences = Vec::new();
    let mut current_start: usize = 0;
    let mut buffer = String::new();
    let mut in_quote = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        buffer.push(ch);

        // Track double-quote state only; apostrophes are too common in
        // English prose to treat as quote toggles.
        if matches!(ch, '"' | '\u{201c}' | '\u{201d}') {
            in_quote = !in_quote;
        }

        let mut is_sentence_end = false;
        if matches!(ch, '.' | '!' | '?') {
            if in_quote {
                i += 1;
                continue;
            }

            // Check for decimal numbers
            if ch == '.'
                && i > 0
                && i + 1 < chars.len()
                && chars[i - 1].is_ascii_digit()
                && chars[i + 1].is_ascii_digit()
            {
                i += 1;
                continue;
            }

            // Boundary only when followed by whitespace (or end of text)
            if chars.get(i + 1).map(|c| c.is_whitespace()).unwrap_or(true) {
                is_sentence_end = true;
            }
        }

        if is_sentence_end {
            // Absorb trailing spaces into this span
            while i + 1 < chars.len() && matches!(chars[i + 1], ' ' | '\t') {
                i += 1;
                buffer.push(chars[i]);
            }

            let sentence_text = buffer.trim().to_string();
            if !sentence_text.is_empty() {
                sentences.push(SentenceOffset {
                    text: sentence_text,
                    start: current_start as i32,
                    end: (current_start + buffer.len()) as i32,
                });
            }
            current_start += buffer.len();
            buffer.clear();
        }

        i += 1;
    }

    // Handle remaining buffer
    let remaining = buffer.trim().to_string();
    if !remaining.is_empty() {
        sentences.push(SentenceOffset {
            text: remaining,
            start: current_start as i32,
            end: text.len() as i32,
        });
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation() {
        let input = "Hello\u{201c}World\u{201d}";
        let output = normalize_punctuation(input);
        assert_eq!(output, "Hello\"World\"");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        let input = "  one\t\t two \r\n three  ";
        let output = normalize_punctuation(input);
        assert_eq!(output, "one two\nthree");
    }

    #[test]
    fn test_split_sentences_basic() {
        let text = "I am happy. I am happy. Suddenly I am furious!";
        let sentences = split_sentences(text);
        assert_eq!(
            sentences,
            vec![
                "I am happy.".to_string(),
                "I am happy.".to_string(),
                "Suddenly I am furious!".to_string(),
            ]
        );
    }

    #[test]
    fn test_split_sentences_keeps_terminal_punctuation() {
        let sentences = split_sentences("Really? Yes. Go!");
        assert_eq!(sentences, vec!["Really?", "Yes.", "Go!"]);
    }

    #[test]
    fn test_split_sentences_no_terminal_punct() {
        let sentences = split_sentences("just one fragment without an ending");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn test_advanced_preserves_order_and_trims() {
        let text = "First one.   Second one!  Third one?";
        let sentences = split_sentences_advanced(text);
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].text, "First one.");
        assert_eq!(sentences[1].text, "Second one!");
        assert_eq!(sentences[2].text, "Third one?");
        for s in &sentences {
            assert!(!s.text.trim().is_empty());
        }
        // Offsets are ordered and non-overlapping
        for pair in sentences.windows(2) {
            assert!(pair[0].start < pair[1].start);
            assert!(pair[0].end <= pair[1].start + 1);
        }
    }

    #[test]
    fn test_advanced_does_not_split_decimals() {
        let sentences = split_sentences_advanced("The score was 3.5 overall. Impressive!");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "The score was 3.5 overall.");
    }

    #[test]
    fn test_advanced_does_not_split_inside_quotes() {
        let sentences = split_sentences_advanced("She said \"stop. now\" and left. Then silence.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].text.contains("stop. now"));
    }

    #[test]
    fn test_advanced_offsets_slice_back_into_text() {
        let text = "Alpha beta. Gamma delta!";
        let sentences = split_sentences_advanced(text);
        assert_eq!(sentences.len(), 2);
        for s in &sentences {
            let slice = &text[s.start as usize..s.end as usize];
            assert_eq!(slice.trim(), s.text);
        }
    }

    #[test]
    fn test_advanced_handles_trailing_fragment() {
        let sentences = split_sentences_advanced("Done. And then");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].text, "And then");
    }
}
