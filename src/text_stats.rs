use data_model::TextStatistics;

/// Computes paragraph, word and character counts for `text`.
///
/// Empty or all-whitespace input short-circuits to zero counts. The
/// character count covers the raw text as given; word and paragraph counts
/// operate on the trimmed text.
pub fn analyze(text: &str) -> TextStatistics {
    if text.trim().is_empty() {
        return TextStatistics::default();
    }
    TextStatistics {
        paragraph_count: paragraph_count(text),
        word_count: text.split_whitespace().count() as u32,
        character_count: text.chars().count() as u32,
    }
}

/// A paragraph boundary is a whitespace run containing at least two
/// newlines, i.e. one or more blank lines, possibly with horizontal
/// whitespace on them. Line endings are normalized first; a non-empty text
/// without any boundary is a single paragraph.
fn paragraph_count(text: &str) -> u32 {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let mut count = 1u32;
    let mut newlines_in_run = 0u32;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            if ch == '\n' {
                newlines_in_run += 1;
            }
        } else {
            if newlines_in_run >= 2 {
                count += 1;
            }
            newlines_in_run = 0;
        }
    }
    count
}
