//! Text cleanup shared by header matching, cell cleaning and key derivation.

/// Maps an accented Latin letter (already lowercased) to its ASCII spelling.
fn transliterate(c: char) -> Option<&'static str> {
    let mapped = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'œ' => "oe",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        _ => return None,
    };
    Some(mapped)
}

/// Lowercases and folds accents to ASCII, leaving every other character in place.
pub fn fold_case_and_accents(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars().flat_map(char::to_lowercase) {
        match transliterate(c) {
            Some(ascii) => out.push_str(ascii),
            None => out.push(c),
        }
    }
    out
}

/// Canonical header spelling: lowercase ASCII words separated by single spaces.
///
/// `"  N° Facture / Invoice-No. "` becomes `"n facture invoice no"`.
pub fn normalize_header(input: &str) -> String {
    let folded = fold_case_and_accents(input);
    let spaced: String = folded
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    collapse_whitespace(&spaced)
}

/// Sorted word list of a normalized header, so word order does not matter.
pub fn header_tokens(input: &str) -> Vec<String> {
    let mut tokens: Vec<String> = normalize_header(input)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    tokens.sort();
    tokens
}

pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans a text cell: backspace becomes the `<|>` marker, non-breaking spaces and
/// other control characters are dropped, whitespace is collapsed.
pub fn clean_cell_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\u{0008}' => out.push_str("<|>"),
            '\u{00A0}' => {}
            '\t' | '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    collapse_whitespace(&out)
}

/// Comparison form of a text value inside composite keys.
pub fn normalize_key_text(input: &str) -> String {
    collapse_whitespace(&fold_case_and_accents(&clean_cell_text(input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header_folds_accents_and_punctuation() {
        assert_eq!(normalize_header("  N° Facture / Invoice-No. "), "n facture invoice no");
        assert_eq!(normalize_header("Libellé"), "libelle");
        assert_eq!(normalize_header("DATE\u{00A0}OPÉRATION"), "date operation");
    }

    #[test]
    fn test_header_tokens_ignore_order() {
        assert_eq!(header_tokens("Amount Total"), header_tokens("total amount"));
    }

    #[test]
    fn test_clean_cell_text() {
        assert_eq!(clean_cell_text("ACME\u{0008}LTD"), "ACME<|>LTD");
        assert_eq!(clean_cell_text("1\u{00A0}000"), "1000");
        assert_eq!(clean_cell_text("  line one\nline   two "), "line one line two");
    }

    #[test]
    fn test_normalize_key_text() {
        assert_eq!(normalize_key_text("  Société   GÉNÉRALE "), "societe generale");
    }
}
