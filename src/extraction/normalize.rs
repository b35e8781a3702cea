//! Cleanup for names captured out of OCR text.

/// Punctuation stripped from the end of a captured name.
const TRAILING_PUNCTUATION: [char; 4] = ['.', ',', ';', ':'];

/// Normalize a raw captured name into a display name.
///
/// Steps, in order:
/// 1. Collapse whitespace runs and trim.
/// 2. Strip trailing `. , ; :`.
/// 3. Drop digits, then tidy whatever the removal exposed.
/// 4. Title-case each whitespace-separated token.
///
/// Empty or blank input gives an empty string. The output is a fixed point:
/// `normalize_name(&normalize_name(s)) == normalize_name(s)`.
pub fn normalize_name(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let stripped = strip_trailing(&collapsed);

    let without_digits: String = stripped.chars().filter(|c| !c.is_ascii_digit()).collect();
    let recollapsed = collapse_whitespace(&without_digits);

    title_case(strip_trailing(&recollapsed))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_trailing(s: &str) -> &str {
    s.trim_end_matches(|c: char| TRAILING_PUNCTUATION.contains(&c) || c.is_whitespace())
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|token| {
            let mut chars = token.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_title_cases() {
        assert_eq!(normalize_name("  jane \t  DOE "), "Jane Doe");
    }

    #[test]
    fn test_strips_trailing_punctuation() {
        assert_eq!(normalize_name("john smith.,;:"), "John Smith");
        assert_eq!(normalize_name("Dr. A. Kumar."), "Dr. A. Kumar");
    }

    #[test]
    fn test_removes_digits() {
        assert_eq!(normalize_name("bob123"), "Bob");
        assert_eq!(normalize_name("ra 42 vi"), "Ra Vi");
    }

    #[test]
    fn test_punctuation_exposed_by_digit_removal() {
        assert_eq!(normalize_name("Bob. 1"), "Bob");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   \n\t "), "");
        assert_eq!(normalize_name("123"), "");
        assert_eq!(normalize_name("..."), "");
        assert_eq!(normalize_name(" 4 . 2 "), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "jane doe",
            "  MARY   ann o.  ",
            "Bob. 1",
            "x 9 y.",
            "a.b.c",
            "Mock Patient",
            "",
        ];
        for input in inputs {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once, "input: {:?}", input);
        }
    }
}
