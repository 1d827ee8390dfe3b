//! Title to filename conversion.
//!
//! `cadence new post "Hello, Wörld!"` writes `hello-world.md`.

use deunicode::deunicode;

/// Convert a post/page title to a URL-safe file stem.
///
/// Transliterates to ASCII, lowercases, collapses every run of
/// non-alphanumeric characters into a single hyphen, and trims hyphens
/// from both ends.
pub fn title_to_filename(title: &str) -> String {
    let ascii = deunicode(title).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_title() {
        assert_eq!(title_to_filename("Hello World"), "hello-world");
    }

    #[test]
    fn test_punctuation_collapsed() {
        assert_eq!(title_to_filename("Hello, World!"), "hello-world");
        assert_eq!(title_to_filename("A -- B"), "a-b");
    }

    #[test]
    fn test_unicode_transliterated() {
        assert_eq!(title_to_filename("Hellö Wörld"), "hello-world");
        assert_eq!(title_to_filename("Café au lait"), "cafe-au-lait");
    }

    #[test]
    fn test_leading_trailing_separators_trimmed() {
        assert_eq!(title_to_filename("  spaced  "), "spaced");
        assert_eq!(title_to_filename("!!bang!!"), "bang");
    }

    #[test]
    fn test_numbers_kept() {
        assert_eq!(title_to_filename("Top 10 Crates (2024)"), "top-10-crates-2024");
    }

    #[test]
    fn test_empty_title() {
        assert_eq!(title_to_filename(""), "");
        assert_eq!(title_to_filename("!!!"), "");
    }
}
