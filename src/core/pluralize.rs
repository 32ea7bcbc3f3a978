//! English pluralization for resource paths and user-facing labels
//!
//! Compound names (`purchase_order`, `purchase order`) pluralize their last
//! word only, so the same rules serve URL segments and notification text.

/// Converts singular resource names into their plural form
pub struct Pluralizer;

impl Pluralizer {
    /// Pluralize a singular noun, or the last word of a compound name
    ///
    /// # Examples
    ///
    /// ```
    /// use stockroom::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("product"), "products");
    /// assert_eq!(Pluralizer::pluralize("category"), "categories");
    /// assert_eq!(Pluralizer::pluralize("purchase_order"), "purchase_orders");
    /// assert_eq!(Pluralizer::pluralize("purchase order"), "purchase orders");
    /// ```
    pub fn pluralize(singular: &str) -> String {
        match singular.rfind(['_', ' ']) {
            Some(split) => {
                let (head, last) = singular.split_at(split + 1);
                format!("{}{}", head, Self::pluralize_word(last))
            }
            None => Self::pluralize_word(singular),
        }
    }

    fn pluralize_word(word: &str) -> String {
        if word.is_empty() {
            return String::new();
        }

        let stem = |n: usize| &word[..word.len() - n];

        if word.ends_with('y') && word.len() > 1 && !ends_with_vowel_then(word, 'y') {
            return format!("{}ies", stem(1));
        }

        if ["s", "sh", "ch", "x", "z"].iter().any(|s| word.ends_with(s)) {
            return format!("{}es", word);
        }

        if word.ends_with("fe") && word.len() > 2 {
            return format!("{}ves", stem(2));
        }

        if word.ends_with('f') && word.len() > 1 {
            return format!("{}ves", stem(1));
        }

        if word.ends_with('o') && word.len() > 1 && !ends_with_vowel_then(word, 'o') {
            return match word {
                "photo" | "piano" | "halo" | "memo" | "logo" => format!("{}s", word),
                _ => format!("{}es", word),
            };
        }

        format!("{}s", word)
    }
}

/// True when `word` ends with a vowel followed by `last`
fn ends_with_vowel_then(word: &str, last: char) -> bool {
    let mut chars = word.chars().rev();
    chars.next() == Some(last) && matches!(chars.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}
