//! Locale-aware ordering for display names.
//!
//! Names compare by a folded key first (lowercase, then compatibility
//! decomposition with combining marks dropped) so "Álvaro" sorts next to
//! "Alvaro" rather than after "Zélia". Ties fall back to the raw string.

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Compares two display names for ascending alphabetical order.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    collation_key(left)
        .cmp(&collation_key(right))
        .then_with(|| left.cmp(right))
}

/// Folded form of `value` used as the primary sort key.
pub fn collation_key(value: &str) -> String {
    let mut key = String::with_capacity(value.len());
    for c in value
        .chars()
        .flat_map(char::to_lowercase)
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
    {
        push_base_letter(&mut key, c);
    }
    key
}

// Letters with no canonical decomposition onto a Latin base.
fn push_base_letter(key: &mut String, c: char) {
    match c {
        'ø' => key.push('o'),
        'ł' => key.push('l'),
        'đ' | 'ð' => key.push('d'),
        'ı' => key.push('i'),
        'ħ' => key.push('h'),
        'æ' => key.push_str("ae"),
        'œ' => key.push_str("oe"),
        'ß' => key.push_str("ss"),
        'þ' => key.push_str("th"),
        other => key.push(other),
    }
}

#[cfg(test)]
mod tests {
    use super::{collation_key, compare_names};
    use std::cmp::Ordering;

    #[test]
    fn folds_case_and_accents() {
        assert_eq!(collation_key("ÁLVARO Conceição"), "alvaro conceicao");
        assert_eq!(collation_key("Ștefan Țurcanu"), "stefan turcanu");
        assert_eq!(collation_key("Ğül Işık"), "gul isik");
    }

    #[test]
    fn decomposed_and_precomposed_names_share_a_key() {
        let decomposed = "Jose\u{301} Conceic\u{327}a\u{303}o";
        assert_eq!(collation_key(decomposed), collation_key("José Conceição"));
    }

    #[test]
    fn letters_without_decomposition_fold_to_latin_base() {
        assert_eq!(collation_key("Æsa Œdipo"), "aesa oedipo");
        assert_eq!(collation_key("Łucja Øyvind"), "lucja oyvind");
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        let mut names = vec!["Zélia", "Érica", "eduardo", "Ana", "Élton", "Ștefan Pop", "Sara"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(
            names,
            vec!["Ana", "eduardo", "Élton", "Érica", "Sara", "Ștefan Pop", "Zélia"]
        );
    }

    #[test]
    fn identical_keys_fall_back_to_raw_order() {
        assert_eq!(compare_names("Joao", "João"), Ordering::Less);
        assert_eq!(compare_names("ana", "ana"), Ordering::Equal);
    }
}
