use std::collections::BTreeSet;

/// Edit-distance similarity at or above this counts as the same name.
pub const NAME_SIMILARITY_THRESHOLD: f64 = 0.75;
/// Share of significant words that must overlap for a word-level match.
pub const WORD_OVERLAP_THRESHOLD: f64 = 0.5;

/// Lowercases, drops punctuation and collapses runs of whitespace.
pub fn normalize_name(value: &str) -> String {
    let mut output = String::new();
    let mut previous_space = true;
    for character in value.trim().chars() {
        if character.is_alphanumeric() {
            output.extend(character.to_lowercase());
            previous_space = false;
        } else if !previous_space {
            output.push(' ');
            previous_space = true;
        }
    }
    output.trim_end().to_string()
}

pub fn levenshtein_distance(left: &str, right: &str) -> usize {
    let left_chars = left.chars().collect::<Vec<char>>();
    let right_chars = right.chars().collect::<Vec<char>>();
    if left_chars.is_empty() {
        return right_chars.len();
    }
    if right_chars.is_empty() {
        return left_chars.len();
    }

    let mut previous = (0..=right_chars.len()).collect::<Vec<usize>>();
    let mut current = vec![0usize; right_chars.len() + 1];
    for (row, left_char) in left_chars.iter().enumerate() {
        current[0] = row + 1;
        for (column, right_char) in right_chars.iter().enumerate() {
            let substitution = previous[column] + usize::from(left_char != right_char);
            let insertion = current[column] + 1;
            let deletion = previous[column + 1] + 1;
            current[column + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[right_chars.len()]
}

/// `1 - distance / longer_length` over normalized names, in `[0, 1]`.
pub fn similarity(left: &str, right: &str) -> f64 {
    let a = normalize_name(left);
    let b = normalize_name(right);
    if a == b {
        return 1.0;
    }

    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - (levenshtein_distance(&a, &b) as f64 / longest as f64)
}

/// Tokens that carry meaning: no stopwords, no bare numbers, no one-letter noise.
pub fn significant_words(value: &str) -> BTreeSet<String> {
    normalize_name(value)
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .filter(|token| !is_stopword(token))
        .filter(|token| !token.chars().all(|character| character.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// Overlap relative to the smaller word set, so "Comcast" vs
/// "Comcast Cable Payment" counts as a full overlap.
pub fn word_overlap(left: &str, right: &str) -> f64 {
    let a = significant_words(left);
    let b = significant_words(right);
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    shared as f64 / smaller as f64
}

/// Name criterion used by the matcher.
pub fn names_match(left: &str, right: &str) -> bool {
    let a = normalize_name(left);
    let b = normalize_name(right);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b || a.contains(&b) || b.contains(&a) {
        return true;
    }
    if similarity(&a, &b) >= NAME_SIMILARITY_THRESHOLD {
        return true;
    }
    word_overlap(&a, &b) >= WORD_OVERLAP_THRESHOLD
}

fn is_stopword(token: &str) -> bool {
    matches!(
        token,
        "the"
            | "and"
            | "of"
            | "for"
            | "to"
            | "in"
            | "on"
            | "at"
            | "by"
            | "a"
            | "an"
            | "inc"
            | "llc"
            | "co"
            | "corp"
            | "com"
            | "www"
            | "payment"
            | "pymt"
            | "pmt"
            | "bill"
            | "autopay"
            | "auto"
            | "pay"
            | "debit"
            | "ach"
            | "pos"
            | "purchase"
            | "card"
            | "online"
            | "recurring"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{
        levenshtein_distance, names_match, normalize_name, significant_words, similarity,
        word_overlap,
    };

    #[test]
    fn normalize_lowercases_and_collapses_punctuation() {
        assert_eq!(normalize_name("  NETFLIX.COM  *Subscription "), "netflix com subscription");
        assert_eq!(normalize_name("AT&T"), "at t");
        assert_eq!(normalize_name("---"), "");
    }

    #[test]
    fn levenshtein_counts_single_edits() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("same", "same"), 0);
    }

    #[test]
    fn similarity_is_one_for_case_and_punctuation_differences() {
        assert!((similarity("Spotify", "SPOTIFY!") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("Spotify", "Spotfy") >= 0.75);
        assert!(similarity("Netflix", "Random Merchant") < 0.5);
    }

    #[test]
    fn significant_words_drop_stopwords_and_numbers() {
        let words = significant_words("ACH PAYMENT - The City of Austin Utilities 4471");
        let expected: BTreeSet<String> = ["austin", "city", "utilities"]
            .iter()
            .map(|word| (*word).to_string())
            .collect();
        assert_eq!(words, expected);
    }

    #[test]
    fn word_overlap_uses_smaller_set() {
        assert!((word_overlap("Comcast", "COMCAST CABLE PAYMENT") - 1.0).abs() < f64::EPSILON);
        assert!(word_overlap("State Farm Insurance", "Farm Fresh Groceries") < 0.5);
    }

    #[test]
    fn names_match_accepts_containment_similarity_and_overlap() {
        assert!(names_match("Netflix", "NETFLIX.COM"));
        assert!(names_match("Verizon Wireless", "Verizon Wirelss"));
        assert!(names_match("City of Austin Utilities", "AUSTIN UTILITIES AUTOPAY 0923"));
        assert!(!names_match("Netflix", "Random Merchant"));
        assert!(!names_match("", "Netflix"));
    }
}
