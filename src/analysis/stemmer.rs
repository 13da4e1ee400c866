//! Porter stemming for reducing words to their root forms.
//!
//! This is a simplified rendition of the Porter algorithm. It operates on
//! ASCII words only; non-ASCII tokens (emoji, accented text) are returned
//! unchanged so that stemming is total over arbitrary SMS input.

/// Porter stemming algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }

    /// Stem a word to its root form.
    ///
    /// Words of two characters or fewer, and non-ASCII words, are returned
    /// lowercased but otherwise unchanged.
    pub fn stem(&self, word: &str) -> String {
        let word = word.to_lowercase();
        if word.len() <= 2 || !word.is_ascii() {
            return word;
        }

        let word = step1a(&word);
        let word = step1b(&word);
        let word = step2(&word);
        let word = step3(&word);
        let word = step4(&word);
        step5(&word)
    }
}

/// Check whether the byte at `pos` is a vowel. A `y` counts as a vowel when
/// it follows a consonant.
fn is_vowel(word: &str, pos: usize) -> bool {
    let bytes = word.as_bytes();
    if pos >= bytes.len() {
        return false;
    }
    match bytes[pos].to_ascii_lowercase() {
        b'a' | b'e' | b'i' | b'o' | b'u' => true,
        b'y' if pos > 0 => !is_vowel(word, pos - 1),
        _ => false,
    }
}

/// The Porter measure: the number of vowel-consonant sequences in the word.
fn measure(word: &str) -> usize {
    let n = word.len();
    let mut m = 0;
    let mut i = 0;

    while i < n && !is_vowel(word, i) {
        i += 1;
    }

    while i < n {
        while i < n && is_vowel(word, i) {
            i += 1;
        }
        if i >= n {
            break;
        }
        m += 1;
        while i < n && !is_vowel(word, i) {
            i += 1;
        }
    }

    m
}

fn contains_vowel(word: &str) -> bool {
    (0..word.len()).any(|i| is_vowel(word, i))
}

fn ends_double_consonant(word: &str) -> bool {
    let bytes = word.as_bytes();
    let n = bytes.len();
    n >= 2 && bytes[n - 1] == bytes[n - 2] && !is_vowel(word, n - 1)
}

/// Consonant-vowel-consonant ending where the final consonant is not w, x
/// or y.
fn ends_cvc(word: &str) -> bool {
    let n = word.len();
    if n < 3 {
        return false;
    }
    !is_vowel(word, n - 3)
        && is_vowel(word, n - 2)
        && !is_vowel(word, n - 1)
        && !matches!(word.as_bytes()[n - 1], b'w' | b'x' | b'y')
}

/// Replace `old` with `new` when the remaining stem has at least
/// `min_measure`; otherwise return the word unchanged.
fn replace_suffix(word: &str, old: &str, new: &str, min_measure: usize) -> String {
    if word.ends_with(old) {
        let stem = &word[..word.len() - old.len()];
        if measure(stem) >= min_measure {
            return format!("{stem}{new}");
        }
    }
    word.to_string()
}

fn step1a(word: &str) -> String {
    if word.ends_with("sses") {
        format!("{}ss", &word[..word.len() - 4])
    } else if word.ends_with("ies") {
        format!("{}i", &word[..word.len() - 3])
    } else if word.ends_with("ss") {
        word.to_string()
    } else if word.ends_with('s') && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn step1b(word: &str) -> String {
    let original = word;
    let word = if word.ends_with("eed") {
        replace_suffix(word, "eed", "ee", 1)
    } else if word.ends_with("ed") {
        let stem = &word[..word.len() - 2];
        if contains_vowel(stem) {
            stem.to_string()
        } else {
            word.to_string()
        }
    } else if word.ends_with("ing") {
        let stem = &word[..word.len() - 3];
        if contains_vowel(stem) {
            stem.to_string()
        } else {
            word.to_string()
        }
    } else {
        word.to_string()
    };

    if word == original {
        return word;
    }

    // Repair the stem left behind by ed/ing removal.
    if word.ends_with("at") || word.ends_with("bl") || word.ends_with("iz") {
        format!("{word}e")
    } else if ends_double_consonant(&word)
        && !word.ends_with('l')
        && !word.ends_with('s')
        && !word.ends_with('z')
    {
        word[..word.len() - 1].to_string()
    } else if measure(&word) == 1 && ends_cvc(&word) {
        format!("{word}e")
    } else {
        word
    }
}

fn step2(word: &str) -> String {
    const SUFFIXES: &[(&str, &str)] = &[
        ("ational", "ate"),
        ("tional", "tion"),
        ("enci", "ence"),
        ("anci", "ance"),
        ("izer", "ize"),
        ("abli", "able"),
        ("alli", "al"),
        ("entli", "ent"),
        ("eli", "e"),
        ("ousli", "ous"),
        ("ization", "ize"),
        ("ation", "ate"),
        ("ator", "ate"),
        ("alism", "al"),
        ("iveness", "ive"),
        ("fulness", "ful"),
        ("ousness", "ous"),
        ("aliti", "al"),
        ("iviti", "ive"),
        ("biliti", "ble"),
    ];

    for (old, new) in SUFFIXES {
        if word.ends_with(old) {
            return replace_suffix(word, old, new, 1);
        }
    }

    word.to_string()
}

fn step3(word: &str) -> String {
    const SUFFIXES: &[(&str, &str)] = &[
        ("icate", "ic"),
        ("ative", ""),
        ("alize", "al"),
        ("iciti", "ic"),
        ("ical", "ic"),
        ("ful", ""),
        ("ness", ""),
    ];

    for (old, new) in SUFFIXES {
        if word.ends_with(old) {
            return replace_suffix(word, old, new, 1);
        }
    }

    word.to_string()
}

fn step4(word: &str) -> String {
    const SUFFIXES: &[&str] = &[
        "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion",
        "ou", "ism", "ate", "iti", "ous", "ive", "ize",
    ];

    for suffix in SUFFIXES {
        if word.ends_with(suffix) {
            let stem = &word[..word.len() - suffix.len()];
            if measure(stem) > 1 {
                // "ion" is only removed after s or t.
                if *suffix != "ion" || stem.ends_with('s') || stem.ends_with('t') {
                    return stem.to_string();
                }
            }
        }
    }

    word.to_string()
}

fn step5(word: &str) -> String {
    let word = if word.ends_with('e') {
        let stem = &word[..word.len() - 1];
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            stem.to_string()
        } else {
            word.to_string()
        }
    } else {
        word.to_string()
    };

    if word.ends_with("ll") && measure(&word) > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word
    }
}
