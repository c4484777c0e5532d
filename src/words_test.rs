use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn pick_unused_returns_distinct_words_from_bank() {
    let picked = pick_unused(&mut rng(), &[], 3);
    assert_eq!(picked.len(), 3);
    for word in &picked {
        assert!(WORD_BANK.iter().any(|e| e.text == word));
    }
    assert_ne!(picked[0], picked[1]);
    assert_ne!(picked[1], picked[2]);
    assert_ne!(picked[0], picked[2]);
}

#[test]
fn pick_unused_excludes_used_words() {
    let used: Vec<String> = WORD_BANK
        .iter()
        .take(WORD_BANK.len() - 2)
        .map(|e| e.text.to_owned())
        .collect();

    let picked = pick_unused(&mut rng(), &used, 3);
    assert_eq!(picked.len(), 2, "only two unused words remain");
    for word in &picked {
        assert!(!used.contains(word));
    }
}

#[test]
fn pick_unused_empty_when_bank_exhausted() {
    let used: Vec<String> = WORD_BANK.iter().map(|e| e.text.to_owned()).collect();
    assert!(pick_unused(&mut rng(), &used, 3).is_empty());
}

#[test]
fn mask_word_hides_every_letter() {
    assert_eq!(mask_word("apple"), "_ _ _ _ _");
}

#[test]
fn mask_word_preserves_punctuation_and_whitespace() {
    assert_eq!(mask_word("ice cream"), "_ _ _   _ _ _ _ _");
    assert_eq!(mask_word("t-rex"), "_ - _ _ _");
}

#[test]
fn hint_reveals_exactly_n_positions() {
    let rendered = hint(&mut rng(), "giraffe", 2);
    let parts: Vec<&str> = rendered.split(' ').collect();
    assert_eq!(parts.len(), 7);
    let revealed = parts.iter().filter(|p| **p != "_").count();
    assert_eq!(revealed, 2);
    // Revealed characters match the word at their positions.
    for (i, part) in parts.iter().enumerate() {
        if *part != "_" {
            assert_eq!(*part, &"giraffe"[i..=i]);
        }
    }
}

#[test]
fn hint_caps_at_word_length() {
    let rendered = hint(&mut rng(), "ox", 10);
    assert_eq!(rendered, "o x");
}

#[test]
fn bank_words_are_unique_and_lowercase() {
    for (i, entry) in WORD_BANK.iter().enumerate() {
        assert_eq!(entry.text, entry.text.to_lowercase());
        assert!(
            !WORD_BANK[i + 1..].iter().any(|other| other.text == entry.text),
            "duplicate bank entry: {}",
            entry.text
        );
    }
}
