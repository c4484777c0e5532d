//! Word bank — static category-tagged word list, masking, and hints.
//!
//! DESIGN
//! ======
//! The bank is compiled in; games sample from it without replacement
//! across rounds (`used` accumulates for the life of one game). Masking
//! renders every alphanumeric character as `_`, single-space separated;
//! whitespace and punctuation pass through unmasked. Hints reveal `n`
//! distinct maskable positions chosen uniformly — each request samples
//! fresh positions, nothing is accumulated between requests.

use rand::seq::SliceRandom;
use rand::Rng;

/// A bank entry. Categories are informational tags carried alongside the
/// word; gameplay draws from the whole bank.
#[derive(Debug, Clone, Copy)]
pub struct WordEntry {
    pub text: &'static str,
    pub category: &'static str,
}

const fn w(text: &'static str, category: &'static str) -> WordEntry {
    WordEntry { text, category }
}

/// The full word bank.
pub const WORD_BANK: &[WordEntry] = &[
    // animals
    w("elephant", "animals"),
    w("giraffe", "animals"),
    w("penguin", "animals"),
    w("octopus", "animals"),
    w("kangaroo", "animals"),
    w("dolphin", "animals"),
    w("butterfly", "animals"),
    w("hedgehog", "animals"),
    w("flamingo", "animals"),
    w("squirrel", "animals"),
    // food
    w("apple", "food"),
    w("banana", "food"),
    w("pizza", "food"),
    w("hamburger", "food"),
    w("spaghetti", "food"),
    w("pancake", "food"),
    w("watermelon", "food"),
    w("croissant", "food"),
    w("cupcake", "food"),
    w("pretzel", "food"),
    // objects
    w("umbrella", "objects"),
    w("telescope", "objects"),
    w("backpack", "objects"),
    w("scissors", "objects"),
    w("ladder", "objects"),
    w("anchor", "objects"),
    w("compass", "objects"),
    w("hourglass", "objects"),
    w("typewriter", "objects"),
    w("binoculars", "objects"),
    // actions
    w("swimming", "actions"),
    w("juggling", "actions"),
    w("sneezing", "actions"),
    w("climbing", "actions"),
    w("fishing", "actions"),
    w("dancing", "actions"),
    w("whistling", "actions"),
    w("yawning", "actions"),
    w("painting", "actions"),
    w("skating", "actions"),
    // nature
    w("volcano", "nature"),
    w("rainbow", "nature"),
    w("glacier", "nature"),
    w("tornado", "nature"),
    w("waterfall", "nature"),
    w("lightning", "nature"),
    w("island", "nature"),
    w("cactus", "nature"),
    w("mushroom", "nature"),
    w("iceberg", "nature"),
    // places
    w("lighthouse", "places"),
    w("castle", "places"),
    w("library", "places"),
    w("airport", "places"),
    w("carousel", "places"),
    w("pyramid", "places"),
    w("stadium", "places"),
    w("windmill", "places"),
    w("aquarium", "places"),
    w("treehouse", "places"),
];

/// Sample up to `count` distinct unused words, uniformly without
/// replacement. Returns fewer than `count` when the bank is nearly
/// exhausted, and an empty vec when nothing remains.
pub fn pick_unused<R: Rng + ?Sized>(rng: &mut R, used: &[String], count: usize) -> Vec<String> {
    let mut remaining: Vec<&'static str> = WORD_BANK
        .iter()
        .map(|entry| entry.text)
        .filter(|text| !used.iter().any(|u| u == text))
        .collect();
    remaining.shuffle(rng);
    remaining.truncate(count);
    remaining.into_iter().map(str::to_owned).collect()
}

/// Whether a character is hidden behind `_` in the masked rendering.
fn maskable(c: char) -> bool {
    c.is_alphanumeric()
}

/// Render a word with every alphanumeric character as `_`, single-space
/// separated. Whitespace and punctuation are preserved unmasked.
#[must_use]
pub fn mask_word(word: &str) -> String {
    render(word, &[])
}

/// Render a word with `n` distinct maskable positions revealed, chosen
/// uniformly at random.
pub fn hint<R: Rng + ?Sized>(rng: &mut R, word: &str, n: usize) -> String {
    let positions: Vec<usize> = word
        .chars()
        .enumerate()
        .filter(|(_, c)| maskable(*c))
        .map(|(i, _)| i)
        .collect();
    let sample_len = n.min(positions.len());
    let revealed = positions
        .choose_multiple(rng, sample_len)
        .copied()
        .collect::<Vec<_>>();
    render(word, &revealed)
}

fn render(word: &str, revealed: &[usize]) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| {
            if !maskable(c) || revealed.contains(&i) {
                c.to_string()
            } else {
                "_".to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "words_test.rs"]
mod tests;
