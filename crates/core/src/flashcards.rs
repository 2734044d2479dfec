//! Flashcards parsed from `Front:` / `Back:` line pairs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    /// Empty when the model never supplied a `Back:` line for this card.
    pub back: String,
}

impl Flashcard {
    pub fn has_back(&self) -> bool {
        !self.back.is_empty()
    }
}

/// Parses the model's flashcard reply.
///
/// Every `Front:` line yields one card. A card whose `Back:` never arrives is
/// still emitted, with an empty back. `Back:` lines outside a card are
/// ignored; a repeated `Back:` replaces the earlier one.
pub fn parse_flashcards(raw: &str) -> Vec<Flashcard> {
    let mut cards = Vec::new();
    let mut open: Option<Flashcard> = None;

    for line in raw.trim().lines().map(str::trim) {
        if let Some(front) = line.strip_prefix("Front:") {
            cards.extend(open.take());
            open = Some(Flashcard {
                front: front.trim().to_string(),
                back: String::new(),
            });
        } else if let Some(back) = line.strip_prefix("Back:") {
            if let Some(card) = open.as_mut() {
                card.back = back.trim().to_string();
            }
        }
    }
    cards.extend(open);
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_front_back_pairs() {
        let raw = "Front: What does `?` do?\nBack: Propagates the error to the caller.\n\nFront: Box<T>\nBack: A heap allocation: owned, single pointer.";
        let cards = parse_flashcards(raw);
        assert_eq!(
            cards,
            vec![
                Flashcard {
                    front: "What does `?` do?".to_string(),
                    back: "Propagates the error to the caller.".to_string(),
                },
                Flashcard {
                    front: "Box<T>".to_string(),
                    back: "A heap allocation: owned, single pointer.".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_last_card_without_back_is_kept_empty() {
        let raw = "Front: Slices\nBack: Views into contiguous memory\nFront: Iterators";
        let cards = parse_flashcards(raw);
        assert_eq!(cards.len(), 2);
        assert!(cards[0].has_back());
        assert_eq!(cards[1].front, "Iterators");
        assert!(!cards[1].has_back());
    }

    #[test]
    fn test_card_closed_by_next_front_without_back() {
        let raw = "Front: A\nFront: B\nBack: b";
        let cards = parse_flashcards(raw);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].back, "");
        assert_eq!(cards[1].back, "b");
    }

    #[test]
    fn test_stray_back_and_chatter_are_ignored() {
        let raw = "Here are five cards!\nBack: orphan\n  Front: Traits  \n  Back: first\nBack: second\n";
        let cards = parse_flashcards(raw);
        assert_eq!(
            cards,
            vec![Flashcard {
                front: "Traits".to_string(),
                back: "second".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_input_has_no_cards() {
        assert!(parse_flashcards("").is_empty());
        assert!(parse_flashcards("\n\n").is_empty());
    }
}
