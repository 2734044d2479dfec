//! Multiple-choice questions: parsing the model's reply and scoring attempts.
//!
//! The model is asked for blocks like
//!
//! ```text
//! Q: What is 2+2?
//! A) 3
//! B) 4
//! C) 5
//! D) 6
//! Correct: B
//! Explanation: Basic math
//! ```
//!
//! Parsing never fails. Anything that does not end up with four options and
//! a correct letter in A-D is dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub correct: String,
    pub explanation: String,
}

impl Question {
    /// Exactly four options and a single correct letter in A-D.
    pub fn is_valid(&self) -> bool {
        self.options.len() == OPTION_LETTERS.len() && option_index(&self.correct).is_some()
    }

    /// Text of the correct option.
    pub fn correct_answer(&self) -> Option<&str> {
        let index = option_index(&self.correct)?;
        self.options.get(index).map(String::as_str)
    }

    /// Whether `letter` (case-insensitive) names the correct option.
    pub fn is_correct(&self, letter: &str) -> bool {
        let letter = normalize_letter(letter);
        option_index(&letter).is_some() && letter == self.correct
    }
}

/// Index of an option letter, `None` unless it is exactly one of A-D.
fn option_index(letter: &str) -> Option<usize> {
    let mut chars = letter.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    OPTION_LETTERS.iter().position(|&l| l == first)
}

fn normalize_letter(letter: &str) -> String {
    letter.trim().to_ascii_uppercase()
}

#[derive(Default)]
struct Draft {
    question: String,
    options: Vec<String>,
    correct: Option<String>,
    explanation: Option<String>,
}

impl Draft {
    fn finish(self) -> Option<Question> {
        Some(Question {
            question: self.question,
            options: self.options,
            correct: self.correct?,
            explanation: self.explanation.unwrap_or_default(),
        })
    }
}

/// Parses a block of `Q:` / `A)`..`D)` / `Correct:` / `Explanation:` lines.
pub fn parse_questions(raw: &str) -> Vec<Question> {
    let mut parsed = Vec::new();
    let mut open: Option<Draft> = None;

    for line in raw.lines().map(str::trim) {
        if let Some(text) = line.strip_prefix("Q:") {
            if let Some(question) = open.take().and_then(Draft::finish) {
                parsed.push(question);
            }
            open = Some(Draft {
                question: text.trim().to_string(),
                ..Draft::default()
            });
            continue;
        }

        let Some(draft) = open.as_mut() else {
            continue;
        };
        if ["A)", "B)", "C)", "D)"].iter().any(|p| line.starts_with(p)) {
            // The prefix plus the separating space.
            let option: String = line.chars().skip(3).collect();
            draft.options.push(option.trim().to_string());
        } else if line.starts_with("Correct:") {
            let letter = line.split(':').nth(1).unwrap_or_default().trim();
            draft.correct = Some(letter.to_string());
        } else if let Some(text) = line.strip_prefix("Explanation:") {
            draft.explanation = Some(text.trim().to_string());
        }
    }

    if let Some(question) = open.and_then(Draft::finish) {
        parsed.push(question);
    }

    parsed.into_iter().filter(Question::is_valid).collect()
}

/// What happened when an answer was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: String,
}

/// One learner's pass through a generated quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub number: u32,
    pub questions: Vec<Question>,
    /// Question index to the chosen letter.
    pub answers: BTreeMap<usize, String>,
}

impl QuizAttempt {
    pub fn new(number: u32, questions: Vec<Question>) -> Self {
        Self {
            number,
            questions,
            answers: BTreeMap::new(),
        }
    }

    /// Records `letter` for question `index`, replacing any earlier answer.
    ///
    /// Returns `None` if the index is out of range or the letter is not one
    /// of A-D.
    pub fn answer(&mut self, index: usize, letter: &str) -> Option<AnswerOutcome> {
        let question = self.questions.get(index)?;
        let letter = normalize_letter(letter);
        option_index(&letter)?;
        let outcome = AnswerOutcome {
            correct: question.is_correct(&letter),
            correct_answer: question.correct_answer().unwrap_or_default().to_string(),
            explanation: question.explanation.clone(),
        };
        self.answers.insert(index, letter);
        Some(outcome)
    }

    pub fn score(&self) -> usize {
        self.answers
            .iter()
            .filter(|(index, letter)| {
                self.questions
                    .get(**index)
                    .is_some_and(|q| q.is_correct(letter))
            })
            .count()
    }

    pub fn is_finished(&self) -> bool {
        self.answers.len() == self.questions.len()
    }

    /// First word of every question not answered correctly, deduplicated.
    pub fn review_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = Vec::new();
        for (index, question) in self.questions.iter().enumerate() {
            let right = self
                .answers
                .get(&index)
                .is_some_and(|letter| question.is_correct(letter));
            if right {
                continue;
            }
            if let Some(word) = question.question.split_whitespace().next() {
                if !topics.iter().any(|t| t == word) {
                    topics.push(word.to_string());
                }
            }
        }
        topics
    }

    /// Clears all answers for a retake.
    pub fn reset(&mut self) {
        self.answers.clear();
    }
}
