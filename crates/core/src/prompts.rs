//! Prompt templates for every model interaction.
//!
//! Templates use `{name}` placeholders. The built-in set can be overridden
//! per key, e.g. from a directory of Markdown files loaded at startup.

use std::collections::HashMap;

pub const STUDY_PLAN: &str = "study_plan";
pub const CONTINUE_PLAN: &str = "continue_plan";
pub const EXPLAIN_TOPIC: &str = "explain_topic";
pub const QUIZ: &str = "quiz";
pub const FLASHCARDS: &str = "flashcards";

const DEFAULT_STUDY_PLAN: &str = r#"Create a {days}-day course plan for learning {language} programming at {level} level.
Provide a daily topic breakdown in the following format:

1. Topic 1
2. Topic 2
3. Topic 3
...
{days}. Topic {days}

Ensure each topic is concise (1-5 words) and follows a logical progression.
If you reach the end of your response before completing all {days} topics, end with 'CONTINUE' on a new line.
When all {days} topics are listed, end with 'COMPLETE' on a new line."#;

const DEFAULT_CONTINUE_PLAN: &str = "Continue the list";

const DEFAULT_EXPLAIN_TOPIC: &str = r#"Provide an in-depth explanation of '{topic}' in {language} programming. Include:
1. Detailed concept explanation
2. Code examples
3. Best practices
4. Common pitfalls
5. Related LeetCode problems with explanations
6. Additional resources for further learning

Format your response using Markdown for better readability."#;

const DEFAULT_QUIZ: &str = r#"Generate {count} multiple-choice questions to test understanding of the following topics in {language}: {topics}.
Format each question as follows:

Q: [question]
A) [option]
B) [option]
C) [option]
D) [option]
Correct: [letter]
Explanation: [brief explanation of the correct answer]

Ensure questions cover a range of difficulty levels and aspects of the topics."#;

const DEFAULT_FLASHCARDS: &str = r#"Create {count} flashcards for the following topics in {language}: {topics}.
Format each flashcard as:

Front: [concept or question]
Back: [explanation or answer]

Ensure the flashcards cover key concepts and potential areas of confusion."#;

/// The set of templates in use.
#[derive(Debug, Clone)]
pub struct PromptBook {
    templates: HashMap<String, String>,
}

impl Default for PromptBook {
    fn default() -> Self {
        let templates = [
            (STUDY_PLAN, DEFAULT_STUDY_PLAN),
            (CONTINUE_PLAN, DEFAULT_CONTINUE_PLAN),
            (EXPLAIN_TOPIC, DEFAULT_EXPLAIN_TOPIC),
            (QUIZ, DEFAULT_QUIZ),
            (FLASHCARDS, DEFAULT_FLASHCARDS),
        ]
        .into_iter()
        .map(|(key, template)| (key.to_string(), template.to_string()))
        .collect();
        Self { templates }
    }
}

impl PromptBook {
    /// Replaces built-in templates with the given ones. Unknown keys are kept
    /// as well, so callers can look them up with [`PromptBook::get`].
    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        for (key, template) in overrides {
            self.templates.insert(key, template.trim().to_string());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Fills `key`'s template. Every built-in key is always present.
    fn render(&self, key: &str, vars: &[(&str, &str)]) -> String {
        let template = self.get(key).unwrap_or_default();
        vars.iter().fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), value)
        })
    }

    pub fn study_plan(&self, language: &str, days: usize, level: &str) -> String {
        self.render(
            STUDY_PLAN,
            &[
                ("days", &days.to_string()),
                ("language", language),
                ("level", level),
            ],
        )
    }

    pub fn continue_plan(&self) -> String {
        self.render(CONTINUE_PLAN, &[])
    }

    pub fn explain_topic(&self, topic: &str, language: &str) -> String {
        self.render(EXPLAIN_TOPIC, &[("topic", topic), ("language", language)])
    }

    pub fn quiz(&self, language: &str, topics: &[String], count: usize) -> String {
        self.render(
            QUIZ,
            &[
                ("count", &count.to_string()),
                ("language", language),
                ("topics", &topics.join(", ")),
            ],
        )
    }

    pub fn flashcards(&self, language: &str, topics: &[String], count: usize) -> String {
        self.render(
            FLASHCARDS,
            &[
                ("count", &count.to_string()),
                ("language", language),
                ("topics", &topics.join(", ")),
            ],
        )
    }
}
