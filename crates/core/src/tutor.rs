//! The model-backed operations a course needs, behind one handle.

use crate::{
    course::Level,
    curriculum::StudyPlanner,
    error::GenerationError,
    flashcards::{Flashcard, parse_flashcards},
    llm_client::TextClient,
    prompts::PromptBook,
    quiz::{Question, parse_questions},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const QUIZ_QUESTIONS: usize = 10;
pub const FLASHCARDS_PER_REQUEST: usize = 5;

#[derive(Clone)]
pub struct Tutor {
    client: TextClient,
    prompts: Arc<PromptBook>,
    planner: StudyPlanner,
}

impl Tutor {
    pub fn new(client: TextClient, prompts: Arc<PromptBook>, max_plan_turns: usize) -> Self {
        let planner =
            StudyPlanner::new(client.clone(), prompts.clone()).with_max_turns(max_plan_turns);
        Self {
            client,
            prompts,
            planner,
        }
    }

    pub async fn build_plan(
        &self,
        language: &str,
        days: usize,
        level: Level,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, GenerationError> {
        self.planner.build_plan(language, days, level, cancel).await
    }

    /// Markdown explanation of one topic.
    pub async fn explain_topic(
        &self,
        topic: &str,
        language: &str,
    ) -> Result<String, GenerationError> {
        let reply = self
            .client
            .generate(&self.prompts.explain_topic(topic, language))
            .await?;
        Ok(reply.trim().to_string())
    }

    /// Asks for a quiz on `topics` and keeps only the well-formed questions.
    pub async fn generate_questions(
        &self,
        language: &str,
        topics: &[String],
    ) -> Result<Vec<Question>, GenerationError> {
        let reply = self
            .client
            .generate(&self.prompts.quiz(language, topics, QUIZ_QUESTIONS))
            .await?;
        let questions = parse_questions(&reply);
        info!(language, kept = questions.len(), "Quiz questions parsed");
        Ok(questions)
    }

    pub async fn generate_flashcards(
        &self,
        language: &str,
        topics: &[String],
    ) -> Result<Vec<Flashcard>, GenerationError> {
        let reply = self
            .client
            .generate(&self.prompts.flashcards(language, topics, FLASHCARDS_PER_REQUEST))
            .await?;
        let cards = parse_flashcards(&reply);
        info!(language, cards = cards.len(), "Flashcards parsed");
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{MockTextGenerator, RetryPolicy};

    fn tutor(mock: MockTextGenerator) -> Tutor {
        let client = TextClient::new(Arc::new(mock), RetryPolicy::default());
        Tutor::new(client, Arc::new(PromptBook::default()), 5)
    }

    #[tokio::test]
    async fn test_explanation_is_trimmed() {
        let mut mock = MockTextGenerator::new();
        mock.expect_complete()
            .withf(|prompt| prompt.contains("'Pattern Matching' in Rust"))
            .times(1)
            .returning(|_| Ok(Some("\n# Pattern Matching\n\n`match` is exhaustive.\n\n".to_string())));

        let text = tutor(mock)
            .explain_topic("Pattern Matching", "Rust")
            .await
            .unwrap();
        assert_eq!(text, "# Pattern Matching\n\n`match` is exhaustive.");
    }

    #[tokio::test]
    async fn test_generate_questions_filters_reply() {
        let mut mock = MockTextGenerator::new();
        mock.expect_complete()
            .withf(|prompt| prompt.contains("Loops, Functions"))
            .times(1)
            .returning(|_| {
                Ok(Some(
                    "Q: Valid?\nA) a\nB) b\nC) c\nD) d\nCorrect: A\nExplanation: yes\nQ: Broken\nA) a\nCorrect: A"
                        .to_string(),
                ))
            });

        let topics = vec!["Loops".to_string(), "Functions".to_string()];
        let questions = tutor(mock).generate_questions("Python", &topics).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Valid?");
    }

    #[tokio::test]
    async fn test_generate_flashcards() {
        let mut mock = MockTextGenerator::new();
        mock.expect_complete()
            .withf(|prompt| prompt.starts_with("Create 5 flashcards"))
            .times(1)
            .returning(|_| Ok(Some("Front: map\nBack: transforms each item".to_string())));

        let cards = tutor(mock)
            .generate_flashcards("Scala", &["Collections".to_string()])
            .await
            .unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].back, "transforms each item");
    }
}
