//! Study Plan Extraction
//!
//! Builds a day-by-day topic list for a course. The model is asked for a
//! numbered list and to close its reply with a `COMPLETE` sentinel, or with
//! `CONTINUE` when it ran out of room. The planner keeps asking it to go on
//! until the sentinel shows up (or the turn cap is hit) and then pulls the
//! numbered lines out of everything it received.

use crate::{course::Level, error::GenerationError, llm_client::TextClient, prompts::PromptBook};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const COMPLETE: &str = "COMPLETE";
pub const CONTINUE: &str = "CONTINUE";

/// Continuation turns allowed before extraction proceeds regardless.
pub const DEFAULT_MAX_TURNS: usize = 20;

static TOPIC_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s(.+)").expect("topic pattern is valid"));

/// Pulls every numbered-list label out of `text`, in encounter order.
///
/// A label is whatever follows "digits, period, whitespace" up to the end of
/// the line. The numbers themselves are discarded.
pub fn extract_topics(text: &str) -> Vec<String> {
    TOPIC_LINE
        .captures_iter(text)
        .filter_map(|caps| {
            let label = caps.get(1)?.as_str().trim();
            (!label.is_empty()).then(|| label.to_string())
        })
        .collect()
}

/// Drives the model through the continuation loop that produces a plan.
#[derive(Clone)]
pub struct StudyPlanner {
    client: TextClient,
    prompts: Arc<PromptBook>,
    max_turns: usize,
}

impl StudyPlanner {
    pub fn new(client: TextClient, prompts: Arc<PromptBook>) -> Self {
        Self {
            client,
            prompts,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    /// Generates exactly `day_count` topics for `language` at `level`.
    ///
    /// Fails with [`GenerationError::EmptyPlan`] when fewer labels were
    /// found; the partial list travels with the error. Cancelling `cancel`
    /// abandons the in-flight call.
    pub async fn build_plan(
        &self,
        language: &str,
        day_count: usize,
        level: Level,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, GenerationError> {
        if day_count == 0 {
            return Ok(Vec::new());
        }

        let initial = self
            .prompts
            .study_plan(language, day_count, &level.to_string());
        let continuation = self.prompts.continue_plan();

        let mut accumulated = String::new();
        let mut turns = 0;
        while !accumulated.contains(COMPLETE) {
            if turns == self.max_turns {
                warn!(language, turns, "Study plan never completed, extracting what arrived");
                break;
            }
            if cancel.is_cancelled() {
                return Err(GenerationError::Cancelled);
            }

            let prompt = if accumulated.is_empty() {
                &initial
            } else {
                &continuation
            };
            let reply = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                reply = self.client.generate(prompt) => reply?,
            };
            turns += 1;
            accumulated.push_str(&reply);

            if !accumulated.contains(CONTINUE) && !accumulated.contains(COMPLETE) {
                debug!(language, turns, "Reply carried no sentinel, appending CONTINUE");
                accumulated.push('\n');
                accumulated.push_str(CONTINUE);
                accumulated.push('\n');
            }
        }

        let mut topics = extract_topics(&accumulated);
        if topics.len() < day_count {
            return Err(GenerationError::EmptyPlan {
                requested: day_count,
                found: topics,
            });
        }
        topics.truncate(day_count);
        info!(language, %level, days = day_count, turns, "Study plan generated");
        Ok(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{RetryPolicy, TextGenerator};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Replies with canned text in order and records every prompt.
    struct ScriptedGenerator {
        replies: Mutex<VecDeque<String>>,
        fallback: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                fallback: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn repeating(reply: &str) -> Self {
            Self {
                fallback: Some(reply.to_string()),
                ..Self::new(&[])
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, prompt: &str) -> Result<Option<String>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let next = self.replies.lock().unwrap().pop_front();
            Ok(next.or_else(|| self.fallback.clone()))
        }
    }

    fn planner(generator: Arc<dyn TextGenerator>) -> StudyPlanner {
        let client = TextClient::new(generator, RetryPolicy::default());
        StudyPlanner::new(client, Arc::new(PromptBook::default()))
    }

    #[test]
    fn test_extract_topics_skips_unnumbered_lines() {
        let text = "Here is your plan:\n1. Variables\n2. Loops\r\nSome notes\n10. Traits and Generics\nCOMPLETE";
        assert_eq!(
            extract_topics(text),
            vec!["Variables", "Loops", "Traits and Generics"]
        );
    }

    #[test]
    fn test_extract_topics_requires_whitespace_after_period() {
        assert!(extract_topics("1.Variables\nv2.0").is_empty());
    }

    #[tokio::test]
    async fn test_single_turn_plan() {
        let generator = Arc::new(ScriptedGenerator::new(&[
            "1. Variables\n2. Loops\n3. Functions\n4. Lists\n5. Classes\nCOMPLETE",
        ]));
        let plan = planner(generator.clone())
            .build_plan("Python", 5, Level::Beginner, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(plan, vec!["Variables", "Loops", "Functions", "Lists", "Classes"]);
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("5-day course plan for learning Python programming at Beginner level"));
    }

    #[tokio::test]
    async fn test_continuation_uses_fixed_prompt() {
        let generator = Arc::new(ScriptedGenerator::new(&[
            "1. Variables\n2. Loops\nCONTINUE",
            "3. Functions\nCOMPLETE",
        ]));
        let plan = planner(generator.clone())
            .build_plan("Go", 3, Level::Intermediate, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(plan, vec!["Variables", "Loops", "Functions"]);
        assert_eq!(generator.prompts()[1], "Continue the list");
    }

    #[tokio::test]
    async fn test_reply_without_sentinel_keeps_loop_going() {
        let generator = Arc::new(ScriptedGenerator::new(&[
            "1. Ownership\n2. Borrowing",
            "3. Lifetimes\nCOMPLETE",
        ]));
        let plan = planner(generator.clone())
            .build_plan("Rust", 3, Level::Advanced, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(plan, vec!["Ownership", "Borrowing", "Lifetimes"]);
        assert_eq!(generator.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_extra_topics_are_truncated() {
        let generator = Arc::new(ScriptedGenerator::new(&[
            "1. A\n2. B\n3. C\n4. D\nCOMPLETE",
        ]));
        let plan = planner(generator)
            .build_plan("C", 2, Level::Beginner, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(plan, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_short_plan_reports_partial_topics() {
        let generator = Arc::new(ScriptedGenerator::new(&["1. Syntax\n2. Types\nCOMPLETE"]));
        let err = planner(generator)
            .build_plan("Java", 4, Level::Beginner, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            GenerationError::EmptyPlan { requested, found } => {
                assert_eq!(requested, 4);
                assert_eq!(found, vec!["Syntax", "Types"]);
            }
            other => panic!("Expected EmptyPlan, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_turn_cap_bounds_a_model_that_never_completes() {
        let generator = Arc::new(ScriptedGenerator::repeating("1. Again\n"));
        let plan = planner(generator.clone())
            .with_max_turns(4)
            .build_plan("Perl", 3, Level::Beginner, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(plan, vec!["Again", "Again", "Again"]);
        assert_eq!(generator.prompts().len(), 4);
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_calling_model() {
        let generator = Arc::new(ScriptedGenerator::repeating("1. Never"));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = planner(generator.clone())
            .build_plan("Dart", 3, Level::Beginner, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Cancelled));
        assert!(generator.prompts().is_empty());
    }

    /// Signals when called, then never answers.
    struct StalledGenerator {
        started: Notify,
    }

    #[async_trait]
    impl TextGenerator for StalledGenerator {
        async fn complete(&self, _prompt: &str) -> Result<Option<String>> {
            self.started.notify_one();
            std::future::pending::<Result<Option<String>>>().await
        }
    }

    #[tokio::test]
    async fn test_cancel_abandons_call_in_flight() {
        let generator = Arc::new(StalledGenerator {
            started: Notify::new(),
        });
        let stalled = planner(generator.clone());
        let cancel = CancellationToken::new();

        let (result, ()) = tokio::join!(
            stalled.build_plan("Lua", 3, Level::Beginner, &cancel),
            async {
                generator.started.notified().await;
                cancel.cancel();
            }
        );

        assert!(matches!(result, Err(GenerationError::Cancelled)));
    }

    #[tokio::test]
    async fn test_zero_days_needs_no_model_call() {
        let generator = Arc::new(ScriptedGenerator::new(&[]));
        let plan = planner(generator.clone())
            .build_plan("R", 0, Level::Beginner, &CancellationToken::new())
            .await
            .unwrap();
        assert!(plan.is_empty());
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_surfaces_no_response() {
        let generator = Arc::new(ScriptedGenerator::new(&[""]));
        let err = planner(generator)
            .build_plan("Swift", 2, Level::Beginner, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::NoResponse));
    }
}
