//! API Models
//!
//! Request payloads and response bodies, with `utoipa` schemas for the
//! OpenAPI document. Responses are views over the core records: quiz views,
//! for instance, never expose the correct letters.

use chrono::NaiveDate;
use coach_core::{
    course::{CourseRecord, Level},
    flashcards::Flashcard,
    quiz::{AnswerOutcome, QuizAttempt},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::session::Achievement;

#[derive(Deserialize, ToSchema)]
pub struct LoginPayload {
    #[schema(example = "user")]
    pub username: String,
    #[schema(example = "pass")]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateCoursePayload {
    #[schema(example = "Python")]
    pub language: String,
    #[schema(example = 90, minimum = 30, maximum = 365)]
    pub days: u32,
    #[schema(value_type = String, example = "Beginner")]
    pub level: Level,
}

#[derive(Deserialize, ToSchema)]
pub struct AnswerPayload {
    /// Zero-based question index.
    pub question: usize,
    #[schema(example = "B")]
    pub answer: String,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct FlashcardsPayload {
    /// Topics to cover; today's recent topics when omitted.
    pub topics: Option<Vec<String>>,
}

#[derive(Deserialize, IntoParams, Default)]
pub struct DeckQuery {
    /// Return the deck in random order.
    pub shuffle: Option<bool>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CourseView {
    pub language: String,
    pub study_plan: Vec<String>,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    pub current_day: u32,
    pub max_day: u32,
    #[schema(value_type = String, example = "Beginner")]
    pub level: Level,
    /// Absent once the current day is past the plan.
    pub current_topic: Option<String>,
    pub completed_days: Vec<u32>,
    pub progress_percent: f64,
}

impl CourseView {
    pub fn new(language: &str, course: &CourseRecord, completed_days: Vec<u32>) -> Self {
        Self {
            language: language.to_string(),
            study_plan: course.study_plan.clone(),
            start_date: course.start_date,
            current_day: course.current_day,
            max_day: course.max_day,
            level: course.level,
            current_topic: course.current_topic().map(str::to_string),
            completed_days,
            progress_percent: course.progress_percent(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ExplanationView {
    pub day: u32,
    pub topic: String,
    /// Markdown.
    pub explanation: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct QuestionView {
    pub question: String,
    pub options: Vec<String>,
    /// The letter given so far, if any.
    pub answer: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct QuizView {
    pub number: u32,
    pub questions: Vec<QuestionView>,
    pub score: usize,
    pub finished: bool,
    /// Filled in once every question has been answered.
    pub review_topics: Vec<String>,
}

impl From<&QuizAttempt> for QuizView {
    fn from(quiz: &QuizAttempt) -> Self {
        let questions = quiz
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionView {
                question: q.question.clone(),
                options: q.options.clone(),
                answer: quiz.answers.get(&index).cloned(),
            })
            .collect();
        let finished = quiz.is_finished();
        Self {
            number: quiz.number,
            questions,
            score: quiz.score(),
            finished,
            review_topics: if finished {
                quiz.review_topics()
            } else {
                Vec::new()
            },
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct AnswerView {
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    pub quiz: QuizView,
    pub total_points: u32,
}

impl AnswerView {
    pub fn new(outcome: AnswerOutcome, quiz: &QuizAttempt, total_points: u32) -> Self {
        Self {
            correct: outcome.correct,
            correct_answer: outcome.correct_answer,
            explanation: outcome.explanation,
            quiz: quiz.into(),
            total_points,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct FlashcardView {
    pub front: String,
    pub back: String,
}

impl From<&Flashcard> for FlashcardView {
    fn from(card: &Flashcard) -> Self {
        Self {
            front: card.front.clone(),
            back: card.back.clone(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct DeckView {
    pub language: String,
    pub cards: Vec<FlashcardView>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct CourseProgressView {
    pub language: String,
    pub current_day: u32,
    pub max_day: u32,
    pub progress_percent: f64,
    pub completed_days: usize,
}

#[derive(Serialize, ToSchema, Debug, PartialEq)]
pub struct AchievementView {
    pub title: String,
    pub points: u32,
    pub description: String,
}

impl From<Achievement> for AchievementView {
    fn from(a: Achievement) -> Self {
        Self {
            title: a.title.to_string(),
            points: a.points,
            description: a.description.to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct OverviewView {
    pub courses: Vec<CourseProgressView>,
    pub total_points: u32,
    pub achievements: Vec<AchievementView>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct LanguagesView {
    pub available: Vec<String>,
}
