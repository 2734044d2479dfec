//! The learner's in-memory session.
//!
//! One `Learner` exists per process. It owns every course, quiz, deck and the
//! points total; the handlers borrow it through the mutex in `AppState` and
//! write course changes back to the `SessionStore` after every mutation.

use crate::store::SessionStore;
use anyhow::Result;
use coach_core::{
    course::CourseRecord,
    flashcards::Flashcard,
    quiz::{AnswerOutcome, Question, QuizAttempt},
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Languages a course can be created for.
pub const LANGUAGES: [&str; 18] = [
    "Python",
    "JavaScript",
    "Java",
    "C++",
    "C#",
    "Ruby",
    "Go",
    "Swift",
    "Kotlin",
    "PHP",
    "R",
    "TypeScript",
    "Scala",
    "Perl",
    "Rust",
    "Dart",
    "Haskell",
    "MATLAB",
];

pub const MIN_COURSE_DAYS: u32 = 30;
pub const MAX_COURSE_DAYS: u32 = 365;
pub const POINTS_PER_CORRECT_ANSWER: u32 = 10;

const USERNAME: &str = "user";
const PASSWORD: &str = "pass";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub title: &'static str,
    pub points: u32,
    pub description: &'static str,
}

pub const ACHIEVEMENTS: [Achievement; 4] = [
    Achievement {
        title: "Beginner",
        points: 100,
        description: "Started your coding journey",
    },
    Achievement {
        title: "Intermediate",
        points: 500,
        description: "Making good progress",
    },
    Achievement {
        title: "Advanced",
        points: 1000,
        description: "Becoming a coding expert",
    },
    Achievement {
        title: "Master",
        points: 5000,
        description: "True coding master",
    },
];

/// Errors raised by course bookkeeping.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CourseError {
    #[error("Please log in first")]
    NotAuthenticated,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No course data found for {0}. Please create a course first.")]
    MissingCourseData(String),
    #[error("No study plan found for {0}. Please recreate the course.")]
    MissingStudyPlan(String),
    #[error("Not enough topics covered yet to create a test. Please progress further in the course.")]
    NoRecentTopics,
    #[error("A course for {0} already exists")]
    CourseExists(String),
    #[error("{0} is not a supported language")]
    UnsupportedLanguage(String),
    #[error("Course duration must be between 30 and 365 days, got {0}")]
    InvalidDuration(u32),
    #[error("Test {1} for {0} not found")]
    UnknownQuiz(String, u32),
    #[error("Question {0} does not exist")]
    QuestionOutOfRange(usize),
    #[error("'{0}' is not one of A, B, C or D")]
    InvalidAnswer(String),
    #[error("Course completed! Review previous topics or start a new course.")]
    CourseFinished,
    #[error("Already at the first day of the course")]
    AtFirstDay,
    #[error("Already at the last day of the course")]
    AtLastDay,
}

/// A one-day move computed from the current state, not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayMove {
    pub course: CourseRecord,
    /// The completed day and the resulting set, for forward moves.
    pub completed: Option<(u32, BTreeSet<u32>)>,
}

/// Everything the learner has built up during this process's lifetime.
#[derive(Debug, Default)]
pub struct Learner {
    pub authenticated: bool,
    pub courses: BTreeMap<String, CourseRecord>,
    pub progress: BTreeMap<String, BTreeSet<u32>>,
    pub quizzes: BTreeMap<String, Vec<QuizAttempt>>,
    pub decks: BTreeMap<String, Vec<Flashcard>>,
    pub points: u32,
}

impl Learner {
    /// A logged-out learner with every stored course and its progress.
    pub async fn restore(store: &SessionStore) -> Result<Self> {
        let courses = store.load_all_courses().await?;
        let mut progress = BTreeMap::new();
        for subject in courses.keys() {
            let days = match store.load_progress(subject).await {
                Ok(days) => days,
                Err(e) => {
                    warn!(subject = %subject, error = ?e, "Ignoring unreadable progress file");
                    BTreeSet::new()
                }
            };
            progress.insert(subject.clone(), days);
        }
        info!(courses = courses.len(), "Restored stored courses");
        Ok(Self {
            courses,
            progress,
            ..Self::default()
        })
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), CourseError> {
        if username == USERNAME && password == PASSWORD {
            self.authenticated = true;
            Ok(())
        } else {
            Err(CourseError::InvalidCredentials)
        }
    }

    pub fn ensure_authenticated(&self) -> Result<(), CourseError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(CourseError::NotAuthenticated)
        }
    }

    pub fn course(&self, language: &str) -> Result<&CourseRecord, CourseError> {
        self.courses
            .get(language)
            .ok_or_else(|| CourseError::MissingCourseData(language.to_string()))
    }

    pub fn course_mut(&mut self, language: &str) -> Result<&mut CourseRecord, CourseError> {
        self.courses
            .get_mut(language)
            .ok_or_else(|| CourseError::MissingCourseData(language.to_string()))
    }

    /// Languages that do not have a course yet.
    pub fn available_languages(&self) -> Vec<&'static str> {
        LANGUAGES
            .into_iter()
            .filter(|l| !self.courses.contains_key(*l))
            .collect()
    }

    /// Checks a new-course request before any model call is made.
    pub fn check_new_course(&self, language: &str, days: u32) -> Result<(), CourseError> {
        if !LANGUAGES.iter().any(|l| *l == language) {
            return Err(CourseError::UnsupportedLanguage(language.to_string()));
        }
        if self.courses.contains_key(language) {
            return Err(CourseError::CourseExists(language.to_string()));
        }
        if !(MIN_COURSE_DAYS..=MAX_COURSE_DAYS).contains(&days) {
            return Err(CourseError::InvalidDuration(days));
        }
        Ok(())
    }

    /// Today's topic for `language`.
    pub fn current_topic(&self, language: &str) -> Result<(u32, String), CourseError> {
        let course = self.course(language)?;
        let topic = course.current_topic().ok_or(CourseError::CourseFinished)?;
        Ok((course.current_day, topic.to_string()))
    }

    /// Topics a new quiz or deck should cover: up to three ending today.
    pub fn recent_topics(&self, language: &str) -> Result<Vec<String>, CourseError> {
        let course = self.course(language)?;
        if course.study_plan.is_empty() {
            return Err(CourseError::MissingStudyPlan(language.to_string()));
        }
        let topics = course.recent_topics();
        if topics.is_empty() {
            return Err(CourseError::NoRecentTopics);
        }
        Ok(topics.to_vec())
    }

    /// One day forward for `language`, with the day left behind counted as
    /// completed. Nothing changes until the move is applied.
    pub fn plan_advance(&self, language: &str) -> Result<DayMove, CourseError> {
        let mut course = self.course(language)?.clone();
        let left = course.advance().ok_or(CourseError::AtLastDay)?;
        let mut days = self.progress.get(language).cloned().unwrap_or_default();
        days.insert(left);
        Ok(DayMove {
            course,
            completed: Some((left, days)),
        })
    }

    pub fn plan_retreat(&self, language: &str) -> Result<DayMove, CourseError> {
        let mut course = self.course(language)?.clone();
        if !course.retreat() {
            return Err(CourseError::AtFirstDay);
        }
        Ok(DayMove {
            course,
            completed: None,
        })
    }

    /// Makes a planned move current. Callers persist it first.
    pub fn apply(&mut self, language: &str, step: DayMove) {
        self.courses.insert(language.to_string(), step.course);
        if let Some((_, days)) = step.completed {
            self.progress.insert(language.to_string(), days);
        }
    }

    pub fn completed_days(&self, language: &str) -> Vec<u32> {
        self.progress
            .get(language)
            .map(|days| days.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Stores a freshly generated quiz under the next number for `language`.
    pub fn add_quiz(&mut self, language: &str, questions: Vec<Question>) -> &QuizAttempt {
        let quizzes = self.quizzes.entry(language.to_string()).or_default();
        let number = quizzes.len() as u32 + 1;
        quizzes.push(QuizAttempt::new(number, questions));
        &quizzes[quizzes.len() - 1]
    }

    pub fn quizzes(&self, language: &str) -> &[QuizAttempt] {
        self.quizzes.get(language).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn quiz(&self, language: &str, number: u32) -> Result<&QuizAttempt, CourseError> {
        self.quizzes(language)
            .iter()
            .find(|q| q.number == number)
            .ok_or_else(|| CourseError::UnknownQuiz(language.to_string(), number))
    }

    pub fn quiz_mut(&mut self, language: &str, number: u32) -> Result<&mut QuizAttempt, CourseError> {
        self.quizzes
            .get_mut(language)
            .and_then(|quizzes| quizzes.iter_mut().find(|q| q.number == number))
            .ok_or_else(|| CourseError::UnknownQuiz(language.to_string(), number))
    }

    /// Records an answer and awards points when it is right.
    pub fn answer(
        &mut self,
        language: &str,
        number: u32,
        question: usize,
        letter: &str,
    ) -> Result<AnswerOutcome, CourseError> {
        let quiz = self.quiz_mut(language, number)?;
        if question >= quiz.questions.len() {
            return Err(CourseError::QuestionOutOfRange(question));
        }
        let outcome = quiz
            .answer(question, letter)
            .ok_or_else(|| CourseError::InvalidAnswer(letter.to_string()))?;
        if outcome.correct {
            self.award_points(POINTS_PER_CORRECT_ANSWER);
        }
        Ok(outcome)
    }

    pub fn award_points(&mut self, points: u32) {
        self.points += points;
        info!(points, total = self.points, "Points awarded");
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        ACHIEVEMENTS
            .into_iter()
            .filter(|a| self.points >= a.points)
            .collect()
    }

    /// Appends cards to the language's deck.
    pub fn add_flashcards(&mut self, language: &str, cards: Vec<Flashcard>) -> &[Flashcard] {
        let deck = self.decks.entry(language.to_string()).or_default();
        deck.extend(cards);
        deck
    }

    pub fn deck(&self, language: &str) -> &[Flashcard] {
        self.decks.get(language).map(Vec::as_slice).unwrap_or(&[])
    }
}
