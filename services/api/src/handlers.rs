//! Axum Handlers for the REST API
//!
//! Each handler checks the learner's login, reads what it needs under the
//! learner lock, releases the lock for any model call, and re-locks to record
//! the result. Course changes are written to the store before responding.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Local;
use coach_core::{course::CourseRecord, error::GenerationError};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    models::{
        AnswerPayload, AnswerView, CourseProgressView, CourseView, CreateCoursePayload, DeckQuery,
        DeckView, ErrorResponse, ExplanationView, FlashcardView, FlashcardsPayload, LanguagesView,
        LoginPayload, OverviewView, QuizView, StatusResponse,
    },
    session::{CourseError, Learner},
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    /// The model call failed or produced nothing usable; the client may retry.
    BadGateway(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::BadGateway(message) => (StatusCode::BAD_GATEWAY, message),
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServerError(err)
    }
}

impl From<CourseError> for ApiError {
    fn from(err: CourseError) -> Self {
        let message = err.to_string();
        match err {
            CourseError::NotAuthenticated | CourseError::InvalidCredentials => {
                Self::Unauthorized(message)
            }
            CourseError::MissingCourseData(_)
            | CourseError::MissingStudyPlan(_)
            | CourseError::UnknownQuiz(..)
            | CourseError::QuestionOutOfRange(_) => Self::NotFound(message),
            CourseError::CourseExists(_) => Self::Conflict(message),
            CourseError::NoRecentTopics
            | CourseError::UnsupportedLanguage(_)
            | CourseError::InvalidDuration(_)
            | CourseError::InvalidAnswer(_)
            | CourseError::CourseFinished
            | CourseError::AtFirstDay
            | CourseError::AtLastDay => Self::BadRequest(message),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        warn!(error = %err, "Model generation failed");
        Self::BadGateway(err.to_string())
    }
}

fn course_view(learner: &Learner, language: &str) -> Result<CourseView, ApiError> {
    let course = learner.course(language)?;
    Ok(CourseView::new(
        language,
        course,
        learner.completed_days(language),
    ))
}

/// Log in with the fixed demo credentials.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in", body = StatusResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mut learner = state.learner.lock().await;
    learner.login(&payload.username, &payload.password)?;
    info!(username = %payload.username, "Learner logged in");
    Ok(Json(StatusResponse {
        message: "Logged in successfully!".to_string(),
    }))
}

/// Log out, dropping quizzes, decks and points. Courses are reloaded from disk.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Logged out", body = StatusResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let mut learner = state.learner.lock().await;
    *learner = Learner::restore(&state.store).await?;
    info!("Learner logged out");
    Ok(Json(StatusResponse {
        message: "Logged out".to_string(),
    }))
}

/// Progress across all courses, points and unlocked achievements.
#[utoipa::path(
    get,
    path = "/overview",
    responses(
        (status = 200, description = "Overview", body = OverviewView),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
pub async fn overview(State(state): State<Arc<AppState>>) -> Result<Json<OverviewView>, ApiError> {
    let learner = state.learner.lock().await;
    learner.ensure_authenticated()?;

    let courses = learner
        .courses
        .iter()
        .map(|(language, course)| CourseProgressView {
            language: language.clone(),
            current_day: course.current_day,
            max_day: course.max_day,
            progress_percent: course.progress_percent(),
            completed_days: learner.progress.get(language).map_or(0, |d| d.len()),
        })
        .collect();

    Ok(Json(OverviewView {
        courses,
        total_points: learner.points,
        achievements: learner.achievements().into_iter().map(Into::into).collect(),
    }))
}

/// Languages that a new course can still be created for.
#[utoipa::path(
    get,
    path = "/languages",
    responses(
        (status = 200, description = "Available languages", body = LanguagesView),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
pub async fn languages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LanguagesView>, ApiError> {
    let learner = state.learner.lock().await;
    learner.ensure_authenticated()?;
    Ok(Json(LanguagesView {
        available: learner
            .available_languages()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }))
}

/// List every course.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "All courses", body = [CourseView]),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourseView>>, ApiError> {
    let learner = state.learner.lock().await;
    learner.ensure_authenticated()?;
    let views = learner
        .courses
        .iter()
        .map(|(language, course)| {
            CourseView::new(language, course, learner.completed_days(language))
        })
        .collect();
    Ok(Json(views))
}

/// Generate a study plan and start a new course at day 1.
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCoursePayload,
    responses(
        (status = 201, description = "Course created", body = CourseView),
        (status = 400, description = "Unsupported language or duration", body = ErrorResponse),
        (status = 409, description = "Course already exists", body = ErrorResponse),
        (status = 502, description = "The model failed to produce a plan", body = ErrorResponse)
    )
)]
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let language = payload.language;
    {
        let learner = state.learner.lock().await;
        learner.ensure_authenticated()?;
        learner.check_new_course(&language, payload.days)?;
    }

    info!(language = %language, days = payload.days, level = %payload.level, "Generating course");
    let plan = state
        .tutor
        .build_plan(
            &language,
            payload.days as usize,
            payload.level,
            &state.shutdown.child_token(),
        )
        .await?;

    let course = CourseRecord::new(plan, Local::now().date_naive(), payload.days, payload.level);

    let mut learner = state.learner.lock().await;
    // Another request may have created it while the plan was generating.
    learner.check_new_course(&language, payload.days)?;
    state.store.save_course(&language, &course).await?;
    learner.courses.insert(language.clone(), course);
    info!(language = %language, "Course created");

    Ok((StatusCode::CREATED, Json(course_view(&learner, &language)?)))
}

/// Get a course with today's topic.
#[utoipa::path(
    get,
    path = "/courses/{language}",
    responses(
        (status = 200, description = "Course details", body = CourseView),
        (status = 404, description = "No course for this language", body = ErrorResponse)
    ),
    params(("language" = String, Path, description = "Programming language"))
)]
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
) -> Result<Json<CourseView>, ApiError> {
    let learner = state.learner.lock().await;
    learner.ensure_authenticated()?;
    Ok(Json(course_view(&learner, &language)?))
}

/// Move to the next day; the day left behind counts as completed.
#[utoipa::path(
    post,
    path = "/courses/{language}/next",
    responses(
        (status = 200, description = "Moved forward", body = CourseView),
        (status = 400, description = "Already at the last day", body = ErrorResponse),
        (status = 404, description = "No course for this language", body = ErrorResponse)
    ),
    params(("language" = String, Path, description = "Programming language"))
)]
pub async fn next_day(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
) -> Result<Json<CourseView>, ApiError> {
    let mut learner = state.learner.lock().await;
    learner.ensure_authenticated()?;

    let step = learner.plan_advance(&language)?;
    if let Some((day, days)) = &step.completed {
        state.store.save_progress(&language, days).await?;
        info!(language = %language, completed = *day, "Advanced one day");
    }
    state.store.save_course(&language, &step.course).await?;
    learner.apply(&language, step);

    Ok(Json(course_view(&learner, &language)?))
}

/// Move back one day.
#[utoipa::path(
    post,
    path = "/courses/{language}/previous",
    responses(
        (status = 200, description = "Moved back", body = CourseView),
        (status = 400, description = "Already at the first day", body = ErrorResponse),
        (status = 404, description = "No course for this language", body = ErrorResponse)
    ),
    params(("language" = String, Path, description = "Programming language"))
)]
pub async fn previous_day(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
) -> Result<Json<CourseView>, ApiError> {
    let mut learner = state.learner.lock().await;
    learner.ensure_authenticated()?;

    let step = learner.plan_retreat(&language)?;
    state.store.save_course(&language, &step.course).await?;
    learner.apply(&language, step);

    Ok(Json(course_view(&learner, &language)?))
}

/// Explain today's topic in depth (Markdown).
#[utoipa::path(
    get,
    path = "/courses/{language}/explanation",
    responses(
        (status = 200, description = "Explanation of today's topic", body = ExplanationView),
        (status = 404, description = "No course for this language", body = ErrorResponse),
        (status = 502, description = "The model failed to respond", body = ErrorResponse)
    ),
    params(("language" = String, Path, description = "Programming language"))
)]
pub async fn explain_topic(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
) -> Result<Json<ExplanationView>, ApiError> {
    let (day, topic) = {
        let learner = state.learner.lock().await;
        learner.ensure_authenticated()?;
        learner.current_topic(&language)?
    };

    let explanation = state.tutor.explain_topic(&topic, &language).await?;
    Ok(Json(ExplanationView {
        day,
        topic,
        explanation,
    }))
}

/// Generate a quiz over the most recent topics.
#[utoipa::path(
    post,
    path = "/courses/{language}/quizzes",
    responses(
        (status = 201, description = "Quiz created", body = QuizView),
        (status = 404, description = "No course or study plan", body = ErrorResponse),
        (status = 502, description = "No valid questions were generated", body = ErrorResponse)
    ),
    params(("language" = String, Path, description = "Programming language"))
)]
pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let topics = {
        let learner = state.learner.lock().await;
        learner.ensure_authenticated()?;
        learner.recent_topics(&language)?
    };

    let questions = state.tutor.generate_questions(&language, &topics).await?;
    if questions.is_empty() {
        return Err(ApiError::BadGateway(
            "Failed to generate valid questions. Please try again.".to_string(),
        ));
    }

    let mut learner = state.learner.lock().await;
    // The learner may have logged out while the quiz was generating.
    learner.ensure_authenticated()?;
    learner.course(&language)?;
    let quiz = learner.add_quiz(&language, questions);
    info!(language = %language, number = quiz.number, questions = quiz.questions.len(), "Quiz created");
    Ok((StatusCode::CREATED, Json(QuizView::from(quiz))))
}

/// List the quizzes taken for a language.
#[utoipa::path(
    get,
    path = "/courses/{language}/quizzes",
    responses(
        (status = 200, description = "Quizzes", body = [QuizView]),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    ),
    params(("language" = String, Path, description = "Programming language"))
)]
pub async fn list_quizzes(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
) -> Result<Json<Vec<QuizView>>, ApiError> {
    let learner = state.learner.lock().await;
    learner.ensure_authenticated()?;
    Ok(Json(
        learner.quizzes(&language).iter().map(QuizView::from).collect(),
    ))
}

/// Get one quiz.
#[utoipa::path(
    get,
    path = "/courses/{language}/quizzes/{number}",
    responses(
        (status = 200, description = "Quiz", body = QuizView),
        (status = 404, description = "Quiz not found", body = ErrorResponse)
    ),
    params(
        ("language" = String, Path, description = "Programming language"),
        ("number" = u32, Path, description = "Quiz number, starting at 1")
    )
)]
pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Path((language, number)): Path<(String, u32)>,
) -> Result<Json<QuizView>, ApiError> {
    let learner = state.learner.lock().await;
    learner.ensure_authenticated()?;
    Ok(Json(learner.quiz(&language, number)?.into()))
}

/// Answer one question of a quiz.
#[utoipa::path(
    post,
    path = "/courses/{language}/quizzes/{number}/answers",
    request_body = AnswerPayload,
    responses(
        (status = 200, description = "Answer recorded", body = AnswerView),
        (status = 400, description = "Answer is not one of A-D", body = ErrorResponse),
        (status = 404, description = "Quiz or question not found", body = ErrorResponse)
    ),
    params(
        ("language" = String, Path, description = "Programming language"),
        ("number" = u32, Path, description = "Quiz number, starting at 1")
    )
)]
pub async fn answer_question(
    State(state): State<Arc<AppState>>,
    Path((language, number)): Path<(String, u32)>,
    Json(payload): Json<AnswerPayload>,
) -> Result<Json<AnswerView>, ApiError> {
    let mut learner = state.learner.lock().await;
    learner.ensure_authenticated()?;

    let outcome = learner.answer(&language, number, payload.question, &payload.answer)?;
    let quiz = learner.quiz(&language, number)?;
    if quiz.is_finished() {
        info!(language = %language, number, score = quiz.score(), total = quiz.questions.len(), "Quiz completed");
    }
    Ok(Json(AnswerView::new(outcome, quiz, learner.points)))
}

/// Clear all answers of a quiz.
#[utoipa::path(
    post,
    path = "/courses/{language}/quizzes/{number}/retake",
    responses(
        (status = 200, description = "Quiz reset", body = QuizView),
        (status = 404, description = "Quiz not found", body = ErrorResponse)
    ),
    params(
        ("language" = String, Path, description = "Programming language"),
        ("number" = u32, Path, description = "Quiz number, starting at 1")
    )
)]
pub async fn retake_quiz(
    State(state): State<Arc<AppState>>,
    Path((language, number)): Path<(String, u32)>,
) -> Result<Json<QuizView>, ApiError> {
    let mut learner = state.learner.lock().await;
    learner.ensure_authenticated()?;
    let quiz = learner.quiz_mut(&language, number)?;
    quiz.reset();
    Ok(Json(QuizView::from(&*quiz)))
}

/// Generate flashcards and add them to the language's deck.
#[utoipa::path(
    post,
    path = "/courses/{language}/flashcards",
    request_body = FlashcardsPayload,
    responses(
        (status = 201, description = "Cards added; returns the whole deck", body = DeckView),
        (status = 404, description = "No course for this language", body = ErrorResponse),
        (status = 502, description = "The model failed to respond", body = ErrorResponse)
    ),
    params(("language" = String, Path, description = "Programming language"))
)]
pub async fn create_flashcards(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
    Json(payload): Json<FlashcardsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let topics = {
        let learner = state.learner.lock().await;
        learner.ensure_authenticated()?;
        learner.course(&language)?;
        match payload.topics {
            Some(topics) if !topics.is_empty() => topics,
            _ => learner.recent_topics(&language)?,
        }
    };

    let cards = state.tutor.generate_flashcards(&language, &topics).await?;

    let mut learner = state.learner.lock().await;
    learner.ensure_authenticated()?;
    learner.course(&language)?;
    let deck = learner.add_flashcards(&language, cards);
    let view = DeckView {
        language: language.clone(),
        cards: deck.iter().map(FlashcardView::from).collect(),
    };
    Ok((StatusCode::CREATED, Json(view)))
}

/// The language's flashcard deck, optionally shuffled.
#[utoipa::path(
    get,
    path = "/courses/{language}/flashcards",
    responses(
        (status = 200, description = "Deck", body = DeckView),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    ),
    params(
        ("language" = String, Path, description = "Programming language"),
        DeckQuery
    )
)]
pub async fn get_flashcards(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
    Query(query): Query<DeckQuery>,
) -> Result<Json<DeckView>, ApiError> {
    let learner = state.learner.lock().await;
    learner.ensure_authenticated()?;

    let mut cards: Vec<FlashcardView> = learner
        .deck(&language)
        .iter()
        .map(FlashcardView::from)
        .collect();
    if query.shuffle.unwrap_or(false) {
        cards.shuffle(&mut rand::rng());
    }
    Ok(Json(DeckView { language, cards }))
}
