//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        AchievementView, AnswerPayload, AnswerView, CourseProgressView, CourseView,
        CreateCoursePayload, DeckView, ErrorResponse, ExplanationView, FlashcardView,
        FlashcardsPayload, LanguagesView, LoginPayload, OverviewView, QuestionView, QuizView,
        StatusResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login,
        handlers::logout,
        handlers::overview,
        handlers::languages,
        handlers::list_courses,
        handlers::create_course,
        handlers::get_course,
        handlers::next_day,
        handlers::previous_day,
        handlers::explain_topic,
        handlers::create_quiz,
        handlers::list_quizzes,
        handlers::get_quiz,
        handlers::answer_question,
        handlers::retake_quiz,
        handlers::create_flashcards,
        handlers::get_flashcards,
    ),
    components(
        schemas(
            LoginPayload, CreateCoursePayload, AnswerPayload, FlashcardsPayload,
            StatusResponse, ErrorResponse, CourseView, ExplanationView, QuestionView, QuizView,
            AnswerView, FlashcardView, DeckView, CourseProgressView, AchievementView,
            OverviewView, LanguagesView
        )
    ),
    tags(
        (name = "Coding Coach API", description = "Study plans, quizzes and flashcards for programming languages")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/overview", get(handlers::overview))
        .route("/languages", get(handlers::languages))
        .route(
            "/courses",
            get(handlers::list_courses).post(handlers::create_course),
        )
        .route("/courses/{language}", get(handlers::get_course))
        .route("/courses/{language}/next", post(handlers::next_day))
        .route("/courses/{language}/previous", post(handlers::previous_day))
        .route(
            "/courses/{language}/explanation",
            get(handlers::explain_topic),
        )
        .route(
            "/courses/{language}/quizzes",
            get(handlers::list_quizzes).post(handlers::create_quiz),
        )
        .route(
            "/courses/{language}/quizzes/{number}",
            get(handlers::get_quiz),
        )
        .route(
            "/courses/{language}/quizzes/{number}/answers",
            post(handlers::answer_question),
        )
        .route(
            "/courses/{language}/quizzes/{number}/retake",
            post(handlers::retake_quiz),
        )
        .route(
            "/courses/{language}/flashcards",
            get(handlers::get_flashcards).post(handlers::create_flashcards),
        )
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/login",
            "/logout",
            "/overview",
            "/languages",
            "/courses",
            "/courses/{language}",
            "/courses/{language}/next",
            "/courses/{language}/previous",
            "/courses/{language}/explanation",
            "/courses/{language}/quizzes",
            "/courses/{language}/quizzes/{number}",
            "/courses/{language}/quizzes/{number}/answers",
            "/courses/{language}/quizzes/{number}/retake",
            "/courses/{language}/flashcards",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
