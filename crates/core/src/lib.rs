//! Core of the coding coach: the model client, the study plan extractor, and
//! the parsers that turn free-text model replies into questions and
//! flashcards.

pub mod course;
pub mod curriculum;
pub mod error;
pub mod flashcards;
pub mod llm_client;
pub mod prompts;
pub mod quiz;
pub mod tutor;
