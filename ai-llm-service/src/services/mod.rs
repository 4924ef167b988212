pub mod gemini_service;
pub mod text_generator;
