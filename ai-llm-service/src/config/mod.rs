pub mod gemini_config;
pub mod retry_schedule;
