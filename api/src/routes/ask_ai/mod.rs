pub mod ask_ai_request;
pub mod ask_ai_route;
