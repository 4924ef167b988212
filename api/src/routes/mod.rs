pub mod ask_ai;
pub mod health_route;
