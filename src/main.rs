use std::error::Error;

use ai_llm_service::telemetry;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file if one exists.
    // Real environment variables always take precedence.
    dotenvy::dotenv().ok();

    telemetry::init("info", Level::DEBUG)?;

    api::start().await?;

    Ok(())
}
