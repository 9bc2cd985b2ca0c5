mod cli;
mod infra;
mod routes;
mod score;
mod server;

use lending_risk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
