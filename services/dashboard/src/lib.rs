mod cli;
mod infra;
mod inspect;
mod routes;
mod server;
mod views;

use price_explorer::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
