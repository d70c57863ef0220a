mod cli;
mod demo;
mod infra;
mod replay;

use reefwatch::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
