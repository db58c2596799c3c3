use std::process;

use log::error;

mod app;
mod config;
mod db;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod types;
mod utils;
mod validations;

use errors::AppError;

/// Process exit status for a startup failure
fn exit_code(err: &AppError) -> i32 {
    match err {
        AppError::Config(_) => 2,
        AppError::Logger(_) => 3,
        AppError::Database(_) => 4,
        _ => 1,
    }
}

#[actix_web::main]
async fn main() {
    let Err(err) = app::server().await else {
        return;
    };

    match &err {
        // Logging is not initialised when these happen
        AppError::Config(_) | AppError::Logger(_) => eprintln!("recipe-share failed to start: {}", err),
        _ => error!("recipe-share stopped: {}", err),
    }
    process::exit(exit_code(&err));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&AppError::Config("bad port".into())), 2);
        assert_eq!(exit_code(&AppError::Logger("twice".into())), 3);
        assert_eq!(exit_code(&AppError::Database("refused".into())), 4);
        assert_eq!(exit_code(&AppError::Internal("boom".into())), 1);
    }
}
