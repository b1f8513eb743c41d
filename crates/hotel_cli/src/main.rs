//! Command-line entry point for the hotel server.
//!
//! # Responsibility
//! - Dispatch one request through the router and print the response.
//! - Seed the configured database with demo data.
//!
//! Usage:
//! - `hotel_cli ping`
//! - `hotel_cli seed`
//! - `hotel_cli <METHOD> <PATH> [JSON_BODY]`

use hotel_api::{ApiConfig, ApiRequest, Method, Router};
use hotel_core::db::open_db;
use hotel_core::seed_sample_data;
use log::error;
use std::process::ExitCode;

const USAGE: &str = "usage: hotel_cli ping | seed | <GET|POST|PUT|DELETE> <PATH> [JSON_BODY]";

fn main() -> ExitCode {
    let config = ApiConfig::process();
    if let Err(err) = config.init_logging() {
        eprintln!("logging disabled: {err}");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["ping"] => {
            println!("hotel_core ping={}", hotel_core::ping());
            println!("hotel_core version={}", hotel_core::core_version());
            ExitCode::SUCCESS
        }
        ["seed"] => seed(config),
        [method, path] => request(config, method, path, None),
        [method, path, body] => request(config, method, path, Some(body.to_string())),
        _ => usage(),
    }
}

fn seed(config: &ApiConfig) -> ExitCode {
    let report = open_db(&config.db_path)
        .map_err(|err| err.to_string())
        .and_then(|conn| seed_sample_data(&conn).map_err(|err| err.to_string()));
    match report {
        Ok(report) if report.is_empty() => {
            println!("database already populated; nothing seeded");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            println!(
                "seeded hotels={} rooms={} reservations={}",
                report.hotels, report.rooms, report.reservations
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=db_seed module=cli status=error error={err}");
            eprintln!("seed failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn request(config: &ApiConfig, method: &str, path: &str, body: Option<String>) -> ExitCode {
    let Some(method) = Method::parse(method) else {
        return usage();
    };

    let router = Router::new(config.clone());
    let response = router.handle(&ApiRequest::new(method, path, body));

    println!("status={}", response.status);
    if let Some(body) = &response.body {
        match serde_json::to_string_pretty(body) {
            Ok(text) => println!("{text}"),
            Err(_) => println!("{body}"),
        }
    }

    if response.status >= 500 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn usage() -> ExitCode {
    eprintln!("{USAGE}");
    ExitCode::from(2)
}
