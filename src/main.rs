//! treedb - HTTP tree service
//!
//! This is the main entry point for the treedb server.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use treedb::http;
use treedb::service::{parse_bind, parse_database_url, ServiceConfig, TreeService};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Environment first, flags override it.
    let mut config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-b" | "--bind" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Missing value for --bind");
                    return ExitCode::FAILURE;
                };
                match parse_bind(value) {
                    Ok(addr) => config = config.bind(addr),
                    Err(e) => {
                        eprintln!("{}", e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            "-d" | "--database" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Missing value for --database");
                    return ExitCode::FAILURE;
                };
                match parse_database_url(value) {
                    Ok(store) => config = config.store(store),
                    Err(e) => {
                        eprintln!("{}", e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            "-v" | "--verbose" => {
                config = config.verbose(true);
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("treedb v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    init_logging(config.verbose);

    let service = match TreeService::open(&config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "cannot open tree store");
            return ExitCode::FAILURE;
        }
    };

    match http::serve(service, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "treedb=debug,tower_http=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_help() {
    println!("treedb - HTTP service for a tree of named nodes");
    println!();
    println!("Usage: treedb [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -b, --bind ADDR        Listen address (default: 127.0.0.1:8000)");
    println!("  -d, --database URL     Store location, e.g. sqlite:///./test.db");
    println!("  -v, --verbose          Enable debug logging");
    println!("  -h, --help             Show this help message");
    println!("  --version              Show version");
    println!();
    println!("Environment:");
    println!("  DATABASE_URL           Store location (default: sqlite:///./test.db)");
    println!("  ENVIRONMENT            'development' resets the schema on startup");
    println!("  ALLOWED_ORIGINS        Comma-separated CORS origins (default: *)");
    println!("  BIND_ADDR, PORT        Listen address; PORT binds 0.0.0.0:PORT");
    println!("  RUST_LOG               Log filter (default: info)");
}
