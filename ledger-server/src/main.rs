use ledger_common::db::memory::MemoryStore;
use ledger_common::db::{self, PgStore, Store};

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use flexi_logger::{
    Age, Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, Naming, WriteMode,
};
use std::sync::Arc;

mod env;
mod handlers;
mod middleware;
mod services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut port = 9000u16;
    let mut in_memory = false;

    let mut args = std::env::args();

    // Eat the first argument, which is the relative path to the executable
    args.next();

    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "--port" => {
                let port_str = {
                    let next_arg = args.next();

                    match next_arg {
                        Some(s) => s,
                        None => {
                            eprintln!("ERROR: --port option specified but no port was given");
                            std::process::exit(1);
                        }
                    }
                };

                port = {
                    let port_result = port_str.parse::<u16>();

                    match port_result {
                        Ok(p) => p,
                        Err(_) => {
                            eprintln!("ERROR: Incorrect format for port. Integer expected");
                            std::process::exit(1);
                        }
                    }
                };

                continue;
            }
            "--in-memory" => {
                in_memory = true;
                continue;
            }
            a => {
                eprintln!("ERROR: Invalid argument: {}", &a);
                std::process::exit(1);
            }
        }
    }

    let conf = match env::Config::from_env(in_memory) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };

    let log_spec = LogSpecification::parse(&conf.log_level).unwrap_or_else(|_| {
        eprintln!(
            "WARNING: Invalid log level '{}'. Defaulting to info",
            conf.log_level
        );
        LogSpecification::info()
    });

    let _logger = match Logger::with(log_spec)
        .log_to_file(FileSpec::default().directory("./logs"))
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogAndCompressedFiles(60, 365),
        )
        .cleanup_in_background_thread(true)
        .duplicate_to_stdout(Duplicate::All)
        .write_mode(WriteMode::Async)
        .format(|writer, now, record| {
            write!(
                writer,
                "{:5} | {} | {}:{} | {}",
                record.level(),
                now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                record.module_path().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .use_utc()
        .start()
    {
        Ok(l) => l,
        Err(e) => {
            eprintln!("ERROR: Failed to start logger: {e}");
            std::process::exit(1);
        }
    };

    let actix_workers = conf.actix_worker_count;

    let store: Arc<dyn Store> = match &conf.db {
        Some(db_conf) => {
            log::info!("Connecting to database...");

            // To prevent resource starvation, max connections must be at least as large as the
            // number of actix workers
            let db_max_connections = db_conf.max_connections.max(actix_workers as u32);

            let db_thread_pool = match db::create_db_thread_pool(
                &db_conf.database_uri(),
                db_max_connections,
                db_conf.idle_timeout,
            ) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("ERROR: Failed to connect to database: {e}");
                    std::process::exit(1);
                }
            };

            log::info!("Successfully connected to database");

            Arc::new(PgStore::new(&db_thread_pool))
        }
        None => {
            log::warn!("Using the in-memory store. Records will not outlive the process.");
            Arc::new(MemoryStore::new())
        }
    };

    let store_data: Data<dyn Store> = Data::from(store);
    let auth_data = Data::new(conf.auth.clone());

    let base_addr = format!("127.0.0.1:{}", &port);
    log::info!("Listening on {base_addr} with {actix_workers} workers");

    HttpServer::new(move || {
        App::new()
            .app_data(store_data.clone())
            .app_data(auth_data.clone())
            .configure(services::api::configure)
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(actix_workers)
    .bind(base_addr)?
    .run()
    .await?;

    Ok(())
}
