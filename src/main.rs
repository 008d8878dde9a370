use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use school_manager::config::AppConfig;
use school_manager::routes;
use school_manager::runtime::lifetime;
use school_manager::runtime::lifetime::startup::StartupContext;
use school_manager::utils::{json_error_handler, query_error_handler};

/// 初始化日志，返回的 guard 需保持到进程退出
fn init_tracing(config: &AppConfig) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.app.log_level))
        .with_writer(writer)
        .with_level(true)
        .with_ansi(config.is_development());

    // 开发环境输出源码位置，其余环境输出 JSON
    if config.is_development() {
        builder.with_file(true).with_line_number(true).init();
    } else {
        builder.json().init();
    }
    guard
}

fn build_server(config: &'static AppConfig, startup: StartupContext) -> std::io::Result<Server> {
    let StartupContext {
        storage,
        capability,
        transfer,
    } = startup;
    let timeouts = &config.server.timeouts;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(config.cors.max_age),
            )
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Keep-Alive", format!("timeout={}", timeouts.keep_alive)))
                    .add(("Cache-Control", "no-store")),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            // multipart 导入不受此限制，由 TransferSettings.max_upload_bytes 约束
            .app_data(web::PayloadConfig::new(config.server.limits.max_payload_size))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(transfer))
            .configure(routes::configure_admin_routes(capability.clone()))
    })
    .keep_alive(Duration::from_secs(timeouts.keep_alive))
    .client_request_timeout(Duration::from_millis(timeouts.client_request))
    .client_disconnect_timeout(Duration::from_millis(timeouts.client_disconnect))
    .workers(config.server.workers);

    #[cfg(unix)]
    if let Some(socket_path) = config.unix_socket_path() {
        if std::path::Path::new(socket_path).exists() {
            std::fs::remove_file(socket_path)?;
        }
        info!("Admin API listening on unix:{}", socket_path);
        return Ok(server.bind_uds(socket_path)?.run());
    }

    let bind_address = config.server_bind_address();
    info!("Admin API listening on http://{}/api/v1/admin", bind_address);
    Ok(server.bind(bind_address)?.run())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    setup_panic!();

    if let Err(e) = AppConfig::init() {
        eprintln!("Failed to initialize configuration: {e}");
        std::process::exit(1);
    }
    let config = AppConfig::get();
    let _guard = init_tracing(config);

    info!(
        "{} v{} ({}) starting in {} mode with {} workers",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.system_name,
        config.app.environment,
        config.server.workers
    );

    let started = std::time::Instant::now();
    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .map_err(|e| {
            error!("Startup failed: {}", e);
            std::io::Error::other(e.format_simple())
        })?;
    info!("Startup completed in {} ms", started.elapsed().as_millis());

    let server = build_server(config, startup)?;

    tokio::select! {
        res = server => res?,
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Shutdown signal received, stopping server");
        }
    }

    Ok(())
}
