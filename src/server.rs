use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::handlers;
use crate::services::fetch::{CodeforcesClient, StatementSource};
use crate::services::parser::StatementParser;

pub async fn run(config: Config) -> std::io::Result<()> {
    let host = config.host.clone();
    let port = config.port;

    let client = CodeforcesClient::new(&config).map_err(|e| std::io::Error::other(e.to_string()))?;
    let source: Arc<dyn StatementSource> = Arc::new(client);
    let source = web::Data::from(source);
    let parser = web::Data::new(StatementParser::new(config.source_base_url.clone()));

    print_banner(&host, port);
    info!("Server running at {}/", config.bind_address());
    info!("Problems are fetched from {}", config.source_base_url);

    let startup_time = Instant::now();
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(config.clone())
            .app_data(source.clone())
            .app_data(parser.clone())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    info!("Server stopped. Uptime: {:?}", startup_time.elapsed());
    Ok(())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/parse", web::post().to(handlers::parse_markup))
        .route(
            "/problems/{contest_id}/{index}",
            web::get().to(handlers::get_problem),
        )
        .route("/healthz", web::get().to(|| async { "OK" }));
}

fn print_banner(host: &str, port: u16) {
    let banner = r#"
 ____  _        _                            _
/ ___|| |_ __ _| |_ ___ _ __ ___   ___ _ __ | |_
\___ \| __/ _` | __/ _ \ '_ ` _ \ / _ \ '_ \| __|
 ___) | || (_| | ||  __/ | | | | |  __/ | | | |_
|____/ \__\__,_|\__\___|_| |_| |_|\___|_| |_|\__|
"#;
    println!("{}", banner);
    println!("         Statement extractor started at: http://{}:{}\n", host, port);
}
