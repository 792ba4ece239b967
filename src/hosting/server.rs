use super::*;
use crate::ParticipantId;
use crate::SessionId;
use crate::rules::*;
use crate::session::*;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use serde::Deserialize;

/// Registry type served over HTTP.
pub type Lobby = Registry<ChessRules>;

pub struct Server;

impl Server {
    pub async fn run(config: Config) -> anyhow::Result<()> {
        let registry = web::Data::new(Lobby::default());
        log::info!("starting hosting server on {}", config.bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(registry.clone())
                .configure(routes)
        })
        .workers(config.workers)
        .bind(config.bind.as_str())?
        .run()
        .await?;
        Ok(())
    }
}

/// Mounts the health check and the WebSocket board endpoint.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/ws/board")
            .route("/{session_id}/{participant_id}", web::get().to(enter)),
    );
}

/// Display name supplied by the browser client; only used for logging.
#[derive(Debug, Default, Deserialize)]
pub struct Visitor {
    pub username: Option<String>,
}

async fn health(registry: web::Data<Lobby>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "sessions": registry.len().await,
    }))
}

async fn enter(
    registry: web::Data<Lobby>,
    path: web::Path<(SessionId, ParticipantId)>,
    visitor: web::Query<Visitor>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let (session, participant) = path.into_inner();
    log::info!(
        "{} (P{}) entering session {}",
        visitor.username.as_deref().unwrap_or("anonymous"),
        participant,
        session
    );
    match actix_ws::handle(&req, body) {
        Ok((response, socket, stream)) => {
            Handler::new(registry.into_inner(), session, participant, socket, stream).spawn();
            response
        }
        Err(e) => HttpResponse::BadRequest().body(e.to_string()),
    }
}
