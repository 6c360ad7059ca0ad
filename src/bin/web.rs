//! JSON API for the tennis tournament organizer.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT,
//! BRACKET_FORMAT (final | semifinals), SCHEDULE_SEED, PUBLIC_URL.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use tennis_tournament_web::{
    export, MatchId, MemoryStore, NewPlayer, ServerConfig, TournamentError, TournamentId,
    TournamentService,
};

struct AppData {
    service: TournamentService<MemoryStore>,
    config: ServerConfig,
}

type AppState = Data<AppData>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerLimitBody {
    player_limit: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourtsBody {
    number_of_courts: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeSlotsBody {
    time_slots: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreBody {
    player1_games: u32,
    player2_games: u32,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and match id (e.g. /api/tournaments/{id}/matches/{match_id}/score)
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

/// 404 for unknown tournaments, 500 for store failures, 400 for everything else.
fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::TournamentNotFound(_) | TournamentError::MatchNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        TournamentError::Store(cause) => {
            log::error!("Store failure: {}", cause);
            HttpResponse::InternalServerError().json(body)
        }
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tennis-tournament-web",
    })
}

/// Create a new tournament with default settings (client keeps the id).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState) -> HttpResponse {
    respond(state.service.create_tournament())
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.service.get_tournament(path.id))
}

/// Players ordered by points, then game difference.
#[get("/api/tournaments/{id}/ranking")]
async fn api_ranking(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.service.ranking(path.id))
}

/// Register a player (group phase, below the player limit).
#[post("/api/tournaments/{id}/players")]
async fn api_add_player(state: AppState, path: Path<TournamentPath>, body: Json<NewPlayer>) -> HttpResponse {
    respond(state.service.add_player(path.id, body.into_inner()))
}

#[put("/api/tournaments/{id}/settings/player-limit")]
async fn api_set_player_limit(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<PlayerLimitBody>,
) -> HttpResponse {
    respond(state.service.set_player_limit(path.id, body.player_limit))
}

#[put("/api/tournaments/{id}/settings/courts")]
async fn api_set_courts(state: AppState, path: Path<TournamentPath>, body: Json<CourtsBody>) -> HttpResponse {
    respond(state.service.set_number_of_courts(path.id, body.number_of_courts))
}

#[put("/api/tournaments/{id}/settings/time-slots")]
async fn api_set_time_slots(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<TimeSlotsBody>,
) -> HttpResponse {
    respond(state.service.set_time_slots(path.id, body.time_slots.as_slice()))
}

/// Pair everyone and assign courts and time slots.
#[post("/api/tournaments/{id}/matches/draw")]
async fn api_draw_matches(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.service.draw_matches(path.id))
}

#[post("/api/tournaments/{id}/matches/redraw")]
async fn api_redraw_matches(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.service.redraw_matches(path.id))
}

/// Enter a group or bracket result; returns the refreshed tournament.
#[put("/api/tournaments/{id}/matches/{match_id}/score")]
async fn api_submit_score(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    let result = state
        .service
        .submit_score(path.id, path.match_id, body.player1_games, body.player2_games)
        .and_then(|()| state.service.get_tournament(path.id));
    respond(result)
}

#[post("/api/tournaments/{id}/advance")]
async fn api_advance_phase(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let result = state
        .service
        .advance_phase(path.id)
        .and_then(|_| state.service.get_tournament(path.id));
    respond(result)
}

#[post("/api/tournaments/{id}/reset")]
async fn api_reset_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.service.reset_tournament(path.id))
}

/// Group schedule as CSV, ordered by slot then court.
#[get("/api/tournaments/{id}/schedule.csv")]
async fn api_schedule_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let tournament = match state.service.get_tournament(path.id) {
        Ok(t) => t,
        Err(e) => return error_response(e),
    };
    match export::schedule_csv(&tournament) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(csv),
        Err(e) => {
            log::error!("CSV export for {} failed: {}", path.id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "Export failed" }))
        }
    }
}

/// Link other people can open to follow the tournament.
#[get("/api/tournaments/{id}/share")]
async fn api_share(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.service.get_tournament(path.id) {
        Ok(t) => HttpResponse::Ok().json(serde_json::json!({ "url": state.config.share_url(t.id) })),
        Err(e) => error_response(e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!(
        "Starting server at http://{}:{} ({:?} bracket)",
        bind.0,
        bind.1,
        config.bracket_format
    );

    let service = match config.schedule_seed {
        Some(seed) => TournamentService::with_seed(MemoryStore::new(), config.bracket_format, seed),
        None => TournamentService::new(MemoryStore::new(), config.bracket_format),
    };
    let state = Data::new(AppData { service, config });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_ranking)
            .service(api_add_player)
            .service(api_set_player_limit)
            .service(api_set_courts)
            .service(api_set_time_slots)
            .service(api_draw_matches)
            .service(api_redraw_matches)
            .service(api_submit_score)
            .service(api_advance_phase)
            .service(api_reset_tournament)
            .service(api_schedule_csv)
            .service(api_share)
    })
    .bind(bind)?
    .run()
    .await
}
