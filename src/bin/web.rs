//! Single binary web server: bracket, result reporting, standings and portfolios via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Optional env: SEEDING_CSV (seed table), PORTFOLIO_CSV (portfolio entries),
//! BRACKET_CONFIG (JSON tournament config).

use actix_web::{
    get, patch, post,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use madness_bracket::{
    calculate_portfolio_standings, calculate_standings, generate_bracket,
    ingest::{load_portfolios, load_seed_table},
    report_result, undo_result, BracketError, ChangeFeed, InMemoryStore, MatchId, MatchResult,
    MatchStatus, MatchStore, PortfolioEntry, SeedEntry, SeedTable, TournamentConfig, TournamentId,
};
use serde::Deserialize;
use std::sync::RwLock;
use uuid::Uuid;

/// Everything the server holds for the one running tournament.
struct AppData {
    tournament_id: TournamentId,
    store: InMemoryStore,
    config: TournamentConfig,
    portfolios: Vec<PortfolioEntry>,
}

type AppState = Data<RwLock<AppData>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct GenerateBracketBody {
    entrants: Vec<SeedEntry>,
}

#[derive(Deserialize)]
struct MatchListQuery {
    status: Option<MatchStatus>,
}

/// Path segment: match id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

fn error_response(e: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        BracketError::MatchNotFound(_) | BracketError::EntrantNotFound(_) => HttpResponse::NotFound().json(body),
        BracketError::InconsistentState(_) => HttpResponse::Conflict().json(body),
        BracketError::Config(_) => HttpResponse::InternalServerError().json(body),
        BracketError::Validation(_) | BracketError::InvalidSchedule(_) | BracketError::Ingest(_) => {
            HttpResponse::BadRequest().json(body)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "madness-bracket",
    })
}

#[get("/api/entrants")]
async fn api_entrants(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(g.store.all_entrants())
}

/// All matches by round and match number. `?status=ready` lists matches ready to play.
#[get("/api/matches")]
async fn api_matches(state: AppState, query: Query<MatchListQuery>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let matches: Vec<_> = g
        .store
        .all_matches()
        .into_iter()
        .filter(|m| match query.status {
            None => true,
            Some(MatchStatus::Ready) => m.is_ready_to_play(),
            Some(status) => m.status == status,
        })
        .collect();
    HttpResponse::Ok().json(matches)
}

#[get("/api/matches/{id}")]
async fn api_get_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.store.get_match(path.id) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(&e),
    }
}

/// Report a result: `{player1_score, player2_score}` or `{game_scores: [{p1, p2}, ...]}`.
#[patch("/api/matches/{id}")]
async fn api_report_result(state: AppState, path: Path<MatchPath>, body: Json<MatchResult>) -> HttpResponse {
    // Held for the whole report so the downstream read-modify-write cannot interleave.
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let games_to_win = g.config.games_to_win;
    match report_result(&mut g.store, path.id, &body, games_to_win) {
        Ok(outcome) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "winner_id": outcome.winner,
            "match": outcome.completed,
            "next_match": outcome.next_match,
        })),
        Err(e) => error_response(&e),
    }
}

/// Undo a result, clearing everything it propagated.
#[post("/api/matches/{id}/undo")]
async fn api_undo_result(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match undo_result(&mut g.store, path.id) {
        Ok(outcome) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "reverted": outcome.reverted,
        })),
        Err(e) => error_response(&e),
    }
}

/// Replace the tournament with a bracket generated from the posted seed list.
#[post("/api/bracket")]
async fn api_generate_bracket(state: AppState, body: Json<GenerateBracketBody>) -> HttpResponse {
    let seeds = match SeedTable::new(body.into_inner().entrants) {
        Ok(seeds) => seeds,
        Err(e) => return error_response(&e),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let tournament_id = Uuid::new_v4();
    let bracket = match generate_bracket(tournament_id, &seeds, &g.config) {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    if let Err(e) = g.store.load(bracket) {
        return error_response(&e);
    }
    g.tournament_id = tournament_id;
    HttpResponse::Ok().json(serde_json::json!({
        "tournament_id": tournament_id,
        "matches": g.store.all_matches(),
    }))
}

#[get("/api/standings")]
async fn api_standings(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let standings = calculate_standings(&g.store.all_matches(), &g.store.all_entrants(), &g.config.points);
    HttpResponse::Ok().json(serde_json::json!({
        "tournament_id": g.tournament_id,
        "standings": standings,
    }))
}

#[get("/api/portfolios")]
async fn api_portfolios(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let standings = calculate_standings(&g.store.all_matches(), &g.store.all_entrants(), &g.config.points);
    HttpResponse::Ok().json(calculate_portfolio_standings(&g.portfolios, &standings))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn to_io(e: BracketError) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

/// Seed table from SEEDING_CSV, or numbered placeholders sized to the schedule.
fn initial_seeds(config: &TournamentConfig) -> Result<SeedTable, BracketError> {
    match std::env::var("SEEDING_CSV") {
        Ok(path) => load_seed_table(path),
        Err(_) => {
            let n = config.schedule.entrant_count() as u32;
            log::warn!("SEEDING_CSV not set, seeding {} placeholder entrants", n);
            Ok(SeedTable::numbered(n))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);

    let config = TournamentConfig::from_env().map_err(to_io)?;
    let seeds = initial_seeds(&config).map_err(to_io)?;
    let portfolios = match std::env::var("PORTFOLIO_CSV") {
        Ok(path) => load_portfolios(path).map_err(to_io)?,
        Err(_) => Vec::new(),
    };

    let tournament_id = Uuid::new_v4();
    let bracket = generate_bracket(tournament_id, &seeds, &config).map_err(to_io)?;

    let feed = ChangeFeed::default();
    let mut changes = feed.subscribe();
    let mut store = InMemoryStore::with_feed(feed);
    store.load(bracket).map_err(to_io)?;

    let state = Data::new(RwLock::new(AppData {
        tournament_id,
        store,
        config,
        portfolios,
    }));

    // Background task: log every match change pushed by the store
    actix_web::rt::spawn(async move {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            match changes.recv().await {
                Ok(event) => log::debug!(
                    "{:?} on {}: {}",
                    event.event_type,
                    event.table,
                    event.row.get("id").cloned().unwrap_or_default()
                ),
                Err(RecvError::Lagged(n)) => log::warn!("Change log skipped {} events", n),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_entrants)
            .service(api_matches)
            .service(api_get_match)
            .service(api_report_result)
            .service(api_undo_result)
            .service(api_generate_bracket)
            .service(api_standings)
            .service(api_portfolios)
    })
    .bind(bind)?
    .run()
    .await
}
