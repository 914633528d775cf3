//! Single binary web server: the session core behind a JSON REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.

use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use badminton_session_web::{
    add_pair, assign_to_court, clear_next_game, end_game, generate_next_game,
    remove_pair_by_master, select_players_manually, void_court_assignment, CourtId, GameType,
    Gender, PlayerId, Session, SessionConfig, SessionError, SessionId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-session entry: session data + last activity time (for auto-cleanup).
struct SessionEntry {
    session: Session,
    last_activity: Instant,
}

/// In-memory state: many sessions by ID. Entries are removed after inactivity.
type AppState = Data<RwLock<HashMap<SessionId, SessionEntry>>>;

/// Sessions not accessed for this long are removed by the sweep task.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateSessionBody {
    #[serde(default)]
    config: SessionConfig,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    gender: Gender,
    #[serde(default)]
    guest: bool,
}

/// One row of a roster import: `name,gender,guest`.
#[derive(Deserialize)]
struct RosterRow {
    name: String,
    gender: Gender,
    #[serde(default)]
    guest: bool,
}

#[derive(Deserialize)]
struct RestingBody {
    resting: bool,
}

#[derive(Deserialize)]
struct PositionBody {
    index: usize,
}

#[derive(Deserialize)]
struct PreferencesBody {
    preferences: Vec<GameType>,
}

#[derive(Deserialize)]
struct AddPairBody {
    master_id: PlayerId,
    partner_id: PlayerId,
}

#[derive(Deserialize)]
struct ManualSelectBody {
    player_ids: Vec<PlayerId>,
}

#[derive(Deserialize)]
struct EndGameBody {
    #[serde(default)]
    winner_ids: Vec<PlayerId>,
}

/// Path segment: session id (e.g. /api/sessions/{id})
#[derive(Deserialize)]
struct SessionPath {
    id: SessionId,
}

/// Path segments: session id and player id.
#[derive(Deserialize)]
struct SessionPlayerPath {
    id: SessionId,
    player_id: PlayerId,
}

/// Path segments: session id and court id.
#[derive(Deserialize)]
struct SessionCourtPath {
    id: SessionId,
    court_id: CourtId,
}

/// Lock the state, look the session up, refresh its activity stamp and run
/// the operation. Ok returns the full session JSON, Err a 400 with the error.
fn with_session(
    state: &AppState,
    id: SessionId,
    op: impl FnOnce(&mut Session) -> Result<(), SessionError>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No session" })),
    };
    entry.last_activity = Instant::now();
    match op(&mut entry.session) {
        Ok(()) => HttpResponse::Ok().json(&entry.session),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "badminton-session-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new session (returns it with id; client stores id for subsequent requests).
#[post("/api/sessions")]
async fn api_create_session(state: AppState, body: Option<Json<CreateSessionBody>>) -> HttpResponse {
    let config = body.map(|b| b.config).unwrap_or_default();
    let session = Session::new(config);
    let id = session.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        SessionEntry {
            session,
            last_activity: Instant::now(),
        },
    );
    match g.get(&id) {
        Some(entry) => HttpResponse::Ok().json(&entry.session),
        None => HttpResponse::InternalServerError().body("state error"),
    }
}

/// Restore a session from a previously exported snapshot (the full session
/// JSON is the persistence contract; clients keep it wherever they like).
#[post("/api/sessions/import")]
async fn api_import_session(state: AppState, body: Json<Session>) -> HttpResponse {
    let session = body.into_inner();
    let id = session.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        SessionEntry {
            session,
            last_activity: Instant::now(),
        },
    );
    match g.get(&id) {
        Some(entry) => HttpResponse::Ok().json(&entry.session),
        None => HttpResponse::InternalServerError().body("state error"),
    }
}

/// Get a session by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/sessions/{id}")]
async fn api_get_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, |_| Ok(()))
}

/// Update session settings (court changes refuse to drop an occupied court).
#[put("/api/sessions/{id}/config")]
async fn api_set_config(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<SessionConfig>,
) -> HttpResponse {
    with_session(&state, path.id, |s| s.apply_config(*body))
}

/// Add a player to the back of the queue.
#[post("/api/sessions/{id}/players")]
async fn api_add_player(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<AddPlayerBody>,
) -> HttpResponse {
    with_session(&state, path.id, |s| {
        s.add_player(body.name.trim(), body.gender, body.guest).map(|_| ())
    })
}

/// Bulk roster import: CSV body with a `name,gender,guest` header.
#[post("/api/sessions/{id}/players/import")]
async fn api_import_players(
    state: AppState,
    path: Path<SessionPath>,
    body: web::Bytes,
) -> HttpResponse {
    let mut reader = csv::Reader::from_reader(body.as_ref());
    let mut rows: Vec<RosterRow> = Vec::new();
    for result in reader.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": format!("Bad CSV row: {}", e) }))
            }
        }
    }
    with_session(&state, path.id, |s| {
        for row in rows {
            s.add_player(row.name.trim(), row.gender, row.guest)?;
        }
        Ok(())
    })
}

/// Remove a waiting player from the session.
#[delete("/api/sessions/{id}/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<SessionPlayerPath>) -> HttpResponse {
    with_session(&state, path.id, |s| s.remove_player(path.player_id))
}

/// Toggle a waiting player's resting flag.
#[put("/api/sessions/{id}/players/{player_id}/resting")]
async fn api_set_resting(
    state: AppState,
    path: Path<SessionPlayerPath>,
    body: Json<RestingBody>,
) -> HttpResponse {
    with_session(&state, path.id, |s| s.set_resting(path.player_id, body.resting))
}

/// Move a waiting player to a new queue position.
#[put("/api/sessions/{id}/players/{player_id}/position")]
async fn api_move_player(
    state: AppState,
    path: Path<SessionPlayerPath>,
    body: Json<PositionBody>,
) -> HttpResponse {
    with_session(&state, path.id, |s| s.move_player(path.player_id, body.index))
}

/// Replace a waiting player's game-type preferences.
#[put("/api/sessions/{id}/players/{player_id}/preferences")]
async fn api_set_preferences(
    state: AppState,
    path: Path<SessionPlayerPath>,
    body: Json<PreferencesBody>,
) -> HttpResponse {
    with_session(&state, path.id, |s| {
        s.set_preferences(path.player_id, body.preferences.clone())
    })
}

/// Pair two waiting players (master is moved to sit before the partner).
#[post("/api/sessions/{id}/pairs")]
async fn api_add_pair(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<AddPairBody>,
) -> HttpResponse {
    with_session(&state, path.id, |s| add_pair(s, body.master_id, body.partner_id))
}

/// Break up a pair (master side only).
#[delete("/api/sessions/{id}/pairs/{player_id}")]
async fn api_remove_pair(state: AppState, path: Path<SessionPlayerPath>) -> HttpResponse {
    with_session(&state, path.id, |s| remove_pair_by_master(s, path.player_id))
}

/// Auto-select and stage the next game.
#[post("/api/sessions/{id}/next-game/generate")]
async fn api_generate_next_game(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, generate_next_game)
}

/// Stage a manually picked game (exactly 4 active waiting players).
#[post("/api/sessions/{id}/next-game/manual")]
async fn api_manual_select(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<ManualSelectBody>,
) -> HttpResponse {
    with_session(&state, path.id, |s| select_players_manually(s, &body.player_ids))
}

/// Clear the staged next game (players go back to their queue spots).
#[post("/api/sessions/{id}/next-game/clear")]
async fn api_clear_next_game(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, |s| {
        clear_next_game(s);
        Ok(())
    })
}

/// Assign the staged game to an available court.
#[post("/api/sessions/{id}/courts/{court_id}/assign")]
async fn api_assign_court(state: AppState, path: Path<SessionCourtPath>) -> HttpResponse {
    with_session(&state, path.id, |s| assign_to_court(s, path.court_id))
}

/// End the game on a court, optionally recording the two winners.
#[post("/api/sessions/{id}/courts/{court_id}/end")]
async fn api_end_game(
    state: AppState,
    path: Path<SessionCourtPath>,
    body: Json<EndGameBody>,
) -> HttpResponse {
    with_session(&state, path.id, |s| end_game(s, path.court_id, &body.winner_ids))
}

/// Void a court assignment (the game never happened; players take the staging slot).
#[post("/api/sessions/{id}/courts/{court_id}/void")]
async fn api_void_court(state: AppState, path: Path<SessionCourtPath>) -> HttpResponse {
    with_session(&state, path.id, |s| void_court_assignment(s, path.court_id))
}

/// Start a new session with the same people: counters and trackers reset.
#[post("/api/sessions/{id}/reset")]
async fn api_reset_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, |s| {
        s.start_new_session();
        Ok(())
    })
}

/// Drain the one-shot advisory messages.
#[get("/api/sessions/{id}/advisories")]
async fn api_take_advisories(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No session" })),
    };
    entry.last_activity = Instant::now();
    HttpResponse::Ok().json(entry.session.take_advisories())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<SessionId, SessionEntry>::new()));

    // Background task: every 30 minutes, remove sessions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive session(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_create_session)
            .service(api_import_session)
            .service(api_get_session)
            .service(api_set_config)
            .service(api_add_player)
            .service(api_import_players)
            .service(api_remove_player)
            .service(api_set_resting)
            .service(api_move_player)
            .service(api_set_preferences)
            .service(api_add_pair)
            .service(api_remove_pair)
            .service(api_generate_next_game)
            .service(api_manual_select)
            .service(api_clear_next_game)
            .service(api_assign_court)
            .service(api_end_game)
            .service(api_void_court)
            .service(api_reset_session)
            .service(api_take_advisories)
    })
    .bind(bind)?
    .run()
    .await
}
