use actix_web::{web, HttpResponse};
use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::auth::Authorized;
use crate::db::{Counter, KillRecord, PlayerStore};
use crate::db::models::FAKERANK_GRANT_SECS;
use crate::error::AppError;
use crate::AppState;

fn parse_body(body: &[u8]) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(AppError::InvalidJson)
}

fn expect_object(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::ValidationError("Expected an object keyed by player id".to_string())),
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn invalid_value(key: &str, expected: &str) -> AppError {
    AppError::ValidationError(format!("Invalid value for key \"{}\": expected {}", key, expected))
}

pub(crate) fn integer_entries(body: &[u8]) -> Result<Vec<(String, i64)>, AppError> {
    expect_object(parse_body(body)?)?
        .into_iter()
        .map(|(key, value)| match as_integer(&value) {
            Some(n) => Ok((key, n)),
            None => Err(invalid_value(&key, "integer")),
        })
        .collect()
}

pub(crate) fn boolean_entries(body: &[u8]) -> Result<Vec<(String, bool)>, AppError> {
    expect_object(parse_body(body)?)?
        .into_iter()
        .map(|(key, value)| match value {
            Value::Bool(flag) => Ok((key, flag)),
            _ => Err(invalid_value(&key, "boolean")),
        })
        .collect()
}

pub(crate) fn string_entries(body: &[u8]) -> Result<Vec<(String, String)>, AppError> {
    expect_object(parse_body(body)?)?
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            _ => Err(invalid_value(&key, "string")),
        })
        .collect()
}

pub(crate) fn kill_records(body: &[u8]) -> Result<Vec<KillRecord>, AppError> {
    let Value::Array(items) = parse_body(body)? else {
        return Err(AppError::ValidationError("Expected array of kill records".to_string()));
    };

    items
        .into_iter()
        .map(|item| {
            let attacker = item.get("Attacker").and_then(Value::as_str);
            let target = item.get("Target").and_then(Value::as_str);
            let (Some(attacker), Some(target)) = (attacker, target) else {
                return Err(AppError::ValidationError(
                    "Invalid kill record: attacker and target must be strings".to_string(),
                ));
            };
            let Some(timestamp) = item.get("Timestamp").and_then(as_integer) else {
                return Err(AppError::ValidationError(
                    "Invalid kill record: timestamp must be an integer".to_string(),
                ));
            };

            Ok(KillRecord {
                attacker: attacker.to_string(),
                target: target.to_string(),
                timestamp,
            })
        })
        .collect()
}

fn success(message: impl Into<String>, updated: u64) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": message.into(),
        "updated": updated
    }))
}

fn flag_map(entries: &[(String, bool)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(id, flag)| (id.clone(), Value::Bool(*flag)))
        .collect()
}

fn fakerank_deadline() -> i64 {
    chrono::Utc::now().timestamp() + FAKERANK_GRANT_SECS
}

async fn add_counter(
    store: &dyn PlayerStore,
    counter: Counter,
    body: &[u8],
    label: &str,
) -> Result<HttpResponse, AppError> {
    let entries = integer_entries(body)?;
    info!("Received {} upload for {} player(s)", label, entries.len());

    match store.add_counter(counter, entries).await {
        Ok(updated) => Ok(success(format!("{} data updated successfully", label), updated)),
        Err(e) => {
            error!("{} upload failed: {}", label, e);
            Err(e.into())
        }
    }
}

pub async fn upload_times(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    add_counter(state.store.as_ref(), Counter::Playtime, &body, "Playtime").await
}

pub async fn upload_rounds(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    add_counter(state.store.as_ref(), Counter::RoundsPlayed, &body, "Rounds played").await
}

pub async fn upload_adrenaline(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    add_counter(state.store.as_ref(), Counter::UsedAdrenaline, &body, "Adrenaline usage").await
}

pub async fn upload_escapes(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    add_counter(state.store.as_ref(), Counter::Escapes, &body, "Escape").await
}

pub async fn upload_player_points(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    add_counter(state.store.as_ref(), Counter::Experience, &body, "Player points").await
}

pub async fn upload_snake(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let entries = integer_entries(&body)?;
    info!("Received snake highscore upload for {} player(s)", entries.len());

    let updated = state
        .store
        .max_counter(Counter::SnakeHighscore, entries)
        .await
        .map_err(|e| {
            error!("Snake highscore upload failed: {}", e);
            AppError::from(e)
        })?;

    Ok(success("Snake highscore data updated successfully", updated))
}

pub async fn upload_username(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let entries = string_entries(&body)?;
    info!("Received username upload for {} player(s)", entries.len());

    let updated = state.store.set_usernames(entries).await.map_err(|e| {
        error!("Username upload failed: {}", e);
        AppError::from(e)
    })?;

    Ok(success("Username updated successfully", updated))
}

pub async fn upload_kills(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let kills = kill_records(&body)?;
    info!("Received {} kill record(s)", kills.len());

    let updated = state.store.record_kills(kills).await.map_err(|e| {
        error!("Kill upload failed: {}", e);
        AppError::from(e)
    })?;

    Ok(success("Kill data and player stats updated successfully", updated))
}

pub async fn upload_fakerank_allowed(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let entries = boolean_entries(&body)?;
    let reported = entries.len();
    let updated_data = flag_map(&entries);

    // Permission is only ever granted here; `false` entries are ignored.
    let granted: Vec<String> = entries
        .into_iter()
        .filter(|(_, allowed)| *allowed)
        .map(|(id, _)| id)
        .collect();

    let updated = state
        .store
        .grant_fakerank(granted, fakerank_deadline())
        .await
        .map_err(|e| {
            error!("Fake rank upload failed: {}", e);
            AppError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Fake rank permissions updated successfully for {} player(s)", reported),
        "updated": updated,
        "updated_data": updated_data,
    })))
}

pub async fn upload_fakerank_admin(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let entries = boolean_entries(&body)?;
    let reported = entries.len();
    let updated_data = flag_map(&entries);

    let updated = state
        .store
        .set_fakerank_admin(entries, fakerank_deadline())
        .await
        .map_err(|e| {
            error!("Fake rank admin upload failed: {}", e);
            AppError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Fake rank admin permissions updated successfully for {} player(s)", reported),
        "updated": updated,
        "updated_data": updated_data,
    })))
}
