use actix_web::{web, HttpRequest, HttpResponse};
use tracing::{debug, error};

use crate::auth::Authorized;
use crate::db::{ExperienceEntry, PlayerStore};
use crate::error::AppError;
use crate::AppState;

/// All `userId` values of the query string, in order, blanks skipped.
fn user_ids(req: &HttpRequest) -> Vec<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .filter(|(key, value)| key == "userId" && !value.trim().is_empty())
        .map(|(_, value)| value.into_owned())
        .collect()
}

/// `GET /experience?userId=<id>` answers with the bare number as plain text.
pub async fn get_experience(
    _auth: Authorized,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let Some(user_id) = user_ids(&req).into_iter().next() else {
        return Err(AppError::ValidationError("userId parameter is required".to_string()));
    };

    let experience = state.store.experience(&user_id).await.map_err(|e| {
        error!("Experience lookup for {} failed: {}", user_id, e);
        AppError::from(e)
    })?;
    debug!("Experience of {} is {}", user_id, experience);

    Ok(HttpResponse::Ok()
        .content_type("text/plain")
        .body(experience.to_string()))
}

/// `GET /public/experience?userId=a&userId=b` answers with one entry per id.
pub async fn get_experience_batch(
    _auth: Authorized,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ids = user_ids(&req);
    if ids.is_empty() {
        return Ok(HttpResponse::Ok().json(Vec::<ExperienceEntry>::new()));
    }

    let found = state.store.experience_many(ids.clone()).await.map_err(|e| {
        error!("Batch experience lookup failed: {}", e);
        AppError::from(e)
    })?;

    let entries: Vec<ExperienceEntry> = ids
        .into_iter()
        .map(|user_id| {
            let experience = found.get(&user_id).copied().unwrap_or(0);
            ExperienceEntry { user_id, experience }
        })
        .collect();

    Ok(HttpResponse::Ok().json(entries))
}
