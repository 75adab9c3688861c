//! HTTP dispatch table of the stats backend
//!
//! Unknown paths fall through to actix's 404; a known path hit with the wrong
//! method gets the resource default of 405.

pub mod experience;
pub mod upload;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(crate::health_check)))
        .service(web::resource("/upload/times").route(web::post().to(upload::upload_times)))
        .service(web::resource("/upload/rounds").route(web::post().to(upload::upload_rounds)))
        .service(web::resource("/upload/kills").route(web::post().to(upload::upload_kills)))
        .service(web::resource("/upload/adrenaline").route(web::post().to(upload::upload_adrenaline)))
        .service(web::resource("/upload/escapes").route(web::post().to(upload::upload_escapes)))
        .service(web::resource("/upload/snake").route(web::post().to(upload::upload_snake)))
        .service(web::resource("/upload/username").route(web::post().to(upload::upload_username)))
        .service(web::resource("/upload/playerpoints").route(web::post().to(upload::upload_player_points)))
        .service(web::resource("/upload/fakerankallowed").route(web::post().to(upload::upload_fakerank_allowed)))
        .service(web::resource("/upload/fakerankadmin").route(web::post().to(upload::upload_fakerank_admin)))
        .service(web::resource("/experience").route(web::get().to(experience::get_experience)))
        .service(web::resource("/public/experience").route(web::get().to(experience::get_experience_batch)));
}
