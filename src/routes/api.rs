use actix_web::web;

use crate::handlers;

pub fn scoped_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posters")
            .service(
                web::resource("")
                    .route(web::post().to(handlers::posters::create))
                    .route(web::get().to(handlers::posters::search)),
            )
            .service(web::resource("/refine").route(web::post().to(handlers::posters::refine)))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(handlers::posters::get_poster))
                    .route(web::put().to(handlers::posters::update)),
            )
            .service(
                web::resource("/{id}/donations")
                    .route(web::post().to(handlers::donations::submit))
                    .route(web::get().to(handlers::donations::list)),
            ),
    )
    .service(
        web::scope("/uploads")
            .service(web::resource("/reports").route(web::post().to(handlers::uploads::report))),
    );
}
