pub mod auth;
pub mod health;
pub mod todos;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::me),
    )
    .service(
        web::scope("/todos")
            .service(todos::list_todos)
            .service(todos::create_todo)
            // Literal paths must register ahead of the {id} matcher.
            .service(todos::due_soon)
            .service(todos::stats_summary)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::toggle_todo)
            .service(todos::delete_todo),
    );
}

/// Catch-all for unmatched routes.
pub async fn not_found(req: HttpRequest) -> impl Responder {
    HttpResponse::NotFound().json(json!({
        "error": "Route not found",
        "path": req.path(),
    }))
}
