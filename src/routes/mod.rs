pub mod health;
pub mod todos;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(users::create_user)
        .service(users::login)
        .service(users::me)
        .service(users::logout)
        .service(
            web::scope("/todos")
                .service(todos::get_todos)
                .service(todos::create_todo)
                .service(todos::get_todo)
                .service(todos::update_todo)
                .service(todos::delete_todo),
        );
}
