pub mod employees;
pub mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::middleware::auth::attach_identity;
use crate::state::SharedState;

pub fn api_routes(state: SharedState) -> Router<SharedState> {
    Router::new()
        .nest("/api/v1/user", user_routes())
        .nest("/api/v1/emp", employee_routes(state))
}

fn user_routes() -> Router<SharedState> {
    Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
}

fn employee_routes(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route(
            "/employees",
            get(employees::list)
                .post(employees::create)
                .delete(employees::delete),
        )
        .route("/employees/search", get(employees::search))
        .route(
            "/employees/{eid}",
            get(employees::get).put(employees::update),
        )
        .layer(axum::middleware::from_fn_with_state(state, attach_identity))
}
