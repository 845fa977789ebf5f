use crate::startup::AppState;
use crate::surveys::{
    add_answer, add_question, create_survey, delete_question, delete_survey, home, survey_detail,
    update_survey, vote,
};
use axum::{
    Router,
    extract::Extension,
    http::{
        Method, StatusCode,
        header::{ACCEPT, CONTENT_TYPE},
    },
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(app_state: AppState) -> Router {
    let admin = Router::new()
        .route("/surveys", post(create_survey))
        .route("/surveys/:pk", put(update_survey).delete(delete_survey))
        .route("/surveys/:pk/questions", post(add_question))
        .route("/questions/:pk", delete(delete_question))
        .route("/questions/:pk/answers", post(add_answer));

    Router::new()
        .route("/", get(home))
        .route("/:pk", get(survey_detail))
        .route("/:pk/", get(survey_detail))
        .route("/:pk/vote", post(vote))
        .nest("/admin", admin)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(app_state))
                .layer(
                    CorsLayer::new()
                        .allow_origin(AllowOrigin::mirror_request())
                        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                        .allow_headers([CONTENT_TYPE, ACCEPT]),
                ),
        )
        .fallback(handler_404)
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
