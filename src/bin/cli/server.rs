use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use libris::service::{IngestOutcome, SearchOutcome};
use tracing::{error, info};

use crate::actions::{describe_search, Context};

pub async fn start(ctx: Context, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(ctx);

    let app = Router::new()
        .route("/api/search", get(search_query))
        .route("/api/search/:title", get(search))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Listening on {addr}.");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

fn status_of(outcome: &SearchOutcome) -> StatusCode {
    match outcome {
        SearchOutcome::NoMatch => StatusCode::NOT_FOUND,
        SearchOutcome::Ingested(IngestOutcome::Created(_)) => StatusCode::CREATED,
        SearchOutcome::Ingested(IngestOutcome::AlreadyExists(_)) => StatusCode::CONFLICT,
        SearchOutcome::Ingested(IngestOutcome::InvalidCandidate(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

async fn handle(title: &str, ctx: &Context) -> (StatusCode, String) {
    info!("Received {title}.");
    match ctx.service.search_and_ingest(&ctx.source, title).await {
        Ok(outcome) => {
            info!("Handling of {title} complete.");
            (status_of(&outcome), describe_search(&outcome))
        }
        Err(e) => {
            error!("Handling of {title} failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
        }
    }
}

async fn search(
    Path(title): Path<String>,
    State(ctx): State<Arc<Context>>,
) -> (StatusCode, String) {
    handle(&title, &ctx).await
}

async fn search_query(
    Query(params): Query<HashMap<String, String>>,
    State(ctx): State<Arc<Context>>,
) -> (StatusCode, String) {
    match params.get("title") {
        Some(title) => handle(title, &ctx).await,
        None => {
            error!("Search request without a title.");
            (StatusCode::BAD_REQUEST, "Missing title parameter".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris::types::candidate::Rejection;

    #[test]
    fn outcomes_map_to_status_codes() {
        assert_eq!(status_of(&SearchOutcome::NoMatch), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(&SearchOutcome::Ingested(IngestOutcome::AlreadyExists(
                "Moby Dick".into()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(&SearchOutcome::Ingested(IngestOutcome::InvalidCandidate(
                Rejection::NoAuthors
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
