use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{auth, foods, history, logs, planner, weight};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1",
              Router::new()
                  .merge(auth::router())
                  .merge(foods::router())
                  .merge(logs::router())
                  .merge(weight::router())
                  .merge(planner::router())
                  .merge(history::router())
                  .route("/health", get(|| async { "ok" }))
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
        .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn data_routes_need_a_token() {
        let app = build_app(AppState::fake());
        for uri in ["/api/v1/foods", "/api/v1/weight/today", "/api/v1/days/2024-06-15", "/api/v1/history"] {
            let res = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn register_then_log_food_for_today() {
        let app = build_app(AppState::fake());

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/register",
                None,
                r#"{"email":"ana@example.com","password":"correct-horse"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let token = body_json(res).await["access_token"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/foods",
                Some(&token),
                r#"{"name":"Oats","protein_per_100g":13,"carbs_per_100g":60,"fat_per_100g":7,"calories_per_100g":380}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let food_id = body_json(res).await["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/logs",
                Some(&token),
                &format!(r#"{{"food_id":"{food_id}","meal_type":"breakfast","amount_grams":50}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app
            .clone()
            .oneshot(json_request("GET", "/api/v1/days/2024-06-15", Some(&token), ""))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let day = body_json(res).await;
        assert_eq!(day["editable"], true);
        assert_eq!(day["meals"][0]["name"], "Breakfast");
        assert_eq!(day["meals"][0]["items"][0]["calories"], 190.0);
        assert_eq!(day["totals"]["protein"], 6.5);

        let res = app
            .oneshot(json_request(
                "POST",
                "/api/v1/logs",
                Some(&token),
                &format!(r#"{{"food_id":"{food_id}","meal_type":"Lunch","amount_grams":50,"logged_at":"2024-06-14"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
