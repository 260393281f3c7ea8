//! Local stand-in for the Kakao memo endpoint. Point `KAKAO_API_BASE` at it
//! to watch what the egress worker would send without real tokens.

use anyhow::Result;
use axum::{Form, Json, Router, routing::post};
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    pn_telemetry::install("mock-kakao");
    let app = Router::new().route("/v2/api/talk/memo/default/send", post(handle));
    let listener = TcpListener::bind("0.0.0.0:9084").await?;
    tracing::info!("mock-kakao listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    tracing::info!(
        "KAKAO MEMO: {}",
        form.get("template_object").map(String::as_str).unwrap_or("<missing>")
    );
    Json(json!({ "result_code": 0 }))
}
