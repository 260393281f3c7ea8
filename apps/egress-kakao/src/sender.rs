//! Kakao "to me" memo sender.
//!
//! One POST per recipient against the memo endpoint, authorized with that
//! recipient's own bearer token; the `template_object` JSON travels as a
//! single form-url-encoded field. A `mock://` api base short-circuits the
//! network call so the worker plumbing can run without credentials.

use async_trait::async_trait;
use pn_core::{MemoSender, SendError, UserId};

pub struct KakaoMemoSender {
    http: reqwest::Client,
    api_base: String,
    memo_path: String,
}

impl KakaoMemoSender {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        memo_path: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            memo_path: memo_path.into(),
        }
    }

    fn memo_url(&self) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), self.memo_path)
    }
}

#[async_trait]
impl MemoSender for KakaoMemoSender {
    async fn send_memo(
        &self,
        access_token: &str,
        template_object: &str,
        user_id: UserId,
    ) -> Result<(), SendError> {
        if self.api_base.starts_with("mock://") {
            tracing::debug!(user_id, "mock memo send");
            return Ok(());
        }

        let response = self
            .http
            .post(self.memo_url())
            .bearer_auth(access_token)
            .form(&[("template_object", template_object)])
            .send()
            .await
            .map_err(|err| SendError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(user_id, "memo sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Form, Router};
    use pn_core::{RecipientTokens, TemplatePayload, dispatch};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    /// Requests seen by the stub memo endpoint.
    #[derive(Clone, Default)]
    struct Captured {
        auths: Arc<Mutex<Vec<String>>>,
        templates: Arc<Mutex<Vec<String>>>,
    }

    async fn memo_endpoint(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Form(form): Form<HashMap<String, String>>,
    ) -> StatusCode {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        captured.auths.lock().unwrap().push(auth.clone());
        captured
            .templates
            .lock()
            .unwrap()
            .push(form.get("template_object").cloned().unwrap_or_default());

        if auth == "Bearer expired-token" {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::OK
        }
    }

    async fn start_stub() -> (SocketAddr, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route("/v2/api/talk/memo/default/send", post(memo_endpoint))
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, captured)
    }

    fn stub_sender(addr: SocketAddr) -> KakaoMemoSender {
        KakaoMemoSender::new(
            reqwest::Client::new(),
            format!("http://{addr}"),
            "/v2/api/talk/memo/default/send",
        )
    }

    fn sample_template() -> TemplatePayload {
        TemplatePayload {
            inviter: "지민".into(),
            title: Some("점심 약속".into()),
            date: "08월 20일(수) 12:30".into(),
            place: "강남역".into(),
            meeting_url: Some("https://promise.example/meetings/42".into()),
        }
    }

    #[test]
    fn memo_url_joins_base_and_path() {
        let sender = KakaoMemoSender::new(
            reqwest::Client::new(),
            "https://kapi.kakao.com/",
            "/v2/api/talk/memo/default/send",
        );
        assert_eq!(
            sender.memo_url(),
            "https://kapi.kakao.com/v2/api/talk/memo/default/send"
        );
    }

    #[tokio::test]
    async fn mock_base_short_circuits() {
        let sender = KakaoMemoSender::new(reqwest::Client::new(), "mock://kakao", "/memo");
        assert!(sender.send_memo("token", "{}", 1).await.is_ok());
    }

    #[tokio::test]
    async fn non_2xx_is_classified_with_status_and_body() {
        let (addr, _captured) = start_stub().await;
        let sender = stub_sender(addr);

        let err = sender
            .send_memo("expired-token", "{}", 7)
            .await
            .expect_err("unauthorized send");
        match err {
            SendError::Status { status, .. } => assert_eq!(status, 401),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let sender = KakaoMemoSender::new(reqwest::Client::new(), "http://127.0.0.1:1", "/memo");
        let err = sender
            .send_memo("token", "{}", 7)
            .await
            .expect_err("unreachable endpoint");
        assert!(matches!(err, SendError::Transport(_)));
    }

    #[tokio::test]
    async fn dispatch_against_stub_counts_partial_success() {
        let (addr, captured) = start_stub().await;
        let sender = stub_sender(addr);

        let mut recipients = RecipientTokens::new();
        recipients.insert(1, "token-1".into());
        recipients.insert(2, "expired-token".into());
        recipients.insert(3, "token-3".into());

        let result = dispatch(&sender, &recipients, &sample_template()).await;

        assert!(result.success);
        assert_eq!(result.sent_count, 2);
        assert_eq!(result.total_count, 3);
        assert!(result.is_partial_success());

        // All three recipients were attempted, each with its own token.
        let auths = captured.auths.lock().unwrap().clone();
        assert_eq!(
            auths,
            vec![
                "Bearer token-1".to_string(),
                "Bearer expired-token".to_string(),
                "Bearer token-3".to_string(),
            ]
        );

        // The form field carried the rendered template as valid JSON.
        let templates = captured.templates.lock().unwrap().clone();
        assert_eq!(templates.len(), 3);
        let template: Value = serde_json::from_str(&templates[0]).unwrap();
        assert_eq!(template["object_type"], "text");
        assert_eq!(
            template["link"]["web_url"],
            "https://promise.example/meetings/42"
        );
        assert!(templates.iter().all(|t| t == &templates[0]));
    }
}
