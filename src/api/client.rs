use reqwest::Client as HttpClient;
use serde_json::Value;
use thiserror::Error;

use crate::api::models::{FaxOutcome, FaxSubmission};

/// Failures that never produced an answer from the endpoint. A rejection
/// with an HTTP status is not an error here; it is a `FaxOutcome`.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("unreadable response (HTTP {status}): {source}")]
    UnreadableBody { status: u16, source: reqwest::Error },
    #[error("could not read {path}: {source}")]
    Attachment { path: String, source: std::io::Error },
}

pub struct ApiClient {
    pub http: HttpClient,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            http: HttpClient::new(),
        }
    }

    /// Submit one fax as a multipart POST. reqwest sets the boundary and
    /// content-type headers; nothing else is added to the request.
    pub async fn send_fax(
        &self,
        endpoint: &str,
        submission: FaxSubmission,
    ) -> Result<FaxOutcome, SendError> {
        let form = submission.into_form();
        let resp = self.http.post(endpoint).multipart(form).send().await?;
        let status = resp.status();
        log::info!("fax endpoint answered HTTP {}", status);

        let body: Value = resp.json().await.map_err(|source| SendError::UnreadableBody {
            status: status.as_u16(),
            source,
        })?;

        if status.is_success() {
            let fax_id = body
                .get("fax_id")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            Ok(FaxOutcome::Sent { fax_id, body })
        } else {
            let detail = body
                .get("detail")
                .or_else(|| body.get("error"))
                .and_then(|v| v.as_str())
                .map(str::to_string);
            Ok(FaxOutcome::Rejected {
                status: status.as_u16(),
                detail,
                body,
            })
        }
    }

    /// Reachability check used by the settings window. Any HTTP answer counts
    /// as reachable; only the status code is reported.
    pub async fn probe(&self, endpoint: &str) -> Result<u16, String> {
        match self.http.get(endpoint).send().await {
            Ok(resp) => Ok(resp.status().as_u16()),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Attachment;
    use mockito::Matcher;

    fn submission(to: &str) -> FaxSubmission {
        FaxSubmission {
            to_number: to.into(),
            from_number: "555-0100".into(),
            cover_letter: "hello".into(),
            attachment: None,
        }
    }

    #[tokio::test]
    async fn success_reports_fax_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/send-fax/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"fax_id":"F123"}"#)
            .create_async()
            .await;

        let client = ApiClient::new();
        let url = format!("{}/send-fax/", server.url());
        let outcome = client.send_fax(&url, submission("123456789")).await.unwrap();
        match outcome {
            FaxOutcome::Sent { fax_id, .. } => assert_eq!(fax_id.as_deref(), Some("F123")),
            other => panic!("expected Sent, got {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn success_without_id_keeps_full_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/send-fax/")
            .with_status(200)
            .with_body(r#"{"status":"queued"}"#)
            .create_async()
            .await;

        let client = ApiClient::new();
        let url = format!("{}/send-fax/", server.url());
        let outcome = client.send_fax(&url, submission("1")).await.unwrap();
        match outcome {
            FaxOutcome::Sent { fax_id, body } => {
                assert!(fax_id.is_none());
                assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("queued"));
            }
            other => panic!("expected Sent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rejection_carries_detail() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/send-fax/")
            .with_status(400)
            .with_body(r#"{"detail":"invalid number"}"#)
            .create_async()
            .await;

        let client = ApiClient::new();
        let url = format!("{}/send-fax/", server.url());
        let outcome = client.send_fax(&url, submission("oops")).await.unwrap();
        match outcome {
            FaxOutcome::Rejected { status, detail, .. } => {
                assert_eq!(status, 400);
                assert_eq!(detail.as_deref(), Some("invalid number"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rejection_without_detail_keeps_full_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/send-fax/")
            .with_status(502)
            .with_body(r#"{"reason":"line busy"}"#)
            .create_async()
            .await;

        let client = ApiClient::new();
        let url = format!("{}/send-fax/", server.url());
        let outcome = client.send_fax(&url, submission("1")).await.unwrap();
        match outcome {
            FaxOutcome::Rejected { status, detail, body } => {
                assert_eq!(status, 502);
                assert!(detail.is_none());
                assert_eq!(body.get("reason").and_then(|v| v.as_str()), Some("line busy"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let client = ApiClient::new();
        let err = client
            .send_fax("http://127.0.0.1:1/send-fax/", submission("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Transport(_)));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn non_json_body_is_unreadable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/send-fax/")
            .with_status(200)
            .with_body("gateway says hi")
            .create_async()
            .await;

        let client = ApiClient::new();
        let url = format!("{}/send-fax/", server.url());
        let err = client.send_fax(&url, submission("1")).await.unwrap_err();
        match err {
            SendError::UnreadableBody { status, .. } => assert_eq!(status, 200),
            other => panic!("expected UnreadableBody, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn wire_body_has_text_fields_and_no_file_part() {
        let mut server = mockito::Server::new_async().await;
        // Created first so the file matcher below is consulted before it.
        let text_mock = server
            .mock("POST", "/send-fax/")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"to_number\"\r\n\r\n123456789".to_string()),
                Matcher::Regex("name=\"from_number\"\r\n\r\n555-0100".to_string()),
                Matcher::Regex("name=\"cover_letter\"\r\n\r\nhello".to_string()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let file_mock = server
            .mock("POST", "/send-fax/")
            .match_body(Matcher::Regex("name=\"file\"".to_string()))
            .with_status(200)
            .with_body("{}")
            .expect(0)
            .create_async()
            .await;

        let client = ApiClient::new();
        let url = format!("{}/send-fax/", server.url());
        let outcome = client.send_fax(&url, submission("123456789")).await;
        assert!(outcome.is_ok());
        file_mock.assert_async().await;
        text_mock.assert_async().await;
    }

    #[tokio::test]
    async fn wire_body_carries_attachment_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/send-fax/")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"file\"; filename=\"notice.pdf\"".to_string()),
                Matcher::Regex("%PDF-1.4 tiny".to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"fax_id":"F9"}"#)
            .create_async()
            .await;

        let mut sub = submission("123456789");
        sub.attachment = Some(Attachment {
            filename: "notice.pdf".into(),
            bytes: b"%PDF-1.4 tiny".to_vec(),
        });

        let client = ApiClient::new();
        let url = format!("{}/send-fax/", server.url());
        let outcome = client.send_fax(&url, sub).await.unwrap();
        assert!(matches!(outcome, FaxOutcome::Sent { .. }));
        mock.assert_async().await;
    }
}
