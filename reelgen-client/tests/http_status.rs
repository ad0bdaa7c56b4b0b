//! Transport tests against a local HTTP listener serving canned responses.

use std::time::Duration;

use reelgen_client::{ClientConfig, ClientError, CredentialCache, HttpStatusCheck, SecretKey};
use reelgen_core::{PollConfig, PollOutcome, StatusCheck, TaskFailure, TaskId, TaskPoller};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve `responses` in order, one per connection, and return the raw
/// request heads that were received.
async fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            requests.push(String::from_utf8_lossy(&head).into_owned());

            let response = format!(
                "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        requests
    });

    (base_url, handle)
}

/// Local listener only; ignore any proxy configured in the environment.
fn http_check(config: &ClientConfig) -> HttpStatusCheck {
    let http = HttpStatusCheck::client_builder(config.http_timeout)
        .no_proxy()
        .build()
        .unwrap();
    HttpStatusCheck::from_config(config).unwrap().with_client(http)
}

/// Accept one connection, read the request and never answer.
async fn serve_silence() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = stream.read(&mut buf).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    (base_url, handle)
}

fn config(base_url: &str) -> ClientConfig {
    ClientConfig::new("ak", SecretKey::new("sk"))
        .with_base_url(base_url)
        .with_status_path("/v1/videos/image2video")
}

#[tokio::test]
async fn test_sends_bearer_to_status_url() {
    let body = json!({"code": 0, "data": {"task_id": "t-1", "task_status": "processing"}});
    let (base_url, server) = serve(vec![(200, body.to_string())]).await;
    let check = http_check(&config(&base_url));

    let response = check.check(&TaskId::new("t-1"), "token-abc").await.unwrap();
    assert_eq!(response.code, 0);

    let requests = server.await.unwrap();
    let head = requests[0].to_ascii_lowercase();
    assert!(head.starts_with("get /v1/videos/image2video/t-1 http/1.1"), "{head}");
    assert!(head.contains("authorization: bearer token-abc"), "{head}");
}

#[tokio::test]
async fn test_rejection_body_on_error_status_is_decoded() {
    let body = json!({"code": 1002, "message": "token expired"});
    let (base_url, _server) = serve(vec![(401, body.to_string())]).await;
    let check = http_check(&config(&base_url));

    let response = check.check(&TaskId::new("t-1"), "stale").await.unwrap();
    assert!(response.is_rejection());
    assert_eq!(response.message.as_deref(), Some("token expired"));
}

#[tokio::test]
async fn test_undecodable_error_status() {
    let (base_url, _server) = serve(vec![(502, "<html>bad gateway</html>".into())]).await;
    let check = http_check(&config(&base_url));

    match check.check(&TaskId::new("t-1"), "token").await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status, 502);
            assert!(body.contains("bad gateway"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let (base_url, _server) = serve(vec![(200, "not json".into())]).await;
    let check = http_check(&config(&base_url));

    let err = check.check(&TaskId::new("t-1"), "token").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn test_stalled_response_times_out() {
    let (base_url, server) = serve_silence().await;
    let config = config(&base_url).with_http_timeout(Duration::from_millis(200));
    let check = http_check(&config);

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        check.check(&TaskId::new("t-1"), "token"),
    )
    .await
    .expect("request should time out on its own");

    match result {
        Err(ClientError::Http(e)) => assert!(e.is_timeout(), "{e:?}"),
        other => panic!("expected timeout, got {other:?}"),
    }
    server.abort();
}

#[tokio::test]
async fn test_task_id_is_a_single_path_segment() {
    let body = json!({"code": 0, "data": {"task_status": "processing"}});
    let (base_url, server) = serve(vec![(200, body.to_string())]).await;
    let check = http_check(&config(&base_url));

    check.check(&TaskId::new("a/b?c#d"), "token").await.unwrap();

    let requests = server.await.unwrap();
    assert!(
        requests[0].starts_with("GET /v1/videos/image2video/a%2Fb%3Fc%23d HTTP/1.1"),
        "{}",
        requests[0]
    );
}

#[tokio::test]
async fn test_poll_over_http_until_success() {
    let processing = json!({"code": 0, "data": {"task_status": "processing"}}).to_string();
    let done = json!({
        "code": 0,
        "data": {
            "task_status": "succeed",
            "task_result": {"videos": [{"id": "v1", "url": "https://cdn.example.com/v1.mp4"}]}
        }
    })
    .to_string();
    let (base_url, server) =
        serve(vec![(200, processing.clone()), (200, processing), (200, done)]).await;

    let config = config(&base_url).with_poll(PollConfig::new(5, Duration::from_millis(10)));
    let mut credentials = CredentialCache::from_config(&config);
    let bearer = credentials.bearer(1_700_000_000).clone();

    let outcome = TaskPoller::new(http_check(&config), config.poll)
        .poll(&TaskId::new("t-9"), bearer.as_str())
        .await
        .unwrap();

    let PollOutcome::Succeeded(result) = outcome else {
        panic!("expected success");
    };
    assert_eq!(result.videos().unwrap()[0].url, "https://cdn.example.com/v1.mp4");

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 3);
    let expected_auth = format!("authorization: bearer {}", bearer.as_str().to_ascii_lowercase());
    for head in &requests {
        assert!(head.to_ascii_lowercase().contains(&expected_auth));
    }
}

#[tokio::test]
async fn test_poll_over_http_rejection() {
    let body = json!({"code": 1303, "message": "parallel task limit reached"}).to_string();
    let (base_url, _server) = serve(vec![(429, body)]).await;

    let config = config(&base_url);
    let outcome = TaskPoller::new(http_check(&config), config.poll)
        .poll(&TaskId::new("t-1"), "token")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PollOutcome::Failed(TaskFailure::Rejected {
            code: 1303,
            message: "parallel task limit reached".into()
        })
    );
}
