//! End-to-end test: real listener, raw HTTP/1.1, graceful shutdown

use dopedb_core::shutdown::ShutdownState;
use dopedb_core::{Config, Database, DbServer, ShutdownCoordinator};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_serve_and_shutdown() {
    let mut config = Config::default();
    config.server.bind_address = "127.0.0.1:0".parse().unwrap();

    let db = Arc::new(Database::new());
    let shutdown = Arc::new(ShutdownCoordinator::new(Duration::from_secs(5)));
    let server = DbServer::new(db.clone(), &config);
    let listener = server.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();

    let task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { server.serve(listener, shutdown).await })
    };

    let body = r#"{"namespace":"users"}"#;
    let response = raw_request(
        addr,
        &format!(
            "POST /api/namespace HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 201"), "unexpected response: {response}");
    assert!(db.namespace_exists("users").unwrap());

    let response = raw_request(
        addr,
        "GET /api/checksum HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 200"), "unexpected response: {response}");
    assert!(response.contains(&"0".repeat(64)));

    shutdown.shutdown().await;
    let result = tokio::time::timeout(Duration::from_secs(10), task).await.unwrap().unwrap();
    assert!(result.is_ok());
    assert_eq!(shutdown.state().await, ShutdownState::Shutdown);
}
