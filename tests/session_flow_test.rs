use anyhow::Result;
use httpmock::prelude::*;
use inventory_lookup::config::{ServiceConfig, StockConfig};
use inventory_lookup::core::{SessionStore, SessionToken, UpdateDate};
use inventory_lookup::{Console, FileSessionStore, InventoryClient, QueryErrorKind, StockService};
use serde_json::json;
use tempfile::TempDir;

fn service_for(
    server: &MockServer,
    temp_dir: &TempDir,
) -> Result<StockService<InventoryClient, FileSessionStore>> {
    let client = InventoryClient::new(&ServiceConfig {
        base_url: server.base_url(),
        ..ServiceConfig::default()
    })?;
    let store = FileSessionStore::new(temp_dir.path().join("session.json"));
    Ok(StockService::new(client, store, StockConfig::default()))
}

/// login → persisted token → authenticated query → normalized groups
#[tokio::test]
async fn test_login_then_query_flow() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/login");
        then.status(200).json_body(json!({"token": "flow-token-1"}));
    });
    let stock_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/stock")
            .header("authorization", "Bearer flow-token-1")
            .json_body(json!({"sku": "X", "base": "DEPOSEVN"}));
        then.status(200).json_body(json!({
            "X#RED#M": [
                {"ResourceName": "Store1", "Quantity": 5, "LastUpdateDate": "2024-01-01", "Description": "Shirt"}
            ]
        }));
    });

    let service = service_for(&server, &temp_dir)?;
    service.login("alice", "secret").await?;

    // A fresh store on the same file sees the token, as after a restart.
    let reopened = FileSessionStore::new(temp_dir.path().join("session.json"));
    assert_eq!(reopened.load().await?, Some(SessionToken::new("flow-token-1")));

    let result = service.query("X", "DEPOSEVN").await?;

    stock_mock.assert();
    assert_eq!(result.len(), 1);
    let group = &result.groups[0];
    assert_eq!(group.parsed.color, "RED");
    assert_eq!(group.parsed.size, "M");
    assert_eq!(group.description.as_deref(), Some("Shirt"));
    assert_eq!(group.records.len(), 1);
    assert_eq!(group.records[0].quantity, 5.0);
    assert!(matches!(group.records[0].last_update, UpdateDate::Known(_)));
    Ok(())
}

#[tokio::test]
async fn test_query_without_session_is_unauthorized() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let stock_mock = server.mock(|when, then| {
        when.method(POST).path("/stock");
        then.status(401).json_body(json!({"error": "Token required"}));
    });

    let service = service_for(&server, &temp_dir)?;
    let err = service.query("X", "DEPOSEVN").await.unwrap_err();

    // Still sent: the server decides.
    stock_mock.assert();
    assert_eq!(err.query_kind(), Some(QueryErrorKind::Unauthorized));
    assert!(!service.has_session().await?);
    Ok(())
}

#[tokio::test]
async fn test_rejected_token_is_cleared() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/stock")
            .header("authorization", "Bearer stale");
        then.status(403).json_body(json!({"error": "Invalid token"}));
    });

    let service = service_for(&server, &temp_dir)?;
    service.store().save(&SessionToken::new("stale")).await?;

    let err = service.query("X", "DEPOSEVN").await.unwrap_err();

    assert!(err.requires_reauthentication());
    assert!(service.store().load().await?.is_none());
    assert!(!temp_dir.path().join("session.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_other_failures_keep_session() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/stock");
        then.status(404).json_body(json!({"error": "SKU not found"}));
    });

    let service = service_for(&server, &temp_dir)?;
    service.store().save(&SessionToken::new("good")).await?;

    let err = service.query("missing", "DEPOSEVN").await.unwrap_err();

    assert_eq!(err.query_kind(), Some(QueryErrorKind::NotFound));
    assert!(service.has_session().await?);
    Ok(())
}

#[tokio::test]
async fn test_empty_response_is_no_data() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/stock");
        then.status(200).json_body(json!({}));
    });

    let service = service_for(&server, &temp_dir)?;
    service.store().save(&SessionToken::new("good")).await?;

    let result = service.query("X", "DEPOFORT").await?;
    assert!(result.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_console_session() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/login")
            .json_body(json!({"username": "alice", "password": "secret"}));
        then.status(200).json_body(json!({"token": "console-token"}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/stock")
            .json_body(json!({"sku": "X", "base": "DEPOSEVN"}));
        then.status(200).json_body(json!({
            "X#RED#M": [
                {"ResourceName": "Store1", "Quantity": 5, "LastUpdateDate": "2024-01-01", "Description": "Shirt"}
            ]
        }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/stock")
            .json_body(json!({"sku": "Y", "base": "DEPOSEVN"}));
        then.status(500);
    });

    let service = service_for(&server, &temp_dir)?;
    let mut console = Console::new(&service);
    let script: &[u8] = b"login\nalice\nsecret\nstock X\nstock Y\nquit\n";
    let mut out = Vec::new();

    console.run(script, &mut out).await?;

    let text = String::from_utf8(out)?;
    assert!(text.contains("Logged in as alice"));
    assert!(text.contains("Variant: X#RED#M"));
    assert!(text.contains("Description: Shirt"));
    assert!(text.contains("Could not fetch stock data"));

    // The failed second query leaves nothing from the first on screen.
    assert!(console.screen().result.is_none());
    assert!(console.screen().notice.is_some());
    Ok(())
}
