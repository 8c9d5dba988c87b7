//! Integration tests for OAuth2 token acquisition and caching

mod common;

use chrono::{Duration, Utc};
use common::{mock_epic_token, test_context, EPIC_PATH};
use fhirsync::adapters::fhir::{CachedToken, MAX_EXPIRES_IN_SECONDS};
use fhirsync::domain::{EmrError, ProviderKey};

#[tokio::test]
async fn test_unknown_provider_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let token_mock = mock_epic_token(&mut server, "unused", 3600, 0).await;
    let (context, _) = test_context(&server);

    let err = context.client().tokens().get_token("allscripts").await.unwrap_err();

    assert_eq!(err, EmrError::ProviderNotFound("allscripts".to_string()));
    token_mock.assert_async().await;
}

#[tokio::test]
async fn test_disabled_provider_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let token_mock = mock_epic_token(&mut server, "unused", 3600, 0).await;
    let (context, _) = test_context(&server);

    let err = context.client().tokens().get_token("cerner").await.unwrap_err();

    assert!(matches!(err, EmrError::ProviderDisabled(_)));
    token_mock.assert_async().await;
}

#[tokio::test]
async fn test_token_is_reused_until_expiry() {
    let mut server = mockito::Server::new_async().await;
    let token_mock = mock_epic_token(&mut server, "epic-token-1", 3600, 1).await;
    let (context, _) = test_context(&server);
    let tokens = context.client().tokens();

    let first = tokens.get_token("epic").await.unwrap();
    let second = tokens.get_token("EPIC").await.unwrap();

    assert_eq!(first, "epic-token-1");
    assert_eq!(second, "epic-token-1");
    token_mock.assert_async().await;

    let cached = context
        .registry()
        .tokens()
        .get_valid(&ProviderKey::new("epic").unwrap(), Utc::now())
        .unwrap();
    assert!(cached.expires_at > Utc::now() + Duration::minutes(59));
}

#[tokio::test]
async fn test_zero_lifetime_forces_new_exchange() {
    let mut server = mockito::Server::new_async().await;
    let token_mock = mock_epic_token(&mut server, "short-lived", 0, 2).await;
    let (context, _) = test_context(&server);

    context.client().tokens().get_token("epic").await.unwrap();
    context.client().tokens().get_token("epic").await.unwrap();

    token_mock.assert_async().await;
}

#[tokio::test]
async fn test_expires_in_as_string_and_missing() {
    let mut server = mockito::Server::new_async().await;
    let path = format!("{EPIC_PATH}/oauth2/token");
    let token_mock = server
        .mock("POST", path.as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "string-expiry", "expires_in": "1800"}"#)
        .expect(1)
        .create_async()
        .await;
    let (context, _) = test_context(&server);

    let token = context.client().tokens().get_token("epic").await.unwrap();
    assert_eq!(token, "string-expiry");
    token_mock.assert_async().await;

    let cached = context
        .registry()
        .tokens()
        .get_valid(&ProviderKey::new("epic").unwrap(), Utc::now())
        .unwrap();
    assert!(cached.expires_at <= Utc::now() + Duration::seconds(1800));
    assert!(cached.expires_at > Utc::now() + Duration::seconds(1700));
}

#[tokio::test]
async fn test_missing_expires_in_defaults_to_one_hour() {
    let mut server = mockito::Server::new_async().await;
    let path = format!("{EPIC_PATH}/oauth2/token");
    let _token_mock = server
        .mock("POST", path.as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "no-expiry"}"#)
        .create_async()
        .await;
    let (context, _) = test_context(&server);

    context.client().tokens().get_token("epic").await.unwrap();

    let cached = context
        .registry()
        .tokens()
        .get_valid(&ProviderKey::new("epic").unwrap(), Utc::now())
        .unwrap();
    assert!(cached.expires_at > Utc::now() + Duration::minutes(59));
}

#[tokio::test]
async fn test_oversized_expires_in_is_clamped() {
    let mut server = mockito::Server::new_async().await;
    let path = format!("{EPIC_PATH}/oauth2/token");
    let token_mock = server
        .mock("POST", path.as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "long-lived", "expires_in": 9223372036854775807}"#)
        .expect(1)
        .create_async()
        .await;
    let (context, _) = test_context(&server);

    let token = context.client().tokens().get_token("epic").await.unwrap();
    assert_eq!(token, "long-lived");
    token_mock.assert_async().await;

    let cached = context
        .registry()
        .tokens()
        .get_valid(&ProviderKey::new("epic").unwrap(), Utc::now())
        .unwrap();
    assert!(cached.expires_at <= Utc::now() + Duration::seconds(MAX_EXPIRES_IN_SECONDS));
}

#[tokio::test]
async fn test_negative_expires_in_is_not_cached() {
    let mut server = mockito::Server::new_async().await;
    let token_mock = mock_epic_token(&mut server, "already-expired", -60, 2).await;
    let (context, _) = test_context(&server);

    context.client().tokens().get_token("epic").await.unwrap();
    context.client().tokens().get_token("epic").await.unwrap();

    token_mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_credentials_are_auth_failure() {
    let mut server = mockito::Server::new_async().await;
    let path = format!("{EPIC_PATH}/oauth2/token");
    let token_mock = server
        .mock("POST", path.as_str())
        .with_status(401)
        .with_body(r#"{"error": "invalid_client"}"#)
        .expect(1)
        .create_async()
        .await;
    let (context, _) = test_context(&server);

    let err = context.client().tokens().get_token("epic").await.unwrap_err();

    match err {
        EmrError::AuthFailure(message) => assert!(message.contains("invalid_client")),
        other => panic!("expected AuthFailure, got {other:?}"),
    }
    assert!(context.registry().tokens().is_empty());
    token_mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_token_response_is_auth_failure() {
    let mut server = mockito::Server::new_async().await;
    let path = format!("{EPIC_PATH}/oauth2/token");
    let _token_mock = server
        .mock("POST", path.as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token_type": "Bearer"}"#)
        .create_async()
        .await;
    let (context, _) = test_context(&server);

    let err = context.client().tokens().get_token("epic").await.unwrap_err();

    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_disabling_provider_clears_token() {
    let mut server = mockito::Server::new_async().await;
    let _token_mock = mock_epic_token(&mut server, "epic-token", 3600, 1).await;
    let (context, _) = test_context(&server);
    let epic = ProviderKey::new("epic").unwrap();

    context.client().tokens().get_token("epic").await.unwrap();
    assert!(context.registry().tokens().contains(&epic));

    context.registry().set_enabled("epic", false).unwrap();

    assert!(!context.registry().tokens().contains(&epic));
    assert!(matches!(
        context.client().tokens().get_token("epic").await,
        Err(EmrError::ProviderDisabled(_))
    ));
}

#[tokio::test]
async fn test_invalidate_forgets_only_that_provider() {
    let server = mockito::Server::new_async().await;
    let (context, _) = test_context(&server);
    let store = context.registry().tokens();

    for key in ["epic", "cerner"] {
        store.put(CachedToken {
            provider_key: ProviderKey::new(key).unwrap(),
            token: format!("{key}-token"),
            expires_at: Utc::now() + Duration::hours(1),
        });
    }

    context.client().tokens().invalidate("epic");

    assert!(!store.contains(&ProviderKey::new("epic").unwrap()));
    assert!(store.contains(&ProviderKey::new("cerner").unwrap()));
}
