mod common;

use std::time::Duration;

use memberdesk::services::ServiceError;

use common::{registration, shared_state, test_config};

#[tokio::test]
async fn test_token_is_single_use() {
    let (shared, _) = shared_state(test_config()).await;
    let member = shared
        .membership_service
        .register(registration("60001", None))
        .await
        .unwrap();

    let token = shared.password_reset.issue(member.account_id).await.unwrap();
    shared.password_reset.verify(&token).await.unwrap();

    shared
        .password_reset
        .reset(&token, "brand new secret")
        .await
        .unwrap();

    let again = shared
        .password_reset
        .reset(&token, "another secret")
        .await
        .unwrap_err();
    assert!(matches!(again, ServiceError::NotFound(_)));

    assert!(
        shared
            .store
            .accounts()
            .verify_password("60001", "brand new secret")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_concurrent_resets_consume_token_once() {
    let (shared, _) = shared_state(test_config()).await;
    let member = shared
        .membership_service
        .register(registration("60002", None))
        .await
        .unwrap();

    let token = shared.password_reset.issue(member.account_id).await.unwrap();

    let a = {
        let reset = shared.password_reset.clone();
        let token = token.clone();
        tokio::spawn(async move { reset.reset(&token, "first password").await })
    };
    let b = {
        let reset = shared.password_reset.clone();
        let token = token.clone();
        tokio::spawn(async move { reset.reset(&token, "second password").await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
}

#[tokio::test]
async fn test_expired_token_is_rejected_and_discarded() {
    let mut config = test_config();
    config.password_reset.token_ttl_seconds = 1;
    let (shared, _) = shared_state(config).await;

    let member = shared
        .membership_service
        .register(registration("60003", None))
        .await
        .unwrap();
    let token = shared.password_reset.issue(member.account_id).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1200)).await;

    let err = shared
        .password_reset
        .reset(&token, "too late now")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let gone = shared.password_reset.verify(&token).await.unwrap_err();
    assert!(matches!(gone, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_recently_expired_token_survives_purge() {
    let mut config = test_config();
    config.password_reset.token_ttl_seconds = 1;
    let (shared, _) = shared_state(config).await;

    let member = shared
        .membership_service
        .register(registration("60005", None))
        .await
        .unwrap();
    let token = shared.password_reset.issue(member.account_id).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1200)).await;

    let purged = shared.password_reset.purge_expired().await.unwrap();
    assert_eq!(purged, 0);

    let err = shared.password_reset.verify(&token).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_reissue_replaces_previous_token() {
    let (shared, _) = shared_state(test_config()).await;
    let member = shared
        .membership_service
        .register(registration("60006", None))
        .await
        .unwrap();

    let first = shared.password_reset.issue(member.account_id).await.unwrap();
    let second = shared.password_reset.issue(member.account_id).await.unwrap();
    assert_ne!(first, second);

    let err = shared.password_reset.verify(&first).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    shared.password_reset.verify(&second).await.unwrap();
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let (shared, _) = shared_state(test_config()).await;
    let err = shared.password_reset.verify("deadbeef").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_request_mails_link_only_for_known_accounts() {
    let (shared, mailer) = shared_state(test_config()).await;
    shared
        .membership_service
        .register(registration("60004", Some("reset@example.com")))
        .await
        .unwrap();

    shared.password_reset.request("nobody-here").await.unwrap();
    shared.password_reset.request("60004").await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_address, "reset@example.com");
    assert!(sent[0].body.contains("?token="));
}
