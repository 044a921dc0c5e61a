//! Auth engine integration tests: register, login, tokens, admin, apps

use std::sync::Arc;

use sso_auth::{
    App, Auth, AuthConfig, AuthError, HashParams, MemoryStore, TokenCodec, UserRepository,
};

fn test_config() -> AuthConfig {
    AuthConfig::new()
        .with_token_ttl_secs(900)
        .with_hash_params(HashParams { memory_kib: 1024, iterations: 1, parallelism: 1 })
}

fn memory_engine() -> (Arc<MemoryStore>, Auth) {
    let store = Arc::new(MemoryStore::new());
    let auth = Auth::new(&test_config(), store.clone(), store.clone()).unwrap();
    (store, auth)
}

#[tokio::test]
async fn test_register_then_login() {
    let (store, auth) = memory_engine();
    store.insert_app(App::new(3, "web", "web-secret")).unwrap();

    let user_id = auth.register_new_user("alice@example.com", "StrongP@ss123").await.unwrap();
    let token = auth.login("alice@example.com", "StrongP@ss123", 3).await.unwrap();

    assert!(!token.is_empty());
    let claims = TokenCodec::new().validate(&token, "web-secret").unwrap();
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.app_id, 3);
    assert_eq!(claims.email, "alice@example.com");
}

#[tokio::test]
async fn test_token_ttl_matches_config() {
    let (store, auth) = memory_engine();
    store.insert_app(App::new(1, "web", "s")).unwrap();
    auth.register_new_user("bob@example.com", "SecureP@ss99").await.unwrap();

    let token = auth.login("bob@example.com", "SecureP@ss99", 1).await.unwrap();
    let claims = auth.validate_token(&token, 1).await.unwrap();
    assert_eq!(claims.exp - claims.iat, 900);
}

#[tokio::test]
async fn test_duplicate_registration_keeps_first_hash() {
    let (store, auth) = memory_engine();
    auth.register_new_user("eve@example.com", "P@ssword123").await.unwrap();
    let first_hash = store.user("eve@example.com").await.unwrap().pass_hash;

    let result = auth.register_new_user("eve@example.com", "Different!456").await;
    assert!(matches!(result, Err(AuthError::UserExists)));

    let after = store.user("eve@example.com").await.unwrap().pass_hash;
    assert_eq!(first_hash, after);
    assert_eq!(store.user_count(), 1);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
    let (store, auth) = memory_engine();
    store.insert_app(App::new(1, "web", "s")).unwrap();
    auth.register_new_user("frank@example.com", "Correct!Pass1").await.unwrap();

    let wrong_password = auth.login("frank@example.com", "WrongPassword", 1).await.unwrap_err();
    let unknown_email = auth.login("nobody@example.com", "Correct!Pass1", 1).await.unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_login_with_unknown_app_is_internal() {
    let (_store, auth) = memory_engine();
    auth.register_new_user("grace@example.com", "OldP@ss1234").await.unwrap();

    let err = auth.login("grace@example.com", "OldP@ss1234", 404).await.unwrap_err();
    assert!(matches!(err, AuthError::Storage { op: "Auth.Login", .. }));
    assert!(!err.is_expected());
}

#[tokio::test]
async fn test_admin_flag() {
    let (store, auth) = memory_engine();
    let user_id = auth.register_new_user("root@example.com", "Adm1n!pass").await.unwrap();

    assert!(!auth.is_admin(user_id).await.unwrap());
    store.set_admin(user_id, true).unwrap();
    assert!(auth.is_admin(user_id).await.unwrap());

    assert!(matches!(auth.is_admin(999).await, Err(AuthError::UserNotFound)));
}

#[tokio::test]
async fn test_full_scenario() {
    let (store, auth) = memory_engine();
    store.insert_app(App::new(6, "legacy", "s6")).unwrap();

    let user_id = auth.register_new_user("a@x.com", "secret1").await.unwrap();
    assert_eq!(user_id, 1);

    let (app_id, name) = auth.create_app(user_id, "app7", "s7").await.unwrap();
    assert_eq!((app_id, name.as_str()), (7, "app7"));

    let token = auth.login("a@x.com", "secret1", 7).await.unwrap();
    let claims = TokenCodec::new().validate(&token, "s7").unwrap();
    assert_eq!((claims.sub, claims.app_id), (1, 7));

    let wrong = auth.login("a@x.com", "wrong", 7).await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

    let again = auth.create_app(user_id, "app7", "s7").await;
    assert!(matches!(again, Err(AuthError::AppExists)));
}

#[tokio::test]
async fn test_concurrent_logins_share_one_engine() {
    let (store, auth) = memory_engine();
    store.insert_app(App::new(1, "web", "s")).unwrap();
    let auth = Arc::new(auth);

    for i in 0..4 {
        auth.register_new_user(&format!("user{i}@example.com"), "TestP@ss123").await.unwrap();
    }

    let mut tasks = Vec::new();
    for i in 0..4 {
        let auth = Arc::clone(&auth);
        tasks.push(tokio::spawn(async move {
            auth.login(&format!("user{i}@example.com"), "TestP@ss123", 1).await
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let token = task.await.unwrap().unwrap();
        let claims = TokenCodec::new().validate(&token, "s").unwrap();
        assert_eq!(claims.sub, i as i64 + 1);
    }
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_backed_engine() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(sso_auth::SqliteStore::open(dir.path().join("sso.db")).unwrap());
    let auth = Auth::new(&test_config(), store.clone(), store.clone()).unwrap();

    let user_id = auth.register_new_user("henry@example.com", "Sql!teP4ss").await.unwrap();
    let (app_id, _) = auth.create_app(user_id, "cli", "cli-secret").await.unwrap();

    let token = auth.login("henry@example.com", "Sql!teP4ss", app_id).await.unwrap();
    assert_eq!(auth.validate_token(&token, app_id).await.unwrap().sub, user_id);

    assert!(matches!(
        auth.register_new_user("henry@example.com", "x").await,
        Err(AuthError::UserExists)
    ));
    assert!(matches!(auth.create_app(user_id, "cli", "other").await, Err(AuthError::AppExists)));
}
