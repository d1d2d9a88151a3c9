#![allow(clippy::unwrap_used)]
// Integration tests for `Client` using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use avx_api::{Account, AccountUser, AccountUserEdit, Client, Error, RetryPolicy};

const CID: &str = "57e098ed708a8";
const API_PATH: &str = "/v1/api";

// ── Helpers ─────────────────────────────────────────────────────────

fn builder(server: &MockServer) -> avx_api::ClientBuilder {
    let base_url = Url::parse(&format!("{}{API_PATH}", server.uri())).unwrap();
    Client::builder("testuser", "testing123!".to_string(), "127.0.0.1")
        .base_url(base_url)
        .http_client(reqwest::Client::new())
        .retry_policy(RetryPolicy {
            relogin_delay: Duration::ZERO,
            ..RetryPolicy::default()
        })
}

fn login_ok(cid: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "return": true,
        "results": "User login:testuser in account:admin has been authorized successfully.",
        "CID": cid
    }))
}

fn ok(results: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "return": true, "results": results }))
}

fn fail(reason: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "return": false, "reason": reason }))
}

async fn mount_login(server: &MockServer, cid: &str) {
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(login_ok(cid))
        .mount(server)
        .await;
}

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    mount_login(&server, CID).await;
    let client = builder(&server).connect().await.unwrap();
    (server, client)
}

fn user_list() -> serde_json::Value {
    json!([
        { "user_name": "user1", "acct_names": "acct1", "user_email": "user1@example.com" },
        { "user_name": "user2", "acct_names": "acct1", "user_email": "user2@example.com" }
    ])
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_cid() {
    let (_server, client) = setup().await;
    assert_eq!(client.session_token().unwrap(), CID);
    assert_eq!(client.controller_ip().to_string(), "127.0.0.1");
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn test_login_form_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(
            "action=login&username=testuser&password=testing123%21",
        ))
        .respond_with(login_ok(CID))
        .expect(1)
        .mount(&server)
        .await;

    builder(&server).connect().await.unwrap();
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(fail("Invalid username or password"))
        .mount(&server)
        .await;

    let result = builder(&server).connect().await;
    match result {
        Err(Error::Authentication { message }) => {
            assert_eq!(message, "Invalid username or password");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let result = builder(&server).connect().await;
    match result {
        Err(Error::Authentication { message }) => {
            assert!(message.contains("503"), "got: {message}");
            assert!(message.contains("Service Unavailable"), "got: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_calls_before_login_fail_fast() {
    let server = MockServer::start().await;
    let client = builder(&server).build().await.unwrap();

    let result = client.list_accounts().await;
    assert!(matches!(result, Err(Error::NotAuthenticated)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_username_is_rejected() {
    let result = Client::builder("", "pw".to_string(), "127.0.0.1").build().await;
    assert!(matches!(result, Err(Error::Config { .. })));
}

// ── Orchestrator ────────────────────────────────────────────────────

#[tokio::test]
async fn test_expired_cid_triggers_one_relogin() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(login_ok("first"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(login_ok("second"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "list_accounts"))
        .and(query_param("CID", "first"))
        .respond_with(fail("CID is invalid or expired."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "list_accounts"))
        .and(query_param("CID", "second"))
        .respond_with(ok(json!({ "account_list": [{ "account_name": "devtest", "cloud_type": 1 }] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = builder(&server).connect().await.unwrap();
    let accounts = client.list_accounts().await.unwrap();

    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].account_name, "devtest");
    assert_eq!(client.session_token().unwrap(), "second");
}

#[tokio::test]
async fn test_create_after_expired_cid_resends_form_with_new_cid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(login_ok("first"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(login_ok("second"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string(
            "CID=first&action=setup_account_profile&account_name=devtest&cloud_type=1",
        ))
        .respond_with(fail("CID is invalid or expired."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string(
            "CID=second&action=setup_account_profile&account_name=devtest&cloud_type=1",
        ))
        .respond_with(ok(json!("An email with instructions has been sent")))
        .expect(1)
        .mount(&server)
        .await;

    let client = builder(&server).connect().await.unwrap();
    let mut account = Account {
        cloud_type: Some(1),
        ..Account::new("devtest")
    };
    client.create_account(&mut account).await.unwrap();

    assert_eq!(account.cid, "second");
    assert_eq!(client.session_token().unwrap(), "second");
}

#[tokio::test]
async fn test_second_expiry_is_returned() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "list_account_users"))
        .respond_with(fail("CID is invalid or expired."))
        .expect(2)
        .mount(&server)
        .await;

    let err = client.list_account_users().await.unwrap_err();
    assert!(err.is_session_expired(), "got: {err:?}");
    assert_eq!(err.to_string(), "CID is invalid or expired.");
}

#[tokio::test]
async fn test_relogin_failure_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(login_ok(CID))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(fail("account locked"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(fail("CID is invalid or expired."))
        .expect(1)
        .mount(&server)
        .await;

    let client = builder(&server).connect().await.unwrap();
    let result = client.list_accounts().await;
    assert!(
        matches!(result, Err(Error::Authentication { ref message }) if message == "account locked"),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_concurrent_expiry_shares_one_relogin() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(login_ok("first"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(login_ok("second"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("CID", "first"))
        .respond_with(fail("CID is invalid or expired."))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("CID", "second"))
        .respond_with(ok(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let client = builder(&server).connect().await.unwrap();
    let (a, b) = tokio::join!(client.list_account_users(), client.list_account_users());
    assert!(a.unwrap().is_empty());
    assert!(b.unwrap().is_empty());
}

#[tokio::test]
async fn test_api_error_reason_is_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=setup_account_profile"))
        .respond_with(fail("duplicate name"))
        .mount(&server)
        .await;

    let mut account = Account::new("devtest");
    let err = client.create_account(&mut account).await.unwrap_err();
    assert!(matches!(err, Error::Api { .. }));
    assert_eq!(err.to_string(), "duplicate name");
}

#[tokio::test]
async fn test_non_200_is_unexpected_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let result = client.list_accounts().await;
    assert!(
        matches!(result, Err(Error::UnexpectedStatus { status: 500 })),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = client.list_accounts().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "<html>maintenance</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_null_reason_on_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "list_accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": true,
            "reason": null,
            "results": { "account_list": [] }
        })))
        .mount(&server)
        .await;

    let accounts = client.list_accounts().await.unwrap();
    assert!(accounts.is_empty());
}

#[tokio::test]
async fn test_null_reason_on_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "list_accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": false,
            "reason": null
        })))
        .mount(&server)
        .await;

    let err = client.list_accounts().await.unwrap_err();
    match err {
        Error::Api { reason } => {
            assert_eq!(reason, "controller reported failure without a reason");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_timeouts_are_retried_then_surfaced() {
    let server = MockServer::start().await;
    mount_login(&server, CID).await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ok(json!({ "account_list": [] })).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let base_url = Url::parse(&format!("{}{API_PATH}", server.uri())).unwrap();
    let client = Client::builder("testuser", "testing123!".to_string(), "127.0.0.1")
        .base_url(base_url)
        .timeout(Duration::from_millis(200))
        .connect()
        .await
        .unwrap();

    let err = client.list_accounts().await.unwrap_err();
    assert!(err.is_transient(), "got: {err:?}");

    let gets = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(gets, 3);
}

// ── Accounts ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_account_form() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string(format!(
            "CID={CID}&action=setup_account_profile&account_name=devtest&cloud_type=1\
             &aws_account_number=123456789012&aws_iam=false\
             &aws_access_key=AKIA&aws_secret_key=s3cr3t"
        )))
        .respond_with(ok(json!("An email with instructions has been sent")))
        .expect(1)
        .mount(&server)
        .await;

    let mut account = Account {
        cloud_type: Some(1),
        aws_account_number: Some("123456789012".into()),
        aws_iam: Some("false".into()),
        aws_access_key: Some("AKIA".into()),
        aws_secret_key: Some("s3cr3t".into()),
        ..Account::new("devtest")
    };
    client.create_account(&mut account).await.unwrap();
    assert_eq!(account.cid, CID);
}

#[tokio::test]
async fn test_get_account() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("CID", CID))
        .and(query_param("action", "list_accounts"))
        .respond_with(ok(json!({
            "account_list": [
                { "account_name": "prod", "cloud_type": 1, "account_number": "111111111111" },
                { "account_name": "devtest", "cloud_type": 1, "account_number": "123456789012" }
            ]
        })))
        .mount(&server)
        .await;

    let account = client.get_account("devtest").await.unwrap();
    assert_eq!(account.aws_account_number.as_deref(), Some("123456789012"));

    let err = client.get_account("staging").await.unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");
}

#[tokio::test]
async fn test_delete_account_is_sent_as_get() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("CID", CID))
        .and(query_param("action", "delete_account_profile"))
        .and(query_param("account_name", "devtest"))
        .respond_with(ok(json!("Account devtest has been deleted.")))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_account("devtest").await.unwrap();
}

// ── Account users ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_account_user() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "list_account_users"))
        .respond_with(ok(user_list()))
        .mount(&server)
        .await;

    let user = client.get_account_user("user2", Some("acct1")).await.unwrap();
    assert_eq!(user.email, "user2@example.com");

    let user = client.get_account_user("user1", None).await.unwrap();
    assert_eq!(user.account_name, "acct1");

    let err = client
        .get_account_user("user3", Some("acct1"))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");

    let err = client
        .get_account_user("user1", Some("acct2"))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");
}

#[tokio::test]
async fn test_get_account_user_from_empty_list() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ok(json!([])))
        .mount(&server)
        .await;

    let err = client.get_account_user("user1", None).await.unwrap_err();
    assert!(
        matches!(err, Error::NotFound { entity: "account user", ref key } if key == "user1"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_create_account_user_form() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string(format!(
            "CID={CID}&action=add_account_user&username=api_user1&account_name=devtest\
             &email=api_user1%40test.com&password=test123%21"
        )))
        .respond_with(ok(json!("User api_user1 has been added")))
        .expect(1)
        .mount(&server)
        .await;

    let mut user = AccountUser::new("api_user1", "devtest", "api_user1@test.com", "test123!");
    client.create_account_user(&mut user).await.unwrap();
}

#[tokio::test]
async fn test_update_account_user_email() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string(format!(
            "CID={CID}&action=edit_account_user&username=api_user1\
             &email=new%40test.com&what=email"
        )))
        .respond_with(ok(json!("updated")))
        .expect(1)
        .mount(&server)
        .await;

    let mut edit = AccountUserEdit::email("api_user1", "new@test.com");
    client.update_account_user(&mut edit).await.unwrap();
}

#[tokio::test]
async fn test_delete_account_user_is_sent_as_get() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("CID", CID))
        .and(query_param("action", "delete_account_user"))
        .and(query_param("username", "api_user1"))
        .respond_with(ok(json!("deleted")))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_account_user("api_user1").await.unwrap();
}

// ── Admin email ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_admin_email() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("CID", CID))
        .and(query_param("action", "add_admin_email_addr"))
        .and(query_param("admin_email", "ops@test.com"))
        .respond_with(ok(json!("admin email address has been successfully added")))
        .expect(1)
        .mount(&server)
        .await;

    client.set_admin_email("ops@test.com").await.unwrap();
}

#[tokio::test]
async fn test_admin_email_uses_backend_endpoint() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/backend1"))
        .and(body_string(
            "action=login_proc&username=admin&password=secret",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "admin_email": "ops@test.com",
            "initial_setup": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = client.admin_email("admin", "secret").await.unwrap();
    assert_eq!(info.admin_email, "ops@test.com");
    assert!(!info.initial_setup);
}
