use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use receiptdesk_api::app::{AppServices, build_router};
use receiptdesk_api::config::AppConfig;
use receiptdesk_auth::{AdminAccount, JwtClaims, OtpCode, Role};
use receiptdesk_core::{AdminId, RequestId};
use receiptdesk_infra::ledger::InMemoryLedger;
use receiptdesk_infra::mailer::{MailError, OtpMailer};
use receiptdesk_infra::store::{AdminStore, RequestStore};
use receiptdesk_intake::{LedgerEntry, RequestStatus};

const JWT_SECRET: &str = "test-secret";

/// Keeps the last code per email so tests can complete the OTP flow.
#[derive(Default)]
struct CapturingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingMailer {
    fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl OtpMailer for CapturingMailer {
    async fn send_otp(&self, email: &str, code: &OtpCode) -> Result<(), MailError> {
        self.sent.lock().unwrap().push((email.to_string(), code.to_string()));
        Ok(())
    }
}

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    mailer: Arc<CapturingMailer>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(AppConfig {
            jwt_secret: Some(JWT_SECRET.to_string()),
            ..AppConfig::default()
        })
        .await
    }

    async fn spawn_with(config: AppConfig) -> Self {
        let ledger = InMemoryLedger::new(vec![
            entry("MBL1", "INV1", "UTR1"),
            entry("MBL2", "INV2", "UTR2"),
        ]);
        let mailer = Arc::new(CapturingMailer::default());
        let mut services = AppServices::in_memory(Arc::new(ledger), &config);
        services.mailer = mailer.clone();
        let services = Arc::new(services);

        // Same router as prod, bound to an ephemeral port.
        let app = build_router(services.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            mailer,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn entry(bl: &str, inv: &str, utr: &str) -> LedgerEntry {
    LedgerEntry {
        bl_no: Some(bl.into()),
        invoice_no: Some(inv.into()),
        bank_transaction_no: Some(utr.into()),
        ..LedgerEntry::default()
    }
}

fn mint_jwt(role: Role) -> String {
    let claims = JwtClaims::new(AdminId::new(), "admin@example.test", role, Utc::now(), ChronoDuration::minutes(10));

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn submission(utr: &str, case_type: &str, mbl: Option<&str>, invoice: Option<&str>) -> serde_json::Value {
    let mut body = json!({
        "partyName": "acme traders",
        "email": "ops@acme.test",
        "utrNo": utr,
        "invoiceAmount": "1500.50",
        "caseType": case_type,
    });
    if let Some(mbl) = mbl {
        body["mblNo"] = json!(mbl);
    }
    if let Some(invoice) = invoice {
        body["invoiceNo"] = json!(invoice);
    }
    body
}

async fn submit(client: &reqwest::Client, srv: &TestServer, body: &serde_json::Value) -> reqwest::Response {
    client.post(srv.url("/api/requests")).json(body).send().await.unwrap()
}

#[tokio::test]
async fn liveness_endpoints_answer_without_auth() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("running"));
}

#[tokio::test]
async fn fully_reconciled_submission_is_processed() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = submit(&client, &srv, &submission("UTR1", "Export", Some("MBL1/MBL2"), Some("INV1"))).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "Processed");
    assert_eq!(body["partyName"], "ACME TRADERS");
    assert_eq!(body["invoiceAmount"], 1500.5);
    assert_eq!(body["mblNo"], "MBL1/MBL2");
}

#[tokio::test]
async fn unmatched_utr_is_admitted_in_progress() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = submit(&client, &srv, &submission("UTR1/UTR9", "Import", None, None)).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "In Progress");
    assert!(body.get("mblNo").is_none());
}

#[tokio::test]
async fn unknown_mbl_is_rejected_with_the_missing_list() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = submit(&client, &srv, &submission("UTR1", "Export", Some("MBL1/MBLX/MBLY"), None)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "reference_not_found");
    assert_eq!(
        body["message"],
        "Wrong number: The following MBL Numbers were not found in our records: MBLX, MBLY"
    );

    // Nothing was stored.
    assert!(srv.services.requests.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_invoice_is_rejected_after_mbl_passes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = submit(&client, &srv, &submission("UTR1", "Import", Some("MBL1"), Some("INV1/INV7"))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Wrong number: The following Invoice Numbers were not found in our records: INV7"
    );
}

#[tokio::test]
async fn schema_errors_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut missing_utr = submission("UTR1", "Import", None, None);
    missing_utr["utrNo"] = json!("   ");
    let res = submit(&client, &srv, &missing_utr).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_required_field");

    let res = submit(&client, &srv, &submission("UTR1", "Export", None, None)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "mblNo is required");

    let res = submit(&client, &srv, &submission("UTR1", "Transit", None, None)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_enum_value");

    let mut extra = submission("UTR1", "Import", None, None);
    extra["status"] = json!("Processed");
    let res = submit(&client, &srv, &extra).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn admin_routes_require_a_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/api/requests")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/api/requests"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/api/requests/summary"))
        .bearer_auth(mint_jwt(Role::new("viewer")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_lists_newest_first_and_reads_summary() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(Role::admin());

    submit(&client, &srv, &submission("UTR1", "Import", None, None)).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    submit(&client, &srv, &submission("UTR404", "Others", None, None)).await;

    // Bare token, as the dashboard sends it.
    let res = client
        .get(srv.url("/api/requests"))
        .header("Authorization", token.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let items: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["utrNo"], "UTR404");
    assert_eq!(items[1]["utrNo"], "UTR1");

    let res = client
        .get(srv.url("/api/requests/summary"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let summary: serde_json::Value = res.json().await.unwrap();
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["processed"], 1);
    assert_eq!(summary["inProgress"], 1);
}

#[tokio::test]
async fn status_override_reaches_every_known_value() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(Role::admin());

    let res = submit(&client, &srv, &submission("UTR9", "Import", None, None)).await;
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let patch = |path: String, body: serde_json::Value| {
        client.patch(srv.url(&path)).bearer_auth(&token).json(&body).send()
    };

    let res = patch(format!("/api/requests/{id}/status"), json!({ "status": "Done" })).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_enum_value");

    // Overrides skip admission, so every value is reachable from any other.
    for status in RequestStatus::ALL {
        let res = patch(format!("/api/requests/{id}/status"), json!({ "status": status.as_str() }))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{status}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["status"], status.as_str());

        let stored = srv.services.requests.get(id.parse().unwrap()).await.unwrap().unwrap();
        assert_eq!(stored.status, status);
    }

    let unknown = RequestId::new();
    let res = patch(format!("/api/requests/{unknown}/status"), json!({ "status": "Pending" })).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = patch("/api/requests/not-an-id/status".to_string(), json!({ "status": "Pending" })).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_login_issues_a_usable_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let account = AdminAccount::register("root@example.test", "correct horse", Utc::now()).unwrap();
    srv.services.admins.insert(account).await.unwrap();

    let res = client
        .post(srv.url("/api/auth/admin/login"))
        .json(&json!({ "email": "nobody@example.test", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(srv.url("/api/auth/admin/login"))
        .json(&json!({ "email": "root@example.test", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid credentials");

    let res = client
        .post(srv.url("/api/auth/admin/login"))
        .json(&json!({ "email": "root@example.test", "password": "correct horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], "root@example.test");
    assert_eq!(body["user"]["role"], "admin");

    let token = body["token"].as_str().unwrap();
    let res = client
        .get(srv.url("/api/requests"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn registration_is_closed_by_default() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/api/auth/admin/register"))
        .json(&json!({ "email": "root@example.test", "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registration_when_enabled_rejects_duplicates() {
    let srv = TestServer::spawn_with(AppConfig {
        jwt_secret: Some(JWT_SECRET.to_string()),
        admin_registration: true,
        ..AppConfig::default()
    })
    .await;
    let client = reqwest::Client::new();

    let register = || {
        client
            .post(srv.url("/api/auth/admin/register"))
            .json(&json!({ "email": "Root@Example.test", "password": "pw" }))
            .send()
    };

    let res = register().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["email"], "root@example.test");
    assert!(body.get("password_hash").is_none());

    let res = register().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn otp_round_trip_is_single_use() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/api/auth/otp/send"))
        .json(&json!({ "email": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/api/auth/otp/send"))
        .json(&json!({ "email": "ops@acme.test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "OTP sent successfully");

    let code = srv.mailer.last_code_for("ops@acme.test").unwrap();
    assert_eq!(code.len(), 6);

    let verify = |otp: String| {
        client
            .post(srv.url("/api/auth/otp/verify"))
            .json(&json!({ "email": "ops@acme.test", "otp": otp }))
            .send()
    };

    let wrong = if code == "999999" { "100000" } else { "999999" };
    let res = verify(wrong.to_string()).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid or expired OTP");

    let res = verify(code.clone()).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["verified"], true);
    assert_eq!(body["message"], "Verification successful");

    let res = verify(code).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
