use std::time::Duration;

use cashbook_api::config::ApiConfig;
use cashbook_core::UserId;
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, but bound to an ephemeral port with a fast stream poll.
        let config = ApiConfig {
            stream_poll: Duration::from_millis(20),
            ..ApiConfig::default()
        };
        let app = cashbook_api::app::build_app(&config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
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

/// A registered caller plus the HTTP client it speaks through.
struct Caller {
    id: UserId,
    client: reqwest::Client,
}

impl Caller {
    async fn register(srv: &TestServer, email: &str) -> Self {
        let caller = Self {
            id: UserId::new(),
            client: reqwest::Client::new(),
        };
        let res = caller
            .post(srv, "/users", json!({ "email": email }))
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        caller
    }

    fn header(&self) -> String {
        self.id.to_string()
    }

    async fn get(&self, srv: &TestServer, path: &str) -> reqwest::Response {
        self.client
            .get(srv.url(path))
            .header("x-user-id", self.header())
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, srv: &TestServer, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(srv.url(path))
            .header("x-user-id", self.header())
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn put(&self, srv: &TestServer, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(srv.url(path))
            .header("x-user-id", self.header())
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn delete(&self, srv: &TestServer, path: &str) -> reqwest::Response {
        self.client
            .delete(srv.url(path))
            .header("x-user-id", self.header())
            .send()
            .await
            .unwrap()
    }
}

/// Owner with one business and one cash book; returns `(owner, business_id, book_path)`.
async fn business_with_book(srv: &TestServer) -> (Caller, String, String) {
    let owner = Caller::register(srv, "owner@example.com").await;

    let res = owner.post(srv, "/businesses", json!({ "name": "Corner Shop" })).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let business: Value = res.json().await.unwrap();
    let business_id = business["id"].as_str().unwrap().to_string();

    let res = owner
        .post(
            srv,
            &format!("/businesses/{business_id}/cashbooks"),
            json!({ "name": "Daily Till" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let book: Value = res.json().await.unwrap();
    let book_path = format!(
        "/businesses/{business_id}/cashbooks/{}",
        book["id"].as_str().unwrap()
    );

    (owner, business_id, book_path)
}

async fn post_scenario(srv: &TestServer, caller: &Caller, book_path: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for (t, amount, date, remark) in [
        ("in", 100, "2024-01-01", "opening"),
        ("out", 40, "2024-01-02", "supplies"),
        ("in", 20, "2024-01-03", "sale"),
    ] {
        let res = caller
            .post(
                srv,
                &format!("{book_path}/entries"),
                json!({ "type": t, "amount": amount, "date": date, "remark": remark }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        ids.push(body["id"].as_str().unwrap().to_string());
    }
    ids
}

async fn add_member(
    srv: &TestServer,
    owner: &Caller,
    business_id: &str,
    email: &str,
    role: &str,
) -> Caller {
    let member = Caller::register(srv, email).await;
    let res = owner
        .post(
            srv,
            &format!("/businesses/{business_id}/members"),
            json!({ "email": email, "role": role }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    member
}

#[tokio::test]
async fn health_is_public_and_everything_else_needs_identity() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/businesses"))
        .header("x-user-id", "not-a-uuid")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_returns_registered_profile() {
    let srv = TestServer::spawn().await;
    let me = Caller::register(&srv, "  Me@Example.COM ").await;

    let res = me.get(&srv, "/whoami").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"].as_str().unwrap(), me.id.to_string());
    assert_eq!(body["email"], "me@example.com");

    // Same email again, different identity.
    let again = reqwest::Client::new()
        .post(srv.url("/users"))
        .header("x-user-id", UserId::new().to_string())
        .json(&json!({ "email": "me@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn ledger_projection_over_http() {
    let srv = TestServer::spawn().await;
    let (owner, _business_id, book) = business_with_book(&srv).await;
    post_scenario(&srv, &owner, &book).await;

    let res = owner.get(&srv, &format!("{book}/ledger")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let view: Value = res.json().await.unwrap();

    assert_eq!(view["summary"]["total_in"], "120");
    assert_eq!(view["summary"]["total_out"], "40");
    assert_eq!(view["summary"]["balance"], "80");

    let rows = view["rows"].as_array().unwrap();
    let dates: Vec<_> = rows.iter().map(|r| r["date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);
    let balances: Vec<_> = rows.iter().map(|r| r["balance"].as_str().unwrap()).collect();
    assert_eq!(balances, vec!["80", "60", "100"]);
    assert_eq!(rows[1]["type"], "out");

    let res = owner.get(&srv, &format!("{book}/ledger?q=%20SUP")).await;
    let filtered: Value = res.json().await.unwrap();
    assert_eq!(filtered["rows"].as_array().unwrap().len(), 1);
    assert_eq!(filtered["rows"][0]["balance"], "60");
    assert_eq!(filtered["summary"], view["summary"]);
}

#[tokio::test]
async fn entry_edit_and_delete_reshape_the_ledger() {
    let srv = TestServer::spawn().await;
    let (owner, _business_id, book) = business_with_book(&srv).await;
    let ids = post_scenario(&srv, &owner, &book).await;

    let res = owner
        .put(
            &srv,
            &format!("{book}/entries/{}", ids[0]),
            json!({ "type": "in", "amount": 150, "date": "2024-01-01", "remark": "" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let view: Value = owner.get(&srv, &format!("{book}/ledger")).await.json().await.unwrap();
    assert_eq!(view["summary"]["balance"], "130");
    assert_eq!(view["rows"][2]["remark"], "Cash");

    let res = owner.delete(&srv, &format!("{book}/entries/{}", ids[1])).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let view: Value = owner.get(&srv, &format!("{book}/ledger")).await.json().await.unwrap();
    assert_eq!(view["summary"]["balance"], "170");
    assert_eq!(view["rows"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn validation_and_permission_errors_map_to_status_codes() {
    let srv = TestServer::spawn().await;
    let (owner, business_id, book) = business_with_book(&srv).await;
    let viewer = add_member(&srv, &owner, &business_id, "viewer@example.com", "viewer").await;
    let operator = add_member(&srv, &owner, &business_id, "op@example.com", "operator").await;
    let outsider = Caller::register(&srv, "outsider@example.com").await;
    let ids = post_scenario(&srv, &operator, &book).await;

    // 400: non-positive amount, blank names, unknown role, garbage ids.
    let res = operator
        .post(
            &srv,
            &format!("{book}/entries"),
            json!({ "type": "in", "amount": 0, "date": "2024-01-01" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = operator
        .post(
            &srv,
            &format!("{book}/entries"),
            json!({
                "type": "in",
                "amount": "50000000000000000000000000000",
                "date": "2024-01-01",
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(operator.get(&srv, &format!("{book}/ledger")).await.status(), StatusCode::OK);

    let res = owner
        .post(&srv, &format!("/businesses/{business_id}/cashbooks"), json!({ "name": "  " }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = owner
        .post(
            &srv,
            &format!("/businesses/{business_id}/members"),
            json!({ "email": "outsider@example.com", "role": "admin" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = owner.get(&srv, "/businesses/nope/cashbooks").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // 403: role gate, membership, self-removal.
    let res = viewer
        .post(
            &srv,
            &format!("{book}/entries"),
            json!({ "type": "in", "amount": 5, "date": "2024-01-01" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = operator.delete(&srv, &format!("{book}/entries/{}", ids[0])).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = operator.delete(&srv, &book).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = outsider.get(&srv, &format!("{book}/ledger")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_member");

    let res = owner
        .delete(&srv, &format!("/businesses/{business_id}/members/{}", owner.id))
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = owner
        .put(
            &srv,
            &format!("/businesses/{business_id}/members/{}", owner.id),
            json!({ "role": "operator" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // 404 / 409: member invitations.
    let res = owner
        .post(
            &srv,
            &format!("/businesses/{business_id}/members"),
            json!({ "email": "ghost@example.com" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = owner
        .post(
            &srv,
            &format!("/businesses/{business_id}/members"),
            json!({ "email": "VIEWER@example.com", "role": "operator" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Viewer can still read.
    let res = viewer.get(&srv, &format!("{book}/ledger")).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn members_and_businesses_are_listed_per_caller() {
    let srv = TestServer::spawn().await;
    let (owner, business_id, _book) = business_with_book(&srv).await;
    let viewer = add_member(&srv, &owner, &business_id, "viewer@example.com", "viewer").await;

    let body: Value = viewer.get(&srv, "/businesses").await.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let res = owner
        .put(
            &srv,
            &format!("/businesses/{business_id}/members/{}", viewer.id),
            json!({ "role": "Operator" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = owner
        .get(&srv, &format!("/businesses/{business_id}/members"))
        .await
        .json()
        .await
        .unwrap();
    let roles: Vec<_> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["owner", "operator"]);

    let res = owner
        .delete(&srv, &format!("/businesses/{business_id}/members/{}", viewer.id))
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let body: Value = viewer.get(&srv, "/businesses").await.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cashbook_search_and_cascade_delete() {
    let srv = TestServer::spawn().await;
    let (owner, business_id, book) = business_with_book(&srv).await;
    post_scenario(&srv, &owner, &book).await;
    owner
        .post(
            &srv,
            &format!("/businesses/{business_id}/cashbooks"),
            json!({ "name": "Petty Cash" }),
        )
        .await;

    let body: Value = owner
        .get(&srv, &format!("/businesses/{business_id}/cashbooks?q=petty"))
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<_> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Petty Cash"]);

    let res = owner.delete(&srv, &book).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["deleted_entries"], 3);

    let res = owner.get(&srv, &format!("{book}/ledger")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exports_render_filtered_rows() {
    let srv = TestServer::spawn().await;
    let (owner, _business_id, book) = business_with_book(&srv).await;
    post_scenario(&srv, &owner, &book).await;

    let res = owner.get(&srv, &format!("{book}/export.csv")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["content-disposition"].to_str().unwrap(),
        "attachment; filename=\"Daily_Till.csv\""
    );
    assert_eq!(
        res.text().await.unwrap(),
        "Date,Remark,Cash In,Cash Out,Balance\n\
         3/1/2024,sale,20,,80\n\
         2/1/2024,supplies,,40,60\n\
         1/1/2024,opening,100,,100\n"
    );

    let res = owner.get(&srv, &format!("{book}/export.txt?q=sale")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let doc = res.text().await.unwrap();
    let mut lines = doc.lines();
    assert_eq!(lines.next(), Some("Daily Till"));
    assert_eq!(
        lines.next(),
        Some("Total In: ₹120.00 | Total Out: ₹40.00 | Net Balance: ₹80.00")
    );
    assert!(doc.contains("3/1/2024 | sale"));
    assert!(!doc.contains("supplies"));
}

/// Read SSE chunks until one contains `needle`.
async fn read_until(res: &mut reqwest::Response, needle: &str) -> String {
    let mut seen = String::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !seen.contains(needle) {
        let chunk = tokio::time::timeout_at(deadline, res.chunk())
            .await
            .expect("timed out waiting for stream data")
            .unwrap()
            .expect("stream ended early");
        seen.push_str(&String::from_utf8_lossy(&chunk));
    }
    seen
}

#[tokio::test]
async fn ledger_stream_pushes_snapshots_and_closes_on_delete() {
    let srv = TestServer::spawn().await;
    let (owner, _business_id, book) = business_with_book(&srv).await;

    let mut stream = owner.get(&srv, &format!("{book}/ledger/stream")).await;
    assert_eq!(stream.status(), StatusCode::OK);

    let first = read_until(&mut stream, "event: ledger").await;
    assert!(first.contains("\"balance\":\"0\""));

    post_scenario(&srv, &owner, &book).await;
    read_until(&mut stream, "\"balance\":\"80\"").await;

    let res = owner.delete(&srv, &book).await;
    assert_eq!(res.status(), StatusCode::OK);
    read_until(&mut stream, "event: closed").await;
}

#[tokio::test]
async fn ledger_stream_requires_membership() {
    let srv = TestServer::spawn().await;
    let (_owner, _business_id, book) = business_with_book(&srv).await;
    let outsider = Caller::register(&srv, "outsider@example.com").await;

    let res = outsider.get(&srv, &format!("{book}/ledger/stream")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
