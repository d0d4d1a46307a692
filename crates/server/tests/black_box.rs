use std::sync::Arc;
use std::time::Duration;

use donation_core::Snapshot;
use donation_events::Subscription;
use donation_server::{AppServices, Server, ServerConfig};
use futures::StreamExt;
use reqwest::{redirect, StatusCode};
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

struct TestServer {
    base_url: String,
    ws_url: String,
    deposit_addr: String,
    withdraw_addr: String,
    services: AppServices,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(ServerConfig::ephemeral().with_heartbeat(None)).await
    }

    async fn spawn_with(config: ServerConfig) -> Self {
        let server = Server::bind(&config).await;
        let http_addr = server.http_addr().expect("http endpoint bound");
        let base_url = format!("http://{http_addr}");
        let ws_url = format!("ws://{http_addr}/ws");
        let deposit_addr = server.deposit_addr().expect("deposit endpoint bound").to_string();
        let withdraw_addr = server.withdraw_addr().expect("withdrawal endpoint bound").to_string();
        let services = server.services().clone();

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(server.run(shutdown.clone()));

        Self {
            base_url,
            ws_url,
            deposit_addr,
            withdraw_addr,
            services,
            shutdown,
            handle,
        }
    }

    async fn accounts(&self, client: &reqwest::Client) -> serde_json::Value {
        let res = client
            .get(format!("{}/accounts", self.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    async fn register(&self, client: &reqwest::Client, name: &str) -> reqwest::Response {
        client
            .post(format!("{}/register", self.base_url))
            .form(&[("name", name)])
            .send()
            .await
            .unwrap()
    }

    async fn donate(&self, client: &reqwest::Client, from: &str, to: &str, amount: &str) -> reqwest::Response {
        client
            .post(format!("{}/donate", self.base_url))
            .form(&[("from", from), ("to", to), ("amount", amount)])
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.handle.abort();
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

/// Wait until the subscription yields a snapshot matching `pred`.
async fn observe(sub: &mut Subscription, pred: impl Fn(&Snapshot) -> bool) -> Arc<Snapshot> {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let snapshot = sub.next().await.expect("subscription closed");
            if pred(&snapshot) {
                return snapshot;
            }
        }
    })
    .await
    .expect("snapshot not observed in time")
}

/// Poll until `check` holds, for at most two seconds.
async fn eventually(check: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn websocket_observer_receives_committed_balances() {
    let config = ServerConfig::ephemeral().with_heartbeat(Some(Duration::from_millis(50)));
    let server = TestServer::spawn_with(config).await;
    let client = http_client();

    let (mut ws, _) = tokio_tungstenite::connect_async(server.ws_url.as_str()).await.unwrap();
    let registry = server.services.registry().clone();
    eventually(|| registry.len() == 1).await;

    server.register(&client, "alice").await;
    donation_client::deposit(&server.deposit_addr, "alice", "100").await.unwrap();

    let expected = r#"[{"name":"alice","balance":100}]"#;
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) if text.as_str() == expected => break,
                Some(Ok(Message::Text(text))) => {
                    let pushed: serde_json::Value = serde_json::from_str(&text).unwrap();
                    assert!(pushed.is_array(), "unexpected push {text}");
                }
                Some(Ok(_)) => {}
                other => panic!("socket ended early: {other:?}"),
            }
        }
    })
    .await
    .expect("deposit never pushed");

    ws.close(None).await.unwrap();
    drop(ws);

    eventually(|| registry.is_empty()).await;
}

#[tokio::test]
async fn health_and_home_page_are_served() {
    let server = TestServer::spawn().await;
    let client = http_client();

    let res = client.get(format!("{}/health", server.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(format!("{}/", server.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("/ws"));
}

#[tokio::test]
async fn register_then_deposit_is_visible_and_broadcast() {
    let server = TestServer::spawn().await;
    let client = http_client();
    let mut sub = server.services.registry().subscribe();

    let res = server.register(&client, "alice").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/");
    observe(&mut sub, |s| s.balance_of("alice") == Some(0)).await;

    let reply = donation_client::deposit(&server.deposit_addr, "alice", "100").await.unwrap();
    assert_eq!(reply, "alice's new balance: $100");

    let snapshot = observe(&mut sub, |s| s.balance_of("alice") == Some(100)).await;
    assert_eq!(snapshot.to_json(), r#"[{"name":"alice","balance":100}]"#);
    assert_eq!(server.accounts(&client).await, json!([{ "name": "alice", "balance": 100 }]));
}

#[tokio::test]
async fn donation_moves_funds_between_accounts() {
    let server = TestServer::spawn().await;
    let client = http_client();

    server.register(&client, "alice").await;
    server.register(&client, "bob").await;
    donation_client::deposit(&server.deposit_addr, "alice", "50").await.unwrap();

    let res = server.donate(&client, "alice", "bob", "30").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        server.accounts(&client).await,
        json!([
            { "name": "alice", "balance": 20 },
            { "name": "bob", "balance": 30 },
        ])
    );
}

#[tokio::test]
async fn overdrawn_donation_is_rejected_and_changes_nothing() {
    let server = TestServer::spawn().await;
    let client = http_client();

    server.register(&client, "alice").await;
    server.register(&client, "bob").await;
    donation_client::deposit(&server.deposit_addr, "alice", "10").await.unwrap();
    let before = server.accounts(&client).await;

    let res = server.donate(&client, "alice", "bob", "11").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let page = res.text().await.unwrap();
    assert!(page.contains("Insufficient balance"));
    assert!(page.contains("http-equiv=\"refresh\""));

    assert_eq!(server.accounts(&client).await, before);
}

#[tokio::test]
async fn donation_input_errors_map_to_statuses() {
    let server = TestServer::spawn().await;
    let client = http_client();
    server.register(&client, "alice").await;

    let res = server.donate(&client, "alice", "bob", "ten").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.donate(&client, "alice", "bob", "1").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.text().await.unwrap().contains("Recipient not found"));

    let res = server.donate(&client, "alice", "alice", "0").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registering_twice_keeps_the_balance() {
    let server = TestServer::spawn().await;
    let client = http_client();

    server.register(&client, "alice").await;
    donation_client::deposit(&server.deposit_addr, "alice", "5").await.unwrap();

    let res = server.register(&client, "alice").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(server.accounts(&client).await, json!([{ "name": "alice", "balance": 5 }]));

    let res = server.register(&client, "   ").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn withdrawal_for_unknown_account_is_refused() {
    let server = TestServer::spawn().await;

    let reply = donation_client::withdraw(&server.withdraw_addr, "carol", "10", Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(reply, "User not found");
    assert!(!donation_client::is_success(&reply));
}

#[tokio::test]
async fn withdrawal_debits_and_refuses_overdraft() {
    let server = TestServer::spawn().await;
    let client = http_client();

    server.register(&client, "alice").await;
    donation_client::deposit(&server.deposit_addr, "alice", "40").await.unwrap();

    let reply = donation_client::withdraw(&server.withdraw_addr, "alice", "15", Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(reply, "alice's new balance: $25");

    let reply = donation_client::withdraw(&server.withdraw_addr, "alice", "26", Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(reply, "Insufficient balance");
    assert_eq!(server.accounts(&client).await, json!([{ "name": "alice", "balance": 25 }]));
}

#[tokio::test]
async fn malformed_deposit_amount_leaves_ledger_untouched() {
    let server = TestServer::spawn().await;
    let client = http_client();
    server.register(&client, "alice").await;

    let reply = donation_client::deposit(&server.deposit_addr, "alice", "abc").await.unwrap();
    assert_eq!(reply, "Invalid amount. Please enter a valid integer.");
    assert!(!donation_client::is_success(&reply));
    assert_eq!(server.accounts(&client).await, json!([{ "name": "alice", "balance": 0 }]));
}

#[tokio::test]
async fn concurrent_deposits_are_all_applied() {
    let server = TestServer::spawn().await;
    let client = http_client();
    server.register(&client, "alice").await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let addr = server.deposit_addr.clone();
        handles.push(tokio::spawn(async move {
            donation_client::deposit(&addr, "alice", "5").await.unwrap()
        }));
    }
    for h in handles {
        assert!(donation_client::is_success(&h.await.unwrap()));
    }

    assert_eq!(server.accounts(&client).await, json!([{ "name": "alice", "balance": 100 }]));
}

#[tokio::test]
async fn taken_port_disables_only_that_endpoint() {
    let squatter = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let taken = squatter.local_addr().unwrap().to_string();

    let config = ServerConfig::ephemeral().with_heartbeat(None).with_deposit_addr(taken);
    let server = Server::bind(&config).await;

    assert!(server.deposit_addr().is_none());
    assert!(server.http_addr().is_some());
    assert!(server.withdraw_addr().is_some());
    assert_eq!(server.bound_endpoints(), 2);
}

#[tokio::test]
async fn heartbeat_reaches_subscribers_without_mutations() {
    let config = ServerConfig::ephemeral().with_heartbeat(Some(Duration::from_millis(20)));
    let server = TestServer::spawn_with(config).await;
    let mut sub = server.services.registry().subscribe();

    let snapshot = observe(&mut sub, |_| true).await;
    assert!(snapshot.is_empty());
}
