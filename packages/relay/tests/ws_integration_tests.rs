//! End-to-end tests over real WebSocket connections: register, ingest,
//! decide, reset - the full capture <-> hub <-> review round trip.

use std::sync::Arc;
use std::time::Duration;

use capture::{ClientMessage, PostRecord, Role, ServerMessage};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use relay::{build_app, HubService, MemoryStore};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const ADVERTISED: &str = "ws://192.168.1.20:3000/ws";

async fn spawn_hub() -> (String, Arc<HubService>) {
    let hub = Arc::new(HubService::new(Arc::new(MemoryStore::new()), ADVERTISED));
    let app = build_app(hub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("ws://{addr}/ws"), hub)
}

async fn connect(url: &str, role: Role) -> WsClient {
    let (mut socket, _) = connect_async(url).await.unwrap();
    send(&mut socket, &ClientMessage::Register { role }).await;
    socket
}

async fn send(socket: &mut WsClient, message: &ClientMessage) {
    let frame = serde_json::to_string(message).unwrap();
    socket.send(Message::Text(frame)).await.unwrap();
}

async fn recv(socket: &mut WsClient) -> ServerMessage {
    let deadline = tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match socket.next().await.expect("socket closed").unwrap() {
                Message::Text(text) => break serde_json::from_str(&text).unwrap(),
                _ => continue,
            }
        }
    });
    deadline.await.expect("timed out waiting for a frame")
}

/// Poll until the hub sees `count` peers in `role`, so a test can order
/// its steps against the server's registration handling.
async fn wait_for_peers(hub: &HubService, role: Role, count: usize) {
    tokio::time::timeout(RECV_TIMEOUT, async {
        while hub.registry().peer_count(role) < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for peer registration");
}

fn post(id: &str) -> PostRecord {
    PostRecord::new(id, format!("post {id}"), Utc::now()).with_author("Alice", "@alice")
}

#[tokio::test]
async fn capture_registration_receives_the_discovery_address() {
    let (url, _hub) = spawn_hub().await;
    let mut agent = connect(&url, Role::Capture).await;

    assert_eq!(
        recv(&mut agent).await,
        ServerMessage::Discovery {
            address: ADVERTISED.to_string()
        }
    );
}

#[tokio::test]
async fn scraped_batches_fan_out_to_review_peers() {
    let (url, hub) = spawn_hub().await;

    let mut reviewer = connect(&url, Role::Review).await;
    wait_for_peers(&hub, Role::Review, 1).await;

    let mut agent = connect(&url, Role::Capture).await;
    recv(&mut agent).await; // discovery

    send(
        &mut agent,
        &ClientMessage::ScrapedBatch {
            posts: vec![post("1"), post("2")],
        },
    )
    .await;

    let ServerMessage::NewPosts { posts } = recv(&mut reviewer).await else {
        panic!("expected a forwarded batch");
    };
    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[tokio::test]
async fn late_review_peer_still_receives_the_backlog() {
    let (url, hub) = spawn_hub().await;

    let mut agent = connect(&url, Role::Capture).await;
    recv(&mut agent).await; // discovery
    send(
        &mut agent,
        &ClientMessage::ScrapedBatch {
            posts: vec![post("1")],
        },
    )
    .await;

    // No reviewer was connected for the live forward; wait for the ingest
    // to land, then join late.
    tokio::time::timeout(RECV_TIMEOUT, async {
        while hub.pending_count().await.unwrap() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let mut reviewer = connect(&url, Role::Review).await;
    let ServerMessage::NewPosts { posts } = recv(&mut reviewer).await else {
        panic!("expected the backlog flush");
    };
    assert_eq!(posts[0].id, "1");
}

#[tokio::test]
async fn delete_decisions_travel_back_to_capture_peers() {
    let (url, hub) = spawn_hub().await;

    let mut agent = connect(&url, Role::Capture).await;
    recv(&mut agent).await; // discovery
    wait_for_peers(&hub, Role::Capture, 1).await;

    let mut reviewer = connect(&url, Role::Review).await;
    wait_for_peers(&hub, Role::Review, 1).await;

    send(
        &mut agent,
        &ClientMessage::ScrapedBatch {
            posts: vec![post("123")],
        },
    )
    .await;
    recv(&mut reviewer).await; // forwarded batch

    send(&mut reviewer, &ClientMessage::DecideDelete { id: "123".into() }).await;

    assert_eq!(
        recv(&mut agent).await,
        ServerMessage::DeleteCommand { id: "123".into() }
    );
}

#[tokio::test]
async fn keep_decisions_stay_inside_the_hub() {
    let (url, hub) = spawn_hub().await;

    let mut agent = connect(&url, Role::Capture).await;
    recv(&mut agent).await; // discovery

    let mut reviewer = connect(&url, Role::Review).await;
    wait_for_peers(&hub, Role::Review, 1).await;

    send(
        &mut agent,
        &ClientMessage::ScrapedBatch {
            posts: vec![post("7")],
        },
    )
    .await;
    recv(&mut reviewer).await; // forwarded batch

    send(&mut reviewer, &ClientMessage::DecideKeep { id: "7".into() }).await;
    send(&mut reviewer, &ClientMessage::Reset).await;

    // The reviewer hears the reset; the capture agent hears nothing at all.
    assert_eq!(recv(&mut reviewer).await, ServerMessage::ResetUi);
    let nothing = tokio::time::timeout(Duration::from_millis(300), recv(&mut agent)).await;
    assert!(nothing.is_err(), "capture peer should stay silent on keep");
}

#[tokio::test]
async fn reset_purges_pending_and_clears_review_uis() {
    let (url, hub) = spawn_hub().await;

    let mut reviewer = connect(&url, Role::Review).await;
    wait_for_peers(&hub, Role::Review, 1).await;

    let mut agent = connect(&url, Role::Capture).await;
    recv(&mut agent).await; // discovery
    send(
        &mut agent,
        &ClientMessage::ScrapedBatch {
            posts: vec![post("a"), post("b")],
        },
    )
    .await;
    recv(&mut reviewer).await; // forwarded batch

    send(&mut reviewer, &ClientMessage::DecideKeep { id: "b".into() }).await;
    send(&mut reviewer, &ClientMessage::Reset).await;
    assert_eq!(recv(&mut reviewer).await, ServerMessage::ResetUi);

    // Pending purged, the kept decision untouched: a fresh reviewer gets
    // no backlog at all.
    assert_eq!(hub.pending_count().await.unwrap(), 0);
    let mut late_reviewer = connect(&url, Role::Review).await;
    let nothing = tokio::time::timeout(Duration::from_millis(300), recv(&mut late_reviewer)).await;
    assert!(nothing.is_err(), "no backlog expected after reset");
}
