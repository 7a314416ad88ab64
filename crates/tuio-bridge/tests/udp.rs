//! End-to-end tests: real UDP datagrams through the reference decoder.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tuio_bridge::{
    EntityAction, EntityFrame, EntityKind, EntityMessage, JsonCodec,
    PointEventKind, PointFeed, RawEntity, TuioServer,
};

async fn send(to: SocketAddr, messages: Vec<EntityMessage>) {
    let bytes = EntityFrame { messages }.encode(&JsonCodec).unwrap();
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.send_to(&bytes, to).await.unwrap();
}

fn msg(kind: EntityKind, action: EntityAction, id: i32, x: f32, y: f32) -> EntityMessage {
    EntityMessage {
        kind,
        action,
        entity: RawEntity::new(id, x, y),
    }
}

async fn next(feed: &mut PointFeed) -> tuio_bridge::PointEvent {
    tokio::time::timeout(Duration::from_secs(2), feed.recv())
        .await
        .expect("event should arrive")
        .expect("feed should be open")
}

#[tokio::test]
async fn test_udp_frame_reaches_registry_and_feed() {
    let mut server = TuioServer::builder().bind_host("127.0.0.1").build();
    server.open(0).await.unwrap();
    let addr = server.local_addr().expect("bound address");
    let mut feed = server.subscribe();

    send(
        addr,
        vec![
            msg(EntityKind::Cursor, EntityAction::Added, 3, 0.25, 0.10),
            msg(EntityKind::Object, EntityAction::Added, 7, 0.5, 0.5),
        ],
    )
    .await;

    let first = next(&mut feed).await;
    assert_eq!(first.kind(), PointEventKind::Added);
    assert_eq!(first.point().id(), 3);
    let second = next(&mut feed).await;
    assert_eq!(second.point().kind(), EntityKind::Object);

    // The registry was reconciled before the events were queued.
    assert_eq!(server.point_count(), 2);
    let cursor = server
        .registry()
        .get(EntityKind::Cursor, 3)
        .expect("cursor tracked");
    let p = cursor.position();
    assert!((p.x - 0.25).abs() < 1e-6 && (p.y - 0.90).abs() < 1e-6, "got {p}");
}

#[tokio::test]
async fn test_udp_full_lifecycle_then_dispose() {
    let mut server = TuioServer::builder().bind_host("127.0.0.1").build();
    server.open(0).await.unwrap();
    let addr = server.local_addr().unwrap();
    let mut removed = server.on_point_removed();

    send(addr, vec![msg(EntityKind::Blob, EntityAction::Added, 1, 0.1, 0.1)]).await;
    send(addr, vec![msg(EntityKind::Blob, EntityAction::Updated, 1, 0.2, 0.2)]).await;
    send(addr, vec![msg(EntityKind::Blob, EntityAction::Removed, 1, 0.2, 0.2)]).await;

    let event = next(&mut removed).await;
    assert_eq!(event.point().id(), 1);
    assert!(server.points().is_empty());

    server.dispose();
    assert!(server.local_addr().is_none());
    assert!(removed.recv().await.is_none());
}

#[tokio::test]
async fn test_udp_port_in_use_fails_open() {
    let mut first = TuioServer::builder().bind_host("127.0.0.1").build();
    first.open(0).await.unwrap();
    let port = first.local_addr().unwrap().port();

    let mut second = TuioServer::builder().bind_host("127.0.0.1").build();
    let result = second.open(port).await;

    assert!(matches!(result, Err(tuio_bridge::BridgeError::Transport(_))));
    assert!(!second.is_open());
}

#[tokio::test]
async fn test_udp_dispose_releases_port_before_returning() {
    let mut server = TuioServer::builder().bind_host("127.0.0.1").build();
    server.open(0).await.unwrap();
    let port = server.local_addr().unwrap().port();
    // The receive loop is now parked on the socket.
    tokio::task::yield_now().await;

    server.dispose();

    let rebound = std::net::UdpSocket::bind(("127.0.0.1", port));
    assert!(rebound.is_ok(), "port {port} still held: {rebound:?}");
}

#[tokio::test]
async fn test_udp_drop_releases_port() {
    let mut server = TuioServer::builder().bind_host("127.0.0.1").build();
    server.open(0).await.unwrap();
    let port = server.local_addr().unwrap().port();
    tokio::task::yield_now().await;

    drop(server);

    assert!(std::net::UdpSocket::bind(("127.0.0.1", port)).is_ok());
}
