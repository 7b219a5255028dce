use axum::extract::ws::Message;
use gesture_call_protocol::{HandshakePayload, PeerId, SignalMessage};
use gesture_call_signaling_server::relay::{peer_disconnected, peer_message, Connections};
use tokio::sync::mpsc;

async fn register(connections: &Connections, id: &str) -> (PeerId, mpsc::UnboundedReceiver<Message>) {
    let peer_id = PeerId::new(id.to_owned());
    let (tx, rx) = mpsc::unbounded_channel();
    connections.write().await.insert(peer_id.clone(), tx);
    (peer_id, rx)
}

fn frame(message: &SignalMessage) -> Message {
    Message::Text(serde_json::to_string(message).unwrap())
}

fn decode(message: Message) -> SignalMessage {
    match message {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("unexpected frame: {:?}", other),
    }
}

#[tokio::test]
async fn invite_is_forwarded_with_sender_identity() {
    let connections = Connections::default();
    let (caller, mut caller_rx) = register(&connections, "u1").await;
    let (callee, mut callee_rx) = register(&connections, "u2").await;

    let invite = SignalMessage::Invite {
        to: callee.clone(),
        // A spoofed `from` must not survive forwarding.
        from: PeerId::new("someone-else".to_owned()),
        payload: HandshakePayload::new("offer-1".to_owned()),
    };
    peer_message(&caller, frame(&invite), &connections).await;

    let delivered = decode(callee_rx.try_recv().unwrap());
    assert_eq!(
        delivered,
        SignalMessage::Invite {
            to: callee,
            from: caller,
            payload: HandshakePayload::new("offer-1".to_owned()),
        }
    );
    assert!(caller_rx.try_recv().is_err());
}

#[tokio::test]
async fn invite_to_unknown_target_is_dropped() {
    let connections = Connections::default();
    let (caller, mut caller_rx) = register(&connections, "u1").await;

    let invite = SignalMessage::Invite {
        to: PeerId::new("ghost".to_owned()),
        from: caller.clone(),
        payload: HandshakePayload::new("offer-1".to_owned()),
    };
    peer_message(&caller, frame(&invite), &connections).await;

    // Best-effort: nothing comes back to the sender either.
    assert!(caller_rx.try_recv().is_err());
}

#[tokio::test]
async fn answer_is_forwarded_unmodified() {
    let connections = Connections::default();
    let (caller, mut caller_rx) = register(&connections, "u1").await;
    let (callee, _callee_rx) = register(&connections, "u2").await;

    let answer = SignalMessage::Answer {
        to: caller.clone(),
        payload: HandshakePayload::new("answer-1".to_owned()),
    };
    peer_message(&callee, frame(&answer), &connections).await;

    assert_eq!(decode(caller_rx.try_recv().unwrap()), answer);
}

#[tokio::test]
async fn offer_answer_round_trip_between_two_peers() {
    let connections = Connections::default();
    let (caller, mut caller_rx) = register(&connections, "u1").await;
    let (callee, mut callee_rx) = register(&connections, "u2").await;

    let invite = SignalMessage::Invite {
        to: callee.clone(),
        from: caller.clone(),
        payload: HandshakePayload::new("offer-1".to_owned()),
    };
    peer_message(&caller, frame(&invite), &connections).await;
    let delivered = decode(callee_rx.try_recv().unwrap());
    match &delivered {
        SignalMessage::Invite { from, payload, .. } => {
            assert_eq!(from, &caller);
            assert_eq!(payload.as_str(), "offer-1");
        }
        other => panic!("expected invite, got {:?}", other),
    }

    let answer = SignalMessage::Answer {
        to: caller.clone(),
        payload: HandshakePayload::new("answer-1".to_owned()),
    };
    peer_message(&callee, frame(&answer), &connections).await;
    assert_eq!(decode(caller_rx.try_recv().unwrap()), answer);
}

#[tokio::test]
async fn disconnect_removes_peer_and_broadcasts_call_ended() {
    let connections = Connections::default();
    let (first, mut first_rx) = register(&connections, "u1").await;
    let (_second, mut second_rx) = register(&connections, "u2").await;
    let (third, mut third_rx) = register(&connections, "u3").await;

    peer_disconnected(&first, &connections).await;

    assert!(!connections.read().await.contains_key(&first));
    assert_eq!(decode(second_rx.try_recv().unwrap()), SignalMessage::CallEnded);
    assert_eq!(decode(third_rx.try_recv().unwrap()), SignalMessage::CallEnded);
    assert!(first_rx.try_recv().is_err());

    // Anything addressed to the departed identity is now dropped.
    let late_invite = SignalMessage::Invite {
        to: first.clone(),
        from: third.clone(),
        payload: HandshakePayload::new("offer-2".to_owned()),
    };
    peer_message(&third, frame(&late_invite), &connections).await;
    assert!(first_rx.try_recv().is_err());
}

#[tokio::test]
async fn relay_only_messages_from_clients_are_ignored() {
    let connections = Connections::default();
    let (first, _first_rx) = register(&connections, "u1").await;
    let (_second, mut second_rx) = register(&connections, "u2").await;

    peer_message(&first, frame(&SignalMessage::CallEnded), &connections).await;
    let spoofed_identity = SignalMessage::IdentityAssigned {
        id: PeerId::new("u2".to_owned()),
    };
    peer_message(&first, frame(&spoofed_identity), &connections).await;

    assert!(second_rx.try_recv().is_err());
}

#[tokio::test]
async fn non_text_and_malformed_frames_are_ignored() {
    let connections = Connections::default();
    let (first, _first_rx) = register(&connections, "u1").await;
    let (_second, mut second_rx) = register(&connections, "u2").await;

    peer_message(&first, Message::Binary(vec![1, 2, 3]), &connections).await;
    peer_message(&first, Message::Text("not json".to_owned()), &connections).await;

    assert!(second_rx.try_recv().is_err());
}
