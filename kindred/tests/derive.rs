//! `#[derive(Event)]` features beyond the shared fixtures.

use kindred::{Kind, prelude::*, testing::Recorder};

/// Base event embedded by a more specific one.
#[derive(Debug, Default, Event)]
#[event(parents(Cancellable), name = "Message")]
struct Message {
    #[extends]
    cancel: Cancellable,
    body: String,
}

/// Reuses `Message` and everything it extends.
#[derive(Debug, Default, Event)]
#[event(parents(Message))]
struct DirectMessage {
    #[extends(Message, Cancellable)]
    base: Message,
    to: &'static str,
}

/// Tuple struct holding its capability in position 0.
#[derive(Debug, Default, Event)]
#[event(parents(Exclusive))]
struct Claimable(#[extends] Exclusive, u8);

#[test]
fn test_name_attribute() {
    assert_eq!(Message::name(), "Message");
    assert_eq!(DirectMessage::name(), "DirectMessage");
}

#[test]
fn test_embedded_event_delegates_projections() {
    let bus = EventBus::new();
    let log = Recorder::new();

    let seen = log.clone();
    let _base = bus.process::<Message>(move |message| {
        message.body.push_str(" (edited)");
        seen.record("message");
    });
    let seen = log.clone();
    let _dm = bus.react::<DirectMessage>(move |dm| seen.record(dm.to));
    let _block = bus.process::<DirectMessage>(|dm| {
        if dm.to == "nobody" {
            dm.cancel();
        }
    });

    let mut dm = DirectMessage {
        base: Message {
            body: "hi".into(),
            ..Default::default()
        },
        to: "carol",
    };
    bus.call(&mut dm).unwrap();
    assert_eq!(dm.base.body, "hi (edited)");
    assert_eq!(log.take(), ["message", "carol"]);

    dm.to = "nobody";
    bus.call(&mut dm).unwrap();
    assert_eq!(log.take(), ["message"]);
    assert!(dm.base.cancel.is_cancelled());

    assert_eq!(
        bus.lineage_names::<DirectMessage>().unwrap(),
        ["Cancellable", "Message", "DirectMessage"]
    );
}

#[test]
fn test_tuple_field_projection() {
    let bus = EventBus::new();
    let log = Recorder::new();
    let seen = log.clone();
    let reactor = bus.react::<Claimable>(move |claimable| seen.record(claimable.1));
    let id = reactor.id();
    let _claim = bus.process::<Claimable>(move |claimable| claimable.claim(id));

    bus.call(&mut Claimable(Exclusive::new(), 9)).unwrap();
    assert_eq!(log.take(), [9]);
}
