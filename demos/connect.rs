//! Builds a few events, erases them behind the common root and delivers
//! them by hand to typed listeners and a recorder.
//!
//! Run with: cargo run --example connect --features testing

use nurio_events::testing::Recorder;
use nurio_events::{AnyEvent, Constructor, Envelope, Event, Getters, Listener, Result, Typed};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Event, Constructor, Getters)]
struct ConnectEvent {
    who_is_connecting: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Event)]
enum RoomEvent {
    Joined { room: String, who: String },
    Closed(String),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let inbox = vec![
        Envelope::with_source(ConnectEvent::new("alice".to_string()), "gateway").erase(),
        Envelope::with_source(
            RoomEvent::Joined {
                room: "lobby".to_string(),
                who: "alice".to_string(),
            },
            "rooms",
        )
        .erase(),
        Envelope::with_source(RoomEvent::Closed("lobby".to_string()), "rooms").erase(),
    ];

    let mut greeter = Typed::<ConnectEvent, _>::new(|event: &ConnectEvent| -> Result<()> {
        println!("welcome, {}!", event.who_is_connecting());
        Ok(())
    });
    let mut rooms = Typed::<RoomEvent, _>::new(|event: &RoomEvent| -> Result<()> {
        match event {
            RoomEvent::Joined { room, who } => println!("{who} joined {room}"),
            RoomEvent::Closed(room) => println!("{room} closed"),
        }
        Ok(())
    });
    let mut recorder = Recorder::new();

    for envelope in &inbox {
        let event: &dyn AnyEvent = &**envelope.event();
        println!(
            "[{}] {} from {}",
            envelope.id(),
            event.render(),
            envelope.meta().source().unwrap_or("unknown")
        );
        if greeter.accepts(event) {
            greeter.on_event(event)?;
        }
        if rooms.accepts(event) {
            rooms.on_event(event)?;
        }
        recorder.on_event(event)?;
    }

    println!("recorded: {:?}", recorder.names());
    assert!(recorder.contains(&ConnectEvent::new("alice".to_string())));
    Ok(())
}
