// The brew-by-weight safety rule, wired the way the frame pump runs it:
// apply the frame, check the rule, dispatch the follow-up — one turn.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use brewlink_api::{Frame, OutboundCommand};
use brewlink_core::store::rules;
use brewlink_core::{Command, CommandSink, DispatchOptions, Dispatcher, Store};

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<serde_json::Value>>,
}

impl CommandSink for RecordingSink {
    fn is_connected(&self) -> bool {
        true
    }

    fn send(&self, command: &OutboundCommand) -> Result<(), brewlink_api::Error> {
        let wire = serde_json::from_str(&command.encode()).unwrap();
        self.sent.lock().unwrap().push(wire);
        Ok(())
    }
}

fn pump_turn(store: &Store, dispatcher: &Dispatcher, text: &str) {
    let frame = Frame::decode(text).unwrap();
    store.apply_frame(&frame);
    if let Some(disabled) = rules::bbw_requires_scale(store) {
        dispatcher.dispatch(Command::SetBrewByWeight(disabled), DispatchOptions::default());
    }
}

#[test]
fn scale_disconnect_disables_bbw_and_notifies_the_appliance() {
    let store = Arc::new(Store::new());
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::clone(&sink) as Arc<dyn CommandSink>);

    pump_turn(
        &store,
        &dispatcher,
        r#"{"type":"scale_status","connected":true,"name":"Lunar"}"#,
    );
    pump_turn(
        &store,
        &dispatcher,
        r#"{"type":"bbw_settings","enabled":true,"doseWeight":18.0,
            "targetWeight":36.0,"stopOffset":2.0,"autoTare":true}"#,
    );
    assert!(store.brew_by_weight().enabled);
    assert!(sink.sent.lock().unwrap().is_empty());

    // Scale drops out mid-session.
    pump_turn(
        &store,
        &dispatcher,
        r#"{"type":"scale_status","connected":false}"#,
    );

    // Same turn: the slice is disabled and the appliance is told.
    assert!(!store.brew_by_weight().enabled);
    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["cmd"], "set_bbw");
    assert_eq!(sent[0]["enabled"], false);
    // The rest of the config is preserved, not reset.
    assert_eq!(sent[0]["targetWeight"], 36.0);
}

#[test]
fn reconnecting_the_scale_does_not_re_enable_bbw() {
    let store = Arc::new(Store::new());
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::clone(&sink) as Arc<dyn CommandSink>);

    pump_turn(
        &store,
        &dispatcher,
        r#"{"type":"scale_status","connected":true}"#,
    );
    pump_turn(&store, &dispatcher, r#"{"type":"bbw_settings","enabled":true}"#);
    pump_turn(
        &store,
        &dispatcher,
        r#"{"type":"scale_status","connected":false}"#,
    );
    assert!(!store.brew_by_weight().enabled);

    // The user must opt back in explicitly after a dropout.
    pump_turn(
        &store,
        &dispatcher,
        r#"{"type":"scale_status","connected":true}"#,
    );
    assert!(!store.brew_by_weight().enabled);
    assert_eq!(sink.sent.lock().unwrap().len(), 1);
}
