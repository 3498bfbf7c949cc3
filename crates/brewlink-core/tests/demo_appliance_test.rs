// End-to-end exercises of the demo provider through the public facade:
// the same read and write surface as a live connection, with all
// effects simulated locally.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use brewlink_core::{
    Appliance, ApplianceConfig, Command, ConnectionState, DispatchOptions, Provenance,
};

fn demo_config() -> ApplianceConfig {
    ApplianceConfig {
        demo_mode: true,
        ..ApplianceConfig::default()
    }
}

#[tokio::test]
async fn demo_lifecycle_reports_connected_then_disconnected() {
    let appliance = Appliance::new(demo_config());
    assert_eq!(
        appliance.current_connection_state(),
        ConnectionState::Disconnected
    );

    appliance.connect().await.unwrap();
    assert_eq!(
        appliance.current_connection_state(),
        ConnectionState::Connected
    );

    appliance.disconnect().await;
    assert_eq!(
        appliance.current_connection_state(),
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn demo_store_is_fully_seeded() {
    let appliance = Appliance::new(demo_config());
    appliance.connect().await.unwrap();

    let store = appliance.store();
    assert!(!store.identity().device_id.is_empty());
    assert!(store.scale().connected);
    assert!(store.brew_by_weight().enabled);
    assert!(store.controller_health().pico_connected);
    assert!(store.statistics().total_shots > 0);

    appliance.disconnect().await;
}

#[tokio::test]
async fn demo_dispatch_is_simulated_with_optimistic_echo() {
    let appliance = Appliance::new(demo_config());
    appliance.connect().await.unwrap();
    let mut notices = appliance.notices().await.unwrap();

    let mut config = appliance.store().brew_by_weight();
    config.target_weight = 44.0;
    let ok = appliance
        .dispatch(
            Command::SetBrewByWeight(config),
            DispatchOptions {
                success_message: Some("Brew by weight saved".into()),
            },
        )
        .await;
    assert!(ok);

    let tagged = appliance.store().brew_by_weight_tagged();
    assert_eq!(tagged.value.target_weight, 44.0);
    // Demo never confirms, so the echo stays optimistic.
    assert_eq!(tagged.source, Provenance::Optimistic);

    assert_eq!(notices.recv().await.unwrap().message, "Brew by weight saved");

    appliance.disconnect().await;
}

#[tokio::test]
async fn demo_diagnostics_gate_uses_the_seeded_health_slice() {
    let appliance = Appliance::new(demo_config());
    appliance.connect().await.unwrap();

    // Seeded demo health has the realtime board up, so the gate passes.
    let ok = appliance
        .dispatch(Command::RunDiagnostics, DispatchOptions::default())
        .await;
    assert!(ok);

    appliance.reset_diagnostics();
    assert!(appliance.store().diagnostics().results.is_empty());

    appliance.disconnect().await;
}
