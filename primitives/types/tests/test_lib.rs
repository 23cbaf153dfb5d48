use types::*;

#[test]
fn test_event_json_shape() {
    let event = BreezEvent::NewBlock { block: 840_000 };
    let json = serde_json::to_value(&event).expect("serialize event");
    assert_eq!(json["type"], "newBlock");
    assert_eq!(json["block"], 840_000);

    let synced = serde_json::to_value(BreezEvent::Synced).expect("serialize synced");
    assert_eq!(synced["type"], "synced");
}

#[test]
fn test_node_state_changed_carries_state() {
    let node_state = NodeState {
        id: "02ab".to_string(),
        block_height: 12,
        connected_peers: vec!["03cd".to_string()],
        ..Default::default()
    };
    let event = BreezEvent::NodeStateChanged { node_state: node_state.clone() };

    let back: BreezEvent =
        serde_json::from_str(&serde_json::to_string(&event).expect("serialize event"))
            .expect("deserialize event");
    match back {
        BreezEvent::NodeStateChanged { node_state: s } => assert_eq!(s, node_state),
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_config_environment_names() {
    let json = serde_json::to_value(EnvironmentType::Staging).expect("serialize environment");
    assert_eq!(json, "staging");
    assert_eq!(EnvironmentType::default(), EnvironmentType::Production);
    assert_eq!(LevelFilter::default(), LevelFilter::Debug);
}
