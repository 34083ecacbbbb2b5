use super::*;
use crate::backend::MockOperatorBackend;
use crate::envelope::{AssuranceTier, IdentityBinding, InboundEnvelope};
use crate::resolver::DefaultContextResolver;
use foreman_core::{BindingId, FakeClock};
use tempfile::tempdir;

fn envelope(channel: &str) -> InboundEnvelope {
    InboundEnvelope {
        channel: channel.into(),
        channel_tenant_id: "tenant".into(),
        channel_conversation_id: "conv-1".into(),
        request_id: "req-1".into(),
        repo_root: "/repo".into(),
        command_text: "status".into(),
        target_type: None,
        target_id: None,
        metadata: Default::default(),
    }
}

fn binding() -> IdentityBinding {
    IdentityBinding { binding_id: BindingId::new(), assurance_tier: AssuranceTier::Verified }
}

fn broker_with(config: BrokerConfig, backend: Arc<MockOperatorBackend>) -> (tempfile::TempDir, OperatorBroker<FakeClock>) {
    let dir = tempdir().unwrap();
    let audit = AuditLog::open(dir.path().join("operator_turns.jsonl")).unwrap();
    let broker = OperatorBroker::new(config, backend, Arc::new(DefaultContextResolver::new()), audit, FakeClock::default());
    (dir, broker)
}

#[tokio::test]
async fn a_disabled_channel_is_rejected_without_asking_the_backend() {
    let config = BrokerConfig { enabled: true, enabled_channels: HashSet::new(), ..Default::default() };
    let backend = Arc::new(MockOperatorBackend::new());
    let (_dir, broker) = broker_with(config, backend);

    let decision = broker.handle_turn(envelope("chat_a"), &binding()).await;
    match decision {
        TurnDecision::Reject { reason, .. } => assert_eq!(reason, RejectReason::OperatorDisabled),
        other => panic!("expected reject, got {other:?}"),
    }
}

#[tokio::test]
async fn a_safe_respond_message_is_surfaced_verbatim() {
    let mut channels = HashSet::new();
    channels.insert("chat_a".to_string());
    let config = BrokerConfig { enabled: true, enabled_channels: channels, ..Default::default() };
    let backend = Arc::new(MockOperatorBackend::new());
    backend.push(TurnResult::Respond { message: "hello operator".to_string() });
    let (_dir, broker) = broker_with(config, backend);

    let decision = broker.handle_turn(envelope("chat_a"), &binding()).await;
    match decision {
        TurnDecision::Response { message, .. } => assert_eq!(message, "hello operator"),
        other => panic!("expected response, got {other:?}"),
    }
}

#[tokio::test]
async fn an_oversized_respond_message_is_replaced_with_a_fallback() {
    let mut channels = HashSet::new();
    channels.insert("chat_a".to_string());
    let config = BrokerConfig { enabled: true, enabled_channels: channels, ..Default::default() };
    let backend = Arc::new(MockOperatorBackend::new());
    backend.push(TurnResult::Respond { message: "x".repeat(2001) });
    let (_dir, broker) = broker_with(config, backend);

    let decision = broker.handle_turn(envelope("chat_a"), &binding()).await;
    match decision {
        TurnDecision::Response { message, .. } => assert!(message.starts_with("operator_invalid_output")),
        other => panic!("expected response, got {other:?}"),
    }
}

#[tokio::test]
async fn a_run_start_command_is_rejected_when_run_triggers_are_disabled() {
    let mut channels = HashSet::new();
    channels.insert("chat_a".to_string());
    let config = BrokerConfig { enabled: true, enabled_channels: channels, run_triggers_enabled: false, ..Default::default() };
    let backend = Arc::new(MockOperatorBackend::new());
    backend.push(TurnResult::Command { proposal: ApprovedCommand::RunStart { prompt: "do it".into(), max_steps: None } });
    let (_dir, broker) = broker_with(config, backend);

    let decision = broker.handle_turn(envelope("chat_a"), &binding()).await;
    match decision {
        TurnDecision::Reject { reason, .. } => assert_eq!(reason, RejectReason::OperatorActionDisallowed),
        other => panic!("expected reject, got {other:?}"),
    }
}

#[tokio::test]
async fn a_run_start_command_normalizes_whitespace_when_triggers_are_enabled() {
    let mut channels = HashSet::new();
    channels.insert("chat_a".to_string());
    let config = BrokerConfig { enabled: true, enabled_channels: channels, run_triggers_enabled: true, ..Default::default() };
    let backend = Arc::new(MockOperatorBackend::new());
    backend.push(TurnResult::Command { proposal: ApprovedCommand::RunStart { prompt: "Break  down\tthis goal".into(), max_steps: None } });
    let (_dir, broker) = broker_with(config, backend);

    let decision = broker.handle_turn(envelope("chat_a"), &binding()).await;
    match decision {
        TurnDecision::Command { command_text, .. } => assert_eq!(command_text, "/fm run Break down this goal"),
        other => panic!("expected command, got {other:?}"),
    }
}

#[tokio::test]
async fn the_same_conversation_key_reuses_the_same_session_across_turns() {
    let mut channels = HashSet::new();
    channels.insert("chat_a".to_string());
    let config = BrokerConfig { enabled: true, enabled_channels: channels, ..Default::default() };
    let backend = Arc::new(MockOperatorBackend::new());
    backend.push(TurnResult::Respond { message: "first".to_string() });
    backend.push(TurnResult::Respond { message: "second".to_string() });
    let (_dir, broker) = broker_with(config, backend);
    let shared_binding = binding();

    let first = broker.handle_turn(envelope("chat_a"), &shared_binding).await;
    let second = broker.handle_turn(envelope("chat_a"), &shared_binding).await;

    let session_of = |d: &TurnDecision| match d {
        TurnDecision::Response { operator_session_id, .. } => *operator_session_id,
        _ => panic!("expected response"),
    };
    assert_eq!(session_of(&first), session_of(&second));
}
