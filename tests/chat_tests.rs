use ai_studio::chat::{
    ChatError, ChatRole, ChatSession, GENERATION_FAILED_DESCRIPTION, GENERATION_FAILED_TITLE,
    SendOutcome,
};
use ai_studio::config::{GenerationSettings, SettingsUpdate};
use ai_studio::models::ModelId;
use ai_studio::synth::templates::{ELABORATION, GREETING};
use anyhow::anyhow;

use test_utils::{FailingBackend, instant_synthesizer};

fn session() -> ChatSession<ai_studio::ResponseSynthesizer> {
    ChatSession::new(
        instant_synthesizer(0),
        ModelId::GeminiPro,
        GenerationSettings::default(),
    )
}

#[tokio::test]
async fn test_send_appends_both_messages() {
    let mut chat = session();
    let outcome = chat.send("Hello there").await.expect("accepted");

    let SendOutcome::Replied(reply) = outcome else {
        panic!("expected a reply");
    };
    assert_eq!(reply.content, GREETING);
    let roles: Vec<_> = chat.state().messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
    assert!(!chat.state().is_responding());
}

#[test]
fn test_second_submission_while_pending_is_rejected() {
    let mut chat = session();
    let turn = chat.begin_turn("first").expect("accepted");
    assert_eq!(turn.prompt, "first");
    assert!(chat.state().is_responding());

    assert_eq!(chat.begin_turn("second"), Err(ChatError::Busy));
    assert_eq!(chat.state().messages().len(), 1);

    chat.finish_turn(Ok("done".to_string()));
    assert!(chat.begin_turn("second").is_ok());
}

#[tokio::test]
async fn test_whitespace_submission_is_ignored() {
    let mut chat = session();
    assert_eq!(chat.send("   \n\t").await, Err(ChatError::EmptyMessage));
    assert!(chat.state().is_empty());
    assert!(!chat.state().is_responding());
}

#[tokio::test]
async fn test_failing_backend_produces_notification() {
    let mut chat = ChatSession::new(
        FailingBackend,
        ModelId::Claude3,
        GenerationSettings::default(),
    );
    let outcome = chat.send("anything").await.expect("accepted");

    let SendOutcome::Failed(notice) = outcome else {
        panic!("expected a failure notification");
    };
    assert!(notice.is_error());
    assert_eq!(notice.title, GENERATION_FAILED_TITLE);
    assert_eq!(notice.description, GENERATION_FAILED_DESCRIPTION);

    assert_eq!(chat.state().messages().len(), 1);
    assert_eq!(chat.state().messages()[0].role, ChatRole::User);
    assert!(!chat.state().is_responding());
}

#[test]
fn test_finish_turn_error_clears_pending() {
    let mut chat = session();
    chat.begin_turn("question").expect("accepted");
    let outcome = chat.finish_turn(Err(anyhow!("timeout")));
    assert!(matches!(outcome, SendOutcome::Failed(_)));
    assert!(!chat.state().is_responding());
}

#[tokio::test]
async fn test_clear_empties_transcript() {
    let mut chat = session();
    chat.send("hi").await.expect("accepted");
    chat.clear();
    assert!(chat.state().is_empty());
}

#[tokio::test]
async fn test_settings_flow_into_turn_params() {
    let mut chat = session();
    chat.set_model(ModelId::GeminiUltra);
    assert!(
        chat.update_settings(SettingsUpdate {
            max_tokens: Some(900),
            ..Default::default()
        })
        .expect("in range")
    );

    let turn = chat.begin_turn("ocean currents").expect("accepted");
    assert_eq!(turn.params.model_id, "gemini-ultra");
    assert_eq!(turn.params.max_tokens, 900);
    chat.finish_turn(Ok(String::new()));

    let SendOutcome::Replied(reply) = chat.send("ocean currents").await.expect("accepted") else {
        panic!("expected a reply");
    };
    assert!(reply.content.contains(ModelId::GeminiUltra.flavor()));
    assert!(reply.content.contains(ELABORATION));
}

#[test]
fn test_out_of_range_settings_are_rejected() {
    let mut chat = session();
    let before = *chat.settings();
    let result = chat.update_settings(SettingsUpdate {
        temperature: Some(2.5),
        max_tokens: Some(600),
        ..Default::default()
    });
    assert!(result.is_err());
    assert_eq!(*chat.settings(), before);
}
