//! Request cycle tests for ChatWidget
//!
//! These drive the widget the way the terminal host does: submit, wait for
//! the detached reply task, settle. The reply service is scripted and can be
//! held back with a gate so the in-flight state can be inspected.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::sync::Semaphore;

use agent_chat_core::{
    ChatView, ChatWidget, CycleOutcome, CycleState, ErrorClass, Message, ReplyService,
    ServiceError, SubmitOutcome, PENDING_MARKER,
};

const SEED: &str = "Ask me anything.";

// ============================================================================
// Scripted reply service
// ============================================================================

#[derive(Default)]
struct ScriptedService {
    replies: Mutex<VecDeque<Result<String, ServiceError>>>,
    calls: Mutex<Vec<Vec<Message>>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedService {
    fn replying(replies: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    /// Replies are held until the returned semaphore gets a permit.
    fn gated(replies: Vec<Result<String, ServiceError>>) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let service = Self {
            replies: Mutex::new(replies.into()),
            gate: Some(Arc::clone(&gate)),
            ..Default::default()
        };
        (service, gate)
    }

    fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplyService for ScriptedService {
    async fn generate_reply(&self, prior: Vec<Message>) -> Result<String, ServiceError> {
        self.calls.lock().unwrap().push(prior);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Other("no scripted reply".into())))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// Recording view
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum ViewEvent {
    Render(Vec<Message>),
    SubmitEnabled(bool),
    ClearInput,
    Notice(String),
}

#[derive(Default)]
struct RecordingView {
    events: Vec<ViewEvent>,
}

impl RecordingView {
    fn notices(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Notice(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn last_render(&self) -> Option<&Vec<Message>> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::Render(messages) => Some(messages),
            _ => None,
        })
    }

    fn take(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }
}

impl ChatView for RecordingView {
    fn render(&mut self, messages: &[Message]) -> anyhow::Result<()> {
        self.events.push(ViewEvent::Render(messages.to_vec()));
        Ok(())
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.events.push(ViewEvent::SubmitEnabled(enabled));
    }

    fn clear_input(&mut self) {
        self.events.push(ViewEvent::ClearInput);
    }

    fn show_notice(&mut self, notice: &str) {
        self.events.push(ViewEvent::Notice(notice.to_string()));
    }
}

fn widget_with(service: ScriptedService) -> (ChatWidget<RecordingView>, Arc<ScriptedService>) {
    let service = Arc::new(service);
    let widget = ChatWidget::new(SEED, RecordingView::default(), service.clone());
    (widget, service)
}

fn seed() -> Message {
    Message::assistant(SEED)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_submit_appends_user_and_placeholder_then_sends_history() {
    let (service, gate) = ScriptedService::gated(vec![Ok("Hi there!".into())]);
    let (mut widget, service) = widget_with(service);
    widget.view_mut().take();

    assert_eq!(widget.submit("hello"), SubmitOutcome::Accepted);

    assert_eq!(
        widget.conversation().all(),
        &[seed(), Message::user("hello"), Message::assistant(PENDING_MARKER)]
    );
    assert_eq!(widget.state(), CycleState::Submitting);
    assert_eq!(
        widget.view_mut().take(),
        vec![
            ViewEvent::ClearInput,
            ViewEvent::SubmitEnabled(false),
            ViewEvent::Render(vec![
                seed(),
                Message::user("hello"),
                Message::assistant(PENDING_MARKER),
            ]),
        ]
    );

    gate.add_permits(1);
    widget.settle_next().await;
    assert_eq!(service.calls(), vec![vec![Message::user("hello")]]);
}

#[tokio::test]
async fn test_reply_replaces_placeholder() {
    let (mut widget, _service) = widget_with(ScriptedService::replying(vec![Ok("Hi there!".into())]));
    widget.submit("hello");
    widget.view_mut().take();

    assert_eq!(widget.settle_next().await, Some(CycleOutcome::Succeeded));

    assert_eq!(
        widget.conversation().all(),
        &[seed(), Message::user("hello"), Message::assistant("Hi there!")]
    );
    assert!(widget.is_submit_enabled());
    assert_eq!(
        widget.view_mut().take(),
        vec![
            ViewEvent::SubmitEnabled(true),
            ViewEvent::Render(vec![
                seed(),
                Message::user("hello"),
                Message::assistant("Hi there!"),
            ]),
        ]
    );
}

#[tokio::test]
async fn test_rejected_request_shows_notice_and_reverts() {
    let failure = ServiceError::Other(
        r#"Call was rejected: Reject code: CanisterReject, "quota exceeded""#.into(),
    );
    let (mut widget, _service) = widget_with(ScriptedService::replying(vec![Err(failure)]));
    widget.submit("hello");

    let outcome = widget.settle_next().await;

    assert_eq!(
        outcome,
        Some(CycleOutcome::Failed(ErrorClass::RejectedRequestError {
            message: "quota exceeded".into()
        }))
    );
    assert_eq!(widget.view().notices(), vec!["quota exceeded".to_string()]);
    assert_eq!(widget.conversation().all(), &[seed(), Message::user("hello")]);
    assert!(widget.is_submit_enabled());
}

#[tokio::test]
async fn test_structured_transient_error_shows_notice() {
    let failure = ServiceError::Transient("Ollama is unreachable".into());
    let (mut widget, _service) = widget_with(ScriptedService::replying(vec![Err(failure)]));
    widget.submit("hello");
    widget.settle_next().await;

    assert_eq!(widget.view().notices(), vec!["Ollama is unreachable".to_string()]);
    assert_eq!(widget.conversation().all(), &[seed(), Message::user("hello")]);
}

#[tokio::test]
async fn test_unrecognized_error_reverts_without_notice() {
    let failure = ServiceError::Other("500 Internal Error".into());
    let (mut widget, _service) = widget_with(ScriptedService::replying(vec![Err(failure)]));
    widget.submit("hello");
    widget.view_mut().take();

    let outcome = widget.settle_next().await;

    assert_eq!(outcome, Some(CycleOutcome::Failed(ErrorClass::UnclassifiedError)));
    assert!(widget.view().notices().is_empty());
    assert_eq!(widget.conversation().all(), &[seed(), Message::user("hello")]);
    assert!(widget.is_submit_enabled());
    assert_eq!(
        widget.view().last_render(),
        Some(&vec![seed(), Message::user("hello")])
    );
}

#[tokio::test]
async fn test_empty_submission_changes_nothing() {
    let (mut widget, service) = widget_with(ScriptedService::default());
    widget.view_mut().take();

    assert_eq!(widget.submit(""), SubmitOutcome::Empty);
    assert_eq!(widget.submit("   \t"), SubmitOutcome::Empty);

    assert_eq!(widget.conversation().all(), &[seed()]);
    assert!(widget.is_submit_enabled());
    assert!(widget.view_mut().take().is_empty());
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_submission_while_waiting_is_dropped() {
    let (service, gate) = ScriptedService::gated(vec![Ok("first reply".into())]);
    let (mut widget, service) = widget_with(service);
    widget.submit("first");
    widget.view_mut().take();

    assert_eq!(widget.submit("second"), SubmitOutcome::Busy);

    assert_eq!(
        widget.conversation().all(),
        &[seed(), Message::user("first"), Message::assistant(PENDING_MARKER)]
    );
    assert!(widget.view_mut().take().is_empty());

    gate.add_permits(1);
    assert_eq!(widget.settle_next().await, Some(CycleOutcome::Succeeded));
    assert_eq!(
        widget.conversation().all(),
        &[seed(), Message::user("first"), Message::assistant("first reply")]
    );
    assert_eq!(service.calls().len(), 1);
}

// ============================================================================
// Properties across several cycles
// ============================================================================

#[tokio::test]
async fn test_multi_turn_history_excludes_seed_and_placeholder() {
    let (mut widget, service) = widget_with(ScriptedService::replying(vec![
        Ok("one".into()),
        Err(ServiceError::Rejected("blocked".into())),
        Ok("three".into()),
    ]));

    for text in ["a", "b", "c"] {
        assert_eq!(widget.submit(text), SubmitOutcome::Accepted);
        widget.settle_next().await;
    }

    assert_eq!(
        service.calls(),
        vec![
            vec![Message::user("a")],
            vec![
                Message::user("a"),
                Message::assistant("one"),
                Message::user("b"),
            ],
            // The rejected turn keeps its user message in the history.
            vec![
                Message::user("a"),
                Message::assistant("one"),
                Message::user("b"),
                Message::user("c"),
            ],
        ]
    );
    assert_eq!(
        widget.conversation().all(),
        &[
            seed(),
            Message::user("a"),
            Message::assistant("one"),
            Message::user("b"),
            Message::user("c"),
            Message::assistant("three"),
        ]
    );
}

#[tokio::test]
async fn test_invariants_hold_at_every_render() {
    let (mut widget, _service) = widget_with(ScriptedService::replying(vec![
        Ok(PENDING_MARKER.into()),
        Err(ServiceError::Other("boom".into())),
        Ok("done".into()),
    ]));

    for text in ["x", "y", "z"] {
        widget.submit(text);
        // Submit is disabled exactly while a placeholder is on screen.
        assert_eq!(widget.is_submit_enabled(), !widget.conversation().has_placeholder());
        widget.settle_next().await;
        assert!(widget.is_submit_enabled());
        assert!(!widget.conversation().has_placeholder());
    }

    let mut enabled = true;
    for event in widget.view().events.clone() {
        match event {
            ViewEvent::SubmitEnabled(value) => enabled = value,
            ViewEvent::Render(messages) => {
                assert_eq!(messages[0], seed());
                if !enabled {
                    assert_eq!(messages.last(), Some(&Message::placeholder()));
                }
                let markers = messages[..messages.len() - 1]
                    .iter()
                    .filter(|m| **m == Message::placeholder())
                    .count();
                // Only the reply that reads like the marker, never a stuck placeholder.
                assert!(markers <= 1);
            }
            _ => {}
        }
    }
}
