//! Submission cycle controller
//!
//! [`ChatWidget`] owns the transcript, the view and the submit-enabled flag,
//! and runs one request cycle at a time:
//!
//! ```text
//! Idle --submit--> Submitting --reply--> Succeeded --> Idle
//!                             --error--> Failed    --> Idle
//! ```
//!
//! `submit` is synchronous: it mutates the transcript, renders, and spawns
//! the reply request as a detached task. The task reports back through a
//! channel; the host awaits [`ChatWidget::next_settled`] and hands the result
//! to [`ChatWidget::settle`] on its own thread of control, so all transcript
//! and view mutation stays in one place.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::conversation::Conversation;
use crate::error::{classify, ErrorClass, ServiceError};
use crate::service::ReplyService;
use crate::state::Message;

/// The surface a [`ChatWidget`] draws on and reads submissions from.
pub trait ChatView {
    /// Redraw the whole transcript.
    fn render(&mut self, messages: &[Message]) -> anyhow::Result<()>;

    fn set_submit_enabled(&mut self, enabled: bool);

    /// Clear the draft after it has been taken as a submission.
    fn clear_input(&mut self);

    /// Show a blocking notice to the user.
    fn show_notice(&mut self, notice: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Submitting,
}

/// Result of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request cycle started.
    Accepted,
    /// Empty or whitespace-only text. Nothing changed.
    Empty,
    /// A reply is still outstanding. The submission was dropped.
    Busy,
}

/// How a request cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Succeeded,
    Failed(ErrorClass),
    /// The result did not belong to the outstanding cycle and was discarded.
    Stale,
}

/// A finished reply request, waiting to be applied by [`ChatWidget::settle`].
#[derive(Debug)]
pub struct Settled {
    cycle: u64,
    result: Result<String, ServiceError>,
}

pub struct ChatWidget<V: ChatView> {
    conversation: Conversation,
    view: V,
    service: Arc<dyn ReplyService>,
    submit_enabled: bool,
    cycle: u64,
    settled_tx: mpsc::UnboundedSender<Settled>,
    settled_rx: mpsc::UnboundedReceiver<Settled>,
}

impl<V: ChatView> ChatWidget<V> {
    /// Create the widget with its seed message and draw it once.
    pub fn new(seed: impl Into<String>, view: V, service: Arc<dyn ReplyService>) -> Self {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let mut widget = Self {
            conversation: Conversation::new(seed),
            view,
            service,
            submit_enabled: true,
            cycle: 0,
            settled_tx,
            settled_rx,
        };
        widget.view.set_submit_enabled(true);
        widget.render();
        widget
    }

    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            tracing::debug!("ignoring empty submission");
            return SubmitOutcome::Empty;
        }
        if !self.submit_enabled {
            tracing::debug!(cycle = self.cycle, "reply outstanding, dropping submission");
            return SubmitOutcome::Busy;
        }

        self.conversation.append(Message::user(text));
        self.view.clear_input();
        // Submission is only enabled while no placeholder is pending.
        if let Err(err) = self.conversation.append_placeholder() {
            tracing::error!(%err, "could not add reply placeholder");
        }
        self.set_submit_enabled(false);
        self.render();

        self.cycle += 1;
        let cycle = self.cycle;
        let prior = self.conversation.visible_slice().to_vec();
        tracing::debug!(cycle, messages = prior.len(), "requesting reply");

        let service = Arc::clone(&self.service);
        let settled_tx = self.settled_tx.clone();
        tokio::spawn(async move {
            let result = service.generate_reply(prior).await;
            // The receiver lives as long as the widget; after teardown there
            // is nobody left to tell.
            let _ = settled_tx.send(Settled { cycle, result });
        });

        SubmitOutcome::Accepted
    }

    /// Wait for the outstanding reply request to finish.
    pub async fn next_settled(&mut self) -> Option<Settled> {
        self.settled_rx.recv().await
    }

    /// Apply a finished reply request to the transcript.
    pub fn settle(&mut self, settled: Settled) -> CycleOutcome {
        if self.state() != CycleState::Submitting || settled.cycle != self.cycle {
            tracing::warn!(
                cycle = settled.cycle,
                current = self.cycle,
                "discarding result for a cycle that is not outstanding"
            );
            return CycleOutcome::Stale;
        }

        if let Err(err) = self.conversation.remove_last() {
            tracing::error!(%err, "reply placeholder missing");
        }

        let outcome = match settled.result {
            Ok(reply) => {
                tracing::debug!(cycle = settled.cycle, chars = reply.len(), "reply received");
                self.conversation.append(Message::assistant(reply));
                CycleOutcome::Succeeded
            }
            Err(err) => {
                let class = classify(&err);
                match class.notice() {
                    Some(notice) => {
                        tracing::warn!(cycle = settled.cycle, error = %err, "reply failed");
                        self.view.show_notice(notice);
                    }
                    None => {
                        tracing::error!(
                            cycle = settled.cycle,
                            error = %err,
                            "reply failed with an unrecognized error, no notice shown"
                        );
                    }
                }
                CycleOutcome::Failed(class)
            }
        };

        self.set_submit_enabled(true);
        self.render();
        outcome
    }

    /// Wait for the outstanding request and apply it.
    pub async fn settle_next(&mut self) -> Option<CycleOutcome> {
        let settled = self.next_settled().await?;
        Some(self.settle(settled))
    }

    /// Redraw the full transcript.
    pub fn render(&mut self) {
        if let Err(err) = self.view.render(self.conversation.all()) {
            tracing::error!(error = %format!("{:#}", err), "render failed");
        }
    }

    pub fn state(&self) -> CycleState {
        if self.submit_enabled {
            CycleState::Idle
        } else {
            CycleState::Submitting
        }
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
        self.view.set_submit_enabled(enabled);
    }
}
