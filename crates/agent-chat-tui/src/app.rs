use std::sync::Arc;

use agent_chat_core::{ChatWidget, ReplyService};
use ratatui::{backend::Backend, Terminal};

use crate::handler;
use crate::tui::EventHandler;
use crate::view::TerminalView;

pub struct App<B: Backend> {
    pub should_quit: bool,
    pub widget: ChatWidget<TerminalView<B>>,
}

impl<B: Backend> App<B> {
    pub fn new(
        terminal: Terminal<B>,
        greeting: &str,
        provider_name: &str,
        service: Arc<dyn ReplyService>,
    ) -> Self {
        let title = format!("{}: {}", provider_name, service.model());
        let view = TerminalView::new(terminal, title);

        Self {
            should_quit: false,
            widget: ChatWidget::new(greeting, view, service),
        }
    }

    /// Main event loop: terminal events and finished replies are handled
    /// one at a time on this task.
    pub async fn run(&mut self, events: &mut EventHandler) -> anyhow::Result<()> {
        while !self.should_quit {
            tokio::select! {
                event = events.next() => match event {
                    Some(event) => handler::handle_event(self, event)?,
                    None => break,
                },
                Some(settled) = self.widget.next_settled() => {
                    let outcome = self.widget.settle(settled);
                    tracing::debug!(?outcome, "request cycle finished");
                }
            }
        }

        Ok(())
    }
}
