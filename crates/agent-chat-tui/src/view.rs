use agent_chat_core::{ChatView, Message};
use chrono::Local;
use ratatui::{backend::Backend, Terminal};

use crate::input::InputState;
use crate::ui::{self, Chrome};

/// Terminal surface for a [`agent_chat_core::ChatWidget`]
pub struct TerminalView<B: Backend> {
    terminal: Terminal<B>,
    title: String,
    input: InputState,
    submit_enabled: bool,
    notice: Option<String>,
}

impl<B: Backend> TerminalView<B> {
    pub fn new(terminal: Terminal<B>, title: impl Into<String>) -> Self {
        Self {
            terminal,
            title: title.into(),
            input: InputState::default(),
            submit_enabled: true,
            notice: None,
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

impl<B: Backend> ChatView for TerminalView<B> {
    fn render(&mut self, messages: &[Message]) -> anyhow::Result<()> {
        let time_label = ui::format_time(Local::now());
        let chrome = Chrome {
            title: &self.title,
            input: &self.input,
            submit_enabled: self.submit_enabled,
            notice: self.notice.as_deref(),
        };
        self.terminal
            .draw(|frame| ui::draw(frame, &chrome, messages, &time_label))?;
        Ok(())
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn show_notice(&mut self, notice: &str) {
        self.notice = Some(notice.to_string());
    }
}
