use anyhow::Result;
use agent_chat_core::SubmitOutcome;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::Backend;

use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event<B: Backend>(app: &mut App<B>, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) | AppEvent::Tick => app.widget.render(),
    }
    Ok(())
}

fn handle_key<B: Backend>(app: &mut App<B>, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // A notice blocks everything until it is dismissed
    if app.widget.view().notice().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.widget.view_mut().dismiss_notice();
            app.widget.render();
        }
        return;
    }

    match key.code {
        KeyCode::Enter => {
            let text = app.widget.view().input().value().to_string();
            match app.widget.submit(&text) {
                SubmitOutcome::Accepted => {}
                SubmitOutcome::Empty => tracing::debug!("nothing to send"),
                SubmitOutcome::Busy => tracing::debug!("still waiting for the previous reply"),
            }
        }
        KeyCode::Backspace => edit(app, |input| input.backspace()),
        KeyCode::Delete => edit(app, |input| input.delete()),
        KeyCode::Left => edit(app, |input| input.move_left()),
        KeyCode::Right => edit(app, |input| input.move_right()),
        KeyCode::Home => edit(app, |input| input.move_home()),
        KeyCode::End => edit(app, |input| input.move_end()),
        KeyCode::Char(c) => edit(app, |input| input.insert(c)),
        _ => {}
    }
}

/// Apply a draft edit and redraw. Editing stays possible while a reply is
/// outstanding; only sending is disabled.
fn edit<B: Backend>(app: &mut App<B>, change: impl FnOnce(&mut crate::input::InputState)) {
    change(app.widget.view_mut().input_mut());
    app.widget.render();
}
