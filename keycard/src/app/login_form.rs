use super::input::{self, FieldView};
use crate::form_fields;
use crossterm::event::{Event, KeyCode, KeyEvent};
use keycard_core::flow::{Effect, LoginFlow};
use keycard_core::Route;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

form_fields!(Focus, Email => "Email Address", Password => "Password");

/// The login screen: a form wrapped around a `LoginFlow`
#[derive(Debug)]
pub struct LoginForm {
    /// The state machine doing the real work
    pub flow: LoginFlow,

    /// Which field we're editing
    active: Focus,

    /// Who are you?
    email: Input,

    /// What's your password? (Will be masked)
    password: Input,
}

impl LoginForm {
    /// A blank form. `from` is where to go after logging in.
    pub fn new(from: Option<Route>) -> Self {
        Self {
            flow: LoginFlow::new(from),
            active: Focus::Email,
            email: Input::default(),
            password: Input::default(),
        }
    }

    pub fn render(&self, body_area: Rect, frame: &mut Frame<'_>) {
        let area = input::centered(body_area, 2 + input::HEIGHT * 2 + 1 + 2);
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Login")
            .title_bottom(Line::from("enter: log in · ctrl-r: register").dim());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [message_area, email_area, password_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(input::HEIGHT),
            Constraint::Length(input::HEIGHT),
        ])
        .areas(inner);

        if let Some(error) = self.flow.error() {
            frame.render_widget(Paragraph::new(error).red(), message_area);
        }

        for (focus, field_area, field_input) in [
            (Focus::Email, email_area, &self.email),
            (Focus::Password, password_area, &self.password),
        ] {
            input::render(
                frame,
                field_area,
                field_input,
                &FieldView {
                    label: focus.label(),
                    masked: focus == Focus::Password,
                    active: self.active == focus,
                    error: None,
                },
            );
        }
    }

    /// Handle a key press, returning anything the flow wants done.
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Tab => {
                self.active = self.active.next();
                Vec::new()
            }
            KeyCode::BackTab => {
                self.active = self.active.prev();
                Vec::new()
            }
            KeyCode::Enter => self.flow.submit(),
            _ => {
                let event = Event::Key(key);

                match self.active {
                    Focus::Email => {
                        self.email.handle_event(&event);
                        self.flow.form.email = self.email.value().to_owned();
                    }
                    Focus::Password => {
                        self.password.handle_event(&event);
                        self.flow.form.password = self.password.value().to_owned();
                    }
                };

                Vec::new()
            }
        }
    }
}
