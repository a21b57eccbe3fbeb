use super::input::{self, FieldView};
use crate::form_fields;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use keycard_core::api::register;
use keycard_core::flow::{Effect, RegisterFlow};
use keycard_core::validate::Field;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

form_fields!(
    Focus,
    Name => "Name",
    Email => "Email Address",
    Password => "Password",
    PhoneNumber => "Phone Number"
);

impl Focus {
    fn field(self) -> Field {
        match self {
            Self::Name => Field::Name,
            Self::Email => Field::Email,
            Self::Password => Field::Password,
            Self::PhoneNumber => Field::PhoneNumber,
        }
    }
}

/// The registration screen: a form wrapped around a `RegisterFlow`
#[derive(Debug)]
pub struct RegisterForm {
    /// The state machine doing the real work
    pub flow: RegisterFlow,

    /// Which field we're editing
    active: Focus,

    name: Input,
    email: Input,
    password: Input,
    phone_number: Input,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            flow: RegisterFlow::new(),
            active: Focus::Name,
            name: Input::default(),
            email: Input::default(),
            password: Input::default(),
            phone_number: Input::default(),
        }
    }
}

impl RegisterForm {
    fn input(&self, focus: Focus) -> &Input {
        match focus {
            Focus::Name => &self.name,
            Focus::Email => &self.email,
            Focus::Password => &self.password,
            Focus::PhoneNumber => &self.phone_number,
        }
    }

    fn input_mut(&mut self, focus: Focus) -> &mut Input {
        match focus {
            Focus::Name => &mut self.name,
            Focus::Email => &mut self.email,
            Focus::Password => &mut self.password,
            Focus::PhoneNumber => &mut self.phone_number,
        }
    }

    /// Make the inputs show what the flow has. The flow clears the form after
    /// a successful registration, so call this after handing it a result.
    pub fn sync_from_flow(&mut self) {
        let register::Req {
            name,
            email,
            password,
            phone_number,
        } = self.flow.form().clone();

        self.name = Input::new(name);
        self.email = Input::new(email);
        self.password = Input::new(password);
        self.phone_number = Input::new(phone_number);
    }

    pub fn render(&self, body_area: Rect, frame: &mut Frame<'_>) {
        let area = input::centered(body_area, 2 + 1 + input::HEIGHT * 4);
        frame.render_widget(Clear, area);

        let submit_hint = if self.flow.can_submit() {
            "enter: register"
        } else {
            "registering…"
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Register")
            .title_bottom(
                Line::from(format!(
                    "{submit_hint} · ctrl-t: show/hide password · ctrl-r: log in"
                ))
                .dim(),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [message_area, fields_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

        if let Some(error) = self.flow.error() {
            frame.render_widget(Paragraph::new(error).red(), message_area);
        } else if let Some(success) = self.flow.success() {
            frame.render_widget(Paragraph::new(success).green(), message_area);
        }

        let field_areas: [Rect; 4] =
            Layout::vertical([Constraint::Length(input::HEIGHT); 4]).areas(fields_area);

        for (focus, field_area) in Focus::FIELDS.iter().copied().zip(field_areas) {
            input::render(
                frame,
                field_area,
                self.input(focus),
                &FieldView {
                    label: focus.label(),
                    masked: focus == Focus::Password && !self.flow.show_password(),
                    active: self.active == focus,
                    error: self.flow.field_error(focus.field()),
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
            KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.flow.toggle_password_visibility();
                Vec::new()
            }
            _ => {
                let focus = self.active;
                let input = self.input_mut(focus);
                input.handle_event(&Event::Key(key));
                let value = input.value().to_owned();

                self.flow.set(focus.field(), value);

                Vec::new()
            }
        }
    }
}
