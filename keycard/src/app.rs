mod action;
pub use action::Action;

mod effect;
pub use effect::{Effect, EffectContext, Problem};

mod input;

mod login_form;
use login_form::LoginForm;

mod register_form;
use register_form::RegisterForm;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use keycard_core::{
    flow::{self, Navigation},
    guard::{self, Access},
    Route, Session, Storage,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::{mem, process::ExitCode};

/// The "functional core" of the app.
pub struct App<S> {
    /// Who is logged in, if anyone
    session: Session<S>,

    /// What's on screen
    screen: Screen,

    /// Where we've been. The last entry is where we are.
    history: Vec<Route>,

    /// Status to display (visible at the bottom of the screen)
    status_line: Option<String>,

    /// Set when we're done
    exit: Option<ExitCode>,
}

impl<S: Storage> App<S> {
    /// Create a new instance of the app
    pub fn new(session: Session<S>) -> Self {
        Self {
            session,
            screen: Screen::Blank,
            history: Vec::new(),
            status_line: None,
            exit: None,
        }
    }

    /// Produce any side effects as needed to initialize the app.
    pub fn init(&mut self, start_at: Route) -> Vec<Effect> {
        self.navigate(Navigation {
            to: start_at,
            replace: false,
        })
    }

    /// Render the app's UI to the screen
    pub fn render(&self, frame: &mut Frame) {
        let vertical = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]);
        let [body_area, status_area] = vertical.areas(frame.area());

        match &self.screen {
            Screen::Blank => frame.render_widget(Paragraph::new("Loading…"), body_area),
            Screen::Login(form) => form.render(body_area, frame),
            Screen::Register(form) => form.render(body_area, frame),
            Screen::Home => self.render_home(frame, body_area),
            Screen::Admin => {
                let area = input::centered(body_area, 3);
                frame.render_widget(Clear, area);
                frame.render_widget(
                    Paragraph::new("You have administrator access.")
                        .block(Block::default().borders(Borders::ALL).title("Admin")),
                    area,
                );
            }
        }

        let status = Paragraph::new(match &self.status_line {
            Some(line) => line.as_str(),
            None => "esc: back · ctrl-c: quit",
        });

        frame.render_widget(status, status_area);
    }

    fn render_home(&self, frame: &mut Frame, body_area: Rect) {
        let role = self
            .session
            .role()
            .map_or_else(|| "<none>".to_string(), |role| role.to_string());

        let lines = vec![
            Line::from(format!("Role: {role}")),
            Line::from(format!(
                "admin: {} · user: {}",
                self.session.is_admin(),
                self.session.is_user()
            )),
            Line::from("l: log out · a: admin page").dim(),
        ];

        let area = input::centered(body_area, 5);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Home")),
            area,
        );
    }

    /// Handle an `Action`, updating the app's state and producing some side effect(s)
    pub fn handle(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Key(key) => self.handle_key(key),

            Action::LoggedIn(result) => match &mut self.screen {
                Screen::Login(form) => {
                    let effects = form.flow.finish(result, &mut self.session);
                    self.dispatch(effects)
                }
                _ => {
                    tracing::debug!("login finished after leaving the login screen");
                    Vec::new()
                }
            },

            Action::Registered(result) => match &mut self.screen {
                Screen::Register(form) => {
                    let effects = form.flow.finish(result);
                    form.sync_from_flow();
                    self.dispatch(effects)
                }
                _ => {
                    tracing::debug!("registration finished after leaving the register screen");
                    Vec::new()
                }
            },

            Action::TimerFired(timer) => {
                let effects = match &mut self.screen {
                    Screen::Login(form) => {
                        form.flow.timer_fired(timer);
                        Vec::new()
                    }
                    Screen::Register(form) => form.flow.timer_fired(timer),
                    _ => Vec::new(),
                };

                self.dispatch(effects)
            }

            Action::Problem(problem) => {
                self.status_line = Some(problem);

                Vec::new()
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match (key.code, &mut self.screen) {
            (KeyCode::Char('c'), _) if ctrl => {
                self.exit = Some(ExitCode::SUCCESS);
                self.leave_screen()
            }

            (KeyCode::Esc, _) => self.back(),

            (KeyCode::Char('r'), Screen::Login(_)) if ctrl => self.navigate(Navigation {
                to: Route::Register,
                replace: false,
            }),

            (KeyCode::Char('r'), Screen::Register(_)) if ctrl => self.navigate(Navigation {
                to: Route::Login,
                replace: false,
            }),

            (_, Screen::Login(form)) => {
                let effects = form.handle_key(key);
                self.dispatch(effects)
            }

            (_, Screen::Register(form)) => {
                let effects = form.handle_key(key);
                self.dispatch(effects)
            }

            (KeyCode::Char('l'), Screen::Home | Screen::Admin) => self.logout(),

            (KeyCode::Char('a'), Screen::Home) => self.navigate(Navigation {
                to: Route::Admin,
                replace: false,
            }),

            (KeyCode::Char('q'), _) => {
                self.exit = Some(ExitCode::SUCCESS);
                self.leave_screen()
            }

            _ => {
                self.status_line = Some(format!("Unknown key {:?}", key.code));

                Vec::new()
            }
        }
    }

    fn logout(&mut self) -> Vec<Effect> {
        if let Err(err) = self.session.logout() {
            tracing::error!(?err, "could not clear session");
            self.status_line = Some(Problem::from(err).to_string());

            return Vec::new();
        }

        self.status_line = Some("Logged out".to_owned());
        self.history.clear();

        self.navigate(Navigation {
            to: Route::Login,
            replace: false,
        })
    }

    /// Go back one entry in history, or quit if there's nowhere to go.
    fn back(&mut self) -> Vec<Effect> {
        if self.history.len() < 2 {
            self.exit = Some(ExitCode::SUCCESS);
            return self.leave_screen();
        }

        self.history.pop();
        let to = self.history.pop().unwrap_or(Route::Root);

        self.navigate(Navigation { to, replace: false })
    }

    /// Turn flow effects into app effects, following any navigation.
    fn dispatch(&mut self, effects: Vec<flow::Effect>) -> Vec<Effect> {
        let mut out = Vec::with_capacity(effects.len());

        for effect in effects {
            match effect {
                flow::Effect::LogIn(req) => out.push(Effect::LogIn(req)),
                flow::Effect::Register(req) => out.push(Effect::Register(req)),
                flow::Effect::Schedule(timer, delay) => out.push(Effect::Schedule(timer, delay)),
                flow::Effect::Cancel(timer) => out.push(Effect::Cancel(timer)),
                flow::Effect::Navigate(navigation) => out.extend(self.navigate(navigation)),
            }
        }

        out
    }

    /// Tear down the current screen, returning whatever it needs cancelled.
    fn leave_screen(&mut self) -> Vec<Effect> {
        let effects = match mem::replace(&mut self.screen, Screen::Blank) {
            Screen::Login(mut form) => form.flow.teardown(),
            Screen::Register(mut form) => form.flow.teardown(),
            Screen::Blank | Screen::Home | Screen::Admin => Vec::new(),
        };

        self.dispatch(effects)
    }

    /// Move to a new route, checking first that the session allows it.
    fn navigate(&mut self, navigation: Navigation) -> Vec<Effect> {
        let mut effects = self.leave_screen();

        let (route, screen) = match guard::check(navigation.to, &self.session) {
            Access::Allow => match navigation.to {
                Route::Root if self.session.is_authenticated() => (Route::Home, Screen::Home),
                Route::Root | Route::Login => (Route::Login, Screen::Login(LoginForm::new(None))),
                Route::Register => (Route::Register, Screen::Register(RegisterForm::default())),
                Route::Home => (Route::Home, Screen::Home),
                Route::Admin => (Route::Admin, Screen::Admin),
            },
            Access::Login { from } => (Route::Login, Screen::Login(LoginForm::new(Some(from)))),
        };

        tracing::info!(to = %navigation.to, showing = %route, replace = navigation.replace, "navigating");

        if navigation.replace {
            self.history.pop();
        }
        self.history.push(route);
        self.screen = screen;

        effects
    }

    /// Where we are right now
    pub fn current_route(&self) -> Option<Route> {
        self.history.last().copied()
    }

    /// Let the TUI manager know whether we're all wrapped up and can exit.
    pub fn should_exit(&self) -> Option<ExitCode> {
        self.exit
    }
}

/// What's on screen
#[derive(Debug)]
enum Screen {
    /// Nothing yet (or anymore)
    Blank,

    /// Logging in
    Login(LoginForm),

    /// Registering
    Register(RegisterForm),

    /// Logged in
    Home,

    /// Logged in as an admin
    Admin,
}

#[cfg(test)]
mod test {
    use super::*;
    use keycard_core::api::{login, register};
    use keycard_core::flow::TimerId;
    use keycard_core::MemoryStorage;

    fn app() -> App<MemoryStorage> {
        App::new(Session::new(MemoryStorage::new()))
    }

    fn press(app: &mut App<MemoryStorage>, code: KeyCode) -> Vec<Effect> {
        app.handle(Action::Key(KeyEvent::from(code)))
    }

    fn ctrl(app: &mut App<MemoryStorage>, c: char) -> Vec<Effect> {
        app.handle(Action::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )))
    }

    fn type_text(app: &mut App<MemoryStorage>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn schedule(effects: &[Effect]) -> TimerId {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::Schedule(timer, _) => Some(*timer),
                _ => None,
            })
            .unwrap_or_else(|| panic!("expected a schedule in {effects:?}"))
    }

    fn log_in(app: &mut App<MemoryStorage>, role: &str) -> Vec<Effect> {
        type_text(app, "a@b.com");
        press(app, KeyCode::Tab);
        type_text(app, "x");

        let effects = press(app, KeyCode::Enter);
        assert_eq!(
            effects,
            vec![Effect::LogIn(login::Req {
                email: "a@b.com".to_string(),
                password: "x".to_string(),
            })]
        );

        app.handle(Action::LoggedIn(Ok(login::Success {
            token: "T1".to_string(),
            role: role.to_string(),
        })))
    }

    #[test]
    fn protected_start_redirects_to_login() {
        let mut app = app();
        app.init(Route::Home);

        assert_eq!(app.current_route(), Some(Route::Login));
    }

    #[test]
    fn logged_in_start_goes_straight_home() {
        let mut session = Session::new(MemoryStorage::new());
        session.store("T1", "USER").unwrap();

        let mut app = App::new(session);
        app.init(Route::Home);

        assert_eq!(app.current_route(), Some(Route::Home));
    }

    #[test]
    fn login_replaces_the_login_page_in_history() {
        let mut app = app();
        app.init(Route::Home);

        log_in(&mut app, "USER");

        assert_eq!(app.current_route(), Some(Route::Home));
        assert_eq!(app.history, vec![Route::Home]);
    }

    #[test]
    fn login_returns_to_the_page_we_wanted() {
        let mut app = app();
        app.init(Route::Admin);

        log_in(&mut app, "ADMIN");

        assert_eq!(app.current_route(), Some(Route::Admin));
    }

    #[test]
    fn empty_login_never_sends_a_request() {
        let mut app = app();
        app.init(Route::Login);

        let effects = press(&mut app, KeyCode::Enter);

        assert!(!effects.iter().any(|e| matches!(e, Effect::LogIn(_))));
        assert!(matches!(effects.as_slice(), [Effect::Schedule(..)]));
    }

    #[test]
    fn leaving_login_cancels_its_error_timer() {
        let mut app = app();
        app.init(Route::Login);
        let timer = schedule(&press(&mut app, KeyCode::Enter));

        let effects = ctrl(&mut app, 'r');

        assert_eq!(effects, vec![Effect::Cancel(timer)]);
        assert_eq!(app.current_route(), Some(Route::Register));
    }

    #[test]
    fn registration_redirects_to_root_after_timer() {
        let mut app = app();
        app.init(Route::Register);

        type_text(&mut app, "Ada");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "ada@example.com");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "hunter2");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "555-0100");

        let effects = press(&mut app, KeyCode::Enter);
        assert!(matches!(effects.as_slice(), [Effect::Register(_)]));

        let timer = schedule(&app.handle(Action::Registered(Ok(register::Registered {
            message: None,
        }))));
        assert_eq!(app.current_route(), Some(Route::Register));

        app.handle(Action::TimerFired(timer));

        // Root while logged out is the login page.
        assert_eq!(app.current_route(), Some(Route::Login));
    }

    #[test]
    fn registration_without_phone_number_sends_nothing() {
        let mut app = app();
        app.init(Route::Register);

        type_text(&mut app, "Ada");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "ada@example.com");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "hunter2");

        assert_eq!(press(&mut app, KeyCode::Enter), Vec::<Effect>::new());

        let Screen::Register(form) = &app.screen else {
            panic!("expected to still be registering");
        };
        assert_eq!(
            form.flow
                .field_error(keycard_core::validate::Field::PhoneNumber),
            Some("Phone Number is required")
        );
    }

    #[test]
    fn logout_clears_session_and_returns_to_login() {
        let mut app = app();
        app.init(Route::Home);
        log_in(&mut app, "ADMIN");

        press(&mut app, KeyCode::Char('l'));

        assert!(!app.session.is_authenticated());
        assert_eq!(app.session.role(), None);
        assert_eq!(app.current_route(), Some(Route::Login));
    }

    #[test]
    fn users_cannot_see_admin() {
        let mut app = app();
        app.init(Route::Home);
        log_in(&mut app, "USER");

        press(&mut app, KeyCode::Char('a'));

        assert_eq!(app.current_route(), Some(Route::Login));
    }

    #[test]
    fn escape_goes_back_then_quits() {
        let mut app = app();
        app.init(Route::Login);
        ctrl(&mut app, 'r');

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.current_route(), Some(Route::Login));
        assert_eq!(app.should_exit(), None);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.should_exit(), Some(ExitCode::SUCCESS));
    }
}
