use crate::session::Session;
use crate::storage::Storage;
use std::fmt::{self, Display};
use std::str::FromStr;

/// The places a client can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/`, where we land after registering
    Root,

    /// `/login`
    Login,

    /// `/register`
    Register,

    /// `/home`, the default landing page after login
    Home,

    /// `/admin`, only for admins
    Admin,
}

impl Route {
    /// Where to go after login if nobody asked for anywhere in particular.
    pub const DEFAULT_LANDING: Route = Route::Home;

    /// The path for this route
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Home => "/home",
            Self::Admin => "/admin",
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// We got asked to go somewhere we don't know about.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown route {0}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        match path {
            "/" => Ok(Self::Root),
            "/login" => Ok(Self::Login),
            "/register" => Ok(Self::Register),
            "/home" => Ok(Self::Home),
            "/admin" => Ok(Self::Admin),
            other => Err(UnknownRoute(other.to_owned())),
        }
    }
}

/// What to do about a request to show a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Go ahead
    Allow,

    /// Log in first, then come back to `from`
    Login {
        /// Where the person was trying to go
        from: Route,
    },
}

/// Decide whether the current session may see `route`.
pub fn check<S: Storage>(route: Route, session: &Session<S>) -> Access {
    let allowed = match route {
        Route::Root | Route::Login | Route::Register => true,
        Route::Home => session.is_authenticated(),
        Route::Admin => session.is_authenticated() && session.is_admin(),
    };

    if allowed {
        Access::Allow
    } else {
        tracing::debug!(%route, "route needs login");
        Access::Login { from: route }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemoryStorage;

    fn session(login: Option<(&str, &str)>) -> Session<MemoryStorage> {
        let mut session = Session::new(MemoryStorage::new());
        if let Some((token, role)) = login {
            session.store(token, role).unwrap();
        }
        session
    }

    #[test]
    fn public_routes_are_always_allowed() {
        let session = session(None);

        for route in [Route::Root, Route::Login, Route::Register] {
            assert_eq!(check(route, &session), Access::Allow);
        }
    }

    #[test]
    fn home_needs_login() {
        assert_eq!(
            check(Route::Home, &session(None)),
            Access::Login { from: Route::Home }
        );
        assert_eq!(
            check(Route::Home, &session(Some(("T1", "USER")))),
            Access::Allow
        );
    }

    #[test]
    fn admin_needs_admin_role() {
        assert_eq!(
            check(Route::Admin, &session(Some(("T1", "USER")))),
            Access::Login { from: Route::Admin }
        );
        assert_eq!(
            check(Route::Admin, &session(Some(("T1", "ADMIN")))),
            Access::Allow
        );
    }

    #[test]
    fn parses_paths() {
        assert_eq!("/admin".parse(), Ok(Route::Admin));
        assert_eq!(
            "/nope".parse::<Route>(),
            Err(UnknownRoute("/nope".to_string()))
        );
    }
}
