use super::error::{self, Error, ErrorResp};
use super::response::Raw;
use super::{login, register};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// Where we look for the API if nobody says otherwise.
pub const DEFAULT_SERVER: &str = "http://localhost:8080";

/// Client for the account API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Client {
    /// The server to connect to, e.g. `https://accounts.your-domain.com`. A
    /// path here (`https://your-domain.com/accounts`) prefixes every request.
    pub server: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER.to_owned())
    }
}

impl Client {
    /// Construct a new client
    pub fn new(server: String) -> Self {
        Self { server }
    }

    /// Register a new account.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`, plus `Error::Rejected` if the
    /// body's `statusCode` isn't 200.
    #[tracing::instrument(skip(self, client, req), fields(server = %self.server))]
    pub async fn register(
        &self,
        client: &reqwest::Client,
        req: &register::Req,
    ) -> error::Result<register::Registered> {
        let url = self.url(register::PATH)?;

        let raw: Raw = Self::handle_response(client.post(url).json(req)).await?;

        raw.try_into()
    }

    /// Log into an existing account.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`, plus `Error::Rejected` if the
    /// body's `statusCode` isn't 200 and `Error::MissingField` if it is 200
    /// but there's no token or role.
    #[tracing::instrument(skip(self, client, req), fields(server = %self.server))]
    pub async fn login(
        &self,
        client: &reqwest::Client,
        req: &login::Req,
    ) -> error::Result<login::Success> {
        let url = self.url(login::PATH)?;

        let raw: Raw = Self::handle_response(client.post(url).json(req)).await?;

        raw.try_into()
    }

    /// Headers for an authenticated JSON request. With no token (or an empty
    /// one) we leave `Authorization` off entirely rather than sending a
    /// bearer of nothing.
    pub fn headers(token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = token.filter(|token| !token.is_empty()) {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(err) => {
                    tracing::warn!(?err, "stored token can't be sent as a header");
                }
            }
        }

        headers
    }

    /// Make a request that needs a token. The callback gets the full URL for
    /// `path` and should return the request to send; we attach the headers.
    ///
    /// ## Errors
    ///
    /// - `Error::Unauthorized` without making a request if there's no token
    /// - otherwise the same as `handle_response`
    pub async fn authenticated<CB, T>(
        &self,
        token: Option<&str>,
        path: &str,
        cb: CB,
    ) -> error::Result<T>
    where
        CB: FnOnce(Url) -> reqwest::RequestBuilder,
        T: DeserializeOwned,
    {
        match token {
            Some(token) if !token.is_empty() => {
                let url = self.url(path)?;

                Self::handle_response(cb(url).headers(Self::headers(Some(token)))).await
            }
            _ => Err(Error::Unauthorized),
        }
    }

    /// Paths are appended to the server, so any path on the base URL is kept.
    fn url(&self, path: &str) -> error::Result<Url> {
        let mut base = Url::parse(&self.server)?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }

        Ok(base.join(path.trim_start_matches('/'))?)
    }

    /// Convert an HTTP response into a result, interpreting errors in a
    /// standard way.
    ///
    /// ## Errors
    ///
    /// - `Ok(..)` if the server returned a success (2xx) with a body we could
    ///   decode
    /// - `Error::Http` if the request didn't complete or the body didn't decode
    /// - `Error::Status` for any other status. If the body is JSON with a
    ///   `message`, we keep it.
    async fn handle_response<T>(req: reqwest::RequestBuilder) -> error::Result<T>
    where
        T: DeserializeOwned,
    {
        let resp = req.send().await?;

        let status = resp.status();

        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            // Error bodies are best-effort; a proxy might send HTML.
            let body: ErrorResp = resp.json().await.unwrap_or_default();

            tracing::debug!(%status, message = ?body.message, "request failed");

            Err(Error::Status {
                status,
                message: body.message,
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{address}")
    }

    fn login_req() -> login::Req {
        login::Req {
            email: "a@b.com".to_string(),
            password: "x".to_string(),
        }
    }

    fn register_req() -> register::Req {
        register::Req {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            phone_number: "555-0100".to_string(),
        }
    }

    #[tokio::test]
    async fn login_success() {
        let server = serve(Router::new().route(
            login::PATH,
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({"email": "a@b.com", "password": "x"}));

                Json(json!({"statusCode": 200, "token": "T1", "role": "ADMIN"}))
            }),
        ))
        .await;

        let success = Client::new(server)
            .login(&reqwest::Client::new(), &login_req())
            .await
            .unwrap();

        assert_eq!(
            success,
            login::Success {
                token: "T1".to_string(),
                role: "ADMIN".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn login_error_status_keeps_message() {
        let server = serve(Router::new().route(
            login::PATH,
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"statusCode": 401, "message": "Invalid credentials"})),
                )
            }),
        ))
        .await;

        let err = Client::new(server)
            .login(&reqwest::Client::new(), &login_req())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Status {
                status: StatusCode::UNAUTHORIZED,
                ..
            }
        ));
        assert_eq!(err.display_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn login_error_status_without_json() {
        let server = serve(Router::new().route(
            login::PATH,
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream went away") }),
        ))
        .await;

        let err = Client::new(server)
            .login(&reqwest::Client::new(), &login_req())
            .await
            .unwrap_err();

        assert_eq!(err.display_message(), "Request failed with status code 502");
    }

    #[tokio::test]
    async fn login_ok_status_but_missing_token_fails_closed() {
        let server = serve(Router::new().route(
            login::PATH,
            post(|| async { Json(json!({"statusCode": 200, "role": "USER"})) }),
        ))
        .await;

        let err = Client::new(server)
            .login(&reqwest::Client::new(), &login_req())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingField("token")));
    }

    #[tokio::test]
    async fn login_unreachable_is_http_error() {
        // Bind and immediately drop to get a port nobody is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let err = Client::new(format!("http://{address}"))
            .login(&reqwest::Client::new(), &login_req())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn url_keeps_base_path() {
        let client = Client::new("http://host/app".to_string());

        assert_eq!(
            client.url(login::PATH).unwrap().as_str(),
            "http://host/app/api/auth/login"
        );
    }

    #[test]
    fn url_with_bare_origin() {
        for server in ["http://host", "http://host/"] {
            let client = Client::new(server.to_string());

            assert_eq!(
                client.url(register::PATH).unwrap().as_str(),
                "http://host/api/auth/register"
            );
        }
    }

    #[tokio::test]
    async fn login_under_a_base_path() {
        let server = serve(Router::new().route(
            "/app/api/auth/login",
            post(|| async { Json(json!({"statusCode": 200, "token": "T1", "role": "USER"})) }),
        ))
        .await;

        let success = Client::new(format!("{server}/app/"))
            .login(&reqwest::Client::new(), &login_req())
            .await
            .unwrap();

        assert_eq!(success.token, "T1");
    }

    #[tokio::test]
    async fn bad_server_url() {
        let err = Client::new("not a url".to_string())
            .login(&reqwest::Client::new(), &login_req())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UrlParse(_)));
    }

    #[tokio::test]
    async fn register_success() {
        let server = serve(Router::new().route(
            register::PATH,
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["phoneNumber"], "555-0100");

                Json(json!({"statusCode": 200, "message": "User registered"}))
            }),
        ))
        .await;

        let registered = Client::new(server)
            .register(&reqwest::Client::new(), &register_req())
            .await
            .unwrap();

        assert_eq!(registered.message.as_deref(), Some("User registered"));
    }

    #[tokio::test]
    async fn register_rejected_in_body() {
        let server = serve(Router::new().route(
            register::PATH,
            post(|| async { Json(json!({"statusCode": 400, "message": "Email taken"})) }),
        ))
        .await;

        let err = Client::new(server)
            .register(&reqwest::Client::new(), &register_req())
            .await
            .unwrap_err();

        assert_eq!(err.display_message(), "Email taken");
    }

    #[test]
    fn headers_with_token() {
        let headers = Client::headers(Some("T1"));

        assert_eq!(headers[AUTHORIZATION], "Bearer T1");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn headers_without_token_omit_authorization() {
        for token in [None, Some("")] {
            let headers = Client::headers(token);

            assert!(headers.get(AUTHORIZATION).is_none());
            assert_eq!(headers[CONTENT_TYPE], "application/json");
        }
    }

    #[tokio::test]
    async fn authenticated_without_token_skips_request() {
        let client = Client::default();

        let res: error::Result<Value> = client
            .authenticated(None, "/api/anything", |url| {
                reqwest::Client::new().get(url)
            })
            .await;

        assert!(matches!(res, Err(Error::Unauthorized)));
    }

    #[tokio::test]
    async fn authenticated_sends_bearer() {
        let server = serve(Router::new().route(
            "/api/whoami",
            axum::routing::get(|headers: axum::http::HeaderMap| async move {
                Json(json!({"auth": headers[AUTHORIZATION].to_str().unwrap()}))
            }),
        ))
        .await;

        let res: Value = Client::new(server)
            .authenticated(Some("T1"), "/api/whoami", |url| {
                reqwest::Client::new().get(url)
            })
            .await
            .unwrap();

        assert_eq!(res["auth"], "Bearer T1");
    }
}
