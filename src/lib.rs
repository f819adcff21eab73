#![warn(missing_docs)]
//! One-shot EVE Online SSO login based on [oauth2-rs](https://docs.rs/oauth2/).
//!
//! Starts a local callback listener, hands back the authorization URL to show the user and,
//! once the browser is redirected back, exchanges the code and verifies the character.
//! ```rust,no_run
//! # fn main() -> Result<(), evesso::Error> {
//! let credentials = evesso::Credentials::from_env()?;
//! let config = evesso::SsoConfig::eve(credentials);
//!
//! let session = evesso::authenticate(config, |login| {
//!     println!("logged in as {}", login.character.character_name);
//! })?;
//!
//! println!("Browse to {}", session.authorize_url);
//! # Ok(())
//! # }
//! ```

mod callback;
mod config;
mod error;
mod server;
mod verify;

pub use callback::{CallbackHandler, CallbackQuery, Login};
pub use config::{Credentials, SsoConfig, LISTEN_ON, LOGIN_SERVER, REDIRECT_URL, SCOPES, VERIFY_URL};
pub use error::{Error, Result};
pub use verify::CharacterInfo;

use std::net::{SocketAddr, TcpListener};

use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::url::Url;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse, TokenUrl,
};

/// A token response, which contains the access and refresh token as well as metadata like expiry info and the token type
#[derive(Clone)]
pub struct Token(BasicTokenResponse);
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &format_args!("[redacted]"))
            .field("token_type", &self.token_type())
            .field("expires_in", &self.expires_in())
            .field("refresh_token", &format_args!("[redacted]"))
            .finish()
    }
}

#[allow(missing_docs)]
impl Token {
    fn from_response(token_response: BasicTokenResponse) -> Self {
        Token(token_response)
    }

    pub fn access_token(&self) -> &str {
        self.0.access_token().secret()
    }

    pub fn token_type(&self) -> &oauth2::basic::BasicTokenType {
        self.0.token_type()
    }

    pub fn expires_in(&self) -> Option<std::time::Duration> {
        self.0.expires_in()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.0.refresh_token().map(|token| token.secret().as_str())
    }
}

/// A running login: where to send the user and what the callback will be checked against.
#[derive(Debug)]
pub struct Session {
    /// The provider-hosted page the user has to open.
    pub authorize_url: Url,
    /// The anti-forgery nonce embedded in `authorize_url`, generated once per session.
    pub state: CsrfToken,
    /// Address the callback listener is bound to.
    pub local_addr: SocketAddr,
}

fn oauth_client(config: &SsoConfig) -> Result<BasicClient> {
    let credentials = &config.credentials;
    let client = BasicClient::new(
        ClientId::new(credentials.client_id.clone()),
        Some(ClientSecret::new(credentials.client_secret.clone())),
        AuthUrl::new(config.auth_url.clone()).map_err(|_| Error::InvalidUrl)?,
        Some(TokenUrl::new(config.token_url.clone()).map_err(|_| Error::InvalidUrl)?),
    )
    .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone()).map_err(|_| Error::InvalidUrl)?);

    Ok(client)
}

fn authorize_url(client: &BasicClient, scopes: &[String], state: CsrfToken) -> Url {
    let mut auth_request = client.authorize_url(move || state);
    for scope in scopes {
        auth_request = auth_request.add_scope(Scope::new(scope.clone()));
    }

    let (url, _state) = auth_request.url();
    url
}

/// The `authenticate` function performs the login flow.
///
/// It binds `config.listen_on`, which should be reachable through `config.redirect_url`, and
/// serves the callback from a background thread for as long as the process lives. Each login
/// that passes the state check, the token exchange and the character verification is handed to
/// `on_login`.
pub fn authenticate(
    config: SsoConfig,
    on_login: impl Fn(&Login) + Send + Sync + 'static,
) -> Result<Session> {
    let client = oauth_client(&config)?;
    let callback_path = config.callback_path()?;

    let state = CsrfToken::new_random();
    let authorize_url = authorize_url(&client, &config.scopes, state.clone());

    let listener = TcpListener::bind(&config.listen_on)?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, path = %callback_path, "listening for the sso callback");

    let handler = CallbackHandler::new(client, state.clone(), config.verify_url);
    server::start_callback_server(listener, callback_path, handler, on_login);

    Ok(Session {
        authorize_url,
        state,
        local_addr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SsoConfig {
        SsoConfig::eve(Credentials {
            client_id: "eve-client".into(),
            client_secret: "eve-secret".into(),
        })
    }

    #[test]
    fn authorize_url_carries_every_parameter() {
        let config = config();
        let client = oauth_client(&config).unwrap();
        let state = CsrfToken::new_random();
        let url = authorize_url(&client, &config.scopes, state.clone());

        assert_eq!(url.host_str(), Some(LOGIN_SERVER));
        assert_eq!(url.path(), "/v2/oauth/authorize");
        assert!(url.as_str().contains(state.secret().as_str()));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("client_id"), Some("eve-client"));
        assert_eq!(get("redirect_uri"), Some(REDIRECT_URL));
        assert_eq!(get("state"), Some(state.secret().as_str()));
        assert_eq!(get("scope"), Some(SCOPES.join(" ").as_str()));
    }

    #[test]
    fn sessions_get_distinct_nonces() {
        let mut first = config();
        first.listen_on = "127.0.0.1:0".into();
        let second = first.clone();

        let a = authenticate(first, |_| {}).unwrap();
        let b = authenticate(second, |_| {}).unwrap();

        assert_ne!(a.state.secret(), b.state.secret());
        assert!(a.authorize_url.as_str().contains(a.state.secret().as_str()));
        assert!(b.authorize_url.as_str().contains(b.state.secret().as_str()));
    }

    #[test]
    fn bad_redirect_url_fails_before_binding() {
        let mut config = config();
        config.redirect_url = "not a url".into();
        assert!(matches!(authenticate(config, |_| {}), Err(Error::InvalidUrl)));
    }

    #[test]
    fn token_debug_hides_secrets() {
        let response: BasicTokenResponse = serde_json::from_str(
            r#"{"access_token":"AT1","refresh_token":"RT1","token_type":"Bearer","expires_in":1200}"#,
        )
        .unwrap();
        let token = Token::from_response(response);

        assert_eq!(token.access_token(), "AT1");
        assert_eq!(token.refresh_token(), Some("RT1"));
        assert_eq!(token.expires_in(), Some(std::time::Duration::from_secs(1200)));
        let debug = format!("{:?}", token);
        assert!(!debug.contains("AT1"));
        assert!(!debug.contains("RT1"));
    }
}
