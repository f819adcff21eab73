use crate::error::{Error, Result};
use crate::verify::{self, CharacterInfo};
use crate::Token;

use oauth2::basic::BasicClient;
use oauth2::url::Url;
use oauth2::{AuthorizationCode, CsrfToken};

/// The parts of an incoming callback request the handler looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct CallbackQuery {
    pub path: String,
    pub code: Option<String>,
    pub state: Option<String>,
}

impl CallbackQuery {
    /// Parses a request target such as `/oauth/callback?code=abc&state=xyz`.
    ///
    /// Empty parameters are treated as absent.
    pub fn from_target(target: &str) -> Option<Self> {
        let base = Url::parse("http://localhost/").ok()?;
        let url = base.join(target).ok()?;

        let mut query = CallbackQuery {
            path: url.path().to_string(),
            ..Default::default()
        };
        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "code" if query.code.is_none() => query.code = Some(value.into_owned()),
                "state" if query.state.is_none() => query.state = Some(value.into_owned()),
                _ => {}
            }
        }

        Some(query)
    }
}

/// A completed login: the token pair and the character it was issued for.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct Login {
    pub token: Token,
    pub character: CharacterInfo,
}

/// Validates callbacks against the state nonce of this run and completes the login.
pub struct CallbackHandler {
    client: BasicClient,
    state: CsrfToken,
    verify_url: String,
}

impl CallbackHandler {
    pub(crate) fn new(client: BasicClient, state: CsrfToken, verify_url: String) -> Self {
        CallbackHandler {
            client,
            state,
            verify_url,
        }
    }

    /// Checks `code` and `state`, exchanges the code and verifies the resulting access token.
    pub fn handle(&self, query: &CallbackQuery) -> Result<Login> {
        let code = query.code.as_deref().ok_or(Error::MissingCode)?;
        let state = query.state.as_deref().ok_or(Error::MissingState)?;
        if state != self.state.secret() {
            return Err(Error::StateMismatch);
        }

        let token = self.exchange_code(code)?;
        tracing::debug!(token = ?token, "token received");

        let character = verify::fetch_character(&self.verify_url, token.access_token())?;

        Ok(Login { token, character })
    }

    fn exchange_code(&self, code: &str) -> Result<Token> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request(oauth2::reqwest::http_client)?;

        Ok(Token::from_response(token_response))
    }
}
