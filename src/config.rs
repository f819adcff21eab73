use crate::error::{Error, Result};

/// Host of the EVE Online single sign-on service.
pub const LOGIN_SERVER: &str = "login.eveonline.com";
/// ESI endpoint mapping a bearer token back to the character it belongs to.
pub const VERIFY_URL: &str = "https://esi.evetech.net/verify/";
/// Where the SSO sends the browser back to; must match the application registration.
pub const REDIRECT_URL: &str = "http://localhost:8080/oauth/callback";
/// Local address the callback listener binds.
pub const LISTEN_ON: &str = "localhost:8080";

/// Scopes requested on every login.
pub const SCOPES: &[&str] = &[
    "esi-markets.read_character_orders.v1",
    "esi-characters.read_blueprints.v1",
    "esi-assets.read_assets.v1",
    "esi-universe.read_structures.v1",
    "esi-planets.manage_planets.v1",
    "esi-wallet.read_character_wallet.v1",
];

const CLIENT_ID_VAR: &str = "CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";

/// The application credentials registered with the SSO.
#[derive(Clone)]
#[allow(missing_docs)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &format_args!("[redacted]"))
            .finish()
    }
}

impl Credentials {
    /// Reads `CLIENT_ID` and `CLIENT_SECRET` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the credentials through `lookup`. Missing and empty values are both rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(Error::MissingCredential(name))
        };

        Ok(Credentials {
            client_id: required(CLIENT_ID_VAR)?,
            client_secret: required(CLIENT_SECRET_VAR)?,
        })
    }
}

/// Everything the login flow needs to know about the provider and the local listener.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct SsoConfig {
    pub auth_url: String,
    pub token_url: String,
    pub verify_url: String,
    pub redirect_url: String,
    pub listen_on: String,
    pub credentials: Credentials,
    pub scopes: Vec<String>,
}

impl SsoConfig {
    /// The EVE Online endpoints and the default scope set.
    pub fn eve(credentials: Credentials) -> Self {
        SsoConfig {
            auth_url: format!("https://{}/v2/oauth/authorize", LOGIN_SERVER),
            token_url: format!("https://{}/v2/oauth/token", LOGIN_SERVER),
            verify_url: VERIFY_URL.to_string(),
            redirect_url: REDIRECT_URL.to_string(),
            listen_on: LISTEN_ON.to_string(),
            credentials,
            scopes: SCOPES.iter().map(|scope| scope.to_string()).collect(),
        }
    }

    /// Path component of the redirect url, the only route the callback server answers.
    pub(crate) fn callback_path(&self) -> Result<String> {
        let url = oauth2::url::Url::parse(&self.redirect_url).map_err(|_| Error::InvalidUrl)?;
        Ok(url.path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn reads_both_credentials() {
        let creds =
            Credentials::from_lookup(lookup(&[("CLIENT_ID", "id"), ("CLIENT_SECRET", "secret")]))
                .unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret, "secret");
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let err =
            Credentials::from_lookup(lookup(&[("CLIENT_ID", ""), ("CLIENT_SECRET", "secret")]))
                .unwrap_err();
        assert!(matches!(err, Error::MissingCredential("CLIENT_ID")));
    }

    #[test]
    fn missing_secret_is_rejected() {
        let err = Credentials::from_lookup(lookup(&[("CLIENT_ID", "id")])).unwrap_err();
        assert!(matches!(err, Error::MissingCredential("CLIENT_SECRET")));
        assert_eq!(err.to_string(), "CLIENT_SECRET must be set");
    }

    #[test]
    fn debug_hides_the_secret() {
        let creds = Credentials {
            client_id: "id".into(),
            client_secret: "hunter2".into(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn eve_defaults() {
        let config = SsoConfig::eve(Credentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
        });
        assert_eq!(config.token_url, "https://login.eveonline.com/v2/oauth/token");
        assert_eq!(config.scopes.len(), 6);
        assert_eq!(config.callback_path().unwrap(), "/oauth/callback");
    }
}
