use crate::error::{Error, Result};
use serde::Deserialize;

/// Character identity as reported by the ESI verification endpoint.
///
/// `ExpiresOn` and `Scopes` are passed through as the endpoint formats them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct CharacterInfo {
    #[serde(rename = "CharacterID")]
    pub character_id: u64,
    #[serde(rename = "CharacterName")]
    pub character_name: String,
    #[serde(rename = "ExpiresOn")]
    pub expires_on: String,
    #[serde(rename = "Scopes")]
    pub scopes: String,
    #[serde(rename = "TokenType")]
    pub token_type: String,
    #[serde(rename = "CharacterOwnerHash")]
    pub character_owner_hash: String,
}

/// Looks up the character behind `access_token`.
pub(crate) fn fetch_character(verify_url: &str, access_token: &str) -> Result<CharacterInfo> {
    let client = reqwest::blocking::Client::new();
    let response = client
        .get(verify_url)
        .bearer_auth(access_token)
        .send()
        .map_err(Error::Verify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::VerifyStatus(status));
    }

    response.json::<CharacterInfo>().map_err(Error::Verify)
}
