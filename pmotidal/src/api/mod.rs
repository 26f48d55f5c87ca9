//! Couche d'accès à l'API REST TIDAL
//!
//! Ce module fournit une interface bas-niveau pour communiquer avec l'API v1
//! de TIDAL. L'authentification (OAuth) est hors périmètre : le token est
//! fourni par la configuration.

pub mod media;

use crate::config_ext::TidalSettings;
use crate::error::{Result, TidalError};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Client API bas-niveau pour communiquer avec TIDAL
pub struct TidalApi {
    /// Client HTTP
    client: Client,
    /// URL de base (surchargée dans les tests)
    base_url: String,
    /// Client ID de l'application
    client_id: String,
    /// Token OAuth de l'utilisateur
    access_token: Option<String>,
    /// Code pays ajouté à chaque requête
    country_code: String,
}

impl TidalApi {
    /// Crée une nouvelle instance de l'API
    pub fn new(settings: &TidalSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent("TIDAL_ANDROID/1039 okhttp/3.14.9")
            .build()?;

        Ok(Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            client_id: settings.client_id.clone(),
            access_token: settings.access_token.clone(),
            country_code: settings.country_code.clone(),
        })
    }

    /// Définit le token d'accès
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Effectue une requête GET à l'API
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));

        debug!("GET {} with {} params", url, params.len());

        let mut request = self
            .client
            .get(&url)
            .query(&[("countryCode", self.country_code.as_str())])
            .query(params);

        request = match self.access_token {
            Some(ref token) => request.bearer_auth(token),
            None => request.header("X-Tidal-Token", &self.client_id),
        };

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Traite la réponse HTTP
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let status_code = status.as_u16();

        debug!("Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = user_message(&error_text).unwrap_or(error_text);
            warn!("API error ({}): {}", status_code, message);
            return Err(TidalError::from_status_code(status_code, message));
        }

        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            TidalError::JsonParse(e)
        })
    }
}

/// Extrait le champ `userMessage` d'un corps d'erreur TIDAL
fn user_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("userMessage")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_creation() {
        let settings = TidalSettings::new("client").with_api_base_url("http://localhost/v1/");
        let api = TidalApi::new(&settings).unwrap();
        assert_eq!(api.client_id(), "client");
        assert_eq!(api.base_url(), "http://localhost/v1");
        assert_eq!(api.country_code(), "US");
        assert!(api.access_token().is_none());
    }

    #[test]
    fn test_set_access_token() {
        let mut api = TidalApi::new(&TidalSettings::new("client")).unwrap();
        api.set_access_token("token");
        assert_eq!(api.access_token(), Some("token"));
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            user_message(r#"{"status":404,"subStatus":2001,"userMessage":"Track not found"}"#),
            Some("Track not found".to_string())
        );
        assert_eq!(user_message("<html>"), None);
    }
}
