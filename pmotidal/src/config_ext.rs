//! Extension pour intégrer la configuration TIDAL dans pmoconfig
//!
//! Ce module fournit le trait `TidalConfigExt`, qui ajoute à
//! `pmoconfig::Config` la lecture des paramètres TIDAL, et `TidalSettings`,
//! la valeur de configuration explicite injectée dans le client.

use crate::models::{Quality, VideoQuality};
use anyhow::{Result, anyhow};
use pmoconfig::Config;
use serde_yaml::Value;
use std::time::Duration;

/// URL de base de l'API TIDAL
pub const DEFAULT_API_BASE_URL: &str = "https://api.tidal.com/v1";
/// Pays utilisé à défaut (conditionne la disponibilité du catalogue)
pub const DEFAULT_COUNTRY_CODE: &str = "US";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Paramètres du client TIDAL
///
/// Les identifiants sont des entrées de configuration : rien n'est embarqué
/// dans le code.
#[derive(Debug, Clone, PartialEq)]
pub struct TidalSettings {
    /// Client ID de l'application, envoyé quand aucun token n'est disponible
    pub client_id: String,
    /// Token OAuth (Bearer) obtenu hors de cette crate
    pub access_token: Option<String>,
    pub country_code: String,
    pub quality: Quality,
    pub video_quality: VideoQuality,
    pub api_base_url: String,
    pub timeout: Duration,
}

impl TidalSettings {
    /// Crée des paramètres par défaut pour un client ID
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            access_token: None,
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            quality: Quality::default(),
            video_quality: VideoQuality::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_video_quality(mut self, quality: VideoQuality) -> Self {
        self.video_quality = quality;
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Lit les paramètres depuis la configuration
    ///
    /// # Errors
    ///
    /// Retourne une erreur si le client ID n'est pas configuré ou si une
    /// qualité configurée est inconnue.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut settings = Self::new(config.get_tidal_client_id()?)
            .with_country_code(config.get_tidal_country_code())
            .with_quality(config.get_tidal_quality()?)
            .with_video_quality(config.get_tidal_video_quality()?)
            .with_api_base_url(config.get_tidal_api_base_url())
            .with_timeout(config.get_tidal_timeout());
        settings.access_token = config.get_tidal_access_token();
        Ok(settings)
    }
}

/// Trait d'extension pour gérer la configuration TIDAL dans pmoconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use pmoconfig::Config;
/// use pmotidal::TidalConfigExt;
///
/// let config = Config::load_config("")?;
/// let quality = config.get_tidal_quality()?;
/// println!("TIDAL quality: {}", quality.api_id());
/// ```
pub trait TidalConfigExt {
    /// Récupère le client ID TIDAL
    ///
    /// # Errors
    ///
    /// Retourne une erreur si le client ID n'est pas configuré
    fn get_tidal_client_id(&self) -> Result<String>;

    /// Définit le client ID TIDAL
    fn set_tidal_client_id(&self, client_id: &str) -> Result<()>;

    /// Récupère le token d'accès, ou None si non configuré
    fn get_tidal_access_token(&self) -> Option<String>;

    /// Définit le token d'accès
    fn set_tidal_access_token(&self, token: &str) -> Result<()>;

    /// Code pays ISO à deux lettres (défaut : `US`)
    fn get_tidal_country_code(&self) -> String;

    /// Qualité audio demandée (défaut : `LOSSLESS`)
    fn get_tidal_quality(&self) -> Result<Quality>;

    fn set_tidal_quality(&self, quality: Quality) -> Result<()>;

    /// Qualité vidéo demandée (défaut : `HIGH`)
    fn get_tidal_video_quality(&self) -> Result<VideoQuality>;

    fn get_tidal_api_base_url(&self) -> String;

    /// Timeout des requêtes HTTP
    fn get_tidal_timeout(&self) -> Duration;
}

impl TidalConfigExt for Config {
    fn get_tidal_client_id(&self) -> Result<String> {
        self.get_string(&["accounts", "tidal", "client_id"])
            .ok_or_else(|| anyhow!("TIDAL client_id not configured"))
    }

    fn set_tidal_client_id(&self, client_id: &str) -> Result<()> {
        self.set_value(
            &["accounts", "tidal", "client_id"],
            Value::String(client_id.to_string()),
        )
    }

    fn get_tidal_access_token(&self) -> Option<String> {
        self.get_string(&["accounts", "tidal", "access_token"])
    }

    fn set_tidal_access_token(&self, token: &str) -> Result<()> {
        self.set_value(
            &["accounts", "tidal", "access_token"],
            Value::String(token.to_string()),
        )
    }

    fn get_tidal_country_code(&self) -> String {
        self.get_string(&["sources", "tidal", "country_code"])
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string())
    }

    fn get_tidal_quality(&self) -> Result<Quality> {
        match self.get_string(&["sources", "tidal", "quality"]) {
            Some(id) => {
                Quality::from_api_id(&id).ok_or_else(|| anyhow!("Unknown TIDAL quality '{}'", id))
            }
            None => Ok(Quality::default()),
        }
    }

    fn set_tidal_quality(&self, quality: Quality) -> Result<()> {
        self.set_value(
            &["sources", "tidal", "quality"],
            Value::String(quality.api_id().to_string()),
        )
    }

    fn get_tidal_video_quality(&self) -> Result<VideoQuality> {
        match self.get_string(&["sources", "tidal", "video_quality"]) {
            Some(id) => VideoQuality::from_api_id(&id)
                .ok_or_else(|| anyhow!("Unknown TIDAL video quality '{}'", id)),
            None => Ok(VideoQuality::default()),
        }
    }

    fn get_tidal_api_base_url(&self) -> String {
        self.get_string(&["sources", "tidal", "api_base_url"])
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    fn get_tidal_timeout(&self) -> Duration {
        match self.get_value(&["sources", "tidal", "timeout_secs"]) {
            Ok(Value::Number(n)) => n
                .as_u64()
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = Config::from_yaml_str(
            "accounts:\n  tidal:\n    client_id: test-client-id\n    access_token: tok\nsources:\n  tidal:\n    country_code: SE\n    quality: HI_RES_LOSSLESS\n",
        )
        .unwrap();

        let settings = TidalSettings::from_config(&config).unwrap();
        assert_eq!(settings.client_id, "test-client-id");
        assert_eq!(settings.access_token.as_deref(), Some("tok"));
        assert_eq!(settings.country_code, "SE");
        assert_eq!(settings.quality, Quality::HiResLossless);
        assert_eq!(settings.video_quality, VideoQuality::High);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_missing_client_id() {
        let config = Config::from_yaml_str("").unwrap();
        assert!(TidalSettings::from_config(&config).is_err());
        assert!(config.get_tidal_access_token().is_none());
    }

    #[test]
    fn test_unknown_quality() {
        let config = Config::from_yaml_str("sources:\n  tidal:\n    quality: ULTRA\n").unwrap();
        assert!(config.get_tidal_quality().is_err());

        config.set_tidal_quality(Quality::High).unwrap();
        assert_eq!(config.get_tidal_quality().unwrap(), Quality::High);
    }
}
