//! Gestion des erreurs pour le client TIDAL

use thiserror::Error;

/// Type Result personnalisé pour pmotidal
pub type Result<T> = std::result::Result<T, TidalError>;

/// Erreurs possibles lors de l'utilisation du client TIDAL
#[derive(Error, Debug)]
pub enum TidalError {
    /// Le manifeste est illisible (base64, UTF-8, XML, JSON ou structure)
    #[error("Manifest decode error: {0}")]
    ManifestDecode(String),

    /// Type MIME de manifeste inconnu
    #[error("Unknown manifest format: {0}")]
    UnknownManifestFormat(String),

    /// Opération demandée sur la mauvaise variante de manifeste
    #[error("Operation not applicable to this manifest: {0}")]
    FormatNotApplicable(String),

    /// Flux chiffré : seul le passage tel quel est supporté
    #[error("Encrypted stream not supported: {0}")]
    EncryptedManifest(String),

    /// Erreur d'authentification (token invalide ou expiré)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Ressource non trouvée (track, vidéo, etc.)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Erreur de configuration TIDAL (client id, qualité, etc.)
    #[error("TIDAL configuration error: {0}")]
    Configuration(String),

    /// Erreur de l'API TIDAL
    #[error("TIDAL API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    /// Quota dépassé (rate limiting)
    #[error("Rate limit exceeded, please try again later")]
    RateLimitExceeded,

    /// Aucune URL de streaming disponible
    #[error("Stream not available: {0}")]
    NotAvailable(String),

    /// Erreur générique
    #[error("TIDAL error: {0}")]
    Other(String),
}

impl TidalError {
    /// Crée une erreur API depuis un code de statut HTTP et un message
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            429 => Self::RateLimitExceeded,
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::ManifestDecode(message.into())
    }

    /// Vérifie si l'erreur provient de la résolution du manifeste
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            TidalError::ManifestDecode(_)
                | TidalError::UnknownManifestFormat(_)
                | TidalError::FormatNotApplicable(_)
                | TidalError::EncryptedManifest(_)
        )
    }

    /// Vérifie si l'erreur est une erreur d'authentification (401/403)
    pub fn is_auth_error(&self) -> bool {
        matches!(self, TidalError::Unauthorized(_))
    }

    /// Vérifie si l'erreur est une erreur de rate limiting
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, TidalError::RateLimitExceeded)
    }
}
