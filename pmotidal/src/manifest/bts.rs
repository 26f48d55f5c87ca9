//! Parser des manifestes BTS (JSON plat)

use super::codec::Codec;
use super::dash::ENCRYPTION_NONE;
use crate::error::{Result, TidalError};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BtsPayload {
    urls: Vec<String>,
    codecs: String,
    mime_type: String,
    encryption_type: String,
    #[serde(default)]
    key_id: Option<String>,
}

/// Manifeste BTS décodé
#[derive(Debug, Clone)]
pub struct BtsManifest {
    urls: Vec<String>,
    codec: Codec,
    mime_type: String,
    encryption_type: String,
    encryption_key: Option<String>,
}

impl BtsManifest {
    /// Parse le texte JSON d'un manifeste BTS
    ///
    /// # Errors
    ///
    /// `TidalError::ManifestDecode` si une clé obligatoire manque ou si la
    /// liste d'URLs est vide.
    pub fn parse(json: &str) -> Result<Self> {
        let payload: BtsPayload = serde_json::from_str(json)
            .map_err(|e| TidalError::decode(format!("invalid BTS manifest: {}", e)))?;

        if payload.urls.is_empty() {
            return Err(TidalError::decode("BTS manifest has no URL"));
        }

        let encrypted =
            !payload.encryption_type.is_empty() && payload.encryption_type != ENCRYPTION_NONE;
        let encryption_key = if encrypted { payload.key_id } else { None };
        let codec = Codec::from_bts_codecs(&payload.codecs);

        debug!(
            "Parsed BTS manifest: {} url(s), codec {}, encryption {}",
            payload.urls.len(),
            codec,
            payload.encryption_type
        );

        Ok(Self {
            urls: payload.urls,
            codec,
            mime_type: payload.mime_type,
            encryption_type: payload.encryption_type,
            encryption_key,
        })
    }

    /// URLs du flux ; en pratique seule la première est utilisée
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn encryption_type(&self) -> &str {
        &self.encryption_type
    }

    pub fn encryption_key(&self) -> Option<&str> {
        self.encryption_key.as_deref()
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption_key.is_some()
    }
}
