//! Décodage du manifeste brut et choix du format

use crate::error::{Result, TidalError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Type MIME des manifestes MPEG-DASH
pub const MIME_DASH: &str = "application/dash+xml";
/// Type MIME des manifestes BTS (JSON propriétaire)
pub const MIME_BTS: &str = "application/vnd.tidal.bts";

/// Format d'un manifeste, déterminé par son type MIME
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Dash,
    Bts,
}

impl ManifestFormat {
    /// Choisit le format depuis le type MIME exact annoncé par l'API
    ///
    /// Aucune détection sur le contenu n'est faite.
    pub fn from_mime_type(mime_type: &str) -> Result<Self> {
        match mime_type {
            MIME_DASH => Ok(ManifestFormat::Dash),
            MIME_BTS => Ok(ManifestFormat::Bts),
            other => Err(TidalError::UnknownManifestFormat(other.to_string())),
        }
    }

    /// Type MIME associé
    pub fn mime_type(&self) -> &'static str {
        match self {
            ManifestFormat::Dash => MIME_DASH,
            ManifestFormat::Bts => MIME_BTS,
        }
    }
}

/// Décode un manifeste base64 en texte UTF-8
pub fn decode_manifest(raw: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|e| TidalError::decode(format!("invalid base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| TidalError::decode(format!("invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dispatch() {
        assert_eq!(
            ManifestFormat::from_mime_type("application/dash+xml").unwrap(),
            ManifestFormat::Dash
        );
        assert_eq!(
            ManifestFormat::from_mime_type("application/vnd.tidal.bts").unwrap(),
            ManifestFormat::Bts
        );
        // Le type doit correspondre exactement
        assert!(matches!(
            ManifestFormat::from_mime_type("Application/Dash+XML"),
            Err(TidalError::UnknownManifestFormat(_))
        ));
        assert!(matches!(
            ManifestFormat::from_mime_type("application/vnd.tidal.emu"),
            Err(TidalError::UnknownManifestFormat(_))
        ));
    }

    #[test]
    fn test_decode_manifest() {
        let encoded = STANDARD.encode("{\"urls\":[]}");
        assert_eq!(decode_manifest(&encoded).unwrap(), "{\"urls\":[]}");
        assert_eq!(decode_manifest(&format!(" {}\n", encoded)).unwrap(), "{\"urls\":[]}");
    }

    #[test]
    fn test_decode_manifest_errors() {
        assert!(matches!(
            decode_manifest("not base64 !!"),
            Err(TidalError::ManifestDecode(_))
        ));
        let invalid_utf8 = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(
            decode_manifest(&invalid_utf8),
            Err(TidalError::ManifestDecode(_))
        ));
    }
}
