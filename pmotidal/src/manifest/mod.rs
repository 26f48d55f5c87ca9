//! Résolution des manifestes de streaming
//!
//! L'API renvoie, pour chaque session de lecture, un manifeste opaque encodé
//! en base64 accompagné de son type MIME. Ce module le décode et produit un
//! [`StreamManifest`] :
//!
//! - `application/dash+xml` : MPD MPEG-DASH, dont la `SegmentTimeline` est
//!   développée en liste ordonnée d'URLs de segments ([`DashManifest`]) ;
//! - `application/vnd.tidal.bts` : JSON plat listant directement les URLs
//!   ([`BtsManifest`]).
//!
//! ```rust,ignore
//! use pmotidal::manifest::get_stream_manifest;
//!
//! let manifest = get_stream_manifest(&stream)?;
//! println!("{} ({})", manifest.codec(), manifest.file_extension());
//! if manifest.is_dash() {
//!     std::fs::write("track.m3u8", manifest.hls()?)?;
//! }
//! ```

pub mod bts;
pub mod codec;
pub mod dash;
pub mod decoder;
pub mod hls;

pub use bts::BtsManifest;
pub use codec::{Codec, FileExtension};
pub use dash::{DashManifest, SegmentRun, SegmentTimeline};
pub use decoder::{MIME_BTS, MIME_DASH, ManifestFormat, decode_manifest};

use crate::error::{Result, TidalError};
use crate::stream::Stream;

/// Manifeste de streaming décodé, DASH ou BTS
#[derive(Debug, Clone)]
pub enum StreamManifest {
    Dash(DashManifest),
    Bts(BtsManifest),
}

/// Décode le manifeste d'une session de lecture
///
/// # Errors
///
/// * `TidalError::UnknownManifestFormat` - type MIME non supporté
/// * `TidalError::ManifestDecode` - manifeste illisible ou sans segment
pub fn get_stream_manifest(stream: &Stream) -> Result<StreamManifest> {
    StreamManifest::from_raw(&stream.manifest_mime_type, &stream.manifest)
}

impl StreamManifest {
    /// Décode un manifeste brut (base64) d'après son type MIME
    pub fn from_raw(mime_type: &str, raw: &str) -> Result<Self> {
        let format = ManifestFormat::from_mime_type(mime_type)?;
        let text = decode_manifest(raw)?;
        Self::parse(format, &text)
    }

    /// Parse un manifeste déjà décodé
    pub fn parse(format: ManifestFormat, text: &str) -> Result<Self> {
        match format {
            ManifestFormat::Dash => DashManifest::parse(text).map(StreamManifest::Dash),
            ManifestFormat::Bts => BtsManifest::parse(text).map(StreamManifest::Bts),
        }
    }

    pub fn format(&self) -> ManifestFormat {
        match self {
            StreamManifest::Dash(_) => ManifestFormat::Dash,
            StreamManifest::Bts(_) => ManifestFormat::Bts,
        }
    }

    pub fn is_dash(&self) -> bool {
        matches!(self, StreamManifest::Dash(_))
    }

    pub fn is_bts(&self) -> bool {
        matches!(self, StreamManifest::Bts(_))
    }

    /// Accès à la variante DASH
    pub fn as_dash(&self) -> Option<&DashManifest> {
        match self {
            StreamManifest::Dash(dash) => Some(dash),
            StreamManifest::Bts(_) => None,
        }
    }

    /// Accès à la variante BTS
    pub fn as_bts(&self) -> Option<&BtsManifest> {
        match self {
            StreamManifest::Bts(bts) => Some(bts),
            StreamManifest::Dash(_) => None,
        }
    }

    /// URLs dans l'ordre de lecture (jamais vide)
    pub fn urls(&self) -> &[String] {
        match self {
            StreamManifest::Dash(dash) => dash.urls(),
            StreamManifest::Bts(bts) => bts.urls(),
        }
    }

    pub fn codec(&self) -> &Codec {
        match self {
            StreamManifest::Dash(dash) => dash.codec(),
            StreamManifest::Bts(bts) => bts.codec(),
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            StreamManifest::Dash(dash) => dash.mime_type(),
            StreamManifest::Bts(bts) => bts.mime_type(),
        }
    }

    pub fn encryption_type(&self) -> &str {
        match self {
            StreamManifest::Dash(dash) => dash.encryption_type(),
            StreamManifest::Bts(bts) => bts.encryption_type(),
        }
    }

    pub fn encryption_key(&self) -> Option<&str> {
        match self {
            StreamManifest::Dash(dash) => dash.encryption_key(),
            StreamManifest::Bts(bts) => bts.encryption_key(),
        }
    }

    /// Vrai si une clé de chiffrement est présente
    ///
    /// Un flux DASH protégé sans `default_KID` renvoie `false` ; tester
    /// [`StreamManifest::encryption_type`] (différent de `NONE`) pour savoir
    /// si le flux est chiffré.
    pub fn is_encrypted(&self) -> bool {
        self.encryption_key().is_some()
    }

    /// Extension déduite de la première URL et du codec
    pub fn file_extension(&self) -> FileExtension {
        let first = self.urls().first().map(String::as_str).unwrap_or_default();
        FileExtension::infer(first, self.codec())
    }

    /// Fréquence d'échantillonnage annoncée par le MPD (BTS : toujours `None`)
    pub fn sample_rate(&self) -> Option<u32> {
        self.as_dash().and_then(DashManifest::sample_rate)
    }

    /// Playlist HLS synthétisée depuis la timeline DASH
    ///
    /// # Errors
    ///
    /// * `TidalError::FormatNotApplicable` - manifeste BTS (pas de timeline)
    /// * `TidalError::EncryptedManifest` - flux DASH chiffré
    pub fn hls(&self) -> Result<String> {
        match self {
            StreamManifest::Dash(dash) => dash.hls(),
            StreamManifest::Bts(_) => Err(TidalError::FormatNotApplicable(
                "HLS synthesis requires a DASH manifest".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    const BTS_FLAC: &str = r#"{"urls":["https://cdn/a.flac"],"codecs":"flac","mimeType":"audio/flac","encryptionType":"NONE"}"#;

    #[test]
    fn test_bts_scenario() {
        let manifest = StreamManifest::from_raw(MIME_BTS, &STANDARD.encode(BTS_FLAC)).unwrap();

        assert!(manifest.is_bts());
        assert_eq!(manifest.urls(), ["https://cdn/a.flac"]);
        assert_eq!(manifest.codec().as_str(), "FLAC");
        assert_eq!(manifest.mime_type(), "audio/flac");
        assert_eq!(manifest.file_extension(), FileExtension::Flac);
        assert_eq!(manifest.file_extension().as_str(), ".flac");
        assert!(!manifest.is_encrypted());
        assert_eq!(manifest.sample_rate(), None);
    }

    #[test]
    fn test_hls_on_bts_is_not_applicable() {
        let manifest = StreamManifest::parse(ManifestFormat::Bts, BTS_FLAC).unwrap();
        assert!(matches!(
            manifest.hls(),
            Err(TidalError::FormatNotApplicable(_))
        ));
    }

    #[test]
    fn test_unknown_mime_type() {
        assert!(matches!(
            StreamManifest::from_raw("video/mp2t", &STANDARD.encode(BTS_FLAC)),
            Err(TidalError::UnknownManifestFormat(_))
        ));
    }

    #[test]
    fn test_malformed_base64() {
        assert!(matches!(
            StreamManifest::from_raw(MIME_DASH, "%%% not base64 %%%"),
            Err(TidalError::ManifestDecode(_))
        ));
    }
}
