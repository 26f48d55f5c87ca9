//! Codecs audio et extensions de fichiers déduites des manifestes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Codec audio d'un flux
///
/// Les valeurs non reconnues sont conservées telles quelles dans
/// [`Codec::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Codec {
    Mp3,
    Aac,
    /// Famille AAC basse qualité (`mp4a.40.2`, `mp4a.40.5`)
    Mp4a,
    Flac,
    Mqa,
    /// Dolby Atmos (E-AC-3)
    Eac3,
    Ac4,
    Other(String),
}

const CANONICAL: [Codec; 7] = [
    Codec::Mp3,
    Codec::Aac,
    Codec::Mp4a,
    Codec::Flac,
    Codec::Mqa,
    Codec::Eac3,
    Codec::Ac4,
];

impl Codec {
    /// Nom normalisé (`FLAC`, `MP4A`, ...) ou chaîne brute
    pub fn as_str(&self) -> &str {
        match self {
            Codec::Mp3 => "MP3",
            Codec::Aac => "AAC",
            Codec::Mp4a => "MP4A",
            Codec::Flac => "FLAC",
            Codec::Mqa => "MQA",
            Codec::Eac3 => "EAC3",
            Codec::Ac4 => "AC4",
            Codec::Other(raw) => raw,
        }
    }

    /// Retrouve un codec depuis son nom normalisé (insensible à la casse)
    pub fn from_canonical(name: &str) -> Option<Self> {
        CANONICAL
            .into_iter()
            .find(|codec| codec.as_str().eq_ignore_ascii_case(name))
    }

    /// Normalise l'attribut `codecs` d'une représentation DASH
    ///
    /// `flac` donne [`Codec::Flac`], `mp4a.40.2` et `mp4a.40.5` donnent
    /// [`Codec::Mp4a`], un nom déjà normalisé est conservé, le reste passe tel quel.
    pub fn from_dash_codecs(raw: &str) -> Self {
        if let Some(codec) = Self::from_canonical(raw) {
            return codec;
        }
        let lower = raw.to_ascii_lowercase();
        if lower.contains("flac") {
            Codec::Flac
        } else if lower.contains("mp4a.40.5") || lower.contains("mp4a.40.2") {
            Codec::Mp4a
        } else {
            Codec::Other(raw.to_string())
        }
    }

    /// Normalise le champ `codecs` d'un manifeste BTS
    ///
    /// La valeur est mise en majuscules et tronquée au premier `.`
    /// (`mp4a.40.2` devient `MP4A`).
    pub fn from_bts_codecs(raw: &str) -> Self {
        let upper = raw.to_uppercase();
        let head = upper.split('.').next().unwrap_or_default();
        Self::from_canonical(head).unwrap_or_else(|| Codec::Other(head.to_string()))
    }

    /// Type MIME audio usuel pour ce codec
    pub fn default_mime_type(&self) -> &'static str {
        match self {
            Codec::Mp3 => "audio/mp3",
            Codec::Flac | Codec::Mqa => "audio/x-flac",
            Codec::Eac3 => "audio/eac3",
            Codec::Ac4 => "audio/mp4",
            Codec::Aac | Codec::Mp4a | Codec::Other(_) => "audio/m4a",
        }
    }

    /// Vrai pour les codecs sans perte
    pub fn is_lossless(&self) -> bool {
        matches!(self, Codec::Flac | Codec::Mqa)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension de fichier déduite d'une URL de flux et de son codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileExtension {
    Flac,
    M4a,
    Mp4,
    Ts,
}

impl FileExtension {
    /// Extension avec le point (`.flac`, `.m4a`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            FileExtension::Flac => ".flac",
            FileExtension::M4a => ".m4a",
            FileExtension::Mp4 => ".mp4",
            FileExtension::Ts => ".ts",
        }
    }

    /// Déduit l'extension depuis la première URL du flux
    ///
    /// Ordre de priorité : marqueur FLAC, puis MP4/M4A (ou codec MP4A),
    /// puis MPEG-TS ; `.mp4` à défaut.
    pub fn infer(url: &str, codec: &Codec) -> Self {
        if url.contains(".flac") {
            FileExtension::Flac
        } else if url.contains(".mp4") || url.contains(".m4a") || *codec == Codec::Mp4a {
            FileExtension::M4a
        } else if url.contains(".ts") {
            FileExtension::Ts
        } else {
            FileExtension::Mp4
        }
    }
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_codec_normalization() {
        assert_eq!(Codec::from_dash_codecs("flac"), Codec::Flac);
        assert_eq!(Codec::from_dash_codecs("mp4a.40.2"), Codec::Mp4a);
        assert_eq!(Codec::from_dash_codecs("mp4a.40.5"), Codec::Mp4a);
        assert_eq!(
            Codec::from_dash_codecs("ec-3"),
            Codec::Other("ec-3".to_string())
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in ["flac", "mp4a.40.2", "mp4a.40.5", "ac-4.02.01.00"] {
            let once = Codec::from_dash_codecs(raw);
            let twice = Codec::from_dash_codecs(once.as_str());
            assert_eq!(once, twice, "{raw}");
        }
    }

    #[test]
    fn test_bts_codec_normalization() {
        assert_eq!(Codec::from_bts_codecs("flac"), Codec::Flac);
        assert_eq!(Codec::from_bts_codecs("mp4a.40.2"), Codec::Mp4a);
        assert_eq!(Codec::from_bts_codecs("eac3"), Codec::Eac3);
        assert_eq!(
            Codec::from_bts_codecs("opus.1"),
            Codec::Other("OPUS".to_string())
        );
        assert_eq!(Codec::Flac.to_string(), "FLAC");
    }

    #[test]
    fn test_file_extension_inference() {
        assert_eq!(
            FileExtension::infer("https://cdn/a.flac?token=x", &Codec::Flac),
            FileExtension::Flac
        );
        assert_eq!(
            FileExtension::infer("https://cdn/0.mp4", &Codec::Flac),
            FileExtension::M4a
        );
        assert_eq!(
            FileExtension::infer("https://cdn/stream", &Codec::Mp4a),
            FileExtension::M4a
        );
        assert_eq!(
            FileExtension::infer("https://cdn/seg.ts", &Codec::Aac),
            FileExtension::Ts
        );
        assert_eq!(
            FileExtension::infer("https://cdn/stream", &Codec::Eac3),
            FileExtension::Mp4
        );
        assert_eq!(FileExtension::M4a.to_string(), ".m4a");
    }
}
