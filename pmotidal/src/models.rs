//! Structures de données pour représenter les objets TIDAL

use crate::error::{Result, TidalError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Gabarit des URLs d'images TIDAL (l'identifiant d'image utilise `/` au lieu de `-`)
const IMAGE_URL: &str = "https://resources.tidal.com/images";

/// Résolutions disponibles pour les images de vidéos
const VIDEO_IMAGE_SIZES: [(u32, u32); 4] = [(160, 107), (480, 320), (750, 500), (1080, 720)];

/// Désérialiseur flexible pour les IDs qui peuvent être des strings ou des integers
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::custom("ID must be a string or number")),
    }
}

/// Variante optionnelle de [`deserialize_id`]
fn deserialize_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(Error::custom("ID must be a string or number")),
    }
}

/// Parse une date TIDAL (`2014-10-27T00:00:00.000+0000` ou RFC 3339)
pub(crate) fn parse_tidal_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Désérialiseur pour les dates optionnelles ; une date illisible vaut `None`
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_tidal_date))
}

/// Qualité audio demandée pour le streaming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quality {
    /// AAC 96 kbps
    Low,
    /// AAC 320 kbps
    High,
    /// FLAC 16 bit / 44.1 kHz
    #[default]
    Lossless,
    /// FLAC jusqu'à 24 bit / 192 kHz
    HiResLossless,
}

impl Quality {
    /// Retourne l'identifiant attendu par l'API
    pub fn api_id(&self) -> &'static str {
        match self {
            Quality::Low => "LOW",
            Quality::High => "HIGH",
            Quality::Lossless => "LOSSLESS",
            Quality::HiResLossless => "HI_RES_LOSSLESS",
        }
    }

    /// Retrouve une qualité depuis son identifiant API (insensible à la casse)
    pub fn from_api_id(id: &str) -> Option<Self> {
        [Self::Low, Self::High, Self::Lossless, Self::HiResLossless]
            .into_iter()
            .find(|q| q.api_id().eq_ignore_ascii_case(id))
    }
}

/// Qualité vidéo demandée pour le streaming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoQuality {
    #[default]
    High,
    Medium,
    Low,
    AudioOnly,
}

impl VideoQuality {
    /// Retourne l'identifiant attendu par l'API
    pub fn api_id(&self) -> &'static str {
        match self {
            VideoQuality::High => "HIGH",
            VideoQuality::Medium => "MEDIUM",
            VideoQuality::Low => "LOW",
            VideoQuality::AudioOnly => "AUDIO_ONLY",
        }
    }

    /// Retrouve une qualité depuis son identifiant API (insensible à la casse)
    pub fn from_api_id(id: &str) -> Option<Self> {
        [Self::High, Self::Medium, Self::Low, Self::AudioOnly]
            .into_iter()
            .find(|q| q.api_id().eq_ignore_ascii_case(id))
    }
}

/// Mode audio d'un flux
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioMode {
    #[default]
    Stereo,
    DolbyAtmos,
    /// Mode non géré par ce client (ex: `SONY_360RA`)
    #[serde(other)]
    Unknown,
}

/// Représente un artiste TIDAL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artist {
    /// Identifiant unique de l'artiste
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Nom de l'artiste
    pub name: String,
    /// Rôle de l'artiste sur le média (MAIN, FEATURED, ...)
    #[serde(default, rename = "type")]
    pub role: Option<String>,
    /// Identifiant de l'image de l'artiste
    #[serde(default)]
    pub picture: Option<String>,
}

impl Artist {
    /// Crée un nouvel artiste avec un ID et un nom
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: None,
            picture: None,
        }
    }
}

/// Référence d'album telle qu'embarquée dans une track ou une vidéo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumRef {
    /// Identifiant unique de l'album
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Titre de l'album
    pub title: String,
    /// Identifiant de la pochette
    #[serde(default)]
    pub cover: Option<String>,
}

impl AlbumRef {
    /// URL de la pochette pour une taille carrée donnée (ex: 640)
    pub fn cover_url(&self, size: u32) -> Option<String> {
        self.cover.as_deref().map(|cover| image_url(cover, size, size))
    }
}

/// Représente une piste (track) TIDAL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Identifiant unique de la piste
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Titre de la piste
    pub title: String,
    /// Durée en secondes
    #[serde(default)]
    pub duration: u32,
    /// Indique si la piste est disponible pour le streaming
    #[serde(default)]
    pub stream_ready: bool,
    /// Date de mise à disposition sur TIDAL (absente pour les médias retirés)
    #[serde(default, deserialize_with = "deserialize_date")]
    pub stream_start_date: Option<DateTime<Utc>>,
    /// Date d'ajout par l'utilisateur (playlists et favoris)
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date_added: Option<DateTime<Utc>>,
    /// Numéro de piste
    #[serde(default)]
    pub track_number: u32,
    /// Numéro de disque
    #[serde(default = "default_volume")]
    pub volume_number: u32,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub popularity: Option<u32>,
    /// Artiste principal (parfois absent, voir [`Track::main_artist`])
    #[serde(default)]
    pub artist: Option<Artist>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub replay_gain: Option<f64>,
    #[serde(default)]
    pub peak: Option<f64>,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    /// Qualité maximale annoncée (brute, l'API introduit parfois de nouvelles valeurs)
    #[serde(default)]
    pub audio_quality: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl Track {
    /// Retourne l'artiste principal, ou le premier de la liste à défaut
    pub fn main_artist(&self) -> Option<&Artist> {
        self.artist.as_ref().or_else(|| self.artists.first())
    }

    /// Retourne le nom de l'album si disponible
    pub fn album_name(&self) -> Option<&str> {
        self.album.as_ref().map(|a| a.title.as_str())
    }

    /// Vérifie si la piste est disponible pour le streaming
    pub fn is_available(&self) -> bool {
        self.stream_ready
    }

    /// Qualité maximale annoncée, si elle est connue de ce client
    pub fn quality(&self) -> Option<Quality> {
        self.audio_quality.as_deref().and_then(Quality::from_api_id)
    }

    /// Titre complet, version incluse (ex: "Song (Remastered)")
    pub fn full_title(&self) -> String {
        match self.version.as_deref() {
            Some(version) if !version.is_empty() => format!("{} ({})", self.title, version),
            _ => self.title.clone(),
        }
    }
}

/// Représente une vidéo TIDAL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub stream_ready: bool,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub stream_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default = "default_volume")]
    pub volume_number: u32,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub artist: Option<Artist>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    /// Identifiant de l'image de la vidéo
    #[serde(default)]
    pub image_id: Option<String>,
    /// Qualité vidéo (absente pour les vidéos des pages éditoriales)
    #[serde(default)]
    pub quality: Option<String>,
}

impl Video {
    /// Retourne l'artiste principal, ou le premier de la liste à défaut
    pub fn main_artist(&self) -> Option<&Artist> {
        self.artist.as_ref().or_else(|| self.artists.first())
    }

    /// URL de l'image de la vidéo
    ///
    /// # Errors
    ///
    /// * `TidalError::Other` - résolution non proposée par TIDAL
    /// * `TidalError::NotAvailable` - la vidéo n'a pas d'image
    pub fn image_url(&self, width: u32, height: u32) -> Result<String> {
        if !VIDEO_IMAGE_SIZES.contains(&(width, height)) {
            return Err(TidalError::Other(format!(
                "Invalid resolution {} x {}",
                width, height
            )));
        }
        let image_id = self
            .image_id
            .as_deref()
            .ok_or_else(|| TidalError::NotAvailable(format!("video {} has no image", self.id)))?;
        Ok(image_url(image_id, width, height))
    }
}

/// Paroles d'une piste
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lyrics {
    #[serde(deserialize_with = "deserialize_id")]
    pub track_id: String,
    #[serde(default)]
    pub lyrics_provider: String,
    #[serde(
        default,
        rename = "providerCommontrackId",
        deserialize_with = "deserialize_opt_id"
    )]
    pub provider_track_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub provider_lyrics_id: Option<String>,
    /// Texte brut
    #[serde(default, rename = "lyrics")]
    pub text: String,
    /// Paroles horodatées (format LRC)
    #[serde(default)]
    pub subtitles: Option<String>,
    #[serde(default, rename = "isRightToLeft")]
    pub right_to_left: bool,
}

fn default_volume() -> u32 {
    1
}

fn image_url(image_id: &str, width: u32, height: u32) -> String {
    format!(
        "{}/{}/{}x{}.jpg",
        IMAGE_URL,
        image_id.replace('-', "/"),
        width,
        height
    )
}
