//! Client principal pour interagir avec l'API TIDAL
//!
//! Ce module fournit un client haut-niveau : métadonnées, URLs directes et
//! résolution des manifestes de streaming.

use crate::api::TidalApi;
use crate::api::media::StreamUrls;
use crate::config_ext::TidalSettings;
use crate::error::{Result, TidalError};
use crate::manifest::StreamManifest;
use crate::models::*;
use crate::stream::Stream;
use pmoconfig::Config;
use tracing::{debug, info};

/// Client TIDAL haut-niveau
pub struct TidalClient {
    /// API bas-niveau
    api: TidalApi,
    /// Qualité audio demandée pour les sessions de lecture
    quality: Quality,
    /// Qualité vidéo demandée
    video_quality: VideoQuality,
}

impl TidalClient {
    /// Crée un client depuis des paramètres explicites
    ///
    /// # Exemple
    ///
    /// ```rust,ignore
    /// use pmotidal::{TidalClient, TidalSettings};
    ///
    /// let settings = TidalSettings::new("client-id").with_access_token("token");
    /// let client = TidalClient::new(settings)?;
    /// let manifest = client.get_stream_manifest("77646168").await?;
    /// println!("{}", manifest.codec());
    /// ```
    pub fn new(settings: TidalSettings) -> Result<Self> {
        info!(
            "Creating TIDAL client (country {}, quality {})",
            settings.country_code,
            settings.quality.api_id()
        );

        Ok(Self {
            api: TidalApi::new(&settings)?,
            quality: settings.quality,
            video_quality: settings.video_quality,
        })
    }

    /// Crée un client depuis un objet Config
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(TidalSettings::from_config(config)?)
    }

    /// Définit la qualité audio par défaut
    pub fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
    }

    /// Retourne la qualité audio configurée
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Définit la qualité vidéo par défaut
    pub fn set_video_quality(&mut self, quality: VideoQuality) {
        self.video_quality = quality;
    }

    pub fn video_quality(&self) -> VideoQuality {
        self.video_quality
    }

    /// Accès à l'API bas-niveau
    pub fn api(&self) -> &TidalApi {
        &self.api
    }

    // ============ Métadonnées ============

    /// Récupère une track par son ID
    pub async fn get_track(&self, track_id: &str) -> Result<Track> {
        self.api.get_track(track_id).await
    }

    /// Récupère une vidéo par son ID
    pub async fn get_video(&self, video_id: &str) -> Result<Video> {
        self.api.get_video(video_id).await
    }

    /// Récupère les paroles d'une track
    pub async fn get_lyrics(&self, track_id: &str) -> Result<Lyrics> {
        self.api.get_lyrics(track_id).await
    }

    /// Radio construite autour d'une track
    pub async fn get_track_radio(&self, track_id: &str, limit: u32) -> Result<Vec<Track>> {
        self.api.get_track_radio(track_id, limit).await
    }

    // ============ Streaming ============

    /// URL directe de lecture d'une track (qualité configurée)
    ///
    /// # Errors
    ///
    /// `TidalError::NotAvailable` si l'API ne renvoie aucune URL.
    pub async fn get_track_url(&self, track_id: &str) -> Result<String> {
        let urls = self.api.get_track_url(track_id, self.quality).await?;
        first_url(urls, "track", track_id)
    }

    /// URL directe de lecture d'une vidéo (qualité vidéo configurée)
    pub async fn get_video_url(&self, video_id: &str) -> Result<String> {
        let urls = self.api.get_video_url(video_id, self.video_quality).await?;
        first_url(urls, "video", video_id)
    }

    /// Ouvre une session de lecture à la qualité configurée
    pub async fn get_stream(&self, track_id: &str) -> Result<Stream> {
        self.get_stream_with_quality(track_id, self.quality).await
    }

    /// Ouvre une session de lecture à une qualité donnée
    pub async fn get_stream_with_quality(&self, track_id: &str, quality: Quality) -> Result<Stream> {
        let stream = self.api.get_playback_info(track_id, quality).await?;
        debug!(
            "Stream for track {}: {} (served {})",
            track_id,
            stream.manifest_mime_type,
            stream.audio_quality.as_deref().unwrap_or("unknown")
        );
        Ok(stream)
    }

    /// Ouvre une session de lecture et décode son manifeste
    pub async fn get_stream_manifest(&self, track_id: &str) -> Result<StreamManifest> {
        let stream = self.get_stream(track_id).await?;
        let manifest = stream.get_stream_manifest()?;
        info!(
            "Resolved manifest for track {}: {} url(s), codec {}",
            track_id,
            manifest.urls().len(),
            manifest.codec()
        );
        Ok(manifest)
    }
}

fn first_url(urls: StreamUrls, kind: &str, id: &str) -> Result<String> {
    urls.urls
        .into_iter()
        .next()
        .ok_or_else(|| TidalError::NotAvailable(format!("no stream url for {} {}", kind, id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_quality() {
        let mut client = TidalClient::new(TidalSettings::new("client")).unwrap();
        assert_eq!(client.quality(), Quality::Lossless);
        client.set_quality(Quality::HiResLossless);
        assert_eq!(client.quality(), Quality::HiResLossless);
        assert_eq!(client.video_quality(), VideoQuality::High);
    }

    #[test]
    fn test_client_from_config_requires_client_id() {
        let config = Config::from_yaml_str("").unwrap();
        assert!(matches!(
            TidalClient::from_config(&config),
            Err(TidalError::Config(_))
        ));
    }

    #[test]
    fn test_first_url_empty() {
        let urls = StreamUrls {
            urls: vec![],
            audio_quality: None,
            video_quality: None,
            asset_presentation: None,
        };
        assert!(matches!(
            first_url(urls, "track", "1"),
            Err(TidalError::NotAvailable(_))
        ));
    }
}
