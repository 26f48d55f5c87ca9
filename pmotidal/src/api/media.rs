//! Endpoints média : tracks, vidéos, paroles et sessions de lecture

use super::TidalApi;
use crate::error::Result;
use crate::models::{Lyrics, Quality, Track, Video, VideoQuality};
use crate::stream::Stream;
use serde::Deserialize;
use tracing::debug;

/// Réponse paginée de l'API
#[derive(Debug, Deserialize)]
struct ItemsResponse<T> {
    items: Vec<T>,
}

/// Réponse des endpoints `urlpostpaywall`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamUrls {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub audio_quality: Option<String>,
    #[serde(default)]
    pub video_quality: Option<String>,
    #[serde(default)]
    pub asset_presentation: Option<String>,
}

impl TidalApi {
    /// Récupère une track par son ID
    pub async fn get_track(&self, track_id: &str) -> Result<Track> {
        debug!("Fetching track {}", track_id);
        self.get(&format!("tracks/{}", track_id), &[]).await
    }

    /// Récupère une vidéo par son ID
    pub async fn get_video(&self, video_id: &str) -> Result<Video> {
        debug!("Fetching video {}", video_id);
        self.get(&format!("videos/{}", video_id), &[]).await
    }

    /// Récupère les paroles d'une track
    pub async fn get_lyrics(&self, track_id: &str) -> Result<Lyrics> {
        debug!("Fetching lyrics for track {}", track_id);
        self.get(&format!("tracks/{}/lyrics", track_id), &[]).await
    }

    /// Radio construite autour d'une track
    pub async fn get_track_radio(&self, track_id: &str, limit: u32) -> Result<Vec<Track>> {
        debug!("Fetching radio for track {} (limit {})", track_id, limit);
        let limit = limit.to_string();
        let response: ItemsResponse<Track> = self
            .get(
                &format!("tracks/{}/radio", track_id),
                &[("limit", limit.as_str())],
            )
            .await?;
        Ok(response.items)
    }

    /// URL(s) directes de lecture d'une track
    pub async fn get_track_url(&self, track_id: &str, quality: Quality) -> Result<StreamUrls> {
        debug!("Fetching stream url for track {} ({})", track_id, quality.api_id());
        self.get(
            &format!("tracks/{}/urlpostpaywall", track_id),
            &[
                ("urlusagemode", "STREAM"),
                ("audioquality", quality.api_id()),
                ("assetpresentation", "FULL"),
            ],
        )
        .await
    }

    /// URL(s) directes de lecture d'une vidéo
    pub async fn get_video_url(&self, video_id: &str, quality: VideoQuality) -> Result<StreamUrls> {
        debug!("Fetching stream url for video {} ({})", video_id, quality.api_id());
        self.get(
            &format!("videos/{}/urlpostpaywall", video_id),
            &[
                ("urlusagemode", "STREAM"),
                ("videoquality", quality.api_id()),
                ("assetpresentation", "FULL"),
            ],
        )
        .await
    }

    /// Ouvre une session de lecture et renvoie son descripteur
    pub async fn get_playback_info(&self, track_id: &str, quality: Quality) -> Result<Stream> {
        debug!("Fetching playback info for track {} ({})", track_id, quality.api_id());
        self.get(
            &format!("tracks/{}/playbackinfopostpaywall", track_id),
            &[
                ("audioquality", quality.api_id()),
                ("playbackmode", "STREAM"),
                ("assetpresentation", "FULL"),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_urls_deserialization() {
        let urls: StreamUrls = serde_json::from_value(json!({
            "urls": ["https://cdn/a.flac"],
            "trackId": 1,
            "assetPresentation": "FULL",
            "audioQuality": "LOSSLESS"
        }))
        .unwrap();
        assert_eq!(urls.urls, ["https://cdn/a.flac"]);
        assert_eq!(urls.audio_quality.as_deref(), Some("LOSSLESS"));
        assert!(urls.video_quality.is_none());
    }

    #[test]
    fn test_items_response() {
        let response: ItemsResponse<serde_json::Value> =
            serde_json::from_value(json!({"limit": 2, "items": [1, 2]})).unwrap();
        assert_eq!(response.items.len(), 2);
    }
}
