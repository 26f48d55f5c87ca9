//! Session de lecture renvoyée par `playbackinfopostpaywall`

use crate::error::Result;
use crate::manifest::{self, MIME_BTS, MIME_DASH, StreamManifest};
use crate::models::{AudioMode, deserialize_id};
use serde::{Deserialize, Serialize};

/// Descripteur d'une session de lecture d'une track
///
/// Construit une fois depuis la réponse de l'API et jamais modifié ensuite.
/// Le manifeste reste encodé tant que [`Stream::get_stream_manifest`] n'est
/// pas appelé.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    #[serde(deserialize_with = "deserialize_id")]
    pub track_id: String,
    #[serde(default)]
    pub audio_mode: AudioMode,
    /// Qualité effectivement servie (peut être inférieure à celle demandée)
    #[serde(default)]
    pub audio_quality: Option<String>,
    #[serde(default)]
    pub asset_presentation: Option<String>,
    pub manifest_mime_type: String,
    #[serde(default)]
    pub manifest_hash: Option<String>,
    /// Manifeste encodé en base64
    pub manifest: String,
    #[serde(default)]
    pub album_replay_gain: Option<f64>,
    #[serde(default)]
    pub album_peak_amplitude: Option<f64>,
    #[serde(default)]
    pub track_replay_gain: Option<f64>,
    #[serde(default)]
    pub track_peak_amplitude: Option<f64>,
    #[serde(default)]
    pub bit_depth: Option<u32>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

impl Stream {
    /// Construit un descripteur depuis la réponse JSON de l'API
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn is_mpd(&self) -> bool {
        self.manifest_mime_type == MIME_DASH
    }

    pub fn is_bts(&self) -> bool {
        self.manifest_mime_type == MIME_BTS
    }

    /// Décode le manifeste de la session
    pub fn get_stream_manifest(&self) -> Result<StreamManifest> {
        manifest::get_stream_manifest(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_from_playback_info() {
        let stream = Stream::from_json(json!({
            "trackId": 77646168,
            "assetPresentation": "FULL",
            "audioMode": "DOLBY_ATMOS",
            "audioQuality": "LOW",
            "manifestMimeType": "application/dash+xml",
            "manifestHash": "abc=",
            "manifest": "PE1QRC8+",
            "albumReplayGain": -9.63,
            "albumPeakAmplitude": 1.0,
            "trackReplayGain": -8.46,
            "trackPeakAmplitude": 0.98,
            "bitDepth": null,
            "sampleRate": null
        }))
        .unwrap();

        assert_eq!(stream.track_id, "77646168");
        assert_eq!(stream.audio_mode, AudioMode::DolbyAtmos);
        assert!(stream.is_mpd());
        assert!(!stream.is_bts());
        assert_eq!(stream.bit_depth, None);
        assert_eq!(stream.track_replay_gain, Some(-8.46));
    }

    #[test]
    fn test_stream_with_unhandled_audio_mode() {
        let stream = Stream::from_json(json!({
            "trackId": 1,
            "audioMode": "SONY_360RA",
            "manifestMimeType": "application/vnd.tidal.bts",
            "manifest": "e30="
        }))
        .unwrap();
        assert_eq!(stream.audio_mode, AudioMode::Unknown);
        assert!(stream.is_bts());
    }

    #[test]
    fn test_stream_requires_manifest() {
        assert!(Stream::from_json(json!({
            "trackId": 1,
            "manifestMimeType": "application/vnd.tidal.bts"
        }))
        .is_err());
    }
}
