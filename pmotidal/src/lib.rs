//! # pmotidal - Client TIDAL pour PMOMusic
//!
//! Cette crate fournit un client Rust pour l'API TIDAL, centré sur la
//! résolution des manifestes de streaming : une session de lecture renvoie un
//! manifeste opaque (MPEG-DASH ou BTS) que la crate transforme en liste
//! ordonnée d'URLs, codec, extension de fichier et playlist HLS.
//!
//! ## Vue d'ensemble
//!
//! `pmotidal` permet :
//! - Le décodage des manifestes DASH (`application/dash+xml`) et BTS
//!   (`application/vnd.tidal.bts`)
//! - Le développement de la `SegmentTimeline` DASH en URLs de segments
//! - L'inférence du codec et de l'extension de fichier
//! - La synthèse d'une playlist HLS pour les flux DASH non chiffrés
//! - L'accès aux métadonnées (tracks, vidéos, paroles, radios)
//!
//! ## Architecture
//!
//! La crate suit le pattern d'extension des autres crates PMO :
//! - `TidalClient` : Client principal
//! - `manifest` : Décodage et résolution des manifestes (sans I/O)
//! - `stream` : Descripteur de session de lecture
//! - `models` : Structures de données (Track, Video, Lyrics, etc.)
//! - `api` : Couche d'accès à l'API REST TIDAL
//! - `config_ext` : Intégration avec pmoconfig
//!
//! ## Structure des modules
//!
//! ```text
//! pmotidal/
//! ├── src/
//! │   ├── lib.rs              # Module principal (ce fichier)
//! │   ├── client.rs           # Client TIDAL principal
//! │   ├── config_ext.rs       # Extension pmoconfig
//! │   ├── models.rs           # Structures de données
//! │   ├── stream.rs           # Session de lecture
//! │   ├── api/
//! │   │   ├── mod.rs          # API client
//! │   │   └── media.rs        # Tracks, vidéos, sessions
//! │   ├── manifest/
//! │   │   ├── mod.rs          # StreamManifest
//! │   │   ├── decoder.rs      # Type MIME et base64
//! │   │   ├── dash.rs         # MPD et SegmentTimeline
//! │   │   ├── bts.rs          # Manifeste BTS
//! │   │   ├── codec.rs        # Codec et extension
//! │   │   └── hls.rs          # Synthèse M3U8
//! │   └── error.rs            # Gestion des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ### Résolution d'un manifeste déjà récupéré
//!
//! ```rust,ignore
//! use pmotidal::Stream;
//!
//! let stream = Stream::from_json(playback_info)?;
//! let manifest = stream.get_stream_manifest()?;
//! for url in manifest.urls() {
//!     println!("{}", url);
//! }
//! println!("extension: {}", manifest.file_extension());
//! ```
//!
//! ### Client configuré depuis pmoconfig
//!
//! ```rust,ignore
//! use pmoconfig::Config;
//! use pmotidal::TidalClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_config("")?;
//!     let client = TidalClient::from_config(&config)?;
//!
//!     let manifest = client.get_stream_manifest("77646168").await?;
//!     if manifest.is_dash() {
//!         std::fs::write("track.m3u8", manifest.hls()?)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```yaml
//! accounts:
//!   tidal:
//!     client_id: "..."
//!     access_token: "..."
//! sources:
//!   tidal:
//!     country_code: "US"
//!     quality: "LOSSLESS"
//! ```

pub mod api;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod manifest;
pub mod models;
pub mod stream;

pub use api::TidalApi;
pub use api::media::StreamUrls;
pub use client::TidalClient;
pub use config_ext::{TidalConfigExt, TidalSettings};
pub use error::{Result, TidalError};
pub use manifest::{
    BtsManifest, Codec, DashManifest, FileExtension, ManifestFormat, StreamManifest,
    get_stream_manifest,
};
pub use models::{AlbumRef, Artist, AudioMode, Lyrics, Quality, Track, Video, VideoQuality};
pub use stream::Stream;
