//! Parser des manifestes MPEG-DASH (MPD)
//!
//! TIDAL livre des MPD à une seule piste : une période, un adaptation set,
//! une représentation et un `SegmentTemplate` à `SegmentTimeline`. Cette
//! forme est vérifiée une fois à l'entrée du parsing ; seul le premier
//! élément de chaque niveau est lu.

use super::codec::Codec;
use crate::error::{Result, TidalError};
use serde::Deserialize;
use tracing::debug;

/// Valeur de `encryption_type` pour un flux en clair
pub const ENCRYPTION_NONE: &str = "NONE";

const NUMBER_TOKEN: &str = "$Number$";
const REPRESENTATION_ID_TOKEN: &str = "$RepresentationID$";

/// Nombre maximal de segments accepté pour une timeline
pub const MAX_SEGMENTS: usize = 100_000;

// ============= Structures XML =============

#[derive(Debug, Deserialize)]
struct Mpd {
    #[serde(rename = "@mediaPresentationDuration", default)]
    media_presentation_duration: Option<String>,
    #[serde(rename = "Period", default)]
    periods: Vec<Period>,
}

#[derive(Debug, Deserialize)]
struct Period {
    #[serde(rename = "AdaptationSet", default)]
    adaptation_sets: Vec<AdaptationSet>,
}

#[derive(Debug, Deserialize)]
struct AdaptationSet {
    #[serde(rename = "@contentType", default)]
    content_type: Option<String>,
    #[serde(rename = "@mimeType", default)]
    mime_type: Option<String>,
    #[serde(rename = "ContentProtection", default)]
    content_protections: Vec<ContentProtection>,
    #[serde(rename = "SegmentTemplate", default)]
    segment_template: Option<SegmentTemplate>,
    #[serde(rename = "Representation", default)]
    representations: Vec<Representation>,
}

#[derive(Debug, Deserialize)]
struct Representation {
    #[serde(rename = "@id", default)]
    id: Option<String>,
    #[serde(rename = "@codecs", default)]
    codecs: Option<String>,
    #[serde(rename = "@mimeType", default)]
    mime_type: Option<String>,
    #[serde(rename = "@audioSamplingRate", default)]
    audio_sampling_rate: Option<String>,
    #[serde(rename = "ContentProtection", default)]
    content_protections: Vec<ContentProtection>,
    #[serde(rename = "SegmentTemplate", default)]
    segment_template: Option<SegmentTemplate>,
}

#[derive(Debug, Deserialize)]
struct SegmentTemplate {
    #[serde(rename = "@timescale", default)]
    timescale: Option<u64>,
    #[serde(rename = "@initialization", default)]
    initialization: Option<String>,
    #[serde(rename = "@media", default)]
    media: Option<String>,
    #[serde(rename = "SegmentTimeline", default)]
    segment_timeline: Option<SegmentTimelineXml>,
}

#[derive(Debug, Deserialize)]
struct SegmentTimelineXml {
    #[serde(rename = "S", default)]
    entries: Vec<TimelineEntry>,
}

#[derive(Debug, Deserialize)]
struct TimelineEntry {
    #[serde(rename = "@d")]
    duration: u64,
    /// `-1` signifie "répéter jusqu'à la fin", traité comme 0
    #[serde(rename = "@r", default)]
    repeat: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ContentProtection {
    #[serde(rename = "@schemeIdUri", default)]
    scheme_id_uri: Option<String>,
    #[serde(rename = "@value", default)]
    value: Option<String>,
    #[serde(rename = "@cenc:default_KID", alias = "@default_KID", default)]
    default_kid: Option<String>,
}

/// Vue "une seule piste" d'un MPD, validée à la construction
struct SingleTrack<'a> {
    mpd: &'a Mpd,
    adaptation_set: &'a AdaptationSet,
    representation: &'a Representation,
    template: &'a SegmentTemplate,
    entries: &'a [TimelineEntry],
}

impl<'a> SingleTrack<'a> {
    fn select(mpd: &'a Mpd) -> Result<Self> {
        let period = mpd
            .periods
            .first()
            .ok_or_else(|| TidalError::decode("MPD has no Period"))?;
        let adaptation_set = period
            .adaptation_sets
            .first()
            .ok_or_else(|| TidalError::decode("MPD Period has no AdaptationSet"))?;
        let representation = adaptation_set
            .representations
            .first()
            .ok_or_else(|| TidalError::decode("MPD AdaptationSet has no Representation"))?;
        let template = representation
            .segment_template
            .as_ref()
            .or(adaptation_set.segment_template.as_ref())
            .ok_or_else(|| TidalError::decode("MPD Representation has no SegmentTemplate"))?;
        let entries = template
            .segment_timeline
            .as_ref()
            .map(|timeline| timeline.entries.as_slice())
            .filter(|entries| !entries.is_empty())
            .ok_or_else(|| TidalError::decode("MPD SegmentTemplate has no SegmentTimeline"))?;

        Ok(Self {
            mpd,
            adaptation_set,
            representation,
            template,
            entries,
        })
    }

    fn protections(&self) -> impl Iterator<Item = &'a ContentProtection> {
        self.adaptation_set
            .content_protections
            .iter()
            .chain(self.representation.content_protections.iter())
    }
}

// ============= Timeline =============

/// Une entrée `<S d=".." r=".."/>` de la timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRun {
    /// Durée de chaque segment, en ticks de la timescale
    pub duration: u64,
    /// Nombre de répétitions supplémentaires
    pub repeat: u64,
}

/// Timeline de segments encodée par plages (run-length)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTimeline {
    runs: Vec<SegmentRun>,
}

impl SegmentTimeline {
    /// Construit une timeline ; elle doit contenir au moins une plage
    pub fn new(runs: Vec<SegmentRun>) -> Result<Self> {
        if runs.is_empty() {
            return Err(TidalError::decode("empty segment timeline"));
        }
        Ok(Self { runs })
    }

    pub fn runs(&self) -> &[SegmentRun] {
        &self.runs
    }

    /// Nombre total de segments, initialisation incluse
    ///
    /// Segment d'initialisation et premier segment média, plus pour chaque
    /// plage son nombre de répétitions (une plage sans répétition compte pour 1).
    ///
    /// # Errors
    ///
    /// `TidalError::ManifestDecode` si le total dépasse [`MAX_SEGMENTS`].
    pub fn segment_count(&self) -> Result<usize> {
        self.runs
            .iter()
            .map(|run| if run.repeat > 0 { run.repeat } else { 1 })
            .try_fold(2u64, u64::checked_add)
            .and_then(|count| usize::try_from(count).ok())
            .filter(|count| *count <= MAX_SEGMENTS)
            .ok_or_else(|| {
                TidalError::decode(format!(
                    "segment timeline exceeds {} segments",
                    MAX_SEGMENTS
                ))
            })
    }

    /// Durée (ticks) de la première plage, appliquée à tous les segments sauf le dernier
    pub fn first_duration(&self) -> u64 {
        self.runs[0].duration
    }

    /// Durée (ticks) de la dernière plage, appliquée au dernier segment
    pub fn last_duration(&self) -> u64 {
        self.runs[self.runs.len() - 1].duration
    }

    /// Plus courte durée (ticks) de la timeline
    pub fn min_duration(&self) -> u64 {
        self.runs.iter().map(|run| run.duration).min().unwrap_or_default()
    }

    /// Génère les URLs des segments en substituant `$Number$` de 0 à `segment_count() - 1`
    pub fn expand(&self, media_template: &str) -> Result<Vec<String>> {
        Ok((0..self.segment_count()?)
            .map(|n| media_template.replace(NUMBER_TOKEN, &n.to_string()))
            .collect())
    }
}

// ============= Manifeste DASH =============

/// Manifeste DASH décodé
#[derive(Debug, Clone)]
pub struct DashManifest {
    duration: f64,
    content_type: String,
    mime_type: String,
    raw_codecs: String,
    codec: Codec,
    sample_rate: Option<u32>,
    initialization_url: String,
    media_template: String,
    timescale: u64,
    timeline: SegmentTimeline,
    urls: Vec<String>,
    encryption_type: String,
    encryption_key: Option<String>,
}

impl DashManifest {
    /// Parse le texte XML d'un MPD
    ///
    /// # Errors
    ///
    /// `TidalError::ManifestDecode` si le XML est invalide, si un niveau de la
    /// structure attendue manque, ou si une valeur (durée, timescale,
    /// fréquence d'échantillonnage) est inexploitable.
    pub fn parse(xml: &str) -> Result<Self> {
        let mpd: Mpd = quick_xml::de::from_str(xml)
            .map_err(|e| TidalError::decode(format!("invalid MPD: {}", e)))?;
        let track = SingleTrack::select(&mpd)?;

        let duration = track
            .mpd
            .media_presentation_duration
            .as_deref()
            .ok_or_else(|| TidalError::decode("MPD has no mediaPresentationDuration"))
            .and_then(parse_duration)?;

        let timescale = track.template.timescale.unwrap_or(1);
        if timescale == 0 {
            return Err(TidalError::decode("SegmentTemplate timescale is zero"));
        }

        let sample_rate = track
            .representation
            .audio_sampling_rate
            .as_deref()
            .map(|rate| {
                rate.trim().parse::<u32>().map_err(|_| {
                    TidalError::decode(format!("invalid audioSamplingRate '{}'", rate))
                })
            })
            .transpose()?;

        let representation_id = track.representation.id.as_deref().unwrap_or_default();
        let media_template = track
            .template
            .media
            .as_deref()
            .ok_or_else(|| TidalError::decode("SegmentTemplate has no media attribute"))?
            .replace(REPRESENTATION_ID_TOKEN, representation_id);
        let initialization_url = track
            .template
            .initialization
            .as_deref()
            .unwrap_or_default()
            .replace(REPRESENTATION_ID_TOKEN, representation_id);

        let timeline = SegmentTimeline::new(
            track
                .entries
                .iter()
                .map(|entry| SegmentRun {
                    duration: entry.duration,
                    repeat: entry.repeat.unwrap_or(0).max(0) as u64,
                })
                .collect(),
        )?;
        check_segment_budget(&timeline, duration, timescale)?;
        let urls = timeline.expand(&media_template)?;

        let raw_codecs = track.representation.codecs.clone().unwrap_or_default();
        let codec = Codec::from_dash_codecs(&raw_codecs);
        let mime_type = track
            .adaptation_set
            .mime_type
            .clone()
            .or_else(|| track.representation.mime_type.clone())
            .unwrap_or_else(|| codec.default_mime_type().to_string());

        let (encryption_type, encryption_key) = encryption_of(track.protections());

        debug!(
            "Parsed DASH manifest: {} segments, codec {}, {:.3}s, encryption {}",
            urls.len(),
            codec,
            duration,
            encryption_type
        );

        Ok(Self {
            duration,
            content_type: track.adaptation_set.content_type.clone().unwrap_or_default(),
            mime_type,
            raw_codecs,
            codec,
            sample_rate,
            initialization_url,
            media_template,
            timescale,
            timeline,
            urls,
            encryption_type,
            encryption_key,
        })
    }

    /// URLs des segments dans l'ordre de lecture (jamais vide)
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Attribut `codecs` tel que présent dans le MPD
    pub fn raw_codecs(&self) -> &str {
        &self.raw_codecs
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Durée totale du média, en secondes
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Ticks par seconde
    pub fn timescale(&self) -> u64 {
        self.timescale
    }

    /// Durée (ticks) des segments, sauf le dernier
    pub fn chunk_size(&self) -> u64 {
        self.timeline.first_duration()
    }

    /// Durée (ticks) du dernier segment
    pub fn last_chunk_size(&self) -> u64 {
        self.timeline.last_duration()
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    pub fn initialization_url(&self) -> &str {
        &self.initialization_url
    }

    /// Gabarit des URLs média (`$Number$` non substitué)
    pub fn media_template(&self) -> &str {
        &self.media_template
    }

    /// Timeline complète, pour qui a besoin des durées exactes par segment
    pub fn timeline(&self) -> &SegmentTimeline {
        &self.timeline
    }

    pub fn encryption_type(&self) -> &str {
        &self.encryption_type
    }

    pub fn encryption_key(&self) -> Option<&str> {
        self.encryption_key.as_deref()
    }

    /// Vrai si une clé de chiffrement est annoncée
    ///
    /// Un `ContentProtection` sans `default_KID` donne `false` alors que
    /// [`DashManifest::encryption_type`] vaut autre chose que `NONE` : c'est
    /// ce dernier qu'il faut tester pour savoir si le flux est lisible en clair.
    pub fn is_encrypted(&self) -> bool {
        self.encryption_key.is_some()
    }

    /// Génère une playlist HLS depuis la timeline
    ///
    /// Voir [`super::hls::render`].
    pub fn hls(&self) -> Result<String> {
        super::hls::render(self)
    }
}

fn encryption_of<'a>(
    protections: impl Iterator<Item = &'a ContentProtection>,
) -> (String, Option<String>) {
    let mut encryption_type: Option<String> = None;
    let mut key = None;

    for protection in protections {
        if encryption_type.is_none() {
            encryption_type = protection
                .value
                .as_deref()
                .or(protection.scheme_id_uri.as_deref())
                .map(|scheme| scheme.to_uppercase())
                .or_else(|| Some("UNKNOWN".to_string()));
        }
        if key.is_none() {
            key = protection
                .default_kid
                .as_deref()
                .map(str::trim)
                .filter(|kid| !kid.is_empty())
                .map(str::to_string);
        }
    }

    (
        encryption_type.unwrap_or_else(|| ENCRYPTION_NONE.to_string()),
        key,
    )
}

/// Refuse une timeline annonçant plus de segments que la durée n'en contient
fn check_segment_budget(timeline: &SegmentTimeline, duration: f64, timescale: u64) -> Result<()> {
    let count = timeline.segment_count()?;
    let shortest = timeline.min_duration().max(1) as f64;
    let budget = (duration * timescale as f64 / shortest).ceil() + 2.0;
    if count as f64 > budget {
        return Err(TidalError::decode(format!(
            "segment timeline announces {} segments for {:.3}s",
            count, duration
        )));
    }
    Ok(())
}

/// Convertit une durée ISO-8601 (`PT3M30.022S`) en secondes
fn parse_duration(value: &str) -> Result<f64> {
    iso8601_duration::Duration::parse(value)
        .ok()
        .and_then(|duration| duration.to_std())
        .map(|duration| duration.as_secs_f64())
        .ok_or_else(|| TidalError::decode(format!("invalid ISO-8601 duration '{}'", value)))
}
