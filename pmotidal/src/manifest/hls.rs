//! Synthèse d'une playlist HLS (M3U8) depuis un manifeste DASH

use super::dash::{DashManifest, ENCRYPTION_NONE};
use crate::error::{Result, TidalError};

// TODO: émettre une durée par segment depuis `DashManifest::timeline()` quand la
// timeline a plus de deux durées distinctes.

/// Génère une playlist HLS statique
///
/// Tous les segments sauf le dernier reçoivent la durée de la première plage
/// de la timeline ; le dernier reçoit celle de la dernière plage.
///
/// # Errors
///
/// `TidalError::EncryptedManifest` si le flux est chiffré.
pub fn render(manifest: &DashManifest) -> Result<String> {
    if manifest.encryption_type() != ENCRYPTION_NONE {
        return Err(TidalError::EncryptedManifest(format!(
            "HLS cannot be synthesized for {} encrypted streams",
            manifest.encryption_type()
        )));
    }

    let Some((last, segments)) = manifest.urls().split_last() else {
        return Err(TidalError::decode("DASH manifest has no segments"));
    };

    let timescale = manifest.timescale() as f64;
    let chunk_duration = manifest.chunk_size() as f64 / timescale;
    let last_duration = manifest.last_chunk_size() as f64 / timescale;

    let mut hls = String::from("#EXTM3U\n");
    hls.push_str(&format!(
        "#EXT-X-TARGETDURATION:{}\n",
        manifest.duration().floor() as u64
    ));
    hls.push_str("#EXT-X-VERSION:3\n");
    for url in segments {
        hls.push_str(&format!("#EXTINF:{:.3},\n{}\n", chunk_duration, url));
    }
    hls.push_str(&format!("#EXTINF:{:.3},\n{}\n", last_duration, last));
    hls.push_str("#EXT-X-ENDLIST\n");

    Ok(hls)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(duration: &str, timeline: &str) -> DashManifest {
        let xml = format!(
            r#"<MPD mediaPresentationDuration="{duration}">
  <Period>
    <AdaptationSet contentType="audio" mimeType="audio/mp4">
      <Representation id="1" codecs="flac" audioSamplingRate="44100">
        <SegmentTemplate timescale="1000" initialization="s-0.mp4" media="s-$Number$.mp4">
          <SegmentTimeline>{timeline}</SegmentTimeline>
        </SegmentTemplate>
      </Representation>
    </AdaptationSet>
  </Period>
</MPD>"#
        );
        DashManifest::parse(&xml).unwrap()
    }

    #[test]
    fn test_render_playlist() {
        let hls = render(&manifest("PT9.5S", r#"<S d="4000" r="1"/><S d="1500"/>"#)).unwrap();
        let expected = "#EXTM3U
#EXT-X-TARGETDURATION:9
#EXT-X-VERSION:3
#EXTINF:4.000,
s-0.mp4
#EXTINF:4.000,
s-1.mp4
#EXTINF:4.000,
s-2.mp4
#EXTINF:1.500,
s-3.mp4
#EXT-X-ENDLIST
";
        assert_eq!(hls, expected);
    }

    #[test]
    fn test_target_duration_is_floored() {
        let hls = render(&manifest("PT4M13.7S", r#"<S d="4000" r="3"/>"#)).unwrap();
        assert!(hls.contains("#EXT-X-TARGETDURATION:253\n"));
        assert_eq!(hls.matches("#EXTINF:").count(), 5);
    }
}
