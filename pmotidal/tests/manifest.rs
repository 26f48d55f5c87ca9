//! Résolution complète d'une session de lecture, du JSON de l'API jusqu'aux URLs

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pmotidal::{Codec, FileExtension, Stream, StreamManifest, TidalError};
use serde_json::json;

const DASH_AAC: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" profiles="urn:mpeg:dash:profile:isoff-main:2011" type="static" minBufferTime="PT3.993S" mediaPresentationDuration="PT12.5S">
  <Period id="0">
    <AdaptationSet id="0" contentType="audio" mimeType="audio/mp4" segmentAlignment="true">
      <Representation id="AAC,44100" codecs="mp4a.40.2" bandwidth="321536" audioSamplingRate="44100">
        <SegmentTemplate timescale="44100" initialization="https://cdn.test/$RepresentationID$/0.mp4" media="https://cdn.test/$RepresentationID$/$Number$.mp4" startNumber="1">
          <SegmentTimeline>
            <S d="176400" r="2"/>
            <S d="22050"/>
          </SegmentTimeline>
        </SegmentTemplate>
      </Representation>
    </AdaptationSet>
  </Period>
</MPD>"#;

const DASH_ENCRYPTED: &str = r#"<MPD mediaPresentationDuration="PT8S">
  <Period>
    <AdaptationSet contentType="audio" mimeType="audio/mp4">
      <ContentProtection schemeIdUri="urn:mpeg:dash:mp4protection:2011" value="cenc" default_KID="0123-4567"/>
      <Representation id="1" codecs="flac" audioSamplingRate="96000">
        <SegmentTemplate timescale="1000" initialization="https://cdn.test/0.mp4" media="https://cdn.test/$Number$.mp4">
          <SegmentTimeline><S d="4000" r="1"/></SegmentTimeline>
        </SegmentTemplate>
      </Representation>
    </AdaptationSet>
  </Period>
</MPD>"#;

fn stream(mime_type: &str, manifest: &str) -> Result<Stream> {
    Ok(Stream::from_json(json!({
        "trackId": 77646168,
        "assetPresentation": "FULL",
        "audioMode": "STEREO",
        "audioQuality": "HIGH",
        "manifestMimeType": mime_type,
        "manifestHash": "hash",
        "manifest": STANDARD.encode(manifest),
        "bitDepth": 16,
        "sampleRate": 44100
    }))?)
}

#[test]
fn test_dash_stream_resolution() -> Result<()> {
    let manifest = stream("application/dash+xml", DASH_AAC)?.get_stream_manifest()?;

    assert!(manifest.is_dash());
    assert_eq!(manifest.codec(), &Codec::Mp4a);
    assert_eq!(manifest.codec().as_str(), "MP4A");
    assert_eq!(manifest.mime_type(), "audio/mp4");
    assert_eq!(manifest.file_extension(), FileExtension::M4a);
    assert_eq!(manifest.sample_rate(), Some(44100));
    assert!(!manifest.is_encrypted());

    let urls = manifest.urls();
    assert_eq!(urls.len(), 5);
    for (index, url) in urls.iter().enumerate() {
        assert_eq!(url, &format!("https://cdn.test/AAC,44100/{}.mp4", index));
    }
    Ok(())
}

#[test]
fn test_dash_stream_to_hls() -> Result<()> {
    let manifest = stream("application/dash+xml", DASH_AAC)?.get_stream_manifest()?;
    let hls = manifest.hls()?;

    assert!(hls.starts_with("#EXTM3U\n#EXT-X-TARGETDURATION:12\n#EXT-X-VERSION:3\n"));
    assert_eq!(hls.matches("#EXTINF:4.000,\n").count(), 4);
    assert_eq!(hls.matches("#EXTINF:0.500,\n").count(), 1);
    assert!(hls.ends_with("https://cdn.test/AAC,44100/4.mp4\n#EXT-X-ENDLIST\n"));
    Ok(())
}

#[test]
fn test_encrypted_dash_stream() -> Result<()> {
    let manifest = StreamManifest::from_raw("application/dash+xml", &STANDARD.encode(DASH_ENCRYPTED))?;

    assert!(manifest.is_encrypted());
    assert_eq!(manifest.encryption_type(), "CENC");
    assert_eq!(manifest.encryption_key(), Some("0123-4567"));
    assert_eq!(manifest.urls().len(), 3);
    assert!(matches!(manifest.hls(), Err(TidalError::EncryptedManifest(_))));
    Ok(())
}

#[test]
fn test_bts_stream_resolution() -> Result<()> {
    let manifest = stream(
        "application/vnd.tidal.bts",
        r#"{"mimeType":"audio/flac","codecs":"flac","encryptionType":"NONE","urls":["https://cdn.test/track.flac?token=x"]}"#,
    )?
    .get_stream_manifest()?;

    assert!(manifest.is_bts());
    assert_eq!(manifest.urls(), ["https://cdn.test/track.flac?token=x"]);
    assert_eq!(manifest.codec(), &Codec::Flac);
    assert_eq!(manifest.mime_type(), "audio/flac");
    assert_eq!(manifest.file_extension().as_str(), ".flac");
    assert!(!manifest.is_encrypted());
    assert!(matches!(
        manifest.hls(),
        Err(TidalError::FormatNotApplicable(_))
    ));
    Ok(())
}

#[test]
fn test_unsupported_stream() -> Result<()> {
    let result = stream("audio/x-mpegurl", "#EXTM3U")?.get_stream_manifest();
    assert!(matches!(result, Err(TidalError::UnknownManifestFormat(_))));

    let result = stream("application/dash+xml", "<MPD><Period/></MPD>")?.get_stream_manifest();
    assert!(matches!(result, Err(TidalError::ManifestDecode(_))));
    Ok(())
}
