use crate::animation::curve::Curve;
use crate::animation::skinned_animation::{Track, CHANNEL_NAMES};
use crate::error::{AssetError, Result};

use super::reader::AssetReader;
use super::writer::AssetWriter;

/// Reads every track with its 10 curves. Tracks come back unbound.
pub fn read_tracks<R: AssetReader>(reader: &mut R) -> Result<Vec<Track>> {
    let track_count = reader.read_u32("track count")?;
    let mut tracks = Vec::with_capacity((track_count as usize).min(1024));
    for _ in 0..track_count {
        let target = reader.read_string("track transform name")?;
        let mut track = Track::new(&target);
        for (curve, channel) in track.curves.iter_mut().zip(CHANNEL_NAMES) {
            let key_count = reader.read_u32(channel)? as usize;
            let times = reader.read_f32s(key_count, channel)?;
            let keys = reader.read_f32s(key_count, channel)?;
            *curve = Curve::new(times, keys);
        }
        tracks.push(track);
    }
    log::debug!("read {} animation tracks from {}", tracks.len(), reader.origin().display());
    Ok(tracks)
}

pub fn write_tracks<W: AssetWriter>(writer: &mut W, tracks: &[Track]) -> Result<()> {
    let track_count = u32::try_from(tracks.len()).map_err(|_| AssetError::Encode {
        field: "track count".to_string(),
        value: tracks.len().to_string(),
    })?;
    writer.write_u32(track_count)?;
    writer.end_record()?;
    for track in tracks {
        writer.write_string("track transform name", &track.target)?;
        writer.end_record()?;
        for curve in &track.curves {
            let key_count = curve.len();
            writer.write_u32(key_count as u32)?;
            writer.end_record()?;
            writer.write_f32s(&curve.times[..key_count])?;
            writer.end_record()?;
            writer.write_f32s(&curve.keys[..key_count])?;
            writer.end_record()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::file_formats::reader::{AsciiReader, BinaryReader};
    use crate::assets::file_formats::writer::{AsciiWriter, BinaryWriter};

    fn ascii_clip() -> String {
        let mut text = String::from("1\nHips\n");
        // posX keyed, the rest empty
        text.push_str("3 0 1 2 0 10 0\n");
        for _ in 1..10 {
            text.push_str("0\n");
        }
        text
    }

    #[test]
    fn ascii_tracks() {
        let tracks = read_tracks(&mut AsciiReader::new(ascii_clip(), "mem")).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].target, "Hips");
        assert!(tracks[0].transform.is_none());
        assert_eq!(tracks[0].curves[0].times, vec![0.0, 1.0, 2.0]);
        assert_eq!(tracks[0].curves[0].keys, vec![0.0, 10.0, 0.0]);
        assert!(tracks[0].curves[1..].iter().all(Curve::is_empty));
    }

    #[test]
    fn binary_and_ascii_agree() {
        let tracks = read_tracks(&mut AsciiReader::new(ascii_clip(), "mem")).unwrap();

        let mut binary = BinaryWriter::new(Vec::new(), "mem");
        write_tracks(&mut binary, &tracks).unwrap();
        let bytes = binary.into_inner();
        assert_eq!(&bytes[..4], &1u32.to_le_bytes());
        let from_binary = read_tracks(&mut BinaryReader::new(bytes.as_slice(), "mem")).unwrap();

        let mut ascii = AsciiWriter::new(Vec::new(), "mem");
        write_tracks(&mut ascii, &tracks).unwrap();
        ascii.flush().unwrap();
        let text = String::from_utf8(ascii.into_inner()).unwrap();
        let from_ascii = read_tracks(&mut AsciiReader::new(text, "mem")).unwrap();

        for reloaded in [from_binary, from_ascii] {
            assert_eq!(reloaded[0].target, tracks[0].target);
            assert_eq!(reloaded[0].curves, tracks[0].curves);
        }
    }

    #[test]
    fn truncated_curve_names_the_channel() {
        let text = "1 Hips 0 0 0 2 0".to_string();
        match read_tracks(&mut AsciiReader::new(text, "mem")) {
            Err(AssetError::Load { field, .. }) => assert_eq!(field, "rotX"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
