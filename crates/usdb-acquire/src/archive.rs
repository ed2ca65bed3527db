use crate::error::SoftFailure;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Return the decoded contents of the first `.txt` entry in a zip archive.
///
/// Entries are visited in the archive's own order and matched on a
/// case-insensitive `.txt` suffix. The text is decoded as UTF-8, with
/// malformed sequences replaced by U+FFFD.
pub fn extract_first_text(bytes: &[u8]) -> Result<String, SoftFailure> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(SoftFailure::InvalidArchive)?;

    let index = first_text_entry(&mut archive)?.ok_or(SoftFailure::NoTextEntry)?;

    let mut entry = archive
        .by_index(index)
        .map_err(SoftFailure::InvalidArchive)?;
    let name = entry.name().to_string();

    let mut raw = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut raw)
        .map_err(|source| SoftFailure::UnreadableEntry {
            name: name.clone(),
            source,
        })?;

    tracing::debug!(entry = %name, bytes = raw.len(), "Read text entry");
    Ok(decode_text(&raw))
}

/// Index of the first entry whose name ends in `.txt`, ignoring case.
///
/// `ZipArchive::file_names` iterates a hash map, so walk indices to keep
/// central directory order.
fn first_text_entry(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<Option<usize>, SoftFailure> {
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(SoftFailure::InvalidArchive)?;
        if entry.name().to_lowercase().ends_with(".txt") {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// Decode bytes as UTF-8, substituting malformed sequences.
pub fn decode_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_first_txt_in_listing_order() {
        let bytes = build_zip(&[
            ("cover.jpg", b"\xff\xd8\xff"),
            ("Queen - Bohemian Rhapsody.txt", b"#TITLE:Bohemian Rhapsody\n"),
            ("A - duet.txt", b"#TITLE:duet\n"),
        ]);

        let text = extract_first_text(&bytes).unwrap();
        assert_eq!(text, "#TITLE:Bohemian Rhapsody\n");
    }

    #[test]
    fn test_txt_suffix_case_insensitive() {
        let bytes = build_zip(&[("song.mp3", b"ID3"), ("LYRICS.TXT", b"#ARTIST:Nena\n")]);

        assert_eq!(extract_first_text(&bytes).unwrap(), "#ARTIST:Nena\n");
    }

    #[test]
    fn test_nested_path_matches() {
        let bytes = build_zip(&[("songs/abba/waterloo.txt", b"#TITLE:Waterloo\n")]);

        assert_eq!(extract_first_text(&bytes).unwrap(), "#TITLE:Waterloo\n");
    }

    #[test]
    fn test_no_txt_entry() {
        let bytes = build_zip(&[("song.mp3", b"ID3"), ("readme.md", b"hi"), ("notes.txt.bak", b"x")]);

        assert!(matches!(extract_first_text(&bytes), Err(SoftFailure::NoTextEntry)));
    }

    #[test]
    fn test_not_a_zip() {
        let bytes = b"<html>Please log in</html>";

        assert!(matches!(extract_first_text(bytes), Err(SoftFailure::InvalidArchive(_))));
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        // Latin-1 encoded "Canción" followed by a truncated multi-byte sequence
        let bytes = build_zip(&[("cancion.txt", b"#TITLE:Canci\xf3n\n\xe2\x82")]);

        let text = extract_first_text(&bytes).unwrap();
        assert!(text.starts_with("#TITLE:Canci\u{FFFD}n\n"));
        assert!(text.ends_with('\u{FFFD}'));
    }

    #[test]
    fn test_utf8_preserved() {
        let text = decode_text("#ARTIST:Héroes del Silencio\n#TITLE:Maldito duende".as_bytes());
        assert_eq!(text, "#ARTIST:Héroes del Silencio\n#TITLE:Maldito duende");
    }
}
