//! ID3 tag removal.
//!
//! Fingerprints cover the audio payload only, so a retagged copy of a track
//! still matches the original. Two tag blocks are removed:
//! - the first valid ID3v2 tag (header, body, and footer when flagged)
//! - a trailing 128-byte ID3v1 block
//!
//! A tag whose declared size runs past the end of the data is clamped to the
//! end instead of being treated as an error.

use std::borrow::Cow;
use std::ops::Range;

const ID3V2_MAGIC: &[u8; 3] = b"ID3";
const ID3V2_HEADER_LEN: usize = 10;
const ID3V2_FOOTER_FLAG: u8 = 0x10;
const ID3V1_MAGIC: &[u8; 3] = b"TAG";
const ID3V1_LEN: usize = 128;

/// Return the payload of `data` with its tag blocks removed.
///
/// Borrows when there is nothing to remove from the middle of the buffer.
pub fn strip_tags(data: &[u8]) -> Cow<'_, [u8]> {
    let audio = &data[..id3v1_start(data).unwrap_or(data.len())];

    match id3v2_range(audio) {
        Some(tag) => {
            let mut payload = Vec::with_capacity(audio.len() - tag.len());
            payload.extend_from_slice(&audio[..tag.start]);
            payload.extend_from_slice(&audio[tag.end..]);
            Cow::Owned(payload)
        }
        None => Cow::Borrowed(audio),
    }
}

/// Locate the first valid ID3v2 tag.
fn id3v2_range(data: &[u8]) -> Option<Range<usize>> {
    let mut offset = 0;
    while let Some(found) = find(&data[offset..], ID3V2_MAGIC) {
        let start = offset + found;
        if let Some(header) = data.get(start..start + ID3V2_HEADER_LEN) {
            if is_valid_header(header) {
                let mut len = ID3V2_HEADER_LEN + synchsafe(&header[6..10]);
                if header[3] == 4 && header[5] & ID3V2_FOOTER_FLAG != 0 {
                    len += ID3V2_HEADER_LEN;
                }
                let end = start.saturating_add(len).min(data.len());
                return Some(start..end);
            }
        }
        offset = start + 1;
    }
    None
}

fn id3v1_start(data: &[u8]) -> Option<usize> {
    let start = data.len().checked_sub(ID3V1_LEN)?;
    data[start..].starts_with(ID3V1_MAGIC).then_some(start)
}

/// Version 2.2-2.4, revision 0, and four size bytes with the high bit clear.
fn is_valid_header(header: &[u8]) -> bool {
    header.len() >= ID3V2_HEADER_LEN
        && &header[..3] == ID3V2_MAGIC
        && matches!(header[3], 2..=4)
        && header[4] == 0
        && header[6..10].iter().all(|b| b & 0x80 == 0)
}

/// Decode a 28-bit synchsafe integer (7 bits per byte, big endian).
fn synchsafe(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .fold(0usize, |acc, &b| (acc << 7) | usize::from(b & 0x7f))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an ID3v2.3 tag with `body` as its content.
    pub(crate) fn id3v2_tag(body: &[u8]) -> Vec<u8> {
        let size = body.len();
        let mut tag = vec![b'I', b'D', b'3', 3, 0, 0];
        tag.extend_from_slice(&[
            ((size >> 21) & 0x7f) as u8,
            ((size >> 14) & 0x7f) as u8,
            ((size >> 7) & 0x7f) as u8,
            (size & 0x7f) as u8,
        ]);
        tag.extend_from_slice(body);
        tag
    }

    pub(crate) fn id3v1_tag(title: &str) -> Vec<u8> {
        let mut tag = vec![0u8; ID3V1_LEN];
        tag[..3].copy_from_slice(ID3V1_MAGIC);
        let title = title.as_bytes();
        let len = title.len().min(30);
        tag[3..3 + len].copy_from_slice(&title[..len]);
        tag
    }

    #[test]
    fn untagged_data_is_borrowed_unchanged() {
        let data = b"\xff\xfb\x90\x00 plain mpeg frames";
        let stripped = strip_tags(data);
        assert!(matches!(stripped, Cow::Borrowed(_)));
        assert_eq!(&*stripped, &data[..]);
    }

    #[test]
    fn leading_id3v2_tag_is_removed() {
        let mut data = id3v2_tag(b"TIT2 some title");
        data.extend_from_slice(b"AUDIO");
        assert_eq!(&*strip_tags(&data), b"AUDIO");
    }

    #[test]
    fn tag_body_larger_than_127_bytes_uses_synchsafe_size() {
        let body = vec![b'x'; 300];
        let mut data = id3v2_tag(&body);
        data.extend_from_slice(b"AUDIO");
        assert_eq!(&*strip_tags(&data), b"AUDIO");
    }

    #[test]
    fn trailing_id3v1_block_is_removed() {
        let mut data = b"AUDIO".to_vec();
        data.extend_from_slice(&id3v1_tag("Title"));
        assert_eq!(&*strip_tags(&data), b"AUDIO");
    }

    #[test]
    fn both_tag_kinds_are_removed() {
        let mut data = id3v2_tag(b"v2 frames");
        data.extend_from_slice(b"AUDIO");
        data.extend_from_slice(&id3v1_tag("Title"));
        assert_eq!(&*strip_tags(&data), b"AUDIO");
    }

    #[test]
    fn truncated_tag_is_clamped() {
        let mut data = id3v2_tag(&[b'x'; 50]);
        data.truncate(20);
        assert!(strip_tags(&data).is_empty());
    }

    #[test]
    fn invalid_header_is_skipped() {
        // Version byte 9 is not an ID3v2 version
        let mut data = b"ID3\x09\x00\x00\x00\x00\x00\x05".to_vec();
        data.extend_from_slice(b"AUDIO");
        assert_eq!(&*strip_tags(&data), &data[..]);
    }

    #[test]
    fn tag_after_audio_prefix_is_found() {
        let mut data = b"junk".to_vec();
        data.extend_from_slice(&id3v2_tag(b"frames"));
        data.extend_from_slice(b"AUDIO");
        assert_eq!(&*strip_tags(&data), b"junkAUDIO");
    }

    #[test]
    fn synchsafe_decodes_seven_bit_groups() {
        assert_eq!(synchsafe(&[0, 0, 2, 1]), 257);
        assert_eq!(synchsafe(&[0x7f, 0x7f, 0x7f, 0x7f]), (1 << 28) - 1);
    }
}
