//! Ogg page tail scan
//!
//! The granule position of the last page of a Vorbis stream is its total PCM
//! frame count. lewton does not expose it, so the tail of the file is read
//! again with the `ogg` packet reader and the last page position is kept.

use ogg::reading::PacketReader;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Largest possible Ogg page is 27 + 255 + 255 * 255 = 65307 bytes
const TAIL_WINDOW: u64 = 65_536;

const CAPTURE_PATTERN: &[u8; 4] = b"OggS";

/// Granule position (-1) of a page that finishes no packet
const NO_GRANULE: u64 = u64::MAX;

/// Read pages from `start` to the end of `tail`.
///
/// Returns `None` if anything from `start` on is not a valid page sequence,
/// e.g. when `start` is a capture pattern inside packet data.
fn granule_from(tail: &[u8], start: usize) -> Option<Option<u64>> {
    let mut reader = PacketReader::new(Cursor::new(tail));
    // Seeking lets the reader accept a first page that continues a packet
    reader.seek_bytes(SeekFrom::Start(start as u64)).ok()?;

    let mut last = None;
    loop {
        match reader.read_packet() {
            Ok(Some(packet)) => {
                if packet.absgp_page() != NO_GRANULE {
                    last = Some(packet.absgp_page());
                }
            }
            Ok(None) => return Some(last),
            Err(e) => {
                debug!("No page sequence at tail offset {}: {}", start, e);
                return None;
            }
        }
    }
}

/// Last granule position of the pages in `tail`, which may start mid-page.
pub fn find_last_granule(tail: &[u8]) -> Option<u64> {
    tail.windows(CAPTURE_PATTERN.len())
        .enumerate()
        .filter(|(_, window)| *window == CAPTURE_PATTERN)
        .find_map(|(start, _)| granule_from(tail, start))
        .flatten()
}

/// Read the tail of `reader` and return the last page's granule position.
///
/// Leaves the reader positioned at the end of the stream.
pub fn last_granule_position<R: Read + Seek>(reader: &mut R) -> io::Result<Option<u64>> {
    let len = reader.seek(SeekFrom::End(0))?;
    let start = len.saturating_sub(TAIL_WINDOW);
    reader.seek(SeekFrom::Start(start))?;

    let mut tail = Vec::with_capacity((len - start) as usize);
    reader.read_to_end(&mut tail)?;

    Ok(find_last_granule(&tail))
}

/// Declared total frames of the Ogg Vorbis file at `path`, if it can be determined.
pub fn declared_frames(path: &Path) -> Option<u64> {
    let scan = File::open(path).and_then(|mut file| last_granule_position(&mut file));
    match scan {
        Ok(frames) => frames,
        Err(e) => {
            debug!("Could not scan {} for length: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogg::writing::{PacketWriteEndInfo, PacketWriter};

    const SERIAL: u32 = 0x1234_5678;

    /// One page per packet, each carrying its own granule position
    fn build_stream(pages: &[(u64, Vec<u8>)]) -> Vec<u8> {
        let mut writer = PacketWriter::new(Vec::new());
        for (i, (granule, body)) in pages.iter().enumerate() {
            let end = if i + 1 == pages.len() {
                PacketWriteEndInfo::EndStream
            } else {
                PacketWriteEndInfo::EndPage
            };
            writer
                .write_packet(body.clone().into_boxed_slice(), SERIAL, end, *granule)
                .unwrap();
        }
        writer.into_inner()
    }

    #[test]
    fn test_single_page() {
        let stream = build_stream(&[(4410, b"vorbis audio".to_vec())]);
        assert_eq!(find_last_granule(&stream), Some(4410));
    }

    #[test]
    fn test_last_page_wins() {
        let stream = build_stream(&[
            (0, b"headers".to_vec()),
            (1024, vec![7u8; 300]),
            (2048, vec![9u8; 40]),
        ]);
        assert_eq!(find_last_granule(&stream), Some(2048));
    }

    #[test]
    fn test_skips_pages_without_granule() {
        let stream = build_stream(&[(96_000, vec![1u8; 64]), (NO_GRANULE, vec![2u8; 600])]);
        assert_eq!(find_last_granule(&stream), Some(96_000));
    }

    #[test]
    fn test_tail_starting_mid_page() {
        let stream = build_stream(&[
            (0, vec![5u8; 700]),
            (1500, vec![6u8; 80]),
            (3000, vec![8u8; 90]),
        ]);
        // Cut into the first page body; the scan resyncs on the next page
        assert_eq!(find_last_granule(&stream[100..]), Some(3000));
    }

    #[test]
    fn test_ignores_capture_pattern_inside_payload() {
        let mut body = b"xxOggS\0".to_vec();
        body.extend_from_slice(&[0xFF; 40]);
        let stream = build_stream(&[(77, body)]);
        assert_eq!(find_last_granule(&stream), Some(77));
        // Starting from the fake pattern alone finds nothing
        assert_eq!(find_last_granule(&stream[30..]), None);
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let mut stream = build_stream(&[(512, b"payload".to_vec())]);
        let last = stream.len() - 1;
        stream[last] ^= 0xFF;
        assert_eq!(find_last_granule(&stream), None);
    }

    #[test]
    fn test_no_pages() {
        assert_eq!(find_last_granule(b""), None);
        assert_eq!(find_last_granule(&[0u8; 1000]), None);
    }

    #[test]
    fn test_reader_scans_only_tail() {
        let mut data = vec![0u8; 200_000];
        data.extend(build_stream(&[(123_456, vec![3u8; 100])]));
        let mut cursor = Cursor::new(data);
        assert_eq!(last_granule_position(&mut cursor).unwrap(), Some(123_456));
    }

    #[test]
    fn test_declared_frames_missing_file() {
        assert_eq!(declared_frames(Path::new("/nonexistent/oggcmp/input.ogg")), None);
    }
}
