//! Unit-level properties of the codec and format layers, exercised through
//! the public API.

use emk_codec::emk::codec::{compression, crypto, text};
use emk_codec::emk::format::table::{read_value, write_value};
use emk_codec::emk::format::cursor;
use emk_codec::emk::lyrics::clusters_from_text;
use emk_codec::{Compression, EmkError, LyrFile, TagValue};

// ── Stream cipher ──────────────────────────────────────────────────────────

#[test]
fn xor_transform_is_self_inverse() {
    let original: Vec<u8> = (0u8..=255).cycle().take(1000).collect();
    let keys: [&[u8]; 3] = [&[0x42], &[0xAF, 0xF2, 0x4C], &[1, 2, 3, 4, 5, 6, 7, 8, 9]];

    for key in keys {
        let once = crypto::xor_transformed(&original, key);
        let twice = crypto::xor_transformed(&once, key);
        assert_eq!(twice, original, "involution failed for key {:02x?}", key);
    }
}

#[test]
fn xor_transform_with_empty_key_is_identity() {
    let data = vec![1u8, 2, 3];
    assert_eq!(crypto::xor_transformed(&data, &[]), data);
}

// ── Typed tag/value encoding ───────────────────────────────────────────────

#[test]
fn tag_values_round_trip() {
    let values = [
        TagValue::Byte(0),
        TagValue::Byte(0xFF),
        TagValue::U16(0xBEEF),
        TagValue::U32(0xDEAD_BEEF),
        TagValue::Str(String::new()),
        TagValue::Str("MIDI_DATA".to_string()),
    ];

    for value in values {
        let mut buf = Vec::new();
        write_value(&mut buf, &value);
        let (decoded, consumed) = read_value(&buf, 0).expect("decode failed");
        assert_eq!(decoded, value);
        assert_eq!(consumed, buf.len());
    }
}

#[test]
fn unknown_type_byte_is_rejected() {
    let buf = [0x07u8, 0x01, 0x02];
    match read_value(&buf, 0) {
        Err(EmkError::UnknownTagType { tag: 0x07, offset: 0 }) => {}
        other => panic!("expected UnknownTagType, got {:?}", other),
    }
}

#[test]
fn truncated_value_is_rejected() {
    // u32 type byte with only two bytes of value
    let buf = [0x04u8, 0x01, 0x02];
    assert!(matches!(
        read_value(&buf, 0),
        Err(EmkError::TruncatedRecord { .. })
    ));
}

// ── Compression ────────────────────────────────────────────────────────────

#[test]
fn zlib_round_trip() {
    let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
    let packed = compression::compress(&data, Compression::Zlib).unwrap();
    assert!(packed.len() < data.len());
    let unpacked =
        compression::decompress(&packed, Compression::Zlib, data.len() as u64, "TEST").unwrap();
    assert_eq!(unpacked, data);
}

#[test]
fn stored_payload_decompresses_to_itself() {
    let data = b"uncompressed bytes".to_vec();
    let packed = compression::compress(&data, Compression::Stored).unwrap();
    assert_eq!(packed, data);
    let unpacked =
        compression::decompress(&packed, Compression::Stored, data.len() as u64, "TEST").unwrap();
    assert_eq!(unpacked, data);
}

#[test]
fn stored_sentinel_on_deflated_payload_still_inflates() {
    // The classic writer stamped the stored sentinel while deflating.
    let data = b"legacy quirk payload".repeat(10);
    let deflated = compression::compress(&data, Compression::Zlib).unwrap();
    let unpacked =
        compression::decompress(&deflated, Compression::Stored, data.len() as u64, "TEST")
            .unwrap();
    assert_eq!(unpacked, data);
}

#[test]
fn corrupt_zlib_stream_fails() {
    let garbage = [0x00u8, 0x11, 0x22, 0x33];
    assert!(matches!(
        compression::decompress(&garbage, Compression::Zlib, 100, "TEST"),
        Err(EmkError::DecompressionFailed { .. })
    ));
}

// ── Text transcoding ───────────────────────────────────────────────────────

#[test]
fn newlines_become_crlf_on_the_wire() {
    let wire = text::encode_text("hello\nworld");
    assert_eq!(wire, b"hello\r\nworld");
    assert_eq!(text::decode_text(&wire), "hello\nworld");
}

#[test]
fn thai_text_round_trips_through_cp874() {
    // "สวัสดี" in cp874: Thai block maps U+0E01.. onto 0xA1..
    let hello = "\u{0E2A}\u{0E27}\u{0E31}\u{0E2A}\u{0E14}\u{0E35}";
    let wire = text::encode_text(hello);
    assert_eq!(wire, [0xCA, 0xC7, 0xD1, 0xCA, 0xB4, 0xD5]);
    assert_eq!(text::decode_text(&wire), hello);
}

#[test]
fn unmappable_characters_become_placeholders() {
    let wire = text::encode_text("ab\u{65E5}cd");
    assert_eq!(wire, b"ab?cd");
}

// ── Cursor stream ──────────────────────────────────────────────────────────

#[test]
fn cursor_pairs_decode_little_endian() {
    let ticks = cursor::decode_ticks(&[0x01, 0x00, 0x00, 0x01, 0x34, 0x12]);
    assert_eq!(ticks, vec![1, 256, 0x1234]);
}

#[test]
fn cursor_sentinel_terminates_without_emitting() {
    // [0x05, 0xFF] terminates; the 0x05 is not consumed as a value and the
    // bytes after the sentinel are ignored.
    let ticks = cursor::decode_ticks(&[0x01, 0x00, 0x05, 0xFF, 0x09, 0x00]);
    assert_eq!(ticks, vec![1]);
}

#[test]
fn cursor_tail_byte_is_emitted_as_value() {
    let ticks = cursor::decode_ticks(&[0x01, 0x00, 0x7B]);
    assert_eq!(ticks, vec![1, 123]);
}

#[test]
fn cursor_encoding_appends_single_terminator() {
    let bytes = cursor::encode_ticks(&[1, 2, 0x1234]);
    assert_eq!(bytes, vec![0x01, 0x00, 0x02, 0x00, 0x34, 0x12, 0xFF]);
}

#[test]
fn cursor_unit_conversion() {
    assert_eq!(cursor::cursor_to_tick(24, 480), 480.0);
    assert_eq!(cursor::tick_to_cursor(480.0, 480), 24);
    assert_eq!(cursor::cursor_to_tick(10, 0), 0.0);
    assert_eq!(cursor::tick_to_cursor(10.0, 0), 0);
}

// ── Segmentation ───────────────────────────────────────────────────────────

#[test]
fn segmentation_worked_example() {
    let lines = vec![vec!["a", "b"], vec!["c"]];
    let ticks = [0u16, 1, 2, 10, 20];

    let segments = cursor::segment_by_words(&lines, &ticks).unwrap();
    assert_eq!(segments.len(), 2);

    assert_eq!(segments[0].start, 0);
    assert_eq!(segments[0].word_ticks, vec![1, 2]);
    assert_eq!(segments[0].end, 2);
    assert_eq!(segments[0].word_count, 2);

    assert_eq!(segments[1].start, 10);
    assert_eq!(segments[1].word_ticks, vec![20]);
    assert_eq!(segments[1].end, 20);
}

#[test]
fn segmentation_consumes_exactly_sum_plus_line_count() {
    let lines: Vec<Vec<String>> = vec![
        "สวัสดี".chars().map(String::from).collect(),
        "ครับ".chars().map(String::from).collect(),
    ];
    let unit_count: usize = lines.iter().map(Vec::len).sum();
    let ticks: Vec<u16> = (0..(unit_count + lines.len()) as u16).collect();

    let segments = cursor::segment_by_words(&lines, &ticks).unwrap();
    assert_eq!(segments.len(), lines.len());
    // The final word tick must be the final tick: nothing left over.
    assert_eq!(segments.last().unwrap().end, *ticks.last().unwrap());
}

#[test]
fn segmentation_rejects_short_tick_streams() {
    let lines = vec![vec!["a", "b"], vec!["c"]];
    let ticks = [0u16, 1, 2, 10]; // one short

    match cursor::segment_by_words(&lines, &ticks) {
        Err(EmkError::InsufficientTicks {
            line: 1,
            needed: 2,
            available: 1,
        }) => {}
        other => panic!("expected InsufficientTicks, got {:?}", other),
    }
}

// ── Lyric files ────────────────────────────────────────────────────────────

#[test]
fn lyr_file_round_trips() {
    let lyr = LyrFile {
        title: "Song".to_string(),
        artist: "Artist".to_string(),
        key: "Cm".to_string(),
        lines: vec!["first line".to_string(), "second line".to_string()],
    };
    assert_eq!(LyrFile::parse(&lyr.to_text()), lyr);
}

#[test]
fn lyr_file_parse_drops_trailing_blank_lines() {
    let parsed = LyrFile::parse("Song\nArtist\nC\n\nline\n\n");
    assert_eq!(parsed.lines, vec!["line"]);
}

#[test]
fn lyr_line_units_count_every_character() {
    let lyr = LyrFile {
        lines: vec!["ab".to_string(), "\u{0E01}\u{0E31}".to_string()],
        ..Default::default()
    };
    let units = lyr.line_units();
    assert_eq!(units[0].len(), 2);
    // Combining marks still count as units for cursor alignment.
    assert_eq!(units[1].len(), 2);
}

#[test]
fn thai_clusters_absorb_combining_marks() {
    // กั = base ก + combining ั; ข stands alone.
    let clusters = clusters_from_text("\u{0E01}\u{0E31}\u{0E02}");
    assert_eq!(clusters, vec!["\u{0E01}\u{0E31}".to_string(), "\u{0E02}".to_string()]);
}
