//! Некорректный вход: каждая порча байт должна давать типизированную
//! ошибку, а не панику или чтение за границей буфера.

use std::collections::HashMap;

use msglib::{
    decode_dynamic, deserialize, deserialize_with_config,
    protocol::{BinaryProtocol, Protocol},
    record, CodecConfig, CodecError, StatusCode,
};
use rstest::rstest;

record! {
    #[derive(Debug, Default, PartialEq)]
    struct Probe {
        number: i32 => 1,
        text: String => 2,
        items: Vec<i32> => 3,
        index: HashMap<String, i32> => 4,
        flag: bool => 5,
    }
}

const NEGATIVE_ONE: [u8; 10] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];

fn with_prefix(
    prefix: &[u8],
    rest: &[u8],
) -> Vec<u8> {
    let mut out = prefix.to_vec();
    out.extend_from_slice(rest);
    out
}

/// Тест проверяет код статуса для каждого вида порчи входа.
#[rstest]
#[case::empty(vec![], StatusCode::UnexpectedEof)]
#[case::zero_tag(vec![0x00], StatusCode::InvalidTag)]
#[case::tag_fifteen(vec![0x1F], StatusCode::InvalidTag)]
#[case::varint_overflow(vec![0x15, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF], StatusCode::InvalidInteger)]
#[case::varint_tenth_byte(vec![0x15, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02], StatusCode::InvalidInteger)]
#[case::negative_length(with_prefix(&[0x2A], &NEGATIVE_ONE), StatusCode::InvalidLength)]
#[case::truncated_string(vec![0x2A, 0x05, b'a'], StatusCode::UnexpectedEof)]
#[case::invalid_utf8(vec![0x2A, 0x02, 0xC3, 0x28, 0x01], StatusCode::InvalidUtf8)]
#[case::field_tag_mismatch(vec![0x1A, 0x01, b'a', 0x01], StatusCode::TypeError)]
#[case::element_tag_mismatch(vec![0x3D, 0x1A, 0x01, b'a', 0x01], StatusCode::TypeError)]
#[case::null_element_tag(vec![0x3D, 0x11, 0x01], StatusCode::InvalidMarker)]
#[case::count_exceeds_input(vec![0x3D, 0x35, 0x02], StatusCode::InvalidLength)]
#[case::huge_map_count(vec![0x4C, 0xFF, 0xFF, 0xFF, 0x7F, 0x5A], StatusCode::SizeLimit)]
#[case::missing_stop(vec![0x15, 0x02], StatusCode::UnexpectedEof)]
fn test_malformed_input(
    #[case] input: Vec<u8>,
    #[case] expected: StatusCode,
) {
    let err = deserialize::<Probe>(&input).unwrap_err();
    assert_eq!(err.status_code(), expected, "{err}");
}

/// Тест проверяет, что пропуск неизвестных полей подчиняется тем же
/// лимитам, что и полное декодирование.
#[rstest]
#[case::negative_length(with_prefix(&[0x9A, 0x01], &NEGATIVE_ONE), StatusCode::InvalidLength)]
#[case::count_exceeds_input(vec![0x9D, 0x01, 0x85, 0x7D, 0x02], StatusCode::InvalidLength)]
#[case::size_limit(vec![0x9D, 0x01, 0xF5, 0xFF, 0xFF, 0xFF, 0x0F], StatusCode::SizeLimit)]
#[case::truncated_nested(vec![0x9B, 0x01, 0x15], StatusCode::UnexpectedEof)]
fn test_malformed_unknown_field(
    #[case] input: Vec<u8>,
    #[case] expected: StatusCode,
) {
    let err = deserialize::<Probe>(&input).unwrap_err();
    assert_eq!(err.status_code(), expected, "{err}");
}

/// Тест проверяет лимит глубины на цепочке вложенных неизвестных структур.
#[test]
fn test_depth_bomb_in_unknown_field() {
    // маркер поля (9 << 4) | Struct = 155 занимает два байта варинта,
    // повторён пятьсот раз
    let input = [0x9B, 0x01].repeat(500);
    let err = deserialize::<Probe>(&input).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CodecError>(),
        Some(CodecError::DepthLimit { max: 64, .. })
    ));

    let err = decode_dynamic(&input).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::DepthLimit);
}

#[test]
fn test_depth_limit_from_config() {
    let config = CodecConfig {
        max_depth: 2,
        ..CodecConfig::default()
    };
    // Probe -> неизвестная структура -> неизвестная структура
    let input = [0x9B, 0x01, 0x9B, 0x01, 0x01, 0x01, 0x01];
    let err = deserialize_with_config::<Probe>(&input, &config).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::DepthLimit);

    let relaxed = CodecConfig {
        max_depth: 3,
        ..CodecConfig::default()
    };
    assert_eq!(
        deserialize_with_config::<Probe>(&input, &relaxed).unwrap(),
        Probe::default()
    );
}

/// Тест проверяет снисходительное чтение Bool: всё, кроме 0x01, = false.
#[rstest]
#[case(0x00, false)]
#[case(0x01, true)]
#[case(0x02, false)]
#[case(0xFF, false)]
fn test_lenient_bool(
    #[case] byte: u8,
    #[case] expected: bool,
) {
    let probe: Probe = deserialize(&[0x52, byte, 0x01]).unwrap();
    assert_eq!(probe.flag, expected);
}

/// Тест проверяет варинт-границы на ширинах Int32 и Int64.
#[rstest]
#[case(0)]
#[case(-1)]
#[case(1)]
#[case(i32::MAX as i64)]
#[case(i32::MIN as i64)]
#[case(i64::MAX)]
#[case(i64::MIN)]
fn test_varint_boundaries(#[case] value: i64) {
    let mut proto = BinaryProtocol::new();

    let mut buf = Vec::new();
    proto.write_i64(&mut buf, value).unwrap();
    assert_eq!(proto.read_i64(&mut buf.as_slice()).unwrap(), value);

    let narrow = value as i32;
    let mut buf = Vec::new();
    proto.write_i32(&mut buf, narrow).unwrap();
    assert_eq!(proto.read_i32(&mut buf.as_slice()).unwrap(), narrow);
}

/// Тест проверяет усечение значений Int64 при чтении в более узкий тип.
#[test]
fn test_narrowing_truncates() {
    let mut proto = BinaryProtocol::new();
    let value = (1i64 << 40) + 5;

    let mut buf = Vec::new();
    proto.write_i64(&mut buf, value).unwrap();
    assert_eq!(proto.read_i32(&mut buf.as_slice()).unwrap(), 5);
    assert_eq!(proto.read_i16(&mut buf.as_slice()).unwrap(), 5);

    let mut buf = Vec::new();
    proto.write_i64(&mut buf, i64::MAX).unwrap();
    assert_eq!(proto.read_i32(&mut buf.as_slice()).unwrap(), -1);
}

/// Тест проверяет, что ни один префикс корректного сообщения не
/// декодируется успешно и не паникует.
#[test]
fn test_every_prefix_fails_cleanly() {
    let mut index = HashMap::new();
    index.insert("k".to_string(), 3);
    let probe = Probe {
        number: 300,
        text: "abc".into(),
        items: vec![1, -2, 3],
        index,
        flag: true,
    };
    let bytes = msglib::serialize(&probe).unwrap();
    assert_eq!(deserialize::<Probe>(&bytes).unwrap(), probe);

    for cut in 0..bytes.len() {
        let err = deserialize::<Probe>(&bytes[..cut]).unwrap_err();
        assert!(err.is_malformed_input(), "cut {cut}: {err}");
    }
}

/// Тест проверяет, что после ошибки глубины декодеру снова доступен
/// весь запас вложенности.
#[test]
fn test_decoder_depth_restored_after_error() {
    use msglib::{codec::decode::read_record, Decoder};

    let config = CodecConfig {
        max_depth: 2,
        ..CodecConfig::default()
    };
    let mut proto = BinaryProtocol::new();
    let input = [0x9B, 0x01, 0x9B, 0x01, 0x01, 0x01, 0x01];
    let mut reader = &input[..];
    let mut dec = Decoder::new(&mut reader, &mut proto, config);

    let err = read_record::<Probe, _, _>(&mut dec).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::DepthLimit);
    assert_eq!(dec.depth(), 0);

    let reached = dec.nested(|dec| dec.nested(|dec| Ok(dec.depth())));
    assert_eq!(reached.unwrap(), 2);
    assert_eq!(dec.depth(), 0);
}
