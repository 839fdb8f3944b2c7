use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    io::Cursor,
};

use bytes::Bytes;
use msglib::{
    decode_dynamic, decode_struct, deserialize, encode_struct, record, serialize, BinaryProtocol,
    DynValue, TypeTag,
};

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Scalars {
        pub flag: bool => 1,
        pub byte: u8 => 2,
        pub signed_byte: i8 => 3,
        pub short: i16 => 4,
        pub ushort: u16 => 5,
        pub int: i32 => 6,
        pub uint: u32 => 7,
        pub long: i64 => 8,
        pub ulong: u64 => 9,
        pub single: f32 => 10,
        pub double: f64 => 11,
        pub text: String => 12,
        pub blob: Vec<u8> => 13,
        pub shared: Bytes => 14,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Point {
        pub x: i32 => 1,
        pub y: i32 => 2,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Collections {
        pub points: Vec<Point> => 1,
        pub matrix: Vec<Vec<i64>> => 2,
        pub names: BTreeSet<String> => 3,
        pub ports: HashSet<u16> => 4,
        pub scores: HashMap<String, f64> => 5,
        pub index: BTreeMap<i32, Point> => 6,
        pub members: BTreeMap<String, ()> => 7,
        pub signed: Vec<i8> => 8,
        pub chunks: Vec<Vec<u8>> => 9,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Tree {
        pub label: String => 1,
        pub children: Vec<Tree> => 2,
        pub parent: Option<Box<Point>> => 3,
    }
}

fn roundtrip<T>(value: &T) -> T
where
    T: msglib::Record + std::fmt::Debug,
{
    let bytes = serialize(value).unwrap();
    deserialize(&bytes).unwrap()
}

#[test]
fn test_roundtrip_scalars() {
    let original = Scalars {
        flag: true,
        byte: 0xFF,
        signed_byte: -128,
        short: i16::MIN,
        ushort: u16::MAX,
        int: i32::MIN,
        uint: u32::MAX,
        long: i64::MAX,
        ulong: u64::MAX,
        single: 1.5,
        double: -0.25,
        text: "привет".to_string(),
        blob: vec![0, 1, 2, 255],
        shared: Bytes::from_static(b"shared"),
    };
    assert_eq!(roundtrip(&original), original);
}

/// Тест проверяет, что пустые значения не попадают на провод.
#[test]
fn test_empty_values_are_omitted() {
    assert_eq!(serialize(&Scalars::default()).unwrap(), vec![0x01]);
    assert_eq!(serialize(&Collections::default()).unwrap(), vec![0x01]);

    let only_int = Scalars {
        int: 3,
        ..Scalars::default()
    };
    // id 6 / Int32, zig-zag(3) = 6
    assert_eq!(serialize(&only_int).unwrap(), vec![0x65, 0x06, 0x01]);
}

/// Тест проверяет, что беззнаковые числа передаются как знаковые той же
/// ширины (bit-for-bit).
#[test]
fn test_unsigned_reinterpretation() {
    let value = Scalars {
        ushort: u16::MAX,
        ..Scalars::default()
    };
    let bytes = serialize(&value).unwrap();
    // id 5 / Int16, -1 в zig-zag = 1
    assert_eq!(bytes, vec![0x54, 0x01, 0x01]);
}

#[test]
fn test_roundtrip_collections() {
    let mut names = BTreeSet::new();
    names.insert("alpha".to_string());
    names.insert("beta".to_string());

    let mut scores = HashMap::new();
    scores.insert("alice".to_string(), 9.5);
    scores.insert("bob".to_string(), 7.25);

    let mut index = BTreeMap::new();
    index.insert(-1, Point { x: 1, y: 2 });
    index.insert(10, Point::default());

    let mut members = BTreeMap::new();
    members.insert("root".to_string(), ());

    let original = Collections {
        points: vec![Point { x: 1, y: -1 }, Point { x: 0, y: 0 }],
        matrix: vec![vec![1, 2, 3], vec![], vec![i64::MIN]],
        names,
        ports: [80u16, 443, 8080].into_iter().collect(),
        scores,
        index,
        members,
        signed: vec![-1, 0, 1],
        chunks: vec![b"ab".to_vec(), Vec::new()],
    };
    assert_eq!(roundtrip(&original), original);
}

/// Тест проверяет выбор тегов для контейнеров по форме типа.
#[test]
fn test_collection_tags_on_wire() {
    let mut members = BTreeMap::new();
    members.insert("root".to_string(), ());
    let value = Collections {
        members,
        signed: vec![5],
        chunks: vec![b"x".to_vec()],
        ..Collections::default()
    };
    let tree = decode_dynamic(&serialize(&value).unwrap()).unwrap();

    assert!(matches!(
        tree.field(7),
        Some(DynValue::Set {
            elem_tag: TypeTag::String,
            ..
        })
    ));
    assert!(matches!(
        tree.field(8),
        Some(DynValue::List {
            elem_tag: TypeTag::Byte,
            ..
        })
    ));
    assert!(matches!(
        tree.field(9),
        Some(DynValue::List {
            elem_tag: TypeTag::Binary,
            ..
        })
    ));
}

#[test]
fn test_roundtrip_recursive_record() {
    let original = Tree {
        label: "root".into(),
        children: vec![
            Tree {
                label: "leaf".into(),
                children: Vec::new(),
                parent: Some(Box::new(Point { x: 1, y: 1 })),
            },
            Tree::default(),
        ],
        parent: None,
    };
    assert_eq!(roundtrip(&original), original);
}

/// Тест проверяет, что `Vec<u8>` кодируется как Binary, а не список байт.
#[test]
fn test_byte_vector_is_binary() {
    let value = Scalars {
        blob: vec![1, 2, 3],
        ..Scalars::default()
    };
    let bytes = serialize(&value).unwrap();
    // id 13 / Binary: маркер 217 занимает два байта варинта, затем длина 3
    assert_eq!(bytes, vec![0xD9, 0x01, 0x03, 1, 2, 3, 0x01]);
}

#[test]
fn test_stream_of_records() {
    let mut proto = BinaryProtocol::new();
    let mut buf = Vec::new();
    for x in 0..10 {
        encode_struct(&mut buf, &mut proto, &Point { x, y: -x }).unwrap();
    }

    let mut cursor = Cursor::new(buf.as_slice());
    for x in 0..10 {
        let point: Point = decode_struct(&mut cursor, &mut proto).unwrap();
        assert_eq!(point, Point { x, y: -x });
    }
    assert_eq!(cursor.position() as usize, buf.len());
}

/// Тест проверяет, что NaN сохраняет битовое представление.
#[test]
fn test_float_special_values() {
    let value = Scalars {
        single: f32::NAN,
        double: f64::NEG_INFINITY,
        ..Scalars::default()
    };
    let back = roundtrip(&value);
    assert!(back.single.is_nan());
    assert_eq!(back.double, f64::NEG_INFINITY);
}
