#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use msglib::{deserialize, record, serialize};

record! {
    #[derive(Debug, Default, PartialEq)]
    struct Message {
        flag: bool => 1,
        small: i16 => 2,
        unsigned: u32 => 3,
        large: i64 => 4,
        text: String => 5,
        blob: Vec<u8> => 6,
        numbers: Vec<i64> => 7,
        index: BTreeMap<String, i32> => 8,
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzMessage {
    flag: bool,
    small: i16,
    unsigned: u32,
    large: i64,
    text: String,
    blob: Vec<u8>,
    numbers: Vec<i64>,
    index: BTreeMap<String, i32>,
}

fuzz_target!(|input: FuzzMessage| {
    let message = Message {
        flag: input.flag,
        small: input.small,
        unsigned: input.unsigned,
        large: input.large,
        text: input.text,
        blob: input.blob,
        numbers: input.numbers,
        index: input.index,
    };

    let bytes = serialize(&message).expect("encode must succeed");
    let back: Message = deserialize(&bytes).expect("decode of own output must succeed");
    assert_eq!(back, message);
});
