#![no_main]

use std::collections::HashMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use msglib::{deserialize_with_config, record, CodecConfig};

record! {
    #[derive(Debug, Default)]
    struct Target {
        flag: bool => 1,
        number: i64 => 2,
        text: String => 3,
        blob: Vec<u8> => 4,
        list: Vec<Vec<i32>> => 5,
        map: HashMap<String, f64> => 6,
        members: HashMap<i32, bool> => 7 set,
        nested: Option<Box<Target>> => 8,
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    data: Vec<u8>,
    max_depth: u8,
    preallocate_limit: u16,
}

fuzz_target!(|input: FuzzInput| {
    let config = CodecConfig {
        max_depth: usize::from(input.max_depth).max(1),
        preallocate_limit: usize::from(input.preallocate_limit),
        ..CodecConfig::default()
    };

    // Декодер не должен паниковать ни на каких данных.
    let _ = deserialize_with_config::<Target>(&input.data, &config);
});
