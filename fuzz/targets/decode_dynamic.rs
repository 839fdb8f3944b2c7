#![no_main]

use libfuzzer_sys::fuzz_target;
use msglib::{protocol::TypeTag, skip_value, BinaryProtocol};

fuzz_target!(|data: &[u8]| {
    // Разбор без схемы и пропуск должны потреблять одинаковое число байт.
    let dynamic = msglib::decode_dynamic(data);

    let mut input = data;
    let skipped = skip_value(&mut input, &mut BinaryProtocol::new(), TypeTag::Struct);

    if dynamic.is_ok() {
        assert!(skipped.is_ok(), "skip failed where dynamic decode succeeded");
    }
});
