#![no_main]
use huff::codec::{self, TreeFormat};
use huff::{Decoder, EncodedPayload};
use libfuzzer_sys::fuzz_target;

// Arbitrary tree and payload bytes must produce an error, never a panic.
fuzz_target!(|data: (Vec<u8>, Vec<u8>, bool)| {
    let (tree_bytes, payload_bytes, marker) = data;
    let format = if marker { TreeFormat::Marker } else { TreeFormat::Tagged };
    let Ok(tree) = codec::read_tree_with(&tree_bytes, format) else {
        return;
    };
    let Ok(mut payload) = EncodedPayload::from_bytes(&payload_bytes) else {
        return;
    };
    // Keep single-leaf output bounded
    payload.header.symbol_count = payload.header.symbol_count.min(1 << 16);
    let _ = Decoder::new(&tree).decode_payload(&payload);
});
