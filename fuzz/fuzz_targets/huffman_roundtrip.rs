#![no_main]
use huff::codec::{self, TreeFormat};
use huff::{BitFormat, Decoder, Encoder, FrequencyTable, HuffmanTree};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, bool)| {
    let (input, ascii) = data;
    if input.is_empty() {
        return;
    }
    let format = if ascii { BitFormat::Ascii } else { BitFormat::Packed };

    let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&input)).unwrap();
    let stored = codec::write_tree_with(&tree, TreeFormat::Tagged).unwrap();
    let loaded = codec::read_tree(&stored).unwrap();
    assert!(loaded.same_shape(&tree));

    let payload = Encoder::new(&tree).encode_bytes(&input, format).unwrap();
    let output = Decoder::new(&loaded).decode_payload(&payload).unwrap();
    assert_eq!(input, output);
});
