use huff::{BitFormat, Decoder, Encoder, FrequencyTable, HuffmanTree};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn sample_text() -> Vec<u8> {
    // Skewed, text-like distribution
    let words = ["the ", "quick ", "brown ", "fox ", "jumps ", "over ", "lazy ", "dog ", "\n"];
    (0..64 * 1024)
        .map(|i| words[(i * 7 + i / 13) % words.len()])
        .flat_map(|w| w.bytes())
        .take(64 * 1024)
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let data = sample_text();
    let mut group = c.benchmark_group("huffman_build");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("count", |b| {
        b.iter(|| FrequencyTable::from_bytes(black_box(&data)))
    });

    let table = FrequencyTable::from_bytes(&data);
    group.bench_function("tree", |b| {
        b.iter(|| HuffmanTree::build(black_box(&table)).unwrap())
    });

    let full = FrequencyTable::from_counts(std::array::from_fn(|i| i as u64 + 1));
    group.bench_function("tree_256", |b| {
        b.iter(|| HuffmanTree::build(black_box(&full)).unwrap())
    });
}

fn bench_codec(c: &mut Criterion) {
    let data = sample_text();
    let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&data)).unwrap();
    let encoder = Encoder::new(&tree);
    let mut group = c.benchmark_group("huffman_codec");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("encode", |b| {
        b.iter(|| encoder.encode_bytes(black_box(&data), BitFormat::Packed).unwrap())
    });

    let payload = encoder.encode_bytes(&data, BitFormat::Packed).unwrap();
    let decoder = Decoder::new(&tree);
    group.bench_function("decode", |b| {
        b.iter(|| decoder.decode_payload(black_box(&payload)).unwrap())
    });
}

criterion_group!(benches, bench_build, bench_codec);
criterion_main!(benches);
