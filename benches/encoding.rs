// Encoding generator benchmarks
//
// Measures single-category encoding, tuple concatenation, signature
// assembly and signature parsing - the paths the class builder hits
// for every registered method.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use objforge::runtime::encoding::{
    Encode, EncodeArgs, Encoding, method_signature, parse_signature, size_of_encoded,
};

fn bench_single_encoding(c: &mut Criterion) {
    c.bench_function("encode_primitive", |b| {
        b.iter(|| black_box(i32::encoding()))
    });

    c.bench_function("encode_pointer", |b| {
        b.iter(|| black_box(<*mut f64>::encoding()))
    });
}

fn bench_tuple_concatenation(c: &mut Criterion) {
    c.bench_function("encode_args_4", |b| {
        b.iter(|| black_box(<(i32, f32, u64, bool)>::encodings()))
    });

    c.bench_function("encode_args_8", |b| {
        b.iter(|| black_box(<(i8, u8, i16, u16, i32, u32, f32, f64)>::encodings()))
    });
}

fn bench_signature_assembly(c: &mut Criterion) {
    c.bench_function("method_signature", |b| {
        b.iter(|| black_box(method_signature::<i64, (i32, f64, bool)>()))
    });

    c.bench_function("aggregate_encoding", |b| {
        b.iter(|| {
            let members = <(i32, f32)>::encodings();
            black_box(Encoding::aggregate("Point", &members))
        })
    });
}

fn bench_signature_parsing(c: &mut Criterion) {
    c.bench_function("parse_signature_simple", |b| {
        b.iter(|| black_box(parse_signature("i@:if").unwrap()))
    });

    c.bench_function("parse_signature_nested", |b| {
        b.iter(|| black_box(parse_signature("v@:{Pair={Point=if}d}^Foo").unwrap()))
    });

    c.bench_function("size_of_aggregate", |b| {
        b.iter(|| black_box(size_of_encoded("{Pair={Point=if}d}").unwrap()))
    });
}

criterion_group!(
    benches,
    bench_single_encoding,
    bench_tuple_concatenation,
    bench_signature_assembly,
    bench_signature_parsing
);
criterion_main!(benches);
