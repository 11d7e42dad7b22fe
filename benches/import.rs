//! Benchmarks for reference import.
//!
//! Tests performance of the operations a linker runs for every token it moves:
//! - Signature rewriting (method, local and generic instance signatures)
//! - Vararg call-site projection
//! - Public key token computation
//! - Type definition import, first time and with existing references

extern crate dotlink;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use dotlink::prelude::*;
use std::hint::black_box;
use uguid::guid;

fn def_to_ref(token: Token) -> Result<Token> {
    Ok(Token::from_parts(TableId::TypeRef, token.row()))
}

/// Benchmark rewriting an instance method signature with class parameters.
/// Signature: instance class A Method(class B, valuetype C, int32)
fn bench_signature_method_tokens(c: &mut Criterion) {
    let signature = [0x20, 0x03, 0x12, 0x08, 0x12, 0x0C, 0x11, 0x10, 0x08];

    c.bench_function("import_sig_method_tokens", |b| {
        b.iter(|| {
            let mut translate = def_to_ref;
            let sig = import_signature(black_box(&signature), &mut translate, 64).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark rewriting a local variable signature with nested generic instances.
/// Signature: locals (List<Dictionary<A, B>>, pinned int32&)
fn bench_signature_locals_generic(c: &mut Criterion) {
    let signature = [
        0x07, 0x02, 0x15, 0x12, 0x08, 0x01, 0x15, 0x12, 0x0C, 0x02, 0x12, 0x10, 0x12, 0x14,
        0x45, 0x10, 0x08,
    ];

    c.bench_function("import_sig_locals_generic", |b| {
        b.iter(|| {
            let mut translate = def_to_ref;
            let sig = import_signature(black_box(&signature), &mut translate, 64).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark projecting a vararg method definition signature.
/// Signature: vararg void Method(string, ..., int32, float64)
fn bench_vararg_projection(c: &mut Criterion) {
    let signature = [0x05, 0x03, 0x01, 0x0E, 0x41, 0x08, 0x0D];

    c.bench_function("project_vararg", |b| {
        b.iter(|| {
            let sig = project_method_def_sig(black_box(&signature)).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark computing the public key token of the ECMA key.
fn bench_strong_name_token(c: &mut Criterion) {
    let key = ECMA_PUBLIC_KEY;

    c.bench_function("strong_name_token_ecma", |b| {
        b.iter(|| {
            let token = StrongNameToken::from_public_key(black_box(&key)).unwrap();
            black_box(token)
        });
    });
}

fn images() -> (Image, Token, Image) {
    let mut lib =
        ImageBuilder::new("Lib.dll", guid!("0d9b3a44-1c2e-4f5a-8b6c-7d8e9fa0b1c2")).unwrap();
    lib.assembly(
        &AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0))
            .with_public_key(&ECMA_PUBLIC_KEY),
    )
    .unwrap();
    for index in 0..64 {
        lib.type_def("Lib", &format!("Filler{}", index), 0).unwrap();
    }
    let outer = lib.type_def("Lib", "Outer", 0).unwrap();
    let inner = lib.nested_type_def(outer, "Inner", 0).unwrap();

    let mut app =
        ImageBuilder::new("App.exe", guid!("6f1e2d3c-4b5a-4968-8776-a5b4c3d2e1f0")).unwrap();
    app.assembly(&AssemblyIdentity::new("App", AssemblyVersion::new(1, 0, 0, 0)))
        .unwrap();

    (lib.build(), inner, app.build())
}

/// Benchmark importing a nested type into a fresh destination each iteration.
fn bench_import_nested_type_def_fresh(c: &mut Criterion) {
    c.bench_function("import_nested_type_def_fresh", |b| {
        b.iter_batched(
            images,
            |(lib, inner, app)| {
                let context = ImportContext::new(lib.clone(), lib, app.clone(), app);
                let token = context
                    .import_reference_to_type_def(black_box(inner), false, &mut |_| {})
                    .unwrap();
                black_box(token)
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark importing a nested type whose references already exist.
fn bench_import_nested_type_def_existing(c: &mut Criterion) {
    let (lib, inner, app) = images();
    let context = ImportContext::new(lib.clone(), lib, app.clone(), app);
    context
        .import_reference_to_type_def(inner, false, &mut |_| {})
        .unwrap();

    c.bench_function("import_nested_type_def_existing", |b| {
        b.iter(|| {
            let token = context
                .import_reference_to_type_def(black_box(inner), false, &mut |_| {})
                .unwrap();
            black_box(token)
        });
    });
}

criterion_group!(
    benches,
    // Signatures
    bench_signature_method_tokens,
    bench_signature_locals_generic,
    bench_vararg_projection,
    bench_strong_name_token,
    // Import
    bench_import_nested_type_def_fresh,
    bench_import_nested_type_def_existing,
);
criterion_main!(benches);
