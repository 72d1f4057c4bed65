//! Parse, generate and translate throughput.
//!
//! Run with: cargo bench -p normalize-codemodel-bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use normalize_codemodel::{
    CSharpGenerator, GenerateOptions, ParseOptions, PythonGenerator, parse_python,
};

/// A module with `count` classes, each with a constructor, a property and `methods` methods.
fn python_classes(count: usize, methods: usize) -> String {
    let mut source = String::from("from typing import List\n\n\n");
    for i in 0..count {
        source.push_str(&format!(
            "class Account{i}:\n    \"\"\"Account number {i}.\"\"\"\n\n    def __init__(self, owner: str):\n        self.owner = owner\n        self.items: List[float] = []\n\n    @property\n    def size(self) -> int:\n        return len(self.items)\n"
        ));
        for j in 0..methods {
            source.push_str(&format!(
                "\n    def method_{j}(self, value: float) -> float:\n        total = 0.0\n        for item in self.items:\n            if item > value:\n                total += item\n            else:\n                total -= value\n        return total\n"
            ));
        }
        source.push_str("\n\n");
    }
    source
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_python");
    let options = ParseOptions::default();

    for (classes, methods) in [(10, 5), (50, 5), (10, 20)] {
        let source = python_classes(classes, methods);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{classes}x{methods}")),
            &source,
            |b, src| b.iter(|| parse_python(black_box(src), "bench", &options)),
        );
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let options = GenerateOptions::default();

    for (classes, methods) in [(10, 5), (50, 5)] {
        let source = python_classes(classes, methods);
        let Ok(file) = parse_python(&source, "bench", &ParseOptions::default()) else {
            continue;
        };
        let id = format!("{classes}x{methods}");
        group.bench_with_input(BenchmarkId::new("python", &id), &file, |b, file| {
            b.iter(|| PythonGenerator::emit(black_box(file), &options))
        });
        group.bench_with_input(BenchmarkId::new("csharp", &id), &file, |b, file| {
            b.iter(|| CSharpGenerator::emit(black_box(file), &options))
        });
    }

    group.finish();
}

fn bench_translate(c: &mut Criterion) {
    let source = python_classes(20, 10);
    c.bench_function("translate_python_to_csharp", |b| {
        b.iter(|| {
            parse_python(black_box(&source), "bench", &ParseOptions::default())
                .ok()
                .map(|file| CSharpGenerator::emit(&file, &GenerateOptions::default()))
        })
    });
}

criterion_group!(benches, bench_parse, bench_generate, bench_translate);
criterion_main!(benches);
