// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Analysis pipeline benchmarks
//!
//! Runs parsing, decomposition, optimization and compilation over a
//! synthetic module with a growing number of helpers and methods.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dotpack_compiler::parser::parse;
use dotpack_compiler::{BuildConfig, BuildPipeline, compile_session};

/// A module with `size` helpers, each used by one method
fn synthetic_module(size: usize) -> String {
    let mut source = String::from("'use strict';\n\n/***\n * @namespace String\n ***/\n\nvar CHUNK_SIZE = 4;\nvar cache = {};\n\n");
    for i in 0..size {
        source.push_str(&format!("function helper{i}(str) {{\n  return str.slice(0, CHUNK_SIZE) + cache[{i}];\n}}\n\n"));
    }
    source.push_str("defineInstance(sugarString, {\n\n");
    for i in 0..size {
        source.push_str(&format!("  'method{i}': function(str) {{\n    return helper{i}(str);\n  }},\n\n"));
    }
    source.push_str("  'last': function() {}\n\n});\n");
    source
}

fn common_module() -> &'static str {
    "var sugarString = Sugar.String;\n"
}

fn config() -> BuildConfig {
    let mut config = BuildConfig::default();
    config.project.modules = vec!["common".to_string(), "string".to_string()];
    config
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [10, 100, 500] {
        let source = synthetic_module(size);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| b.iter(|| parse(black_box(source)).unwrap()));
    }
    group.finish();
}

fn bench_build_graph(c: &mut Criterion) {
    let config = config();
    let pipeline = BuildPipeline::new(&config);

    let mut group = c.benchmark_group("build_graph");
    for size in [10, 100, 500] {
        let source = synthetic_module(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| {
                let mut session = pipeline
                    .analyze_sources([("common", common_module()), ("string", black_box(source.as_str()))])
                    .unwrap();
                pipeline.optimize(&mut session).unwrap();
                compile_session(session).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(pipeline_benches, bench_parse, bench_build_graph);
criterion_main!(pipeline_benches);
