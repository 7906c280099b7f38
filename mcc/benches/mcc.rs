use std::rc::Rc;

use criterion::{criterion_group, criterion_main, Criterion};
use mcc_lang::{
    common::{Code, CompileContext, Config},
    parser::{assemble, tokenize},
    CompileConfig,
};

const BENCHES: [(&str, &str); 3] = [
    ("basic", include_str!("benchmarks/basic.mcc")),
    ("long", include_str!("benchmarks/long.mcc")),
    ("math", include_str!("benchmarks/math.mcc")),
];

fn run_compiler_benchmarks(c: &mut Criterion) {
    for (name, bench) in BENCHES {
        let mut config = CompileConfig::new(Config::default());
        let id = config.add_source(bench);
        c.bench_function(&format!("compile {name}"), |b| {
            b.iter(|| config.compile(id).unwrap());
        });
    }
}

fn run_parser_benchmarks(c: &mut Criterion) {
    let registry = Rc::new(mcc_std::load());
    for (name, bench) in BENCHES {
        let mut compile_context = CompileContext::new(Config::default());
        let id = compile_context.add_input_file(Code {
            source: bench.into(),
            path: None,
        });
        let code_ref = compile_context.input_files.get_code_ref(id);
        c.bench_function(&format!("parse {name}"), |b| {
            b.iter(|| assemble(tokenize(code_ref, &*registry).unwrap()).unwrap());
        });
    }
}

criterion_group!(compiler_benchmarks, run_compiler_benchmarks);
criterion_group!(parser_benchmarks, run_parser_benchmarks);
criterion_main!(parser_benchmarks, compiler_benchmarks);
