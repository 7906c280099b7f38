//! The mcc compiler.
//!
//! A script is compiled in three steps: [mcc_parser] turns the source into statements,
//! [mcc_codegen] interprets those statements and emits commands, and [mcc_std] provides
//! every built-in directive and native function.
//!
//! [`CompileConfig`] ties these crates together. Look at the `mcc` binary to see how a file
//! gets compiled and written to disk.

pub use mcc_codegen as codegen;
pub use mcc_common as common;
pub use mcc_error as error;
pub use mcc_parser as parser;

mod compile_config;
pub use compile_config::CompileConfig;

mod output;
pub use output::write_files;
