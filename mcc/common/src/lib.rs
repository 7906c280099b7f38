//! Common items used by the compiler

mod input_file;
pub use input_file::{Code, CodeId, CodeRef, InputFiles};

mod span;
pub use span::Span;

mod compile_context;
pub use compile_context::CompileContext;

mod config;
pub use config::Config;

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

pub use smol_str::SmolStr;
