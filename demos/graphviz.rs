//! `cargo run --example graphviz -- <input-path> [--with-leaves]`
//!
//! Trains a dictionary over `<input-path>` and emits the merge DAG as
//! Graphviz `.dot` text on stdout: `dot -Tpng` it yourself, per the
//! external-interface contract — this demo does not invoke `dot`.
//! Grounded in `original_source/bpe/src/bpe.c`'s `print_graph`.

use bpe_compressor::{encode, TrainingOptions};
use std::env;
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let with_leaves = args.iter().any(|a| a == "--with-leaves");
    let input_path = match args.iter().skip(1).find(|a| !a.starts_with("--")) {
        Some(p) => p,
        None => {
            eprintln!("usage: {} <input-path> [--with-leaves]", args[0]);
            return ExitCode::FAILURE;
        }
    };

    match run(input_path, with_leaves) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{input_path}: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(input_path: &str, with_leaves: bool) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input_path)?;
    let result = encode(&bytes, TrainingOptions::default())?;
    let dict = &result.dictionary;

    println!("digraph merges {{");
    for symbol in 256..dict.len() as u32 {
        let rule = dict.rule(symbol)?;
        println!("  n{symbol} -> n{};", rule.a);
        println!("  n{symbol} -> n{};", rule.b);
    }
    if with_leaves {
        for symbol in 0..256u32 {
            if dict.is_leaf(symbol)? {
                let label = printable(symbol as u8);
                println!("  n{symbol} [label=\"{label}\"];");
            }
        }
    }
    println!("}}");

    Ok(())
}

fn printable(byte: u8) -> String {
    if byte.is_ascii_graphic() || byte == b' ' {
        (byte as char).to_string()
    } else {
        format!("\\\\x{byte:02x}")
    }
}
