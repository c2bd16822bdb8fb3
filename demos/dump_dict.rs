//! `cargo run --example dump_dict -- <input-path>`
//!
//! Trains a dictionary over `<input-path>` and prints every composite
//! entry alongside its fully expanded byte string, for human inspection.
//! Grounded in `original_source/bpe/src/bpe.c`'s `render_pairs`/
//! `resolve_pair`; reuses the library's own memoized expansion rather
//! than reimplementing it.

use bpe_compressor::{expand_symbol, TrainingOptions};
use bpe_compressor::{encode, Symbol};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: {} <input-path>", args[0]);
        return ExitCode::FAILURE;
    }

    match run(&args[1]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {err}", args[1]);
            ExitCode::FAILURE
        }
    }
}

fn run(input_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input_path)?;
    let result = encode(&bytes, TrainingOptions::default())?;
    let dict = &result.dictionary;

    let mut memo: HashMap<Symbol, Box<[u8]>, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());

    for symbol in 256..dict.len() as u32 {
        let rule = dict.rule(symbol)?;
        let expanded = expand_symbol(symbol, dict, &mut memo)?;
        println!(
            "{symbol} = ({}, {}) -> {:?}",
            rule.a,
            rule.b,
            String::from_utf8_lossy(&expanded)
        );
    }

    Ok(())
}
