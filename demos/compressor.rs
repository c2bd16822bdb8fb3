//! `cargo run --example compressor -- <input-path>`
//!
//! Reads the file at `<input-path>`, trains a dictionary over its bytes,
//! and writes two sibling files: `<input-path>.bpe` (the encoded `u32`
//! token stream) and `<input-path>.dict` (the serialized dictionary).
//! Mirrors `original_source/main.c`'s CLI shape; exits `1` on any error.

use bpe_compressor::{encode, TrainingOptions};
use std::env;
use std::fs;
use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: {} <input-path>", args[0]);
        return ExitCode::FAILURE;
    }
    let input_path = &args[1];

    match run(input_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{input_path}: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(input_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input_path)?;
    let result = encode(&bytes, TrainingOptions::default())?;

    log::info!(
        "{input_path}: {} bytes -> {} tokens, {} merges",
        bytes.len(),
        result.encoded.len(),
        result.dictionary.len() - 256,
    );

    let mut encoded_out = fs::File::create(format!("{input_path}.bpe"))?;
    for &symbol in &result.encoded {
        encoded_out.write_all(&symbol.to_le_bytes())?;
    }

    let mut dict_out = fs::File::create(format!("{input_path}.dict"))?;
    result.dictionary.serialize(&mut dict_out)?;

    Ok(())
}
