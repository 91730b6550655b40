//! Scan stdin with a family of rules, and print every frame.
//!
//! Frames from nested scans are printed indented under the frame they re-scan.
//!
//! ```ignore
//! <input.scm scan_to_debug demos/scheme.toml
//! ```
//!
//! Set `RUST_LOG=lexish=debug` to see skipped symbols and per-level stats,
//! and `LEXISH_STRICT=1` to stop at the first unrecognized symbol.

use std::error::Error;
use std::io::Write;

use lexish::{Family, FamilyDescription, ReadSource, SymbolSource, TokenStream};

fn dump<S: SymbolSource>(
    stream: &mut TokenStream<S>,
    family: &Family,
    level: usize,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    loop {
        let frame = stream.next(level)?;
        let rule = frame.rule.and_then(|r| family.get(r));
        let name = rule.and_then(|a| a.name()).unwrap_or("");
        writeln!(out, "{:indent$}{frame} {name}", "", indent = level * 2)?;
        if frame.is_sentinel() {
            return Ok(());
        }
        if let Some(nested) = rule.map(|a| a.nested()).filter(|f| !f.is_empty()) {
            dump(stream, nested, level + 1, out)?;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: scan_to_debug <rules.toml> <input")?;
    let description = FamilyDescription::from_toml(&std::fs::read_to_string(&path)?)?;
    let family = description.build()?;
    let options = description.options.clone().with_env_overrides();
    tracing::debug!("effective options:\n{}", options.to_toml()?);

    let source = ReadSource::new(std::io::stdin().lock());
    let mut stream = TokenStream::with_options(family.clone(), source, options);
    let mut stdout = std::io::stdout().lock();
    dump(&mut stream, &family, 0, &mut stdout)
}
