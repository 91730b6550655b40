//! Render a family of rules as Graphviz.
//!
//! ```ignore
//! family_to_graphviz demos/scheme.toml | dot -T png >rules.png
//! family_to_graphviz --svg demos/scheme.toml >rules.svg
//! ```

use std::error::Error;
use std::io::Write;

use lexish::render::{render_family, render_svg};
use lexish::FamilyDescription;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let mut svg = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--svg" => svg = true,
            _ => path = Some(arg),
        }
    }
    let path = path.ok_or("usage: family_to_graphviz [--svg] <rules.toml>")?;
    let family = FamilyDescription::from_toml(&std::fs::read_to_string(&path)?)?.build()?;

    let out = if svg {
        render_svg(&family)?.into_bytes()
    } else {
        render_family(&family)
    };
    std::io::stdout().lock().write_all(&out)?;
    Ok(())
}
