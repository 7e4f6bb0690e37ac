//! Writing the move sequence to the result artifact.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Write one move per line. An empty `moves` produces an empty file, which
/// is how "no solution" is recorded.
pub fn save_solution<P: AsRef<Path>>(path: P, moves: &[String]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    for step in moves {
        writeln!(writer, "{step}")?;
    }
    writer.flush()?;
    log::info!("Saved {} moves to {}", moves.len(), path.display());
    Ok(())
}
