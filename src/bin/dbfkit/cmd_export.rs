use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;

use dbfkit::{Access, Dbf, FieldKind};

/// DBF -> TSV: первая строка — имена полей, NULL печатается пустой ячейкой.
pub fn exec(path: PathBuf) -> Result<()> {
    let mut dbf = Dbf::open(&path, Access::ReadOnly)
        .with_context(|| format!("open {}", path.display()))?;

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    let names: Vec<String> = dbf.fields().iter().map(|f| f.name.clone()).collect();
    let kinds: Vec<FieldKind> = dbf.fields().iter().map(|f| f.kind()).collect();
    writeln!(out, "{}", names.join("\t"))?;

    for rec in 0..dbf.record_count() {
        for (i, kind) in kinds.iter().enumerate() {
            if i > 0 {
                out.write_all(b"\t")?;
            }
            if dbf.is_null(rec, i)? {
                continue;
            }
            match kind {
                FieldKind::Text => {
                    if let Some(s) = dbf.read_string(rec, i)? {
                        out.write_all(s.as_bytes())?;
                    }
                }
                FieldKind::Integer => {
                    if let Some(v) = dbf.read_integer(rec, i)? {
                        write!(out, "{}", v)?;
                    }
                }
                FieldKind::Double => {
                    if let Some(v) = dbf.read_double(rec, i)? {
                        write!(out, "{:.6}", v)?;
                    }
                }
                FieldKind::Logical => {
                    if let Some(c) = dbf.read_logical(rec, i)? {
                        write!(out, "{}", c)?;
                    }
                }
            }
        }
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
