use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

use dbfkit::field::parse_double_permissive;
use dbfkit::{Dbf, FieldType};

/// Выведенный тип колонки. Integer деградирует в Double при первой точке,
/// всё остальное — в Text; обратной дороги нет.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InferKind {
    Integer,
    Double,
    Text,
}

#[derive(Debug)]
struct ColumnSpec {
    kind: InferKind,
    width: usize,
    decimals: usize,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        ColumnSpec {
            kind: InferKind::Integer,
            width: 0,
            decimals: 0,
        }
    }
}

/// Классификация одной ячейки: целое, пока не встретилась точка, текст —
/// при любом другом не-цифровом байте (включая знак минуса и вторую точку).
fn classify_cell(cell: &str) -> (InferKind, usize, usize) {
    let mut kind = InferKind::Integer;
    let mut decimals = 0usize;
    for &b in cell.as_bytes() {
        if b.is_ascii_digit() {
            if kind == InferKind::Double {
                decimals += 1;
            }
        } else if b == b'.' && kind == InferKind::Integer {
            kind = InferKind::Double;
        } else {
            kind = InferKind::Text;
        }
    }
    (kind, cell.len(), decimals)
}

impl ColumnSpec {
    fn observe(&mut self, cell: &str) {
        if cell.is_empty() {
            return;
        }
        let (kind, width, decimals) = classify_cell(cell);
        self.width = self.width.max(width);
        match kind {
            InferKind::Text => self.kind = InferKind::Text,
            InferKind::Double => match self.kind {
                InferKind::Integer => {
                    self.kind = InferKind::Double;
                    self.decimals = decimals;
                }
                InferKind::Double => self.decimals = self.decimals.max(decimals),
                InferKind::Text => {}
            },
            InferKind::Integer => {}
        }
    }

    /// Колонка без единого значения становится текстовой ширины 1.
    fn finalize(&mut self) {
        if self.width == 0 {
            self.kind = InferKind::Text;
            self.width = 1;
        }
    }

    fn ftype(&self) -> FieldType {
        match self.kind {
            InferKind::Text => FieldType::Character,
            InferKind::Integer | InferKind::Double => FieldType::Number,
        }
    }

    fn field_decimals(&self) -> usize {
        match self.kind {
            InferKind::Double => self.decimals,
            _ => 0,
        }
    }
}

pub fn exec(tsv: PathBuf, path: PathBuf, code_page: Option<String>) -> Result<()> {
    let text =
        fs::read_to_string(&tsv).with_context(|| format!("read {}", tsv.display()))?;
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| anyhow!("{}: empty input", tsv.display()))?;
    let names: Vec<&str> = header.split('\t').collect();

    // Проход 1: вывод типов по всем ячейкам.
    let mut cols: Vec<ColumnSpec> = names.iter().map(|_| ColumnSpec::default()).collect();
    for (lineno, line) in text.lines().enumerate().skip(1) {
        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() != names.len() {
            warn!(
                "line {}: {} columns instead of {}, row ignored",
                lineno + 1,
                cells.len(),
                names.len()
            );
            continue;
        }
        for (j, cell) in cells.iter().enumerate() {
            cols[j].observe(cell);
        }
    }
    for c in &mut cols {
        c.finalize();
    }

    let mut dbf = Dbf::create_with_code_page(&path, code_page.as_deref())
        .with_context(|| format!("create {}", path.display()))?;
    for (j, name) in names.iter().enumerate() {
        let c = &cols[j];
        dbf.add_field(name, c.ftype(), c.width, c.field_decimals())
            .with_context(|| format!("add field {:?}", name))?;
    }

    // Проход 2: данные. Пустая ячейка остаётся NULL; ошибка записи одной
    // ячейки не роняет импорт.
    let mut rec = 0usize;
    for line in text.lines().skip(1) {
        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() != names.len() {
            continue;
        }
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        for (j, cell) in cells.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let res = match cols[j].kind {
                InferKind::Integer => {
                    dbf.write_integer(rec, j, parse_double_permissive(cell) as i32)
                }
                InferKind::Double => dbf.write_double(rec, j, parse_double_permissive(cell)),
                InferKind::Text => dbf.write_string(rec, j, cell),
            };
            if let Err(e) = res {
                warn!("record {} field {}: {}", rec, j, e);
            }
        }
        rec += 1;
    }

    info!(
        "imported {} records, {} fields into {}",
        rec,
        names.len(),
        path.display()
    );
    dbf.close()?;
    Ok(())
}
