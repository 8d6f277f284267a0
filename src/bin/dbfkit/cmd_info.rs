use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use dbfkit::{Access, Dbf};

#[derive(Serialize)]
struct FieldInfo {
    index: usize,
    name: String,
    r#type: char,
    width: usize,
    decimals: usize,
    offset: usize,
}

#[derive(Serialize)]
struct TableInfo {
    path: String,
    code_page: Option<String>,
    records: usize,
    record_length: usize,
    header_length: usize,
    fields: Vec<FieldInfo>,
}

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let dbf = Dbf::open(&path, Access::ReadOnly)
        .with_context(|| format!("open {}", path.display()))?;

    let info = TableInfo {
        path: path.display().to_string(),
        code_page: dbf.code_page().map(str::to_string),
        records: dbf.record_count(),
        record_length: dbf.record_length(),
        header_length: dbf.header_length(),
        fields: dbf
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| FieldInfo {
                index: i,
                name: f.name.clone(),
                r#type: f.ftype.to_tag() as char,
                width: f.width,
                decimals: f.decimals,
                offset: f.offset,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("path:          {}", info.path);
    println!(
        "code page:     {}",
        info.code_page.as_deref().unwrap_or("(unset)")
    );
    println!("records:       {}", info.records);
    println!("record length: {}", info.record_length);
    println!("header length: {}", info.header_length);
    println!("fields:        {}", info.fields.len());
    for f in &info.fields {
        println!(
            "  [{}] {:<10} {} width={} decimals={} offset={}",
            f.index, f.name, f.r#type, f.width, f.decimals, f.offset
        );
    }
    Ok(())
}
