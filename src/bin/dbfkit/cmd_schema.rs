use anyhow::{Context, Result};
use std::path::PathBuf;

use dbfkit::{Access, Dbf, FieldType};

fn open_rw(path: &PathBuf) -> Result<Dbf> {
    Dbf::open(path, Access::ReadWrite).with_context(|| format!("open {}", path.display()))
}

pub fn exec_add(
    path: PathBuf,
    name: String,
    ftype: FieldType,
    width: usize,
    decimals: usize,
) -> Result<()> {
    let mut dbf = open_rw(&path)?;
    let index = dbf.add_field(&name, ftype, width, decimals)?;
    dbf.close()?;
    println!("added field {:?} at index {}", name, index);
    Ok(())
}

pub fn exec_delete(path: PathBuf, field: usize) -> Result<()> {
    let mut dbf = open_rw(&path)?;
    let name = dbf
        .field(field)
        .map(|f| f.name.clone())
        .unwrap_or_default();
    dbf.delete_field(field)?;
    dbf.close()?;
    println!("deleted field {} ({:?})", field, name);
    Ok(())
}

pub fn exec_alter(
    path: PathBuf,
    field: usize,
    name: String,
    ftype: FieldType,
    width: usize,
    decimals: usize,
) -> Result<()> {
    let mut dbf = open_rw(&path)?;
    dbf.alter_field(field, &name, ftype, width, decimals)?;
    dbf.close()?;
    println!(
        "altered field {}: {:?} {} width={} decimals={}",
        field,
        name,
        ftype.to_tag() as char,
        width,
        decimals
    );
    Ok(())
}

pub fn exec_reorder(path: PathBuf, order: Vec<usize>) -> Result<()> {
    let mut dbf = open_rw(&path)?;
    dbf.reorder_fields(&order)?;
    dbf.close()?;
    println!("reordered {} fields", order.len());
    Ok(())
}
