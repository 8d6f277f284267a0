use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use dbfkit::{Access, Dbf, FieldType};

fn unique_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("{}_{}_{}.dbf", prefix, std::process::id(), nanos))
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_file(path);
    let _ = fs::remove_file(path.with_extension("cpg"));
}

#[test]
fn numeric_shrink_keeps_low_digits() -> Result<()> {
    let path = unique_path("dbfkit_alter_shrink");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("AGE", FieldType::Number, 5, 0)?;
    dbf.add_field("TAIL", FieldType::Character, 3, 0)?;
    dbf.write_integer(0, 0, 30)?; // окно "   30"
    dbf.write_string(0, 1, "ok")?;

    dbf.alter_field(0, "AGE", FieldType::Number, 3, 0)?;
    let f = dbf.field(0).unwrap();
    assert_eq!(f.width, 3);
    assert_eq!(dbf.record_length(), 1 + 3 + 3);

    // при ведущих пробелах выживают правые (младшие) цифры
    assert_eq!(dbf.read_integer(0, 0)?, Some(30));
    // соседнее поле переехало без потерь
    assert_eq!(dbf.read_string(0, 1)?.as_deref(), Some("ok"));
    dbf.close()?;

    let mut dbf = Dbf::open(&path, Access::ReadOnly)?;
    assert_eq!(dbf.read_integer(0, 0)?, Some(30));
    assert_eq!(dbf.read_string(0, 1)?.as_deref(), Some("ok"));

    cleanup(&path);
    Ok(())
}

#[test]
fn text_shrink_truncates_right() -> Result<()> {
    let path = unique_path("dbfkit_alter_text_shrink");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("S", FieldType::Character, 5, 0)?;
    dbf.write_string(0, 0, "HELLO")?;

    dbf.alter_field(0, "S", FieldType::Character, 3, 0)?;
    assert_eq!(dbf.read_string(0, 0)?.as_deref(), Some("HEL"));
    dbf.close()?;

    cleanup(&path);
    Ok(())
}

#[test]
fn numeric_grow_right_justifies() -> Result<()> {
    let path = unique_path("dbfkit_alter_grow");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("AGE", FieldType::Number, 3, 0)?;
    dbf.add_field("TAIL", FieldType::Character, 2, 0)?;
    dbf.write_integer(0, 0, 30)?;
    dbf.write_string(0, 1, "zz")?;
    dbf.write_integer(1, 0, 7)?;
    dbf.write_string(1, 1, "qq")?;

    dbf.alter_field(0, "AGE", FieldType::Number, 6, 1)?;
    assert_eq!(dbf.record_length(), 1 + 6 + 2);
    assert_eq!(dbf.field(0).unwrap().decimals, 1);

    // значение не переформатируется, только прижимается вправо
    assert_eq!(dbf.read_double(0, 0)?, Some(30.0));
    assert_eq!(dbf.read_double(1, 0)?, Some(7.0));
    assert_eq!(dbf.read_string(0, 1)?.as_deref(), Some("zz"));
    assert_eq!(dbf.read_string(1, 1)?.as_deref(), Some("qq"));

    // новые записи уже форматируются с дробной частью
    dbf.write_double(2, 0, 1.5)?;
    assert_eq!(dbf.read_double(2, 0)?, Some(1.5));
    dbf.close()?;

    cleanup(&path);
    Ok(())
}

#[test]
fn text_grow_pads_right() -> Result<()> {
    let path = unique_path("dbfkit_alter_text_grow");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("S", FieldType::Character, 2, 0)?;
    dbf.add_field("T", FieldType::Character, 2, 0)?;
    dbf.write_string(0, 0, "AB")?;
    dbf.write_string(0, 1, "CD")?;

    dbf.alter_field(0, "S", FieldType::Character, 4, 0)?;
    let raw = dbf.read_tuple(0)?.unwrap();
    assert_eq!(&raw[1..5], b"AB  "); // текст остаётся слева
    assert_eq!(dbf.read_string(0, 1)?.as_deref(), Some("CD"));
    dbf.close()?;

    cleanup(&path);
    Ok(())
}

#[test]
fn null_survives_resize() -> Result<()> {
    let path = unique_path("dbfkit_alter_null");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("AGE", FieldType::Number, 3, 0)?;
    dbf.add_field("PAD", FieldType::Character, 2, 0)?;
    dbf.write_string(0, 1, "xy")?; // AGE остаётся пробельным NULL
    dbf.write_null(1, 0)?;
    dbf.write_string(1, 1, "uv")?;

    dbf.alter_field(0, "AGE", FieldType::Number, 6, 0)?;
    assert!(dbf.is_null(0, 0)?);
    assert!(dbf.is_null(1, 0)?);

    dbf.alter_field(0, "AGE", FieldType::Number, 2, 0)?;
    assert!(dbf.is_null(0, 0)?);
    assert!(dbf.is_null(1, 0)?);
    assert_eq!(dbf.read_string(0, 1)?.as_deref(), Some("xy"));
    assert_eq!(dbf.read_string(1, 1)?.as_deref(), Some("uv"));
    dbf.close()?;

    cleanup(&path);
    Ok(())
}

#[test]
fn same_width_type_change_restamps_null() -> Result<()> {
    let path = unique_path("dbfkit_alter_type");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("FLAG", FieldType::Logical, 1, 0)?;
    dbf.write_null(0, 0)?; // '?'
    dbf.write_logical(1, 0, 'T')?;

    // L -> C той же ширины: NULL перештамповывается пробелом
    dbf.alter_field(0, "FLAG", FieldType::Character, 1, 0)?;
    assert!(dbf.is_null(0, 0)?);
    assert_eq!(dbf.read_string(1, 0)?.as_deref(), Some("T"));
    dbf.close()?;

    cleanup(&path);
    Ok(())
}

#[test]
fn rename_via_alter() -> Result<()> {
    let path = unique_path("dbfkit_alter_rename");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("OLD", FieldType::Character, 4, 0)?;
    dbf.write_string(0, 0, "v")?;

    dbf.alter_field(0, "NEWNAME", FieldType::Character, 4, 0)?;
    dbf.close()?;

    let mut dbf = Dbf::open(&path, Access::ReadOnly)?;
    assert_eq!(dbf.field(0).unwrap().name, "NEWNAME");
    assert_eq!(dbf.read_string(0, 0)?.as_deref(), Some("v"));

    cleanup(&path);
    Ok(())
}
