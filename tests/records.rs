use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use dbfkit::{Access, Dbf, DbfError, FieldType};

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
fn append_only_at_record_count() -> Result<()> {
    let path = unique_path("dbfkit_append");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("V", FieldType::Number, 4, 0)?;

    dbf.write_integer(0, 0, 1)?;
    dbf.write_integer(1, 0, 2)?;
    assert_eq!(dbf.record_count(), 2);

    // дыры не допускаются: index > count — ошибка
    let err = dbf.write_integer(5, 0, 9).unwrap_err();
    assert!(matches!(err, DbfError::InvalidField(_)));

    // перезапись существующей записи не меняет счётчик
    dbf.write_integer(0, 0, 7)?;
    assert_eq!(dbf.record_count(), 2);
    assert_eq!(dbf.read_integer(0, 0)?, Some(7));
    dbf.close()?;

    cleanup(&path);
    Ok(())
}

#[test]
fn string_overflow_truncates_and_reports() -> Result<()> {
    let path = unique_path("dbfkit_overflow_str");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("S", FieldType::Character, 3, 0)?;

    let err = dbf.write_string(0, 0, "ABCDEF").unwrap_err();
    assert!(matches!(err, DbfError::Overflow { field: 0, width: 3 }));
    // усечённое значение при этом записано
    assert_eq!(dbf.read_string(0, 0)?.as_deref(), Some("ABC"));
    dbf.close()?;

    cleanup(&path);
    Ok(())
}

#[test]
fn numeric_overflow_keeps_leftmost_digits() -> Result<()> {
    let path = unique_path("dbfkit_overflow_num");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("N", FieldType::Number, 2, 0)?;

    let err = dbf.write_integer(0, 0, 12345).unwrap_err();
    assert!(matches!(err, DbfError::Overflow { field: 0, width: 2 }));
    assert_eq!(dbf.read_integer(0, 0)?, Some(12));
    dbf.close()?;

    cleanup(&path);
    Ok(())
}

#[test]
fn deletion_flags() -> Result<()> {
    let path = unique_path("dbfkit_delete_flag");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("V", FieldType::Number, 3, 0)?;
    dbf.write_integer(0, 0, 1)?;
    dbf.write_integer(1, 0, 2)?;

    assert!(!dbf.is_deleted(0)?);
    dbf.set_deleted(0, true)?;
    assert!(dbf.is_deleted(0)?);
    assert!(!dbf.is_deleted(1)?);

    // пометка не трогает данные
    assert_eq!(dbf.read_integer(0, 0)?, Some(1));

    dbf.set_deleted(0, false)?;
    assert!(!dbf.is_deleted(0)?);

    // вне диапазона: чтение пермиссивно, запись — нет
    assert!(dbf.is_deleted(99)?);
    assert!(dbf.set_deleted(99, true).is_err());
    dbf.close()?;

    // флаг переживает переоткрытие
    let path2 = unique_path("dbfkit_delete_flag2");
    {
        let mut dbf = Dbf::create(&path2)?;
        dbf.add_field("V", FieldType::Number, 3, 0)?;
        dbf.write_integer(0, 0, 1)?;
        dbf.set_deleted(0, true)?;
        dbf.close()?;
    }
    {
        let mut dbf = Dbf::open(&path2, Access::ReadOnly)?;
        assert!(dbf.is_deleted(0)?);
    }

    cleanup(&path);
    cleanup(&path2);
    Ok(())
}

#[test]
fn tuples_raw_roundtrip() -> Result<()> {
    let path = unique_path("dbfkit_tuples");

    let mut dbf = Dbf::create(&path)?;
    dbf.add_field("S", FieldType::Character, 4, 0)?;
    dbf.write_string(0, 0, "AB")?;

    let raw = dbf.read_tuple(0)?.unwrap();
    assert_eq!(raw.len(), dbf.record_length());
    assert_eq!(raw[0], b' '); // активная запись
    assert_eq!(&raw[1..], b"AB  ");

    // append через write_tuple
    let mut raw2 = raw.clone();
    raw2[1..].copy_from_slice(b"CDEF");
    dbf.write_tuple(1, &raw2)?;
    assert_eq!(dbf.record_count(), 2);
    assert_eq!(dbf.read_string(1, 0)?.as_deref(), Some("CDEF"));

    assert!(dbf.read_tuple(9)?.is_none());
    assert!(dbf.write_tuple(0, b"xx").is_err()); // не та длина
    dbf.close()?;

    cleanup(&path);
    Ok(())
}

#[test]
fn readonly_handle_rejects_writes() -> Result<()> {
    let path = unique_path("dbfkit_readonly");

    {
        let mut dbf = Dbf::create(&path)?;
        dbf.add_field("S", FieldType::Character, 4, 0)?;
        dbf.write_string(0, 0, "OK")?;
        dbf.close()?;
    }

    let mut dbf = Dbf::open(&path, Access::ReadOnly)?;
    assert!(dbf.write_string(0, 0, "NO").is_err());
    assert!(dbf.set_deleted(0, true).is_err());
    assert!(dbf.add_field("X", FieldType::Number, 3, 0).is_err());
    // чтение при этом работает
    assert_eq!(dbf.read_string(0, 0)?.as_deref(), Some("OK"));

    cleanup(&path);
    Ok(())
}

#[test]
fn clone_empty_copies_schema_only() -> Result<()> {
    let path = unique_path("dbfkit_clone_src");
    let path2 = unique_path("dbfkit_clone_dst");

    let mut src = Dbf::create(&path)?;
    src.add_field("NAME", FieldType::Character, 10, 0)?;
    src.add_field("AGE", FieldType::Number, 3, 0)?;
    src.write_string(0, 0, "ALICE")?;

    let dst = src.clone_empty(&path2)?;
    assert_eq!(dst.field_count(), 2);
    assert_eq!(dst.record_count(), 0);
    assert_eq!(dst.record_length(), src.record_length());
    dst.close()?;
    src.close()?;

    let dst = Dbf::open(&path2, Access::ReadOnly)?;
    assert_eq!(dst.field_count(), 2);
    assert_eq!(dst.field(1).unwrap().name, "AGE");
    assert_eq!(dst.record_count(), 0);

    cleanup(&path);
    cleanup(&path2);
    Ok(())
}
