//! Чтение/запись 32-байтового заголовка файла и блока дескрипторов.
//!
//! Писатель эмитит: байт версии 0x03, фиктивную дату, нулевой счётчик
//! записей, длины заголовка/записи, language driver; затем дескрипторы и
//! терминатор 0x0D, если вычисленная длина заголовка оставила под него место.
//! Счётчик записей патчится отдельно (update), не трогая остальные байты.

use byteorder::{ByteOrder, LittleEndian};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::consts::*;
use crate::error::{DbfError, Result};
use crate::field::FieldDescriptor;

/// Содержимое фиксированной 32-байтовой части заголовка.
#[derive(Debug, Clone)]
pub struct FileHeader {
    pub num_records: u32,
    pub header_len: u16,
    pub record_len: u16,
    pub language_driver: u8,
}

/// Прочитать и проверить 32-байтовый заголовок.
pub fn read_file_header(f: &mut File) -> Result<FileHeader> {
    let mut buf = [0u8; FILE_HDR_SIZE];
    f.seek(SeekFrom::Start(0))?;
    f.read_exact(&mut buf)
        .map_err(|_| DbfError::Format("file header shorter than 32 bytes".into()))?;

    let h = FileHeader {
        num_records: LittleEndian::read_u32(&buf[OFF_RECORD_COUNT..OFF_RECORD_COUNT + 4]),
        header_len: LittleEndian::read_u16(&buf[OFF_HEADER_LEN..OFF_HEADER_LEN + 2]),
        record_len: LittleEndian::read_u16(&buf[OFF_RECORD_LEN..OFF_RECORD_LEN + 2]),
        language_driver: buf[OFF_LANGUAGE_DRIVER],
    };
    if (h.header_len as usize) < FILE_HDR_SIZE {
        return Err(DbfError::Format(format!(
            "declared header length {} < {}",
            h.header_len, FILE_HDR_SIZE
        )));
    }
    Ok(h)
}

/// Записать заголовок целиком: 32 байта + дескрипторы (+ терминатор).
/// Счётчик записей намеренно остаётся нулевым — его патчит update.
pub fn write_full_header(
    f: &mut File,
    header_len: usize,
    record_len: usize,
    language_driver: u8,
    fields: &[FieldDescriptor],
) -> Result<()> {
    let mut hdr = [0u8; FILE_HDR_SIZE];
    hdr[0] = DBF_VERSION;
    hdr[1..4].copy_from_slice(&DUMMY_MDATE);
    LittleEndian::write_u16(&mut hdr[OFF_HEADER_LEN..OFF_HEADER_LEN + 2], header_len as u16);
    LittleEndian::write_u16(&mut hdr[OFF_RECORD_LEN..OFF_RECORD_LEN + 2], record_len as u16);
    hdr[OFF_LANGUAGE_DRIVER] = language_driver;

    f.seek(SeekFrom::Start(0))?;
    f.write_all(&hdr)?;
    for fld in fields {
        f.write_all(&fld.encode())?;
    }
    if header_len > FILE_HDR_SIZE + FIELD_DESC_SIZE * fields.len() {
        f.write_all(&[HDR_TERMINATOR])?;
    }
    Ok(())
}

/// Перечитать первые 32 байта, пропатчить только счётчик записей и
/// сбросить на диск.
pub fn patch_record_count(f: &mut File, num_records: u32) -> Result<()> {
    let mut hdr = [0u8; FILE_HDR_SIZE];
    f.seek(SeekFrom::Start(0))?;
    f.read_exact(&mut hdr)?;
    LittleEndian::write_u32(&mut hdr[OFF_RECORD_COUNT..OFF_RECORD_COUNT + 4], num_records);
    f.seek(SeekFrom::Start(0))?;
    f.write_all(&hdr)?;
    f.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use std::fs::OpenOptions;

    fn tmp_file(tag: &str) -> (std::path::PathBuf, File) {
        let p = std::env::temp_dir().join(format!(
            "dbfkit-hdr-{}-{}-{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let f = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(&p)
            .unwrap();
        (p, f)
    }

    #[test]
    fn header_roundtrip_with_terminator() {
        let (p, mut f) = tmp_file("rt");
        let fields = vec![
            FieldDescriptor::new("NAME", FieldType::Character, 10, 0, 1),
            FieldDescriptor::new("AGE", FieldType::Number, 3, 0, 11),
        ];
        let header_len = 32 + 32 * fields.len() + 1;
        write_full_header(&mut f, header_len, 14, 0x57, &fields).unwrap();
        patch_record_count(&mut f, 7).unwrap();

        let h = read_file_header(&mut f).unwrap();
        assert_eq!(h.num_records, 7);
        assert_eq!(h.header_len as usize, header_len);
        assert_eq!(h.record_len, 14);
        assert_eq!(h.language_driver, 0x57);

        // терминатор на месте
        let mut body = vec![0u8; header_len];
        f.seek(SeekFrom::Start(0)).unwrap();
        f.read_exact(&mut body).unwrap();
        assert_eq!(body[0], DBF_VERSION);
        assert_eq!(*body.last().unwrap(), HDR_TERMINATOR);

        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn short_header_is_format_error() {
        let (p, mut f) = tmp_file("short");
        f.write_all(&[0u8; 10]).unwrap();
        match read_file_header(&mut f) {
            Err(DbfError::Format(_)) => {}
            other => panic!("expected Format error, got {:?}", other),
        }
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn tiny_declared_header_rejected() {
        let (p, mut f) = tmp_file("tiny");
        let mut hdr = [0u8; FILE_HDR_SIZE];
        hdr[OFF_HEADER_LEN] = 16; // < 32
        f.write_all(&hdr).unwrap();
        assert!(matches!(read_file_header(&mut f), Err(DbfError::Format(_))));
        let _ = std::fs::remove_file(p);
    }
}
