//! dbf/open — создание и открытие таблиц, блокировки, кодовая страница.
//!
//! Дисциплина доступа: read-write хэндл берёт эксклюзивный flock на файл,
//! read-only — разделяемый. Несколько одновременных читателей допустимы,
//! второй писатель не пройдёт.

use fs2::FileExt;
use log::debug;
use std::fs::OpenOptions;
use std::path::Path;

use crate::codepage::{parse_ldid, read_sidecar, remove_sidecar, write_sidecar};
use crate::config::DbfConfig;
use crate::consts::*;
use crate::error::{DbfError, Result};
use crate::field::FieldDescriptor;
use crate::header::read_file_header;
use crate::util::read_at;

use super::core::Dbf;

/// Режим доступа существующего файла.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

impl Dbf {
    /// Создать таблицу с кодовой страницей по умолчанию (LDID/87).
    pub fn create(path: &Path) -> Result<Dbf> {
        Self::create_with_code_page(path, Some(DEFAULT_CODE_PAGE))
    }

    /// Создать таблицу. Заголовок на диск не пишется до первого поля,
    /// первой записи или закрытия («no header yet»).
    ///
    /// `LDID/<n>` с n в 0..=255 уходит байтом в заголовок, сайдкар не
    /// создаётся; любая другая метка пишется в `<basename>.cpg`.
    pub fn create_with_code_page(path: &Path, code_page: Option<&str>) -> Result<Dbf> {
        Self::create_with_config(path, code_page, DbfConfig::from_env())
    }

    pub fn create_with_config(
        path: &Path,
        code_page: Option<&str>,
        cfg: DbfConfig,
    ) -> Result<Dbf> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(path)?;
        file.lock_exclusive()?;

        let mut ldid: Option<u8> = None;
        if let Some(label) = code_page {
            ldid = parse_ldid(label);
            if ldid.is_none() {
                write_sidecar(path, label)?;
            }
        }
        if code_page.is_none() || ldid.is_some() {
            remove_sidecar(path);
        }

        debug!("create {} (code page {:?})", path.display(), code_page);
        Ok(Dbf {
            file,
            path: path.to_path_buf(),
            readonly: false,
            trim_strings: cfg.trim_strings,
            num_records: 0,
            header_len: FILE_HDR_SIZE + 1, // место под терминатор
            record_len: 1,                 // пока только флаг удаления
            fields: Vec::new(),
            cur_index: None,
            cur_record: vec![0u8; 1],
            cur_dirty: false,
            work: Vec::new(),
            no_header: true,
            updated: false,
            language_driver: ldid.unwrap_or(0),
            code_page: code_page.map(str::to_string),
            finished: false,
        })
    }

    /// Открыть существующую таблицу.
    pub fn open(path: &Path, access: Access) -> Result<Dbf> {
        Self::open_with_config(path, access, DbfConfig::from_env())
    }

    pub fn open_with_config(path: &Path, access: Access, cfg: DbfConfig) -> Result<Dbf> {
        let readonly = access == Access::ReadOnly;
        let mut file = OpenOptions::new()
            .read(true)
            .write(!readonly)
            .open(path)?;
        if readonly {
            file.lock_shared()?;
        } else {
            file.lock_exclusive()?;
        }

        let h = read_file_header(&mut file)?;
        let header_len = h.header_len as usize;
        let record_len = h.record_len as usize;
        let num_fields = (header_len - FILE_HDR_SIZE) / FIELD_DESC_SIZE;

        // Блок дескрипторов: [32, header_len), по 32 байта на поле.
        let mut block = vec![0u8; header_len - FILE_HDR_SIZE];
        read_at(&mut file, FILE_HDR_SIZE as u64, &mut block)
            .map_err(|_| DbfError::Format("truncated field descriptor block".into()))?;

        let mut fields = Vec::with_capacity(num_fields);
        let mut offset = 1usize;
        for i in 0..num_fields {
            let mut f = FieldDescriptor::decode(&block[i * FIELD_DESC_SIZE..])?;
            f.offset = offset;
            offset += f.width;
            fields.push(f);
        }

        // Кодовая страница: сайдкар приоритетнее language driver id.
        let mut code_page = read_sidecar(path);
        if code_page.is_none() && h.language_driver != 0 {
            code_page = Some(format!("{}{}", LDID_PREFIX, h.language_driver));
        }

        debug!(
            "open {} ({:?}): {} fields, {} records, rec_len {}",
            path.display(),
            access,
            num_fields,
            h.num_records,
            record_len
        );
        Ok(Dbf {
            file,
            path: path.to_path_buf(),
            readonly,
            trim_strings: cfg.trim_strings,
            num_records: h.num_records as usize,
            header_len,
            record_len,
            fields,
            cur_index: None,
            cur_record: vec![0u8; record_len],
            cur_dirty: false,
            work: Vec::new(),
            no_header: false,
            updated: false,
            language_driver: h.language_driver,
            code_page,
            finished: false,
        })
    }
}
