//! dbf/core — структура Dbf и кэш одной записи.
//!
//! Инвариант кэша: в памяти не больше одной записи; перед переключением на
//! другой индекс грязная запись сбрасывается на диск (flush-before-switch).
//! Это единственная дисциплина разделения ресурсов у хэндла — транзакций
//! формат не даёт.

use log::debug;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::consts::*;
use crate::error::{DbfError, Result};
use crate::field::FieldDescriptor;
use crate::header::{patch_record_count, write_full_header};
use crate::util::{read_at, write_at};

/// Открытая таблица DBF.
///
/// Хэндл единолично владеет файлом, буфером текущей записи и рабочим
/// буфером; использование из нескольких потоков не поддерживается.
pub struct Dbf {
    pub(crate) file: File,
    pub(crate) path: PathBuf,
    pub(crate) readonly: bool,
    pub(crate) trim_strings: bool,

    pub(crate) num_records: usize,
    pub(crate) header_len: usize,
    pub(crate) record_len: usize,
    pub(crate) fields: Vec<FieldDescriptor>,

    // Кэш одной записи: индекс, байты, флаг модификации.
    pub(crate) cur_index: Option<usize>,
    pub(crate) cur_record: Vec<u8>,
    pub(crate) cur_dirty: bool,

    // Рабочий буфер под извлечение поля; растёт монотонно, не ужимается.
    pub(crate) work: Vec<u8>,

    // Заголовок ещё не был записан на диск (новый файл либо форс после
    // схемной мутации).
    pub(crate) no_header: bool,
    // Счётчик записей требует перезаписи при закрытии.
    pub(crate) updated: bool,

    pub(crate) language_driver: u8,
    pub(crate) code_page: Option<String>,

    pub(crate) finished: bool,
}

impl Dbf {
    // ---------------- Счётчики и инфо ----------------

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn record_count(&self) -> usize {
        self.num_records
    }

    pub fn record_length(&self) -> usize {
        self.record_len
    }

    pub fn header_length(&self) -> usize {
        self.header_len
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Сырой однобайтовый тег типа поля ('C','N','F','L','D').
    pub fn native_field_type(&self, index: usize) -> Option<u8> {
        self.fields.get(index).map(|f| f.ftype.to_tag())
    }

    pub fn code_page(&self) -> Option<&str> {
        self.code_page.as_deref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Поиск поля по имени без учёта регистра (по первым 10 байтам,
    /// как хранится на диске).
    pub fn field_index(&self, name: &str) -> Option<usize> {
        let want: String = name
            .bytes()
            .take(FLD_NAME_MAX)
            .map(|b| b.to_ascii_uppercase() as char)
            .collect();
        self.fields
            .iter()
            .position(|f| f.name.to_ascii_uppercase() == want)
    }

    // ---------------- Кэш одной записи ----------------

    #[inline]
    pub(crate) fn record_offset(&self, index: usize) -> u64 {
        (self.header_len + index * self.record_len) as u64
    }

    /// Сбросить грязную запись на её место на диске.
    pub(crate) fn flush_record(&mut self) -> Result<()> {
        if self.cur_dirty {
            if let Some(idx) = self.cur_index {
                let off = self.record_offset(idx);
                write_at(&mut self.file, off, &self.cur_record)?;
            }
            self.cur_dirty = false;
        }
        Ok(())
    }

    /// Загрузить запись index в кэш (с flush предыдущей).
    pub(crate) fn load_record(&mut self, index: usize) -> Result<()> {
        if self.cur_index != Some(index) {
            self.flush_record()?;
            let off = self.record_offset(index);
            read_at(&mut self.file, off, &mut self.cur_record)?;
            self.cur_index = Some(index);
        }
        Ok(())
    }

    pub(crate) fn invalidate_record_cache(&mut self) {
        self.cur_index = None;
        self.cur_dirty = false;
    }

    pub(crate) fn require_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(DbfError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "handle is read-only",
            )));
        }
        Ok(())
    }

    // ---------------- Заголовок ----------------

    /// Отложенная запись заголовка: выполняется при первой реальной записи
    /// либо принудительно после схемной мутации.
    pub(crate) fn write_header_if_pending(&mut self) -> Result<()> {
        if !self.no_header {
            return Ok(());
        }
        self.no_header = false;
        write_full_header(
            &mut self.file,
            self.header_len,
            self.record_len,
            self.language_driver,
            &self.fields,
        )
    }

    /// Полная актуализация: заголовок (если отложен), flush записи,
    /// патч счётчика записей.
    pub(crate) fn update_header(&mut self) -> Result<()> {
        self.write_header_if_pending()?;
        self.flush_record()?;
        patch_record_count(&mut self.file, self.num_records as u32)
    }

    // ---------------- Флаги удаления ----------------

    /// Удалена ли запись ('*' в байте 0). Индекс вне диапазона считается
    /// удалённым — пермиссивная семантика чтения.
    pub fn is_deleted(&mut self, record: usize) -> Result<bool> {
        if record >= self.num_records {
            return Ok(true);
        }
        self.load_record(record)?;
        Ok(self.cur_record[0] == FLAG_DELETED)
    }

    pub fn set_deleted(&mut self, record: usize, deleted: bool) -> Result<()> {
        self.require_writable()?;
        if record >= self.num_records {
            return Err(DbfError::InvalidField(format!(
                "record {} out of range (count {})",
                record, self.num_records
            )));
        }
        self.load_record(record)?;
        let flag = if deleted { FLAG_DELETED } else { FLAG_ACTIVE };
        if self.cur_record[0] != flag {
            self.cur_record[0] = flag;
            self.cur_dirty = true;
            self.updated = true;
        }
        Ok(())
    }

    // ---------------- Сырые записи ----------------

    /// Байты записи целиком (включая флаг удаления); None вне диапазона.
    pub fn read_tuple(&mut self, record: usize) -> Result<Option<Vec<u8>>> {
        if record >= self.num_records {
            return Ok(None);
        }
        self.load_record(record)?;
        Ok(Some(self.cur_record.clone()))
    }

    /// Записать запись целиком; index == record_count добавляет новую.
    pub fn write_tuple(&mut self, record: usize, raw: &[u8]) -> Result<()> {
        self.require_writable()?;
        if raw.len() != self.record_len {
            return Err(DbfError::InvalidField(format!(
                "tuple length {} != record length {}",
                raw.len(),
                self.record_len
            )));
        }
        self.prepare_record_write(record)?;
        self.cur_record.copy_from_slice(raw);
        self.cur_dirty = true;
        self.updated = true;
        Ok(())
    }

    /// Общая часть записи в запись: проверка индекса, отложенный заголовок,
    /// append новой пустой записи либо загрузка существующей.
    pub(crate) fn prepare_record_write(&mut self, record: usize) -> Result<()> {
        if record > self.num_records {
            return Err(DbfError::InvalidField(format!(
                "record {} out of range (count {})",
                record, self.num_records
            )));
        }
        self.write_header_if_pending()?;
        if record == self.num_records {
            // Совершенно новая запись: пустое тело из пробелов.
            self.flush_record()?;
            self.num_records += 1;
            self.cur_record.fill(b' ');
            self.cur_index = Some(record);
        }
        self.load_record(record)
    }

    // ---------------- Клонирование схемы ----------------

    /// Новый пустой файл с идентичной схемой (и той же кодовой страницей).
    pub fn clone_empty(&self, path: &Path) -> Result<Dbf> {
        let mut out = Dbf::create_with_code_page(path, self.code_page.as_deref())?;
        out.fields = self.fields.clone();
        out.record_len = self.record_len;
        out.header_len = self.header_len;
        out.cur_record = vec![0u8; out.record_len];
        out.write_header_if_pending()?;
        Ok(out)
    }

    // ---------------- Закрытие ----------------

    /// Закрыть явно: flush кэша и перезапись счётчика, если было обновление.
    pub fn close(mut self) -> Result<()> {
        self.finish()
    }

    pub(crate) fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if self.readonly {
            return Ok(());
        }
        self.write_header_if_pending()?;
        self.flush_record()?;
        if self.updated {
            self.update_header()?;
        }
        debug!(
            "closed {} ({} records, {} fields)",
            self.path.display(),
            self.num_records,
            self.fields.len()
        );
        Ok(())
    }
}

impl Drop for Dbf {
    fn drop(&mut self) {
        // best-effort: ошибки при закрытии в Drop глотаются
        let _ = self.finish();
    }
}

/// Пересчитать смещения слева направо: offset[0] = 1, далее по ширинам.
pub(crate) fn recompute_offsets(fields: &mut [FieldDescriptor]) {
    let mut off = 1usize;
    for f in fields.iter_mut() {
        f.offset = off;
        off += f.width;
    }
}

/// Контроль инварианта длины записи: 1 + сумма ширин.
pub(crate) fn expected_record_len(fields: &[FieldDescriptor]) -> usize {
    1 + fields.iter().map(|f| f.width).sum::<usize>()
}
