//! dbf/mutate — схемная хирургия: add/delete/reorder/alter поля.
//!
//! Общий паттерн: сначала пересчитать метаданные и смещения в памяти,
//! затем (если у файла уже есть заголовок) перекроить КАЖДУЮ запись на
//! диске — читая по СТАРОЙ длине/смещениям и записывая по НОВЫМ. Перед
//! любой мутацией кэшированная запись сбрасывается на диск.
//!
//! Порядок обхода записей несущий: при росте длины записи новые регионы
//! перекрывают старые, поэтому рост идёт по убыванию индексов; сжатие и
//! перестановка — по возрастанию.
//!
//! Атомарности нет: I/O-ошибка посреди цикла оставляет файл частично
//! перекроенным. Это свойство самого формата (ни журнала, ни транзакций),
//! а не упущение реализации.

use log::debug;

use crate::consts::{FIELD_DESC_SIZE, MAX_FIELD_WIDTH};
use crate::error::{DbfError, Result};
use crate::field::{is_value_null, FieldDescriptor, FieldType};
use crate::util::{read_at, write_at};

use super::core::{expected_record_len, recompute_offsets, Dbf};

impl Dbf {
    /// Добавить поле в конец схемы. Возвращает индекс нового поля.
    ///
    /// Для файла без записей (включая свежесозданный) меняются только
    /// метаданные; иначе каждая запись дополняется null-заполнителем
    /// нового типа и переписывается по новой раскладке.
    pub fn add_field(
        &mut self,
        name: &str,
        ftype: FieldType,
        width: usize,
        decimals: usize,
    ) -> Result<usize> {
        self.require_writable()?;
        self.flush_record()?;
        if width < 1 {
            return Err(DbfError::InvalidField("field width must be >= 1".into()));
        }
        let width = width.min(MAX_FIELD_WIDTH);

        let old_record_len = self.record_len;
        let old_header_len = self.header_len;

        self.fields
            .push(FieldDescriptor::new(name, ftype, width, decimals, old_record_len));
        self.record_len += width;
        self.header_len += FIELD_DESC_SIZE;
        self.updated = false;
        self.cur_record.resize(self.record_len, 0);
        debug_assert_eq!(self.record_len, expected_record_len(&self.fields));

        let index = self.fields.len() - 1;

        // Свежий файл: заголовок ещё не на диске, перекладывать нечего.
        if self.no_header {
            return Ok(index);
        }

        // Запись растёт — идём по убыванию, чтобы не затоптать
        // непрочитанные старые записи.
        let fill = ftype.null_fill();
        let mut buf = vec![0u8; self.record_len];
        for i in (0..self.num_records).rev() {
            let old_off = (old_header_len + i * old_record_len) as u64;
            read_at(&mut self.file, old_off, &mut buf[..old_record_len])?;
            buf[old_record_len..].fill(fill);
            let new_off = self.record_offset(i);
            write_at(&mut self.file, new_off, &buf)?;
        }
        debug!(
            "add_field {:?}: rewrote {} records ({} -> {} bytes)",
            name, self.num_records, old_record_len, self.record_len
        );

        self.no_header = true; // форс полной перезаписи заголовка
        self.update_header()?;
        self.invalidate_record_cache();
        Ok(index)
    }

    /// Удалить поле. Все записи переписываются без его байтового окна.
    pub fn delete_field(&mut self, field: usize) -> Result<()> {
        self.require_writable()?;
        if field >= self.fields.len() {
            return Err(DbfError::InvalidField(format!(
                "field {} out of range (count {})",
                field,
                self.fields.len()
            )));
        }
        self.flush_record()?;

        let old_record_len = self.record_len;
        let old_header_len = self.header_len;
        let del_offset = self.fields[field].offset;
        let del_width = self.fields[field].width;

        self.fields.remove(field);
        for f in &mut self.fields[field..] {
            f.offset -= del_width;
        }
        self.record_len -= del_width;
        self.header_len -= FIELD_DESC_SIZE;
        self.cur_record.resize(self.record_len, 0);
        debug_assert_eq!(self.record_len, expected_record_len(&self.fields));

        if self.no_header && self.num_records == 0 {
            return Ok(());
        }

        // Заголовок ужался — безопасно переписать до перекладки записей.
        self.no_header = true;
        self.update_header()?;

        // Запись ужимается — обход по возрастанию.
        let mut old = vec![0u8; old_record_len];
        for i in 0..self.num_records {
            let old_off = (old_header_len + i * old_record_len) as u64;
            read_at(&mut self.file, old_off, &mut old)?;
            let new_off = self.record_offset(i);
            write_at(&mut self.file, new_off, &old[..del_offset])?;
            write_at(
                &mut self.file,
                new_off + del_offset as u64,
                &old[del_offset + del_width..],
            )?;
        }
        debug!(
            "delete_field {}: rewrote {} records ({} -> {} bytes)",
            field, self.num_records, old_record_len, self.record_len
        );

        self.invalidate_record_cache();
        Ok(())
    }

    /// Переставить поля: `order[i]` — старый индекс поля, которое займёт
    /// новую позицию i. Полнота перестановки — контракт вызывающего;
    /// здесь проверяются только длина и диапазон индексов.
    pub fn reorder_fields(&mut self, order: &[usize]) -> Result<()> {
        self.require_writable()?;
        if self.fields.is_empty() {
            return Ok(());
        }
        if order.len() != self.fields.len() {
            return Err(DbfError::InvalidField(format!(
                "order has {} entries for {} fields",
                order.len(),
                self.fields.len()
            )));
        }
        if let Some(&bad) = order.iter().find(|&&o| o >= self.fields.len()) {
            return Err(DbfError::InvalidField(format!(
                "order entry {} out of range (count {})",
                bad,
                self.fields.len()
            )));
        }
        self.flush_record()?;

        let mut new_fields: Vec<FieldDescriptor> =
            order.iter().map(|&o| self.fields[o].clone()).collect();
        recompute_offsets(&mut new_fields);
        let old_fields = std::mem::replace(&mut self.fields, new_fields);

        if self.no_header && self.num_records == 0 {
            return Ok(());
        }

        self.no_header = true;
        self.update_header()?;

        // Длина записи не меняется: читаем и пишем по одному смещению,
        // поля перекладываются через отдельный буфер.
        let mut buf = vec![0u8; self.record_len];
        let mut out = vec![0u8; self.record_len];
        for i in 0..self.num_records {
            let off = self.record_offset(i);
            read_at(&mut self.file, off, &mut buf)?;
            out[0] = buf[0]; // флаг удаления остаётся на месте
            for (new_idx, &old_idx) in order.iter().enumerate() {
                let src = &old_fields[old_idx];
                let dst = &self.fields[new_idx];
                out[dst.offset..dst.offset + dst.width]
                    .copy_from_slice(&buf[src.offset..src.offset + src.width]);
            }
            write_at(&mut self.file, off, &out)?;
        }
        debug!("reorder_fields: rewrote {} records", self.num_records);

        self.invalidate_record_cache();
        Ok(())
    }

    /// Переопределить поле: имя, тип, ширину, decimals.
    ///
    /// Сжатие числового поля с ведущими пробелами сохраняет правые
    /// (младшие) цифры; рост выравнивает числа вправо, текст — влево.
    /// NULL-значения перештамповываются заполнителем нового типа.
    pub fn alter_field(
        &mut self,
        field: usize,
        name: &str,
        new_type: FieldType,
        width: usize,
        decimals: usize,
    ) -> Result<()> {
        self.require_writable()?;
        if field >= self.fields.len() {
            return Err(DbfError::InvalidField(format!(
                "field {} out of range (count {})",
                field,
                self.fields.len()
            )));
        }
        self.flush_record()?;
        if width < 1 {
            return Err(DbfError::InvalidField("field width must be >= 1".into()));
        }
        let width = width.min(MAX_FIELD_WIDTH);

        let fill = new_type.null_fill();
        let old_type = self.fields[field].ftype;
        let offset = self.fields[field].offset;
        let old_width = self.fields[field].width;
        let old_record_len = self.record_len;

        self.fields[field] = FieldDescriptor::new(name, new_type, width, decimals, offset);
        if width != old_width {
            for f in &mut self.fields[field + 1..] {
                f.offset = f.offset + width - old_width;
            }
            self.record_len = self.record_len + width - old_width;
            self.cur_record.resize(self.record_len, 0);
        }
        debug_assert_eq!(self.record_len, expected_record_len(&self.fields));

        if self.no_header && self.num_records == 0 {
            return Ok(());
        }

        // Длина заголовка не меняется (дескриптор тех же 32 байт).
        self.no_header = true;
        self.update_header()?;

        if width < old_width || (width == old_width && new_type != old_type) {
            // Сжатие либо смена типа без смены ширины: обход по возрастанию.
            let mut buf = vec![0u8; old_record_len];
            for i in 0..self.num_records {
                let old_off = (self.header_len + i * old_record_len) as u64;
                read_at(&mut self.file, old_off, &mut buf)?;
                let old_value = buf[offset..offset + old_width].to_vec();
                let was_null = is_value_null(old_type, &old_value);

                if width != old_width {
                    if old_type.is_numeric() && old_value[0] == b' ' {
                        // Числовое усечение: оставить правые width байт,
                        // срезав лишний левый паддинг.
                        buf.copy_within(offset + old_width - width..offset + old_width, offset);
                    }
                    if offset + old_width < old_record_len {
                        buf.copy_within(offset + old_width..old_record_len, offset + width);
                    }
                }
                if was_null {
                    buf[offset..offset + width].fill(fill);
                }

                let new_off = self.record_offset(i);
                write_at(&mut self.file, new_off, &buf[..self.record_len])?;
            }
        } else if width > old_width {
            // Рост: обход по убыванию (новые регионы перекрывают старые).
            let mut buf = vec![0u8; self.record_len];
            for i in (0..self.num_records).rev() {
                let old_off = (self.header_len + i * old_record_len) as u64;
                read_at(&mut self.file, old_off, &mut buf[..old_record_len])?;
                let old_value = buf[offset..offset + old_width].to_vec();
                let was_null = is_value_null(old_type, &old_value);

                if offset + old_width < old_record_len {
                    buf.copy_within(offset + old_width..old_record_len, offset + width);
                }
                if was_null {
                    buf[offset..offset + width].fill(fill);
                } else if old_type.is_numeric() {
                    // Числа прижимаются вправо, слева добавляются пробелы.
                    buf.copy_within(offset..offset + old_width, offset + width - old_width);
                    buf[offset..offset + width - old_width].fill(b' ');
                } else {
                    // Текст остаётся слева, справа дополняется пробелами.
                    buf[offset + old_width..offset + width].fill(b' ');
                }

                let new_off = self.record_offset(i);
                write_at(&mut self.file, new_off, &buf)?;
            }
        }
        debug!(
            "alter_field {}: rewrote {} records ({} -> {} bytes)",
            field, self.num_records, old_record_len, self.record_len
        );

        self.invalidate_record_cache();
        Ok(())
    }
}
