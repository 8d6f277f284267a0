//! dbf/attr — чтение и запись значений полей через кэш записи.
//!
//! Семантика чтения пермиссивная: индекс записи/поля вне диапазона — это
//! Ok(None) («нет значения»), не ошибка; числовой мусор парсится в 0.
//! Семантика записи строгая по ссылкам (InvalidField) и мягкая по данным:
//! не влезло — пишем усечённое и возвращаем Overflow.

use log::warn;

use crate::error::{DbfError, Result};
use crate::field::{is_value_null, parse_double_permissive, FieldType};

use super::core::Dbf;

/// Значение атрибута для записи; рендеринг определяет ТИП ПОЛЯ,
/// а не вариант значения.
enum AttrValue<'a> {
    Text(&'a str),
    Number(f64),
    Logical(char),
}

impl Dbf {
    // ---------------- Чтение ----------------

    /// Сырые байты поля, скопированные в рабочий буфер хэндла.
    /// Буфер только растёт — повторные чтения не реаллоцируют.
    fn read_field_raw(&mut self, record: usize, field: usize) -> Result<Option<&[u8]>> {
        if record >= self.num_records || field >= self.fields.len() {
            return Ok(None);
        }
        self.load_record(record)?;
        let (off, w) = {
            let d = &self.fields[field];
            (d.offset, d.width)
        };
        if self.work.len() < w {
            self.work.resize(w, 0);
        }
        self.work[..w].copy_from_slice(&self.cur_record[off..off + w]);
        Ok(Some(&self.work[..w]))
    }

    /// Текстовое значение поля; пробелы по краям срезаются согласно
    /// конфигурации хэндла.
    pub fn read_string(&mut self, record: usize, field: usize) -> Result<Option<String>> {
        let trim = self.trim_strings;
        let raw = match self.read_field_raw(record, field)? {
            Some(r) => r,
            None => return Ok(None),
        };
        let s = String::from_utf8_lossy(raw);
        Ok(Some(if trim {
            s.trim_matches(' ').to_string()
        } else {
            s.into_owned()
        }))
    }

    /// Числовое значение; любой не-числовой текст даёт 0.0.
    pub fn read_double(&mut self, record: usize, field: usize) -> Result<Option<f64>> {
        let raw = match self.read_field_raw(record, field)? {
            Some(r) => r,
            None => return Ok(None),
        };
        let s = String::from_utf8_lossy(raw);
        Ok(Some(parse_double_permissive(&s)))
    }

    pub fn read_integer(&mut self, record: usize, field: usize) -> Result<Option<i32>> {
        Ok(self.read_double(record, field)?.map(|v| v as i32))
    }

    /// Первый байт окна логического поля ('T'/'F'/'?' или что лежит).
    pub fn read_logical(&mut self, record: usize, field: usize) -> Result<Option<char>> {
        let raw = match self.read_field_raw(record, field)? {
            Some(r) => r,
            None => return Ok(None),
        };
        Ok(raw.first().map(|&b| b as char))
    }

    /// NULL-классификация по типу поля; вне диапазона — true.
    pub fn is_null(&mut self, record: usize, field: usize) -> Result<bool> {
        if record >= self.num_records || field >= self.fields.len() {
            return Ok(true);
        }
        let ftype = self.fields[field].ftype;
        let value = self.read_string(record, field)?.unwrap_or_default();
        Ok(is_value_null(ftype, value.as_bytes()))
    }

    // ---------------- Запись ----------------

    pub fn write_string(&mut self, record: usize, field: usize, value: &str) -> Result<()> {
        self.write_attr(record, field, Some(AttrValue::Text(value)))
    }

    pub fn write_double(&mut self, record: usize, field: usize, value: f64) -> Result<()> {
        self.write_attr(record, field, Some(AttrValue::Number(value)))
    }

    pub fn write_integer(&mut self, record: usize, field: usize, value: i32) -> Result<()> {
        self.write_attr(record, field, Some(AttrValue::Number(value as f64)))
    }

    /// Принимаются только 'T' и 'F'; остальное оставляет байт как есть.
    pub fn write_logical(&mut self, record: usize, field: usize, value: char) -> Result<()> {
        self.write_attr(record, field, Some(AttrValue::Logical(value)))
    }

    /// Записать NULL: окно поля целиком заполняется заполнителем типа.
    pub fn write_null(&mut self, record: usize, field: usize) -> Result<()> {
        self.write_attr(record, field, None)
    }

    fn write_attr(
        &mut self,
        record: usize,
        field: usize,
        value: Option<AttrValue<'_>>,
    ) -> Result<()> {
        self.require_writable()?;
        if field >= self.fields.len() {
            return Err(DbfError::InvalidField(format!(
                "field {} out of range (count {})",
                field,
                self.fields.len()
            )));
        }
        self.prepare_record_write(record)?;
        self.cur_dirty = true;
        self.updated = true;

        let d = self.fields[field].clone();
        let (off, w) = (d.offset, d.width);

        let value = match value {
            None => {
                self.cur_record[off..off + w].fill(d.ftype.null_fill());
                return Ok(());
            }
            Some(v) => v,
        };

        match d.ftype {
            FieldType::Number | FieldType::Float | FieldType::Date => {
                let x = match value {
                    AttrValue::Number(n) => n,
                    AttrValue::Text(s) => parse_double_permissive(s),
                    AttrValue::Logical(_) => 0.0,
                };
                // Числа выравниваются вправо; формат даёт минимум w байт,
                // поэтому окно покрывается целиком.
                let mut text = if d.decimals == 0 {
                    format!("{:>width$}", x as i32, width = w)
                } else {
                    format!("{:>width$.prec$}", x, width = w, prec = d.decimals)
                };
                let overflow = text.len() > w;
                if overflow {
                    text.truncate(w);
                }
                self.cur_record[off..off + text.len()].copy_from_slice(text.as_bytes());
                if overflow {
                    warn!(
                        "record {} field {}: numeric value truncated to width {}",
                        record, field, w
                    );
                    return Err(DbfError::Overflow { field, width: w });
                }
                Ok(())
            }
            FieldType::Logical => {
                let c = match value {
                    AttrValue::Logical(c) => c,
                    AttrValue::Text(s) => s.chars().next().unwrap_or('\0'),
                    AttrValue::Number(_) => '\0',
                };
                if w >= 1 && (c == 'T' || c == 'F') {
                    self.cur_record[off] = c as u8;
                }
                Ok(())
            }
            FieldType::Character => {
                let owned;
                let s: &str = match value {
                    AttrValue::Text(s) => s,
                    AttrValue::Number(n) => {
                        owned = n.to_string();
                        &owned
                    }
                    AttrValue::Logical(c) => {
                        owned = c.to_string();
                        &owned
                    }
                };
                let bytes = s.as_bytes();
                if bytes.len() > w {
                    // Усечение: окно уже целиком перекрывается новыми байтами.
                    self.cur_record[off..off + w].copy_from_slice(&bytes[..w]);
                    warn!(
                        "record {} field {}: string value truncated to width {}",
                        record, field, w
                    );
                    return Err(DbfError::Overflow { field, width: w });
                }
                self.cur_record[off..off + w].fill(b' ');
                self.cur_record[off..off + bytes.len()].copy_from_slice(bytes);
                Ok(())
            }
        }
    }
}
