//! Поля DBF: тег типа, дескриптор, кодирование 32-байтового блока,
//! null-заполнители и разбор числового текста.
//!
//! Кодирование/декодирование — чистые функции: совместимость формата
//! проверяется тестами без файла.

use crate::consts::*;
use crate::error::{DbfError, Result};

/// Однобайтовый тег типа поля, как он хранится в дескрипторе.
///
/// `Date` поддерживается только ради байтовой раскладки; неизвестные теги
/// при чтении трактуются как `Character` (все текстовые пути к ним применимы).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Character,
    Number,
    Float,
    Logical,
    Date,
}

impl FieldType {
    pub fn to_tag(self) -> u8 {
        match self {
            FieldType::Character => b'C',
            FieldType::Number => b'N',
            FieldType::Float => b'F',
            FieldType::Logical => b'L',
            FieldType::Date => b'D',
        }
    }

    pub fn from_tag(tag: u8) -> Self {
        match tag {
            b'N' => FieldType::Number,
            b'F' => FieldType::Float,
            b'L' => FieldType::Logical,
            b'D' => FieldType::Date,
            _ => FieldType::Character,
        }
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Number | FieldType::Float)
    }

    /// Байт-заполнитель для NULL-значения данного типа.
    pub fn null_fill(self) -> u8 {
        match self {
            FieldType::Number | FieldType::Float => b'*',
            FieldType::Date => b'0',
            FieldType::Logical => b'?',
            FieldType::Character => b' ',
        }
    }
}

/// Логический вид поля для потребителей (экспорт, выбор метода чтения).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Double,
    Logical,
}

/// Описание одной колонки плюс производное смещение внутри записи.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub ftype: FieldType,
    pub width: usize,
    pub decimals: usize,
    /// Смещение значения в записи; offset[0] == 1 (байт 0 — флаг удаления).
    pub offset: usize,
}

impl FieldDescriptor {
    /// Имя усекается до 10 байт — больше на диск не помещается.
    pub fn new(name: &str, ftype: FieldType, width: usize, decimals: usize, offset: usize) -> Self {
        let raw = name.as_bytes();
        let take = raw.len().min(FLD_NAME_MAX);
        Self {
            name: String::from_utf8_lossy(&raw[..take]).into_owned(),
            ftype,
            width,
            decimals,
            offset,
        }
    }

    /// Integer/Double различаются эвристикой: decimals > 0 или ширина > 10
    /// означают, что в i32 значение может не поместиться.
    pub fn kind(&self) -> FieldKind {
        match self.ftype {
            FieldType::Logical => FieldKind::Logical,
            FieldType::Number | FieldType::Float => {
                if self.decimals > 0 || self.width > 10 {
                    FieldKind::Double
                } else {
                    FieldKind::Integer
                }
            }
            _ => FieldKind::Text,
        }
    }

    /// Сериализация в 32-байтовый дескриптор.
    pub fn encode(&self) -> [u8; FIELD_DESC_SIZE] {
        let mut out = [0u8; FIELD_DESC_SIZE];
        let raw = self.name.as_bytes();
        let n = raw.len().min(FLD_NAME_MAX);
        out[FLD_OFF_NAME..FLD_OFF_NAME + n].copy_from_slice(&raw[..n]);
        out[FLD_OFF_TYPE] = self.ftype.to_tag();
        if self.ftype == FieldType::Character {
            out[FLD_OFF_WIDTH] = (self.width % 256) as u8;
            out[FLD_OFF_DECIMALS] = (self.width / 256) as u8;
        } else {
            out[FLD_OFF_WIDTH] = self.width as u8;
            out[FLD_OFF_DECIMALS] = self.decimals as u8;
        }
        out
    }

    /// Разбор 32-байтового дескриптора; offset проставляет вызывающий.
    ///
    /// Ширина берётся только из байта 16: писатель не выдаёт значений
    /// больше 255, старший байт символьной ширины здесь не нужен.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        if raw.len() < FIELD_DESC_SIZE {
            return Err(DbfError::Format(format!(
                "field descriptor shorter than {} bytes",
                FIELD_DESC_SIZE
            )));
        }
        let ftype = FieldType::from_tag(raw[FLD_OFF_TYPE]);
        let name_area = &raw[FLD_OFF_NAME..FLD_OFF_NAME + FLD_NAME_MAX + 1];
        let end = name_area.iter().position(|&b| b == 0).unwrap_or(name_area.len());
        let name = String::from_utf8_lossy(&name_area[..end])
            .trim_end_matches(' ')
            .to_string();
        let width = raw[FLD_OFF_WIDTH] as usize;
        let decimals = if ftype.is_numeric() {
            raw[FLD_OFF_DECIMALS] as usize
        } else {
            0
        };
        Ok(Self {
            name,
            ftype,
            width,
            decimals,
            offset: 0,
        })
    }
}

/// Классификация «сырого» значения поля как NULL (по типу СТАРОГО поля).
///
/// Числовые: все пробелы либо ведущая '*'; дата: "00000000";
/// логические: '?'; строки: пусто.
pub fn is_value_null(ftype: FieldType, value: &[u8]) -> bool {
    match ftype {
        FieldType::Number | FieldType::Float => {
            if value.first() == Some(&b'*') {
                return true;
            }
            value.iter().all(|&b| b == b' ')
        }
        FieldType::Date => value.get(..8) == Some(b"00000000"),
        FieldType::Logical => value.first() == Some(&b'?'),
        FieldType::Character => value.iter().all(|&b| b == b' '),
    }
}

/// Разбор числа в духе atof: ведущие пробелы пропускаются, берётся самый
/// длинный корректный префикс, мусор даёт 0.0.
pub fn parse_double_permissive(text: &str) -> f64 {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    let start = i;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    // Экспонента учитывается, только если за ней есть хотя бы одна цифра.
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    text[start..i].parse::<f64>().unwrap_or(0.0)
}
