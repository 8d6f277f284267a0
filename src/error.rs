//! Ошибки уровня таблицы.
//!
//! Таксономия намеренно маленькая:
//! - Format       — файл не похож на DBF (усечён, битый заголовок)
//! - InvalidField — плохая ссылка или параметр схемы (индекс, ширина, длина)
//! - Overflow     — значение не влезло в окно поля; усечённые данные при
//!                  этом уже записаны
//! - Io           — всё, что пришло от файловой системы

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbfError {
    #[error("malformed dbf file: {0}")]
    Format(String),

    #[error("invalid field reference: {0}")]
    InvalidField(String),

    #[error("value truncated: field {field} is {width} bytes wide")]
    Overflow { field: usize, width: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DbfError>;
