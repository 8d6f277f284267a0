// Базовые модули
pub mod config;
pub mod consts;
pub mod error;
pub mod util;

// Формат: типы полей, заголовок файла, сайдкар кодовой страницы
pub mod codepage;
pub mod field;
pub mod header;

// Хэндл таблицы (src/dbf/{mod,core,open,attr,mutate}.rs)
pub mod dbf;

// Удобные реэкспорты
pub use config::DbfConfig;
pub use dbf::{Access, Dbf};
pub use error::{DbfError, Result};
pub use field::{FieldDescriptor, FieldKind, FieldType};
