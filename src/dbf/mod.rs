//! dbf — хэндл таблицы и операции над ним.
//!
//! Разделение по подмодулям:
//! - core.rs   — структура Dbf, кэш одной записи (load/flush), счётчики,
//!               инфо о полях, флаги удаления, сырые записи, close/Drop
//! - open.rs   — create/open (+ _with_config), fs2-блокировки, сайдкар .cpg
//! - attr.rs   — чтение/запись атрибутов, NULL-семантика, append
//! - mutate.rs — схемная хирургия: add/delete/reorder/alter c перекладкой
//!               всех записей на диске

pub mod attr;
pub mod core;
pub mod mutate;
pub mod open;

pub use core::Dbf;
pub use open::Access;
