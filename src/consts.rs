//! Общие константы формата xBase/DBF (все целые — LE).
//!
//! Раскладка файла:
//! [0]       u8  байт версии, 0x03 (таблица без memo-полей)
//! [1..4]    u8  дата модификации YY/MM/DD (пишем фиксированную)
//! [4..8]    u32 количество записей
//! [8..10]   u16 длина заголовка = 32 + 32*n_fields (+1 под терминатор)
//! [10..12]  u16 длина записи = 1 (флаг удаления) + сумма ширин полей
//! [29]      u8  language driver id (0 = не задан)
//! [32..hdr] дескрипторы полей по 32 байта, затем 0x0D, если есть место
//!
//! Записи идут подряд: offset(i) = hdr_len + i*rec_len.
//! Байт 0 каждой записи — флаг удаления (' ' активна, '*' удалена).

pub const FILE_HDR_SIZE: usize = 32;
pub const FIELD_DESC_SIZE: usize = 32;

pub const DBF_VERSION: u8 = 0x03;
pub const HDR_TERMINATOR: u8 = 0x0D;

// Фиктивная дата модификации (совместимо с shapelib-писателями).
pub const DUMMY_MDATE: [u8; 3] = [95, 7, 26];

// -------- Смещения в 32-байтовом заголовке файла --------
pub const OFF_RECORD_COUNT: usize = 4;
pub const OFF_HEADER_LEN: usize = 8;
pub const OFF_RECORD_LEN: usize = 10;
pub const OFF_LANGUAGE_DRIVER: usize = 29;

// -------- Смещения внутри дескриптора поля --------
// Имя: байты 0..11 (пишем не более 10, остальное NUL).
// Байт 11 — тег типа ('C','N','F','L','D').
// Байт 16 — ширина (low byte); для числовых типов байт 17 — decimals,
// для символьных — старший байт 16-битной ширины.
pub const FLD_OFF_NAME: usize = 0;
pub const FLD_NAME_MAX: usize = 10;
pub const FLD_OFF_TYPE: usize = 11;
pub const FLD_OFF_WIDTH: usize = 16;
pub const FLD_OFF_DECIMALS: usize = 17;

pub const MAX_FIELD_WIDTH: usize = 255;

// -------- Записи --------
pub const FLAG_ACTIVE: u8 = b' ';
pub const FLAG_DELETED: u8 = b'*';

// -------- Кодовая страница --------
pub const CPG_EXT: &str = "cpg";
pub const LDID_PREFIX: &str = "LDID/";
pub const DEFAULT_CODE_PAGE: &str = "LDID/87";
