//! Позиционные обёртки над file I/O.
//!
//! read_exact/write_all гарантируют полный объём: короткое чтение
//! всплывает как UnexpectedEof, а не тихо дополняется нулями.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::Result;

pub fn read_at(f: &mut File, offset: u64, buf: &mut [u8]) -> Result<()> {
    f.seek(SeekFrom::Start(offset))?;
    f.read_exact(buf)?;
    Ok(())
}

pub fn write_at(f: &mut File, offset: u64, buf: &[u8]) -> Result<()> {
    f.seek(SeekFrom::Start(offset))?;
    f.write_all(buf)?;
    Ok(())
}
