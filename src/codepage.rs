//! Кодовая страница: метка `LDID/<n>` и сайдкар `<basename>.cpg`.
//!
//! Правило: маленький language driver id (0..=255) хранится байтом в самом
//! заголовке, сайдкар не нужен; любая другая метка пишется одной строкой в
//! .cpg, а байт остаётся нулевым.

use std::fs;
use std::path::{Path, PathBuf};

use crate::consts::{CPG_EXT, LDID_PREFIX};
use crate::error::Result;

pub fn cpg_path(dbf_path: &Path) -> PathBuf {
    dbf_path.with_extension(CPG_EXT)
}

/// `LDID/<n>` c n в 0..=255 -> Some(n); всё остальное — None (нужен сайдкар).
/// LDID/0 — валидное значение, но байт 0 в заголовке означает «не задан».
pub fn parse_ldid(label: &str) -> Option<u8> {
    let tail = label.strip_prefix(LDID_PREFIX)?;
    tail.trim().parse::<u16>().ok().filter(|n| *n <= 255).map(|n| n as u8)
}

/// Первая строка сайдкара, если он есть и непустой. Ошибки чтения
/// сворачиваются в None: отсутствие .cpg — нормальная ситуация.
pub fn read_sidecar(dbf_path: &Path) -> Option<String> {
    let text = fs::read_to_string(cpg_path(dbf_path)).ok()?;
    let line = text.lines().next()?.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

pub fn write_sidecar(dbf_path: &Path, label: &str) -> Result<()> {
    fs::write(cpg_path(dbf_path), label)?;
    Ok(())
}

/// Убрать устаревший сайдкар (best-effort).
pub fn remove_sidecar(dbf_path: &Path) {
    let _ = fs::remove_file(cpg_path(dbf_path));
}
