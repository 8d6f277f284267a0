use clap::{Parser, Subcommand};
use std::path::PathBuf;

use dbfkit::FieldType;

#[derive(Parser, Debug)]
#[command(
    name = "dbfkit",
    version,
    about = "xBase/DBF table inspector, TSV converter and schema editor",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Схема и счётчики таблицы
    Info {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// DBF -> TSV на stdout
    Export {
        #[arg(long)]
        path: PathBuf,
    },
    /// TSV -> DBF с наивным выводом типов по значениям колонок
    Import {
        #[arg(long)]
        tsv: PathBuf,
        #[arg(long)]
        path: PathBuf,
        /// Метка кодовой страницы ("LDID/<n>" или имя для сайдкара .cpg)
        #[arg(long)]
        code_page: Option<String>,
    },
    /// Добавить поле в конец схемы (все записи переписываются)
    AddField {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_field_type)]
        r#type: FieldType,
        #[arg(long)]
        width: usize,
        #[arg(long, default_value_t = 0)]
        decimals: usize,
    },
    /// Удалить поле по индексу
    DeleteField {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        field: usize,
    },
    /// Переопределить поле: имя/тип/ширина/decimals
    AlterField {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        field: usize,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_field_type)]
        r#type: FieldType,
        #[arg(long)]
        width: usize,
        #[arg(long, default_value_t = 0)]
        decimals: usize,
    },
    /// Переставить поля: order[i] — старый индекс поля для позиции i
    Reorder {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, value_delimiter = ',')]
        order: Vec<usize>,
    },
}

pub fn parse_field_type(s: &str) -> Result<FieldType, String> {
    match s.trim().to_ascii_uppercase().as_str() {
        "C" | "CHAR" | "CHARACTER" | "STRING" => Ok(FieldType::Character),
        "N" | "NUMBER" | "NUMERIC" => Ok(FieldType::Number),
        "F" | "FLOAT" => Ok(FieldType::Float),
        "L" | "LOGICAL" | "BOOL" => Ok(FieldType::Logical),
        "D" | "DATE" => Ok(FieldType::Date),
        other => Err(format!("unknown field type {:?}", other)),
    }
}
