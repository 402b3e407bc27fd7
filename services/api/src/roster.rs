use crate::infra::open_store;
use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::students::{StudentRecord, StudentStore};
use admissions::telemetry;
use clap::{Args, ValueEnum};
use std::io::Write;

const COLUMNS: [&str; 10] = [
    "id",
    "name",
    "guardian_name",
    "guardian_phone",
    "student_phone",
    "dob",
    "address",
    "class",
    "subjects",
    "photo_path",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum RosterFormat {
    /// Aligned columns for a terminal
    #[default]
    Table,
    /// `{"students": [...]}`, as served by /admin
    Json,
    /// Header row plus one row per admission
    Csv,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = RosterFormat::Table)]
    pub(crate) format: RosterFormat,
}

pub(crate) async fn run_init_db() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = open_store(&config).await?;
    println!("students table ready ({} store)", store.backend());
    store.close().await;
    Ok(())
}

pub(crate) async fn run_list(args: ListArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = open_store(&config).await?;
    let records = store.list_all().await;
    store.close().await;

    let stdout = std::io::stdout();
    render_roster(&records?, args.format, &mut stdout.lock())
}

pub(crate) fn render_roster<W: Write>(
    records: &[StudentRecord],
    format: RosterFormat,
    out: &mut W,
) -> Result<(), AppError> {
    match format {
        RosterFormat::Table => render_table(records, out),
        RosterFormat::Json => {
            let payload = serde_json::json!({ "students": records });
            serde_json::to_writer_pretty(&mut *out, &payload)
                .map_err(|err| AppError::Export(err.to_string()))?;
            writeln!(out)?;
            Ok(())
        }
        RosterFormat::Csv => render_csv(records, out),
    }
}

fn render_csv<W: Write>(records: &[StudentRecord], out: &mut W) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    writer
        .write_record(COLUMNS)
        .map_err(|err| AppError::Export(err.to_string()))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|err| AppError::Export(err.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn render_table<W: Write>(records: &[StudentRecord], out: &mut W) -> Result<(), AppError> {
    if records.is_empty() {
        writeln!(out, "No admissions recorded.")?;
        return Ok(());
    }

    let rows: Vec<[String; 6]> = records
        .iter()
        .map(|record| {
            [
                record.id.to_string(),
                record.name.clone(),
                record.class.clone(),
                record.guardian_name.clone(),
                record.guardian_phone.clone(),
                record.photo_path.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    let header = ["ID", "Name", "Class", "Guardian", "Guardian phone", "Photo"];

    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(&header))?;
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        writeln!(out, "{}", line(&cells))?;
    }
    writeln!(out, "\n{} admission(s)", records.len())?;
    Ok(())
}
