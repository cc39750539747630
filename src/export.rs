//! Excel export functionality.

use std::path::Path;

use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::models::{DiffEntry, EmployeeSummary, VerificationRecord, VerificationStatus};

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

/// Write headers with widths, an autofilter over `rows` and a frozen top row.
fn write_frame(worksheet: &mut Worksheet, headers: &[(&str, f64)], rows: usize) -> Result<(), XlsxError> {
    let header_format = header_format();
    for (col, (header, width)) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        worksheet.set_column_width(col as u16, *width)?;
    }
    if rows > 0 {
        worksheet.autofilter(0, 0, rows as u32, (headers.len() - 1) as u16)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Export one date's verification records.
/// Missing rows are highlighted red, unexpected rows amber.
pub fn export_verification_to_excel(date: &str, data: &[VerificationRecord], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name(format!("Сверка {date}"))?;

    let headers = [
        ("ФИО", 32.0),
        ("Должность", 20.0),
        ("Смена", 8.0),
        ("Линия", 18.0),
        ("План", 6.0),
        ("Факт", 6.0),
        ("Время", 22.0),
        ("Статус", 12.0),
        ("Отдел", 20.0),
    ];
    write_frame(worksheet, &headers, data.len())?;

    let missing_format = Format::new().set_background_color(Color::RGB(0xF8CBAD));
    let unexpected_format = Format::new().set_background_color(Color::RGB(0xFFE699));
    let plain = Format::new();

    for (idx, record) in data.iter().enumerate() {
        let row = (idx + 1) as u32;
        let format = match record.status {
            VerificationStatus::Ok => &plain,
            VerificationStatus::Missing => &missing_format,
            VerificationStatus::Unexpected => &unexpected_format,
        };

        worksheet.write_string_with_format(row, 0, &record.name, format)?;
        worksheet.write_string_with_format(row, 1, &record.role, format)?;
        worksheet.write_string_with_format(row, 2, record.shift.as_deref().unwrap_or(""), format)?;
        worksheet.write_string_with_format(row, 3, record.line.as_deref().unwrap_or(""), format)?;
        worksheet.write_string_with_format(row, 4, if record.plan { "Да" } else { "Нет" }, format)?;
        worksheet.write_string_with_format(row, 5, if record.fact { "Да" } else { "Нет" }, format)?;
        worksheet.write_string_with_format(row, 6, record.time.as_deref().unwrap_or(""), format)?;
        worksheet.write_string_with_format(row, 7, record.status.label(), format)?;
        worksheet.write_string_with_format(row, 8, record.department.as_deref().unwrap_or(""), format)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Export per-employee totals.
pub fn export_employees_to_excel(data: &[EmployeeSummary], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name("Сотрудники")?;

    let headers = [
        ("ФИО", 32.0),
        ("Должность", 20.0),
        ("Отдел", 20.0),
        ("Смены", 8.0),
        ("РВ", 6.0),
        ("Ошибки", 8.0),
        ("Часы", 10.0),
    ];
    write_frame(worksheet, &headers, data.len())?;

    // Number format for hours
    let hours_format = Format::new().set_num_format("0.00");

    for (idx, summary) in data.iter().enumerate() {
        let row = (idx + 1) as u32;

        worksheet.write_string(row, 0, &summary.name)?;
        worksheet.write_string(row, 1, &summary.role)?;
        worksheet.write_string(row, 2, summary.department.as_deref().unwrap_or(""))?;
        worksheet.write_number(row, 3, summary.shifts_count)?;
        worksheet.write_number(row, 4, summary.rv_count)?;
        worksheet.write_number(row, 5, summary.error_count)?;
        worksheet.write_number_with_format(row, 6, summary.hours(), &hours_format)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Export plan differences.
pub fn export_diff_to_excel(data: &[DiffEntry], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name("Изменения")?;

    let headers = [
        ("Дата", 12.0),
        ("Смена", 8.0),
        ("Изменение", 12.0),
        ("Было", 32.0),
        ("Стало", 32.0),
        ("Откуда", 28.0),
        ("Куда", 28.0),
    ];
    write_frame(worksheet, &headers, data.len())?;

    for (idx, entry) in data.iter().enumerate() {
        let row = (idx + 1) as u32;

        worksheet.write_string(row, 0, entry.date())?;
        worksheet.write_string(row, 1, entry.shift())?;
        worksheet.write_string(row, 2, entry.kind_label())?;

        let (before, after, from, to) = match entry {
            DiffEntry::Added { name, line, role, .. } => (String::new(), name.clone(), String::new(), format!("{line} / {role}")),
            DiffEntry::Lost { name, line, role, .. } => (name.clone(), String::new(), format!("{line} / {role}"), String::new()),
            DiffEntry::Replaced {
                from_name,
                to_name,
                line,
                role,
                ..
            } => {
                let position = format!("{line} / {role}");
                (from_name.clone(), to_name.clone(), position.clone(), position)
            }
            DiffEntry::Moved { name, from, to, .. } => (
                name.clone(),
                name.clone(),
                format!("{} / {}", from.line, from.role),
                format!("{} / {}", to.line, to.role),
            ),
        };
        worksheet.write_string(row, 3, before)?;
        worksheet.write_string(row, 4, after)?;
        worksheet.write_string(row, 5, from)?;
        worksheet.write_string(row, 6, to)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Generate default filename for export.
pub fn generate_export_filename(prefix: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}.xlsx", ts = now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_export_filename() {
        let name = generate_export_filename("verify");
        assert!(name.starts_with("verify_"));
        assert!(name.ends_with(".xlsx"));
    }

    #[test]
    fn test_export_verification_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verify.xlsx");
        let records = vec![VerificationRecord {
            name: "Иванов Иван".to_string(),
            role: "Оператор".to_string(),
            shift: Some("1".to_string()),
            line: Some("Линия 1".to_string()),
            plan: true,
            fact: false,
            time: None,
            status: VerificationStatus::Missing,
            department: None,
        }];
        export_verification_to_excel("01.03.2024", &records, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_export_empty_diff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff.xlsx");
        export_diff_to_excel(&[], &path).unwrap();
        assert!(path.exists());
    }
}
