use crate::models::ClassifiedRow;
use std::io::Write;
use std::path::Path;

pub type ExportError = Box<dyn std::error::Error + Send + Sync>;

pub const EXPORT_HEADER: [&str; 14] = [
    "Order",
    "ClassificationCode_A",
    "ClassificationCode_B",
    "Description_A",
    "Description_B",
    "InternalCode_A",
    "InternalCode_B",
    "Quantity_A",
    "Unit_A",
    "Quantity_B",
    "Unit_B",
    "Value_A",
    "Value_B",
    "RowSeverity",
];

fn record(r: &ClassifiedRow) -> [String; 14] {
    let row = &r.row;
    [
        row.order.clone(),
        row.co.classification_code.clone(),
        row.fc.classification_code.clone(),
        row.co.description.clone(),
        row.fc.description.clone(),
        row.co.internal_code.clone().unwrap_or_default(),
        row.fc.internal_code.clone().unwrap_or_default(),
        row.co.quantity.to_string(),
        row.co.unit.clone(),
        row.fc.quantity.to_string(),
        row.fc.unit.clone(),
        row.co.value.to_string(),
        row.fc.value.to_string(),
        r.severity.as_str().to_string(),
    ]
}

/// 写出比对结果; diffs_only 为真时只导出有差异的行
pub fn write_csv<W: Write>(rows: &[ClassifiedRow], out: W, diffs_only: bool) -> Result<usize, ExportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(EXPORT_HEADER)?;

    let mut written = 0;
    for r in rows.iter().filter(|r| !diffs_only || r.has_diff) {
        writer.write_record(record(r))?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}

pub fn to_csv_bytes(rows: &[ClassifiedRow], diffs_only: bool) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf, diffs_only)?;
    Ok(buf)
}

/// 导出到 CSV 文件
pub fn export_to_csv(rows: &[ClassifiedRow], output_path: &Path, diffs_only: bool) -> Result<usize, ExportError> {
    let file = std::fs::File::create(output_path)?;
    let written = write_csv(rows, file, diffs_only)?;
    tracing::info!("导出 {} 行到 {}", written, output_path.display());
    Ok(written)
}

/// 下载文件名, 例如 `divergencias_1718000000000.csv`
pub fn export_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("divergencias_{}.csv", now.timestamp_millis())
}
