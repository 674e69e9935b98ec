use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, AppResult};

const SHEET_NAME: &str = "ResourceData";

/// The fixed sample table the export ships: month, total plan, total
/// capacity. Intentionally static — this action is not wired to live
/// dashboard state.
const SAMPLE_ROWS: [(&str, f64, f64); 12] = [
    ("Jan", 100.0, 220.0),
    ("Feb", 120.0, 210.0),
    ("Mar", 150.0, 230.0),
    ("Apr", 130.0, 200.0),
    ("May", 160.0, 240.0),
    ("Jun", 140.0, 230.0),
    ("Jul", 170.0, 250.0),
    ("Aug", 150.0, 240.0),
    ("Sep", 130.0, 220.0),
    ("Oct", 160.0, 230.0),
    ("Nov", 140.0, 210.0),
    ("Dec", 155.0, 235.0),
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub path: String,
    pub file_name: String,
    pub rows: usize,
}

pub struct ExportService {
    export_dir: PathBuf,
}

impl ExportService {
    pub fn new(data_dir: &Path) -> AppResult<Self> {
        let export_dir = data_dir.join("exports");
        std::fs::create_dir_all(&export_dir)?;
        Ok(Self { export_dir })
    }

    /// Writes `Resource-Planning-<year>.xlsx` and returns where it landed so
    /// the shell can reveal the file.
    pub fn export_resource_planning(&self, year: i32) -> AppResult<ExportResult> {
        let file_name = format!("Resource-Planning-{year}.xlsx");
        let path = self.export_dir.join(&file_name);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(SHEET_NAME)
            .map_err(|err| AppError::other(format!("写入导出表失败: {err}")))?;

        let header = Format::new().set_bold();
        worksheet
            .write_string_with_format(0, 0, "Month", &header)
            .and_then(|ws| ws.write_string_with_format(0, 1, "Total_Plan", &header))
            .and_then(|ws| ws.write_string_with_format(0, 2, "Total_Capacity", &header))
            .map_err(|err| AppError::other(format!("写入导出表失败: {err}")))?;

        for (index, (month, plan, capacity)) in SAMPLE_ROWS.iter().enumerate() {
            let row = (index + 1) as u32;
            worksheet
                .write_string(row, 0, *month)
                .and_then(|ws| ws.write_number(row, 1, *plan))
                .and_then(|ws| ws.write_number(row, 2, *capacity))
                .map_err(|err| AppError::other(format!("写入导出表失败: {err}")))?;
        }

        workbook
            .save(&path)
            .map_err(|err| AppError::other(format!("保存导出文件失败: {err}")))?;

        debug!(target: "app::export", path = %path.display(), "export written");

        Ok(ExportResult {
            path: path.display().to_string(),
            file_name,
            rows: SAMPLE_ROWS.len(),
        })
    }
}
