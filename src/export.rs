use crate::error::Result;
use crate::models::{GeoCoordinate, IrrigationVolume};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;

/// One calculation, flattened for tabular output. Field order is column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub date: DateTime<Local>,
    pub crop: String,
    pub crop_stage: String,
    pub kc: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub avg_etc_mm_day: f64,
    pub total_etc_mm: f64,
    pub total_precipitation_mm: f64,
    pub net_irrigation_need_mm: f64,
    pub gross_irrigation_need_mm: f64,
    pub surface_ha: f64,
    pub net_volume_m3: f64,
    pub gross_volume_m3: f64,
}

impl ExportRecord {
    pub fn new(
        date: DateTime<Local>,
        crop: impl Into<String>,
        crop_stage: impl Into<String>,
        kc: f64,
        location: &GeoCoordinate,
        volume: &IrrigationVolume,
    ) -> Self {
        Self {
            date,
            crop: crop.into(),
            crop_stage: crop_stage.into(),
            kc,
            latitude: location.latitude(),
            longitude: location.longitude(),
            avg_etc_mm_day: volume.balance.avg_etc_mm_day,
            total_etc_mm: volume.balance.total_etc_mm,
            total_precipitation_mm: volume.balance.total_precipitation_mm,
            net_irrigation_need_mm: volume.balance.net_irrigation_need_mm,
            gross_irrigation_need_mm: volume.balance.gross_irrigation_need_mm,
            surface_ha: volume.surface_ha,
            net_volume_m3: volume.net_volume_m3,
            gross_volume_m3: volume.gross_volume_m3,
        }
    }
}

/// Write `records` as CSV with a header row, creating parent directories.
pub fn write_csv(path: &Path, records: &[ExportRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!("Exported {} record(s) to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WaterBalanceResult;
    use chrono::TimeZone;

    fn sample() -> ExportRecord {
        let date = Local.with_ymd_and_hms(2025, 7, 8, 9, 30, 0).unwrap();
        let location = GeoCoordinate::new(43.6109, 3.8772).unwrap();
        let volume = IrrigationVolume {
            balance: WaterBalanceResult {
                avg_etc_mm_day: 4.8,
                total_etc_mm: 33.6,
                total_precipitation_mm: 7.0,
                net_irrigation_need_mm: 26.6,
                gross_irrigation_need_mm: 33.25,
            },
            surface_ha: 2.0,
            net_volume_m3: 532.0,
            gross_volume_m3: 665.0,
        };
        ExportRecord::new(date, "Maize", "mid_season", 1.2, &location, &volume)
    }

    #[test]
    fn writes_header_and_rows_in_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("irrigation.csv");

        write_csv(&path, &[sample(), sample()]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "date,crop,crop_stage,kc,latitude,longitude,avg_etc_mm_day,total_etc_mm,\
             total_precipitation_mm,net_irrigation_need_mm,gross_irrigation_need_mm,\
             surface_ha,net_volume_m3,gross_volume_m3"
        );
        assert!(lines[1].starts_with("2025-07-08T09:30:00"));
        assert!(lines[1].contains(",Maize,mid_season,1.2,43.6109,3.8772,"));
        assert!(lines[1].ends_with(",2.0,532.0,665.0"));
    }

    #[test]
    fn empty_export_still_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&path, &[]).unwrap();
        assert!(path.exists());
    }
}
