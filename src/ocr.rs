//! OCR data points as delivered by the transcription backend

use serde::{Deserialize, Serialize};

/// One transcribed table cell with its optional human correction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OcrDataPoint {
    pub image_name: String,
    pub table_idx: u32,
    pub cell_id: u32,
    pub ocr_text: String,
    /// `null` and a missing field both mean "not corrected yet"
    #[serde(default)]
    pub human_text: Option<String>,
    pub image_path: String,
    pub image_width: u32,
    pub image_height: u32,
}

/// Body of `GET /ocr/data_points`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPointsResponse {
    pub data_points: Vec<OcrDataPoint>,
}

/// Identity of a cell across data point reloads
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub image_name: String,
    pub table_idx: u32,
    pub cell_id: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrectionStatus {
    Corrected,
    Pending,
}

impl OcrDataPoint {
    pub fn key(&self) -> CellKey {
        CellKey {
            image_name: self.image_name.clone(),
            table_idx: self.table_idx,
            cell_id: self.cell_id,
        }
    }

    /// Presence of a human transcription, not its content, decides the status
    pub fn status(&self) -> CorrectionStatus {
        if self.human_text.is_some() {
            CorrectionStatus::Corrected
        } else {
            CorrectionStatus::Pending
        }
    }

    /// Text shown to the operator before any local edit
    pub fn display_text(&self) -> &str {
        self.human_text.as_deref().unwrap_or(&self.ocr_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_null_human_text_are_pending() {
        let missing: OcrDataPoint = serde_json::from_str(
            r#"{"image_name": "p1.jpg", "table_idx": 0, "cell_id": 3, "ocr_text": "1913",
                "image_path": "cells/p1_0_3.jpg", "image_width": 80, "image_height": 20}"#,
        )
        .unwrap();
        let null: OcrDataPoint = serde_json::from_str(
            r#"{"image_name": "p1.jpg", "table_idx": 0, "cell_id": 3, "ocr_text": "1913",
                "human_text": null, "image_path": "cells/p1_0_3.jpg",
                "image_width": 80, "image_height": 20}"#,
        )
        .unwrap();
        assert_eq!(missing, null);
        assert_eq!(missing.status(), CorrectionStatus::Pending);
        assert_eq!(missing.display_text(), "1913");
    }

    #[test]
    fn test_empty_human_text_counts_as_corrected() {
        let point = OcrDataPoint {
            image_name: "p1.jpg".into(),
            table_idx: 1,
            cell_id: 0,
            ocr_text: "l9l3".into(),
            human_text: Some(String::new()),
            image_path: "cells/a.jpg".into(),
            image_width: 10,
            image_height: 10,
        };
        assert_eq!(point.status(), CorrectionStatus::Corrected);
        assert_eq!(point.display_text(), "");
    }
}
