//! REST client for the Sheets v4 and Drive v3 APIs.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::RequestBuilder;
use serde_json::{json, Value};

use lotsync_core::utils::Lookup;

use super::api_model::{GridSize, SpreadsheetRef, WorksheetInfo};
use super::api_traits::SpreadsheetApi;
use crate::auth::AccessTokenSource;
use crate::errors::{Result, SheetsError};
use crate::format::{quoted_title, ColumnFormat};

pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

pub struct SheetsApiClient {
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenSource>,
    sheets_url: String,
    drive_url: String,
}

impl SheetsApiClient {
    pub fn new(tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            tokens,
            sheets_url: DEFAULT_SHEETS_API_URL.to_string(),
            drive_url: DEFAULT_DRIVE_API_URL.to_string(),
        }
    }

    /// Point both APIs at other hosts (used by tests).
    pub fn with_base_urls(mut self, sheets_url: &str, drive_url: &str) -> Self {
        self.sheets_url = sheets_url.trim_end_matches('/').to_string();
        self.drive_url = drive_url.trim_end_matches('/').to_string();
        self
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.sheets_url,
            urlencoding::encode(spreadsheet_id)
        )
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    /// Attach the bearer token, send, and decode the JSON body.
    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let token = self.tokens.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SheetsError::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| {
                    Lookup::new(&v)
                        .path(["error", "message"])
                        .as_str()
                        .map(str::to_string)
                })
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| SheetsError::Decode(format!("{} - {}", e, body.chars().take(200).collect::<String>())))
    }

    async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<Value>) -> Result<Value> {
        let url = format!("{}:batchUpdate", self.spreadsheet_url(spreadsheet_id));
        self.send(self.http.post(url).json(&json!({ "requests": requests })))
            .await
    }
}

fn parse_worksheet(properties: Lookup<'_>) -> Result<WorksheetInfo> {
    let sheet_id = properties
        .get("sheetId")
        .value()
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let title = properties
        .get("title")
        .as_str()
        .ok_or_else(|| SheetsError::Decode("Worksheet has no title".to_string()))?;
    let grid = properties.get("gridProperties");
    let count = |key: &str| {
        grid.get(key)
            .value()
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize
    };

    Ok(WorksheetInfo {
        sheet_id,
        title: title.to_string(),
        row_count: count("rowCount"),
        column_count: count("columnCount"),
    })
}

/// Drive query literal: backslashes and single quotes escaped.
fn drive_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Cells are sent as-is except null, which becomes an empty string.
fn to_cell(value: Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
        other => other,
    }
}

#[async_trait]
impl SpreadsheetApi for SheetsApiClient {
    async fn find_spreadsheet(&self, name: &str) -> Result<Option<SpreadsheetRef>> {
        let query = format!(
            "name = {} and mimeType = '{}' and trashed = false",
            drive_string_literal(name),
            SPREADSHEET_MIME_TYPE
        );
        debug!("[Drive] files.list q={}", query);

        let body = self
            .send(
                self.http
                    .get(format!("{}/files", self.drive_url))
                    .query(&[("q", query.as_str()), ("fields", "files(id,name)")]),
            )
            .await?;

        let found = Lookup::new(&body)
            .get("files")
            .as_array()
            .and_then(|files| files.first())
            .and_then(|file| {
                let file = Lookup::new(file);
                Some(SpreadsheetRef {
                    id: file.get("id").as_str()?.to_string(),
                    name: file.get("name").as_str().unwrap_or(name).to_string(),
                })
            });
        Ok(found)
    }

    async fn create_spreadsheet(&self, name: &str) -> Result<SpreadsheetRef> {
        let body = self
            .send(
                self.http
                    .post(format!("{}/spreadsheets", self.sheets_url))
                    .json(&json!({"properties": {"title": name}})),
            )
            .await?;

        let id = Lookup::new(&body)
            .get("spreadsheetId")
            .as_str()
            .ok_or_else(|| SheetsError::Decode("Response has no spreadsheetId".to_string()))?;
        Ok(SpreadsheetRef {
            id: id.to_string(),
            name: name.to_string(),
        })
    }

    async fn list_worksheets(&self, spreadsheet_id: &str) -> Result<Vec<WorksheetInfo>> {
        let body = self
            .send(
                self.http
                    .get(self.spreadsheet_url(spreadsheet_id))
                    .query(&[("fields", "sheets.properties")]),
            )
            .await?;

        Lookup::new(&body)
            .get("sheets")
            .as_array()
            .map(|sheets| {
                sheets
                    .iter()
                    .map(|sheet| parse_worksheet(Lookup::new(sheet).get("properties")))
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        size: GridSize,
    ) -> Result<WorksheetInfo> {
        let body = self
            .batch_update(
                spreadsheet_id,
                vec![json!({
                    "addSheet": {"properties": {
                        "title": title,
                        "gridProperties": {"rowCount": size.rows, "columnCount": size.columns}
                    }}
                })],
            )
            .await?;

        let replies = Lookup::new(&body).get("replies");
        let properties = replies
            .as_array()
            .and_then(|r| r.first())
            .map(|reply| Lookup::new(reply).path(["addSheet", "properties"]))
            .unwrap_or(Lookup::Missing);
        if properties.is_missing() {
            return Err(SheetsError::Decode("addSheet reply missing".to_string()));
        }
        parse_worksheet(properties)
    }

    async fn resize_worksheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        size: GridSize,
    ) -> Result<()> {
        self.batch_update(
            spreadsheet_id,
            vec![json!({
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": sheet_id,
                        "gridProperties": {"rowCount": size.rows, "columnCount": size.columns}
                    },
                    "fields": "gridProperties(rowCount,columnCount)"
                }
            })],
        )
        .await?;
        Ok(())
    }

    async fn clear_worksheet(&self, spreadsheet_id: &str, title: &str) -> Result<()> {
        let url = format!("{}:clear", self.values_url(spreadsheet_id, &quoted_title(title)));
        self.send(self.http.post(url).json(&json!({}))).await?;
        Ok(())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        title: &str,
        values: Vec<Vec<Value>>,
    ) -> Result<()> {
        let range = format!("{}!A1", quoted_title(title));
        let values: Vec<Vec<Value>> = values
            .into_iter()
            .map(|row| row.into_iter().map(to_cell).collect())
            .collect();

        self.send(
            self.http
                .put(self.values_url(spreadsheet_id, &range))
                .query(&[("valueInputOption", "RAW")])
                .json(&json!({"range": range, "majorDimension": "ROWS", "values": values})),
        )
        .await?;
        Ok(())
    }

    async fn apply_number_formats(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        formats: &[ColumnFormat],
    ) -> Result<()> {
        if formats.is_empty() {
            return Ok(());
        }

        let requests = formats
            .iter()
            .map(|f| {
                json!({
                    "repeatCell": {
                        "range": {
                            "sheetId": sheet_id,
                            "startRowIndex": f.start_row,
                            "endRowIndex": f.end_row,
                            "startColumnIndex": f.column,
                            "endColumnIndex": f.column + 1
                        },
                        "cell": {"userEnteredFormat": {"numberFormat": f.format}},
                        "fields": "userEnteredFormat.numberFormat"
                    }
                })
            })
            .collect();

        self.batch_update(spreadsheet_id, requests).await?;
        Ok(())
    }
}
