//! Google Sheets v4 client implementing [`SheetStore`].
//!
//! The operator supplies an OAuth bearer token with spreadsheet scope;
//! obtaining and refreshing the token is outside this crate.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::store::{SheetStore, StoreError, StoreResult};

const BASE_URL: &str = "https://sheets.googleapis.com";

/// One spreadsheet document behind the Sheets v4 REST API.
#[derive(Clone, Debug)]
pub struct GoogleSheets {
    client: Client,
    spreadsheet_id: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    title: String,
}

impl GoogleSheets {
    pub fn new(client: Client, spreadsheet_id: String, token: String) -> Self {
        Self {
            client,
            spreadsheet_id,
            token,
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!("{BASE_URL}/v4/spreadsheets/{}{suffix}", self.spreadsheet_id)
    }

    async fn send(
        &self,
        title: &str,
        req: reqwest::RequestBuilder,
    ) -> StoreResult<reqwest::Response> {
        let resp = req
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => "server error".to_string(),
        };
        Err(classify(title, status, message))
    }

    async fn values(&self, title: &str, range: &str) -> StoreResult<Vec<Vec<String>>> {
        let resp = self
            .send(title, self.client.get(self.url(&format!("/values/{range}"))))
            .await?;
        let body: ValueRange = resp
            .json()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(body.values)
    }

    async fn put_values(&self, title: &str, range: &str, values: &[Vec<String>]) -> StoreResult<()> {
        self.send(
            title,
            self.client
                .put(self.url(&format!("/values/{range}?valueInputOption=RAW")))
                .json(&json!({ "values": values })),
        )
        .await?;
        Ok(())
    }

    async fn batch_update(&self, title: &str, request: serde_json::Value) -> StoreResult<()> {
        self.send(
            title,
            self.client
                .post(self.url(":batchUpdate"))
                .json(&json!({ "requests": [request] })),
        )
        .await?;
        Ok(())
    }

    /// Numeric id of a sheet; `batchUpdate` addresses sheets by id, not title.
    async fn sheet_id(&self, title: &str) -> StoreResult<i64> {
        let resp = self
            .send(title, self.client.get(self.url("?fields=sheets.properties")))
            .await?;
        let meta: SpreadsheetMeta = resp
            .json()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        meta.sheets
            .into_iter()
            .find(|sheet| sheet.properties.title == title)
            .map(|sheet| sheet.properties.sheet_id)
            .ok_or_else(|| StoreError::SheetNotFound(title.to_string()))
    }
}

#[async_trait]
impl SheetStore for GoogleSheets {
    async fn sheet_titles(&self) -> StoreResult<Vec<String>> {
        let resp = self
            .send("", self.client.get(self.url("?fields=sheets.properties")))
            .await?;
        let meta: SpreadsheetMeta = resp
            .json()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    async fn add_sheet(&self, title: &str, header: &[String]) -> StoreResult<()> {
        self.batch_update(title, json!({ "addSheet": { "properties": { "title": title } } }))
            .await?;
        self.put_values(title, &format!("{title}!1:1"), &[header.to_vec()])
            .await
    }

    async fn header(&self, title: &str) -> StoreResult<Vec<String>> {
        let mut values = self.values(title, &format!("{title}!1:1")).await?;
        Ok(values.drain(..).next().unwrap_or_default())
    }

    async fn append_row(&self, title: &str, row: &[String]) -> StoreResult<()> {
        self.send(
            title,
            self.client
                .post(self.url(&format!(
                    "/values/{title}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS"
                )))
                .json(&json!({ "values": [row] })),
        )
        .await?;
        Ok(())
    }

    async fn rows(&self, title: &str) -> StoreResult<Vec<Vec<String>>> {
        let mut values = self.values(title, title).await?;
        if !values.is_empty() {
            values.remove(0);
        }
        Ok(values)
    }

    async fn update_cell(
        &self,
        title: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> StoreResult<()> {
        let cell = format!("{title}!{}{}", column_letter(column), row + 1);
        self.put_values(title, &cell, &[vec![value.to_string()]])
            .await
    }

    async fn delete_row(&self, title: &str, row: usize) -> StoreResult<()> {
        let sheet_id = self.sheet_id(title).await?;
        self.batch_update(
            title,
            json!({
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row,
                        "endIndex": row + 1,
                    }
                }
            }),
        )
        .await
    }

    async fn insert_leading_column(&self, title: &str, header_cell: &str) -> StoreResult<()> {
        let sheet_id = self.sheet_id(title).await?;
        self.batch_update(
            title,
            json!({
                "insertDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "COLUMNS",
                        "startIndex": 0,
                        "endIndex": 1,
                    },
                    "inheritFromBefore": false,
                }
            }),
        )
        .await?;
        self.put_values(
            title,
            &format!("{title}!A1"),
            &[vec![header_cell.to_string()]],
        )
        .await
    }
}

fn classify(title: &str, status: StatusCode, message: String) -> StoreError {
    if status == StatusCode::NOT_FOUND || message.starts_with("Unable to parse range") {
        return StoreError::SheetNotFound(title.to_string());
    }
    if message.contains("already exists") {
        return StoreError::SheetExists(title.to_string());
    }
    StoreError::Unavailable(format!("{status}: {message}"))
}

/// A1-notation letters of a 1-based column index.
fn column_letter(mut column: usize) -> String {
    let mut letters = String::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.insert(0, char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters
}
