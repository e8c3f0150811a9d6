// One operator's scan session on a selected container.
// Owns the keystroke decoder, resolves codes against the manifest, and
// turns accepted scans into ledger submissions. Attached on container
// selection and dropped on switch, so the keyboard hook never outlives
// its container.

use std::sync::Arc;

use thiserror::Error;

use backend_domain::services::{aggregation_for, match_row, KeyInput, ScanDecoder};
use backend_domain::{Container, ContainerMode, ManifestRow, ScanCorrection, ScanEvent};

use crate::api::{ApiError, LedgerApi, SubmitScan};
use crate::view::SharedView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMode {
    /// Immediately record quantity 1 against the matched row.
    Box,
    /// Only confirm the match visually; quantity is entered explicitly.
    Locate,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("please import a manifest first")]
    NoManifest,
    #[error("no manifest row matches '{0}'")]
    NoMatch(String),
    #[error("row {0} does not exist")]
    UnknownRow(usize),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug)]
pub enum ScanOutcome {
    Submitted(ScanEvent),
    Located { row_index: usize },
}

pub struct ScanSession {
    api: Arc<dyn LedgerApi>,
    operator: String,
    container: Container,
    view: SharedView,
    decoder: ScanDecoder,
    sub_mode: SubMode,
}

impl ScanSession {
    pub fn attach(api: Arc<dyn LedgerApi>, container: Container, operator: String) -> Self {
        let view = SharedView::new(aggregation_for(&container));
        Self {
            api,
            operator,
            container,
            view,
            decoder: ScanDecoder::default(),
            sub_mode: SubMode::Box,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn view(&self) -> SharedView {
        self.view.clone()
    }

    pub fn set_sub_mode(&mut self, sub_mode: SubMode) {
        self.sub_mode = sub_mode;
    }

    /// Feed one raw key event. A completed burst is resolved and, when
    /// accepted, submitted; partial input does nothing.
    pub async fn handle_key(
        &mut self,
        key: KeyInput,
        at_millis: i64,
    ) -> Result<Option<ScanOutcome>, SessionError> {
        match self.decoder.push_key(key, at_millis) {
            Some(code) => Ok(Some(self.scan_code(code.as_str()).await?)),
            None => Ok(None),
        }
    }

    pub async fn scan_code(&mut self, code: &str) -> Result<ScanOutcome, SessionError> {
        match self.container.mode {
            ContainerMode::Manual => {
                let event = self.submit(code, code, 1, "").await?;
                Ok(ScanOutcome::Submitted(event))
            }
            ContainerMode::Manifest => self.scan_against_manifest(code).await,
        }
    }

    async fn scan_against_manifest(&mut self, code: &str) -> Result<ScanOutcome, SessionError> {
        if self
            .container
            .manifest
            .as_ref()
            .map(|blob| blob.is_empty())
            .unwrap_or(true)
        {
            return Err(SessionError::NoManifest);
        }

        let rows = self.manifest_rows().await;
        match match_row(code, &rows) {
            Some(row_index) => match self.sub_mode {
                SubMode::Locate => {
                    self.view
                        .mark_located(row_index, code, &self.operator)
                        .await;
                    Ok(ScanOutcome::Located { row_index })
                }
                SubMode::Box => {
                    let sku = rows[row_index].sku.clone();
                    let event = self.submit(&sku, code, 1, "").await?;
                    Ok(ScanOutcome::Submitted(event))
                }
            },
            None => match self.sub_mode {
                // Locate confirms existing rows only.
                SubMode::Locate => Err(SessionError::NoMatch(code.to_string())),
                // Box mode keeps counting: the unmatched code becomes an
                // ad hoc row through aggregation.
                SubMode::Box => {
                    let event = self.submit(code, code, 1, "").await?;
                    Ok(ScanOutcome::Submitted(event))
                }
            },
        }
    }

    /// Locate sub-mode: record the full entered quantity for a confirmed
    /// row as one event.
    pub async fn set_quantity(
        &mut self,
        row_index: usize,
        qty: i64,
        pallet_no: &str,
    ) -> Result<ScanEvent, SessionError> {
        let rows = self.manifest_rows().await;
        let row = rows
            .get(row_index)
            .ok_or(SessionError::UnknownRow(row_index))?;
        let raw_code = if row.scanned_sku.is_empty() {
            row.sku.clone()
        } else {
            row.scanned_sku.clone()
        };
        let sku = row.sku.clone();
        let event = self.submit(&sku, &raw_code, qty, pallet_no).await?;
        Ok(event)
    }

    pub async fn correct(
        &mut self,
        event_id: &str,
        correction: ScanCorrection,
    ) -> Result<ScanEvent, SessionError> {
        let corrected = self.api.correct_scan(event_id, &correction).await?;
        let mut events = self.view.events().await;
        if let Some(slot) = events.iter_mut().find(|event| event.id == corrected.id) {
            *slot = corrected.clone();
            self.view.apply_local(events).await;
        }
        Ok(corrected)
    }

    pub async fn delete(&mut self, event_id: &str) -> Result<(), SessionError> {
        self.api.delete_scan(event_id).await?;
        let mut events = self.view.events().await;
        events.retain(|event| event.id.as_str() != event_id);
        self.view.apply_local(events).await;
        Ok(())
    }

    /// Upload a sheet, attach the parsed blob, and rebuild the local view
    /// synchronously so the freshly parsed dataset is displayed without
    /// waiting for the next poll.
    pub async fn upload_manifest(
        &mut self,
        file_name: &str,
        content: &str,
    ) -> Result<(), SessionError> {
        let container = self
            .api
            .upload_manifest(self.container.id.as_str(), file_name, content)
            .await?;
        self.container = container;
        self.view
            .set_aggregation(aggregation_for(&self.container))
            .await;
        Ok(())
    }

    async fn manifest_rows(&self) -> Vec<ManifestRow> {
        self.view
            .current()
            .await
            .manifest_rows()
            .map(|rows| rows.to_vec())
            .unwrap_or_default()
    }

    async fn submit(
        &mut self,
        sku: &str,
        raw_code: &str,
        qty: i64,
        pallet_no: &str,
    ) -> Result<ScanEvent, SessionError> {
        let payload = SubmitScan {
            container_no: self.container.container_no.clone(),
            sku: sku.to_string(),
            raw_code: raw_code.to_string(),
            qty,
            pallet_no: pallet_no.to_string(),
            box_no: String::new(),
            operator: self.operator.clone(),
        };
        let event = self.api.submit_scan(&payload).await?;
        self.view.append_local(event.clone()).await;
        Ok(event)
    }
}
