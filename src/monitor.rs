use std::path::PathBuf;

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::warn;

use crate::hierarchy::Controller;
use crate::parser::{self, ParseError, SMART_ARRAY_TYPE_KEY};
use crate::ssacli::{CommandError, Invoke, Ssacli};
use crate::status::Status;
use crate::thresholds::ThresholdStore;

const UPDATED_AT_FORMAT: &str = "Updated At: %H:%M:%S %d-%m-%Y";

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub struct Monitor {
    invoker: Box<dyn Invoke>,
    thresholds_path: Option<PathBuf>,
    controllers: Vec<Controller>,
    base_status: Status,
    refreshed_at: DateTime<Local>,
}

impl Monitor {
    pub fn new(
        ssacli_path: impl Into<PathBuf>,
        thresholds_path: Option<PathBuf>,
    ) -> Result<Self, RefreshError> {
        Self::with_invoker(Box::new(Ssacli::new(ssacli_path.into())), thresholds_path)
    }

    pub fn with_invoker(
        invoker: Box<dyn Invoke>,
        thresholds_path: Option<PathBuf>,
    ) -> Result<Self, RefreshError> {
        let mut monitor = Self {
            invoker,
            thresholds_path,
            controllers: Vec::new(),
            base_status: Status::Ok,
            refreshed_at: Local::now(),
        };
        monitor.refresh()?;
        Ok(monitor)
    }

    /// Rebuilds the whole controller tree from a fresh ssacli run. The
    /// previous tree stays in place until the new one is fully built, so a
    /// failed refresh leaves the last snapshot queryable.
    pub fn refresh(&mut self) -> Result<(), RefreshError> {
        let output = self.invoker.show_config_detail()?;
        let records = parser::parse(&output.stdout)?;

        let mut base_status = Status::Ok;
        if !output.stderr.is_empty() {
            warn!(stderr = %output.stderr, "ssacli wrote to stderr");
            base_status = Status::Warning;
        }

        let store = ThresholdStore::load(self.thresholds_path.as_deref());
        let controllers = records
            .iter()
            .map(|record| {
                let model = record.attrs.get(SMART_ARRAY_TYPE_KEY).unwrap_or_default();
                Controller::from_record(record, store.for_model(model))
            })
            .collect();

        self.controllers = controllers;
        self.base_status = base_status;
        self.refreshed_at = Local::now();
        Ok(())
    }

    pub fn is_ok(&self) -> (Status, String) {
        let mut status = self.base_status;
        let mut description = String::new();
        for controller in &self.controllers {
            let (controller_status, controller_report) = controller.is_ok(0);
            status = status.max(controller_status);
            description.push_str(&controller_report);
            description.push_str("\n\n");
        }
        description.push_str(&self.format_refreshed_at());
        (status, description)
    }

    pub fn simple_description(&self) -> String {
        let mut description = String::new();
        for controller in &self.controllers {
            description.push_str(&controller.simple_description(0));
            description.push_str("\n\n");
        }
        description.push_str(&self.format_refreshed_at());
        description
    }

    fn format_refreshed_at(&self) -> String {
        self.refreshed_at.format(UPDATED_AT_FORMAT).to_string()
    }
}
