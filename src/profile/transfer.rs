//! Export and import of profile documents

use super::repository::{ProfileError, ProfileRepository};
use super::types::{generate_id, now_millis, HeaderRule, Profile};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

/// Version written into every export document
pub const EXPORT_VERSION: &str = "1.0";

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("No profiles to export. Create some profiles first.")]
    NothingToExport,
    #[error("Please select at least one profile")]
    EmptySelection,
    #[error("Unknown profile id: {0}")]
    UnknownProfile(String),
    #[error("Invalid file format: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid file format. Expected a profiles array.")]
    MissingProfiles,
    #[error("Invalid profile data at index {index}. Each profile must have name, urlPattern, and headers.")]
    InvalidProfile { index: usize },
    #[error("No profiles found in import file.")]
    NoProfiles,
    #[error("Import selection index {0} is out of range")]
    IndexOutOfRange(usize),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    /// ISO-8601 timestamp of the export
    pub export_date: String,
    pub profiles: Vec<Profile>,
}

impl ExportDocument {
    pub fn new(profiles: Vec<Profile>, at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            profiles,
        }
    }

    pub fn to_json(&self) -> Result<String, TransferError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A profile entry read from an import document, before it gets an identity
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedProfile {
    pub name: String,
    pub url_pattern: String,
    pub headers: Vec<HeaderRule>,
}

impl ImportedProfile {
    /// Fresh id and creation time, always disabled
    pub fn into_profile(self) -> Profile {
        Profile {
            id: generate_id(),
            name: self.name,
            url_pattern: self.url_pattern,
            headers: self.headers,
            enabled: false,
            created_at: now_millis(),
        }
    }
}

/// Build an export of the selected profiles, kept in stored order
pub fn export_profiles(
    profiles: &[Profile],
    selected_ids: &[String],
) -> Result<ExportDocument, TransferError> {
    if profiles.is_empty() {
        return Err(TransferError::NothingToExport);
    }
    if selected_ids.is_empty() {
        return Err(TransferError::EmptySelection);
    }
    if let Some(unknown) = selected_ids
        .iter()
        .find(|id| !profiles.iter().any(|p| &p.id == *id))
    {
        return Err(TransferError::UnknownProfile(unknown.clone()));
    }

    let selected: Vec<Profile> = profiles
        .iter()
        .filter(|p| selected_ids.contains(&p.id))
        .cloned()
        .collect();
    Ok(ExportDocument::new(selected, Utc::now()))
}

/// Parse and check an import document without touching storage
pub fn parse_import(json: &str) -> Result<Vec<ImportedProfile>, TransferError> {
    let document: Value = serde_json::from_str(json)?;
    let entries = document
        .get("profiles")
        .and_then(Value::as_array)
        .ok_or(TransferError::MissingProfiles)?;

    let mut imported = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let non_empty = |field: &str| {
            entry
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty())
        };
        let has_headers = entry.get("headers").is_some_and(|h| !h.is_null());
        if !non_empty("name") || !non_empty("urlPattern") || !has_headers {
            return Err(TransferError::InvalidProfile { index });
        }

        let profile: ImportedProfile = serde_json::from_value(entry.clone())
            .map_err(|_| TransferError::InvalidProfile { index })?;
        imported.push(profile);
    }

    if imported.is_empty() {
        return Err(TransferError::NoProfiles);
    }
    Ok(imported)
}

impl ProfileRepository {
    /// Export the selected stored profiles
    pub async fn export(&self, selected_ids: &[String]) -> Result<ExportDocument, TransferError> {
        let profiles = self.load().await?;
        let document = export_profiles(&profiles, selected_ids)?;
        info!("{} profile(s) exported", document.profiles.len());
        Ok(document)
    }

    /// Append the selected entries of a parsed import as new disabled profiles
    pub async fn import(
        &self,
        imported: &[ImportedProfile],
        selected: &[usize],
    ) -> Result<Vec<Profile>, TransferError> {
        if selected.is_empty() {
            return Err(TransferError::EmptySelection);
        }
        if let Some(&index) = selected.iter().find(|&&i| i >= imported.len()) {
            return Err(TransferError::IndexOutOfRange(index));
        }

        let new_profiles: Vec<Profile> = imported
            .iter()
            .enumerate()
            .filter(|(i, _)| selected.contains(i))
            .map(|(_, entry)| entry.clone().into_profile())
            .collect();

        self.append(new_profiles.clone()).await?;
        info!("Successfully imported {} profile(s)", new_profiles.len());
        Ok(new_profiles)
    }
}
