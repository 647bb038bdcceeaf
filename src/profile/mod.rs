//! User-defined header profiles: model, validation, persistence and transfer

pub mod repository;
pub mod transfer;
pub mod types;
pub mod validation;

pub use repository::{ProfileError, ProfileRepository, PROFILES_KEY};
pub use transfer::{export_profiles, parse_import, ExportDocument, ImportedProfile, TransferError};
pub use types::{HeaderAction, HeaderRule, Profile};
pub use validation::{ProfileDraft, ValidationError};
