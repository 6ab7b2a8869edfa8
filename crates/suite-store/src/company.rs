//! # Company Profile
//!
//! The singleton [`CompanyDetails`] plus its uploaded custom templates,
//! persisted as JSON under the `companyDetails` key.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load ── key missing ──────────► defaults                               │
//! │       ── unparseable / I/O ────► warn! + defaults                       │
//! │       ── ok ───────────────────► stored profile                         │
//! │                                                                         │
//! │  set / update / save_template / remove_template ──► set_item, then swap │
//! │  reset ──► defaults + remove_item                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Templates are validated when they are saved or imported. A template that
//! fails validation never reaches storage. A failed write leaves the profile
//! in memory unchanged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use suite_core::types::{CompanyDetails, CustomTemplate};
use suite_core::validation::validate_custom_template;
use suite_core::CoreError;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::storage::KeyValueStore;

/// Storage key of the persisted profile.
pub const COMPANY_DETAILS_KEY: &str = "companyDetails";

/// Partial profile edit. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub logo_url: Option<String>,
    pub tagline: Option<String>,
}

impl CompanyUpdate {
    fn apply(self, details: &mut CompanyDetails) {
        if let Some(name) = self.name {
            details.name = name;
        }
        if let Some(address) = self.address {
            details.address = address;
        }
        if let Some(contact) = self.contact {
            details.contact = contact;
        }
        if let Some(logo_url) = self.logo_url {
            details.logo_url = logo_url;
        }
        if let Some(tagline) = self.tagline {
            details.tagline = tagline;
        }
    }
}

/// Company profile backed by a [`KeyValueStore`].
pub struct CompanyProfile {
    store: Arc<dyn KeyValueStore>,
    details: CompanyDetails,
}

impl std::fmt::Debug for CompanyProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompanyProfile")
            .field("details", &self.details)
            .finish_non_exhaustive()
    }
}

impl CompanyProfile {
    /// Reads the stored profile, falling back to defaults.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let details = match store.get_item(COMPANY_DETAILS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<CompanyDetails>(&json) {
                Ok(details) => {
                    debug!(
                        name = %details.name,
                        templates = details.custom_templates.len(),
                        "Company profile loaded"
                    );
                    details
                }
                Err(e) => {
                    warn!(error = %e, "Stored company profile is unreadable, using defaults");
                    CompanyDetails::default()
                }
            },
            Ok(None) => CompanyDetails::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read company profile, using defaults");
                CompanyDetails::default()
            }
        };

        CompanyProfile { store, details }
    }

    pub fn details(&self) -> &CompanyDetails {
        &self.details
    }

    /// Replaces the whole profile. Every template in it must be valid.
    pub fn set(&mut self, details: CompanyDetails) -> StoreResult<()> {
        for template in &details.custom_templates {
            check_template(template)?;
        }
        self.commit(details)
    }

    /// Merges a partial edit into the profile.
    pub fn update(&mut self, update: CompanyUpdate) -> StoreResult<()> {
        let mut details = self.details.clone();
        update.apply(&mut details);
        self.commit(details)
    }

    /// Restores the defaults and clears the stored copy.
    pub fn reset(&mut self) -> StoreResult<()> {
        self.store.remove_item(COMPANY_DETAILS_KEY)?;
        self.details = CompanyDetails::default();
        info!("Company profile reset to defaults");
        Ok(())
    }

    pub fn find_template(&self, id: &str) -> Option<&CustomTemplate> {
        self.details.custom_template(id)
    }

    /// Validates and saves a custom template. An existing id is replaced.
    ///
    /// ## Errors
    /// `CoreError::InvalidTemplate` carrying every validation message.
    pub fn save_template(&mut self, template: CustomTemplate) -> StoreResult<()> {
        check_template(&template)?;

        let (id, name) = (template.id.clone(), template.name.clone());
        let mut details = self.details.clone();
        match details.custom_templates.iter_mut().find(|t| t.id == id) {
            Some(existing) => *existing = template,
            None => details.custom_templates.push(template),
        }

        self.commit(details)?;
        info!(template = %id, name = %name, "Custom template saved");
        Ok(())
    }

    /// Deletes a custom template and returns it.
    pub fn remove_template(&mut self, id: &str) -> StoreResult<CustomTemplate> {
        let mut details = self.details.clone();
        let index = details
            .custom_templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "CustomTemplate",
                id: id.to_string(),
            })?;

        let removed = details.custom_templates.remove(index);
        self.commit(details)?;
        info!(template = %removed.id, "Custom template removed");
        Ok(removed)
    }

    /// Writes `details` and only then makes them current.
    fn commit(&mut self, details: CompanyDetails) -> StoreResult<()> {
        let json = serde_json::to_string(&details)?;
        self.store.set_item(COMPANY_DETAILS_KEY, &json)?;
        self.details = details;
        Ok(())
    }
}

fn check_template(template: &CustomTemplate) -> StoreResult<()> {
    let errors = validate_custom_template(template);
    if errors.is_empty() {
        return Ok(());
    }
    warn!(template = %template.id, ?errors, "Custom template rejected");
    Err(CoreError::InvalidTemplate { errors }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use chrono::{TimeZone, Utc};
    use suite_core::templates::default_placeholders;
    use suite_core::types::Dimensions;

    fn template(id: &str) -> CustomTemplate {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap();
        CustomTemplate {
            id: id.to_string(),
            name: "Letterhead".to_string(),
            description: Some("Blue letterhead".to_string()),
            template_file: "data:image/png;base64,iVBORw0KGgo=".to_string(),
            placeholders: default_placeholders(),
            dimensions: Dimensions::A4,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_defaults_when_nothing_stored() {
        let profile = CompanyProfile::load(Arc::new(MemoryStore::new()));
        assert_eq!(profile.details(), &CompanyDetails::default());
    }

    #[test]
    fn test_unparseable_profile_falls_back() {
        let store = MemoryStore::new();
        store.set_item(COMPANY_DETAILS_KEY, "{not json").unwrap();
        let profile = CompanyProfile::load(Arc::new(store));
        assert_eq!(profile.details().name, "Streamline Suite");
    }

    #[test]
    fn test_profile_survives_file_store_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());

        let mut profile = CompanyProfile::load(store.clone());
        profile
            .update(CompanyUpdate {
                name: Some("Acme Ltd".to_string()),
                tagline: Some("Built to last".to_string()),
                ..CompanyUpdate::default()
            })
            .unwrap();
        profile.save_template(template("custom_1")).unwrap();

        let reloaded = CompanyProfile::load(store);
        assert_eq!(reloaded.details().name, "Acme Ltd");
        assert_eq!(reloaded.details().address, CompanyDetails::default().address);
        assert_eq!(reloaded.find_template("custom_1"), Some(&template("custom_1")));

        let saved = reloaded.find_template("custom_1").unwrap();
        assert_eq!(saved.placeholders, default_placeholders());
        assert_eq!(saved.dimensions, Dimensions::A4);
    }

    /// Accepts reads, fails every write.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get_item(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        fn set_item(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        fn remove_item(&self, _key: &str) -> StoreResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[test]
    fn test_failed_write_leaves_profile_unchanged() {
        let mut profile = CompanyProfile::load(Arc::new(ReadOnlyStore));
        let before = profile.details().clone();

        let renamed = profile.update(CompanyUpdate {
            name: Some("Acme".to_string()),
            ..CompanyUpdate::default()
        });
        assert!(matches!(renamed, Err(StoreError::Io(_))));
        assert!(profile.save_template(template("custom_1")).is_err());
        assert!(profile.set(CompanyDetails::default()).is_err());
        assert!(profile.reset().is_err());

        assert_eq!(profile.details(), &before);
        assert!(profile.find_template("custom_1").is_none());
    }

    #[test]
    fn test_set_rejects_invalid_template() {
        let store = MemoryStore::new();
        let mut profile = CompanyProfile::load(Arc::new(store.clone()));

        let mut tiny = template("custom_3");
        tiny.dimensions = Dimensions {
            width: 842.0,
            height: 100.0,
        };
        let details = CompanyDetails {
            custom_templates: vec![tiny],
            ..CompanyDetails::default()
        };

        let err = profile.set(details).unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::InvalidTemplate { .. })));
        assert!(profile.details().custom_templates.is_empty());
        assert_eq!(store.get_item(COMPANY_DETAILS_KEY).unwrap(), None);
    }

    #[test]
    fn test_invalid_template_is_not_saved() {
        let store = MemoryStore::new();
        let mut profile = CompanyProfile::load(Arc::new(store.clone()));

        let mut bad = template("custom_2");
        bad.name = "  ".to_string();
        bad.placeholders.retain(|p| p.id != "total");

        let err = profile.save_template(bad).unwrap_err();
        match err {
            StoreError::Core(CoreError::InvalidTemplate { errors }) => {
                assert!(errors.iter().any(|e| e.contains("name")));
                assert!(errors.iter().any(|e| e.contains("total")));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(profile.details().custom_templates.is_empty());
        assert_eq!(store.get_item(COMPANY_DETAILS_KEY).unwrap(), None);
    }

    #[test]
    fn test_save_replaces_same_id_and_remove() {
        let mut profile = CompanyProfile::load(Arc::new(MemoryStore::new()));
        profile.save_template(template("custom_1")).unwrap();

        let mut renamed = template("custom_1");
        renamed.name = "Green letterhead".to_string();
        profile.save_template(renamed).unwrap();
        assert_eq!(profile.details().custom_templates.len(), 1);
        assert_eq!(profile.find_template("custom_1").unwrap().name, "Green letterhead");

        let removed = profile.remove_template("custom_1").unwrap();
        assert_eq!(removed.id, "custom_1");
        assert!(matches!(
            profile.remove_template("custom_1"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_reset_removes_key() {
        let store = MemoryStore::new();
        let mut profile = CompanyProfile::load(Arc::new(store.clone()));
        profile
            .update(CompanyUpdate {
                name: Some("Acme".to_string()),
                ..CompanyUpdate::default()
            })
            .unwrap();
        assert!(store.get_item(COMPANY_DETAILS_KEY).unwrap().is_some());

        profile.reset().unwrap();
        assert_eq!(profile.details().name, "Streamline Suite");
        assert_eq!(store.get_item(COMPANY_DETAILS_KEY).unwrap(), None);
    }
}
