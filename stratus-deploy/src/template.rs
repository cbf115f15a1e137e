//! Service templates: the reusable code payload plus the configuration
//! keys a deployment of it requires.

use std::path::PathBuf;

use stratus_config::keys;

use crate::types::ServiceKind;

/// A deployable service template.
#[derive(Debug, Clone)]
pub struct ServiceTemplate {
    /// Human-facing template name.
    pub name: String,
    /// Stable template identifier.
    pub id: String,
    /// Short description.
    pub description: String,
    /// Path to the bundled handler payload.
    pub file_location: PathBuf,
    /// Environment keys that must be present before deploying.
    pub required_keys: Vec<String>,
    /// The deployment variant this template produces.
    pub kind: ServiceKind,
}

/// Source of deployable templates.
pub trait TemplateSource: Send + Sync {
    /// Resolve the template for a service kind.
    fn find(&self, kind: ServiceKind) -> Option<&ServiceTemplate>;

    /// All known templates.
    fn list(&self) -> &[ServiceTemplate];
}

/// In-process template registry.
pub struct TemplateRegistry {
    templates: Vec<ServiceTemplate>,
}

impl TemplateRegistry {
    /// Create a registry from explicit templates.
    pub fn new(templates: Vec<ServiceTemplate>) -> Self {
        Self { templates }
    }

    /// The built-in templates shipped with the repository.
    pub fn builtin() -> Self {
        let aws_keys = vec![
            keys::AMZ_ID.to_string(),
            keys::AMZ_SEC.to_string(),
            keys::AMZ_REGION.to_string(),
        ];

        Self::new(vec![
            ServiceTemplate {
                name: "AWS S3 file upload service".to_string(),
                id: "6d0b2f09-5c27-4b8e-9a4e-52cf04f0a1d4".to_string(),
                description: "Upload files to S3 over HTTP".to_string(),
                file_location: PathBuf::from(
                    "templates/services/serverless/fileUploader/bundle.js",
                ),
                required_keys: aws_keys.clone(),
                kind: ServiceKind::AwsUpload,
            },
            ServiceTemplate {
                name: "Instant database service".to_string(),
                id: "3f6a1f9e-8b1d-4b57-a2c4-9f0d6f2f7b11".to_string(),
                description: "SQLite database backed by a companion bucket".to_string(),
                file_location: PathBuf::from("templates/services/serverless/database/bundle.js"),
                required_keys: aws_keys,
                kind: ServiceKind::InstantDatabase,
            },
        ])
    }
}

impl TemplateSource for TemplateRegistry {
    fn find(&self, kind: ServiceKind) -> Option<&ServiceTemplate> {
        self.templates.iter().find(|t| t.kind == kind)
    }

    fn list(&self) -> &[ServiceTemplate] {
        &self.templates
    }
}
