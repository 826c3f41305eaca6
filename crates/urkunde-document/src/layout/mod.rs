// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout model and the per-type template registry.
//
// A template turns a `RenderContext` into a `DocumentLayout`: a pure,
// page-independent description (geometry, header, ordered label/value
// sections, footer). The PDF composer turns that into pages. Adding a
// document type means registering one more `DocumentTemplate`.

mod cards;
mod certificates;
mod civil;
mod immigration;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use urkunde_core::error::{GenerationError, Result};
use urkunde_core::types::{
    DocumentType, MachineReadableZone, Payload, SecurityFeatures, payload_text,
};

pub use cards::{IdCardTemplate, PassportTemplate};
pub use certificates::{CertificateTemplate, PermitTemplate};
pub use civil::{BirthCertificateTemplate, DeathCertificateTemplate, MarriageCertificateTemplate};
pub use immigration::{PermanentVisaTemplate, WorkPermitTemplate};

/// Authority printed in the header when neither payload nor override names one.
pub const DEFAULT_AUTHORITY: &str = "Department of Home Affairs";

/// Watermark text drawn diagonally across every page.
pub const WATERMARK_TEXT: &str = "OFFICIAL";

// -- Geometry -----------------------------------------------------------------

/// Supported page geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageGeometry {
    A4Portrait,
    A4Landscape,
    /// ID-1 card format, 243 x 153 pt.
    Card,
}

impl PageGeometry {
    /// Page size in PDF points (width, height).
    pub fn size_pt(&self) -> (f32, f32) {
        match self {
            Self::A4Portrait => (595.28, 841.89),
            Self::A4Landscape => (841.89, 595.28),
            Self::Card => (243.0, 153.0),
        }
    }

    pub fn is_card(&self) -> bool {
        matches!(self, Self::Card)
    }
}

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accent(pub u8, pub u8, pub u8);

impl Accent {
    pub const CIVIL_GREEN: Accent = Accent(0, 106, 78);
    pub const GOVERNMENT_NAVY: Accent = Accent(0, 45, 98);
    pub const PERMIT_MAROON: Accent = Accent(122, 28, 46);
    pub const IMMIGRATION_TEAL: Accent = Accent(0, 98, 114);
    pub const CERTIFICATE_GOLD: Accent = Accent(150, 110, 20);
}

// -- Layout model -------------------------------------------------------------

/// One label/value line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: String,
    pub value: String,
}

/// A titled block of rows. Row order is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub rows: Vec<Row>,
}

impl Section {
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

/// Collects rows, silently dropping missing optional values.
#[derive(Debug)]
pub struct SectionBuilder {
    heading: String,
    rows: Vec<Row>,
}

impl SectionBuilder {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            rows: Vec::new(),
        }
    }

    /// Add a row when `value` is present; omit it otherwise.
    pub fn row(mut self, label: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.rows.push(Row {
                label: label.to_owned(),
                value,
            });
        }
        self
    }

    /// `None` when every row was omitted.
    pub fn build(self) -> Option<Section> {
        (!self.rows.is_empty()).then_some(Section {
            heading: self.heading,
            rows: self.rows,
        })
    }
}

/// Everything the composer needs to draw one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub geometry: PageGeometry,
    pub accent: Accent,
    pub authority: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub sections: Vec<Section>,
    pub footer: Vec<String>,
    pub watermark: String,
    pub microtext: String,
    pub mrz: Option<MachineReadableZone>,
}

impl DocumentLayout {
    /// Start a layout with the header, footer and security overlay derived
    /// from the context.
    pub fn new(ctx: &RenderContext<'_>, geometry: PageGeometry, accent: Accent) -> Self {
        let authority = ctx
            .text("issuingAuthority")
            .unwrap_or_else(|| DEFAULT_AUTHORITY.to_owned());

        let mut footer = vec![
            format!("Verification code: {}", ctx.verification_code),
            format!("Verify this document at {}", ctx.verification_url),
        ];
        if !geometry.is_card() {
            footer.push(format!(
                "Document number {} issued {}",
                ctx.identifier,
                ctx.issued_on()
            ));
        }

        Self {
            geometry,
            accent,
            authority,
            title: ctx.document_type.title().to_owned(),
            subtitle: None,
            sections: Vec::new(),
            footer,
            watermark: WATERMARK_TEXT.to_owned(),
            microtext: ctx.features.microtext.clone(),
            mrz: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn subtitle(mut self, subtitle: Option<String>) -> Self {
        self.subtitle = subtitle;
        self
    }

    /// Append a section unless all its rows were omitted.
    pub fn section(mut self, builder: SectionBuilder) -> Self {
        if let Some(section) = builder.build() {
            self.sections.push(section);
        }
        self
    }

    pub fn mrz(mut self, mrz: Option<MachineReadableZone>) -> Self {
        self.mrz = mrz;
        self
    }

    pub fn section_headings(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.heading.as_str()).collect()
    }

    pub fn find_section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

// -- Render context -----------------------------------------------------------

/// Inputs available to a template.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub document_type: DocumentType,
    pub identifier: &'a str,
    pub secondary_identifiers: &'a BTreeMap<String, String>,
    pub verification_code: &'a str,
    pub verification_url: &'a str,
    pub payload: &'a Payload,
    pub features: &'a SecurityFeatures,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl RenderContext<'_> {
    /// Payload field as display text.
    pub fn text(&self, key: &str) -> Option<String> {
        payload_text(self.payload, key)
    }

    /// First populated payload field among `keys`.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    pub fn secondary(&self, key: &str) -> Option<String> {
        self.secondary_identifiers.get(key).cloned()
    }

    pub fn issued_on(&self) -> String {
        format_date(self.issued_at)
    }

    /// Expiry date, or `None` for documents without one.
    pub fn valid_until(&self) -> Option<String> {
        self.expires_at.map(format_date)
    }
}

/// Long-form date printed on documents, e.g. `04 May 2026`.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%d %B %Y").to_string()
}

// -- Templates ----------------------------------------------------------------

/// One document type's layout.
pub trait DocumentTemplate: Send + Sync {
    fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout;
}

/// Branding overrides read from `<templates_dir>/<type>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateOverride {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub authority: Option<String>,
    pub accent: Option<[u8; 3]>,
}

impl TemplateOverride {
    fn apply(&self, mut layout: DocumentLayout) -> DocumentLayout {
        if let Some(title) = &self.title {
            layout.title = title.clone();
        }
        if let Some(subtitle) = &self.subtitle {
            layout.subtitle = Some(subtitle.clone());
        }
        if let Some(authority) = &self.authority {
            layout.authority = authority.clone();
        }
        if let Some([r, g, b]) = self.accent {
            layout.accent = Accent(r, g, b);
        }
        layout
    }
}

/// Maps each document type to its template.
pub struct LayoutRegistry {
    templates: HashMap<DocumentType, Box<dyn DocumentTemplate>>,
    overrides: HashMap<DocumentType, TemplateOverride>,
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LayoutRegistry {
    /// A registry with no templates; every type is unsupported.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
            overrides: HashMap::new(),
        }
    }

    /// A registry with the built-in template for every document type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(DocumentType::Certificate, CertificateTemplate);
        registry.register(DocumentType::Permit, PermitTemplate);
        registry.register(DocumentType::BirthCertificate, BirthCertificateTemplate);
        registry.register(DocumentType::MarriageCertificate, MarriageCertificateTemplate);
        registry.register(DocumentType::DeathCertificate, DeathCertificateTemplate);
        registry.register(DocumentType::Passport, PassportTemplate);
        registry.register(DocumentType::WorkPermit, WorkPermitTemplate);
        registry.register(DocumentType::PermanentVisa, PermanentVisaTemplate);
        registry.register(DocumentType::IdCard, IdCardTemplate);
        registry
    }

    /// Register (or replace) the template for `doc_type`.
    pub fn register(&mut self, doc_type: DocumentType, template: impl DocumentTemplate + 'static) {
        self.templates.insert(doc_type, Box::new(template));
    }

    /// Remove the template for `doc_type`, making it unsupported.
    pub fn unregister(&mut self, doc_type: DocumentType) {
        self.templates.remove(&doc_type);
    }

    pub fn supports(&self, doc_type: DocumentType) -> bool {
        self.templates.contains_key(&doc_type)
    }

    /// Read `<dir>/<type>.json` override files. A missing directory or file
    /// is not an error; a malformed file is.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn load_overrides(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            debug!("no template override directory");
            return Ok(0);
        }

        let mut loaded = 0;
        for doc_type in DocumentType::ALL {
            let path = dir.join(format!("{}.json", doc_type.tag()));
            if !path.is_file() {
                continue;
            }
            let data = std::fs::read_to_string(&path)?;
            let parsed: TemplateOverride = serde_json::from_str(&data).map_err(|e| {
                GenerationError::Config(format!("template override {}: {e}", path.display()))
            })?;
            self.overrides.insert(doc_type, parsed);
            loaded += 1;
        }

        info!(loaded, "template overrides loaded");
        Ok(loaded)
    }

    /// Produce the layout for the context's document type.
    pub fn layout(&self, ctx: &RenderContext<'_>) -> Result<DocumentLayout> {
        let template = self.templates.get(&ctx.document_type).ok_or_else(|| {
            GenerationError::UnsupportedDocumentType(ctx.document_type.tag().to_owned())
        })?;

        let layout = template.layout(ctx);
        Ok(match self.overrides.get(&ctx.document_type) {
            Some(overrides) => overrides.apply(layout),
            None => layout,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Owned backing data for a `RenderContext` in tests.
    pub struct ContextData {
        pub document_type: DocumentType,
        pub payload: Payload,
        pub features: SecurityFeatures,
        pub secondary: BTreeMap<String, String>,
        pub expires_at: Option<DateTime<Utc>>,
    }

    impl ContextData {
        pub fn new(document_type: DocumentType, fields: &[(&str, &str)]) -> Self {
            let payload = fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), serde_json::Value::from(*v)))
                .collect();
            Self {
                document_type,
                payload,
                features: SecurityFeatures {
                    watermark_type: "government-crest".into(),
                    security_thread: "0011223344556677".into(),
                    microtext: format!("OFFICIAL-{}", document_type.tag().to_uppercase()),
                    holographic_elements: vec!["coat-of-arms".into()],
                    background_pattern: "fine-line-guilloche".into(),
                    color_changing_ink: true,
                    uv_reactive_ink: true,
                    generated_at: Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap(),
                    rfid_chip_data: None,
                    fingerprint_data: None,
                    mrz: None,
                },
                secondary: BTreeMap::new(),
                expires_at: None,
            }
        }

        pub fn ctx(&self) -> RenderContext<'_> {
            RenderContext {
                document_type: self.document_type,
                identifier: "REG-2026-0A1B2C3D",
                secondary_identifiers: &self.secondary,
                verification_code: "00112233445566778899AABBCCDDEEFF",
                verification_url: "https://docs.example.gov/verify/00112233445566778899AABBCCDDEEFF",
                payload: &self.payload,
                features: &self.features,
                issued_at: Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap(),
                expires_at: self.expires_at,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::ContextData;
    use super::*;

    struct Bare;

    impl DocumentTemplate for Bare {
        fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout {
            DocumentLayout::new(ctx, PageGeometry::A4Portrait, Accent::GOVERNMENT_NAVY)
        }
    }

    #[test]
    fn defaults_cover_every_type() {
        let registry = LayoutRegistry::with_defaults();
        for doc_type in DocumentType::ALL {
            assert!(registry.supports(doc_type), "{doc_type} has no template");
        }
    }

    #[test]
    fn unregistered_type_is_unsupported() {
        let mut registry = LayoutRegistry::with_defaults();
        registry.unregister(DocumentType::Permit);
        let data = ContextData::new(DocumentType::Permit, &[]);
        match registry.layout(&data.ctx()) {
            Err(GenerationError::UnsupportedDocumentType(tag)) => assert_eq!(tag, "permit"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn registering_replaces_a_template() {
        let mut registry = LayoutRegistry::empty();
        registry.register(DocumentType::Certificate, Bare);
        let data = ContextData::new(DocumentType::Certificate, &[("title", "Ignored")]);
        let layout = registry.layout(&data.ctx()).unwrap();
        assert!(layout.sections.is_empty());
        assert_eq!(layout.title, "Certificate");
    }

    #[test]
    fn section_builder_omits_missing_values() {
        let section = SectionBuilder::new("Holder")
            .row("Name", Some("Jane".into()))
            .row("Expiry", None)
            .build()
            .unwrap();
        assert_eq!(section.rows.len(), 1);
        assert!(SectionBuilder::new("Empty").row("x", None).build().is_none());
    }

    #[test]
    fn footer_carries_verification_hint() {
        let data = ContextData::new(DocumentType::BirthCertificate, &[]);
        let layout = DocumentLayout::new(&data.ctx(), PageGeometry::A4Portrait, Accent::CIVIL_GREEN);
        assert!(layout.footer[0].ends_with("00112233445566778899AABBCCDDEEFF"));
        assert!(layout.footer[1].starts_with("Verify this document at https://"));
        assert_eq!(layout.watermark, "OFFICIAL");
        assert_eq!(layout.authority, DEFAULT_AUTHORITY);
    }

    #[test]
    fn overrides_are_applied_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("birth_certificate.json"),
            r#"{"title":"Unabridged Birth Certificate","accent":[10,20,30]}"#,
        )
        .unwrap();

        let mut registry = LayoutRegistry::with_defaults();
        assert_eq!(registry.load_overrides(dir.path()).unwrap(), 1);

        let data = ContextData::new(DocumentType::BirthCertificate, &[("childFullName", "Jane Doe")]);
        let layout = registry.layout(&data.ctx()).unwrap();
        assert_eq!(layout.title, "Unabridged Birth Certificate");
        assert_eq!(layout.accent, Accent(10, 20, 30));
    }

    #[test]
    fn malformed_override_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("passport.json"), "{not json").unwrap();
        let mut registry = LayoutRegistry::with_defaults();
        assert!(matches!(
            registry.load_overrides(dir.path()),
            Err(GenerationError::Config(_))
        ));
    }

    #[test]
    fn missing_override_dir_is_fine() {
        let mut registry = LayoutRegistry::with_defaults();
        assert_eq!(registry.load_overrides("/nonexistent/urkunde/templates").unwrap(), 0);
    }
}
