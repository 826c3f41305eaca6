// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// General certificate and permit layouts.

use super::{Accent, DocumentLayout, DocumentTemplate, PageGeometry, RenderContext, SectionBuilder};

/// Certificates are portrait unless the payload asks for `orientation: landscape`.
pub struct CertificateTemplate;

impl DocumentTemplate for CertificateTemplate {
    fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout {
        let geometry = match ctx.text("orientation") {
            Some(o) if o.eq_ignore_ascii_case("landscape") => PageGeometry::A4Landscape,
            _ => PageGeometry::A4Portrait,
        };

        DocumentLayout::new(ctx, geometry, Accent::CERTIFICATE_GOLD)
            .subtitle(ctx.text("title"))
            .section(
                SectionBuilder::new("Certificate Details")
                    .row("Certificate number", Some(ctx.identifier.to_owned()))
                    .row("Awarded to", ctx.first_text(&["recipientName", "fullName"]))
                    .row("Description", ctx.text("description"))
                    .row("Achievement", ctx.text("achievement")),
            )
            .section(
                SectionBuilder::new("Issuance")
                    .row("Date of issue", Some(ctx.issued_on()))
                    .row("Valid until", ctx.valid_until())
                    .row("Issuing officer", ctx.text("issuingOfficer")),
            )
    }
}

pub struct PermitTemplate;

impl DocumentTemplate for PermitTemplate {
    fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout {
        DocumentLayout::new(ctx, PageGeometry::A4Portrait, Accent::PERMIT_MAROON)
            .subtitle(ctx.text("title"))
            .section(
                SectionBuilder::new("Permit Details")
                    .row("Permit number", Some(ctx.identifier.to_owned()))
                    .row("Permit type", ctx.text("permitType"))
                    .row("Holder", ctx.first_text(&["fullName", "holderName"]))
                    .row("Identity number", ctx.text("idNumber")),
            )
            .section(
                SectionBuilder::new("Scope and Conditions")
                    .row("Purpose", ctx.text("purpose"))
                    .row("Location", ctx.text("location"))
                    .row("Conditions", ctx.text("conditions")),
            )
            .section(
                SectionBuilder::new("Validity")
                    .row("Date of issue", Some(ctx.issued_on()))
                    .row("Valid until", ctx.valid_until())
                    .row("Issuing officer", ctx.text("issuingOfficer")),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::ContextData;
    use super::*;
    use chrono::{TimeZone, Utc};
    use urkunde_core::types::DocumentType;

    #[test]
    fn certificate_defaults_to_portrait() {
        let data = ContextData::new(DocumentType::Certificate, &[("title", "First Aid Level 2")]);
        let layout = CertificateTemplate.layout(&data.ctx());
        assert_eq!(layout.geometry, PageGeometry::A4Portrait);
        assert_eq!(layout.subtitle.as_deref(), Some("First Aid Level 2"));
    }

    #[test]
    fn certificate_landscape_on_request() {
        let data = ContextData::new(
            DocumentType::Certificate,
            &[("title", "Award"), ("orientation", "Landscape")],
        );
        assert_eq!(
            CertificateTemplate.layout(&data.ctx()).geometry,
            PageGeometry::A4Landscape
        );
    }

    #[test]
    fn missing_expiry_omits_the_row() {
        let data = ContextData::new(DocumentType::Permit, &[("fullName", "Jane Doe")]);
        let layout = PermitTemplate.layout(&data.ctx());
        let validity = layout.find_section("Validity").unwrap();
        assert!(validity.value_of("Valid until").is_none());
        assert!(layout.find_section("Scope and Conditions").is_none());
    }

    #[test]
    fn expiry_is_printed_when_present() {
        let mut data = ContextData::new(DocumentType::Permit, &[("fullName", "Jane Doe")]);
        data.expires_at = Some(Utc.with_ymd_and_hms(2027, 5, 4, 0, 0, 0).unwrap());
        let layout = PermitTemplate.layout(&data.ctx());
        assert_eq!(
            layout.find_section("Validity").unwrap().value_of("Valid until"),
            Some("04 May 2027")
        );
    }
}
