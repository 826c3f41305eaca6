// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Work permit and permanent residence visa layouts.

use super::{Accent, DocumentLayout, DocumentTemplate, PageGeometry, RenderContext, SectionBuilder};

fn holder(ctx: &RenderContext<'_>) -> SectionBuilder {
    SectionBuilder::new("Holder")
        .row("Full name", ctx.text("fullName"))
        .row("Passport number", ctx.text("passportNumber"))
        .row("Nationality", ctx.text("nationality"))
        .row("Date of birth", ctx.text("dateOfBirth"))
}

pub struct WorkPermitTemplate;

impl DocumentTemplate for WorkPermitTemplate {
    fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout {
        DocumentLayout::new(ctx, PageGeometry::A4Portrait, Accent::IMMIGRATION_TEAL)
            .subtitle(ctx.text("permitCategory"))
            .section(
                SectionBuilder::new("Permit")
                    .row("Permit number", Some(ctx.identifier.to_owned()))
                    .row("Category", ctx.text("permitCategory")),
            )
            .section(holder(ctx))
            .section(
                SectionBuilder::new("Employment")
                    .row("Employer", ctx.text("employer"))
                    .row("Position", ctx.first_text(&["position", "jobTitle"]))
                    .row("Place of work", ctx.text("workLocation")),
            )
            .section(
                SectionBuilder::new("Validity")
                    .row("Valid from", ctx.text("validFrom").or_else(|| Some(ctx.issued_on())))
                    .row("Valid until", ctx.valid_until())
                    .row("Conditions", ctx.text("conditions")),
            )
    }
}

pub struct PermanentVisaTemplate;

impl DocumentTemplate for PermanentVisaTemplate {
    fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout {
        DocumentLayout::new(ctx, PageGeometry::A4Portrait, Accent::IMMIGRATION_TEAL)
            .subtitle(ctx.text("visaCategory"))
            .section(
                SectionBuilder::new("Visa")
                    .row("Visa number", Some(ctx.identifier.to_owned()))
                    .row("Category", ctx.text("visaCategory"))
                    .row("Date of issue", Some(ctx.issued_on()))
                    .row("Valid until", ctx.valid_until()),
            )
            .section(holder(ctx))
            .section(
                SectionBuilder::new("Residence")
                    .row("Residential address", ctx.text("residentialAddress"))
                    .row("Conditions", ctx.text("conditions")),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::ContextData;
    use super::*;
    use urkunde_core::types::DocumentType;

    #[test]
    fn work_permit_sections() {
        let data = ContextData::new(
            DocumentType::WorkPermit,
            &[
                ("fullName", "Thandi Mokoena"),
                ("employer", "Acme Mining"),
                ("permitCategory", "Critical Skills"),
            ],
        );
        let layout = WorkPermitTemplate.layout(&data.ctx());
        assert_eq!(
            layout.section_headings(),
            ["Permit", "Holder", "Employment", "Validity"]
        );
        assert_eq!(layout.subtitle.as_deref(), Some("Critical Skills"));
        assert_eq!(
            layout.find_section("Validity").unwrap().value_of("Valid from"),
            Some("04 May 2026")
        );
    }

    #[test]
    fn visa_without_residence_details() {
        let data = ContextData::new(DocumentType::PermanentVisa, &[("fullName", "Ana Silva")]);
        let layout = PermanentVisaTemplate.layout(&data.ctx());
        assert_eq!(layout.section_headings(), ["Visa", "Holder"]);
        assert_eq!(layout.title, "Permanent Residence Visa");
    }
}
