// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Civil registration layouts: birth, marriage and death certificates.

use urkunde_security::identifiers::LICENCE_NUMBER_KEY;

use super::{Accent, DocumentLayout, DocumentTemplate, PageGeometry, RenderContext, SectionBuilder};

fn civil_layout(ctx: &RenderContext<'_>) -> DocumentLayout {
    DocumentLayout::new(ctx, PageGeometry::A4Portrait, Accent::CIVIL_GREEN).subtitle(Some(
        ctx.text("registrationOffice")
            .map(|office| format!("Civil Registry, {office}"))
            .unwrap_or_else(|| "Civil Registry".to_owned()),
    ))
}

fn signatures(ctx: &RenderContext<'_>) -> SectionBuilder {
    SectionBuilder::new("Signatures")
        .row("Registrar", ctx.text("registrarName"))
        .row("Informant", ctx.text("informantName"))
        .row("Date of issue", Some(ctx.issued_on()))
}

pub struct BirthCertificateTemplate;

impl DocumentTemplate for BirthCertificateTemplate {
    fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout {
        civil_layout(ctx)
            .section(
                SectionBuilder::new("Registration")
                    .row("Registration number", Some(ctx.identifier.to_owned()))
                    .row("Registration date", ctx.text("registrationDate"))
                    .row("Registration district", ctx.text("registrationDistrict")),
            )
            .section(
                SectionBuilder::new("Child Particulars")
                    .row("Full name", ctx.first_text(&["childFullName", "fullName"]))
                    .row("Sex", ctx.text("sex"))
                    .row("Date of birth", ctx.text("dateOfBirth"))
                    .row("Time of birth", ctx.text("timeOfBirth"))
                    .row("Place of birth", ctx.text("placeOfBirth")),
            )
            .section(
                SectionBuilder::new("Parent Particulars")
                    .row("Mother", ctx.text("motherFullName"))
                    .row("Mother's nationality", ctx.text("motherNationality"))
                    .row("Father", ctx.text("fatherFullName"))
                    .row("Father's nationality", ctx.text("fatherNationality")),
            )
            .section(signatures(ctx))
    }
}

pub struct MarriageCertificateTemplate;

impl DocumentTemplate for MarriageCertificateTemplate {
    fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout {
        let partner = |n: u8| {
            SectionBuilder::new(format!("Partner {n}"))
                .row("Full name", ctx.text(&format!("partner{n}FullName")))
                .row("Identity number", ctx.text(&format!("partner{n}IdNumber")))
                .row("Date of birth", ctx.text(&format!("partner{n}DateOfBirth")))
                .row("Nationality", ctx.text(&format!("partner{n}Nationality")))
        };

        civil_layout(ctx)
            .section(
                SectionBuilder::new("Registration")
                    .row("Registration number", Some(ctx.identifier.to_owned()))
                    .row("Marriage licence", ctx.secondary(LICENCE_NUMBER_KEY))
                    .row("Date of marriage", ctx.text("marriageDate"))
                    .row("Place of marriage", ctx.text("marriagePlace")),
            )
            .section(partner(1))
            .section(partner(2))
            .section(
                SectionBuilder::new("Solemnisation")
                    .row("Marriage officer", ctx.text("officerName"))
                    .row("Witnesses", ctx.text("witnesses")),
            )
            .section(signatures(ctx))
    }
}

pub struct DeathCertificateTemplate;

impl DocumentTemplate for DeathCertificateTemplate {
    fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout {
        civil_layout(ctx)
            .section(
                SectionBuilder::new("Registration")
                    .row("Registration number", Some(ctx.identifier.to_owned()))
                    .row("Registration date", ctx.text("registrationDate")),
            )
            .section(
                SectionBuilder::new("Particulars of the Deceased")
                    .row("Full name", ctx.first_text(&["deceasedFullName", "fullName"]))
                    .row("Identity number", ctx.text("idNumber"))
                    .row("Sex", ctx.text("sex"))
                    .row("Date of birth", ctx.text("dateOfBirth"))
                    .row("Age", ctx.text("age"))
                    .row("Date of death", ctx.text("dateOfDeath"))
                    .row("Place of death", ctx.text("placeOfDeath")),
            )
            .section(
                SectionBuilder::new("Cause of Death")
                    .row("Cause", ctx.text("causeOfDeath"))
                    .row("Manner", ctx.text("mannerOfDeath"))
                    .row("Certified by", ctx.text("certifyingPractitioner")),
            )
            .section(
                SectionBuilder::new("Informant")
                    .row("Name", ctx.text("informantName"))
                    .row("Relationship", ctx.text("informantRelationship")),
            )
            .section(signatures(ctx))
    }
}
