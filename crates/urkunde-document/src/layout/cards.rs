// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Card-format layouts: passport data page and identity card.

use super::{Accent, DocumentLayout, DocumentTemplate, PageGeometry, RenderContext, SectionBuilder};

/// Split a full name into (surname, given names). The last word is the surname.
fn split_name(full_name: &str) -> (Option<String>, Option<String>) {
    let mut parts: Vec<&str> = full_name.split_whitespace().collect();
    let surname = parts.pop().map(str::to_uppercase);
    let given = (!parts.is_empty()).then(|| parts.join(" "));
    (surname, given)
}

pub struct PassportTemplate;

impl DocumentTemplate for PassportTemplate {
    fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout {
        let (surname, given) = ctx
            .text("fullName")
            .map(|name| split_name(&name))
            .unwrap_or((None, None));

        DocumentLayout::new(ctx, PageGeometry::Card, Accent::GOVERNMENT_NAVY)
            .section(
                SectionBuilder::new("Holder")
                    .row("Surname", surname)
                    .row("Given names", given)
                    .row("Nationality", ctx.text("nationality"))
                    .row("Date of birth", ctx.text("dateOfBirth"))
                    .row("Sex", ctx.text("sex"))
                    .row("Place of birth", ctx.text("placeOfBirth")),
            )
            .section(
                SectionBuilder::new("Document")
                    .row("Passport no.", Some(ctx.identifier.to_owned()))
                    .row("Date of issue", Some(ctx.issued_on()))
                    .row("Date of expiry", ctx.valid_until()),
            )
            .mrz(ctx.features.mrz.clone())
    }
}

pub struct IdCardTemplate;

impl DocumentTemplate for IdCardTemplate {
    fn layout(&self, ctx: &RenderContext<'_>) -> DocumentLayout {
        DocumentLayout::new(ctx, PageGeometry::Card, Accent::GOVERNMENT_NAVY)
            .section(
                SectionBuilder::new("Holder")
                    .row("Full name", ctx.text("fullName"))
                    .row("Date of birth", ctx.text("dateOfBirth"))
                    .row("Sex", ctx.text("sex"))
                    .row("Nationality", ctx.text("nationality")),
            )
            .section(
                SectionBuilder::new("Document")
                    .row("ID number", Some(ctx.identifier.to_owned()))
                    .row("Issued", Some(ctx.issued_on()))
                    .row("Expires", ctx.valid_until()),
            )
    }
}
