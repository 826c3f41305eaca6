// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document renderer — template lookup plus PDF composition.

use tracing::{info, instrument};
use urkunde_core::config::EngineConfig;
use urkunde_core::error::Result;
use urkunde_core::types::DocumentType;

use crate::layout::{DocumentLayout, LayoutRegistry, RenderContext};
use crate::pdf::PdfComposer;

/// Renders a document type's layout to PDF bytes. Performs no I/O once
/// constructed.
#[derive(Default)]
pub struct DocumentRenderer {
    registry: LayoutRegistry,
    composer: PdfComposer,
}

impl DocumentRenderer {
    pub fn new(registry: LayoutRegistry) -> Self {
        Self {
            registry,
            composer: PdfComposer::new(),
        }
    }

    /// Built-in templates plus any overrides in `config.templates_dir`.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut registry = LayoutRegistry::with_defaults();
        registry.load_overrides(&config.templates_dir)?;
        Ok(Self::new(registry))
    }

    pub fn supports(&self, doc_type: DocumentType) -> bool {
        self.registry.supports(doc_type)
    }

    pub fn registry_mut(&mut self) -> &mut LayoutRegistry {
        &mut self.registry
    }

    /// Layout only, without composing pages.
    pub fn layout(&self, ctx: &RenderContext<'_>) -> Result<DocumentLayout> {
        self.registry.layout(ctx)
    }

    #[instrument(skip_all, fields(document_type = %ctx.document_type, identifier = %ctx.identifier))]
    pub fn render(&self, ctx: &RenderContext<'_>) -> Result<Vec<u8>> {
        let layout = self.registry.layout(ctx)?;
        let bytes = self.composer.compose(&layout)?;
        info!(bytes = bytes.len(), "document rendered");
        Ok(bytes)
    }
}
