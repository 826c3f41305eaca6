// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// urkunde-document — Rendering for the Urkunde document engine.
//
// Per-type layout templates, PDF composition (printpdf), PDF inspection
// (lopdf), and QR encoding of verification URLs.

pub mod layout;
pub mod pdf;
pub mod qr;
pub mod renderer;

pub use layout::{DocumentLayout, DocumentTemplate, LayoutRegistry, PageGeometry, RenderContext};
pub use pdf::{PdfComposer, PdfInspector};
pub use qr::QrEncoder;
pub use renderer::DocumentRenderer;
