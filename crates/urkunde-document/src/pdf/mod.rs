// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — composing layouts into PDFs and inspecting the result.

pub mod composer;
pub mod inspector;

pub use composer::PdfComposer;
pub use inspector::PdfInspector;
