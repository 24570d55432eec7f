//! Pipeline stages for PDF-to-JPEG conversion.
//!
//! Each submodule implements one step, so each can be tested on its own and
//! the rasterisation engine can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! classify ──▶ render (retry ─▶ backend ─▶ encode)
//! (Encrypted / Ready)     (pdfium)     (JPEG)
//! ```
//!
//! 1. [`classify`] — signature check, then ask the backend whether the
//!    document opens, needs a password, or is broken
//! 2. [`render`]   — rasterise all pages and name them; the whole pass is
//!    retried under [`retry::RetryPolicy`]
//! 3. [`backend`]  — the pdfium seam behind a trait
//! 4. [`encode`]   — RGBA bitmap → JPEG bytes

pub mod backend;
pub mod classify;
pub mod encode;
pub mod render;
pub mod retry;
