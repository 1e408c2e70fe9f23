//! # rotaplan-render
//!
//! Rendering backends for solved rotations.
//!
//! This crate provides:
//! - Excel workbook export (the rotation sheet, the unfilled subset, and an
//!   optional findings sheet)
//! - Text rendering for terminal summaries
//!
//! ## Example
//!
//! ```rust,ignore
//! use rotaplan_render::RotationWorkbook;
//!
//! let workbook = RotationWorkbook::new().with_findings(findings);
//! let bytes = workbook.render_to_bytes(&sessions, &assignments)?;
//! std::fs::write("rotas_geradas.xlsx", bytes)?;
//! ```

pub mod excel;
pub mod text;

pub use excel::RotationWorkbook;
pub use text::TextSummary;
