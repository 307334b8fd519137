//! Extraction pipeline stages.
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. input    resolve local file or download from URL → bytes
//!  ├─ 2. text     extract page text via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. llm      one Gemini generateContent call with the assembled prompt
//!  └─ 4. parse    strip code fences, parse JSON array → ResultSet
//!
//! preview          independent flow: render one page to a bitmap
//! ```

pub mod input;
pub mod llm;
pub mod parse;
pub mod preview;
pub mod text;
