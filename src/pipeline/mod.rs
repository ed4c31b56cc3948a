//! Pipeline stages for document-to-content conversion.
//!
//! Each submodule implements exactly one step and is tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ normalize ──▶ mode::route ──▶ llm ──▶ document
//! (text/upload) (pdf/docx)  (trim, 4000)              (remote)  (.docx)
//!                                                        ▲
//!                                      speech (slide heuristic)
//! ```
//!
//! 1. [`input`]    : pick pasted text or the upload; detect PDF vs Word
//! 2. [`extract`]  : spool the upload to a temp file and extract its text
//!    on the blocking pool
//! 3. [`normalize`]: trim, reject empty content, bound the prompt length
//! 4. [`speech`]   : decide whether narration needs a slide rewrite first
//! 5. [`llm`]      : timeout and retry around every remote call; the only
//!    stage with network I/O
//! 6. [`document`] : wrap the primary text in a `.docx`

pub mod document;
pub mod extract;
pub mod input;
pub mod llm;
pub mod normalize;
pub mod speech;
