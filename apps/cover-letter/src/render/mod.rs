// Document rendering: placeholder substitution into the LaTeX template, then compilation
// of the rendered source into the final PDF by an external compiler.

pub mod compiler;
pub mod template;

pub use compiler::{ArtifactCompiler, CompileError};
pub use template::{load_template, missing_placeholders, render, RenderError};
