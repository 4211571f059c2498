//! Template system for reusable report fragments
//!
//! Template files hold definitions; everything outside a definition block is
//! ignored.
//!
//! # Example
//!
//! ```text
//! ##greet
//! ++who
//! Hello, %%who!
//! ##
//! ```
//!
//! A source file then invokes it with `#greet||who=World||`.

mod registry;
mod resolver;

pub use registry::{parse_template_file, TemplateDefinition, TemplateError, TemplateRegistry};
pub use resolver::{bind_arguments, CallChain, TemplateFrame};
