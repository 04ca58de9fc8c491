//! Build-time adapter for swatch styles.
//!
//! Walks a project from its entries, evaluates `css.make` / `css.extend`
//! calls without executing any code, replaces each call with its JSON result
//! and emits the atomic stylesheet as a content-hashed asset.
//!
//! ```ignore
//! let options = BuildOptions { root: "app".into(), ..Default::default() };
//! let output = build(&RealFileSystem, &options)?;
//! println!("{}", output.asset.file_name);
//! ```

pub mod asset;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod lexer;
pub mod parser;
pub mod session;
pub mod transform;

pub use asset::{cx_snapshot, inject_stylesheet_link, link_tag, Asset};
pub use error::{CompileError, CompileResult, EvalError, ParseError};
pub use graph::{Resolver, DEFAULT_EXTENSIONS};
pub use session::{build, BuildOptions, BuildOutput, BuildSession, DEFAULT_PACKAGE_NAME};
pub use transform::{transform_module, ModuleSource, VIRTUAL_CX_MODULE};
