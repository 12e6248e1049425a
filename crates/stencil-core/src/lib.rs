//! Layout rendering for stencil builds.
//!
//! A [`Build`] holds the in-memory source files and global metadata. The
//! [`Templates`] pass selects eligible files, merges their render context and
//! renders each one through its chain of layouts with a configured
//! [`TemplateEngine`](stencil_engine::TemplateEngine).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use stencil_core::{Build, Templates};
//! use stencil_engine::EngineRegistry;
//! use stencil_storage::MockStorage;
//!
//! let storage = MockStorage::new()
//!     .with_file("src/index.md", "---\ntemplate: page.html\ntitle: Hi\n---\nHello")
//!     .with_file("templates/page.html", "<h1>{{ title }}</h1>{{ contents }}");
//! let mut build = Build::read(Arc::new(storage), "src").unwrap();
//!
//! let registry = EngineRegistry::with_defaults();
//! let templates = Templates::from_value(serde_json::json!("minijinja"), &registry).unwrap();
//! let summary = templates.run(&mut build).unwrap();
//!
//! assert_eq!(summary.rendered, 1);
//! assert_eq!(build.file("index.md").unwrap().contents, b"<h1>Hi</h1>Hello");
//! ```

mod build;
mod error;
mod file;
mod frontmatter;
mod merge;
mod plugin;
mod render;
mod resolve;
mod select;

pub use build::{Build, BuildError};
pub use error::{FileError, TemplateError};
pub use file::{BLOCK_KEY, CONTENTS_KEY, ContentFile, EXTENDS_KEY, Files, TEMPLATE_KEY, is_text};
pub use frontmatter::{FrontMatterError, parse_front_matter, split_front_matter};
pub use merge::{PassContext, merge};
pub use plugin::{PassSummary, Templates};
pub use render::Renderer;
pub use resolve::{Layout, LayoutResolver, TemplateReference};
pub use select::FileSelector;
