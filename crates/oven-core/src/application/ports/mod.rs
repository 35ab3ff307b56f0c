//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `oven-adapters` and the CLI
//! implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `TemplateLoader`: Reads a template directory
//!   - `TemplateRenderer`: Template + context → project structure
//!   - `ReplayStore`: Remembers the last context per template
//!   - `Prompter`: Asks a human for values
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{Filesystem, Prompter, ReplayStore, TemplateLoader, TemplateRenderer};
