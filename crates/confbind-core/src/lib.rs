//! confbind-core: Layered configuration bound onto typed values
//!
//! This crate loads configuration from JSON, YAML and TOML, merges the layers
//! into one tree, and populates application values from it. Polymorphic
//! fields are filled from a registry of named types.
//!
//! # Example
//!
//! ```rust
//! use confbind_core::{bind_struct, capability, Bind, Config, Interface};
//!
//! trait Store: Bind {
//!     fn location(&self) -> String;
//! }
//!
//! capability!(dyn Store);
//!
//! #[derive(Default)]
//! struct Disk {
//!     root: String,
//! }
//!
//! bind_struct!(Disk { root });
//!
//! impl Store for Disk {
//!     fn location(&self) -> String {
//!         format!("disk:{}", self.root)
//!     }
//! }
//!
//! #[derive(Default)]
//! struct App {
//!     port: u16,
//!     store: Interface<dyn Store>,
//! }
//!
//! bind_struct!(App { port, store });
//!
//! let mut config = Config::from_yaml(r#"
//! port: 80
//! store:
//!   type: disk
//!   root: /srv
//! "#).unwrap();
//! config.load_json(r#"{"port": 8080}"#).unwrap();
//! config.register("disk", Disk::default).unwrap().implements::<dyn Store>(|t| t);
//!
//! let mut app = App::default();
//! config.configure(&mut app).unwrap();
//! assert_eq!(app.port, 8080);
//! assert_eq!(app.store.get().unwrap().location(), "disk:/srv");
//! ```

pub mod bind;
pub mod decode;
pub mod error;
pub mod merge;
pub mod registry;
pub mod value;

mod config;

pub use bind::{Bind, Binder, Capability, Interface, Target};
pub use config::{Config, FileSpec};
pub use decode::Format;
pub use error::{Error, ErrorKind, Result, ValueErrorKind};
pub use merge::{merge, merge_all};
pub use registry::{Instance, Registration, TypeRegistry};
pub use value::Value;
