//! Request body model binding and validation.
//!
//! Given the declared type of a handler parameter, a binder reads the request
//! body at most once through an [`InputFormatter`](formatter::InputFormatter)
//! chosen by content type, validates the produced model, and reports every
//! problem in a [`ModelStateDictionary`] keyed by property path.
//!
//! ```no_run
//! use micro_mvc::binder::ModelBinder;
//! use micro_mvc::validation::{Validate, ValidationErrors, rules};
//! use micro_mvc::{BinderMetadata, BindingOptions, ModelMetadata, ModelType, OperationBindingContext};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Person {
//!     name: String,
//! }
//!
//! impl Validate for Person {
//!     fn validate(&self, errors: &mut ValidationErrors) {
//!         rules::required(errors, "name", &self.name);
//!     }
//! }
//!
//! # async fn handle(request: http::Request<http_body_util::Full<bytes::Bytes>>) -> Result<(), micro_mvc::BindError> {
//! let options = BindingOptions::default();
//! let binder = options.composite_binder();
//!
//! let operation = OperationBindingContext::from_request(request);
//! let metadata = ModelMetadata::new(ModelType::of::<Person>()).with_binder_metadata(BinderMetadata::FromBody);
//! let mut ctx = options.binding_context(metadata, "person", operation);
//!
//! binder.bind_model(&mut ctx).await?;
//! if ctx.model_state().is_valid() {
//!     let person = ctx.model_as::<Person>();
//!     # let _ = person;
//! }
//! # Ok(())
//! # }
//! ```

mod body;
mod context;
mod error;
mod metadata;
mod model;
mod model_state;
mod options;
mod request;

pub mod binder;
pub mod formatter;
pub mod validation;

pub use body::OptionReqBody;
pub use body::ReqBody;
pub use context::ModelBindingContext;
pub use context::OperationBindingContext;
pub use error::BindError;
pub use error::BoxError;
pub use metadata::BinderMetadata;
pub use metadata::ModelMetadata;
pub use model::Model;
pub use model::ModelType;
pub use model_state::DEFAULT_MAX_MODEL_ERRORS;
pub use model_state::ModelError;
pub use model_state::ModelState;
pub use model_state::ModelStateDictionary;
pub use options::BindingOptions;
pub use options::BindingOptionsBuilder;
pub use request::RequestContext;

pub use binder::BindingOutcome;
pub use binder::ModelBinder;
pub use binder::ReadFailurePolicy;
