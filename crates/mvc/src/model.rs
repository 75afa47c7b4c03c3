//! Type-erased models and the descriptors used to produce them.
//!
//! Binders are object safe and shared across every model type, so they can't
//! be generic over the target type. Instead, the caller describes the target
//! type once with [`ModelType::of`], which captures the decoding and
//! validation entry points of that concrete type, and binders hand back a
//! type-erased [`Model`] the caller downcasts again.

use crate::error::BindError;
use crate::validation::{Validate, ValidationErrors};
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::fmt;

/// A bound value whose concrete type is only known to the caller.
pub struct Model {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Model {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self { value: Box::new(value), type_name: std::any::type_name::<T>() }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        (*self.value).type_id()
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Takes the concrete value out, giving the model back on a type mismatch
    pub fn downcast<T: Any>(self) -> Result<T, Model> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Model { value, type_name }),
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model").field("type_name", &self.type_name).finish_non_exhaustive()
    }
}

/// Describes the type a binder should produce.
///
/// Two descriptors are equal when they describe the same Rust type.
#[derive(Clone, Copy)]
pub struct ModelType {
    id: TypeId,
    name: &'static str,
    decode_json: fn(&[u8]) -> Result<Model, serde_json::Error>,
    decode_form: fn(&[u8]) -> Result<Model, serde_urlencoded::de::Error>,
    decode_query: fn(&str) -> Result<Model, serde_qs::Error>,
    validate: fn(&Model, &mut ValidationErrors),
}

impl ModelType {
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Validate + Send + Sync + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            decode_json: decode_json::<T>,
            decode_form: decode_form::<T>,
            decode_query: decode_query::<T>,
            validate: validate_model::<T>,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Returns true if `model` holds a value of this type
    #[inline]
    pub fn describes(&self, model: &Model) -> bool {
        self.id == model.type_id()
    }

    pub fn from_json(&self, bytes: &[u8]) -> Result<Model, BindError> {
        (self.decode_json)(bytes).map_err(BindError::invalid_body)
    }

    pub fn from_form(&self, bytes: &[u8]) -> Result<Model, BindError> {
        (self.decode_form)(bytes).map_err(BindError::invalid_body)
    }

    pub fn from_query(&self, query: &str) -> Result<Model, BindError> {
        (self.decode_query)(query).map_err(BindError::invalid_query)
    }

    /// Runs the [`Validate`] impl of this type against `model`.
    ///
    /// A model of another type is reported as a single error on the model
    /// itself.
    pub fn validate(&self, model: &Model, errors: &mut ValidationErrors) {
        if self.describes(model) {
            (self.validate)(model, errors);
        } else {
            errors.add("", format!("expect a value of type {} but got {}", self.name, model.type_name()));
        }
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ModelType {}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelType").field(&self.name).finish()
    }
}

fn decode_json<T: DeserializeOwned + Send + Sync + 'static>(bytes: &[u8]) -> Result<Model, serde_json::Error> {
    serde_json::from_slice::<T>(bytes).map(Model::new)
}

fn decode_form<T: DeserializeOwned + Send + Sync + 'static>(
    bytes: &[u8],
) -> Result<Model, serde_urlencoded::de::Error> {
    serde_urlencoded::from_bytes::<T>(bytes).map(Model::new)
}

fn decode_query<T: DeserializeOwned + Send + Sync + 'static>(query: &str) -> Result<Model, serde_qs::Error> {
    serde_qs::from_str::<T>(query).map(Model::new)
}

fn validate_model<T: Validate + 'static>(model: &Model, errors: &mut ValidationErrors) {
    if let Some(value) = model.downcast_ref::<T>() {
        value.validate(errors);
    }
}
