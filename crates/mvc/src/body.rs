use crate::error::{BindError, BoxError};
use bytes::Bytes;
use http_body::Body as HttpBody;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Collected, Empty, Full, LengthLimitError, Limited};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The request body type formatters read from.
pub type ReqBody = BoxBody<Bytes, BoxError>;

/// A request body which can be consumed at most once.
///
/// Clones share the same underlying body, the first consumer takes it and
/// every later attempt fails with [`BindError::BodyConsumed`].
#[derive(Clone)]
pub struct OptionReqBody {
    inner: Arc<Mutex<Option<ReqBody>>>,
}

impl fmt::Debug for OptionReqBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionReqBody").finish_non_exhaustive()
    }
}

impl From<ReqBody> for OptionReqBody {
    fn from(body: ReqBody) -> Self {
        OptionReqBody { inner: Arc::new(Mutex::new(Some(body))) }
    }
}

impl From<Bytes> for OptionReqBody {
    fn from(bytes: Bytes) -> Self {
        Self::new(Full::new(bytes))
    }
}

impl From<String> for OptionReqBody {
    fn from(value: String) -> Self {
        Self::from(Bytes::from(value))
    }
}

impl From<&'static str> for OptionReqBody {
    fn from(value: &'static str) -> Self {
        Self::from(Bytes::from_static(value.as_bytes()))
    }
}

impl OptionReqBody {
    pub fn new<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        Self::from(body.map_err(Into::into).boxed())
    }

    pub fn empty() -> Self {
        Self::new(Empty::<Bytes>::new())
    }

    pub async fn can_consume(&self) -> bool {
        let guard = self.inner.lock().await;
        guard.is_some()
    }

    pub async fn apply<T, F, Fut>(&self, f: F) -> Result<T, BindError>
    where
        F: FnOnce(ReqBody) -> Fut,
        Fut: Future<Output = Result<T, BindError>>,
    {
        let mut guard = self.inner.lock().await;
        let Some(req_body) = guard.take() else {
            return Err(BindError::BodyConsumed);
        };

        f(req_body).await
    }

    /// Collects the whole body, failing with [`BindError::PayloadTooLarge`]
    /// once more than `limit` bytes have been received.
    pub async fn collect_limited(&self, limit: usize) -> Result<Bytes, BindError> {
        self.apply(|body| async move {
            let collected: Pin<Box<dyn Future<Output = Result<Collected<Bytes>, BoxError>> + Send>> =
                Box::pin(Limited::new(body, limit).collect());
            match collected.await {
                Ok(collected) => Ok(collected.to_bytes()),
                Err(e) if e.is::<LengthLimitError>() => Err(BindError::payload_too_large(limit)),
                Err(e) => match e.downcast::<std::io::Error>() {
                    Ok(io_error) => Err(BindError::io(*io_error)),
                    Err(e) => Err(BindError::invalid_body(e)),
                },
            }
        })
        .await
    }
}
