//! Bulk work execution.
//!
//! A [`BulkWork`] sends many works in a single `_bulk` request and then lets
//! every work interpret its own item of the response. Items are matched to
//! works by position: the engine answers in submission order, and the number
//! of items is checked against the number of works before any result is
//! handled.

use std::fmt;

use search_bulk_shared::IndexMutation;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::context::NoIndexDirtyContext;
use crate::errors::{BulkRequestFailedError, ClientError, SearchError, SucceededWork, WorkError};
use crate::interfaces::{BulkableWork, WorkExecutionContext};
use crate::request::{format_request, format_response, parse_json_response, RawResponse, SearchRequest};

/// A bulk request built from an ordered list of works.
///
/// # Example
///
/// ```ignore
/// let bulk = BulkWork::builder(works).refresh(true).build()?;
/// match bulk.execute(&context).await {
///     Ok(()) => {}
///     Err(SearchError::BulkRequestFailed(report)) => {
///         for work in report.failed() {
///             warn!(work = ?work, "Work failed");
///         }
///     }
///     Err(e) => return Err(e.into()),
/// }
/// ```
pub struct BulkWork {
    id: Uuid,
    request: SearchRequest,
    works: Vec<Box<dyn BulkableWork>>,
    /// Whether the engine refreshes every touched index as part of the call.
    ///
    /// If `true`, works must not mark indexes dirty: no further refresh is needed.
    refresh_in_api_call: bool,
}

impl BulkWork {
    /// Start building a bulk request from works in submission order.
    pub fn builder(works: Vec<Box<dyn BulkableWork>>) -> BulkWorkBuilder {
        BulkWorkBuilder::new(works)
    }

    /// Identifier used to correlate log lines of this bulk request.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The assembled request.
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    pub fn works(&self) -> &[Box<dyn BulkableWork>] {
        &self.works
    }

    pub fn len(&self) -> usize {
        self.works.len()
    }

    pub fn is_empty(&self) -> bool {
        self.works.is_empty()
    }

    pub fn refreshes_in_api_call(&self) -> bool {
        self.refresh_in_api_call
    }

    /// The index mutations of every work, in submission order.
    pub fn mutations(&self) -> Vec<IndexMutation> {
        self.works.iter().flat_map(|work| work.mutations()).collect()
    }

    /// Send the request and let every work handle its result.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every work succeeded
    /// * `Err(SearchError::BulkRequestFailed)` - If at least one work failed;
    ///   every other work has still been handled
    /// * `Err(SearchError::BulkResponseItemCountMismatch)` - If the response
    ///   items cannot be matched to the works
    /// * `Err(SearchError::RequestFailed)` - If sending or parsing failed
    /// * `Err(SearchError)` - Any domain error raised by the transport, unchanged
    #[instrument(
        skip(self, context),
        fields(bulk_id = %self.id, work_count = self.works.len(), refresh = self.refresh_in_api_call)
    )]
    pub async fn execute(self, context: &dyn WorkExecutionContext) -> Result<(), SearchError> {
        let Self {
            request,
            works,
            refresh_in_api_call,
            ..
        } = self;

        if works.is_empty() {
            debug!("No works to execute");
            return Ok(());
        }

        // Indexes are refreshed by the bulk call itself.
        let no_index_dirty;
        let context: &dyn WorkExecutionContext = if refresh_in_api_call {
            no_index_dirty = NoIndexDirtyContext::new(context);
            &no_index_dirty
        } else {
            context
        };

        debug!("Sending bulk request");
        let response = context
            .client()
            .execute(&request)
            .await
            .map_err(|e| request_failed(&request, e, None, None))?;

        debug!(status = response.status, "Received bulk response");
        let parsed = parse_json_response(&response)
            .map_err(|e| request_failed(&request, e, Some(&response), None))?;

        handle_results(context, &request, works, &response, &parsed)
    }
}

impl fmt::Debug for BulkWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkWork")
            .field("id", &self.id)
            .field("works", &self.works)
            .field("refresh_in_api_call", &self.refresh_in_api_call)
            .finish()
    }
}

impl fmt::Display for BulkWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BulkWork[works = {:?}, refresh_in_api_call = {}]",
            self.works, self.refresh_in_api_call
        )
    }
}

/// Builder for [`BulkWork`].
pub struct BulkWorkBuilder {
    works: Vec<Box<dyn BulkableWork>>,
    refresh_in_bulk_api_call: bool,
}

impl BulkWorkBuilder {
    pub fn new(works: Vec<Box<dyn BulkableWork>>) -> Self {
        Self {
            works,
            refresh_in_bulk_api_call: false,
        }
    }

    /// Whether the engine should refresh the touched indexes as part of the call.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh_in_bulk_api_call = refresh;
        self
    }

    /// Linearize the works into one request: for each work its metadata line,
    /// then its body line if it has one.
    fn build_request(&self) -> Result<SearchRequest, WorkError> {
        let mut builder = SearchRequest::post().path_component("_bulk");
        if self.refresh_in_bulk_api_call {
            builder = builder.param("refresh", true);
        }

        for work in &self.works {
            builder = builder.body(work.action_metadata()?);
            if let Some(body) = work.action_body()? {
                builder = builder.body(body);
            }
        }

        Ok(builder.build())
    }

    /// Assemble the request.
    ///
    /// Fails with the first error a work raises while rendering itself.
    pub fn build(self) -> Result<BulkWork, WorkError> {
        let request = self.build_request()?;
        Ok(BulkWork {
            id: Uuid::new_v4(),
            request,
            works: self.works,
            refresh_in_api_call: self.refresh_in_bulk_api_call,
        })
    }
}

/// Turn a collaborator failure into the error returned by `execute`.
///
/// Domain errors are self-explanatory and pass through; anything else gets
/// the request and the available response attached.
fn request_failed(
    request: &SearchRequest,
    err: ClientError,
    response: Option<&RawResponse>,
    parsed: Option<&Value>,
) -> SearchError {
    match err {
        ClientError::Search(e) => e,
        ClientError::Transport(source) => {
            error!(error = %source, "Bulk request failed");
            SearchError::request_failed(
                format_request(request),
                format_response(response, parsed),
                source,
            )
        }
    }
}

/// Give every work the chance to handle its result.
///
/// A work whose handler fails counts as failed, and the handler error is
/// kept. The walk never stops early; if any work failed, one report covering
/// all works is returned at the end.
fn handle_results(
    context: &dyn WorkExecutionContext,
    request: &SearchRequest,
    works: Vec<Box<dyn BulkableWork>>,
    response: &RawResponse,
    parsed: &Value,
) -> Result<(), SearchError> {
    let items = match parsed.get("items") {
        None => None,
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            let err = ClientError::transport(format!(
                "expected 'items' to be an array, got {}",
                other
            ));
            return Err(request_failed(request, err, Some(response), Some(parsed)));
        }
    };

    if let Some(items) = items {
        if items.len() != works.len() {
            error!(
                expected = works.len(),
                actual = items.len(),
                "Bulk response item count does not match submitted works"
            );
            return Err(SearchError::BulkResponseItemCountMismatch {
                expected: works.len(),
                actual: items.len(),
                request: format_request(request),
                response: format_response(Some(response), Some(parsed)),
            });
        }
    }

    let total = works.len();
    let mut successful = Vec::with_capacity(total);
    let mut failed = Vec::new();
    let mut handler_errors = Vec::new();

    for (position, work) in works.into_iter().enumerate() {
        let result_item = items.map(|items| &items[position]);

        let success = match work.handle_bulk_result(context, result_item) {
            Ok(success) => success,
            Err(e) => {
                warn!(position, error = %e, "Bulk result handler failed");
                handler_errors.push(e);
                false
            }
        };

        if success {
            successful.push(SucceededWork {
                work,
                result: result_item.cloned(),
            });
        } else {
            warn!(position, work = ?work, "Bulk work failed");
            failed.push(work);
        }
    }

    if failed.is_empty() {
        debug_assert!(handler_errors.is_empty());
        info!(count = total, "Bulk request succeeded");
        return Ok(());
    }

    warn!(
        succeeded = successful.len(),
        failed = failed.len(),
        handler_errors = handler_errors.len(),
        "Bulk request had failures"
    );

    let mut report = BulkRequestFailedError::new(
        format_request(request),
        format_response(Some(response), Some(parsed)),
        successful,
        failed,
    );
    for e in handler_errors {
        report.add_suppressed(e);
    }
    Err(report.into())
}
