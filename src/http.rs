//! HTTP request/response shapes and the interceptor-chain capability.
//!
//! The crate is transport-agnostic: [`InterceptorChain`] is its only seam to an HTTP stack.
//! Requests carry an ordered header list so decoration never reorders, removes, or
//! deduplicates caller-supplied headers.

// std
use std::borrow::Cow;
// crates.io
pub use http::{Method, StatusCode};
// self
use crate::{_prelude::*, error::TransportError};

/// Header name the interceptor attaches.
pub const AUTHORIZATION: &str = "Authorization";

/// Outbound HTTP request consumed and decorated by the interceptor.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// Request method.
	pub method: Method,
	/// Request URL.
	pub url: Url,
	/// Ordered header list; duplicates are preserved.
	pub headers: Vec<(String, String)>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Creates a request with no headers and no body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: None }
	}

	/// Appends a header, preserving the position of every existing entry.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Replaces the request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Returns the first header value whose name matches `name` (ASCII case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Returns every header value whose name matches `name` (ASCII case-insensitive), in
	/// order of appearance.
	pub fn header_all(&self, name: &str) -> Vec<&str> {
		self.headers
			.iter()
			.filter(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
			.collect()
	}
}

/// HTTP response produced by the chain.
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// Response status code.
	pub status: StatusCode,
	/// Ordered response header list.
	pub headers: Vec<(String, String)>,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response with no headers and an empty body.
	pub fn new(status: StatusCode) -> Self {
		Self { status, headers: Vec::new(), body: Vec::new() }
	}

	/// Appends a response header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Replaces the response body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Returns the body decoded as UTF-8, replacing invalid sequences.
	pub fn body_text(&self) -> Cow<str> {
		String::from_utf8_lossy(&self.body)
	}
}

/// Boxed future returned by [`InterceptorChain::proceed`].
pub type ChainFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Capability that forwards a decorated request to the next interceptor stage.
pub trait InterceptorChain
where
	Self: Send + Sync,
{
	/// Forwards the request and resolves with the upstream response.
	fn proceed(&self, request: HttpRequest) -> ChainFuture<'_>;
}
