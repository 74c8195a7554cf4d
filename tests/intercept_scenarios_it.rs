// std
use std::time::Duration as StdDuration;
// self
use bearer_gate::{
	_preludet::*,
	auth::Credential,
	error::ProviderError,
	http::AUTHORIZATION,
	intercept::Interceptor,
};

fn token(value: &str, ttl: Duration) -> Credential {
	Credential::new(value, OffsetDateTime::now_utc() + ttl)
}

fn expired_token(value: &str) -> Credential {
	Credential::new(value, OffsetDateTime::now_utc())
}

fn far_future() -> Duration {
	Duration::days(365)
}

#[tokio::test]
async fn no_initial_token_bootstraps_on_first_rejection() {
	let provider = Arc::new(ScriptedProvider::new(None).with_refresh(token("0", far_future())));
	let interceptor = Interceptor::new(provider.clone());
	let chain = EchoChain::new().with_statuses([401]);
	let response = interceptor
		.intercept(probe_request(), &chain)
		.await
		.expect("Bootstrap request should succeed after the refresh.");

	assert_eq!(response.body_text(), "Bearer 0");
	assert_eq!(provider.load_calls(), 1);
	assert_eq!(provider.refresh_calls(), 1);
	assert_eq!(provider.previous_values(), vec![None]);

	let forwarded = chain.forwarded();

	assert_eq!(forwarded.len(), 2);
	assert_eq!(forwarded[0].header(AUTHORIZATION), None);
	assert_eq!(forwarded[1].header(AUTHORIZATION), Some("Bearer 0"));
}

#[tokio::test]
async fn expired_initial_token_refreshes_before_the_first_forward() {
	let provider = Arc::new(
		ScriptedProvider::new(Some(expired_token("0"))).with_refresh(token("1", far_future())),
	);
	let interceptor = Interceptor::new(provider.clone());
	let chain = EchoChain::new();
	let response = interceptor
		.intercept(probe_request(), &chain)
		.await
		.expect("Proactively refreshed request should succeed.");

	assert_eq!(response.body_text(), "Bearer 1");
	assert_eq!(provider.refresh_calls(), 1);
	assert_eq!(provider.previous_values(), vec![Some("0".to_owned())]);
	// The stale credential never reached the chain.
	assert_eq!(chain.proceed_count(), 1);
	assert_eq!(chain.forwarded()[0].header(AUTHORIZATION), Some("Bearer 1"));
}

#[tokio::test]
async fn valid_initial_token_forwards_without_any_refresh() {
	let provider = Arc::new(ScriptedProvider::new(Some(token("0", Duration::seconds(10)))));
	let interceptor = Interceptor::new(provider.clone());
	let chain = EchoChain::new();
	let response = interceptor
		.intercept(probe_request(), &chain)
		.await
		.expect("Request with a valid credential should succeed.");

	assert_eq!(response.body_text(), "Bearer 0");
	assert_eq!(provider.refresh_calls(), 0);
	assert_eq!(chain.proceed_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_expired_requests_share_one_refresh() {
	let provider = Arc::new(
		ScriptedProvider::new(Some(expired_token("0"))).with_refresh(token("1", far_future())),
	);
	let interceptor = Interceptor::new(provider.clone()).with_queue_size(2);
	let chain_a = EchoChain::new().with_delay(StdDuration::from_millis(50));
	let chain_b = EchoChain::new().with_delay(StdDuration::from_millis(50));
	let (first, second) = tokio::join!(
		interceptor.intercept(probe_request(), &chain_a),
		interceptor.intercept(probe_request(), &chain_b),
	);
	let first = first.expect("First concurrent request should succeed.");
	let second = second.expect("Second concurrent request should succeed.");

	assert_eq!(first.body_text(), "Bearer 1");
	assert_eq!(second.body_text(), "Bearer 1");
	assert_eq!(provider.refresh_calls(), 1);
	assert_eq!(provider.previous_values(), vec![Some("0".to_owned())]);
}

#[tokio::test(start_paused = true)]
async fn concurrent_rejections_share_one_refresh() {
	let provider = Arc::new(
		ScriptedProvider::new(Some(token("0", Duration::seconds(10))))
			.with_refresh(token("1", far_future())),
	);
	let interceptor = Interceptor::new(provider.clone()).with_queue_size(2);
	let chain_a = EchoChain::new().with_delay(StdDuration::from_millis(50)).with_statuses([401]);
	let chain_b = EchoChain::new().with_delay(StdDuration::from_millis(50)).with_statuses([401]);
	let (first, second) = tokio::join!(
		interceptor.intercept(probe_request(), &chain_a),
		interceptor.intercept(probe_request(), &chain_b),
	);
	let first = first.expect("First rejected request should succeed after the retry.");
	let second = second.expect("Second rejected request should succeed after the retry.");

	assert_eq!(first.body_text(), "Bearer 1");
	assert_eq!(second.body_text(), "Bearer 1");
	assert_eq!(provider.refresh_calls(), 1);
	assert_eq!(provider.previous_values(), vec![Some("0".to_owned())]);
}

#[tokio::test(start_paused = true)]
async fn long_running_request_straddling_two_refreshes_is_gated() {
	let provider = Arc::new(
		ScriptedProvider::new(Some(token("0", far_future())))
			.with_refresh(token("1", far_future()))
			.with_refresh(token("2", far_future())),
	);
	let interceptor = Interceptor::new(provider.clone()).with_queue_size(2);
	let long_chain =
		Arc::new(EchoChain::new().with_delay(StdDuration::from_millis(500)).with_statuses([401]));
	let long_request = tokio::spawn({
		let interceptor = interceptor.clone();
		let chain = long_chain.clone();

		async move { interceptor.intercept(probe_request(), &*chain).await }
	});

	// Two short rejected requests complete in sequence while the long one is still in its
	// first forward; each triggers and finishes its own refresh round.
	let short_chain_a =
		EchoChain::new().with_delay(StdDuration::from_millis(50)).with_statuses([401]);
	let first = interceptor
		.intercept(probe_request(), &short_chain_a)
		.await
		.expect("First short request should succeed after its refresh.");

	assert_eq!(first.body_text(), "Bearer 1");

	let short_chain_b =
		EchoChain::new().with_delay(StdDuration::from_millis(50)).with_statuses([401]);
	let second = interceptor
		.intercept(probe_request(), &short_chain_b)
		.await
		.expect("Second short request should succeed after its refresh.");

	assert_eq!(second.body_text(), "Bearer 2");

	let long = long_request
		.await
		.expect("Long request task should not panic.")
		.expect("Long request should succeed via gating.");

	// The long request observed generation 0, but by the time its rejection arrived the
	// state had reached generation 2; gating reuses that credential without a third refresh.
	assert_eq!(long.body_text(), "Bearer 2");
	assert_eq!(provider.refresh_calls(), 2);
	assert_eq!(provider.previous_values(), vec![Some("0".to_owned()), Some("1".to_owned())]);

	let forwarded = long_chain.forwarded();

	assert_eq!(forwarded.len(), 2);
	assert_eq!(forwarded[0].header(AUTHORIZATION), Some("Bearer 0"));
	assert_eq!(forwarded[1].header(AUTHORIZATION), Some("Bearer 2"));
}

#[tokio::test]
async fn refresh_failure_surfaces_and_the_next_request_starts_over() {
	let provider = Arc::new(
		ScriptedProvider::new(None)
			.with_refresh_error("invalid token")
			.with_refresh(token("0", far_future())),
	);
	let interceptor = Interceptor::new(provider.clone());
	let chain = EchoChain::new().with_statuses([401]);
	let err = interceptor
		.intercept(probe_request(), &chain)
		.await
		.expect_err("Failed refresh should surface to the caller.");

	assert!(matches!(
		err,
		Error::Provider(ProviderError::Refresh { ref message }) if message == "invalid token"
	));

	let retry_chain = EchoChain::new().with_statuses([401]);
	let response = interceptor
		.intercept(probe_request(), &retry_chain)
		.await
		.expect("Request after a failed refresh should trigger a new one.");

	assert_eq!(response.body_text(), "Bearer 0");
	assert_eq!(provider.refresh_calls(), 2);
}

#[tokio::test]
async fn caller_headers_survive_decoration_on_both_forwards() {
	let provider = Arc::new(
		ScriptedProvider::new(Some(token("0", far_future())))
			.with_refresh(token("1", far_future())),
	);
	let interceptor = Interceptor::new(provider.clone());
	let chain = EchoChain::new().with_statuses([401]);
	let request = probe_request().with_header("X-Request-Id", "42").with_header("Accept", "*/*");

	interceptor
		.intercept(request, &chain)
		.await
		.expect("Request should succeed after the retry.");

	for forwarded in chain.forwarded() {
		assert_eq!(forwarded.header("X-Request-Id"), Some("42"));
		assert_eq!(forwarded.header("Accept"), Some("*/*"));
		assert_eq!(forwarded.header_all(AUTHORIZATION).len(), 1);
	}
}
