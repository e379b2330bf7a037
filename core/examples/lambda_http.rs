// pilgrim/examples/lambda_http.rs

use pilgrim::provider::lambda::{self, HttpResponseSupport, LambdaContext, LambdaSource};
use pilgrim::{handler, middleware, response, Context, HandlerTooling, HttpResponseData, PilgrimError, Tooling};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Clone, Debug, Deserialize)]
struct ProxyEvent {
  path: String,
  #[serde(default, rename = "queryStringParameters")]
  query: BTreeMap<String, String>,
}

#[tokio::main]
async fn main() -> Result<(), PilgrimError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Lambda HTTP Example ---");

  let function = lambda::lambda::<ProxyEvent, PilgrimError>()
    .using(HttpResponseSupport)
    .using(
      middleware::from_fn(
        |Tooling { source, next, .. }: Tooling<LambdaSource<ProxyEvent>, PilgrimError>| async move {
          let search = source.event.query.get("search").cloned().unwrap_or_default();
          next.run(Context::new().with("filters", json!({ "search": search }))).await
        },
      )
      .named("filters")
      .provides(["filters"]),
    )
    .handle(
      handler::from_fn(|HandlerTooling { context }: HandlerTooling| async move {
        let search: String = context.get_as("filters.search")?;
        let request_id: String = context.get_as("request.id")?;

        let mut headers = BTreeMap::new();
        headers.insert("x-request-id".to_string(), request_id);
        Ok::<_, PilgrimError>(response::http(HttpResponseData {
          status: 200,
          headers: Some(headers),
          body: Some(json!({ "results": [], "search": search }).to_string()),
        }))
      })
      .named("list_users")
      .requires(["filters.search", "request.id"])
      .produces([response::HTTP]),
    )?;

  // What a host runtime would deliver for one request.
  let event: ProxyEvent = serde_json::from_value(json!({
    "path": "/users",
    "queryStringParameters": { "search": "ada" },
  }))
  .map_err(|e| PilgrimError::Internal(e.to_string()))?;
  info!(path = %event.path, "Invoking function.");

  let context = LambdaContext {
    aws_request_id: "example-request".to_string(),
    ..Default::default()
  };
  let output = function.call(event, context).await?;
  info!("Host receives: {}", output.unwrap_or_default());

  Ok(())
}
