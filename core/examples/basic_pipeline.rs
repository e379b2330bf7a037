// pilgrim/examples/basic_pipeline.rs

use pilgrim::{
  handler, middleware, provider, response, Context, HandlerTooling, Invocation, PilgrimError, Pipeline, Tooling,
};
use serde_json::json;
use tracing::info;

// 1. Define the source every invocation starts from.
#[derive(Clone, Debug, Default)]
struct Request {
  path: String,
  user: Option<String>,
}

// 2. Define an Error type for the pipeline.
//    For simplicity, this example uses PilgrimError directly.
//    In real applications, you'd typically define a custom error:
//    #[derive(Debug, thiserror::Error)]
//    enum MyError { #[error("Pilgrim: {0}")] Pilgrim(#[from] PilgrimError), /* ... */ }
type Tool = Tooling<Request, PilgrimError>;

#[tokio::main]
async fn main() -> Result<(), PilgrimError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 3. A composer that hands the invocation straight back.
  let composer = provider::from_fn(|invocation: Invocation<Request, PilgrimError>| invocation)
    .with_context_shape(["request.path"])
    .accepting(["example:text", response::NOTHING]);

  // 4. Declare the chain. The first middleware added is the outermost.
  let invocation = Pipeline::new(composer)
    .using(
      middleware::from_fn(|Tooling { source, next, .. }: Tool| async move {
        match &source.user {
          Some(user) => next.run(Context::new().with("user", json!({ "name": user }))).await,
          // Short-circuit: the handler never runs for anonymous requests.
          None => Ok(response::nothing()),
        }
      })
      .named("authenticate")
      .provides(["user"])
      .produces([response::NOTHING]),
    )
    .using(
      middleware::from_fn(|Tooling { next, .. }: Tool| async move {
        let result = next.run(Context::new().with("user", json!({ "theme": "dark" }))).await?;
        info!(response_type = %result.kind(), "Handler responded.");
        Ok(result)
      })
      .named("preferences")
      .requires(["user"])
      .provides(["user.theme"]),
    )
    .handle(
      handler::from_fn(|HandlerTooling { context }: HandlerTooling| async move {
        let name: String = context.get_as("user.name")?;
        let theme: String = context.get_as("user.theme")?;
        let path: String = context.get_as("request.path")?;
        Ok::<_, PilgrimError>(response::create("example:text", format!("{} ({}) visited {}", name, theme, path)))
      })
      .named("greet")
      .requires(["user.name", "user.theme", "request.path"])
      .produces(["example:text"]),
    )?;

  // 5. Invoke it, once per request.
  for request in [
    Request {
      path: "/home".to_string(),
      user: Some("ada".to_string()),
    },
    Request {
      path: "/admin".to_string(),
      user: None,
    },
  ] {
    let initial = Context::new().with("request", json!({ "path": request.path }));
    let result = invocation.invoke(request, initial).await?;
    info!("Result: {}", serde_json::to_string(&result).unwrap_or_default());
  }

  Ok(())
}
