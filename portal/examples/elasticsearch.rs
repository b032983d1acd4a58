//! A small Elasticsearch client built from route specs.
//!
//! Run against a local node:
//!
//! ```sh
//! RUST_LOG=portal=debug cargo run -p portal --example elasticsearch -- http://localhost:9200
//! ```

use portal::{
    CallInput, Client, ClientConfig, OnHttpError, PortalError, Response, RestMethod, Route,
    RouteSpec, Shorthand,
};
use serde_json::{Value, json};

struct Elasticsearch {
    create_index: Route,
    add_document: Route,
    get_document: Route,
}

impl Elasticsearch {
    fn connect(host: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = ClientConfig::builder(host)?
            .on_http_error(OnHttpError::Resolve)
            .build();
        let client = Client::with_reqwest(config)?;

        Ok(Self {
            create_index: client.route(RouteSpec::new("/:index:").method(RestMethod::Put))?,
            add_document: client.route(
                RouteSpec::new("/:index:/_doc/:id:")
                    .method(RestMethod::Put)
                    .params(Shorthand::ordered(["string".into(), "string".into()])),
            )?,
            get_document: client.route(RouteSpec::new("/:index:/_doc/:id:"))?,
        })
    }
}

fn summarize(label: &str, response: &Response) {
    let body = response.body.as_json().cloned().unwrap_or(Value::Null);
    println!(
        "{label}: {} {} {body}",
        response.status.code.unwrap_or_default(),
        response.status.word.as_deref().unwrap_or_default()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    let host = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:9200".to_string());
    let es = Elasticsearch::connect(&host)?;

    let response = es
        .create_index
        .call(CallInput::new().positional([json!("test-index")]))
        .await?;
    summarize("createIndex", &response);

    let response = es
        .add_document
        .call(
            CallInput::new()
                .positional([json!("test-index"), json!("test-id")])
                .payload(json!({ "a": { "test": "document" } })),
        )
        .await?;
    summarize("addDocument", &response);

    let result: Result<Response, PortalError> = es
        .get_document
        .call(CallInput::new().positional([json!("test-index"), json!("test-id")]))
        .await;
    match result {
        Ok(response) => summarize("getDocument", &response),
        Err(err) => eprintln!("getDocument failed: {err}"),
    }

    Ok(())
}
