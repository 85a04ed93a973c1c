use actix_cors::Cors;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use weavecore::Workflow;
use weaveruntime::{FlowRuntime, NodeRegistry, RuntimeConfig};

/// Environment variable holding the listen address
const BIND_ENV: &str = "BIND_ADDRESS";
const DEFAULT_BIND: &str = "0.0.0.0:8000";
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Application state shared across handlers
struct AppState {
    runtime: Arc<FlowRuntime>,
}

/// Error body: `{"detail": ...}`
#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

/// Health check endpoint
#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "weaveserver"
    }))
}

/// Execute a workflow once and return its outputs and log
#[post("/run")]
async fn run_workflow(data: web::Data<AppState>, workflow: web::Json<Workflow>) -> impl Responder {
    let workflow = workflow.into_inner();
    info!(
        "Executing workflow: {} nodes, {} links",
        workflow.nodes.len(),
        workflow.links.len()
    );

    match data.runtime.run(&workflow).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(failure) => {
            error!("Workflow execution failed: {}", failure);
            HttpResponse::BadRequest().json(ErrorResponse {
                detail: failure.to_string(),
            })
        }
    }
}

/// List available node types
#[get("/api/nodes")]
async fn list_node_types(data: web::Data<AppState>) -> impl Responder {
    let registry = data.runtime.registry();

    let nodes: Vec<_> = registry
        .list_node_types()
        .iter()
        .map(|node_type| {
            let metadata = registry.get_metadata(node_type).unwrap_or_default();
            let ports = |defs: &[weavecore::PortDefinition]| {
                defs.iter()
                    .map(|p| {
                        serde_json::json!({
                            "name": p.name,
                            "description": p.description,
                            "required": p.required,
                        })
                    })
                    .collect::<Vec<_>>()
            };
            serde_json::json!({
                "type": node_type,
                "description": metadata.description,
                "category": metadata.category,
                "inputs": ports(&metadata.inputs),
                "outputs": ports(&metadata.outputs),
            })
        })
        .collect();

    HttpResponse::Ok().json(nodes)
}

/// Larger body limit for big graphs; malformed bodies get the same error shape
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ErrorResponse {
                detail: err.to_string(),
            });
            actix_web::error::InternalError::from_response(err, response).into()
        })
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting weave server");

    let config = RuntimeConfig::from_env();
    let workspace = config.open_workspace()?;
    info!("Workspace: {}", workspace.root().display());

    let mut registry = NodeRegistry::new();
    weavenodes::register_all(&mut registry, &workspace);

    let runtime = FlowRuntime::with_registry(Arc::new(registry), workspace);

    let app_state = web::Data::new(AppState {
        runtime: Arc::new(runtime),
    });

    let bind_address = std::env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND.to_string());

    info!("Server starting on http://{}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .app_data(json_config())
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .service(health_check)
            .service(run_workflow)
            .service(list_node_types)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
