//! Demo binary: a small user-directory service under `/api`, with an
//! optional static directory served for everything else.

use anyhow::Context;
use clap::Parser;
use http::Method;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use waymark::resource::{BeanMeta, HandlerDesc, ParamMeta, ResourceDesc, TargetType};
use waymark::server::{AppService, HttpServer};
use waymark::static_files::StaticFiles;
use waymark::{Dispatcher, RouteRegistry};

#[derive(Parser)]
#[command(name = "waymark", about = "Demo user-directory service")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1:8080", env = "WAYMARK_ADDR")]
    addr: String,
    /// Application path prefix; requests outside it hit the static fallback
    #[arg(long, default_value = "/api")]
    prefix: String,
    /// Directory to serve static files from
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let registry = RouteRegistry::build(&args.prefix, vec![user_resource()])
        .context("route registration failed")?;
    let mut dispatcher = Dispatcher::new(registry);
    if let Some(dir) = &args.static_dir {
        dispatcher = dispatcher.with_fallback(StaticFiles::new(dir));
    }

    let handle = HttpServer(AppService::new(Arc::new(dispatcher)))
        .start(&args.addr)
        .with_context(|| format!("cannot bind {}", args.addr))?;
    tracing::info!(addr = %args.addr, prefix = %args.prefix, "waymark listening");
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))?;
    Ok(())
}

fn user_resource() -> ResourceDesc {
    ResourceDesc::new("user", "/user")
        .consumes("application/json")
        .handler(
            HandlerDesc::new("list_users", "/list", [Method::GET], |_ctx, args| {
                Ok(json!({
                    "path": args[0],
                    "page": args[1],
                    "page_size": args[2],
                    "users": [
                        { "id": 1, "name": "ashby" },
                        { "id": 2, "name": "bram" },
                    ],
                }))
            })
            .param(ParamMeta::query("path", TargetType::String))
            .param(ParamMeta::query("page", TargetType::Integer).with_default("1"))
            .param(ParamMeta::query("pageSize", TargetType::Integer).with_default("20")),
        )
        .handler(
            HandlerDesc::new("get_user", "/{id}", [Method::GET], |_ctx, args| {
                Ok(json!({ "id": args[0], "name": "ashby" }))
            })
            .param(ParamMeta::path("id", TargetType::Integer)),
        )
        .handler(
            HandlerDesc::new("create_user", "", [Method::POST], |_ctx, args| {
                Ok(json!({ "created": args[0] }))
            })
            .param(ParamMeta::body(TargetType::Json)),
        )
        .handler(
            HandlerDesc::new("create_user_form", "/form", [Method::POST], |_ctx, args| {
                Ok(json!({ "created": args[0], "notify": args[1] }))
            })
            .param(ParamMeta::bean(
                BeanMeta::new("UserForm")
                    .field("name", ParamMeta::form("name", TargetType::String))
                    .field("age", ParamMeta::form("age", TargetType::Integer))
                    .field(
                        "tags",
                        ParamMeta::form(
                            "tag",
                            TargetType::Array(Box::new(TargetType::String)),
                        ),
                    ),
            ))
            .param(ParamMeta::query("notify", TargetType::Boolean).with_default("false")),
        )
}
