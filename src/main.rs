// ==========================================
// 货运物流系统 - CLI 主入口
// ==========================================
// 用法:
//   cargo-logistics <db> import <file...> [--container <号>] [--user <id>] [--overwrite] [--no-header]
//   cargo-logistics <db> container-events <csv> <集装箱号>
//   cargo-logistics <db> milestones <集装箱号>
// 输出: JSON 报告写到 stdout，日志走 stderr（RUST_LOG 控制级别）
// ==========================================

use cargo_logistics::api::ImportApi;
use cargo_logistics::config::ImportConfig;
use cargo_logistics::db::{init_schema, open_sqlite_connection};
use cargo_logistics::engine::{ImportMode, ImportRequest};
use cargo_logistics::logging;
use cargo_logistics::repository::{
    AuditLogRepository, ContainerRepository, CustomerRepository, ShipmentRepositoryImpl,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    tracing::info!("货运物流系统 v{}", cargo_logistics::VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let (db_path, command, rest) = match args.as_slice() {
        [db, cmd, rest @ ..] => (db.clone(), cmd.clone(), rest.to_vec()),
        _ => {
            anyhow::bail!(
                "usage: cargo-logistics <db> <import|container-events|milestones> ..."
            );
        }
    };

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let api = ImportApi::new(
        Arc::new(ShipmentRepositoryImpl::new(conn.clone())),
        Arc::new(CustomerRepository::new(conn.clone())),
        Arc::new(ContainerRepository::new(conn.clone())),
        Arc::new(AuditLogRepository::new(conn)),
        ImportConfig::default(),
    );

    match command.as_str() {
        "import" => cmd_import(&api, rest).await,
        "container-events" => cmd_container_events(&api, rest),
        "milestones" => cmd_milestones(&api, rest),
        other => anyhow::bail!("unknown command: {other}"),
    }
}

/// 批量导入舱单文件
async fn cmd_import(api: &ImportApi, args: Vec<String>) -> anyhow::Result<()> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut container: Option<String> = None;
    let mut user_id: Option<i64> = None;
    let mut mode = ImportMode::CreateNew;
    let mut has_header = true;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--container" => {
                container = Some(
                    iter.next()
                        .ok_or_else(|| anyhow::anyhow!("--container requires a value"))?,
                );
            }
            "--user" => {
                user_id = Some(
                    iter.next()
                        .ok_or_else(|| anyhow::anyhow!("--user requires a value"))?
                        .parse()?,
                );
            }
            "--overwrite" => mode = ImportMode::OverwriteExisting,
            "--no-header" => has_header = false,
            _ => files.push(PathBuf::from(arg)),
        }
    }
    if files.is_empty() {
        anyhow::bail!("import requires at least one file");
    }

    let requests: Vec<ImportRequest> = files
        .into_iter()
        .map(|path| {
            let original_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            ImportRequest {
                file_path: path,
                original_name,
                has_header,
                mode,
                user_id,
                container_number: container.clone(),
                actor_id: None,
                attachment: None,
            }
        })
        .collect();

    let report = api.upload_batch(requests).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.ok {
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} entries failed",
            report.summary.failed,
            report.summary.total
        )
    }
}

/// 导入集装箱事件快照
fn cmd_container_events(api: &ImportApi, args: Vec<String>) -> anyhow::Result<()> {
    let (csv, container) = match args.as_slice() {
        [csv, container] => (csv.clone(), container.clone()),
        _ => anyhow::bail!("usage: container-events <csv> <container-number>"),
    };
    let report = api.ingest_container_events(Path::new(&csv), &container)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// 查询集装箱里程碑
fn cmd_milestones(api: &ImportApi, args: Vec<String>) -> anyhow::Result<()> {
    let container = match args.as_slice() {
        [container] => container.clone(),
        _ => anyhow::bail!("usage: milestones <container-number>"),
    };
    let milestones = api.container_milestones(&container)?;
    println!("{}", serde_json::to_string_pretty(&milestones)?);
    Ok(())
}
