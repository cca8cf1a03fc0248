//! Record command
//!
//! Builds an audit entry from JSON snapshot files. The snapshots decide the
//! change: both files make an update, only `--after` an insert and only
//! `--before` a delete.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::Args;
use serde_json::Value;

use crate::audit::{AuditService, ChangeDetectionService};
use crate::config::{AuditPaths, Settings};
use crate::error::{AuditError, AuditResult};
use crate::models::EntityKey;
use crate::storage::{read_json_required, AuditTable, JsonlAuditSink};
use crate::tracking::{DynamicEntity, EntityModel, UnitOfWork};

/// Arguments for `record`
#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Entity type name
    #[arg(short = 't', long)]
    pub entity_type: String,

    /// JSON snapshot of the entity before the change
    #[arg(short, long)]
    pub before: Option<PathBuf>,

    /// JSON snapshot of the entity after the change
    #[arg(short, long)]
    pub after: Option<PathBuf>,

    /// Primary-key field (repeat for a composite key)
    #[arg(short, long = "key", default_value = "Id")]
    pub keys: Vec<String>,

    /// Description of the change
    #[arg(short, long)]
    pub description: String,

    /// Actor responsible for the change
    #[arg(short, long)]
    pub user: Option<String>,

    /// Append the entry to the audit log instead of printing it
    #[arg(short, long)]
    pub write: bool,
}

fn read_snapshot(path: Option<&Path>) -> AuditResult<Option<Value>> {
    path
        .map(|p| read_json_required::<Value, _>(p))
        .transpose()
}

/// Track the snapshots in a unit of work, in the state they describe
fn track(args: &RecordArgs, uow: &mut UnitOfWork) -> AuditResult<Rc<DynamicEntity>> {
    let before = read_snapshot(args.before.as_deref())?;
    let after = read_snapshot(args.after.as_deref())?;

    match (before, after) {
        (Some(before), Some(after)) => {
            let entity = DynamicEntity::from_value(&args.entity_type, before)?;
            let next = DynamicEntity::from_value(&args.entity_type, after)?;
            uow.attach(&entity)?;
            entity.replace_with(&next.to_map());
            Ok(entity)
        }
        (None, Some(after)) => {
            let entity = DynamicEntity::from_value(&args.entity_type, after)?;
            uow.add(&entity)?;
            Ok(entity)
        }
        (Some(before), None) => {
            let entity = DynamicEntity::from_value(&args.entity_type, before)?;
            uow.remove(&entity)?;
            Ok(entity)
        }
        (None, None) => Err(AuditError::Validation(
            "At least one of --before or --after is required".into(),
        )),
    }
}

/// Handle the record command
pub fn handle_record_command(paths: &AuditPaths, settings: &Settings, args: RecordArgs) -> AuditResult<()> {
    let keys: Vec<&str> = args.keys.iter().map(String::as_str).collect();
    let model = EntityModel::new().has_key(&args.entity_type, &keys)?;
    let mut uow = UnitOfWork::new(model);
    let entity = track(&args, &mut uow)?;

    let detector = ChangeDetectionService::new(settings.serializer.clone());
    let user = args.user.as_deref().or(settings.default_user_id.as_deref());
    let entry = uow.entry(&entity);

    if args.write {
        paths.ensure_directories()?;
        let sink = JsonlAuditSink::new(settings.audit_log_path(paths));
        let service = AuditService::<EntityKey>::new(&sink, &detector, &uow);

        let finalized = service
            .build(&entry, Some(&args.description), user, None)?
            .finalize()?;
        let change_type = finalized.entry().change_type;
        finalized.write()?;

        println!(
            "Recorded {} of {} as audit entry #{}",
            change_type,
            args.entity_type,
            sink.entry_count()?
        );
    } else {
        let table = AuditTable::<EntityKey>::new();
        let service = AuditService::new(&table, &detector, &uow);

        let finalized = service
            .build(&entry, Some(&args.description), user, None)?
            .finalize()?;
        println!("{}", serde_json::to_string_pretty(finalized.entry())?);
    }

    Ok(())
}
