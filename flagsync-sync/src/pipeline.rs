//! Sync orchestration: scan documents, derive keys, fetch the remote
//! template, reconcile, apply, report.
//!
//! All workflows share the scan/derive stages; only the effect-executing
//! tail differs. Dry-run threads through every mutating call: the full
//! pipeline still runs against real data, but writes, publishes, branch
//! pushes, and issue closes are replaced with logged would-happen actions.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::Utc;

use flagsync_core::config::Config;
use flagsync_core::keys::derive_flag_key;
use flagsync_core::types::{
    EnvironmentId, FeatureIds, FlagKey, FlagRow, Frontmatter, FrontmatterValue,
};
use flagsync_docs::flagblock::{
    extract_flag_keys_from_content, parse_flag_block, rebuild_flag_block, FlagBlockRegion,
};
use flagsync_docs::frontmatter::{parse_frontmatter, update_frontmatter, FrontmatterOutcome};
use flagsync_docs::store::DocumentStore;
use flagsync_remote::client::RemoteConfigService;
use flagsync_remote::template::{ParameterDefinition, Template};

use crate::error::SyncError;
use crate::reconcile::reconcile;
use crate::report::{AnchorSummary, GcEnvironmentResult, GcSummary, SetSummary, SyncSummary};
use crate::tracker::Tracker;
use crate::writer::{atomic_write, WriteResult};

/// One run's worth of collaborators plus the dry-run switch.
pub struct Pipeline<'a, S, R, T> {
    config: &'a Config,
    store: &'a S,
    remote: &'a R,
    tracker: &'a T,
    dry_run: bool,
}

/// A document that survived the scan stage: it parsed and carries a flag block.
struct ScannedDoc {
    path: PathBuf,
    text: String,
    frontmatter: Option<Frontmatter>,
    region: FlagBlockRegion,
}

impl ScannedDoc {
    fn feature_ids(&self) -> Option<FeatureIds> {
        self.frontmatter.as_ref().and_then(Frontmatter::feature_ids)
    }
}

struct Scan {
    docs: Vec<ScannedDoc>,
    scanned: usize,
    skipped: usize,
}

impl<'a, S, R, T> Pipeline<'a, S, R, T>
where
    S: DocumentStore,
    R: RemoteConfigService,
    T: Tracker,
{
    pub fn new(
        config: &'a Config,
        store: &'a S,
        remote: &'a R,
        tracker: &'a T,
        dry_run: bool,
    ) -> Self {
        Self {
            config,
            store,
            remote,
            tracker,
            dry_run,
        }
    }

    // -----------------------------------------------------------------------
    // scan
    // -----------------------------------------------------------------------

    /// Read and parse every markdown document under the configured roots.
    /// A document that fails to parse is skipped with a warning; the run is
    /// fatal only when every scanned document fails.
    fn scan_documents(&self) -> Result<Scan, SyncError> {
        let files = self.store.list_markdown_files(&self.config.doc_roots)?;
        let mut docs = Vec::new();
        let mut skipped = 0;
        let mut failures = 0;

        for path in &files {
            let text = self.store.read(path)?;
            let frontmatter = match parse_frontmatter(&text) {
                Ok(FrontmatterOutcome::Present { frontmatter, .. }) => Some(frontmatter),
                Ok(FrontmatterOutcome::Absent) => None,
                Err(err) => {
                    log::warn!("skipping {}: {err}", path.display());
                    skipped += 1;
                    failures += 1;
                    continue;
                }
            };
            match parse_flag_block(&text) {
                Ok(Some(region)) => docs.push(ScannedDoc {
                    path: path.clone(),
                    text,
                    frontmatter,
                    region,
                }),
                Ok(None) => {
                    log::debug!("no flag block in {}; skipping", path.display());
                    skipped += 1;
                }
                Err(err) => {
                    log::warn!("skipping {}: {err}", path.display());
                    skipped += 1;
                    failures += 1;
                }
            }
        }

        if !files.is_empty() && failures == files.len() {
            return Err(SyncError::AllDocumentsFailed { failures });
        }

        Ok(Scan {
            docs,
            scanned: files.len(),
            skipped,
        })
    }

    // -----------------------------------------------------------------------
    // Workflow 1: anchor keys into documents
    // -----------------------------------------------------------------------

    /// Derive keys for flag rows that lack one and rewrite the documents.
    /// Rows already carrying a key are untouched, so re-runs are no-ops.
    pub fn anchor_keys(&self) -> Result<AnchorSummary, SyncError> {
        let scan = self.scan_documents()?;
        let mut documents_rewritten = Vec::new();
        let mut keys_anchored = 0;
        let mut skipped = scan.skipped;

        for doc in &scan.docs {
            let Some(ids) = doc.feature_ids() else {
                log::warn!(
                    "skipping {}: frontmatter lacks numeric featureNumber/flagNumber",
                    doc.path.display()
                );
                skipped += 1;
                continue;
            };

            let mut rows: Vec<FlagRow> = Vec::with_capacity(doc.region.block.rows.len());
            let mut derived_here = 0;
            for row in doc.region.block.rows.iter().cloned() {
                if row.key.is_none() {
                    let key = derive_flag_key(ids.feature_number, ids.flag_number, &row.context);
                    rows.push(row.with_key(key));
                    derived_here += 1;
                } else {
                    rows.push(row);
                }
            }
            if derived_here == 0 {
                continue;
            }
            keys_anchored += derived_here;

            let rebuilt = rebuild_flag_block(&doc.text, &rows)?;
            let stamped = update_frontmatter(
                &rebuilt,
                &[(
                    "flags_synced_at".to_owned(),
                    FrontmatterValue::Scalar(Utc::now().to_rfc3339()),
                )],
            )?;
            match atomic_write(&doc.path, &stamped, self.dry_run)? {
                WriteResult::Unchanged { .. } => {}
                result => documents_rewritten.push(result.path().to_path_buf()),
            }
        }

        // All rewrites are durable on local storage before the branch step,
        // so a git failure here never loses document work.
        let branch = if documents_rewritten.is_empty() {
            None
        } else {
            let name = format!("flagsync/anchor-{}", Utc::now().format("%Y%m%d-%H%M%S"));
            if self.dry_run {
                log::info!("[dry-run] would push branch '{name}'");
            } else {
                self.tracker.create_and_push_branch(
                    &name,
                    "Anchor derived flag keys into planning documents",
                    &documents_rewritten,
                )?;
            }
            Some(name)
        };

        Ok(AnchorSummary {
            documents_scanned: scan.scanned,
            documents_skipped: skipped,
            keys_anchored,
            documents_rewritten,
            branch,
            dry_run: self.dry_run,
        })
    }

    // -----------------------------------------------------------------------
    // Workflow 2: synchronize flags to an environment
    // -----------------------------------------------------------------------

    /// Converge the target environment's template onto the documents'
    /// desired flag set with one conditional publish.
    pub fn sync_environment(&self, env_id: &EnvironmentId) -> Result<SyncSummary, SyncError> {
        let env = self.config.environment(env_id)?;
        let scan = self.scan_documents()?;

        // derive: anchored keys as-is, unanchored rows derived in
        // memory. Contexts that sanitize identically collapse to one key.
        let mut desired: BTreeMap<FlagKey, ParameterDefinition> = BTreeMap::new();
        for doc in &scan.docs {
            let ids = doc.feature_ids();
            for row in &doc.region.block.rows {
                let key = row.key.clone().or_else(|| {
                    ids.map(|ids| {
                        derive_flag_key(ids.feature_number, ids.flag_number, &row.context)
                    })
                });
                let Some(key) = key else {
                    log::warn!(
                        "{}: row '{}' has no key and no derivable ids; skipping",
                        doc.path.display(),
                        row.context
                    );
                    continue;
                };
                desired.insert(
                    key,
                    ParameterDefinition {
                        default_value: row.default_value.clone(),
                        value_type: row.value_type,
                        description: Some(row.description.clone()),
                    },
                );
            }
        }

        // fetch
        let token = self.remote.get_access_token()?;
        let (base, version) = self.remote.fetch(env, &token)?;

        // reconcile
        let active: BTreeSet<FlagKey> = desired.keys().cloned().collect();
        let remote_keys: BTreeSet<String> = base.parameters.keys().cloned().collect();
        let plan = reconcile(&active, &remote_keys);
        let updated: Vec<String> = desired
            .iter()
            .filter(|(key, def)| {
                base.find_parameter(&key.0)
                    .is_some_and(|current| current != *def)
            })
            .map(|(key, _)| key.to_string())
            .collect();

        // apply: one atomic conditional publish, never incremental writes.
        let changed = !plan.is_empty() || !updated.is_empty();
        let published = if !changed {
            log::info!("'{env_id}' already converged; nothing to publish");
            false
        } else if self.dry_run {
            log::info!(
                "[dry-run] would publish to '{env_id}': +{} ~{} -{}",
                plan.to_add.len(),
                updated.len(),
                plan.to_remove.len()
            );
            false
        } else {
            let mut pruned = base.clone();
            for key in &plan.to_remove {
                pruned.remove_parameter(&key.0);
            }
            let fragment = Template::fragment(desired);
            let merged = Template::merge(&pruned, &fragment);
            self.remote.publish(env, &token, &merged, &version)?;
            true
        };

        Ok(SyncSummary {
            environment: env_id.to_string(),
            documents_scanned: scan.scanned,
            documents_skipped: scan.skipped,
            active_keys: active.len(),
            added: plan.to_add.iter().map(FlagKey::to_string).collect(),
            updated,
            removed: plan.to_remove.iter().map(FlagKey::to_string).collect(),
            published,
            dry_run: self.dry_run,
        })
    }

    // -----------------------------------------------------------------------
    // Workflow 3: garbage-collect orphaned flags
    // -----------------------------------------------------------------------

    /// Remove managed keys no document references any more, across every
    /// declared environment, then close their tracker issues.
    pub fn collect_garbage(&self) -> Result<GcSummary, SyncError> {
        let scan = self.scan_documents()?;

        // Active keys are the anchored ones; unanchored rows have not been
        // provisioned yet and cannot have orphans.
        let mut active: BTreeSet<FlagKey> = BTreeSet::new();
        for doc in &scan.docs {
            active.extend(extract_flag_keys_from_content(&doc.text)?);
        }

        let token = self.remote.get_access_token()?;
        let mut environments = Vec::new();
        let mut all_removed: BTreeSet<FlagKey> = BTreeSet::new();

        for env in &self.config.environments {
            let (base, version) = self.remote.fetch(env, &token)?;
            let remote_keys: BTreeSet<String> = base.parameters.keys().cloned().collect();
            let plan = reconcile(&active, &remote_keys);

            let published = if plan.to_remove.is_empty() {
                false
            } else if self.dry_run {
                log::info!(
                    "[dry-run] would remove {} orphaned keys from '{}'",
                    plan.to_remove.len(),
                    env.id
                );
                false
            } else {
                let mut pruned = base.clone();
                for key in &plan.to_remove {
                    pruned.remove_parameter(&key.0);
                }
                self.remote.publish(env, &token, &pruned, &version)?;
                true
            };

            environments.push(GcEnvironmentResult {
                environment: env.id.to_string(),
                removed: plan.to_remove.iter().map(FlagKey::to_string).collect(),
                published,
            });
            all_removed.extend(plan.to_remove);
        }

        let mut issues_closed = Vec::new();
        let mut issues_missing = Vec::new();
        for key in &all_removed {
            let title = format!("[flag] {key}");
            match self.tracker.find_issue_by_title(&title)? {
                Some(number) => {
                    if self.dry_run {
                        log::info!("[dry-run] would close issue #{number} ('{title}')");
                    } else {
                        self.tracker.close_issue(number)?;
                    }
                    issues_closed.push(title);
                }
                None => {
                    log::info!("no open tracker issue titled '{title}'; skipping");
                    issues_missing.push(key.to_string());
                }
            }
        }

        Ok(GcSummary {
            documents_scanned: scan.scanned,
            documents_skipped: scan.skipped,
            environments,
            issues_closed,
            issues_missing,
            dry_run: self.dry_run,
        })
    }

    // -----------------------------------------------------------------------
    // Single-parameter update
    // -----------------------------------------------------------------------

    /// Update one existing parameter's default value. Absent keys are fatal;
    /// creation only happens through the sync workflow.
    pub fn set_parameter(
        &self,
        env_id: &EnvironmentId,
        key: &str,
        value: &str,
    ) -> Result<SetSummary, SyncError> {
        let env = self.config.environment(env_id)?;
        let token = self.remote.get_access_token()?;
        let (mut template, version) = self.remote.fetch(env, &token)?;
        template.update_parameter_value(key, value)?;

        let published = if self.dry_run {
            log::info!("[dry-run] would set '{key}' = '{value}' in '{env_id}'");
            false
        } else {
            self.remote.publish(env, &token, &template, &version)?;
            true
        };

        Ok(SetSummary {
            environment: env_id.to_string(),
            key: key.to_owned(),
            value: value.to_owned(),
            published,
            dry_run: self.dry_run,
        })
    }
}
