//! Sync Use Case
//!
//! Drives one pass over a destination tree:
//! 1. Load the state and resolve the provider and remote fingerprint
//! 2. Short-circuit when neither the fingerprint nor the arguments moved
//! 3. List and filter candidates, then classify each file (optionally in parallel)
//! 4. Drop records the remote no longer lists and refresh the archive
//! 5. Persist the state, then optionally validate and reap
//!
//! Customization detection lives in the classifier; this module only
//! performs the writes and record mutations it decides on.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::application::clean::{clean_destination, clean_tree, CleanReport};
use crate::domain::entities::{ArchiveRecord, GeneratedFile, StateDocument, TrackedFile};
use crate::domain::ports::{
    FileSystem, NoopEventSink, Provider, ProviderError, ProviderRegistry, StateRepository,
    SyncEvent, SyncEventSink,
};
use crate::domain::services::{
    classify, referenced_paths, ClassifyInput, Differ, EditScript, FileStatus, RecordChange,
};
use crate::domain::value_objects::managed_name::{
    copy_path, is_managed, is_safe_relative, is_temp_name, normalize_path, overlay_path,
};
use crate::domain::value_objects::{CancelToken, ContentHash, CopyFilter, Selection, SourceArgs};
use crate::error::{KeepsyncError, KeepsyncResult};
use crate::infrastructure::repositories::STATE_FILE_NAME;

use super::options::{RequestMode, SyncOptions};
use super::result::{FileFailure, FileOutcome, StatusReport, SyncReport};

/// Result of [`SyncUseCase::run`]
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Sync(SyncReport),
    Status(StatusReport),
    Clean(CleanReport),
}

/// One remote file selected for mirroring
#[derive(Debug, Clone)]
struct Candidate {
    remote: String,
    dest: String,
    ignored: bool,
}

/// What happened to one candidate
enum Processed {
    Done { outcome: FileOutcome, written: bool },
    Skipped,
}

/// Everything a worker needs for one pass
struct PassContext<'a> {
    root: &'a Path,
    args: &'a SourceArgs,
    provider: &'a dyn Provider,
    fingerprint: &'a str,
    state: &'a RwLock<StateDocument>,
    now: DateTime<Utc>,
}

pub struct SyncUseCase<SR, FS>
where
    SR: StateRepository,
    FS: FileSystem,
{
    state_repo: SR,
    fs: FS,
    registry: ProviderRegistry,
    events: Arc<dyn SyncEventSink>,
    cancel: CancelToken,
}

impl<SR, FS> SyncUseCase<SR, FS>
where
    SR: StateRepository,
    FS: FileSystem,
{
    pub fn new(state_repo: SR, fs: FS, registry: ProviderRegistry) -> Self {
        Self {
            state_repo,
            fs,
            registry,
            events: Arc::new(NoopEventSink),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn SyncEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Dispatch on the request mode
    pub fn run(&self, mode: RequestMode, options: &SyncOptions) -> KeepsyncResult<RunOutcome> {
        match mode {
            RequestMode::Sync => self.sync(options).map(RunOutcome::Sync),
            RequestMode::Force => {
                let forced = options.clone().with_force(true);
                self.sync(&forced).map(RunOutcome::Sync)
            }
            RequestMode::Clean => clean_destination(
                &self.state_repo,
                &self.fs,
                &options.destination,
                self.events.as_ref(),
            )
            .map(RunOutcome::Clean),
            RequestMode::LocalStatus => self.status(options, false).map(RunOutcome::Status),
            RequestMode::RemoteStatus => self.status(options, true).map(RunOutcome::Status),
        }
    }

    fn provider(&self, name: &str) -> KeepsyncResult<Arc<dyn Provider>> {
        self.registry
            .get(name)
            .ok_or_else(|| KeepsyncError::UnknownProvider {
                name: name.to_string(),
                available: self.registry.names().join(", "),
            })
    }

    /// Run a full sync pass
    #[tracing::instrument(skip_all, fields(destination = %options.destination.display()))]
    pub fn sync(&self, options: &SyncOptions) -> KeepsyncResult<SyncReport> {
        let root = options.destination.as_path();
        let args = &options.args;
        let state_path = root.join(STATE_FILE_NAME);

        // Pass-scoped failures abort before anything is written
        let doc = self.state_repo.load(&state_path)?;
        let provider = self.provider(&args.provider)?;
        let filter = CopyFilter::new(&args.copy_args)?;

        self.events.on_event(SyncEvent::Started {
            command: "sync",
            destination: root.display().to_string(),
            provider: provider.name().to_string(),
        });

        let fingerprint = provider.resolve_fingerprint(args, &self.cancel)?;
        let mut report = SyncReport {
            fingerprint: fingerprint.clone(),
            ..SyncReport::default()
        };

        if !options.force && doc.is_current(args, &fingerprint) {
            info!(%fingerprint, "already up to date");
            report.up_to_date = true;
            self.events.on_event(SyncEvent::UpToDate { fingerprint });
            if options.clean {
                report.clean = Some(clean_tree(&doc, &self.fs, root, self.events.as_ref())?);
            }
            self.emit_completed(&report);
            return Ok(report);
        }

        let candidates = self.candidates(provider.as_ref(), args, &filter)?;
        debug!(count = candidates.len(), "candidates selected");

        let state = RwLock::new(doc);
        let now = Utc::now();
        state.write().clear_warnings();

        let ctx = PassContext {
            root,
            args,
            provider: provider.as_ref(),
            fingerprint: &fingerprint,
            state: &state,
            now,
        };

        let results = self.process_all(&ctx, &candidates, options.concurrency)?;
        for (candidate, result) in candidates.iter().zip(results) {
            match result {
                Ok(Processed::Done { outcome, written }) => {
                    if written {
                        report.written.push(outcome.path.clone());
                    }
                    report.outcomes.push(outcome);
                }
                Ok(Processed::Skipped) => report.cancelled = true,
                Err(e) => report.errors.push(FileFailure {
                    path: candidate.dest.clone(),
                    error: e.to_string(),
                }),
            }
        }
        report.cancelled |= self.cancel.is_cancelled();

        if !report.cancelled {
            let mut doc = state.write();
            let listed: HashSet<&str> = candidates.iter().map(|c| c.dest.as_str()).collect();
            let stale: Vec<String> = doc
                .tracked_paths()
                .filter(|p| !listed.contains(p))
                .map(str::to_string)
                .collect();
            for path in stale {
                doc.remove_tracked(&path);
                debug!(%path, "record dropped");
                self.events.on_event(SyncEvent::FileRemoved { path: path.clone() });
                report.removed.push(path);
            }

            if let Err(e) = self.refresh_archive(&mut doc, &ctx, &mut report) {
                self.events.on_event(SyncEvent::FileError {
                    path: args.archive_args.archive_name().to_string(),
                    error: e.to_string(),
                });
                report.errors.push(FileFailure {
                    path: args.archive_args.archive_name().to_string(),
                    error: e.to_string(),
                });
            }
        }
        let mut doc = state.into_inner();

        // A pass with failures or a cancellation must not short-circuit the next one
        if !report.cancelled && report.errors.is_empty() {
            doc.set_commit_hash(fingerprint.as_str());
            doc.set_args(args.clone());
        } else {
            warn!(
                errors = report.errors.len(),
                cancelled = report.cancelled,
                "pass incomplete; fingerprint not recorded"
            );
        }
        doc.set_last_updated(now);
        self.state_repo.save(&doc, &state_path)?;

        if options.clean && !report.cancelled {
            report.clean = Some(clean_tree(&doc, &self.fs, root, self.events.as_ref())?);
        }

        info!(
            files = report.outcomes.len(),
            written = report.written.len(),
            removed = report.removed.len(),
            errors = report.errors.len(),
            "sync complete"
        );
        self.emit_completed(&report);
        Ok(report)
    }

    /// Classify tracked files against the disk without fetching.
    ///
    /// With `remote`, the provider is asked for the current fingerprint and
    /// the query fails with [`KeepsyncError::Stale`] if it moved.
    #[tracing::instrument(skip_all, fields(destination = %options.destination.display(), remote = remote))]
    pub fn status(&self, options: &SyncOptions, remote: bool) -> KeepsyncResult<StatusReport> {
        let root = options.destination.as_path();
        let args = &options.args;
        let doc = self.state_repo.load(&root.join(STATE_FILE_NAME))?;

        if remote {
            let provider = self.provider(&args.provider)?;
            let current = provider.resolve_fingerprint(args, &self.cancel)?;
            if !doc.is_current(args, &current) {
                return Err(KeepsyncError::Stale {
                    recorded: doc.commit_hash().to_string(),
                    current,
                });
            }
        }

        let mut report = StatusReport {
            stale: doc.args_fingerprint() != Some(args.fingerprint()),
            ..StatusReport::default()
        };

        for record in doc.tracked_files() {
            let path = record.path();
            if record.is_ignored() {
                report.outcomes.push(FileOutcome {
                    path: path.to_string(),
                    status: FileStatus::Ignored,
                    change_count: 0,
                });
                continue;
            }
            let classified = self
                .fs
                .read(&root.join(path))
                .map_err(KeepsyncError::from)
                .and_then(|on_disk| {
                    Ok(classify(ClassifyInput {
                        on_disk: on_disk.as_deref(),
                        record: Some(record),
                        incoming: None,
                        managed_name: is_managed(path),
                    })?)
                });
            match classified {
                Ok(classification) => {
                    let outcome = FileOutcome {
                        path: path.to_string(),
                        status: classification.status,
                        change_count: record.change_count(),
                    };
                    self.emit_classified(&outcome);
                    report.outcomes.push(outcome);
                }
                Err(e) => {
                    warn!(%path, error = %e, "status failed");
                    self.events.on_event(SyncEvent::FileError {
                        path: path.to_string(),
                        error: e.to_string(),
                    });
                    report.errors.push(FileFailure {
                        path: path.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let referenced = referenced_paths(&doc);
        for file in self.fs.list_files(root)? {
            let path = normalize_path(&file);
            if is_managed(&path)
                && !is_temp_name(&path)
                && !referenced.contains(&path)
                && doc.tracked(&path).is_none()
            {
                let outcome = FileOutcome {
                    path: path.clone(),
                    status: FileStatus::Untracked,
                    change_count: 0,
                };
                self.emit_classified(&outcome);
                report.outcomes.push(outcome);
                report.untracked.push(path);
            }
        }

        Ok(report)
    }

    fn candidates(
        &self,
        provider: &dyn Provider,
        args: &SourceArgs,
        filter: &CopyFilter,
    ) -> KeepsyncResult<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for remote in provider.list_files(args, &self.cancel)? {
            let ignored = match filter.select(&remote) {
                Selection::Skipped => continue,
                Selection::Mirrored => false,
                Selection::Ignored => true,
            };
            candidates.push(Candidate {
                dest: copy_path(&remote),
                remote,
                ignored,
            });
        }
        Ok(candidates)
    }

    fn process_all(
        &self,
        ctx: &PassContext<'_>,
        candidates: &[Candidate],
        concurrency: usize,
    ) -> KeepsyncResult<Vec<KeepsyncResult<Processed>>> {
        if concurrency <= 1 {
            return Ok(candidates.iter().map(|c| self.process(ctx, c)).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .build()
            .map_err(|e| KeepsyncError::Io(std::io::Error::other(e.to_string())))?;
        Ok(pool.install(|| {
            candidates
                .par_iter()
                .map(|c| self.process(ctx, c))
                .collect()
        }))
    }

    /// Fetch, classify, write, and record one candidate
    fn process(&self, ctx: &PassContext<'_>, candidate: &Candidate) -> KeepsyncResult<Processed> {
        if self.cancel.is_cancelled() {
            return Ok(Processed::Skipped);
        }

        let result = self.process_inner(ctx, candidate);
        match &result {
            Ok(Processed::Done { outcome, .. }) => self.emit_classified(outcome),
            Ok(Processed::Skipped) => {}
            Err(e) => {
                warn!(path = %candidate.dest, error = %e, "file failed");
                self.events.on_event(SyncEvent::FileError {
                    path: candidate.dest.clone(),
                    error: e.to_string(),
                });
            }
        }
        result
    }

    fn process_inner(
        &self,
        ctx: &PassContext<'_>,
        candidate: &Candidate,
    ) -> KeepsyncResult<Processed> {
        let dest = candidate.dest.as_str();
        if !is_safe_relative(dest) {
            return Err(KeepsyncError::PathEscape {
                path: dest.into(),
                root: ctx.root.to_path_buf(),
            });
        }

        let incoming = match ctx.provider.fetch(ctx.args, &candidate.remote, &self.cancel) {
            Ok(bytes) => Some(bytes),
            Err(ProviderError::Cancelled { .. }) => return Ok(Processed::Skipped),
            // Listed but gone by the time it was fetched
            Err(ProviderError::FileNotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        let permalink = ctx
            .provider
            .permalink(ctx.args, ctx.fingerprint, &candidate.remote);

        // Reads clone the record; the lock is never held across I/O
        let mut record = ctx.state.read().tracked(dest).cloned();

        if candidate.ignored {
            return Ok(match incoming {
                Some(content) => self.track_ignored(ctx, candidate, record, content, permalink),
                None => Processed::Done {
                    outcome: FileOutcome {
                        path: dest.to_string(),
                        status: FileStatus::Ignored,
                        change_count: 0,
                    },
                    written: false,
                },
            });
        }
        if record.as_ref().is_some_and(TrackedFile::is_ignored) {
            // No longer ignored: start over as an unseen file
            ctx.state.write().remove_tracked(dest);
            record = None;
        }

        let path = ctx.root.join(dest);
        let on_disk = self.fs.read(&path)?;
        let classification = classify(ClassifyInput {
            on_disk: on_disk.as_deref(),
            record: record.as_ref(),
            incoming: incoming.as_deref(),
            managed_name: is_managed(dest),
        })?;

        let written = match (&incoming, classification.write) {
            (Some(content), true) => {
                self.fs.write(&path, content)?;
                true
            }
            _ => false,
        };

        let change_count = classification.change_count();
        match classification.change {
            RecordChange::Keep => {}
            RecordChange::Touch => {
                if let Some(mut file) = record {
                    file.set_permalink(permalink);
                    file.touch(ctx.now);
                    ctx.state.write().upsert_tracked(file);
                }
            }
            RecordChange::Track { remote_hash, delta } => {
                let mut file = record
                    .unwrap_or_else(|| TrackedFile::new(dest, &candidate.remote, ctx.now));
                file.set_source(&candidate.remote);
                file.set_permalink(permalink);
                file.set_remote_hash(remote_hash);
                file.touch(ctx.now);
                let has_delta = !delta.is_empty();
                file.set_delta(delta);
                ctx.state.write().upsert_tracked(file);

                if has_delta {
                    if let Some(incoming) = &incoming {
                        self.write_overlay(ctx.root, dest, incoming, on_disk.as_deref())?;
                    }
                }
            }
        }

        Ok(Processed::Done {
            outcome: FileOutcome {
                path: dest.to_string(),
                status: classification.status,
                change_count,
            },
            written,
        })
    }

    /// Keep an ignored file's content in the blob store instead of the tree
    fn track_ignored(
        &self,
        ctx: &PassContext<'_>,
        candidate: &Candidate,
        record: Option<TrackedFile>,
        content: Vec<u8>,
        permalink: String,
    ) -> Processed {
        let dest = candidate.dest.as_str();
        let mut file = record
            .filter(TrackedFile::is_ignored)
            .unwrap_or_else(|| TrackedFile::new(dest, &candidate.remote, ctx.now));
        file.set_ignored(true);
        file.set_source(&candidate.remote);
        file.set_permalink(permalink);
        file.set_remote_hash(ContentHash::from_bytes(&content));
        file.set_delta(EditScript::empty());
        file.touch(ctx.now);

        let mut state = ctx.state.write();
        state.upsert_tracked(file);
        state.set_blob(dest, content);

        Processed::Done {
            outcome: FileOutcome {
                path: dest.to_string(),
                status: FileStatus::Ignored,
                change_count: 0,
            },
            written: false,
        }
    }

    /// Write the human-readable overlay (remote to local) if its content changed
    fn write_overlay(
        &self,
        root: &Path,
        dest: &str,
        remote: &[u8],
        local: Option<&[u8]>,
    ) -> KeepsyncResult<()> {
        let Some(overlay) = overlay_path(dest) else {
            return Ok(());
        };
        let text = Differ::new().unified(
            remote,
            local.unwrap_or_default(),
            &format!("remote/{dest}"),
            &format!("local/{dest}"),
        );
        let path = root.join(&overlay);
        if self.fs.read(&path)?.as_deref() != Some(text.as_bytes()) {
            debug!(%overlay, "writing overlay");
            self.fs.write(&path, text.as_bytes())?;
        }
        Ok(())
    }

    /// Refresh (or drop) the archive snapshot and its checksum sidecar
    fn refresh_archive(
        &self,
        doc: &mut StateDocument,
        ctx: &PassContext<'_>,
        report: &mut SyncReport,
    ) -> KeepsyncResult<()> {
        let archive_args = &ctx.args.archive_args;
        if !archive_args.enabled {
            doc.clear_archives();
            return Ok(());
        }

        let name = archive_args.archive_name();
        let archive_path = format!("{name}.copy.tar.gz");
        let sidecar_path = format!("{name}.copy.sha256");

        let fetched = ctx
            .provider
            .archive_locator(ctx.args, ctx.fingerprint)
            .and_then(|locator| {
                ctx.provider
                    .fetch_archive(ctx.args, ctx.fingerprint, &self.cancel)
                    .map(|bytes| (locator, bytes))
            });
        let (locator, bytes) = match fetched {
            Ok(found) => found,
            Err(e @ ProviderError::Unsupported { .. }) => {
                info!(error = %e, "archive skipped");
                doc.add_warning(e.to_string());
                doc.clear_archives();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let hash = ContentHash::from_bytes(&bytes);
        let absolute = ctx.root.join(&archive_path);
        let current = self.fs.read(&absolute)?;
        if current.as_deref().map(ContentHash::from_bytes).as_ref() != Some(&hash) {
            self.fs.write(&absolute, &bytes)?;
            report.written.push(archive_path.clone());
        }

        let sidecar = format!("{}  {}\n", hash.hex(), archive_file_name(&archive_path));
        let sidecar_abs = ctx.root.join(&sidecar_path);
        if self.fs.read(&sidecar_abs)?.as_deref() != Some(sidecar.as_bytes()) {
            self.fs.write(&sidecar_abs, sidecar.as_bytes())?;
            report.written.push(sidecar_path.clone());
        }

        doc.clear_archives();
        doc.upsert_archive(ArchiveRecord::new(&archive_path, hash, locator, ctx.now));
        doc.upsert_generated(GeneratedFile::new(sidecar_path, archive_path, ctx.now));
        Ok(())
    }

    fn emit_classified(&self, outcome: &FileOutcome) {
        self.events.on_event(SyncEvent::FileClassified {
            path: outcome.path.clone(),
            status: outcome.status,
            change_count: outcome.change_count,
        });
    }

    fn emit_completed(&self, report: &SyncReport) {
        self.events.on_event(SyncEvent::Completed {
            command: "sync",
            written: report.written.len(),
            removed: report.removed.len(),
            deleted: report.clean.as_ref().map_or(0, |c| c.deleted.len()),
            errors: report.errors.len(),
        });
    }
}

fn archive_file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
