use parking_lot::RwLock;
use sched_core::{GenerateRequest, GenerateResult, Generator};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status")]
pub enum JobStatus {
    Queued,
    Running,
    Done { result: GenerateResult },
    Failed { message: String },
}

/// Finished jobs kept for status lookups before the oldest are dropped.
pub const DEFAULT_RETAINED_JOBS: usize = 256;

/// The schedule currently in force, together with the configuration it was
/// generated from so it can be re-rendered per teacher.
#[derive(Clone, Debug)]
pub struct LatestSchedule {
    pub job: JobId,
    pub request: GenerateRequest,
    pub result: GenerateResult,
    /// Enqueue order of the job that produced it.
    pub seq: u64,
}

struct Entry {
    seq: u64,
    status: JobStatus,
}

impl Entry {
    fn finished(&self) -> bool {
        matches!(self.status, JobStatus::Done { .. } | JobStatus::Failed { .. })
    }
}

pub struct InMemJobs<G: Generator> {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    latest: Arc<RwLock<Option<LatestSchedule>>>,
    next_seq: Arc<AtomicU64>,
    retained: usize,
    generator: Arc<G>,
}

impl<G: Generator> Clone for InMemJobs<G> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            latest: self.latest.clone(),
            next_seq: self.next_seq.clone(),
            retained: self.retained,
            generator: self.generator.clone(),
        }
    }
}

impl<G: Generator> InMemJobs<G> {
    pub fn new(generator: G) -> Self {
        Self {
            inner: Default::default(),
            latest: Default::default(),
            next_seq: Default::default(),
            retained: DEFAULT_RETAINED_JOBS,
            generator: Arc::new(generator),
        }
    }

    pub fn with_retention(mut self, retained: usize) -> Self {
        self.retained = retained;
        self
    }

    /// Starts a generation in the background. A successful run replaces the
    /// latest schedule unless a job enqueued after it has already done so.
    pub fn enqueue(&self, req: GenerateRequest) -> JobId {
        let id = Uuid::new_v4().to_string();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.inner.write().insert(
            id.clone(),
            Entry {
                seq,
                status: JobStatus::Queued,
            },
        );

        let jobs = self.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            jobs.set(&id_for_task, seq, JobStatus::Running);
            match jobs.generator.generate(req.clone()).await {
                Ok(res) => {
                    info!(job = %id_for_task, seq, placed = res.fill.placed, requested = res.fill.requested, "job done");
                    jobs.offer_latest(LatestSchedule {
                        job: JobId(id_for_task.clone()),
                        request: req,
                        result: res.clone(),
                        seq,
                    });
                    jobs.set(&id_for_task, seq, JobStatus::Done { result: res });
                }
                Err(e) => {
                    error!(?e, job = %id_for_task, "job failed");
                    jobs.set(
                        &id_for_task,
                        seq,
                        JobStatus::Failed {
                            message: e.to_string(),
                        },
                    );
                }
            }
            jobs.prune();
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).map(|e| e.status.clone())
    }

    pub fn latest(&self) -> Option<LatestSchedule> {
        self.latest.read().clone()
    }

    fn set(&self, id: &str, seq: u64, status: JobStatus) {
        self.inner.write().insert(id.to_string(), Entry { seq, status });
    }

    fn offer_latest(&self, candidate: LatestSchedule) {
        let mut latest = self.latest.write();
        if latest.as_ref().map_or(true, |cur| cur.seq < candidate.seq) {
            *latest = Some(candidate);
        } else {
            debug!(seq = candidate.seq, "stale result kept out of latest schedule");
        }
    }

    /// Drops the oldest finished jobs beyond the retention limit. Queued and
    /// running jobs are never dropped.
    fn prune(&self) {
        let mut map = self.inner.write();
        let mut finished: Vec<(u64, String)> = map
            .iter()
            .filter(|(_, e)| e.finished())
            .map(|(id, e)| (e.seq, id.clone()))
            .collect();
        if finished.len() <= self.retained {
            return;
        }
        finished.sort_unstable();
        let excess = finished.len() - self.retained;
        for (_, id) in finished.into_iter().take(excess) {
            map.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use solver_greedy::GreedyGenerator;
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicBool;
    use types::{FillReport, GradeSections, SchoolConfig, Subject, Teacher};

    struct Broken;

    #[async_trait]
    impl Generator for Broken {
        async fn generate(&self, _req: GenerateRequest) -> anyhow::Result<GenerateResult> {
            anyhow::bail!("generator unavailable")
        }
    }

    /// Holds seed 1 until the gate opens; any other seed finishes at once.
    struct Gated {
        open: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Generator for Gated {
        async fn generate(&self, req: GenerateRequest) -> anyhow::Result<GenerateResult> {
            let seed = req.params.seed.unwrap_or_default();
            if seed == 1 {
                while !self.open.load(Ordering::SeqCst) {
                    tokio::task::yield_now().await;
                }
            }
            Ok(GenerateResult {
                classes: BTreeMap::new(),
                fill: FillReport {
                    placed: seed as u32,
                    ..Default::default()
                },
                stats: Default::default(),
            })
        }
    }

    fn request(seed: u64) -> GenerateRequest {
        GenerateRequest {
            school: SchoolConfig {
                daily_lessons: 4,
                grades: vec![GradeSections {
                    grade: "5".into(),
                    sections: vec!["A".into()],
                }],
            },
            subjects: vec![Subject {
                id: "mat".into(),
                name: "Matematik".into(),
                weekly_hours_by_grade: BTreeMap::from([("5".into(), 5)]),
                rule: None,
                color: None,
            }],
            teachers: vec![Teacher {
                id: "t1".into(),
                subject_ids: vec!["mat".into()],
                ..Default::default()
            }],
            assignments: Default::default(),
            params: types::GenerateParams { seed: Some(seed) },
        }
    }

    async fn wait<G: Generator>(jobs: &InMemJobs<G>, id: &JobId) -> JobStatus {
        for _ in 0..10_000 {
            match jobs.get(&id.0) {
                Some(JobStatus::Queued) | Some(JobStatus::Running) | None => {
                    tokio::task::yield_now().await
                }
                Some(done) => return done,
            }
        }
        panic!("job {} did not finish", id.0);
    }

    #[tokio::test]
    async fn finished_job_becomes_latest_schedule() {
        let jobs = InMemJobs::new(GreedyGenerator::new());
        assert!(jobs.latest().is_none());

        let id = jobs.enqueue(request(1));
        match wait(&jobs, &id).await {
            JobStatus::Done { result } => assert_eq!(result.fill.placed, 5),
            other => panic!("unexpected status {other:?}"),
        }
        assert_eq!(jobs.latest().unwrap().job.0, id.0);

        let second = jobs.enqueue(request(2));
        wait(&jobs, &second).await;
        assert_eq!(jobs.latest().unwrap().job.0, second.0);
    }

    #[tokio::test]
    async fn failure_is_recorded_and_keeps_previous_schedule() {
        let jobs = InMemJobs::new(Broken);
        let id = jobs.enqueue(request(1));
        match wait(&jobs, &id).await {
            JobStatus::Failed { message } => assert_eq!(message, "generator unavailable"),
            other => panic!("unexpected status {other:?}"),
        }
        assert!(jobs.latest().is_none());
        assert!(jobs.get("missing").is_none());
    }

    #[tokio::test]
    async fn late_finish_of_older_job_does_not_replace_newer_schedule() {
        let open = Arc::new(AtomicBool::new(false));
        let jobs = InMemJobs::new(Gated { open: open.clone() });

        let older = jobs.enqueue(request(1));
        let newer = jobs.enqueue(request(2));
        wait(&jobs, &newer).await;
        assert_eq!(jobs.latest().unwrap().job.0, newer.0);

        open.store(true, Ordering::SeqCst);
        assert!(matches!(wait(&jobs, &older).await, JobStatus::Done { .. }));
        let latest = jobs.latest().unwrap();
        assert_eq!(latest.job.0, newer.0);
        assert_eq!(latest.result.fill.placed, 2);
    }

    #[tokio::test]
    async fn oldest_finished_jobs_are_dropped_beyond_retention() {
        let jobs = InMemJobs::new(Broken).with_retention(2);
        let mut ids = Vec::new();
        for seed in 0..4 {
            let id = jobs.enqueue(request(seed));
            wait(&jobs, &id).await;
            ids.push(id);
        }
        assert!(jobs.get(&ids[0].0).is_none());
        assert!(jobs.get(&ids[1].0).is_none());
        assert!(jobs.get(&ids[2].0).is_some());
        assert!(jobs.get(&ids[3].0).is_some());
    }
}
