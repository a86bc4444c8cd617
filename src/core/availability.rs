use crate::core::candidates::{build_candidates, normalize};
use crate::domain::model::{DomainCandidate, DomainSuggestion};
use crate::domain::ports::DomainChecker;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// 解析器生命週期狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverPhase {
    Idle,
    Debouncing,
    Checking,
    Settled,
}

/// 單一防抖週期發布的聚合結果;新週期整批取代,不做合併
#[derive(Debug, Clone)]
pub struct ResolverSnapshot {
    pub phase: ResolverPhase,
    pub items: Vec<DomainSuggestion>,
    pub error: Option<String>,
    pub cycle: u64,
}

impl ResolverSnapshot {
    fn idle() -> Self {
        Self {
            phase: ResolverPhase::Idle,
            items: Vec::new(),
            error: None,
            cycle: 0,
        }
    }
}

struct ResolverInner {
    checker: Arc<dyn DomainChecker>,
    suffixes: Vec<String>,
    debounce: Duration,
    cycle: AtomicU64,
    closed: AtomicBool,
    snapshot: Mutex<ResolverSnapshot>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// 防抖 + 扇出/扇入的域名可用性解析器
///
/// 每次關鍵字變更都會使前一週期的計時器失效;週期權杖(cycle token)
/// 確保遲到的結果永遠不會覆蓋較新週期的狀態。
pub struct AvailabilityResolver {
    inner: Arc<ResolverInner>,
}

impl AvailabilityResolver {
    pub fn new(
        checker: Arc<dyn DomainChecker>,
        suffixes: Vec<String>,
        debounce: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                checker,
                suffixes,
                debounce,
                cycle: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                snapshot: Mutex::new(ResolverSnapshot::idle()),
                timer: Mutex::new(None),
            }),
        }
    }

    /// 使用者輸入變更:取消待觸發的計時器並開啟新週期
    ///
    /// 空關鍵字直接進入 Settled 且不產生任何網路活動。
    pub async fn keyword_changed(&self, raw: &str) {
        let inner = &self.inner;
        let cycle = inner.cycle.fetch_add(1, Ordering::SeqCst) + 1;

        // 單一持有者計時器:啟動新計時器前一定先取消舊的
        if let Some(handle) = inner.timer.lock().await.take() {
            handle.abort();
        }

        let keyword = normalize(raw);
        if keyword.is_empty() {
            let mut snapshot = inner.snapshot.lock().await;
            *snapshot = ResolverSnapshot {
                phase: ResolverPhase::Settled,
                items: Vec::new(),
                error: None,
                cycle,
            };
            return;
        }

        {
            let mut snapshot = inner.snapshot.lock().await;
            snapshot.phase = ResolverPhase::Debouncing;
            snapshot.cycle = cycle;
        }

        let task_inner = Arc::clone(inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(task_inner.debounce).await;
            task_inner.run_cycle(keyword, cycle).await;
        });
        *inner.timer.lock().await = Some(handle);
    }

    /// 對候選清單並行發出獨立檢查,全部完成後才聚合
    pub async fn check_candidates(
        &self,
        candidates: &[DomainCandidate],
    ) -> (Vec<DomainSuggestion>, Option<String>) {
        self.inner.check_candidates(candidates).await
    }

    pub async fn snapshot(&self) -> ResolverSnapshot {
        self.inner.snapshot.lock().await.clone()
    }

    /// 拆卸:取消待觸發的計時器並抑制其後的任何狀態發布
    pub async fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        if let Some(handle) = self.inner.timer.lock().await.take() {
            handle.abort();
        }
    }
}

impl ResolverInner {
    /// 防抖到期後的檢查週期:扇出、扇入、帶停滯防護地發布
    async fn run_cycle(&self, keyword: String, cycle: u64) {
        if self.is_stale(cycle) {
            return;
        }

        {
            let mut snapshot = self.snapshot.lock().await;
            snapshot.phase = ResolverPhase::Checking;
        }

        let candidates = build_candidates(&keyword, &self.suffixes);
        tracing::debug!(
            "📡 Checking {} candidates for keyword '{}'",
            candidates.len(),
            keyword
        );

        let (items, error) = self.check_candidates(&candidates).await;

        // 週期在飛行途中被取代:丟棄結果,不發布;
        // 權杖在持有快照鎖的情況下重驗,發布與驗證不可分割
        let mut snapshot = self.snapshot.lock().await;
        if self.is_stale(cycle) {
            tracing::debug!("Discarding stale results for keyword '{}'", keyword);
            return;
        }

        *snapshot = ResolverSnapshot {
            phase: ResolverPhase::Settled,
            items,
            error,
            cycle,
        };
    }

    /// 單一候選失敗只被排除;全數失敗時以第一個失敗訊息作為代表錯誤
    async fn check_candidates(
        &self,
        candidates: &[DomainCandidate],
    ) -> (Vec<DomainSuggestion>, Option<String>) {
        let tasks = candidates.iter().map(|candidate| {
            let checker = Arc::clone(&self.checker);
            let domain = candidate.domain.clone();
            tokio::spawn(async move { checker.check(&domain).await })
        });

        let results = join_all(tasks).await;

        let mut items = Vec::new();
        let mut first_error: Option<String> = None;
        for result in results {
            match result {
                Ok(Ok(item)) => items.push(item),
                Ok(Err(e)) => {
                    tracing::warn!("Domain check failed: {}", e);
                    if first_error.is_none() {
                        first_error = Some(e.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!("Domain check task aborted: {}", e);
                    if first_error.is_none() {
                        first_error = Some(e.to_string());
                    }
                }
            }
        }

        // 至少一個成功就靜默丟棄失敗者;全數失敗才回報錯誤
        if items.is_empty() {
            (Vec::new(), first_error)
        } else {
            (items, None)
        }
    }

    fn is_stale(&self, cycle: u64) -> bool {
        self.closed.load(Ordering::SeqCst) || self.cycle.load(Ordering::SeqCst) != cycle
    }
}
