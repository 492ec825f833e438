use {
    crate::config::DF,
    std::{
        sync::Arc,
        time::{Duration, SystemTime, UNIX_EPOCH},
    },
    tokio::sync::Mutex,
};

/// Shared per-minute request-weight budget. Clones share the same budget.
#[derive(Clone)]
pub struct GlobalRateLimiter {
    inner: Arc<Mutex<InnerLimiter>>,
}

struct InnerLimiter {
    used_weight: u32,
    // Wall-clock minute we are counting for (minutes since epoch)
    current_minute_idx: u64,
    limit: u32,
}

impl GlobalRateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InnerLimiter {
                used_weight: 0,
                current_minute_idx: Self::get_current_minute_idx(),
                limit,
            })),
        }
    }

    /// Waits until `cost` weight fits in the current minute, then spends it.
    pub async fn acquire(&self, cost: u32, context: &str) {
        loop {
            let (wait_duration, used, limit) = {
                let mut guard = self.inner.lock().await;
                let now_idx = Self::get_current_minute_idx();

                // 1. New minute resets the budget
                if now_idx > guard.current_minute_idx {
                    guard.used_weight = 0;
                    guard.current_minute_idx = now_idx;
                }

                // 2. Capacity
                if guard.used_weight + cost <= guard.limit {
                    guard.used_weight += cost;
                    return;
                }

                // 3. Wait until the next :00 (plus a small buffer)
                let now_secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or(Duration::ZERO)
                    .as_secs();
                let wait_secs = 60 - now_secs % 60;
                let wait = Duration::from_secs(wait_secs) + Duration::from_millis(100);

                (wait, guard.used_weight, guard.limit)
            };

            if DF.log_rate_limiter {
                log::warn!(
                    "🛑 Rate Limit Saturated for [{}]. Used: {}/{}. Waiting {:.1}s (until :00)...",
                    context,
                    used,
                    limit,
                    wait_duration.as_secs_f64()
                );
            }

            tokio::time::sleep(wait_duration).await;
        }
    }

    /// Weight spent so far in the current minute.
    pub async fn used_weight(&self) -> u32 {
        self.inner.lock().await.used_weight
    }

    fn get_current_minute_idx() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
            / 60
    }
}
