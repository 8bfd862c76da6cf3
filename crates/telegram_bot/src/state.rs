use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

use ledger::{Amount, ExpenseField, ExpenseKind, StatsScope, UserId};

/// How long an unfinished flow survives between messages.
const SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Where the conversation with one user currently stands.
///
/// Everything collected so far travels inside the variant, so an expired or
/// dropped session loses at most one unfinished expense.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DialogState {
    #[default]
    Idle,
    AwaitCategory,
    AwaitAmount {
        category: String,
    },
    AwaitKind {
        category: String,
        amount: Amount,
    },
    AwaitComment {
        category: String,
        amount: Amount,
        kind: ExpenseKind,
    },
    AwaitStatsPeriod {
        scope: StatsScope,
    },
    EditSelectField {
        expense_id: Uuid,
    },
    EditEnterValue {
        expense_id: Uuid,
        field: ExpenseField,
    },
}

#[derive(Clone, Debug)]
struct Session {
    state: DialogState,
    touched: Instant,
}

/// Per-user dialog state with idle expiry.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<UserId, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(SESSION_TTL)
    }

    /// A store whose sessions expire after `ttl`; tests use short values.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Current state for `user`; expired sessions read as [`DialogState::Idle`].
    pub async fn state(&self, user: UserId) -> DialogState {
        let mut guard = self.inner.lock().await;
        match guard.get(&user) {
            Some(session) if session.touched.elapsed() < self.ttl => session.state.clone(),
            Some(_) => {
                guard.remove(&user);
                DialogState::Idle
            }
            None => DialogState::Idle,
        }
    }

    pub async fn set(&self, user: UserId, state: DialogState) {
        let mut guard = self.inner.lock().await;
        if state == DialogState::Idle {
            guard.remove(&user);
            return;
        }
        guard.insert(
            user,
            Session {
                state,
                touched: Instant::now(),
            },
        );
    }
}
