/// Tournament lifecycle management
///
/// Tournaments live entirely in memory. Status is never mutated by a
/// background job: reads fold the stored status against the clock, so an
/// expired tournament presents as completed the moment its end date passes.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::ApiError;
use crate::core::{Address, Tournament, TournamentStatus};

/// Participant cap applied when a creator does not set one
pub const DEFAULT_MAX_PARTICIPANTS: usize = 100;

/// Validated tournament creation parameters
#[derive(Debug, Clone)]
pub struct TournamentSpec {
    pub name: String,
    pub description: String,
    pub duration_hours: u64,
    pub prize: String,
    pub max_participants: usize,
    pub rules: Vec<String>,
}

/// Result of a successful join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinOutcome {
    pub participants: usize,
    pub max_participants: usize,
}

#[derive(Default)]
struct BookState {
    items: HashMap<u64, Tournament>,
    /// Creation order, drives listing order
    order: Vec<u64>,
}

pub struct TournamentBook {
    state: RwLock<BookState>,
    next_id: AtomicU64,
}

impl TournamentBook {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BookState::default()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn create(&self, spec: TournamentSpec) -> Tournament {
        self.create_at(spec, Utc::now())
    }

    pub fn create_at(&self, spec: TournamentSpec, now: DateTime<Utc>) -> Tournament {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let tournament = Tournament {
            id,
            name: spec.name,
            description: spec.description,
            duration_hours: spec.duration_hours,
            prize: spec.prize,
            rules: spec.rules,
            max_participants: spec.max_participants,
            start_date: now,
            end_date: now + Duration::hours(spec.duration_hours as i64),
            participants: Vec::new(),
            status: TournamentStatus::Active,
            created_at: now,
        };

        let mut state = self.state.write().unwrap();
        state.order.push(id);
        state.items.insert(id, tournament.clone());
        info!(
            tournament_id = id,
            name = %tournament.name,
            duration_hours = tournament.duration_hours,
            "🎯 Tournament created"
        );
        tournament
    }

    /// List tournaments in creation order, optionally filtered by status.
    ///
    /// The filter is matched against the folded status string; an unknown
    /// filter value matches nothing.
    pub fn list(&self, status_filter: Option<&str>) -> Vec<Tournament> {
        self.list_at(status_filter, Utc::now())
    }

    pub fn list_at(&self, status_filter: Option<&str>, now: DateTime<Utc>) -> Vec<Tournament> {
        let state = self.state.read().unwrap();
        state
            .order
            .iter()
            .filter_map(|id| state.items.get(id))
            .map(|t| {
                let mut folded = t.clone();
                folded.status = fold_status(t, now);
                folded
            })
            .filter(|t| match status_filter {
                None => true,
                Some(want) => t.status.as_str() == want,
            })
            .collect()
    }

    pub fn join(&self, id: u64, wallet: &Address) -> Result<JoinOutcome, ApiError> {
        self.join_at(id, wallet, Utc::now())
    }

    pub fn join_at(
        &self,
        id: u64,
        wallet: &Address,
        now: DateTime<Utc>,
    ) -> Result<JoinOutcome, ApiError> {
        let mut state = self.state.write().unwrap();
        let tournament = state.items.get_mut(&id).ok_or(ApiError::TournamentNotFound)?;

        if fold_status(tournament, now) != TournamentStatus::Active {
            return Err(ApiError::TournamentInactive);
        }
        if tournament.participants.contains(wallet) {
            return Err(ApiError::AlreadyJoined);
        }
        if tournament.participants.len() >= tournament.max_participants {
            return Err(ApiError::TournamentFull);
        }

        tournament.participants.push(wallet.clone());
        info!(
            tournament_id = id,
            wallet = %wallet,
            participants = tournament.participants.len(),
            "🎯 Wallet joined tournament"
        );
        Ok(JoinOutcome {
            participants: tournament.participants.len(),
            max_participants: tournament.max_participants,
        })
    }

    pub fn count(&self) -> usize {
        self.state.read().unwrap().items.len()
    }
}

impl Default for TournamentBook {
    fn default() -> Self {
        Self::new()
    }
}

fn fold_status(t: &Tournament, now: DateTime<Utc>) -> TournamentStatus {
    match t.status {
        TournamentStatus::Completed => TournamentStatus::Completed,
        _ if now >= t.end_date => TournamentStatus::Completed,
        TournamentStatus::Upcoming if now >= t.start_date => TournamentStatus::Active,
        s => s,
    }
}
