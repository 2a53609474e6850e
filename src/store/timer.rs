/// Timer run state and session history.
use std::rc::Rc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::ValidationError;
use crate::storage::{self, KeyValueStore, SESSIONS_KEY, TIMER_STATE_KEY};
use crate::types::{DraftSession, Session, new_id};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum TimerState {
    #[default]
    Idle,
    Running {
        draft: DraftSession,
        segment_start: DateTime<Local>,
    },
    Paused {
        draft: DraftSession,
    },
}

impl TimerState {
    pub fn draft(&self) -> Option<&DraftSession> {
        match self {
            TimerState::Idle => None,
            TimerState::Running { draft, .. } | TimerState::Paused { draft } => Some(draft),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running { .. } => "running",
            TimerState::Paused { .. } => "paused",
        }
    }
}

pub struct TimerStore {
    kv: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    state: TimerState,
    sessions: Vec<Session>,
    elapsed_seconds: i64,
}

impl TimerStore {
    /// Restores history and any unfinished run. A run that was in progress when the
    /// process exited keeps going, its elapsed time recomputed from the stored start.
    pub fn load(kv: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        let sessions: Vec<Session> = storage::load(kv.as_ref(), SESSIONS_KEY).unwrap_or_default();
        let state: TimerState = storage::load(kv.as_ref(), TIMER_STATE_KEY).unwrap_or_default();
        if let Some(draft) = state.draft() {
            info!(
                project_id = %draft.project_id,
                started = %draft.start_time.to_rfc3339(),
                status = state.label(),
                "restoring unfinished run"
            );
        }
        let mut store = Self {
            kv,
            clock,
            state,
            sessions,
            elapsed_seconds: 0,
        };
        store.refresh_elapsed();
        store
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, TimerState::Paused { .. })
    }

    pub fn draft(&self) -> Option<&DraftSession> {
        self.state.draft()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Last value computed by `refresh_elapsed`.
    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed_seconds
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Begins a run against `project_id`. Returns `Ok(false)` when a run is already active.
    pub fn start(&mut self, project_id: &str) -> Result<bool, ValidationError> {
        if project_id.trim().is_empty() {
            return Err(ValidationError::NoProjectSelected);
        }
        if self.state != TimerState::Idle {
            return Ok(false);
        }
        let now = self.clock.now();
        let draft = DraftSession {
            id: new_id(),
            project_id: project_id.to_string(),
            start_time: now,
            accumulated_seconds: 0,
        };
        info!(project_id, session_id = %draft.id, "timer started");
        self.state = TimerState::Running {
            draft,
            segment_start: now,
        };
        self.elapsed_seconds = 0;
        self.persist_state();
        Ok(true)
    }

    /// Finalizes the running draft into the history. Only valid while running.
    pub fn stop(&mut self) -> Option<Session> {
        let TimerState::Running {
            draft,
            segment_start,
        } = &self.state
        else {
            return None;
        };
        let now = self.clock.now();
        let duration = draft.accumulated_seconds + segment_seconds(*segment_start, now);
        let session = Session {
            id: draft.id.clone(),
            project_id: draft.project_id.clone(),
            start_time: draft.start_time,
            end_time: now.max(draft.start_time),
            duration,
        };
        info!(
            session_id = %session.id,
            project_id = %session.project_id,
            duration,
            "timer stopped"
        );
        self.sessions.push(session.clone());
        self.state = TimerState::Idle;
        self.elapsed_seconds = 0;
        self.persist_sessions();
        self.persist_state();
        Some(session)
    }

    /// Freezes the run without finalizing it.
    pub fn pause(&mut self) -> bool {
        let TimerState::Running {
            draft,
            segment_start,
        } = &self.state
        else {
            return false;
        };
        let mut draft = draft.clone();
        draft.accumulated_seconds += segment_seconds(*segment_start, self.clock.now());
        info!(session_id = %draft.id, banked = draft.accumulated_seconds, "timer paused");
        self.elapsed_seconds = draft.accumulated_seconds;
        self.state = TimerState::Paused { draft };
        self.persist_state();
        true
    }

    pub fn resume(&mut self) -> bool {
        let TimerState::Paused { draft } = &self.state else {
            return false;
        };
        let draft = draft.clone();
        info!(session_id = %draft.id, "timer resumed");
        self.state = TimerState::Running {
            draft,
            segment_start: self.clock.now(),
        };
        self.refresh_elapsed();
        self.persist_state();
        true
    }

    /// Discards any unfinished run. Returns whether there was one.
    pub fn reset(&mut self) -> bool {
        self.elapsed_seconds = 0;
        if self.state == TimerState::Idle {
            return false;
        }
        if let Some(draft) = self.state.draft() {
            info!(session_id = %draft.id, "timer reset, draft discarded");
        }
        self.state = TimerState::Idle;
        self.persist_state();
        true
    }

    pub fn clear_all_sessions(&mut self) {
        let removed = self.sessions.len();
        self.sessions.clear();
        self.reset();
        storage::remove(self.kv.as_ref(), SESSIONS_KEY);
        storage::remove(self.kv.as_ref(), TIMER_STATE_KEY);
        info!(removed, "session history cleared");
    }

    /// Recomputes the elapsed display from the stored start time. Only a running timer
    /// moves; a stale tick after stop or reset reads the idle state and yields zero.
    pub fn refresh_elapsed(&mut self) -> i64 {
        self.elapsed_seconds = match &self.state {
            TimerState::Idle => 0,
            TimerState::Paused { draft } => draft.accumulated_seconds,
            TimerState::Running {
                draft,
                segment_start,
            } => draft.accumulated_seconds + segment_seconds(*segment_start, self.clock.now()),
        };
        self.elapsed_seconds
    }

    /// History ordered most recent first.
    pub fn recent_sessions(&self, limit: usize) -> Vec<&Session> {
        let mut sessions: Vec<&Session> = self.sessions.iter().collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sessions.truncate(limit);
        sessions
    }

    /// Appends sessions whose ids are not known yet. Returns how many were added.
    pub fn merge_sessions(&mut self, incoming: Vec<Session>) -> usize {
        let before = self.sessions.len();
        for session in incoming {
            if session.end_time < session.start_time || session.duration < 0 {
                warn!(session_id = %session.id, "skipping session with inverted times");
                continue;
            }
            if !self.sessions.iter().any(|known| known.id == session.id) {
                self.sessions.push(session);
            }
        }
        let added = self.sessions.len() - before;
        if added > 0 {
            self.persist_sessions();
        }
        added
    }

    fn persist_sessions(&self) {
        storage::save(self.kv.as_ref(), SESSIONS_KEY, &self.sessions);
    }

    fn persist_state(&self) {
        storage::save(self.kv.as_ref(), TIMER_STATE_KEY, &self.state);
    }
}

fn segment_seconds(segment_start: DateTime<Local>, now: DateTime<Local>) -> i64 {
    now.signed_duration_since(segment_start).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::testing::ReadOnlyStore;

    fn setup() -> (Rc<dyn KeyValueStore>, Rc<ManualClock>, TimerStore) {
        let kv: Rc<dyn KeyValueStore> = Rc::new(storage::open_in_memory().unwrap());
        let clock = Rc::new(ManualClock::at(2026, 3, 4, 9, 0));
        let store = TimerStore::load(kv.clone(), clock.clone());
        (kv, clock, store)
    }

    #[test]
    fn start_then_stop_records_one_session() {
        let (_, _, mut timer) = setup();
        assert!(timer.start("p1").unwrap());
        let session = timer.stop().unwrap();
        assert_eq!(timer.sessions().len(), 1);
        assert_eq!(session.duration, 0);
        assert!(session.end_time >= session.start_time);
        assert_eq!(timer.state(), &TimerState::Idle);
    }

    #[test]
    fn an_hour_of_work_is_3600_seconds() {
        let (_, clock, mut timer) = setup();
        timer.start("website").unwrap();
        clock.advance(3600);
        let session = timer.stop().unwrap();
        assert_eq!(session.duration, 3600);
        assert_eq!(session.project_id, "website");
        assert_eq!((session.end_time - session.start_time).num_seconds(), 3600);
    }

    #[test]
    fn stop_without_start_is_a_noop() {
        let (_, _, mut timer) = setup();
        assert!(timer.stop().is_none());
        assert!(timer.sessions().is_empty());
    }

    #[test]
    fn start_requires_a_project() {
        let (_, _, mut timer) = setup();
        assert_eq!(timer.start("  "), Err(ValidationError::NoProjectSelected));
        assert_eq!(timer.state(), &TimerState::Idle);
    }

    #[test]
    fn start_while_running_keeps_the_original_draft() {
        let (_, clock, mut timer) = setup();
        timer.start("a").unwrap();
        let started = timer.draft().unwrap().start_time;
        clock.advance(60);
        assert!(!timer.start("b").unwrap());
        assert_eq!(timer.draft().unwrap().project_id, "a");
        assert_eq!(timer.draft().unwrap().start_time, started);
    }

    #[test]
    fn ticks_follow_wall_clock_and_die_with_stop() {
        let (_, clock, mut timer) = setup();
        timer.start("a").unwrap();
        clock.advance(5);
        assert_eq!(timer.refresh_elapsed(), 5);
        // A suspended process misses ticks; the next one catches up in one step.
        clock.advance(600);
        assert_eq!(timer.refresh_elapsed(), 605);
        timer.stop();
        clock.advance(10);
        assert_eq!(timer.refresh_elapsed(), 0);
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[test]
    fn tick_after_reset_stays_zero() {
        let (_, clock, mut timer) = setup();
        timer.start("a").unwrap();
        clock.advance(30);
        timer.refresh_elapsed();
        assert!(timer.reset());
        clock.advance(30);
        assert_eq!(timer.refresh_elapsed(), 0);
        assert!(timer.sessions().is_empty());
        assert!(!timer.reset());
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let (_, clock, mut timer) = setup();
        timer.start("a").unwrap();
        clock.advance(600);
        assert!(timer.pause());
        clock.advance(300);
        assert_eq!(timer.refresh_elapsed(), 600);
        assert!(timer.stop().is_none());
        assert!(timer.is_paused());
        assert!(timer.resume());
        clock.advance(600);
        assert_eq!(timer.refresh_elapsed(), 1200);
        let session = timer.stop().unwrap();
        assert_eq!(session.duration, 1200);
        assert_eq!((session.end_time - session.start_time).num_seconds(), 1500);
    }

    #[test]
    fn pause_and_resume_need_the_right_state() {
        let (_, _, mut timer) = setup();
        assert!(!timer.pause());
        assert!(!timer.resume());
        timer.start("a").unwrap();
        assert!(!timer.resume());
        assert!(timer.pause());
        assert!(!timer.pause());
    }

    #[test]
    fn running_timer_survives_restart() {
        let (kv, clock, mut timer) = setup();
        timer.start("a").unwrap();
        clock.advance(100);
        drop(timer);

        clock.advance(3600);
        let mut timer = TimerStore::load(kv, clock.clone());
        assert!(timer.is_running());
        assert_eq!(timer.elapsed_seconds(), 3700);
        let session = timer.stop().unwrap();
        assert_eq!(session.duration, 3700);
    }

    #[test]
    fn paused_timer_survives_restart() {
        let (kv, clock, mut timer) = setup();
        timer.start("a").unwrap();
        clock.advance(42);
        timer.pause();
        drop(timer);

        clock.advance(1000);
        let timer = TimerStore::load(kv, clock.clone());
        assert!(timer.is_paused());
        assert_eq!(timer.elapsed_seconds(), 42);
    }

    #[test]
    fn history_survives_restart() {
        let (kv, clock, mut timer) = setup();
        timer.start("a").unwrap();
        clock.advance(90);
        timer.stop();
        let timer = TimerStore::load(kv, clock.clone());
        assert_eq!(timer.sessions().len(), 1);
        assert_eq!(timer.sessions()[0].duration, 90);
        assert_eq!(timer.state(), &TimerState::Idle);
    }

    #[test]
    fn clock_going_backwards_never_bills_negative_time() {
        let (_, clock, mut timer) = setup();
        timer.start("a").unwrap();
        clock.advance(-120);
        assert_eq!(timer.refresh_elapsed(), 0);
        let session = timer.stop().unwrap();
        assert_eq!(session.duration, 0);
        assert!(session.end_time >= session.start_time);
    }

    #[test]
    fn clear_all_sessions_is_idempotent() {
        let (kv, clock, mut timer) = setup();
        timer.start("a").unwrap();
        clock.advance(10);
        timer.stop();
        timer.start("a").unwrap();
        timer.clear_all_sessions();
        assert!(timer.sessions().is_empty());
        assert_eq!(timer.state(), &TimerState::Idle);
        timer.clear_all_sessions();
        assert!(timer.sessions().is_empty());
        assert_eq!(kv.get(SESSIONS_KEY).unwrap(), None);
        assert_eq!(kv.get(TIMER_STATE_KEY).unwrap(), None);
    }

    #[test]
    fn recent_sessions_are_newest_first() {
        let (_, clock, mut timer) = setup();
        for project in ["first", "second", "third"] {
            timer.start(project).unwrap();
            clock.advance(60);
            timer.stop();
            clock.advance(60);
        }
        let recent: Vec<_> = timer
            .recent_sessions(2)
            .into_iter()
            .map(|session| session.project_id.as_str())
            .collect();
        assert_eq!(recent, vec!["third", "second"]);
    }

    #[test]
    fn write_failures_do_not_lose_the_session() {
        let clock = Rc::new(ManualClock::at(2026, 3, 4, 9, 0));
        let mut timer = TimerStore::load(Rc::new(ReadOnlyStore), clock.clone());
        timer.start("a").unwrap();
        clock.advance(60);
        assert_eq!(timer.stop().unwrap().duration, 60);
        assert_eq!(timer.sessions().len(), 1);
    }

    #[test]
    fn merge_skips_duplicates_and_inverted_sessions() {
        let (_, clock, mut timer) = setup();
        timer.start("a").unwrap();
        clock.advance(60);
        let existing = timer.stop().unwrap();
        let mut inverted = existing.clone();
        inverted.id = new_id();
        inverted.end_time = inverted.start_time - chrono::Duration::seconds(1);
        let mut fresh = existing.clone();
        fresh.id = new_id();
        assert_eq!(timer.merge_sessions(vec![existing, inverted, fresh]), 1);
        assert_eq!(timer.sessions().len(), 2);
    }

    #[test]
    fn timer_state_serializes_with_status_tag() {
        let (kv, _, mut timer) = setup();
        timer.start("a").unwrap();
        let raw = kv.get(TIMER_STATE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"status\":\"running\""));
        assert!(raw.contains("\"segmentStart\""));
        assert!(raw.contains("\"projectId\":\"a\""));
    }
}
