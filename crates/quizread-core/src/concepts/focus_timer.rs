//! Generic countdown timer with reading/break phases.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::ids::fresh_id;
use crate::outcome::ActionOutcome;
use crate::store::{Store, UpdateOutcome};

const TIMERS: &str = "FocusTimer.timers";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub phase: String,
    pub started_at_ms: i64,
    pub duration_ms: i64,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInput {
    pub duration_ms: i64,
    pub phase: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRef {
    pub timer_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PhaseInput {
    pub phase: String,
}

#[derive(Clone)]
pub struct FocusTimer {
    store: Store,
}

impl FocusTimer {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates an active timer and returns its id.
    pub fn start(&self, input: StartInput) -> Result<ActionOutcome> {
        if input.duration_ms <= 0 {
            return Ok(ActionOutcome::error("durationMs must be greater than 0"));
        }
        if input.phase != "reading" && input.phase != "break" {
            return Ok(ActionOutcome::error("phase must be 'reading' or 'break'"));
        }
        let doc = TimerDoc {
            id: fresh_id(),
            phase: input.phase,
            started_at_ms: Utc::now().timestamp_millis(),
            duration_ms: input.duration_ms,
            is_active: true,
        };
        self.store
            .insert(TIMERS, &doc.id, &serde_json::to_value(&doc)?)?;
        Ok(ActionOutcome::ok(json!({ "timerId": doc.id })))
    }

    /// Pauses an active timer.
    pub fn pause(&self, input: TimerRef) -> Result<ActionOutcome> {
        let outcome = self.store.update_if(TIMERS, &input.timer_id, |mut doc| {
            if doc["isActive"] != json!(true) {
                return Err("Timer is not active".to_string());
            }
            doc["isActive"] = json!(false);
            Ok(doc)
        })?;
        Ok(transition_outcome(outcome))
    }

    /// Resumes a paused timer, restarting its countdown.
    pub fn resume(&self, input: TimerRef) -> Result<ActionOutcome> {
        let outcome = self.store.update_if(TIMERS, &input.timer_id, |mut doc| {
            if doc["isActive"] == json!(true) {
                return Err("Timer is already active".to_string());
            }
            doc["isActive"] = json!(true);
            doc["startedAtMs"] = json!(Utc::now().timestamp_millis());
            Ok(doc)
        })?;
        Ok(transition_outcome(outcome))
    }

    /// Flips an elapsed active timer to the opposite phase and restarts it.
    pub fn expire(&self, input: TimerRef) -> Result<ActionOutcome> {
        let now = Utc::now().timestamp_millis();
        let outcome = self.store.update_if(TIMERS, &input.timer_id, |mut doc| {
            if doc["isActive"] != json!(true) {
                return Err("Timer is not active".to_string());
            }
            let started = doc["startedAtMs"].as_i64().unwrap_or(0);
            let duration = doc["durationMs"].as_i64().unwrap_or(0);
            if now - started < duration {
                return Err("Timer has not expired yet".to_string());
            }
            let next = if doc["phase"] == json!("reading") {
                "break"
            } else {
                "reading"
            };
            doc["phase"] = json!(next);
            doc["startedAtMs"] = json!(now);
            Ok(doc)
        })?;
        Ok(transition_outcome(outcome))
    }

    pub fn get_timer(&self, input: TimerRef) -> Result<Option<TimerDoc>> {
        match self.store.get(TIMERS, &input.timer_id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub fn active_timers(&self) -> Result<Vec<TimerDoc>> {
        self.docs(&[("isActive", &json!(true))])
    }

    pub fn timers_by_phase(&self, input: PhaseInput) -> Result<Vec<TimerDoc>> {
        self.docs(&[("phase", &json!(input.phase))])
    }

    fn docs(&self, filter: &[(&str, &Value)]) -> Result<Vec<TimerDoc>> {
        self.store
            .find(TIMERS, filter)?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(Into::into))
            .collect()
    }
}

fn transition_outcome(outcome: UpdateOutcome) -> ActionOutcome {
    match outcome {
        UpdateOutcome::Updated(_) => ActionOutcome::empty(),
        UpdateOutcome::Rejected(reason) => ActionOutcome::Error(reason),
        UpdateOutcome::Missing => ActionOutcome::error("Timer not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timers() -> FocusTimer {
        FocusTimer::new(Store::in_memory().unwrap())
    }

    fn start(t: &FocusTimer, duration_ms: i64, phase: &str) -> ActionOutcome {
        t.start(StartInput {
            duration_ms,
            phase: phase.to_string(),
        })
        .unwrap()
    }

    fn timer_id(outcome: &ActionOutcome) -> String {
        outcome.field("timerId").unwrap().as_str().unwrap().to_string()
    }

    #[test]
    fn start_validates_duration_and_phase() {
        let t = timers();
        assert_eq!(
            start(&t, 0, "reading").error_message(),
            Some("durationMs must be greater than 0")
        );
        assert_eq!(
            start(&t, 1000, "work").error_message(),
            Some("phase must be 'reading' or 'break'")
        );
        let ok = start(&t, 1000, "reading");
        assert!(!ok.is_error());
        let doc = t
            .get_timer(TimerRef {
                timer_id: timer_id(&ok),
            })
            .unwrap()
            .unwrap();
        assert!(doc.is_active);
        assert_eq!(doc.phase, "reading");
    }

    #[test]
    fn pause_requires_an_active_timer() {
        let t = timers();
        let id = timer_id(&start(&t, 60_000, "reading"));
        assert!(!t.pause(TimerRef { timer_id: id.clone() }).unwrap().is_error());
        assert_eq!(
            t.pause(TimerRef { timer_id: id }).unwrap().error_message(),
            Some("Timer is not active")
        );
        assert_eq!(
            t.pause(TimerRef {
                timer_id: "missing".to_string()
            })
            .unwrap()
            .error_message(),
            Some("Timer not found")
        );
    }

    #[test]
    fn resume_restarts_a_paused_timer() {
        let t = timers();
        let id = timer_id(&start(&t, 60_000, "break"));
        assert_eq!(
            t.resume(TimerRef { timer_id: id.clone() })
                .unwrap()
                .error_message(),
            Some("Timer is already active")
        );
        t.pause(TimerRef { timer_id: id.clone() }).unwrap();
        assert!(!t
            .resume(TimerRef { timer_id: id.clone() })
            .unwrap()
            .is_error());
        let doc = t.get_timer(TimerRef { timer_id: id }).unwrap().unwrap();
        assert!(doc.is_active);
    }

    #[test]
    fn expire_flips_phase_once_elapsed() {
        let t = timers();
        let id = timer_id(&start(&t, 3_600_000, "reading"));
        assert_eq!(
            t.expire(TimerRef { timer_id: id.clone() })
                .unwrap()
                .error_message(),
            Some("Timer has not expired yet")
        );

        let quick = timer_id(&start(&t, 1, "reading"));
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(!t
            .expire(TimerRef {
                timer_id: quick.clone()
            })
            .unwrap()
            .is_error());
        let doc = t
            .get_timer(TimerRef { timer_id: quick })
            .unwrap()
            .unwrap();
        assert_eq!(doc.phase, "break");
        assert!(doc.is_active);
    }

    #[test]
    fn queries_filter_by_activity_and_phase() {
        let t = timers();
        let a = timer_id(&start(&t, 60_000, "reading"));
        let _b = timer_id(&start(&t, 60_000, "break"));
        t.pause(TimerRef { timer_id: a }).unwrap();

        assert_eq!(t.active_timers().unwrap().len(), 1);
        assert_eq!(
            t.timers_by_phase(PhaseInput {
                phase: "reading".to_string()
            })
            .unwrap()
            .len(),
            1
        );
    }
}
