//! Stress: lockstep invariants under scheduling noise.
//!
//! A parent and two children run many short timesteps with randomized
//! per-domain phase delays, shaking the barrier out of any convenient
//! rhythm. The ordering and lag invariants must hold regardless of how
//! the OS schedules the workers.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use ebb_engine::{ConcurrencyConfig, Domain, Project};
use ebb_test_utils::{EventLog, PhaseEvent, ScriptedModel};

const NTS: u32 = 15;
const NCP: u32 = 3;

fn assert_lag_bounded(events: &[PhaseEvent], child: &str) {
    let mut parent_seen: i64 = 0;
    let mut child_seen: i64 = 0;
    for event in events {
        if event.domain == "P" {
            parent_seen += 1;
        } else if event.domain == child {
            child_seen += 1;
        }
        assert!(child_seen <= parent_seen + 1, "child {child} ran ahead");
        assert!(
            parent_seen <= child_seen + i64::from(NCP) + 1,
            "parent ran away from child {child}"
        );
    }
}

#[test]
fn jittered_domains_preserve_lockstep_invariants() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x0eb_b);
    let log = EventLog::new();

    let mut project = Project::new("jitter");
    let parent = ScriptedModel::new("P", NTS, NCP, log.sender())
        .with_phase_delay(Duration::from_micros(rng.gen_range(0..1500)));
    project
        .add_domain(Domain::new("P", "/p", "/oP", parent))
        .unwrap();

    for id in ["W", "E"] {
        let child = ScriptedModel::new(id, NTS, NCP, log.sender())
            .with_phase_delay(Duration::from_micros(rng.gen_range(0..1500)));
        project
            .add_child_domain(
                Domain::new(id, "/c", &format!("/o{id}"), child),
                "P",
            )
            .unwrap();
    }

    project
        .run(ConcurrencyConfig {
            n_proc_total: 4,
            n_proc_child: 2,
        })
        .unwrap();

    let events = log.drain();
    assert_eq!(events.len() as u32, 3 * NTS * NCP);

    let expected: Vec<(u32, u32)> = (1..=NTS)
        .flat_map(|ts| (0..NCP).map(move |p| (ts, p)))
        .collect();
    for domain in ["P", "W", "E"] {
        assert_eq!(
            EventLog::for_domain(&events, domain),
            expected,
            "domain {domain} order"
        );
    }
    assert_lag_bounded(&events, "W");
    assert_lag_bounded(&events, "E");
}
