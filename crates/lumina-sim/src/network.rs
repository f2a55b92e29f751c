//! Fault-injecting network between the clients and the server.
//!
//! Requests ride a simulated REST path: they may be delayed, but always
//! arrive, and the server sees them in arrival order. Events ride per-client
//! channel links that preserve order, may delay or duplicate deliveries, and
//! can drop entirely. A dropped link loses everything queued on it; the
//! client observes the outage on its next poll and recovers through resync.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, trace};

use lumina_core::event::{ClientRequest, ServerEvent};
use lumina_core::sync::ChannelPoll;

use crate::rng::SimRng;

/// Fault probabilities and bounds, all rolled per round.
#[derive(Debug, Clone, Copy)]
pub struct FaultConfig {
    /// Upper bound on delivery delay, in rounds, for both directions.
    pub max_delay_rounds: u64,
    /// Chance that a delivered event is delivered twice.
    pub duplicate_rate_percent: u8,
    /// Chance per round that a live channel link goes down.
    pub disconnect_rate_percent: u8,
    /// Rounds a downed link stays down before it comes back.
    pub reconnect_after_rounds: u64,
}

impl FaultConfig {
    /// A perfectly behaved network.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_delay_rounds: 0,
            duplicate_rate_percent: 0,
            disconnect_rate_percent: 0,
            reconnect_after_rounds: 0,
        }
    }

    /// The default adversarial mix for campaigns.
    #[must_use]
    pub const fn chaos() -> Self {
        Self {
            max_delay_rounds: 3,
            duplicate_rate_percent: 10,
            disconnect_rate_percent: 5,
            reconnect_after_rounds: 4,
        }
    }
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug)]
struct QueuedRequest {
    deliver_at: u64,
    seq: u64,
    request: ClientRequest,
}

#[derive(Debug)]
struct QueuedEvent {
    deliver_at: u64,
    event: ServerEvent,
}

/// One client's channel link.
#[derive(Debug, Default)]
struct Link {
    inbox: VecDeque<QueuedEvent>,
    /// Latest deliver_at already assigned, so queued order is never
    /// reordered by smaller delays behind larger ones.
    tail: u64,
    /// Round at which a downed link revives. Zero means up.
    down_until: u64,
}

impl Link {
    fn is_down(&self, round: u64) -> bool {
        self.down_until > round
    }

    fn front_due(&self, round: u64) -> bool {
        self.inbox.front().is_some_and(|q| q.deliver_at <= round)
    }
}

/// The simulated network fabric. Owns its own RNG stream so fault rolls
/// replay exactly for a given seed regardless of client behavior.
#[derive(Debug)]
pub struct SimulatedNetwork {
    faults: FaultConfig,
    rng: SimRng,
    round: u64,
    seq: u64,
    requests: Vec<QueuedRequest>,
    links: BTreeMap<String, Link>,
    rooms: BTreeMap<String, BTreeSet<String>>,
}

impl SimulatedNetwork {
    #[must_use]
    pub fn new(faults: FaultConfig, seed: u64) -> Self {
        Self {
            faults,
            rng: SimRng::new(seed),
            round: 0,
            seq: 0,
            requests: Vec::new(),
            links: BTreeMap::new(),
            rooms: BTreeMap::new(),
        }
    }

    /// Add a client link. Links start connected.
    pub fn register(&mut self, client_id: &str) {
        self.links.insert(client_id.to_string(), Link::default());
    }

    /// Advance one round and roll link failures.
    pub fn tick(&mut self) {
        self.round += 1;
        let round = self.round;
        let rate = self.faults.disconnect_rate_percent;
        let outage = self.faults.reconnect_after_rounds.max(1);
        for (client, link) in &mut self.links {
            if !link.is_down(round) && self.rng.chance(rate) {
                debug!(client = %client, round, "channel link dropped");
                link.inbox.clear();
                link.down_until = round + outage;
            }
        }
    }

    /// Current round number.
    #[must_use]
    pub const fn round(&self) -> u64 {
        self.round
    }

    /// Put a client in a broadcast room.
    pub fn join_room(&mut self, client_id: &str, room: &str) {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(client_id.to_string());
    }

    /// Remove a client from a broadcast room.
    pub fn leave_room(&mut self, client_id: &str, room: &str) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(client_id);
        }
    }

    /// Current membership of a room.
    #[must_use]
    pub fn room_members(&self, room: &str) -> Vec<String> {
        self.rooms
            .get(room)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Queue a client request toward the server.
    pub fn submit(&mut self, request: ClientRequest) {
        let delay = self.rng.below(self.faults.max_delay_rounds + 1);
        self.seq += 1;
        trace!(seq = self.seq, delay, "request queued");
        self.requests.push(QueuedRequest {
            deliver_at: self.round + delay,
            seq: self.seq,
            request,
        });
    }

    /// Drain every request due this round, in arrival order.
    pub fn take_due_requests(&mut self) -> Vec<ClientRequest> {
        let round = self.round;
        let mut due: Vec<QueuedRequest> = Vec::new();
        let mut rest: Vec<QueuedRequest> = Vec::new();
        for queued in self.requests.drain(..) {
            if queued.deliver_at <= round {
                due.push(queued);
            } else {
                rest.push(queued);
            }
        }
        self.requests = rest;
        due.sort_by_key(|q| (q.deliver_at, q.seq));
        due.into_iter().map(|q| q.request).collect()
    }

    /// Queue an event toward one client. Dropped silently if the link is
    /// down; the resync path owns recovery.
    pub fn push_event(&mut self, to: &str, event: &ServerEvent) {
        let round = self.round;
        let delay = self.rng.below(self.faults.max_delay_rounds + 1);
        let duplicate = self.rng.chance(self.faults.duplicate_rate_percent);
        let Some(link) = self.links.get_mut(to) else {
            return;
        };
        if link.is_down(round) {
            trace!(client = %to, "event lost to downed link");
            return;
        }
        let deliver_at = link.tail.max(round + delay);
        link.tail = deliver_at;
        link.inbox.push_back(QueuedEvent {
            deliver_at,
            event: event.clone(),
        });
        if duplicate {
            link.inbox.push_back(QueuedEvent {
                deliver_at,
                event: event.clone(),
            });
        }
    }

    /// One client polling its link: due events plus link liveness.
    pub fn poll(&mut self, client: &str) -> ChannelPoll {
        let round = self.round;
        let Some(link) = self.links.get_mut(client) else {
            return ChannelPoll {
                events: vec![],
                connected: false,
            };
        };
        if link.is_down(round) {
            return ChannelPoll {
                events: vec![],
                connected: false,
            };
        }
        let mut events = Vec::new();
        while link.front_due(round) {
            if let Some(queued) = link.inbox.pop_front() {
                events.push(queued.event);
            }
        }
        ChannelPoll {
            events,
            connected: true,
        }
    }

    /// Switch off every fault and revive all links, for the quiescence
    /// drain at the end of a run.
    pub fn calm(&mut self) {
        self.faults = FaultConfig::none();
        for link in self.links.values_mut() {
            link.down_until = 0;
            link.tail = 0;
            for queued in &mut link.inbox {
                queued.deliver_at = self.round;
            }
        }
        for queued in &mut self.requests {
            queued.deliver_at = self.round;
        }
    }

    /// True once nothing is in flight in either direction.
    #[must_use]
    pub fn idle(&self) -> bool {
        self.requests.is_empty() && self.links.values().all(|l| l.inbox.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{FaultConfig, SimulatedNetwork};
    use chrono::Utc;
    use lumina_core::event::ServerEvent;
    use lumina_core::model::{Priority, Task, TaskStatus, Version};

    fn event(id: &str, n: u64) -> ServerEvent {
        ServerEvent::TaskUpdated(Task {
            id: id.to_string(),
            project_id: "p1".to_string(),
            title: "t".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            assignee_id: None,
            due_date: None,
            labels: vec![],
            comments: vec![],
            created_at: Utc::now(),
            version: Version::Canonical(n),
        })
    }

    #[test]
    fn faultless_network_delivers_in_order() {
        let mut net = SimulatedNetwork::new(FaultConfig::none(), 1);
        net.register("a");
        let first = event("t1", 1);
        let second = event("t1", 2);
        net.push_event("a", &first);
        net.push_event("a", &second);
        let poll = net.poll("a");
        assert!(poll.connected);
        assert_eq!(poll.events, [first, second]);
        assert!(net.idle());
    }

    #[test]
    fn delays_never_reorder_a_link() {
        let faults = FaultConfig {
            max_delay_rounds: 5,
            ..FaultConfig::none()
        };
        let mut net = SimulatedNetwork::new(faults, 3);
        net.register("a");
        for n in 1..=20 {
            net.push_event("a", &event("t1", n));
        }
        let mut seen = Vec::new();
        for _ in 0..30 {
            net.tick();
            for ev in net.poll("a").events {
                if let ServerEvent::TaskUpdated(t) = ev {
                    seen.push(t.version.number());
                }
            }
        }
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        assert_eq!(seen, sorted);
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn downed_link_reports_disconnected_and_loses_its_queue() {
        let faults = FaultConfig {
            disconnect_rate_percent: 100,
            reconnect_after_rounds: 2,
            ..FaultConfig::none()
        };
        let mut net = SimulatedNetwork::new(faults, 5);
        net.register("a");
        net.push_event("a", &event("t1", 1));
        net.tick();
        let poll = net.poll("a");
        assert!(!poll.connected);
        assert!(poll.events.is_empty());
        assert!(net.idle());
    }

    #[test]
    fn calm_drains_everything() {
        let faults = FaultConfig {
            max_delay_rounds: 50,
            ..FaultConfig::none()
        };
        let mut net = SimulatedNetwork::new(faults, 7);
        net.register("a");
        net.push_event("a", &event("t1", 1));
        net.calm();
        assert_eq!(net.poll("a").events.len(), 1);
        assert!(net.idle());
    }

    #[test]
    fn requests_arrive_in_submission_order_without_delay() {
        let mut net = SimulatedNetwork::new(FaultConfig::none(), 11);
        net.register("a");
        net.submit(lumina_core::event::ClientRequest::CreateTask {
            actor: "u1".to_string(),
            task: match event("t1", 1) {
                ServerEvent::TaskUpdated(t) => t,
                _ => unreachable!(),
            },
        });
        assert_eq!(net.take_due_requests().len(), 1);
        assert!(net.idle());
    }
}
