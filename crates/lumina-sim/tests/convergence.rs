//! End-to-end scenarios over the simulated server and network: optimistic
//! writes confirmed by canonical events, concurrent edits settled by server
//! receipt order, direct notification delivery, and seeded fault campaigns.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use lumina_core::config::SyncConfig;
use lumina_core::model::{Project, TaskStatus, User, Version};
use lumina_core::sync::{NewTask, SyncClient};
use lumina_sim::client::QueueTransport;
use lumina_sim::network::{FaultConfig, SimulatedNetwork};
use lumina_sim::server::{Outbound, SimServer};
use lumina_sim::{CampaignConfig, run_campaign};

type World = (Rc<RefCell<SimServer>>, Rc<RefCell<SimulatedNetwork>>);

fn user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{id}@studio.test"),
        avatar: String::new(),
    }
}

fn world() -> World {
    let project = Project {
        id: "p1".to_string(),
        name: "Launch Site".to_string(),
        description: String::new(),
        owner_id: "u1".to_string(),
        members: vec!["u2".to_string()],
        created_at: Utc::now(),
        archived: false,
    };
    let users = vec![user("u1", "Ada"), user("u2", "Grace")];
    let server = Rc::new(RefCell::new(SimServer::new(users, vec![project])));
    let network = Rc::new(RefCell::new(SimulatedNetwork::new(FaultConfig::none(), 1)));
    (server, network)
}

fn client(world: &World, id: &str, name: &str) -> SyncClient<QueueTransport> {
    let (server, network) = world;
    let transport = QueueTransport::new(id, Rc::clone(server), Rc::clone(network));
    let mut client = SyncClient::new(transport, SyncConfig::default(), user(id, name));
    client.hydrate_projects(server.borrow().projects());
    client.activate_project("p1").expect("activate");
    client
}

/// Deliver every due request to the server and route the resulting events.
fn route(world: &World) {
    let (server, network) = world;
    let due = network.borrow_mut().take_due_requests();
    for request in due {
        let outbound = server.borrow_mut().handle(request, Utc::now());
        let mut net = network.borrow_mut();
        for item in outbound {
            match item {
                Outbound::Room { project_id, event } => {
                    for member in net.room_members(&format!("project:{project_id}")) {
                        net.push_event(&member, &event);
                    }
                }
                Outbound::Direct { user_id, event } => net.push_event(&user_id, &event),
            }
        }
    }
}

#[test]
fn creation_reaches_every_room_member() {
    let world = world();
    let mut a = client(&world, "u1", "Ada");
    let mut b = client(&world, "u2", "Grace");

    let id = a
        .create_task(
            NewTask {
                title: "Hero banner".to_string(),
                ..NewTask::default()
            },
            Utc::now(),
        )
        .expect("create");
    assert!(!a.state().task(&id).expect("optimistic").version.is_canonical());

    route(&world);
    a.pump().expect("pump a");
    b.pump().expect("pump b");

    let held_a = a.state().task(&id).expect("a holds it");
    let held_b = b.state().task(&id).expect("b holds it");
    assert_eq!(held_a.version, Version::Canonical(1));
    assert_eq!(held_b.title, "Hero banner");
    assert_eq!(a.state().tasks.len(), 1);
    assert_eq!(b.state().tasks.len(), 1);
}

#[test]
fn concurrent_moves_settle_on_server_receipt_order() {
    let world = world();
    let mut a = client(&world, "u1", "Ada");
    let mut b = client(&world, "u2", "Grace");

    let id = a.create_task(NewTask::default(), Utc::now()).expect("create");
    route(&world);
    a.pump().expect("pump a");
    b.pump().expect("pump b");

    // Both drag the card at once, before either request lands.
    a.move_task(&id, TaskStatus::Review).expect("a moves");
    b.move_task(&id, TaskStatus::InProgress).expect("b moves");
    assert_eq!(a.state().task(&id).expect("a").status, TaskStatus::Review);
    assert_eq!(b.state().task(&id).expect("b").status, TaskStatus::InProgress);

    route(&world);
    a.pump().expect("pump a");
    b.pump().expect("pump b");

    // B's request arrived second, so both boards settle on IN_PROGRESS.
    for held in [a.state().task(&id).expect("a"), b.state().task(&id).expect("b")] {
        assert_eq!(held.status, TaskStatus::InProgress);
        assert_eq!(held.version, Version::Canonical(3));
    }
}

#[test]
fn assignment_notifies_only_the_assignee() {
    let world = world();
    let mut a = client(&world, "u1", "Ada");
    let mut b = client(&world, "u2", "Grace");

    let id = a.create_task(NewTask::default(), Utc::now()).expect("create");
    route(&world);
    a.pump().expect("pump a");
    b.pump().expect("pump b");

    a.reassign_task(&id, Some("u2")).expect("assign");
    route(&world);
    a.pump().expect("pump a");
    b.pump().expect("pump b");

    assert!(a.state().notifications.is_empty());
    assert_eq!(b.state().notifications.len(), 1);
    assert_eq!(b.state().notifications[0].title, "Task assigned to you");
    assert_eq!(b.state().task(&id).expect("b").assignee_id.as_deref(), Some("u2"));
}

#[test]
fn comments_carry_the_author_snapshot_to_other_members() {
    let world = world();
    let mut a = client(&world, "u1", "Ada");
    let mut b = client(&world, "u2", "Grace");

    let id = a.create_task(NewTask::default(), Utc::now()).expect("create");
    route(&world);
    a.pump().expect("pump a");
    b.pump().expect("pump b");

    b.comment(&id, "shifting the palette darker", Utc::now()).expect("comment");
    route(&world);
    a.pump().expect("pump a");
    b.pump().expect("pump b");

    let held = a.state().task(&id).expect("a");
    assert_eq!(held.comments.len(), 1);
    assert_eq!(held.comments[0].user_name, "Grace");
    // The creator is unassigned, so no comment notification goes out.
    assert!(a.state().notifications.is_empty());
}

#[test]
fn fault_campaign_converges_across_seeds() {
    let config = CampaignConfig {
        seed_range: 0..10,
        client_count: 3,
        rounds: 40,
        ..CampaignConfig::default()
    };
    let report = run_campaign(&config).expect("campaign");
    assert_eq!(report.seeds_run, 10);
    assert!(report.all_passed(), "{:?}", report.failures);
}
