use super::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const JOINS_PER_THREAD: usize = 10;

#[test]
fn test_concurrent_joins_get_unique_positions() {
    let manager = Arc::new(create_test_manager());
    stock(&manager, &[(ItemCategory::Chai, 1000)]);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let manager = manager.clone();
            thread::spawn(move || {
                (0..JOINS_PER_THREAD)
                    .map(|i| {
                        let name = format!("guest-{t}-{i}");
                        join(&manager, &name, &[("Special Chai", 1)]).base_position
                    })
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let mut positions = Vec::new();
    for handle in handles {
        positions.extend(handle.join().unwrap());
    }

    let total = THREADS * JOINS_PER_THREAD;
    let unique: HashSet<u64> = positions.iter().copied().collect();
    assert_eq!(unique.len(), total);
    assert_eq!(*unique.iter().min().unwrap(), 1);
    assert_eq!(*unique.iter().max().unwrap(), total as u64);

    let listed: Vec<u64> = manager
        .list(&manager.today())
        .unwrap()
        .iter()
        .map(|t| t.base_position)
        .collect();
    assert!(listed.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(inventory(&manager).chai, 1000 - total as u32);
}

#[test]
fn test_concurrent_double_submit_creates_one_ticket() {
    let manager = Arc::new(create_test_manager());

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = manager.clone();
            thread::spawn(move || {
                let mut req = join_request("Asha", &[("Special Chai", 1)]);
                req.idempotency_key = Some("tap-tap".to_string());
                manager.join(req).unwrap().ticket.id
            })
        })
        .collect();

    let ids: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(manager.list(&manager.today()).unwrap().len(), 1);
}

#[test]
fn test_concurrent_reject_joins_never_oversell() {
    let manager = Arc::new(create_manager_with(QueueOptions {
        join_policy: JoinStockPolicy::Reject,
        ..Default::default()
    }));
    stock(&manager, &[(ItemCategory::Bun, 20)]);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let manager = manager.clone();
            thread::spawn(move || {
                (0..JOINS_PER_THREAD)
                    .filter(|i| {
                        manager
                            .join(join_request(&format!("g{t}-{i}"), &[("Bun", 1)]))
                            .is_ok()
                    })
                    .count()
            })
        })
        .collect();

    let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(accepted, 20);
    assert_eq!(inventory(&manager).bun, 0);
}
