use std::thread;

use bankers::{ProcessId, SharedTracker, SystemConfig};

fn main() {
    let shared = SharedTracker::new(SystemConfig::sample().build().unwrap());

    let handles: Vec<_> = (0..5)
        .map(|pid| {
            let shared = shared.clone();
            thread::spawn(move || {
                let outcome = shared
                    .request_resources(ProcessId(pid), &[1, 0, 0])
                    .unwrap();
                println!("P{} [1, 0, 0]: {:?}", pid, outcome);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = shared.snapshot().unwrap();
    println!("Available after the burst: {:?}", snapshot.available);
}
