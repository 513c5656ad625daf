use bankers::{ProcessId, RequestOutcome, SystemConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load the classic sample state
    let mut tracker = SystemConfig::sample().build().unwrap();
    let (safe, sequence) = tracker.check_safety();
    println!("Initial state safe: {} ({})", safe, sequence);

    let requests: [(usize, [u32; 3]); 4] = [
        (1, [1, 0, 2]),
        (4, [3, 3, 0]),
        (0, [0, 2, 0]),
        (3, [0, 1, 1]),
    ];
    for (pid, request) in requests {
        let pid = ProcessId(pid);
        match tracker.request_resources(pid, &request).unwrap() {
            RequestOutcome::Granted(sequence) => {
                println!("{} {:?} granted. Safe sequence: {}", pid, request, sequence)
            }
            RequestOutcome::Denied(reason) => println!("{} {:?} denied: {}", pid, request, reason),
        }
    }

    println!("Available: {:?}", tracker.available());
    for (i, row) in tracker.allocation().iter().enumerate() {
        println!("P{} holds {:?}, needs {:?}", i, row, tracker.need()[i]);
    }
}
