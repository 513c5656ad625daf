use bankers::{SafetyStep, SystemConfig};

fn main() {
    let tracker = SystemConfig::sample().build().unwrap();
    let need = tracker.need();

    // Same scan the tracker decides with, consumed one step at a time
    let mut scan = tracker.safety_scan();
    while let Some(step) = scan.next() {
        match step {
            SafetyStep::Evaluated { process, fits } => {
                let verdict = if fits { "can execute" } else { "must wait" };
                println!(
                    "Checking {}: Need={:?} <= Work={:?}? {}",
                    process,
                    need[process.index()],
                    scan.work(),
                    verdict
                );
            }
            SafetyStep::Selected { process, work } => {
                println!("--> {} releases its resources, Work={:?}", process, work);
            }
            SafetyStep::Safe { sequence } => println!("SUCCESS! Safe sequence: {}", sequence),
            SafetyStep::Unsafe { blocked } => {
                println!("DEADLOCK! No process can proceed; blocked: {:?}", blocked)
            }
        }
    }
}
