use bankers::config::tracker_from_text;
use bankers::ProcessId;

fn main() {
    // Comma-separated input, nobody holds anything yet
    let mut tracker = tracker_from_text("10, 5, 7", &["7,5,3", "3,2,2", "9,0,2"], &[]).unwrap();
    println!("Totals: {:?}", tracker.totals());

    for (pid, request) in [(0, "0,1,0"), (1, "2,0,0"), (2, "3,0,2"), (0, "7,4,3")] {
        let request = bankers::config::parse_vector(request).unwrap();
        let outcome = tracker.request_resources(ProcessId(pid), &request).unwrap();
        println!("P{} {:?}: {:?}", pid, request, outcome);
    }

    match tracker_from_text("3,3", &["1,2,x"], &[]) {
        Ok(_) => println!("unexpected success"),
        Err(err) => println!("Invalid input: {}", err),
    }
}
