use leptos::mount::mount_to_body;
use team_flow::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}
