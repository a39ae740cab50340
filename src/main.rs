use leptos::prelude::*;
use netpath_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App);
}
