use leptos::prelude::*;
use log::error;
use wasm_bindgen_futures::spawn_local;

use crate::components::network::NetworkCanvas;
use crate::config::ViewerConfig;
use crate::data::{Network, load_network};

/// Network view: loads both documents once, then shows the canvas and the
/// path trigger.
#[component]
pub fn Home() -> impl IntoView {
	let config = ViewerConfig::default();
	let (network, set_network) = signal(None::<Network>);
	let (status, set_status) = signal(String::from("Loading network..."));
	let (run_requests, set_run_requests) = signal(0u32);

	let (graph_url, path_url) = (config.graph_url.clone(), config.path_url.clone());
	spawn_local(async move {
		match load_network(&graph_url, &path_url).await {
			Ok(loaded) => {
				set_status.set(loaded.summary());
				set_network.set(Some(loaded));
			}
			Err(e) => {
				error!("Network load failed: {e}");
				set_status.set(format!("Failed to load network: {e}"));
			}
		}
	});

	let run_path = move |_| set_run_requests.update(|n| *n = n.wrapping_add(1));

	view! {
		<div class="fullscreen-graph">
			{move || {
				network
					.get()
					.map(|network| {
						view! {
							<NetworkCanvas
								network=network
								run_requests=run_requests
								config=config.clone()
								fullscreen=true
							/>
						}
					})
			}}
			<div class="graph-overlay">
				<h1>"Network Path Visualizer"</h1>
				<p class="subtitle">{move || status.get()}</p>
				<button
					id="runPath"
					on:click=run_path
					disabled=move || network.with(Option::is_none)
				>
					"Run path animation"
				</button>
			</div>
		</div>
	}
}
