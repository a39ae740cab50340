use leptos::prelude::*;

/// 404 - Not Found
#[component]
pub fn NotFound() -> impl IntoView {
	view! { <h1>"Nothing here. The network view lives at /"</h1> }
}
