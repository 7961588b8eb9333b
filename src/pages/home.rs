use leptos::prelude::*;

use crate::components::flow_diagram::{FlowDiagramCanvas, Roster};

/// Team section: heading, the lineage diagram and a link to the full team.
#[component]
pub fn Home() -> impl IntoView {
	let roster = Signal::derive(Roster::default);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<section id="team" class="team-section">
				<div class="team-inner">
					<h2 class="team-heading">
						<span class="light">"The people"</span>
						" behind the work."
					</h2>

					<div class="team-diagram">
						<FlowDiagramCanvas roster=roster />
					</div>

					<div class="team-cta">
						<a href="/team" class="team-link">
							"Meet the full team"
						</a>
					</div>
				</div>
			</section>
		</ErrorBoundary>
	}
}
