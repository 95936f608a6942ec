use leptos::prelude::*;
use log::info;

use crate::components::routine_graph::{GraphEvent, LayoutMode, RoutineGraphCanvas};
use crate::data::{self, SkinType};

/// Row of skin type toggles shared by both pages.
#[component]
pub fn SkinTypePicker(
	#[prop(into)] skin: Signal<SkinType>,
	on_pick: Callback<SkinType>,
) -> impl IntoView {
	view! {
		<div class="skin-types">
			{SkinType::ALL
				.into_iter()
				.map(|s| {
					view! {
						<button
							class:active=move || skin.get() == s
							on:click=move |_| on_pick.run(s)
						>
							{s.label()}
						</button>
					}
				})
				.collect_view()}
		</div>
	}
}

/// Product conflict graph for the chosen skin type.
#[component]
pub fn Home() -> impl IntoView {
	let (skin, set_skin) = signal(SkinType::default());
	let (hovered, set_hovered) = signal(None::<String>);
	let graph_data = Signal::derive(move || data::conflict_graph(skin.get()));
	let dataset = Signal::derive(move || skin.get().key().to_string());

	let on_event = Callback::new(move |event: GraphEvent| match event {
		GraphEvent::NodeHover(id) => set_hovered.set(id.map(|id| id.to_string())),
		GraphEvent::EdgeHover(index) => set_hovered
			.set(index.and_then(|i| data::edge_caption(&graph_data.get_untracked(), i))),
		GraphEvent::NodeClick(id) => info!("Selected {id}"),
		_ => {}
	});

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

			<div class="fullscreen-graph">
				<RoutineGraphCanvas
					data=graph_data
					dataset=dataset
					mode=LayoutMode::Circular
					on_event=on_event
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Product Conflicts"</h1>
					<p class="subtitle">
						"Drag products to arrange them. Scroll to zoom. Drag the background to pan."
					</p>
					<SkinTypePicker
						skin=skin
						on_pick=Callback::new(move |s: SkinType| set_skin.set(s))
					/>
					<p class="hovered">{move || hovered.get().unwrap_or_default()}</p>
					<a href="/weekly">"Weekly routine"</a>
				</div>
			</div>
		</ErrorBoundary>
	}
}
